use crate::base::context::IoResultExt;
use crate::base::socketerror::SocketError;
use crate::socket::options::SocketOptions;
use crate::socket::platform::PlatformSocketOps;
use crate::socket::stream::{MsgFlags, StreamEndpoint};
use std::fmt;
use std::io;

/// Where a handle is in its lifecycle.
///
/// A released handle has been consumed, so there is no `Closed` variant.
/// Callers only ever hold `Open` handles: [`close_gracefully`] moves a handle
/// to `ShuttingDown` and releases it in the same call, and a failed shutdown
/// leaves it `Open`. `ShuttingDown` shows up in the release log and in
/// `Debug` output of a handle mid-close.
///
/// [`close_gracefully`]: crate::socket::close::close_gracefully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Open,
    /// Both directions are shut down; release is next.
    ShuttingDown,
}

/// Sole owner of one connected stream endpoint.
///
/// Handles are created by [`SocketContext::adopt`](crate::socket::lifecycle::SocketContext::adopt)
/// and cannot outlive that context.
pub struct SocketHandle<'ctx, E: StreamEndpoint> {
    endpoint: E,
    state: HandleState,
    ops: &'ctx dyn PlatformSocketOps,
}

impl<'ctx, E: StreamEndpoint> SocketHandle<'ctx, E> {
    pub(crate) fn new(endpoint: E, ops: &'ctx dyn PlatformSocketOps) -> Self {
        Self {
            endpoint,
            state: HandleState::Open,
            ops,
        }
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    pub fn get_ref(&self) -> &E {
        &self.endpoint
    }

    /// Give up management of the endpoint without closing it.
    pub fn into_inner(self) -> E {
        self.endpoint
    }

    /// Apply socket options. Timeouts set here are the only way to bound
    /// how long a transfer blocks.
    pub fn configure(&self, options: &SocketOptions) -> Result<(), SocketError> {
        let sock = self.endpoint.sock_ref().ok_or_else(|| {
            SocketError::Io(io::Error::new(
                io::ErrorKind::Unsupported,
                "endpoint does not expose socket options",
            ))
        })?;
        options.apply(&sock).socket_context(self.ops, "configure")
    }

    /// Release the endpoint without shutting it down first.
    pub fn release(self) -> Result<(), SocketError> {
        let ops = self.ops;
        tracing::debug!(state = ?self.state, "releasing socket handle");
        self.endpoint.release().socket_context(ops, "release")
    }

    pub(crate) fn recv_chunk(
        &mut self,
        buf: &mut [u8],
        flags: MsgFlags,
    ) -> Result<usize, SocketError> {
        self.endpoint.recv_chunk(buf, flags).socket_context(self.ops, "recv")
    }

    pub(crate) fn send_chunk(&mut self, buf: &[u8], flags: MsgFlags) -> Result<usize, SocketError> {
        self.endpoint.send_chunk(buf, flags).socket_context(self.ops, "send")
    }

    /// Shut down both directions. The state only advances on success.
    pub(crate) fn shutdown(&mut self) -> Result<(), SocketError> {
        self.endpoint.shutdown().socket_context(self.ops, "shutdown")?;
        self.state = HandleState::ShuttingDown;
        Ok(())
    }
}

impl<E: StreamEndpoint + fmt::Debug> fmt::Debug for SocketHandle<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketHandle")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state)
            .finish()
    }
}
