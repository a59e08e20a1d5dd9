//! Process-wide socket subsystem registration.
//!
//! Some socket stacks (Winsock) must be registered before any socket call and
//! deregistered at exit. [`startup`] performs the registration and returns a
//! [`SocketContext`]; handles are adopted through the context and borrow it,
//! so a context cannot be torn down while any handle is alive, and
//! [`SocketContext::teardown`] consumes it so it cannot run twice.
//!
//! There is no reference counting. Callers that start up from several
//! threads must serialize those calls themselves.

use crate::base::errno;
use crate::base::socketerror::SocketError;
use crate::socket::handle::SocketHandle;
use crate::socket::platform::{NativeOps, PlatformSocketOps};
use crate::socket::stream::StreamEndpoint;
use std::fmt;

/// Register with the build target's socket stack.
pub fn startup() -> Result<SocketContext, SocketError> {
    SocketContext::with_ops(NativeOps)
}

/// Proof that the socket subsystem is registered.
pub struct SocketContext {
    ops: Box<dyn PlatformSocketOps>,
    active: bool,
}

impl SocketContext {
    /// Register through a caller-supplied platform implementation.
    pub fn with_ops<O: PlatformSocketOps + 'static>(ops: O) -> Result<Self, SocketError> {
        ops.startup()
            .map_err(|e| SocketError::startup_with(e, |native| ops.normalize(native)))?;
        tracing::debug!("socket subsystem started");
        Ok(Self {
            ops: Box::new(ops),
            active: true,
        })
    }

    /// Take ownership of a connected endpoint.
    pub fn adopt<E: StreamEndpoint>(&self, endpoint: E) -> SocketHandle<'_, E> {
        tracing::debug!("adopting socket endpoint");
        SocketHandle::new(endpoint, self.ops.as_ref())
    }

    pub fn ops(&self) -> &dyn PlatformSocketOps {
        self.ops.as_ref()
    }

    /// The raw error left by the last failed platform call on this thread.
    pub fn last_error(&self) -> i32 {
        self.ops.last_error()
    }

    /// [`last_error`](Self::last_error), normalized.
    pub fn last_error_normalized(&self) -> i32 {
        self.ops.normalize(self.ops.last_error())
    }

    pub fn normalize(&self, native: i32) -> i32 {
        self.ops.normalize(native)
    }

    pub fn describe_error(&self, native: i32) -> String {
        errno::describe_error(native)
    }

    /// Deregister from the socket stack.
    pub fn teardown(mut self) -> Result<(), SocketError> {
        self.active = false;
        let ops = self.ops.as_ref();
        ops.teardown()
            .map_err(|e| SocketError::teardown_with(e, |native| ops.normalize(native)))?;
        tracing::debug!("socket subsystem torn down");
        Ok(())
    }
}

impl Drop for SocketContext {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if let Err(e) = self.ops.teardown() {
            tracing::warn!(error = %e, "socket subsystem teardown on drop failed");
        }
    }
}

impl fmt::Debug for SocketContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketContext").field("active", &self.active).finish()
    }
}
