//! Graceful two-phase close: shut down both directions, then release.

use crate::base::socketerror::SocketError;
use crate::socket::handle::SocketHandle;
use crate::socket::stream::StreamEndpoint;
use std::fmt;
use thiserror::Error;

#[derive(Error)]
pub enum CloseError<'ctx, E: StreamEndpoint> {
    /// Shutdown failed; release was not attempted and the still-open handle
    /// is handed back.
    #[error("Socket shutdown failed: {source}")]
    Shutdown {
        #[source]
        source: SocketError,
        handle: SocketHandle<'ctx, E>,
    },

    /// Shutdown succeeded but releasing the handle failed.
    #[error("Socket release failed: {0}")]
    Release(#[source] SocketError),
}

impl<'ctx, E: StreamEndpoint> CloseError<'ctx, E> {
    pub fn error(&self) -> &SocketError {
        match self {
            CloseError::Shutdown { source, .. } => source,
            CloseError::Release(source) => source,
        }
    }

    /// Drop any returned handle and keep only the error.
    pub fn into_error(self) -> SocketError {
        match self {
            CloseError::Shutdown { source, .. } => source,
            CloseError::Release(source) => source,
        }
    }

    /// Take back the handle a failed shutdown left open.
    pub fn into_handle(self) -> Option<SocketHandle<'ctx, E>> {
        match self {
            CloseError::Shutdown { handle, .. } => Some(handle),
            CloseError::Release(_) => None,
        }
    }
}

impl<E: StreamEndpoint> fmt::Debug for CloseError<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseError::Shutdown { source, handle } => f
                .debug_struct("Shutdown")
                .field("source", source)
                .field("state", &handle.state())
                .finish(),
            CloseError::Release(source) => f.debug_tuple("Release").field(source).finish(),
        }
    }
}

/// Shut down both directions, then release the handle.
///
/// If shutdown fails the handle is not released; it comes back inside
/// [`CloseError::Shutdown`] so the caller can retry, release it explicitly,
/// or drop it (which closes the endpoint without reporting a result).
pub fn close_gracefully<'ctx, E: StreamEndpoint>(
    mut handle: SocketHandle<'ctx, E>,
) -> Result<(), CloseError<'ctx, E>> {
    if let Err(source) = handle.shutdown() {
        tracing::debug!(error = %source, "shutdown failed, handle left open");
        return Err(CloseError::Shutdown { source, handle });
    }
    tracing::debug!("socket shut down");
    handle.release().map_err(CloseError::Release)
}
