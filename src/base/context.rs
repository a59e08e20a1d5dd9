//! Ergonomic error context helpers.
//!
//! Converts `io::Result`s from platform calls into [`SocketError`]s,
//! normalizing the OS code through the active [`PlatformSocketOps`].

use crate::base::socketerror::SocketError;
use crate::socket::platform::PlatformSocketOps;
use std::io;

/// Extension trait for adding socket context to IO Results.
pub trait IoResultExt<T> {
    /// Normalize a failed platform call named `op`.
    ///
    /// # Example
    /// ```ignore
    /// use sockio::base::context::IoResultExt;
    ///
    /// let n = socket.send(buf).socket_context(ctx.ops(), "send")?;
    /// ```
    fn socket_context(self, ops: &dyn PlatformSocketOps, op: &'static str)
        -> Result<T, SocketError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn socket_context(
        self,
        ops: &dyn PlatformSocketOps,
        op: &'static str,
    ) -> Result<T, SocketError> {
        self.map_err(|e| {
            let err = SocketError::from_io_with(e, |native| ops.normalize(native));
            tracing::debug!(op, error = %err, normalized = err.normalized_code(), "socket call failed");
            err
        })
    }
}
