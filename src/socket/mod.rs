//! Blocking stream socket primitives.
//!
//! - [`lifecycle`]: process-wide socket subsystem registration ([`SocketContext`](lifecycle::SocketContext))
//! - [`platform`]: the [`PlatformSocketOps`](platform::PlatformSocketOps) capability trait
//! - [`stream`]: [`StreamEndpoint`](stream::StreamEndpoint) over OS sockets, and message flags
//! - [`handle`]: the owning [`SocketHandle`](handle::SocketHandle)
//! - [`options`]: timeouts and other per-handle settings
//! - [`transfer`]: `receive_until`, `send_all`, `send_text`
//! - [`close`]: `close_gracefully`

pub mod close;
pub mod handle;
pub mod lifecycle;
pub mod options;
pub mod platform;
pub mod stream;
pub mod transfer;

#[cfg(test)]
pub(crate) mod scripted;
