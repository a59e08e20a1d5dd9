//! # sockio
//!
//! Portable blocking socket I/O primitives.
//!
//! `sockio` sits directly above the platform socket API. Callers open and
//! connect sockets themselves, then hand them to this crate for the parts
//! that are easy to get wrong:
//!
//! - **Chunked transfers**: `receive_until` and `send_all` loop over short
//!   reads and writes, with an optional predicate to stop a receive early
//!   (for example at the end of an HTTP header block).
//! - **Graceful close**: shutdown of both directions before release.
//! - **Error normalization**: Winsock and Unix error codes mapped onto one
//!   POSIX-style vocabulary.
//! - **Lifecycle**: explicit socket subsystem startup/teardown where the
//!   platform needs it (Winsock), a no-op elsewhere.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sockio::socket::close::close_gracefully;
//! use sockio::socket::lifecycle::startup;
//! use sockio::socket::stream::MsgFlags;
//! use sockio::socket::transfer::{receive_until, send_text, DelimiterPredicate};
//! use std::net::TcpStream;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = startup()?;
//!     let mut handle = ctx.adopt(TcpStream::connect("example.com:80")?);
//!
//!     send_text(&mut handle, "GET / HTTP/1.0\r\n\r\n")?;
//!
//!     let mut buf = vec![0u8; 4096];
//!     let mut headers = DelimiterPredicate::http_headers();
//!     let n = receive_until(&mut handle, &mut buf, MsgFlags::NONE, Some(&mut headers))?;
//!     println!("{}", String::from_utf8_lossy(&buf[..n]));
//!
//!     close_gracefully(handle).map_err(|e| e.into_error())?;
//!     ctx.teardown()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error vocabulary, normalization, and error types
//! - [`socket`] - Handles, transfers, close, and lifecycle

pub mod base;
pub mod socket;

pub use base::errno::{describe_error, last_error, last_error_normalized, normalize, Errno};
pub use base::socketerror::SocketError;
pub use socket::close::{close_gracefully, CloseError};
pub use socket::handle::{HandleState, SocketHandle};
pub use socket::lifecycle::{startup, SocketContext};
pub use socket::options::SocketOptions;
pub use socket::platform::{NativeOps, PlatformSocketOps};
pub use socket::stream::{MsgFlags, StreamEndpoint};
pub use socket::transfer::{
    receive_until, send_all, send_text, DelimiterPredicate, ProgressPredicate,
};
