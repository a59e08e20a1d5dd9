//! Base types and error handling.
//!
//! - [`errno`]: the normalized socket error vocabulary and the native-code table
//! - [`socketerror`]: [`SocketError`](socketerror::SocketError), the error every operation returns
//! - [`context`]: helpers turning `io::Result`s into normalized errors

pub mod context;
pub mod errno;
pub mod socketerror;
