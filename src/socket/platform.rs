//! Platform capability interface.
//!
//! Everything that differs between socket stacks and is not tied to a single
//! endpoint lives behind [`PlatformSocketOps`]: process-wide registration and
//! error-code interpretation. [`NativeOps`] is the implementation for the
//! build target; tests and embedders can inject their own through
//! [`SocketContext::with_ops`](crate::socket::lifecycle::SocketContext::with_ops).

use crate::base::errno;
use std::io;

pub trait PlatformSocketOps: Send + Sync {
    /// Register this process with the socket stack.
    fn startup(&self) -> io::Result<()>;

    /// Undo [`startup`](PlatformSocketOps::startup).
    fn teardown(&self) -> io::Result<()>;

    /// The raw error left by the last failed platform call on this thread.
    fn last_error(&self) -> i32 {
        errno::last_error()
    }

    /// Map a native error code onto the normalized vocabulary.
    fn normalize(&self, native: i32) -> i32 {
        errno::normalize(native)
    }
}

/// The build target's socket stack.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeOps;

#[cfg(not(windows))]
impl PlatformSocketOps for NativeOps {
    fn startup(&self) -> io::Result<()> {
        Ok(())
    }

    fn teardown(&self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(windows)]
impl PlatformSocketOps for NativeOps {
    fn startup(&self) -> io::Result<()> {
        use windows::Win32::Networking::WinSock::{WSAStartup, WSADATA};

        // Winsock 2.2
        const VERSION: u16 = 0x0202;
        let mut data = WSADATA::default();
        // SAFETY: `data` is a valid, writable WSADATA for the duration of the call.
        let code = unsafe { WSAStartup(VERSION, &mut data) };
        if code != 0 {
            return Err(io::Error::from_raw_os_error(code));
        }
        Ok(())
    }

    fn teardown(&self) -> io::Result<()> {
        use windows::Win32::Networking::WinSock::{WSACleanup, SOCKET_ERROR};

        // SAFETY: WSACleanup takes no arguments; an unmatched call only reports an error.
        if unsafe { WSACleanup() } == SOCKET_ERROR {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
