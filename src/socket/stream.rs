//! Stream endpoint abstraction.
//!
//! A [`StreamEndpoint`] is one connected byte-stream socket, seen through the
//! four calls the transfer engine and close helper need: a single flagged
//! receive, a single flagged send, a bidirectional shutdown, and a checked
//! release. Implemented for `socket2::Socket`, `std::net::TcpStream` and, on
//! Unix, `std::os::unix::net::UnixStream`.

use socket2::{SockRef, Socket};
use std::io;
use std::mem::MaybeUninit;
use std::net::{Shutdown, TcpStream};
use std::ops::BitOr;

/// Raw `MSG_*` flags passed through to `recv(2)` / `send(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct MsgFlags(i32);

impl MsgFlags {
    pub const NONE: MsgFlags = MsgFlags(0);

    #[cfg(unix)]
    pub const PEEK: MsgFlags = MsgFlags(libc::MSG_PEEK);
    #[cfg(unix)]
    pub const OOB: MsgFlags = MsgFlags(libc::MSG_OOB);
    #[cfg(unix)]
    pub const WAITALL: MsgFlags = MsgFlags(libc::MSG_WAITALL);
    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub const NOSIGNAL: MsgFlags = MsgFlags(libc::MSG_NOSIGNAL);

    #[cfg(windows)]
    pub const OOB: MsgFlags = MsgFlags(0x1);
    #[cfg(windows)]
    pub const PEEK: MsgFlags = MsgFlags(0x2);
    #[cfg(windows)]
    pub const WAITALL: MsgFlags = MsgFlags(0x8);

    pub const fn from_raw(bits: i32) -> Self {
        MsgFlags(bits)
    }

    pub const fn bits(&self) -> i32 {
        self.0
    }

    pub const fn contains(&self, other: MsgFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MsgFlags {
    type Output = MsgFlags;

    fn bitor(self, rhs: MsgFlags) -> MsgFlags {
        MsgFlags(self.0 | rhs.0)
    }
}

/// One connected stream socket endpoint.
pub trait StreamEndpoint {
    /// One receive call into `buf`. `Ok(0)` means the peer closed its send side.
    fn recv_chunk(&mut self, buf: &mut [u8], flags: MsgFlags) -> io::Result<usize>;

    /// One send call from `buf`. May transmit fewer bytes than offered.
    fn send_chunk(&mut self, buf: &[u8], flags: MsgFlags) -> io::Result<usize>;

    /// Shut down both directions.
    fn shutdown(&mut self) -> io::Result<()>;

    /// Release the underlying OS resource, reporting the close result.
    fn release(self) -> io::Result<()>
    where
        Self: Sized;

    /// Access to socket options, when the endpoint is an OS socket.
    fn sock_ref(&self) -> Option<SockRef<'_>> {
        None
    }
}

fn recv_via(sock: SockRef<'_>, buf: &mut [u8], flags: MsgFlags) -> io::Result<usize> {
    // SAFETY: `[u8]` and `[MaybeUninit<u8>]` share a layout, and recv only
    // ever writes initialized bytes into the slice.
    let uninit = unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) };
    sock.recv_with_flags(uninit, flags.bits())
}

fn send_via(sock: SockRef<'_>, buf: &[u8], flags: MsgFlags) -> io::Result<usize> {
    sock.send_with_flags(buf, flags.bits())
}

#[cfg(unix)]
fn close_raw<T: std::os::fd::IntoRawFd>(owner: T) -> io::Result<()> {
    let fd = owner.into_raw_fd();
    // SAFETY: `fd` was just taken out of its owner, so nothing else closes it.
    if unsafe { libc::close(fd) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(windows)]
fn close_raw<T: std::os::windows::io::IntoRawSocket>(owner: T) -> io::Result<()> {
    use windows::Win32::Networking::WinSock::{closesocket, SOCKET, SOCKET_ERROR};

    let raw = owner.into_raw_socket();
    // SAFETY: `raw` was just taken out of its owner, so nothing else closes it.
    if unsafe { closesocket(SOCKET(raw as usize)) } == SOCKET_ERROR {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl StreamEndpoint for Socket {
    fn recv_chunk(&mut self, buf: &mut [u8], flags: MsgFlags) -> io::Result<usize> {
        recv_via(SockRef::from(&*self), buf, flags)
    }

    fn send_chunk(&mut self, buf: &[u8], flags: MsgFlags) -> io::Result<usize> {
        send_via(SockRef::from(&*self), buf, flags)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        Socket::shutdown(self, Shutdown::Both)
    }

    fn release(self) -> io::Result<()> {
        close_raw(self)
    }

    fn sock_ref(&self) -> Option<SockRef<'_>> {
        Some(SockRef::from(self))
    }
}

impl StreamEndpoint for TcpStream {
    fn recv_chunk(&mut self, buf: &mut [u8], flags: MsgFlags) -> io::Result<usize> {
        recv_via(SockRef::from(&*self), buf, flags)
    }

    fn send_chunk(&mut self, buf: &[u8], flags: MsgFlags) -> io::Result<usize> {
        send_via(SockRef::from(&*self), buf, flags)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }

    fn release(self) -> io::Result<()> {
        close_raw(self)
    }

    fn sock_ref(&self) -> Option<SockRef<'_>> {
        Some(SockRef::from(self))
    }
}

#[cfg(unix)]
impl StreamEndpoint for std::os::unix::net::UnixStream {
    fn recv_chunk(&mut self, buf: &mut [u8], flags: MsgFlags) -> io::Result<usize> {
        recv_via(SockRef::from(&*self), buf, flags)
    }

    fn send_chunk(&mut self, buf: &[u8], flags: MsgFlags) -> io::Result<usize> {
        send_via(SockRef::from(&*self), buf, flags)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        std::os::unix::net::UnixStream::shutdown(self, Shutdown::Both)
    }

    fn release(self) -> io::Result<()> {
        close_raw(self)
    }

    fn sock_ref(&self) -> Option<SockRef<'_>> {
        Some(SockRef::from(self))
    }
}
