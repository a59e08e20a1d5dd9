//! Socket error normalization.
//!
//! Every platform socket stack reports failures with its own integer codes:
//! Unix uses `errno`, Winsock uses the `WSAE*` range starting at 10000.
//! [`normalize`] maps a native code onto the POSIX-style [`Errno`]
//! vocabulary so callers can match on one set of codes everywhere.
//!
//! The Winsock mapping is a static table of `(native, normalized)` pairs
//! rather than a `match`, which keeps it compiled (and testable) on every
//! platform.

use std::io;
use thiserror::Error;

/// Normalized code returned when a native code has no mapping.
pub const UNMAPPED: i32 = -1;

/// Winsock's "version not supported" code. It has no POSIX counterpart and
/// is passed through verbatim.
pub const VERSION_NOT_SUPPORTED: i32 = 10092;

/// POSIX-style socket error vocabulary.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Errno {
    #[error("Interrupted function call")]
    Intr,
    #[error("Bad file descriptor")]
    BadF,
    #[error("Permission denied")]
    Acces,
    #[error("Bad address")]
    Fault,
    #[error("Invalid argument")]
    Inval,
    #[error("Too many open files")]
    MFile,
    #[error("Operation would block")]
    WouldBlock,
    #[error("Operation now in progress")]
    InProgress,
    #[error("Operation already in progress")]
    Already,
    #[error("Socket operation on non-socket")]
    NotSock,
    #[error("Destination address required")]
    DestAddrReq,
    #[error("Message too long")]
    MsgSize,
    #[error("Protocol wrong type for socket")]
    ProtoType,
    #[error("Protocol not available")]
    NoProtoOpt,
    #[error("Protocol not supported")]
    ProtoNoSupport,
    #[error("Operation not supported")]
    OpNotSupp,
    #[error("Address family not supported by protocol")]
    AfNoSupport,
    #[error("Address already in use")]
    AddrInUse,
    #[error("Cannot assign requested address")]
    AddrNotAvail,
    #[error("Network is down")]
    NetDown,
    #[error("Network is unreachable")]
    NetUnreach,
    #[error("Network dropped connection on reset")]
    NetReset,
    #[error("Software caused connection abort")]
    ConnAborted,
    #[error("Connection reset by peer")]
    ConnReset,
    #[error("No buffer space available")]
    NoBufs,
    #[error("Socket is already connected")]
    IsConn,
    #[error("Socket is not connected")]
    NotConn,
    #[error("Connection timed out")]
    TimedOut,
    #[error("Connection refused")]
    ConnRefused,
    #[error("Too many levels of symbolic links")]
    Loop,
    #[error("File name too long")]
    NameTooLong,
    #[error("No route to host")]
    HostUnreach,
    #[error("Directory not empty")]
    NotEmpty,
    #[error("Socket stack version not supported")]
    VerNotSupported,
}

#[cfg(unix)]
mod codes {
    pub const EINTR: i32 = libc::EINTR;
    pub const EBADF: i32 = libc::EBADF;
    pub const EACCES: i32 = libc::EACCES;
    pub const EFAULT: i32 = libc::EFAULT;
    pub const EINVAL: i32 = libc::EINVAL;
    pub const EMFILE: i32 = libc::EMFILE;
    pub const EWOULDBLOCK: i32 = libc::EWOULDBLOCK;
    pub const EINPROGRESS: i32 = libc::EINPROGRESS;
    pub const EALREADY: i32 = libc::EALREADY;
    pub const ENOTSOCK: i32 = libc::ENOTSOCK;
    pub const EDESTADDRREQ: i32 = libc::EDESTADDRREQ;
    pub const EMSGSIZE: i32 = libc::EMSGSIZE;
    pub const EPROTOTYPE: i32 = libc::EPROTOTYPE;
    pub const ENOPROTOOPT: i32 = libc::ENOPROTOOPT;
    pub const EPROTONOSUPPORT: i32 = libc::EPROTONOSUPPORT;
    pub const EOPNOTSUPP: i32 = libc::EOPNOTSUPP;
    pub const EAFNOSUPPORT: i32 = libc::EAFNOSUPPORT;
    pub const EADDRINUSE: i32 = libc::EADDRINUSE;
    pub const EADDRNOTAVAIL: i32 = libc::EADDRNOTAVAIL;
    pub const ENETDOWN: i32 = libc::ENETDOWN;
    pub const ENETUNREACH: i32 = libc::ENETUNREACH;
    pub const ENETRESET: i32 = libc::ENETRESET;
    pub const ECONNABORTED: i32 = libc::ECONNABORTED;
    pub const ECONNRESET: i32 = libc::ECONNRESET;
    pub const ENOBUFS: i32 = libc::ENOBUFS;
    pub const EISCONN: i32 = libc::EISCONN;
    pub const ENOTCONN: i32 = libc::ENOTCONN;
    pub const ETIMEDOUT: i32 = libc::ETIMEDOUT;
    pub const ECONNREFUSED: i32 = libc::ECONNREFUSED;
    pub const ELOOP: i32 = libc::ELOOP;
    pub const ENAMETOOLONG: i32 = libc::ENAMETOOLONG;
    pub const EHOSTUNREACH: i32 = libc::EHOSTUNREACH;
    pub const ENOTEMPTY: i32 = libc::ENOTEMPTY;
}

// Values from the MSVC CRT `errno.h`, including its POSIX supplement.
#[cfg(not(unix))]
mod codes {
    pub const EINTR: i32 = 4;
    pub const EBADF: i32 = 9;
    pub const EACCES: i32 = 13;
    pub const EFAULT: i32 = 14;
    pub const EINVAL: i32 = 22;
    pub const EMFILE: i32 = 24;
    pub const ENAMETOOLONG: i32 = 38;
    pub const ENOTEMPTY: i32 = 41;
    pub const EADDRINUSE: i32 = 100;
    pub const EADDRNOTAVAIL: i32 = 101;
    pub const EAFNOSUPPORT: i32 = 102;
    pub const EALREADY: i32 = 103;
    pub const ECONNABORTED: i32 = 106;
    pub const ECONNREFUSED: i32 = 107;
    pub const ECONNRESET: i32 = 108;
    pub const EDESTADDRREQ: i32 = 109;
    pub const EHOSTUNREACH: i32 = 110;
    pub const EINPROGRESS: i32 = 112;
    pub const EISCONN: i32 = 113;
    pub const ELOOP: i32 = 114;
    pub const EMSGSIZE: i32 = 115;
    pub const ENETDOWN: i32 = 116;
    pub const ENETRESET: i32 = 117;
    pub const ENETUNREACH: i32 = 118;
    pub const ENOBUFS: i32 = 119;
    pub const ENOPROTOOPT: i32 = 123;
    pub const ENOTCONN: i32 = 126;
    pub const ENOTSOCK: i32 = 128;
    pub const EOPNOTSUPP: i32 = 130;
    pub const EPROTONOSUPPORT: i32 = 135;
    pub const EPROTOTYPE: i32 = 136;
    pub const ETIMEDOUT: i32 = 138;
    pub const EWOULDBLOCK: i32 = 140;
}

impl Errno {
    /// Every variant, in table order.
    pub const ALL: [Errno; 34] = [
        Errno::Intr,
        Errno::BadF,
        Errno::Acces,
        Errno::Fault,
        Errno::Inval,
        Errno::MFile,
        Errno::WouldBlock,
        Errno::InProgress,
        Errno::Already,
        Errno::NotSock,
        Errno::DestAddrReq,
        Errno::MsgSize,
        Errno::ProtoType,
        Errno::NoProtoOpt,
        Errno::ProtoNoSupport,
        Errno::OpNotSupp,
        Errno::AfNoSupport,
        Errno::AddrInUse,
        Errno::AddrNotAvail,
        Errno::NetDown,
        Errno::NetUnreach,
        Errno::NetReset,
        Errno::ConnAborted,
        Errno::ConnReset,
        Errno::NoBufs,
        Errno::IsConn,
        Errno::NotConn,
        Errno::TimedOut,
        Errno::ConnRefused,
        Errno::Loop,
        Errno::NameTooLong,
        Errno::HostUnreach,
        Errno::NotEmpty,
        Errno::VerNotSupported,
    ];

    /// The integer this code has on the build platform.
    pub fn code(&self) -> i32 {
        match self {
            Errno::Intr => codes::EINTR,
            Errno::BadF => codes::EBADF,
            Errno::Acces => codes::EACCES,
            Errno::Fault => codes::EFAULT,
            Errno::Inval => codes::EINVAL,
            Errno::MFile => codes::EMFILE,
            Errno::WouldBlock => codes::EWOULDBLOCK,
            Errno::InProgress => codes::EINPROGRESS,
            Errno::Already => codes::EALREADY,
            Errno::NotSock => codes::ENOTSOCK,
            Errno::DestAddrReq => codes::EDESTADDRREQ,
            Errno::MsgSize => codes::EMSGSIZE,
            Errno::ProtoType => codes::EPROTOTYPE,
            Errno::NoProtoOpt => codes::ENOPROTOOPT,
            Errno::ProtoNoSupport => codes::EPROTONOSUPPORT,
            Errno::OpNotSupp => codes::EOPNOTSUPP,
            Errno::AfNoSupport => codes::EAFNOSUPPORT,
            Errno::AddrInUse => codes::EADDRINUSE,
            Errno::AddrNotAvail => codes::EADDRNOTAVAIL,
            Errno::NetDown => codes::ENETDOWN,
            Errno::NetUnreach => codes::ENETUNREACH,
            Errno::NetReset => codes::ENETRESET,
            Errno::ConnAborted => codes::ECONNABORTED,
            Errno::ConnReset => codes::ECONNRESET,
            Errno::NoBufs => codes::ENOBUFS,
            Errno::IsConn => codes::EISCONN,
            Errno::NotConn => codes::ENOTCONN,
            Errno::TimedOut => codes::ETIMEDOUT,
            Errno::ConnRefused => codes::ECONNREFUSED,
            Errno::Loop => codes::ELOOP,
            Errno::NameTooLong => codes::ENAMETOOLONG,
            Errno::HostUnreach => codes::EHOSTUNREACH,
            Errno::NotEmpty => codes::ENOTEMPTY,
            Errno::VerNotSupported => VERSION_NOT_SUPPORTED,
        }
    }

    /// Inverse of [`Errno::code`]. Returns `None` for the sentinel and for
    /// codes outside the vocabulary.
    pub fn from_code(code: i32) -> Option<Errno> {
        Errno::ALL.iter().copied().find(|errno| errno.code() == code)
    }

    /// Best-effort mapping for I/O errors that carry no OS code.
    pub fn from_io_kind(kind: io::ErrorKind) -> Option<Errno> {
        use io::ErrorKind;
        match kind {
            ErrorKind::Interrupted => Some(Errno::Intr),
            ErrorKind::PermissionDenied => Some(Errno::Acces),
            ErrorKind::InvalidInput => Some(Errno::Inval),
            ErrorKind::WouldBlock => Some(Errno::WouldBlock),
            ErrorKind::ConnectionRefused => Some(Errno::ConnRefused),
            ErrorKind::ConnectionReset => Some(Errno::ConnReset),
            ErrorKind::ConnectionAborted => Some(Errno::ConnAborted),
            ErrorKind::NotConnected => Some(Errno::NotConn),
            ErrorKind::AddrInUse => Some(Errno::AddrInUse),
            ErrorKind::AddrNotAvailable => Some(Errno::AddrNotAvail),
            ErrorKind::TimedOut => Some(Errno::TimedOut),
            ErrorKind::Unsupported => Some(Errno::OpNotSupp),
            _ => None,
        }
    }
}

/// Winsock error codes and the vocabulary entry each one maps to.
///
/// Lookup is first-match; native codes are unique.
pub static WINSOCK_ERRNO_TABLE: &[(i32, Errno)] = &[
    (10004, Errno::Intr),           // WSAEINTR
    (10009, Errno::BadF),           // WSAEBADF
    (10013, Errno::Acces),          // WSAEACCES
    (10014, Errno::Fault),          // WSAEFAULT
    (10022, Errno::Inval),          // WSAEINVAL
    (10024, Errno::MFile),          // WSAEMFILE
    (10035, Errno::WouldBlock),     // WSAEWOULDBLOCK
    (10036, Errno::InProgress),     // WSAEINPROGRESS
    (10037, Errno::Already),        // WSAEALREADY
    (10038, Errno::NotSock),        // WSAENOTSOCK
    (10039, Errno::DestAddrReq),    // WSAEDESTADDRREQ
    (10040, Errno::MsgSize),        // WSAEMSGSIZE
    (10041, Errno::ProtoType),      // WSAEPROTOTYPE
    (10042, Errno::NoProtoOpt),     // WSAENOPROTOOPT
    (10043, Errno::ProtoNoSupport), // WSAEPROTONOSUPPORT
    (10045, Errno::OpNotSupp),      // WSAEOPNOTSUPP
    (10047, Errno::AfNoSupport),    // WSAEAFNOSUPPORT
    (10048, Errno::AddrInUse),      // WSAEADDRINUSE
    (10049, Errno::AddrNotAvail),   // WSAEADDRNOTAVAIL
    (10050, Errno::NetDown),        // WSAENETDOWN
    (10051, Errno::NetUnreach),     // WSAENETUNREACH
    (10052, Errno::NetReset),       // WSAENETRESET
    (10053, Errno::ConnAborted),    // WSAECONNABORTED
    (10054, Errno::ConnReset),      // WSAECONNRESET
    (10055, Errno::NoBufs),         // WSAENOBUFS
    (10056, Errno::IsConn),         // WSAEISCONN
    (10057, Errno::NotConn),        // WSAENOTCONN
    (10060, Errno::TimedOut),       // WSAETIMEDOUT
    (10061, Errno::ConnRefused),    // WSAECONNREFUSED
    (10062, Errno::Loop),           // WSAELOOP
    (10063, Errno::NameTooLong),    // WSAENAMETOOLONG
    (10065, Errno::HostUnreach),    // WSAEHOSTUNREACH
    (10066, Errno::NotEmpty),       // WSAENOTEMPTY
    (VERSION_NOT_SUPPORTED, Errno::VerNotSupported),
];

/// Look `native` up in `table`, returning [`UNMAPPED`] when absent.
pub fn normalize_with(table: &[(i32, Errno)], native: i32) -> i32 {
    table
        .iter()
        .find(|(code, _)| *code == native)
        .map_or(UNMAPPED, |(_, errno)| errno.code())
}

/// Normalize a native socket error code for the build platform.
///
/// Unix errno values already are the vocabulary, so this is the identity
/// there.
#[cfg(windows)]
pub fn normalize(native: i32) -> i32 {
    normalize_with(WINSOCK_ERRNO_TABLE, native)
}

/// Normalize a native socket error code for the build platform.
///
/// Unix errno values already are the vocabulary, so this is the identity
/// there.
#[cfg(not(windows))]
pub fn normalize(native: i32) -> i32 {
    native
}

/// The raw error left by the last failed platform call on this thread.
pub fn last_error() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// [`last_error`], normalized.
pub fn last_error_normalized() -> i32 {
    normalize(last_error())
}

/// Human-readable message for a native error code, as the platform words it.
pub fn describe_error(native: i32) -> String {
    io::Error::from_raw_os_error(native).to_string()
}
