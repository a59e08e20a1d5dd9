use crate::base::errno::{self, Errno, UNMAPPED};
use std::io;
use thiserror::Error;

/// Raw value the integer surface reports for any failed call.
pub const RAW_FAILURE: i32 = -1;

#[derive(Debug, Error)]
pub enum SocketError {
    /// A platform call failed with an OS error code.
    #[error("{source}")]
    Os {
        #[source]
        source: io::Error,
        native: i32,
        normalized: i32,
    },

    /// A failure with no OS error code attached.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    #[error("Payload of {0} bytes exceeds the signed transfer length limit")]
    PayloadTooLarge(usize),

    #[error("Socket subsystem startup failed: {source}")]
    Startup {
        #[source]
        source: io::Error,
        normalized: i32,
    },

    #[error("Socket subsystem teardown failed: {source}")]
    Teardown {
        #[source]
        source: io::Error,
        normalized: i32,
    },
}

impl SocketError {
    /// Wrap an I/O error, normalizing its OS code with `normalize`.
    pub fn from_io_with(source: io::Error, normalize: impl Fn(i32) -> i32) -> Self {
        match source.raw_os_error() {
            Some(native) => SocketError::Os {
                source,
                native,
                normalized: normalize(native),
            },
            None => SocketError::Io(source),
        }
    }

    /// A failed subsystem registration, normalized the same way as the
    /// platform that reported it.
    pub fn startup_with(source: io::Error, normalize: impl Fn(i32) -> i32) -> Self {
        let normalized = source.raw_os_error().map_or(UNMAPPED, normalize);
        SocketError::Startup { source, normalized }
    }

    pub fn teardown_with(source: io::Error, normalize: impl Fn(i32) -> i32) -> Self {
        let normalized = source.raw_os_error().map_or(UNMAPPED, normalize);
        SocketError::Teardown { source, normalized }
    }

    /// The platform-native error code, if one was reported.
    pub fn native_code(&self) -> Option<i32> {
        match self {
            SocketError::Os { native, .. } => Some(*native),
            SocketError::Startup { source, .. } | SocketError::Teardown { source, .. } => {
                source.raw_os_error()
            }
            SocketError::Io(_) | SocketError::PayloadTooLarge(_) => None,
        }
    }

    /// The normalized code, or [`UNMAPPED`] when none applies.
    pub fn normalized_code(&self) -> i32 {
        match self {
            SocketError::Os { normalized, .. }
            | SocketError::Startup { normalized, .. }
            | SocketError::Teardown { normalized, .. } => *normalized,
            SocketError::Io(e) => {
                Errno::from_io_kind(e.kind()).map_or(UNMAPPED, |mapped| mapped.code())
            }
            SocketError::PayloadTooLarge(_) => Errno::MsgSize.code(),
        }
    }

    pub fn errno(&self) -> Option<Errno> {
        Errno::from_code(self.normalized_code())
    }

    /// The `io::ErrorKind` of the underlying failure.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            SocketError::Os { source, .. }
            | SocketError::Io(source)
            | SocketError::Startup { source, .. }
            | SocketError::Teardown { source, .. } => source.kind(),
            SocketError::PayloadTooLarge(_) => io::ErrorKind::InvalidInput,
        }
    }

    /// The value the C-style integer surface returns for this failure.
    pub fn as_i32(&self) -> i32 {
        RAW_FAILURE
    }
}

impl From<io::Error> for SocketError {
    fn from(source: io::Error) -> Self {
        SocketError::from_io_with(source, errno::normalize)
    }
}
