//! Per-handle socket configuration.

use socket2::Socket;
use std::io;
use std::time::Duration;

/// Options applied to a handle before driving transfers through it.
///
/// Every field is optional; `None` leaves the socket's current setting
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocketOptions {
    /// Upper bound on a single blocking receive call.
    pub read_timeout: Option<Duration>,
    /// Upper bound on a single blocking send call.
    pub write_timeout: Option<Duration>,
    /// Disable Nagle's algorithm (TCP only).
    pub nodelay: Option<bool>,
    /// `SO_LINGER` timeout used when the handle is released.
    pub linger: Option<Duration>,
    /// Enable `SO_KEEPALIVE`.
    pub keepalive: Option<bool>,
}

impl SocketOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set write timeout.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    pub fn nodelay(mut self, enable: bool) -> Self {
        self.nodelay = Some(enable);
        self
    }

    pub fn linger(mut self, timeout: Duration) -> Self {
        self.linger = Some(timeout);
        self
    }

    pub fn keepalive(mut self, enable: bool) -> Self {
        self.keepalive = Some(enable);
        self
    }

    pub(crate) fn apply(&self, sock: &Socket) -> io::Result<()> {
        if let Some(timeout) = self.read_timeout {
            sock.set_read_timeout(Some(timeout))?;
        }
        if let Some(timeout) = self.write_timeout {
            sock.set_write_timeout(Some(timeout))?;
        }
        if let Some(enable) = self.nodelay {
            sock.set_nodelay(enable)?;
        }
        if let Some(timeout) = self.linger {
            sock.set_linger(Some(timeout))?;
        }
        if let Some(enable) = self.keepalive {
            sock.set_keepalive(enable)?;
        }
        tracing::debug!(options = ?self, "applied socket options");
        Ok(())
    }
}
