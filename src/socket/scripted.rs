//! In-memory endpoint with a scripted sequence of call results.

use crate::socket::stream::{MsgFlags, StreamEndpoint};
use std::collections::VecDeque;
use std::io;

/// One scripted receive result.
pub(crate) enum Recv {
    Data(&'static [u8]),
    Bytes(Vec<u8>),
    Eof,
    Fail(io::Error),
}

#[derive(Default)]
pub(crate) struct ScriptedEndpoint {
    pub recvs: VecDeque<Recv>,
    /// Per-call send limits; `Err` fails the call. Once empty, sends accept everything.
    pub send_limits: VecDeque<io::Result<usize>>,
    pub sent: Vec<u8>,
    pub recv_calls: usize,
    pub send_calls: usize,
    pub shutdown_error: Option<io::Error>,
    pub release_error: Option<io::Error>,
}

impl ScriptedEndpoint {
    pub fn with_recvs(recvs: impl IntoIterator<Item = Recv>) -> Self {
        Self {
            recvs: recvs.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_send_limits(limits: impl IntoIterator<Item = io::Result<usize>>) -> Self {
        Self {
            send_limits: limits.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl StreamEndpoint for ScriptedEndpoint {
    fn recv_chunk(&mut self, buf: &mut [u8], _flags: MsgFlags) -> io::Result<usize> {
        self.recv_calls += 1;
        match self.recvs.pop_front() {
            None | Some(Recv::Eof) => Ok(0),
            Some(Recv::Fail(e)) => Err(e),
            Some(Recv::Data(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.recvs.push_front(Recv::Data(&data[n..]));
                }
                Ok(n)
            }
            Some(Recv::Bytes(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.recvs.push_front(Recv::Bytes(data.split_off(n)));
                }
                Ok(n)
            }
        }
    }

    fn send_chunk(&mut self, buf: &[u8], _flags: MsgFlags) -> io::Result<usize> {
        self.send_calls += 1;
        let n = match self.send_limits.pop_front() {
            None => buf.len(),
            Some(Err(e)) => return Err(e),
            Some(Ok(limit)) => limit.min(buf.len()),
        };
        self.sent.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        match self.shutdown_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn release(self) -> io::Result<()> {
        match self.release_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
