//! Chunked transfer engine.
//!
//! A single `recv`/`send` call may move fewer bytes than asked for. The
//! functions here loop over such short transfers until the buffer is
//! exhausted, the peer closes, a call fails, or (for receives) a
//! caller-supplied [`ProgressPredicate`] says enough data has arrived.
//!
//! Results follow the integer convention of the underlying calls:
//! `Ok(n)` with `n == buffer.len()` is complete, `Ok(0)` is an orderly close
//! (receive) or a zero-length send, and `Err` carries the failure. Nothing is
//! retried and nothing is buffered between calls.

use crate::base::socketerror::SocketError;
use crate::socket::handle::SocketHandle;
use crate::socket::stream::{MsgFlags, StreamEndpoint};

/// Largest payload [`send_text`] accepts: the signed 32-bit length contract.
pub const MAX_TRANSFER_LEN: usize = i32::MAX as usize;

/// Decides, after each received chunk, whether to stop reading.
///
/// Arguments are the whole receive buffer, the number of bytes accumulated so
/// far, and the offset and length of the chunk that just arrived. Only ever
/// called after a chunk of at least one byte.
pub trait ProgressPredicate {
    fn is_done(
        &mut self,
        buf: &[u8],
        accumulated: usize,
        chunk_offset: usize,
        chunk_len: usize,
    ) -> bool;
}

impl<F> ProgressPredicate for F
where
    F: FnMut(&[u8], usize, usize, usize) -> bool,
{
    fn is_done(
        &mut self,
        buf: &[u8],
        accumulated: usize,
        chunk_offset: usize,
        chunk_len: usize,
    ) -> bool {
        self(buf, accumulated, chunk_offset, chunk_len)
    }
}

/// Stops once `delimiter` is present in the received data.
///
/// Each call only scans the new chunk plus `delimiter.len() - 1` bytes before
/// it, so a delimiter split across two chunks is still found.
#[derive(Debug, Clone, Copy)]
pub struct DelimiterPredicate<'d> {
    delimiter: &'d [u8],
}

impl<'d> DelimiterPredicate<'d> {
    pub fn new(delimiter: &'d [u8]) -> Self {
        Self { delimiter }
    }

    /// End of an HTTP header block.
    pub fn http_headers() -> DelimiterPredicate<'static> {
        DelimiterPredicate::new(b"\r\n\r\n")
    }
}

impl ProgressPredicate for DelimiterPredicate<'_> {
    fn is_done(&mut self, buf: &[u8], accumulated: usize, chunk_offset: usize, _: usize) -> bool {
        if self.delimiter.is_empty() {
            return true;
        }
        let start = chunk_offset.saturating_sub(self.delimiter.len() - 1);
        buf[start..accumulated]
            .windows(self.delimiter.len())
            .any(|window| window == self.delimiter)
    }
}

/// Receive into `buf` until it is full, the peer closes, a call fails, or
/// `predicate` reports done.
///
/// Returns the accumulated length when full or when the predicate fires.
/// An orderly close returns `Ok(0)` even if earlier chunks arrived; those
/// bytes stay in `buf`.
pub fn receive_until<E: StreamEndpoint>(
    handle: &mut SocketHandle<'_, E>,
    buf: &mut [u8],
    flags: MsgFlags,
    mut predicate: Option<&mut dyn ProgressPredicate>,
) -> Result<usize, SocketError> {
    let capacity = buf.len();
    let mut len = 0;

    while len < capacity {
        let n = handle.recv_chunk(&mut buf[len..], flags)?;
        if n == 0 {
            tracing::trace!(accumulated = len, "peer closed during receive");
            return Ok(0);
        }
        let chunk_offset = len;
        len += n;
        tracing::trace!(chunk_offset, chunk_len = n, accumulated = len, "received chunk");

        if let Some(predicate) = predicate.as_mut() {
            if predicate.is_done(buf, len, chunk_offset, n) {
                break;
            }
        }
    }

    Ok(len)
}

/// Send all of `buf`, looping over short writes.
///
/// Returns `buf.len()` on success. A send call that transmits nothing yields
/// `Ok(0)`; callers detect incompleteness by comparing against `buf.len()`.
pub fn send_all<E: StreamEndpoint>(
    handle: &mut SocketHandle<'_, E>,
    buf: &[u8],
    flags: MsgFlags,
) -> Result<usize, SocketError> {
    let mut len = 0;

    while len < buf.len() {
        let n = handle.send_chunk(&buf[len..], flags)?;
        if n == 0 {
            tracing::trace!(sent = len, total = buf.len(), "send made no progress");
            return Ok(0);
        }
        len += n;
        tracing::trace!(chunk_len = n, sent = len, total = buf.len(), "sent chunk");
    }

    Ok(len)
}

/// Send a text payload with no flags.
pub fn send_text<E: StreamEndpoint>(
    handle: &mut SocketHandle<'_, E>,
    text: &str,
) -> Result<usize, SocketError> {
    check_transfer_len(text.len())?;
    send_all(handle, text.as_bytes(), MsgFlags::NONE)
}

fn check_transfer_len(len: usize) -> Result<(), SocketError> {
    if len > MAX_TRANSFER_LEN {
        return Err(SocketError::PayloadTooLarge(len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::errno::Errno;
    use crate::socket::lifecycle::startup;
    use crate::socket::scripted::{Recv, ScriptedEndpoint};
    use std::io;

    #[test]
    fn test_receive_fills_buffer_across_short_reads() {
        let ctx = startup().unwrap();
        let endpoint =
            ScriptedEndpoint::with_recvs([Recv::Data(b"ab"), Recv::Data(b"cde"), Recv::Data(b"fgh")]);
        let mut handle = ctx.adopt(endpoint);

        let mut buf = [0u8; 6];
        let n = receive_until(&mut handle, &mut buf, MsgFlags::NONE, None).unwrap();

        assert_eq!(n, 6);
        assert_eq!(&buf, b"abcdef");
        // the unread "gh" is left for the next call
        assert_eq!(handle.get_ref().recvs.len(), 1);
    }

    #[test]
    fn test_receive_zero_capacity_does_not_read() {
        let ctx = startup().unwrap();
        let mut handle = ctx.adopt(ScriptedEndpoint::with_recvs([Recv::Data(b"x")]));

        let n = receive_until(&mut handle, &mut [], MsgFlags::NONE, None).unwrap();

        assert_eq!(n, 0);
        assert_eq!(handle.get_ref().recv_calls, 0);
    }

    #[test]
    fn test_receive_eof_returns_zero_after_partial_data() {
        let ctx = startup().unwrap();
        let mut handle = ctx.adopt(ScriptedEndpoint::with_recvs([Recv::Data(b"part"), Recv::Eof]));

        let mut buf = [0u8; 16];
        let n = receive_until(&mut handle, &mut buf, MsgFlags::NONE, None).unwrap();

        assert_eq!(n, 0);
        assert_eq!(&buf[..4], b"part");
    }

    #[test]
    fn test_receive_failure_is_not_retried() {
        let ctx = startup().unwrap();
        let failure = io::Error::from(io::ErrorKind::Interrupted);
        let mut handle = ctx.adopt(ScriptedEndpoint::with_recvs([
            Recv::Data(b"ok"),
            Recv::Fail(failure),
            Recv::Data(b"never"),
        ]));

        let mut buf = [0u8; 16];
        let err = receive_until(&mut handle, &mut buf, MsgFlags::NONE, None).unwrap_err();

        assert_eq!(err.errno(), Some(Errno::Intr));
        assert_eq!(err.as_i32(), -1);
        assert_eq!(handle.get_ref().recv_calls, 2);
    }

    #[test]
    fn test_predicate_sees_each_chunk() {
        let ctx = startup().unwrap();
        let mut handle = ctx.adopt(ScriptedEndpoint::with_recvs([
            Recv::Data(b"one"),
            Recv::Data(b"two"),
            Recv::Data(b"three"),
        ]));

        let mut calls = Vec::new();
        let mut record = |_: &[u8], total: usize, offset: usize, len: usize| {
            calls.push((total, offset, len));
            false
        };
        let mut buf = [0u8; 11];
        let n = receive_until(&mut handle, &mut buf, MsgFlags::NONE, Some(&mut record)).unwrap();

        assert_eq!(n, 11);
        assert_eq!(calls, vec![(3, 0, 3), (6, 3, 3), (11, 6, 5)]);
    }

    #[test]
    fn test_predicate_not_called_on_eof() {
        let ctx = startup().unwrap();
        let mut handle = ctx.adopt(ScriptedEndpoint::with_recvs([Recv::Eof]));

        let mut calls = 0;
        let mut count = |_: &[u8], _: usize, _: usize, _: usize| {
            calls += 1;
            false
        };
        let mut buf = [0u8; 8];
        receive_until(&mut handle, &mut buf, MsgFlags::NONE, Some(&mut count)).unwrap();
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_predicate_not_called_on_failure() {
        let ctx = startup().unwrap();
        let mut handle = ctx.adopt(ScriptedEndpoint::with_recvs([
            Recv::Data(b"x"),
            Recv::Fail(io::Error::from(io::ErrorKind::ConnectionReset)),
        ]));

        let mut calls = Vec::new();
        let mut record = |_: &[u8], total: usize, offset: usize, len: usize| {
            calls.push((total, offset, len));
            false
        };
        let mut buf = [0u8; 8];
        let result = receive_until(&mut handle, &mut buf, MsgFlags::NONE, Some(&mut record));

        assert!(result.is_err());
        assert_eq!(calls, vec![(1, 0, 1)]);
        assert_eq!(handle.get_ref().recv_calls, 2);
    }

    #[test]
    fn test_delimiter_spanning_chunks_stops_early() {
        let ctx = startup().unwrap();
        let mut handle = ctx.adopt(ScriptedEndpoint::with_recvs([
            Recv::Data(b"HTTP/1.0 200 OK\r\n"),
            Recv::Data(b"Server: x\r"),
            Recv::Data(b"\n\r"),
            Recv::Data(b"\nbody"),
        ]));

        let mut predicate = DelimiterPredicate::http_headers();
        let mut buf = [0u8; 4096];
        let n = receive_until(&mut handle, &mut buf, MsgFlags::NONE, Some(&mut predicate)).unwrap();

        // stops on the chunk that completes "\r\n\r\n", body included in that chunk
        assert_eq!(n, 17 + 10 + 2 + 5);
        assert_eq!(handle.get_ref().recv_calls, 4);
        assert!(n < buf.len());
    }

    #[test]
    fn test_delimiter_predicate_ignores_partial_match() {
        let mut predicate = DelimiterPredicate::new(b"\r\n\r\n");
        let buf = b"abc\r\n\r";
        assert!(!predicate.is_done(buf, buf.len(), 3, 3));
        let buf = b"abc\r\n\r\n";
        assert!(predicate.is_done(buf, buf.len(), 6, 1));
    }

    #[test]
    fn test_send_all_loops_over_short_writes() {
        let ctx = startup().unwrap();
        let mut handle = ctx.adopt(ScriptedEndpoint::with_send_limits([Ok(3), Ok(1), Ok(100)]));

        let n = send_all(&mut handle, b"hello world", MsgFlags::NONE).unwrap();

        assert_eq!(n, 11);
        assert_eq!(handle.get_ref().sent, b"hello world");
        assert_eq!(handle.get_ref().send_calls, 3);
    }

    #[test]
    fn test_send_all_zero_write_returns_zero() {
        let ctx = startup().unwrap();
        let mut handle = ctx.adopt(ScriptedEndpoint::with_send_limits([Ok(2), Ok(0)]));

        let n = send_all(&mut handle, b"abcdef", MsgFlags::NONE).unwrap();

        assert_eq!(n, 0);
        assert_eq!(handle.get_ref().sent, b"ab");
    }

    #[cfg(unix)]
    #[test]
    fn test_send_all_failure_carries_normalized_code() {
        let ctx = startup().unwrap();
        let reset = io::Error::from_raw_os_error(Errno::ConnReset.code());
        let mut handle = ctx.adopt(ScriptedEndpoint::with_send_limits([Ok(1), Err(reset)]));

        let err = send_all(&mut handle, b"abc", MsgFlags::NONE).unwrap_err();

        assert_eq!(err.native_code(), Some(Errno::ConnReset.code()));
        assert_eq!(err.errno(), Some(Errno::ConnReset));
    }

    #[test]
    fn test_send_all_empty_buffer_is_complete() {
        let ctx = startup().unwrap();
        let mut handle = ctx.adopt(ScriptedEndpoint::default());
        assert_eq!(send_all(&mut handle, b"", MsgFlags::NONE).unwrap(), 0);
        assert_eq!(handle.get_ref().send_calls, 0);
    }

    #[test]
    fn test_send_text_forwards_length() {
        let ctx = startup().unwrap();
        let mut handle = ctx.adopt(ScriptedEndpoint::default());
        assert_eq!(send_text(&mut handle, "GET / HTTP/1.0\r\n").unwrap(), 16);
    }

    #[test]
    fn test_transfer_len_limit() {
        assert!(check_transfer_len(MAX_TRANSFER_LEN).is_ok());
        let err = check_transfer_len(MAX_TRANSFER_LEN + 1).unwrap_err();
        assert!(matches!(err, SocketError::PayloadTooLarge(n) if n == MAX_TRANSFER_LEN + 1));
    }

    /// Splits `data` into consecutive receive chunks sized by cycling `sizes`.
    fn split_into_recvs(data: &[u8], sizes: &[usize]) -> Vec<Recv> {
        let mut recvs = Vec::new();
        let mut rest = data;
        for &size in sizes.iter().cycle() {
            if rest.is_empty() {
                break;
            }
            let (chunk, tail) = rest.split_at(size.min(rest.len()));
            recvs.push(Recv::Bytes(chunk.to_vec()));
            rest = tail;
        }
        recvs
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const GUARD: u8 = 0xAA;

        fn capacity_for(data_len: usize) -> impl Strategy<Value = usize> {
            prop_oneof![Just(0usize), Just(1usize), Just(data_len), 0usize..2 * data_len + 2]
        }

        fn data_and_capacity() -> impl Strategy<Value = (Vec<u8>, usize)> {
            proptest::collection::vec(any::<u8>(), 0..512)
                .prop_flat_map(|data| {
                    let len = data.len();
                    (Just(data), capacity_for(len))
                })
        }

        proptest! {
            #[test]
            fn prop_receive_never_exceeds_capacity(
                (data, capacity) in data_and_capacity(),
                sizes in proptest::collection::vec(1usize..64, 1..16),
            ) {
                let ctx = startup().unwrap();
                let mut handle =
                    ctx.adopt(ScriptedEndpoint::with_recvs(split_into_recvs(&data, &sizes)));

                let mut buf = vec![GUARD; capacity + 32];
                let n = receive_until(&mut handle, &mut buf[..capacity], MsgFlags::NONE, None)
                    .unwrap();

                prop_assert!(n <= capacity);
                prop_assert!(buf[capacity..].iter().all(|&b| b == GUARD));
                if data.len() >= capacity {
                    prop_assert_eq!(n, capacity);
                    prop_assert_eq!(&buf[..capacity], &data[..capacity]);
                } else {
                    // the peer closed before the buffer filled
                    prop_assert_eq!(n, 0);
                    prop_assert_eq!(&buf[..data.len()], &data[..]);
                }
            }

            #[test]
            fn prop_send_all_reproduces_input(
                data in proptest::collection::vec(any::<u8>(), 0..512),
                limits in proptest::collection::vec(1usize..64, 0..32),
            ) {
                let ctx = startup().unwrap();
                let mut handle =
                    ctx.adopt(ScriptedEndpoint::with_send_limits(limits.into_iter().map(Ok)));

                let n = send_all(&mut handle, &data, MsgFlags::NONE).unwrap();

                prop_assert_eq!(n, data.len());
                prop_assert_eq!(&handle.get_ref().sent, &data);
            }
        }
    }
}
