//! Exact-length sequential reads over a byte stream.
use crate::error::{DecodeError, Result};
use std::io::{ErrorKind, Read};

/// Owns the stream cursor and hands out whole blocks.
///
/// A block is either read in full, reported absent (zero bytes left), or
/// reported truncated. Partial blocks are never returned.
#[derive(Debug)]
pub struct StreamReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read exactly `n` bytes, or `None` if the stream is already exhausted.
    ///
    /// Running out after at least one byte is a [`DecodeError::TruncatedStream`].
    pub fn read_block(&mut self, n: usize, context: &'static str) -> Result<Option<Vec<u8>>> {
        let start = self.offset;
        let mut buf = vec![0u8; n];
        let mut filled = 0usize;
        while filled < n {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(k) => filled += k,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.offset += filled as u64;
        match filled {
            0 if n > 0 => Ok(None),
            f if f == n => Ok(Some(buf)),
            got => Err(DecodeError::TruncatedStream { context, offset: start, needed: n, got }),
        }
    }

    /// Read exactly `n` bytes inside a record; end of stream is truncation.
    pub fn read_exact(&mut self, n: usize, context: &'static str) -> Result<Vec<u8>> {
        let start = self.offset;
        self.read_block(n, context)?.ok_or(DecodeError::TruncatedStream {
            context,
            offset: start,
            needed: n,
            got: 0,
        })
    }
}
