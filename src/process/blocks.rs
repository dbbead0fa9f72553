use std::io::{self, ErrorKind, Read};

use crate::record::RECORD_LEN;

/// What a single fixed-size read produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Block {
    /// A complete record, now in the caller's buffer.
    Full,
    /// The stream ended after this many bytes of a record.
    Partial(usize),
    /// Clean end of stream on a record boundary.
    End,
}

/// Reads a byte stream one 309-byte record at a time.
pub struct BlockReader<R> {
    inner: R,
    bytes_read: u64,
}

impl<R: Read> BlockReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes_read: 0,
        }
    }

    /// Fill `buf` with the next record. Short reads are retried until the
    /// buffer is full or the stream is exhausted.
    pub fn read_block(&mut self, buf: &mut [u8; RECORD_LEN]) -> io::Result<Block> {
        let mut filled = 0;
        while filled < RECORD_LEN {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        self.bytes_read += filled as u64;
        Ok(match filled {
            0 => Block::End,
            RECORD_LEN => Block::Full,
            n => Block::Partial(n),
        })
    }

    /// Total bytes consumed so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}
