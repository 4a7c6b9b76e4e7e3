// Copyright (c) 2023 The Sia Foundation

//! Bounded staging buffer for streamed transaction data

use core::ops::Range;

use byteorder::{ByteOrder, LittleEndian};
use zeroize::Zeroize;

use super::{
    error::{Error, Interrupt},
    BUFF_LEN,
};

/// Staging buffer with a read offset.
///
/// Reads advance `pos` and fail with [Interrupt::Partial] when
/// insufficient data is buffered, in which case the caller rewinds
/// and retries once more data has been pushed. Bytes before `pos`
/// belong to the element being decoded until [Cursor::compact] is called.
pub struct Cursor {
    buff: [u8; BUFF_LEN],
    len: usize,
    pos: usize,
}

impl Cursor {
    /// Create a new empty cursor
    pub const fn new() -> Self {
        Self {
            buff: [0u8; BUFF_LEN],
            len: 0,
            pos: 0,
        }
    }

    /// Append data to the buffer, resetting the read offset
    pub fn push(&mut self, data: &[u8]) -> Result<(), Error> {
        if self.len + data.len() > BUFF_LEN {
            return Err(Error::Capacity);
        }

        self.buff[self.len..][..data.len()].copy_from_slice(data);
        self.len += data.len();
        self.pos = 0;

        Ok(())
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current read offset
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Check that at least `n` unread bytes are available
    pub(crate) fn need_at_least(&self, n: u64) -> Result<(), Interrupt> {
        if ((self.len - self.pos) as u64) < n {
            return Err(Interrupt::Partial);
        }
        Ok(())
    }

    /// Skip `n` bytes
    pub(crate) fn seek(&mut self, n: u64) -> Result<(), Interrupt> {
        self.need_at_least(n)?;
        self.pos += n as usize;
        Ok(())
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, Interrupt> {
        self.need_at_least(1)?;
        let v = self.buff[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64, Interrupt> {
        self.need_at_least(8)?;
        let v = LittleEndian::read_u64(&self.buff[self.pos..]);
        self.pos += 8;
        Ok(v)
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Interrupt> {
        self.need_at_least(N as u64)?;
        let mut d = [0u8; N];
        d.copy_from_slice(&self.buff[self.pos..][..N]);
        self.pos += N;
        Ok(d)
    }

    /// Read `n` bytes, returning their range within the buffer
    pub(crate) fn read_range(&mut self, n: u64) -> Result<Range<usize>, Interrupt> {
        let start = self.pos;
        self.seek(n)?;
        Ok(start..self.pos)
    }

    /// Fetch previously read bytes
    pub(crate) fn bytes(&self, r: Range<usize>) -> &[u8] {
        &self.buff[r]
    }

    /// Bytes consumed by the current element
    pub fn consumed(&self) -> &[u8] {
        &self.buff[..self.pos]
    }

    /// Return to the start of the current element
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Drop consumed bytes, moving the unread tail to the front of the buffer
    pub fn compact(&mut self) {
        self.buff.copy_within(self.pos..self.len, 0);
        self.len -= self.pos;
        self.pos = 0;
    }

    /// Check whether the buffer is full, so a partial element can never complete
    pub fn is_exhausted(&self) -> bool {
        self.len == BUFF_LEN
    }

    /// Free space available for the next [Cursor::push]
    pub fn available(&self) -> usize {
        BUFF_LEN - self.len
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        self.buff.zeroize();
    }
}
