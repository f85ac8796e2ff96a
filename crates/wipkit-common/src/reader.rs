//! Binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that efficiently
//! reads little-endian data from a byte slice without copying.

use zerocopy::FromBytes;

use crate::{Error, Result};

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// Project files nest streams inside payloads, so a reader can be created
/// over a sub-slice with a `base` offset. Errors always report the absolute
/// offset within the original file, not the position within the sub-slice.
///
/// # Example
///
/// ```
/// use wipkit_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_u32().unwrap(), 0x08070605);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
    base: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            base: 0,
        }
    }

    /// Create a reader over a slice that starts at `base` in the original file.
    #[inline]
    pub const fn with_base(data: &'a [u8], base: usize) -> Self {
        Self {
            data,
            position: 0,
            base,
        }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the current absolute offset (base + position).
    #[inline]
    pub const fn offset(&self) -> usize {
        self.base + self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                offset: self.offset(),
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian u64.
    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.read_bytes(8)?;
        Ok(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Read a byte run prefixed by its u32 little-endian length.
    ///
    /// This is the layout used both for tag names and for the words of a
    /// string payload.
    pub fn read_prefixed(&mut self) -> Result<&'a [u8]> {
        let length = self.read_u32()? as usize;
        self.read_bytes(length)
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let offset = self.offset();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            offset,
            needed: size,
            available: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, // u64: 0xFFFFFFFF
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_u64().unwrap(), 0xFFFFFFFF);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_prefixed() {
        let data = [0x03, 0x00, 0x00, 0x00, b'a', b'b', b'c', 0x00, 0x00, 0x00, 0x00];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_prefixed().unwrap(), b"abc");
        assert_eq!(reader.read_prefixed().unwrap(), b"");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_remaining_bytes() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut reader = BinaryReader::new(&data);

        reader.read_bytes(3).unwrap();
        assert_eq!(reader.remaining_bytes(), &[0x04, 0x05]);
        reader.read_bytes(2).unwrap();
        assert!(reader.remaining_bytes().is_empty());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let reader = BinaryReader::new(&data);

        assert_eq!(reader.peek_bytes(2).unwrap(), &[0x01, 0x02]);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_eof_reports_absolute_offset() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mut reader = BinaryReader::with_base(&data, 100);

        reader.read_u32().unwrap();
        match reader.read_u32() {
            Err(Error::UnexpectedEof {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 104);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
    }

    #[test]
    fn test_prefixed_length_past_end() {
        let data = [0x10, 0x00, 0x00, 0x00, b'x'];
        let mut reader = BinaryReader::new(&data);

        let err = reader.read_prefixed().unwrap_err();
        assert_eq!(err.offset(), Some(4));
    }
}
