//! Tag record reading.
//!
//! A record is laid out as:
//!
//! ```text
//! [0:4)            u32 LE   name length N
//! [4:4+N)          bytes    name
//! [4+N:8+N)        u32 LE   type code
//! [8+N:16+N)       u64 LE   start
//! [16+N:24+N)      u64 LE   end
//! [24+N:24+N+size) bytes    payload, size = end - start
//! ```
//!
//! `start` and `end` are offsets into the payload region of the original
//! file. They only give the payload length; the payload always follows the
//! header directly.

use wipkit_common::BinaryReader;
use zerocopy::byteorder::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{Error, Result};

/// Fixed-size part of a record that follows the name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
)]
#[repr(C)]
pub struct RecordHeader {
    /// Type code selecting the payload decoding rule.
    pub type_code: U32,
    /// Payload start offset.
    pub start: U64,
    /// Payload end offset.
    pub end: U64,
}

impl RecordHeader {
    /// Size of the header in bytes.
    pub const LEN: usize = 20;

    /// Create a header from native values.
    pub fn new(type_code: u32, start: u64, end: u64) -> Self {
        Self {
            type_code: U32::new(type_code),
            start: U64::new(start),
            end: U64::new(end),
        }
    }
}

/// Smallest possible record: empty name, header, empty payload.
pub const MIN_RECORD_LEN: usize = 4 + RecordHeader::LEN;

/// One record borrowed from the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRecord<'a> {
    /// Absolute offset of the record's first byte.
    pub offset: usize,
    /// Raw name bytes (Windows-1252, not yet decoded).
    pub name: &'a [u8],
    /// Type code, start and end.
    pub header: RecordHeader,
    /// Payload bytes.
    pub payload: &'a [u8],
}

impl<'a> TagRecord<'a> {
    /// Read one record at the reader's position.
    ///
    /// On success the reader sits on the byte right after the payload.
    pub fn read(reader: &mut BinaryReader<'a>) -> Result<Self> {
        let offset = reader.offset();
        let name = reader.read_prefixed()?;
        let header: RecordHeader = reader.read_struct()?;

        let (start, end) = (header.start.get(), header.end.get());
        if end < start {
            return Err(Error::MalformedRecord { offset, start, end });
        }

        // Sizes beyond the address space can never be satisfied by the buffer.
        let size = usize::try_from(end - start).unwrap_or(usize::MAX);
        let payload = reader.read_bytes(size)?;

        Ok(Self {
            offset,
            name,
            header,
            payload,
        })
    }

    /// The raw type code.
    #[inline]
    pub fn type_code(&self) -> u32 {
        self.header.type_code.get()
    }

    /// The declared start offset.
    #[inline]
    pub fn start(&self) -> u64 {
        self.header.start.get()
    }

    /// The declared end offset.
    #[inline]
    pub fn end(&self) -> u64 {
        self.header.end.get()
    }

    /// Absolute offset of the first payload byte.
    #[inline]
    pub fn payload_offset(&self) -> usize {
        self.offset + 4 + self.name.len() + RecordHeader::LEN
    }

    /// Total bytes consumed by this record.
    #[inline]
    pub fn consumed(&self) -> usize {
        4 + self.name.len() + RecordHeader::LEN + self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode(name: &[u8], header: &RecordHeader, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(name.len() as u32).to_le_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(std::mem::size_of::<RecordHeader>(), RecordHeader::LEN);

        let header = RecordHeader::new(9, 0x0102, 0x0304);
        assert_eq!(
            header.as_bytes(),
            &[
                9, 0, 0, 0, // type code
                0x02, 0x01, 0, 0, 0, 0, 0, 0, // start
                0x04, 0x03, 0, 0, 0, 0, 0, 0, // end
            ]
        );
    }

    #[test]
    fn test_read_record() {
        let data = encode(b"Name", &RecordHeader::new(7, 100, 103), b"abc");
        let mut reader = BinaryReader::with_base(&data, 8);

        let record = TagRecord::read(&mut reader).unwrap();
        assert_eq!(record.offset, 8);
        assert_eq!(record.name, b"Name");
        assert_eq!(record.type_code(), 7);
        assert_eq!(record.payload, b"abc");
        assert_eq!(record.payload_offset(), 8 + 4 + 4 + 20);
        assert_eq!(record.consumed(), data.len());
        assert!(reader.is_empty());
    }

    #[test]
    fn test_end_before_start() {
        let data = encode(b"X", &RecordHeader::new(7, 10, 4), b"");
        let mut reader = BinaryReader::with_base(&data, 8);

        match TagRecord::read(&mut reader) {
            Err(Error::MalformedRecord { offset, start, end }) => {
                assert_eq!((offset, start, end), (8, 10, 4));
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_short_payload_reports_payload_offset() {
        let mut data = encode(b"X", &RecordHeader::new(7, 0, 10), b"");
        data.extend_from_slice(b"abcd");
        let mut reader = BinaryReader::with_base(&data, 8);

        match TagRecord::read(&mut reader) {
            Err(Error::TruncatedBuffer {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 8 + 4 + 1 + 20);
                assert_eq!(needed, 10);
                assert_eq!(available, 4);
            }
            other => panic!("expected TruncatedBuffer, got {:?}", other),
        }
    }

    #[test]
    fn test_name_longer_than_buffer() {
        let data = [0xFF, 0xFF, 0x00, 0x00, b'a'];
        let mut reader = BinaryReader::new(&data);

        assert!(matches!(
            TagRecord::read(&mut reader),
            Err(Error::TruncatedBuffer { offset: 4, .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_header_fields_roundtrip(
            name in proptest::collection::vec(any::<u8>(), 0..48),
            type_code in any::<u32>(),
            start in 0u64..u64::MAX / 2,
            payload in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let header = RecordHeader::new(type_code, start, start + payload.len() as u64);
            let data = encode(&name, &header, &payload);

            let mut reader = BinaryReader::new(&data);
            let record = TagRecord::read(&mut reader).unwrap();

            prop_assert_eq!(record.name, &name[..]);
            prop_assert_eq!(record.type_code(), type_code);
            prop_assert_eq!(record.start(), start);
            prop_assert_eq!(record.end(), start + payload.len() as u64);
            prop_assert_eq!(record.payload, &payload[..]);
            prop_assert_eq!(record.consumed(), data.len());
            prop_assert_eq!(encode(record.name, &record.header, record.payload), data);
        }
    }
}
