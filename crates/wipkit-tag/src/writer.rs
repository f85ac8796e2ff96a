//! Tag stream encoder.
//!
//! [`TagWriter`] produces records in the on-disk layout. `start` and `end`
//! are written as offsets into the payload region, counted from the writer's
//! base.
//!
//! # Example
//!
//! ```
//! use wipkit_tag::{write_project, Project, TagWriter};
//!
//! let mut writer = TagWriter::new();
//! writer.container(b"WITec Project", |project| {
//!     project.u32s(b"Version", &[5]);
//!     project.string(b"Name", b"sample");
//! });
//!
//! let file = write_project(b"WIT_PRCT", &writer.finish());
//! let decoded = Project::parse(&file)?;
//! assert_eq!(decoded.file_type(), "WIT_PRCT");
//! # Ok::<(), wipkit_tag::Error>(())
//! ```

use byteorder::{ByteOrder, LittleEndian};
use zerocopy::IntoBytes;

use crate::project::FILE_TYPE_LEN;
use crate::record::RecordHeader;
use crate::TagType;

/// Builder for tag streams.
#[derive(Debug, Default, Clone)]
pub struct TagWriter {
    buffer: Vec<u8>,
    base: u64,
}

impl TagWriter {
    /// Create a writer whose first record starts at payload offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer whose first record starts at payload offset `base`.
    pub fn with_base(base: u64) -> Self {
        Self {
            buffer: Vec::new(),
            base,
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Finish and return the encoded stream.
    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }

    fn cursor(&self) -> u64 {
        self.base + self.buffer.len() as u64
    }

    /// Write a record with an arbitrary type code.
    pub fn raw(&mut self, name: &[u8], type_code: u32, payload: &[u8]) -> &mut Self {
        encode_word(&mut self.buffer, name);
        let start = self.cursor() + RecordHeader::LEN as u64;
        let end = start + payload.len() as u64;
        self.buffer
            .extend_from_slice(RecordHeader::new(type_code, start, end).as_bytes());
        self.buffer.extend_from_slice(payload);
        self
    }

    /// Write a record of a known type.
    pub fn record(&mut self, name: &[u8], tag_type: TagType, payload: &[u8]) -> &mut Self {
        self.raw(name, tag_type.code(), payload)
    }

    /// Write a container whose children are produced by `build`.
    pub fn container(&mut self, name: &[u8], build: impl FnOnce(&mut TagWriter)) -> &mut Self {
        let payload_start = self.cursor() + 4 + name.len() as u64 + RecordHeader::LEN as u64;
        let mut child = TagWriter::with_base(payload_start);
        build(&mut child);
        let payload = child.finish();
        self.record(name, TagType::Container, &payload)
    }

    /// Write a string record made of several words.
    pub fn words(&mut self, name: &[u8], words: &[&[u8]]) -> &mut Self {
        let mut payload = Vec::new();
        for word in words {
            encode_word(&mut payload, word);
        }
        self.record(name, TagType::String, &payload)
    }

    /// Write a single-word string record.
    pub fn string(&mut self, name: &[u8], text: &[u8]) -> &mut Self {
        self.words(name, &[text])
    }

    /// Write a code 1 record.
    pub fn u32s(&mut self, name: &[u8], values: &[u32]) -> &mut Self {
        let mut payload = vec![0u8; values.len() * 4];
        LittleEndian::write_u32_into(values, &mut payload);
        self.record(name, TagType::UInt32, &payload)
    }

    /// Write a code 6 record.
    ///
    /// Readers treat any code 6 payload whose size is a multiple of four as
    /// u32 values, so only an odd number of u16 values reads back as u16.
    pub fn u16s(&mut self, name: &[u8], values: &[u16]) -> &mut Self {
        let mut payload = vec![0u8; values.len() * 2];
        LittleEndian::write_u16_into(values, &mut payload);
        self.record(name, TagType::UInt16, &payload)
    }

    /// Write a code 4 record.
    pub fn i64s(&mut self, name: &[u8], values: &[i64]) -> &mut Self {
        let mut payload = vec![0u8; values.len() * 8];
        LittleEndian::write_i64_into(values, &mut payload);
        self.record(name, TagType::Int64, &payload)
    }

    /// Write a code 2 record holding little-endian f64 values.
    pub fn doubles(&mut self, name: &[u8], values: &[f64]) -> &mut Self {
        let mut payload = vec![0u8; values.len() * 8];
        LittleEndian::write_f64_into(values, &mut payload);
        self.record(name, TagType::Double, &payload)
    }

    /// Write a code 7 record.
    pub fn u8s(&mut self, name: &[u8], values: &[u8]) -> &mut Self {
        self.record(name, TagType::UInt8, values)
    }

    /// Write a code 8 record.
    pub fn bools(&mut self, name: &[u8], values: &[bool]) -> &mut Self {
        let payload: Vec<u8> = values.iter().map(|&b| u8::from(b)).collect();
        self.record(name, TagType::Boolean, &payload)
    }
}

/// Append a u32 length-prefixed byte run.
pub fn encode_word(out: &mut Vec<u8>, word: &[u8]) {
    out.extend_from_slice(&(word.len() as u32).to_le_bytes());
    out.extend_from_slice(word);
}

/// Prepend the 8-byte file type identifier to an encoded tag stream.
pub fn write_project(file_type: &[u8; FILE_TYPE_LEN], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FILE_TYPE_LEN + body.len());
    out.extend_from_slice(file_type);
    out.extend_from_slice(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode_tree, DecodeOptions, NumericArray, NumericMode, TagValue};

    #[test]
    fn test_record_bytes() {
        let mut writer = TagWriter::new();
        writer.u8s(b"A", &[7, 8]);

        assert_eq!(
            writer.finish(),
            vec![
                1, 0, 0, 0, b'A', // name
                7, 0, 0, 0, // type code
                25, 0, 0, 0, 0, 0, 0, 0, // start
                27, 0, 0, 0, 0, 0, 0, 0, // end
                7, 8, // payload
            ]
        );
    }

    #[test]
    fn test_container_offsets_are_absolute() {
        let mut writer = TagWriter::with_base(100);
        writer.container(b"C", |c| {
            c.u8s(b"x", &[1]);
        });
        let bytes = writer.finish();

        // Child record starts right after the container header.
        let child_start = 100 + 4 + 1 + RecordHeader::LEN as u64;
        let child_header = &bytes[25 + 4 + 1..25 + 4 + 1 + RecordHeader::LEN];
        let start = LittleEndian::read_u64(&child_header[4..12]);
        assert_eq!(start, child_start + 4 + 1 + RecordHeader::LEN as u64);
    }

    fn decode_one(writer: TagWriter, mode: NumericMode) -> TagValue {
        let options = DecodeOptions::default().numeric_mode(mode);
        let tree = decode_tree(&writer.finish(), 8, &options, &mut ()).unwrap();
        tree.get("v").cloned().unwrap()
    }

    #[test]
    fn test_u16s_width_depends_on_count() {
        let mut writer = TagWriter::new();
        writer.u16s(b"v", &[1, 2, 3]);
        assert_eq!(
            decode_one(writer, NumericMode::Strict),
            TagValue::Array(NumericArray::UInt16(vec![1, 2, 3]))
        );

        let mut writer = TagWriter::new();
        writer.u16s(b"v", &[1, 2]);
        assert_eq!(
            decode_one(writer, NumericMode::Strict),
            TagValue::Array(NumericArray::UInt32(vec![0x0002_0001]))
        );
    }

    #[test]
    fn test_typed_arrays_decode() {
        let mut writer = TagWriter::new();
        writer.i64s(b"v", &[-1, i64::MAX]);
        assert_eq!(
            decode_one(writer, NumericMode::Strict),
            TagValue::Array(NumericArray::Int64(vec![-1, i64::MAX]))
        );

        let mut writer = TagWriter::new();
        writer.doubles(b"v", &[0.5, -2.0]);
        assert_eq!(
            decode_one(writer, NumericMode::Reinterpreted),
            TagValue::Array(NumericArray::Double(vec![0.5, -2.0]))
        );

        let mut writer = TagWriter::new();
        writer.doubles(b"v", &[1.0]);
        assert_eq!(
            decode_one(writer, NumericMode::Strict),
            TagValue::Array(NumericArray::Int8(vec![0, 0, 0, 0, 0, 0, -16, 63]))
        );

        let mut writer = TagWriter::new();
        writer.bools(b"v", &[true, false, true]);
        assert_eq!(
            decode_one(writer, NumericMode::Strict),
            TagValue::Array(NumericArray::Bool(vec![true, false, true]))
        );
    }

    #[test]
    fn test_words_payload() {
        let mut writer = TagWriter::new();
        writer.words(b"S", &[b"hello", b" world"]);
        let bytes = writer.finish();
        let payload = &bytes[4 + 1 + RecordHeader::LEN..];
        assert_eq!(
            payload,
            b"\x05\x00\x00\x00hello\x06\x00\x00\x00 world"
        );
    }
}
