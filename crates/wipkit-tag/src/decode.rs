//! Tag stream decoding.
//!
//! Decoding runs in two passes. The first walks the buffer record by record
//! and builds a raw tree, recursing into containers. The second rebuilds the
//! raw tree into a [`TagTree`] after the annotation fix-up.

use byteorder::{ByteOrder, LittleEndian};
use wipkit_common::{codepage, BinaryReader};

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::raw::{RawEntry, RawTree, RawValue};
use crate::record::{TagRecord, MIN_RECORD_LEN};
use crate::{Error, NumericArray, NumericMode, Result, TagTree, TagType};

/// Root container name of project files.
pub const ROOT_TAG: &str = "WITec Project";

/// Path below the root to the annotation that is stripped during decoding.
pub const ANNOTATION_PATH: [&str; 4] = ["Data", "Data 1", "TDStream", "StreamData"];

/// Path below a data entry to its annotation.
pub const ENTRY_ANNOTATION_PATH: [&str; 2] = ["TDStream", "StreamData"];

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// How codes 2, 3 and 5 are materialized.
    pub numeric_mode: NumericMode,
    /// Name of the root container. Matched against raw name bytes.
    pub root_tag: String,
    /// Whether the annotation of the first data entry is stripped.
    pub annotation_fixup: bool,
    /// Maximum container nesting.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            numeric_mode: NumericMode::Strict,
            root_tag: ROOT_TAG.to_string(),
            annotation_fixup: true,
            max_depth: 256,
        }
    }
}

impl DecodeOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the numeric mode.
    pub fn numeric_mode(mut self, mode: NumericMode) -> Self {
        self.numeric_mode = mode;
        self
    }

    /// Set the root container name.
    pub fn root_tag(mut self, root_tag: impl Into<String>) -> Self {
        self.root_tag = root_tag.into();
        self
    }

    /// Enable or disable the annotation fix-up.
    pub fn annotation_fixup(mut self, enabled: bool) -> Self {
        self.annotation_fixup = enabled;
        self
    }

    /// Set the maximum container nesting.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Decode a tag stream into a tree.
///
/// `base` is the absolute file offset of `buffer[0]` and is only used for
/// error and diagnostic offsets. For a whole project file this is the
/// buffer after the 8-byte file type, with `base = 8`.
pub fn decode_tree(
    buffer: &[u8],
    base: usize,
    options: &DecodeOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<TagTree> {
    let mut decoder = Decoder { options, sink };
    let mut raw = decoder.decode_stream(buffer, base, 0)?;
    if options.annotation_fixup {
        decoder.fix_annotation(&mut raw);
    }
    Ok(raw.into_tag_tree())
}

/// Decode a string payload: u32 length-prefixed words, concatenated.
pub fn decode_words(payload: &[u8], offset: usize) -> Result<Vec<u8>> {
    let mut reader = BinaryReader::with_base(payload, offset);
    let mut out = Vec::with_capacity(payload.len());
    while !reader.is_empty() {
        out.extend_from_slice(reader.read_prefixed()?);
    }
    Ok(out)
}

/// Decode a non-container, non-string payload.
///
/// Returns `None` for [`TagType::Container`] and [`TagType::String`], which
/// are not arrays.
pub fn decode_array(
    tag_type: TagType,
    payload: &[u8],
    offset: usize,
    mode: NumericMode,
) -> Result<Option<NumericArray>> {
    let le = |width| LeArray {
        tag_type,
        payload,
        offset,
        width,
    };

    let array = match (tag_type, mode) {
        (TagType::Container | TagType::String, _) => return Ok(None),
        (TagType::UInt32, _) => NumericArray::UInt32(le(4).read(LittleEndian::read_u32_into)?),
        (TagType::Int64, _) => NumericArray::Int64(le(8).read(LittleEndian::read_i64_into)?),
        (TagType::UInt16, _) if payload.len() % 4 == 0 => {
            NumericArray::UInt32(le(4).read(LittleEndian::read_u32_into)?)
        }
        (TagType::UInt16, _) => NumericArray::UInt16(le(2).read(LittleEndian::read_u16_into)?),
        (TagType::Double | TagType::Single | TagType::Int32, NumericMode::Strict) => {
            NumericArray::Int8(payload.iter().map(|&b| b as i8).collect())
        }
        (TagType::Double, NumericMode::Reinterpreted) => {
            NumericArray::Double(le(8).read(LittleEndian::read_f64_into)?)
        }
        (TagType::Single, NumericMode::Reinterpreted) => {
            NumericArray::Float(le(4).read(LittleEndian::read_f32_into)?)
        }
        (TagType::Int32, NumericMode::Reinterpreted) => {
            NumericArray::Int32(le(4).read(LittleEndian::read_i32_into)?)
        }
        (TagType::UInt8, _) => NumericArray::UInt8(payload.to_vec()),
        (TagType::Boolean, _) => NumericArray::Bool(payload.iter().map(|&b| b != 0).collect()),
    };
    Ok(Some(array))
}

/// A fixed-width little-endian payload.
struct LeArray<'a> {
    tag_type: TagType,
    payload: &'a [u8],
    offset: usize,
    width: usize,
}

impl LeArray<'_> {
    fn read<T: Default + Clone>(&self, read_into: fn(&[u8], &mut [T])) -> Result<Vec<T>> {
        if self.payload.len() % self.width != 0 {
            return Err(Error::SizeMismatch {
                offset: self.offset,
                tag_type: self.tag_type,
                size: self.payload.len(),
                width: self.width,
            });
        }
        let mut values = vec![T::default(); self.payload.len() / self.width];
        read_into(self.payload, &mut values);
        Ok(values)
    }
}

struct Decoder<'a> {
    options: &'a DecodeOptions,
    sink: &'a mut dyn DiagnosticSink,
}

impl Decoder<'_> {
    fn decode_stream(&mut self, data: &[u8], base: usize, depth: usize) -> Result<RawTree> {
        let mut reader = BinaryReader::with_base(data, base);
        let mut tree = RawTree::default();

        while !reader.is_empty() {
            if reader.remaining() < MIN_RECORD_LEN {
                return Err(Error::TrailingGarbage {
                    offset: reader.offset(),
                    remaining: reader.remaining(),
                });
            }

            let record = TagRecord::read(&mut reader)?;
            tracing::trace!(
                offset = record.offset,
                name = %codepage::decode(record.name),
                type_code = record.type_code(),
                size = record.payload.len(),
                "tag record"
            );

            let value = self.decode_record(&record, depth)?;
            let entry = RawEntry {
                offset: record.offset,
                value,
            };
            if tree.insert(record.name.to_vec(), entry).is_some() {
                self.sink.report(Diagnostic {
                    offset: record.offset,
                    name: codepage::decode_owned(record.name),
                    kind: DiagnosticKind::NameCollision,
                });
            }
        }

        Ok(tree)
    }

    fn decode_record(&mut self, record: &TagRecord<'_>, depth: usize) -> Result<RawValue> {
        let offset = record.payload_offset();
        let tag_type =
            TagType::from_u32(record.type_code()).ok_or(Error::UnknownTypeCode {
                offset: record.offset,
                code: record.type_code(),
            })?;

        match tag_type {
            TagType::Container => {
                if depth >= self.options.max_depth {
                    return Err(Error::NestingTooDeep {
                        offset: record.offset,
                        depth: depth + 1,
                    });
                }
                let child = self.decode_stream(record.payload, offset, depth + 1)?;
                Ok(RawValue::Tree(child))
            }
            TagType::String => Ok(RawValue::String(decode_words(record.payload, offset)?)),
            _ => match decode_array(tag_type, record.payload, offset, self.options.numeric_mode)? {
                Some(array) => Ok(RawValue::Array(array)),
                None => Err(Error::UnknownTypeCode {
                    offset: record.offset,
                    code: record.type_code(),
                }),
            },
        }
    }

    /// Strip the annotation of the first data entry in place.
    fn fix_annotation(&mut self, tree: &mut RawTree) {
        let mut path: Vec<&[u8]> = vec![self.options.root_tag.as_bytes()];
        path.extend(ANNOTATION_PATH.iter().map(|segment| segment.as_bytes()));

        let Some(entry) = tree.get_path_mut(&path) else {
            tracing::debug!("no annotation to strip");
            return;
        };

        let blob = match std::mem::replace(&mut entry.value, RawValue::Blob(Vec::new())) {
            RawValue::Array(NumericArray::UInt8(bytes)) | RawValue::String(bytes) => bytes,
            other => {
                entry.value = other;
                return;
            }
        };

        let name = ENTRY_ANNOTATION_PATH[1].to_string();
        match wipkit_rtf::strip_annotation(&blob) {
            Ok(annotation) => {
                if !annotation.terminated {
                    self.sink.report(Diagnostic {
                        offset: entry.offset,
                        name,
                        kind: DiagnosticKind::MissingTerminator,
                    });
                }
                entry.value = RawValue::Text(annotation.text);
            }
            Err(err) => {
                self.sink.report(Diagnostic {
                    offset: entry.offset,
                    name,
                    kind: DiagnosticKind::RichTextFallback(err),
                });
                entry.value = RawValue::Blob(blob);
            }
        }
    }
}
