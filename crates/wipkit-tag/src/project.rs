//! Project file access.

use std::borrow::Cow;
use std::path::Path;

use indexmap::IndexMap;
use wipkit_common::codepage;

use crate::decode::{decode_tree, DecodeOptions, ENTRY_ANNOTATION_PATH};
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::metadata::{parse_annotation, AnnotationFields};
use crate::value::join_path;
use crate::{Error, NumericArray, Result, TagTree, TagValue};

/// Length of the file type identifier that precedes the tag stream.
pub const FILE_TYPE_LEN: usize = 8;

/// A decoded project file.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    file_type: String,
    contents: TagTree,
    root_tag: String,
}

impl Project {
    /// Read and decode a project file, forwarding diagnostics to `tracing`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &DecodeOptions::default(), &mut TracingSink)
    }

    /// Read and decode a project file with explicit options.
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        options: &DecodeOptions,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse_with(&data, options, sink)
    }

    /// Decode a project held in memory, forwarding diagnostics to `tracing`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with(data, &DecodeOptions::default(), &mut TracingSink)
    }

    /// Decode a project held in memory with explicit options.
    pub fn parse_with(
        data: &[u8],
        options: &DecodeOptions,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Self> {
        if data.len() < FILE_TYPE_LEN {
            return Err(Error::InvalidHeader {
                expected: FILE_TYPE_LEN,
                actual: data.len(),
            });
        }

        let (header, body) = data.split_at(FILE_TYPE_LEN);
        let file_type = codepage::decode_owned(header);

        let span = tracing::debug_span!("decode", file_type = %file_type, size = data.len());
        let _enter = span.enter();

        let contents = decode_tree(body, FILE_TYPE_LEN, options, sink)?;
        tracing::debug!(
            entries = contents.len(),
            nodes = contents.node_count(),
            "decoded project"
        );

        Ok(Self {
            file_type,
            contents,
            root_tag: options.root_tag.clone(),
        })
    }

    /// The 8-byte file type identifier, as text.
    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    /// The whole decoded tree.
    pub fn contents(&self) -> &TagTree {
        &self.contents
    }

    /// Take the decoded tree.
    pub fn into_contents(self) -> TagTree {
        self.contents
    }

    /// The root container.
    pub fn root(&self) -> Result<&TagTree> {
        self.contents.require_tree(&[self.root_tag.as_str()])
    }

    /// The `Data` container below the root.
    pub fn data(&self) -> Result<&TagTree> {
        self.contents.require_tree(&[self.root_tag.as_str(), "Data"])
    }

    /// The data entry `Data {number}`.
    pub fn data_entry(&self, number: usize) -> Result<&TagTree> {
        let name = format!("Data {}", number);
        self.contents
            .require_tree(&[self.root_tag.as_str(), "Data", name.as_str()])
    }

    /// Plain-text annotation of a data entry.
    ///
    /// See [`annotation_text`].
    pub fn info<'t>(&self, entry: &'t TagTree) -> Result<Cow<'t, str>> {
        annotation_text(entry)
    }

    /// Plain-text annotation of `Data {number}`.
    pub fn info_by_number(&self, number: usize) -> Result<Cow<'_, str>> {
        annotation_text(self.data_entry(number)?)
    }

    /// Parsed annotation fields of every data entry that has one, keyed by
    /// entry name in file order.
    ///
    /// Children of `Data` without an annotation, such as the entry count, are
    /// skipped. So is an entry whose annotation cannot be stripped; it is
    /// logged and the remaining entries are still returned.
    pub fn metadata(&self) -> Result<IndexMap<String, AnnotationFields>> {
        let mut metadata = IndexMap::new();
        for (name, value) in self.data()? {
            let Some(entry) = value.as_tree() else {
                continue;
            };
            match annotation_text(entry) {
                Ok(text) => {
                    metadata.insert(name.clone(), parse_annotation(&text));
                }
                Err(Error::MissingPath { .. } | Error::UnexpectedType { .. }) => {
                    tracing::debug!(entry = %name, "no annotation");
                }
                Err(Error::RichText(err)) => {
                    tracing::warn!(entry = %name, "annotation skipped: {}", err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(metadata)
    }
}

/// Plain-text annotation of a data entry, found at `TDStream / StreamData`.
///
/// Only the first entry is stripped during decoding. Any other entry still
/// holds the rich-text bytes and is stripped here, so the result is owned
/// in that case.
pub fn annotation_text(entry: &TagTree) -> Result<Cow<'_, str>> {
    match entry.require(&ENTRY_ANNOTATION_PATH)? {
        TagValue::Text(text) => Ok(Cow::Borrowed(text)),
        TagValue::Bytes(bytes) | TagValue::Array(NumericArray::UInt8(bytes)) => {
            Ok(Cow::Owned(wipkit_rtf::strip_annotation(bytes)?.text))
        }
        other => Err(Error::UnexpectedType {
            path: join_path(&ENTRY_ANNOTATION_PATH),
            expected: "annotation",
            actual: other.type_name(),
        }),
    }
}
