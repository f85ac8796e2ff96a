//! Intermediate tree with undecoded names and strings.
//!
//! The decoder first builds a [`RawTree`] keyed by raw name bytes. After the
//! annotation fix-up, [`RawTree::into_tag_tree`] rebuilds it bottom-up into
//! the final [`TagTree`], decoding every name and string as Windows-1252.

use indexmap::IndexMap;
use wipkit_common::codepage;

use crate::{NumericArray, TagTree, TagValue};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawValue {
    Tree(RawTree),
    /// Concatenated words of a string record, not yet decoded.
    String(Vec<u8>),
    /// Already plain text (the stripped annotation).
    Text(String),
    /// Bytes that must survive the text pass untouched.
    Blob(Vec<u8>),
    Array(NumericArray),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawEntry {
    /// Absolute offset of the record.
    pub offset: usize,
    pub value: RawValue,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RawTree {
    entries: IndexMap<Vec<u8>, RawEntry>,
}

impl RawTree {
    /// Insert an entry, returning the one it replaced.
    pub fn insert(&mut self, name: Vec<u8>, entry: RawEntry) -> Option<RawEntry> {
        self.entries.insert(name, entry)
    }

    /// Follow a path of raw names.
    pub fn get_path_mut(&mut self, path: &[&[u8]]) -> Option<&mut RawEntry> {
        let (last, parents) = path.split_last()?;
        let mut tree = self;
        for name in parents {
            tree = match &mut tree.entries.get_mut(*name)?.value {
                RawValue::Tree(child) => child,
                _ => return None,
            };
        }
        tree.entries.get_mut(*last)
    }

    /// Rebuild into the final tree, children first.
    pub fn into_tag_tree(self) -> TagTree {
        let mut tree = TagTree::new();
        for (name, entry) in self.entries {
            let value = match entry.value {
                RawValue::Tree(child) => TagValue::Tree(child.into_tag_tree()),
                RawValue::String(bytes) => TagValue::Text(codepage::decode_owned(&bytes)),
                RawValue::Text(text) => TagValue::Text(text),
                RawValue::Blob(bytes) => TagValue::Bytes(bytes),
                RawValue::Array(array) => TagValue::Array(array),
            };
            tree.insert(codepage::decode_owned(&name), value);
        }
        tree
    }
}
