//! Decoded tag values and the tag tree.

use std::fmt;

use indexmap::IndexMap;

use crate::{Error, Result};

/// A decoded numeric payload.
///
/// Arrays are never collapsed to a scalar, even with a single element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum NumericArray {
    /// Signed bytes (codes 2, 3 and 5 in strict mode).
    Int8(Vec<i8>),
    /// Unsigned bytes.
    UInt8(Vec<u8>),
    /// Unsigned 16-bit integers.
    UInt16(Vec<u16>),
    /// Unsigned 32-bit integers.
    UInt32(Vec<u32>),
    /// Signed 32-bit integers (code 5, reinterpreted).
    Int32(Vec<i32>),
    /// Signed 64-bit integers.
    Int64(Vec<i64>),
    /// 32-bit floating point (code 3, reinterpreted).
    Float(Vec<f32>),
    /// 64-bit floating point (code 2, reinterpreted).
    Double(Vec<f64>),
    /// Booleans, one per byte.
    Bool(Vec<bool>),
}

impl NumericArray {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Int8(v) => v.len(),
            Self::UInt8(v) => v.len(),
            Self::UInt16(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    /// Check if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int8(_) => "int8[]",
            Self::UInt8(_) => "uint8[]",
            Self::UInt16(_) => "uint16[]",
            Self::UInt32(_) => "uint32[]",
            Self::Int32(_) => "int32[]",
            Self::Int64(_) => "int64[]",
            Self::Float(_) => "float[]",
            Self::Double(_) => "double[]",
            Self::Bool(_) => "bool[]",
        }
    }

    /// Widen integer elements to i64. Floating point arrays return None.
    pub fn to_i64_vec(&self) -> Option<Vec<i64>> {
        Some(match self {
            Self::Int8(v) => v.iter().map(|&x| i64::from(x)).collect(),
            Self::UInt8(v) => v.iter().map(|&x| i64::from(x)).collect(),
            Self::UInt16(v) => v.iter().map(|&x| i64::from(x)).collect(),
            Self::UInt32(v) => v.iter().map(|&x| i64::from(x)).collect(),
            Self::Int32(v) => v.iter().map(|&x| i64::from(x)).collect(),
            Self::Int64(v) => v.clone(),
            Self::Bool(v) => v.iter().map(|&x| i64::from(x)).collect(),
            Self::Float(_) | Self::Double(_) => return None,
        })
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

impl fmt::Display for NumericArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int8(v) => write_list(f, v),
            Self::UInt8(v) => write_list(f, v),
            Self::UInt16(v) => write_list(f, v),
            Self::UInt32(v) => write_list(f, v),
            Self::Int32(v) => write_list(f, v),
            Self::Int64(v) => write_list(f, v),
            Self::Float(v) => write_list(f, v),
            Self::Double(v) => write_list(f, v),
            Self::Bool(v) => write_list(f, v),
        }
    }
}

/// A value in a decoded tag tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum TagValue {
    /// Nested container.
    Tree(TagTree),
    /// Decoded string, or the stripped annotation text.
    Text(String),
    /// Annotation blob left in place because it could not be stripped.
    Bytes(Vec<u8>),
    /// Numeric or boolean array.
    Array(NumericArray),
}

impl TagValue {
    /// Kind name used in error messages and listings.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Tree(_) => "container",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Array(array) => array.type_name(),
        }
    }

    /// Get as a nested tree.
    pub fn as_tree(&self) -> Option<&TagTree> {
        match self {
            Self::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Get as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get as a numeric array.
    pub fn as_array(&self) -> Option<&NumericArray> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Get raw bytes: a preserved blob or an unsigned byte array.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) | Self::Array(NumericArray::UInt8(bytes)) => Some(bytes),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree(tree) => write!(f, "{{{} entries}}", tree.len()),
            Self::Text(text) => write!(f, "{:?}", text),
            Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::Array(array) => write!(f, "{}", array),
        }
    }
}

/// A decoded tag stream: tag name to value, in file order.
///
/// Lookups by path return [`Error::MissingPath`] when a segment is absent,
/// which is how callers detect file variants without a given tag.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TagTree {
    entries: IndexMap<String, TagValue>,
}

impl TagTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the tree has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a direct child.
    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.entries.get(name)
    }

    /// Get a direct child container.
    pub fn get_tree(&self, name: &str) -> Option<&TagTree> {
        self.get(name).and_then(TagValue::as_tree)
    }

    /// Get a direct child string.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(TagValue::as_text)
    }

    /// Iterate over children in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over child names in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Follow a path of names.
    pub fn path(&self, path: &[&str]) -> Option<&TagValue> {
        let (last, parents) = path.split_last()?;
        let mut tree = self;
        for name in parents {
            tree = tree.get_tree(name)?;
        }
        tree.get(last)
    }

    /// Follow a path of names, failing with [`Error::MissingPath`].
    pub fn require(&self, path: &[&str]) -> Result<&TagValue> {
        self.path(path).ok_or_else(|| Error::MissingPath {
            path: join_path(path),
        })
    }

    /// Follow a path that must end at a container.
    pub fn require_tree(&self, path: &[&str]) -> Result<&TagTree> {
        match self.require(path)? {
            TagValue::Tree(tree) => Ok(tree),
            other => Err(Error::UnexpectedType {
                path: join_path(path),
                expected: "container",
                actual: other.type_name(),
            }),
        }
    }

    /// Count every node below this tree, containers included.
    pub fn node_count(&self) -> usize {
        self.entries
            .values()
            .map(|value| match value {
                TagValue::Tree(tree) => 1 + tree.node_count(),
                _ => 1,
            })
            .sum()
    }

    /// Insert a child, returning the value it replaced.
    pub(crate) fn insert(&mut self, name: String, value: TagValue) -> Option<TagValue> {
        self.entries.insert(name, value)
    }
}

impl<'a> IntoIterator for &'a TagTree {
    type Item = (&'a String, &'a TagValue);
    type IntoIter = indexmap::map::Iter<'a, String, TagValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Render a path for error messages.
pub(crate) fn join_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(|segment| segment.as_ref())
        .collect::<Vec<&str>>()
        .join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TagTree {
        let mut inner = TagTree::new();
        inner.insert("Count".into(), TagValue::Array(NumericArray::UInt32(vec![3])));
        inner.insert("Caption".into(), TagValue::Text("Scan".into()));

        let mut root = TagTree::new();
        root.insert("Data".into(), TagValue::Tree(inner));
        root
    }

    #[test]
    fn test_path_lookup() {
        let tree = sample();
        assert_eq!(
            tree.path(&["Data", "Caption"]).and_then(TagValue::as_text),
            Some("Scan")
        );
        assert!(tree.path(&["Data", "Missing"]).is_none());
        assert!(tree.path(&[]).is_none());
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_require_errors() {
        let tree = sample();
        match tree.require(&["Data", "Nope"]) {
            Err(Error::MissingPath { path }) => assert_eq!(path, "Data / Nope"),
            other => panic!("expected MissingPath, got {:?}", other),
        }
        match tree.require_tree(&["Data", "Count"]) {
            Err(Error::UnexpectedType { actual, .. }) => assert_eq!(actual, "uint32[]"),
            other => panic!("expected UnexpectedType, got {:?}", other),
        }
    }

    #[test]
    fn test_keys_in_file_order() {
        let tree = sample();
        let inner = tree.get_tree("Data").unwrap();
        assert_eq!(inner.keys().collect::<Vec<_>>(), vec!["Count", "Caption"]);
    }

    #[test]
    fn test_to_i64_vec() {
        assert_eq!(
            NumericArray::Int8(vec![-1, 2]).to_i64_vec(),
            Some(vec![-1, 2])
        );
        assert_eq!(
            NumericArray::UInt32(vec![u32::MAX]).to_i64_vec(),
            Some(vec![i64::from(u32::MAX)])
        );
        assert_eq!(
            NumericArray::Bool(vec![true, false]).to_i64_vec(),
            Some(vec![1, 0])
        );
        assert_eq!(NumericArray::Double(vec![1.0]).to_i64_vec(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(NumericArray::Int8(vec![-1, 2]).to_string(), "[-1, 2]");
        assert_eq!(TagValue::Text("a".into()).to_string(), "\"a\"");
        assert_eq!(TagValue::Bytes(vec![0; 4]).to_string(), "<4 bytes>");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_json() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"{"Data":{"Count":[3],"Caption":"Scan"}}"#);
    }
}
