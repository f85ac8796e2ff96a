//! Key/value fields of an acquisition annotation.
//!
//! After stripping, an annotation reads like:
//!
//! ```text
//! Spectrum 12
//! Integration Time:	0.5 s
//! Start Time:	10:42:07
//! ```
//!
//! The first line is the free-text title; every later line is `key:value`.

use indexmap::IndexMap;

/// Parsed annotation fields in annotation order.
pub type AnnotationFields = IndexMap<String, String>;

/// Key under which the first annotation line is stored.
pub const INFORMATION_KEY: &str = "Information";

/// Parse a plain-text annotation into fields.
///
/// Tabs are removed before splitting into lines. Each line after the first is
/// split at its first `:` and the remainder is kept whole, so times such as
/// `10:42:07` survive. A line without a colon becomes a key with an empty
/// value. Fields with empty values are dropped, and a repeated key keeps the
/// last value.
pub fn parse_annotation(text: &str) -> AnnotationFields {
    let text = text.replace('\t', "");
    let mut lines = text.lines();

    let mut fields = AnnotationFields::new();
    if let Some(first) = lines.next() {
        fields.insert(INFORMATION_KEY.to_string(), first.to_string());
    }
    for line in lines {
        let (key, value) = line.split_once(':').unwrap_or((line, ""));
        fields.insert(key.to_string(), value.to_string());
    }

    fields.retain(|_, value| !value.is_empty());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_annotation() {
        let fields = parse_annotation(
            "Spectrum 12\nIntegration Time:\t0.5 s\nStart Time:\t10:42:07\nEmpty:\nNo colon\n",
        );

        let pairs: Vec<(&str, &str)> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Information", "Spectrum 12"),
                ("Integration Time", "0.5 s"),
                ("Start Time", "10:42:07"),
            ]
        );
    }

    #[test]
    fn test_empty_title_dropped() {
        let fields = parse_annotation("\nGrating:\t600 g/mm");
        assert_eq!(fields.get(INFORMATION_KEY), None);
        assert_eq!(fields.get("Grating").map(String::as_str), Some("600 g/mm"));
    }

    #[test]
    fn test_repeated_key_keeps_last() {
        let fields = parse_annotation("Title\nMode: a\nMode: b");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["Mode"], " b");
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_annotation("").is_empty());
    }
}
