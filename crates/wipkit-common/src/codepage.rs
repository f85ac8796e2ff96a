//! Windows-1252 text decoding.
//!
//! Every name and string in a project file is stored as single-byte Western
//! text. Decoding follows the WHATWG mapping, so each byte maps to exactly
//! one character and decoding never fails.

use std::borrow::Cow;

use encoding_rs::WINDOWS_1252;

/// Decode a single-byte Windows-1252 string.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    WINDOWS_1252.decode_without_bom_handling(bytes).0
}

/// Decode into an owned `String`.
pub fn decode_owned(bytes: &[u8]) -> String {
    decode(bytes).into_owned()
}
