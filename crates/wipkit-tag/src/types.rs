//! Tag type codes.

/// Type codes used in tag record headers.
///
/// The values are the actual binary values from the project file format.
/// The names are the nominal types; see [`NumericMode`] for how the legacy
/// codes are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TagType {
    /// Nested tag stream.
    Container = 0,
    /// Unsigned 32-bit integers.
    UInt32 = 1,
    /// 64-bit floating point (stored as raw signed bytes in strict mode).
    Double = 2,
    /// 32-bit floating point (stored as raw signed bytes in strict mode).
    Single = 3,
    /// Signed 64-bit integers.
    Int64 = 4,
    /// Signed 32-bit integers (stored as raw signed bytes in strict mode).
    Int32 = 5,
    /// Unsigned 16-bit integers, or 32-bit when the size allows it.
    UInt16 = 6,
    /// Unsigned bytes.
    UInt8 = 7,
    /// One boolean per byte.
    Boolean = 8,
    /// Length-prefixed word list.
    String = 9,
}

impl TagType {
    /// Parse from a u32 value.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Container),
            1 => Some(Self::UInt32),
            2 => Some(Self::Double),
            3 => Some(Self::Single),
            4 => Some(Self::Int64),
            5 => Some(Self::Int32),
            6 => Some(Self::UInt16),
            7 => Some(Self::UInt8),
            8 => Some(Self::Boolean),
            9 => Some(Self::String),
            _ => None,
        }
    }

    /// The binary type code.
    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Get the string name for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "Container",
            Self::UInt32 => "UInt32",
            Self::Double => "Double",
            Self::Single => "Single",
            Self::Int64 => "Int64",
            Self::Int32 => "Int32",
            Self::UInt16 => "UInt16",
            Self::UInt8 => "UInt8",
            Self::Boolean => "Boolean",
            Self::String => "String",
        }
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the legacy numeric codes 2, 3 and 5 are materialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumericMode {
    /// Keep the payload byte for byte as signed bytes.
    #[default]
    Strict,
    /// Reinterpret as little-endian f64 (2), f32 (3) and i32 (5).
    Reinterpreted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for code in 0..10 {
            let tag_type = TagType::from_u32(code).unwrap();
            assert_eq!(tag_type.code(), code);
        }
        assert_eq!(TagType::from_u32(10), None);
        assert_eq!(TagType::from_u32(u32::MAX), None);
    }
}
