//! Encode/decode error.

/// Wire encode/decode errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum WireError {
    /// The destination buffer is too short to hold the packed representation of the item.
    BufferTooShort,

    /// The source buffer did not contain enough bytes to unpack the item.
    ReadBufferTooShort,

    /// A raw value did not correspond to any known enum variant.
    InvalidValue,
}

#[cfg(feature = "std")]
impl std::error::Error for WireError {}

impl core::fmt::Display for WireError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooShort => f.write_str("destination buffer too short"),
            Self::ReadBufferTooShort => f.write_str("source buffer too short"),
            Self::InvalidValue => f.write_str("value does not match any known variant"),
        }
    }
}
