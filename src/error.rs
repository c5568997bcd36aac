//! Error types returned by this crate.

/// Top level error type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Error {
    /// The byte channel failed, or returned zero bytes from a read.
    Transport,

    /// An FT1.2 frame failed to decode.
    InvalidFrame(FrameError),

    /// The link layer dialog did not progress as the protocol requires.
    Protocol(ProtocolError),

    /// The requested command is not permitted for the negotiated function type.
    UnsupportedCommand,

    /// Exporting a COMTRADE file failed.
    #[cfg(feature = "std")]
    ExportIo,

    /// An error occurred encoding or decoding a wire field.
    Wire(wire103::WireError),
}

/// Link-layer protocol violations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ProtocolError {
    /// The reply frame's PRM bit indicated a primary-direction frame; a reply must have PRM=0.
    UnexpectedPrm,

    /// The slave signalled a data flow control overflow (DFC bit set).
    DataFlowOverflow,

    /// An ASDU arrived that does not have the shape the caller's operation expected (wrong
    /// type identification, wrong common address, wrong information object count, …).
    UnexpectedReply,
}

/// FT1.2 framing violations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FrameError {
    /// Neither a fixed, variable, nor single-character frame start byte was recognised.
    BadStart,

    /// The frame did not end with the `0x16` end sentinel.
    BadEnd,

    /// The two redundant length bytes of a variable frame did not match.
    LengthMismatch,

    /// The computed checksum did not match the checksum byte in the frame.
    BadChecksum,

    /// There were not enough bytes in the buffer to hold a complete frame.
    Truncated,

    /// The user data supplied to the encoder would not fit in the single-byte FT1.2 length
    /// field.
    UserDataTooLong,
}

/// ASDU 31 disturbance termination codes that abort (rather than seal) the record in progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AbortCode {
    /// Disturbance data aborted by the protection equipment.
    DisturbanceAborted,
    /// Channel transmission aborted by the protection equipment.
    ChannelAborted,
    /// Tag transmission aborted by the protection equipment.
    TagsAborted,
    /// The slave ended the transfer with a negative-ending termination code rather than a
    /// clean completion.
    NegativeEnding,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Transport => f.write_str("byte channel failed or returned zero bytes"),
            Error::InvalidFrame(e) => write!(f, "invalid FT1.2 frame: {}", e),
            Error::Protocol(e) => write!(f, "protocol violation: {}", e),
            Error::UnsupportedCommand => {
                f.write_str("command is not supported by the negotiated function type")
            }
            #[cfg(feature = "std")]
            Error::ExportIo => f.write_str("failed to write COMTRADE output file"),
            Error::Wire(e) => write!(f, "wire encode/decode error: {}", e),
        }
    }
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtocolError::UnexpectedPrm => f.write_str("reply frame had PRM set"),
            ProtocolError::DataFlowOverflow => f.write_str("slave signalled DFC overflow"),
            ProtocolError::UnexpectedReply => {
                f.write_str("reply ASDU did not have the shape this operation expected")
            }
        }
    }
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::BadStart => f.write_str("unrecognised start byte"),
            FrameError::BadEnd => f.write_str("missing or incorrect end byte"),
            FrameError::LengthMismatch => f.write_str("redundant length bytes did not match"),
            FrameError::BadChecksum => f.write_str("checksum did not match"),
            FrameError::Truncated => f.write_str("not enough bytes for a complete frame"),
            FrameError::UserDataTooLong => {
                f.write_str("user data does not fit in the FT1.2 length field")
            }
        }
    }
}

impl core::fmt::Display for AbortCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AbortCode::DisturbanceAborted => f.write_str("disturbance data aborted"),
            AbortCode::ChannelAborted => f.write_str("channel transmission aborted"),
            AbortCode::TagsAborted => f.write_str("tag transmission aborted"),
            AbortCode::NegativeEnding => f.write_str("transfer ended negatively"),
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::InvalidFrame(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

impl From<wire103::WireError> for Error {
    fn from(e: wire103::WireError) -> Self {
        Self::Wire(e)
    }
}
