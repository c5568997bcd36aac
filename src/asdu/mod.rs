//! ASDU (Application Service Data Unit) header codec.
//!
//! Every ASDU begins with a 6 octet header: a 4 octet Data Unit Identifier (`Dui`) followed by a
//! 2 octet Information Object Identifier (`Ifi`). What follows the header is type-specific and is
//! handled by [`crate::application`] and [`crate::disturbance`].

mod time;

pub use time::{Cp56Time2a, CP56TIME2A_LEN};

use crate::error::Error;
use wire103::{Wire103Read, Wire103ReadWrite, Wire103Write, WireError};

/// Standardized and private ASDU type identifications this crate knows how to parse headers for.
pub mod type_id {
    /// Time-tagged message, relay type 1 format.
    pub const MESSAGE_TYPE_1: u8 = 1;
    /// Time-tagged message with relative time, type 2 format.
    pub const MESSAGE_TYPE_2: u8 = 2;
    /// Time-tagged message with relative time, type 4 format.
    pub const MESSAGE_TYPE_4: u8 = 4;
    /// Identification (station init response).
    pub const IDENTIFICATION: u8 = 5;
    /// Time synchronization.
    pub const TIME_SYNCHRONIZATION: u8 = 6;
    /// General interrogation.
    pub const GENERAL_INTERROGATION: u8 = 7;
    /// General command.
    pub const GENERAL_COMMAND: u8 = 20;
    /// Disturbance data ready.
    pub const DISTURBANCE_REQUEST: u8 = 23;
    /// List of recorded disturbances (the protocol overloads this for fault transfer, see
    /// `disturbance`).
    pub const DISTURBANCE_TRANSFER: u8 = 26;
    /// List of channels transmitted.
    pub const DISTURBANCE_CHANNEL: u8 = 27;
    /// Ready to transmit tags.
    pub const DISTURBANCE_TAGS_READY: u8 = 28;
    /// Tag batch.
    pub const DISTURBANCE_TAGS: u8 = 29;
    /// Channel sample batch.
    pub const DISTURBANCE_CHANNEL_SAMPLES: u8 = 30;
    /// End of transmission.
    pub const DISTURBANCE_END: u8 = 31;
    /// Energy meter reading.
    pub const ENERGY: u8 = 205;
}

/// Common cause-of-transmission values used in this implementation.
pub mod cause {
    /// Periodic/cyclic.
    pub const PERIODIC: u8 = 1;
    /// Background scan.
    pub const BACKGROUND_SCAN: u8 = 2;
    /// Spontaneous.
    pub const SPONTANEOUS: u8 = 3;
    /// Initialized (communication reset range start).
    pub const INITIALIZED: u8 = 4;
    /// Request or requested (communication reset range end).
    pub const REQUEST: u8 = 5;
    /// Activation.
    pub const ACTIVATION: u8 = 6;
    /// Time synchronization.
    pub const TIME_SYNC: u8 = 8;
    /// General interrogation.
    pub const GENERAL_INTERROGATION: u8 = 9;
    /// General command.
    pub const GENERAL_COMMAND: u8 = 20;
    /// Disturbance data transfer (private range), used for the ASDU 24 orders the assembler
    /// sends back to the slave.
    pub const DISTURBANCE: u8 = 31;
}

/// The protection function a slave negotiated at station initialization.
///
/// IEC 60870-5-103 allocates information numbers per equipment category; the function type
/// narrows which command information numbers a slave accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Wire103ReadWrite)]
#[repr(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FunctionType {
    /// Distance protection.
    Distance = 128,
    /// Overcurrent protection.
    Overcurrent = 160,
    /// Transformer differential protection.
    TransformerDifferential = 176,
    /// Line differential protection.
    LineDifferential = 192,
    /// Generic/other equipment.
    Generic = 254,
    /// Global addressing, not a real function type.
    Global = 255,
}

/// Cause-of-transmission octet, the third byte of a [`Dui`].
///
/// Kept as a thin wrapper rather than a bare `u8` so call sites that only care about named
/// ranges (e.g. "is this a communication-reset report?") read as such, mirroring the
/// `cause::*` constants above.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Wire103ReadWrite)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[wire(bits = 8)]
pub struct Cause {
    #[wire(bits = 8)]
    raw: u8,
}

impl Cause {
    /// Wrap a raw cause-of-transmission byte.
    pub const fn new(raw: u8) -> Self {
        Self { raw }
    }

    /// The raw cause-of-transmission byte.
    pub const fn value(self) -> u8 {
        self.raw
    }

    /// Whether this cause falls in the `3..=5` range the slave uses to report a communication
    /// (link) reset during station initialization.
    pub const fn is_communication_reset(self) -> bool {
        self.raw >= 3 && self.raw <= 5
    }
}

/// Information number, the second byte of an [`Ifi`].
///
/// IEC 60870-5-103 reuses the full `0..=255` range independently per direction and per
/// `FunctionType`; this wrapper exists purely so the header's two trailing bytes read as
/// distinct types at the call site instead of two interchangeable `u8`s.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Wire103ReadWrite)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[wire(bits = 8)]
pub struct InformationNumber {
    #[wire(bits = 8)]
    raw: u8,
}

impl InformationNumber {
    /// Wrap a raw information number.
    pub const fn new(raw: u8) -> Self {
        Self { raw }
    }

    /// The raw information number.
    pub const fn value(self) -> u8 {
        self.raw
    }
}

impl core::fmt::Display for Cause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl core::fmt::Display for InformationNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Data Unit Identifier: the first 4 octets of every ASDU header.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Wire103ReadWrite)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[wire(bits = 32)]
pub struct Dui {
    /// ASDU type identification.
    #[wire(bits = 8)]
    pub type_identification: u8,
    #[wire(bits = 8)]
    vsq: u8,
    /// Cause of transmission.
    #[wire(bits = 8)]
    pub cause_of_transmission: Cause,
    /// Common address of the ASDU (equals the link address; 255 is global).
    #[wire(bits = 8)]
    pub common_address: u8,
}

impl Dui {
    /// Build a DUI from its components.
    pub fn new(
        type_identification: u8,
        information_object_count: u8,
        is_sequence: bool,
        cause_of_transmission: u8,
        common_address: u8,
    ) -> Self {
        let mut vsq = information_object_count & 0x7F;

        if is_sequence {
            vsq |= 0x80;
        }

        Self {
            type_identification,
            vsq,
            cause_of_transmission: Cause::new(cause_of_transmission),
            common_address,
        }
    }

    /// Number of information objects in the ASDU (the variable structure identifier's low 7
    /// bits).
    pub const fn information_object_count(self) -> u8 {
        self.vsq & 0x7F
    }

    /// Whether the information objects use sequential addressing (the variable structure
    /// identifier's top bit).
    pub const fn is_sequence(self) -> bool {
        self.vsq & 0x80 != 0
    }
}

/// Information Object Identifier: the last 2 octets of every ASDU header.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Wire103ReadWrite)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[wire(bits = 16)]
pub struct Ifi {
    /// The protection function this information concerns.
    #[wire(bits = 8)]
    pub function_type: FunctionType,
    /// Information number, identifying the specific data point within `function_type`.
    #[wire(bits = 8)]
    pub information_number: InformationNumber,
}

impl Ifi {
    /// Build an IFI from its components.
    pub fn new(function_type: FunctionType, information_number: u8) -> Self {
        Self {
            function_type,
            information_number: InformationNumber::new(information_number),
        }
    }
}

/// Encoded length of an [`AsduHeader`] in bytes.
pub const ASDU_HEADER_LEN: usize = 6;

/// The full 6 octet ASDU header.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Wire103ReadWrite)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[wire(bits = 48)]
pub struct AsduHeader {
    /// Data unit identifier.
    #[wire(bits = 32)]
    pub dui: Dui,
    /// Information object identifier.
    #[wire(bits = 16)]
    pub ifi: Ifi,
}

impl AsduHeader {
    /// Build a header from a DUI and IFI pair.
    pub fn new(dui: Dui, ifi: Ifi) -> Self {
        Self { dui, ifi }
    }
}

/// Extract the embedded CP56Time2a (and, for types 2 and 4, a relative time offset in
/// milliseconds) from the payload of a time-tagged message (ASDU type 1, 2, or 4).
///
/// `payload` is everything in the ASDU after the 6 octet header. Returns `None` for any other
/// type identification.
pub fn time_from_tagged_message(
    header: &AsduHeader,
    payload: &[u8],
) -> Result<Option<(Cp56Time2a, u16)>, Error> {
    let (time_offset, relative_offset) = match header.dui.type_identification {
        type_id::MESSAGE_TYPE_1 => (1usize, None),
        type_id::MESSAGE_TYPE_2 => (5usize, Some(1usize)),
        type_id::MESSAGE_TYPE_4 => (8usize, Some(4usize)),
        _ => return Ok(None),
    };

    let time_bytes = payload
        .get(time_offset..time_offset + CP56TIME2A_LEN)
        .ok_or(WireError::ReadBufferTooShort)?;

    let time = Cp56Time2a::unpack_from_slice(time_bytes)?;

    let relative = match relative_offset {
        Some(offset) => {
            let bytes = payload
                .get(offset..offset + 2)
                .ok_or(WireError::ReadBufferTooShort)?;

            u16::from_le_bytes([bytes[0], bytes[1]])
        }
        None => 0,
    };

    Ok(Some((time, relative)))
}

/// Decode an ASDU 205 energy-meter reading: the information number (already present in the
/// header) paired with the 4 octet little-endian value immediately following the header.
pub fn energy_reading(header: &AsduHeader, payload: &[u8]) -> Result<(u8, u32), Error> {
    let bytes = payload.get(0..4).ok_or(WireError::ReadBufferTooShort)?;

    Ok((
        header.ifi.information_number.value(),
        u32::from_le_bytes(bytes.try_into().unwrap()),
    ))
}
