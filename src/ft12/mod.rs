//! FT1.2 asynchronous balanced transmission framing (IEC 60870-5-1).
//!
//! Three frame shapes share the channel: a 5 octet fixed-length frame for control dialog with
//! no payload, a variable-length frame carrying an ASDU, and the single `0xE5` byte that stands
//! in for a positive acknowledgement with no frame structure at all.

pub(crate) mod control;

pub use control::ControlByte;

use crate::error::FrameError;

/// Start byte of a fixed-length frame.
pub const START_FIXED: u8 = 0x10;
/// Start byte of a variable-length frame (also its own trailing repeat before the payload).
pub const START_VARIABLE: u8 = 0x68;
/// End byte shared by both frame shapes.
pub const END: u8 = 0x16;
/// The lone byte that represents a positive single-character acknowledgement.
pub const SINGLE_ACK: u8 = 0xE5;

/// Largest user-data payload a variable frame can carry, bounded by the single-byte length
/// field (`L <= 255`, two of which are consumed by control and address).
pub const MAX_USER_DATA: usize = 253;

/// Largest possible encoded frame: `68 L L 68` + control + address + user data + checksum + `16`.
pub const MAX_FRAME_LEN: usize = 4 + MAX_USER_DATA + 2;

/// Sum of `control`, `address` and every user-data byte, wrapping at 8 bits.
pub fn checksum(control: u8, address: u8, user_data: &[u8]) -> u8 {
    user_data
        .iter()
        .fold(control.wrapping_add(address), |acc, &b| acc.wrapping_add(b))
}

/// A decoded or to-be-encoded FT1.2 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Fixed-length frame: control dialog with no payload.
    Fixed {
        /// Link-layer control byte.
        control: ControlByte,
        /// Link address of the station this frame concerns.
        address: u8,
    },
    /// Variable-length frame carrying an ASDU (or other user data) payload.
    Variable {
        /// Link-layer control byte.
        control: ControlByte,
        /// Link address of the station this frame concerns.
        address: u8,
        /// ASDU or other application payload.
        user_data: heapless::Vec<u8, MAX_USER_DATA>,
    },
    /// The single-character positive acknowledgement, `0xE5`.
    SingleAck,
}

impl Frame {
    /// Encode a fixed-length frame into its 5 byte wire representation.
    pub fn encode_fixed(control: ControlByte, address: u8) -> [u8; 5] {
        let checksum = checksum(control.raw(), address, &[]);

        [START_FIXED, control.raw(), address, checksum, END]
    }

    /// Encode a variable-length frame carrying `user_data`.
    pub fn encode_variable(
        control: ControlByte,
        address: u8,
        user_data: &[u8],
    ) -> Result<heapless::Vec<u8, MAX_FRAME_LEN>, FrameError> {
        if user_data.len() > MAX_USER_DATA {
            return Err(FrameError::UserDataTooLong);
        }

        let length = (2 + user_data.len()) as u8;
        let checksum = checksum(control.raw(), address, user_data);

        let mut out = heapless::Vec::new();

        // Infallible: MAX_FRAME_LEN is sized to fit the longest possible frame.
        let _ = out.push(START_VARIABLE);
        let _ = out.push(length);
        let _ = out.push(length);
        let _ = out.push(START_VARIABLE);
        let _ = out.push(control.raw());
        let _ = out.push(address);
        let _ = out.extend_from_slice(user_data);
        let _ = out.push(checksum);
        let _ = out.push(END);

        Ok(out)
    }

    /// Decode a frame from the start of `buf`, returning the frame and the number of bytes it
    /// consumed. Returns [`FrameError::Truncated`] if `buf` does not yet hold a complete frame;
    /// the caller should read more bytes and retry rather than treating this as fatal.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), FrameError> {
        match buf.first().copied() {
            Some(START_FIXED) => {
                if buf.len() < 5 {
                    return Err(FrameError::Truncated);
                }

                if buf[4] != END {
                    return Err(FrameError::BadEnd);
                }

                let (control, address, checksum_byte) = (buf[1], buf[2], buf[3]);

                if checksum_byte != checksum(control, address, &[]) {
                    return Err(FrameError::BadChecksum);
                }

                Ok((
                    Frame::Fixed {
                        control: ControlByte::from_raw(control),
                        address,
                    },
                    5,
                ))
            }
            Some(START_VARIABLE) => {
                if buf.len() < 4 {
                    return Err(FrameError::Truncated);
                }

                let (length, length_repeat) = (buf[1], buf[2]);

                if buf[3] != START_VARIABLE {
                    return Err(FrameError::BadStart);
                }

                if length != length_repeat {
                    return Err(FrameError::LengthMismatch);
                }

                if length < 2 {
                    return Err(FrameError::LengthMismatch);
                }

                let user_data_len = length as usize - 2;
                let total_len = 4 + 2 + user_data_len + 2;

                if buf.len() < total_len {
                    return Err(FrameError::Truncated);
                }

                let (control, address) = (buf[4], buf[5]);
                let user_data = &buf[6..6 + user_data_len];
                let checksum_byte = buf[6 + user_data_len];

                if buf[6 + user_data_len + 1] != END {
                    return Err(FrameError::BadEnd);
                }

                if checksum_byte != checksum(control, address, user_data) {
                    return Err(FrameError::BadChecksum);
                }

                let mut owned = heapless::Vec::new();
                owned
                    .extend_from_slice(user_data)
                    .map_err(|_| FrameError::UserDataTooLong)?;

                Ok((
                    Frame::Variable {
                        control: ControlByte::from_raw(control),
                        address,
                        user_data: owned,
                    },
                    total_len,
                ))
            }
            Some(SINGLE_ACK) => Ok((Frame::SingleAck, 1)),
            Some(_) => Err(FrameError::BadStart),
            None => Err(FrameError::Truncated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixed_frame_roundtrip() {
        let control = ControlByte::primary(0x09, false, false);
        let bytes = Frame::encode_fixed(control, 0x01);

        let (frame, consumed) = Frame::decode(&bytes).unwrap();

        assert_eq!(consumed, 5);
        assert_eq!(
            frame,
            Frame::Fixed {
                control,
                address: 0x01
            }
        );
    }

    #[test]
    fn fixed_frame_exact_bytes() {
        // Control byte 0x49 is not reproducible via `primary()` alone (it sets bits outside the
        // helper's vocabulary), so poke the raw byte directly as the spec's example does.
        let control = ControlByte::from_raw(0x49);
        let bytes = Frame::encode_fixed(control, 0x01);

        assert_eq!(bytes, [0x10, 0x49, 0x01, 0x4A, 0x16]);
    }

    #[test]
    fn variable_frame_exact_bytes() {
        let control = ControlByte::from_raw(0x73);
        let bytes = Frame::encode_variable(control, 0x01, &[0xAA]).unwrap();

        assert_eq!(
            bytes.as_slice(),
            &[0x68, 0x03, 0x03, 0x68, 0x73, 0x01, 0xAA, 0x1E, 0x16]
        );
    }

    #[test]
    fn single_ack_decodes() {
        let (frame, consumed) = Frame::decode(&[0xE5]).unwrap();

        assert_eq!(consumed, 1);
        assert_eq!(frame, Frame::SingleAck);
    }

    #[test]
    fn bad_checksum_rejected() {
        let control = ControlByte::from_raw(0x73);
        let mut bytes = Frame::encode_variable(control, 0x01, &[0xAA]).unwrap();

        // Flip a user-data bit.
        bytes[6] ^= 0xFF;

        assert_eq!(Frame::decode(&bytes), Err(FrameError::BadChecksum));
    }

    #[test]
    fn length_mismatch_rejected() {
        let mut bytes = Frame::encode_variable(ControlByte::from_raw(0x73), 0x01, &[0xAA]).unwrap();

        bytes[2] = bytes[1] + 1;

        assert_eq!(Frame::decode(&bytes), Err(FrameError::LengthMismatch));
    }

    #[test]
    fn truncated_buffer_is_truncated_not_malformed() {
        let bytes = Frame::encode_variable(ControlByte::from_raw(0x73), 0x01, &[0xAA]).unwrap();

        assert_eq!(
            Frame::decode(&bytes[..bytes.len() - 1]),
            Err(FrameError::Truncated)
        );
    }
}
