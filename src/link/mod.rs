//! Link-layer dialog: FT1.2 framing driven as a primary station (the master).
//!
//! Owns the byte channel exclusively for the lifetime of the session, and tracks the Frame
//! Count Bit required to detect duplicate/lost frames across a confirmed exchange.

use crate::error::{Error, FrameError, ProtocolError};
use crate::fmt;
use crate::ft12::control::{function, reply};
use crate::ft12::{ControlByte, Frame, MAX_FRAME_LEN, MAX_USER_DATA};
use crate::transport::ByteChannel;

/// Construction-time configuration for a [`LinkLayer`].
#[derive(Debug, Copy, Clone)]
pub struct LinkLayerConfig {
    /// Link address of the slave station this master dialogs with.
    pub address: u8,
}

impl Default for LinkLayerConfig {
    fn default() -> Self {
        Self { address: 1 }
    }
}

/// Drives the FT1.2 link layer as a primary station.
pub struct LinkLayer<C> {
    channel: C,
    address: u8,
    fcb: bool,
    rx: heapless::Vec<u8, MAX_FRAME_LEN>,
}

impl<C> LinkLayer<C>
where
    C: ByteChannel,
{
    /// Take ownership of `channel` and start a dialog with the slave at `address`.
    pub fn new(channel: C, address: u8) -> Self {
        Self {
            channel,
            address,
            fcb: true,
            rx: heapless::Vec::new(),
        }
    }

    /// Build a link layer from a [`LinkLayerConfig`].
    pub fn with_config(channel: C, config: LinkLayerConfig) -> Self {
        Self::new(channel, config.address)
    }

    /// The link address currently in use.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Change the link address used for subsequent exchanges.
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Force the frame count bit to a specific value.
    pub fn set_fcb(&mut self, fcb: bool) {
        self.fcb = fcb;
    }

    fn read_byte(&mut self) -> Result<u8, Error> {
        let mut b = [0u8; 1];

        let n = self
            .channel
            .read(&mut b)
            .map_err(|_| Error::Transport)?;

        if n == 0 {
            return Err(Error::Transport);
        }

        Ok(b[0])
    }

    fn read_frame(&mut self) -> Result<Frame, Error> {
        self.rx.clear();

        loop {
            let byte = self.read_byte()?;

            self.rx.push(byte).map_err(|_| Error::Transport)?;

            match Frame::decode(&self.rx) {
                Ok((frame, _consumed)) => return Ok(frame),
                Err(FrameError::Truncated) => continue,
                Err(e) => {
                    fmt::warn!("dropping malformed frame");
                    return Err(Error::InvalidFrame(e));
                }
            }
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let n = self.channel.write(bytes).map_err(|_| Error::Transport)?;

        if n == 0 {
            return Err(Error::Transport);
        }

        Ok(())
    }

    fn send_frame(&mut self, control: ControlByte, user_data: Option<&[u8]>) -> Result<(), Error> {
        match user_data {
            Some(data) => {
                let bytes = Frame::encode_variable(control, self.address, data)?;
                self.write_all(&bytes)
            }
            None => {
                let bytes = Frame::encode_fixed(control, self.address);
                self.write_all(&bytes)
            }
        }
    }

    /// Send `control`/`user_data`, read back a reply, and retry the identical outbound frame on
    /// address mismatch or NACK. Surfaces [`ProtocolError::UnexpectedPrm`] and
    /// [`ProtocolError::DataFlowOverflow`] immediately rather than retrying, since those
    /// indicate the slave is present but unhappy, not that the reply was lost.
    ///
    /// When `check_ack` is set, a secondary-direction function code of
    /// [`reply::NACK`] triggers a retry rather than being returned to the caller.
    fn send_receive_and_check(
        &mut self,
        control: ControlByte,
        user_data: Option<&[u8]>,
        check_ack: bool,
    ) -> Result<Frame, Error> {
        loop {
            self.send_frame(control, user_data)?;

            let reply_frame = self.read_frame()?;

            let (reply_control, reply_address) = match &reply_frame {
                Frame::Fixed { control, address } => (*control, *address),
                Frame::Variable {
                    control, address, ..
                } => (*control, *address),
                Frame::SingleAck => return Ok(reply_frame),
            };

            if reply_address != self.address {
                fmt::debug!("link reply address mismatch, retrying");
                continue;
            }

            if reply_control.prm() {
                return Err(Error::Protocol(ProtocolError::UnexpectedPrm));
            }

            if reply_control.dfc() {
                return Err(Error::Protocol(ProtocolError::DataFlowOverflow));
            }

            if check_ack && reply_control.function() == reply::NACK {
                fmt::debug!("link reply NACKed, retrying");
                continue;
            }

            return Ok(reply_frame);
        }
    }

    /// Reset the remote link. Forces the frame count bit back to `1` on success.
    pub fn reset_remote_link(&mut self) -> Result<(), Error> {
        let control = ControlByte::primary(function::RESET_REMOTE_LINK, false, false);

        self.send_receive_and_check(control, None, true)?;

        self.fcb = true;

        Ok(())
    }

    /// Request the slave's link status.
    pub fn status_link(&mut self) -> Result<(), Error> {
        let control = ControlByte::primary(function::REQUEST_STATUS_OF_LINK, self.fcb, true);

        self.send_receive_and_check(control, None, false)?;

        self.fcb = !self.fcb;

        Ok(())
    }

    /// Send user data. When `confirmed`, waits for and validates a reply, and toggles the frame
    /// count bit on success. Unconfirmed sends are fire-and-forget.
    pub fn send_user_data(&mut self, data: &[u8], confirmed: bool) -> Result<(), Error> {
        let function = if confirmed {
            function::USER_DATA_CONFIRMED
        } else {
            function::USER_DATA_UNCONFIRMED
        };

        let control = ControlByte::primary(function, self.fcb, confirmed);

        if confirmed {
            self.send_receive_and_check(control, Some(data), true)?;
            self.fcb = !self.fcb;
        } else {
            self.send_frame(control, Some(data))?;
        }

        Ok(())
    }

    fn request_class(&mut self, function: u8) -> Result<Option<heapless::Vec<u8, MAX_USER_DATA>>, Error> {
        let control = ControlByte::primary(function, self.fcb, true);

        let reply_frame = self.send_receive_and_check(control, None, false)?;

        self.fcb = !self.fcb;

        match reply_frame {
            Frame::Variable { user_data, .. } if !user_data.is_empty() => Ok(Some(user_data)),
            _ => Ok(None),
        }
    }

    /// Poll for class 1 (high priority/event) data.
    pub fn request_class_1(&mut self) -> Result<Option<heapless::Vec<u8, MAX_USER_DATA>>, Error> {
        self.request_class(function::REQUEST_CLASS_1)
    }

    /// Poll for class 2 (low priority/cyclic) data.
    pub fn request_class_2(&mut self) -> Result<Option<heapless::Vec<u8, MAX_USER_DATA>>, Error> {
        self.request_class(function::REQUEST_CLASS_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// An in-memory byte channel backed by canned reply bytes, recording everything written to
    /// it. Mirrors the `tests/replay-*.rs` canned-byte-stream pattern.
    struct Replay {
        to_read: heapless::spsc::Queue<u8, 512>,
        written: heapless::Vec<u8, 512>,
    }

    impl Replay {
        fn new(bytes: &[u8]) -> Self {
            let mut to_read = heapless::spsc::Queue::new();

            for &b in bytes {
                let _ = to_read.enqueue(b);
            }

            Self {
                to_read,
                written: heapless::Vec::new(),
            }
        }
    }

    impl embedded_io::ErrorType for Replay {
        type Error = core::convert::Infallible;
    }

    impl embedded_io::Read for Replay {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let mut n = 0;

            for slot in buf.iter_mut() {
                match self.to_read.dequeue() {
                    Some(b) => {
                        *slot = b;
                        n += 1;
                    }
                    None => break,
                }
            }

            Ok(n)
        }
    }

    impl embedded_io::Write for Replay {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            let _ = self.written.extend_from_slice(buf);

            Ok(buf.len())
        }
    }

    #[test]
    fn reset_remote_link_sets_fcb() {
        let channel = Replay::new(&[0xE5]);
        let mut link = LinkLayer::new(channel, 0x01);

        link.set_fcb(false);
        link.reset_remote_link().unwrap();

        assert!(link.fcb);
    }

    #[test]
    fn address_mismatch_retries() {
        // First reply has the wrong address (0x02), second is correct (0x01).
        let bad = Frame::encode_fixed(ControlByte::from_raw(0x00), 0x02);
        let good = [0xE5];

        let mut bytes = heapless::Vec::<u8, 512>::new();
        bytes.extend_from_slice(&bad).unwrap();
        bytes.extend_from_slice(&good).unwrap();

        let channel = Replay::new(&bytes);
        let mut link = LinkLayer::new(channel, 0x01);

        link.reset_remote_link().unwrap();
    }
}
