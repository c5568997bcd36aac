//! Application-layer dialog driver: station initialization, time synchronization, general
//! interrogation, command transmission, and the polling loop that feeds the link layer's class 1
//! and class 2 data into the disturbance assembler (under `std`).

use crate::asdu::{cause, type_id, AsduHeader, Cp56Time2a, Dui, Ifi, ASDU_HEADER_LEN};
use crate::error::{Error, ProtocolError};
use crate::fmt;
use crate::ft12::MAX_USER_DATA;
use crate::link::{LinkLayer, LinkLayerConfig};
use crate::transport::ByteChannel;
use wire103::{Wire103Read, Wire103Write};

pub use crate::asdu::FunctionType;

#[cfg(feature = "std")]
use crate::disturbance::{DisturbanceAssembler, DisturbanceOrder, DisturbanceRecord, Progress};

/// Largest ASDU payload (everything after the 6 octet header) that fits in one FT1.2 frame.
pub const MAX_ASDU_PAYLOAD: usize = MAX_USER_DATA - ASDU_HEADER_LEN;

/// How many times a bounded polling loop retries before giving up.
///
/// Mirrors a retry-policy-as-data shape rather than a bare loop count, so the bound is visible
/// at the call site and the "retry forever" case (used by the blocking station-start variant)
/// doesn't need a magic sentinel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RetryBudget {
    /// Give up after this many attempts.
    Count(u32),
    /// Retry forever.
    Forever,
}

impl RetryBudget {
    fn attempts(self) -> u32 {
        match self {
            RetryBudget::Count(n) => n,
            RetryBudget::Forever => u32::MAX,
        }
    }
}

/// Retry policy for the application manager's bounded polling loops.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Timeouts {
    /// How many times `station_init` polls class 1 data waiting for the identification ASDU
    /// before giving up.
    pub class1_poll_attempts: RetryBudget,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            class1_poll_attempts: RetryBudget::Count(16),
        }
    }
}

/// Construction-time configuration for an [`ApplicationManager`].
#[derive(Debug, Copy, Clone, Default)]
pub struct ApplicationConfig {
    /// Link-layer configuration (address).
    pub link: LinkLayerConfig,
    /// Retry policy for bounded polling loops.
    pub timeouts: Timeouts,
}

/// A general command, as sent by [`ApplicationManager::command_transmission`].
///
/// Grounded in `original_source/Open103/IEC8705103Manager.h`'s `Command` enum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Auto-recloser on/off.
    AutoRecloserOnOff = 16,
    /// Teleprotection on/off.
    TeleprotectionOnOff = 17,
    /// Protection on/off.
    ProtectionOnOff = 18,
    /// LED reset.
    LedReset = 19,
    /// Activate characteristic 1.
    ActivateChar1 = 23,
    /// Activate characteristic 2.
    ActivateChar2 = 24,
    /// Activate characteristic 3.
    ActivateChar3 = 25,
    /// Activate characteristic 4.
    ActivateChar4 = 26,
}

impl Command {
    /// The wire information-number value for this command.
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Whether `function_type` is permitted to accept this command, per §4.E's table.
    pub const fn allowed_for(self, function_type: FunctionType) -> bool {
        match function_type {
            FunctionType::Distance => true,
            FunctionType::Overcurrent => matches!(
                self,
                Command::AutoRecloserOnOff
                    | Command::TeleprotectionOnOff
                    | Command::ProtectionOnOff
                    | Command::LedReset
            ),
            FunctionType::LineDifferential => matches!(
                self,
                Command::AutoRecloserOnOff | Command::ProtectionOnOff | Command::LedReset
            ),
            FunctionType::TransformerDifferential => {
                matches!(self, Command::ProtectionOnOff | Command::LedReset)
            }
            FunctionType::Generic | FunctionType::Global => false,
        }
    }
}

/// Double command output state, `DCO` in §4.E.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandState {
    /// Command OFF.
    Off = 1,
    /// Command ON.
    On = 2,
}

/// Which priority class to poll for inbound data.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PollClass {
    /// High-priority/event data.
    Class1,
    /// Low-priority/cyclic data.
    Class2,
}

/// A decoded ASDU returned from [`ApplicationManager::next_asdu`]: a header plus whatever
/// type-specific bytes followed it.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Asdu {
    /// The decoded 6 octet header.
    pub header: AsduHeader,
    /// Bytes following the header.
    pub payload: heapless::Vec<u8, MAX_ASDU_PAYLOAD>,
}

/// Drives the application layer of a single master/slave session.
pub struct ApplicationManager<C> {
    link: LinkLayer<C>,
    timeouts: Timeouts,
    function_type: Option<FunctionType>,
    #[cfg(feature = "std")]
    disturbance: DisturbanceAssembler,
}

impl<C> ApplicationManager<C>
where
    C: ByteChannel,
{
    /// Take ownership of `channel` and start a session with the slave at `address`.
    pub fn new(channel: C, address: u8) -> Self {
        Self::with_config(
            channel,
            ApplicationConfig {
                link: LinkLayerConfig { address },
                ..ApplicationConfig::default()
            },
        )
    }

    /// Build a manager from an [`ApplicationConfig`].
    pub fn with_config(channel: C, config: ApplicationConfig) -> Self {
        Self {
            link: LinkLayer::with_config(channel, config.link),
            timeouts: config.timeouts,
            function_type: None,
            #[cfg(feature = "std")]
            disturbance: DisturbanceAssembler::new(),
        }
    }

    /// Change the link address used for subsequent exchanges.
    pub fn set_address(&mut self, address: u8) {
        self.link.set_address(address);
    }

    /// Force the frame count bit to a specific value.
    pub fn set_fcb(&mut self, fcb: bool) {
        self.link.set_fcb(fcb);
    }

    /// The protection function negotiated at [`ApplicationManager::station_init`], if any.
    pub fn function_type(&self) -> Option<FunctionType> {
        self.function_type
    }

    fn asdu_header(&self, type_identification: u8, cause_of_transmission: u8) -> AsduHeader {
        AsduHeader::new(
            Dui::new(
                type_identification,
                1,
                true,
                cause_of_transmission,
                self.link.address(),
            ),
            Ifi::new(FunctionType::Global, 0),
        )
    }

    /// Reset the link, request link status, then poll class 1 data until the slave's
    /// identification ASDU (type 5) arrives, latching [`ApplicationManager::function_type`].
    pub fn station_init(&mut self) -> Result<(), Error> {
        self.link.reset_remote_link()?;
        self.link.status_link()?;

        for _ in 0..self.timeouts.class1_poll_attempts.attempts() {
            let Some(data) = self.link.request_class_1()? else {
                continue;
            };

            if data.len() < ASDU_HEADER_LEN + 1 {
                continue;
            }

            let header = AsduHeader::unpack_from_slice(&data[..ASDU_HEADER_LEN])?;

            if header.dui.type_identification != type_id::IDENTIFICATION
                || header.dui.common_address != self.link.address()
                || !header.dui.is_sequence()
            {
                continue;
            }

            self.function_type = Some(header.ifi.function_type);

            if header.dui.cause_of_transmission.is_communication_reset() {
                fmt::debug!("slave reported communication reset during station init");
                // Best-effort: this poll only closes out the reset handshake, it is not
                // required for station_init itself to have succeeded.
                let _ = self.link.request_class_1();
            }

            fmt::info!("station init complete");
            return Ok(());
        }

        Err(Error::Protocol(ProtocolError::UnexpectedReply))
    }

    /// Send the local wall clock (already encoded by the caller) as a time synchronization ASDU.
    pub fn time_sync(&mut self, time: Cp56Time2a) -> Result<(), Error> {
        let header = self.asdu_header(type_id::TIME_SYNCHRONIZATION, cause::TIME_SYNC);

        let mut buf = [0u8; ASDU_HEADER_LEN + crate::asdu::CP56TIME2A_LEN];
        header.pack_to_slice(&mut buf[..ASDU_HEADER_LEN])?;
        time.pack_to_slice(&mut buf[ASDU_HEADER_LEN..])?;

        self.link.send_user_data(&buf, true)
    }

    /// Request a general interrogation scan.
    pub fn general_interrogation(&mut self, scan: u8) -> Result<(), Error> {
        let header = self.asdu_header(type_id::GENERAL_INTERROGATION, cause::GENERAL_INTERROGATION);

        let mut buf = [0u8; ASDU_HEADER_LEN + 1];
        header.pack_to_slice(&mut buf[..ASDU_HEADER_LEN])?;
        buf[ASDU_HEADER_LEN] = scan;

        self.link.send_user_data(&buf, true)
    }

    /// Send a general command, rejecting combinations the negotiated function type doesn't
    /// permit without writing anything to the channel.
    pub fn command_transmission(
        &mut self,
        function_type: FunctionType,
        command: Command,
        state: CommandState,
        rii: u8,
    ) -> Result<(), Error> {
        if !command.allowed_for(function_type) {
            return Err(Error::UnsupportedCommand);
        }

        let header = AsduHeader::new(
            Dui::new(type_id::GENERAL_COMMAND, 1, true, cause::GENERAL_COMMAND, self.link.address()),
            Ifi::new(function_type, command.value()),
        );

        let mut buf = [0u8; ASDU_HEADER_LEN + 2];
        header.pack_to_slice(&mut buf[..ASDU_HEADER_LEN])?;
        buf[ASDU_HEADER_LEN] = state as u8;
        buf[ASDU_HEADER_LEN + 1] = rii;

        self.link.send_user_data(&buf, true)
    }

    /// Poll for one ASDU of the given priority class, if any is waiting.
    pub fn next_asdu(&mut self, class: PollClass) -> Result<Option<Asdu>, Error> {
        let data = match class {
            PollClass::Class1 => self.link.request_class_1()?,
            PollClass::Class2 => self.link.request_class_2()?,
        };

        let Some(data) = data else {
            return Ok(None);
        };

        if data.len() < ASDU_HEADER_LEN {
            return Ok(None);
        }

        let header = AsduHeader::unpack_from_slice(&data[..ASDU_HEADER_LEN])?;

        let mut payload = heapless::Vec::new();
        payload
            .extend_from_slice(&data[ASDU_HEADER_LEN..])
            .map_err(|_| Error::Transport)?;

        Ok(Some(Asdu { header, payload }))
    }

    /// Station init, time sync, general interrogation, then a `LedReset` ON command — the
    /// default bring-up sequence from §4.E.
    pub fn station_start(&mut self, now: Cp56Time2a) -> Result<(), Error> {
        self.station_init()?;
        self.time_sync(now)?;
        self.general_interrogation(self.link.address())?;

        let function_type = self
            .function_type
            .ok_or(Error::Protocol(ProtocolError::UnexpectedReply))?;

        self.command_transmission(function_type, Command::LedReset, CommandState::On, 10)
    }

    /// Run [`ApplicationManager::station_start`] repeatedly until it succeeds, re-sampling the
    /// clock via `now` on every attempt.
    pub fn blocking_station_start(&mut self, mut now: impl FnMut() -> Cp56Time2a) {
        loop {
            if self.station_start(now()).is_ok() {
                return;
            }

            fmt::warn!("station start failed, retrying");
        }
    }
}

#[cfg(feature = "std")]
impl<C> ApplicationManager<C>
where
    C: ByteChannel,
{
    /// Feed one inbound ASDU into the disturbance assembler, sending back whatever ASDU 24
    /// order it produces.
    pub fn feed_disturbance(&mut self, asdu: &Asdu) -> Result<Progress, Error> {
        let (progress, order) = self.disturbance.feed(&asdu.header, &asdu.payload)?;

        if let Some(order) = order {
            self.send_disturbance_order(order)?;
        }

        Ok(progress)
    }

    /// The most recently sealed disturbance record, if any.
    pub fn current_disturbance(&self) -> Option<&DisturbanceRecord> {
        self.disturbance.current()
    }

    fn send_disturbance_order(&mut self, order: DisturbanceOrder) -> Result<(), Error> {
        let header = self.asdu_header(24, cause::DISTURBANCE);

        let mut buf = [0u8; ASDU_HEADER_LEN + 5];
        header.pack_to_slice(&mut buf[..ASDU_HEADER_LEN])?;

        buf[ASDU_HEADER_LEN] = order.order;
        buf[ASDU_HEADER_LEN + 1] = order.tov;
        let fault_number = order.fault_number.to_le_bytes();
        buf[ASDU_HEADER_LEN + 2] = fault_number[0];
        buf[ASDU_HEADER_LEN + 3] = fault_number[1];
        buf[ASDU_HEADER_LEN + 4] = order.acc;

        self.link.send_user_data(&buf, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ft12::{control::reply, ControlByte, Frame};
    use pretty_assertions::assert_eq;

    struct Replay {
        to_read: heapless::spsc::Queue<u8, 512>,
        written: heapless::Vec<heapless::Vec<u8, MAX_USER_DATA>, 16>,
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
            let mut frame = heapless::Vec::new();
            let _ = frame.extend_from_slice(buf);
            let _ = self.written.push(frame);
            Ok(buf.len())
        }
    }

    fn identification_frame(address: u8, cause_of_transmission: u8) -> heapless::Vec<u8, 512> {
        let header = AsduHeader::new(
            Dui::new(type_id::IDENTIFICATION, 1, true, cause_of_transmission, address),
            Ifi::new(FunctionType::Distance, 3),
        );

        let mut payload = [0u8; ASDU_HEADER_LEN + 14];
        header.pack_to_slice(&mut payload[..ASDU_HEADER_LEN]).unwrap();
        payload[ASDU_HEADER_LEN] = 0x01;
        payload[ASDU_HEADER_LEN + 1..].copy_from_slice(b"identify_str_");

        let control = ControlByte::secondary(reply::RESPONSE_USER_DATA, false);
        Frame::encode_variable(control, address, &payload)
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn station_init_latches_function_type() {
        let mut bytes = heapless::Vec::<u8, 512>::new();
        bytes.extend_from_slice(&[0xE5]).unwrap(); // reset ack
        bytes.extend_from_slice(&[0xE5]).unwrap(); // status ack
        bytes
            .extend_from_slice(&identification_frame(0x01, cause::SPONTANEOUS))
            .unwrap();

        let channel = Replay::new(&bytes);
        let mut app = ApplicationManager::new(channel, 0x01);

        app.station_init().unwrap();

        assert_eq!(app.function_type(), Some(FunctionType::Distance));
    }

    #[test]
    fn command_rejected_for_unsupported_function_type() {
        let channel = Replay::new(&[]);
        let mut app = ApplicationManager::new(channel, 0x01);

        let result = app.command_transmission(
            FunctionType::Overcurrent,
            Command::ActivateChar1,
            CommandState::On,
            1,
        );

        assert_eq!(result, Err(Error::UnsupportedCommand));
    }

}
