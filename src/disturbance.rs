//! Disturbance record assembler: the multi-ASDU state machine that reconstructs a fault
//! recording out of the ASDU 23/26–31 exchange.
//!
//! Only available under `std`: a sealed record can hold up to 255 channels of up to 5000
//! samples each, which does not fit comfortably in a `heapless` fixed-capacity buffer the way
//! the rest of this crate's wire types do. COMTRADE export (`crate::comtrade`) is file-I/O bound
//! anyway, so gating both behind `std` costs nothing a no_std build would have used.

use std::collections::BTreeMap;
use std::vec::Vec;

use wire103::Wire103Read;

use crate::asdu::{type_id, AsduHeader, Cp56Time2a};
use crate::error::{AbortCode, Error};
use crate::fmt;
use wire103::WireError;

fn u16_le(buf: &[u8], offset: usize) -> Result<u16, Error> {
    let chunk = buf
        .get(offset..offset + 2)
        .ok_or(WireError::ReadBufferTooShort)?;
    Ok(u16::from_le_bytes([chunk[0], chunk[1]]))
}

fn byte(buf: &[u8], offset: usize) -> Result<u8, Error> {
    buf.get(offset)
        .copied()
        .ok_or_else(|| Error::from(WireError::ReadBufferTooShort))
}

/// A single recorded event tag: a double-point state change latched to a `(function_type,
/// information_number)` data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tag {
    /// Raw function type byte the tag concerns (not necessarily a standardized
    /// [`crate::FunctionType`] — generic equipment may tag private data points).
    pub function_type: u8,
    /// Information number the tag concerns.
    pub information_number: u8,
    /// Raw double-point value, `0..=3`.
    pub dip: u8,
}

impl Tag {
    /// The decoded channel state: `DIP - 1`, per the wire convention.
    pub fn channel_state(self) -> i8 {
        self.dip as i8 - 1
    }
}

/// A batch of tags that all take effect at the same sample index.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TagBlock {
    /// Sample index at which these tags take effect.
    pub tap: u16,
    /// The tags in this batch.
    pub tags: Vec<Tag>,
}

/// A single analog channel's accumulated descriptor and samples.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Channel {
    /// Time of validity byte from the channel's most recent ASDU.
    pub tov: u8,
    /// Primary value scaling factor.
    pub rpv: f32,
    /// Secondary value scaling factor.
    pub rsv: f32,
    /// Actual-value scaling factor.
    pub rfa: f32,
    /// Signed sample buffer, indexed by sample position within the record.
    pub samples: Vec<i16>,
}

/// A fully or partially assembled disturbance recording.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DisturbanceRecord {
    /// Fault number assigned by the relay.
    pub fault_number: u16,
    /// Sampling interval, in microseconds.
    pub sampling_interval_us: u16,
    /// Time of the first sample.
    pub start_time: Cp56Time2a,
    /// Time the fault was recorded.
    pub event_time: Cp56Time2a,
    /// Number of samples present in every channel once the record is sealed.
    pub channel_elements: u16,
    /// Per-channel descriptors and samples, keyed by `ACC` (channel code, `1..=255`).
    pub channels: BTreeMap<u8, Channel>,
    /// Accumulated tag batches, in arrival order.
    pub tag_blocks: Vec<TagBlock>,
}

impl Default for DisturbanceRecord {
    fn default() -> Self {
        Self {
            fault_number: 0,
            sampling_interval_us: 0,
            start_time: Cp56Time2a::default(),
            event_time: Cp56Time2a::default(),
            channel_elements: 0,
            channels: BTreeMap::new(),
            tag_blocks: Vec::new(),
        }
    }
}

/// An outbound ASDU 24 "order" the caller must send back to the slave in response to an inbound
/// disturbance ASDU. Carries `FAN`/`ACC` for correlation, per §4.F.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DisturbanceOrder {
    /// Order byte (offset 6 of the ASDU 24 payload); see §4.F's table.
    pub order: u8,
    /// Time-of-validity byte echoed from the triggering ASDU, or 0 where none exists.
    pub tov: u8,
    /// Fault number being acknowledged.
    pub fault_number: u16,
    /// Channel being acknowledged, or 0 when the order is not channel-specific.
    pub acc: u8,
}

/// The outcome of feeding one ASDU to the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Progress {
    /// The ASDU was not a disturbance type this assembler dispatches on.
    Unrelated,
    /// A disturbance transfer was requested or is already underway (ASDU 23).
    Requested,
    /// The record is still accumulating (ASDU 26–30).
    Transferring,
    /// The record was sealed (ASDU 31, TOO=32) and is now available from [`DisturbanceAssembler::current`].
    Sealed,
    /// The transfer was aborted or ended negatively (ASDU 31, TOO other than 32); no record is
    /// available for this attempt.
    Aborted(AbortCode),
}

/// Multi-ASDU state machine that reconstructs a disturbance recording.
///
/// Owns the record in progress outright; callers only ever see an immutable view of the most
/// recently sealed one.
#[derive(Debug, Default)]
pub struct DisturbanceAssembler {
    record: Option<DisturbanceRecord>,
    sealed: Option<DisturbanceRecord>,
}

impl DisturbanceAssembler {
    /// Build an assembler with no record in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently sealed record, if any.
    pub fn current(&self) -> Option<&DisturbanceRecord> {
        self.sealed.as_ref()
    }

    /// Feed one inbound ASDU (header plus the bytes following it) to the state machine.
    pub fn feed(
        &mut self,
        header: &AsduHeader,
        payload: &[u8],
    ) -> Result<(Progress, Option<DisturbanceOrder>), Error> {
        match header.dui.type_identification {
            type_id::DISTURBANCE_REQUEST => self.on_request(payload),
            type_id::DISTURBANCE_TRANSFER => self.on_transfer(payload),
            type_id::DISTURBANCE_CHANNEL => self.on_channel(payload),
            type_id::DISTURBANCE_TAGS_READY => self.on_tags_ready(payload),
            type_id::DISTURBANCE_TAGS => self.on_tags(payload),
            type_id::DISTURBANCE_CHANNEL_SAMPLES => self.on_channel_samples(payload),
            type_id::DISTURBANCE_END => self.on_end(payload),
            _ => Ok((Progress::Unrelated, None)),
        }
    }

    fn on_request(
        &mut self,
        payload: &[u8],
    ) -> Result<(Progress, Option<DisturbanceOrder>), Error> {
        let fault_number = u16_le(payload, 0)?;
        let sof = byte(payload, 2)?;
        let event_time_bytes = payload
            .get(3..3 + crate::asdu::CP56TIME2A_LEN)
            .ok_or(WireError::ReadBufferTooShort)?;
        let event_time = Cp56Time2a::unpack_from_slice(event_time_bytes)?;

        self.record = Some(DisturbanceRecord {
            fault_number,
            event_time,
            ..DisturbanceRecord::default()
        });

        let already_in_progress = sof & 0x02 == 0x02;
        let order = if already_in_progress {
            fmt::debug!("disturbance already in transmission, not requesting transfer");
            None
        } else {
            Some(DisturbanceOrder {
                order: 1,
                tov: 0,
                fault_number,
                acc: 0,
            })
        };

        Ok((Progress::Requested, order))
    }

    fn on_transfer(
        &mut self,
        payload: &[u8],
    ) -> Result<(Progress, Option<DisturbanceOrder>), Error> {
        // Byte 0 is skipped (unused in this direction); TOV and everything after it is shifted
        // one byte later than the other disturbance ASDUs.
        let tov = byte(payload, 1)?;
        let fault_number = u16_le(payload, 2)?;
        let noc = byte(payload, 6)?;
        let _ = noc; // number of channels; channels are discovered as ASDU 27s arrive
        let noe = u16_le(payload, 7)?;
        let interval = u16_le(payload, 9)?;
        let start_time_bytes = payload
            .get(11..11 + crate::asdu::CP56TIME2A_LEN)
            .ok_or(WireError::ReadBufferTooShort)?;
        let start_time = Cp56Time2a::unpack_from_slice(start_time_bytes)?;

        let record = self.record.get_or_insert_with(DisturbanceRecord::default);
        record.fault_number = fault_number;
        record.sampling_interval_us = interval;
        record.channel_elements = noe;
        record.start_time = start_time.with_date_from(record.event_time);

        let order = DisturbanceOrder {
            order: 2,
            tov,
            fault_number,
            acc: 0,
        };

        Ok((Progress::Transferring, Some(order)))
    }

    fn on_channel(
        &mut self,
        payload: &[u8],
    ) -> Result<(Progress, Option<DisturbanceOrder>), Error> {
        // Byte 0 is skipped, same as `on_transfer`.
        let tov = byte(payload, 1)?;
        let fault_number = u16_le(payload, 2)?;
        let acc = byte(payload, 4)?;
        let rpv = f32::unpack_from_slice(payload.get(5..9).ok_or(WireError::ReadBufferTooShort)?)?;
        let rsv = f32::unpack_from_slice(payload.get(9..13).ok_or(WireError::ReadBufferTooShort)?)?;
        let rfa = f32::unpack_from_slice(payload.get(13..17).ok_or(WireError::ReadBufferTooShort)?)?;

        let record = self.record.get_or_insert_with(DisturbanceRecord::default);
        let channel = record.channels.entry(acc).or_default();
        channel.tov = tov;
        channel.rpv = rpv;
        channel.rsv = rsv;
        channel.rfa = rfa;

        let order = DisturbanceOrder {
            order: 8,
            tov,
            fault_number,
            acc,
        };

        Ok((Progress::Transferring, Some(order)))
    }

    fn on_channel_samples(
        &mut self,
        payload: &[u8],
    ) -> Result<(Progress, Option<DisturbanceOrder>), Error> {
        // Byte 0 is skipped, same as `on_transfer`/`on_channel`.
        let _tov = byte(payload, 1)?;
        let _fault_number = u16_le(payload, 2)?;
        let acc = byte(payload, 4)?;
        let ndv = byte(payload, 5)? as usize;
        let nfe = u16_le(payload, 6)? as usize;

        let record = self.record.get_or_insert_with(DisturbanceRecord::default);
        let channel = record.channels.entry(acc).or_default();

        if channel.samples.len() < nfe + ndv {
            channel.samples.resize(nfe + ndv, 0);
        }

        for i in 0..ndv {
            let offset = 8 + i * 2;
            let sample_bytes = payload
                .get(offset..offset + 2)
                .ok_or(WireError::ReadBufferTooShort)?;
            channel.samples[nfe + i] = i16::from_le_bytes([sample_bytes[0], sample_bytes[1]]);
        }

        Ok((Progress::Transferring, None))
    }

    fn on_tags_ready(
        &mut self,
        payload: &[u8],
    ) -> Result<(Progress, Option<DisturbanceOrder>), Error> {
        let tov = byte(payload, 0)?;
        let fault_number = u16_le(payload, 2)?;

        let order = DisturbanceOrder {
            order: 16,
            tov,
            fault_number,
            acc: 0,
        };

        Ok((Progress::Transferring, Some(order)))
    }

    fn on_tags(&mut self, payload: &[u8]) -> Result<(Progress, Option<DisturbanceOrder>), Error> {
        let _fault_number = u16_le(payload, 0)?;
        let not = byte(payload, 2)? as usize;
        let tap_hi = byte(payload, 3)? as u16;
        let tap_lo = byte(payload, 4)? as u16;
        let tap = (tap_hi << 8) | tap_lo;

        let mut tags = Vec::with_capacity(not);
        for i in 0..not {
            let offset = 5 + i * 3;
            tags.push(Tag {
                function_type: byte(payload, offset)?,
                information_number: byte(payload, offset + 1)?,
                dip: byte(payload, offset + 2)?,
            });
        }

        let record = self.record.get_or_insert_with(DisturbanceRecord::default);
        record.tag_blocks.push(TagBlock { tap, tags });

        Ok((Progress::Transferring, None))
    }

    fn on_end(&mut self, payload: &[u8]) -> Result<(Progress, Option<DisturbanceOrder>), Error> {
        let too = byte(payload, 0)?;
        let tov = byte(payload, 1)?;
        let fault_number = u16_le(payload, 2)?;
        let acc = byte(payload, 4)?;

        let (response, abort) = match too {
            32 => (64, None),
            34 => (65, Some(AbortCode::DisturbanceAborted)),
            35 => (66, Some(AbortCode::NegativeEnding)),
            37 => (67, Some(AbortCode::ChannelAborted)),
            38 => (68, Some(AbortCode::NegativeEnding)),
            40 => (69, Some(AbortCode::TagsAborted)),
            _ => return Ok((Progress::Unrelated, None)),
        };

        let order = DisturbanceOrder {
            order: response,
            tov,
            fault_number,
            acc,
        };

        let progress = match abort {
            None => {
                self.sealed = self.record.take();
                fmt::debug!("disturbance record sealed");
                Progress::Sealed
            }
            Some(code) => {
                self.record = None;
                fmt::warn!("disturbance transfer aborted");
                Progress::Aborted(code)
            }
        };

        Ok((progress, Some(order)))
    }
}
