//! COMTRADE 1999 ASCII exporter: converts a sealed [`crate::DisturbanceRecord`] into a
//! `.cfg`/`.dat` file pair (IEEE C37.111).
//!
//! `std`-only: writing files is inherently a `std` concern, and the exporter's input (a sealed
//! disturbance record) is itself gated on `std` already — see [`crate::disturbance`].

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::string::String;
use std::vec::Vec;

use crate::disturbance::DisturbanceRecord;
use crate::error::Error;

/// A single analog channel to include in the export.
///
/// `channel` selects which accumulated [`crate::disturbance::Channel`] in the record this
/// descriptor renders; `None` means the descriptor is a placeholder with no backing channel and
/// is skipped entirely, replacing the original format's `channelCode == 0` sentinel.
#[derive(Debug, Clone)]
pub struct AnalogChannel {
    /// Channel identifier (`ch_id` in the `.cfg` line).
    pub id: String,
    /// Phase designation.
    pub phase: String,
    /// Circuit component being monitored.
    pub ccbm: String,
    /// Engineering units.
    pub unit: String,
    /// Which accumulated channel (by `ACC`) this descriptor renders.
    pub channel: Option<u8>,
}

/// A single digital (status) channel to include in the export.
#[derive(Debug, Clone)]
pub struct DigitalChannel {
    /// Channel identifier (`ch_id` in the `.cfg` line).
    pub id: String,
    /// Phase designation.
    pub phase: String,
    /// Circuit component being monitored.
    pub ccbm: String,
    /// Normal state label (`y` in the `.cfg` line).
    pub normal_state: String,
    /// Function type the channel's tags are filtered by.
    pub function_type: u8,
    /// Information number the channel's tags are filtered by.
    pub information_number: u8,
}

/// COMTRADE only records a single sampling rate per file; this crate does not support the
/// multi-rate `.cfg` form.
#[derive(Debug, Clone, Copy)]
pub struct SamplingRate {
    /// Samples per second.
    pub hz: f64,
    /// Number of samples at this rate (equals the record's `channel_elements`).
    pub end_sample: u16,
}

fn format_time(t: crate::Cp56Time2a) -> String {
    let seconds = t.milliseconds() / 1000;
    let millis = t.milliseconds() % 1000;

    format!(
        "{:02}/{:02}/{},{:02}:{:02}:{:02}.{:03}",
        t.day_of_month(),
        t.month(),
        2000 + t.year_since_2000() as u16,
        t.hour(),
        t.minute(),
        seconds,
        millis,
    )
}

/// Write `<stem>.cfg` and `<stem>.dat` for a sealed disturbance record.
pub fn save_comtrade(
    stem: &Path,
    station_name: &str,
    station_number: u16,
    record: &DisturbanceRecord,
    analog_channels: &[AnalogChannel],
    digital_channels: &[DigitalChannel],
    line_frequency_hz: f64,
) -> Result<(), Error> {
    let present_analog: Vec<&AnalogChannel> =
        analog_channels.iter().filter(|c| c.channel.is_some()).collect();

    write_cfg(
        stem,
        station_name,
        station_number,
        record,
        &present_analog,
        digital_channels,
        line_frequency_hz,
    )
    .map_err(|_| Error::ExportIo)?;

    write_dat(stem, record, &present_analog, digital_channels).map_err(|_| Error::ExportIo)?;

    Ok(())
}

fn write_cfg(
    stem: &Path,
    station_name: &str,
    station_number: u16,
    record: &DisturbanceRecord,
    analog_channels: &[&AnalogChannel],
    digital_channels: &[DigitalChannel],
    line_frequency_hz: f64,
) -> io::Result<()> {
    let mut out = String::new();

    writeln!(out, "{},{},1999", station_name, station_number).unwrap();
    writeln!(
        out,
        "{},{}A,{}D",
        analog_channels.len() + digital_channels.len(),
        analog_channels.len(),
        digital_channels.len()
    )
    .unwrap();

    for (idx, descriptor) in analog_channels.iter().enumerate() {
        let acc = descriptor.channel.expect("pre-filtered to Some above");
        let channel = &record.channels[&acc];

        let min = channel.samples.iter().copied().min().unwrap_or_default();
        let max = channel.samples.iter().copied().max().unwrap_or_default();
        let a = channel.rfa / 32768.0;

        writeln!(
            out,
            "{},{},{},{},{},{},0,0,{},{},{},{},S",
            idx + 1,
            descriptor.id,
            descriptor.phase,
            descriptor.ccbm,
            descriptor.unit,
            a,
            min,
            max,
            channel.rpv,
            channel.rsv,
        )
        .unwrap();
    }

    for (idx, descriptor) in digital_channels.iter().enumerate() {
        writeln!(
            out,
            "{},{},{},{},{}",
            analog_channels.len() + idx + 1,
            descriptor.id,
            descriptor.phase,
            descriptor.ccbm,
            descriptor.normal_state,
        )
        .unwrap();
    }

    writeln!(out, "{}", line_frequency_hz).unwrap();
    writeln!(out, "1").unwrap();

    let sample_rate_hz = 1_000_000.0 / record.sampling_interval_us as f64;
    writeln!(out, "{},{}", sample_rate_hz, record.channel_elements).unwrap();

    writeln!(out, "{}", format_time(record.start_time)).unwrap();
    writeln!(out, "{}", format_time(record.event_time)).unwrap();

    writeln!(out, "ASCII").unwrap();
    write!(out, "1.0").unwrap();

    fs::write(stem.with_extension("cfg"), out)
}

fn write_dat(
    stem: &Path,
    record: &DisturbanceRecord,
    analog_channels: &[&AnalogChannel],
    digital_channels: &[DigitalChannel],
) -> io::Result<()> {
    let mut out = String::new();

    let mut current_values: Vec<i8> = std::vec![0; digital_channels.len()];

    apply_tags_at(record, 0, digital_channels, &mut current_values);

    for i in 0..record.channel_elements as usize {
        if i != 0 {
            apply_tags_at(record, i as u16, digital_channels, &mut current_values);
        }

        write!(out, "{},{}", i + 1, record.sampling_interval_us as u64 * i as u64).unwrap();

        for descriptor in analog_channels {
            let acc = descriptor.channel.expect("pre-filtered to Some above");
            let channel = &record.channels[&acc];
            let sample = channel.samples.get(i).copied().unwrap_or_default();
            write!(out, ",{}", sample).unwrap();
        }

        for value in &current_values {
            write!(out, ",{}", value).unwrap();
        }

        writeln!(out).unwrap();
    }

    fs::write(stem.with_extension("dat"), out)
}

fn apply_tags_at(
    record: &DisturbanceRecord,
    sample_index: u16,
    digital_channels: &[DigitalChannel],
    current_values: &mut [i8],
) {
    for block in &record.tag_blocks {
        if block.tap != sample_index {
            continue;
        }

        for tag in &block.tags {
            for (k, descriptor) in digital_channels.iter().enumerate() {
                if tag.function_type == descriptor.function_type
                    && tag.information_number == descriptor.information_number
                {
                    current_values[k] = tag.channel_state();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn sample_record() -> DisturbanceRecord {
        let mut channels = BTreeMap::new();
        channels.insert(
            1u8,
            crate::disturbance::Channel {
                tov: 0,
                rpv: 110.0,
                rsv: 100.0,
                rfa: 32768.0,
                samples: std::vec![1, -1, 2, -2, 3],
            },
        );

        DisturbanceRecord {
            fault_number: 7,
            sampling_interval_us: 1000,
            start_time: crate::Cp56Time2a::from_parts(0, 30, false, 13, false, 4, 2, 7, 23),
            event_time: crate::Cp56Time2a::from_parts(0, 30, false, 13, false, 4, 2, 7, 23),
            channel_elements: 5,
            channels,
            tag_blocks: Vec::new(),
        }
    }

    #[test]
    fn export_is_deterministic() {
        let dir = std::env::temp_dir().join("iec103-master-comtrade-test");
        let _ = fs::create_dir_all(&dir);
        let stem = dir.join("record");

        let analog = std::vec![AnalogChannel {
            id: "IL1".into(),
            phase: "A".into(),
            ccbm: "".into(),
            unit: "A".into(),
            channel: Some(1),
        }];

        let record = sample_record();

        save_comtrade(&stem, "STATION", 1, &record, &analog, &[], 50.0).unwrap();
        let first_cfg = fs::read_to_string(stem.with_extension("cfg")).unwrap();
        let first_dat = fs::read_to_string(stem.with_extension("dat")).unwrap();

        save_comtrade(&stem, "STATION", 1, &record, &analog, &[], 50.0).unwrap();
        let second_cfg = fs::read_to_string(stem.with_extension("cfg")).unwrap();
        let second_dat = fs::read_to_string(stem.with_extension("dat")).unwrap();

        assert_eq!(first_cfg, second_cfg);
        assert_eq!(first_dat, second_dat);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn skips_channels_with_no_backing_channel() {
        let dir = std::env::temp_dir().join("iec103-master-comtrade-skip-test");
        let _ = fs::create_dir_all(&dir);
        let stem = dir.join("record");

        let analog = std::vec![
            AnalogChannel {
                id: "IL1".into(),
                phase: "A".into(),
                ccbm: "".into(),
                unit: "A".into(),
                channel: Some(1),
            },
            AnalogChannel {
                id: "unused".into(),
                phase: "".into(),
                ccbm: "".into(),
                unit: "".into(),
                channel: None,
            },
        ];

        let record = sample_record();
        save_comtrade(&stem, "STATION", 1, &record, &analog, &[], 50.0).unwrap();

        let cfg = fs::read_to_string(stem.with_extension("cfg")).unwrap();
        assert_eq!(cfg.lines().nth(1).unwrap(), "1,1A,0D");

        let _ = fs::remove_dir_all(&dir);
    }
}
