//! CP56Time2a: the seven octet timestamp format used throughout IEC 60870-5-103.

use wire103::Wire103ReadWrite;

#[cfg(test)]
use wire103::{Wire103Read, Wire103Write};

/// Encoded length of a CP56Time2a value in bytes.
pub const CP56TIME2A_LEN: usize = 7;

/// A CP56Time2a timestamp.
///
/// Fields are kept as the raw bytes the standard defines (milliseconds, then four bit-packed
/// octets) with named accessors over them, rather than a bit-packed struct per field: the
/// "reserved" and flag bits share bytes with value bits in ways that don't byte-align, so plain
/// getters/setters over the raw octets (as the original union-based header did, minus the union)
/// are the natural fit here.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Wire103ReadWrite)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[wire(bits = 56)]
pub struct Cp56Time2a {
    #[wire(bits = 16)]
    milliseconds: u16,
    #[wire(bits = 8)]
    minutes: u8,
    #[wire(bits = 8)]
    hours: u8,
    #[wire(bits = 8)]
    day: u8,
    #[wire(bits = 8)]
    month: u8,
    #[wire(bits = 8)]
    year: u8,
}

impl Cp56Time2a {
    /// Build a value from its raw field components.
    ///
    /// `is_dst` follows the original source's convention: the wire bit is the complement of
    /// "daylight saving is active", i.e. it is set when standard (non-summer) time is in effect.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        milliseconds: u16,
        minute: u8,
        invalid: bool,
        hour: u8,
        is_dst: bool,
        day_of_month: u8,
        day_of_week: u8,
        month: u8,
        year_since_2000: u8,
    ) -> Self {
        let mut minutes = minute & 0x3F;
        if invalid {
            minutes |= 0x80;
        }

        let mut hours = hour & 0x1F;
        if !is_dst {
            hours |= 0x80;
        }

        let day = (day_of_month & 0x1F) | ((day_of_week & 0x07) << 5);

        Self {
            milliseconds,
            minutes,
            hours,
            day,
            month: month & 0x0F,
            year: year_since_2000 & 0x7F,
        }
    }

    /// Milliseconds within the minute, `0..=59999`.
    pub const fn milliseconds(self) -> u16 {
        self.milliseconds
    }

    /// Minute of the hour, `0..=59`.
    pub const fn minute(self) -> u8 {
        self.minutes & 0x3F
    }

    /// Whether the source marked this timestamp invalid.
    pub const fn invalid(self) -> bool {
        self.minutes & 0x80 != 0
    }

    /// Hour of the day, `0..=23`.
    pub const fn hour(self) -> u8 {
        self.hours & 0x1F
    }

    /// Whether daylight saving was in effect when this timestamp was produced.
    pub const fn is_dst(self) -> bool {
        self.hours & 0x80 == 0
    }

    /// Day of the month, `1..=31`.
    pub const fn day_of_month(self) -> u8 {
        self.day & 0x1F
    }

    /// Day of the week, `1..=7` (ISO, Monday = 1).
    pub const fn day_of_week(self) -> u8 {
        (self.day >> 5) & 0x07
    }

    /// Month, `1..=12`.
    pub const fn month(self) -> u8 {
        self.month & 0x0F
    }

    /// Year offset from 2000.
    pub const fn year_since_2000(self) -> u8 {
        self.year & 0x7F
    }

    /// Combine this timestamp's time-of-day fields with another's calendar date.
    ///
    /// Used to patch the event time's day/month/year onto the time-of-day-only start time ASDU
    /// 26 delivers for a disturbance recording.
    pub fn with_date_from(self, date_source: Self) -> Self {
        Self::from_parts(
            self.milliseconds(),
            self.minute(),
            self.invalid(),
            self.hour(),
            self.is_dst(),
            date_source.day_of_month(),
            date_source.day_of_week(),
            date_source.month(),
            date_source.year_since_2000(),
        )
    }
}

impl Default for Cp56Time2a {
    fn default() -> Self {
        Self::from_parts(0, 0, false, 0, false, 0, 0, 0, 0)
    }
}

#[cfg(feature = "std")]
impl Cp56Time2a {
    /// Encode the current local wall-clock time.
    ///
    /// Daylight saving is detected by comparing the current UTC offset against the offset the
    /// same timezone reports in January of the current year: a difference means DST is active
    /// now (mirroring `tm_isdst` from the original C library-based source, without relying on a
    /// libc call).
    pub fn now_local() -> Self {
        Self::from_datetime(chrono::Local::now())
    }

    /// Encode a specific local date and time.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Local>) -> Self {
        use chrono::{Datelike, Offset, TimeZone, Timelike};

        let offset_now = dt.offset().fix().local_minus_utc();

        let january = chrono::Local
            .with_ymd_and_hms(dt.year(), 1, 1, 0, 0, 0)
            .single()
            .map(|d| d.offset().fix().local_minus_utc())
            .unwrap_or(offset_now);

        let is_dst = offset_now != january;

        let milliseconds = (dt.second() as u16) * 1000 + (dt.nanosecond() / 1_000_000) as u16;

        // `Weekday::number_from_monday` already returns the ISO 1..=7 range this format wants.
        let day_of_week = dt.weekday().number_from_monday() as u8;

        Self::from_parts(
            milliseconds,
            dt.minute() as u8,
            false,
            dt.hour() as u8,
            is_dst,
            dt.day() as u8,
            day_of_week,
            dt.month() as u8,
            (dt.year() % 100) as u8,
        )
    }
}
