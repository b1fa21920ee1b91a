//! MS-DOS date/time conversion.
//!
//! ZIP headers store modification times as a packed 32-bit value with
//! two-second resolution:
//!
//! ```text
//!  31      25 24  21 20   16 15   11 10     5 4     0
//! ┌──────────┬──────┬───────┬───────┬────────┬───────┐
//! │ year-1980│ month│  day  │ hour  │ minute │ sec/2 │
//! └──────────┴──────┴───────┴───────┴────────┴───────┘
//! ```
//!
//! The format cannot represent years before 1980 or after 2107. Encoding
//! clamps out-of-range instants to the nearest representable value instead
//! of wrapping.

use chrono::{DateTime, Datelike, Local, LocalResult, TimeZone, Timelike, Utc};
use std::time::SystemTime;

/// First year representable in DOS format.
pub const DOS_EPOCH_YEAR: i32 = 1980;

/// Last year representable in DOS format.
pub const DOS_MAX_YEAR: i32 = DOS_EPOCH_YEAR + 127;

/// Broken-down calendar components of a DOS timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    /// Full year (1980..=2107).
    pub year: u16,
    /// Month (1..=12).
    pub month: u8,
    /// Day of month (1..=31).
    pub day: u8,
    /// Hour (0..=23).
    pub hour: u8,
    /// Minute (0..=59).
    pub minute: u8,
    /// Second (0..=59); only even values survive encoding.
    pub second: u8,
}

impl DosDateTime {
    /// The earliest representable instant, 1980-01-01 00:00:00.
    pub const MIN: Self = Self {
        year: 1980,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// The latest representable instant, 2107-12-31 23:59:58.
    pub const MAX: Self = Self {
        year: 2107,
        month: 12,
        day: 31,
        hour: 23,
        minute: 59,
        second: 58,
    };

    fn from_chrono<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        let year = dt.year();
        if year < DOS_EPOCH_YEAR {
            return Self::MIN;
        }
        if year > DOS_MAX_YEAR {
            return Self::MAX;
        }
        Self {
            year: year as u16,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            // Leap seconds show up as 60; keep them inside the 5-bit field.
            second: dt.second().min(59) as u8,
        }
    }
}

/// A packed 32-bit MS-DOS date/time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DosTimestamp(u32);

impl DosTimestamp {
    /// The zero value, written when no modification time is known.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw packed value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Build from the separate 16-bit date and time words used in headers.
    pub const fn from_parts(date: u16, time: u16) -> Self {
        Self(((date as u32) << 16) | time as u32)
    }

    /// Get the raw packed value.
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// The high 16 bits (date word).
    pub const fn date_part(&self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// The low 16 bits (time word).
    pub const fn time_part(&self) -> u16 {
        self.0 as u16
    }

    /// Check if this is the zero value.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Pack explicit calendar components.
    ///
    /// Years outside `1980..=2107` clamp to [`DosDateTime::MIN`] or
    /// [`DosDateTime::MAX`]. The other fields are masked to their bit width.
    pub fn from_datetime(dt: DosDateTime) -> Self {
        let dt = if i32::from(dt.year) < DOS_EPOCH_YEAR {
            DosDateTime::MIN
        } else if i32::from(dt.year) > DOS_MAX_YEAR {
            DosDateTime::MAX
        } else {
            dt
        };

        let year = u32::from(dt.year - DOS_EPOCH_YEAR as u16) << 25;
        let month = (u32::from(dt.month) & 0x0F) << 21;
        let day = (u32::from(dt.day) & 0x1F) << 16;
        let hour = (u32::from(dt.hour) & 0x1F) << 11;
        let minute = (u32::from(dt.minute) & 0x3F) << 5;
        let second = (u32::from(dt.second) >> 1) & 0x1F;

        Self(year | month | day | hour | minute | second)
    }

    /// Encode an instant using the calendar of the local time zone.
    pub fn from_system_time(time: SystemTime) -> Self {
        let local: DateTime<Local> = time.into();
        Self::from_datetime(DosDateTime::from_chrono(&local))
    }

    /// Encode seconds since the Unix epoch using the UTC calendar.
    pub fn from_unix_utc(secs: i64) -> Self {
        match DateTime::<Utc>::from_timestamp(secs, 0) {
            Some(utc) => Self::from_datetime(DosDateTime::from_chrono(&utc)),
            None if secs < 0 => Self::from_datetime(DosDateTime::MIN),
            None => Self::from_datetime(DosDateTime::MAX),
        }
    }

    /// Unpack into calendar components. No validation is performed.
    pub fn to_datetime(&self) -> DosDateTime {
        DosDateTime {
            year: ((self.0 >> 25) & 0x7F) as u16 + DOS_EPOCH_YEAR as u16,
            month: ((self.0 >> 21) & 0x0F) as u8,
            day: ((self.0 >> 16) & 0x1F) as u8,
            hour: ((self.0 >> 11) & 0x1F) as u8,
            minute: ((self.0 >> 5) & 0x3F) as u8,
            second: ((self.0 & 0x1F) * 2) as u8,
        }
    }

    /// Interpret the value as a local calendar time.
    ///
    /// Returns `None` for values that do not name a real instant (the zero
    /// value has month 0 and day 0) or that fall in a DST gap.
    pub fn to_system_time(&self) -> Option<SystemTime> {
        let dt = self.to_datetime();
        match Local.with_ymd_and_hms(
            i32::from(dt.year),
            u32::from(dt.month),
            u32::from(dt.day),
            u32::from(dt.hour),
            u32::from(dt.minute),
            u32::from(dt.second),
        ) {
            LocalResult::Single(local) => Some(local.into()),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.into()),
            LocalResult::None => None,
        }
    }
}

impl From<u32> for DosTimestamp {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<DosTimestamp> for u32 {
    fn from(ts: DosTimestamp) -> Self {
        ts.0
    }
}

impl std::fmt::Display for DosTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dt = self.to_datetime();
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second
        )
    }
}
