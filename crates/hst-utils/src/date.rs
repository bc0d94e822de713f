use bstr::{BStr, BString, ByteSlice, ByteVec};
use chrono::{DateTime, FixedOffset, Local};

use crate::error::UtilError;
use crate::Result;

/// A point in time as recorded in commit headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GitDate {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Offset from UTC in minutes (e.g. -300 for UTC-05:00).
    pub tz_offset: i32,
}

/// `-0130` style integer to minutes.
fn hhmm_to_minutes(tz: i32) -> i32 {
    let sign = if tz < 0 { -1 } else { 1 };
    let abs = tz.abs();
    sign * ((abs / 100) * 60 + abs % 100)
}

fn minutes_to_hhmm(minutes: i32) -> i32 {
    let sign = if minutes < 0 { -1 } else { 1 };
    let abs = minutes.abs();
    sign * ((abs / 60) * 100 + abs % 60)
}

impl GitDate {
    pub fn new(timestamp: i64, tz_offset_minutes: i32) -> Self {
        Self {
            timestamp,
            tz_offset: tz_offset_minutes,
        }
    }

    /// Current time in the local timezone.
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            timestamp: now.timestamp(),
            tz_offset: now.offset().local_minus_utc() / 60,
        }
    }

    /// Parse `"<timestamp> <+/-hhmm>"`. A missing offset means UTC.
    pub fn parse_raw(input: &str) -> Result<Self> {
        let mut parts = input.trim().splitn(2, ' ');
        let ts = parts.next().unwrap_or_default();
        let timestamp: i64 = ts
            .parse()
            .map_err(|_| UtilError::DateParse(format!("invalid timestamp: '{ts}'")))?;

        let tz_offset = match parts.next() {
            Some(tz) => {
                let tz = tz.trim();
                if tz.len() != 5 || !(tz.starts_with('+') || tz.starts_with('-')) {
                    return Err(UtilError::DateParse(format!("invalid timezone: '{tz}'")));
                }
                let value: i32 = tz
                    .parse()
                    .map_err(|_| UtilError::DateParse(format!("invalid timezone: '{tz}'")))?;
                hhmm_to_minutes(value)
            }
            None => 0,
        };

        Ok(Self {
            timestamp,
            tz_offset,
        })
    }

    /// `"<timestamp> <+/-hhmm>"`, the form stored in commit headers.
    pub fn to_raw(&self) -> String {
        format!("{} {:+05}", self.timestamp, minutes_to_hhmm(self.tz_offset))
    }

    /// `Thu Feb 13 23:31:30 2009 +0000`, rendered in the recorded offset.
    pub fn to_display(&self) -> String {
        match self.to_datetime() {
            Some(dt) => dt.format("%a %b %e %H:%M:%S %Y %z").to_string(),
            None => self.to_raw(),
        }
    }

    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.tz_offset * 60)?;
        DateTime::from_timestamp(self.timestamp, 0).map(|dt| dt.with_timezone(&offset))
    }
}

/// Author or committer identity with the time it was recorded.
///
/// The identity is kept as written: either a bare name (`alice`) or
/// the `Name <email>` form. Only the trailing timestamp and offset are
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub identity: BString,
    pub date: GitDate,
}

impl Signature {
    pub fn new(identity: impl Into<BString>, date: GitDate) -> Self {
        Self {
            identity: identity.into(),
            date,
        }
    }

    /// Parse `<identity> <timestamp> <tz>` by splitting the last two fields off.
    pub fn parse(input: &BStr) -> Result<Self> {
        let bytes = input.as_bytes();
        let tz_sep = bytes
            .rfind_byte(b' ')
            .ok_or_else(|| UtilError::Signature(format!("missing timezone: '{input}'")))?;
        let ts_sep = bytes[..tz_sep]
            .rfind_byte(b' ')
            .ok_or_else(|| UtilError::Signature(format!("missing timestamp: '{input}'")))?;

        let date = bytes[ts_sep + 1..]
            .to_str()
            .map_err(|_| UtilError::Signature("non-UTF-8 date".into()))?;
        let date = GitDate::parse_raw(date)?;

        Ok(Self {
            identity: BString::from(&bytes[..ts_sep]),
            date,
        })
    }

    pub fn to_bytes(&self) -> BString {
        let mut out = self.identity.clone();
        out.push_byte(b' ');
        out.push_str(self.date.to_raw());
        out
    }

    /// The name part of the identity, without any `<email>`.
    pub fn name(&self) -> &BStr {
        match self.identity.find_byte(b'<') {
            Some(lt) => self.identity[..lt].trim_end().as_bstr(),
            None => self.identity.as_bstr(),
        }
    }
}
