//! Tolerant parsing of sale timestamps.
//!
//! Sales carry whatever `date` string the finalizing client produced. Most are
//! locale strings such as `8/9/2025, 3:28:41 p.m.` (day first), some are ISO.
//! Parsing order:
//!
//! 1. RFC 3339 (`2025-09-08T15:28:41Z`), converted to local time
//! 2. ISO date-time without offset (`2025-09-08T15:28:41`, `2025-09-08 15:28`)
//! 3. ISO date (`2025-09-08`), at local midnight
//! 4. Locale fallback: `D/M/YYYY[, H:MM[:SS] [AM|PM]]`

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// A sale timestamp that could not be read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("date is empty")]
    Empty,

    #[error("unrecognized date: {0:?}")]
    Unrecognized(String),
}

const ISO_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a sale `date` into a local naive timestamp.
///
/// ```rust
/// use pdv_core::datetime::parse_sale_date;
///
/// let ts = parse_sale_date("8/9/2025, 3:28:41 p.m.").unwrap();
/// assert_eq!(ts.to_string(), "2025-09-08 15:28:41");
/// assert!(parse_sale_date("not a date").is_err());
/// ```
pub fn parse_sale_date(input: &str) -> Result<NaiveDateTime, DateParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Some(ts) = parse_direct(s) {
        return Ok(ts);
    }

    parse_locale(s).ok_or_else(|| DateParseError::Unrecognized(input.to_string()))
}

fn parse_direct(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    for format in ISO_DATE_TIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Some(ts);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn parse_locale(s: &str) -> Option<NaiveDateTime> {
    let cleaned = s.replace('.', "");
    let (date_part, time_part) = match cleaned.split_once(',') {
        Some((date, time)) => (date.trim(), time.trim()),
        None => (cleaned.trim(), ""),
    };

    let date = parse_day_first(date_part)?;
    let time = if time_part.is_empty() {
        NaiveTime::MIN
    } else {
        parse_clock(time_part)?
    };

    Some(date.and_time(time))
}

/// `D/M/YYYY`, positional.
fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let mut parts = s.split('/').map(str::trim);
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[derive(Clone, Copy, PartialEq)]
enum Meridiem {
    Am,
    Pm,
}

/// `H:MM[:SS] [AM|PM]`; the meridiem may be spaced out (`p m`).
fn parse_clock(s: &str) -> Option<NaiveTime> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let lower = compact.to_ascii_lowercase();

    let (clock, meridiem) = if let Some(rest) = lower.strip_suffix("am") {
        (rest, Some(Meridiem::Am))
    } else if let Some(rest) = lower.strip_suffix("pm") {
        (rest, Some(Meridiem::Pm))
    } else {
        (lower.as_str(), None)
    };

    let mut fields = clock.split(':');
    let mut hour: u32 = fields.next()?.parse().ok()?;
    let minute_str = fields.next()?;
    if minute_str.len() != 2 {
        return None;
    }
    let minute: u32 = minute_str.parse().ok()?;
    let second: u32 = match fields.next() {
        Some(sec) => sec.parse().ok()?,
        None => 0,
    };
    if fields.next().is_some() {
        return None;
    }

    match meridiem {
        Some(Meridiem::Am) if hour == 12 => hour = 0,
        Some(Meridiem::Pm) if hour < 12 => hour += 12,
        _ => {}
    }

    NaiveTime::from_hms_opt(hour, minute, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_locale_string_with_dotted_meridiem() {
        assert_eq!(
            parse_sale_date("8/9/2025, 3:28:41 p.m.").unwrap(),
            ts(2025, 9, 8, 15, 28, 41)
        );
    }

    #[test]
    fn test_locale_meridiem_variants() {
        assert_eq!(parse_sale_date("1/1/2025, 12:05:00 a. m.").unwrap(), ts(2025, 1, 1, 0, 5, 0));
        assert_eq!(parse_sale_date("1/1/2025, 12:05 PM").unwrap(), ts(2025, 1, 1, 12, 5, 0));
        assert_eq!(parse_sale_date("15/3/2025, 18:40:02").unwrap(), ts(2025, 3, 15, 18, 40, 2));
    }

    #[test]
    fn test_locale_date_without_time_is_midnight() {
        assert_eq!(parse_sale_date("20/9/2025").unwrap(), ts(2025, 9, 20, 0, 0, 0));
    }

    #[test]
    fn test_iso_forms() {
        assert_eq!(parse_sale_date("2025-09-08T15:28:41").unwrap(), ts(2025, 9, 8, 15, 28, 41));
        assert_eq!(parse_sale_date("2025-09-08 07:00").unwrap(), ts(2025, 9, 8, 7, 0, 0));
        assert_eq!(parse_sale_date("2025-09-08").unwrap(), ts(2025, 9, 8, 0, 0, 0));
        assert!(parse_sale_date("2025-09-08T15:28:41Z").is_ok());
    }

    #[test]
    fn test_unparseable_is_an_error() {
        assert_eq!(
            parse_sale_date("not a date"),
            Err(DateParseError::Unrecognized("not a date".to_string()))
        );
        assert_eq!(parse_sale_date("   "), Err(DateParseError::Empty));
        assert!(parse_sale_date("31/2/2025, 1:00 PM").is_err());
        assert!(parse_sale_date("8/9/2025, 25:00").is_err());
    }
}
