//! Lenient ISO 8601 timestamp parsing.
//!
//! # Accepted forms
//!
//! - Dates: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `YYYYMMDD`, week dates
//!   (`YYYY-Www[-D]`, `YYYYWww[D]`) and ordinal dates (`YYYY-DDD`, `YYYYDDD`)
//! - Any single character separating date and time (`T`, a space, ...)
//! - Times: `hh`, `hh:mm`, `hh:mm:ss`, `hhmm`, `hhmmss`, with an optional
//!   fraction after `.` or `,` (truncated to microseconds)
//! - Offsets: `Z`, `z`, `±hh`, `±hhmm`, `±hh:mm`
//!
//! `24:00` is read as midnight of the following day.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateTimeError {
    #[error("ISO 8601 strings must contain only ASCII characters")]
    NonAscii,
    #[error("ISO string too short")]
    TooShort,
    #[error("invalid date component")]
    InvalidDate,
    #[error("inconsistent use of dash separator")]
    InconsistentDash,
    #[error("ISO time too short")]
    TimeTooShort,
    #[error("inconsistent use of colon separator")]
    InconsistentColon,
    #[error("invalid time component")]
    InvalidTime,
    #[error("hour may only be 24 at 24:00:00.000")]
    InvalidMidnight,
    #[error("invalid timezone offset: {0}")]
    InvalidTimezone(String),
    #[error("unused components in ISO string")]
    UnusedComponents,
}

/// A parsed timestamp. `offset` is `None` for local times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoDateTime {
    pub datetime: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

/// Parse `value` as an ISO 8601 date or date-time.
///
/// ```ignore
/// assert!(parse_isodatetime("2020-01-01 12:01:01").is_ok());
/// assert!(parse_isodatetime("2020-13-01T12:01:01").is_err());
/// ```
pub fn parse_isodatetime(value: &str) -> Result<IsoDateTime, DateTimeError> {
    if !value.is_ascii() {
        return Err(DateTimeError::NonAscii);
    }
    let s = value.as_bytes();
    let (date, pos) = parse_date(s)?;
    if pos >= s.len() {
        return Ok(IsoDateTime {
            datetime: date.and_time(NaiveTime::MIN),
            offset: None,
        });
    }

    // The separator is not checked.
    let time = parse_time(&s[pos + 1..])?;
    let date = if time.next_day {
        date.succ_opt().ok_or(DateTimeError::InvalidDate)?
    } else {
        date
    };
    Ok(IsoDateTime {
        datetime: date.and_time(time.time),
        offset: time.offset,
    })
}

/// Fixed-width run of ASCII digits at `pos`.
fn digits(s: &[u8], pos: usize, width: usize) -> Option<u32> {
    let field = s.get(pos..pos + width)?;
    if !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(field.iter().fold(0, |acc, &b| acc * 10 + u32::from(b - b'0')))
}

fn parse_date(s: &[u8]) -> Result<(NaiveDate, usize), DateTimeError> {
    match calendar_fields(s) {
        Some(([year, month, day], pos)) => {
            let date = ymd(year, month, day).ok_or(DateTimeError::InvalidDate)?;
            Ok((date, pos))
        }
        None => week_or_ordinal_date(s),
    }
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    if year == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// `YYYY[-MM[-DD]]` or `YYYYMMDD`; fields are range-checked by the caller.
fn calendar_fields(s: &[u8]) -> Option<([u32; 3], usize)> {
    let mut fields = [digits(s, 0, 4)?, 1, 1];
    let mut pos = 4;
    if pos >= s.len() {
        return Some((fields, pos));
    }

    let dashed = s[pos] == b'-';
    if dashed {
        pos += 1;
    }
    fields[1] = digits(s, pos, 2)?;
    pos += 2;
    if pos >= s.len() {
        // `YYYYMM` is ambiguous and not allowed.
        return dashed.then_some((fields, pos));
    }

    if dashed {
        if s[pos] != b'-' {
            return None;
        }
        pos += 1;
    }
    fields[2] = digits(s, pos, 2)?;
    pos += 2;
    Some((fields, pos))
}

fn week_or_ordinal_date(s: &[u8]) -> Result<(NaiveDate, usize), DateTimeError> {
    if s.len() < 4 {
        return Err(DateTimeError::TooShort);
    }
    let year = digits(s, 0, 4)
        .filter(|year| *year > 0)
        .and_then(|year| i32::try_from(year).ok())
        .ok_or(DateTimeError::InvalidDate)?;
    let dashed = s.get(4) == Some(&b'-');
    let mut pos = 4 + usize::from(dashed);

    if s.get(pos) == Some(&b'W') {
        pos += 1;
        let week = digits(s, pos, 2).ok_or(DateTimeError::InvalidDate)?;
        pos += 2;
        let mut day = 1;
        if pos < s.len() {
            if (s[pos] == b'-') != dashed {
                return Err(DateTimeError::InconsistentDash);
            }
            pos += usize::from(dashed);
            day = digits(s, pos, 1).ok_or(DateTimeError::InvalidDate)?;
            pos += 1;
        }
        let weekday = match day {
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            7 => Weekday::Sun,
            _ => return Err(DateTimeError::InvalidDate),
        };
        let date =
            NaiveDate::from_isoywd_opt(year, week, weekday).ok_or(DateTimeError::InvalidDate)?;
        return Ok((date, pos));
    }

    let ordinal = digits(s, pos, 3).ok_or(DateTimeError::InvalidDate)?;
    let date = NaiveDate::from_yo_opt(year, ordinal).ok_or(DateTimeError::InvalidDate)?;
    Ok((date, pos + 3))
}

struct ParsedTime {
    time: NaiveTime,
    next_day: bool,
    offset: Option<FixedOffset>,
}

fn parse_time(s: &[u8]) -> Result<ParsedTime, DateTimeError> {
    if s.len() < 2 {
        return Err(DateTimeError::TimeTooShort);
    }

    // hour, minute, second, microsecond
    let mut fields = [0u32; 4];
    let mut offset = None;
    let mut colon = false;
    let mut pos = 0;

    for component in 0..5 {
        if pos >= s.len() {
            break;
        }
        if matches!(s[pos], b'-' | b'+' | b'Z' | b'z') {
            offset = Some(parse_offset(&s[pos..])?);
            pos = s.len();
            break;
        }
        match component {
            0..=2 => {
                if component == 1 && s[pos] == b':' {
                    colon = true;
                    pos += 1;
                } else if component == 2 && colon {
                    if s[pos] != b':' {
                        return Err(DateTimeError::InconsistentColon);
                    }
                    pos += 1;
                }
                fields[component] = digits(s, pos, 2).ok_or(DateTimeError::InvalidTime)?;
                pos += 2;
            }
            3 if matches!(s[pos], b'.' | b',') => {
                let width = s[pos + 1..]
                    .iter()
                    .take_while(|b| b.is_ascii_digit())
                    .count();
                if width > 0 {
                    let kept = width.min(6);
                    let micros = digits(s, pos + 1, kept).ok_or(DateTimeError::InvalidTime)?;
                    fields[3] = micros * 10u32.pow((6 - kept) as u32);
                    pos += 1 + width;
                }
            }
            _ => {}
        }
    }
    if pos < s.len() {
        return Err(DateTimeError::UnusedComponents);
    }

    let [hour, minute, second, micro] = fields;
    let next_day = hour == 24;
    if next_day && (minute, second, micro) != (0, 0, 0) {
        return Err(DateTimeError::InvalidMidnight);
    }
    let time = if next_day {
        NaiveTime::MIN
    } else {
        NaiveTime::from_hms_micro_opt(hour, minute, second, micro)
            .ok_or(DateTimeError::InvalidTime)?
    };
    Ok(ParsedTime {
        time,
        next_day,
        offset,
    })
}

fn parse_offset(s: &[u8]) -> Result<FixedOffset, DateTimeError> {
    let invalid = || DateTimeError::InvalidTimezone(String::from_utf8_lossy(s).into_owned());
    if s == b"Z" || s == b"z" {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let sign = match s.first() {
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => return Err(invalid()),
    };
    let hours = digits(s, 1, 2).ok_or_else(invalid)?;
    let minutes = match s.len() {
        3 => 0,
        5 => digits(s, 3, 2).ok_or_else(invalid)?,
        6 if s[3] == b':' => digits(s, 4, 2).ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    let seconds = i32::try_from(hours * 3600 + minutes * 60).map_err(|_| invalid())?;
    FixedOffset::east_opt(sign * seconds).ok_or_else(invalid)
}
