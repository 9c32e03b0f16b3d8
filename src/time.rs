//! Date/time helpers for analysis naming and response windows.
//!
//! GridRad and the interpolated files identify hours as `YYYYMMDDHH`; RAP
//! archive paths use zero-padded year/month/day plus a 4-digit hour.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{Result, WrfInterpError};

/// Zero-padded (year, month, day, hour) strings for an analysis time.
///
/// With `four_digit_hour` the hour is followed by `00`, e.g. `1200`.
pub fn analysis_components(
    time: NaiveDateTime,
    four_digit_hour: bool,
) -> (String, String, String, String) {
    let hour = if four_digit_hour {
        time.format("%H00").to_string()
    } else {
        time.format("%H").to_string()
    };
    (
        time.format("%Y").to_string(),
        time.format("%m").to_string(),
        time.format("%d").to_string(),
        hour,
    )
}

/// Build an analysis time from year, month, day and a 2- or 4-digit hour string
pub fn analysis_time_from_parts(
    year: &str,
    month: &str,
    day: &str,
    hour: &str,
) -> Result<NaiveDateTime> {
    let raw = format!("{}-{}-{} {}", year, month, day, hour);
    let invalid = |message: &str| WrfInterpError::InvalidTime {
        value: raw.clone(),
        message: message.to_string(),
    };

    let parse = |s: &str, what: &str| s.trim().parse::<u32>().map_err(|_| invalid(what));
    let y = year.trim().parse::<i32>().map_err(|_| invalid("bad year"))?;
    let m = parse(month, "bad month")?;
    let d = parse(day, "bad day")?;
    let hour = hour.trim();
    if !hour.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("bad hour"));
    }
    let (h, min) = match hour.len() {
        1 | 2 => (parse(hour, "bad hour")?, 0),
        4 => (parse(&hour[..2], "bad hour")?, parse(&hour[2..], "bad minute")?),
        _ => return Err(invalid("hour must have 2 or 4 digits")),
    };

    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .ok_or_else(|| invalid("out of range"))
}

/// Parse a `YYYYMMDDHH` stamp
pub fn parse_datehour(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.len() != 10 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(WrfInterpError::InvalidTime {
            value: value.to_string(),
            message: "expected YYYYMMDDHH".to_string(),
        });
    }
    NaiveDateTime::parse_from_str(&format!("{}00", trimmed), "%Y%m%d%H%M").map_err(|e| {
        WrfInterpError::InvalidTime {
            value: value.to_string(),
            message: e.to_string(),
        }
    })
}

/// Format a time as `YYYYMMDDHH`
pub fn format_datehour(time: NaiveDateTime) -> String {
    time.format("%Y%m%d%H").to_string()
}

/// Format a time the way image names embed it, e.g. `2020-05-01_06:00:00`
pub fn format_valid_stamp(time: NaiveDateTime) -> String {
    time.format("%Y-%m-%d_%H:%M:%S").to_string()
}

/// Whole hours since 1970-01-01T00:00
pub fn hours_since_epoch(time: NaiveDateTime) -> i64 {
    time.and_utc().timestamp().div_euclid(3600)
}

/// Inverse of [`hours_since_epoch`]
pub fn from_hours_since_epoch(hours: i64) -> Result<NaiveDateTime> {
    chrono::DateTime::from_timestamp(hours * 3600, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| WrfInterpError::InvalidTime {
            value: hours.to_string(),
            message: "hours since epoch out of range".to_string(),
        })
}

/// Instants at which verifying observations are collected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseWindow {
    instants: Vec<NaiveDateTime>,
}

impl ResponseWindow {
    /// Window for a model run initialised at `init` and a response time in hours.
    ///
    /// The six-hour window covers `init + h` for `h` in `rtime - 5 .. rtime`,
    /// a half-open range of five hourly instants. The one-hour window is the
    /// single instant `init + rtime`.
    pub fn new(init: NaiveDateTime, six_hour: bool, response_hours: i64) -> Self {
        let instants = if six_hour {
            (response_hours - 5..response_hours)
                .map(|h| init + Duration::hours(h))
                .collect()
        } else {
            vec![init + Duration::hours(response_hours)]
        };
        Self { instants }
    }

    /// Instants in the window, in ascending order
    pub fn instants(&self) -> &[NaiveDateTime] {
        &self.instants
    }

    /// Whether `time` is exactly one of the window's instants
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        self.instants.contains(&time)
    }
}

/// True when a time falls on the top of an hour
pub fn is_on_hour(time: NaiveDateTime) -> bool {
    time.minute() == 0 && time.second() == 0
}
