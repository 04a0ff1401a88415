//! Date and time handling: parsing `DateGMT`/`TimeGMT` and deriving
//! calendar features.

use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::frame::{Frame, Value};

/// Raw date column.
pub const DATE_COLUMN: &str = "DateGMT";
/// Raw time-of-day column.
pub const TIME_COLUMN: &str = "TimeGMT";
/// Combined timestamp column.
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

/// Southern-hemisphere season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// December to February.
    Summer,
    /// March to May.
    Autumn,
    /// June to August.
    Winter,
    /// September to November.
    Spring,
}

impl Season {
    /// Season for a calendar month (1-12), southern hemisphere.
    #[must_use]
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            12 | 1 | 2 => Some(Self::Summer),
            3..=5 => Some(Self::Autumn),
            6..=8 => Some(Self::Winter),
            9..=11 => Some(Self::Spring),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summer => write!(f, "summer"),
            Self::Autumn => write!(f, "autumn"),
            Self::Winter => write!(f, "winter"),
            Self::Spring => write!(f, "spring"),
        }
    }
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d*)?)?(?::(\d+(?:\.\d*)?)?)?(?::(\d+(?:\.\d*)?)?)?$")
            .expect("time pattern is valid")
    })
}

/// Parse a `H:M:S` time of day.
///
/// Absent components count as zero and fractional parts are truncated.
/// Returns `None` for text that is not colon-separated numbers, or for
/// components outside a valid time of day.
#[must_use]
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let caps = time_pattern().captures(text.trim())?;
    let component = |i: usize| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse::<f64>().ok().and_then(whole_part),
            None => Some(0),
        }
    };
    NaiveTime::from_hms_opt(component(1)?, component(2)?, component(3)?)
}

// The pattern only admits non-negative values.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_part(value: f64) -> Option<u32> {
    (value < f64::from(u32::MAX)).then(|| value.trunc() as u32)
}

/// Parse a date with the given `chrono` format.
#[must_use]
pub fn parse_date(text: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), format).ok()
}

/// Convert `DateGMT` to dates and, when `TimeGMT` is present, add the
/// combined `Timestamp` column.
///
/// Returns the number of non-missing dates that failed to parse. Does nothing
/// (and returns zero) when the frame has no `DateGMT` column.
///
/// # Errors
///
/// Returns an error if a derived column cannot be added to the frame.
pub fn parse_timestamps(frame: &mut Frame, date_format: &str) -> Result<usize> {
    let Some(dates) = frame.column(DATE_COLUMN) else {
        warn!("No {DATE_COLUMN} column; skipping timestamp parsing");
        return Ok(0);
    };

    let mut unparsed = 0;
    let parsed: Vec<Value> = dates
        .values
        .iter()
        .map(|value| match value {
            Value::Date(d) => Value::Date(*d),
            Value::Text(s) => parse_date(s, date_format).map_or_else(
                || {
                    unparsed += 1;
                    Value::Missing
                },
                Value::Date,
            ),
            _ => Value::Missing,
        })
        .collect();

    if unparsed > 0 {
        warn!("{unparsed} {DATE_COLUMN} value(s) did not match format {date_format:?}");
    }

    if let Some(times) = frame.column(TIME_COLUMN) {
        let timestamps = parsed
            .iter()
            .zip(&times.values)
            .map(|(date, time)| combine(date, time))
            .collect();
        frame.set_column(TIMESTAMP_COLUMN, timestamps)?;
    } else {
        debug!("No {TIME_COLUMN} column; {TIMESTAMP_COLUMN} not derived");
    }

    frame.set_column(DATE_COLUMN, parsed)?;
    Ok(unparsed)
}

fn combine(date: &Value, time: &Value) -> Value {
    let Value::Date(date) = date else {
        return Value::Missing;
    };
    let time = match time {
        Value::Text(s) => {
            let parsed = parse_time(s);
            if parsed.is_none() {
                debug!("Unparseable {TIME_COLUMN} value {s:?}");
            }
            parsed
        }
        _ => NaiveTime::from_hms_opt(0, 0, 0),
    };
    time.map_or(Value::Missing, |t| Value::Timestamp(date.and_time(t)))
}

/// Add `hour_of_day`, `month` and `season` derived from `Timestamp`.
///
/// Returns `false` without changing the frame when there is no timestamp
/// column.
///
/// # Errors
///
/// Returns an error if a derived column cannot be added to the frame.
pub fn add_time_features(frame: &mut Frame) -> Result<bool> {
    let Some(timestamps) = frame.column(TIMESTAMP_COLUMN) else {
        return Ok(false);
    };

    let mut hours = Vec::with_capacity(frame.height());
    let mut months = Vec::with_capacity(frame.height());
    let mut seasons = Vec::with_capacity(frame.height());

    for value in &timestamps.values {
        if let Some(ts) = value.as_timestamp() {
            hours.push(Value::Number(f64::from(ts.hour())));
            months.push(Value::Number(f64::from(ts.month())));
            seasons.push(
                Season::from_month(ts.month())
                    .map_or(Value::Missing, |s| Value::Text(s.to_string())),
            );
        } else {
            hours.push(Value::Missing);
            months.push(Value::Missing);
            seasons.push(Value::Missing);
        }
    }

    frame.set_column("hour_of_day", hours)?;
    frame.set_column("month", months)?;
    frame.set_column("season", seasons)?;
    Ok(true)
}
