use chrono::{Datelike, NaiveDate, Weekday};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("Invalid clock time: {0}")]
    InvalidFormat(String),

    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),
}

/// Parse an "HH:MM" clock string into minutes since midnight.
pub fn time_to_minutes(clock: &str) -> Result<u32, TimeError> {
    let (h, m) = clock
        .split_once(':')
        .ok_or_else(|| TimeError::InvalidFormat(clock.to_string()))?;

    let hours: u32 = h
        .parse()
        .map_err(|_| TimeError::InvalidFormat(clock.to_string()))?;
    let minutes: u32 = m
        .parse()
        .map_err(|_| TimeError::InvalidFormat(clock.to_string()))?;

    if hours > 23 || minutes > 59 {
        return Err(TimeError::InvalidFormat(clock.to_string()));
    }

    Ok(hours * 60 + minutes)
}

/// Render minutes since midnight as a zero-padded "HH:MM" string.
/// Callers guarantee the value represents a valid time of day.
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parse a "YYYY-MM-DD" calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, TimeError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| TimeError::InvalidDate(raw.to_string()))
}

/// Saturday/Sunday classification from the calendar date components alone.
/// `NaiveDate` carries no timezone, so this cannot drift across midnight
/// the way a timezone-sensitive construction would.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
