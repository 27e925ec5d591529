//! Small helpers shared by [`crate::journey`] and the demos/benches: GTFS-style
//! `HH:MM:SS` time parsing and formatting, kept independent of any ingestion
//! format (spec's data model represents times as seconds-since-midnight
//! `u32`s).

use std::num::ParseIntError;

#[derive(thiserror::Error, Debug)]
pub enum TimeParseError {
    #[error("malformed time string {0:?}: expected HH:MM:SS")]
    BadFormat(String),
    #[error("malformed time string {0:?}: {1}")]
    BadNumber(String, ParseIntError),
}

/// Parses a GTFS-style `HH:MM:SS` timestamp into seconds since midnight.
/// Hours may exceed 23 (GTFS uses this to represent trips past midnight),
/// so this is plain arithmetic rather than a calendar time parse.
pub fn parse_time(s: &str) -> Result<u32, TimeParseError> {
    let parts: Vec<&str> = s.split(':').collect();
    let [h, m, sec] = parts[..] else {
        return Err(TimeParseError::BadFormat(s.to_owned()));
    };
    if m.len() != 2 || sec.len() != 2 {
        return Err(TimeParseError::BadFormat(s.to_owned()));
    }

    let hours: u32 = h.parse().map_err(|e| TimeParseError::BadNumber(s.to_owned(), e))?;
    let minutes: u32 = m.parse().map_err(|e| TimeParseError::BadNumber(s.to_owned(), e))?;
    let seconds: u32 = sec.parse().map_err(|e| TimeParseError::BadNumber(s.to_owned(), e))?;
    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Formats seconds since midnight as `HH:MM:SS`, the inverse of [`parse_time`].
pub fn format_time(time: u32) -> String {
    let hours = time / 3600;
    let minutes = (time % 3600) / 60;
    let seconds = time % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        assert_eq!(format_time(parse_time("08:30:00").unwrap()), "08:30:00");
        assert_eq!(parse_time("25:00:00").unwrap(), 25 * 3600);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_time("08:30").is_err());
        assert!(parse_time("ab:30:00").is_err());
    }
}
