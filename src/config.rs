//! Shared widget configuration types and lenient parsing helpers.

use chrono::{DateTime, Utc};

/// Pixel margins around a widget's drawing area.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Margins {
    pub fn uniform(px: f32) -> Self {
        Self {
            left: px,
            top: px,
            right: px,
            bottom: px,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(40.0)
    }
}

pub fn parse_date(text: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| format!("bad date {:?}: {}", text, e))
}

/// Parses a date string, substituting the current time on failure. Bad
/// config dates degrade to a zero-width range instead of breaking the
/// widget.
pub fn parse_date_or_now(text: &str) -> DateTime<Utc> {
    match parse_date(text) {
        Ok(date) => date,
        Err(err) => {
            log::warn!("{}; falling back to current time", err);
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339() {
        let d = parse_date("2025-03-15T06:46:00Z").unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2025, 3, 15, 6, 46, 0).unwrap());
    }

    #[test]
    fn bad_date_falls_back_to_now() {
        let before = Utc::now();
        let d = parse_date_or_now("not a date");
        let after = Utc::now();
        assert!(d >= before && d <= after);
    }
}
