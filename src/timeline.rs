//! Linear date-to-pixel mapping.
//!
//! A `LinearTimeMapper` is calibrated from two waypoints (a date and the
//! pixel x it must land on) and converts in both directions, clamping to a
//! configured pixel range. Positions are `f64` throughout; a single `f32`
//! rounding near the center of a month-wide calibration already costs
//! hundreds of milliseconds on the way back, so callers narrow to `f32`
//! only when painting.

use chrono::{DateTime, Duration, Utc};

#[derive(Clone, Copy, Debug)]
pub struct LinearTimeMapper {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub first_x: f64,
    pub last_x: f64,
    pub clamp_left: f64,
    pub clamp_right: f64,
}

impl LinearTimeMapper {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        first_x: f64,
        last_x: f64,
        clamp_left: f64,
        clamp_right: f64,
    ) -> Self {
        Self {
            start,
            end,
            first_x,
            last_x,
            clamp_left,
            clamp_right,
        }
    }

    /// Pixels per millisecond. Zero when the calibration range has no
    /// duration, which pins every date to the start position.
    pub fn pixels_per_ms(&self) -> f64 {
        let total_ms = (self.end - self.start).num_milliseconds();
        if total_ms == 0 {
            return 0.0;
        }
        (self.last_x - self.first_x) / total_ms as f64
    }

    pub fn date_to_x(&self, date: DateTime<Utc>) -> f64 {
        let offset_ms = (date - self.start).num_milliseconds() as f64;
        let x = self.first_x + offset_ms * self.pixels_per_ms();
        x.clamp(self.clamp_left, self.clamp_right)
    }

    /// Inverse of `date_to_x`. The pixel is clamped to the mapper's range
    /// first, so out-of-range pixels return the corresponding boundary date.
    pub fn x_to_date(&self, x: f64) -> DateTime<Utc> {
        let ppms = self.pixels_per_ms();
        if ppms == 0.0 {
            return self.start;
        }
        let x = x.clamp(self.clamp_left, self.clamp_right);
        let offset_ms = ((x - self.first_x) / ppms).round() as i64;
        self.start + Duration::milliseconds(offset_ms)
    }
}
