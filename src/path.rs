//! Folded-ribbon path geometry for the retrograde tracker.
//!
//! The retrograde timeline folds back on itself: the pre-retrograde motion
//! runs left to right along a top line, a quarter-circle arc turns it
//! around, the retrograde runs right to left along a middle line, a second
//! arc turns it again, and the post-retrograde motion runs left to right
//! along a bottom line. `TrackerLayout` derives every coordinate from the
//! widget rect and margins; `plot_date` maps a date onto the ribbon.

use crate::config::Margins;
use crate::transit::RetrogradeWindow;
use chrono::{DateTime, Utc};
use eframe::egui::{pos2, Pos2, Rect};

pub const RULER_HEIGHT: f32 = 20.0;
pub const ARROW_SIZE: f32 = 30.0;

/// Dates within this many milliseconds of a station are drawn at the arc
/// midpoint rather than interpolated.
const STATION_SNAP_MS: i64 = 1000;

#[derive(Clone, Copy, Debug)]
pub struct TrackerLayout {
    pub rect: Rect,
    pub margin: Margins,
    pub ruler_margin: f32,
    pub top_line_y: f32,
    pub middle_line_y: f32,
    pub bottom_line_y: f32,
    pub line_spacing: f32,
    pub arc_radius: f32,
    pub shadow_start_x: f32,
    pub shadow_end_x: f32,
    pub top_arrow_x: f32,
    pub top_arrow_left_x: f32,
    pub bottom_arrow_x: f32,
    pub bottom_arrow_left_x: f32,
    pub adjusted_left_endpoint: f32,
    pub adjusted_right_endpoint: f32,
    pub bottom_left_arc_outer_x: f32,
    pub top_right_arc_center: Pos2,
    pub bottom_left_arc_center: Pos2,
    pub ruler_start_x: f32,
    pub ruler_end_x: f32,
}

impl TrackerLayout {
    pub fn new(rect: Rect, margin: Margins, ruler_margin: f32) -> Self {
        let top_line_y = rect.top() + margin.top + RULER_HEIGHT + ruler_margin;
        let bottom_line_y = rect.bottom() - margin.bottom - ARROW_SIZE / 2.0;
        let line_spacing = (bottom_line_y - top_line_y) / 2.0;
        let arc_radius = line_spacing / 2.0;
        let middle_line_y = top_line_y + line_spacing;

        let shadow_start_x = rect.left() + margin.left + arc_radius;
        let shadow_end_x = rect.right() - margin.right - arc_radius;
        let top_arrow_x = shadow_start_x + 64.0;
        let top_arrow_left_x = top_arrow_x - ARROW_SIZE;
        let original_bottom_arrow_x = shadow_end_x - 64.0;
        let bottom_arrow_x = original_bottom_arrow_x + ARROW_SIZE;
        let bottom_arrow_left_x = bottom_arrow_x - ARROW_SIZE;

        let adjusted_left_endpoint = top_arrow_x + arc_radius;
        let adjusted_right_endpoint = bottom_arrow_left_x - arc_radius;
        let bottom_left_arc_outer_x = adjusted_left_endpoint - arc_radius;

        Self {
            rect,
            margin,
            ruler_margin,
            top_line_y,
            middle_line_y,
            bottom_line_y,
            line_spacing,
            arc_radius,
            shadow_start_x,
            shadow_end_x,
            top_arrow_x,
            top_arrow_left_x,
            bottom_arrow_x,
            bottom_arrow_left_x,
            adjusted_left_endpoint,
            adjusted_right_endpoint,
            bottom_left_arc_outer_x,
            top_right_arc_center: pos2(adjusted_right_endpoint, top_line_y + arc_radius),
            bottom_left_arc_center: pos2(adjusted_left_endpoint, middle_line_y + arc_radius),
            ruler_start_x: top_arrow_x - ARROW_SIZE,
            ruler_end_x: bottom_arrow_x,
        }
    }

    /// Linear position of a date over the full shadow span, ignoring the
    /// fold. Used for drag-independent reference positions.
    pub fn to_position(&self, date: DateTime<Utc>, window: &RetrogradeWindow) -> f32 {
        let active_width =
            self.rect.width() - self.margin.left - self.margin.right - 2.0 * self.arc_radius;
        let total_ms = (window.shadow_end - window.shadow_start).num_milliseconds() as f64;
        let offset_ms = (date - window.shadow_start).num_milliseconds() as f64;
        let fraction = if total_ms == 0.0 {
            0.0
        } else {
            offset_ms / total_ms
        };
        self.rect.left() + self.margin.left + self.arc_radius + (fraction * active_width as f64) as f32
    }

    /// Maps a date onto the ribbon. Station dates snap to the arc
    /// midpoints; within each temporal region the date interpolates along
    /// its line, and positions overlapping an arc get their y recomputed
    /// from the circle equation.
    pub fn plot_date(&self, date: DateTime<Utc>, window: &RetrogradeWindow) -> Pos2 {
        let date_ms = date.timestamp_millis();
        let shadow_start_ms = window.shadow_start.timestamp_millis();
        let retro_start_ms = window.retro_start.timestamp_millis();
        let retro_end_ms = window.retro_end.timestamp_millis();
        let shadow_end_ms = window.shadow_end.timestamp_millis();

        if (date_ms - retro_start_ms).abs() < STATION_SNAP_MS {
            return pos2(
                self.adjusted_right_endpoint + self.arc_radius,
                (self.top_line_y + self.middle_line_y) / 2.0,
            );
        }
        if (date_ms - retro_end_ms).abs() < STATION_SNAP_MS {
            return pos2(
                self.adjusted_left_endpoint - self.arc_radius,
                (self.middle_line_y + self.bottom_line_y) / 2.0,
            );
        }

        if date_ms < shadow_start_ms {
            let left = self.rect.left() + self.margin.left;
            let segment_width = self.top_arrow_left_x - left;
            return pos2(left + segment_width / 2.0, self.top_line_y);
        }

        if date_ms < retro_start_ms {
            let duration = (retro_start_ms - shadow_start_ms) as f64;
            let fraction = (((date_ms - shadow_start_ms) as f64) / duration).min(1.0) as f32;
            let span = self.adjusted_right_endpoint + self.arc_radius - self.top_arrow_x;
            let x = self.top_arrow_x + fraction * span;
            let mut y = self.top_line_y;
            if x > self.adjusted_right_endpoint {
                if let Some(arc) = arc_y(x, self.top_right_arc_center, self.arc_radius, true) {
                    y = arc;
                }
            }
            return pos2(x, y);
        }

        if date_ms < retro_end_ms {
            let duration = (retro_end_ms - retro_start_ms) as f64;
            let fraction = (((date_ms - retro_start_ms) as f64) / duration).min(1.0) as f32;
            let right = self.adjusted_right_endpoint + self.arc_radius;
            let left = self.adjusted_left_endpoint - self.arc_radius;
            let x = right - fraction * (right - left);
            let mut y = self.middle_line_y;
            if x > self.adjusted_right_endpoint {
                if let Some(arc) = arc_y(x, self.top_right_arc_center, self.arc_radius, false) {
                    y = arc;
                }
            } else if x < self.adjusted_left_endpoint {
                if let Some(arc) = arc_y(x, self.bottom_left_arc_center, self.arc_radius, true) {
                    y = arc;
                }
            }
            return pos2(x, y);
        }

        if date_ms <= shadow_end_ms {
            let duration = (shadow_end_ms - retro_end_ms) as f64;
            let fraction = (((date_ms - retro_end_ms) as f64) / duration).min(1.0) as f32;
            let span = self.bottom_arrow_left_x - self.bottom_left_arc_outer_x;
            let x = self.bottom_left_arc_outer_x + fraction * span;
            let mut y = self.bottom_line_y;
            if x < self.adjusted_left_endpoint {
                if let Some(arc) = arc_y(x, self.bottom_left_arc_center, self.arc_radius, false) {
                    y = arc;
                }
            }
            return pos2(x, y);
        }

        let right = self.rect.right() - self.margin.right;
        let segment_width = right - self.bottom_arrow_x;
        pos2(self.bottom_arrow_x + segment_width / 2.0, self.bottom_line_y)
    }
}

/// y on the circle of the given center and radius at horizontal position
/// `x`, taking the upper or lower branch. `None` when `x` is outside the
/// circle.
pub fn arc_y(x: f32, center: Pos2, radius: f32, upper: bool) -> Option<f32> {
    let dx = x - center.x;
    if dx.abs() > radius {
        return None;
    }
    let dy = (radius * radius - dx * dx).sqrt();
    Some(if upper { center.y - dy } else { center.y + dy })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn window() -> RetrogradeWindow {
        RetrogradeWindow {
            shadow_start: Utc.with_ymd_and_hms(2025, 2, 26, 0, 0, 0).unwrap(),
            retro_start: Utc.with_ymd_and_hms(2025, 3, 15, 6, 46, 0).unwrap(),
            retro_end: Utc.with_ymd_and_hms(2025, 4, 7, 11, 8, 0).unwrap(),
            shadow_end: Utc.with_ymd_and_hms(2025, 4, 26, 0, 0, 0).unwrap(),
        }
    }

    fn layout() -> TrackerLayout {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 300.0));
        TrackerLayout::new(rect, Margins::uniform(40.0), 32.0)
    }

    #[test]
    fn layout_derives_from_rect() {
        let l = layout();
        assert_eq!(l.top_line_y, 92.0);
        assert_eq!(l.bottom_line_y, 245.0);
        assert_eq!(l.middle_line_y, 168.5);
        assert_eq!(l.arc_radius, 38.25);
        assert_eq!(l.top_arrow_x, 142.25);
        assert_eq!(l.bottom_arrow_left_x, 657.75);
        assert_eq!(l.adjusted_left_endpoint, 180.5);
        assert_eq!(l.adjusted_right_endpoint, 619.5);
    }

    #[test]
    fn station_dates_snap_to_arc_midpoints() {
        let l = layout();
        let w = window();
        let start = l.plot_date(w.retro_start, &w);
        assert_eq!(start.x, l.adjusted_right_endpoint + l.arc_radius);
        assert_eq!(start.y, (l.top_line_y + l.middle_line_y) / 2.0);

        let nearly = l.plot_date(w.retro_start + Duration::milliseconds(500), &w);
        assert_eq!(nearly, start);

        let end = l.plot_date(w.retro_end, &w);
        assert_eq!(end.x, l.adjusted_left_endpoint - l.arc_radius);
        assert_eq!(end.y, (l.middle_line_y + l.bottom_line_y) / 2.0);
    }

    #[test]
    fn retrograde_midpoint_sits_on_the_middle_line() {
        let l = layout();
        let w = window();
        let half = (w.retro_end - w.retro_start) / 2;
        let p = l.plot_date(w.retro_start + half, &w);
        assert_eq!(p.y, l.middle_line_y);
        let right = l.adjusted_right_endpoint + l.arc_radius;
        let left = l.adjusted_left_endpoint - l.arc_radius;
        assert!((p.x - (right + left) / 2.0).abs() < 0.5);
    }

    #[test]
    fn pre_retrograde_runs_along_the_top_line() {
        let l = layout();
        let w = window();
        let p = l.plot_date(w.shadow_start, &w);
        assert_eq!(p, pos2(l.top_arrow_x, l.top_line_y));
    }

    #[test]
    fn arc_overlap_recomputes_y_from_the_circle() {
        let l = layout();
        let w = window();
        // A date far enough into the pre-retrograde leg that its x lands
        // past the right endpoint, on the top-right arc.
        let span = (w.retro_start - w.shadow_start).num_milliseconds();
        let date = w.shadow_start + Duration::milliseconds((span as f64 * 0.97) as i64);
        let p = l.plot_date(date, &w);
        assert!(p.x > l.adjusted_right_endpoint);
        let expected = arc_y(p.x, l.top_right_arc_center, l.arc_radius, true).unwrap();
        assert!((p.y - expected).abs() < 0.001);
        assert!(p.y > l.top_line_y && p.y < l.top_right_arc_center.y);
    }

    #[test]
    fn out_of_window_dates_center_on_the_outer_segments() {
        let l = layout();
        let w = window();
        let before = l.plot_date(w.shadow_start - Duration::days(30), &w);
        assert_eq!(before.y, l.top_line_y);
        assert!(before.x < l.top_arrow_left_x);

        let after = l.plot_date(w.shadow_end + Duration::days(30), &w);
        assert_eq!(after.y, l.bottom_line_y);
        assert!(after.x > l.bottom_arrow_x);
    }

    #[test]
    fn fraction_clamps_at_the_region_end() {
        let l = layout();
        let mut w = window();
        // Degenerate-ish probe: a date a hair before retro_end maps inside
        // the retrograde leg even though the snap window covers retro_end.
        w.shadow_end = w.retro_end + Duration::days(19);
        let p = l.plot_date(w.retro_end - Duration::milliseconds(1500), &w);
        assert!(p.x >= l.adjusted_left_endpoint - l.arc_radius - 0.5);
    }

    #[test]
    fn arc_y_outside_the_circle_is_none() {
        assert!(arc_y(100.0, pos2(0.0, 0.0), 38.25, true).is_none());
        let y = arc_y(0.0, pos2(0.0, 100.0), 40.0, true).unwrap();
        assert_eq!(y, 60.0);
        let y = arc_y(0.0, pos2(0.0, 100.0), 40.0, false).unwrap();
        assert_eq!(y, 140.0);
    }

    #[test]
    fn to_position_is_linear_over_the_shadow_span() {
        let l = layout();
        let w = window();
        let x0 = l.to_position(w.shadow_start, &w);
        let x1 = l.to_position(w.shadow_end, &w);
        assert_eq!(x0, l.shadow_start_x);
        assert!((x1 - l.shadow_end_x).abs() < 0.001);
        let half = w.shadow_start + (w.shadow_end - w.shadow_start) / 2;
        assert!((l.to_position(half, &w) - (x0 + x1) / 2.0).abs() < 0.5);
    }
}
