//! Marker collision avoidance on the tracker ribbon.
//!
//! Transit markers that would overlap the planet marker are nudged until
//! the center distance equals the sum of radii plus a gap. Station markers
//! push horizontally; everything else pushes vertically, snapping back onto
//! an arc when the marker sits in an arc band and the snapped point
//! satisfies the separation, otherwise taking the straight-line vertical
//! solution. Unsatisfiable constraints return `Nudge::None` with no
//! position, and the caller skips the marker.

use crate::path::TrackerLayout;
use crate::transit::RetrogradeWindow;
use chrono::{DateTime, Utc};
use eframe::egui::Pos2;

const STATION_SNAP_MS: i64 = 1000;
const SEPARATION_TOLERANCE: f32 = 0.1;

#[derive(Clone, Copy, Debug)]
pub struct Anchor {
    pub pos: Pos2,
    pub radius: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    pub x: f32,
    pub initial_y: f32,
    pub radius: f32,
    pub date: Option<DateTime<Utc>>,
}

/// Resolution for one candidate marker. `X` is a horizontal delta, `Y` is
/// an absolute replacement y. `None` either means no adjustment is needed
/// or none is possible; callers distinguish by whether the marker already
/// clears the anchor.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Nudge {
    None,
    X(f32),
    Y(f32),
}

pub fn space_markers(
    layout: &TrackerLayout,
    window: &RetrogradeWindow,
    anchor: &Anchor,
    candidate: &Candidate,
    gap: f32,
) -> Nudge {
    let total = anchor.radius + gap + candidate.radius;
    let dx = candidate.x - anchor.pos.x;
    let dy = candidate.initial_y - anchor.pos.y;
    let current = (dx * dx + dy * dy).sqrt();

    if current >= total - SEPARATION_TOLERANCE {
        return Nudge::None;
    }

    let date_ms = candidate.date.map(|d| d.timestamp_millis());
    let retro_start_ms = window.retro_start.timestamp_millis();
    let retro_end_ms = window.retro_end.timestamp_millis();

    let at_retro_start = date_ms.is_some_and(|ms| (ms - retro_start_ms).abs() < STATION_SNAP_MS);
    let at_retro_end = date_ms.is_some_and(|ms| (ms - retro_end_ms).abs() < STATION_SNAP_MS);

    // Station markers sit at the fold extremes; pushing them vertically
    // would pull them off the ribbon entirely.
    if at_retro_start {
        return Nudge::X(total);
    }
    if at_retro_end {
        return Nudge::X(-total);
    }

    let pre_retrograde = date_ms.is_some_and(|ms| ms < retro_start_ms);
    let post_retrograde = date_ms.is_some_and(|ms| ms > retro_end_ms);
    let during_retrograde =
        date_ms.is_some_and(|ms| ms >= retro_start_ms && ms <= retro_end_ms);

    let in_arc_band = (candidate.initial_y > layout.top_line_y + 1.0
        && candidate.initial_y <= layout.top_right_arc_center.y + 5.0)
        || (candidate.initial_y > layout.middle_line_y + 1.0
            && candidate.initial_y <= layout.bottom_left_arc_center.y + 5.0);

    let push_up = if pre_retrograde && candidate.x > layout.adjusted_right_endpoint {
        true
    } else if post_retrograde && candidate.x < layout.adjusted_left_endpoint {
        false
    } else if during_retrograde {
        candidate.x < layout.adjusted_left_endpoint
    } else {
        candidate.initial_y < anchor.pos.y
    };

    let straight = |push_up: bool| -> Nudge {
        let dy_squared = total * total - dx * dx;
        if dy_squared < 0.0 {
            return Nudge::None;
        }
        let magnitude = dy_squared.sqrt();
        Nudge::Y(anchor.pos.y + if push_up { -magnitude } else { magnitude })
    };

    if !in_arc_band {
        return straight(push_up);
    }

    let on_right = candidate.x > layout.adjusted_right_endpoint;
    let arc_center = if on_right {
        layout.top_right_arc_center
    } else {
        layout.bottom_left_arc_center
    };

    let dx_arc = candidate.x - arc_center.x;
    if dx_arc.abs() >= layout.arc_radius - SEPARATION_TOLERANCE {
        return straight(push_up);
    }

    let dy_arc = (layout.arc_radius * layout.arc_radius - dx_arc * dx_arc).sqrt();
    let snapped_y = if push_up {
        arc_center.y - dy_arc
    } else {
        arc_center.y + dy_arc
    };

    let snapped_distance = (dx * dx + (snapped_y - anchor.pos.y).powi(2)).sqrt();
    if (snapped_distance - total).abs() > SEPARATION_TOLERANCE {
        return straight(push_up);
    }
    Nudge::Y(snapped_y)
}
