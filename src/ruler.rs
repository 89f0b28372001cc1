//! Ruler tick builders.
//!
//! Two tick scales share the `RulerTick` model: a fixed-duration scale
//! (6-hour intervals anchored to local midnight, used under the lunar
//! timeline) and a fixed-angular scale (0.25° steps walking backwards
//! through the zodiac, used under the retrograde tracker). Both produce
//! positioned ticks only; drawing and label culling stay in the widgets.

use crate::timeline::LinearTimeMapper;
use crate::zodiac::{sign_at, ZodiacDegree};
use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickKind {
    Major,
    Half,
    Minor,
}

#[derive(Clone, PartialEq, Debug)]
pub struct RulerTick {
    pub x: f32,
    pub kind: TickKind,
    pub label: Option<String>,
}

/// Ticks every six hours across the mapper's full clamp range, anchored to
/// the local midnight on or before the leftmost visible instant. Midnight
/// ticks are major, noon ticks are half-height and carry the day of the
/// month, the rest are minor. Ticks whose unclamped position overshoots the
/// right edge are dropped; positions short of the left edge clamp onto it.
pub fn six_hour_ticks<Tz: TimeZone>(mapper: &LinearTimeMapper, tz: &Tz) -> Vec<RulerTick> {
    let ppms = mapper.pixels_per_ms();
    if ppms <= 0.0 {
        return Vec::new();
    }

    let time_before_ms = ((mapper.first_x - mapper.clamp_left) / ppms) as i64;
    let time_after_ms = ((mapper.clamp_right - mapper.last_x) / ppms) as i64;
    let visible_start = mapper.start - Duration::milliseconds(time_before_ms);
    let end_tick = mapper.end + Duration::milliseconds(time_after_ms);

    let local_start = visible_start.with_timezone(tz);
    let midnight = local_start
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| tz.from_local_datetime(&naive).earliest());
    // A DST gap swallowing midnight leaves no anchor; start at the visible
    // edge instead.
    let mut tick: DateTime<Tz> = midnight.unwrap_or(local_start);

    let mut ticks = Vec::new();
    while tick.clone().with_timezone(&chrono::Utc) <= end_tick {
        let utc = tick.clone().with_timezone(&chrono::Utc);
        let offset_ms = (utc - mapper.start).num_milliseconds() as f64;
        let raw_x = mapper.first_x + offset_ms * ppms;
        if raw_x <= mapper.clamp_right {
            let x = raw_x.max(mapper.clamp_left) as f32;
            let (kind, label) = match tick.hour() {
                0 => (TickKind::Major, None),
                12 => (TickKind::Half, Some(tick.day().to_string())),
                _ => (TickKind::Minor, None),
            };
            ticks.push(RulerTick { x, kind, label });
        }
        tick = tick + Duration::hours(6);
    }
    ticks
}

/// Degree ticks for the retrograde ruler, every 0.25° from 30° ahead of
/// the station-retrograde degree down to just past the station-direct
/// degree. Scale is calibrated so the two station degrees land on the
/// highlight band edges. Whole degrees are major ticks labelled with the
/// in-sign degree and sign glyph, halves are half-height, quarters minor.
pub fn degree_ticks(
    start_degree: ZodiacDegree,
    end_degree: ZodiacDegree,
    highlight_start_x: f32,
    highlight_end_x: f32,
    ruler_start_x: f32,
    ruler_end_x: f32,
) -> Vec<RulerTick> {
    let start = start_degree.continuous();
    let mut end = end_degree.continuous();
    if end > start {
        end -= 360.0;
    }
    let span = start - end;
    if span <= 0.0 {
        return Vec::new();
    }
    let pixels_per_degree = (highlight_start_x - highlight_end_x) / span as f32;

    let mut ticks = Vec::new();
    let mut degree = (start + 30.0).ceil();
    let last = (end - 1.0).ceil();
    while degree >= last {
        let normalized = degree.rem_euclid(360.0);
        let display = (normalized % 30.0).floor() as i32;

        let quarter = (degree * 4.0).round() as i64;
        let (kind, label) = if quarter % 4 == 0 {
            (
                TickKind::Major,
                Some(format!("{}° {}", display, sign_at(normalized).glyph())),
            )
        } else if quarter.rem_euclid(4) == 2 {
            (TickKind::Half, None)
        } else {
            (TickKind::Minor, None)
        };

        let relative = (start - degree) as f32;
        let x = highlight_start_x - relative * pixels_per_degree;
        if x >= ruler_start_x && x <= ruler_end_x {
            ticks.push(RulerTick { x, kind, label });
        }
        degree -= 0.25;
    }

    ticks.sort_by(|a, b| a.x.total_cmp(&b.x));
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zodiac::parse_degree;
    use chrono::{TimeZone as _, Utc};

    fn lunar_mapper() -> LinearTimeMapper {
        LinearTimeMapper::new(
            Utc.with_ymd_and_hms(2025, 4, 20, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 4, 28, 12, 0, 0).unwrap(),
            100.0,
            700.0,
            40.0,
            760.0,
        )
    }

    #[test]
    fn six_hour_ticks_anchor_to_midnight() {
        let ticks = six_hour_ticks(&lunar_mapper(), &Utc);
        assert!(!ticks.is_empty());
        // 2025-04-21T00:00Z is 12 h after the first waypoint: 75 px/day.
        let midnight = ticks
            .iter()
            .find(|t| (t.x - 137.5).abs() < 0.001)
            .expect("expected a tick at the Apr 21 midnight position");
        assert_eq!(midnight.kind, TickKind::Major);
        assert_eq!(midnight.label, None);
    }

    #[test]
    fn noon_ticks_carry_the_day_of_month() {
        let ticks = six_hour_ticks(&lunar_mapper(), &Utc);
        let labelled: Vec<_> = ticks.iter().filter(|t| t.label.is_some()).collect();
        assert!(!labelled.is_empty());
        assert!(labelled.iter().all(|t| t.kind == TickKind::Half));
        assert!(labelled
            .iter()
            .any(|t| t.label.as_deref() == Some("21")));
    }

    #[test]
    fn six_hour_ticks_stay_inside_the_clamp_range() {
        let ticks = six_hour_ticks(&lunar_mapper(), &Utc);
        assert!(ticks.iter().all(|t| t.x >= 40.0 && t.x <= 760.0));
        assert!(ticks.windows(2).all(|w| w[0].x <= w[1].x));
        // Every fourth tick from a midnight anchor is another midnight.
        let majors = ticks.iter().filter(|t| t.kind == TickKind::Major).count();
        let minors = ticks.iter().filter(|t| t.kind == TickKind::Minor).count();
        assert!(minors >= majors);
    }

    #[test]
    fn degenerate_mapper_yields_no_ticks() {
        let start = Utc.with_ymd_and_hms(2025, 4, 20, 12, 0, 0).unwrap();
        let m = LinearTimeMapper::new(start, start, 100.0, 700.0, 40.0, 760.0);
        assert!(six_hour_ticks(&m, &Utc).is_empty());
    }

    fn mercury_ticks() -> Vec<RulerTick> {
        degree_ticks(
            parse_degree("9° Aries 35'").unwrap(),
            parse_degree("26° Pisces 49'").unwrap(),
            657.75,
            142.25,
            112.25,
            687.75,
        )
    }

    #[test]
    fn degree_ticks_are_sorted_and_bounded() {
        let ticks = mercury_ticks();
        assert!(!ticks.is_empty());
        assert!(ticks.windows(2).all(|w| w[0].x <= w[1].x));
        assert!(ticks.iter().all(|t| t.x >= 112.25 && t.x <= 687.75));
    }

    #[test]
    fn aries_cusp_gets_a_major_labelled_tick() {
        let ticks = mercury_ticks();
        let cusp = ticks
            .iter()
            .find(|t| t.label.as_deref() == Some("0° ♈︎"))
            .expect("expected the 0° Aries tick");
        assert_eq!(cusp.kind, TickKind::Major);
        // 9°35' above the cusp at (657.75 - 142.25) px over the span.
        let span = (9.0 + 35.0 / 60.0) + (360.0 - (330.0 + 26.0 + 49.0 / 60.0));
        let ppd = (657.75 - 142.25) / span as f32;
        let expected = 657.75 - (9.0 + 35.0 / 60.0) as f32 * ppd;
        assert!((cusp.x - expected).abs() < 0.01);
    }

    #[test]
    fn ticks_past_the_cusp_wrap_into_pisces() {
        let ticks = mercury_ticks();
        assert!(ticks.iter().any(|t| t.label.as_deref() == Some("29° ♓︎")));
        assert!(ticks.iter().any(|t| t.label.as_deref() == Some("27° ♓︎")));
    }

    #[test]
    fn quarter_degrees_alternate_half_and_minor() {
        let ticks = mercury_ticks();
        let majors = ticks.iter().filter(|t| t.kind == TickKind::Major).count();
        let halves = ticks.iter().filter(|t| t.kind == TickKind::Half).count();
        let minors = ticks.iter().filter(|t| t.kind == TickKind::Minor).count();
        assert!(majors > 0 && halves > 0);
        // Two quarter ticks per half tick.
        assert!(minors > halves);
        assert!(ticks
            .iter()
            .all(|t| t.kind == TickKind::Major || t.label.is_none()));
    }

    #[test]
    fn zero_span_yields_no_ticks() {
        let d = parse_degree("9° Aries 35'").unwrap();
        assert!(degree_ticks(d, d, 657.75, 142.25, 112.25, 687.75).is_empty());
    }
}
