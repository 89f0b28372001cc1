//! Retrograde windows and sign-ingress transit compilation.
//!
//! A retrograde is described by four dates (shadow start, station
//! retrograde, station direct, shadow end) and the two station degrees.
//! Ingress dates for the 0° Aries cusp are recovered by inverting the
//! linear degree-vs-time interpolation within each phase.

use crate::zodiac::{sign_at, Planet, Sign, ZodiacDegree};
use chrono::{DateTime, Utc};

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RetrogradeWindow {
    pub shadow_start: DateTime<Utc>,
    pub retro_start: DateTime<Utc>,
    pub retro_end: DateTime<Utc>,
    pub shadow_end: DateTime<Utc>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RetroPhase {
    PreShadow,
    Retrograde,
    PostShadow,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TransitEvent {
    pub date: DateTime<Utc>,
    pub sign: Sign,
}

#[derive(Clone, Copy, Debug)]
pub struct RetrogradeSpec {
    pub planet: Planet,
    pub window: RetrogradeWindow,
    pub start_degree: ZodiacDegree,
    pub end_degree: ZodiacDegree,
}

impl RetrogradeSpec {
    /// Continuous station degrees with the end unwrapped below the start,
    /// so the retrograde always walks downward through the zodiac.
    pub fn degree_bounds(&self) -> (f64, f64) {
        let start = self.start_degree.continuous();
        let mut end = self.end_degree.continuous();
        if end > start {
            end -= 360.0;
        }
        (start, end)
    }
}

/// Date at which the planet crosses `degree` during the given phase,
/// by inverse time interpolation. Returns `None` when the interpolation
/// is degenerate (zero degree span) or the timestamp overflows.
pub fn ingress_date(
    spec: &RetrogradeSpec,
    degree: f64,
    phase: RetroPhase,
) -> Option<DateTime<Utc>> {
    let (start_degree, end_degree) = spec.degree_bounds();
    let w = &spec.window;

    let (start_ms, end_ms, start_deg, end_deg, forward) = match phase {
        RetroPhase::PreShadow => (
            w.shadow_start.timestamp_millis(),
            w.retro_start.timestamp_millis(),
            end_degree,
            start_degree,
            true,
        ),
        RetroPhase::Retrograde => (
            w.retro_start.timestamp_millis(),
            w.retro_end.timestamp_millis(),
            start_degree,
            end_degree,
            false,
        ),
        RetroPhase::PostShadow => (
            w.retro_end.timestamp_millis(),
            w.shadow_end.timestamp_millis(),
            end_degree,
            start_degree,
            true,
        ),
    };

    let mut adjusted = degree;
    if forward {
        if adjusted < start_deg {
            adjusted += 360.0;
        }
        if adjusted > end_deg + 360.0 {
            adjusted -= 360.0;
        }
    } else {
        if adjusted > start_deg {
            adjusted -= 360.0;
        }
        if adjusted < end_deg - 360.0 {
            adjusted += 360.0;
        }
    }

    let progress = if forward {
        (adjusted - start_deg) / (end_deg - start_deg)
    } else {
        (start_deg - adjusted) / (start_deg - end_deg)
    };
    if !progress.is_finite() {
        return None;
    }

    let duration_ms = (end_ms - start_ms) as f64;
    let transit_ms = start_ms as f64 + progress * duration_ms;
    DateTime::from_timestamp_millis(transit_ms as i64)
}

/// Compiles the ingress transits for a retrograde window: 0° Aries cusp
/// crossings per phase (kept only inside the governing phase's bounds)
/// merged with the caller-supplied transits, deduplicated by
/// (RFC 3339 date, sign) and sorted ascending.
pub fn compile_transits(spec: &RetrogradeSpec, extra: &[TransitEvent]) -> Vec<TransitEvent> {
    let mut transits = Vec::new();
    let w = &spec.window;

    let cusp = 0.0;
    let base_sign = sign_at(cusp);
    let prev_sign = base_sign.previous();

    if let Some(date) = ingress_date(spec, cusp, RetroPhase::PreShadow) {
        if date >= w.shadow_start && date <= w.retro_start {
            transits.push(TransitEvent {
                date,
                sign: base_sign,
            });
        }
    }
    if let Some(date) = ingress_date(spec, cusp, RetroPhase::Retrograde) {
        if date >= w.retro_start && date <= w.retro_end {
            transits.push(TransitEvent {
                date,
                sign: prev_sign,
            });
        }
    }
    if let Some(date) = ingress_date(spec, cusp, RetroPhase::PostShadow) {
        if date >= w.retro_end && date <= w.shadow_end {
            transits.push(TransitEvent {
                date,
                sign: base_sign,
            });
        }
    }

    transits.extend_from_slice(extra);
    transits.sort_by_key(|t| t.date);

    let mut seen = std::collections::HashSet::new();
    transits.retain(|t| seen.insert((t.date.to_rfc3339(), t.sign)));
    transits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zodiac::parse_degree;
    use chrono::TimeZone;

    fn mercury_spring_2025() -> RetrogradeSpec {
        RetrogradeSpec {
            planet: Planet::Mercury,
            window: RetrogradeWindow {
                shadow_start: Utc.with_ymd_and_hms(2025, 2, 26, 0, 0, 0).unwrap(),
                retro_start: Utc.with_ymd_and_hms(2025, 3, 15, 6, 46, 0).unwrap(),
                retro_end: Utc.with_ymd_and_hms(2025, 4, 7, 11, 8, 0).unwrap(),
                shadow_end: Utc.with_ymd_and_hms(2025, 4, 26, 0, 0, 0).unwrap(),
            },
            start_degree: parse_degree("9° Aries 35'").unwrap(),
            end_degree: parse_degree("26° Pisces 49'").unwrap(),
        }
    }

    #[test]
    fn end_degree_unwraps_below_start() {
        let spec = mercury_spring_2025();
        let (start, end) = spec.degree_bounds();
        assert!((start - (9.0 + 35.0 / 60.0)).abs() < 1e-9);
        assert!(end < 0.0 && end > -4.0);
    }

    #[test]
    fn cusp_crossed_in_all_three_phases() {
        let spec = mercury_spring_2025();
        let transits = compile_transits(&spec, &[]);
        assert_eq!(transits.len(), 3);
        assert_eq!(transits[0].sign, Sign::Aries);
        assert_eq!(transits[1].sign, Sign::Pisces);
        assert_eq!(transits[2].sign, Sign::Aries);
        assert!(transits[0].date < transits[1].date);
        assert!(transits[1].date < transits[2].date);
        let w = &spec.window;
        assert!(transits[0].date >= w.shadow_start && transits[0].date <= w.retro_start);
        assert!(transits[1].date >= w.retro_start && transits[1].date <= w.retro_end);
        assert!(transits[2].date >= w.retro_end && transits[2].date <= w.shadow_end);
    }

    #[test]
    fn retrograde_ingress_matches_degree_fraction() {
        let spec = mercury_spring_2025();
        let (start, end) = spec.degree_bounds();
        let date = ingress_date(&spec, 0.0, RetroPhase::Retrograde).unwrap();
        let w = &spec.window;
        let expected_fraction = start / (start - end);
        let elapsed = (date - w.retro_start).num_milliseconds() as f64;
        let total = (w.retro_end - w.retro_start).num_milliseconds() as f64;
        assert!((elapsed / total - expected_fraction).abs() < 1e-6);
    }

    #[test]
    fn no_cusp_events_when_the_arc_misses_zero_aries() {
        let spec = RetrogradeSpec {
            planet: Planet::Mercury,
            window: mercury_spring_2025().window,
            start_degree: parse_degree("15° Taurus 0'").unwrap(),
            end_degree: parse_degree("2° Taurus 0'").unwrap(),
        };
        assert!(compile_transits(&spec, &[]).is_empty());
    }

    #[test]
    fn duplicate_extra_transits_are_dropped() {
        let spec = mercury_spring_2025();
        let base = compile_transits(&spec, &[]);
        let with_dup = compile_transits(&spec, &[base[0]]);
        assert_eq!(with_dup.len(), base.len());
    }

    #[test]
    fn extra_transits_are_merged_in_date_order() {
        let spec = mercury_spring_2025();
        let extra = TransitEvent {
            date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            sign: Sign::Taurus,
        };
        let transits = compile_transits(&spec, &[extra]);
        assert_eq!(transits.len(), 4);
        assert!(transits.windows(2).all(|w| w[0].date <= w[1].date));
    }
}
