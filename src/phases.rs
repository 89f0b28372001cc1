//! Lunar phase window selection and phase naming.
//!
//! The lunar widget is fed the previous and next occurrence of each major
//! phase. The displayed window is the most recent phase on or before the
//! current date plus the next three, and the phase *right now* is bucketed
//! coarsely: the major phase itself until halfway to the next major phase,
//! the intermediate phase after that.

use crate::zodiac::Sign;
use chrono::{DateTime, Datelike, Utc};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    ThirdQuarter,
    WaningCrescent,
}

impl MoonPhase {
    pub const CYCLE: [MoonPhase; 8] = [
        MoonPhase::NewMoon,
        MoonPhase::WaxingCrescent,
        MoonPhase::FirstQuarter,
        MoonPhase::WaxingGibbous,
        MoonPhase::FullMoon,
        MoonPhase::WaningGibbous,
        MoonPhase::ThirdQuarter,
        MoonPhase::WaningCrescent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::ThirdQuarter => "Third Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "🌑",
            MoonPhase::WaxingCrescent => "🌒",
            MoonPhase::FirstQuarter => "🌓",
            MoonPhase::WaxingGibbous => "🌔",
            MoonPhase::FullMoon => "🌕",
            MoonPhase::WaningGibbous => "🌖",
            MoonPhase::ThirdQuarter => "🌗",
            MoonPhase::WaningCrescent => "🌘",
        }
    }

    pub fn cycle_index(&self) -> usize {
        MoonPhase::CYCLE.iter().position(|p| p == self).unwrap_or(0)
    }

    /// The intermediate phase following this major phase.
    pub fn following_intermediate(&self) -> MoonPhase {
        MoonPhase::CYCLE[(self.cycle_index() + 1) % 8]
    }
}

/// Previous and next occurrence of each major phase around the widget date.
/// Missing entries are skipped rather than treated as errors.
#[derive(Clone, Copy, Default, Debug)]
pub struct MoonInfo {
    pub previous_new_moon: Option<DateTime<Utc>>,
    pub previous_first_quarter: Option<DateTime<Utc>>,
    pub previous_full_moon: Option<DateTime<Utc>>,
    pub previous_third_quarter: Option<DateTime<Utc>>,
    pub next_new_moon: Option<DateTime<Utc>>,
    pub next_first_quarter: Option<DateTime<Utc>>,
    pub next_full_moon: Option<DateTime<Utc>>,
    pub next_third_quarter: Option<DateTime<Utc>>,
}

impl MoonInfo {
    fn events(&self) -> Vec<(MoonPhase, DateTime<Utc>)> {
        [
            (MoonPhase::ThirdQuarter, self.previous_third_quarter),
            (MoonPhase::NewMoon, self.previous_new_moon),
            (MoonPhase::FirstQuarter, self.previous_first_quarter),
            (MoonPhase::FullMoon, self.previous_full_moon),
            (MoonPhase::ThirdQuarter, self.next_third_quarter),
            (MoonPhase::NewMoon, self.next_new_moon),
            (MoonPhase::FirstQuarter, self.next_first_quarter),
            (MoonPhase::FullMoon, self.next_full_moon),
        ]
        .into_iter()
        .filter_map(|(phase, date)| date.map(|d| (phase, d)))
        .collect()
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PhaseEvent {
    pub phase: MoonPhase,
    pub date: DateTime<Utc>,
    pub full_moon_name: Option<&'static str>,
}

/// A lunar sign ingress, optionally preceded by a void-of-course period.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MoonTransit {
    pub date: DateTime<Utc>,
    pub sign: Sign,
    pub void_start: Option<DateTime<Utc>>,
    pub hellenistic: bool,
}

/// Traditional month name for a full moon.
pub fn full_moon_name(date: DateTime<Utc>) -> &'static str {
    const NAMES: [&str; 12] = [
        "Wolf Moon",
        "Snow Moon",
        "Worm Moon",
        "Pink Moon",
        "Flower Moon",
        "Strawberry Moon",
        "Buck Moon",
        "Sturgeon Moon",
        "Corn Moon",
        "Hunter's Moon",
        "Beaver Moon",
        "Cold Moon",
    ];
    NAMES[date.month0() as usize]
}

/// The displayed phase window: the latest phase on or before `current`
/// followed by the next three, in date order. Empty when no phase precedes
/// `current` or the info block is empty.
pub fn phase_window(info: &MoonInfo, current: DateTime<Utc>) -> Vec<PhaseEvent> {
    let events = info.events();
    let last = match events
        .iter()
        .filter(|(_, d)| *d <= current)
        .max_by_key(|(_, d)| *d)
    {
        Some(last) => *last,
        None => {
            log::warn!("no lunar phase on or before {}", current);
            return Vec::new();
        }
    };

    let mut future: Vec<_> = events.into_iter().filter(|(_, d)| *d > last.1).collect();
    future.sort_by_key(|(_, d)| *d);
    future.truncate(3);

    let mut window = vec![last];
    window.extend(future);
    window.sort_by_key(|(_, d)| *d);

    window
        .into_iter()
        .map(|(phase, date)| PhaseEvent {
            phase,
            date,
            full_moon_name: (phase == MoonPhase::FullMoon).then(|| full_moon_name(date)),
        })
        .collect()
}

/// The phase in effect at `date`: the preceding major phase until halfway
/// to the next one, the intermediate phase from there on. `None` when
/// `date` falls outside the known phase events.
pub fn current_phase(info: &MoonInfo, date: DateTime<Utc>) -> Option<MoonPhase> {
    let mut events = info.events();
    events.sort_by_key(|(_, d)| *d);

    let last_index = events.iter().rposition(|(_, d)| *d <= date)?;
    if last_index + 1 >= events.len() {
        return None;
    }

    let (last_phase, last_date) = events[last_index];
    let (_, next_date) = events[last_index + 1];
    let halfway = last_date + (next_date - last_date) / 2;

    if date < halfway {
        Some(last_phase)
    } else {
        Some(last_phase.following_intermediate())
    }
}

/// Date range spanned by the widget: first phase to the later of the last
/// phase and the last transit.
pub fn date_range(
    window: &[PhaseEvent],
    transits: &[MoonTransit],
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = window.first()?.date;
    let last_phase = window.last()?.date;
    let end = transits
        .iter()
        .map(|t| t.date)
        .fold(last_phase, |latest, d| if d > latest { d } else { latest });
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn april_2025() -> MoonInfo {
        MoonInfo {
            previous_new_moon: Some(Utc.with_ymd_and_hms(2025, 3, 29, 10, 58, 0).unwrap()),
            previous_first_quarter: Some(Utc.with_ymd_and_hms(2025, 4, 4, 2, 15, 0).unwrap()),
            previous_full_moon: Some(Utc.with_ymd_and_hms(2025, 4, 13, 0, 22, 0).unwrap()),
            previous_third_quarter: Some(Utc.with_ymd_and_hms(2025, 4, 21, 1, 36, 0).unwrap()),
            next_new_moon: Some(Utc.with_ymd_and_hms(2025, 4, 27, 19, 31, 0).unwrap()),
            next_first_quarter: Some(Utc.with_ymd_and_hms(2025, 5, 4, 13, 52, 0).unwrap()),
            next_full_moon: Some(Utc.with_ymd_and_hms(2025, 5, 12, 16, 56, 0).unwrap()),
            next_third_quarter: Some(Utc.with_ymd_and_hms(2025, 5, 20, 11, 59, 0).unwrap()),
        }
    }

    #[test]
    fn window_is_last_phase_plus_next_three() {
        let now = Utc.with_ymd_and_hms(2025, 4, 22, 12, 0, 0).unwrap();
        let window = phase_window(&april_2025(), now);
        assert_eq!(window.len(), 4);
        assert_eq!(window[0].phase, MoonPhase::ThirdQuarter);
        assert_eq!(window[1].phase, MoonPhase::NewMoon);
        assert_eq!(window[2].phase, MoonPhase::FirstQuarter);
        assert_eq!(window[3].phase, MoonPhase::FullMoon);
        assert!(window.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn full_moon_events_carry_their_month_name() {
        let now = Utc.with_ymd_and_hms(2025, 4, 22, 12, 0, 0).unwrap();
        let window = phase_window(&april_2025(), now);
        assert_eq!(window[3].full_moon_name, Some("Flower Moon"));
        assert_eq!(window[0].full_moon_name, None);
    }

    #[test]
    fn empty_window_before_all_phases() {
        let early = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(phase_window(&april_2025(), early).is_empty());
        assert!(phase_window(&MoonInfo::default(), early).is_empty());
    }

    #[test]
    fn current_phase_buckets_at_the_halfway_point() {
        let info = april_2025();
        // Just past the third quarter: still Third Quarter.
        let early = Utc.with_ymd_and_hms(2025, 4, 22, 12, 0, 0).unwrap();
        assert_eq!(current_phase(&info, early), Some(MoonPhase::ThirdQuarter));
        // Past halfway to the new moon: Waning Crescent.
        let late = Utc.with_ymd_and_hms(2025, 4, 25, 12, 0, 0).unwrap();
        assert_eq!(current_phase(&info, late), Some(MoonPhase::WaningCrescent));
    }

    #[test]
    fn current_phase_unknown_outside_the_events() {
        let info = april_2025();
        let before = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(current_phase(&info, before), None);
        let after = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(current_phase(&info, after), None);
    }

    #[test]
    fn date_range_extends_to_the_last_transit() {
        let now = Utc.with_ymd_and_hms(2025, 4, 22, 12, 0, 0).unwrap();
        let window = phase_window(&april_2025(), now);
        let transit = MoonTransit {
            date: Utc.with_ymd_and_hms(2025, 5, 20, 8, 28, 0).unwrap(),
            sign: Sign::Aquarius,
            void_start: None,
            hellenistic: false,
        };
        let (start, end) = date_range(&window, &[transit]).unwrap();
        assert_eq!(start, window[0].date);
        assert_eq!(end, transit.date);

        let (_, end) = date_range(&window, &[]).unwrap();
        assert_eq!(end, window[3].date);
    }

    #[test]
    fn intermediates_follow_their_major_phase() {
        assert_eq!(
            MoonPhase::NewMoon.following_intermediate(),
            MoonPhase::WaxingCrescent
        );
        assert_eq!(
            MoonPhase::WaningCrescent.following_intermediate(),
            MoonPhase::NewMoon
        );
    }
}
