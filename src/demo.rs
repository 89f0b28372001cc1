//! Demo dataset: the Mercury retrograde of spring 2025 with the matching
//! lunar, planetary-hour, and void-of-course data. The app ships with this
//! so every tab has something to show without an ephemeris source.

use crate::config::parse_date_or_now;
use crate::graph::{GraphItem, GraphRange, RetroToggle};
use crate::hours::SunTimes;
use crate::phases::{MoonInfo, MoonTransit};
use crate::transit::{compile_transits, RetrogradeSpec, RetrogradeWindow, TransitEvent};
use crate::voids::VoidOfCourse;
use crate::zodiac::{parse_degree, Planet, Sign, ZodiacDegree};
use chrono::{DateTime, Utc};

pub struct DemoData {
    pub current_date: DateTime<Utc>,
    pub mercury: RetrogradeSpec,
    pub mercury_transits: Vec<TransitEvent>,
    pub retrogrades: Vec<RetrogradeSpec>,
    pub moon_info: MoonInfo,
    pub moon_transits: Vec<MoonTransit>,
    pub sun: SunTimes,
    pub voids: Vec<VoidOfCourse>,
    pub graph_range: GraphRange,
    pub graph_items: Vec<GraphItem>,
}

fn date(text: &str) -> DateTime<Utc> {
    parse_date_or_now(text)
}

fn degree(text: &str) -> ZodiacDegree {
    parse_degree(text).unwrap_or(ZodiacDegree {
        degree: 0.0,
        sign: Sign::Aries,
    })
}

pub fn demo_data() -> DemoData {
    let current_date = date("2025-04-22T12:00:00Z");

    let mercury = RetrogradeSpec {
        planet: Planet::Mercury,
        window: RetrogradeWindow {
            shadow_start: date("2025-02-26T00:00:00Z"),
            retro_start: date("2025-03-15T06:46:00Z"),
            retro_end: date("2025-04-07T11:08:00Z"),
            shadow_end: date("2025-04-26T00:00:00Z"),
        },
        start_degree: degree("9° Aries 35'"),
        end_degree: degree("26° Pisces 49'"),
    };
    let mercury_transits = compile_transits(&mercury, &[]);

    let venus = RetrogradeSpec {
        planet: Planet::Venus,
        window: RetrogradeWindow {
            shadow_start: date("2025-01-28T00:00:00Z"),
            retro_start: date("2025-03-01T19:36:00Z"),
            retro_end: date("2025-04-13T01:02:00Z"),
            shadow_end: date("2025-05-16T00:00:00Z"),
        },
        start_degree: degree("10° Aries 50'"),
        end_degree: degree("24° Pisces 37'"),
    };

    let moon_info = MoonInfo {
        previous_new_moon: Some(date("2025-03-29T10:58:00Z")),
        previous_first_quarter: Some(date("2025-04-04T02:15:00Z")),
        previous_full_moon: Some(date("2025-04-13T00:22:00Z")),
        previous_third_quarter: Some(date("2025-04-21T01:36:00Z")),
        next_new_moon: Some(date("2025-04-27T19:31:00Z")),
        next_first_quarter: Some(date("2025-05-04T13:52:00Z")),
        next_full_moon: Some(date("2025-05-12T16:56:00Z")),
        next_third_quarter: Some(date("2025-05-20T11:59:00Z")),
    };

    let voids = vec![
        VoidOfCourse {
            start: date("2025-04-20T17:21:00Z"),
            end: date("2025-04-21T03:11:00Z"),
            sign_before: Sign::Capricorn,
            sign_after: Sign::Aquarius,
        },
        VoidOfCourse {
            start: date("2025-04-23T02:21:00Z"),
            end: date("2025-04-23T09:07:00Z"),
            sign_before: Sign::Aquarius,
            sign_after: Sign::Pisces,
        },
        VoidOfCourse {
            start: date("2025-04-25T12:24:00Z"),
            end: date("2025-04-25T14:55:00Z"),
            sign_before: Sign::Pisces,
            sign_after: Sign::Aries,
        },
        VoidOfCourse {
            start: date("2025-04-27T15:18:00Z"),
            end: date("2025-04-27T22:17:00Z"),
            sign_before: Sign::Aries,
            sign_after: Sign::Taurus,
        },
    ];

    let moon_transits: Vec<MoonTransit> = voids
        .iter()
        .map(|v| MoonTransit {
            date: v.end,
            sign: v.sign_after,
            void_start: Some(v.start),
            hellenistic: false,
        })
        .chain(std::iter::once(MoonTransit {
            date: date("2025-04-30T04:09:00Z"),
            sign: Sign::Gemini,
            void_start: None,
            hellenistic: true,
        }))
        .collect();

    let sun = SunTimes {
        sunrise: date("2025-04-22T05:49:00Z"),
        sunset: date("2025-04-22T18:58:00Z"),
        next_sunrise: date("2025-04-23T05:48:00Z"),
    };

    let graph_range = GraphRange {
        start: date("2025-02-15T00:00:00Z"),
        end: date("2025-05-15T00:00:00Z"),
    };
    let graph_items = vec![
        GraphItem {
            planet: Some(Planet::Mercury),
            text: "Mercury".to_string(),
            retrogrades: vec![
                RetroToggle {
                    date: mercury.window.shadow_start,
                    retrograde: false,
                    sign: Some(Sign::Pisces),
                },
                RetroToggle {
                    date: mercury.window.retro_start,
                    retrograde: true,
                    sign: Some(Sign::Aries),
                },
                RetroToggle {
                    date: mercury.window.retro_end,
                    retrograde: false,
                    sign: Some(Sign::Pisces),
                },
            ],
            transits: mercury_transits.clone(),
        },
        GraphItem {
            planet: Some(Planet::Venus),
            text: "Venus".to_string(),
            retrogrades: vec![
                RetroToggle {
                    date: venus.window.shadow_start,
                    retrograde: false,
                    sign: Some(Sign::Pisces),
                },
                RetroToggle {
                    date: venus.window.retro_start,
                    retrograde: true,
                    sign: Some(Sign::Aries),
                },
                RetroToggle {
                    date: venus.window.retro_end,
                    retrograde: false,
                    sign: Some(Sign::Pisces),
                },
            ],
            transits: Vec::new(),
        },
        GraphItem {
            planet: Some(Planet::Moon),
            text: "Moon".to_string(),
            // Waning stretches read as retrograde toggles on the moon row.
            retrogrades: vec![
                RetroToggle {
                    date: date("2025-03-29T10:58:00Z"),
                    retrograde: false,
                    sign: None,
                },
                RetroToggle {
                    date: date("2025-04-13T00:22:00Z"),
                    retrograde: true,
                    sign: None,
                },
                RetroToggle {
                    date: date("2025-04-27T19:31:00Z"),
                    retrograde: false,
                    sign: None,
                },
                RetroToggle {
                    date: date("2025-05-12T16:56:00Z"),
                    retrograde: true,
                    sign: None,
                },
            ],
            transits: moon_transits
                .iter()
                .map(|t| TransitEvent {
                    date: t.date,
                    sign: t.sign,
                })
                .collect(),
        },
    ];

    DemoData {
        current_date,
        mercury,
        mercury_transits,
        retrogrades: vec![mercury, venus],
        moon_info,
        moon_transits,
        sun,
        voids,
        graph_range,
        graph_items,
    }
}
