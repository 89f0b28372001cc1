//! Planetary hour schedules.
//!
//! Each day splits into twelve unequal day hours (sunrise to sunset) and
//! twelve night hours (sunset to the next sunrise). Rulers cycle through
//! the Chaldean order starting from the ruler of the day, which follows
//! from the weekday. Hours gain modifier badges for retrogrades in effect
//! and for same-day sign ingresses of the day ruler while it is retrograde.

use crate::config::Margins;
use crate::palette::{lighten, ColorPalette, Shades};
use crate::tooltip::{place_tooltip, OpenTooltip, TooltipSession, OVERLAP_FRACTION, TOOLTIP_SIZE};
use crate::transit::{RetrogradeSpec, TransitEvent};
use crate::zodiac::{Planet, Sign};
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use eframe::egui::{self, vec2, Align2, Color32, FontId, Pos2, Sense, Stroke};

pub const CHALDEAN_ORDER: [Planet; 7] = [
    Planet::Saturn,
    Planet::Jupiter,
    Planet::Mars,
    Planet::Sun,
    Planet::Venus,
    Planet::Mercury,
    Planet::Moon,
];

pub fn day_ruler(weekday: Weekday) -> Planet {
    match weekday {
        Weekday::Sun => Planet::Sun,
        Weekday::Mon => Planet::Moon,
        Weekday::Tue => Planet::Mars,
        Weekday::Wed => Planet::Mercury,
        Weekday::Thu => Planet::Jupiter,
        Weekday::Fri => Planet::Venus,
        Weekday::Sat => Planet::Saturn,
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Modifier {
    Retrograde { planet: Planet, date: DateTime<Utc> },
    Transit { sign: Sign, date: DateTime<Utc> },
}

#[derive(Clone, Debug)]
pub struct PlanetaryHour {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub planet: Planet,
    pub modifiers: Vec<Modifier>,
}

/// Sunrise and sunset bracketing the schedule day. These come from the
/// widget data; no ephemeris is computed here.
#[derive(Clone, Copy, Debug)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub next_sunrise: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct HoursSchedule {
    pub weekday: Weekday,
    pub day_ruler: Planet,
    pub hour_ruler: Option<Planet>,
    pub current_time: DateTime<Utc>,
    pub day_hour_minutes: f64,
    pub night_hour_minutes: f64,
    pub day_hours: Vec<PlanetaryHour>,
    pub night_hours: Vec<PlanetaryHour>,
}

pub fn build_schedule(
    date: DateTime<Utc>,
    sun: &SunTimes,
    retrogrades: &[RetrogradeSpec],
    transits: &[TransitEvent],
) -> HoursSchedule {
    let weekday = date.weekday();
    let ruler = day_ruler(weekday);

    let day_minutes = (sun.sunset - sun.sunrise).num_milliseconds() as f64 / 60_000.0;
    let night_minutes = (sun.next_sunrise - sun.sunset).num_milliseconds() as f64 / 60_000.0;
    let day_hour_minutes = day_minutes / 12.0;
    let night_hour_minutes = night_minutes / 12.0;

    let mut order_index = CHALDEAN_ORDER
        .iter()
        .position(|p| *p == ruler)
        .unwrap_or(0);

    let mut build_half = |anchor: DateTime<Utc>, hour_minutes: f64| -> Vec<PlanetaryHour> {
        (0..12)
            .map(|i| {
                let start =
                    anchor + Duration::milliseconds((i as f64 * hour_minutes * 60_000.0) as i64);
                let end = anchor
                    + Duration::milliseconds(((i + 1) as f64 * hour_minutes * 60_000.0) as i64);
                let planet = CHALDEAN_ORDER[order_index % 7];
                order_index += 1;
                PlanetaryHour {
                    start,
                    end,
                    planet,
                    modifiers: modifiers_for(start, ruler, retrogrades, transits),
                }
            })
            .collect()
    };

    let day_hours = build_half(sun.sunrise, day_hour_minutes);
    let night_hours = build_half(sun.sunset, night_hour_minutes);

    let hour_ruler = day_hours
        .iter()
        .chain(night_hours.iter())
        .find(|h| date >= h.start && date < h.end)
        .map(|h| h.planet);
    if hour_ruler.is_none() {
        log::debug!("{} falls outside the day and night hours", date);
    }

    HoursSchedule {
        weekday,
        day_ruler: ruler,
        hour_ruler,
        current_time: date,
        day_hour_minutes,
        night_hour_minutes,
        day_hours,
        night_hours,
    }
}

fn modifiers_for(
    hour_start: DateTime<Utc>,
    day_ruler: Planet,
    retrogrades: &[RetrogradeSpec],
    transits: &[TransitEvent],
) -> Vec<Modifier> {
    let mut modifiers = Vec::new();

    for spec in retrogrades {
        if hour_start >= spec.window.retro_start && hour_start <= spec.window.retro_end {
            modifiers.push(Modifier::Retrograde {
                planet: spec.planet,
                date: hour_start,
            });
        }
    }

    let ruler_retrograde = retrogrades.iter().any(|r| r.planet == day_ruler);
    for transit in transits {
        if transit.date.date_naive() == hour_start.date_naive() && ruler_retrograde {
            modifiers.push(Modifier::Transit {
                sign: transit.sign,
                date: transit.date,
            });
        }
    }

    modifiers
}

/// "H:MM hrs" rendering of an hour length given in minutes.
pub fn format_hour_length(minutes: f64) -> String {
    let hours = (minutes / 60.0).floor() as i64;
    let mins = (minutes % 60.0).round() as i64;
    format!("{}:{:02} hrs", hours, mins)
}

const BALL_RADIUS: f32 = 10.0;

pub struct PlanetaryHoursWidget {
    pub schedule: HoursSchedule,
    tooltips: TooltipSession,
}

impl PlanetaryHoursWidget {
    pub fn new(schedule: HoursSchedule) -> Self {
        Self {
            schedule,
            tooltips: TooltipSession::default(),
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, palette: &ColorPalette) {
        let bounds = ui.max_rect();
        let highlight = Color32::from_rgb(0xe0, 0xc0, 0x30);

        let hour_ruler = match self.schedule.hour_ruler {
            Some(planet) => format!("{} {}", planet.glyph(), planet.label()),
            None => "outside day and night hours".to_string(),
        };
        ui.label(format!(
            "Ruler of the Day: {} {}",
            self.schedule.day_ruler.glyph(),
            self.schedule.day_ruler.label()
        ));
        ui.label(format!("Ruler of the Hour: {}", hour_ruler));
        ui.label(format!(
            "Day hours {}, night hours {}",
            format_hour_length(self.schedule.day_hour_minutes),
            format_hour_length(self.schedule.night_hour_minutes)
        ));
        ui.add_space(6.0);

        let mut hovered: Option<(Pos2, Vec<String>)> = None;
        let current_time = self.schedule.current_time;
        let halves = [
            ("Day", self.schedule.day_hours.clone()),
            ("Night", self.schedule.night_hours.clone()),
        ];
        for (title, hours) in halves {
            ui.strong(title);
            egui::Grid::new(title).striped(true).min_col_width(60.0).show(ui, |ui| {
                ui.strong("Hour");
                ui.strong("Start - End");
                ui.strong("Ruler of Hour");
                ui.strong("Modifiers");
                ui.end_row();

                for (index, hour) in hours.iter().enumerate() {
                    let current = current_time >= hour.start && current_time < hour.end;
                    let color = if current {
                        highlight
                    } else {
                        ui.visuals().text_color()
                    };
                    ui.colored_label(color, (index + 1).to_string());
                    ui.colored_label(
                        color,
                        format!(
                            "{} - {}",
                            hour.start.format("%H:%M"),
                            hour.end.format("%H:%M")
                        ),
                    );
                    ui.colored_label(
                        color,
                        format!("{} {}", hour.planet.glyph(), hour.planet.label()),
                    );
                    ui.horizontal(|ui| {
                        for modifier in &hour.modifiers {
                            let (shades, glyph, lines) = modifier_appearance(modifier, palette);
                            if let Some(center) = draw_ball(ui, shades, glyph) {
                                hovered = Some((center, lines));
                            }
                        }
                    });
                    ui.end_row();
                }
            });
            ui.add_space(8.0);
        }

        self.run_tooltips(ui, bounds, hovered);
    }

    fn run_tooltips(
        &mut self,
        ui: &egui::Ui,
        bounds: egui::Rect,
        hovered: Option<(Pos2, Vec<String>)>,
    ) {
        if let Some((center, lines)) = hovered {
            let already_open = self
                .tooltips
                .current()
                .is_some_and(|t| t.anchor == center);
            if !already_open {
                let (pos, placement) = place_tooltip(
                    center,
                    BALL_RADIUS,
                    TOOLTIP_SIZE,
                    bounds,
                    Margins::uniform(2.0),
                    OVERLAP_FRACTION,
                );
                self.tooltips.open(OpenTooltip {
                    anchor: center,
                    anchor_radius: BALL_RADIUS,
                    pos,
                    placement,
                    lines,
                });
            }
        }

        let pointer = ui.input(|i| i.pointer.hover_pos());
        let over_anchor = match (self.tooltips.current(), pointer) {
            (Some(open), Some(pos)) => open.anchor.distance(pos) <= open.anchor_radius,
            _ => false,
        };
        let over_tooltip = match (self.tooltips.current(), pointer) {
            (Some(open), Some(pos)) => open.rect().contains(pos),
            _ => false,
        };
        let now = ui.input(|i| i.time);
        if let Some(deadline) = self.tooltips.update(over_anchor, over_tooltip, now) {
            ui.ctx()
                .request_repaint_after(std::time::Duration::from_secs_f64(
                    (deadline - now).max(0.0),
                ));
        }
        let painter = ui
            .ctx()
            .layer_painter(egui::LayerId::new(egui::Order::Tooltip, ui.id().with("hours")));
        self.tooltips.draw(&painter);
    }
}

fn modifier_appearance(
    modifier: &Modifier,
    palette: &ColorPalette,
) -> (Shades, &'static str, Vec<String>) {
    match modifier {
        Modifier::Retrograde { planet, date } => (
            palette.planet(*planet),
            planet.glyph(),
            vec![
                format!("{} Retrograde", planet.label()),
                date.format("%b %d %Y").to_string(),
            ],
        ),
        // Ingress badges color by the entered sign's triplicity so they
        // read apart from the sign-colored balls in the void list.
        Modifier::Transit { sign, date } => (
            palette.element(sign.element()),
            sign.glyph(),
            vec![
                format!("Enters {}", sign.label()),
                date.format("%b %d %Y %H:%M").to_string(),
            ],
        ),
    }
}

/// A 20 px modifier ball with a lightened core standing in for a radial
/// gradient. Returns the center when hovered.
pub(crate) fn draw_ball(ui: &mut egui::Ui, shades: Shades, glyph: &str) -> Option<Pos2> {
    let (response, painter) =
        ui.allocate_painter(vec2(BALL_RADIUS * 2.0, BALL_RADIUS * 2.0), Sense::hover());
    let center = response.rect.center();
    painter.circle_filled(center, BALL_RADIUS, shades.average);
    painter.circle_filled(center, BALL_RADIUS * 0.6, lighten(shades.average, 50.0));
    painter.circle_stroke(center, BALL_RADIUS, Stroke::new(1.0, shades.darkest));
    painter.text(
        center,
        Align2::CENTER_CENTER,
        glyph,
        FontId::proportional(10.0),
        Color32::WHITE,
    );
    response.hovered().then_some(center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transit::RetrogradeWindow;
    use crate::zodiac::{parse_degree, Element};
    use chrono::TimeZone;

    fn sun_times() -> SunTimes {
        SunTimes {
            sunrise: Utc.with_ymd_and_hms(2025, 4, 22, 5, 49, 0).unwrap(),
            sunset: Utc.with_ymd_and_hms(2025, 4, 22, 18, 58, 0).unwrap(),
            next_sunrise: Utc.with_ymd_and_hms(2025, 4, 23, 5, 48, 0).unwrap(),
        }
    }

    fn mars_retrograde() -> RetrogradeSpec {
        RetrogradeSpec {
            planet: Planet::Mars,
            window: RetrogradeWindow {
                shadow_start: Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
                retro_start: Utc.with_ymd_and_hms(2025, 4, 10, 0, 0, 0).unwrap(),
                retro_end: Utc.with_ymd_and_hms(2025, 5, 10, 0, 0, 0).unwrap(),
                shadow_end: Utc.with_ymd_and_hms(2025, 5, 20, 0, 0, 0).unwrap(),
            },
            start_degree: parse_degree("9° Aries 35'").unwrap(),
            end_degree: parse_degree("26° Pisces 49'").unwrap(),
        }
    }

    #[test]
    fn day_rulers_follow_the_weekday() {
        assert_eq!(day_ruler(Weekday::Sun), Planet::Sun);
        assert_eq!(day_ruler(Weekday::Tue), Planet::Mars);
        assert_eq!(day_ruler(Weekday::Sat), Planet::Saturn);
    }

    #[test]
    fn rulers_cycle_through_the_chaldean_order() {
        // 2025-04-22 is a Tuesday: Mars day.
        let date = Utc.with_ymd_and_hms(2025, 4, 22, 12, 0, 0).unwrap();
        let schedule = build_schedule(date, &sun_times(), &[], &[]);
        assert_eq!(schedule.day_ruler, Planet::Mars);
        assert_eq!(schedule.day_hours.len(), 12);
        assert_eq!(schedule.night_hours.len(), 12);
        assert_eq!(schedule.day_hours[0].planet, Planet::Mars);
        assert_eq!(schedule.day_hours[1].planet, Planet::Sun);
        // Hour 13 wraps back to the top of the order.
        assert_eq!(schedule.night_hours[0].planet, Planet::Saturn);
    }

    #[test]
    fn hour_lengths_are_unequal() {
        let date = Utc.with_ymd_and_hms(2025, 4, 22, 12, 0, 0).unwrap();
        let schedule = build_schedule(date, &sun_times(), &[], &[]);
        assert!((schedule.day_hour_minutes - 789.0 / 12.0).abs() < 1e-9);
        assert!((schedule.night_hour_minutes - 650.0 / 12.0).abs() < 1e-9);
        assert!(schedule.day_hour_minutes > schedule.night_hour_minutes);
    }

    #[test]
    fn hour_ruler_matches_the_containing_hour() {
        let date = Utc.with_ymd_and_hms(2025, 4, 22, 12, 0, 0).unwrap();
        let schedule = build_schedule(date, &sun_times(), &[], &[]);
        // Noon is 371 minutes past sunrise: the sixth day hour, Saturn.
        assert_eq!(schedule.hour_ruler, Some(Planet::Saturn));

        let before_dawn = Utc.with_ymd_and_hms(2025, 4, 22, 4, 0, 0).unwrap();
        let schedule = build_schedule(before_dawn, &sun_times(), &[], &[]);
        assert_eq!(schedule.hour_ruler, None);
    }

    #[test]
    fn hours_in_a_retrograde_window_get_the_badge() {
        let date = Utc.with_ymd_and_hms(2025, 4, 22, 12, 0, 0).unwrap();
        let schedule = build_schedule(date, &sun_times(), &[mars_retrograde()], &[]);
        assert!(schedule.day_hours.iter().all(|h| h
            .modifiers
            .iter()
            .any(|m| matches!(m, Modifier::Retrograde { planet: Planet::Mars, .. }))));
    }

    #[test]
    fn transit_badges_require_the_day_ruler_to_be_retrograde() {
        let date = Utc.with_ymd_and_hms(2025, 4, 22, 12, 0, 0).unwrap();
        let transit = TransitEvent {
            date: Utc.with_ymd_and_hms(2025, 4, 22, 9, 0, 0).unwrap(),
            sign: Sign::Taurus,
        };

        // Tuesday with Mars retrograde: badge applies.
        let schedule = build_schedule(date, &sun_times(), &[mars_retrograde()], &[transit]);
        assert!(schedule.day_hours[0]
            .modifiers
            .iter()
            .any(|m| matches!(m, Modifier::Transit { sign: Sign::Taurus, .. })));

        // No retrogrades at all: no transit badge.
        let schedule = build_schedule(date, &sun_times(), &[], &[transit]);
        assert!(schedule.day_hours[0]
            .modifiers
            .iter()
            .all(|m| !matches!(m, Modifier::Transit { .. })));
    }

    #[test]
    fn ingress_badges_take_the_element_shades() {
        let palette = ColorPalette::default();
        let modifier = Modifier::Transit {
            sign: Sign::Pisces,
            date: Utc.with_ymd_and_hms(2025, 4, 16, 8, 24, 0).unwrap(),
        };
        let (shades, glyph, _) = modifier_appearance(&modifier, &palette);
        assert_eq!(shades, palette.element(Element::Water));
        assert_eq!(glyph, Sign::Pisces.glyph());
    }

    #[test]
    fn hour_length_formatting() {
        assert_eq!(format_hour_length(65.75), "1:06 hrs");
        assert_eq!(format_hour_length(54.166_667), "0:54 hrs");
    }
}
