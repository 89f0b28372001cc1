//! Void-of-course period list.
//!
//! A void-of-course period runs from the moon's last major aspect in a sign
//! to its ingress into the next. The list widget shows the periods starting
//! within a configurable number of days and highlights the one in effect
//! now, or failing that the most recently ended one.

use crate::config::Margins;
use crate::hours::draw_ball;
use crate::palette::{lighten, ColorPalette, Shades};
use crate::tooltip::{place_tooltip, OpenTooltip, TooltipSession, OVERLAP_FRACTION, TOOLTIP_SIZE};
use crate::zodiac::{Planet, Sign};
use chrono::{DateTime, Duration, Utc};
use eframe::egui::{self, Pos2, RichText};

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct VoidOfCourse {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub sign_before: Sign,
    pub sign_after: Sign,
}

/// Periods whose start falls within `duration_days` of `from`, inclusive
/// on both ends.
pub fn visible_voids(
    voids: &[VoidOfCourse],
    from: DateTime<Utc>,
    duration_days: i64,
) -> Vec<VoidOfCourse> {
    let until = from + Duration::days(duration_days);
    voids
        .iter()
        .copied()
        .filter(|v| v.start >= from && v.start <= until)
        .collect()
}

/// Index of the period to highlight: one containing `now` wins, otherwise
/// the one that ended most recently. `None` when every period is in the
/// future.
pub fn highlight_index(voids: &[VoidOfCourse], now: DateTime<Utc>) -> Option<usize> {
    let mut most_recent: Option<(usize, DateTime<Utc>)> = None;
    for (index, v) in voids.iter().enumerate() {
        if v.start <= now && now <= v.end {
            return Some(index);
        }
        if v.end < now && most_recent.is_none_or(|(_, end)| v.end > end) {
            most_recent = Some((index, v.end));
        }
    }
    most_recent.map(|(index, _)| index)
}

/// Tooltip state line for one of the period's two sign markers. The marker
/// for the entered sign carries the ingress date; the one for the departed
/// sign carries the void start.
pub fn transition_state(
    v: &VoidOfCourse,
    marker_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> &'static str {
    if marker_date > now {
        "Future Transit"
    } else if v.start <= now && now <= v.end {
        "Void of Course"
    } else {
        "In Transit"
    }
}

pub struct VoidOfCourseList {
    pub voids: Vec<VoidOfCourse>,
    pub from: DateTime<Utc>,
    pub duration_days: i64,
    tooltips: TooltipSession,
}

impl VoidOfCourseList {
    pub fn new(voids: Vec<VoidOfCourse>, from: DateTime<Utc>, duration_days: i64) -> Self {
        Self {
            voids,
            from,
            duration_days,
            tooltips: TooltipSession::default(),
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, palette: &ColorPalette, now: DateTime<Utc>) {
        let bounds = ui.max_rect();
        let moon = palette.planet(Planet::Moon);
        ui.label(
            RichText::new("Void of Course Moon")
                .size(16.0)
                .color(moon.average),
        );
        ui.add_space(6.0);

        let visible = visible_voids(&self.voids, self.from, self.duration_days);
        let highlight = highlight_index(&visible, now);
        let highlight_color = eframe::egui::Color32::from_rgb(0xe0, 0xc0, 0x30);
        let mut hovered: Option<(Pos2, f32, Vec<String>)> = None;

        egui::Grid::new("voids").striped(true).min_col_width(120.0).show(ui, |ui| {
            ui.strong("Start - End");
            ui.strong("Transition");
            ui.end_row();

            for (index, void) in visible.iter().enumerate() {
                let highlighted = highlight == Some(index);
                let color = if highlighted {
                    highlight_color
                } else {
                    ui.visuals().text_color()
                };
                ui.colored_label(
                    color,
                    format!(
                        "{} - {}",
                        void.start.format("%b %d %H:%M"),
                        void.end.format("%b %d %H:%M")
                    ),
                );
                ui.horizontal(|ui| {
                    let before = palette.sign(void.sign_before);
                    if let Some(center) = draw_ball(ui, before, void.sign_before.glyph()) {
                        hovered = Some((
                            center,
                            10.0,
                            marker_lines(void, void.sign_before, void.start, now),
                        ));
                    }
                    ui.colored_label(color, " --> ");
                    let mut after = palette.sign(void.sign_after);
                    // The most recently completed transition glows.
                    if highlighted && void.end < now {
                        after = Shades {
                            average: lighten(after.lightest, 20.0),
                            ..after
                        };
                    }
                    if let Some(center) = draw_ball(ui, after, void.sign_after.glyph()) {
                        hovered = Some((
                            center,
                            10.0,
                            marker_lines(void, void.sign_after, void.end, now),
                        ));
                    }
                });
                ui.end_row();
            }
        });

        self.run_tooltips(ui, bounds, hovered);
    }

    fn run_tooltips(
        &mut self,
        ui: &egui::Ui,
        bounds: egui::Rect,
        hovered: Option<(Pos2, f32, Vec<String>)>,
    ) {
        if let Some((center, radius, lines)) = hovered {
            let already_open = self
                .tooltips
                .current()
                .is_some_and(|t| t.anchor == center);
            if !already_open {
                let (pos, placement) = place_tooltip(
                    center,
                    radius,
                    TOOLTIP_SIZE,
                    bounds,
                    Margins::uniform(2.0),
                    OVERLAP_FRACTION,
                );
                self.tooltips.open(OpenTooltip {
                    anchor: center,
                    anchor_radius: radius,
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
        let time = ui.input(|i| i.time);
        if let Some(deadline) = self.tooltips.update(over_anchor, over_tooltip, time) {
            ui.ctx()
                .request_repaint_after(std::time::Duration::from_secs_f64(
                    (deadline - time).max(0.0),
                ));
        }
        let painter = ui
            .ctx()
            .layer_painter(egui::LayerId::new(egui::Order::Tooltip, ui.id().with("voids")));
        self.tooltips.draw(&painter);
    }
}

fn marker_lines(
    void: &VoidOfCourse,
    sign: Sign,
    marker_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<String> {
    vec![
        format!("{} {}", sign.glyph(), sign.label()),
        transition_state(void, marker_date, now).to_string(),
        marker_date.format("%b %d %Y %H:%M").to_string(),
    ]
}
