//! Lunar phases widget.
//!
//! A strip of major phase blocks with intermediate glyphs at the temporal
//! midpoints, lunar ingress and void-of-course markers on a shared linear
//! time scale, a six-hour ruler underneath, and a tracker line that follows
//! the pointer. Marker tooltips overlap their marker by 40% of its radius,
//! less than the default so the small markers stay visible.

use crate::config::Margins;
use crate::palette::{lighten, ColorPalette};
use crate::phases::{current_phase, date_range, phase_window, MoonInfo, MoonTransit, PhaseEvent};
use crate::ruler::{six_hour_ticks, TickKind};
use crate::timeline::LinearTimeMapper;
use crate::tooltip::{place_tooltip, OpenTooltip, TooltipSession, TOOLTIP_SIZE};
use crate::zodiac::Planet;
use chrono::{DateTime, Utc};
use eframe::egui::{self, pos2, vec2, Align2, Color32, FontId, Pos2, Sense, Stroke};

/// Width reserved per phase block; the first and last block centers sit
/// half a block inside the timeline edges.
pub const BLOCK_WIDTH: f32 = 80.0;

pub const TRANSIT_MARKER_RADIUS: f32 = 12.0;
pub const VOID_MARKER_RADIUS: f32 = 8.0;

/// Hellenistic ingresses draw above the standard marker row.
pub const HELLENISTIC_OFFSET: f32 = -28.0;

/// Lunar tooltips overlap their marker less than the default.
pub const LUNAR_OVERLAP_FRACTION: f32 = 0.4;

/// Labels may poke this far past the ruler ends before they are culled.
const LABEL_SLACK: f32 = 5.0;

const WIDGET_HEIGHT: f32 = 260.0;

pub struct LunarPhasesWidget {
    pub info: MoonInfo,
    pub transits: Vec<MoonTransit>,
    pub margin: Margins,
    tooltips: TooltipSession,
}

struct Marker {
    center: Pos2,
    radius: f32,
    lines: Vec<String>,
    fill: Color32,
}

impl LunarPhasesWidget {
    pub fn new(info: MoonInfo, transits: Vec<MoonTransit>) -> Self {
        Self {
            info,
            transits,
            margin: Margins::default(),
            tooltips: TooltipSession::default(),
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, palette: &ColorPalette, now: DateTime<Utc>) {
        let width = ui.available_width().max(600.0);
        let (response, painter) =
            ui.allocate_painter(vec2(width, WIDGET_HEIGHT), Sense::hover());
        let rect = response.rect;
        let painter = painter.with_clip_rect(rect);
        let text_color = ui.visuals().text_color();

        let window = phase_window(&self.info, now);
        let Some((start, end)) = date_range(&window, &self.transits) else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No lunar data for this date",
                FontId::proportional(14.0),
                ui.visuals().weak_text_color(),
            );
            return;
        };

        let timeline_left = rect.left() + self.margin.left;
        let timeline_right = rect.right() - self.margin.right;
        let mapper = LinearTimeMapper::new(
            start,
            end,
            (timeline_left + BLOCK_WIDTH / 2.0) as f64,
            (timeline_right - BLOCK_WIDTH / 2.0) as f64,
            timeline_left as f64,
            timeline_right as f64,
        );

        self.draw_header(&painter, pos2(timeline_left, rect.top() + 8.0), now, text_color);

        let blocks_y = rect.top() + self.margin.top + 36.0;
        self.draw_phase_blocks(&painter, &window, &mapper, blocks_y, text_color);

        let ruler_y = rect.bottom() - self.margin.bottom - 24.0;
        let markers_y = ruler_y - 42.0;
        let markers = self.build_markers(&mapper, markers_y, start, end, now, palette);
        for marker in &markers {
            painter.circle_filled(marker.center, marker.radius, marker.fill);
            painter.circle_stroke(
                marker.center,
                marker.radius,
                Stroke::new(1.0, Color32::from_gray(30)),
            );
        }
        for (marker, transit) in markers.iter().zip(self.marker_transits(start, end)) {
            if let Some(sign) = transit {
                painter.text(
                    marker.center,
                    Align2::CENTER_CENTER,
                    sign.glyph(),
                    FontId::proportional(marker.radius),
                    Color32::WHITE,
                );
            }
        }

        self.draw_ruler(&painter, &mapper, ruler_y, text_color);

        // Current date line across the marker and ruler rows.
        let now_x = mapper.date_to_x(now) as f32;
        painter.line_segment(
            [pos2(now_x, blocks_y + 30.0), pos2(now_x, ruler_y + 16.0)],
            Stroke::new(2.0, Color32::from_rgb(0xe0, 0xc0, 0x30)),
        );

        // Tracker line under the pointer, with the date it maps back to.
        if let Some(pos) = response.hover_pos() {
            let x = pos
                .x
                .clamp(timeline_left, rect.right() - self.margin.right - 2.0);
            painter.line_segment(
                [pos2(x, blocks_y + 30.0), pos2(x, ruler_y + 16.0)],
                Stroke::new(1.0, Color32::from_gray(140)),
            );
            let date = mapper.x_to_date(x as f64);
            painter.text(
                pos2(x, ruler_y + 18.0),
                Align2::CENTER_TOP,
                date.format("%b %d %H:%M").to_string(),
                FontId::proportional(10.0),
                ui.visuals().weak_text_color(),
            );
        }

        self.run_tooltips(ui, &painter, &response, &markers);
    }

    fn draw_header(
        &self,
        painter: &egui::Painter,
        pos: Pos2,
        now: DateTime<Utc>,
        text_color: Color32,
    ) {
        let phase = match current_phase(&self.info, now) {
            Some(phase) => format!("{} {}", phase.glyph(), phase.label()),
            None => "Unknown phase".to_string(),
        };
        let header = format!("{}  {}", now.format("%b %d %Y %H:%M"), phase);
        painter.text(
            pos,
            Align2::LEFT_TOP,
            header,
            FontId::proportional(16.0),
            text_color,
        );
    }

    fn draw_phase_blocks(
        &self,
        painter: &egui::Painter,
        window: &[PhaseEvent],
        mapper: &LinearTimeMapper,
        blocks_y: f32,
        text_color: Color32,
    ) {
        for event in window {
            let x = mapper.date_to_x(event.date) as f32;
            painter.text(
                pos2(x, blocks_y),
                Align2::CENTER_CENTER,
                event.phase.glyph(),
                FontId::proportional(28.0),
                text_color,
            );
            painter.text(
                pos2(x, blocks_y + 22.0),
                Align2::CENTER_TOP,
                event.phase.label(),
                FontId::proportional(11.0),
                text_color,
            );
            painter.text(
                pos2(x, blocks_y + 36.0),
                Align2::CENTER_TOP,
                event.date.format("%b %d %H:%M").to_string(),
                FontId::proportional(10.0),
                Color32::from_gray(160),
            );
            if let Some(name) = event.full_moon_name {
                painter.text(
                    pos2(x, blocks_y + 50.0),
                    Align2::CENTER_TOP,
                    name,
                    FontId::proportional(10.0),
                    Color32::from_gray(160),
                );
            }
        }

        // Intermediate phases at the temporal midpoint of each block pair.
        for pair in window.windows(2) {
            let mid = pair[0].date + (pair[1].date - pair[0].date) / 2;
            let x = mapper.date_to_x(mid) as f32;
            painter.text(
                pos2(x, blocks_y),
                Align2::CENTER_CENTER,
                pair[0].phase.following_intermediate().glyph(),
                FontId::proportional(16.0),
                Color32::from_gray(170),
            );
        }
    }

    /// Sign of each marker in `build_markers` order, for glyph overlays.
    /// Void markers yield `None`.
    fn marker_transits(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Option<crate::zodiac::Sign>> {
        let mut signs = Vec::new();
        for transit in &self.transits {
            if transit.date < start || transit.date > end {
                continue;
            }
            signs.push(Some(transit.sign));
            if let Some(void_start) = transit.void_start {
                if void_start >= start && void_start <= end {
                    signs.push(None);
                }
            }
        }
        signs
    }

    fn build_markers(
        &self,
        mapper: &LinearTimeMapper,
        markers_y: f32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
        palette: &ColorPalette,
    ) -> Vec<Marker> {
        let moon = palette.planet(Planet::Moon);

        // The most recent marker on or before now draws brighter.
        let highlight_date = self
            .transits
            .iter()
            .flat_map(|t| [Some(t.date), t.void_start].into_iter().flatten())
            .filter(|d| *d <= now)
            .max();

        let mut markers = Vec::new();
        for transit in &self.transits {
            if transit.date < start || transit.date > end {
                continue;
            }
            let x = mapper.date_to_x(transit.date) as f32;
            let y = markers_y + if transit.hellenistic { HELLENISTIC_OFFSET } else { 0.0 };
            let shades = palette.sign(transit.sign);
            let fill = if highlight_date == Some(transit.date) {
                lighten(shades.lightest, 20.0)
            } else {
                shades.average
            };
            let mut lines = vec![
                format!("Moon enters {}", transit.sign.label()),
                transit.date.format("%b %d %Y %H:%M").to_string(),
            ];
            if transit.hellenistic {
                lines.push("Hellenistic".to_string());
            }
            if let Some(void_start) = transit.void_start {
                lines.push(format!("Void from {}", void_start.format("%b %d %H:%M")));
            }
            markers.push(Marker {
                center: pos2(x, y),
                radius: TRANSIT_MARKER_RADIUS,
                lines,
                fill,
            });

            if let Some(void_start) = transit.void_start {
                if void_start >= start && void_start <= end {
                    let x = mapper.date_to_x(void_start) as f32;
                    let fill = if highlight_date == Some(void_start) {
                        lighten(moon.lightest, 20.0)
                    } else {
                        moon.average
                    };
                    markers.push(Marker {
                        center: pos2(x, markers_y),
                        radius: VOID_MARKER_RADIUS,
                        lines: vec![
                            "Void of Course begins".to_string(),
                            void_start.format("%b %d %Y %H:%M").to_string(),
                        ],
                        fill,
                    });
                }
            }
        }
        markers
    }

    fn draw_ruler(
        &self,
        painter: &egui::Painter,
        mapper: &LinearTimeMapper,
        ruler_y: f32,
        text_color: Color32,
    ) {
        painter.line_segment(
            [
                pos2(mapper.clamp_left as f32, ruler_y),
                pos2(mapper.clamp_right as f32, ruler_y),
            ],
            Stroke::new(1.0, Color32::from_gray(120)),
        );

        for tick in six_hour_ticks(mapper, &Utc) {
            let length = match tick.kind {
                TickKind::Major => 16.0,
                TickKind::Half => 8.0,
                TickKind::Minor => 4.0,
            };
            painter.line_segment(
                [pos2(tick.x, ruler_y), pos2(tick.x, ruler_y - length)],
                Stroke::new(1.0, Color32::from_gray(120)),
            );
            if let Some(label) = &tick.label {
                // Cull labels that would extend past the ruler ends.
                let half_width = label.len() as f32 * 3.0;
                if tick.x - half_width < mapper.clamp_left as f32 - LABEL_SLACK
                    || tick.x + half_width > mapper.clamp_right as f32 + LABEL_SLACK
                {
                    continue;
                }
                painter.text(
                    pos2(tick.x, ruler_y - 10.0),
                    Align2::CENTER_BOTTOM,
                    label,
                    FontId::proportional(10.0),
                    text_color,
                );
            }
        }
    }

    fn run_tooltips(
        &mut self,
        ui: &egui::Ui,
        painter: &egui::Painter,
        response: &egui::Response,
        markers: &[Marker],
    ) {
        let rect = response.rect;
        let pointer = response.hover_pos();

        let hovered = pointer.and_then(|pos| {
            markers
                .iter()
                .find(|m| m.center.distance(pos) <= m.radius)
        });
        if let Some(marker) = hovered {
            let already_open = self
                .tooltips
                .current()
                .is_some_and(|t| t.anchor == marker.center);
            if !already_open {
                let (pos, placement) = place_tooltip(
                    marker.center,
                    marker.radius,
                    TOOLTIP_SIZE,
                    rect,
                    Margins::uniform(2.0),
                    LUNAR_OVERLAP_FRACTION,
                );
                self.tooltips.open(OpenTooltip {
                    anchor: marker.center,
                    anchor_radius: marker.radius,
                    pos,
                    placement,
                    lines: marker.lines.clone(),
                });
            }
        }

        let over_anchor = match (self.tooltips.current(), pointer) {
            (Some(open), Some(pos)) => open.anchor.distance(pos) <= open.anchor_radius,
            _ => false,
        };
        let over_tooltip = match (self.tooltips.current(), pointer) {
            (Some(open), Some(pos)) => open.rect().contains(pos),
            _ => false,
        };
        let now_time = ui.input(|i| i.time);
        if let Some(deadline) = self.tooltips.update(over_anchor, over_tooltip, now_time) {
            ui.ctx()
                .request_repaint_after(std::time::Duration::from_secs_f64(
                    (deadline - now_time).max(0.0),
                ));
        }
        self.tooltips.draw(painter);
    }
}
