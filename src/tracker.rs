//! Retrograde tracker widget.
//!
//! Draws the folded ribbon from `TrackerLayout`: top line, turn arc,
//! retrograde middle line, second turn arc, bottom line, with direction
//! arrows on the outer legs. A degree ruler runs across the top with the
//! retrograde span highlighted, the planet marker sits at today's position
//! on the ribbon, and ingress markers are spaced off the planet marker in
//! date order.

use crate::collision::{space_markers, Anchor, Candidate, Nudge};
use crate::config::Margins;
use crate::palette::ColorPalette;
use crate::path::{TrackerLayout, ARROW_SIZE, RULER_HEIGHT};
use crate::ruler::{degree_ticks, TickKind};
use crate::tooltip::{place_tooltip, OpenTooltip, TooltipSession, OVERLAP_FRACTION, TOOLTIP_SIZE};
use crate::transit::{RetrogradeSpec, TransitEvent};
use chrono::{DateTime, Utc};
use eframe::egui::{self, pos2, vec2, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke};
use std::f32::consts::PI;

pub const PLANET_MARKER_RADIUS: f32 = 15.0;
pub const TRANSIT_MARKER_RADIUS: f32 = 10.0;

/// Clearance kept between the planet marker and a spaced ingress marker.
pub const MARKER_GAP: f32 = 1.0;

const WIDGET_HEIGHT: f32 = 300.0;
const ARC_SAMPLES: usize = 24;

pub struct RetrogradeTracker {
    pub spec: RetrogradeSpec,
    pub transits: Vec<TransitEvent>,
    pub margin: Margins,
    pub ruler_margin: f32,
    tooltips: TooltipSession,
}

struct PlacedMarker {
    center: Pos2,
    radius: f32,
    lines: Vec<String>,
}

impl RetrogradeTracker {
    pub fn new(spec: RetrogradeSpec, transits: Vec<TransitEvent>) -> Self {
        Self {
            spec,
            transits,
            margin: Margins::default(),
            ruler_margin: 32.0,
            tooltips: TooltipSession::default(),
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, palette: &ColorPalette, now: DateTime<Utc>) {
        let width = ui.available_width().max(600.0);
        let (response, painter) =
            ui.allocate_painter(vec2(width, WIDGET_HEIGHT), Sense::click());
        let rect = response.rect;
        let painter = painter.with_clip_rect(rect);
        let text_color = ui.visuals().text_color();

        let layout = TrackerLayout::new(rect, self.margin, self.ruler_margin);
        let window = self.spec.window;
        let line_stroke = Stroke::new(2.0, Color32::from_gray(150));

        // Ribbon legs.
        painter.line_segment(
            [
                pos2(rect.left() + self.margin.left, layout.top_line_y),
                pos2(layout.adjusted_right_endpoint, layout.top_line_y),
            ],
            line_stroke,
        );
        painter.line_segment(
            [
                pos2(layout.adjusted_left_endpoint, layout.middle_line_y),
                pos2(layout.adjusted_right_endpoint, layout.middle_line_y),
            ],
            line_stroke,
        );
        painter.line_segment(
            [
                pos2(layout.adjusted_left_endpoint, layout.bottom_line_y),
                pos2(rect.right() - self.margin.right, layout.bottom_line_y),
            ],
            line_stroke,
        );

        // Turn arcs, sampled since egui has no arc primitive. The right arc
        // sweeps from the top line down to the middle line, the left one
        // from the middle line down to the bottom line.
        painter.add(Shape::line(
            arc_points(layout.top_right_arc_center, layout.arc_radius, -PI / 2.0, PI / 2.0),
            line_stroke,
        ));
        painter.add(Shape::line(
            arc_points(layout.bottom_left_arc_center, layout.arc_radius, -PI / 2.0, -3.0 * PI / 2.0),
            line_stroke,
        ));

        draw_arrow(&painter, pos2(layout.top_arrow_x, layout.top_line_y), line_stroke.color);
        draw_arrow(&painter, pos2(layout.bottom_arrow_x, layout.bottom_line_y), line_stroke.color);

        self.draw_ruler(&painter, &layout, text_color);
        self.draw_stations(&painter, &layout, text_color);

        // Planet marker at today's ribbon position.
        let planet_pos = layout.plot_date(now, &window);
        let planet_shades = palette.planet(self.spec.planet);
        let anchor = Anchor {
            pos: planet_pos,
            radius: PLANET_MARKER_RADIUS,
        };
        let mut markers = vec![PlacedMarker {
            center: planet_pos,
            radius: PLANET_MARKER_RADIUS,
            lines: vec![
                format!("{} {}", self.spec.planet.glyph(), self.spec.planet.label()),
                now.format("%b %d %Y %H:%M").to_string(),
                format!("{} - {}", self.spec.start_degree.display(), self.spec.end_degree.display()),
            ],
        }];

        // Ingress markers, spaced in date order so earlier markers settle
        // before later ones are tested.
        let mut transits = self.transits.clone();
        transits.sort_by_key(|t| t.date);
        for transit in &transits {
            let pos = layout.plot_date(transit.date, &window);
            let candidate = Candidate {
                x: pos.x,
                initial_y: pos.y,
                radius: TRANSIT_MARKER_RADIUS,
                date: Some(transit.date),
            };
            let center = match space_markers(&layout, &window, &anchor, &candidate, MARKER_GAP) {
                Nudge::None => pos,
                Nudge::X(delta) => pos2(pos.x + delta, pos.y),
                Nudge::Y(y) => pos2(pos.x, y),
            };
            markers.push(PlacedMarker {
                center,
                radius: TRANSIT_MARKER_RADIUS,
                lines: vec![
                    format!("Enters {}", transit.sign.label()),
                    transit.date.format("%b %d %Y %H:%M").to_string(),
                ],
            });
        }

        let pointer = response.hover_pos();
        for (index, marker) in markers.iter().enumerate() {
            let (mut fill, glyph) = if index == 0 {
                (planet_shades.average, self.spec.planet.glyph())
            } else {
                let sign = transits[index - 1].sign;
                (palette.sign(sign).average, sign.glyph())
            };
            let hovered =
                pointer.is_some_and(|pos| marker.center.distance(pos) <= marker.radius);
            if hovered {
                fill = crate::palette::lighten(fill, 20.0);
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
            painter.circle_filled(marker.center, marker.radius, fill);
            painter.circle_stroke(marker.center, marker.radius, Stroke::new(1.0, Color32::from_gray(30)));
            painter.text(
                marker.center,
                Align2::CENTER_CENTER,
                glyph,
                FontId::proportional(marker.radius),
                Color32::WHITE,
            );
        }

        // Pointer tracker over the ruler span.
        if let Some(pos) = pointer {
            let x = pos.x.clamp(layout.ruler_start_x, layout.ruler_end_x);
            let ruler_y = rect.top() + self.margin.top + RULER_HEIGHT;
            painter.line_segment(
                [pos2(x, ruler_y), pos2(x, layout.bottom_line_y)],
                Stroke::new(1.0, Color32::from_gray(110)),
            );
        }

        if response.clicked() {
            let hit = response.interact_pointer_pos().and_then(|pos| {
                markers
                    .iter()
                    .find(|m| m.center.distance(pos) <= m.radius)
            });
            match hit {
                Some(marker) => {
                    let (pos, placement) = place_tooltip(
                        marker.center,
                        marker.radius,
                        TOOLTIP_SIZE,
                        rect,
                        Margins::uniform(2.0),
                        OVERLAP_FRACTION,
                    );
                    self.tooltips.open(OpenTooltip {
                        anchor: marker.center,
                        anchor_radius: marker.radius,
                        pos,
                        placement,
                        lines: marker.lines.clone(),
                    });
                }
                None => self.tooltips.close(),
            }
        }
        self.tooltips.draw(&painter);
    }

    fn draw_ruler(&self, painter: &egui::Painter, layout: &TrackerLayout, text_color: Color32) {
        let ruler_y = layout.rect.top() + self.margin.top + RULER_HEIGHT;

        // Retrograde span highlight between the two station positions.
        let band = egui::Rect::from_min_max(
            pos2(layout.top_arrow_x, ruler_y - RULER_HEIGHT),
            pos2(layout.bottom_arrow_left_x, ruler_y),
        );
        painter.rect_filled(
            band,
            egui::CornerRadius::ZERO,
            Color32::from_rgba_unmultiplied(0xe0, 0xc0, 0x30, 60),
        );

        painter.line_segment(
            [
                pos2(layout.ruler_start_x, ruler_y),
                pos2(layout.ruler_end_x, ruler_y),
            ],
            Stroke::new(1.0, Color32::from_gray(120)),
        );

        let ticks = degree_ticks(
            self.spec.start_degree,
            self.spec.end_degree,
            layout.bottom_arrow_left_x,
            layout.top_arrow_x,
            layout.ruler_start_x,
            layout.ruler_end_x,
        );
        for tick in ticks {
            let length = match tick.kind {
                TickKind::Major => 12.0,
                TickKind::Half => 7.0,
                TickKind::Minor => 4.0,
            };
            painter.line_segment(
                [pos2(tick.x, ruler_y), pos2(tick.x, ruler_y - length)],
                Stroke::new(1.0, Color32::from_gray(120)),
            );
            if let Some(label) = tick.label {
                painter.text(
                    pos2(tick.x, ruler_y - 14.0),
                    Align2::CENTER_BOTTOM,
                    label,
                    FontId::proportional(9.0),
                    text_color,
                );
            }
        }
    }

    fn draw_stations(&self, painter: &egui::Painter, layout: &TrackerLayout, text_color: Color32) {
        let window = &self.spec.window;
        painter.text(
            pos2(
                layout.adjusted_right_endpoint + layout.arc_radius + 6.0,
                (layout.top_line_y + layout.middle_line_y) / 2.0 - 16.0,
            ),
            Align2::LEFT_CENTER,
            format!(
                "Stations Retrograde {} {}",
                window.retro_start.format("%b %d"),
                self.spec.start_degree.display()
            ),
            FontId::proportional(10.0),
            text_color,
        );
        painter.text(
            pos2(
                layout.adjusted_left_endpoint - layout.arc_radius - 6.0,
                (layout.middle_line_y + layout.bottom_line_y) / 2.0 + 16.0,
            ),
            Align2::RIGHT_CENTER,
            format!(
                "Stations Direct {} {}",
                window.retro_end.format("%b %d"),
                self.spec.end_degree.display()
            ),
            FontId::proportional(10.0),
            text_color,
        );
    }
}

fn arc_points(center: Pos2, radius: f32, from: f32, to: f32) -> Vec<Pos2> {
    (0..=ARC_SAMPLES)
        .map(|i| {
            let angle = from + (to - from) * i as f32 / ARC_SAMPLES as f32;
            pos2(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// Rightward arrow head on a ribbon line.
fn draw_arrow(painter: &egui::Painter, tip: Pos2, color: Color32) {
    let half = ARROW_SIZE / 2.0;
    painter.add(Shape::convex_polygon(
        vec![
            tip,
            pos2(tip.x - ARROW_SIZE, tip.y - half / 2.0),
            pos2(tip.x - ARROW_SIZE, tip.y + half / 2.0),
        ],
        color,
        Stroke::NONE,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transit::RetrogradeWindow;
    use crate::zodiac::{parse_degree, Planet, Sign};
    use chrono::TimeZone;

    fn spec() -> RetrogradeSpec {
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
    fn arc_points_span_the_requested_angles() {
        let points = arc_points(pos2(100.0, 100.0), 40.0, -PI / 2.0, PI / 2.0);
        assert_eq!(points.len(), ARC_SAMPLES + 1);
        let first = points[0];
        let last = points[points.len() - 1];
        assert!((first.x - 100.0).abs() < 0.001 && (first.y - 60.0).abs() < 0.001);
        assert!((last.x - 100.0).abs() < 0.001 && (last.y - 140.0).abs() < 0.001);
        // Midpoint is the rightmost point of the circle.
        let mid = points[ARC_SAMPLES / 2];
        assert!((mid.x - 140.0).abs() < 0.001);
    }

    #[test]
    fn left_arc_sweeps_through_the_leftmost_point() {
        let points = arc_points(pos2(100.0, 100.0), 40.0, -PI / 2.0, -3.0 * PI / 2.0);
        let mid = points[ARC_SAMPLES / 2];
        assert!((mid.x - 60.0).abs() < 0.001);
        let last = points[points.len() - 1];
        assert!((last.y - 140.0).abs() < 0.001);
    }

    #[test]
    fn tracker_owns_its_transits_in_any_order() {
        let transits = vec![
            TransitEvent {
                date: Utc.with_ymd_and_hms(2025, 4, 10, 0, 0, 0).unwrap(),
                sign: Sign::Aries,
            },
            TransitEvent {
                date: Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap(),
                sign: Sign::Pisces,
            },
        ];
        let tracker = RetrogradeTracker::new(spec(), transits);
        let mut sorted = tracker.transits.clone();
        sorted.sort_by_key(|t| t.date);
        assert!(sorted[0].date < sorted[1].date);
        assert_eq!(tracker.ruler_margin, 32.0);
    }
}
