//! Retrograde and transit graph.
//!
//! A horizontal timeline per planet: hatched filler where no motion data
//! applies, colored bars for direct and retrograde stretches, sign glyphs
//! for ingresses. A year row and a month row sit above the planet rows.
//! All bars share one geometry routine that converts a date span into a
//! left offset and width inside the row strip; gap rows differ only in how
//! the span is segmented.

use crate::palette::{shade, ColorPalette, FALLBACK_GREY};
use crate::tooltip::{place_tooltip, OpenTooltip, TooltipSession, OVERLAP_FRACTION, TOOLTIP_SIZE};
use crate::transit::TransitEvent;
use crate::zodiac::{Planet, Sign};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use eframe::egui::{
    self, pos2, vec2, Align2, Color32, CornerRadius, FontId, Pos2, Rect, Sense, Stroke,
};

pub const LABEL_WIDTH: f32 = 75.0;
pub const PADDING_RIGHT: f32 = 5.0;
pub const ROW_HEIGHT: f32 = 16.0;
pub const ROW_GAP: f32 = 2.0;
pub const MIN_CONTAINER_WIDTH: f32 = 800.0;

/// Bars narrower than this drop their glyph label.
const BAR_LABEL_MIN_WIDTH: f32 = 10.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// The visible date span. Panning shifts both ends by whole milliseconds
/// so the duration never drifts.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GraphRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl GraphRange {
    /// Span in days, rounded. The pixel scale divides the row strip by this.
    pub fn scale_days(&self) -> i64 {
        ((self.end - self.start).num_milliseconds() as f64 / MS_PER_DAY).round() as i64
    }

    /// The range after dragging by `delta_x` pixels. Dragging left moves
    /// the window forward in time.
    pub fn panned(&self, delta_x: f32, pixels_per_day: f32) -> GraphRange {
        let days_offset = -delta_x as f64 / pixels_per_day as f64;
        let shift = Duration::milliseconds((days_offset * MS_PER_DAY).round() as i64);
        GraphRange {
            start: self.start + shift,
            end: self.end + shift,
        }
    }
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_DAY
}

/// Left offset and width in pixels for the part of `[seg_start, seg_end)`
/// that falls inside the range. `None` when nothing is visible. Widths get
/// one extra pixel so adjacent bars meet, then clamp at the strip's right
/// edge.
pub fn bar_geometry(
    range: &GraphRange,
    seg_start: DateTime<Utc>,
    seg_end: DateTime<Utc>,
    available_width: f32,
) -> Option<(f32, f32)> {
    let scale = range.scale_days() as f64;
    if scale <= 0.0 {
        return None;
    }
    let pixels_per_day = available_width as f64 / scale;

    let span_start = days_between(range.start, seg_start).max(0.0);
    if span_start >= scale {
        return None;
    }
    let span_end = days_between(range.start, seg_end).min(scale);
    let span = span_end - span_start;
    if span <= 0.0 {
        return None;
    }

    let left = (span_start * pixels_per_day).round() as f32;
    let mut width = (span * pixels_per_day).round() as f32 + 1.0;
    if left + width >= available_width {
        width = (available_width - left).max(0.0);
    }
    Some((left, width))
}

#[derive(Clone, PartialEq, Debug)]
pub struct Segment {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GapStyle {
    /// One unlabelled segment covering the whole gap.
    Continuous,
    /// Segments split at month boundaries, each labelled with its month.
    MonthAligned,
}

fn next_month_start(date: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(date)
}

/// Segments covering `[from, to)` in the requested style. The month row
/// and the filler stretches of the planet rows both go through here.
pub fn gap_segments(from: DateTime<Utc>, to: DateTime<Utc>, style: GapStyle) -> Vec<Segment> {
    if to <= from {
        return Vec::new();
    }
    match style {
        GapStyle::Continuous => vec![Segment {
            start: from,
            end: to,
            label: None,
        }],
        GapStyle::MonthAligned => {
            let mut segments = Vec::new();
            let mut cursor = from;
            while cursor < to {
                let end = next_month_start(cursor).min(to);
                segments.push(Segment {
                    start: cursor,
                    end,
                    label: Some(cursor.format("%b").to_string().to_uppercase()),
                });
                cursor = end;
            }
            segments
        }
    }
}

/// Calendar-year segments across the range, labelled with the year.
pub fn year_segments(range: &GraphRange) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = range.start;
    while cursor < range.end {
        let next = Utc
            .with_ymd_and_hms(cursor.year() + 1, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(range.end);
        let end = next.min(range.end);
        segments.push(Segment {
            start: cursor,
            end,
            label: Some(cursor.year().to_string()),
        });
        cursor = end;
    }
    segments
}

/// A change of apparent motion. Each toggle opens a stretch that runs to
/// the next toggle.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RetroToggle {
    pub date: DateTime<Utc>,
    pub retrograde: bool,
    pub sign: Option<Sign>,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RetroInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub retrograde: bool,
    pub sign: Option<Sign>,
}

/// Expands toggles into contiguous intervals. The last toggle gets a one
/// day stub, clamped to the range end.
pub fn retro_intervals(toggles: &[RetroToggle], range_end: DateTime<Utc>) -> Vec<RetroInterval> {
    toggles
        .iter()
        .enumerate()
        .map(|(i, toggle)| {
            let end = match toggles.get(i + 1) {
                Some(next) => next.date,
                None => (toggle.date + Duration::days(1)).min(range_end),
            };
            RetroInterval {
                start: toggle.date,
                end,
                retrograde: toggle.retrograde,
                sign: toggle.sign,
            }
        })
        .collect()
}

/// One row of the graph. `planet` is `None` for synthetic rows; `text` is
/// the row label.
#[derive(Clone, Debug)]
pub struct GraphItem {
    pub planet: Option<Planet>,
    pub text: String,
    pub retrogrades: Vec<RetroToggle>,
    pub transits: Vec<TransitEvent>,
}

fn interval_state(item: &GraphItem, retrograde: bool) -> &'static str {
    match (item.planet, retrograde) {
        (Some(Planet::Moon), true) => "Waning",
        (Some(Planet::Moon), false) => "Waxing",
        (_, true) => "Retrograde",
        (_, false) => "Direct",
    }
}

pub struct RetrogradeTransitGraph {
    pub range: GraphRange,
    pub items: Vec<GraphItem>,
    pub highlight_date: Option<DateTime<Utc>>,
    drag_origin: Option<GraphRange>,
    tooltips: TooltipSession,
}

impl RetrogradeTransitGraph {
    pub fn new(range: GraphRange, items: Vec<GraphItem>) -> Self {
        Self {
            range,
            items,
            highlight_date: None,
            drag_origin: None,
            tooltips: TooltipSession::default(),
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, palette: &ColorPalette) {
        let rows = self.items.len() + 2;
        let height = rows as f32 * (ROW_HEIGHT + ROW_GAP) + 8.0;
        let container_width = ui.available_width().max(MIN_CONTAINER_WIDTH);
        let (response, painter) =
            ui.allocate_painter(vec2(container_width, height), Sense::click_and_drag());
        let rect = response.rect;
        let painter = painter.with_clip_rect(rect);

        let available_width = container_width - LABEL_WIDTH - PADDING_RIGHT;
        let scale = self.range.scale_days().max(1) as f32;
        let pixels_per_day = available_width / scale;
        let origin_x = rect.left() + LABEL_WIDTH;

        if response.drag_started() {
            self.drag_origin = Some(self.range);
            self.tooltips.close();
        }
        if response.dragged() {
            if let (Some(origin), Some(press), Some(pos)) = (
                self.drag_origin,
                ui.input(|i| i.pointer.press_origin()),
                response.interact_pointer_pos(),
            ) {
                self.range = origin.panned(pos.x - press.x, pixels_per_day);
            }
        }
        if response.drag_stopped() {
            self.drag_origin = None;
        }

        let row_y = |row: usize| rect.top() + 4.0 + row as f32 * (ROW_HEIGHT + ROW_GAP);
        let text_color = ui.visuals().text_color();
        let mut hit_bars: Vec<(Rect, Vec<String>)> = Vec::new();

        for seg in year_segments(&self.range) {
            self.draw_segment_bar(
                &painter,
                &seg,
                origin_x,
                row_y(0),
                available_width,
                Color32::from_gray(60),
                30.0,
            );
        }
        for seg in gap_segments(self.range.start, self.range.end, GapStyle::MonthAligned) {
            self.draw_segment_bar(
                &painter,
                &seg,
                origin_x,
                row_y(1),
                available_width,
                Color32::from_gray(45),
                24.0,
            );
        }

        for (index, item) in self.items.iter().enumerate() {
            let y = row_y(2 + index);
            let base = match item.planet {
                Some(planet) => palette.planet(planet).average,
                None => FALLBACK_GREY.average,
            };
            painter.text(
                pos2(origin_x - 5.0, y + ROW_HEIGHT / 2.0),
                Align2::RIGHT_CENTER,
                &item.text,
                FontId::proportional(11.0),
                text_color,
            );

            let intervals = retro_intervals(&item.retrogrades, self.range.end);

            let filler_color = Color32::from_rgb(0xcc, 0xcc, 0xcc);
            let filler_to = intervals.first().map(|i| i.start).unwrap_or(self.range.end);
            for seg in gap_segments(self.range.start, filler_to, GapStyle::Continuous) {
                if let Some((left, width)) =
                    bar_geometry(&self.range, seg.start, seg.end, available_width)
                {
                    let bar = Rect::from_min_size(
                        pos2(origin_x + left, y),
                        vec2(width, ROW_HEIGHT),
                    );
                    painter.rect_filled(bar, CornerRadius::ZERO, shade(filler_color, 1.0, 0.5));
                    hatch(&painter, bar, shade(filler_color, 0.7, 0.5));
                }
            }
            if let Some(last) = intervals.last() {
                for seg in gap_segments(last.end, self.range.end, GapStyle::Continuous) {
                    if let Some((left, width)) =
                        bar_geometry(&self.range, seg.start, seg.end, available_width)
                    {
                        let bar = Rect::from_min_size(
                            pos2(origin_x + left, y),
                            vec2(width, ROW_HEIGHT),
                        );
                        painter.rect_filled(bar, CornerRadius::ZERO, shade(filler_color, 1.0, 0.5));
                        hatch(&painter, bar, shade(filler_color, 0.7, 0.5));
                    }
                }
            }

            for interval in &intervals {
                let Some((left, width)) =
                    bar_geometry(&self.range, interval.start, interval.end, available_width)
                else {
                    continue;
                };
                let bar =
                    Rect::from_min_size(pos2(origin_x + left, y), vec2(width, ROW_HEIGHT));
                if interval.retrograde {
                    painter.rect_filled(bar, CornerRadius::ZERO, shade(base, 0.8, 0.8));
                    hatch(&painter, bar, shade(base, 0.5, 0.5));
                } else {
                    painter.rect_filled(bar, CornerRadius::ZERO, base);
                }
                if width >= BAR_LABEL_MIN_WIDTH {
                    if let Some(sign) = interval.sign {
                        painter.text(
                            bar.center(),
                            Align2::CENTER_CENTER,
                            sign.glyph(),
                            FontId::proportional(11.0),
                            Color32::WHITE,
                        );
                    }
                }

                let mut lines = vec![
                    format!(
                        "{} - {}",
                        interval.start.format("%b %d %Y"),
                        interval.end.format("%b %d %Y")
                    ),
                    item.text.clone(),
                    interval_state(item, interval.retrograde).to_string(),
                ];
                for transit in &item.transits {
                    if transit.date >= interval.start && transit.date <= interval.end {
                        lines.push(format!(
                            "{} {} {}",
                            transit.date.format("%b %d %H:%M"),
                            transit.sign.glyph(),
                            transit.sign.label()
                        ));
                    }
                }
                hit_bars.push((bar, lines));
            }

            for transit in &item.transits {
                let days = days_between(self.range.start, transit.date) as f32;
                if days < 0.0 || days > scale {
                    continue;
                }
                painter.text(
                    pos2(origin_x + days * pixels_per_day, y + ROW_HEIGHT / 2.0),
                    Align2::CENTER_CENTER,
                    transit.sign.glyph(),
                    FontId::proportional(12.0),
                    palette.sign(transit.sign).lightest,
                );
            }
        }

        if let Some(date) = self.highlight_date {
            let days = days_between(self.range.start, date) as f32;
            if days >= 0.0 && days <= scale {
                let x = origin_x + days * pixels_per_day;
                painter.line_segment(
                    [pos2(x, rect.top()), pos2(x, rect.bottom())],
                    Stroke::new(3.0, Color32::from_rgb(0xe0, 0xc0, 0x30)),
                );
            }
        }

        if response.clicked() {
            match self.bar_under_pointer(&hit_bars, response.interact_pointer_pos()) {
                Some((anchor, lines)) => {
                    let (pos, placement) = place_tooltip(
                        anchor,
                        8.0,
                        TOOLTIP_SIZE,
                        rect,
                        crate::config::Margins::uniform(2.0),
                        OVERLAP_FRACTION,
                    );
                    self.tooltips.open(OpenTooltip {
                        anchor,
                        anchor_radius: 8.0,
                        pos,
                        placement,
                        lines,
                    });
                }
                None => self.tooltips.close(),
            }
        }
        self.tooltips.draw(&painter);
    }

    fn bar_under_pointer(
        &self,
        hit_bars: &[(Rect, Vec<String>)],
        pointer: Option<Pos2>,
    ) -> Option<(Pos2, Vec<String>)> {
        let pos = pointer?;
        hit_bars
            .iter()
            .find(|(bar, _)| bar.contains(pos))
            .map(|(_, lines)| (pos, lines.clone()))
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_segment_bar(
        &self,
        painter: &egui::Painter,
        seg: &Segment,
        origin_x: f32,
        y: f32,
        available_width: f32,
        fill: Color32,
        label_min_width: f32,
    ) {
        let Some((left, width)) = bar_geometry(&self.range, seg.start, seg.end, available_width)
        else {
            return;
        };
        let bar = Rect::from_min_size(pos2(origin_x + left, y), vec2(width, ROW_HEIGHT));
        painter.rect_filled(bar, CornerRadius::ZERO, fill);
        painter.rect_stroke(
            bar,
            CornerRadius::ZERO,
            Stroke::new(1.0, Color32::from_gray(30)),
            egui::StrokeKind::Inside,
        );
        if width >= label_min_width {
            if let Some(label) = &seg.label {
                painter.text(
                    bar.center(),
                    Align2::CENTER_CENTER,
                    label,
                    FontId::proportional(10.0),
                    Color32::from_gray(220),
                );
            }
        }
    }
}

/// Diagonal hatch lines inside a bar.
fn hatch(painter: &egui::Painter, bar: Rect, color: Color32) {
    let clipped = painter.with_clip_rect(bar);
    let stroke = Stroke::new(1.0, color);
    let mut x = bar.left() - bar.height();
    while x < bar.right() {
        clipped.line_segment(
            [pos2(x, bar.bottom()), pos2(x + bar.height(), bar.top())],
            stroke,
        );
        x += 4.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
    }

    fn january() -> GraphRange {
        GraphRange {
            start: utc(2025, 1, 1),
            end: utc(2025, 1, 31),
        }
    }

    #[test]
    fn bar_geometry_maps_days_to_pixels() {
        // 30 day range over 300 px: 10 px per day.
        let (left, width) =
            bar_geometry(&january(), utc(2025, 1, 5), utc(2025, 1, 10), 300.0).unwrap();
        assert_eq!(left, 40.0);
        assert_eq!(width, 51.0);
    }

    #[test]
    fn bar_geometry_clamps_at_the_right_edge() {
        let (left, width) =
            bar_geometry(&january(), utc(2025, 1, 29), utc(2025, 2, 5), 300.0).unwrap();
        assert_eq!(left, 280.0);
        assert_eq!(width, 20.0);
    }

    #[test]
    fn bar_geometry_clamps_at_the_left_edge() {
        let (left, width) =
            bar_geometry(&january(), utc(2024, 12, 20), utc(2025, 1, 3), 300.0).unwrap();
        assert_eq!(left, 0.0);
        assert_eq!(width, 21.0);
    }

    #[test]
    fn bars_outside_the_range_are_skipped() {
        assert!(bar_geometry(&january(), utc(2025, 2, 5), utc(2025, 2, 10), 300.0).is_none());
        assert!(bar_geometry(&january(), utc(2024, 12, 1), utc(2024, 12, 20), 300.0).is_none());
    }

    #[test]
    fn year_segments_split_at_new_year() {
        let range = GraphRange {
            start: utc(2024, 12, 1),
            end: utc(2025, 2, 1),
        };
        let segments = year_segments(&range);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].label.as_deref(), Some("2024"));
        assert_eq!(segments[0].end, utc(2025, 1, 1));
        assert_eq!(segments[1].label.as_deref(), Some("2025"));
        assert_eq!(segments[1].end, utc(2025, 2, 1));
    }

    #[test]
    fn month_segments_split_at_month_boundaries() {
        let segments = gap_segments(utc(2025, 2, 15), utc(2025, 4, 10), GapStyle::MonthAligned);
        let labels: Vec<_> = segments.iter().filter_map(|s| s.label.as_deref()).collect();
        assert_eq!(labels, ["FEB", "MAR", "APR"]);
        assert_eq!(segments[0].end, utc(2025, 3, 1));
        assert_eq!(segments[1].end, utc(2025, 4, 1));
        assert_eq!(segments[2].end, utc(2025, 4, 10));
    }

    #[test]
    fn continuous_gaps_are_one_unlabelled_segment() {
        let segments = gap_segments(utc(2025, 2, 15), utc(2025, 4, 10), GapStyle::Continuous);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].label, None);
        assert!(gap_segments(utc(2025, 4, 10), utc(2025, 2, 15), GapStyle::Continuous).is_empty());
    }

    #[test]
    fn retro_intervals_run_to_the_next_toggle() {
        let toggles = [
            RetroToggle {
                date: utc(2025, 4, 1),
                retrograde: true,
                sign: Some(Sign::Aries),
            },
            RetroToggle {
                date: utc(2025, 4, 10),
                retrograde: false,
                sign: Some(Sign::Pisces),
            },
        ];
        let intervals = retro_intervals(&toggles, utc(2025, 5, 1));
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].end, utc(2025, 4, 10));
        assert!(intervals[0].retrograde);
        // The last toggle gets a one day stub.
        assert_eq!(intervals[1].end, utc(2025, 4, 11));
    }

    #[test]
    fn the_last_interval_clamps_to_the_range_end() {
        let toggles = [RetroToggle {
            date: Utc.with_ymd_and_hms(2025, 4, 30, 12, 0, 0).unwrap(),
            retrograde: false,
            sign: None,
        }];
        let end = Utc.with_ymd_and_hms(2025, 4, 30, 18, 0, 0).unwrap();
        let intervals = retro_intervals(&toggles, end);
        assert_eq!(intervals[0].end, end);
    }

    #[test]
    fn panning_shifts_both_ends_and_keeps_the_duration() {
        let range = january();
        let panned = range.panned(-50.0, 10.0);
        assert_eq!(panned.start, utc(2025, 1, 6));
        assert_eq!(panned.end, utc(2025, 2, 5));
        assert_eq!(panned.end - panned.start, range.end - range.start);
    }

    #[test]
    fn moon_rows_report_waxing_and_waning() {
        let moon = GraphItem {
            planet: Some(Planet::Moon),
            text: "Moon".into(),
            retrogrades: Vec::new(),
            transits: Vec::new(),
        };
        assert_eq!(interval_state(&moon, false), "Waxing");
        assert_eq!(interval_state(&moon, true), "Waning");
        let mercury = GraphItem {
            planet: Some(Planet::Mercury),
            ..moon
        };
        assert_eq!(interval_state(&mercury, true), "Retrograde");
    }
}
