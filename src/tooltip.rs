//! Tooltip placement and lifecycle.
//!
//! A tooltip anchors to a circular marker: its near edge sits a fraction of
//! the marker radius past the marker center, so it covers part of the
//! marker but never buries it. Placement tries right, left, above, below,
//! then centers in the container, accepting the first candidate that fits
//! the container bounds inset by the margins. The returned position is
//! clamped into those bounds again so a tooltip never escapes the container
//! even when no candidate fit.
//!
//! `TooltipSession` owns the at-most-one open tooltip per widget and the
//! delayed close that fires once the pointer has left both the marker and
//! the tooltip.

use crate::config::Margins;
use eframe::egui::{pos2, vec2, Align2, Color32, CornerRadius, FontId, Pos2, Rect, Stroke, Vec2};

pub const TOOLTIP_SIZE: Vec2 = vec2(200.0, 80.0);

/// Fraction of the anchor radius by which the tooltip overlaps the marker.
pub const OVERLAP_FRACTION: f32 = 0.5;

/// Seconds the pointer must stay outside both regions before the tooltip
/// closes.
pub const CLOSE_DELAY: f64 = 0.1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Placement {
    Right,
    Left,
    Above,
    Below,
    Center,
}

pub fn place_tooltip(
    anchor: Pos2,
    anchor_radius: f32,
    size: Vec2,
    bounds: Rect,
    margin: Margins,
    overlap_fraction: f32,
) -> (Pos2, Placement) {
    let overlap = anchor_radius * overlap_fraction;

    let min_x = bounds.left() + margin.left;
    let max_x = bounds.right() - margin.right - size.x;
    let min_y = bounds.top() + margin.top;
    let max_y = bounds.bottom() - margin.bottom - size.y;

    let fits =
        |p: Pos2| p.x >= min_x && p.x <= max_x && p.y >= min_y && p.y <= max_y;

    // Right puts the left edge at the anchor center plus the overlap, Left
    // the right edge at the center minus it; Above and Below do the same on
    // the y axis. The off-axis coordinate stays centered on the anchor.
    let centered_y = anchor.y - size.y / 2.0;
    let centered_x = anchor.x - size.x / 2.0;
    let candidates = [
        (pos2(anchor.x + overlap, centered_y), Placement::Right),
        (pos2(anchor.x - overlap - size.x, centered_y), Placement::Left),
        (pos2(centered_x, anchor.y - overlap - size.y), Placement::Above),
        (pos2(centered_x, anchor.y + overlap), Placement::Below),
        (bounds.center() - size / 2.0, Placement::Center),
    ];

    let (pos, placement) = candidates
        .iter()
        .find(|(p, _)| fits(*p))
        .copied()
        .unwrap_or(candidates[4]);

    // Clamp again: the center candidate can still overflow when the
    // container is smaller than the tooltip.
    let clamped = pos2(
        pos.x.max(min_x).min(max_x.max(min_x)),
        pos.y.max(min_y).min(max_y.max(min_y)),
    );
    (clamped, placement)
}

#[derive(Clone, Debug)]
pub struct OpenTooltip {
    pub anchor: Pos2,
    pub anchor_radius: f32,
    pub pos: Pos2,
    pub placement: Placement,
    pub lines: Vec<String>,
}

impl OpenTooltip {
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.pos, TOOLTIP_SIZE)
    }
}

#[derive(Default)]
pub struct TooltipSession {
    open: Option<OpenTooltip>,
    close_deadline: Option<f64>,
}

impl TooltipSession {
    /// Opens a tooltip, closing any previously open one.
    pub fn open(&mut self, tooltip: OpenTooltip) {
        self.close_deadline = None;
        self.open = Some(tooltip);
    }

    pub fn close(&mut self) {
        self.open = None;
        self.close_deadline = None;
    }

    pub fn current(&self) -> Option<&OpenTooltip> {
        self.open.as_ref()
    }

    /// Advances the delayed-close state machine. `now` is the egui input
    /// time in seconds. Returns the pending deadline, if any, so the caller
    /// can schedule a repaint for it.
    pub fn update(&mut self, over_anchor: bool, over_tooltip: bool, now: f64) -> Option<f64> {
        if self.open.is_none() {
            return None;
        }
        if over_anchor || over_tooltip {
            self.close_deadline = None;
            return None;
        }
        match self.close_deadline {
            None => {
                self.close_deadline = Some(now + CLOSE_DELAY);
                self.close_deadline
            }
            Some(deadline) if now >= deadline => {
                self.close();
                None
            }
            deadline => deadline,
        }
    }

    /// Paints the open tooltip, if any, and returns its rect for hover
    /// testing.
    pub fn draw(&self, painter: &eframe::egui::Painter) -> Option<Rect> {
        let tooltip = self.open.as_ref()?;
        let rect = tooltip.rect();
        painter.rect_filled(rect, CornerRadius::same(4), Color32::from_rgba_unmultiplied(20, 20, 20, 235));
        painter.rect_stroke(
            rect,
            CornerRadius::same(4),
            Stroke::new(1.0, Color32::from_gray(120)),
            eframe::egui::StrokeKind::Inside,
        );
        let mut y = rect.top() + 8.0;
        for line in &tooltip.lines {
            painter.text(
                pos2(rect.left() + 10.0, y),
                Align2::LEFT_TOP,
                line,
                FontId::proportional(13.0),
                Color32::WHITE,
            );
            y += 17.0;
        }
        Some(rect)
    }
}
