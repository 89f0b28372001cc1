//! Application shell and eframe integration.
//!
//! One dock tab per widget, all fed from the demo dataset and a shared
//! color palette. The palette is built once and passed by reference so
//! every widget resolves colors from the same tables.

use crate::demo;
use crate::graph::RetrogradeTransitGraph;
use crate::hours::{build_schedule, PlanetaryHoursWidget};
use crate::lunar::LunarPhasesWidget;
use crate::palette::ColorPalette;
use crate::tracker::RetrogradeTracker;
use crate::voids::VoidOfCourseList;
use chrono::{DateTime, Utc};
use eframe::egui;
use egui_dock::{DockArea, DockState, TabViewer};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum TabKind {
    RetrogradeTracker,
    RetrogradeGraph,
    LunarPhases,
    PlanetaryHours,
    VoidOfCourse,
}

impl TabKind {
    fn title(&self) -> &'static str {
        match self {
            TabKind::RetrogradeTracker => "Retrograde Tracker",
            TabKind::RetrogradeGraph => "Retrogrades & Transits",
            TabKind::LunarPhases => "Lunar Phases",
            TabKind::PlanetaryHours => "Planetary Hours",
            TabKind::VoidOfCourse => "Void of Course",
        }
    }
}

pub(crate) struct App {
    dock_state: DockState<TabKind>,
    palette: ColorPalette,
    current_date: DateTime<Utc>,
    tracker: RetrogradeTracker,
    graph: RetrogradeTransitGraph,
    lunar: LunarPhasesWidget,
    hours: PlanetaryHoursWidget,
    voids: VoidOfCourseList,
}

impl Default for App {
    fn default() -> Self {
        let data = demo::demo_data();
        log::info!(
            "loading demo dataset around {}",
            data.current_date.format("%Y-%m-%d")
        );

        let schedule = build_schedule(
            data.current_date,
            &data.sun,
            &data.retrogrades,
            &data.mercury_transits,
        );
        let mut graph = RetrogradeTransitGraph::new(data.graph_range, data.graph_items);
        graph.highlight_date = Some(data.current_date);

        Self {
            dock_state: DockState::new(vec![
                TabKind::RetrogradeTracker,
                TabKind::RetrogradeGraph,
                TabKind::LunarPhases,
                TabKind::PlanetaryHours,
                TabKind::VoidOfCourse,
            ]),
            palette: ColorPalette::default(),
            current_date: data.current_date,
            tracker: RetrogradeTracker::new(data.mercury, data.mercury_transits),
            graph,
            lunar: LunarPhasesWidget::new(data.moon_info, data.moon_transits),
            hours: PlanetaryHoursWidget::new(schedule),
            voids: VoidOfCourseList::new(data.voids, data.current_date, 14),
        }
    }
}

struct AstroTabViewer<'a> {
    palette: &'a ColorPalette,
    current_date: DateTime<Utc>,
    tracker: &'a mut RetrogradeTracker,
    graph: &'a mut RetrogradeTransitGraph,
    lunar: &'a mut LunarPhasesWidget,
    hours: &'a mut PlanetaryHoursWidget,
    voids: &'a mut VoidOfCourseList,
}

impl TabViewer for AstroTabViewer<'_> {
    type Tab = TabKind;

    fn title(&mut self, tab: &mut Self::Tab) -> egui::WidgetText {
        tab.title().into()
    }

    fn ui(&mut self, ui: &mut egui::Ui, tab: &mut Self::Tab) {
        match tab {
            TabKind::RetrogradeTracker => self.tracker.show(ui, self.palette, self.current_date),
            TabKind::RetrogradeGraph => self.graph.show(ui, self.palette),
            TabKind::LunarPhases => self.lunar.show(ui, self.palette, self.current_date),
            TabKind::PlanetaryHours => self.hours.show(ui, self.palette),
            TabKind::VoidOfCourse => self.voids.show(ui, self.palette, self.current_date),
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        let mut dock_style = egui_dock::Style::from_egui(ctx.style().as_ref());
        dock_style.main_surface_border_stroke = egui::Stroke::NONE;

        let mut viewer = AstroTabViewer {
            palette: &self.palette,
            current_date: self.current_date,
            tracker: &mut self.tracker,
            graph: &mut self.graph,
            lunar: &mut self.lunar,
            hours: &mut self.hours,
            voids: &mut self.voids,
        };
        DockArea::new(&mut self.dock_state)
            .style(dock_style)
            .show(ctx, &mut viewer);
    }
}
