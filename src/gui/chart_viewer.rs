//! Chart Viewer Widget
//! Central scrollable panel that lays out the sections of a dashboard view.

use crate::charts::{ChartPlotter, ChartSpec};
use crate::dashboard::{DashboardView, Section, SectionBody};
use egui::{Color32, RichText, ScrollArea};
use std::collections::HashSet;

const CHART_SPACING: f32 = 15.0;
const CHART_WIDTH: f32 = 620.0;
const WARNING_COLOR: Color32 = Color32::from_rgb(243, 156, 18);

/// Scrollable dashboard display. Each chart can switch to its underlying table.
#[derive(Default)]
pub struct ChartViewer {
    pub view: Option<DashboardView>,
    /// Charts currently showing their tables, by chart id.
    data_charts: HashSet<String>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.view = None;
    }

    pub fn set_view(&mut self, view: DashboardView) {
        self.view = Some(view);
    }

    pub fn shows_data(&self, chart_id: &str) -> bool {
        self.data_charts.contains(chart_id)
    }

    pub fn toggle_data(&mut self, chart_id: &str, show_data: bool) {
        if show_data {
            self.data_charts.insert(chart_id.to_string());
        } else {
            self.data_charts.remove(chart_id);
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(view) = self.view.take() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new(view.kind.title()).size(24.0).strong());
                ui.add_space(CHART_SPACING);
                for section in &view.sections {
                    self.draw_section(ui, section);
                    ui.add_space(CHART_SPACING);
                }
            });

        self.view = Some(view);
    }

    fn draw_section(&mut self, ui: &mut egui::Ui, section: &Section) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&section.title).size(18.0).strong());

                if let Some(warning) = &section.warning {
                    ui.label(RichText::new(format!("⚠ {warning}")).color(WARNING_COLOR));
                }
                ui.add_space(8.0);

                match &section.body {
                    SectionBody::Notice(message) => {
                        ui.label(RichText::new(message).size(14.0).italics());
                    }
                    SectionBody::Charts(charts) => self.draw_charts(ui, charts),
                }
            });
    }

    /// Charts wrap into as many columns as fit the available width.
    fn draw_charts(&mut self, ui: &mut egui::Ui, charts: &[ChartSpec]) {
        let full_size = charts.len() == 1;
        let columns = if full_size {
            1
        } else {
            ((ui.available_width() / (CHART_WIDTH + CHART_SPACING)).floor() as usize).max(1)
        };

        for row in charts.chunks(columns) {
            ui.horizontal_top(|ui| {
                for spec in row {
                    ui.vertical(|ui| {
                        if !full_size {
                            ui.set_width(CHART_WIDTH);
                        }
                        let show_data = self.chart_header(ui, spec);
                        if show_data {
                            ChartPlotter::draw_data_table(ui, spec);
                        } else {
                            ChartPlotter::draw(ui, spec, full_size);
                        }
                    });
                    ui.add_space(CHART_SPACING);
                }
            });
            ui.add_space(CHART_SPACING);
        }
    }

    /// Title plus the Chart/Data switch. Returns whether the table is shown.
    fn chart_header(&mut self, ui: &mut egui::Ui, spec: &ChartSpec) -> bool {
        let mut show_data = self.shows_data(&spec.id);
        ui.horizontal(|ui| {
            ui.label(RichText::new(&spec.title).size(14.0).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.selectable_value(&mut show_data, true, "Data");
                ui.selectable_value(&mut show_data, false, "Chart");
            });
        });
        if show_data != self.shows_data(&spec.id) {
            self.toggle_data(&spec.id, show_data);
        }
        show_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dashboard::DashboardKind;
    use crate::data::{FilterSelection, TidyRecord, TidySet};
    use chrono::NaiveDate;

    #[test]
    fn test_data_toggle_is_per_chart() {
        let set = TidySet::new(vec![
            TidyRecord::new(NaiveDate::from_ymd_opt(2021, 12, 4).unwrap(), "BNSF", 100.0)
                .with_detail("Coal"),
            TidyRecord::new(NaiveDate::from_ymd_opt(2022, 7, 2).unwrap(), "UP", 30.0)
                .with_detail("Grain"),
        ]);
        let view = DashboardView::build(DashboardKind::Rail, &set, &FilterSelection::all(&set));
        let filtered: Vec<String> = view
            .section("rail_filtered")
            .expect("filtered section")
            .chart_specs()
            .iter()
            .map(|c| c.id.clone())
            .collect();
        assert!(filtered.len() > 1);

        let mut viewer = ChartViewer::new();
        viewer.set_view(view);
        viewer.toggle_data(&filtered[0], true);

        assert!(viewer.shows_data(&filtered[0]));
        assert!(filtered[1..].iter().all(|id| !viewer.shows_data(id)));

        viewer.toggle_data(&filtered[0], false);
        assert!(!viewer.shows_data(&filtered[0]));
    }
}
