//! Freight Dash Main Application
//! Main window with control panel and dashboard viewer.

use crate::dashboard::{DashboardKind, DashboardView};
use crate::data::TidySet;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::sync::Arc;
use tracing::debug;

/// A dataset as the GUI sees it: loaded, or the message explaining why not.
pub type LoadedDataset = Result<Arc<TidySet>, String>;

/// Main application window.
pub struct FreightApp {
    rail: LoadedDataset,
    port: LoadedDataset,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl FreightApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, rail: LoadedDataset, port: LoadedDataset) -> Self {
        Self::with_datasets(rail, port)
    }

    pub fn with_datasets(rail: LoadedDataset, port: LoadedDataset) -> Self {
        let mut app = Self {
            rail,
            port,
            control_panel: ControlPanel::new(DashboardKind::Port),
            chart_viewer: ChartViewer::new(),
        };
        app.handle_dashboard_changed();
        app
    }

    fn active_dataset(&self) -> &LoadedDataset {
        match self.control_panel.dashboard {
            DashboardKind::Rail => &self.rail,
            DashboardKind::Port => &self.port,
        }
    }

    /// New dashboard: reset the filters to its defaults and rebuild.
    fn handle_dashboard_changed(&mut self) {
        match self.active_dataset().clone() {
            Ok(set) => {
                self.control_panel.update_options(&set);
                self.rebuild_view();
            }
            Err(message) => {
                self.control_panel.set_error(message);
                self.chart_viewer.clear();
            }
        }
    }

    /// Recompute the whole view from the immutable dataset.
    fn rebuild_view(&mut self) {
        let Ok(set) = self.active_dataset().clone() else {
            self.chart_viewer.clear();
            return;
        };
        let kind = self.control_panel.dashboard;
        debug!(dashboard = ?kind, filter = %self.control_panel.filter.describe(), "rebuilding view");
        let view = DashboardView::build(kind, &set, &self.control_panel.filter);
        self.chart_viewer.set_view(view);
    }

    pub fn view(&self) -> Option<&DashboardView> {
        self.chart_viewer.view.as_ref()
    }
}

impl eframe::App for FreightApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::DashboardChanged => self.handle_dashboard_changed(),
                        ControlPanelAction::FilterChanged => self.rebuild_view(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = &self.control_panel.error {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new(error)
                            .size(16.0)
                            .color(egui::Color32::from_rgb(220, 53, 69)),
                    );
                });
                return;
            }
            self.chart_viewer.show(ui);
        });
    }
}
