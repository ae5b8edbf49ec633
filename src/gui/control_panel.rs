//! Control Panel Widget
//! Left side panel with the dashboard selector and the year, month and
//! category filters.

use crate::dashboard::DashboardKind;
use crate::data::{month_abbrev, FilterSelection, TidySet};
use egui::{Color32, RichText, ScrollArea};
use std::collections::BTreeSet;

/// Options offered by the loaded dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub categories: Vec<String>,
}

impl FilterOptions {
    pub fn from_set(set: &TidySet) -> Self {
        Self {
            years: set.years(),
            months: set.months(),
            categories: set.categories(),
        }
    }
}

/// Left side control panel.
pub struct ControlPanel {
    pub dashboard: DashboardKind,
    pub options: FilterOptions,
    pub filter: FilterSelection,
    pub status: String,
    pub error: Option<String>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            dashboard: DashboardKind::Port,
            options: FilterOptions::default(),
            filter: FilterSelection::default(),
            status: "Ready".to_string(),
            error: None,
        }
    }
}

impl ControlPanel {
    pub fn new(dashboard: DashboardKind) -> Self {
        Self {
            dashboard,
            ..Self::default()
        }
    }

    /// Reset options and selection for a newly active dataset.
    pub fn update_options(&mut self, set: &TidySet) {
        self.options = FilterOptions::from_set(set);
        self.filter = self.dashboard.default_selection(set);
        self.error = None;
        self.status = format!(
            "{} records, {} {}s",
            set.len(),
            self.options.categories.len(),
            self.dashboard.category_label().to_lowercase()
        );
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.options = FilterOptions::default();
        self.filter = FilterSelection::default();
        self.error = Some(message.into());
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚢 Freight Dash")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Seasonal port and rail activity")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Dashboard Section =====
        ui.label(RichText::new("📊 Dashboard").size(14.0).strong());
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            for kind in [DashboardKind::Rail, DashboardKind::Port] {
                let label = match kind {
                    DashboardKind::Rail => "Rail",
                    DashboardKind::Port => "Port",
                };
                if ui.radio_value(&mut self.dashboard, kind, label).changed() {
                    action = ControlPanelAction::DashboardChanged;
                }
            }
        });

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        if let Some(error) = &self.error {
            ui.label(
                RichText::new(format!("Error: {error}"))
                    .size(12.0)
                    .color(Color32::from_rgb(220, 53, 69)),
            );
            return action;
        }

        // ===== Filter Sections =====
        let years: Vec<(i32, String)> = self
            .options
            .years
            .iter()
            .map(|y| (*y, y.to_string()))
            .collect();
        if Self::filter_group(ui, "📅 Year", "year", &years, &mut self.filter.years) {
            action = ControlPanelAction::FilterChanged;
        }

        let months: Vec<(u32, String)> = self
            .options
            .months
            .iter()
            .map(|m| (*m, month_abbrev(*m).unwrap_or("?").to_string()))
            .collect();
        if Self::filter_group(ui, "🗓 Month", "month", &months, &mut self.filter.months) {
            action = ControlPanelAction::FilterChanged;
        }

        let categories: Vec<(String, String)> = self
            .options
            .categories
            .iter()
            .map(|c| (c.clone(), c.clone()))
            .collect();
        let title = format!("🔧 {}", self.dashboard.category_label());
        if Self::filter_group(ui, &title, "category", &categories, &mut self.filter.categories) {
            action = ControlPanelAction::FilterChanged;
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);
        ui.label(RichText::new(&self.status).size(11.0).color(Color32::GRAY));

        action
    }

    /// Checkbox list with "Select All" / "Clear All". Returns true if the selection changed.
    fn filter_group<T: Ord + Clone>(
        ui: &mut egui::Ui,
        title: &str,
        id: &str,
        options: &[(T, String)],
        selected: &mut BTreeSet<T>,
    ) -> bool {
        let mut changed = false;
        ui.label(RichText::new(title).size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt(format!("filter_{id}"))
                    .max_height(140.0)
                    .show(ui, |ui| {
                        for (value, label) in options {
                            let mut checked = selected.contains(value);
                            if ui.checkbox(&mut checked, label.as_str()).changed() {
                                set_member(selected, value, checked);
                                changed = true;
                            }
                        }
                    });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                select_all(selected, options.iter().map(|(v, _)| v.clone()));
                changed = true;
            }
            if ui.small_button("Clear All").clicked() {
                selected.clear();
                changed = true;
            }
        });
        ui.add_space(10.0);

        changed
    }
}

fn set_member<T: Ord + Clone>(set: &mut BTreeSet<T>, value: &T, on: bool) {
    if on {
        set.insert(value.clone());
    } else {
        set.remove(value);
    }
}

fn select_all<T: Ord>(set: &mut BTreeSet<T>, values: impl IntoIterator<Item = T>) {
    set.extend(values);
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    DashboardChanged,
    FilterChanged,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TidyRecord;
    use chrono::NaiveDate;

    fn set() -> TidySet {
        TidySet::new(vec![
            TidyRecord::new(NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(), "LA", 1.0),
            TidyRecord::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), "NY", 2.0),
            TidyRecord::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), "SEA", 3.0),
        ])
    }

    #[test]
    fn test_update_options_uses_dashboard_default() {
        let mut panel = ControlPanel::new(DashboardKind::Port);
        panel.update_options(&set());

        assert_eq!(panel.options.years, vec![2020, 2021]);
        assert_eq!(panel.options.categories, vec!["LA", "NY", "SEA"]);
        assert_eq!(panel.filter.categories.len(), 2);
        assert_eq!(panel.status, "3 records, 3 ports");

        let mut rail = ControlPanel::new(DashboardKind::Rail);
        rail.update_options(&set());
        assert_eq!(rail.filter.categories.len(), 3);
    }

    #[test]
    fn test_set_error_clears_options() {
        let mut panel = ControlPanel::new(DashboardKind::Rail);
        panel.update_options(&set());
        panel.set_error("Failed to load rail.csv: file not found");

        assert!(panel.options.years.is_empty());
        assert!(panel.filter.years.is_empty());
        assert!(panel.error.is_some());
    }

    #[test]
    fn test_membership_helpers() {
        let mut selected: BTreeSet<u32> = BTreeSet::new();
        set_member(&mut selected, &3, true);
        set_member(&mut selected, &5, true);
        set_member(&mut selected, &3, false);
        assert_eq!(selected.iter().copied().collect::<Vec<_>>(), vec![5]);

        select_all(&mut selected, [1, 5, 7]);
        assert_eq!(selected.len(), 3);
    }
}
