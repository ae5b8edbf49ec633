//! Sidebar filter selection and the notices it can produce.

use crate::data::model::{month_abbrev, TidyRecord, TidySet};
use std::collections::BTreeSet;
use std::fmt;

/// User-selected years, months and categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub years: BTreeSet<i32>,
    pub months: BTreeSet<u32>,
    pub categories: BTreeSet<String>,
}

impl FilterSelection {
    /// Every option the dataset offers.
    pub fn all(set: &TidySet) -> Self {
        Self {
            years: set.years().into_iter().collect(),
            months: set.months().into_iter().collect(),
            categories: set.categories().into_iter().collect(),
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn matches(&self, record: &TidyRecord) -> bool {
        self.years.contains(&record.year())
            && self.months.contains(&record.month())
            && self.categories.contains(&record.category)
    }

    /// Records matching the selection, in source order, plus the notice to show.
    pub fn apply(&self, set: &TidySet) -> Selection {
        let records: Vec<TidyRecord> = set
            .records()
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();

        let notice = if let Some(what) = self.first_empty_axis() {
            Some(SelectionNotice::NothingSelected(what))
        } else if records.is_empty() {
            Some(SelectionNotice::NoData)
        } else {
            let present: BTreeSet<&str> = records.iter().map(|r| r.category.as_str()).collect();
            let missing: Vec<String> = self
                .categories
                .iter()
                .filter(|c| !present.contains(c.as_str()))
                .cloned()
                .collect();
            (!missing.is_empty()).then_some(SelectionNotice::PartialData { missing })
        };

        Selection { records, notice }
    }

    fn first_empty_axis(&self) -> Option<FilterAxis> {
        if self.years.is_empty() {
            Some(FilterAxis::Year)
        } else if self.months.is_empty() {
            Some(FilterAxis::Month)
        } else if self.categories.is_empty() {
            Some(FilterAxis::Category)
        } else {
            None
        }
    }

    /// Short human summary, e.g. for log lines.
    pub fn describe(&self) -> String {
        let months: Vec<&str> = self
            .months
            .iter()
            .filter_map(|m| month_abbrev(*m))
            .collect();
        format!(
            "years={:?} months=[{}] categories={}",
            self.years,
            months.join(","),
            self.categories.len()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAxis {
    Year,
    Month,
    Category,
}

/// Why a section shows a notice instead of, or next to, its charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionNotice {
    /// One of the filters has nothing ticked.
    NothingSelected(FilterAxis),
    /// The filters are set but nothing matches.
    NoData,
    /// Some selected categories have no rows in range; the rest still render.
    PartialData { missing: Vec<String> },
}

impl SelectionNotice {
    /// Whether charts can still be drawn alongside the notice.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, SelectionNotice::PartialData { .. })
    }
}

impl fmt::Display for SelectionNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionNotice::NothingSelected(FilterAxis::Year) => {
                write!(f, "Please select at least one year.")
            }
            SelectionNotice::NothingSelected(FilterAxis::Month) => {
                write!(f, "Please select at least one month.")
            }
            SelectionNotice::NothingSelected(FilterAxis::Category) => {
                write!(f, "Please select at least one category.")
            }
            SelectionNotice::NoData => write!(f, "No data available for the selected filters."),
            SelectionNotice::PartialData { missing } => write!(
                f,
                "The following have no data for the selected period: {}",
                missing.join(", ")
            ),
        }
    }
}

/// Result of applying a [`FilterSelection`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub records: Vec<TidyRecord>,
    pub notice: Option<SelectionNotice>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Categories present in the subset, in order of first appearance.
    pub fn present_categories(&self) -> Vec<String> {
        TidySet::new(self.records.clone()).categories()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(y: i32, m: u32, cat: &str, v: f64) -> TidyRecord {
        TidyRecord::new(NaiveDate::from_ymd_opt(y, m, 1).unwrap(), cat, v)
    }

    fn sample() -> TidySet {
        TidySet::new(vec![
            rec(2020, 1, "LA", 1.0),
            rec(2021, 1, "NY", 2.0),
            rec(2021, 6, "LA", 3.0),
            rec(2021, 6, "NY", 4.0),
        ])
    }

    #[test]
    fn test_full_selection_is_identity() {
        let set = sample();
        let selection = FilterSelection::all(&set).apply(&set);
        assert_eq!(selection.records, set.records().to_vec());
        assert_eq!(selection.notice, None);
    }

    #[test]
    fn test_empty_categories_yield_empty_subset() {
        let set = sample();
        let filter = FilterSelection::all(&set).with_categories(Vec::<String>::new());
        let selection = filter.apply(&set);

        assert!(selection.is_empty());
        assert_eq!(
            selection.notice,
            Some(SelectionNotice::NothingSelected(FilterAxis::Category))
        );
    }

    #[test]
    fn test_empty_months_triggers_select_notice() {
        let set = sample();
        let mut filter = FilterSelection::all(&set);
        filter.years = [2021].into_iter().collect();
        filter.months.clear();
        let selection = filter.apply(&set);

        assert!(selection.is_empty());
        let notice = selection.notice.expect("notice");
        assert_eq!(notice.to_string(), "Please select at least one month.");
        assert!(notice.is_blocking());
    }

    #[test]
    fn test_filter_preserves_source_order() {
        let set = sample();
        let mut filter = FilterSelection::all(&set);
        filter.years = [2021].into_iter().collect();
        let selection = filter.apply(&set);

        let values: Vec<f64> = selection.records.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_partial_selection_lists_missing_categories() {
        let set = sample();
        let mut filter = FilterSelection::all(&set).with_categories(["LA", "NY", "SEA"]);
        filter.years = [2020].into_iter().collect();
        let selection = filter.apply(&set);

        assert_eq!(selection.present_categories(), vec!["LA"]);
        let notice = selection.notice.expect("notice");
        assert_eq!(
            notice,
            SelectionNotice::PartialData {
                missing: vec!["NY".to_string(), "SEA".to_string()]
            }
        );
        assert!(!notice.is_blocking());
    }

    #[test]
    fn test_no_matching_rows() {
        let set = sample();
        let mut filter = FilterSelection::all(&set);
        filter.years = [1999].into_iter().collect();
        let selection = filter.apply(&set);
        assert_eq!(selection.notice, Some(SelectionNotice::NoData));
    }
}
