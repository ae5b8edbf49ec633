//! Tidy data model: one observation per date and category.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use std::collections::HashSet;
use std::fmt;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short English month name for a month number (1-12).
pub fn month_abbrev(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_ABBREVIATIONS.get(idx as usize))
        .copied()
}

/// Month number for a short or full English month name, case-insensitive.
pub fn month_from_name(name: &str) -> Option<u32> {
    name.trim()
        .parse::<chrono::Month>()
        .ok()
        .map(|m| m.number_from_month())
}

/// Meteorological season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    /// Season for a month number. `None` only for numbers outside 1-12.
    pub fn from_month(month: u32) -> Option<Season> {
        match month {
            12 | 1 | 2 => Some(Season::Winter),
            3..=5 => Some(Season::Spring),
            6..=8 => Some(Season::Summer),
            9..=11 => Some(Season::Fall),
            _ => None,
        }
    }

    /// Season of a calendar date. Total: every date has a month in 1-12.
    pub fn of(date: NaiveDate) -> Season {
        Season::from_month(date.month()).unwrap_or(Season::Winter)
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single observation. Year, month and season are derived from `date` on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct TidyRecord {
    pub date: NaiveDate,
    pub category: String,
    /// Secondary category (the commodity of a rail row). Ports have none.
    pub detail: Option<String>,
    pub value: f64,
}

impl TidyRecord {
    pub fn new(date: NaiveDate, category: impl Into<String>, value: f64) -> Self {
        Self {
            date,
            category: category.into(),
            detail: None,
            value,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn month_name(&self) -> &'static str {
        month_abbrev(self.month()).unwrap_or("")
    }

    pub fn season(&self) -> Season {
        Season::of(self.date)
    }
}

/// Immutable set of tidy records for one dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidySet {
    records: Vec<TidyRecord>,
}

impl TidySet {
    pub fn new(records: Vec<TidyRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TidyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Categories in order of first appearance.
    pub fn categories(&self) -> Vec<String> {
        unique_in_order(self.records.iter().map(|r| r.category.as_str()))
    }

    /// Detail values in order of first appearance.
    pub fn details(&self) -> Vec<String> {
        unique_in_order(self.records.iter().filter_map(|r| r.detail.as_deref()))
    }

    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.records.iter().map(TidyRecord::year).collect();
        years.into_iter().collect()
    }

    pub fn months(&self) -> Vec<u32> {
        let months: BTreeSet<u32> = self.records.iter().map(TidyRecord::month).collect();
        months.into_iter().collect()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }
}

fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_every_month_has_exactly_one_season() {
        for month in 1..=12 {
            let season = Season::from_month(month).expect("month in range");
            assert_eq!(Season::from_month(month), Some(season));
            assert_eq!(Season::of(date(2021, month, 1)), season);
        }
    }

    #[test]
    fn test_season_buckets() {
        assert_eq!(Season::from_month(12), Some(Season::Winter));
        assert_eq!(Season::from_month(1), Some(Season::Winter));
        assert_eq!(Season::from_month(2), Some(Season::Winter));
        assert_eq!(Season::from_month(4), Some(Season::Spring));
        assert_eq!(Season::from_month(7), Some(Season::Summer));
        assert_eq!(Season::from_month(10), Some(Season::Fall));
    }

    #[test]
    fn test_season_of_date_at_boundaries() {
        assert_eq!(Season::of(date(2021, 2, 28)), Season::Winter);
        assert_eq!(Season::of(date(2021, 3, 1)), Season::Spring);
        assert_eq!(Season::of(date(2021, 8, 31)), Season::Summer);
        assert_eq!(Season::of(date(2021, 11, 30)), Season::Fall);
        assert_eq!(Season::of(date(2021, 12, 1)), Season::Winter);
    }

    #[test]
    fn test_season_out_of_range_month() {
        assert_eq!(Season::from_month(0), None);
        assert_eq!(Season::from_month(13), None);
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_abbrev(1), Some("Jan"));
        assert_eq!(month_abbrev(12), Some("Dec"));
        assert_eq!(month_abbrev(0), None);
        assert_eq!(month_abbrev(13), None);
        assert_eq!(month_from_name("September"), Some(9));
        assert_eq!(month_from_name("sep"), Some(9));
        assert_eq!(month_from_name("Ju"), None);
        assert_eq!(month_from_name("Smarch"), None);
    }

    #[test]
    fn test_derived_fields_follow_date() {
        let rec = TidyRecord::new(date(2021, 12, 31), "LA", 10.0);
        assert_eq!(rec.year(), 2021);
        assert_eq!(rec.month(), 12);
        assert_eq!(rec.month_name(), "Dec");
        assert_eq!(rec.season(), Season::Winter);
    }

    #[test]
    fn test_tidy_set_options() {
        let set = TidySet::new(vec![
            TidyRecord::new(date(2022, 3, 1), "NY", 1.0).with_detail("Coal"),
            TidyRecord::new(date(2021, 1, 1), "LA", 2.0).with_detail("Grain"),
            TidyRecord::new(date(2021, 3, 1), "NY", 3.0).with_detail("Coal"),
        ]);
        assert_eq!(set.categories(), vec!["NY", "LA"]);
        assert_eq!(set.details(), vec!["Coal", "Grain"]);
        assert_eq!(set.years(), vec![2021, 2022]);
        assert_eq!(set.months(), vec![1, 3]);
        assert_eq!(set.date_range(), Some((date(2021, 1, 1), date(2022, 3, 1))));
    }
}
