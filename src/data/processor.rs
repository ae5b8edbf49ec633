//! Data Processor Module
//! Turns a raw dataset into tidy records: reshape, coerce, drop what does not parse.

use crate::data::loader::{LongRow, RawCell, RawDataset, WideRow};
use crate::data::model::{month_from_name, TidyRecord, TidySet};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tracing::{debug, warn};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// Counts of what the reshape kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub rows_in: usize,
    pub records_out: usize,
    /// Source rows dropped because the date did not parse.
    pub bad_dates: usize,
    /// Cells dropped because the value was missing or non-numeric.
    pub bad_values: usize,
    /// Long rows dropped because the category label was empty.
    pub missing_labels: usize,
}

impl TransformReport {
    pub fn dropped(&self) -> usize {
        self.bad_dates + self.bad_values + self.missing_labels
    }
}

/// Handles reshaping and type coercion.
pub struct DataProcessor;

impl DataProcessor {
    /// Reshape any raw dataset into tidy records.
    pub fn to_tidy(raw: &RawDataset) -> (TidySet, TransformReport) {
        let (records, report) = match raw {
            RawDataset::Wide(rows) => Self::stack_to_long(rows),
            RawDataset::Long(rows) => Self::coerce_long(rows),
        };

        if report.dropped() > 0 {
            warn!(
                bad_dates = report.bad_dates,
                bad_values = report.bad_values,
                missing_labels = report.missing_labels,
                "Dropped rows that failed coercion"
            );
        }
        debug!(
            rows_in = report.rows_in,
            records_out = report.records_out,
            "Reshaped dataset"
        );

        (TidySet::new(records), report)
    }

    /// Transform wide rows to long format (stack operation).
    ///
    /// One record per category column whose cell parses as a number. Records
    /// come out column by column in source column order, rows in order within
    /// each column.
    pub fn stack_to_long(rows: &[WideRow]) -> (Vec<TidyRecord>, TransformReport) {
        let mut report = TransformReport {
            rows_in: rows.len(),
            ..Default::default()
        };
        let mut records: Vec<TidyRecord> = Vec::new();

        let mut column_order: HashMap<&str, usize> = HashMap::new();
        for (name, _) in rows.iter().flat_map(|row| row.cells.iter()) {
            let next = column_order.len();
            column_order.entry(name.as_str()).or_insert(next);
        }

        for row in rows {
            let Some(date) = Self::coerce_date(&row.date) else {
                report.bad_dates += 1;
                continue;
            };
            for (category, cell) in &row.cells {
                match Self::parse_value(cell) {
                    Some(value) => records.push(TidyRecord::new(date, category.clone(), value)),
                    None => report.bad_values += 1,
                }
            }
        }
        records.sort_by_key(|r| column_order.get(r.category.as_str()).copied());

        report.records_out = records.len();
        (records, report)
    }

    /// Coerce rows that are already in long format.
    pub fn coerce_long(rows: &[LongRow]) -> (Vec<TidyRecord>, TransformReport) {
        let mut report = TransformReport {
            rows_in: rows.len(),
            ..Default::default()
        };
        let mut records: Vec<TidyRecord> = Vec::new();

        for row in rows {
            let Some(date) = Self::coerce_date(&row.date) else {
                report.bad_dates += 1;
                continue;
            };
            let Some(category) = row.category.as_label() else {
                report.missing_labels += 1;
                continue;
            };
            let Some(value) = Self::parse_value(&row.value) else {
                report.bad_values += 1;
                continue;
            };

            let mut record = TidyRecord::new(date, category, value);
            record.detail = row.detail.as_ref().and_then(RawCell::as_label);
            records.push(record);
        }

        report.records_out = records.len();
        (records, report)
    }

    fn coerce_date(cell: &RawCell) -> Option<NaiveDate> {
        match cell {
            RawCell::Text(text) => Self::parse_date(text),
            _ => None,
        }
    }

    /// Parse the date forms found in the source files.
    pub fn parse_date(text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(date) = DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        {
            return Some(date);
        }
        if let Some(dt) = DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        {
            return Some(dt.date());
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.date_naive());
        }

        // Month granularity: "2021-06" or "Jun 2021".
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d") {
            return Some(date);
        }
        let mut parts = text.split_whitespace();
        if let (Some(month), Some(year), None) = (parts.next(), parts.next(), parts.next()) {
            let month = month_from_name(month)?;
            let year = year.parse::<i32>().ok()?;
            return NaiveDate::from_ymd_opt(year, month, 1);
        }
        None
    }

    /// Numeric value of a cell; `None` for missing, non-numeric or non-finite values.
    pub fn parse_value(cell: &RawCell) -> Option<f64> {
        let value = match cell {
            RawCell::Number(n) => *n,
            RawCell::Text(text) => text.trim().parse::<f64>().ok()?,
            RawCell::Missing => return None,
        };
        value.is_finite().then_some(value)
    }
}
