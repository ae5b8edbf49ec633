//! Rollup Calculator Module
//! Grouped sums over tidy records, pivot tables and row shares.

use crate::data::model::{month_abbrev, Season, TidyRecord};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A field records can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Date,
    Year,
    Month,
    Season,
    Category,
    Detail,
}

impl Dimension {
    /// Group key of a record. `None` when the record has no value for this dimension.
    pub fn key(self, record: &TidyRecord) -> Option<GroupValue> {
        match self {
            Dimension::Date => Some(GroupValue::Date(record.date)),
            Dimension::Year => Some(GroupValue::Year(record.year())),
            Dimension::Month => Some(GroupValue::Month(record.month())),
            Dimension::Season => Some(GroupValue::Season(record.season())),
            Dimension::Category => Some(GroupValue::Text(record.category.clone())),
            Dimension::Detail => record.detail.clone().map(GroupValue::Text),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Date => "Date",
            Dimension::Year => "Year",
            Dimension::Month => "Month",
            Dimension::Season => "Season",
            Dimension::Category => "Category",
            Dimension::Detail => "Detail",
        }
    }
}

/// One component of a group key. Orders dates, years and months numerically,
/// seasons Winter to Fall and text lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupValue {
    Date(NaiveDate),
    Year(i32),
    Month(u32),
    Season(Season),
    Text(String),
}

impl GroupValue {
    /// Position on a numeric axis: days since CE for dates, the number itself otherwise.
    pub fn as_axis_value(&self) -> Option<f64> {
        use chrono::Datelike;
        match self {
            GroupValue::Date(d) => Some(d.num_days_from_ce() as f64),
            GroupValue::Year(y) => Some(*y as f64),
            GroupValue::Month(m) => Some(*m as f64),
            _ => None,
        }
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            GroupValue::Year(y) => write!(f, "{}", y),
            GroupValue::Month(m) => match month_abbrev(*m) {
                Some(name) => f.write_str(name),
                None => write!(f, "{}", m),
            },
            GroupValue::Season(s) => write!(f, "{}", s),
            GroupValue::Text(t) => f.write_str(t),
        }
    }
}

/// Sum of values sharing a group key.
#[derive(Debug, Clone, PartialEq)]
pub struct Rollup {
    pub keys: Vec<GroupValue>,
    pub total: f64,
}

/// Two-dimension rollup laid out as a grid. Absent cells are 0.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub row_dimension: Dimension,
    pub column_dimension: Dimension,
    pub rows: Vec<GroupValue>,
    pub columns: Vec<GroupValue>,
    pub cells: Vec<Vec<f64>>,
}

impl PivotTable {
    /// Lay out two-key rollups as a grid. Rollups with fewer keys are ignored.
    pub fn from_rollups(row: Dimension, column: Dimension, rollups: &[Rollup]) -> PivotTable {
        let pairs: Vec<(&GroupValue, &GroupValue, f64)> = rollups
            .iter()
            .filter_map(|r| match r.keys.as_slice() {
                [row_key, column_key, ..] => Some((row_key, column_key, r.total)),
                _ => None,
            })
            .collect();

        let rows: Vec<GroupValue> = pairs
            .iter()
            .map(|(r, _, _)| (*r).clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns: Vec<GroupValue> = pairs
            .iter()
            .map(|(_, c, _)| (*c).clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = vec![vec![0.0; columns.len()]; rows.len()];
        for (row_key, column_key, total) in pairs {
            let r = rows.binary_search(row_key);
            let c = columns.binary_search(column_key);
            if let (Ok(r), Ok(c)) = (r, c) {
                cells[r][c] += total;
            }
        }

        PivotTable {
            row_dimension: row,
            column_dimension: column,
            rows,
            columns,
            cells,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn get(&self, row: &GroupValue, column: &GroupValue) -> Option<f64> {
        let r = self.rows.iter().position(|v| v == row)?;
        let c = self.columns.iter().position(|v| v == column)?;
        Some(self.cells[r][c])
    }

    pub fn row_totals(&self) -> Vec<f64> {
        self.cells.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn column_totals(&self) -> Vec<f64> {
        (0..self.columns.len())
            .map(|c| self.cells.iter().map(|row| row[c]).sum())
            .collect()
    }

    /// Each row as a percentage of its own total. Rows totalling 0 stay 0.
    pub fn row_shares(&self) -> PivotTable {
        let cells = self
            .cells
            .iter()
            .map(|row| {
                let total: f64 = row.iter().sum();
                row.iter()
                    .map(|v| if total == 0.0 { 0.0 } else { v * 100.0 / total })
                    .collect()
            })
            .collect();
        PivotTable {
            cells,
            ..self.clone()
        }
    }

    /// Flatten back into two-key rollups, one per cell.
    pub fn to_rollups(&self) -> Vec<Rollup> {
        self.rows
            .iter()
            .zip(&self.cells)
            .flat_map(|(row, cells)| {
                self.columns.iter().zip(cells).map(move |(column, total)| Rollup {
                    keys: vec![row.clone(), column.clone()],
                    total: *total,
                })
            })
            .collect()
    }
}

/// Computes rollups. Every call is a pure function of its input records.
pub struct RollupCalculator;

impl RollupCalculator {
    /// Sum values per group key tuple, sorted ascending by key.
    ///
    /// Values are summed in sorted order so the totals do not depend on input order.
    pub fn rollup(records: &[TidyRecord], dimensions: &[Dimension]) -> Vec<Rollup> {
        let mut groups: BTreeMap<Vec<GroupValue>, Vec<f64>> = BTreeMap::new();

        for record in records {
            let keys: Option<Vec<GroupValue>> =
                dimensions.iter().map(|dim| dim.key(record)).collect();
            if let Some(keys) = keys {
                groups.entry(keys).or_default().push(record.value);
            }
        }

        groups
            .into_iter()
            .map(|(keys, mut values)| {
                values.sort_by(f64::total_cmp);
                Rollup {
                    keys,
                    total: values.iter().sum(),
                }
            })
            .collect()
    }

    /// Totals over a single dimension.
    pub fn totals_by(records: &[TidyRecord], dimension: Dimension) -> Vec<(GroupValue, f64)> {
        Self::rollup(records, &[dimension])
            .into_iter()
            .filter_map(|r| r.keys.into_iter().next().map(|k| (k, r.total)))
            .collect()
    }

    /// Pivot a two-dimension rollup into a grid.
    pub fn pivot(records: &[TidyRecord], row: Dimension, column: Dimension) -> PivotTable {
        let rollups = Self::rollup(records, &[row, column]);
        PivotTable::from_rollups(row, column, &rollups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(y: i32, m: u32, d: u32, cat: &str, v: f64) -> TidyRecord {
        TidyRecord::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), cat, v)
    }

    fn rail() -> Vec<TidyRecord> {
        vec![
            rec(2021, 12, 4, "BNSF", 100.0).with_detail("Coal"),
            rec(2022, 1, 8, "BNSF", 50.0).with_detail("Grain"),
            rec(2022, 1, 8, "UP", 30.0).with_detail("Coal"),
            rec(2022, 7, 2, "UP", 70.0).with_detail("Coal"),
            rec(2022, 4, 2, "CSX", 5.0),
        ]
    }

    #[test]
    fn test_december_and_january_share_winter() {
        let rollups = RollupCalculator::rollup(&rail(), &[Dimension::Season, Dimension::Category]);
        let winter_bnsf = rollups
            .iter()
            .find(|r| {
                r.keys
                    == vec![
                        GroupValue::Season(Season::Winter),
                        GroupValue::Text("BNSF".to_string()),
                    ]
            })
            .expect("winter BNSF group");
        assert_eq!(winter_bnsf.total, 150.0);
    }

    #[test]
    fn test_rollup_sorted_by_key() {
        let rollups = RollupCalculator::rollup(&rail(), &[Dimension::Year, Dimension::Season]);
        let keys: Vec<String> = rollups
            .iter()
            .map(|r| format!("{} {}", r.keys[0], r.keys[1]))
            .collect();
        assert_eq!(
            keys,
            vec!["2021 Winter", "2022 Winter", "2022 Spring", "2022 Summer"]
        );
    }

    #[test]
    fn test_rollup_invariant_under_permutation() {
        let mut records = vec![
            rec(2021, 1, 1, "LA", 0.1),
            rec(2021, 1, 2, "LA", 0.2),
            rec(2021, 1, 3, "LA", 0.3),
            rec(2021, 2, 1, "NY", 1e16),
            rec(2021, 2, 2, "NY", 1.0),
            rec(2021, 2, 3, "NY", -1e16),
        ];
        let forward = RollupCalculator::rollup(&records, &[Dimension::Category]);
        records.reverse();
        let backward = RollupCalculator::rollup(&records, &[Dimension::Category]);
        records.swap(0, 4);
        let shuffled = RollupCalculator::rollup(&records, &[Dimension::Category]);

        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_detail_rollup_skips_records_without_detail() {
        let totals = RollupCalculator::totals_by(&rail(), Dimension::Detail);
        assert_eq!(
            totals,
            vec![
                (GroupValue::Text("Coal".to_string()), 200.0),
                (GroupValue::Text("Grain".to_string()), 50.0),
            ]
        );
    }

    #[test]
    fn test_pivot_fills_missing_cells_with_zero() {
        let pivot = RollupCalculator::pivot(&rail(), Dimension::Category, Dimension::Season);

        assert_eq!(
            pivot.rows,
            vec![
                GroupValue::Text("BNSF".to_string()),
                GroupValue::Text("CSX".to_string()),
                GroupValue::Text("UP".to_string()),
            ]
        );
        assert_eq!(
            pivot.columns,
            vec![
                GroupValue::Season(Season::Winter),
                GroupValue::Season(Season::Spring),
                GroupValue::Season(Season::Summer),
            ]
        );
        assert_eq!(pivot.cells[0], vec![150.0, 0.0, 0.0]);
        assert_eq!(pivot.cells[2], vec![30.0, 0.0, 70.0]);
        assert_eq!(
            pivot.get(
                &GroupValue::Text("CSX".to_string()),
                &GroupValue::Season(Season::Spring)
            ),
            Some(5.0)
        );
        assert_eq!(pivot.row_totals(), vec![150.0, 5.0, 100.0]);
        assert_eq!(pivot.column_totals(), vec![180.0, 5.0, 70.0]);
    }

    #[test]
    fn test_row_shares() {
        let pivot = RollupCalculator::pivot(&rail(), Dimension::Category, Dimension::Season);
        let shares = pivot.row_shares();

        assert_eq!(shares.cells[0], vec![100.0, 0.0, 0.0]);
        assert_eq!(shares.cells[2], vec![30.0, 0.0, 70.0]);
        for total in shares.row_totals() {
            assert!((total - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_row_shares_zero_row() {
        let pivot = PivotTable {
            row_dimension: Dimension::Year,
            column_dimension: Dimension::Season,
            rows: vec![GroupValue::Year(2021)],
            columns: vec![GroupValue::Season(Season::Fall)],
            cells: vec![vec![0.0]],
        };
        assert_eq!(pivot.row_shares().cells, vec![vec![0.0]]);
    }

    #[test]
    fn test_to_rollups_round_trips_cells() {
        let pivot = RollupCalculator::pivot(&rail(), Dimension::Year, Dimension::Category);
        let rollups = pivot.to_rollups();
        assert_eq!(rollups.len(), pivot.rows.len() * pivot.columns.len());
        assert_eq!(
            PivotTable::from_rollups(Dimension::Year, Dimension::Category, &rollups),
            pivot
        );
    }

    #[test]
    fn test_group_value_display() {
        assert_eq!(GroupValue::Month(3).to_string(), "Mar");
        assert_eq!(GroupValue::Season(Season::Fall).to_string(), "Fall");
        assert_eq!(
            GroupValue::Date(NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()).to_string(),
            "2021-06-01"
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(RollupCalculator::rollup(&[], &[Dimension::Year]).is_empty());
        assert!(RollupCalculator::pivot(&[], Dimension::Year, Dimension::Month).is_empty());
    }
}
