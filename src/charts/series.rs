//! Chart-ready values built from rollups.
//! Both the interactive plotter and the static renderer draw from these.

use crate::stats::{Dimension, GroupValue, PivotTable, Rollup};
use chrono::NaiveDate;
use std::f64::consts::TAU;

/// Largest bubble radius, in the unit the caller draws with.
pub const BUBBLE_SIZE_MAX: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    StackedBar,
    Pie,
    Bubble,
}

/// One chart: what to draw and the rollups it is drawn from.
///
/// `rollups` carry one key (`x`) or two keys (`x`, `series`).
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x: Dimension,
    pub series: Option<Dimension>,
    pub x_label: String,
    pub y_label: String,
    pub rollups: Vec<Rollup>,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.rollups.is_empty()
    }

    /// Grid shown in the "Data" view.
    pub fn table(&self) -> DataTable {
        match self.series {
            Some(series) => DataTable::Pivot(PivotTable::from_rollups(self.x, series, &self.rollups)),
            None => DataTable::Totals(
                self.rollups
                    .iter()
                    .filter_map(|r| r.keys.first().map(|k| (k.clone(), r.total)))
                    .collect(),
            ),
        }
    }
}

/// Tabular form of a chart.
#[derive(Debug, Clone, PartialEq)]
pub enum DataTable {
    Pivot(PivotTable),
    Totals(Vec<(GroupValue, f64)>),
}

impl DataTable {
    /// Header row followed by body rows, all as display strings.
    pub fn to_rows(&self, value_label: &str) -> (Vec<String>, Vec<Vec<String>>) {
        match self {
            DataTable::Pivot(pivot) => {
                let mut header = vec![pivot.row_dimension.label().to_string()];
                header.extend(pivot.columns.iter().map(ToString::to_string));
                let body = pivot
                    .rows
                    .iter()
                    .zip(&pivot.cells)
                    .map(|(row, cells)| {
                        let mut line = vec![row.to_string()];
                        line.extend(cells.iter().map(|v| format_value(*v)));
                        line
                    })
                    .collect();
                (header, body)
            }
            DataTable::Totals(totals) => {
                let header = vec![String::new(), value_label.to_string()];
                let body = totals
                    .iter()
                    .map(|(key, total)| vec![key.to_string(), format_value(*total)])
                    .collect();
                (header, body)
            }
        }
    }
}

/// Compact number formatting for tables and labels.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// A named polyline. Only keys present in the rollups produce points, so gaps stay gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

/// Build one line per series key from `(x, series)` rollups with a numeric x.
pub fn line_series(rollups: &[Rollup]) -> Vec<LineSeries> {
    let mut lines: Vec<LineSeries> = Vec::new();
    for rollup in rollups {
        let [x, series, ..] = rollup.keys.as_slice() else {
            continue;
        };
        let Some(x) = x.as_axis_value() else {
            continue;
        };
        let name = series.to_string();
        match lines.iter_mut().find(|l| l.name == name) {
            Some(line) => line.points.push([x, rollup.total]),
            None => lines.push(LineSeries {
                name,
                points: vec![[x, rollup.total]],
            }),
        }
    }
    for line in &mut lines {
        line.points.sort_by(|a, b| a[0].total_cmp(&b[0]));
    }
    lines
}

/// One stacked layer: a value per x category.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSegment {
    pub name: String,
    pub values: Vec<f64>,
}

/// Bars at x positions 0..n, each stacked from `segments` in order.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBars {
    pub x_labels: Vec<String>,
    pub segments: Vec<BarSegment>,
}

impl StackedBars {
    pub fn from_pivot(pivot: &PivotTable) -> Self {
        let segments = pivot
            .columns
            .iter()
            .enumerate()
            .map(|(c, column)| BarSegment {
                name: column.to_string(),
                values: pivot.cells.iter().map(|row| row[c]).collect(),
            })
            .collect();
        Self {
            x_labels: pivot.rows.iter().map(ToString::to_string).collect(),
            segments,
        }
    }

    /// Height of each full bar.
    pub fn totals(&self) -> Vec<f64> {
        (0..self.x_labels.len())
            .map(|i| self.segments.iter().map(|s| s.values[i]).sum())
            .collect()
    }

    /// Base of `segment` at each x: the sum of the segments stacked below it.
    pub fn offsets(&self, segment: usize) -> Vec<f64> {
        (0..self.x_labels.len())
            .map(|i| self.segments[..segment].iter().map(|s| s.values[i]).sum())
            .collect()
    }
}

/// A pie wedge, angles in radians clockwise from 12 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub fraction: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Wedges for single-key rollups. Non-positive totals are left out.
pub fn pie_slices(rollups: &[Rollup]) -> Vec<PieSlice> {
    let entries: Vec<(String, f64)> = rollups
        .iter()
        .filter(|r| r.total > 0.0)
        .filter_map(|r| r.keys.first().map(|k| (k.to_string(), r.total)))
        .collect();
    let sum: f64 = entries.iter().map(|(_, v)| v).sum();
    if sum <= 0.0 {
        return Vec::new();
    }

    let mut angle = 0.0;
    entries
        .into_iter()
        .map(|(label, value)| {
            let fraction = value / sum;
            let start_angle = angle;
            angle += fraction * TAU;
            PieSlice {
                label,
                value,
                fraction,
                start_angle,
                end_angle: angle,
            }
        })
        .collect()
}

/// A bubble placed at category index `x` with an area proportional to its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub label: String,
    pub x: f64,
    pub value: f64,
    pub radius: f64,
}

pub fn bubbles(rollups: &[Rollup], size_max: f64) -> Vec<Bubble> {
    let max = rollups.iter().map(|r| r.total).fold(0.0_f64, f64::max);
    rollups
        .iter()
        .filter(|r| r.total.is_finite() && r.total > 0.0)
        .enumerate()
        .filter_map(|(i, r)| {
            let label = r.keys.first()?.to_string();
            Some(Bubble {
                label,
                x: i as f64,
                value: r.total,
                radius: size_max * (r.total / max).sqrt(),
            })
        })
        .collect()
}

/// "Nice" tick step for an axis covering `range`.
pub fn nice_step(range: f64, target_steps: usize) -> f64 {
    if range <= 0.0 || target_steps == 0 {
        return 1.0;
    }
    let raw = range / target_steps as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Padded y range covering every value, starting at zero for non-negative data.
pub fn value_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_infinite() {
        return (0.0, 1.0);
    }
    let min = min.min(0.0);
    let pad = ((max - min) * 0.05).max(1.0);
    (min, max + pad)
}

/// Axis label for a date position in days from the common era.
pub fn date_tick(value: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(value.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Label for an integer x position, blank between categories.
pub fn category_tick(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Season;
    use chrono::Datelike;

    fn text(s: &str) -> GroupValue {
        GroupValue::Text(s.to_string())
    }

    fn rollup(keys: Vec<GroupValue>, total: f64) -> Rollup {
        Rollup { keys, total }
    }

    #[test]
    fn test_line_series_keeps_gaps() {
        let d1 = GroupValue::Date(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        let d2 = GroupValue::Date(NaiveDate::from_ymd_opt(2021, 2, 1).unwrap());
        let rollups = vec![
            rollup(vec![d1.clone(), text("LA")], 1.0),
            rollup(vec![d1.clone(), text("NY")], 2.0),
            rollup(vec![d2.clone(), text("LA")], 3.0),
        ];
        let lines = line_series(&rollups);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "LA");
        assert_eq!(lines[0].points.len(), 2);
        assert_eq!(lines[1].name, "NY");
        assert_eq!(lines[1].points, vec![[d1.as_axis_value().unwrap(), 2.0]]);
        assert!(lines[0].points[0][0] < lines[0].points[1][0]);
    }

    #[test]
    fn test_stacked_bars_offsets() {
        let pivot = PivotTable::from_rollups(
            Dimension::Category,
            Dimension::Season,
            &[
                rollup(vec![text("LA"), GroupValue::Season(Season::Winter)], 10.0),
                rollup(vec![text("LA"), GroupValue::Season(Season::Summer)], 5.0),
                rollup(vec![text("NY"), GroupValue::Season(Season::Summer)], 7.0),
            ],
        );
        let bars = StackedBars::from_pivot(&pivot);

        assert_eq!(bars.x_labels, vec!["LA", "NY"]);
        assert_eq!(bars.segments[0].name, "Winter");
        assert_eq!(bars.segments[0].values, vec![10.0, 0.0]);
        assert_eq!(bars.offsets(0), vec![0.0, 0.0]);
        assert_eq!(bars.offsets(1), vec![10.0, 0.0]);
        assert_eq!(bars.totals(), vec![15.0, 7.0]);
    }

    #[test]
    fn test_pie_slices_cover_full_circle() {
        let rollups = vec![
            rollup(vec![GroupValue::Season(Season::Winter)], 30.0),
            rollup(vec![GroupValue::Season(Season::Spring)], 0.0),
            rollup(vec![GroupValue::Season(Season::Summer)], 10.0),
        ];
        let slices = pie_slices(&rollups);

        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, "Winter");
        assert!((slices[0].fraction - 0.75).abs() < 1e-12);
        assert_eq!(slices[0].start_angle, 0.0);
        assert!((slices[1].end_angle - TAU).abs() < 1e-12);
    }

    #[test]
    fn test_pie_slices_empty_when_nothing_positive() {
        assert!(pie_slices(&[rollup(vec![text("LA")], 0.0)]).is_empty());
        assert!(pie_slices(&[]).is_empty());
    }

    #[test]
    fn test_bubbles_scale_by_area() {
        let rollups = vec![rollup(vec![text("LA")], 400.0), rollup(vec![text("NY")], 100.0)];
        let out = bubbles(&rollups, BUBBLE_SIZE_MAX);

        assert_eq!(out[0].radius, BUBBLE_SIZE_MAX);
        assert!((out[1].radius - BUBBLE_SIZE_MAX / 2.0).abs() < 1e-12);
        assert_eq!(out[1].x, 1.0);
    }

    #[test]
    fn test_totals_table_rows() {
        let spec = ChartSpec {
            id: "pie".to_string(),
            title: "Pie".to_string(),
            kind: ChartKind::Pie,
            x: Dimension::Season,
            series: None,
            x_label: "Season".to_string(),
            y_label: "Carloads".to_string(),
            rollups: vec![rollup(vec![GroupValue::Season(Season::Fall)], 12.5)],
        };
        let (header, body) = spec.table().to_rows("Carloads");
        assert_eq!(header, vec!["", "Carloads"]);
        assert_eq!(body, vec![vec!["Fall".to_string(), "12.50".to_string()]]);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1200.0), "1200");
        assert_eq!(format_value(33.333), "33.33");
    }

    #[test]
    fn test_nice_step_and_range() {
        assert_eq!(nice_step(100.0, 5), 20.0);
        assert_eq!(nice_step(0.0, 5), 1.0);
        assert_eq!(value_range(Vec::<f64>::new()), (0.0, 1.0));
        let (lo, hi) = value_range([10.0, 200.0]);
        assert_eq!(lo, 0.0);
        assert!(hi > 200.0);
    }

    #[test]
    fn test_axis_ticks() {
        let labels = vec!["LA".to_string(), "NY".to_string()];
        assert_eq!(category_tick(&labels, 1.0), "NY");
        assert_eq!(category_tick(&labels, 0.5), "");
        assert_eq!(category_tick(&labels, 2.0), "");
        assert_eq!(category_tick(&labels, -1.0), "");

        let days = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap().num_days_from_ce();
        assert_eq!(date_tick(days as f64), "2021-03");
    }
}
