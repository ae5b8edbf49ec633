//! Data Loader Module
//! Reads the port (JSON) and rail (CSV) sources into a typed raw dataset.
//! Cells stay uncoerced here; the processor decides what parses.

use crate::error::{DataSourceError, DataSourceReason};
use polars::prelude::*;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File format of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Csv,
}

impl SourceFormat {
    /// Guess the format from the file extension. Anything but `.json` is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceFormat::Json,
            _ => SourceFormat::Csv,
        }
    }
}

/// Declared layout of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceShape {
    /// One row per date, one column per category.
    Wide { date_column: String },
    /// One row per observation with named columns.
    Long {
        date_column: String,
        category_column: String,
        detail_column: Option<String>,
        value_column: String,
    },
}

impl SourceShape {
    pub fn date_column(&self) -> &str {
        match self {
            SourceShape::Wide { date_column } | SourceShape::Long { date_column, .. } => {
                date_column
            }
        }
    }
}

/// Where and how to read one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpec {
    pub path: PathBuf,
    pub format: SourceFormat,
    pub shape: SourceShape,
}

impl SourceSpec {
    pub fn new(path: impl Into<PathBuf>, shape: SourceShape) -> Self {
        let path = path.into();
        Self {
            format: SourceFormat::from_path(&path),
            path,
            shape,
        }
    }
}

/// A single uncoerced cell.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Missing,
}

impl RawCell {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => RawCell::Missing,
            Value::Number(n) => n.as_f64().map(RawCell::Number).unwrap_or(RawCell::Missing),
            Value::String(s) => RawCell::Text(s.clone()),
            other => RawCell::Text(other.to_string()),
        }
    }

    /// Dates and labels are read as text even when the source stores them as numbers.
    fn label_from_json(value: &Value) -> Self {
        match value {
            Value::Null => RawCell::Missing,
            Value::String(s) => RawCell::Text(s.clone()),
            other => RawCell::Text(other.to_string()),
        }
    }

    /// Text content of a label cell; numbers are printed back.
    pub fn as_label(&self) -> Option<String> {
        match self {
            RawCell::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            RawCell::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// One wide row: a date and its category cells in source column order.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub date: RawCell,
    pub cells: Vec<(String, RawCell)>,
}

/// One long row.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub date: RawCell,
    pub category: RawCell,
    pub detail: Option<RawCell>,
    pub value: RawCell,
}

/// Loaded but not yet coerced dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDataset {
    Wide(Vec<WideRow>),
    Long(Vec<LongRow>),
}

impl RawDataset {
    pub fn row_count(&self) -> usize {
        match self {
            RawDataset::Wide(rows) => rows.len(),
            RawDataset::Long(rows) => rows.len(),
        }
    }
}

/// Layouts accepted for a JSON document.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    /// `[{"port": "2021-01-01", "LA": 1, ...}, ...]`
    Rows(Vec<Map<String, Value>>),
    /// `{"2021-01-01": {"LA": 1}}` or `{"port": [...], "LA": [...]}`
    Keyed(Map<String, Value>),
}

/// Reads data sources in a single fail-fast pass.
pub struct DataLoader;

impl DataLoader {
    /// Load a dataset. Nothing is returned on failure, so callers never see partial data.
    pub fn load(spec: &SourceSpec) -> Result<RawDataset, DataSourceError> {
        let path = spec.path.as_path();
        Self::check_file(path)?;

        let dataset = match spec.format {
            SourceFormat::Json => Self::load_json(path, &spec.shape)?,
            SourceFormat::Csv => Self::load_csv(path, &spec.shape)?,
        };

        if dataset.row_count() == 0 {
            return Err(DataSourceError::new(path, DataSourceReason::EmptyFile));
        }

        info!(
            path = %path.display(),
            rows = dataset.row_count(),
            "Loaded data source"
        );
        Ok(dataset)
    }

    fn check_file(path: &Path) -> Result<(), DataSourceError> {
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DataSourceError::new(path, DataSourceReason::NotFound),
            _ => DataSourceError::parse(path, e),
        })?;
        if !metadata.is_file() {
            return Err(DataSourceError::new(path, DataSourceReason::NotFound));
        }
        if metadata.len() == 0 {
            return Err(DataSourceError::new(path, DataSourceReason::EmptyFile));
        }
        Ok(())
    }

    /// Load a JSON document in any of the accepted layouts.
    pub fn load_json(path: &Path, shape: &SourceShape) -> Result<RawDataset, DataSourceError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DataSourceError::parse(path, e))?;
        if content.trim().is_empty() {
            return Err(DataSourceError::new(path, DataSourceReason::EmptyFile));
        }
        Self::parse_json(&content, shape).map_err(|reason| DataSourceError::new(path, reason))
    }

    /// Parse JSON text. Split out from [`load_json`](Self::load_json) so layouts can be
    /// exercised without touching the filesystem.
    pub fn parse_json(content: &str, shape: &SourceShape) -> Result<RawDataset, DataSourceReason> {
        let document: JsonDocument = serde_json::from_str(content)
            .map_err(|e| DataSourceReason::ParseError(e.to_string()))?;

        let rows = match document {
            JsonDocument::Rows(rows) => rows,
            JsonDocument::Keyed(map) => Self::keyed_to_rows(map, shape.date_column())?,
        };
        debug!(rows = rows.len(), "Parsed JSON rows");

        match shape {
            SourceShape::Wide { date_column } => Self::json_wide(rows, date_column),
            SourceShape::Long {
                date_column,
                category_column,
                detail_column,
                value_column,
            } => Self::json_long(
                rows,
                date_column,
                category_column,
                detail_column.as_deref(),
                value_column,
            ),
        }
    }

    /// Turn a date-keyed or column-oriented object into row objects.
    fn keyed_to_rows(
        map: Map<String, Value>,
        date_column: &str,
    ) -> Result<Vec<Map<String, Value>>, DataSourceReason> {
        if let Some(Value::Array(dates)) = map.get(date_column) {
            let height = dates.len();
            let mut rows: Vec<Map<String, Value>> = vec![Map::new(); height];
            for (column, values) in &map {
                let Value::Array(values) = values else {
                    return Err(DataSourceReason::ParseError(format!(
                        "column '{}' is not an array",
                        column
                    )));
                };
                if values.len() != height {
                    return Err(DataSourceReason::ParseError(format!(
                        "column '{}' has {} values, expected {}",
                        column,
                        values.len(),
                        height
                    )));
                }
                for (row, value) in rows.iter_mut().zip(values) {
                    row.insert(column.clone(), value.clone());
                }
            }
            return Ok(rows);
        }

        if map.values().all(Value::is_object) {
            let rows = map
                .into_iter()
                .map(|(date, fields)| {
                    let mut row = Map::new();
                    row.insert(date_column.to_string(), Value::String(date));
                    if let Value::Object(fields) = fields {
                        row.extend(fields);
                    }
                    row
                })
                .collect();
            return Ok(rows);
        }

        Err(DataSourceReason::MissingColumn(date_column.to_string()))
    }

    fn json_wide(
        rows: Vec<Map<String, Value>>,
        date_column: &str,
    ) -> Result<RawDataset, DataSourceReason> {
        if !rows.is_empty() && !rows.iter().any(|row| row.contains_key(date_column)) {
            return Err(DataSourceReason::MissingColumn(date_column.to_string()));
        }

        let wide = rows
            .into_iter()
            .map(|row| {
                let date = row
                    .get(date_column)
                    .map(RawCell::label_from_json)
                    .unwrap_or(RawCell::Missing);
                let cells = row
                    .iter()
                    .filter(|(name, _)| name.as_str() != date_column)
                    .map(|(name, value)| (name.clone(), RawCell::from_json(value)))
                    .collect();
                WideRow { date, cells }
            })
            .collect();
        Ok(RawDataset::Wide(wide))
    }

    fn json_long(
        rows: Vec<Map<String, Value>>,
        date_column: &str,
        category_column: &str,
        detail_column: Option<&str>,
        value_column: &str,
    ) -> Result<RawDataset, DataSourceReason> {
        let required = [Some(date_column), Some(category_column), detail_column, Some(value_column)];
        for name in required.into_iter().flatten() {
            if !rows.is_empty() && !rows.iter().any(|row| row.contains_key(name)) {
                return Err(DataSourceReason::MissingColumn(name.to_string()));
            }
        }

        let label = |row: &Map<String, Value>, name: &str| {
            row.get(name)
                .map(RawCell::label_from_json)
                .unwrap_or(RawCell::Missing)
        };
        let long = rows
            .iter()
            .map(|row| LongRow {
                date: label(row, date_column),
                category: label(row, category_column),
                detail: detail_column.map(|name| label(row, name)),
                value: row
                    .get(value_column)
                    .map(RawCell::from_json)
                    .unwrap_or(RawCell::Missing),
            })
            .collect();
        Ok(RawDataset::Long(long))
    }

    /// Load a CSV file using Polars. Every column is read back as text.
    pub fn load_csv(path: &Path, shape: &SourceShape) -> Result<RawDataset, DataSourceError> {
        // No schema inference: a guessed integer column would null later floats.
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|e| DataSourceError::parse(path, e))?;

        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        debug!(
            path = %path.display(),
            rows = df.height(),
            columns = columns.len(),
            "Read CSV"
        );

        let require = |name: &str| {
            if columns.iter().any(|c| c == name) {
                Ok(())
            } else {
                Err(DataSourceError::new(
                    path,
                    DataSourceReason::MissingColumn(name.to_string()),
                ))
            }
        };

        match shape {
            SourceShape::Wide { date_column } => {
                require(date_column)?;
                let dates = Self::text_column(&df, date_column)
                    .map_err(|e| DataSourceError::parse(path, e))?;

                let mut category_columns: Vec<(String, Vec<RawCell>)> = Vec::new();
                for name in columns.iter().filter(|c| *c != date_column) {
                    let cells =
                        Self::text_column(&df, name).map_err(|e| DataSourceError::parse(path, e))?;
                    category_columns.push((name.clone(), cells));
                }

                let rows = dates
                    .into_iter()
                    .enumerate()
                    .map(|(i, date)| WideRow {
                        date,
                        cells: category_columns
                            .iter()
                            .map(|(name, cells)| (name.clone(), cells[i].clone()))
                            .collect(),
                    })
                    .collect();
                Ok(RawDataset::Wide(rows))
            }
            SourceShape::Long {
                date_column,
                category_column,
                detail_column,
                value_column,
            } => {
                require(date_column)?;
                require(category_column)?;
                require(value_column)?;
                if let Some(detail) = detail_column {
                    require(detail)?;
                }

                let read = |name: &str| {
                    Self::text_column(&df, name).map_err(|e| DataSourceError::parse(path, e))
                };
                let dates = read(date_column)?;
                let categories = read(category_column)?;
                let values = read(value_column)?;
                let details = match detail_column {
                    Some(name) => Some(read(name)?),
                    None => None,
                };

                let rows = dates
                    .into_iter()
                    .zip(categories)
                    .zip(values)
                    .enumerate()
                    .map(|(i, ((date, category), value))| LongRow {
                        date,
                        category,
                        detail: details.as_ref().map(|d| d[i].clone()),
                        value,
                    })
                    .collect();
                Ok(RawDataset::Long(rows))
            }
        }
    }

    /// Cast a column to strings; nulls and blank strings become `Missing`.
    fn text_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<RawCell>> {
        let column = df.column(name)?.cast(&DataType::String)?;
        let values = column
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| match v {
                Some(s) if !s.trim().is_empty() => RawCell::Text(s.to_string()),
                _ => RawCell::Missing,
            })
            .collect();
        Ok(values)
    }
}
