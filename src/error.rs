//! Error types shared by the loader, the chart renderer and the binary.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a data source could not be turned into a raw dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSourceReason {
    NotFound,
    EmptyFile,
    ParseError(String),
    /// The identifier (date) column is absent, or a required long-format column is.
    MissingColumn(String),
}

impl fmt::Display for DataSourceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceReason::NotFound => write!(f, "file not found"),
            DataSourceReason::EmptyFile => write!(f, "file is empty"),
            DataSourceReason::ParseError(msg) => write!(f, "parse error: {}", msg),
            DataSourceReason::MissingColumn(name) => write!(f, "missing column '{}'", name),
        }
    }
}

/// Fatal loader failure. The pipeline halts and the message is shown instead of charts.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Failed to load {}: {reason}", path.display())]
pub struct DataSourceError {
    pub path: PathBuf,
    pub reason: DataSourceReason,
}

impl DataSourceError {
    pub fn new(path: impl Into<PathBuf>, reason: DataSourceReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, msg: impl ToString) -> Self {
        Self::new(path, DataSourceReason::ParseError(msg.to_string()))
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Nothing to render for '{0}'")]
    NoData(String),
}
