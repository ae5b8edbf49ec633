//! Freight Dash - seasonal aggregation of US port and rail freight data.
//!
//! Loader → transformer → filter → dashboard view, with an egui front end and
//! a plotters-based static renderer.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod gui;
pub mod logging;
pub mod report;
pub mod stats;

use data::{DataLoader, DataProcessor, SourceSpec, TidySet, TransformReport};
use error::DataSourceError;
use tracing::{info, warn};

/// Load one dataset and turn it into tidy records.
pub fn load_dataset(spec: &SourceSpec) -> Result<(TidySet, TransformReport), DataSourceError> {
    let raw = DataLoader::load(spec)?;
    let (set, report) = DataProcessor::to_tidy(&raw);
    if set.is_empty() {
        warn!(path = %spec.path.display(), "no usable rows after coercion");
    }
    info!(
        path = %spec.path.display(),
        records = set.len(),
        categories = set.categories().len(),
        "dataset ready"
    );
    Ok((set, report))
}
