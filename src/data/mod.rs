//! Data module - loading, reshaping and filtering

pub mod filter;
pub mod loader;
pub mod model;
pub mod processor;

pub use filter::{FilterAxis, FilterSelection, Selection, SelectionNotice};
pub use loader::{DataLoader, RawCell, RawDataset, SourceFormat, SourceShape, SourceSpec};
pub use model::{month_abbrev, Season, TidyRecord, TidySet};
pub use processor::{DataProcessor, TransformReport};
