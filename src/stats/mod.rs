//! Stats module - grouped rollups

mod calculator;

pub use calculator::{Dimension, GroupValue, PivotTable, Rollup, RollupCalculator};
