//! Charts module - chart data, interactive plotting and static rendering

mod plotter;
mod renderer;
pub mod series;

pub use plotter::{series_color, ChartPlotter, PALETTE};
pub use renderer::StaticChartRenderer;
pub use series::{ChartKind, ChartSpec, DataTable};
