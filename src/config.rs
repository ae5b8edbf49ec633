//! Command-line settings.

use crate::dashboard::DashboardKind;
use crate::data::model::month_from_name;
use crate::data::{FilterSelection, SourceShape, SourceSpec, TidySet};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_RAIL_DATA: &str = "Data/Rail_Carloadings_originated.csv";
pub const DEFAULT_PORT_DATA: &str = "Data/port_dataset.json";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Seasonal freight dashboard for US port and rail data
#[derive(Parser, Debug, Clone)]
#[command(
    name = "freight-dash",
    about = "Seasonal freight dashboard for US port and rail data",
    version
)]
pub struct Settings {
    /// Rail carloads CSV
    #[arg(long, env = "FREIGHT_RAIL_DATA", default_value = DEFAULT_RAIL_DATA)]
    pub rail_data: PathBuf,

    /// Port throughput JSON
    #[arg(long, env = "FREIGHT_PORT_DATA", default_value = DEFAULT_PORT_DATA)]
    pub port_data: PathBuf,

    /// Field holding the reporting date in the port file
    #[arg(long, default_value = "port")]
    pub port_date_column: String,

    #[arg(long, default_value = "Date")]
    pub rail_date_column: String,

    #[arg(long, default_value = "Railroad")]
    pub rail_category_column: String,

    #[arg(long, default_value = "Commodity")]
    pub rail_detail_column: String,

    #[arg(long, default_value = "Carloads")]
    pub rail_value_column: String,

    /// Logging level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Settings {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Gui)
    }

    pub fn rail_source(&self) -> SourceSpec {
        SourceSpec::new(
            self.rail_data.clone(),
            SourceShape::Long {
                date_column: self.rail_date_column.clone(),
                category_column: self.rail_category_column.clone(),
                detail_column: Some(self.rail_detail_column.clone()),
                value_column: self.rail_value_column.clone(),
            },
        )
    }

    pub fn port_source(&self) -> SourceSpec {
        SourceSpec::new(
            self.port_data.clone(),
            SourceShape::Wide {
                date_column: self.port_date_column.clone(),
            },
        )
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Open the interactive dashboard (default)
    Gui,
    /// Print a dashboard's tables to stdout
    Report(ReportArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ReportArgs {
    #[arg(long, value_enum, default_value_t = DashboardArg::Port)]
    pub dashboard: DashboardArg,

    /// Year to include; repeat for several (default: all)
    #[arg(long)]
    pub year: Vec<i32>,

    /// Month number or name to include; repeat for several (default: all)
    #[arg(long, value_parser = parse_month)]
    pub month: Vec<u32>,

    /// Port or railroad to include; repeat for several (default: dashboard default)
    #[arg(long)]
    pub category: Vec<String>,

    /// Also write PNG charts into this directory
    #[arg(long)]
    pub render_dir: Option<PathBuf>,
}

impl ReportArgs {
    /// Dashboard default selection, narrowed by whichever axes were given.
    pub fn filter(&self, set: &TidySet) -> FilterSelection {
        let mut filter = DashboardKind::from(self.dashboard).default_selection(set);
        if !self.year.is_empty() {
            filter.years = self.year.iter().copied().collect();
        }
        if !self.month.is_empty() {
            filter.months = self.month.iter().copied().collect();
        }
        if !self.category.is_empty() {
            filter.categories = self.category.iter().cloned().collect();
        }
        filter
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardArg {
    Rail,
    Port,
}

impl From<DashboardArg> for DashboardKind {
    fn from(arg: DashboardArg) -> Self {
        match arg {
            DashboardArg::Rail => DashboardKind::Rail,
            DashboardArg::Port => DashboardKind::Port,
        }
    }
}

fn parse_month(s: &str) -> Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Ok(m),
        Ok(m) => Err(format!("month must be 1-12, got {m}")),
        Err(_) => month_from_name(s).ok_or_else(|| format!("unknown month '{s}'")),
    }
}
