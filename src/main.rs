//! Freight Dash - seasonal dashboard for US port and rail freight data.

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use freight_dash::charts::StaticChartRenderer;
use freight_dash::config::{Command, ReportArgs, Settings};
use freight_dash::dashboard::{DashboardKind, DashboardView};
use freight_dash::data::SourceSpec;
use freight_dash::gui::{FreightApp, LoadedDataset};
use freight_dash::{load_dataset, logging, report};
use std::sync::Arc;
use tracing::error;

fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    logging::setup_logging(&settings.log_level)?;

    match settings.command() {
        Command::Gui => run_gui(&settings),
        Command::Report(args) => run_report(&settings, &args),
    }
}

/// Load failures become a message shown in place of the dashboard.
fn load_for_gui(spec: &SourceSpec) -> LoadedDataset {
    load_dataset(spec).map(|(set, _)| Arc::new(set)).map_err(|e| {
        error!("{e}");
        e.to_string()
    })
}

fn run_gui(settings: &Settings) -> anyhow::Result<()> {
    let rail = load_for_gui(&settings.rail_source());
    let port = load_for_gui(&settings.port_source());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Freight Dash"),
        ..Default::default()
    };

    eframe::run_native(
        "Freight Dash",
        options,
        Box::new(move |cc| Ok(Box::new(FreightApp::new(cc, rail, port)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {e}"))
}

fn run_report(settings: &Settings, args: &ReportArgs) -> anyhow::Result<()> {
    let kind = DashboardKind::from(args.dashboard);
    let spec = match kind {
        DashboardKind::Rail => settings.rail_source(),
        DashboardKind::Port => settings.port_source(),
    };
    let (set, transform) = load_dataset(&spec)?;
    eprintln!(
        "{} records ({} dropped: {} bad dates, {} bad values)",
        transform.records_out,
        transform.dropped(),
        transform.bad_dates,
        transform.bad_values
    );

    let view = DashboardView::build(kind, &set, &args.filter(&set));
    print!("{}", report::render_text(&view));

    if let Some(dir) = &args.render_dir {
        let written = StaticChartRenderer::default()
            .render_view(&view, dir)
            .with_context(|| format!("rendering charts into {}", dir.display()))?;
        eprintln!("Wrote {} chart(s) to {}", written.len(), dir.display());
    }
    Ok(())
}
