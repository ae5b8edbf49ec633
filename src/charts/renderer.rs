//! Static Chart Renderer
//! Writes dashboard charts to PNG files with plotters, one file per chart.

use crate::charts::series::{
    bubbles, category_tick, date_tick, line_series, nice_step, pie_slices, value_range, ChartKind,
    ChartSpec, StackedBars, BUBBLE_SIZE_MAX,
};
use crate::dashboard::DashboardView;
use crate::error::RenderError;
use crate::stats::{Dimension, PivotTable};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// Same colors as the interactive palette.
const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
    RGBColor(243, 156, 18),
    RGBColor(26, 188, 156),
    RGBColor(233, 30, 99),
    RGBColor(0, 188, 212),
    RGBColor(121, 85, 72),
    RGBColor(96, 125, 139),
];

fn color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

fn draw_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(e.to_string())
}

pub struct StaticChartRenderer {
    width: u32,
    height: u32,
}

impl Default for StaticChartRenderer {
    fn default() -> Self {
        Self::new(1000, 600)
    }
}

impl StaticChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// File a chart is written to inside `dir`.
    pub fn output_path(dir: &Path, spec: &ChartSpec) -> PathBuf {
        let stem: String = spec
            .id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        dir.join(format!("{stem}.png"))
    }

    /// Render every non-empty chart of a view. Returns the files written.
    pub fn render_view(&self, view: &DashboardView, dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(dir).map_err(|source| RenderError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::new();
        for spec in view.charts() {
            if spec.is_empty() {
                debug!(chart = %spec.id, "skipping empty chart");
                continue;
            }
            let path = Self::output_path(dir, spec);
            self.render_chart(spec, &path)?;
            written.push(path);
        }
        info!(count = written.len(), dir = %dir.display(), "rendered charts");
        Ok(written)
    }

    pub fn render_chart(&self, spec: &ChartSpec, path: &Path) -> Result<(), RenderError> {
        if spec.is_empty() {
            return Err(RenderError::NoData(spec.id.clone()));
        }
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        match spec.kind {
            ChartKind::Line => Self::draw_lines(&root, spec)?,
            ChartKind::StackedBar => Self::draw_stacked_bars(&root, spec)?,
            ChartKind::Pie => Self::draw_pie(&root, spec)?,
            ChartKind::Bubble => Self::draw_bubbles(&root, spec)?,
        }

        root.present().map_err(draw_err)?;
        debug!(chart = %spec.id, path = %path.display(), "wrote chart");
        Ok(())
    }

    fn draw_lines<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        spec: &ChartSpec,
    ) -> Result<(), RenderError>
    where
        DB::ErrorType: 'static,
    {
        let lines = line_series(&spec.rollups);
        let xs = lines.iter().flat_map(|l| l.points.iter().map(|p| p[0]));
        let (x_min, x_max) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
        let (x_min, x_max) = if x_min < x_max {
            (x_min, x_max)
        } else {
            (x_min - 1.0, x_min + 1.0)
        };
        let (y_min, y_max) = value_range(lines.iter().flat_map(|l| l.points.iter().map(|p| p[1])));
        let is_date = spec.x == Dimension::Date;

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(draw_err)?;
        chart
            .configure_mesh()
            .y_labels(y_tick_count(y_min, y_max) + 1)
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_label_formatter(&|v| {
                if is_date {
                    date_tick(*v)
                } else {
                    format!("{}", v.round() as i64)
                }
            })
            .draw()
            .map_err(draw_err)?;

        for (i, line) in lines.iter().enumerate() {
            let c = color(i);
            chart
                .draw_series(LineSeries::new(
                    line.points.iter().map(|p| (p[0], p[1])),
                    c.stroke_width(2),
                ))
                .map_err(draw_err)?
                .label(line.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], c));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_stacked_bars<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        spec: &ChartSpec,
    ) -> Result<(), RenderError>
    where
        DB::ErrorType: 'static,
    {
        let series = spec.series.ok_or_else(|| RenderError::NoData(spec.id.clone()))?;
        let bars = StackedBars::from_pivot(&PivotTable::from_rollups(spec.x, series, &spec.rollups));
        let n = bars.x_labels.len().max(1) as f64;
        let (y_min, y_max) = value_range(bars.totals());

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(n - 0.5), y_min..y_max)
            .map_err(draw_err)?;
        let x_labels = bars.x_labels.clone();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.x_labels.len().max(1))
            .y_labels(y_tick_count(y_min, y_max) + 1)
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_label_formatter(&|v| category_tick(&x_labels, *v))
            .draw()
            .map_err(draw_err)?;

        for (s, segment) in bars.segments.iter().enumerate() {
            let c = color(s);
            let offsets = bars.offsets(s);
            chart
                .draw_series(segment.values.iter().zip(offsets).enumerate().map(
                    |(i, (&value, base))| {
                        let x = i as f64;
                        Rectangle::new([(x - 0.3, base), (x + 0.3, base + value)], c.filled())
                    },
                ))
                .map_err(draw_err)?
                .label(segment.name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], c.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_bubbles<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        spec: &ChartSpec,
    ) -> Result<(), RenderError>
    where
        DB::ErrorType: 'static,
    {
        let items = bubbles(&spec.rollups, BUBBLE_SIZE_MAX);
        let x_labels: Vec<String> = items.iter().map(|b| b.label.clone()).collect();
        let (_, y_max) = value_range(items.iter().map(|b| b.value));
        // Leave headroom so the largest bubble is not clipped.
        let y_max = y_max * 1.3;

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(items.len().max(1) as f64 - 0.5), 0f64..y_max)
            .map_err(draw_err)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(items.len().max(1))
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_label_formatter(&|v| category_tick(&x_labels, *v))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(items.iter().enumerate().map(|(i, b)| {
                Circle::new((b.x, b.value), b.radius as i32, color(i).mix(0.6).filled())
            }))
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_pie<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        spec: &ChartSpec,
    ) -> Result<(), RenderError>
    where
        DB::ErrorType: 'static,
    {
        let slices = pie_slices(&spec.rollups);
        let area = root
            .titled(&spec.title, ("sans-serif", 24))
            .map_err(draw_err)?;
        let (w, h) = area.dim_in_pixel();
        let (pie_area, legend_area) = area.split_horizontally((w as f64 * 0.6) as u32);
        let radius = (h.min((w as f64 * 0.6) as u32) as f64 / 2.0 - 20.0).max(10.0);
        let center = ((w as f64 * 0.3), h as f64 / 2.0);

        for (i, slice) in slices.iter().enumerate() {
            let outline = wedge_outline(center, radius, slice.start_angle, slice.end_angle);
            pie_area
                .draw(&Polygon::new(outline, color(i).filled()))
                .map_err(draw_err)?;
        }

        let row = 24;
        for (i, slice) in slices.iter().enumerate() {
            let y = 20 + row * i as i32;
            legend_area
                .draw(&Rectangle::new([(0, y), (14, y + 14)], color(i).filled()))
                .map_err(draw_err)?;
            legend_area
                .draw(&Text::new(
                    format!("{} {:.1}%", slice.label, slice.fraction * 100.0),
                    (22, y),
                    ("sans-serif", 16),
                ))
                .map_err(draw_err)?;
        }
        Ok(())
    }
}

/// Pixel outline of a wedge, angles clockwise from 12 o'clock.
pub fn wedge_outline(center: (f64, f64), radius: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let steps = ((end - start) * 48.0).ceil().max(1.0) as usize;
    let step = (end - start) / steps as f64;
    let mut points = Vec::with_capacity(steps + 2);
    points.push((center.0.round() as i32, center.1.round() as i32));
    for k in 0..=steps {
        let (sin, cos) = (start + step * k as f64).sin_cos();
        points.push((
            (center.0 + radius * sin).round() as i32,
            (center.1 - radius * cos).round() as i32,
        ));
    }
    points
}

/// Number of "nice" y intervals covering a range.
pub fn y_tick_count(y_min: f64, y_max: f64) -> usize {
    let step = nice_step(y_max - y_min, 8);
    (((y_max - y_min) / step).ceil() as usize).max(1)
}
