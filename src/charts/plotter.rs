//! Chart Plotter Module
//! Draws dashboard charts interactively using egui_plot.

use crate::charts::series::{
    bubbles, category_tick, date_tick, format_value, line_series, pie_slices, ChartKind,
    ChartSpec, DataTable, StackedBars, BUBBLE_SIZE_MAX,
};
use crate::stats::{Dimension, PivotTable};
use egui::{Color32, RichText, Stroke};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219), // Blue
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

pub fn series_color(index: usize) -> Color32 {
    PALETTE[index % PALETTE.len()]
}

/// Draws [`ChartSpec`]s with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn draw(ui: &mut egui::Ui, spec: &ChartSpec, full_size: bool) {
        if spec.is_empty() {
            ui.label(RichText::new("No data to display.").italics());
            return;
        }
        match spec.kind {
            ChartKind::Line => Self::draw_line_chart(ui, spec, full_size),
            ChartKind::StackedBar => Self::draw_stacked_bar_chart(ui, spec, full_size),
            ChartKind::Pie => Self::draw_pie_chart(ui, spec, full_size),
            ChartKind::Bubble => Self::draw_bubble_chart(ui, spec, full_size),
        }
    }

    fn height(full_size: bool) -> f32 {
        if full_size {
            360.0
        } else {
            220.0
        }
    }

    /// Multi-line trend chart. Dates on x are days from the common era.
    pub fn draw_line_chart(ui: &mut egui::Ui, spec: &ChartSpec, full_size: bool) {
        let lines = line_series(&spec.rollups);
        let is_date = spec.x == Dimension::Date;

        Plot::new(format!("line_{}", spec.id))
            .height(Self::height(full_size))
            .legend(Legend::default())
            .allow_zoom(full_size)
            .allow_drag(full_size)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .x_axis_formatter(move |mark, _range| {
                if is_date {
                    date_tick(mark.value)
                } else {
                    format!("{}", mark.value.round() as i64)
                }
            })
            .show(ui, |plot_ui| {
                for (i, line) in lines.iter().enumerate() {
                    let color = series_color(i);
                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(line.points.iter().copied()))
                            .color(color)
                            .width(1.5)
                            .name(&line.name),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(line.points.iter().copied()))
                            .radius(2.0)
                            .color(color),
                    );
                }
            });
    }

    /// Stacked bars: one bar per `x` key, one layer per `series` key.
    pub fn draw_stacked_bar_chart(ui: &mut egui::Ui, spec: &ChartSpec, full_size: bool) {
        let Some(series) = spec.series else {
            return;
        };
        let pivot = PivotTable::from_rollups(spec.x, series, &spec.rollups);
        let bars = StackedBars::from_pivot(&pivot);
        let x_labels = bars.x_labels.clone();

        Plot::new(format!("bar_{}", spec.id))
            .height(Self::height(full_size))
            .legend(Legend::default())
            .allow_zoom(full_size)
            .allow_drag(full_size)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .x_axis_formatter(move |mark, _range| category_tick(&x_labels, mark.value))
            .show(ui, |plot_ui| {
                for (s, segment) in bars.segments.iter().enumerate() {
                    let color = series_color(s);
                    let offsets = bars.offsets(s);
                    let items: Vec<Bar> = segment
                        .values
                        .iter()
                        .zip(offsets)
                        .enumerate()
                        .map(|(i, (&value, base))| {
                            Bar::new(i as f64, value)
                                .base_offset(base)
                                .width(0.6)
                                .fill(color)
                                .name(format!("{}: {}", segment.name, format_value(value)))
                        })
                        .collect();
                    plot_ui.bar_chart(BarChart::new(items).color(color).name(&segment.name));
                }
            });
    }

    /// Bubbles along one row, area proportional to the total.
    pub fn draw_bubble_chart(ui: &mut egui::Ui, spec: &ChartSpec, full_size: bool) {
        let scale = if full_size { 1.0 } else { 0.6 };
        let items = bubbles(&spec.rollups, BUBBLE_SIZE_MAX * scale);
        let x_labels: Vec<String> = items.iter().map(|b| b.label.clone()).collect();

        Plot::new(format!("bubble_{}", spec.id))
            .height(Self::height(full_size))
            .legend(Legend::default())
            .allow_zoom(full_size)
            .allow_drag(full_size)
            .allow_scroll(false)
            .include_x(-0.5)
            .include_x(items.len() as f64 - 0.5)
            .include_y(0.0)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .x_axis_formatter(move |mark, _range| category_tick(&x_labels, mark.value))
            .show(ui, |plot_ui| {
                for (i, bubble) in items.iter().enumerate() {
                    plot_ui.points(
                        Points::new(vec![[bubble.x, bubble.value]])
                            .radius(bubble.radius as f32)
                            .filled(true)
                            .color(series_color(i).gamma_multiply(0.6))
                            .name(format!("{}: {}", bubble.label, format_value(bubble.value))),
                    );
                }
            });
    }

    /// Pie drawn with the painter; egui_plot has no wedge primitive.
    pub fn draw_pie_chart(ui: &mut egui::Ui, spec: &ChartSpec, full_size: bool) {
        let slices = pie_slices(&spec.rollups);
        let diameter = Self::height(full_size) - 20.0;

        ui.horizontal(|ui| {
            let (response, painter) =
                ui.allocate_painter(egui::vec2(diameter, diameter), egui::Sense::hover());
            let center = response.rect.center();
            let radius = diameter / 2.0 - 4.0;

            for (i, slice) in slices.iter().enumerate() {
                let color = series_color(i);
                let steps = ((slice.end_angle - slice.start_angle) * 24.0).ceil().max(1.0) as usize;
                let step = (slice.end_angle - slice.start_angle) / steps as f64;
                for k in 0..steps {
                    let a0 = slice.start_angle + step * k as f64;
                    let a1 = a0 + step;
                    painter.add(egui::Shape::convex_polygon(
                        vec![
                            center,
                            wedge_point(center, radius, a0),
                            wedge_point(center, radius, a1),
                        ],
                        color,
                        Stroke::NONE,
                    ));
                }
            }

            ui.vertical(|ui| {
                for (i, slice) in slices.iter().enumerate() {
                    ui.label(
                        RichText::new(format!(
                            "■ {} {:.1}% ({})",
                            slice.label,
                            slice.fraction * 100.0,
                            format_value(slice.value)
                        ))
                        .color(series_color(i))
                        .size(11.0),
                    );
                }
            });
        });
    }

    /// Grid view of a chart's numbers.
    pub fn draw_data_table(ui: &mut egui::Ui, spec: &ChartSpec) {
        let table: DataTable = spec.table();
        let (header, body) = table.to_rows(&spec.y_label);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::ScrollArea::horizontal()
                    .id_salt(format!("table_scroll_{}", spec.id))
                    .show(ui, |ui| {
                        egui::Grid::new(ui.make_persistent_id(format!("table_{}", spec.id)))
                            .striped(true)
                            .min_col_width(55.0)
                            .spacing([8.0, 4.0])
                            .show(ui, |ui| {
                                for cell in &header {
                                    ui.label(RichText::new(cell).strong().size(11.0));
                                }
                                ui.end_row();

                                for row in &body {
                                    for cell in row {
                                        ui.label(RichText::new(cell).size(11.0));
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });
    }
}

/// Point on the rim, angle clockwise from 12 o'clock.
fn wedge_point(center: egui::Pos2, radius: f32, angle: f64) -> egui::Pos2 {
    let (sin, cos) = angle.sin_cos();
    egui::pos2(
        center.x + radius * sin as f32,
        center.y - radius * cos as f32,
    )
}
