//! Server-side SVG line charts.

use plotters::prelude::*;

use trackboard_core::surface::LineChart;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 400;
const MAX_X_LABELS: usize = 12;

fn draw_err<E: std::fmt::Display>(e: E) -> String {
    format!("chart rendering failed: {}", e)
}

/// Run ids are long hex strings; axis ticks show a prefix.
fn short_label(label: &str) -> String {
    label.chars().take(8).collect()
}

/// Renders a categorical line chart as an SVG document. Points with
/// non-finite values are skipped.
pub fn line_chart_svg(chart: &LineChart) -> Result<String, String> {
    let points: Vec<(usize, f64)> = chart
        .points
        .iter()
        .enumerate()
        .filter(|(_, (_, v))| v.is_finite())
        .map(|(i, (_, v))| (i, *v))
        .collect();
    if points.is_empty() {
        return Err("no finite values to plot".to_string());
    }

    let mut y_min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let mut y_max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let pad = if y_max > y_min {
        (y_max - y_min) * 0.05
    } else {
        y_min.abs().max(1.0) * 0.5
    };
    y_min -= pad;
    y_max += pad;

    let labels: Vec<String> = chart.points.iter().map(|(l, _)| short_label(l)).collect();
    let x_max = chart.points.len().max(2) - 1;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 20))
            .margin(12)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0usize..x_max, y_min..y_max)
            .map_err(draw_err)?;

        let label_of = |i: &usize| labels.get(*i).cloned().unwrap_or_default();
        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_labels(labels.len().min(MAX_X_LABELS))
            .x_label_formatter(&label_of)
            .draw()
            .map_err(draw_err)?;

        ctx.draw_series(LineSeries::new(points.iter().copied(), &BLUE))
            .map_err(draw_err)?;
        ctx.draw_series(points.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }
    Ok(svg)
}
