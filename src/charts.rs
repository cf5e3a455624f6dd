//! PNG chart rendering. Pure presentation: every function takes finished
//! structures from the core and draws them, nothing flows back.

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

use crate::decompose::Decomposition;

const CHART_SIZE: (u32, u32) = (900, 600);
const PANEL_SIZE: (u32, u32) = (900, 1100);

/// Vertical bar chart with one label per bar.
pub fn bar_chart(
    path: &Path,
    title: &str,
    labels: &[String],
    values: &[f64],
) -> Result<(), Box<dyn Error>> {
    if values.is_empty() {
        return Ok(());
    }
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let y_max = if y_max <= 0.0 { 1.0 } else { y_max * 1.1 };

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0i32..values.len() as i32, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().min(16))
        .x_label_formatter(&|x| labels.get(*x as usize).cloned().unwrap_or_default())
        .draw()?;

    chart.draw_series(
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, v)| {
                Rectangle::new(
                    [(i as i32, 0.0), (i as i32 + 1, *v)],
                    BLUE.mix(0.6).filled(),
                )
            }),
    )?;

    root.present()?;
    Ok(())
}

/// Single line series over an index axis, with optional tick labels
/// (e.g. dates). Non-finite points are skipped.
pub fn line_chart(
    path: &Path,
    title: &str,
    x_labels: &[String],
    values: &[f64],
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    draw_line_panel(&root, title, x_labels, values, &BLUE)?;
    root.present()?;
    Ok(())
}

/// The classic four-panel decomposition figure: observed, trend, seasonal,
/// residual stacked vertically.
pub fn decomposition_chart(
    path: &Path,
    title: &str,
    d: &Decomposition,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, PANEL_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((4, 1));

    let orange = RGBColor(255, 140, 0);
    let components: [(&str, &[f64], &RGBColor); 4] = [
        ("Observed", &d.observed, &BLUE),
        ("Trend", &d.trend, &RED),
        ("Seasonal", &d.seasonal, &GREEN),
        ("Residual", &d.resid, &orange),
    ];

    for (panel, (name, series, color)) in panels.iter().zip(components) {
        let panel_title = format!("{} - {}", title, name);
        draw_line_panel(panel, &panel_title, &[], series, color)?;
    }

    root.present()?;
    Ok(())
}

fn draw_line_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    title: &str,
    x_labels: &[String],
    values: &[f64],
    color: &RGBColor,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Ok(());
    }
    let mut y_min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut y_max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if y_min == y_max {
        // Flat series still needs a non-empty axis range.
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = (y_max - y_min) * 0.05;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(0i32..values.len() as i32, (y_min - pad)..(y_max + pad))?;

    let label_fmt = |x: &i32| x_labels.get(*x as usize).cloned().unwrap_or_default();
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh().x_labels(10);
    if !x_labels.is_empty() {
        mesh.x_label_formatter(&label_fmt);
    }
    mesh.draw()?;

    chart.draw_series(LineSeries::new(
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, v)| (i as i32, *v)),
        color,
    ))?;
    Ok(())
}
