// src/chart/mod.rs

use crate::table::Table;
use anyhow::{anyhow, bail, Context, Result};
use plotters::prelude::*;
use std::path::Path;
use tracing::{info, warn};

/// Render a fractional rate string for display: `"0.8123"` → `"81.23%"`,
/// anything non-numeric (or non-finite) → `"N/A"`.
pub fn format_rate(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => format!("{:.2}%", v * 100.0),
        _ => "N/A".to_string(),
    }
}

/// The time-axis label for a row: end year and end session concatenated.
/// Rows are ordered lexicographically by this label, which matches the
/// source dashboard's axis ordering.
pub fn year_session(year_end: &str, session_end: &str) -> String {
    format!("{} {}", year_end, session_end)
}

/// One plottable observation from the filtered table.
#[derive(Debug, Clone, PartialEq)]
struct SeriesPoint {
    label: String,
    category: String,
    rate: f64,
}

/// Pull (Year_Session, Category, Retention_Rate×100) out of every row with a
/// numeric rate. Rows with an unparseable rate are skipped with a warning.
fn series_points(table: &Table) -> Result<Vec<SeriesPoint>> {
    let year_idx = table
        .column_index("Year_End")
        .ok_or_else(|| anyhow!("table has no Year_End column"))?;
    let session_idx = table
        .column_index("Session_End")
        .ok_or_else(|| anyhow!("table has no Session_End column"))?;
    let category_idx = table
        .column_index("Category")
        .ok_or_else(|| anyhow!("table has no Category column"))?;
    let rate_idx = table
        .column_index("Retention_Rate")
        .ok_or_else(|| anyhow!("table has no Retention_Rate column"))?;

    let mut points = Vec::with_capacity(table.len());
    for (i, row) in table.rows.iter().enumerate() {
        let rate = row.get(rate_idx).and_then(|v| v.trim().parse::<f64>().ok());
        let rate = match rate {
            Some(r) if r.is_finite() => r * 100.0,
            _ => {
                warn!(row = i, "skipping row with non-numeric retention rate");
                continue;
            }
        };
        let year_end = row.get(year_idx).map(String::as_str).unwrap_or_default();
        let session_end = row.get(session_idx).map(String::as_str).unwrap_or_default();
        let category = row
            .get(category_idx)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());
        points.push(SeriesPoint {
            label: year_session(year_end, session_end),
            category,
            rate,
        });
    }
    Ok(points)
}

/// Render the retention-over-time line chart (one series per Category) to an
/// SVG file. The x axis is the sorted set of Year_Session labels.
pub fn render_line_chart(table: &Table, path: &Path) -> Result<()> {
    let points = series_points(table)?;
    if points.is_empty() {
        bail!("no plottable rows for the current selection");
    }

    let mut labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();
    labels.sort();
    labels.dedup();

    let mut categories: Vec<String> = points.iter().map(|p| p.category.clone()).collect();
    categories.sort();
    categories.dedup();

    let y_max = points
        .iter()
        .map(|p| p.rate)
        .fold(0.0_f64, f64::max)
        .max(1.0)
        * 1.1;

    let root = SVGBackend::new(path, (1024, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_span = -0.5_f64..(labels.len() as f64 - 0.5);
    let mut chart = ChartBuilder::on(&root)
        .caption("Retention Rate Over Time", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(x_span, 0.0_f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Year and Session")
        .y_desc("Retention Rate (%)")
        .x_labels(labels.len())
        .x_label_formatter(&|x| {
            let i = x.round();
            if i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .draw()?;

    for (si, category) in categories.iter().enumerate() {
        let color = Palette99::pick(si).mix(1.0);
        let mut data: Vec<(f64, f64)> = points
            .iter()
            .filter(|p| &p.category == category)
            .map(|p| {
                let x = labels
                    .iter()
                    .position(|l| l == &p.label)
                    .expect("label came from the same point set") as f64;
                (x, p.rate)
            })
            .collect();
        data.sort_by(|a, b| a.0.total_cmp(&b.0));

        chart
            .draw_series(LineSeries::new(data.iter().cloned(), color.stroke_width(2)))?
            .label(category.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });
        chart.draw_series(
            data.iter()
                .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()
        .with_context(|| format!("writing chart to {}", path.display()))?;
    info!(path = %path.display(), series = categories.len(), "line chart rendered");
    Ok(())
}

/// Render a grouped-count bar chart (one bar per group key) to an SVG file.
/// Expects the output of `kpi::group_counts`.
pub fn render_bar_chart(counts: &Table, path: &Path) -> Result<()> {
    if counts.is_empty() {
        bail!("no groups to plot");
    }
    let count_idx = counts
        .column_index("Count")
        .ok_or_else(|| anyhow!("table has no Count column"))?;

    let bars: Vec<(String, u64)> = counts
        .rows
        .iter()
        .map(|row| {
            let label = row[..count_idx].join(" / ");
            let n = row
                .get(count_idx)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0);
            (label, n)
        })
        .collect();

    let y_max = bars.iter().map(|(_, n)| *n).max().unwrap_or(1).max(1);

    let root = SVGBackend::new(path, (1024, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Records per Group", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(90)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0_f64..bars.len() as f64, 0_u64..y_max + 1)?;

    chart
        .configure_mesh()
        .x_desc("Group")
        .y_desc("Count")
        .x_labels(bars.len())
        .x_label_formatter(&|x| {
            if *x < 0.0 {
                return String::new();
            }
            bars.get(x.floor() as usize)
                .map(|(label, _)| label.clone())
                .unwrap_or_default()
        })
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, n))| {
        Rectangle::new(
            [(i as f64 + 0.15, 0_u64), (i as f64 + 0.85, *n)],
            BLUE.filled(),
        )
    }))?;

    root.present()
        .with_context(|| format!("writing chart to {}", path.display()))?;
    info!(path = %path.display(), bars = bars.len(), "bar chart rendered");
    Ok(())
}
