use anyhow::{bail, Context, Result};
use clap::Parser;
use danceboard::{
    chart,
    config::DashboardConfig,
    fetch::{self, SheetRef},
    kpi,
    query::Selection,
    render,
};
use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Spreadsheet-backed attendance/retention dashboard"
)]
struct Args {
    /// Path to the dashboard config file.
    #[arg(long, default_value = "dashboard.yaml")]
    config: PathBuf,
    /// Override a filter selection as `Column=value1,value2` (repeatable).
    #[arg(long = "filter", value_name = "COL=V1,V2")]
    filters: Vec<String>,
    /// Group the filtered rows by these columns and chart the counts.
    #[arg(long = "group-by", value_delimiter = ',')]
    group_by: Vec<String>,
    /// Where to write the rendered chart (overrides the config).
    #[arg(long)]
    chart: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // ─── 2) load config + CLI overrides ──────────────────────────────
    let args = Args::parse();
    let mut cfg = if args.config.exists() {
        DashboardConfig::load(&args.config)?
    } else {
        warn!(path = %args.config.display(), "config not found; using defaults");
        DashboardConfig::default()
    };
    for spec in &args.filters {
        let (column, values) = parse_filter(spec)?;
        cfg.filters.insert(column, values);
    }
    if !args.group_by.is_empty() {
        cfg.group_by = args.group_by.clone();
    }
    if let Some(chart) = &args.chart {
        cfg.chart_path = chart.display().to_string();
    }
    if cfg.sheet_id.is_empty() {
        bail!(
            "no sheet_id configured; set `sheet_id` in {}",
            args.config.display()
        );
    }

    // ─── 3) load the worksheet ───────────────────────────────────────
    let client = Client::new();
    let sheet = SheetRef {
        sheet_id: cfg.sheet_id.clone(),
        worksheet: cfg.worksheet.clone(),
        api_key: cfg.api_key()?,
    };
    let table = fetch::load_cached(&client, &sheet).await?;

    // ─── 4) headline KPIs (always from the full table) ───────────────
    let cards = kpi::headline_cards(&table);
    println!("{}", render::kpi_block(&cards));

    // ─── 5) apply the filter selection ───────────────────────────────
    let selection = Selection::from_map(&cfg.filters);
    let filtered = selection.apply(&table);
    info!(rows = filtered.len(), "selection applied");

    if filtered.is_empty() {
        warn!("no data available for the selected filters; adjust the filters and rerun");
        return Ok(());
    }

    // ─── 6) render the chart ─────────────────────────────────────────
    let chart_path = PathBuf::from(&cfg.chart_path);
    if cfg.group_by.is_empty() {
        chart::render_line_chart(&filtered, &chart_path)?;
    } else {
        let counts = kpi::group_counts(&filtered, &cfg.group_by)?;
        chart::render_bar_chart(&counts, &chart_path)?;
    }
    info!(path = %chart_path.display(), "dashboard complete");
    Ok(())
}

fn parse_filter(spec: &str) -> Result<(String, Vec<String>)> {
    let (column, values) = spec
        .split_once('=')
        .with_context(|| format!("invalid filter `{}`; expected COL=V1,V2", spec))?;
    let values = values
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    Ok((column.trim().to_string(), values))
}

#[cfg(test)]
mod tests {
    use super::parse_filter;

    #[test]
    fn parse_filter_splits_column_and_values() {
        let (column, values) = parse_filter("Category=Chicago, Cleveland").unwrap();
        assert_eq!(column, "Category");
        assert_eq!(values, vec!["Chicago", "Cleveland"]);
    }

    #[test]
    fn parse_filter_rejects_missing_equals() {
        assert!(parse_filter("Category").is_err());
    }
}
