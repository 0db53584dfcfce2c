// src/kpi/mod.rs

use crate::chart::format_rate;
use crate::query::FixedSlice;
use crate::table::Table;
use anyhow::{bail, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// Fallback shown whenever a slice has no matching row or a field is absent.
pub const NA: &str = "N/A";

/// The cities the headline KPI row is pinned to, regardless of the user's
/// current filter selection.
pub const HEADLINE_CITIES: [&str; 3] = ["Chicago", "Cleveland", "San Diego"];

/// One headline card: the overall school-year retention for a city plus the
/// Reg / Non Reg breakdown. Every field is already display-formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub category: String,
    pub base_year: String,
    pub retention_year: String,
    pub rate: String,
    pub reg_rate: String,
    pub non_reg_rate: String,
}

/// Build the headline cards from the full (unfiltered) table.
pub fn headline_cards(table: &Table) -> Vec<KpiCard> {
    HEADLINE_CITIES
        .iter()
        .map(|city| city_card(table, city))
        .collect()
}

fn city_card(table: &Table, city: &str) -> KpiCard {
    let overall = FixedSlice::school_year_over_school_year("Overall", city);
    let (base_year, retention_year, rate) = match overall.first_match(table) {
        Some(row) => (
            row.value("Year_Start").unwrap_or(NA).to_string(),
            row.value("Year_End").unwrap_or(NA).to_string(),
            row.value("Retention_Rate")
                .map(format_rate)
                .unwrap_or_else(|| NA.to_string()),
        ),
        None => {
            debug!(city, "no overall retention row for headline slice");
            (NA.to_string(), NA.to_string(), NA.to_string())
        }
    };

    KpiCard {
        category: city.to_string(),
        base_year,
        retention_year,
        rate,
        reg_rate: segment_rate(table, city, "Reg"),
        non_reg_rate: segment_rate(table, city, "Non Reg"),
    }
}

/// Retention rate for a city's Reg or Non Reg segment, or N/A.
fn segment_rate(table: &Table, city: &str, segment: &str) -> String {
    FixedSlice::school_year_over_school_year(city, segment)
        .first_match(table)
        .and_then(|row| row.value("Retention_Rate"))
        .map(format_rate)
        .unwrap_or_else(|| NA.to_string())
}

/// Group `table` by the ordered `columns` and count rows per group. The
/// output has one row per group, in first-seen order, with a trailing
/// `Count` column.
pub fn group_counts(table: &Table, columns: &[String]) -> Result<Table> {
    if columns.is_empty() {
        bail!("group_counts requires at least one column");
    }
    let mut indices = Vec::with_capacity(columns.len());
    for column in columns {
        match table.column_index(column) {
            Some(idx) => indices.push(idx),
            None => bail!("unknown grouping column `{}`", column),
        }
    }

    let mut order: Vec<Vec<String>> = Vec::new();
    let mut counts: HashMap<Vec<String>, u64> = HashMap::new();
    for row in &table.rows {
        let key: Vec<String> = indices
            .iter()
            .map(|&idx| row.get(idx).cloned().unwrap_or_default())
            .collect();
        match counts.entry(key) {
            Entry::Vacant(slot) => {
                order.push(slot.key().clone());
                slot.insert(1);
            }
            Entry::Occupied(mut slot) => *slot.get_mut() += 1,
        }
    }

    let mut headers = columns.to_vec();
    headers.push("Count".to_string());
    let rows = order
        .into_iter()
        .map(|mut key| {
            let count = counts[&key];
            key.push(count.to_string());
            key
        })
        .collect();

    Ok(Table { headers, rows })
}
