// src/fetch/sheet.rs

use crate::table::Table;
use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;
use url::Url;

/// Identifies one worksheet of one spreadsheet, plus an optional API key
/// that is passed through to the sheet service untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetRef {
    pub sheet_id: String,
    pub worksheet: String,
    pub api_key: Option<String>,
}

/// Build the CSV export URL for a worksheet.
pub fn export_url(sheet: &SheetRef) -> Result<Url> {
    let base = format!(
        "https://docs.google.com/spreadsheets/d/{}/gviz/tq",
        sheet.sheet_id
    );
    let mut url = Url::parse(&base)
        .with_context(|| format!("building export URL for sheet `{}`", sheet.sheet_id))?;
    url.query_pairs_mut()
        .append_pair("tqx", "out:csv")
        .append_pair("sheet", &sheet.worksheet);
    if let Some(key) = &sheet.api_key {
        url.query_pairs_mut().append_pair("key", key);
    }
    Ok(url)
}

/// Fetch a worksheet and parse its CSV export into a `Table`. Authentication
/// or network failures propagate; there is no retry.
pub async fn fetch_table(client: &Client, sheet: &SheetRef) -> Result<Table> {
    let url = export_url(sheet)?;
    info!(sheet = %sheet.sheet_id, worksheet = %sheet.worksheet, "fetching worksheet");

    let body = client
        .get(url.as_str())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let table = Table::from_csv(body.as_bytes())
        .with_context(|| format!("parsing worksheet `{}` as CSV", sheet.worksheet))?;
    info!(
        rows = table.len(),
        columns = table.headers.len(),
        "worksheet loaded"
    );
    Ok(table)
}
