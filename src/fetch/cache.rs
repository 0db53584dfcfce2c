// src/fetch/cache.rs

use super::sheet::{fetch_table, SheetRef};
use crate::table::Table;
use anyhow::Result;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Process-wide memo of fetched worksheets, keyed by (sheet id, worksheet
/// name). A session re-uses the table instead of re-downloading it on every
/// recomputation.
static CACHE: Lazy<Mutex<HashMap<(String, String), Arc<Table>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Memoized `fetch_table`. The first call per (sheet id, worksheet) pair hits
/// the network; later calls return the cached table.
pub async fn load_cached(client: &Client, sheet: &SheetRef) -> Result<Arc<Table>> {
    let key = (sheet.sheet_id.clone(), sheet.worksheet.clone());
    if let Some(hit) = CACHE.lock().unwrap().get(&key).cloned() {
        debug!(sheet = %key.0, worksheet = %key.1, "sheet cache hit");
        return Ok(hit);
    }

    let table = Arc::new(fetch_table(client, sheet).await?);
    CACHE
        .lock()
        .unwrap()
        .insert(key, Arc::clone(&table));
    Ok(table)
}
