// src/fetch/mod.rs

pub mod cache;
pub mod sheet;

pub use cache::load_cached;
pub use sheet::{export_url, fetch_table, SheetRef};
