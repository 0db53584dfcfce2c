pub mod chart;
pub mod config;
pub mod fetch;
pub mod kpi;
pub mod query;
pub mod render;
pub mod table;
