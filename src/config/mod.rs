// src/config/mod.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The dashboard's input state: which worksheet to load, the filter widget
/// selections, and where the rendered chart lands. Loaded from YAML; any
/// omitted field falls back to the default widget state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Spreadsheet identifier (the long ID in the sheet URL).
    pub sheet_id: String,
    /// Worksheet (tab) name within the spreadsheet.
    pub worksheet: String,
    /// Optional path to a file holding an API key. The key is passed through
    /// to the sheet service as-is.
    pub api_key_path: Option<String>,
    /// Filter selections: column name → selected values.
    pub filters: BTreeMap<String, Vec<String>>,
    /// When non-empty, chart grouped row counts over these columns instead
    /// of the retention line chart.
    pub group_by: Vec<String>,
    /// Output path for the rendered SVG.
    pub chart_path: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            sheet_id: String::new(),
            worksheet: "Sheet2".to_string(),
            api_key_path: None,
            filters: default_filters(),
            group_by: Vec::new(),
            chart_path: "chart.svg".to_string(),
        }
    }
}

/// The default multiselect state: overall school-year-over-school-year
/// retention for the three headline cities, 2022-23 → 2023-24.
fn default_filters() -> BTreeMap<String, Vec<String>> {
    let mut filters = BTreeMap::new();
    filters.insert("Group".to_string(), vec!["Overall".to_string()]);
    filters.insert(
        "Calculation_Type".to_string(),
        vec!["School Year over School Year Retention".to_string()],
    );
    filters.insert(
        "Category".to_string(),
        vec![
            "Chicago".to_string(),
            "Cleveland".to_string(),
            "San Diego".to_string(),
        ],
    );
    filters.insert(
        "Year_Start".to_string(),
        vec!["2022-23 School Year".to_string()],
    );
    filters.insert(
        "Year_End".to_string(),
        vec!["2023-24 School Year".to_string()],
    );
    filters.insert(
        "Session_Start".to_string(),
        vec!["SchoolYear/SchoolYear".to_string()],
    );
    filters.insert(
        "Session_End".to_string(),
        vec!["SchoolYear/SchoolYear".to_string()],
    );
    filters
}

impl DashboardConfig {
    /// Load a config from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<DashboardConfig> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Read the API key named by `api_key_path`, if configured.
    pub fn api_key(&self) -> Result<Option<String>> {
        match &self.api_key_path {
            Some(p) => {
                let key = fs::read_to_string(p)
                    .with_context(|| format!("reading API key file {}", p))?;
                Ok(Some(key.trim().to_string()))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_matches_the_default_widget_state() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.worksheet, "Sheet2");
        assert_eq!(cfg.chart_path, "chart.svg");
        assert_eq!(cfg.filters["Group"], vec!["Overall"]);
        assert_eq!(
            cfg.filters["Category"],
            vec!["Chicago", "Cleveland", "San Diego"]
        );
        assert_eq!(
            cfg.filters["Calculation_Type"],
            vec!["School Year over School Year Retention"]
        );
        assert!(cfg.group_by.is_empty());
        assert!(cfg.api_key_path.is_none());
    }

    #[test]
    fn load_fills_omitted_fields_with_defaults() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "sheet_id: abc123")?;
        writeln!(file, "filters:")?;
        writeln!(file, "  Group: [Overall]")?;

        let cfg = DashboardConfig::load(file.path())?;
        assert_eq!(cfg.sheet_id, "abc123");
        assert_eq!(cfg.worksheet, "Sheet2");
        assert_eq!(cfg.filters.len(), 1);
        assert_eq!(cfg.filters["Group"], vec!["Overall"]);
        Ok(())
    }

    #[test]
    fn api_key_is_read_and_trimmed() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "sekret")?;

        let cfg = DashboardConfig {
            api_key_path: Some(file.path().display().to_string()),
            ..DashboardConfig::default()
        };
        assert_eq!(cfg.api_key()?, Some("sekret".to_string()));
        Ok(())
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(DashboardConfig::load("/definitely/not/here.yaml").is_err());
    }
}
