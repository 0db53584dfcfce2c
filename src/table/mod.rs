// src/table/mod.rs

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::io::Read;

/// An in-memory worksheet: one header row plus string-typed data rows.
///
/// Cells are kept as the strings the sheet export produced; anything that
/// needs a number parses on demand and treats failures as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names, from the first row of the CSV export.
    pub headers: Vec<String>,
    /// Each data row, one String per field.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse a CSV document into a `Table`. The first record is taken as the
    /// header row; fully blank records are dropped.
    pub fn from_csv<R: Read>(reader: R) -> Result<Table> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut headers: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<String>> = Vec::new();

        for (idx, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
            let fields: Vec<String> = record.iter().map(|s| s.trim().to_string()).collect();
            if idx == 0 {
                headers = fields;
            } else if fields.iter().any(|f| !f.is_empty()) {
                rows.push(fields);
            }
        }

        Ok(Table { headers, rows })
    }

    /// Position of `name` in the header row, if the column exists.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value at (`row`, `column`). `None` when either the column or the
    /// field is missing, which downstream renders as N/A.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Distinct non-empty values of `column`, in first-seen order. This is
    /// what feeds the filter widgets' option lists.
    pub fn unique_values(&self, column: &str) -> Vec<String> {
        let idx = match self.column_index(column) {
            Some(i) => i,
            None => return Vec::new(),
        };
        let mut seen: Vec<String> = Vec::new();
        for row in &self.rows {
            if let Some(v) = row.get(idx) {
                if !v.is_empty() && !seen.iter().any(|s| s == v) {
                    seen.push(v.clone());
                }
            }
        }
        seen
    }

    /// A table with the same headers but a different set of rows.
    pub fn with_rows(&self, rows: Vec<Vec<String>>) -> Table {
        Table {
            headers: self.headers.clone(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_csv_splits_headers_and_rows() -> Result<()> {
        let content = "Group,Category,Retention_Rate\n\
                       Overall,Chicago,0.82\n\
                       Overall,Cleveland,0.76\n";
        let table = Table::from_csv(content.as_bytes())?;

        assert_eq!(table.headers, vec!["Group", "Category", "Retention_Rate"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "Category"), Some("Chicago"));
        assert_eq!(table.value(1, "Retention_Rate"), Some("0.76"));
        Ok(())
    }

    #[test]
    fn from_csv_drops_blank_records_and_trims() -> Result<()> {
        let content = "Group,Category\n Overall , Chicago \n,\nOverall,Cleveland\n";
        let table = Table::from_csv(content.as_bytes())?;

        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "Group"), Some("Overall"));
        assert_eq!(table.value(0, "Category"), Some("Chicago"));
        Ok(())
    }

    #[test]
    fn missing_column_is_absent() {
        let table = Table {
            headers: vec!["Group".into()],
            rows: vec![vec!["Overall".into()]],
        };
        assert_eq!(table.value(0, "Teacher"), None);
        assert_eq!(table.column_index("Teacher"), None);
    }

    #[test]
    fn unique_values_keep_first_seen_order() {
        let table = Table {
            headers: vec!["City".into()],
            rows: vec![
                vec!["Chicago".into()],
                vec!["Cleveland".into()],
                vec!["Chicago".into()],
                vec!["".into()],
                vec!["San Diego".into()],
            ],
        };
        assert_eq!(
            table.unique_values("City"),
            vec!["Chicago", "Cleveland", "San Diego"]
        );
        assert!(table.unique_values("Nope").is_empty());
    }
}
