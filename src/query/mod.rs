// src/query/mod.rs

use crate::table::Table;
use std::collections::{BTreeMap, HashSet};

/// The state of the filter widgets: for each filtered column, the set of
/// values the user selected. A row survives when every filtered column's
/// value is a member of that column's set (AND across columns, OR within
/// a column).
///
/// An empty set for a column matches no rows, same as querying a frame
/// with an empty membership list. A selected column that does not exist
/// in the table also matches nothing.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    columns: BTreeMap<String, HashSet<String>>,
}

impl Selection {
    pub fn new() -> Selection {
        Selection::default()
    }

    /// Build a selection from a column → values map, e.g. a config file's
    /// `filters` section.
    pub fn from_map(filters: &BTreeMap<String, Vec<String>>) -> Selection {
        let mut selection = Selection::new();
        for (column, values) in filters {
            selection.insert(column, values.iter().cloned());
        }
        selection
    }

    pub fn insert<I, S>(&mut self, column: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns
            .insert(column.to_string(), values.into_iter().map(Into::into).collect());
    }

    pub fn with<I, S>(mut self, column: &str, values: I) -> Selection
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(column, values);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Does `row` (a row of `table`) satisfy every column's membership test?
    pub fn matches(&self, table: &Table, row: &[String]) -> bool {
        self.columns.iter().all(|(column, allowed)| {
            table
                .column_index(column)
                .and_then(|idx| row.get(idx))
                .map_or(false, |v| allowed.contains(v.as_str()))
        })
    }

    /// The subset of `table` satisfying the selection.
    pub fn apply(&self, table: &Table) -> Table {
        let rows = table
            .rows
            .iter()
            .filter(|row| self.matches(table, row))
            .cloned()
            .collect();
        table.with_rows(rows)
    }
}

/// A fully pinned predicate over the seven retention columns, used for the
/// headline KPI slices that ignore the user's current selection.
#[derive(Debug, Clone)]
pub struct FixedSlice {
    pub group: String,
    pub category: String,
    pub calculation_type: String,
    pub year_start: String,
    pub year_end: String,
    pub session_start: String,
    pub session_end: String,
}

/// A borrowed view of one matching row, resolved by column name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    row: usize,
}

impl<'a> RowView<'a> {
    pub fn value(&self, column: &str) -> Option<&'a str> {
        self.table.value(self.row, column)
    }
}

impl FixedSlice {
    /// The school-year-over-school-year slice the headline KPIs use:
    /// 2022-23 → 2023-24, full school-year sessions on both ends.
    pub fn school_year_over_school_year(group: &str, category: &str) -> FixedSlice {
        FixedSlice {
            group: group.to_string(),
            category: category.to_string(),
            calculation_type: "School Year over School Year Retention".to_string(),
            year_start: "2022-23 School Year".to_string(),
            year_end: "2023-24 School Year".to_string(),
            session_start: "SchoolYear/SchoolYear".to_string(),
            session_end: "SchoolYear/SchoolYear".to_string(),
        }
    }

    fn criteria(&self) -> [(&'static str, &str); 7] {
        [
            ("Group", self.group.as_str()),
            ("Category", self.category.as_str()),
            ("Calculation_Type", self.calculation_type.as_str()),
            ("Year_Start", self.year_start.as_str()),
            ("Year_End", self.year_end.as_str()),
            ("Session_Start", self.session_start.as_str()),
            ("Session_End", self.session_end.as_str()),
        ]
    }

    /// First row of `table` matching every pinned column, if any.
    pub fn first_match<'a>(&self, table: &'a Table) -> Option<RowView<'a>> {
        let criteria = self.criteria();
        let row = table.rows.iter().position(|row| {
            criteria.iter().all(|&(column, want)| {
                table
                    .column_index(column)
                    .and_then(|idx| row.get(idx))
                    .map_or(false, |v| v.as_str() == want)
            })
        })?;
        Some(RowView { table, row })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn retention_table() -> Table {
        let headers = [
            "Group",
            "Category",
            "Calculation_Type",
            "Year_Start",
            "Year_End",
            "Session_Start",
            "Session_End",
            "Retention_Rate",
        ];
        let rows: &[&[&str]] = &[
            &[
                "Overall",
                "Chicago",
                "School Year over School Year Retention",
                "2022-23 School Year",
                "2023-24 School Year",
                "SchoolYear/SchoolYear",
                "SchoolYear/SchoolYear",
                "0.8123",
            ],
            &[
                "Overall",
                "Cleveland",
                "School Year over School Year Retention",
                "2022-23 School Year",
                "2023-24 School Year",
                "SchoolYear/SchoolYear",
                "SchoolYear/SchoolYear",
                "0.75",
            ],
            &[
                "Chicago",
                "Reg",
                "School Year over School Year Retention",
                "2022-23 School Year",
                "2023-24 School Year",
                "SchoolYear/SchoolYear",
                "SchoolYear/SchoolYear",
                "0.9",
            ],
        ];
        table(&headers, rows)
    }

    #[test]
    fn selection_is_and_across_columns_or_within() {
        let t = retention_table();
        let selection = Selection::new()
            .with("Group", ["Overall"])
            .with("Category", ["Chicago", "Cleveland"]);
        let filtered = selection.apply(&t);

        assert_eq!(filtered.len(), 2);
        for row in 0..filtered.len() {
            assert_eq!(filtered.value(row, "Group"), Some("Overall"));
            let category = filtered.value(row, "Category").unwrap();
            assert!(category == "Chicago" || category == "Cleveland");
        }
    }

    #[test]
    fn empty_value_set_matches_no_rows() {
        let t = retention_table();
        let selection = Selection::new().with("Group", Vec::<String>::new());
        assert!(selection.apply(&t).is_empty());
    }

    #[test]
    fn unknown_column_matches_no_rows() {
        let t = retention_table();
        let selection = Selection::new().with("Teacher", ["Ms. Lane"]);
        assert!(selection.apply(&t).is_empty());
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let t = retention_table();
        let filtered = Selection::new().apply(&t);
        assert_eq!(filtered.len(), t.len());
    }

    #[test]
    fn fixed_slice_finds_first_matching_row() {
        let t = retention_table();
        let slice = FixedSlice::school_year_over_school_year("Overall", "Cleveland");
        let row = slice.first_match(&t).expect("Cleveland slice should match");
        assert_eq!(row.value("Retention_Rate"), Some("0.75"));
        assert_eq!(row.value("Year_Start"), Some("2022-23 School Year"));
    }

    #[test]
    fn fixed_slice_misses_when_nothing_matches() {
        let t = retention_table();
        let slice = FixedSlice::school_year_over_school_year("Overall", "San Diego");
        assert!(slice.first_match(&t).is_none());
    }
}
