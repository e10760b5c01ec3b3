//! Raw tabular input and column inference.
//!
//! A [`RawTable`] is the untyped hand-off format from data collaborators
//! (CSV readers, API fetchers): ordered column names plus rows of string
//! cells. Nothing about it is validated; the normalizer decides which
//! columns matter and which rows survive coercion.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Ordered alias lists used to pick the price and date columns by name.
///
/// Matching is case-insensitive and tries aliases in order, so `close`
/// beats `value` when both are present.
#[derive(Debug, Clone)]
pub struct ColumnAliases {
    pub price: Vec<String>,
    pub date: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            price: [
                "price", "close", "adj close", "adj_close", "settle", "value", "last", "rate",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            date: ["date", "timestamp", "time"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Outcome of column inference over a table header.
///
/// `date_by_alias` / `price_by_alias` record whether the column was matched
/// by name or chosen by positional fallback (first column for date, last
/// column for price). The fallback can silently pick the wrong column on
/// arbitrary tables; callers surface that as a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSelection {
    pub date: usize,
    pub price: usize,
    pub date_by_alias: bool,
    pub price_by_alias: bool,
}

/// Pick the date and price columns from a header.
///
/// Pure over column names: no cell data is inspected. Returns `None` only
/// for an empty header.
pub fn infer_columns(columns: &[String], aliases: &ColumnAliases) -> Option<ColumnSelection> {
    if columns.is_empty() {
        return None;
    }

    let lowered: Vec<String> = columns.iter().map(|c| c.trim().to_lowercase()).collect();
    let find = |candidates: &[String]| {
        candidates
            .iter()
            .find_map(|cand| lowered.iter().position(|col| col == cand))
    };

    let date = find(&aliases.date);
    let price = find(&aliases.price);

    Some(ColumnSelection {
        date: date.unwrap_or(0),
        price: price.unwrap_or(columns.len() - 1),
        date_by_alias: date.is_some(),
        price_by_alias: price.is_some(),
    })
}

/// An untyped table of string cells with named columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create an empty table with the given column names.
    pub fn new<S: Into<String>>(columns: Vec<S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Rows shorter than the header are allowed; missing
    /// cells read as empty.
    pub fn push_row<S: Into<String>>(&mut self, row: Vec<S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Builder-style [`push_row`](Self::push_row).
    pub fn with_row<S: Into<String>>(mut self, row: Vec<S>) -> Self {
        self.push_row(row);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// A table with no rows (or no columns) is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Cell contents at (row, column), if present.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(column)).map(String::as_str)
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a cell as a calendar date.
///
/// Tries plain date formats first, then datetime formats and RFC 3339
/// timestamps, truncating to the date. Returns `None` for anything else.
pub(crate) fn parse_date_cell(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(cell, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cell, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.date_naive());
    }

    None
}

/// Parse a cell as a finite number. Thousands separators are tolerated.
pub(crate) fn parse_numeric_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    let cleaned: String = cell.chars().filter(|&c| c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn infer_columns_matches_aliases_case_insensitively() {
        let aliases = ColumnAliases::default();
        let sel = infer_columns(&header(&["Date", "Volume", "Close"]), &aliases).unwrap();

        assert_eq!(sel.date, 0);
        assert_eq!(sel.price, 2);
        assert!(sel.date_by_alias);
        assert!(sel.price_by_alias);
    }

    #[test]
    fn infer_columns_respects_alias_priority() {
        // "price" outranks "close" in the default alias order.
        let aliases = ColumnAliases::default();
        let sel = infer_columns(&header(&["date", "close", "price"]), &aliases).unwrap();
        assert_eq!(sel.price, 2);

        // "adj close" with a space is a known alias.
        let sel = infer_columns(&header(&["Timestamp", "Adj Close"]), &aliases).unwrap();
        assert_eq!(sel.date, 0);
        assert_eq!(sel.price, 1);
    }

    #[test]
    fn infer_columns_falls_back_positionally() {
        let aliases = ColumnAliases::default();
        let sel = infer_columns(&header(&["when", "how_much"]), &aliases).unwrap();

        assert_eq!(sel.date, 0);
        assert_eq!(sel.price, 1);
        assert!(!sel.date_by_alias);
        assert!(!sel.price_by_alias);
    }

    #[test]
    fn infer_columns_empty_header() {
        let aliases = ColumnAliases::default();
        assert!(infer_columns(&[], &aliases).is_none());
    }

    #[test]
    fn infer_columns_custom_alias_table() {
        let aliases = ColumnAliases {
            price: vec!["spot".to_string()],
            date: vec!["trading_day".to_string()],
        };
        let sel = infer_columns(&header(&["trading_day", "spot"]), &aliases).unwrap();
        assert_eq!(sel.date, 0);
        assert_eq!(sel.price, 1);
        assert!(sel.price_by_alias);
    }

    #[test]
    fn raw_table_construction() {
        let table = RawTable::new(vec!["Date", "Price"])
            .with_row(vec!["2024-01-01", "100.0"])
            .with_row(vec!["2024-01-02", "101.5"]);

        assert_eq!(table.num_rows(), 2);
        assert!(!table.is_empty());
        assert_eq!(table.cell(0, 1), Some("100.0"));
        assert_eq!(table.cell(5, 0), None);
    }

    #[test]
    fn raw_table_short_rows_read_as_missing() {
        let table = RawTable::new(vec!["Date", "Price"]).with_row(vec!["2024-01-01"]);
        assert_eq!(table.cell(0, 0), Some("2024-01-01"));
        assert_eq!(table.cell(0, 1), None);
    }

    #[test]
    fn parse_date_cell_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date_cell("2024-03-05"), Some(expected));
        assert_eq!(parse_date_cell("2024/03/05"), Some(expected));
        assert_eq!(parse_date_cell("05-03-2024"), Some(expected));
        assert_eq!(parse_date_cell("2024-03-05 13:45:00"), Some(expected));
        assert_eq!(parse_date_cell("2024-03-05T13:45:00"), Some(expected));
        assert_eq!(parse_date_cell("2024-03-05T13:45:00+05:30"), Some(expected));
        assert_eq!(parse_date_cell(" 2024-03-05 "), Some(expected));

        assert_eq!(parse_date_cell(""), None);
        assert_eq!(parse_date_cell("not a date"), None);
        assert_eq!(parse_date_cell("2024-13-40"), None);
    }

    #[test]
    fn parse_numeric_cell_values() {
        assert_eq!(parse_numeric_cell("100.5"), Some(100.5));
        assert_eq!(parse_numeric_cell(" -3.25 "), Some(-3.25));
        assert_eq!(parse_numeric_cell("1,234.5"), Some(1234.5));
        assert_eq!(parse_numeric_cell("1e3"), Some(1000.0));

        assert_eq!(parse_numeric_cell(""), None);
        assert_eq!(parse_numeric_cell("n/a"), None);
        assert_eq!(parse_numeric_cell("inf"), None);
        assert_eq!(parse_numeric_cell("NaN"), None);
    }
}
