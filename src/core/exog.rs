//! Exogenous covariate matrices and raw-table alignment.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::core::series::normalize;
use crate::core::table::{infer_columns, parse_date_cell, parse_numeric_cell, ColumnAliases, RawTable};
use crate::error::{ForecastError, Result};

/// A contiguous daily matrix of named numeric features, column-major.
///
/// Past and future instances produced by [`align`] share identical column
/// names, and a future matrix covers the full forecast horizon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExogMatrix {
    start: Option<NaiveDate>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl ExogMatrix {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(start: NaiveDate, names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: names.len(),
                got: columns.len(),
            });
        }
        let rows = columns.first().map(Vec::len).unwrap_or(0);
        for column in &columns {
            if column.len() != rows {
                return Err(ForecastError::DimensionMismatch {
                    expected: rows,
                    got: column.len(),
                });
            }
        }
        if rows == 0 || columns.is_empty() {
            return Ok(Self::empty());
        }
        Ok(Self {
            start: Some(start),
            names,
            columns,
        })
    }

    /// Number of rows (days).
    pub fn len(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of feature columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.len() {
            return None;
        }
        self.start.map(|s| s + Duration::days(index as i64))
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Feature values for one day.
    pub fn row(&self, index: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[index]).collect()
    }

    /// First `n` rows as a new matrix.
    pub fn truncated(&self, n: usize) -> ExogMatrix {
        let n = n.min(self.len());
        if n == 0 {
            return ExogMatrix::empty();
        }
        ExogMatrix {
            start: self.start,
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c[..n].to_vec()).collect(),
        }
    }
}

/// Sparse per-column observations keyed by date, in first-seen column order.
type SparseColumns = Vec<(String, BTreeMap<NaiveDate, f64>)>;

/// Align covariate tables onto a target price table's daily index.
///
/// The target is normalized exactly as [`normalize`] does to obtain the date
/// index. Each covariate table contributes its numeric columns (the date
/// column is inferred the same way as for price tables); tables merge
/// column-wise on date, and gaps are forward- then backward-filled. The past
/// matrix covers the target's history; the future matrix covers exactly
/// `horizon` days starting the day after the target ends, repeating the last
/// known row where the raw future data falls short. Columns with no future
/// source (derived features such as news sentiment) are carried forward as
/// constant zero: "no information" rather than a fabricated trend.
///
/// An empty target or the absence of any usable covariate column yields two
/// empty matrices, not an error.
pub fn align(
    target: &RawTable,
    past: &[RawTable],
    future: &[RawTable],
    horizon: usize,
) -> Result<(ExogMatrix, ExogMatrix)> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "horizon must be positive".to_string(),
        ));
    }

    let series = normalize(target);
    let (Some(series_start), Some(series_end)) = (series.start(), series.last_date()) else {
        return Ok((ExogMatrix::empty(), ExogMatrix::empty()));
    };

    let past_columns = collect_numeric_columns(past);
    if past_columns.is_empty() {
        return Ok((ExogMatrix::empty(), ExogMatrix::empty()));
    }
    let future_columns = collect_numeric_columns(future);

    // Past matrix over the target's own index.
    let names: Vec<String> = past_columns.iter().map(|(n, _)| n.clone()).collect();
    let mut past_values: Vec<Vec<f64>> = Vec::with_capacity(past_columns.len());
    for (_, observations) in &past_columns {
        let column = (0..series.len())
            .map(|i| value_at(observations, series_start + Duration::days(i as i64)))
            .collect();
        past_values.push(column);
    }
    let past_matrix = ExogMatrix::new(series_start, names.clone(), past_values)?;

    // Future matrix: `horizon` rows from the day after history ends, with
    // the same columns as the past matrix.
    let future_start = series_end + Duration::days(1);
    let mut future_values: Vec<Vec<f64>> = Vec::with_capacity(names.len());
    for name in &names {
        let observations = future_columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, obs)| obs);
        let column = match observations {
            Some(obs) => (0..horizon)
                .map(|i| value_at(obs, future_start + Duration::days(i as i64)))
                .collect(),
            // No future source for this feature: neutral constant.
            None => vec![0.0; horizon],
        };
        future_values.push(column);
    }
    let future_matrix = ExogMatrix::new(future_start, names, future_values)?;

    Ok((past_matrix, future_matrix))
}

/// Merge the numeric columns of several raw tables into sparse per-column
/// observations. A column is treated as numeric when most of its non-empty
/// cells parse as numbers; within a column, the last observation per date
/// wins, with later tables overriding earlier ones.
fn collect_numeric_columns(tables: &[RawTable]) -> SparseColumns {
    let aliases = ColumnAliases::default();
    let mut merged: SparseColumns = Vec::new();

    for table in tables {
        let Some(selection) = infer_columns(table.columns(), &aliases) else {
            continue;
        };

        for (index, name) in table.columns().iter().enumerate() {
            if index == selection.date {
                continue;
            }
            if !is_numeric_column(table, index) {
                continue;
            }

            let slot = match merged.iter().position(|(n, _)| n == name) {
                Some(i) => i,
                None => {
                    merged.push((name.clone(), BTreeMap::new()));
                    merged.len() - 1
                }
            };
            let observations = &mut merged[slot].1;

            for row in table.rows() {
                let date = row.get(selection.date).and_then(|c| parse_date_cell(c));
                let value = row.get(index).and_then(|c| parse_numeric_cell(c));
                if let (Some(date), Some(value)) = (date, value) {
                    observations.insert(date, value);
                }
            }
        }
    }

    merged.retain(|(_, obs)| !obs.is_empty());
    merged
}

fn is_numeric_column(table: &RawTable, index: usize) -> bool {
    let mut non_empty = 0usize;
    let mut parsed = 0usize;
    for row in table.rows() {
        let Some(cell) = row.get(index) else { continue };
        if cell.trim().is_empty() {
            continue;
        }
        non_empty += 1;
        if parse_numeric_cell(cell).is_some() {
            parsed += 1;
        }
    }
    parsed > 0 && parsed * 2 > non_empty
}

/// Value of a sparse column at `date`: the most recent observation at or
/// before it (forward fill), else the earliest one after it (backward fill
/// for leading gaps). The column is never empty here.
fn value_at(observations: &BTreeMap<NaiveDate, f64>, date: NaiveDate) -> f64 {
    if let Some((_, &value)) = observations.range(..=date).next_back() {
        return value;
    }
    *observations.values().next().expect("non-empty column")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn price_table(n: usize) -> RawTable {
        let mut table = RawTable::new(vec!["Date", "Price"]);
        for i in 0..n {
            let d = date(2024, 1, 1) + Duration::days(i as i64);
            table.push_row(vec![d.format("%Y-%m-%d").to_string(), format!("{}", 100 + i)]);
        }
        table
    }

    fn feature_table(name: &str, start: NaiveDate, values: &[f64]) -> RawTable {
        let mut table = RawTable::new(vec!["Date".to_string(), name.to_string()]);
        for (i, v) in values.iter().enumerate() {
            let d = start + Duration::days(i as i64);
            table.push_row(vec![d.format("%Y-%m-%d").to_string(), format!("{v}")]);
        }
        table
    }

    #[test]
    fn align_matches_target_index() {
        let target = price_table(10);
        let past = feature_table("temp", date(2024, 1, 1), &[20.0, 21.0, 22.0, 23.0, 24.0]);
        let future = feature_table("temp", date(2024, 1, 11), &[25.0, 26.0]);

        let (p, f) = align(&target, &[past], &[future], 4).unwrap();

        assert_eq!(p.len(), 10);
        assert_eq!(p.width(), 1);
        assert_eq!(p.start(), Some(date(2024, 1, 1)));
        // Past runs out after day 5; remaining days forward-fill.
        assert_eq!(p.column("temp").unwrap(), &[
            20.0, 21.0, 22.0, 23.0, 24.0, 24.0, 24.0, 24.0, 24.0, 24.0
        ]);

        assert_eq!(f.len(), 4);
        assert_eq!(f.start(), Some(date(2024, 1, 11)));
        // Future data covers two days; the last row repeats.
        assert_eq!(f.column("temp").unwrap(), &[25.0, 26.0, 26.0, 26.0]);
        assert_eq!(p.names(), f.names());
    }

    #[test]
    fn align_extends_short_future_to_horizon() {
        let target = price_table(20);
        let past = feature_table(
            "temp",
            date(2024, 1, 1),
            &(0..20).map(|i| i as f64).collect::<Vec<_>>(),
        );
        let future = feature_table("temp", date(2024, 1, 21), &[1.0, 2.0, 3.0, 4.0, 5.0]);

        let (_, f) = align(&target, &[past], &[future], 10).unwrap();

        assert_eq!(f.len(), 10);
        assert_eq!(
            f.column("temp").unwrap(),
            &[1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0]
        );
    }

    #[test]
    fn align_fills_sentiment_future_with_zero() {
        let target = price_table(6);
        let weather_past = feature_table("temp", date(2024, 1, 1), &[20.0; 6]);
        let weather_future = feature_table("temp", date(2024, 1, 7), &[21.0; 3]);
        let sentiment_past = feature_table("news_sentiment", date(2024, 1, 2), &[0.4, -0.1, 0.2]);

        let (p, f) = align(
            &target,
            &[weather_past, sentiment_past],
            &[weather_future],
            3,
        )
        .unwrap();

        assert_eq!(p.names(), &["temp", "news_sentiment"]);
        // Leading gap backward-fills from the first observation.
        assert_eq!(
            p.column("news_sentiment").unwrap(),
            &[0.4, 0.4, -0.1, 0.2, 0.2, 0.2]
        );
        // No future source for the derived feature: neutral zero.
        assert_eq!(f.column("news_sentiment").unwrap(), &[0.0, 0.0, 0.0]);
        assert_eq!(f.column("temp").unwrap(), &[21.0, 21.0, 21.0]);
    }

    #[test]
    fn align_merges_tables_column_wise() {
        let target = price_table(4);
        let t1 = feature_table("temp", date(2024, 1, 1), &[10.0, 11.0, 12.0, 13.0]);
        let t2 = feature_table("precip", date(2024, 1, 2), &[1.0, 2.0]);

        let (p, _) = align(&target, &[t1, t2], &[], 2).unwrap();

        assert_eq!(p.width(), 2);
        assert_eq!(p.column("temp").unwrap(), &[10.0, 11.0, 12.0, 13.0]);
        assert_eq!(p.column("precip").unwrap(), &[1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn align_drops_non_numeric_columns() {
        let target = price_table(3);
        let mut covariates = RawTable::new(vec!["Date", "headline", "sentiment"]);
        covariates.push_row(vec!["2024-01-01", "rice up", "0.5"]);
        covariates.push_row(vec!["2024-01-02", "rice down", "-0.5"]);

        let (p, f) = align(&target, &[covariates], &[], 2).unwrap();

        assert_eq!(p.names(), &["sentiment"]);
        assert_eq!(f.names(), &["sentiment"]);
        assert_eq!(f.column("sentiment").unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn align_empty_inputs_yield_empty_matrices() {
        let empty_target = RawTable::new(vec!["Date", "Price"]);
        let covariates = feature_table("temp", date(2024, 1, 1), &[1.0]);
        let (p, f) = align(&empty_target, &[covariates], &[], 5).unwrap();
        assert!(p.is_empty());
        assert!(f.is_empty());

        let target = price_table(5);
        let (p, f) = align(&target, &[], &[], 5).unwrap();
        assert!(p.is_empty());
        assert!(f.is_empty());
    }

    #[test]
    fn align_rejects_zero_horizon() {
        let target = price_table(5);
        assert!(matches!(
            align(&target, &[], &[], 0),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn exog_matrix_accessors() {
        let m = ExogMatrix::new(
            date(2024, 1, 1),
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();

        assert_eq!(m.len(), 2);
        assert_eq!(m.width(), 2);
        assert_eq!(m.row(1), vec![2.0, 4.0]);
        assert_eq!(m.date_at(1), Some(date(2024, 1, 2)));
        assert_eq!(m.date_at(2), None);
        assert_eq!(m.column("b").unwrap(), &[3.0, 4.0]);
        assert!(m.column("c").is_none());

        let t = m.truncated(1);
        assert_eq!(t.len(), 1);
        assert_eq!(t.row(0), vec![1.0, 3.0]);
    }

    #[test]
    fn exog_matrix_rejects_ragged_columns() {
        let result = ExogMatrix::new(
            date(2024, 1, 1),
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0, 2.0], vec![3.0]],
        );
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }
}
