//! Daily series representation and raw-table normalization.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use tracing::warn;

use crate::core::table::{
    infer_columns, parse_date_cell, parse_numeric_cell, ColumnAliases, RawTable,
};

/// Policy for filling calendar days inserted by daily reindexing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GapFill {
    /// Repeat the most recent known value.
    ForwardFill,
    /// Insert a fixed value.
    Fill(f64),
}

/// Options for [`normalize_with`].
///
/// Rows whose date or price cell fails to parse are always dropped; only
/// the gap-fill policy and the column alias table are configurable.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub aliases: ColumnAliases,
    pub gap_fill: GapFill,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            aliases: ColumnAliases::default(),
            gap_fill: GapFill::ForwardFill,
        }
    }
}

/// A contiguous daily series: a start date plus one value per day.
///
/// The representation enforces the normalization invariants structurally:
/// consecutive entries are exactly one day apart, there are no duplicate
/// dates and no missing values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySeries {
    start: Option<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeries {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(start: NaiveDate, values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::empty();
        }
        Self {
            start: Some(start),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.start
            .map(|s| s + Duration::days(self.values.len() as i64 - 1))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.values.len() {
            return None;
        }
        self.start.map(|s| s + Duration::days(index as i64))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let start = self.start;
        (0..self.values.len()).filter_map(move |i| start.map(|s| s + Duration::days(i as i64)))
    }
}

/// Normalize a raw table into a daily series with default options.
///
/// See [`normalize_with`] for the full contract.
pub fn normalize(table: &RawTable) -> DailySeries {
    normalize_with(table, &NormalizeOptions::default())
}

/// Normalize a raw table into a clean, gap-free daily series.
///
/// Column selection is by alias match with positional fallback (see
/// [`infer_columns`](crate::core::infer_columns)); the fallback is logged at
/// warn level since it can silently misread arbitrary tables. Rows with an
/// unparsable date or price are dropped. Surviving rows are ordered by date
/// with the last value per date winning, then reindexed to one row per
/// calendar day with inserted days filled per the gap policy.
///
/// An empty table, or one fully invalidated by coercion, yields an empty
/// series rather than an error.
pub fn normalize_with(table: &RawTable, options: &NormalizeOptions) -> DailySeries {
    let Some(selection) = infer_columns(table.columns(), &options.aliases) else {
        return DailySeries::empty();
    };

    if !selection.date_by_alias || !selection.price_by_alias {
        warn!(
            date_column = table.columns()[selection.date].as_str(),
            price_column = table.columns()[selection.price].as_str(),
            "no alias match; falling back to positional column selection"
        );
    }

    // Input order stands in for the stable date sort: the last row seen for
    // a date wins.
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in table.rows() {
        let date = row.get(selection.date).and_then(|c| parse_date_cell(c));
        let value = row.get(selection.price).and_then(|c| parse_numeric_cell(c));
        if let (Some(date), Some(value)) = (date, value) {
            by_date.insert(date, value);
        }
    }

    let (Some((&first, _)), Some((&last, _))) =
        (by_date.iter().next(), by_date.iter().next_back())
    else {
        return DailySeries::empty();
    };

    let mut values = Vec::with_capacity((last - first).num_days() as usize + 1);
    let mut current = first;
    let mut previous = f64::NAN;
    while current <= last {
        match by_date.get(&current) {
            Some(&v) => {
                previous = v;
                values.push(v);
            }
            None => values.push(match options.gap_fill {
                GapFill::ForwardFill => previous,
                GapFill::Fill(fill) => fill,
            }),
        }
        current += Duration::days(1);
    }

    DailySeries::new(first, values)
}
