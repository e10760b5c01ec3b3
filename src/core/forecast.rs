//! Forecast result structures.

use chrono::{Duration, NaiveDate};

/// Point predictions with optional 95% interval bounds, one value per step.
///
/// Undated; the engine attaches dates via [`ForecastTable`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    mean: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
}

impl Forecast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mean(mean: Vec<f64>) -> Self {
        Self {
            mean,
            lower: None,
            upper: None,
        }
    }

    /// Interval bounds must match the mean in length; mismatched bounds are
    /// a programming error.
    pub fn with_intervals(mean: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        debug_assert_eq!(mean.len(), lower.len());
        debug_assert_eq!(mean.len(), upper.len());
        Self {
            mean,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }

    /// First `n` steps (or all of them, if shorter) as a new forecast.
    pub fn prefix(&self, n: usize) -> Forecast {
        let n = n.min(self.mean.len());
        Forecast {
            mean: self.mean[..n].to_vec(),
            lower: self.lower.as_ref().map(|l| l[..n].to_vec()),
            upper: self.upper.as_ref().map(|u| u[..n].to_vec()),
        }
    }
}

/// One forecast day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub mean: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

/// A dated forecast: daily rows starting the day after the input series
/// ends. Smaller horizons from the same engine call are exact prefixes of
/// larger ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastTable {
    start: Option<NaiveDate>,
    forecast: Forecast,
}

impl ForecastTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(start: NaiveDate, forecast: Forecast) -> Self {
        if forecast.is_empty() {
            return Self::empty();
        }
        Self {
            start: Some(start),
            forecast,
        }
    }

    pub fn len(&self) -> usize {
        self.forecast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecast.is_empty()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn mean(&self) -> &[f64] {
        self.forecast.mean()
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.forecast.lower()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.forecast.upper()
    }

    pub fn has_intervals(&self) -> bool {
        self.forecast.has_intervals()
    }

    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.len() {
            return None;
        }
        self.start.map(|s| s + Duration::days(index as i64))
    }

    pub fn rows(&self) -> impl Iterator<Item = ForecastRow> + '_ {
        let start = self.start;
        (0..self.len()).filter_map(move |i| {
            Some(ForecastRow {
                date: start? + Duration::days(i as i64),
                mean: self.forecast.mean()[i],
                lower: self.forecast.lower().map(|l| l[i]),
                upper: self.forecast.upper().map(|u| u[i]),
            })
        })
    }

    pub fn prefix(&self, n: usize) -> ForecastTable {
        match self.start {
            Some(start) => ForecastTable::new(start, self.forecast.prefix(n)),
            None => ForecastTable::empty(),
        }
    }
}
