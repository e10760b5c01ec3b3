//! Constant carry-forward model.
//!
//! Repeats the last observed value for every future day. Used as the
//! sparse-history fallback: a weekly-seasonal model needs several full
//! cycles to be numerically stable, and below that threshold a flat
//! projection is the safe answer. Produces no confidence bounds.

use crate::core::{DailySeries, Forecast};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;

#[derive(Debug, Clone, Default)]
pub struct CarryForward {
    last_value: Option<f64>,
}

impl CarryForward {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Forecaster for CarryForward {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        self.last_value = Some(series.last_value().ok_or(ForecastError::EmptyData)?);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let last = self.last_value.ok_or(ForecastError::FitRequired)?;
        Ok(Forecast::from_mean(vec![last; horizon]))
    }

    fn name(&self) -> &str {
        "CarryForward"
    }
}
