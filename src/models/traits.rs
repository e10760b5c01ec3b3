//! Forecaster trait defining the common interface for the engine's models.

use crate::core::{DailySeries, Forecast};
use crate::error::Result;

/// Common interface for forecasting models.
///
/// Object-safe; the engine holds models as `Box<dyn Forecaster>` when it
/// chooses between the seasonal model and the sparse-history fallback.
pub trait Forecaster {
    /// Fit the model to a normalized daily series.
    fn fit(&mut self, series: &DailySeries) -> Result<()>;

    /// Generate point predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with confidence intervals at `level` (e.g. 0.95).
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon)
    }

    /// Model name for diagnostics.
    fn name(&self) -> &str;
}
