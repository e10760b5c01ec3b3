//! Multi-horizon forecast orchestration.
//!
//! Fits once at the largest requested horizon and slices prefixes for the
//! smaller ones, so a 7-day forecast always agrees with the first week of a
//! 30-day forecast from the same call. Series too short to support the
//! seasonal model, and fits that fail outright, land on the constant
//! carry-forward fallback instead of surfacing an error.

use std::collections::BTreeMap;

use chrono::Duration;

use crate::core::{DailySeries, ExogMatrix, Forecast, ForecastTable};
use crate::error::{ForecastError, Result};
use crate::models::{CarryForward, Forecaster, Sarima, SarimaSpec};
use crate::utils::ols_fit;

/// Horizons the dashboard requests, in days.
pub const DEFAULT_HORIZONS: [usize; 4] = [7, 30, 180, 365];

/// Below this many observations the seasonal model is skipped entirely and
/// the carry-forward fallback is used.
pub const MIN_FIT_OBSERVATIONS: usize = 20;

const CONFIDENCE_LEVEL: f64 = 0.95;

/// Forecast a daily series at each requested horizon.
///
/// All horizons share one model fit, so smaller horizons are exact prefixes
/// of larger ones. An empty series yields an empty table per horizon.
pub fn forecast(series: &DailySeries, horizons: &[usize]) -> Result<BTreeMap<usize, ForecastTable>> {
    forecast_with_spec(series, horizons, &SarimaSpec::default())
}

/// [`forecast`] with an explicit model structure.
pub fn forecast_with_spec(
    series: &DailySeries,
    horizons: &[usize],
    spec: &SarimaSpec,
) -> Result<BTreeMap<usize, ForecastTable>> {
    if horizons.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "at least one horizon is required".to_string(),
        ));
    }
    if horizons.contains(&0) {
        return Err(ForecastError::InvalidParameter(
            "horizons must be positive".to_string(),
        ));
    }

    if series.is_empty() {
        return Ok(horizons
            .iter()
            .map(|&h| (h, ForecastTable::empty()))
            .collect());
    }

    let max_horizon = *horizons.iter().max().unwrap_or(&0);
    let full = fit_and_predict(series, spec, max_horizon)?;
    let start = series.last_date().unwrap_or_default() + Duration::days(1);

    Ok(horizons
        .iter()
        .map(|&h| (h, ForecastTable::new(start, full.prefix(h))))
        .collect())
}

/// Fit the seasonal model, falling back to carry-forward on short history
/// or a failed fit.
fn fit_and_predict(series: &DailySeries, spec: &SarimaSpec, horizon: usize) -> Result<Forecast> {
    if series.len() < MIN_FIT_OBSERVATIONS.max(spec.min_observations()) {
        return carry_forward(series, horizon);
    }

    let mut model = Sarima::new(*spec);
    match model.fit(series).and_then(|_| model.predict(horizon)) {
        Ok(forecast) => Ok(forecast),
        Err(err) => {
            tracing::warn!(model = model.name(), error = %err, "fit failed, using carry-forward");
            carry_forward(series, horizon)
        }
    }
}

fn carry_forward(series: &DailySeries, horizon: usize) -> Result<Forecast> {
    let mut model = CarryForward::new();
    model.fit(series)?;
    model.predict(horizon)
}

/// Forecast a daily series conditioned on aligned exogenous covariates.
///
/// `past` must cover the series day for day and `future` must cover at
/// least `horizon` days, as produced by [`align`](crate::core::align). The
/// series is regressed on the past covariates, its residuals are modelled
/// with the seasonal structure, and the covariate contribution is added
/// back over the horizon. The result carries 95% confidence bounds except
/// on the fallback paths, which stay flat and unbounded.
pub fn forecast_with_exog(
    series: &DailySeries,
    past: &ExogMatrix,
    future: &ExogMatrix,
    horizon: usize,
) -> Result<ForecastTable> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "horizon must be positive".to_string(),
        ));
    }
    if series.is_empty() || past.is_empty() || future.is_empty() {
        return Ok(ForecastTable::empty());
    }
    if past.len() != series.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: series.len(),
            got: past.len(),
        });
    }
    if future.len() < horizon {
        return Err(ForecastError::DimensionMismatch {
            expected: horizon,
            got: future.len(),
        });
    }
    if past.names() != future.names() {
        return Err(ForecastError::InvalidParameter(
            "past and future covariate columns differ".to_string(),
        ));
    }

    let start = series.last_date().unwrap_or_default() + Duration::days(1);

    if series.len() < MIN_FIT_OBSERVATIONS {
        return Ok(ForecastTable::new(start, carry_forward(series, horizon)?));
    }

    let regression = ols_fit(series.values(), past)?;
    let fitted = regression.predict(past);
    let residuals: Vec<f64> = series
        .values()
        .iter()
        .zip(&fitted)
        .map(|(y, f)| y - f)
        .collect();
    let residual_series = DailySeries::new(series.start().unwrap_or_default(), residuals);

    let future_window = future.truncated(horizon);
    let contribution = regression.predict(&future_window);

    let mut model = Sarima::default();
    let residual_forecast = match model
        .fit(&residual_series)
        .and_then(|_| model.predict_with_intervals(horizon, CONFIDENCE_LEVEL))
    {
        Ok(forecast) => forecast,
        Err(err) => {
            tracing::warn!(model = model.name(), error = %err, "fit failed, using carry-forward");
            return Ok(ForecastTable::new(start, carry_forward(series, horizon)?));
        }
    };

    let shift = |values: &[f64]| -> Vec<f64> {
        values
            .iter()
            .zip(&contribution)
            .map(|(v, c)| v + c)
            .collect()
    };
    let mean = shift(residual_forecast.mean());
    if mean.iter().any(|v| !v.is_finite()) {
        tracing::warn!("non-finite combined forecast, using carry-forward");
        return Ok(ForecastTable::new(start, carry_forward(series, horizon)?));
    }

    let combined = match (residual_forecast.lower(), residual_forecast.upper()) {
        (Some(lower), Some(upper)) => Forecast::with_intervals(mean, shift(lower), shift(upper)),
        _ => Forecast::from_mean(mean),
    };

    Ok(ForecastTable::new(start, combined))
}
