//! Lag differencing and integration for seasonal ARIMA.
//!
//! Regular differencing is lag 1; seasonal differencing is lag `period`.
//! Both reduce to the same lagged-difference primitive, and integration
//! reverses one differencing step given the pre-difference history.

/// Difference a series at the given lag: `y[t] - y[t - lag]`.
///
/// Returns an empty vector when the series is no longer than the lag.
pub fn difference(series: &[f64], lag: usize) -> Vec<f64> {
    if lag == 0 || series.len() <= lag {
        return Vec::new();
    }
    (lag..series.len())
        .map(|t| series[t] - series[t - lag])
        .collect()
}

/// Reverse one lag-differencing step for a forecast continuation.
///
/// `history` is the series *before* this differencing step; each forecast
/// value `f[k]` reconstructs `x[n + k] = f[k] + x[n + k - lag]`, drawing
/// lagged values from the history and, once the horizon exceeds the lag,
/// from previously reconstructed values.
pub fn integrate(forecast: &[f64], history: &[f64], lag: usize) -> Vec<f64> {
    if lag == 0 || history.len() < lag {
        return forecast.to_vec();
    }

    let mut extended = history.to_vec();
    for &f in forecast {
        let lagged = extended[extended.len() - lag];
        extended.push(f + lagged);
    }
    extended[history.len()..].to_vec()
}
