//! # graincast
//!
//! Multi-horizon forecasting for daily price series.
//!
//! Takes a messy, irregularly sampled raw table (any column names, string
//! cells), normalizes it into a clean gap-free daily series, fits a fixed
//! seasonal ARIMA with weekly seasonality, and produces consistent forecasts
//! at several horizons. Optionally conditions on exogenous covariates such
//! as news sentiment or weather, in which case 95% confidence bounds are
//! produced as well.
//!
//! ```
//! use graincast::core::{normalize, RawTable};
//! use graincast::engine::forecast;
//!
//! let mut table = RawTable::new(vec!["Date", "Price"]);
//! for i in 0..30 {
//!     table.push_row(vec![format!("2024-01-{:02}", i + 1), format!("{}", 100 + i)]);
//! }
//! let series = normalize(&table);
//! let results = forecast(&series, &[7, 30]).unwrap();
//! assert_eq!(results[&7].len(), 7);
//! ```

pub mod core;
pub mod engine;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{
        align, normalize, DailySeries, ExogMatrix, Forecast, ForecastTable, RawTable,
    };
    pub use crate::engine::{forecast, forecast_with_exog, DEFAULT_HORIZONS};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{Forecaster, SarimaSpec};
}
