//! Core data structures: raw tables, normalized series, covariate matrices,
//! and forecast results.

mod exog;
mod forecast;
mod series;
mod table;

pub use exog::{align, ExogMatrix};
pub use forecast::{Forecast, ForecastRow, ForecastTable};
pub use series::{normalize, normalize_with, DailySeries, GapFill, NormalizeOptions};
pub use table::{infer_columns, ColumnAliases, ColumnSelection, RawTable};
