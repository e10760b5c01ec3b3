//! Numerical utilities shared by the models and the engine.

pub mod ols;
pub mod optimization;
pub mod stats;

pub use ols::{ols_fit, OlsFit};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::quantile_normal;
