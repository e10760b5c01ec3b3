//! Forecasting models.

mod carry_forward;
mod diff;
mod sarima;
mod traits;

pub use carry_forward::CarryForward;
pub use diff::{difference, integrate};
pub use sarima::{Sarima, SarimaSpec};
pub use traits::Forecaster;
