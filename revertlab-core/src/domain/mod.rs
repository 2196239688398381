//! Domain types for RevertLab

pub mod bar;
pub mod trade;

pub use bar::{validate_series, PriceBar};
pub use trade::{ExitReason, Trade};
