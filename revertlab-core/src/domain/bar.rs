//! PriceBar — one daily observation of the traded instrument.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Daily bar carrying the two prices the engine needs.
///
/// `adj_close` drives returns and the oscillator; `open` is the execution
/// price for entries and exits scheduled on this date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub adj_close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, adj_close: f64) -> Self {
        Self {
            date,
            open,
            adj_close,
        }
    }

    /// Both prices are finite and strictly positive.
    pub fn is_sane(&self) -> bool {
        self.open.is_finite()
            && self.adj_close.is_finite()
            && self.open > 0.0
            && self.adj_close > 0.0
    }
}

/// Check a price series before any stage touches it.
///
/// Fails with `DataQuality` when the series is shorter than `min_len`, when
/// any price is non-finite or non-positive, or when dates are not strictly
/// increasing. Calendar gaps are allowed.
pub fn validate_series(bars: &[PriceBar], min_len: usize) -> Result<(), EngineError> {
    if bars.len() < min_len {
        return Err(EngineError::DataQuality(format!(
            "need at least {min_len} bars, got {}",
            bars.len()
        )));
    }
    if let Some(bad) = bars.iter().find(|b| !b.is_sane()) {
        return Err(EngineError::DataQuality(format!(
            "bar {} has invalid prices (open={}, adj_close={})",
            bad.date, bad.open, bad.adj_close
        )));
    }
    if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
        return Err(EngineError::DataQuality(format!(
            "dates must be strictly increasing: {} follows {}",
            pair[1].date, pair[0].date
        )));
    }
    Ok(())
}
