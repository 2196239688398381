//! Return series — period-over-period returns of the adjusted close.
//!
//! Each return is split into a non-negative gain and a non-negative loss
//! magnitude; at most one of the two is non-zero and `gain - loss == ret`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::PriceBar;
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub ret: f64,
    pub gain: f64,
    pub loss: f64,
}

impl ReturnPoint {
    pub fn from_return(date: NaiveDate, ret: f64) -> Self {
        Self {
            date,
            ret,
            gain: if ret > 0.0 { ret } else { 0.0 },
            loss: if ret < 0.0 { -ret } else { 0.0 },
        }
    }
}

/// Build the return series, one point per bar after the first.
///
/// Fails with `DataQuality` on fewer than two bars or on any adjusted close
/// that is non-finite or non-positive.
pub fn build_returns(bars: &[PriceBar]) -> Result<Vec<ReturnPoint>, EngineError> {
    if bars.len() < 2 {
        return Err(EngineError::DataQuality(format!(
            "returns need at least 2 bars, got {}",
            bars.len()
        )));
    }
    if let Some(bad) = bars
        .iter()
        .find(|b| !b.adj_close.is_finite() || b.adj_close <= 0.0)
    {
        return Err(EngineError::DataQuality(format!(
            "adjusted close on {} is not a finite positive price: {}",
            bad.date, bad.adj_close
        )));
    }

    Ok(bars
        .windows(2)
        .map(|w| ReturnPoint::from_return(w[1].date, w[1].adj_close / w[0].adj_close - 1.0))
        .collect())
}
