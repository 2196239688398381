//! Momentum oscillator over a rolling simple-mean window.
//!
//! value = 100 - 100 / (1 + avg_gain / avg_loss)
//! Warmup: the first `window - 1` returns produce no point.
//! Edge cases: avg_loss == 0 → 100 (or 50 when avg_gain == 0 too).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::returns::ReturnPoint;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatorPoint {
    pub date: NaiveDate,
    pub avg_gain: f64,
    pub avg_loss: f64,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    window: usize,
    name: String,
}

impl Oscillator {
    pub fn new(window: usize) -> Result<Self, EngineError> {
        if window == 0 {
            return Err(EngineError::Configuration(
                "oscillator window must be >= 1".into(),
            ));
        }
        Ok(Self {
            window,
            name: format!("osc_{window}"),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// One point per full window; empty when the window exceeds the input.
    ///
    /// Each mean is summed over its own window rather than rolled forward, so
    /// a window without losses has an `avg_loss` of exactly zero.
    pub fn compute(&self, returns: &[ReturnPoint]) -> Vec<OscillatorPoint> {
        if returns.len() < self.window {
            return Vec::new();
        }
        let divisor = self.window as f64;

        returns
            .windows(self.window)
            .map(|w| {
                let avg_gain = w.iter().map(|r| r.gain).sum::<f64>() / divisor;
                let avg_loss = w.iter().map(|r| r.loss).sum::<f64>() / divisor;
                OscillatorPoint {
                    date: w[w.len() - 1].date,
                    avg_gain,
                    avg_loss,
                    value: oscillator_value(avg_gain, avg_loss),
                }
            })
            .collect()
    }
}

pub fn oscillator_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
