//! Strategy parameters — oscillator window, thresholds, holding horizon.
//!
//! Defaults reproduce the classic rule: 22-step window, enter below 30,
//! exit above 40, force the exit after 10 steps.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub const DEFAULT_WINDOW: usize = 22;
pub const DEFAULT_ENTRY_THRESHOLD: f64 = 30.0;
pub const DEFAULT_EXIT_THRESHOLD: f64 = 40.0;
pub const DEFAULT_MAX_HOLDING: usize = 10;

/// Parameters of the mean-reversion rule.
///
/// Every field has a serde default so a config file may override any subset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    /// Rolling window for the average gain/loss.
    pub window: usize,
    /// Oscillator values strictly below this trigger an entry.
    pub entry_threshold: f64,
    /// Oscillator values strictly above this trigger an early exit.
    pub exit_threshold: f64,
    /// Maximum number of steps inspected after the trigger before a time stop.
    pub max_holding: usize,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            entry_threshold: DEFAULT_ENTRY_THRESHOLD,
            exit_threshold: DEFAULT_EXIT_THRESHOLD,
            max_holding: DEFAULT_MAX_HOLDING,
        }
    }
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.window == 0 {
            return Err(EngineError::Configuration(
                "oscillator window must be >= 1".into(),
            ));
        }
        if self.max_holding == 0 {
            return Err(EngineError::Configuration(
                "max holding horizon must be >= 1".into(),
            ));
        }
        for (name, value) in [
            ("entry_threshold", self.entry_threshold),
            ("exit_threshold", self.exit_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(EngineError::Configuration(format!(
                    "{name} must be within [0, 100], got {value}"
                )));
            }
        }
        if self.checked_min_bars().is_none() {
            return Err(EngineError::Configuration(format!(
                "window ({}) plus max holding ({}) is too large",
                self.window, self.max_holding
            )));
        }
        if self.entry_threshold > self.exit_threshold {
            return Err(EngineError::Configuration(format!(
                "entry_threshold ({}) must not exceed exit_threshold ({})",
                self.entry_threshold, self.exit_threshold
            )));
        }
        Ok(())
    }

    /// Fewest bars that can produce one complete entry/exit pair.
    ///
    /// One bar is consumed by the first return, `window - 1` returns by the
    /// oscillator warmup, and the time stop needs `max_holding + 2` more steps.
    /// Saturates for parameters that `validate()` rejects.
    pub fn min_bars(&self) -> usize {
        self.checked_min_bars().unwrap_or(usize::MAX)
    }

    fn checked_min_bars(&self) -> Option<usize> {
        self.window.checked_add(self.max_holding)?.checked_add(2)
    }

    /// Deterministic BLAKE3 fingerprint over all parameter values.
    ///
    /// Uses a fixed textual encoding so the hash is stable across serde
    /// versions and field reordering.
    pub fn fingerprint(&self) -> String {
        let canonical = format!(
            "window={};entry={:?};exit={:?};max_holding={}",
            self.window, self.entry_threshold, self.exit_threshold, self.max_holding
        );
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }
}
