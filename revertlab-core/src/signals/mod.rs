//! Signal layer — per-step classification and the entry/exit state machine.
//!
//! Classification is a pure function of one oscillator value. The schedule
//! walks the classified series once, holding at most one position, and pairs
//! every entry with exactly one exit.

pub mod schedule;

pub use schedule::{resolve_exit, scan_pairs, ExitOutcome, ScanResult, SignalPair, SignalSchedule};

use serde::{Deserialize, Serialize};

use crate::params::StrategyParams;

/// Three-state reading of a single oscillator value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    /// Below the entry threshold: oversold, opens a position when flat.
    Entry,
    /// Between the thresholds: flat stays flat, an open position is kept.
    Hold,
    /// Above the exit threshold: momentum normalized, an open position exits.
    Idle,
}

pub fn classify(value: f64, params: &StrategyParams) -> Signal {
    if value < params.entry_threshold {
        Signal::Entry
    } else if value > params.exit_threshold {
        Signal::Idle
    } else {
        Signal::Hold
    }
}
