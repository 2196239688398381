//! Error kinds raised by the engine stages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which side of a trade a scheduled date belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeLeg {
    Entry,
    Exit,
}

impl fmt::Display for TradeLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeLeg::Entry => f.write_str("entry"),
            TradeLeg::Exit => f.write_str("exit"),
        }
    }
}

/// Structured errors for a backtest run.
///
/// `DataQuality` and `Configuration` abort the run before any report exists.
/// `Alignment` is an invariant violation inside the state machine and is
/// always fatal. `MissingBar` aborts a single trade; the simulator reports it
/// as a diagnostic instead of failing the whole run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("data quality error: {0}")]
    DataQuality(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("entry/exit alignment violated: {entries} entries vs {exits} exits")]
    Alignment { entries: usize, exits: usize },

    #[error("no price bar for scheduled {leg} date {date}")]
    MissingBar { date: NaiveDate, leg: TradeLeg },
}

impl EngineError {
    /// True for errors that only invalidate a single trade.
    pub fn is_trade_local(&self) -> bool {
        matches!(self, EngineError::MissingBar { .. })
    }
}
