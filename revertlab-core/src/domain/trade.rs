//! Trade — one completed long round trip.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Oscillator rose above the exit threshold inside the horizon.
    Early,
    /// Horizon elapsed without an early exit.
    TimeStop,
}

/// A long trade entered and exited at the open of the scheduled bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    /// `exit_price / entry_price - 1`.
    pub pnl: f64,
    pub exit_reason: ExitReason,
    /// Oscillator steps between entry and exit.
    pub bars_held: usize,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.pnl < 0.0
    }
}
