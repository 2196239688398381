//! Trade simulator — prices the schedule at next-bar opens.
//!
//! Pure function: schedule + bars → trades. Entries and exits fill at the
//! open of the scheduled date, never at the adjusted close that produced
//! the signal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{PriceBar, Trade};
use crate::error::{EngineError, TradeLeg};
use crate::signals::SignalSchedule;

/// Simulated trades plus per-trade failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Simulation {
    pub trades: Vec<Trade>,
    /// `MissingBar` errors for trades that could not be priced.
    #[serde(skip)]
    pub skipped: Vec<EngineError>,
}

/// Price every scheduled pair.
///
/// Fails with `Alignment` if the entry and exit sequences diverge. A pair
/// whose entry or exit date has no bar is skipped and recorded in
/// `Simulation::skipped`.
pub fn simulate_trades(
    schedule: &SignalSchedule,
    bars: &[PriceBar],
) -> Result<Simulation, EngineError> {
    let entries = schedule.entry_dates.len();
    let exits = schedule.exit_dates.len();
    if entries != exits || schedule.pairs.len() != entries {
        return Err(EngineError::Alignment { entries, exits });
    }

    let opens: HashMap<NaiveDate, f64> = bars.iter().map(|b| (b.date, b.open)).collect();
    let lookup = |date: NaiveDate, leg: TradeLeg| {
        opens
            .get(&date)
            .copied()
            .ok_or(EngineError::MissingBar { date, leg })
    };

    let mut sim = Simulation::default();
    for ((&entry_date, &exit_date), pair) in schedule
        .entry_dates
        .iter()
        .zip(&schedule.exit_dates)
        .zip(&schedule.pairs)
    {
        let priced = lookup(entry_date, TradeLeg::Entry)
            .and_then(|entry| lookup(exit_date, TradeLeg::Exit).map(|exit| (entry, exit)));
        match priced {
            Ok((entry_price, exit_price)) => sim.trades.push(Trade {
                entry_date,
                exit_date,
                entry_price,
                exit_price,
                pnl: exit_price / entry_price - 1.0,
                exit_reason: pair.reason,
                bars_held: pair.bars_held(),
            }),
            Err(err) => sim.skipped.push(err),
        }
    }

    Ok(sim)
}
