//! Backtesting engine — the four pure stages chained over one price series.
//!
//! 1. Validate parameters and bars
//! 2. Build returns and the oscillator
//! 3. Scan the oscillator into a dated entry/exit schedule
//! 4. Simulate trades at next-bar open prices
//!
//! Performance statistics are computed by the caller from `simulation.trades`.

pub mod simulate;

pub use simulate::{simulate_trades, Simulation};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{validate_series, PriceBar};
use crate::error::EngineError;
use crate::indicators::{Oscillator, OscillatorPoint};
use crate::params::StrategyParams;
use crate::returns::{build_returns, ReturnPoint};
use crate::signals::SignalSchedule;

/// Everything one pipeline run produces, stage by stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub returns: Vec<ReturnPoint>,
    pub oscillator: Vec<OscillatorPoint>,
    pub schedule: SignalSchedule,
    pub simulation: Simulation,
}

/// Run stages 1–4 over a price series.
///
/// Configuration and data-quality failures abort before any stage runs.
/// Trades that reference a missing bar are skipped and listed in
/// `simulation.skipped`.
pub fn run_pipeline(
    bars: &[PriceBar],
    params: &StrategyParams,
) -> Result<PipelineOutput, EngineError> {
    params.validate()?;
    validate_series(bars, params.min_bars())?;

    let returns = build_returns(bars)?;
    let oscillator = Oscillator::new(params.window)?.compute(&returns);
    debug!(
        bars = bars.len(),
        returns = returns.len(),
        oscillator = oscillator.len(),
        "computed oscillator"
    );

    let schedule = SignalSchedule::from_oscillator(&oscillator, params)?;
    if let Some(date) = schedule.dropped_trigger {
        debug!(%date, "entry trigger dropped: not enough data to complete the trade");
    }

    let simulation = simulate_trades(&schedule, bars)?;
    for err in &simulation.skipped {
        warn!("trade skipped: {err}");
    }
    debug!(
        signals = schedule.len(),
        trades = simulation.trades.len(),
        "simulated trades"
    );

    Ok(PipelineOutput {
        returns,
        oscillator,
        schedule,
        simulation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn rejects_invalid_params_before_data() {
        let bars = make_bars(&[100.0; 3]);
        let params = StrategyParams {
            window: 0,
            ..Default::default()
        };
        assert!(matches!(
            run_pipeline(&bars, &params),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn oversized_params_are_configuration_errors() {
        let bars = make_bars(&[100.0; 40]);
        let params = StrategyParams {
            window: usize::MAX - 1,
            max_holding: 1,
            ..Default::default()
        };
        assert!(matches!(
            run_pipeline(&bars, &params),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_short_series() {
        let bars = make_bars(&[100.0; 33]);
        let err = run_pipeline(&bars, &StrategyParams::default()).unwrap_err();
        assert!(matches!(err, EngineError::DataQuality(_)));
    }

    #[test]
    fn minimal_series_runs() {
        let bars = make_bars(&[100.0; 34]);
        let out = run_pipeline(&bars, &StrategyParams::default()).unwrap();
        assert_eq!(out.returns.len(), 33);
        assert_eq!(out.oscillator.len(), 12);
        // Flat prices → neutral oscillator → no entries.
        assert!(out.schedule.is_empty());
        assert!(out.simulation.trades.is_empty());
    }
}
