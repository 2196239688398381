//! Backtest runner — wires together loading, the engine pipeline, and metrics.
//!
//! Three entry points:
//! - `run_single_backtest()`: loads prices per the config, then runs. Used by CLI.
//! - `run_backtest_from_data()`: takes an already-loaded series. No I/O.
//! - `run_batch()`: one independent pipeline per config on the rayon pool.

use chrono::NaiveDate;
use rayon::prelude::*;
use revertlab_core::domain::Trade;
use revertlab_core::{run_pipeline, EngineError, StrategyParams};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::chart::ChartSeries;
use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_series, LoadError, LoadOptions, LoadedSeries};
use crate::metrics::PerformanceReport;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub params: StrategyParams,
    pub params_hash: String,
    pub report: PerformanceReport,
    pub trades: Vec<Trade>,
    pub chart: ChartSeries,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub oscillator_count: usize,
    pub signal_count: usize,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    /// Skipped trades, dropped trailing triggers, synthetic-data notices.
    pub warnings: Vec<String>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a single backtest from a config, loading prices first.
///
/// Date bounds in `opts` (the command line) take precedence over those in
/// the config file.
pub fn run_single_backtest(
    config: &BacktestConfig,
    opts: &LoadOptions,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let opts = LoadOptions {
        start: opts.start.or(config.backtest.start_date),
        end: opts.end.or(config.backtest.end_date),
        synthetic: opts.synthetic,
    };
    let series = load_series(
        &config.backtest.symbol,
        config.backtest.prices.as_deref(),
        &opts,
    )?;
    run_backtest_from_data(&series, &config.strategy)
}

/// Run a backtest on a loaded series — no I/O.
pub fn run_backtest_from_data(
    series: &LoadedSeries,
    params: &StrategyParams,
) -> Result<BacktestResult, RunError> {
    let (Some(first), Some(last)) = (series.bars.first(), series.bars.last()) else {
        let msg = format!("empty price series for {}", series.symbol);
        return Err(EngineError::DataQuality(msg).into());
    };
    let (start_date, end_date) = (first.date, last.date);

    let output = run_pipeline(&series.bars, params)?;
    let trades = output.simulation.trades;
    let report = PerformanceReport::compute(&trades, &series.bars);
    let chart = ChartSeries::build(
        &series.bars,
        &output.oscillator,
        &trades,
        &report.cumulative_return_curve,
    );

    let mut warnings: Vec<String> = output
        .simulation
        .skipped
        .iter()
        .map(|err| format!("trade skipped: {err}"))
        .collect();
    if let Some(date) = output.schedule.dropped_trigger {
        warnings.push(format!(
            "entry triggered on {date} dropped: series ends before the exit"
        ));
    }
    if series.is_synthetic() {
        warnings.push("results based on SYNTHETIC data".into());
    }

    info!(
        symbol = %series.symbol,
        trades = report.trade_count,
        total_return = report.total_return,
        buy_and_hold = report.buy_and_hold_return,
        "backtest complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        symbol: series.symbol.clone(),
        params: *params,
        params_hash: params.fingerprint(),
        report,
        trades,
        chart,
        start_date,
        end_date,
        bar_count: series.bars.len(),
        oscillator_count: output.oscillator.len(),
        signal_count: output.schedule.len(),
        dataset_hash: series.dataset_hash.clone(),
        has_synthetic: series.is_synthetic(),
        warnings,
    })
}

/// Run one independent pipeline per config in parallel.
///
/// Results come back in input order; a failing instrument does not affect
/// the others.
pub fn run_batch(
    configs: &[BacktestConfig],
    opts: &LoadOptions,
) -> Vec<Result<BacktestResult, RunError>> {
    configs
        .par_iter()
        .map(|config| {
            let result = run_single_backtest(config, opts);
            if let Err(err) = &result {
                warn!(symbol = %config.backtest.symbol, "backtest failed: {err}");
            }
            result
        })
        .collect()
}
