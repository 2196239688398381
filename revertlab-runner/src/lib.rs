//! RevertLab Runner — backtest orchestration, metrics, and artifacts.
//!
//! This crate builds on `revertlab-core` to provide:
//! - Price loading from CSV with a synthetic fallback
//! - TOML run configuration
//! - Performance metrics (win rate, expectancy, compounded curve, buy-and-hold)
//! - Single and batch (one pipeline per instrument, in parallel) runners
//! - Chart series for an external renderer
//! - JSON / CSV / Markdown artifact export

pub mod chart;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use chart::{ChartSeries, SeriesPoint};
pub use config::{BacktestConfig, BacktestSection, ConfigError};
pub use data_loader::{load_series, DataSource, LoadError, LoadOptions, LoadedSeries};
pub use export::{load_artifacts, save_artifacts};
pub use metrics::PerformanceReport;
pub use runner::{run_backtest_from_data, run_batch, run_single_backtest, BacktestResult, RunError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn performance_report_is_send_sync() {
        assert_send::<PerformanceReport>();
        assert_sync::<PerformanceReport>();
    }

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<LoadOptions>();
        assert_sync::<LoadOptions>();
    }

    #[test]
    fn loaded_series_is_send_sync() {
        assert_send::<LoadedSeries>();
        assert_sync::<LoadedSeries>();
    }

    #[test]
    fn chart_series_is_send_sync() {
        assert_send::<ChartSeries>();
        assert_sync::<ChartSeries>();
    }
}
