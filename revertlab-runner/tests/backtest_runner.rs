//! Integration tests for the runner: CSV on disk through to a result.

use chrono::NaiveDate;
use revertlab_core::domain::ExitReason;
use revertlab_core::StrategyParams;
use revertlab_runner::config::BacktestConfig;
use revertlab_runner::data_loader::{LoadError, LoadOptions};
use revertlab_runner::runner::{run_batch, run_single_backtest, RunError};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Write a Yahoo-style CSV where open equals the previous adjusted close.
fn write_csv(dir: &Path, name: &str, closes: &[f64]) -> PathBuf {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut body = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for (i, &c) in closes.iter().enumerate() {
        let open = if i == 0 { c } else { closes[i - 1] };
        let date = base + chrono::Duration::days(i as i64);
        writeln!(body, "{date},{open},{c},{c},{c},{c},1000").unwrap();
    }
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn window_one() -> StrategyParams {
    StrategyParams {
        window: 1,
        ..Default::default()
    }
}

fn config(symbol: &str, prices: PathBuf, params: StrategyParams) -> BacktestConfig {
    let mut config = BacktestConfig::for_symbol(symbol, Some(prices));
    config.strategy = params;
    config
}

/// Drop, bounce, then flat: one early exit.
fn dip_and_bounce() -> Vec<f64> {
    let mut closes = vec![100.0; 20];
    closes[1] = 95.0;
    for c in closes.iter_mut().skip(2) {
        *c = 96.0;
    }
    closes
}

#[test]
fn csv_dip_and_bounce_yields_one_early_exit() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "dip.csv", &dip_and_bounce());

    let result =
        run_single_backtest(&config("DIP", path, window_one()), &LoadOptions::default()).unwrap();

    // Oscillator steps: 0 = drop (value 0), 1 = bounce (100), then flat (50).
    // Trigger at step 0, bounce read at step 1, exit at step 2.
    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::Early);
    // Entry at the open of the bounce day (95.0), exit at the next open (96.0).
    assert!((trade.entry_price - 95.0).abs() < 1e-12);
    assert!((trade.exit_price - 96.0).abs() < 1e-12);
    assert!((trade.pnl - (96.0 / 95.0 - 1.0)).abs() < 1e-12);

    assert_eq!(result.report.win_rate, Some(1.0));
    assert_eq!(result.report.avg_loss, None);
    assert!((result.report.buy_and_hold_return - (-0.04)).abs() < 1e-12);
    assert_eq!(result.bar_count, 20);
    assert!(!result.has_synthetic);
    assert_eq!(result.chart.entries.len(), 1);
    assert_eq!(result.chart.equity.len(), 1);
}

#[test]
fn config_date_bounds_trim_the_series() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "flat.csv", &[100.0; 60]);
    let mut cfg = config("FLAT", path, StrategyParams::default());
    cfg.backtest.start_date = NaiveDate::from_ymd_opt(2024, 1, 10);

    let result = run_single_backtest(&cfg, &LoadOptions::default()).unwrap();
    assert_eq!(result.start_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    assert_eq!(result.bar_count, 60 - 8);
    assert!(result.trades.is_empty());
}

#[test]
fn command_line_dates_override_config_dates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "flat.csv", &[100.0; 60]);
    let mut cfg = config("FLAT", path, StrategyParams::default());
    cfg.backtest.start_date = NaiveDate::from_ymd_opt(2024, 1, 10);
    cfg.backtest.end_date = NaiveDate::from_ymd_opt(2024, 2, 25);
    let opts = LoadOptions {
        start: NaiveDate::from_ymd_opt(2024, 1, 5),
        ..Default::default()
    };

    let result = run_single_backtest(&cfg, &opts).unwrap();
    assert_eq!(result.start_date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    // No end on the command line: the config's end still applies.
    assert_eq!(result.end_date, NaiveDate::from_ymd_opt(2024, 2, 25).unwrap());
}

#[test]
fn missing_source_without_synthetic_fails() {
    let cfg = BacktestConfig::for_symbol("NONE", None);
    let err = run_single_backtest(&cfg, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, RunError::Data(LoadError::NoSource { .. })));
}

#[test]
fn synthetic_run_is_tagged_and_deterministic() {
    let cfg = BacktestConfig::for_symbol("SYNTH", None);
    let opts = LoadOptions {
        start: NaiveDate::from_ymd_opt(2020, 1, 1),
        end: NaiveDate::from_ymd_opt(2021, 12, 31),
        synthetic: true,
    };
    let a = run_single_backtest(&cfg, &opts).unwrap();
    let b = run_single_backtest(&cfg, &opts).unwrap();
    assert!(a.has_synthetic);
    assert!(a.warnings.iter().any(|w| w.contains("SYNTHETIC")));
    assert_eq!(a.dataset_hash, b.dataset_hash);
    assert_eq!(a.trades, b.trades);
}

#[test]
fn short_series_is_an_engine_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "short.csv", &[100.0; 10]);
    let err = run_single_backtest(
        &config("SHORT", path, StrategyParams::default()),
        &LoadOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RunError::Engine(_)));
}

#[test]
fn batch_preserves_order_and_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_csv(dir.path(), "good.csv", &dip_and_bounce());
    let short = write_csv(dir.path(), "short.csv", &[100.0; 5]);
    let flat = write_csv(dir.path(), "flat.csv", &[100.0; 20]);

    let configs = vec![
        config("GOOD", good, window_one()),
        config("SHORT", short, window_one()),
        config("FLAT", flat, window_one()),
    ];
    let results = run_batch(&configs, &LoadOptions::default());

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().symbol, "GOOD");
    assert_eq!(results[0].as_ref().unwrap().trades.len(), 1);
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().symbol, "FLAT");
    assert!(results[2].as_ref().unwrap().trades.is_empty());
}
