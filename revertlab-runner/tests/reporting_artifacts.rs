//! Artifact bundle written by a real run and read back.

use revertlab_core::StrategyParams;
use revertlab_runner::config::BacktestConfig;
use revertlab_runner::data_loader::LoadOptions;
use revertlab_runner::export::{load_artifacts, save_artifacts};
use revertlab_runner::runner::run_single_backtest;

#[test]
fn saved_bundle_contains_every_artifact_and_reloads() {
    let out = tempfile::tempdir().unwrap();
    let mut cfg = BacktestConfig::for_symbol("BRK/B", None);
    cfg.strategy = StrategyParams {
        window: 5,
        ..Default::default()
    };
    let opts = LoadOptions {
        synthetic: true,
        ..Default::default()
    };
    let result = run_single_backtest(&cfg, &opts).unwrap();

    let dir = save_artifacts(&result, out.path()).unwrap();
    let name = dir.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("BRK_B_"), "{name}");

    for file in ["manifest.json", "trades.csv", "equity.csv", "chart.json", "report.md"] {
        assert!(dir.join(file).is_file(), "missing {file}");
    }

    let trades_csv = std::fs::read_to_string(dir.join("trades.csv")).unwrap();
    assert_eq!(trades_csv.lines().count(), result.trades.len() + 1);

    let report = std::fs::read_to_string(dir.join("report.md")).unwrap();
    assert!(report.contains("# Backtest Report: BRK/B"));
    assert!(report.contains("**SYNTHETIC**"));

    let loaded = load_artifacts(&dir).unwrap();
    assert_eq!(loaded.symbol, result.symbol);
    assert_eq!(loaded.trades.len(), result.trades.len());
    assert_eq!(loaded.params, result.params);
    assert_eq!(loaded.dataset_hash, result.dataset_hash);
}

#[test]
fn load_artifacts_from_empty_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_artifacts(dir.path()).unwrap_err();
    assert!(err.to_string().contains("manifest.json"));
}
