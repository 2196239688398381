//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! Provides the artifact set for one backtest run:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade tape and cumulative-return curve
//! - **Chart JSON**: series for an external renderer
//! - **Markdown**: human-readable single-run report
//!
//! The manifest carries a `schema_version` field. Newer versions are
//! rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use revertlab_core::domain::{ExitReason, Trade};

use crate::chart::ChartSeries;
use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

/// Serialize chart series to pretty JSON.
pub fn export_chart_json(chart: &ChartSeries) -> Result<String> {
    serde_json::to_string_pretty(chart).context("failed to serialize chart series")
}

// ─── CSV export ─────────────────────────────────────────────────────

fn reason_label(reason: ExitReason) -> &'static str {
    match reason {
        ExitReason::Early => "early",
        ExitReason::TimeStop => "time_stop",
    }
}

/// Export a trade list as CSV.
///
/// Columns: entry_date, entry_price, exit_date, exit_price, return,
/// exit_reason, bars_held
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "entry_date",
        "entry_price",
        "exit_date",
        "exit_price",
        "return",
        "exit_reason",
        "bars_held",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.entry_date.to_string(),
            &format!("{:.6}", t.entry_price),
            &t.exit_date.to_string(),
            &format!("{:.6}", t.exit_price),
            &format!("{:.6}", t.pnl),
            reason_label(t.exit_reason),
            &t.bars_held.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the compounded return curve, one row per trade exit.
pub fn export_equity_csv(trades: &[Trade], curve: &[f64]) -> Result<String> {
    if trades.len() != curve.len() {
        bail!(
            "curve length {} does not match trade count {}",
            curve.len(),
            trades.len()
        );
    }
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trade", "exit_date", "cumulative_return"])?;
    for (i, (t, value)) in trades.iter().zip(curve).enumerate() {
        wtr.write_record([
            &(i + 1).to_string(),
            &t.exit_date.to_string(),
            &format!("{:.6}", value),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

fn sanitize(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}

/// Save the full artifact set for a single backtest run.
///
/// Creates a directory named `{symbol}_{params}_{timestamp}/` under
/// `output_dir`, where `params` is a prefix of the params hash. A `_2`,
/// `_3`, ... suffix is appended when that name already exists, so runs
/// saved within the same second never share a directory. It contains:
/// - `manifest.json` — the full `BacktestResult`
/// - `trades.csv` — trade tape
/// - `equity.csv` — compounded return at each exit
/// - `chart.json` — price, oscillator, markers and equity series
/// - `report.md` — Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;
    let base = format!(
        "{}_{}_{}",
        sanitize(&result.symbol),
        result.params_hash.get(..8).unwrap_or(&result.params_hash),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = create_unique_dir(output_dir, &base)?;

    let write = |name: &str, contents: &str| -> Result<()> {
        let path = run_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))
    };

    write("manifest.json", &export_json(result)?)?;
    write("trades.csv", &export_trades_csv(&result.trades)?)?;
    write(
        "equity.csv",
        &export_equity_csv(&result.trades, &result.report.cumulative_return_curve)?,
    )?;
    write("chart.json", &export_chart_json(&result.chart)?)?;
    write("report.md", &generate_report(result))?;

    tracing::debug!(dir = %run_dir.display(), "artifacts written");
    Ok(run_dir)
}

fn create_unique_dir(parent: &Path, base: &str) -> Result<PathBuf> {
    let mut attempt = 1usize;
    loop {
        let name = if attempt == 1 {
            base.to_string()
        } else {
            format!("{base}_{attempt}")
        };
        let dir = parent.join(name);
        match std::fs::create_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to create artifact dir: {}", dir.display()))
            }
        }
    }
}

/// Load a `BacktestResult` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

fn pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".into(),
    }
}

/// Generate a Markdown report for a single backtest run.
pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str(&format!("# Backtest Report: {}\n\n", result.symbol));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        result.start_date, result.end_date
    ));
    md.push_str(&format!(
        "| Bars | {} ({} oscillator readings) |\n",
        result.bar_count, result.oscillator_count
    ));
    md.push_str(&format!("| Signals | {} |\n", result.signal_count));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    md.push_str(&format!("| Params Hash | {} |\n", result.params_hash));
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    let p = &result.params;
    md.push_str("## Strategy\n\n");
    md.push_str(&format!("- **Window**: {}\n", p.window));
    md.push_str(&format!("- **Entry below**: {}\n", p.entry_threshold));
    md.push_str(&format!("- **Exit above**: {}\n", p.exit_threshold));
    md.push_str(&format!("- **Max holding**: {} bars\n\n", p.max_holding));

    let r = &result.report;
    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Trades | {} |\n", r.trade_count));
    md.push_str(&format!("| Win Rate | {} |\n", pct(r.win_rate)));
    md.push_str(&format!("| Avg Win | {} |\n", pct(r.avg_win)));
    md.push_str(&format!("| Avg Loss | {} |\n", pct(r.avg_loss)));
    md.push_str(&format!("| Expectancy | {} |\n", pct(r.expectancy)));
    md.push_str(&format!(
        "| Total Return | {:.2}% |\n",
        r.total_return * 100.0
    ));
    md.push_str(&format!(
        "| Buy & Hold | {:.2}% |\n",
        r.buy_and_hold_return * 100.0
    ));
    md.push('\n');

    if !result.trades.is_empty() {
        md.push_str("## Trades\n\n");
        md.push_str("| Entry | Exit | Return | Reason | Bars |\n");
        md.push_str("| --- | --- | --- | --- | --- |\n");
        for t in &result.trades {
            md.push_str(&format!(
                "| {} | {} | {:.2}% | {} | {} |\n",
                t.entry_date,
                t.exit_date,
                t.pnl * 100.0,
                reason_label(t.exit_reason),
                t.bars_held
            ));
        }
        md.push('\n');
    }

    if !result.warnings.is_empty() {
        md.push_str("## Warnings\n\n");
        for warn in &result.warnings {
            md.push_str(&format!("- {warn}\n"));
        }
        md.push('\n');
    }

    md
}
