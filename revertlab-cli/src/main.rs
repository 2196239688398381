//! RevertLab CLI — run, batch, and config scaffolding commands.
//!
//! Commands:
//! - `run` — backtest one instrument from a TOML config or a price CSV
//! - `batch` — backtest several price CSVs in parallel, one per instrument
//! - `init-config` — write a TOML config with the default strategy parameters

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use revertlab_core::StrategyParams;
use revertlab_runner::runner::{run_batch, run_single_backtest};
use revertlab_runner::{save_artifacts, BacktestConfig, BacktestResult, LoadOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "revertlab",
    about = "RevertLab CLI — oscillator mean-reversion backtester"
)]
struct Cli {
    /// Raise log verbosity to debug. RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Strategy parameter overrides shared by `run` and `batch`.
#[derive(Args, Debug, Default, Clone)]
struct StrategyArgs {
    /// Rolling window for the average gain/loss.
    #[arg(long)]
    window: Option<usize>,

    /// Enter when the oscillator is below this value.
    #[arg(long)]
    entry: Option<f64>,

    /// Exit early when the oscillator is above this value.
    #[arg(long)]
    exit: Option<f64>,

    /// Holding horizon in bars before a time stop.
    #[arg(long)]
    max_holding: Option<usize>,
}

impl StrategyArgs {
    fn apply(&self, params: &mut StrategyParams) {
        if let Some(window) = self.window {
            params.window = window;
        }
        if let Some(entry) = self.entry {
            params.entry_threshold = entry;
        }
        if let Some(exit) = self.exit {
            params.exit_threshold = exit;
        }
        if let Some(max_holding) = self.max_holding {
            params.max_holding = max_holding;
        }
    }
}

/// Date range and artifact options shared by `run` and `batch`.
#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Start date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,

    /// Generate a synthetic series when no price file is given.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Output directory for artifacts.
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,

    /// Print the summary only; write no artifacts.
    #[arg(long, default_value_t = false)]
    no_artifacts: bool,
}

impl RunArgs {
    fn load_options(&self) -> Result<LoadOptions> {
        Ok(LoadOptions {
            start: parse_date_arg(self.start.as_deref())?,
            end: parse_date_arg(self.end.as_deref())?,
            synthetic: self.synthetic,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest a single instrument.
    Run {
        /// Path to a TOML config file.
        #[arg(long, conflicts_with = "prices")]
        config: Option<PathBuf>,

        /// Price CSV (Date, Open, Adj Close columns).
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Instrument label. Defaults to the CSV file stem.
        #[arg(long)]
        symbol: Option<String>,

        #[command(flatten)]
        strategy: StrategyArgs,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Backtest several price CSVs in parallel.
    Batch {
        /// Price CSVs; each file stem becomes the instrument label.
        #[arg(required = true)]
        prices: Vec<PathBuf>,

        #[command(flatten)]
        strategy: StrategyArgs,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Write a TOML config with default strategy parameters.
    InitConfig {
        /// Instrument label.
        #[arg(long, default_value = "SPY")]
        symbol: String,

        /// Price CSV to reference from the config.
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Destination file. Prints to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            prices,
            symbol,
            strategy,
            run,
        } => run_cmd(config, prices, symbol, &strategy, &run),
        Commands::Batch {
            prices,
            strategy,
            run,
        } => batch_cmd(&prices, &strategy, &run),
        Commands::InitConfig {
            symbol,
            prices,
            output,
        } => init_config_cmd(symbol, prices, output.as_deref()),
    }
}

fn init_tracing(verbose: u8) {
    let default = if verbose > 0 { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn parse_date_arg(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
        })
        .transpose()
}

fn symbol_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .with_context(|| format!("cannot derive a symbol from {}", path.display()))
}

fn run_cmd(
    config_path: Option<PathBuf>,
    prices: Option<PathBuf>,
    symbol: Option<String>,
    strategy: &StrategyArgs,
    run: &RunArgs,
) -> Result<()> {
    let mut config = match (config_path, prices) {
        (Some(path), _) => {
            let mut config = BacktestConfig::from_file(&path)?;
            if let Some(symbol) = symbol {
                config.backtest.symbol = symbol;
            }
            config
        }
        (None, Some(prices)) => {
            let symbol = match symbol {
                Some(s) => s,
                None => symbol_from_path(&prices)?,
            };
            BacktestConfig::for_symbol(symbol, Some(prices))
        }
        (None, None) if run.synthetic => {
            BacktestConfig::for_symbol(symbol.unwrap_or_else(|| "SYNTH".into()), None)
        }
        (None, None) => bail!("one of --config, --prices or --synthetic is required"),
    };
    strategy.apply(&mut config.strategy);

    let result = run_single_backtest(&config, &run.load_options()?)?;
    print_summary(&result);

    if !run.no_artifacts {
        let run_dir = save_artifacts(&result, &run.output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn batch_cmd(prices: &[PathBuf], strategy: &StrategyArgs, run: &RunArgs) -> Result<()> {
    let configs = prices
        .iter()
        .map(|path| {
            let symbol = symbol_from_path(path)?;
            let mut config = BacktestConfig::for_symbol(symbol, Some(path.clone()));
            strategy.apply(&mut config.strategy);
            Ok(config)
        })
        .collect::<Result<Vec<_>>>()?;

    let results = run_batch(&configs, &run.load_options()?);

    let mut failures = 0usize;
    for (config, result) in configs.iter().zip(results) {
        match result {
            Ok(result) => {
                print_summary(&result);
                if !run.no_artifacts {
                    let run_dir = save_artifacts(&result, &run.output_dir)?;
                    println!("Artifacts saved to: {}", run_dir.display());
                }
            }
            Err(err) => {
                failures += 1;
                eprintln!("Error for {}: {err}", config.backtest.symbol);
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} backtests failed", configs.len());
    }
    Ok(())
}

fn init_config_cmd(symbol: String, prices: Option<PathBuf>, output: Option<&Path>) -> Result<()> {
    let toml = BacktestConfig::for_symbol(symbol, prices).to_toml()?;
    match output {
        Some(path) => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            std::fs::write(path, toml)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Config written to: {}", path.display());
        }
        None => print!("{toml}"),
    }
    Ok(())
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".into(),
    }
}

fn print_summary(result: &BacktestResult) {
    println!("{}", format_summary(result));
}

fn format_summary(result: &BacktestResult) -> String {
    let r = &result.report;
    let p = &result.params;
    let mut lines = vec![
        String::new(),
        "=== Backtest Result ===".to_string(),
        format!("Symbol:         {}", result.symbol),
        format!(
            "Period:         {} to {}",
            result.start_date, result.end_date
        ),
        format!(
            "Strategy:       window {} / entry < {} / exit > {} / hold {}",
            p.window, p.entry_threshold, p.exit_threshold, p.max_holding
        ),
        format!("Bars:           {}", result.bar_count),
        format!("Trades:         {}", r.trade_count),
    ];
    if !result.trades.is_empty() {
        let returns: Vec<String> = result
            .trades
            .iter()
            .map(|t| format!("{:.2}%", t.pnl * 100.0))
            .collect();
        lines.push(format!("Trade Returns:  {}", returns.join(", ")));
    }
    lines.extend([
        String::new(),
        "--- Performance ---".to_string(),
        format!("Win Rate:       {}", fmt_pct(r.win_rate)),
        format!("Avg Gain:       {}", fmt_pct(r.avg_win)),
        format!("Avg Loss:       {}", fmt_pct(r.avg_loss)),
        format!("Expectancy:     {}", fmt_pct(r.expectancy)),
        format!("Total Return:   {:.2}%", r.total_return * 100.0),
        format!("Buy & Hold:     {:.2}%", r.buy_and_hold_return * 100.0),
    ]);
    if !result.warnings.is_empty() {
        lines.push(String::new());
    }
    lines.extend(result.warnings.iter().map(|w| format!("WARNING: {w}")));
    lines.join("\n")
}
