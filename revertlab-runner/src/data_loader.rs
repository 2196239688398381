//! Price loading for the runner.
//!
//! Retrieval is external: the runner reads a CSV the data provider already
//! produced. Resolution policy:
//! 1. If a CSV path is given → parse it
//! 2. If not and `--synthetic` → generate a synthetic series (tagged)
//! 3. Otherwise → fail with a clear error
//!
//! Accepted headers are Yahoo-style (`Date,Open,High,Low,Close,Adj Close,Volume`)
//! or lowercase (`date,open,adj_close`). `Close` stands in for a missing
//! `Adj Close` column. Blank or `null` prices load as NaN so the engine's
//! data-quality check rejects them instead of silently dropping rows.

use chrono::{Datelike, NaiveDate};
use revertlab_core::domain::PriceBar;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no price file for '{symbol}' (pass a CSV path or use --synthetic)")]
    NoSource { symbol: String },

    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unparseable date '{value}'")]
    BadDate { row: usize, value: String },

    #[error("duplicate date {0} in price series")]
    DuplicateDate(NaiveDate),

    #[error("no bars for '{symbol}' in the requested range")]
    Empty { symbol: String },
}

/// Options controlling how bars are loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Drop bars before this date.
    pub start: Option<NaiveDate>,
    /// Drop bars after this date.
    pub end: Option<NaiveDate>,
    /// Generate a synthetic series when no CSV is given.
    pub synthetic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Csv,
    Synthetic,
}

/// A loaded price series with provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub source: DataSource,
    /// BLAKE3 over dates, opens and adjusted closes.
    pub dataset_hash: String,
}

impl LoadedSeries {
    pub fn from_bars(symbol: impl Into<String>, bars: Vec<PriceBar>, source: DataSource) -> Self {
        let dataset_hash = compute_dataset_hash(&bars);
        Self {
            symbol: symbol.into(),
            bars,
            source,
            dataset_hash,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date", alias = "timestamp")]
    date: String,
    #[serde(default, alias = "Open", deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(default, alias = "Close", deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(
        default,
        alias = "Adj Close",
        alias = "adjclose",
        deserialize_with = "csv::invalid_option"
    )]
    adj_close: Option<f64>,
}

/// Load the series for `symbol` following the resolution policy.
pub fn load_series(
    symbol: &str,
    prices: Option<&Path>,
    opts: &LoadOptions,
) -> Result<LoadedSeries, LoadError> {
    let (bars, source) = match prices {
        Some(path) => (load_csv(path)?, DataSource::Csv),
        None if opts.synthetic => {
            warn!(symbol, "generating synthetic data, results will be tagged as synthetic");
            let start = opts.start.unwrap_or_else(default_synthetic_start);
            let end = opts
                .end
                .unwrap_or_else(|| start + chrono::Duration::days(365 * 5));
            (generate_synthetic_bars(symbol, start, end), DataSource::Synthetic)
        }
        None => {
            return Err(LoadError::NoSource {
                symbol: symbol.to_string(),
            })
        }
    };

    let bars = filter_range(bars, opts.start, opts.end);
    if bars.is_empty() {
        return Err(LoadError::Empty {
            symbol: symbol.to_string(),
        });
    }
    info!(symbol, bars = bars.len(), source = ?source, "loaded price series");
    Ok(LoadedSeries::from_bars(symbol, bars, source))
}

pub fn load_csv(path: &Path) -> Result<Vec<PriceBar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv(file)
}

/// Parse a price CSV into bars sorted by date.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<PriceBar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let date = parse_date(&row.date).ok_or_else(|| LoadError::BadDate {
            row: i + 1,
            value: row.date.clone(),
        })?;
        bars.push(PriceBar::new(
            date,
            row.open.unwrap_or(f64::NAN),
            row.adj_close.or(row.close).unwrap_or(f64::NAN),
        ));
    }

    bars.sort_by_key(|b| b.date);
    if let Some(w) = bars.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(LoadError::DuplicateDate(w[0].date));
    }
    Ok(bars)
}

fn default_synthetic_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn filter_range(
    bars: Vec<PriceBar>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<PriceBar> {
    bars.into_iter()
        .filter(|b| start.map_or(true, |s| b.date >= s) && end.map_or(true, |e| b.date <= e))
        .collect()
}

/// Compute a deterministic BLAKE3 hash over the series.
fn compute_dataset_hash(bars: &[PriceBar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.adj_close.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Generate synthetic bars for testing/development.
///
/// Produces a random walk from 100.0 on weekdays only. The seed is derived
/// from the symbol, so the same symbol always yields the same series.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday != chrono::Weekday::Sat && weekday != chrono::Weekday::Sun {
            let open = price * (1.0 + rng.gen_range(-0.005..0.005));
            let close = price * (1.0 + rng.gen_range(-0.03..0.03));
            bars.push(PriceBar::new(current, open, close));
            price = close;
        }
        current += chrono::Duration::days(1);
    }

    bars
}
