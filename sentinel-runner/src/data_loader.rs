//! Candle loading for the runner.
//!
//! Candles come from a directory of CSV files laid out as
//! `<data_dir>/<timeframe>/<BASE>_<QUOTE>.csv`, each with the header
//! `timestamp,open,high,low,close,volume` (epoch milliseconds, oldest first).
//! An optional `<data_dir>/tickers.csv` (`symbol,quote_volume,active`) feeds
//! quality ranking.
//!
//! Synthetic candles are a developer-only mode: a symbol listed as synthetic
//! never touches the filesystem and every load of it logs a warning.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use sentinel_core::{Candle, CandleWindow, CoreError, MarketInfo};

/// Name of the optional market metadata file at the data directory root.
pub const TICKERS_FILE: &str = "tickers.csv";

/// Spacing of synthetic candles (one hour).
const SYNTHETIC_STEP_MS: i64 = 3_600_000;
/// Timestamp of the first synthetic candle (2024-01-01T00:00:00Z).
const SYNTHETIC_START_MS: i64 = 1_704_067_200_000;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{}': timestamp at row {row} is not after the previous one", path.display())]
    NotChronological { path: PathBuf, row: usize },

    #[error("'{}': timestamp {timestamp_ms} at row {row} is out of range", path.display())]
    InvalidTimestamp {
        path: PathBuf,
        row: usize,
        timestamp_ms: i64,
    },

    #[error("'{}': {field} at row {row} is not a finite non-negative number", path.display())]
    InvalidValue {
        path: PathBuf,
        row: usize,
        field: &'static str,
    },

    #[error("'{}': no candles", path.display())]
    Empty { path: PathBuf },

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Debug, Deserialize)]
struct CandleRecord {
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl CandleRecord {
    /// First OHLCV field that is not a finite non-negative number.
    fn invalid_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite() || *v < 0.0)
        .map(|(name, _)| name)
    }
}

#[derive(Debug, Deserialize)]
struct TickerRecord {
    symbol: String,
    quote_volume: Option<f64>,
    active: Option<bool>,
}

// ── Paths ──

/// `BTC/USDT` → `BTC_USDT.csv`.
pub fn symbol_file_name(symbol: &str) -> String {
    format!("{}.csv", symbol.replace('/', "_"))
}

/// `BTC_USDT` → `BTC/USDT`. Only the first underscore separates base and quote.
pub fn symbol_from_file_stem(stem: &str) -> String {
    stem.replacen('_', "/", 1)
}

pub fn candle_path(data_dir: &Path, timeframe: &str, symbol: &str) -> PathBuf {
    data_dir.join(timeframe).join(symbol_file_name(symbol))
}

// ── CSV loading ──

/// Parse one candle file, enforcing strictly increasing timestamps and
/// finite, non-negative OHLCV values.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let mut reader = csv_reader(path)?;

    let mut candles: Vec<Candle> = Vec::new();
    for (row, record) in reader.deserialize::<CandleRecord>().enumerate() {
        let r = record.map_err(|source| csv_error(path, source))?;
        if DateTime::<Utc>::from_timestamp_millis(r.timestamp).is_none() {
            return Err(LoadError::InvalidTimestamp {
                path: path.to_path_buf(),
                row: row + 1,
                timestamp_ms: r.timestamp,
            });
        }
        if let Some(field) = r.invalid_field() {
            return Err(LoadError::InvalidValue {
                path: path.to_path_buf(),
                row: row + 1,
                field,
            });
        }
        if let Some(prev) = candles.last() {
            if r.timestamp <= prev.timestamp_ms {
                return Err(LoadError::NotChronological {
                    path: path.to_path_buf(),
                    row: row + 1,
                });
            }
        }
        candles.push(Candle {
            timestamp_ms: r.timestamp,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        });
    }

    if candles.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(candles)
}

/// Load the most recent `bars` candles of `symbol` on `timeframe`.
pub fn load_window(
    data_dir: &Path,
    symbol: &str,
    timeframe: &str,
    bars: usize,
) -> Result<CandleWindow, LoadError> {
    let candles = load_recent_candles(data_dir, symbol, timeframe, bars)?;
    Ok(CandleWindow::from_candles(&candles))
}

fn load_recent_candles(
    data_dir: &Path,
    symbol: &str,
    timeframe: &str,
    bars: usize,
) -> Result<Vec<Candle>, LoadError> {
    let mut candles = load_candles(&candle_path(data_dir, timeframe, symbol))?;
    let start = candles.len().saturating_sub(bars);
    candles.drain(..start);
    Ok(candles)
}

/// Symbols with a candle file for `timeframe`, sorted.
pub fn discover_symbols(data_dir: &Path, timeframe: &str) -> Result<Vec<String>, LoadError> {
    let dir = data_dir.join(timeframe);
    let entries = std::fs::read_dir(&dir).map_err(|source| LoadError::Io {
        path: dir.clone(),
        source,
    })?;

    let mut symbols = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| LoadError::Io {
                path: dir.clone(),
                source,
            })?
            .path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            symbols.push(symbol_from_file_stem(stem));
        }
    }
    symbols.sort();
    debug!(dir = %dir.display(), count = symbols.len(), "discovered symbols");
    Ok(symbols)
}

/// Read `<data_dir>/tickers.csv` if present.
pub fn load_tickers(data_dir: &Path) -> Result<Option<Vec<MarketInfo>>, LoadError> {
    let path = data_dir.join(TICKERS_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let mut reader = csv_reader(&path)?;

    let mut markets = Vec::new();
    for record in reader.deserialize::<TickerRecord>() {
        let r = record.map_err(|source| csv_error(&path, source))?;
        markets.push(MarketInfo {
            symbol: r.symbol,
            active: r.active,
            quote_volume: r.quote_volume,
        });
    }
    Ok(Some(markets))
}

fn csv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn csv_error(path: &Path, source: csv::Error) -> LoadError {
    LoadError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

// ── Synthetic data ──

/// Deterministic hourly random walk from 100.0, seeded by the symbol name.
///
/// Drifts slightly upward so the detectors have something to find.
pub fn synthetic_candles(symbol: &str, bars: usize) -> Vec<Candle> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut candles = Vec::with_capacity(bars);
    let mut price = 100.0_f64;
    for i in 0..bars {
        let ret: f64 = rng.gen_range(-0.012..0.014);
        let open = price;
        let close = price * (1.0 + ret);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.004));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.004));
        candles.push(Candle {
            timestamp_ms: SYNTHETIC_START_MS + i as i64 * SYNTHETIC_STEP_MS,
            open,
            high,
            low,
            close,
            volume: rng.gen_range(1_000.0..50_000.0),
        });
        price = close;
    }
    candles
}

/// BLAKE3 digest over symbols and candle values, in symbol order.
pub fn dataset_hash(windows: &[(String, CandleWindow)]) -> String {
    let mut sorted: Vec<&(String, CandleWindow)> = windows.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = blake3::Hasher::new();
    for (symbol, window) in sorted {
        hasher.update(symbol.as_bytes());
        hasher.update(&(window.len() as u64).to_le_bytes());
        for ((h, l), c) in window
            .highs()
            .iter()
            .zip(window.lows())
            .zip(window.closes())
        {
            hasher.update(&h.to_le_bytes());
            hasher.update(&l.to_le_bytes());
            hasher.update(&c.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

// ── Candle sources ──

/// Where scans and backtests get their candles.
pub trait CandleSource: Sync {
    /// The most recent `bars` candles, oldest first.
    fn candles(&self, symbol: &str, timeframe: &str, bars: usize)
        -> Result<Vec<Candle>, LoadError>;

    /// Symbols available on `timeframe`.
    fn symbols(&self, timeframe: &str) -> Result<Vec<String>, LoadError>;

    /// Market metadata for quality ranking, if the source has any.
    fn markets(&self) -> Result<Option<Vec<MarketInfo>>, LoadError> {
        Ok(None)
    }

    /// True when `symbol` is served from generated data.
    fn is_synthetic(&self, _symbol: &str) -> bool {
        false
    }

    fn window(&self, symbol: &str, timeframe: &str, bars: usize) -> Result<CandleWindow, LoadError> {
        Ok(CandleWindow::from_candles(&self.candles(symbol, timeframe, bars)?))
    }
}

/// CSV directory store, with optional synthetic stand-ins for listed symbols.
#[derive(Debug, Clone)]
pub struct CandleStore {
    data_dir: PathBuf,
    synthetic: BTreeSet<String>,
}

impl CandleStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            synthetic: BTreeSet::new(),
        }
    }

    /// Serve these symbols from [`synthetic_candles`] instead of disk.
    pub fn with_synthetic<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synthetic.extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn has_synthetic(&self) -> bool {
        !self.synthetic.is_empty()
    }
}

impl CandleSource for CandleStore {
    fn candles(
        &self,
        symbol: &str,
        timeframe: &str,
        bars: usize,
    ) -> Result<Vec<Candle>, LoadError> {
        if self.is_synthetic(symbol) {
            warn!(symbol, timeframe, "using synthetic candles; results are not market data");
            return Ok(synthetic_candles(symbol, bars));
        }
        load_recent_candles(&self.data_dir, symbol, timeframe, bars)
    }

    fn symbols(&self, timeframe: &str) -> Result<Vec<String>, LoadError> {
        let dir = self.data_dir.join(timeframe);
        let mut symbols = if dir.is_dir() {
            discover_symbols(&self.data_dir, timeframe)?
        } else {
            Vec::new()
        };
        symbols.extend(self.synthetic.iter().cloned());
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }

    fn markets(&self) -> Result<Option<Vec<MarketInfo>>, LoadError> {
        load_tickers(&self.data_dir)
    }

    fn is_synthetic(&self, symbol: &str) -> bool {
        self.synthetic.contains(symbol)
    }
}

/// RFC 3339 rendering of an epoch-millisecond timestamp.
pub fn format_timestamp(timestamp_ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms).map(|t| t.to_rfc3339())
}
