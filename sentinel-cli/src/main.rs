//! Sentinel CLI: read-only market scans and setup backtests.
//!
//! Commands:
//! - `scan`: classify regimes, detect long setups and size them
//! - `backtest`: replay the setups over history and report R statistics
//! - `presets`: list the trading-style presets
//!
//! Reports go to stdout (or `--out`); logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sentinel_runner::{
    format_backtest_text, format_pair_list, format_scan_text, list_pairs, run_backtests, run_scan,
    to_json_string, write_json, write_text, CandleSource, CandleStore, ScanOptions,
    SentinelConfig, TradingPreset, DEFAULT_BACKTEST_BARS, DEFAULT_CONFIG_FILE,
};

#[derive(Parser)]
#[command(
    name = "sentinel",
    about = "Sentinel: read-only crypto regime scanner and setup backtester"
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan USDT pairs for regime, A+ setups and position size.
    Scan {
        /// Candle directory (<data-dir>/<timeframe>/<BASE>_<QUOTE>.csv).
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Trading style: scalping, intraday, swing, position.
        #[arg(long, default_value = "swing")]
        preset: String,

        /// Overrides the preset timeframe.
        #[arg(long)]
        timeframe: Option<String>,

        /// Overrides the preset history depth.
        #[arg(long)]
        bars: Option<usize>,

        /// Maximum rows reported.
        #[arg(long, default_value_t = sentinel_runner::scan::DEFAULT_SCAN_LIMIT)]
        limit: usize,

        /// Overrides the preset pair cap.
        #[arg(long)]
        max_pairs: Option<usize>,

        /// Rank pairs by quote volume (uses <data-dir>/tickers.csv).
        #[arg(long, default_value_t = false)]
        quality: bool,

        /// Liquidity floor for --quality, in USDT.
        #[arg(long)]
        min_qv: Option<f64>,

        /// Skip stablecoin bases (USDC/USDT, FDUSD/USDT, ...).
        #[arg(long, default_value_t = false)]
        exclude_stables: bool,

        /// Run the pullback and breakout-retest detectors on TREND pairs.
        #[arg(long, default_value_t = false)]
        setups: bool,

        /// Append the trader briefing.
        #[arg(long, default_value_t = false)]
        brief: bool,

        /// Print the filtered, sorted pair list and skip regime analysis.
        #[arg(long, default_value_t = false, conflicts_with_all = ["setups", "brief"])]
        list_only: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the report here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Comma-separated symbols to serve from synthetic candles.
        #[arg(long, value_delimiter = ',')]
        synthetic: Vec<String>,
    },
    /// Backtest the setups on each pair and timeframe.
    Backtest {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Comma-separated pairs.
        #[arg(long, value_delimiter = ',', default_values = ["BTC/USDT", "ETH/USDT"])]
        pairs: Vec<String>,

        /// Comma-separated timeframes.
        #[arg(long, value_delimiter = ',', default_values = ["1h", "4h"])]
        timeframes: Vec<String>,

        #[arg(long, default_value_t = DEFAULT_BACKTEST_BARS)]
        bars: usize,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Comma-separated symbols to serve from synthetic candles.
        #[arg(long, value_delimiter = ',')]
        synthetic: Vec<String>,
    },
    /// List the trading-style presets.
    Presets {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Scan {
            data_dir,
            preset,
            timeframe,
            bars,
            limit,
            max_pairs,
            quality,
            min_qv,
            exclude_stables,
            setups,
            brief,
            list_only,
            format,
            out,
            config,
            synthetic,
        } => {
            let preset = TradingPreset::from_key(&preset);
            let opts = ScanOptions {
                timeframe: timeframe.unwrap_or_else(|| preset.timeframe().to_string()),
                bars: bars.unwrap_or_else(|| preset.bars()),
                limit,
                max_pairs: max_pairs.unwrap_or_else(|| preset.max_pairs()),
                quality,
                min_qv,
                exclude_stables,
                setups,
                brief,
            };
            run_scan_cmd(
                &data_dir,
                &config,
                synthetic,
                &opts,
                list_only,
                format,
                out.as_deref(),
            )
        }
        Commands::Backtest {
            data_dir,
            pairs,
            timeframes,
            bars,
            format,
            out,
            config,
            synthetic,
        } => run_backtest_cmd(
            &data_dir,
            &config,
            synthetic,
            clean_list(pairs),
            clean_list(timeframes),
            bars,
            format,
            out.as_deref(),
        ),
        Commands::Presets { format } => run_presets(format),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn load_config(path: &Path) -> Result<SentinelConfig> {
    SentinelConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

fn emit(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => write_text(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_scan_cmd(
    data_dir: &Path,
    config_path: &Path,
    synthetic: Vec<String>,
    opts: &ScanOptions,
    list_only: bool,
    format: OutputFormat,
    out: Option<&Path>,
) -> Result<()> {
    if opts.bars == 0 {
        bail!("--bars must be positive");
    }
    if let Some(qv) = opts.min_qv {
        if !qv.is_finite() || qv < 0.0 {
            bail!("--min-qv must be a non-negative number, got {qv}");
        }
        if !opts.quality {
            warn!("--min-qv has no effect without --quality");
        }
    }

    let cfg = load_config(config_path)?;
    let store = CandleStore::new(data_dir).with_synthetic(clean_list(synthetic));
    let universe = store.symbols(&opts.timeframe)?;
    if universe.is_empty() {
        bail!(
            "no candle files under {} (expected <BASE>_<QUOTE>.csv files)",
            data_dir.join(&opts.timeframe).display()
        );
    }

    let markets = store.markets()?;
    if opts.quality && markets.is_none() {
        warn!("no tickers.csv in {}; quality ranking has no volumes", data_dir.display());
    }

    if list_only {
        let list = list_pairs(&universe, markets.as_deref(), &cfg, opts);
        return match (format, out) {
            (OutputFormat::Json, Some(path)) => Ok(write_json(path, &list)?),
            (OutputFormat::Json, None) => {
                print!("{}", to_json_string(&list)?);
                Ok(())
            }
            (OutputFormat::Text, out) => emit(
                &format!("Data: {}\n{}", data_dir.display(), format_pair_list(&list)),
                out,
            ),
        };
    }

    info!(
        pairs = universe.len(),
        timeframe = %opts.timeframe,
        bars = opts.bars,
        "starting scan"
    );
    let report = run_scan(&store, &universe, markets.as_deref(), &cfg, opts);

    match (format, out) {
        (OutputFormat::Json, Some(path)) => write_json(path, &report)?,
        (OutputFormat::Json, None) => print!("{}", to_json_string(&report)?),
        (OutputFormat::Text, out) => {
            let header = format!(
                "Data: {} | generated {}\n",
                data_dir.display(),
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            );
            emit(&(header + &format_scan_text(&report)), out)?;
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_backtest_cmd(
    data_dir: &Path,
    config_path: &Path,
    synthetic: Vec<String>,
    pairs: Vec<String>,
    timeframes: Vec<String>,
    bars: usize,
    format: OutputFormat,
    out: Option<&Path>,
) -> Result<()> {
    if pairs.is_empty() {
        bail!("--pairs is empty");
    }
    if timeframes.is_empty() {
        bail!("--timeframes is empty");
    }
    if bars == 0 {
        bail!("--bars must be positive");
    }

    let cfg = load_config(config_path)?;
    let store = CandleStore::new(data_dir).with_synthetic(clean_list(synthetic));
    let report = run_backtests(&store, &pairs, &timeframes, bars, &cfg);

    match (format, out) {
        (OutputFormat::Json, Some(path)) => write_json(path, &report)?,
        (OutputFormat::Json, None) => print!("{}", to_json_string(&report)?),
        (OutputFormat::Text, out) => emit(&format_backtest_text(&report), out)?,
    }
    Ok(())
}

fn run_presets(format: OutputFormat) -> Result<()> {
    let summaries: Vec<_> = TradingPreset::ALL.iter().map(|p| p.summary()).collect();
    match format {
        OutputFormat::Json => print!("{}", to_json_string(&summaries)?),
        OutputFormat::Text => {
            println!(
                "{:<10} {:<24} {:>4} {:>6} {:>9} {:>6}",
                "KEY", "LABEL", "TF", "BARS", "REFRESH", "PAIRS"
            );
            for s in &summaries {
                println!(
                    "{:<10} {:<24} {:>4} {:>6} {:>8}s {:>6}",
                    s.key, s.label, s.timeframe, s.bars, s.refresh_seconds, s.max_pairs
                );
            }
        }
    }
    Ok(())
}
