//! CLI argument definitions for prevista.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `symbols` | List symbols the selected provider can serve |
//! | `price` | Fetch the current price for a symbol |
//! | `history` | Fetch normalized daily close history |
//! | `forecast` | Fit the model and print the banded forecast frame |
//! | `providers` | List registered providers |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--provider` | `binance` | Which upstream adapter handles the request |
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors (exit code 5) |
//! | `--offline` | `false` | Deterministic offline data, no network |
//! | `--timeout-ms` | `10000` | Per-command upstream budget in ms |
//!
//! # Examples
//!
//! ```bash
//! prevista price BTCUSDT
//! prevista history ETHUSDT --days 90 --pretty
//! prevista forecast BTCUSDT --days 30 --interval-width 0.95
//! prevista forecast BTCUSDT --until 2027-01-01 --notify --channel 42
//! ```

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use prevista_core::ProviderId;

/// Market data fetch and probabilistic forecasting CLI.
///
/// Pulls price history from Binance, CoinGecko, or Yahoo Finance,
/// normalizes it, and fits a decomposable trend/seasonality model with
/// confidence bands over an adjustable horizon.
#[derive(Debug, Parser)]
#[command(
    name = "prevista",
    author,
    version,
    about = "Market data and probabilistic forecast CLI"
)]
pub struct Cli {
    /// Upstream provider handling this request.
    #[arg(long, global = true, value_enum, default_value_t = ProviderSelector::Binance)]
    pub provider: ProviderSelector,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Serve deterministic offline data instead of calling upstream APIs.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Upstream call budget in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON envelope.
    Json,
    /// Human-readable table.
    Table,
}

/// Provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderSelector {
    /// Binance exchange trading API (USDT pairs).
    Binance,
    /// CoinGecko market-data aggregator (coin ids).
    Coingecko,
    /// Yahoo Finance chart API (tickers, incl. -USD crypto pairs).
    Yahoo,
}

impl From<ProviderSelector> for ProviderId {
    fn from(selector: ProviderSelector) -> Self {
        match selector {
            ProviderSelector::Binance => ProviderId::Binance,
            ProviderSelector::Coingecko => ProviderId::Coingecko,
            ProviderSelector::Yahoo => ProviderId::Yahoo,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List symbols the selected provider can serve.
    ///
    /// Falls back to a fixed well-known list when the upstream listing is
    /// unavailable.
    Symbols,

    /// Fetch the current price for a symbol.
    Price(PriceArgs),

    /// Fetch normalized daily close history for a symbol.
    History(HistoryArgs),

    /// Fit the forecast model and print the banded frame.
    ///
    /// The horizon is either an explicit day count or a target end date;
    /// an end date in the past degrades to a 1-day horizon with a warning.
    Forecast(ForecastArgs),

    /// List registered providers.
    Providers,
}

/// Arguments for the `price` command.
#[derive(Debug, Args)]
pub struct PriceArgs {
    /// Asset symbol in the provider's namespace (e.g. BTCUSDT, bitcoin,
    /// BTC-USD).
    pub symbol: String,
}

/// Arguments for the `history` command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Asset symbol in the provider's namespace.
    pub symbol: String,

    /// Trailing window of history to fetch, in days.
    #[arg(long, default_value_t = 365)]
    pub days: u32,
}

/// Arguments for the `forecast` command.
#[derive(Debug, Args)]
#[command(group(
    clap::ArgGroup::new("horizon")
        .required(true)
        .args(["days", "until"])
))]
pub struct ForecastArgs {
    /// Asset symbol in the provider's namespace.
    pub symbol: String,

    /// Forecast horizon as a day count (1..=3650).
    #[arg(long, conflicts_with = "until")]
    pub days: Option<u32>,

    /// Forecast horizon as a target end date (YYYY-MM-DD).
    #[arg(long)]
    pub until: Option<String>,

    /// Trailing window of history to feed the model, in days.
    #[arg(long, default_value_t = 365)]
    pub lookback_days: u32,

    /// Nominal coverage of the uncertainty band, strictly between 0 and 1.
    #[arg(long, default_value_t = 0.80)]
    pub interval_width: f64,

    /// Enable daily seasonality (only meaningful on sub-daily data).
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub daily_seasonality: bool,

    /// Enable weekly seasonality.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub weekly_seasonality: bool,

    /// Enable yearly seasonality.
    #[arg(long, action = ArgAction::Set, default_value_t = false)]
    pub yearly_seasonality: bool,

    /// Push a text alert with the forecast summary after a successful run.
    #[arg(long, default_value_t = false, requires = "channel")]
    pub notify: bool,

    /// Notification channel (Telegram chat id). Required with --notify.
    #[arg(long, requires = "notify")]
    pub channel: Option<String>,
}
