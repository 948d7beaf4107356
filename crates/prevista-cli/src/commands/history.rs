use std::time::Duration;

use serde::Serialize;

use prevista_core::{normalize, MarketDataProvider, RawSeries, Symbol, TimeSeriesPoint};

use super::{data_error, CommandResult};
use crate::cli::HistoryArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct HistoryResponseData {
    symbol: Symbol,
    lookback_days: u32,
    points: Vec<TimeSeriesPoint>,
}

pub async fn run(
    args: &HistoryArgs,
    provider: &dyn MarketDataProvider,
    timeout_ms: u64,
) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;

    let raw = match tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        provider.historical_series(&symbol, args.days),
    )
    .await
    {
        Ok(raw) => raw,
        Err(_) => RawSeries::empty(provider.id()),
    };

    match normalize(&raw) {
        Ok(series) => {
            let data = serde_json::to_value(HistoryResponseData {
                symbol,
                lookback_days: args.days,
                points: series.points,
            })?;
            Ok(CommandResult::ok(data, vec![provider.id()]))
        }
        Err(error) => {
            let envelope_error = data_error(&error, provider.id())?;
            let data = serde_json::to_value(HistoryResponseData {
                symbol,
                lookback_days: args.days,
                points: Vec::new(),
            })?;
            Ok(CommandResult::ok(data, vec![provider.id()]).with_error(envelope_error))
        }
    }
}
