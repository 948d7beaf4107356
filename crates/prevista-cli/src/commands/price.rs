use std::time::Duration;

use serde::Serialize;

use prevista_core::{DataError, MarketDataProvider, Symbol};

use super::{data_error, CommandResult};
use crate::cli::PriceArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct PriceResponseData {
    symbol: Symbol,
    price: Option<f64>,
    currency: &'static str,
}

pub async fn run(
    args: &PriceArgs,
    provider: &dyn MarketDataProvider,
    timeout_ms: u64,
) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;

    let outcome = match tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        provider.current_price(&symbol),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(DataError::DataUnavailable(format!(
            "price request exceeded the {timeout_ms}ms budget"
        ))),
    };

    match outcome {
        Ok(price) => {
            let data = serde_json::to_value(PriceResponseData {
                symbol,
                price: Some(price),
                currency: "USD",
            })?;
            Ok(CommandResult::ok(data, vec![provider.id()]))
        }
        Err(error) => {
            let envelope_error = data_error(&error, provider.id())?;
            let data = serde_json::to_value(PriceResponseData {
                symbol,
                price: None,
                currency: "USD",
            })?;
            Ok(CommandResult::ok(data, vec![provider.id()]).with_error(envelope_error))
        }
    }
}
