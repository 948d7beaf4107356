use serde::Serialize;

use prevista_core::{MarketDataProvider, Symbol};

use super::CommandResult;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SymbolsResponseData {
    provider: String,
    symbols: Vec<Symbol>,
}

pub async fn run(provider: &dyn MarketDataProvider) -> Result<CommandResult, CliError> {
    let symbols = provider.list_symbols().await;

    let data = serde_json::to_value(SymbolsResponseData {
        provider: provider.id().to_string(),
        symbols,
    })?;

    Ok(CommandResult::ok(data, vec![provider.id()]))
}
