use serde::Serialize;

use prevista_core::{ProviderId, ProviderRegistry};

use super::CommandResult;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ProviderEntry {
    id: ProviderId,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct ProvidersResponseData {
    providers: Vec<ProviderEntry>,
}

pub fn run(registry: &ProviderRegistry, selected: ProviderId) -> Result<CommandResult, CliError> {
    let registered = registry.registered();

    let providers = registered
        .iter()
        .map(|id| ProviderEntry {
            id: *id,
            selected: *id == selected,
        })
        .collect();

    let data = serde_json::to_value(ProvidersResponseData { providers })?;
    Ok(CommandResult::ok(data, registered))
}
