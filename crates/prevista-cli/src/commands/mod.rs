mod forecast;
mod history;
mod price;
mod providers;
mod symbols;

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use uuid::Uuid;

use prevista_core::{
    DataError, Envelope, EnvelopeError, EnvelopeMeta, MarketDataProvider, ProviderId,
    ProviderRegistry,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

const SCHEMA_VERSION: &str = "v1.0.0";

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub cache_hit: bool,
    pub provider_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value, provider_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            cache_hit: false,
            provider_chain,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_error(mut self, error: EnvelopeError) -> Self {
        self.errors.push(error);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let registry = if cli.offline {
        ProviderRegistry::default()
    } else {
        ProviderRegistry::with_http()
    };

    let provider_id: ProviderId = cli.provider.into();
    let provider: Arc<dyn MarketDataProvider> = registry
        .get(provider_id)
        .ok_or_else(|| CliError::Command(format!("provider '{provider_id}' is not registered")))?;

    tracing::debug!(
        provider = %provider_id,
        offline = cli.offline,
        timeout_ms = cli.timeout_ms,
        "dispatching command"
    );

    let started = Instant::now();
    let result = match &cli.command {
        Command::Symbols => symbols::run(provider.as_ref()).await?,
        Command::Price(args) => price::run(args, provider.as_ref(), cli.timeout_ms).await?,
        Command::History(args) => history::run(args, provider.as_ref(), cli.timeout_ms).await?,
        Command::Forecast(args) => {
            forecast::run(args, provider.as_ref(), cli.offline, cli.timeout_ms).await?
        }
        Command::Providers => providers::run(&registry, provider_id)?,
    };
    let latency_ms = started.elapsed().as_millis() as u64;

    let CommandResult {
        data,
        warnings,
        errors,
        cache_hit,
        provider_chain,
    } = result;

    tracing::info!(
        provider = %provider_id,
        latency_ms,
        warning_count = warnings.len(),
        error_count = errors.len(),
        "command completed"
    );

    let mut meta = EnvelopeMeta::new(
        Uuid::new_v4().hyphenated().to_string(),
        SCHEMA_VERSION,
        provider_chain,
        latency_ms,
        cache_hit,
    )?;
    for warning in warnings {
        meta.push_warning(warning);
    }

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

/// Map a pipeline-level failure into the envelope error shape.
pub(crate) fn data_error(error: &DataError, provider: ProviderId) -> Result<EnvelopeError, CliError> {
    Ok(EnvelopeError::new(error.code(), error.to_string())?
        .with_retryable(error.retryable())
        .with_provider(provider))
}
