use std::sync::Arc;
use std::time::Duration;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use prevista_core::{
    AssetSelection, DataError, HorizonChoice, MarketDataProvider, NoopNotifier, Notifier,
    ReqwestHttpClient, Symbol, TelegramNotifier, ValidationError,
};
use prevista_forecast::{
    run_pipeline, DashboardSnapshot, ForecastConfig, PipelineError, PipelineRequest,
};

use super::{data_error, CommandResult};
use crate::cli::ForecastArgs;
use crate::error::CliError;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub async fn run(
    args: &ForecastArgs,
    provider: &dyn MarketDataProvider,
    offline: bool,
    timeout_ms: u64,
) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let horizon = parse_horizon(args)?;

    let config = ForecastConfig {
        daily_seasonality: args.daily_seasonality,
        weekly_seasonality: args.weekly_seasonality,
        yearly_seasonality: args.yearly_seasonality,
        interval_width: args.interval_width,
    };

    let selection = AssetSelection::new(symbol, provider.id());
    let request = PipelineRequest::new(selection, horizon)
        .with_lookback_days(args.lookback_days)
        .with_config(config);

    let outcome = match tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        run_pipeline(provider, &request),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(_) => Err(PipelineError::Data(DataError::DataUnavailable(format!(
            "forecast request exceeded the {timeout_ms}ms budget"
        )))),
    };

    match outcome {
        Ok(snapshot) => {
            let warnings = snapshot.warnings.clone();
            let mut result = CommandResult::ok(
                serde_json::to_value(&snapshot)?,
                vec![provider.id()],
            )
            .with_warnings(warnings);

            if args.notify {
                if let Some(warning) = notify(args, &snapshot, offline).await {
                    result = result.with_warning(warning);
                }
            }

            Ok(result)
        }
        Err(PipelineError::Validation(error)) => Err(error.into()),
        Err(PipelineError::Data(error)) => {
            let envelope_error = data_error(&error, provider.id())?;
            Ok(
                CommandResult::ok(serde_json::json!({ "symbol": args.symbol }), vec![provider.id()])
                    .with_error(envelope_error),
            )
        }
    }
}

fn parse_horizon(args: &ForecastArgs) -> Result<HorizonChoice, ValidationError> {
    if let Some(days) = args.days {
        return Ok(HorizonChoice::Days(days));
    }

    // clap guarantees exactly one of --days/--until.
    let raw = args.until.as_deref().unwrap_or_default();
    let date = Date::parse(raw, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        value: raw.to_string(),
    })?;
    Ok(HorizonChoice::EndDate(date))
}

/// Best-effort alert. Returns a warning string when delivery was skipped;
/// delivery failures themselves are logged and swallowed by the notifier.
async fn notify(args: &ForecastArgs, snapshot: &DashboardSnapshot, offline: bool) -> Option<String> {
    let Some(channel) = args.channel.as_deref() else {
        return Some("--notify requires --channel; notification skipped".to_string());
    };

    let text = summary_text(snapshot);

    if offline {
        NoopNotifier.send(channel, &text).await;
        return None;
    }

    match TelegramNotifier::from_env(Arc::new(ReqwestHttpClient::new())) {
        Some(notifier) => {
            notifier.send(channel, &text).await;
            None
        }
        None => Some(
            "PREVISTA_TELEGRAM_TOKEN is not set; notification skipped".to_string(),
        ),
    }
}

fn summary_text(snapshot: &DashboardSnapshot) -> String {
    let symbol = &snapshot.selection.symbol;

    match snapshot.forecast.rows.last() {
        Some(row) => format!(
            "{symbol}: {}d forecast ends at {:.2} (band {:.2}..{:.2}, width {:.0}%)",
            snapshot.horizon_days,
            row.point_estimate,
            row.lower_bound,
            row.upper_bound,
            snapshot.forecast.interval_width * 100.0
        ),
        None => format!("{symbol}: forecast produced no rows"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecast_args(days: Option<u32>, until: Option<&str>) -> ForecastArgs {
        ForecastArgs {
            symbol: "BTCUSDT".to_string(),
            days,
            until: until.map(str::to_string),
            lookback_days: 365,
            interval_width: 0.80,
            daily_seasonality: true,
            weekly_seasonality: true,
            yearly_seasonality: false,
            notify: false,
            channel: None,
        }
    }

    #[test]
    fn horizon_prefers_explicit_days() {
        let choice = parse_horizon(&forecast_args(Some(30), None)).expect("valid");
        assert_eq!(choice, HorizonChoice::Days(30));
    }

    #[test]
    fn until_must_be_a_calendar_date() {
        let choice = parse_horizon(&forecast_args(None, Some("2027-01-01"))).expect("valid");
        assert!(matches!(choice, HorizonChoice::EndDate(_)));

        let err = parse_horizon(&forecast_args(None, Some("tomorrow"))).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }
}
