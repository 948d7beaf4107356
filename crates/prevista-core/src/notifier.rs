//! Fire-and-forget outbound alerts.
//!
//! Delivery is best-effort only: failures are logged at `warn` and
//! swallowed, and there is no delivery confirmation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;

use crate::http_client::{HttpClient, HttpRequest};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const TOKEN_ENV_VAR: &str = "PREVISTA_TELEGRAM_TOKEN";

/// Outbound notification contract.
pub trait Notifier: Send + Sync {
    /// Send `text` to `channel`. Never fails from the caller's point of
    /// view.
    fn send<'a>(
        &'a self,
        channel: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Discards all notifications. Used by tests and unconfigured runs.
#[derive(Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn send<'a>(
        &'a self,
        channel: &'a str,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            tracing::debug!(channel, "notification discarded (noop notifier)");
        })
    }
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegram bot notifier. Posts `sendMessage` with the chat id as channel.
pub struct TelegramNotifier {
    http_client: Arc<dyn HttpClient>,
    token: String,
    base_url: String,
}

impl TelegramNotifier {
    pub fn new(http_client: Arc<dyn HttpClient>, token: impl Into<String>) -> Self {
        Self {
            http_client,
            token: token.into(),
            base_url: TELEGRAM_API_BASE.to_string(),
        }
    }

    /// Construct from `PREVISTA_TELEGRAM_TOKEN`; `None` when unset or
    /// blank.
    pub fn from_env(http_client: Arc<dyn HttpClient>) -> Option<Self> {
        let token = std::env::var(TOKEN_ENV_VAR).ok()?;
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        Some(Self::new(http_client, token))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Notifier for TelegramNotifier {
    fn send<'a>(
        &'a self,
        channel: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let payload = SendMessagePayload {
                chat_id: channel,
                text,
            };

            let body = match serde_json::to_string(&payload) {
                Ok(body) => body,
                Err(error) => {
                    tracing::warn!(channel, %error, "failed to encode telegram payload");
                    return;
                }
            };

            let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
            let request = HttpRequest::post(url).with_json_body(body);

            match self.http_client.execute(request).await {
                Ok(response) if response.is_success() => {
                    tracing::debug!(channel, "telegram notification sent");
                }
                Ok(response) => {
                    tracing::warn!(
                        channel,
                        status = response.status,
                        "telegram rejected notification"
                    );
                }
                Err(error) => {
                    tracing::warn!(channel, %error, "telegram notification failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::NoopHttpClient;

    #[tokio::test]
    async fn noop_notifier_swallows_everything() {
        NoopNotifier.send("42", "BTCUSDT forecast ready").await;
    }

    #[tokio::test]
    async fn telegram_send_never_surfaces_errors() {
        let notifier = TelegramNotifier::new(Arc::new(NoopHttpClient), "test-token");
        notifier.send("42", "ETHUSDT forecast ready").await;
    }
}
