//! Telegram transport — webhook envelope parsing and outbound notifications.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::channels::ChatNotifier;
use crate::error::ChannelError;

/// Sends plain-text notifications through the Bot API.
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: SecretString,
}

impl TelegramNotifier {
    pub fn new(bot_token: SecretString, timeout: Duration) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, bot_token })
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.bot_token.expose_secret()
        )
    }
}

#[async_trait]
impl ChatNotifier for TelegramNotifier {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!("sendMessage failed ({status}): {detail}"),
            });
        }

        Ok(())
    }
}

/// A report extracted from one webhook update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingReport {
    pub chat_id: String,
    pub text: String,
}

/// Extract chat id and text from a Bot API update envelope.
///
/// Updates without a chat id (edits, service messages, channel posts) are
/// skipped. A message with no text still yields a report so the user gets an
/// explanatory rejection instead of silence.
pub fn parse_update(update: &serde_json::Value) -> Option<IncomingReport> {
    let message = update.get("message")?;
    let chat_id = message
        .pointer("/chat/id")
        .and_then(serde_json::Value::as_i64)?;

    let text = message
        .get("text")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("(no text)")
        .to_string();

    Some(IncomingReport {
        chat_id: chat_id.to_string(),
        text,
    })
}
