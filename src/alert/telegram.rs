//! Telegram Bot API sink

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AlertSink;
use crate::config::Credentials;
use crate::core::{AlertError, AlertResult};

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Sends alert chunks through a Telegram bot
pub struct TelegramSink {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl TelegramSink {
    pub fn new(bot_token: &str) -> AlertResult<Self> {
        Self::with_timeout(bot_token, Duration::from_secs(10))
    }

    pub fn from_credentials(credentials: &Credentials) -> AlertResult<Self> {
        Self::new(&credentials.bot_token)
    }

    pub fn with_timeout(bot_token: &str, timeout: Duration) -> AlertResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AlertError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{}/sendMessage", TELEGRAM_API, bot_token),
        })
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    description: Option<String>,
}

impl AlertSink for TelegramSink {
    fn send(&self, channel: &str, text: &str) -> AlertResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SendMessage { chat_id: channel, text })
            .send()
            // The request URL carries the bot token
            .map_err(|e| AlertError::network(e.without_url().to_string()))?;

        let status = response.status();
        let body: Option<BotResponse> = response.json().ok();

        match body {
            Some(BotResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(BotResponse { description, .. }) => Err(AlertError::network(format!(
                "Telegram rejected message (HTTP {}): {}",
                status.as_u16(),
                description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(AlertError::network(format!(
                "Telegram returned HTTP {} with an unreadable body",
                status.as_u16()
            ))),
        }
    }
}
