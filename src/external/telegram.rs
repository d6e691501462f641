use crate::config::TelegramConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The outbound messaging seam. The dispatch engine only needs "deliver this
/// text to this chat, tell me whether it worked"; rendering of buttons and
/// menus stays in the bot front end.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramTransport {
    client: Client,
    config: TelegramConfig,
}

impl TelegramTransport {
    pub fn new(config: TelegramConfig) -> Self {
        // Every send is bounded; a hung Bot API call surfaces as a failed
        // send the caller may retry later.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.send_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }
}

#[async_trait]
impl MessageTransport for TelegramTransport {
    async fn send_message(&self, chat_id: i64, text: &str) -> AppResult<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base, self.config.bot_token
        );

        let response = self
            .client
            .post(&url)
            .json(&SendMessageRequest {
                chat_id,
                text,
                parse_mode: "HTML",
            })
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Telegram request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Telegram send to chat {chat_id} failed: {error_text}");
            return Err(AppError::ExternalApiError(format!(
                "Telegram send failed: {error_text}"
            )));
        }

        let body: SendMessageResponse = response.json().await?;
        if !body.ok {
            let description = body.description.unwrap_or_default();
            log::error!("Telegram send to chat {chat_id} rejected: {description}");
            return Err(AppError::ExternalApiError(format!(
                "Telegram send rejected: {description}"
            )));
        }

        Ok(())
    }
}
