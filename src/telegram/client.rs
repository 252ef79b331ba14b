//! Telegram Bot API client

use super::types::{
    AnswerCallbackQuery, ApiResponse, EditMessageText, GetUpdates, ReplyMarkup, SendMessage,
    SendPhoto, SetWebhook, Update, ALLOWED_UPDATES,
};
use crate::menu::{Keyboard, KeyboardLayout};
use crate::runtime::{Transport, TransportError, TransportErrorKind};
use crate::state_machine::Markup;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use std::time::Duration;

/// Upper bound for a single request, long polls included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest rate-limit wait honoured before giving up on a send
const MAX_RETRY_WAIT: Duration = Duration::from_secs(5);

/// Edits that change nothing are reported as errors by the platform
const NOT_MODIFIED: &str = "message is not modified";

pub struct TelegramClient {
    client: Client,
    /// `{api_url}/bot{token}`; never logged
    base_url: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{token}", api_url.trim_end_matches('/')),
        })
    }

    /// Call a Bot API method, retrying once when rate limited
    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, TransportError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        match self.call_once(method, body).await {
            Err(e) if e.kind == TransportErrorKind::RateLimit => {
                let wait = e.retry_after.unwrap_or(Duration::from_secs(1));
                if wait > MAX_RETRY_WAIT {
                    return Err(e);
                }
                tracing::debug!(method, ?wait, "Rate limited, retrying once");
                tokio::time::sleep(wait).await;
                self.call_once(method, body).await
            }
            other => other,
        }
    }

    async fn call_once<B, R>(&self, method: &str, body: &B) -> Result<R, TransportError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                // The URL embeds the bot token
                let e = e.without_url();
                if e.is_timeout() {
                    TransportError::network(format!("{method}: request timeout: {e}"))
                } else if e.is_connect() {
                    TransportError::network(format!("{method}: connection failed: {e}"))
                } else {
                    TransportError::network(format!("{method}: request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            TransportError::network(format!("{method}: failed to read response: {}", e.without_url()))
        })?;

        let parsed: ApiResponse<R> = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(classify_error(method, status, None, None));
            }
            Err(e) => {
                return Err(TransportError::decode(format!(
                    "{method}: failed to parse response: {e}"
                )));
            }
        };

        if parsed.ok {
            return parsed
                .result
                .ok_or_else(|| TransportError::decode(format!("{method}: response without result")));
        }

        let retry_after = parsed
            .parameters
            .and_then(|p| p.retry_after)
            .map(Duration::from_secs);
        Err(classify_error(
            method,
            parsed
                .error_code
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(status),
            parsed.description.as_deref(),
            retry_after,
        ))
    }

    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout: timeout_secs,
                allowed_updates: ALLOWED_UPDATES,
            },
        )
        .await
    }

    pub async fn set_webhook(
        &self,
        url: &str,
        secret_token: Option<&str>,
    ) -> Result<(), TransportError> {
        let _: IgnoredAny = self
            .call(
                "setWebhook",
                &SetWebhook {
                    url,
                    secret_token,
                    allowed_updates: ALLOWED_UPDATES,
                },
            )
            .await?;
        Ok(())
    }

    pub async fn delete_webhook(&self) -> Result<(), TransportError> {
        let _: IgnoredAny = self
            .call("deleteWebhook", &serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&'static str>,
        reply_markup: Option<ReplyMarkup>,
    ) -> Result<(), TransportError> {
        let _: IgnoredAny = self
            .call(
                "sendMessage",
                &SendMessage {
                    chat_id,
                    text,
                    parse_mode,
                    reply_markup,
                },
            )
            .await?;
        Ok(())
    }
}

fn classify_error(
    method: &str,
    status: StatusCode,
    description: Option<&str>,
    retry_after: Option<Duration>,
) -> TransportError {
    let message = format!(
        "{method}: HTTP {}: {}",
        status.as_u16(),
        description.unwrap_or("no description")
    );
    match status.as_u16() {
        429 => {
            let err = TransportError::rate_limit(message);
            match retry_after {
                Some(wait) => err.with_retry_after(wait),
                None => err,
            }
        }
        500..=599 => TransportError::network(message),
        _ => TransportError::rejected(message),
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_text(
        &self,
        chat_id: i64,
        body: &str,
        markup: Markup,
    ) -> Result<(), TransportError> {
        let parse_mode = match markup {
            Markup::Plain => None,
            Markup::MarkdownV2 => Some("MarkdownV2"),
        };
        self.send_message(chat_id, body, parse_mode, None).await
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        image_ref: &str,
        caption: Option<&str>,
    ) -> Result<(), TransportError> {
        let _: IgnoredAny = self
            .call(
                "sendPhoto",
                &SendPhoto {
                    chat_id,
                    photo: image_ref,
                    caption,
                },
            )
            .await?;
        Ok(())
    }

    async fn send_keyboard(
        &self,
        chat_id: i64,
        prompt: &str,
        keyboard: &Keyboard,
        replace_message_id: Option<i64>,
    ) -> Result<(), TransportError> {
        let markup = ReplyMarkup::from(keyboard);

        // Only inline keyboards can be edited into an existing message
        if let (Some(message_id), KeyboardLayout::Inline) = (replace_message_id, keyboard.layout) {
            let edited: Result<IgnoredAny, _> = self
                .call(
                    "editMessageText",
                    &EditMessageText {
                        chat_id,
                        message_id,
                        text: prompt,
                        reply_markup: Some(markup.clone()),
                    },
                )
                .await;
            match edited {
                Ok(_) => return Ok(()),
                Err(e) if e.message.contains(NOT_MODIFIED) => return Ok(()),
                Err(e) => {
                    tracing::debug!(chat_id, message_id, error = %e, "Edit failed, sending new message");
                }
            }
        }

        self.send_message(chat_id, prompt, None, Some(markup)).await
    }

    async fn acknowledge(
        &self,
        callback_id: &str,
        notice: Option<&str>,
    ) -> Result<(), TransportError> {
        let _: IgnoredAny = self
            .call(
                "answerCallbackQuery",
                &AnswerCallbackQuery {
                    callback_query_id: callback_id,
                    text: notice,
                },
            )
            .await?;
        Ok(())
    }
}
