//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the dispatcher with mock implementations.

use crate::menu::Keyboard;
use crate::state_machine::{Conversation, Markup};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Transport
// ============================================================================

/// Transport error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::RateLimit, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Rejected, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Decode, message)
    }
}

/// Error classification for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection failures, timeouts, 5xx
    Network,
    /// 429 from the platform
    RateLimit,
    /// The platform refused the request (bad media, message not modified, blocked bot)
    Rejected,
    /// Unexpected response body
    Decode,
}

impl TransportErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit)
    }
}

/// Messaging platform operations used to deliver an outbound plan
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, chat_id: i64, body: &str, markup: Markup)
        -> Result<(), TransportError>;

    async fn send_photo(
        &self,
        chat_id: i64,
        image_ref: &str,
        caption: Option<&str>,
    ) -> Result<(), TransportError>;

    /// Show a keyboard with its prompt; edits `replace_message_id` in place when given
    async fn send_keyboard(
        &self,
        chat_id: i64,
        prompt: &str,
        keyboard: &Keyboard,
        replace_message_id: Option<i64>,
    ) -> Result<(), TransportError>;

    /// Answer a button press so the client stops its loading indicator
    async fn acknowledge(&self, callback_id: &str, notice: Option<&str>)
        -> Result<(), TransportError>;
}

// ============================================================================
// Session storage
// ============================================================================

/// Per-user conversation state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current record, or `None` for a new or expired conversation
    async fn get(&self, user_id: i64) -> Option<Conversation>;

    async fn set(&self, conversation: Conversation);
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_text(
        &self,
        chat_id: i64,
        body: &str,
        markup: Markup,
    ) -> Result<(), TransportError> {
        (**self).send_text(chat_id, body, markup).await
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        image_ref: &str,
        caption: Option<&str>,
    ) -> Result<(), TransportError> {
        (**self).send_photo(chat_id, image_ref, caption).await
    }

    async fn send_keyboard(
        &self,
        chat_id: i64,
        prompt: &str,
        keyboard: &Keyboard,
        replace_message_id: Option<i64>,
    ) -> Result<(), TransportError> {
        (**self)
            .send_keyboard(chat_id, prompt, keyboard, replace_message_id)
            .await
    }

    async fn acknowledge(
        &self,
        callback_id: &str,
        notice: Option<&str>,
    ) -> Result<(), TransportError> {
        (**self).acknowledge(callback_id, notice).await
    }
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get(&self, user_id: i64) -> Option<Conversation> {
        (**self).get(user_id).await
    }

    async fn set(&self, conversation: Conversation) {
        (**self).set(conversation).await;
    }
}
