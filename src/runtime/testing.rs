//! Mock implementations for testing
//!
//! These mocks enable dispatcher tests without a live messaging platform.

use super::traits::{Transport, TransportError};
use crate::menu::Keyboard;
use crate::state_machine::Markup;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// One recorded transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        chat_id: i64,
        body: String,
        markup: Markup,
    },
    Photo {
        chat_id: i64,
        image_ref: String,
        caption: Option<String>,
    },
    Keyboard {
        chat_id: i64,
        prompt: String,
        keyboard: Keyboard,
        replace_message_id: Option<i64>,
    },
    Ack {
        callback_id: String,
        notice: Option<String>,
    },
}

/// Transport that records every call in order
#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<Sent>>,
    /// Photo refs whose send fails
    failing_photos: HashSet<String>,
    /// Fail every text send
    fail_text: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_photo(mut self, image_ref: impl Into<String>) -> Self {
        self.failing_photos.insert(image_ref.into());
        self
    }

    pub fn with_failing_text(mut self) -> Self {
        self.fail_text = true;
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_text(
        &self,
        chat_id: i64,
        body: &str,
        markup: Markup,
    ) -> Result<(), TransportError> {
        if self.fail_text {
            return Err(TransportError::network("mock text failure"));
        }
        self.record(Sent::Text {
            chat_id,
            body: body.to_string(),
            markup,
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        image_ref: &str,
        caption: Option<&str>,
    ) -> Result<(), TransportError> {
        if self.failing_photos.contains(image_ref) {
            return Err(TransportError::rejected("wrong file identifier/HTTP URL specified"));
        }
        self.record(Sent::Photo {
            chat_id,
            image_ref: image_ref.to_string(),
            caption: caption.map(str::to_string),
        });
        Ok(())
    }

    async fn send_keyboard(
        &self,
        chat_id: i64,
        prompt: &str,
        keyboard: &Keyboard,
        replace_message_id: Option<i64>,
    ) -> Result<(), TransportError> {
        self.record(Sent::Keyboard {
            chat_id,
            prompt: prompt.to_string(),
            keyboard: keyboard.clone(),
            replace_message_id,
        });
        Ok(())
    }

    async fn acknowledge(
        &self,
        callback_id: &str,
        notice: Option<&str>,
    ) -> Result<(), TransportError> {
        self.record(Sent::Ack {
            callback_id: callback_id.to_string(),
            notice: notice.map(str::to_string),
        });
        Ok(())
    }
}
