//! Update dispatcher
//!
//! Turns a Telegram update into a `Signal`, runs the transition under a
//! per-user lock, delivers the resulting plan in order and stores the new
//! state.

use super::traits::{SessionStore, Transport, TransportError};
use crate::content::ContentStore;
use crate::menu::MenuCatalog;
use crate::state_machine::{
    transition, CallbackToken, Command, Conversation, Markup, OutboundItem, OutboundPlan,
    Outcome, Placement, Signal, TextMatch,
};
use crate::telegram::Update;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lock table size above which idle entries are dropped
const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// Where a signal came from; decides how keyboards and notices are delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Message {
        message_id: i64,
    },
    Callback {
        callback_id: String,
        /// The message carrying the pressed button, when the platform sent it
        message_id: Option<i64>,
    },
}

/// A normalized update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub user_id: i64,
    pub chat_id: i64,
    pub signal: Signal,
    pub origin: Origin,
}

/// Summary of one handled update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
    pub outcome: Outcome,
}

/// Extract a signal from an update.
///
/// Returns `None` for updates this bot does not act on: no text or callback
/// data, or sent by another bot.
pub fn normalize_update(update: &Update, content: &ContentStore) -> Option<Inbound> {
    if let Some(query) = &update.callback_query {
        if query.from.is_bot {
            return None;
        }
        let data = query.data.as_deref()?;
        let message = query.message.as_ref();
        return Some(Inbound {
            user_id: query.from.id,
            // Private chats share the user's id
            chat_id: message.map_or(query.from.id, |m| m.chat.id),
            signal: Signal::Callback(CallbackToken::parse(data)),
            origin: Origin::Callback {
                callback_id: query.id.clone(),
                message_id: message.map(|m| m.message_id),
            },
        });
    }

    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;
    if message.from.as_ref().is_some_and(|user| user.is_bot) {
        return None;
    }

    let signal = match Command::parse(text) {
        Some(command) => Signal::Command(command),
        None => match MenuCatalog::new(content).action_for_text(text) {
            Some(action) => Signal::TextMatch(TextMatch::Menu(action)),
            None => Signal::TextMatch(TextMatch::Free(text.to_string())),
        },
    };

    Some(Inbound {
        user_id: message.from.as_ref().map_or(message.chat.id, |user| user.id),
        chat_id: message.chat.id,
        signal,
        origin: Origin::Message {
            message_id: message.message_id,
        },
    })
}

/// Entry point for the webhook and polling front ends
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    /// Process one update to completion; `None` when it was ignored
    async fn handle_update(&self, update: Update) -> Option<DeliveryReport>;
}

/// Run `handler` with a processing deadline; an update past it is dropped
pub async fn handle_within(
    handler: &dyn UpdateHandler,
    update: Update,
    deadline: Duration,
) -> Option<DeliveryReport> {
    let update_id = update.update_id;
    match tokio::time::timeout(deadline, handler.handle_update(update)).await {
        Ok(report) => report,
        Err(_) => {
            tracing::warn!(update_id, ?deadline, "Update handling timed out");
            None
        }
    }
}

/// One async mutex per user
#[derive(Default)]
struct ConversationLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ConversationLocks {
    async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() > LOCK_PRUNE_THRESHOLD {
                // Only the table holds a reference to an idle lock
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks.entry(user_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Runs transitions and delivers their plans
pub struct Dispatcher<T: Transport, S: SessionStore> {
    content: Arc<ContentStore>,
    transport: T,
    sessions: S,
    locks: ConversationLocks,
}

impl<T: Transport, S: SessionStore> Dispatcher<T, S> {
    pub fn new(content: Arc<ContentStore>, transport: T, sessions: S) -> Self {
        Self {
            content,
            transport,
            sessions,
            locks: ConversationLocks::default(),
        }
    }

    /// Handle a normalized update. Updates of the same user run one at a time.
    pub async fn dispatch(&self, inbound: Inbound) -> DeliveryReport {
        let _guard = self.locks.acquire(inbound.user_id).await;

        let mut conversation = self
            .sessions
            .get(inbound.user_id)
            .await
            .unwrap_or_else(|| Conversation::new(inbound.user_id));

        tracing::debug!(
            user_id = inbound.user_id,
            state = ?conversation.state,
            signal = ?inbound.signal,
            "Dispatching signal"
        );

        let result = transition(&conversation.state, &self.content, inbound.signal.clone());
        let (delivered, failed) = self.deliver(&inbound, &result.plan).await;

        match &result.outcome {
            Outcome::NotFound { entity_id } => {
                tracing::info!(user_id = inbound.user_id, entity_id = %entity_id, "Entity not found");
            }
            outcome => {
                if let Outcome::EntitySelected { entity_id, .. } = outcome {
                    conversation.selected_entity_id = Some(entity_id.clone());
                }
                conversation.state = result.new_state;
                conversation.updated_at = Utc::now();
                self.sessions.set(conversation).await;
            }
        }

        tracing::info!(
            user_id = inbound.user_id,
            chat_id = inbound.chat_id,
            outcome = ?result.outcome,
            delivered,
            failed,
            "Update handled"
        );

        DeliveryReport {
            delivered,
            failed,
            outcome: result.outcome,
        }
    }

    /// Send every item in order; a failed send is logged and skipped
    async fn deliver(&self, inbound: &Inbound, plan: &OutboundPlan) -> (usize, usize) {
        let mut delivered = 0;
        let mut failed = 0;
        let mut tally = |result: Result<(), TransportError>, what: &str| match result {
            Ok(()) => delivered += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!(
                    chat_id = inbound.chat_id,
                    kind = ?e.kind,
                    error = %e,
                    item = what,
                    "Failed to deliver outbound item"
                );
            }
        };

        // A pressed button always gets an answer, even when the plan has none
        if let Origin::Callback { callback_id, .. } = &inbound.origin {
            if !plan.has_acknowledge() {
                tally(self.transport.acknowledge(callback_id, None).await, "ack");
            }
        }

        for item in plan {
            match item {
                OutboundItem::Text { body, markup } => tally(
                    self.transport.send_text(inbound.chat_id, body, *markup).await,
                    "text",
                ),
                OutboundItem::Photo { image_ref, caption } => {
                    let result = self
                        .send_photo_or_text(inbound.chat_id, image_ref, caption.as_deref())
                        .await;
                    tally(result, "photo");
                }
                OutboundItem::Keyboard {
                    prompt,
                    keyboard,
                    placement,
                } => {
                    let replace = match (placement, &inbound.origin) {
                        (
                            Placement::ReplaceOrigin,
                            Origin::Callback {
                                message_id: Some(id),
                                ..
                            },
                        ) => Some(*id),
                        _ => None,
                    };
                    tally(
                        self.transport
                            .send_keyboard(inbound.chat_id, prompt, keyboard, replace)
                            .await,
                        "keyboard",
                    );
                }
                OutboundItem::Acknowledge { notice } => {
                    let result = match (&inbound.origin, notice) {
                        (Origin::Callback { callback_id, .. }, notice) => {
                            self.transport
                                .acknowledge(callback_id, notice.as_deref())
                                .await
                        }
                        // Typed text has no control to answer; show the notice instead
                        (Origin::Message { .. }, Some(notice)) => {
                            self.transport
                                .send_text(inbound.chat_id, notice, Markup::Plain)
                                .await
                        }
                        (Origin::Message { .. }, None) => Ok(()),
                    };
                    tally(result, "ack");
                }
            }
        }

        (delivered, failed)
    }

    /// Send a photo; when the platform rejects it, send its caption as text
    async fn send_photo_or_text(
        &self,
        chat_id: i64,
        image_ref: &str,
        caption: Option<&str>,
    ) -> Result<(), TransportError> {
        match self.transport.send_photo(chat_id, image_ref, caption).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(chat_id, image_ref, error = %e, "Photo failed, sending text instead");
                let body = caption.unwrap_or(image_ref);
                self.transport
                    .send_text(chat_id, body, Markup::Plain)
                    .await
            }
        }
    }
}

#[async_trait]
impl<T: Transport, S: SessionStore> UpdateHandler for Dispatcher<T, S> {
    async fn handle_update(&self, update: Update) -> Option<DeliveryReport> {
        let Some(inbound) = normalize_update(&update, &self.content) else {
            tracing::debug!(update_id = update.update_id, "Ignoring update");
            return None;
        };
        Some(self.dispatch(inbound).await)
    }
}
