//! In-memory session store with idle expiry

use super::traits::SessionStore;
use crate::state_machine::Conversation;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Conversations keyed by user id, forgotten after `ttl` without activity
pub struct InMemorySessionStore {
    conversations: RwLock<HashMap<i64, Conversation>>,
    ttl: chrono::Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    fn is_expired(&self, conversation: &Conversation, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(conversation.updated_at) > self.ttl
    }

    /// Drop expired conversations; returns how many were removed
    pub async fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let mut conversations = self.conversations.write().await;
        let before = conversations.len();
        conversations.retain(|_, conv| !self.is_expired(conv, now));
        before - conversations.len()
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    /// Run `evict_expired` every `interval` until cancelled
    pub fn spawn_eviction(
        self: Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(interval) => {
                        let evicted = self.evict_expired().await;
                        if evicted > 0 {
                            let active = self.len().await;
                            tracing::debug!(evicted, active, "Evicted idle conversations");
                        }
                    }
                }
            }
            tracing::info!("Session eviction stopped");
        })
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: i64) -> Option<Conversation> {
        let conversations = self.conversations.read().await;
        conversations
            .get(&user_id)
            .filter(|conv| !self.is_expired(conv, Utc::now()))
            .cloned()
    }

    async fn set(&self, conversation: Conversation) {
        self.conversations
            .write()
            .await
            .insert(conversation.user_id, conversation);
    }
}
