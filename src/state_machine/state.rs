//! Navigation state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level task within which an entity selection is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Ballots,
    Candidates,
}

impl Flow {
    /// Namespace of this flow's callback tokens (`ballots:<id>`)
    pub fn token_prefix(self) -> &'static str {
        match self {
            Flow::Ballots => "ballots",
            Flow::Candidates => "candidates",
        }
    }

    pub fn from_token_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "ballots" => Some(Flow::Ballots),
            "candidates" => Some(Flow::Candidates),
            _ => None,
        }
    }

    pub fn entity_token(self, entity_id: &str) -> String {
        format!("{}:{}", self.token_prefix(), entity_id)
    }
}

/// Where in the menu tree a conversation is
///
/// Selecting an entity is transient: the transition reports it as an outcome
/// and the state stays in `AwaitingEntitySelection` until the user goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    #[default]
    Root,
    AwaitingEntitySelection { flow: Flow },
}

/// Per-user conversation record held by the session store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub user_id: i64,
    pub state: ConvState,
    /// Last entity the user opened, if any
    pub selected_entity_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Record for a user seen for the first time
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            state: ConvState::Root,
            selected_entity_id: None,
            updated_at: Utc::now(),
        }
    }
}
