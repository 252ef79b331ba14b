//! Normalized inbound signals
//!
//! The transition function only ever sees these closed types; turning a raw
//! Telegram update into a `Signal` happens once, in the dispatcher.

use super::Flow;
use crate::menu::MenuEntry;

/// Signals that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Command(Command),
    TextMatch(TextMatch),
    Callback(CallbackToken),
}

impl Signal {
    pub fn is_callback(&self) -> bool {
        matches!(self, Signal::Callback(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Menu,
    Unknown(String),
}

impl Command {
    /// Parse a slash command, dropping any `@botname` suffix and arguments.
    /// Returns `None` when the text is not a command.
    pub fn parse(text: &str) -> Option<Self> {
        let head = text.trim().split_whitespace().next()?;
        let name = head.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or_default().to_lowercase();
        Some(match name.as_str() {
            "start" => Command::Start,
            "menu" | "menú" => Command::Menu,
            _ => Command::Unknown(name),
        })
    }
}

/// Main-menu level actions, reachable from a button press or matching text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Open(MenuEntry),
    Back,
}

/// Free text after normalization against the menu labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    Menu(MenuAction),
    /// Anything else; may still name an entity in the active flow
    Free(String),
}

/// Parsed `<namespace>:<id>` callback data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackToken {
    Menu(MenuAction),
    Entity { flow: Flow, id: String },
    Unknown(String),
}

impl CallbackToken {
    pub const MENU_NAMESPACE: &'static str = "menu";
    pub const BACK: &'static str = "back";

    pub fn parse(raw: &str) -> Self {
        let Some((namespace, id)) = raw.split_once(':') else {
            return CallbackToken::Unknown(raw.to_string());
        };
        if id.is_empty() || id.contains(':') {
            return CallbackToken::Unknown(raw.to_string());
        }

        if namespace == Self::MENU_NAMESPACE {
            return match id {
                // `root` is what older keyboards still carry
                Self::BACK | "root" => CallbackToken::Menu(MenuAction::Back),
                other => MenuEntry::from_token(other).map_or_else(
                    || CallbackToken::Unknown(raw.to_string()),
                    |entry| CallbackToken::Menu(MenuAction::Open(entry)),
                ),
            };
        }

        match Flow::from_token_prefix(namespace) {
            Some(flow) => CallbackToken::Entity {
                flow,
                id: id.to_string(),
            },
            None => CallbackToken::Unknown(raw.to_string()),
        }
    }

    /// Serialized form, the inverse of [`CallbackToken::parse`]
    pub fn to_data(&self) -> String {
        match self {
            CallbackToken::Menu(MenuAction::Back) => {
                format!("{}:{}", Self::MENU_NAMESPACE, Self::BACK)
            }
            CallbackToken::Menu(MenuAction::Open(entry)) => {
                format!("{}:{}", Self::MENU_NAMESPACE, entry.token())
            }
            CallbackToken::Entity { flow, id } => flow.entity_token(id),
            CallbackToken::Unknown(raw) => raw.clone(),
        }
    }
}
