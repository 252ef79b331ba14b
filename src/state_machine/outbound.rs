//! Outbound plan produced by state transitions

use crate::menu::Keyboard;

/// Rendering mode for a text message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Markup {
    #[default]
    Plain,
    MarkdownV2,
}

/// Where a keyboard prompt should appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Send as a new message
    #[default]
    New,
    /// Edit the message whose button was pressed, if there is one
    ReplaceOrigin,
}

/// A single send operation, executed by the transport in plan order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundItem {
    Text {
        body: String,
        markup: Markup,
    },
    Photo {
        image_ref: String,
        caption: Option<String>,
    },
    Keyboard {
        prompt: String,
        keyboard: Keyboard,
        placement: Placement,
    },
    /// Answer the originating control, optionally with a short notice
    Acknowledge { notice: Option<String> },
}

impl OutboundItem {
    pub fn text(body: impl Into<String>) -> Self {
        OutboundItem::Text {
            body: body.into(),
            markup: Markup::Plain,
        }
    }

    pub fn markdown(body: impl Into<String>) -> Self {
        OutboundItem::Text {
            body: body.into(),
            markup: Markup::MarkdownV2,
        }
    }

    pub fn photo(image_ref: impl Into<String>, caption: Option<String>) -> Self {
        OutboundItem::Photo {
            image_ref: image_ref.into(),
            caption,
        }
    }

    pub fn keyboard(prompt: impl Into<String>, keyboard: Keyboard) -> Self {
        OutboundItem::Keyboard {
            prompt: prompt.into(),
            keyboard,
            placement: Placement::New,
        }
    }

    pub fn acknowledge(notice: impl Into<String>) -> Self {
        OutboundItem::Acknowledge {
            notice: Some(notice.into()),
        }
    }

    pub fn is_acknowledge(&self) -> bool {
        matches!(self, OutboundItem::Acknowledge { .. })
    }
}

/// Ordered list of outbound items for one processed signal
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutboundPlan {
    items: Vec<OutboundItem>,
}

impl OutboundPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: OutboundItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = OutboundItem>) {
        self.items.extend(items);
    }

    pub fn items(&self) -> &[OutboundItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_acknowledge(&self) -> bool {
        self.items.iter().any(OutboundItem::is_acknowledge)
    }
}

impl IntoIterator for OutboundPlan {
    type Item = OutboundItem;
    type IntoIter = std::vec::IntoIter<OutboundItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a OutboundPlan {
    type Item = &'a OutboundItem;
    type IntoIter = std::slice::Iter<'a, OutboundItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
