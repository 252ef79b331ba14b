//! Pure state transition function
//!
//! Given the same state, content and signal, `transition` always produces the
//! same result. It performs no I/O; sending the plan and persisting the new
//! state belong to the dispatcher.

use super::{
    CallbackToken, Command, ConvState, Flow, MenuAction, OutboundItem, OutboundPlan, Placement,
    Signal, TextMatch,
};
use crate::content::{ContentStore, Entity};
use crate::menu::{MenuCatalog, MenuEntry};

/// What happened, beyond the plan itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Plain navigation
    Navigated,
    /// An entity was resolved and rendered for a flow
    EntitySelected { flow: Flow, entity_id: String },
    /// The token or text named an entity that does not exist
    NotFound { entity_id: String },
    /// Nothing matched; the fallback menu was shown
    Unrecognized,
}

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub plan: OutboundPlan,
    pub outcome: Outcome,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            plan: OutboundPlan::new(),
            outcome: Outcome::Navigated,
        }
    }

    pub fn with_item(mut self, item: OutboundItem) -> Self {
        self.plan.push(item);
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = OutboundItem>) -> Self {
        self.plan.extend(items);
        self
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// Pure transition function
pub fn transition(state: &ConvState, content: &ContentStore, signal: Signal) -> TransitionResult {
    let nav = Navigator::new(content);
    let from_callback = signal.is_callback();

    match (state, signal) {
        // ============================================================
        // Commands
        // ============================================================
        (_, Signal::Command(Command::Start)) => TransitionResult::new(ConvState::Root)
            .with_item(OutboundItem::text(&content.texts().welcome))
            .with_item(nav.main_menu_prompt(Placement::New)),

        (_, Signal::Command(Command::Menu))
        | (_, Signal::TextMatch(TextMatch::Menu(MenuAction::Back))) => {
            TransitionResult::new(ConvState::Root).with_item(nav.main_menu_prompt(Placement::New))
        }

        (_, Signal::Callback(CallbackToken::Menu(MenuAction::Back))) => {
            TransitionResult::new(ConvState::Root)
                .with_item(nav.main_menu_prompt(Placement::ReplaceOrigin))
        }

        // ============================================================
        // Main menu entries
        // ============================================================
        (_, Signal::Callback(CallbackToken::Menu(MenuAction::Open(entry))))
        | (_, Signal::TextMatch(TextMatch::Menu(MenuAction::Open(entry))))
            if nav.catalog.is_enabled(entry) =>
        {
            nav.open_entry(entry, from_callback)
        }

        // ============================================================
        // Entity selection
        // ============================================================

        // The token names its flow, so buttons of an older keyboard keep working
        (_, Signal::Callback(CallbackToken::Entity { flow, id })) => {
            match content.find_entity_by_id(&id) {
                Some(entity) => nav.select_entity(flow, entity),
                None => nav.not_found(*state, id),
            }
        }

        (ConvState::AwaitingEntitySelection { flow }, Signal::TextMatch(TextMatch::Free(text))) => {
            match content.find_entity_by_name(&text) {
                Some(entity) => nav.select_entity(*flow, entity),
                None => nav.not_found(*state, text.trim().to_string()),
            }
        }

        // ============================================================
        // Fallback
        // ============================================================
        (_, signal) => {
            tracing::debug!(?signal, "Unrecognized signal, showing main menu");
            TransitionResult::new(ConvState::Root)
                .with_item(nav.fallback_prompt())
                .with_outcome(Outcome::Unrecognized)
        }
    }
}

/// Rendering helpers bound to one content snapshot
struct Navigator<'a> {
    content: &'a ContentStore,
    catalog: MenuCatalog<'a>,
}

impl<'a> Navigator<'a> {
    fn new(content: &'a ContentStore) -> Self {
        Self {
            content,
            catalog: MenuCatalog::new(content),
        }
    }

    fn main_menu_prompt(&self, placement: Placement) -> OutboundItem {
        OutboundItem::Keyboard {
            prompt: self.content.texts().main_menu_prompt.clone(),
            keyboard: self.catalog.main_menu(),
            placement,
        }
    }

    fn fallback_prompt(&self) -> OutboundItem {
        OutboundItem::keyboard(&self.content.texts().fallback_prompt, self.catalog.main_menu())
    }

    fn entity_prompt(&self, prompt: &str, flow: Flow, placement: Placement) -> OutboundItem {
        OutboundItem::Keyboard {
            prompt: prompt.to_string(),
            keyboard: self
                .catalog
                .entity_menu(&self.content.main_menu_entries(), flow),
            placement,
        }
    }

    fn open_entry(&self, entry: MenuEntry, from_callback: bool) -> TransitionResult {
        let texts = self.content.texts();
        let document = self.content.document();

        if let Some(flow) = entry.flow() {
            let prompt = match flow {
                Flow::Ballots => &texts.choose_entity_ballots,
                Flow::Candidates => &texts.choose_entity_candidates,
            };
            let placement = if from_callback {
                Placement::ReplaceOrigin
            } else {
                Placement::New
            };
            return TransitionResult::new(ConvState::AwaitingEntitySelection { flow })
                .with_item(self.entity_prompt(prompt, flow, placement));
        }

        let mut result = TransitionResult::new(ConvState::Root);
        match entry {
            MenuEntry::Dates => {
                let dates = &document.process_dates;
                let description = dates
                    .description
                    .clone()
                    .unwrap_or_else(|| texts.dates_default.clone());
                result = result.with_item(match &dates.image_ref {
                    Some(image_ref) => OutboundItem::photo(image_ref, Some(description)),
                    None => OutboundItem::text(description),
                });
            }
            MenuEntry::Rules => {
                let rules = &document.voting_rules;
                if let Some(image_ref) = &rules.image_ref {
                    result = result.with_item(OutboundItem::photo(
                        image_ref,
                        Some(texts.rules_caption.clone()),
                    ));
                }
                if let Some(body) = rules_text(
                    &texts.rules_heading,
                    &rules.requirements,
                    &texts.disqualifiers_heading,
                    &rules.disqualifiers,
                ) {
                    result = result.with_item(OutboundItem::text(body));
                }
            }
            MenuEntry::Inquiry => {
                if let Some(link) = &document.inquiry_link {
                    result = result
                        .with_item(OutboundItem::text(format!("{}{link}", texts.inquiry_prefix)));
                }
            }
            MenuEntry::Ballots | MenuEntry::Candidates => {}
        }
        result.with_item(self.main_menu_prompt(Placement::New))
    }

    fn select_entity(&self, flow: Flow, entity: &Entity) -> TransitionResult {
        let items = match flow {
            Flow::Ballots => self.catalog.ballot_items(entity),
            Flow::Candidates => self.catalog.candidate_cards(entity),
        };
        let is_empty = match flow {
            Flow::Ballots => entity.ballots.is_empty(),
            Flow::Candidates => entity.candidates.is_empty(),
        };

        let mut result = TransitionResult::new(ConvState::AwaitingEntitySelection { flow })
            .with_items(items)
            .with_outcome(Outcome::EntitySelected {
                flow,
                entity_id: entity.id.clone(),
            });
        // An empty entity gets the notice alone; the previous keyboard is still usable
        if !is_empty {
            result = result.with_item(self.entity_prompt(
                &self.content.texts().choose_another_entity,
                flow,
                Placement::New,
            ));
        }
        result
    }

    fn not_found(&self, state: ConvState, entity_id: String) -> TransitionResult {
        tracing::debug!(entity_id = %entity_id, "Entity not found");
        TransitionResult::new(state)
            .with_item(OutboundItem::acknowledge(&self.content.texts().not_found))
            .with_outcome(Outcome::NotFound { entity_id })
    }
}

/// Bullet list of requirements, then disqualifiers; `None` when both are empty
fn rules_text(
    heading: &str,
    requirements: &[String],
    disqualifiers_heading: &str,
    disqualifiers: &[String],
) -> Option<String> {
    let mut sections = Vec::new();
    if !requirements.is_empty() {
        sections.push(format!("{heading}\n• {}", requirements.join("\n• ")));
    }
    if !disqualifiers.is_empty() {
        sections.push(format!(
            "{disqualifiers_heading}\n• {}",
            disqualifiers.join("\n• ")
        ));
    }
    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n\n"))
    }
}
