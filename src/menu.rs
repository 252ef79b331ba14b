//! Menu catalog: keyboards and renderable items built from content
//!
//! Everything here is a pure function of the [`ContentStore`]; nothing depends
//! on a particular conversation.

use crate::content::{ContentStore, Entity, EntitySummary, Texts};
use crate::escape::escape_markdown_v2;
use crate::state_machine::{CallbackToken, Flow, MenuAction, OutboundItem};
use serde::{Deserialize, Serialize};

/// Maximum number of entity buttons per keyboard row
pub const ENTITY_ROW_WIDTH: usize = 2;

/// Reply keyboards pack the main menu this many buttons per row
const REPLY_MENU_ROW_WIDTH: usize = 2;

/// Main menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuEntry {
    Ballots,
    Candidates,
    Dates,
    Rules,
    Inquiry,
}

impl MenuEntry {
    pub const ALL: [MenuEntry; 5] = [
        MenuEntry::Ballots,
        MenuEntry::Candidates,
        MenuEntry::Dates,
        MenuEntry::Rules,
        MenuEntry::Inquiry,
    ];

    pub fn token(self) -> &'static str {
        match self {
            MenuEntry::Ballots => "ballots",
            MenuEntry::Candidates => "candidates",
            MenuEntry::Dates => "dates",
            MenuEntry::Rules => "rules",
            MenuEntry::Inquiry => "inquiry",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.token() == token)
    }

    /// The entity flow this entry opens, if it opens one
    pub fn flow(self) -> Option<Flow> {
        match self {
            MenuEntry::Ballots => Some(Flow::Ballots),
            MenuEntry::Candidates => Some(Flow::Candidates),
            MenuEntry::Dates | MenuEntry::Rules | MenuEntry::Inquiry => None,
        }
    }

    fn label(self, texts: &Texts) -> &str {
        match self {
            MenuEntry::Ballots => &texts.label_ballots,
            MenuEntry::Candidates => &texts.label_candidates,
            MenuEntry::Dates => &texts.label_dates,
            MenuEntry::Rules => &texts.label_rules,
            MenuEntry::Inquiry => &texts.label_inquiry,
        }
    }

    /// Lowercase words typed by users instead of pressing the button
    fn keywords(self) -> &'static [&'static str] {
        match self {
            MenuEntry::Ballots => &["ballots", "planillas", "planilla"],
            MenuEntry::Candidates => &["candidates", "candidatos"],
            MenuEntry::Dates => &["dates", "fechas"],
            MenuEntry::Rules => &["rules", "reglas"],
            MenuEntry::Inquiry => &["inquiry", "consultas"],
        }
    }
}

const BACK_KEYWORDS: &[&str] = &["back", "volver", "atrás", "atras", "menu", "menú"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardLayout {
    /// Buttons attached to the message; presses arrive as callback tokens
    #[default]
    Inline,
    /// Persistent keyboard under the input box; presses arrive as text
    Reply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    /// Callback data for inline layouts
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub layout: KeyboardLayout,
    pub rows: Vec<Vec<MenuOption>>,
}

impl Keyboard {
    pub fn options(&self) -> impl Iterator<Item = &MenuOption> {
        self.rows.iter().flatten()
    }
}

/// Builders over one content snapshot
#[derive(Debug, Clone, Copy)]
pub struct MenuCatalog<'a> {
    content: &'a ContentStore,
}

impl<'a> MenuCatalog<'a> {
    pub fn new(content: &'a ContentStore) -> Self {
        Self { content }
    }

    fn texts(&self) -> &'a Texts {
        self.content.texts()
    }

    fn layout(&self) -> KeyboardLayout {
        self.content.menu_settings().layout
    }

    /// Whether an entry can be shown and acted on with the loaded content
    pub fn is_enabled(&self, entry: MenuEntry) -> bool {
        let configured = self.content.menu_settings().entries.contains(&entry);
        match entry {
            MenuEntry::Inquiry => configured && self.content.document().inquiry_link.is_some(),
            _ => configured,
        }
    }

    /// Enabled entries in configured order
    pub fn main_menu_entries(&self) -> Vec<MenuEntry> {
        self.content
            .menu_settings()
            .entries
            .iter()
            .copied()
            .filter(|e| self.is_enabled(*e))
            .collect()
    }

    pub fn main_menu(&self) -> Keyboard {
        let options: Vec<MenuOption> = self
            .main_menu_entries()
            .into_iter()
            .enumerate()
            .map(|(position, entry)| MenuOption {
                label: numbered_label(position, entry.label(self.texts())),
                token: CallbackToken::Menu(MenuAction::Open(entry)).to_data(),
            })
            .collect();

        let width = match self.layout() {
            KeyboardLayout::Inline => 1,
            KeyboardLayout::Reply => REPLY_MENU_ROW_WIDTH,
        };
        Keyboard {
            layout: self.layout(),
            rows: options.chunks(width).map(<[MenuOption]>::to_vec).collect(),
        }
    }

    /// Entities in declared order, two per row, followed by a back button
    pub fn entity_menu(&self, entities: &[EntitySummary<'_>], flow: Flow) -> Keyboard {
        let options: Vec<MenuOption> = entities
            .iter()
            .map(|e| MenuOption {
                label: e.name.to_string(),
                token: flow.entity_token(e.id),
            })
            .collect();

        let mut rows: Vec<Vec<MenuOption>> = options
            .chunks(ENTITY_ROW_WIDTH)
            .map(<[MenuOption]>::to_vec)
            .collect();
        rows.push(vec![self.back_option()]);

        Keyboard {
            layout: self.layout(),
            rows,
        }
    }

    pub fn back_option(&self) -> MenuOption {
        MenuOption {
            label: self.texts().back_label.clone(),
            token: CallbackToken::Menu(MenuAction::Back).to_data(),
        }
    }

    /// One item per ballot (photo or name), each followed by its proposals link
    pub fn ballot_items(&self, entity: &Entity) -> Vec<OutboundItem> {
        let texts = self.texts();
        if entity.ballots.is_empty() {
            return vec![OutboundItem::text(&texts.no_ballots)];
        }

        let platform_url = self.content.document().proposals_url.as_deref();
        let mut items = Vec::with_capacity(entity.ballots.len() * 2);
        for ballot in &entity.ballots {
            let title = format!("{}{}", texts.ballot_prefix, ballot.name);
            items.push(match &ballot.image_ref {
                Some(image_ref) => OutboundItem::photo(image_ref, Some(title)),
                None => OutboundItem::text(title),
            });

            let link = ballot
                .proposals_url
                .as_deref()
                .or(entity.proposals_url.as_deref())
                .or(platform_url);
            if let Some(url) = link {
                items.push(OutboundItem::text(format!("{}{url}", texts.proposals_prefix)));
            }
        }
        items
    }

    /// One MarkdownV2 card per candidate; absent fields are left out
    pub fn candidate_cards(&self, entity: &Entity) -> Vec<OutboundItem> {
        let texts = self.texts();
        if entity.candidates.is_empty() {
            return vec![OutboundItem::text(&texts.no_candidates)];
        }

        entity
            .candidates
            .iter()
            .map(|candidate| {
                let mut lines = vec![format!("👤 *{}*", escape_markdown_v2(&candidate.name))];
                if let Some(year) = present(candidate.year_or_term.as_deref()) {
                    lines.push(format!("📚 {}", escape_markdown_v2(year)));
                }
                if let Some(interests) = present(candidate.interests.as_deref()) {
                    lines.push(format!(
                        "🎯 {} {}",
                        escape_markdown_v2(&texts.interests_label),
                        escape_markdown_v2(interests)
                    ));
                }
                if let Some(experience) = present(candidate.experience.as_deref()) {
                    lines.push(format!(
                        "💼 {} {}",
                        escape_markdown_v2(&texts.experience_label),
                        escape_markdown_v2(experience)
                    ));
                }
                OutboundItem::markdown(lines.join("\n"))
            })
            .collect()
    }

    /// Map typed or reply-keyboard text onto a menu action
    pub fn action_for_text(&self, text: &str) -> Option<MenuAction> {
        let typed = text.trim().to_lowercase();
        if typed.is_empty() {
            return None;
        }

        if typed == self.texts().back_label.to_lowercase() || BACK_KEYWORDS.contains(&typed.as_str())
        {
            return Some(MenuAction::Back);
        }

        self.main_menu_entries()
            .into_iter()
            .enumerate()
            .find(|(position, entry)| {
                let label = entry.label(self.texts()).to_lowercase();
                typed == label
                    || typed == numbered_label(*position, &label)
                    || typed == (position + 1).to_string()
                    || typed == keycap(*position)
                    || entry.keywords().contains(&typed.as_str())
            })
            .map(|(_, entry)| MenuAction::Open(entry))
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Keycap emoji for a zero-based position (`1️⃣` for 0)
fn keycap(position: usize) -> String {
    let n = position + 1;
    if n <= 9 {
        format!("{n}\u{fe0f}\u{20e3}")
    } else {
        n.to_string()
    }
}

fn numbered_label(position: usize, label: &str) -> String {
    format!("{} {label}", keycap(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures;
    use crate::state_machine::{Markup, OutboundItem};

    #[test]
    fn main_menu_lists_enabled_entries_one_per_row() {
        let store = fixtures::sample_store();
        let menu = MenuCatalog::new(&store).main_menu();
        assert_eq!(menu.layout, KeyboardLayout::Inline);
        assert_eq!(menu.rows.len(), 5);
        assert!(menu.rows.iter().all(|row| row.len() == 1));
        assert_eq!(menu.rows[0][0].label, "1\u{fe0f}\u{20e3} Planilla por carrera");
        assert_eq!(menu.rows[0][0].token, "menu:ballots");
        assert_eq!(menu.rows[4][0].token, "menu:inquiry");
    }

    #[test]
    fn inquiry_is_hidden_without_a_link() {
        let store = fixtures::minimal_store();
        let catalog = MenuCatalog::new(&store);
        assert!(!catalog.is_enabled(MenuEntry::Inquiry));
        let tokens: Vec<String> = catalog.main_menu().options().map(|o| o.token.clone()).collect();
        assert_eq!(
            tokens,
            vec!["menu:ballots", "menu:candidates", "menu:dates", "menu:rules"]
        );
    }

    #[test]
    fn reply_layout_packs_two_per_row() {
        let mut doc = fixtures::sample_store().document().clone();
        doc.menu.layout = KeyboardLayout::Reply;
        let store = ContentStore::from_document(doc).unwrap();
        let menu = MenuCatalog::new(&store).main_menu();
        assert_eq!(menu.layout, KeyboardLayout::Reply);
        let widths: Vec<usize> = menu.rows.iter().map(Vec::len).collect();
        assert_eq!(widths, vec![2, 2, 1]);
    }

    #[test]
    fn entity_menu_keeps_order_and_ends_with_back() {
        let store = fixtures::sample_store();
        let catalog = MenuCatalog::new(&store);
        let menu = catalog.entity_menu(&store.main_menu_entries(), Flow::Candidates);

        assert_eq!(menu.rows.len(), 3);
        assert_eq!(menu.rows[0].len(), 2);
        assert_eq!(menu.rows[0][0].token, "candidates:law");
        assert_eq!(menu.rows[0][1].token, "candidates:med");
        assert_eq!(menu.rows[1][0].label, "Ingeniería");
        assert_eq!(menu.rows[2], vec![catalog.back_option()]);
        assert_eq!(catalog.back_option().token, "menu:back");
    }

    #[test]
    fn ballots_interleave_photo_and_link() {
        let store = fixtures::sample_store();
        let catalog = MenuCatalog::new(&store);
        let law = store.find_entity_by_id("law").unwrap();
        let items = catalog.ballot_items(law);
        assert_eq!(
            items,
            vec![
                OutboundItem::photo(
                    "https://img.example/law-a.png",
                    Some("Planilla: Lista Azul".to_string())
                ),
                OutboundItem::text("Conoce las propuestas: https://propuestas.example/law-a"),
                OutboundItem::text("Planilla: Lista Verde"),
            ]
        );
    }

    #[test]
    fn ballot_link_falls_back_to_entity_then_platform() {
        let store = fixtures::store_with_platform_link();
        let catalog = MenuCatalog::new(&store);

        let eng = store.find_entity_by_id("eng").unwrap();
        assert_eq!(
            catalog.ballot_items(eng)[1],
            OutboundItem::text("Conoce las propuestas: https://propuestas.example/eng")
        );

        let law = store.find_entity_by_id("law").unwrap();
        let items = catalog.ballot_items(law);
        assert_eq!(items.len(), 4);
        assert_eq!(
            items[3],
            OutboundItem::text("Conoce las propuestas: https://plataforma.example/propuestas")
        );
    }

    #[test]
    fn empty_collections_render_one_notice() {
        let store = fixtures::sample_store();
        let catalog = MenuCatalog::new(&store);
        let med = store.find_entity_by_id("med").unwrap();
        assert_eq!(
            catalog.ballot_items(med),
            vec![OutboundItem::text(&store.texts().no_ballots)]
        );
        assert_eq!(
            catalog.candidate_cards(med),
            vec![OutboundItem::text(&store.texts().no_candidates)]
        );
    }

    #[test]
    fn candidate_cards_escape_values_and_omit_missing_fields() {
        let store = fixtures::sample_store();
        let catalog = MenuCatalog::new(&store);
        let law = store.find_entity_by_id("law").unwrap();
        let cards = catalog.candidate_cards(law);
        assert_eq!(cards.len(), 2);

        let OutboundItem::Text { body, markup } = &cards[0] else {
            panic!("expected text card");
        };
        assert_eq!(*markup, Markup::MarkdownV2);
        assert_eq!(
            body,
            "👤 *Ana\\_María \\(Presidenta\\)*\n\
             📚 3er año\n\
             🎯 Intereses: Becas\\. Transporte\\!\n\
             💼 Experiencias: Consejo 2023\\-2024"
        );

        assert_eq!(cards[1], OutboundItem::markdown("👤 *Luis*"));
    }

    #[test]
    fn blank_candidate_fields_are_omitted() {
        let mut doc = fixtures::minimal_store().document().clone();
        doc.careers[0].candidates = vec![crate::content::Candidate {
            name: "Eva".to_string(),
            year_or_term: Some("   ".to_string()),
            interests: Some(String::new()),
            experience: None,
        }];
        let store = ContentStore::from_document(doc).unwrap();
        let catalog = MenuCatalog::new(&store);
        let cards = catalog.candidate_cards(&store.entities()[0]);
        assert_eq!(cards, vec![OutboundItem::markdown("👤 *Eva*")]);
    }

    #[test]
    fn text_is_mapped_to_menu_actions() {
        let store = fixtures::sample_store();
        let catalog = MenuCatalog::new(&store);
        let open = |e| Some(MenuAction::Open(e));

        assert_eq!(catalog.action_for_text("1\u{fe0f}\u{20e3} Planilla por carrera"), open(MenuEntry::Ballots));
        assert_eq!(catalog.action_for_text("planilla por carrera"), open(MenuEntry::Ballots));
        assert_eq!(catalog.action_for_text("ballots"), open(MenuEntry::Ballots));
        assert_eq!(catalog.action_for_text(" 2 "), open(MenuEntry::Candidates));
        assert_eq!(catalog.action_for_text("3\u{fe0f}\u{20e3}"), open(MenuEntry::Dates));
        assert_eq!(catalog.action_for_text("Reglas"), open(MenuEntry::Rules));
        assert_eq!(catalog.action_for_text("5"), open(MenuEntry::Inquiry));
        assert_eq!(catalog.action_for_text("⬅️ Menú principal"), Some(MenuAction::Back));
        assert_eq!(catalog.action_for_text("Volver"), Some(MenuAction::Back));
        assert_eq!(catalog.action_for_text("Derecho"), None);
        assert_eq!(catalog.action_for_text("   "), None);
    }

    #[test]
    fn disabled_entries_do_not_match_text() {
        let store = fixtures::minimal_store();
        let catalog = MenuCatalog::new(&store);
        assert_eq!(catalog.action_for_text("consultas"), None);
        assert_eq!(catalog.action_for_text("5"), None);
    }
}
