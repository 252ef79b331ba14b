//! Property-based tests for the navigator
//!
//! These tests verify key invariants hold across generated states and signals.

use super::*;
use crate::content::fixtures;
use crate::escape::escape_markdown_v2;
use crate::menu::MenuEntry;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_flow() -> impl Strategy<Value = Flow> {
    prop_oneof![Just(Flow::Ballots), Just(Flow::Candidates)]
}

fn arb_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        Just(ConvState::Root),
        arb_flow().prop_map(|flow| ConvState::AwaitingEntitySelection { flow }),
    ]
}

fn arb_menu_entry() -> impl Strategy<Value = MenuEntry> {
    prop::sample::select(MenuEntry::ALL.to_vec())
}

fn arb_menu_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![
        arb_menu_entry().prop_map(|e| Signal::Callback(CallbackToken::Menu(MenuAction::Open(e)))),
        arb_menu_entry().prop_map(|e| Signal::TextMatch(TextMatch::Menu(MenuAction::Open(e)))),
        Just(Signal::Callback(CallbackToken::Menu(MenuAction::Back))),
        Just(Signal::TextMatch(TextMatch::Menu(MenuAction::Back))),
        Just(Signal::Command(Command::Start)),
        Just(Signal::Command(Command::Menu)),
    ]
}

fn arb_known_entity_id() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["law", "med", "eng"]).prop_map(String::from)
}

fn arb_unknown_entity_id() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,20}".prop_filter("must not name a real entity", |id| {
        !["law", "med", "eng"].contains(&id.as_str())
    })
}

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![
        arb_menu_signal(),
        (arb_flow(), arb_known_entity_id())
            .prop_map(|(flow, id)| Signal::Callback(CallbackToken::Entity { flow, id })),
        (arb_flow(), arb_unknown_entity_id())
            .prop_map(|(flow, id)| Signal::Callback(CallbackToken::Entity { flow, id })),
        "[ -~]{0,30}".prop_map(|raw| Signal::Callback(CallbackToken::parse(&raw))),
        "[a-zA-Z ]{0,20}".prop_map(|t| Signal::TextMatch(TextMatch::Free(t))),
        "[a-z]{1,10}".prop_map(|c| Signal::Command(Command::Unknown(c))),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Main menu signals never jump straight into an entity selection
    #[test]
    fn root_menu_signals_are_two_step(signal in arb_menu_signal()) {
        let store = fixtures::sample_store();
        let result = transition(&ConvState::Root, &store, signal);
        prop_assert!(
            matches!(
                result.new_state,
                ConvState::Root | ConvState::AwaitingEntitySelection { .. }
            ),
            "{:?}",
            result.new_state
        );
        prop_assert!(
            !matches!(result.outcome, Outcome::EntitySelected { .. }),
            "{:?}",
            result.outcome
        );
    }

    /// Same state, content and signal give the same result
    #[test]
    fn transition_is_deterministic(state in arb_state(), signal in arb_signal()) {
        let store = fixtures::sample_store();
        let first = transition(&state, &store, signal.clone());
        let second = transition(&state, &store, signal);
        prop_assert_eq!(first, second);
    }

    /// Resolving the same entity twice in a row yields the same plan
    #[test]
    fn repeated_selection_is_stable(flow in arb_flow(), id in arb_known_entity_id()) {
        let store = fixtures::sample_store();
        let signal = Signal::Callback(CallbackToken::Entity { flow, id });
        let first = transition(&ConvState::AwaitingEntitySelection { flow }, &store, signal.clone());
        let second = transition(&first.new_state, &store, signal);
        prop_assert_eq!(first.plan, second.plan);
        prop_assert_eq!(first.new_state, second.new_state);
    }

    /// NotFound keeps the state and carries exactly one acknowledgement
    #[test]
    fn not_found_keeps_state(
        state in arb_state(),
        flow in arb_flow(),
        id in arb_unknown_entity_id(),
    ) {
        let store = fixtures::sample_store();
        let result = transition(&state, &store, Signal::Callback(CallbackToken::Entity { flow, id }));
        prop_assert!(matches!(result.outcome, Outcome::NotFound { .. }), "{:?}", result.outcome);
        prop_assert_eq!(result.new_state, state);
        prop_assert_eq!(result.plan.len(), 1);
        prop_assert!(result.plan.items()[0].is_acknowledge());
    }

    /// Acknowledgements only ever come from NotFound
    #[test]
    fn acknowledge_only_on_not_found(state in arb_state(), signal in arb_signal()) {
        let store = fixtures::sample_store();
        let result = transition(&state, &store, signal);
        if result.plan.has_acknowledge() {
            prop_assert!(
                matches!(result.outcome, Outcome::NotFound { .. }),
                "{:?}",
                result.outcome
            );
        }
    }

    /// Every plan shows something; no signal is silently swallowed
    #[test]
    fn plans_are_never_empty(state in arb_state(), signal in arb_signal()) {
        let store = fixtures::sample_store();
        let result = transition(&state, &store, signal);
        prop_assert!(!result.plan.is_empty());
    }

    /// Selecting an entity keeps its flow active
    #[test]
    fn selection_keeps_flow_sticky(state in arb_state(), flow in arb_flow(), id in arb_known_entity_id()) {
        let store = fixtures::sample_store();
        let result = transition(&state, &store, Signal::Callback(CallbackToken::Entity { flow, id }));
        prop_assert_eq!(result.new_state, ConvState::AwaitingEntitySelection { flow });
    }

    /// Ballot plans alternate photo/name with an optional link, never two links in a row
    #[test]
    fn ballot_links_follow_their_ballot(id in arb_known_entity_id()) {
        let store = fixtures::store_with_platform_link();
        let result = transition(
            &ConvState::AwaitingEntitySelection { flow: Flow::Ballots },
            &store,
            Signal::Callback(CallbackToken::Entity { flow: Flow::Ballots, id }),
        );
        let prefix = &store.texts().proposals_prefix;
        let is_link = |item: &OutboundItem| {
            matches!(item, OutboundItem::Text { body, .. } if body.starts_with(prefix.as_str()))
        };
        let items = result.plan.items();
        for pair in items.windows(2) {
            prop_assert!(!(is_link(&pair[0]) && is_link(&pair[1])));
        }
        if let Some(first) = items.first() {
            prop_assert!(!is_link(first));
        }
    }

    /// Escaping leaves text without reserved characters untouched
    #[test]
    fn escape_is_identity_on_safe_text(text in "[a-zA-Z0-9 ,:;áéíóúñ]{0,40}") {
        prop_assert_eq!(escape_markdown_v2(&text), text);
    }

    /// Escaping adds exactly one backslash per reserved character
    #[test]
    fn escape_adds_one_backslash_per_reserved(text in "[ -~]{0,40}") {
        let reserved = text.chars().filter(|c| "_*[]()~`>#+-=|{}.!".contains(*c)).count();
        let escaped = escape_markdown_v2(&text);
        prop_assert_eq!(escaped.chars().count(), text.chars().count() + reserved);
    }
}
