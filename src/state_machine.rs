//! Menu navigation state machine
//!
//! Pure transitions: a signal plus the current state and content produce the
//! next state and an ordered outbound plan.

mod outbound;
mod signal;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use outbound::{Markup, OutboundItem, OutboundPlan, Placement};
pub use signal::{CallbackToken, Command, MenuAction, Signal, TextMatch};
pub use state::{ConvState, Conversation, Flow};
pub use transition::{transition, Outcome};
