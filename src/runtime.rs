//! Runtime for handling conversations
//!
//! The dispatcher owns all I/O around the pure transition function: it reads
//! and writes per-user state through a `SessionStore` and delivers plans
//! through a `Transport`.

mod dispatcher;
mod session;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use dispatcher::{handle_within, Dispatcher, UpdateHandler};
#[cfg(test)]
pub use dispatcher::DeliveryReport;
pub use session::InMemorySessionStore;
pub use traits::*;

use crate::telegram::TelegramClient;
use std::sync::Arc;

/// Type alias for the production dispatcher with concrete implementations
pub type ProductionDispatcher = Dispatcher<Arc<TelegramClient>, Arc<InMemorySessionStore>>;
