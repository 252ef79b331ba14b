//! Telegram Bot API integration
//!
//! Wire types, the HTTP client implementing `Transport`, and the
//! long-polling loop used when no public webhook URL is available.

mod client;
mod polling;
mod types;

pub use client::TelegramClient;
pub use polling::run_polling;
pub use types::Update;
