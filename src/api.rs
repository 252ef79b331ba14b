//! HTTP front end: webhook endpoint and liveness probes

mod handlers;
mod types;

pub use handlers::create_router;

use crate::runtime::UpdateHandler;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<dyn UpdateHandler>,
    /// Expected value of `X-Telegram-Bot-Api-Secret-Token`; unchecked when `None`
    pub webhook_secret: Option<Arc<str>>,
    pub handler_timeout: Duration,
}

impl AppState {
    pub fn new(
        handler: Arc<dyn UpdateHandler>,
        webhook_secret: Option<String>,
        handler_timeout: Duration,
    ) -> Self {
        Self {
            handler,
            webhook_secret: webhook_secret.map(Arc::from),
            handler_timeout,
        }
    }
}
