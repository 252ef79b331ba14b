//! API response types

use serde::Serialize;

/// Liveness probe body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Body of every accepted webhook delivery
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
