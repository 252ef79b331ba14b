//! HTTP request handlers

use super::types::{ErrorResponse, HealthResponse, WebhookResponse};
use super::AppState;
use crate::runtime::handle_within;
use crate::telegram::Update;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Header Telegram echoes back with the secret given to `setWebhook`
const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .with_state(state)
}

async fn root() -> &'static str {
    "Bot OK"
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================
// Webhook
// ============================================================

/// Handle one update. Anything past the secret check answers 200, otherwise
/// Telegram keeps redelivering the same update.
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    if let Some(expected) = state.webhook_secret.as_deref() {
        let given = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if given != Some(expected) {
            tracing::warn!("Webhook request with missing or wrong secret token");
            return Err(AppError::Unauthorized);
        }
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding malformed update");
            return Ok(Json(WebhookResponse { ok: true }));
        }
    };

    handle_within(state.handler.as_ref(), update, state.handler_timeout).await;
    Ok(Json(WebhookResponse { ok: true }))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid secret token"),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{DeliveryReport, UpdateHandler};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tower::ServiceExt;

    /// Records the ids of handled updates
    #[derive(Default)]
    struct RecordingHandler {
        handled: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl UpdateHandler for RecordingHandler {
        async fn handle_update(&self, update: Update) -> Option<DeliveryReport> {
            self.handled.lock().unwrap().push(update.update_id);
            None
        }
    }

    fn router(secret: Option<&str>) -> (Router, Arc<RecordingHandler>) {
        let handler = Arc::new(RecordingHandler::default());
        let state = AppState::new(
            handler.clone(),
            secret.map(str::to_string),
            Duration::from_secs(5),
        );
        (create_router(state), handler)
    }

    fn webhook_request(body: &str, secret: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json");
        if let Some(secret) = secret {
            builder = builder.header(SECRET_HEADER, secret);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    const UPDATE: &str =
        r#"{"update_id": 77, "message": {"message_id": 1, "chat": {"id": 5}, "text": "/start"}}"#;

    #[tokio::test]
    async fn root_answers_bot_ok() {
        let (app, _) = router(None);
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Bot OK");
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (app, _) = router(None);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn webhook_hands_update_to_handler() {
        let (app, handler) = router(None);
        let response = app.oneshot(webhook_request(UPDATE, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*handler.handled.lock().unwrap(), vec![77]);
    }

    #[tokio::test]
    async fn malformed_update_still_answers_ok() {
        let (app, handler) = router(None);
        let response = app
            .oneshot(webhook_request("{not json", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(handler.handled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn webhook_checks_secret_token() {
        let (app, handler) = router(Some("s3cret"));

        let missing = app
            .clone()
            .oneshot(webhook_request(UPDATE, None))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let wrong = app
            .clone()
            .oneshot(webhook_request(UPDATE, Some("guess")))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

        let right = app
            .oneshot(webhook_request(UPDATE, Some("s3cret")))
            .await
            .unwrap();
        assert_eq!(right.status(), StatusCode::OK);

        assert_eq!(*handler.handled.lock().unwrap(), vec![77]);
    }
}
