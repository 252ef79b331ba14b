//! Ballot Guide - student election information bot for Telegram
//!
//! Answers a fixed menu of election questions (ballots and candidates per
//! career, process dates, voting rules, inquiry link) from a static content
//! document.

mod api;
mod config;
mod content;
mod escape;
mod menu;
mod runtime;
mod state_machine;
mod telegram;

use api::{create_router, AppState};
use config::{BotConfig, RunMode};
use content::ContentStore;
use runtime::{Dispatcher, InMemorySessionStore, ProductionDispatcher};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use telegram::TelegramClient;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often idle conversations are swept
const EVICTION_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ballot_guide=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = BotConfig::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    // Content is loaded once; a bad document aborts startup
    let content = Arc::new(ContentStore::load(&config.content_path)?);

    let client = Arc::new(TelegramClient::new(
        &config.telegram_api_url,
        &config.bot_token,
    )?);

    let cancel = CancellationToken::new();
    let sessions = Arc::new(InMemorySessionStore::new(config.session_ttl));
    let eviction = sessions
        .clone()
        .spawn_eviction(EVICTION_INTERVAL, cancel.clone());

    let dispatcher: Arc<ProductionDispatcher> =
        Arc::new(Dispatcher::new(content, client.clone(), sessions));

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutdown requested");
            cancel.cancel();
        }
    });

    match config.mode {
        RunMode::Polling => {
            // getUpdates is refused while a webhook is registered
            client.delete_webhook().await?;
            let polled =
                telegram::run_polling(client, dispatcher, config.handler_timeout, cancel.clone())
                    .await;
            if let Err(e) = polled {
                cancel.cancel();
                eviction.await?;
                return Err(e.into());
            }
        }
        RunMode::Webhook => {
            if let Some(url) = &config.webhook_url {
                client
                    .set_webhook(url, config.webhook_secret.as_deref())
                    .await?;
                tracing::info!(url = %url, "Webhook registered");
            }

            let state = AppState::new(
                dispatcher,
                config.webhook_secret.clone(),
                config.handler_timeout,
            );
            let app = create_router(state).layer(TraceLayer::new_for_http());

            let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
            tracing::info!("Ballot guide listening on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            let shutdown = cancel.clone();
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await?;
        }
    }

    cancel.cancel();
    eviction.await?;
    tracing::info!("Ballot guide stopped");
    Ok(())
}
