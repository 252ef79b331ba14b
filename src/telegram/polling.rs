//! Long-polling update loop

use super::TelegramClient;
use crate::runtime::{handle_within, TransportError, UpdateHandler};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Seconds the platform holds a `getUpdates` request open
const POLL_TIMEOUT_SECS: u32 = 25;

/// Pause after a failed poll
const POLL_BACKOFF: Duration = Duration::from_secs(3);

/// Fetch and handle updates until `cancel` fires.
///
/// Updates are handled one at a time in arrival order. The offset advances
/// past every fetched update, so an update that failed or timed out is not
/// fetched again. Network failures and rate limits are waited out; any other
/// failure (revoked token, a webhook still registered) ends the loop with
/// that error.
pub async fn run_polling(
    client: Arc<TelegramClient>,
    handler: Arc<dyn UpdateHandler>,
    handler_timeout: Duration,
    cancel: CancellationToken,
) -> Result<(), TransportError> {
    tracing::info!("Long polling started");
    let mut offset: Option<i64> = None;

    loop {
        let fetched = tokio::select! {
            () = cancel.cancelled() => break,
            fetched = client.get_updates(offset, POLL_TIMEOUT_SECS) => fetched,
        };

        match fetched {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    handle_within(handler.as_ref(), update, handler_timeout).await;
                }
            }
            Err(e) if !e.kind.is_retryable() => {
                tracing::error!(error = %e, "Polling stopped by a permanent error");
                return Err(e);
            }
            Err(e) => {
                let wait = e.retry_after.unwrap_or(POLL_BACKOFF);
                tracing::warn!(error = %e, ?wait, "Polling failed");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(wait) => {}
                }
            }
        }
    }

    tracing::info!("Long polling stopped");
    Ok(())
}
