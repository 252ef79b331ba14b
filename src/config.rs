//! Process configuration from environment variables

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Configuration loading failures; all of them abort startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// How updates reach the bot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Telegram posts updates to `POST /webhook`
    Webhook,
    /// The bot pulls updates with `getUpdates`
    Polling,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "webhook" => Ok(RunMode::Webhook),
            "polling" | "poll" => Ok(RunMode::Polling),
            other => Err(format!("'{other}' is not one of webhook, polling")),
        }
    }
}

/// Holds all configuration loaded at startup
#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub content_path: PathBuf,
    pub mode: RunMode,
    pub port: u16,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` on webhook requests
    pub webhook_secret: Option<String>,
    /// Public URL registered with `setWebhook` at startup
    pub webhook_url: Option<String>,
    pub telegram_api_url: String,
    pub session_ttl: Duration,
    pub handler_timeout: Duration,
}

impl BotConfig {
    pub const DEFAULT_CONTENT_PATH: &'static str = "content.json";
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_API_URL: &'static str = "https://api.telegram.org";
    pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;
    pub const DEFAULT_HANDLER_TIMEOUT_SECS: u64 = 30;

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bot_token =
            get("BOT_TOKEN").ok_or_else(|| ConfigError::MissingVar("BOT_TOKEN".to_string()))?;

        let content_path = get("CONTENT_PATH")
            .map_or_else(|| PathBuf::from(Self::DEFAULT_CONTENT_PATH), PathBuf::from);

        let mode = match get("BOT_MODE") {
            Some(raw) => raw
                .parse::<RunMode>()
                .map_err(|e| ConfigError::InvalidValue("BOT_MODE".to_string(), e))?,
            None => RunMode::Webhook,
        };

        let port = parse_or("PORT", get("PORT"), Self::DEFAULT_PORT)?;

        let webhook_url = get("WEBHOOK_URL");
        if let Some(url) = &webhook_url {
            if !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    "WEBHOOK_URL".to_string(),
                    format!("'{url}' must be an https URL"),
                ));
            }
        }

        let session_ttl_secs = parse_or(
            "SESSION_TTL_SECS",
            get("SESSION_TTL_SECS"),
            Self::DEFAULT_SESSION_TTL_SECS,
        )?;
        let handler_timeout_secs = parse_or(
            "HANDLER_TIMEOUT_SECS",
            get("HANDLER_TIMEOUT_SECS"),
            Self::DEFAULT_HANDLER_TIMEOUT_SECS,
        )?;
        if handler_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "HANDLER_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bot_token,
            content_path,
            mode,
            port,
            webhook_secret: get("WEBHOOK_SECRET"),
            webhook_url,
            telegram_api_url: get("TELEGRAM_API_URL")
                .unwrap_or_else(|| Self::DEFAULT_API_URL.to_string()),
            session_ttl: Duration::from_secs(session_ttl_secs),
            handler_timeout: Duration::from_secs(handler_timeout_secs),
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("'{raw}': {e}"))),
        None => Ok(default),
    }
}

// The token grants full control of the bot
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("content_path", &self.content_path)
            .field("mode", &self.mode)
            .field("port", &self.port)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("webhook_url", &self.webhook_url)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("session_ttl", &self.session_ttl)
            .field("handler_timeout", &self.handler_timeout)
            .finish()
    }
}
