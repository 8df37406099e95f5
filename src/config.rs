//! Service configuration, loaded from the environment.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default bound on every outbound HTTP call (LLM, storage, record store,
/// chat transport). An unbounded hang on a third-party call would pin the
/// caller's connection indefinitely.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum accepted multipart upload size (50 MB, matching the public API).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds on.
    pub port: u16,
    /// OpenAI API key.
    pub openai_api_key: SecretString,
    /// Chat model used for validation and synthesis.
    pub openai_model: String,
    /// Notion integration token.
    pub notion_api_key: SecretString,
    /// Target Notion database for created cards.
    pub notion_database_id: String,
    /// Supabase project base URL (e.g. https://xyz.supabase.co).
    pub supabase_url: String,
    /// Supabase service-role key for storage writes.
    pub supabase_service_key: SecretString,
    /// Storage bucket for uploaded screenshots.
    pub storage_bucket: String,
    /// Telegram bot token; the webhook route is inert without it.
    pub telegram_bot_token: Option<SecretString>,
    /// Timeout applied to each outbound HTTP call.
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("CARDSMITH_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "CARDSMITH_PORT".into(),
                message: format!("not a valid port number: {raw}"),
            })?,
            Err(_) => 3000,
        };

        Ok(Self {
            port,
            openai_api_key: required("OPENAI_API_KEY")?.into(),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            notion_api_key: required("NOTION_API_KEY")?.into(),
            notion_database_id: required("NOTION_DATABASE_ID")?,
            supabase_url: required("SUPABASE_URL")?,
            supabase_service_key: required("SUPABASE_SERVICE_KEY")?.into(),
            storage_bucket: std::env::var("CARDSMITH_BUCKET")
                .unwrap_or_else(|_| "screenshots".to_string()),
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").ok().map(Into::into),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}
