use std::sync::Arc;

use cardsmith::channels::{ChatNotifier, TelegramNotifier};
use cardsmith::config::Config;
use cardsmith::http::{AppState, api_routes};
use cardsmith::llm::OpenAiProvider;
use cardsmith::notion::NotionClient;
use cardsmith::pipeline::CardPipeline;
use cardsmith::storage::SupabaseStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("🗂  Cardsmith v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.openai_model);
    eprintln!("   Bucket: {}", config.storage_bucket);
    eprintln!("   API: http://0.0.0.0:{}/api", config.port);

    // ── Collaborators ───────────────────────────────────────────────────
    let llm = Arc::new(OpenAiProvider::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.request_timeout,
    )?);

    let objects = Arc::new(SupabaseStorage::new(
        config.supabase_url.clone(),
        config.supabase_service_key.clone(),
        config.request_timeout,
    )?);

    let notion = Arc::new(NotionClient::new(
        config.notion_api_key.clone(),
        config.request_timeout,
    )?);

    let telegram: Option<Arc<dyn ChatNotifier>> = match config.telegram_bot_token.clone() {
        Some(token) => {
            eprintln!("   Telegram: enabled");
            Some(Arc::new(TelegramNotifier::new(
                token,
                config.request_timeout,
            )?))
        }
        None => {
            eprintln!("   Telegram: disabled (no bot token)");
            None
        }
    };

    // ── Pipeline ────────────────────────────────────────────────────────
    let pipeline = Arc::new(CardPipeline::new(
        llm,
        objects,
        notion,
        config.notion_database_id.clone(),
        config.storage_bucket.clone(),
    ));

    // ── HTTP server ─────────────────────────────────────────────────────
    let app = api_routes(AppState { pipeline, telegram });
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Cardsmith API server started");
    axum::serve(listener, app).await?;

    Ok(())
}
