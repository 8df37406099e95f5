//! HTTP surface — REST endpoints and the Telegram webhook.
//!
//! Handlers only translate: typed pipeline errors map structurally onto
//! status codes here, and nowhere else.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info, warn};

use crate::cards::CardRequest;
use crate::channels::{ChatNotifier, IncomingReport, parse_update};
use crate::config::MAX_UPLOAD_BYTES;
use crate::error::PipelineError;
use crate::pipeline::CardPipeline;
use crate::storage::Attachment;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CardPipeline>,
    /// Chat notifier; the webhook route answers but does nothing without it.
    pub telegram: Option<Arc<dyn ChatNotifier>>,
}

/// Build the Axum router with all API routes.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/notion/card", post(create_card))
        .route("/api/notion/smart-card", post(create_smart_card))
        .route("/api/telegram/webhook", post(telegram_webhook))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "cardsmith"
    }))
}

// ── Manual card creation ────────────────────────────────────────────────

/// POST /api/notion/card
async fn create_card(
    State(state): State<AppState>,
    Json(request): Json<CardRequest>,
) -> Response {
    match state.pipeline.create_card(request).await {
        Ok(handle) => created_response(&handle.id),
        Err(e) => error_response(e),
    }
}

// ── Smart card creation ─────────────────────────────────────────────────

/// POST /api/notion/smart-card (multipart: `message` text, `images[]` files)
async fn create_smart_card(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut message: Option<String> = None;
    let mut images: Vec<Attachment> = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Malformed multipart payload");
                return bad_request("Malformed multipart payload");
            }
        };

        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("message") => match field.text().await {
                Ok(text) => message = Some(text),
                Err(e) => {
                    warn!(error = %e, "Failed to read message field");
                    return bad_request("Malformed message field");
                }
            },
            Some("images") => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(bytes) => images.push(Attachment {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    }),
                    Err(e) => {
                        warn!(error = %e, "Failed to read image field");
                        return bad_request("Malformed image upload");
                    }
                }
            }
            _ => {} // unknown fields are ignored
        }
    }

    let Some(message) = message.filter(|m| !m.trim().is_empty()) else {
        return bad_request("Missing required field: message");
    };

    match state.pipeline.create_smart_card(&message, images).await {
        Ok(handle) => created_response(&handle.id),
        Err(e) => error_response(e),
    }
}

// ── Telegram webhook ────────────────────────────────────────────────────

/// POST /api/telegram/webhook
///
/// Always acknowledges with 200 first — an error response would make the
/// provider retry the update. The pipeline runs in a spawned task; all
/// outcomes are reported back to the chat, never to the provider.
async fn telegram_webhook(
    State(state): State<AppState>,
    Json(update): Json<serde_json::Value>,
) -> StatusCode {
    let Some(notifier) = state.telegram.clone() else {
        warn!("Telegram webhook hit but no bot token is configured");
        return StatusCode::OK;
    };
    let Some(report) = parse_update(&update) else {
        return StatusCode::OK;
    };

    let pipeline = Arc::clone(&state.pipeline);
    tokio::spawn(async move {
        handle_telegram_report(pipeline, notifier, report).await;
    });

    StatusCode::OK
}

/// Run the smart-card pipeline for one Telegram report and notify the chat.
async fn handle_telegram_report(
    pipeline: Arc<CardPipeline>,
    notifier: Arc<dyn ChatNotifier>,
    report: IncomingReport,
) {
    info!(chat_id = %report.chat_id, "Processing Telegram report");

    // Early acknowledgment so the user sees progress during the model
    // round-trips. Best-effort: a failed ack never aborts the pipeline.
    let preview: String = report.text.chars().take(20).collect();
    if let Err(e) = notifier
        .send_message(&report.chat_id, &format!("Request received for: {preview}..."))
        .await
    {
        warn!(error = %e, "Failed to send Telegram acknowledgment");
    }

    let outcome = pipeline.create_smart_card(&report.text, Vec::new()).await;

    let reply = match &outcome {
        Ok(_) => "Card created in Notion".to_string(),
        Err(PipelineError::Rejected { reason }) => {
            format!("✗ Message rejected: {reason}")
        }
        Err(e) => {
            error!(error = %e, chat_id = %report.chat_id, "Telegram smart card failed");
            format!("✗ Error creating card: {e}")
        }
    };

    if let Err(e) = notifier.send_message(&report.chat_id, &reply).await {
        warn!(error = %e, chat_id = %report.chat_id, "Failed to send Telegram result");
    }
}

// ── Error rendering ─────────────────────────────────────────────────────

fn created_response(record_id: &str) -> Response {
    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Card created",
            "id": record_id,
        })),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// Map a pipeline error onto an HTTP response. Matches variants, never
/// message text.
fn error_response(err: PipelineError) -> Response {
    match &err {
        PipelineError::MissingField { .. } => bad_request(&err.to_string()),
        PipelineError::Rejected { reason } => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Message rejected",
                "reason": reason,
            })),
        )
            .into_response(),
        _ => {
            error!(error = %err, "Card creation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to create card" })),
            )
                .into_response()
        }
    }
}
