//! Error types for cardsmith.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} request timed out")]
    Timeout { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Binary object storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload of {path} to bucket {bucket} failed: {reason}")]
    UploadFailed {
        bucket: String,
        path: String,
        reason: String,
    },

    #[error("Object {path} already exists in bucket {bucket}")]
    Conflict { bucket: String, path: String },

    #[error("Storage request timed out for {path}")]
    Timeout { path: String },
}

/// Structured-record store (Notion) errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record creation failed ({status}): {reason}")]
    CreateFailed { status: u16, reason: String },

    #[error("Record store request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Record store request timed out")]
    Timeout,

    #[error("Malformed record store response: {0}")]
    MalformedResponse(String),
}

/// Chat transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send message on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid update payload: {0}")]
    InvalidUpdate(String),
}

/// Errors raised while synthesizing a card draft from an LLM response.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Malformed draft from model: {reason}")]
    Malformed { reason: String },

    #[error("Draft title missing required prefix: {title:?}")]
    BadTitle { title: String },
}

/// Pipeline outcome errors — the single seam the transport adapters match on.
///
/// Variants are structural: adapters branch on the variant, never on the
/// message text.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Caller input malformed (missing required field). 400-equivalent.
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The validator judged the message inadmissible. 400-equivalent,
    /// carries the validator's reason.
    #[error("Message rejected: {reason}")]
    Rejected { reason: String },

    /// The synthesizer could not produce a usable draft. 500-equivalent.
    #[error("Card synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    /// An attachment write failed before any record was created.
    #[error("Attachment storage failed: {0}")]
    Storage(#[from] StorageError),

    /// The record store rejected or failed the create call.
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// Transport failure on an LLM call (timeout, network).
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),
}
