//! Pipeline orchestrator — composes validation, synthesis, transduction and
//! assembly into the end-to-end card creation flows.
//!
//! All-or-nothing: any failure before the record-store call means nothing
//! was created; the record-store call itself is the last side effect.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::cards::{
    CardRequest, CardSynthesizer, MessageValidator, draft_properties, manual_properties,
    markdown_to_blocks,
};
use crate::error::PipelineError;
use crate::llm::LlmProvider;
use crate::notion::{RecordHandle, RecordStore};
use crate::storage::{Attachment, AttachmentResolver, ObjectStore};

/// End-to-end card creation pipeline over injected collaborators.
pub struct CardPipeline {
    validator: MessageValidator,
    synthesizer: CardSynthesizer,
    resolver: AttachmentResolver,
    store: Arc<dyn RecordStore>,
    database_id: String,
}

impl CardPipeline {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        objects: Arc<dyn ObjectStore>,
        store: Arc<dyn RecordStore>,
        database_id: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            validator: MessageValidator::new(llm.clone()),
            synthesizer: CardSynthesizer::new(llm),
            resolver: AttachmentResolver::new(objects, bucket),
            store,
            database_id: database_id.into(),
        }
    }

    /// The smart-card path: store attachments, validate, synthesize,
    /// transduce, assemble, create.
    ///
    /// Attachments are stored first so a storage failure aborts before any
    /// inference cost is spent. The synthesizer only runs after an
    /// admissible verdict.
    pub async fn create_smart_card(
        &self,
        message: &str,
        attachments: Vec<Attachment>,
    ) -> Result<RecordHandle, PipelineError> {
        if message.trim().is_empty() {
            return Err(PipelineError::MissingField {
                field: "message".into(),
            });
        }

        let refs = self.resolver.store_all(&attachments).await?;

        let verdict = self.validator.validate(message).await?;
        if !verdict.admissible {
            info!(reason = %verdict.reason, "Message rejected by validator");
            return Err(PipelineError::Rejected {
                reason: verdict.reason,
            });
        }
        debug!(reason = %verdict.reason, "Message admitted");

        let draft = self.synthesizer.synthesize(message, &refs).await?;

        let blocks = markdown_to_blocks(&draft.content);
        let properties = draft_properties(&draft, Utc::now().date_naive());

        let handle = self
            .store
            .create_record(&self.database_id, &properties, &blocks)
            .await?;

        info!(
            record_id = %handle.id,
            blocks = blocks.len(),
            attachments = refs.len(),
            "Smart card created"
        );

        Ok(handle)
    }

    /// The manual path: map caller-supplied fields directly onto the schema.
    pub async fn create_card(&self, request: CardRequest) -> Result<RecordHandle, PipelineError> {
        let (properties, blocks) = manual_properties(&request)?;

        let handle = self
            .store
            .create_record(&self.database_id, &properties, &blocks)
            .await?;

        info!(record_id = %handle.id, "Card created");
        Ok(handle)
    }
}
