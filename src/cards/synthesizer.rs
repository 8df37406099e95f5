//! Card synthesizer — turns an admissible message into a structured draft.
//!
//! Unlike the validator there is no safe default to fall back to: an
//! unparseable draft is a hard [`SynthesisError`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::cards::model::{CardDraft, TITLE_PREFIX};
use crate::cards::{PROJECT_CONTEXT_BACKEND, PROJECT_CONTEXT_FRONTEND, extract_json_object};
use crate::error::SynthesisError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::storage::AttachmentReference;

/// Temperature for synthesis — the body benefits from some variety.
const SYNTHESIS_TEMPERATURE: f32 = 0.7;

/// Max tokens for the full draft (title + templated Markdown body).
const SYNTHESIS_MAX_TOKENS: u32 = 2000;

/// Generates structured card drafts from admissible messages.
pub struct CardSynthesizer {
    llm: Arc<dyn LlmProvider>,
}

impl CardSynthesizer {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Run one synthesis round-trip and parse the draft.
    ///
    /// Attachment references are appended as a `## Screenshots` section
    /// *after* parsing succeeds, so the model never sees or fabricates
    /// attachment URLs.
    pub async fn synthesize(
        &self,
        message: &str,
        attachment_refs: &[AttachmentReference],
    ) -> Result<CardDraft, SynthesisError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_synthesis_prompt()),
            ChatMessage::user(message),
        ])
        .with_temperature(SYNTHESIS_TEMPERATURE)
        .with_max_tokens(SYNTHESIS_MAX_TOKENS);

        let response = self.llm.complete(request).await?;
        let mut draft = parse_draft(&response.content)?;

        if !attachment_refs.is_empty() {
            append_screenshots(&mut draft.content, attachment_refs);
        }

        info!(
            title = %draft.title,
            project = draft.project.as_str(),
            priority = draft.priority.as_str(),
            impact = draft.impact.as_str(),
            screenshots = attachment_refs.len(),
            "Synthesized card draft"
        );

        Ok(draft)
    }
}

/// Build the fixed synthesis policy prompt: domain context, rubrics, title
/// and body template rules, and the required JSON shape.
fn build_synthesis_prompt() -> String {
    format!(
        "You are an assistant that analyzes bug reports and requests and produces structured ticket data.\n\n\
         PROJECT CONTEXT:\n\
         - Frontend: {PROJECT_CONTEXT_FRONTEND}\n\
         - Backend: {PROJECT_CONTEXT_BACKEND}\n\n\
         PRIORITY CRITERIA:\n\
         - Very High: system down, blocks all users, critical production error\n\
         - High: critical functionality affected, impacts many users\n\
         - Medium: partial bug, secondary functionality misbehaving\n\
         - Low: minor improvement, cosmetic bug, not urgent\n\
         - Very Low: nice to have, optional improvement, minimal impact\n\n\
         IMPACT CRITERIA:\n\
         - Very High: affects every user, system completely unusable\n\
         - High: affects many users or core functionality\n\
         - Medium: affects a specific group of users or secondary functionality\n\
         - Low: affects few users, workaround available\n\
         - Very Low: minimal, barely noticeable\n\n\
         INSTRUCTIONS:\n\
         1. Analyze the user's message\n\
         2. Decide which project it belongs to (Frontend, Backend or Mobile)\n\
         3. Assign a priority using the criteria\n\
         4. Assign an impact using the criteria\n\
         5. Write a concise descriptive title, prefixed with \"{TITLE_PREFIX}\" and then the ticket title\n\
         6. Write the body in Markdown with this structure:\n\n\
         ## Description\n\
         [Clear technical summary of the problem, naming the affected component or area]\n\n\
         ## Technical context\n\
         [Based on the project, likely components, services or areas involved]\n\n\
         ## Pending information\n\
         [Clarifying questions that would speed up a fix, e.g.:]\n\
         - Does the console show any error?\n\
         - Is it consistently reproducible?\n\
         - Does it affect all users or only some?\n\n\
         ## Additional notes\n\
         [Only if there are relevant observations based on the context]\n\n\
         IMPORTANT RULES:\n\
         - Do NOT repeat the user's message verbatim\n\
         - ADD technical context based on the project\n\
         - GENERATE useful questions to complete the picture\n\
         - Be concise but add value\n\
         - The title must be short (at most 8 words after the prefix)\n\
         - If the message is vague, lean on the questions to gather more information\n\n\
         Respond with ONLY a valid JSON object with this structure:\n\
         {{\n\
           \"title\": \"{TITLE_PREFIX} Descriptive title\",\n\
           \"project\": \"Frontend|Backend|Mobile\",\n\
           \"priority\": \"Very High|High|Medium|Low|Very Low\",\n\
           \"impact\": \"Very High|High|Medium|Low|Very Low\",\n\
           \"content\": \"Markdown body\"\n\
         }}"
    )
}

/// Parse the raw model reply into a draft. Any malformed field — including
/// off-enum project/priority/impact values and a title without the required
/// prefix — is a contract violation, not something to coerce.
fn parse_draft(raw: &str) -> Result<CardDraft, SynthesisError> {
    let json_str = extract_json_object(raw);
    let draft: CardDraft = serde_json::from_str(&json_str).map_err(|e| {
        warn!(
            error = %e,
            raw_response = raw,
            "Unparseable card draft from model"
        );
        SynthesisError::Malformed {
            reason: e.to_string(),
        }
    })?;

    if !draft.title.starts_with(TITLE_PREFIX) {
        warn!(title = %draft.title, "Draft title missing required prefix");
        return Err(SynthesisError::BadTitle { title: draft.title });
    }

    Ok(draft)
}

/// Append a screenshots section, one image embed per reference, upload order.
fn append_screenshots(content: &mut String, refs: &[AttachmentReference]) {
    content.push_str("\n\n## Screenshots\n");
    for (i, reference) in refs.iter().enumerate() {
        content.push_str(&format!(
            "![screenshot-{}]({})\n",
            i + 1,
            reference.public_url
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::CompletionResponse;
    use async_trait::async_trait;

    const GOOD_DRAFT: &str = r###"{
        "title": "Hotfix: Checkout spinner never resolves",
        "project": "Frontend",
        "priority": "High",
        "impact": "Medium",
        "content": "## Description\nSpinner hangs on checkout.\n\n## Technical context\nLikely the payment API call."
    }"###;

    struct FixedLlm {
        response: String,
    }

    #[async_trait]
    impl LlmProvider for FixedLlm {
        fn model_name(&self) -> &str {
            "fixed"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                content: self.response.clone(),
                input_tokens: 0,
                output_tokens: 0,
            })
        }
    }

    fn synthesizer(response: &str) -> CardSynthesizer {
        CardSynthesizer::new(Arc::new(FixedLlm {
            response: response.into(),
        }))
    }

    fn reference(url: &str) -> AttachmentReference {
        AttachmentReference {
            public_url: url.into(),
        }
    }

    #[tokio::test]
    async fn good_draft_parses() {
        let draft = synthesizer(GOOD_DRAFT)
            .synthesize("checkout spinner hangs", &[])
            .await
            .unwrap();
        assert!(draft.title.starts_with(TITLE_PREFIX));
        assert_eq!(draft.project.as_str(), "Frontend");
        assert!(!draft.content.contains("Screenshots"));
    }

    #[tokio::test]
    async fn fenced_draft_parses() {
        let fenced = format!("```json\n{GOOD_DRAFT}\n```");
        let draft = synthesizer(&fenced)
            .synthesize("checkout spinner hangs", &[])
            .await
            .unwrap();
        assert_eq!(draft.priority.as_str(), "High");
    }

    #[tokio::test]
    async fn garbage_response_is_hard_failure() {
        let result = synthesizer("sorry, I can't help with that")
            .synthesize("bug report", &[])
            .await;
        assert!(matches!(result, Err(SynthesisError::Malformed { .. })));
    }

    #[tokio::test]
    async fn off_enum_priority_is_hard_failure() {
        let raw = r#"{"title": "Hotfix: x", "project": "Frontend", "priority": "Urgent", "impact": "Low", "content": "body"}"#;
        let result = synthesizer(raw).synthesize("bug", &[]).await;
        assert!(matches!(result, Err(SynthesisError::Malformed { .. })));
    }

    #[tokio::test]
    async fn off_enum_project_is_hard_failure() {
        let raw = r#"{"title": "Hotfix: x", "project": "Infra", "priority": "Low", "impact": "Low", "content": "body"}"#;
        let result = synthesizer(raw).synthesize("bug", &[]).await;
        assert!(matches!(result, Err(SynthesisError::Malformed { .. })));
    }

    #[tokio::test]
    async fn missing_title_prefix_is_hard_failure() {
        let raw = r#"{"title": "Checkout broken", "project": "Frontend", "priority": "High", "impact": "High", "content": "body"}"#;
        let result = synthesizer(raw).synthesize("bug", &[]).await;
        assert!(matches!(result, Err(SynthesisError::BadTitle { .. })));
    }

    #[tokio::test]
    async fn screenshots_appended_in_upload_order() {
        let refs = vec![
            reference("https://cdn.test/shots/a.png"),
            reference("https://cdn.test/shots/b.png"),
        ];
        let draft = synthesizer(GOOD_DRAFT)
            .synthesize("checkout spinner hangs", &refs)
            .await
            .unwrap();

        let section = draft.content.split("## Screenshots").nth(1).unwrap();
        let first = section.find("a.png").unwrap();
        let second = section.find("b.png").unwrap();
        assert!(first < second);
        assert!(section.contains("![screenshot-1](https://cdn.test/shots/a.png)"));
        assert!(section.contains("![screenshot-2](https://cdn.test/shots/b.png)"));
    }

    #[tokio::test]
    async fn no_screenshots_section_without_attachments() {
        let draft = synthesizer(GOOD_DRAFT)
            .synthesize("checkout spinner hangs", &[])
            .await
            .unwrap();
        assert!(!draft.content.contains("## Screenshots"));
    }

    #[tokio::test]
    async fn parse_failure_skips_screenshot_append() {
        // Append happens only after a successful parse.
        let refs = vec![reference("https://cdn.test/shots/a.png")];
        let result = synthesizer("not json").synthesize("bug", &refs).await;
        assert!(result.is_err());
    }

    #[test]
    fn synthesis_prompt_carries_rubrics_and_template() {
        let prompt = build_synthesis_prompt();
        assert!(prompt.contains(TITLE_PREFIX));
        assert!(prompt.contains("PRIORITY CRITERIA"));
        assert!(prompt.contains("IMPACT CRITERIA"));
        assert!(prompt.contains("## Description"));
        assert!(prompt.contains("## Pending information"));
        assert!(prompt.contains("verbatim"));
    }
}
