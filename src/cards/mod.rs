//! Card domain — validation, synthesis, markdown transduction, assembly.

pub mod assembler;
pub mod markdown;
pub mod model;
pub mod synthesizer;
pub mod validator;

pub use assembler::{CardRequest, draft_properties, manual_properties};
pub use markdown::markdown_to_blocks;
pub use model::{CardDraft, Category, Level, TITLE_PREFIX, Verdict};
pub use synthesizer::CardSynthesizer;
pub use validator::MessageValidator;

/// Product context the model needs to classify reports correctly. Shared by
/// the validator (admissibility) and the synthesizer (category/context).
pub(crate) const PROJECT_CONTEXT_FRONTEND: &str =
    "React chat application: real-time group and bot conversations over websockets, \
     Tailwind/Material UI interface, REST API integrations, authentication module, \
     user profile editing.";

pub(crate) const PROJECT_CONTEXT_BACKEND: &str =
    "Node.js with PostgreSQL: REST APIs, websocket conversation handling, chatbots, \
     OpenAI integrations, authentication and data management, AWS storage and \
     deployment, security and performance work.";

/// Extract a JSON object from LLM output (handles markdown fence wrapping).
pub(crate) fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    // Already a JSON object
    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    // Wrapped in a markdown code block
    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner.to_string();
            }
        }
    }

    // Try to find object bounds
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_direct_object() {
        let input = r#"{"isValid": true}"#;
        assert_eq!(extract_json_object(input), input);
    }

    #[test]
    fn extract_json_from_fenced_block() {
        let input = "```json\n{\"isValid\": false, \"reason\": \"spam\"}\n```";
        let result = extract_json_object(input);
        assert!(result.starts_with('{'));
        assert!(result.contains("spam"));
    }

    #[test]
    fn extract_json_from_bare_fence() {
        let input = "```\n{\"title\": \"x\"}\n```";
        let result = extract_json_object(input);
        assert_eq!(result, "{\"title\": \"x\"}");
    }

    #[test]
    fn extract_json_embedded_in_prose() {
        let input = "Here you go: {\"isValid\": true, \"reason\": \"ok\"} hope it helps";
        let result = extract_json_object(input);
        assert!(result.starts_with('{'));
        assert!(result.ends_with('}'));
    }

    #[test]
    fn extract_json_gives_up_on_garbage() {
        assert_eq!(extract_json_object("no json here"), "no json here");
    }
}
