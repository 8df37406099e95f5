//! Record assembler — maps card data onto the Notion property schema.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::cards::model::CardDraft;
use crate::error::PipelineError;
use crate::notion::{Block, Properties, PropertyValue};

/// Project Status assigned to every AI-synthesized card.
const STATUS_HOTFIX: &str = "Hotfix";

/// Build the property map for a synthesized draft.
///
/// The draft has already been validated (enums parsed strictly, title prefix
/// checked), so every field maps unconditionally.
pub fn draft_properties(draft: &CardDraft, today: NaiveDate) -> Properties {
    let mut properties = Properties::new();
    properties.insert("Name".into(), PropertyValue::Title(draft.title.clone()));
    properties.insert(
        "Project".into(),
        PropertyValue::MultiSelect(vec![draft.project.as_str().to_string()]),
    );
    properties.insert(
        "Priority".into(),
        PropertyValue::Select(draft.priority.as_str().to_string()),
    );
    properties.insert(
        "Impact".into(),
        PropertyValue::Select(draft.impact.as_str().to_string()),
    );
    properties.insert(
        "Date".into(),
        PropertyValue::Date {
            start: today,
            end: None,
        },
    );
    properties.insert(
        "Project Status".into(),
        PropertyValue::Select(STATUS_HOTFIX.into()),
    );
    properties
}

/// Manual card creation payload (the non-AI path).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRequest {
    pub title: Option<String>,
    /// Plain body text; becomes a single paragraph block.
    pub text: Option<String>,
    pub project: Option<String>,
    pub person: Option<String>,
    pub priority: Option<String>,
    pub impact: Option<String>,
    pub date: Option<NaiveDate>,
    pub project_status: Option<String>,
}

/// Build properties and blocks for a manual card.
///
/// `title` is required; every other field maps to its property only when
/// present — absent fields are omitted entirely, never set to null.
pub fn manual_properties(request: &CardRequest) -> Result<(Properties, Vec<Block>), PipelineError> {
    let title = request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| PipelineError::MissingField {
            field: "title".into(),
        })?;

    let mut properties = Properties::new();
    properties.insert("Name".into(), PropertyValue::Title(title.to_string()));

    if let Some(project) = &request.project {
        properties.insert(
            "Project".into(),
            PropertyValue::MultiSelect(vec![project.clone()]),
        );
    }
    if let Some(date) = request.date {
        properties.insert(
            "Date".into(),
            PropertyValue::Date {
                start: date,
                end: None,
            },
        );
    }
    if let Some(person) = &request.person {
        properties.insert("Person".into(), PropertyValue::Select(person.clone()));
    }
    if let Some(priority) = &request.priority {
        properties.insert("Priority".into(), PropertyValue::Select(priority.clone()));
    }
    if let Some(impact) = &request.impact {
        properties.insert("Impact".into(), PropertyValue::Select(impact.clone()));
    }
    if let Some(status) = &request.project_status {
        properties.insert(
            "Project Status".into(),
            PropertyValue::Select(status.clone()),
        );
    }

    let blocks = match request.text.as_deref().filter(|t| !t.is_empty()) {
        Some(text) => vec![Block::Paragraph(text.to_string())],
        None => Vec::new(),
    };

    Ok((properties, blocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::model::{Category, Level};

    fn draft() -> CardDraft {
        CardDraft {
            title: "Hotfix: Session tokens expire early".into(),
            project: Category::Backend,
            priority: Level::High,
            impact: Level::Medium,
            content: "## Description\nTokens expire after 5 minutes.".into(),
        }
    }

    #[test]
    fn draft_properties_cover_full_schema() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let properties = draft_properties(&draft(), today);

        assert_eq!(properties.len(), 6);
        assert_eq!(
            properties["Name"],
            PropertyValue::Title("Hotfix: Session tokens expire early".into())
        );
        assert_eq!(
            properties["Project"],
            PropertyValue::MultiSelect(vec!["Backend".into()])
        );
        assert_eq!(properties["Priority"], PropertyValue::Select("High".into()));
        assert_eq!(properties["Impact"], PropertyValue::Select("Medium".into()));
        assert_eq!(
            properties["Date"],
            PropertyValue::Date {
                start: today,
                end: None
            }
        );
        assert_eq!(
            properties["Project Status"],
            PropertyValue::Select("Hotfix".into())
        );
    }

    #[test]
    fn title_only_request_maps_to_single_property() {
        let request = CardRequest {
            title: Some("Bug".into()),
            ..Default::default()
        };
        let (properties, blocks) = manual_properties(&request).unwrap();

        assert_eq!(properties.len(), 1);
        assert_eq!(properties["Name"], PropertyValue::Title("Bug".into()));
        assert!(blocks.is_empty());
    }

    #[test]
    fn missing_title_is_a_validation_error() {
        let request = CardRequest::default();
        let err = manual_properties(&request).unwrap_err();
        assert!(matches!(err, PipelineError::MissingField { ref field } if field == "title"));
    }

    #[test]
    fn blank_title_is_a_validation_error() {
        let request = CardRequest {
            title: Some("   ".into()),
            ..Default::default()
        };
        assert!(manual_properties(&request).is_err());
    }

    #[test]
    fn optional_fields_map_only_when_present() {
        let request = CardRequest {
            title: Some("T".into()),
            priority: Some("Low".into()),
            date: NaiveDate::from_ymd_opt(2025, 2, 3),
            ..Default::default()
        };
        let (properties, _) = manual_properties(&request).unwrap();

        assert_eq!(properties.len(), 3);
        assert!(properties.contains_key("Priority"));
        assert!(properties.contains_key("Date"));
        assert!(!properties.contains_key("Person"));
        assert!(!properties.contains_key("Impact"));
        assert!(!properties.contains_key("Project Status"));
    }

    #[test]
    fn body_text_becomes_single_paragraph() {
        let request = CardRequest {
            title: Some("T".into()),
            text: Some("One flat paragraph\nwith a newline kept inline".into()),
            ..Default::default()
        };
        let (_, blocks) = manual_properties(&request).unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(matches!(blocks[0], Block::Paragraph(_)));
    }

    #[test]
    fn full_request_maps_every_field() {
        let request = CardRequest {
            title: Some("T".into()),
            text: Some("body".into()),
            project: Some("Mobile".into()),
            person: Some("Ada".into()),
            priority: Some("Very High".into()),
            impact: Some("Low".into()),
            date: NaiveDate::from_ymd_opt(2025, 1, 1),
            project_status: Some("In Progress".into()),
        };
        let (properties, blocks) = manual_properties(&request).unwrap();
        assert_eq!(properties.len(), 7);
        assert_eq!(blocks.len(), 1);
    }
}
