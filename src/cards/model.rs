//! Card data model — draft cards, categories, and the five-level scales.

use serde::{Deserialize, Serialize};

/// Fixed prefix every synthesized card title must carry.
pub const TITLE_PREFIX: &str = "Hotfix:";

/// Product area a report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Frontend,
    Backend,
    Mobile,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frontend => "Frontend",
            Self::Backend => "Backend",
            Self::Mobile => "Mobile",
        }
    }
}

/// Five-level ordinal scale, used independently for priority and impact.
///
/// Deserialization is strict: any value outside the five levels is a parse
/// error, which the synthesizer treats as a contract violation by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

/// Structured output of the card synthesizer.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDraft {
    /// Card title; must start with [`TITLE_PREFIX`].
    pub title: String,
    /// Product area the model classified the report into.
    pub project: Category,
    /// How urgently the report needs attention.
    pub priority: Level,
    /// How broadly the problem affects users.
    pub impact: Level,
    /// Card body as templated Markdown.
    pub content: String,
}

/// Admissibility verdict for one raw message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub admissible: bool,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_round_trips_display_names() {
        for level in [
            Level::VeryLow,
            Level::Low,
            Level::Medium,
            Level::High,
            Level::VeryHigh,
        ] {
            let json = serde_json::to_value(level).unwrap();
            assert_eq!(json, level.as_str());
            let back: Level = serde_json::from_value(json).unwrap();
            assert_eq!(back, level);
        }
    }

    #[test]
    fn level_rejects_off_scale_values() {
        assert!(serde_json::from_str::<Level>("\"Critical\"").is_err());
        assert!(serde_json::from_str::<Level>("\"very high\"").is_err());
    }

    #[test]
    fn category_rejects_unknown_projects() {
        assert!(serde_json::from_str::<Category>("\"Frontend\"").is_ok());
        assert!(serde_json::from_str::<Category>("\"DevOps\"").is_err());
    }

    #[test]
    fn levels_are_ordered() {
        assert!(Level::VeryLow < Level::Low);
        assert!(Level::High < Level::VeryHigh);
    }

    #[test]
    fn draft_parses_from_model_json() {
        let raw = r###"{
            "title": "Hotfix: Login button unresponsive",
            "project": "Frontend",
            "priority": "High",
            "impact": "Very High",
            "content": "## Description\nLogin button does nothing."
        }"###;
        let draft: CardDraft = serde_json::from_str(raw).unwrap();
        assert_eq!(draft.project, Category::Frontend);
        assert_eq!(draft.priority, Level::High);
        assert_eq!(draft.impact, Level::VeryHigh);
        assert!(draft.title.starts_with(TITLE_PREFIX));
    }
}
