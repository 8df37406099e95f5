//! Property and block model for the Notion API.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Value, json};

/// A typed property value, one per schema field on a database page.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Title(String),
    RichText(String),
    Number(f64),
    Select(String),
    MultiSelect(Vec<String>),
    Date {
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
    Checkbox(bool),
    Url(String),
    Email(String),
    Phone(String),
}

impl PropertyValue {
    /// Render this value in the Notion API's property JSON shape.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Title(text) => json!({
                "title": [{ "text": { "content": text } }],
            }),
            Self::RichText(text) => json!({
                "rich_text": [{ "text": { "content": text } }],
            }),
            Self::Number(value) => json!({ "number": value }),
            Self::Select(option) => json!({ "select": { "name": option } }),
            Self::MultiSelect(options) => json!({
                "multi_select": options.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>(),
            }),
            Self::Date { start, end } => json!({
                "date": { "start": start.to_string(), "end": end.map(|d| d.to_string()) },
            }),
            Self::Checkbox(checked) => json!({ "checkbox": checked }),
            Self::Url(url) => json!({ "url": url }),
            Self::Email(email) => json!({ "email": email }),
            Self::Phone(phone) => json!({ "phone_number": phone }),
        }
    }
}

/// Property map for one record. BTreeMap keeps serialization order stable.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Render a property map as the Notion API `properties` object.
pub fn properties_to_json(properties: &Properties) -> Value {
    Value::Object(
        properties
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect(),
    )
}

/// One unit of page content, mirroring the Notion block model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading1(String),
    Heading2(String),
    Heading3(String),
    Bullet(String),
    Numbered(String),
    Quote(String),
    Divider,
    Image { url: String },
    Paragraph(String),
}

impl Block {
    /// Render this block in the Notion API's block JSON shape.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Heading1(text) => rich_text_block("heading_1", text),
            Self::Heading2(text) => rich_text_block("heading_2", text),
            Self::Heading3(text) => rich_text_block("heading_3", text),
            Self::Bullet(text) => rich_text_block("bulleted_list_item", text),
            Self::Numbered(text) => rich_text_block("numbered_list_item", text),
            Self::Quote(text) => rich_text_block("quote", text),
            Self::Divider => json!({
                "object": "block",
                "type": "divider",
                "divider": {},
            }),
            Self::Image { url } => json!({
                "object": "block",
                "type": "image",
                "image": { "type": "external", "external": { "url": url } },
            }),
            Self::Paragraph(text) => rich_text_block("paragraph", text),
        }
    }
}

fn rich_text_block(block_type: &str, text: &str) -> Value {
    json!({
        "object": "block",
        "type": block_type,
        block_type: {
            "rich_text": [{ "type": "text", "text": { "content": text } }],
        },
    })
}

/// Handle to a created record, opaque beyond id and URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHandle {
    pub id: String,
    pub url: Option<String>,
}
