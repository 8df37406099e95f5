//! Notion REST client.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::StoreError;
use crate::notion::RecordStore;
use crate::notion::types::{Block, Properties, RecordHandle, properties_to_json};

const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// Notion API client for page creation.
pub struct NotionClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl NotionClient {
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::RequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: NOTION_API_BASE.to_string(),
        })
    }

    /// Override the API base URL (tests).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl RecordStore for NotionClient {
    async fn create_record(
        &self,
        database_id: &str,
        properties: &Properties,
        blocks: &[Block],
    ) -> Result<RecordHandle, StoreError> {
        let body = serde_json::json!({
            "parent": { "database_id": database_id },
            "properties": properties_to_json(properties),
            "children": blocks.iter().map(Block::to_json).collect::<Vec<_>>(),
        });

        let resp = self
            .client
            .post(format!("{}/pages", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StoreError::Timeout
                } else {
                    StoreError::RequestFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(StoreError::CreateFailed {
                status: status.as_u16(),
                reason: detail,
            });
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;

        let id = data
            .get("id")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| StoreError::MalformedResponse("created page has no id".into()))?
            .to_string();
        let url = data
            .get("url")
            .and_then(serde_json::Value::as_str)
            .map(String::from);

        tracing::info!(page_id = %id, "Created Notion page");

        Ok(RecordHandle { id, url })
    }
}
