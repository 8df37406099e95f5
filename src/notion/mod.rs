//! Notion record store — property/block model and REST client.

pub mod client;
pub mod types;

pub use client::NotionClient;
pub use types::{Block, Properties, PropertyValue, RecordHandle};

use async_trait::async_trait;

use crate::error::StoreError;

/// Structured-record store boundary.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create one record in `database_id` with the given properties and
    /// content blocks, returning a handle to the created record.
    async fn create_record(
        &self,
        database_id: &str,
        properties: &Properties,
        blocks: &[Block],
    ) -> Result<RecordHandle, StoreError>;
}
