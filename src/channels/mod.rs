//! Chat transport adapters.

pub mod telegram;

pub use telegram::{IncomingReport, TelegramNotifier, parse_update};

use async_trait::async_trait;

use crate::error::ChannelError;

/// Outbound chat notification boundary.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    /// Send a plain-text message to a chat.
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), ChannelError>;
}
