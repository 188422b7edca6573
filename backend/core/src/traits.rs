use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::ChatId;

/// Outbound side of a chat transport (Telegram, or an in-memory double in tests).
///
/// The session handler only ever talks to the outside world through this trait.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the image stored at `path` to `chat_id`.
    async fn send_photo(&self, chat_id: ChatId, path: &Path) -> Result<()>;

    /// Send a plain text message to `chat_id`.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;

    /// Download a transport-hosted file (e.g. an uploaded photo) to `dest`.
    async fn download_file(&self, file_id: &str, dest: &Path) -> Result<()>;
}
