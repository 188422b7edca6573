use std::sync::Arc;

use async_trait::async_trait;
use morejpeg_session::SessionManager;

pub mod telegram;
pub mod telegram_media;

pub use telegram::{TelegramAdapter, normalize_message};
pub use teloxide::Bot;
pub use telegram_media::TelegramTransport;

/// Inbound side of a chat transport.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Run the adapter's receive loop, handing every message to `manager`.
    /// Returns when the loop stops (e.g. on Ctrl-C).
    async fn start(&self, manager: Arc<SessionManager>) -> anyhow::Result<()>;
}
