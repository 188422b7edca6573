use serde::{Deserialize, Serialize};

use crate::types::ChatId;

/// Text that asks the bot to degrade everything cached for a chat.
pub const DEFAULT_TRIGGER_PHRASE: &str = "needs more jpeg";

/// One size variant of an uploaded photo, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoVariant {
    pub width: u32,
    pub height: u32,
    pub file_id: String,
}

/// A chat message normalized by the transport layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    /// Message text, or the caption for media messages.
    pub text: Option<String>,
    /// Photo size variants in the order the transport delivered them.
    #[serde(default)]
    pub photo: Vec<PhotoVariant>,
}

impl IncomingMessage {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: Some(text.into()),
            photo: Vec::new(),
        }
    }

    pub fn photo(chat_id: ChatId, photo: Vec<PhotoVariant>) -> Self {
        Self {
            chat_id,
            text: None,
            photo,
        }
    }
}
