//! Telegram Media Transport
//!
//! Outbound photos and text, and downloads of uploaded photos, over the Bot API.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use morejpeg_core::{ChatId, ChatTransport};

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
    teloxide::types::ChatId(chat_id.0)
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_photo(&self, chat_id: ChatId, path: &Path) -> Result<()> {
        info!(chat_id = %chat_id, path = %path.display(), "Uploading photo");
        self.bot
            .send_photo(tg_chat(chat_id), InputFile::file(path))
            .await
            .with_context(|| format!("send_photo to chat {chat_id}"))?;
        Ok(())
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.bot
            .send_message(tg_chat(chat_id), text)
            .await
            .with_context(|| format!("send_message to chat {chat_id}"))?;
        Ok(())
    }

    async fn download_file(&self, file_id: &str, dest: &Path) -> Result<()> {
        debug!(file_id, dest = %dest.display(), "Downloading Telegram file");
        let file = self
            .bot
            .get_file(FileId(file_id.to_owned()))
            .await
            .with_context(|| format!("get_file {file_id}"))?;
        let mut dst = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("create {}", dest.display()))?;
        self.bot
            .download_file(&file.path, &mut dst)
            .await
            .with_context(|| format!("download {file_id}"))?;
        dst.flush().await?;
        Ok(())
    }
}
