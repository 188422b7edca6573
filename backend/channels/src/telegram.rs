use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::{error, info};

use crate::ChannelAdapter;
use morejpeg_core::{ChatId, IncomingMessage, PhotoVariant};
use morejpeg_session::SessionManager;

pub struct TelegramAdapter {
    bot: Bot,
}

impl TelegramAdapter {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Normalize a Telegram message. A caption counts as text.
pub fn normalize_message(msg: &Message) -> IncomingMessage {
    let photo = msg
        .photo()
        .map(|sizes| {
            sizes
                .iter()
                .map(|size| PhotoVariant {
                    width: size.width,
                    height: size.height,
                    file_id: size.file.id.0.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    IncomingMessage {
        chat_id: ChatId(msg.chat.id.0),
        text: msg.text().or_else(|| msg.caption()).map(str::to_owned),
        photo,
    }
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self, manager: Arc<SessionManager>) -> anyhow::Result<()> {
        info!("Starting Telegram adapter");

        let handler = Update::filter_message().endpoint(
            |msg: Message, manager: Arc<SessionManager>| async move {
                let incoming = normalize_message(&msg);
                if let Err(e) = manager.dispatch(incoming).await {
                    error!(chat_id = %msg.chat.id, error = %e, "Failed to dispatch Telegram message");
                }
                respond(())
            },
        );

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![manager])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram adapter stopped");
        Ok(())
    }
}
