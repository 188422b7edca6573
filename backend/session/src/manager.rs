//! One sequential worker per chat.
//!
//! Messages for a chat are queued to that chat's worker and handled strictly in
//! arrival order; different chats run in parallel on the tokio runtime.

use std::sync::Arc;

use anyhow::{bail, Result};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use morejpeg_core::{ChatCache, ChatId, IncomingMessage};

use crate::handler::ChatSessionHandler;

/// Default per-chat queue depth.
const DEFAULT_QUEUE_CAPACITY: usize = 32;

pub struct SessionManager {
    handler: Arc<ChatSessionHandler>,
    workers: DashMap<ChatId, mpsc::Sender<IncomingMessage>>,
    queue_capacity: usize,
}

impl SessionManager {
    pub fn new(handler: Arc<ChatSessionHandler>) -> Self {
        Self::with_queue_capacity(handler, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_queue_capacity(handler: Arc<ChatSessionHandler>, queue_capacity: usize) -> Self {
        Self {
            handler,
            workers: DashMap::new(),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// The process-wide cache every worker shares.
    pub fn cache(&self) -> &Arc<ChatCache> {
        self.handler.cache()
    }

    /// Number of chats with a live worker.
    pub fn active_workers(&self) -> usize {
        self.workers.len()
    }

    /// Queue `msg` on its chat's worker, spawning the worker on first use.
    ///
    /// Waits only for queue space, never for the message to be handled.
    pub async fn dispatch(&self, msg: IncomingMessage) -> Result<()> {
        let chat_id = msg.chat_id;
        let mut msg = msg;
        // A worker that died leaves a closed queue behind; replace it once.
        for _ in 0..2 {
            let tx = self
                .workers
                .entry(chat_id)
                .or_insert_with(|| self.spawn_worker(chat_id))
                .value()
                .clone();
            match tx.send(msg).await {
                Ok(()) => return Ok(()),
                Err(mpsc::error::SendError(returned)) => {
                    debug!(chat_id = %chat_id, "Worker queue closed, respawning");
                    self.workers
                        .remove_if(&chat_id, |_, current| current.same_channel(&tx));
                    msg = returned;
                }
            }
        }
        bail!("no worker available for chat {chat_id}")
    }

    fn spawn_worker(&self, chat_id: ChatId) -> mpsc::Sender<IncomingMessage> {
        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(self.queue_capacity);
        let handler = Arc::clone(&self.handler);
        tokio::spawn(async move {
            debug!(chat_id = %chat_id, "Chat worker started");
            while let Some(msg) = rx.recv().await {
                match handler.on_message(msg).await {
                    Ok(outcome) => debug!(chat_id = %chat_id, ?outcome, "Message handled"),
                    Err(e) => error!(chat_id = %chat_id, error = %format!("{e:#}"), "Chat handler failed"),
                }
            }
            debug!(chat_id = %chat_id, "Chat worker stopped");
        });
        tx
    }

    /// Drop every worker queue. Workers finish what is already queued, then exit.
    pub fn shutdown(&self) {
        info!(workers = self.workers.len(), "Shutting down chat workers");
        self.workers.clear();
    }
}
