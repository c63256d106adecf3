//! Runtime for executing dialogue turns
//!
//! The webhook acknowledges deliveries immediately; messages are queued to a
//! per-identity inbox whose worker runs turns one at a time and streams the
//! resulting prompts to the messaging transport.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::DialogueRuntime;
pub use traits::*;

use crate::state_machine::InboundMessage;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

/// Inbox workers exit after this long without a message
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Manager for per-identity inbox workers
pub struct RuntimeManager {
    runtime: DialogueRuntime,
    sender: Arc<dyn PromptSender>,
    /// Senders are only used under the read lock, so holding the write lock
    /// guarantees no message is in flight to any inbox. Unbounded: one
    /// identity's backlog is limited only by how fast that user sends.
    inboxes: RwLock<HashMap<String, mpsc::UnboundedSender<InboundMessage>>>,
    idle_timeout: Duration,
}

impl RuntimeManager {
    pub fn new(runtime: DialogueRuntime, sender: Arc<dyn PromptSender>) -> Self {
        Self {
            runtime,
            sender,
            inboxes: RwLock::new(HashMap::new()),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn runtime(&self) -> &DialogueRuntime {
        &self.runtime
    }

    /// Number of live inbox workers
    pub async fn active_inboxes(&self) -> usize {
        self.inboxes.read().await.len()
    }

    /// Queue a message for its identity's worker, starting one if needed
    pub async fn enqueue(self: &Arc<Self>, message: InboundMessage) {
        let message = {
            let inboxes = self.inboxes.read().await;
            match inboxes.get(&message.identity) {
                Some(tx) => match tx.send(message) {
                    Ok(()) => return,
                    Err(mpsc::error::SendError(message)) => message,
                },
                None => message,
            }
        };

        let mut inboxes = self.inboxes.write().await;
        // Another caller may have started the worker meanwhile
        let message = match inboxes.get(&message.identity) {
            Some(tx) => match tx.send(message) {
                Ok(()) => return,
                Err(mpsc::error::SendError(message)) => message,
            },
            None => message,
        };

        let identity = message.identity.clone();
        let (tx, rx) = mpsc::unbounded_channel();
        if tx.send(message).is_err() {
            return;
        }
        inboxes.insert(identity.clone(), tx);
        drop(inboxes);

        tracing::debug!(identity = %identity, "Starting inbox worker");
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.run_inbox(identity, rx).await;
        });
    }

    async fn run_inbox(&self, identity: String, mut rx: mpsc::UnboundedReceiver<InboundMessage>) {
        loop {
            match tokio::time::timeout(self.idle_timeout, rx.recv()).await {
                Ok(Some(message)) => self.run_turn(message).await,
                Ok(None) => break,
                Err(_) => {
                    let mut inboxes = self.inboxes.write().await;
                    match rx.try_recv() {
                        Ok(message) => {
                            drop(inboxes);
                            self.run_turn(message).await;
                        }
                        Err(_) => {
                            inboxes.remove(&identity);
                            drop(inboxes);
                            let pruned = self.runtime.sessions().prune_idle(self.idle_timeout).await;
                            if pruned > 0 {
                                tracing::debug!(pruned, "Pruned idle sessions");
                            }
                            break;
                        }
                    }
                }
            }
        }
        tracing::debug!(identity = %identity, "Inbox worker stopped");
    }

    /// Run one turn, delivering prompts while later effects are still running
    async fn run_turn(&self, message: InboundMessage) {
        let identity = message.identity.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let turn = async move {
            self.runtime
                .process(&message, |prompt| {
                    let _ = tx.send(prompt);
                })
                .await;
        };

        let deliver = async {
            while let Some(prompt) = rx.recv().await {
                if let Err(e) = self.sender.send(&identity, &prompt).await {
                    tracing::warn!(identity = %identity, error = %e, "Failed to deliver prompt");
                }
            }
        };

        tokio::join!(turn, deliver);
    }
}
