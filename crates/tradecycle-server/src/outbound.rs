//! Outbound JSON-lines channel.
//!
//! Notifications, state refreshes and command replies all funnel through
//! one unbounded channel into a single writer task, so stdout lines never
//! interleave and their order matches the order they were produced in.

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use tradecycle_core::OutcomeSink;
use tradecycle_types::{Notification, RequesterId, StateRefresh};

use crate::commands::Reply;

/// One line written to stdout.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Outbound {
    /// A chat-style message for a requester.
    Notification {
        /// Recipient.
        requester: RequesterId,
        /// The message.
        #[serde(flatten)]
        notification: Notification,
    },
    /// A fresh offer list for a requester's open screen.
    Refresh {
        /// Recipient.
        requester: RequesterId,
        /// The refresh payload.
        #[serde(flatten)]
        refresh: StateRefresh,
    },
    /// The result of a console command.
    Reply(Reply),
}

/// [`OutcomeSink`] that forwards events to the writer task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ChannelSink {
    /// Wrap the sending half of the outbound channel.
    pub const fn new(tx: mpsc::UnboundedSender<Outbound>) -> Self {
        Self { tx }
    }

    /// Queue a line for stdout.
    pub fn send(&self, event: Outbound) {
        if self.tx.send(event).is_err() {
            debug!("Outbound writer has stopped, event dropped");
        }
    }

    /// Queue a command reply.
    pub fn reply(&self, reply: Reply) {
        self.send(Outbound::Reply(reply));
    }
}

impl OutcomeSink for ChannelSink {
    fn notify(&self, requester: RequesterId, notification: Notification) {
        self.send(Outbound::Notification {
            requester,
            notification,
        });
    }

    fn refresh(&self, requester: RequesterId, refresh: StateRefresh) {
        self.send(Outbound::Refresh { requester, refresh });
    }
}

/// Start the stdout writer. The task ends once every [`ChannelSink`] clone
/// has been dropped.
pub fn spawn_writer() -> (ChannelSink, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
    let handle = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = rx.recv().await {
            let mut line = match serde_json::to_string(&event) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize outbound event");
                    continue;
                }
            };
            line.push('\n');
            if let Err(e) = stdout.write_all(line.as_bytes()).await {
                warn!(error = %e, "Failed to write to stdout");
                break;
            }
            if let Err(e) = stdout.flush().await {
                warn!(error = %e, "Failed to flush stdout");
                break;
            }
        }
    });
    (ChannelSink::new(tx), handle)
}
