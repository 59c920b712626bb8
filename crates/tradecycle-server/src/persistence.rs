//! YAML policy persistence.
//!
//! Accepted policy updates are written back into the config file by a
//! single background task. Writes are queued in order, so the file always
//! ends up holding the newest policy even when updates arrive in a burst.
//! Only the `policy` section is replaced: the writer re-reads the file
//! first, so hand edits to the other sections survive. Failures are logged
//! and never reach the dispatcher.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tradecycle_core::{PolicyPersistence, ServerConfig};
use tradecycle_types::Policy;

use crate::error::ServerError;

/// [`PolicyPersistence`] backed by the server's YAML config file.
#[derive(Debug)]
pub struct YamlPersistence {
    tx: mpsc::UnboundedSender<Policy>,
}

impl YamlPersistence {
    /// Start the writer task for `path`. `fallback` supplies the non-policy
    /// sections when the file is missing or unreadable. The task ends once
    /// the returned value is dropped.
    pub fn spawn(path: PathBuf, fallback: ServerConfig) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Policy>();
        let handle = tokio::spawn(async move {
            while let Some(policy) = rx.recv().await {
                let mut config = read_config(&path).await.unwrap_or_else(|e| {
                    debug!(path = %path.display(), error = %e, "Using startup config as base");
                    fallback.clone()
                });
                config.policy = policy;
                if let Err(e) = write_config(&path, &config).await {
                    warn!(path = %path.display(), error = %e, "Failed to persist policy");
                }
            }
        });
        (Self { tx }, handle)
    }
}

impl PolicyPersistence for YamlPersistence {
    fn persist(&self, policy: &Policy) {
        if self.tx.send(*policy).is_err() {
            warn!("Policy writer has stopped, update not persisted");
        }
    }
}

/// Read and validate the config currently on disk.
async fn read_config(path: &Path) -> Result<ServerConfig, ServerError> {
    let yaml = tokio::fs::read_to_string(path).await?;
    Ok(ServerConfig::parse(&yaml)?)
}

/// Write `config` to `path` as YAML.
pub async fn write_config(path: &Path, config: &ServerConfig) -> Result<(), ServerError> {
    let yaml = config.to_yaml()?;
    tokio::fs::write(path, yaml).await?;
    info!(path = %path.display(), "Config written");
    Ok(())
}
