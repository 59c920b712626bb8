//! Trade-cycle server binary.
//!
//! Runs the cycle dispatcher against an in-memory sandbox host and drives
//! it from a JSON-lines console on stdin. Outbound events and command
//! replies are written to stdout as JSON lines; logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`TRADECYCLE_CONFIG`, default `tradecycle.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Seed the sandbox host and the operator roster
//! 4. Start the stdout writer and the policy writer
//! 5. Assemble the dispatcher
//! 6. Run the console until stdin closes
//! 7. Drain both writers

mod catalogue;
mod commands;
mod error;
mod outbound;
mod persistence;
mod sandbox;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tradecycle_core::{
    Collaborators, CycleDispatcher, LoggingConfig, PermissionOracle, PolicyStore, ServerConfig,
};
use tradecycle_ledger::CycleLedger;

use crate::commands::Console;
use crate::error::ServerError;
use crate::persistence::YamlPersistence;
use crate::sandbox::{OperatorRoster, SandboxHost};

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "TRADECYCLE_CONFIG";

/// Config file used when [`CONFIG_ENV`] is unset.
const DEFAULT_CONFIG_PATH: &str = "tradecycle.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the config file is invalid, stdin cannot be read,
/// or a writer task fails.
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // 1. Load configuration.
    let config_path = std::env::var_os(CONFIG_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, created) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(path = %config_path.display(), created, "tradecycle-server starting");
    info!(
        wandering_allowed = config.policy.wandering_allowed,
        wandering_cycle_limit = config.policy.wandering_cycle_limit,
        villager_cycle_limit = config.policy.villager_cycle_limit,
        operator_level = config.permissions.operator_level,
        "Configuration loaded"
    );
    if created {
        persistence::write_config(&config_path, &config).await?;
    }

    // 3. Seed the sandbox host and grant operator levels.
    let mut host = SandboxHost::seed(&config.sandbox);
    let roster = Arc::new(OperatorRoster::default());
    let operators: Vec<_> = config
        .permissions
        .operators
        .iter()
        .map(|name| host.requester(name))
        .collect();
    roster.replace(operators, config.permissions.operator_level);

    // 4. Start the writers.
    let (sink, stdout_writer) = outbound::spawn_writer();
    let (persistence, policy_writer) = YamlPersistence::spawn(config_path.clone(), config.clone());

    // 5. Assemble the dispatcher.
    let dispatcher = CycleDispatcher::new(
        Arc::new(PolicyStore::new(config.policy)),
        Arc::new(CycleLedger::new()),
        config.permissions.clone(),
        Collaborators {
            permissions: Arc::clone(&roster) as Arc<dyn PermissionOracle>,
            persistence: Arc::new(persistence),
            sink: Arc::new(sink.clone()),
        },
    );
    let mut console = Console::new(host, dispatcher, roster, config_path);

    // 6. Run the console.
    info!("Console ready, reading commands from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        sink.reply(console.handle_line(line));
    }

    // 7. Drain the writers.
    drop(console);
    drop(sink);
    policy_writer.await?;
    stdout_writer.await?;
    info!("tradecycle-server shutdown complete");
    Ok(())
}

/// Load the config file, falling back to defaults when it does not exist.
/// The flag reports whether defaults were used.
fn load_config(path: &std::path::Path) -> Result<(ServerConfig, bool), ServerError> {
    if path.exists() {
        Ok((ServerConfig::from_file(path)?, false))
    } else {
        Ok((ServerConfig::default(), true))
    }
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
