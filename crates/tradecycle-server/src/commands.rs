//! Console commands.
//!
//! Each stdin line is one JSON [`Command`]. The [`Console`] applies it to
//! the sandbox host or the dispatcher and produces a [`Reply`]. Binary
//! packets can be injected with `packet`, which runs the payload through
//! the same wire codec the client uses.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tradecycle_core::{ConfigUpdateOutcome, CycleDispatcher, CycleOutcome, DispatchReport, ServerConfig};
use tradecycle_ledger::CycleRecord;
use tradecycle_types::wire::{
    CYCLE_TRADE_CHANNEL, RELOAD_CONFIG_CHANNEL, decode_config_update, decode_cycle_trade,
};
use tradecycle_types::{
    ConfigUpdateRequest, CycleTradeRequest, EntityId, ItemStack, Policy, RejectionReason,
    ReturnedItem, SessionId, TradeEntity, TradeRole,
};

use crate::sandbox::{OperatorRoster, SandboxHost};

/// A console command.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// List every merchant.
    Merchants,
    /// Open a trading screen.
    Open {
        /// Player name.
        player: String,
        /// Merchant to trade with.
        merchant: EntityId,
    },
    /// Stage an item in an input slot.
    Place {
        /// Player name.
        player: String,
        /// Input slot (0 or 1).
        slot: u8,
        /// Item identifier.
        item: String,
        /// Stack size.
        count: u32,
    },
    /// Take the output slot.
    Trade {
        /// Player name.
        player: String,
    },
    /// Cycle the open merchant.
    Cycle {
        /// Player name.
        player: String,
        /// Optional notification preferences.
        #[serde(flatten)]
        request: CycleTradeRequest,
    },
    /// Update the policy.
    Config {
        /// Player name.
        player: String,
        /// The update.
        #[serde(flatten)]
        update: ConfigUpdateRequest,
    },
    /// Deliver a raw client packet.
    Packet {
        /// Player name.
        player: String,
        /// Channel identifier.
        channel: String,
        /// Packet body bytes.
        payload: Vec<u8>,
    },
    /// Reload the policy from the config file.
    Reload,
    /// Dump the cycle ledger.
    Ledger,
    /// Close the trading screen.
    Close {
        /// Player name.
        player: String,
    },
}

/// Summary of a dispatched cycle request.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    /// Session the request ran in.
    pub session_id: SessionId,
    /// Merchant that was evaluated.
    pub merchant: EntityId,
    /// Merchant role.
    pub role: TradeRole,
    /// Whether offers were regenerated.
    pub accepted: bool,
    /// Rejection reason, if rejected.
    pub reason: Option<RejectionReason>,
    /// Items given back from the pending slots.
    pub returned_items: Vec<ReturnedItem>,
    /// Ledger count after the request.
    pub cycle_count: u32,
}

impl From<DispatchReport> for CycleSummary {
    fn from(report: DispatchReport) -> Self {
        let reason = report.outcome.rejection_reason();
        Self {
            session_id: report.session_id,
            merchant: report.merchant,
            role: report.role,
            accepted: matches!(report.outcome, CycleOutcome::Accepted { .. }),
            reason,
            returned_items: report.returned_items,
            cycle_count: report.cycle_count,
        }
    }
}

/// Result of a policy update as reported on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    /// Stored and persisted.
    Applied,
    /// Requester lacks permission.
    Unauthorized,
    /// Out-of-range limit.
    Invalid,
}

/// The result of a command.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    /// Every merchant.
    Merchants {
        /// Merchants ordered by id.
        merchants: Vec<TradeEntity>,
    },
    /// A screen was opened.
    Opened {
        /// Player name.
        player: String,
        /// The new session.
        session_id: SessionId,
        /// The merchant.
        merchant: EntityId,
    },
    /// An item was staged.
    Placed {
        /// Player name.
        player: String,
        /// What the output slot now shows.
        preview: Option<ItemStack>,
    },
    /// A trade completed.
    Traded {
        /// Player name.
        player: String,
        /// What the player received.
        received: ItemStack,
    },
    /// A cycle request was handled. `summary` is absent when it was
    /// dropped for lack of a session.
    Cycled {
        /// Player name.
        player: String,
        /// What happened.
        summary: Option<CycleSummary>,
    },
    /// A policy update was handled.
    ConfigUpdated {
        /// Player name.
        player: String,
        /// What happened.
        status: UpdateStatus,
        /// The policy now in force.
        policy: Policy,
    },
    /// The policy was reloaded from disk.
    Reloaded {
        /// The policy now in force.
        policy: Policy,
    },
    /// The ledger contents.
    Ledger {
        /// Entries ordered by merchant id.
        entries: Vec<(EntityId, CycleRecord)>,
    },
    /// A screen was closed.
    Closed {
        /// Player name.
        player: String,
        /// Items given back from the pending slots.
        returned_items: Vec<ReturnedItem>,
        /// Everything the player now holds.
        inventory: Vec<ItemStack>,
    },
    /// The command failed.
    Error {
        /// What went wrong.
        message: String,
    },
}

impl Reply {
    fn error(message: impl ToString) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }
}

/// Applies commands to the sandbox and the dispatcher.
pub struct Console {
    host: SandboxHost,
    dispatcher: CycleDispatcher,
    roster: Arc<OperatorRoster>,
    config_path: PathBuf,
}

impl Console {
    /// Create a console. `roster` must be the oracle the dispatcher checks
    /// permissions against, so that `reload` can replace its grants.
    pub const fn new(
        host: SandboxHost,
        dispatcher: CycleDispatcher,
        roster: Arc<OperatorRoster>,
        config_path: PathBuf,
    ) -> Self {
        Self {
            host,
            dispatcher,
            roster,
            config_path,
        }
    }

    /// Parse and apply one input line.
    pub fn handle_line(&mut self, line: &str) -> Reply {
        match serde_json::from_str::<Command>(line) {
            Ok(command) => self.handle(command),
            Err(e) => {
                warn!(error = %e, "Unparseable command");
                Reply::error(format!("invalid command: {e}"))
            }
        }
    }

    /// Apply one command.
    pub fn handle(&mut self, command: Command) -> Reply {
        match command {
            Command::Merchants => Reply::Merchants {
                merchants: self.host.merchants().cloned().collect(),
            },
            Command::Open { player, merchant } => {
                let requester = self.host.requester(&player);
                match self.host.open(requester, merchant) {
                    Ok(session_id) => Reply::Opened {
                        player,
                        session_id,
                        merchant,
                    },
                    Err(e) => Reply::error(e),
                }
            }
            Command::Place {
                player,
                slot,
                item,
                count,
            } => {
                let requester = self.host.requester(&player);
                match self
                    .host
                    .place(&player, requester, slot, ItemStack::new(item, count))
                {
                    Ok(preview) => Reply::Placed { player, preview },
                    Err(e) => Reply::error(e),
                }
            }
            Command::Trade { player } => {
                let requester = self.host.requester(&player);
                match self.host.trade(&player, requester) {
                    Ok(received) => Reply::Traded { player, received },
                    Err(e) => Reply::error(e),
                }
            }
            Command::Cycle { player, request } => self.cycle(player, &request),
            Command::Config { player, update } => self.update_policy(player, &update),
            Command::Packet {
                player,
                channel,
                payload,
            } => self.packet(player, &channel, &payload),
            Command::Reload => self.reload(),
            Command::Ledger => Reply::Ledger {
                entries: self.dispatcher.ledger().snapshot(),
            },
            Command::Close { player } => {
                let requester = self.host.requester(&player);
                let returned_items = self.host.close(requester);
                Reply::Closed {
                    player,
                    returned_items,
                    inventory: self.host.inventory(requester).to_vec(),
                }
            }
        }
    }

    fn cycle(&mut self, player: String, request: &CycleTradeRequest) -> Reply {
        let requester = self.host.requester(&player);
        let summary = self
            .dispatcher
            .handle_cycle(&mut self.host, requester, request)
            .map(CycleSummary::from);
        Reply::Cycled { player, summary }
    }

    fn update_policy(&mut self, player: String, update: &ConfigUpdateRequest) -> Reply {
        let requester = self.host.requester(&player);
        let status = match self.dispatcher.handle_config_update(requester, update) {
            ConfigUpdateOutcome::Applied(_) => UpdateStatus::Applied,
            ConfigUpdateOutcome::Unauthorized => UpdateStatus::Unauthorized,
            ConfigUpdateOutcome::Invalid => UpdateStatus::Invalid,
        };
        Reply::ConfigUpdated {
            player,
            status,
            policy: self.dispatcher.policy().get(),
        }
    }

    fn packet(&mut self, player: String, channel: &str, payload: &[u8]) -> Reply {
        match channel {
            CYCLE_TRADE_CHANNEL => match decode_cycle_trade(payload) {
                Ok(request) => self.cycle(player, &request),
                Err(e) => Reply::error(e),
            },
            RELOAD_CONFIG_CHANNEL => match decode_config_update(payload) {
                Ok(update) => self.update_policy(player, &update),
                Err(e) => Reply::error(e),
            },
            other => Reply::error(format!("unknown channel {other}")),
        }
    }

    fn reload(&mut self) -> Reply {
        let config = match ServerConfig::from_file(&self.config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %self.config_path.display(), error = %e, "Reload failed");
                return Reply::error(e);
            }
        };
        if let Err(e) = self.dispatcher.policy().reload(config.policy) {
            return Reply::error(e);
        }
        let operators: Vec<_> = config
            .permissions
            .operators
            .iter()
            .map(|name| self.host.requester(name))
            .collect();
        self.roster
            .replace(operators, config.permissions.operator_level);
        self.dispatcher.set_permissions(config.permissions);
        info!(path = %self.config_path.display(), "Config reloaded");
        Reply::Reloaded {
            policy: self.dispatcher.policy().get(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use tradecycle_core::{
        Collaborators, PermissionOracle, PermissionsConfig, PolicyPersistence, PolicyStore,
        SandboxConfig,
    };
    use tradecycle_ledger::CycleLedger;
    use tradecycle_types::{EntityRole, wire::encode_cycle_trade};

    use super::*;
    use crate::outbound::ChannelSink;
    use crate::persistence::{YamlPersistence, write_config};

    struct NoPersistence;

    impl PolicyPersistence for NoPersistence {
        fn persist(&self, _policy: &Policy) {}
    }

    fn console(roster: OperatorRoster, host: SandboxHost) -> Console {
        console_with(
            roster,
            host,
            Arc::new(NoPersistence),
            PathBuf::from("/nonexistent/tradecycle.yaml"),
        )
    }

    fn console_with(
        roster: OperatorRoster,
        host: SandboxHost,
        persistence: Arc<dyn PolicyPersistence>,
        config_path: PathBuf,
    ) -> Console {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);
        let roster = Arc::new(roster);
        let dispatcher = CycleDispatcher::new(
            Arc::new(PolicyStore::default()),
            Arc::new(CycleLedger::new()),
            PermissionsConfig::default(),
            Collaborators {
                permissions: Arc::clone(&roster) as Arc<dyn PermissionOracle>,
                persistence,
                sink: Arc::new(sink),
            },
        );
        Console::new(host, dispatcher, roster, config_path)
    }

    fn sandbox() -> SandboxHost {
        SandboxHost::seed(&SandboxConfig {
            seed: 11,
            villagers: 30,
            wandering_traders: 1,
        })
    }

    fn trading_villager(host: &SandboxHost) -> EntityId {
        host.merchants()
            .find(|m| matches!(&m.role, EntityRole::Villager(p) if p.profession.can_trade()))
            .map(|m| m.id)
            .unwrap()
    }

    #[test]
    fn open_then_cycle_is_accepted() {
        let host = sandbox();
        let merchant = trading_villager(&host);
        let mut console = console(OperatorRoster::default(), host);

        console.handle_line(&format!(
            r#"{{"command":"open","player":"alex","merchant":"{merchant}"}}"#
        ));
        let reply = console.handle_line(r#"{"command":"cycle","player":"alex"}"#);

        let Reply::Cycled {
            summary: Some(summary),
            ..
        } = reply
        else {
            panic!("expected a cycle summary");
        };
        assert!(summary.accepted);
        assert_eq!(summary.cycle_count, 1);
    }

    #[test]
    fn cycle_without_screen_is_dropped() {
        let mut console = console(OperatorRoster::default(), sandbox());
        let reply = console.handle_line(r#"{"command":"cycle","player":"nobody"}"#);
        assert!(matches!(reply, Reply::Cycled { summary: None, .. }));
    }

    #[test]
    fn packet_runs_through_wire_codec() {
        let host = sandbox();
        let merchant = trading_villager(&host);
        let mut console = console(OperatorRoster::default(), host);
        let requester = console.host.requester("alex");
        console.host.open(requester, merchant).unwrap();

        let payload = encode_cycle_trade(&CycleTradeRequest::legacy());
        let reply = console.handle(Command::Packet {
            player: "alex".to_owned(),
            channel: CYCLE_TRADE_CHANNEL.to_owned(),
            payload,
        });
        assert!(matches!(reply, Reply::Cycled { summary: Some(_), .. }));

        let reply = console.handle(Command::Packet {
            player: "alex".to_owned(),
            channel: CYCLE_TRADE_CHANNEL.to_owned(),
            payload: vec![1, 2, 3],
        });
        assert!(matches!(reply, Reply::Error { .. }));
    }

    #[test]
    fn config_requires_operator() {
        let mut host = sandbox();
        let op = host.requester("op");
        let roster = OperatorRoster::default();
        roster.grant(op, 4);
        let mut console = console(roster, host);

        let denied = console
            .handle_line(r#"{"command":"config","player":"guest","wandering_allowed":true}"#);
        assert!(matches!(
            denied,
            Reply::ConfigUpdated {
                status: UpdateStatus::Unauthorized,
                ..
            }
        ));

        let applied = console.handle_line(
            r#"{"command":"config","player":"op","wandering_allowed":true,"villager_cycle_limit":2}"#,
        );
        let Reply::ConfigUpdated { status, policy, .. } = applied else {
            panic!("expected config reply");
        };
        assert_eq!(status, UpdateStatus::Applied);
        assert!(policy.wandering_allowed);
        assert_eq!(policy.villager_cycle_limit, 2);
    }

    #[test]
    fn reload_from_missing_file_is_an_error() {
        let mut console = console(OperatorRoster::default(), sandbox());
        assert!(matches!(console.handle(Command::Reload), Reply::Error { .. }));
    }

    #[tokio::test]
    async fn reload_applies_file_edits_and_later_updates_keep_them() {
        let path = std::env::temp_dir().join(format!("tradecycle-{}.yaml", uuid::Uuid::new_v4()));
        let mut startup = ServerConfig::default();
        startup.permissions.operators = vec!["op".to_owned()];
        write_config(&path, &startup).await.unwrap();

        let mut host = sandbox();
        let roster = OperatorRoster::default();
        roster.grant(host.requester("op"), startup.permissions.operator_level);
        let (persistence, writer) = YamlPersistence::spawn(path.clone(), startup.clone());
        let mut console = console_with(roster, host, Arc::new(persistence), path.clone());

        let mut edited = startup;
        edited.permissions.operators.push("alice".to_owned());
        edited.permissions.notify_unauthorized = true;
        edited.logging.level = "debug".to_owned();
        edited.policy.villager_cycle_limit = 5;
        write_config(&path, &edited).await.unwrap();

        let Reply::Reloaded { policy } = console.handle(Command::Reload) else {
            panic!("expected reload reply");
        };
        assert_eq!(policy.villager_cycle_limit, 5);
        assert!(console.dispatcher.permissions().notify_unauthorized);

        let reply = console
            .handle_line(r#"{"command":"config","player":"alice","wandering_allowed":true}"#);
        assert!(matches!(
            reply,
            Reply::ConfigUpdated {
                status: UpdateStatus::Applied,
                ..
            }
        ));

        drop(console);
        writer.await.unwrap();
        let saved = ServerConfig::from_file(&path).unwrap();
        assert_eq!(saved.permissions.operators, ["op", "alice"]);
        assert!(saved.permissions.notify_unauthorized);
        assert_eq!(saved.logging.level, "debug");
        assert!(saved.policy.wandering_allowed);
        assert_eq!(saved.policy.villager_cycle_limit, 5);
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[test]
    fn close_returns_staged_items() {
        let host = sandbox();
        let merchant = trading_villager(&host);
        let mut console = console(OperatorRoster::default(), host);
        console.handle_line(&format!(
            r#"{{"command":"open","player":"kim","merchant":"{merchant}"}}"#
        ));
        console.handle_line(
            r#"{"command":"place","player":"kim","slot":1,"item":"minecraft:emerald","count":4}"#,
        );

        let Reply::Closed {
            returned_items,
            inventory,
            ..
        } = console.handle_line(r#"{"command":"close","player":"kim"}"#)
        else {
            panic!("expected close reply");
        };
        assert_eq!(returned_items.len(), 1);
        assert_eq!(inventory, vec![ItemStack::new("minecraft:emerald", 4)]);
    }

    #[test]
    fn bad_json_is_an_error() {
        let mut console = console(OperatorRoster::default(), sandbox());
        assert!(matches!(console.handle_line("{oops"), Reply::Error { .. }));
    }
}
