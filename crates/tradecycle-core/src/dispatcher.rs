//! Request dispatcher and session guard.
//!
//! A cycle request walks a fixed path:
//!
//! ```text
//! Received -> SessionResolved -> SlotsCleared -> Evaluated -> Executed | Rejected -> NotifiedDone
//! ```
//!
//! A request without an open session (or whose merchant is gone) is
//! dropped silently after `Received`. Pending slots are always cleared
//! before anything else touches the merchant, so a staged trade can never
//! be completed against offers that no longer exist. The ledger is only
//! written after the host has regenerated the offers, and notifications go
//! out last.
//!
//! Config updates are authorized against the host's permission oracle,
//! applied to the policy store in one step, then persisted.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use tradecycle_ledger::CycleLedger;
use tradecycle_types::{
    ConfigUpdateRequest, CycleTradeRequest, EntityId, Notification, Policy, RejectionReason,
    RequesterId, ReturnedItem, SessionId, StateRefresh, TradeRole,
};

use crate::config::PermissionsConfig;
use crate::eligibility::{Eligibility, Rejection, evaluate};
use crate::executor::execute;
use crate::host::{ActiveSession, OutcomeSink, PermissionOracle, PolicyPersistence, TradeHost};
use crate::policy::{PolicyError, PolicyStore};

/// Message shown when the host fails to regenerate offers.
pub const EXECUTION_FAILED_MESSAGE: &str = "Unable to cycle trades at this time.";

/// Message shown to unauthorized requesters when
/// [`PermissionsConfig::notify_unauthorized`] is set.
pub const UNAUTHORIZED_MESSAGE: &str = "You do not have permission to change server settings.";

/// Steps of the cycle request state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// The request arrived.
    Received,
    /// The requester's session and merchant were found.
    SessionResolved,
    /// Pending input slots were returned and the output discarded.
    SlotsCleared,
    /// Eligibility was decided.
    Evaluated,
    /// The host was asked to regenerate offers.
    Executed,
    /// The merchant was ruled ineligible.
    Rejected,
    /// Outbound events were sent.
    NotifiedDone,
}

/// Final result of a cycle request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Offers were regenerated.
    Accepted {
        /// The refresh pushed to the requester.
        refresh: StateRefresh,
    },
    /// Nothing changed.
    Rejected {
        /// Machine-readable reason.
        reason: RejectionReason,
        /// Text shown to the requester (without the error prefix).
        message: String,
    },
}

impl CycleOutcome {
    /// Whether the cycle went through.
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// The rejection reason, if rejected.
    pub const fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            Self::Accepted { .. } => None,
            Self::Rejected { reason, .. } => Some(*reason),
        }
    }
}

/// Everything that happened while handling one cycle request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// The session the request ran in.
    pub session_id: SessionId,
    /// The merchant the session was bound to.
    pub merchant: EntityId,
    /// The merchant's role.
    pub role: TradeRole,
    /// Items handed back to the requester during the slot clear.
    pub returned_items: Vec<ReturnedItem>,
    /// The result.
    pub outcome: CycleOutcome,
    /// Ledger count for the merchant after the request.
    pub cycle_count: u32,
    /// Phases visited, in order.
    pub phases: Vec<CyclePhase>,
}

/// Result of a config update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigUpdateOutcome {
    /// The new policy was stored and handed to persistence.
    Applied(Policy),
    /// The requester lacks the operator permission level.
    Unauthorized,
    /// The update carried an out-of-range limit and was dropped.
    Invalid,
}

/// Outbound collaborators shared by every request.
#[derive(Clone)]
pub struct Collaborators {
    /// Permission lookups for config updates.
    pub permissions: Arc<dyn PermissionOracle>,
    /// Storage for accepted policy updates.
    pub persistence: Arc<dyn PolicyPersistence>,
    /// Messages and refreshes to the requester's client.
    pub sink: Arc<dyn OutcomeSink>,
}

/// Owns the policy store and the ledger, and runs requests against them.
pub struct CycleDispatcher {
    policy: Arc<PolicyStore>,
    ledger: Arc<CycleLedger>,
    permissions: PermissionsConfig,
    collaborators: Collaborators,
}

impl CycleDispatcher {
    /// Create a dispatcher.
    pub const fn new(
        policy: Arc<PolicyStore>,
        ledger: Arc<CycleLedger>,
        permissions: PermissionsConfig,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            policy,
            ledger,
            permissions,
            collaborators,
        }
    }

    /// The policy store.
    pub fn policy(&self) -> &PolicyStore {
        &self.policy
    }

    /// The cycle ledger.
    pub fn ledger(&self) -> &CycleLedger {
        &self.ledger
    }

    /// Permission settings used for config updates.
    pub const fn permissions(&self) -> &PermissionsConfig {
        &self.permissions
    }

    /// Swap in reloaded permission settings. Takes effect on the next
    /// config update.
    pub fn set_permissions(&mut self, permissions: PermissionsConfig) {
        info!(
            operator_level = permissions.operator_level,
            notify_unauthorized = permissions.notify_unauthorized,
            "Permission settings replaced"
        );
        self.permissions = permissions;
    }

    /// Handle a cycle request.
    ///
    /// Returns `None` when the request was dropped because the requester has
    /// no open trading session.
    pub fn handle_cycle<H>(
        &self,
        host: &mut H,
        requester: RequesterId,
        request: &CycleTradeRequest,
    ) -> Option<DispatchReport>
    where
        H: TradeHost + ?Sized,
    {
        let mut phases = vec![CyclePhase::Received];
        info!(requester = %requester, legacy = request.is_legacy(), "Cycle request received");

        let Some(session) = host.resolve(requester) else {
            info!(requester = %requester, "No open trading session, request dropped");
            return None;
        };
        if host.merchant(session.merchant).is_none() {
            info!(
                requester = %requester,
                entity = %session.merchant,
                "Session merchant is gone, request dropped"
            );
            return None;
        }
        phases.push(CyclePhase::SessionResolved);

        let returned_items = host.clear_pending_slots(session.session_id);
        for item in &returned_items {
            debug!(
                requester = %requester,
                slot = item.slot,
                item = %item.stack.item,
                count = item.stack.count,
                "Returned pending slot item"
            );
        }
        phases.push(CyclePhase::SlotsCleared);

        let policy = self.policy.get();
        let (role, eligibility) = match host.merchant(session.merchant) {
            Some(entity) => (entity.trade_role(), evaluate(entity, &policy, &self.ledger)),
            None => (
                TradeRole::Other,
                Eligibility::Ineligible(Rejection {
                    reason: RejectionReason::NotCyclable,
                    message: "This merchant cannot be cycled.".to_owned(),
                }),
            ),
        };
        phases.push(CyclePhase::Evaluated);

        let outcome = match eligibility {
            Eligibility::Ineligible(rejection) => {
                phases.push(CyclePhase::Rejected);
                info!(
                    requester = %requester,
                    entity = %session.merchant,
                    %role,
                    reason = ?rejection.reason,
                    "Cycle rejected"
                );
                self.collaborators
                    .sink
                    .notify(requester, Notification::error(&rejection.message));
                CycleOutcome::Rejected {
                    reason: rejection.reason,
                    message: rejection.message,
                }
            }
            Eligibility::Eligible => {
                phases.push(CyclePhase::Executed);
                self.run_cycle(host, requester, session, role, request, &policy)
            }
        };
        phases.push(CyclePhase::NotifiedDone);

        Some(DispatchReport {
            session_id: session.session_id,
            merchant: session.merchant,
            role,
            returned_items,
            outcome,
            cycle_count: self.ledger.count_for(session.merchant),
            phases,
        })
    }

    fn run_cycle<H>(
        &self,
        host: &mut H,
        requester: RequesterId,
        session: ActiveSession,
        role: TradeRole,
        request: &CycleTradeRequest,
        policy: &Policy,
    ) -> CycleOutcome
    where
        H: TradeHost + ?Sized,
    {
        let merchant = session.merchant;
        let cycled = match execute(host, merchant) {
            Ok(cycled) => cycled,
            Err(err) => {
                warn!(
                    requester = %requester,
                    entity = %merchant,
                    error = %err,
                    "Cycle execution failed"
                );
                self.collaborators
                    .sink
                    .notify(requester, Notification::error(EXECUTION_FAILED_MESSAGE));
                return CycleOutcome::Rejected {
                    reason: RejectionReason::ExecutionFailed,
                    message: EXECUTION_FAILED_MESSAGE.to_owned(),
                };
            }
        };

        match self.ledger.increment(merchant, role) {
            Ok(count) => {
                info!(requester = %requester, entity = %merchant, %role, count, "Trades cycled");
            }
            Err(err) => {
                error!(requester = %requester, entity = %merchant, error = %err, "Cycle not counted");
            }
        }

        let refresh = StateRefresh::for_entity(session.session_id, &cycled);
        let preferences = request.resolve(policy.notifications);
        if preferences.for_role(role) {
            for line in success_lines(role) {
                self.collaborators
                    .sink
                    .notify(requester, Notification::success(*line));
            }
        }
        self.collaborators.sink.refresh(requester, refresh.clone());
        CycleOutcome::Accepted { refresh }
    }

    /// Handle a config update request.
    pub fn handle_config_update(
        &self,
        requester: RequesterId,
        update: &ConfigUpdateRequest,
    ) -> ConfigUpdateOutcome {
        let authorized = self
            .collaborators
            .permissions
            .is_authorized(requester, self.permissions.operator_level);

        match self.policy.update(authorized, |current| update.apply_to(current)) {
            Ok(policy) => {
                info!(
                    requester = %requester,
                    wandering_allowed = policy.wandering_allowed,
                    wandering_cycle_limit = policy.wandering_cycle_limit,
                    villager_cycle_limit = policy.villager_cycle_limit,
                    "Policy updated"
                );
                self.collaborators.persistence.persist(&policy);
                ConfigUpdateOutcome::Applied(policy)
            }
            Err(PolicyError::Unauthorized) => {
                warn!(requester = %requester, "Unauthorized policy update attempt");
                if self.permissions.notify_unauthorized {
                    self.collaborators
                        .sink
                        .notify(requester, Notification::error(UNAUTHORIZED_MESSAGE));
                }
                ConfigUpdateOutcome::Unauthorized
            }
            Err(err @ PolicyError::InvalidLimit { .. }) => {
                warn!(requester = %requester, error = %err, "Malformed policy update dropped");
                ConfigUpdateOutcome::Invalid
            }
        }
    }
}

/// Success lines for an accepted cycle.
const fn success_lines(role: TradeRole) -> &'static [&'static str] {
    match role {
        TradeRole::Villager => &[
            "\u{2705} Villager trades have been cycled!",
            "\u{1f504} The villager now has new Level 1 trades.",
        ],
        TradeRole::Wandering => &[
            "\u{2705} Wandering trader offers have been refreshed!",
            "\u{1f504} The trader now has new offers.",
        ],
        TradeRole::Other => &[],
    }
}
