//! Collaborator traits: everything the core needs from the host.
//!
//! The core never touches game state directly. Sessions, merchants,
//! permissions, persistence and client messaging all sit behind these
//! traits so the dispatcher can run against the real host or a recording
//! fake.
//!
//! Host-side collaborators ([`SessionResolver`], [`MerchantWorld`]) are
//! `&mut self` because the host mutates them on its tick. Outbound
//! collaborators ([`PermissionOracle`], [`PolicyPersistence`],
//! [`OutcomeSink`]) are `&self + Send + Sync` so one instance can be shared
//! between dispatchers.

use tradecycle_types::{
    EntityId, Notification, Policy, RequesterId, ReturnedItem, SessionId, StateRefresh,
    TradeEntity,
};

/// Errors reported by the host while regenerating offers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The merchant disappeared between lookup and regeneration.
    #[error("merchant {entity} is no longer loaded")]
    EntityGone {
        /// The missing merchant.
        entity: EntityId,
    },

    /// The host could not produce a new offer list.
    #[error("offer regeneration failed: {reason}")]
    RegenerationFailed {
        /// Host-specific detail.
        reason: String,
    },
}

/// A requester's open trading screen, as resolved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSession {
    /// The session handle.
    pub session_id: SessionId,
    /// The merchant the screen is bound to.
    pub merchant: EntityId,
}

/// Looks up and tidies trading sessions.
pub trait SessionResolver {
    /// The requester's open trading session, if any.
    fn resolve(&mut self, requester: RequesterId) -> Option<ActiveSession>;

    /// Empty the session's pending slots: both inputs go back to the
    /// requester, the output preview is discarded. Returns what was given
    /// back.
    fn clear_pending_slots(&mut self, session: SessionId) -> Vec<ReturnedItem>;
}

/// Access to merchants and the host's offer generator.
pub trait MerchantWorld {
    /// Read a merchant.
    fn merchant(&self, id: EntityId) -> Option<&TradeEntity>;

    /// Mutable access to a merchant.
    fn merchant_mut(&mut self, id: EntityId) -> Option<&mut TradeEntity>;

    /// Fill the merchant's (already cleared) offer list with a fresh set.
    ///
    /// For villagers this is the profession reset: the host drops the
    /// profession to [`Profession::None`](tradecycle_types::Profession::None)
    /// and restores it if its offer generator keys off a profession change.
    /// The profession the merchant ends up with must be the one it had.
    ///
    /// # Errors
    ///
    /// Returns a [`HostError`] if the host cannot generate offers.
    fn regenerate_offers(&mut self, id: EntityId) -> Result<(), HostError>;
}

/// A host that provides both sessions and merchants.
pub trait TradeHost: SessionResolver + MerchantWorld {}

impl<T: SessionResolver + MerchantWorld + ?Sized> TradeHost for T {}

/// Permission lookups.
pub trait PermissionOracle: Send + Sync {
    /// Whether `requester` holds at least permission `level`.
    fn is_authorized(&self, requester: RequesterId, level: u8) -> bool;
}

/// Durable storage for accepted policy updates. Fire-and-forget: failures
/// are the implementation's to log.
pub trait PolicyPersistence: Send + Sync {
    /// Store `policy`.
    fn persist(&self, policy: &Policy);
}

/// Outbound channel to the requester's client. Fire-and-forget.
pub trait OutcomeSink: Send + Sync {
    /// Show a message to the requester.
    fn notify(&self, requester: RequesterId, notification: Notification);

    /// Push a fresh offer list to the requester's open screen.
    fn refresh(&self, requester: RequesterId, refresh: StateRefresh);
}
