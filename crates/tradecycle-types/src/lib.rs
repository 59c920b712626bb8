//! Shared type definitions for the trade-cycle server.
//!
//! This crate is the single source of truth for the types exchanged between
//! the server core and the client settings UI. Types flow downstream to
//! `TypeScript` via `ts-rs` for UI tooling.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for merchants, requesters, sessions
//! - [`enums`] -- Professions, roles, notification severity, rejection reasons
//! - [`structs`] -- Merchants, offers, the policy snapshot, outbound events
//! - [`packets`] -- Inbound request payloads (current and legacy shapes)
//! - [`wire`] -- Binary codec for the inbound packets

pub mod enums;
pub mod ids;
pub mod packets;
pub mod structs;
pub mod wire;

// Re-export all public types at crate root for convenience.
pub use enums::{Profession, RejectionReason, Severity, TradeRole};
pub use ids::{EntityId, RequesterId, SessionId};
pub use packets::{ConfigUpdateRequest, CycleTradeRequest};
pub use structs::{
    EntityRole, ItemStack, Notification, NotificationPreferences, Policy, ReturnedItem,
    StateRefresh, TradeEntity, TradeOffer, UNLIMITED, VillagerProfile,
};
pub use wire::WireError;
