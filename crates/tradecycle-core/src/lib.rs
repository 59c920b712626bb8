//! Cycle request handling for the trade-cycle server.
//!
//! This crate decides whether a merchant's offers may be thrown away and
//! regenerated, performs the regeneration through the host, and keeps the
//! policy that governs those decisions.
//!
//! # Architecture
//!
//! - [`config`] -- YAML configuration (`ServerConfig`) and its validation.
//! - [`policy`] -- The [`PolicyStore`]: one atomically replaced snapshot.
//! - [`host`] -- Collaborator traits the host implements.
//! - [`eligibility`] -- Pure eligibility rules ([`evaluate`]).
//! - [`executor`] -- Offer regeneration ([`execute`]).
//! - [`dispatcher`] -- The [`CycleDispatcher`] state machine tying it all
//!   together, plus config update handling.

pub mod config;
pub mod dispatcher;
pub mod eligibility;
pub mod executor;
pub mod host;
pub mod policy;

// Re-export primary types at crate root.
pub use config::{ConfigError, LoggingConfig, PermissionsConfig, SandboxConfig, ServerConfig};
pub use dispatcher::{
    Collaborators, ConfigUpdateOutcome, CycleDispatcher, CycleOutcome, CyclePhase, DispatchReport,
};
pub use eligibility::{Eligibility, Rejection, evaluate};
pub use executor::{ExecutionError, execute};
pub use host::{
    ActiveSession, HostError, MerchantWorld, OutcomeSink, PermissionOracle, PolicyPersistence,
    SessionResolver, TradeHost,
};
pub use policy::{InvalidLimit, PolicyError, PolicyStore};
