//! Cycle ledger for the trade-cycle server.
//!
//! Every accepted cycle is counted here against the merchant's stable id.
//! The counts feed the per-role quotas; nothing else reads or writes them.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`CycleLedger`]: shared per-entity counters.
//! - [`verdict`] -- Limit interpretation ([`limit_verdict`]) and the two
//!   role-specific quota checks.
//!
//! # Usage
//!
//! ```
//! use tradecycle_ledger::{CycleLedger, LimitVerdict, limit_verdict};
//! use tradecycle_types::{EntityId, TradeRole};
//!
//! let ledger = CycleLedger::new();
//! let villager = EntityId::new();
//!
//! assert_eq!(limit_verdict(ledger.count_for(villager), 1), LimitVerdict::Allowed);
//! ledger.increment(villager, TradeRole::Villager).ok();
//! assert_eq!(limit_verdict(ledger.count_for(villager), 1), LimitVerdict::Denied);
//! ```

pub mod ledger;
pub mod verdict;

// Re-export primary types at crate root.
pub use ledger::{CycleLedger, CycleRecord};
pub use verdict::{LimitVerdict, VillagerQuota, limit_verdict, villager_quota, wandering_quota};

use tradecycle_types::EntityId;

/// Errors that can occur when recording a cycle.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The entity's counter is already at its maximum.
    #[error("cycle counter overflow for entity {entity}")]
    CounterOverflow {
        /// The entity whose counter is saturated.
        entity: EntityId,
    },
}
