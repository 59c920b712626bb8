//! The cycle ledger: how many times each merchant has been cycled.
//!
//! # Design
//!
//! - **Lazy**: an entry appears on the first successful cycle.
//! - **Never deleted**: entries for despawned merchants stay behind. They
//!   are a few bytes each and a returning id must keep its count.
//! - **Shared**: reads take a read lock, increments take the write lock for
//!   one read-modify-write, so concurrent ticks cannot lose an increment.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tradecycle_types::{EntityId, TradeRole};

use crate::LedgerError;

/// One ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// Role of the merchant when it was last cycled.
    pub role: TradeRole,
    /// Accepted cycles so far.
    pub count: u32,
    /// Wall-clock time of the most recent accepted cycle.
    pub last_cycled_at: DateTime<Utc>,
}

/// Per-merchant cycle counters.
#[derive(Debug, Default)]
pub struct CycleLedger {
    records: RwLock<BTreeMap<EntityId, CycleRecord>>,
}

impl CycleLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from previously exported records.
    pub fn from_records(records: impl IntoIterator<Item = (EntityId, CycleRecord)>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
        }
    }

    /// Accepted cycles for `id`, `0` if it was never cycled.
    pub fn count_for(&self, id: EntityId) -> u32 {
        self.records.read().get(&id).map_or(0, |r| r.count)
    }

    /// Full record for `id`, if any.
    pub fn record(&self, id: EntityId) -> Option<CycleRecord> {
        self.records.read().get(&id).copied()
    }

    /// Count one more accepted cycle for `id` and return the new count.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CounterOverflow`] if the count is already at
    /// `u32::MAX`. The entry is left untouched in that case.
    pub fn increment(&self, id: EntityId, role: TradeRole) -> Result<u32, LedgerError> {
        let now = Utc::now();
        let mut records = self.records.write();
        let next = match records.get(&id) {
            Some(record) => record
                .count
                .checked_add(1)
                .ok_or(LedgerError::CounterOverflow { entity: id })?,
            None => 1,
        };
        records.insert(
            id,
            CycleRecord {
                role,
                count: next,
                last_cycled_at: now,
            },
        );
        drop(records);
        debug!(entity = %id, %role, count = next, "Cycle recorded");
        Ok(next)
    }

    /// Number of merchants with at least one recorded cycle.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no merchant has been cycled yet.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Copy of every entry, ordered by entity id.
    pub fn snapshot(&self) -> Vec<(EntityId, CycleRecord)> {
        self.records
            .read()
            .iter()
            .map(|(id, record)| (*id, *record))
            .collect()
    }
}
