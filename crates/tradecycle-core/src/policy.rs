//! The policy store: the single authoritative copy of the cycle policy.
//!
//! Readers always get a whole [`Policy`] value copied out under a read
//! lock, so an evaluation can never observe half of a concurrent update.
//! Writers swap the whole snapshot under the write lock.

use parking_lot::RwLock;
use tracing::info;

use tradecycle_types::Policy;

/// Smallest accepted limit value. Anything below is a typo, not "more
/// unlimited".
pub const MIN_LIMIT: i32 = -1;

/// A limit field holds a value below [`MIN_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {value} (expected -1 for unlimited, 0 to disable, or a positive quota)")]
pub struct InvalidLimit {
    /// Name of the offending field.
    pub field: &'static str,
    /// The rejected value.
    pub value: i32,
}

/// Errors from policy writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// The caller did not pass the permission check.
    #[error("policy update refused: requester is not authorized")]
    Unauthorized,

    /// A limit field holds a value below [`MIN_LIMIT`].
    #[error("invalid {field}: {value} (expected -1 for unlimited, 0 to disable, or a positive quota)")]
    InvalidLimit {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: i32,
    },
}

impl From<InvalidLimit> for PolicyError {
    fn from(InvalidLimit { field, value }: InvalidLimit) -> Self {
        Self::InvalidLimit { field, value }
    }
}

/// Check that both limits use the documented encoding.
///
/// # Errors
///
/// Returns [`InvalidLimit`] naming the first field below [`MIN_LIMIT`].
pub const fn validate(policy: &Policy) -> Result<(), InvalidLimit> {
    if policy.wandering_cycle_limit < MIN_LIMIT {
        return Err(InvalidLimit {
            field: "wandering_cycle_limit",
            value: policy.wandering_cycle_limit,
        });
    }
    if policy.villager_cycle_limit < MIN_LIMIT {
        return Err(InvalidLimit {
            field: "villager_cycle_limit",
            value: policy.villager_cycle_limit,
        });
    }
    Ok(())
}

/// Shared, atomically replaceable policy snapshot.
#[derive(Debug)]
pub struct PolicyStore {
    current: RwLock<Policy>,
}

impl PolicyStore {
    /// Create a store holding `initial`.
    pub const fn new(initial: Policy) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Copy of the current snapshot.
    pub fn get(&self) -> Policy {
        *self.current.read()
    }

    /// Replace the whole snapshot.
    ///
    /// `requester_authorized` must come from the host's permission check;
    /// the store does not look up permissions itself.
    pub fn replace(&self, next: Policy, requester_authorized: bool) -> Result<(), PolicyError> {
        if !requester_authorized {
            return Err(PolicyError::Unauthorized);
        }
        validate(&next)?;
        *self.current.write() = next;
        Ok(())
    }

    /// Derive the next snapshot from the current one and swap it in, all
    /// under one write lock. Returns the stored snapshot.
    pub fn update<F>(&self, requester_authorized: bool, derive: F) -> Result<Policy, PolicyError>
    where
        F: FnOnce(&Policy) -> Policy,
    {
        if !requester_authorized {
            return Err(PolicyError::Unauthorized);
        }
        let mut current = self.current.write();
        let next = derive(&current);
        validate(&next)?;
        *current = next;
        Ok(next)
    }

    /// Replace the snapshot with one read from the server's own config
    /// source. Server-local, so no permission check.
    pub fn reload(&self, next: Policy) -> Result<(), PolicyError> {
        validate(&next)?;
        *self.current.write() = next;
        info!(
            wandering_allowed = next.wandering_allowed,
            wandering_cycle_limit = next.wandering_cycle_limit,
            villager_cycle_limit = next.villager_cycle_limit,
            "Policy reloaded"
        );
        Ok(())
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}
