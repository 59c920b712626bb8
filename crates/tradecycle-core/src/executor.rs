//! Cycle executor: throw away a merchant's offers and have the host fill in
//! a fresh set.
//!
//! Villagers are reset to a clean novice before regeneration: the level
//! drops to 1 and the offer list is emptied, while the profession is kept.
//! Toggling the profession through the neutral value, where the game needs
//! it, belongs to the host's [`MerchantWorld::regenerate_offers`].
//! Wandering traders only lose their offers. If the host fails, the
//! merchant is restored to its state before the attempt.

use tracing::warn;

use tradecycle_types::{EntityId, EntityRole, TradeEntity};

use crate::host::{HostError, MerchantWorld};

/// Errors from [`execute`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// The merchant is not loaded.
    #[error("merchant {entity} is not loaded")]
    EntityGone {
        /// The missing merchant.
        entity: EntityId,
    },

    /// The merchant's role has no regeneration routine.
    #[error("merchant {entity} cannot be regenerated")]
    Unsupported {
        /// The merchant.
        entity: EntityId,
    },

    /// The host's offer generator failed.
    #[error("host failure: {source}")]
    Host {
        /// The underlying host error.
        #[from]
        source: HostError,
    },
}

/// Regenerate the offers of merchant `id` and return it as it stands
/// afterwards. Not retried on failure.
pub fn execute<W>(world: &mut W, id: EntityId) -> Result<TradeEntity, ExecutionError>
where
    W: MerchantWorld + ?Sized,
{
    let entity = world
        .merchant_mut(id)
        .ok_or(ExecutionError::EntityGone { entity: id })?;
    let previous = entity.clone();

    match &mut entity.role {
        EntityRole::Villager(profile) => profile.level = 1,
        EntityRole::Wandering => {}
        EntityRole::Other { .. } => return Err(ExecutionError::Unsupported { entity: id }),
    }
    entity.offers.clear();

    if let Err(err) = world.regenerate_offers(id) {
        warn!(entity = %id, error = %err, "Offer regeneration failed, restoring merchant");
        if let Some(entity) = world.merchant_mut(id) {
            *entity = previous;
        }
        return Err(err.into());
    }

    world
        .merchant(id)
        .cloned()
        .ok_or(ExecutionError::EntityGone { entity: id })
}
