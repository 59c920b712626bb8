//! Core entity and policy structs.
//!
//! A [`TradeEntity`] is the server's view of a merchant: a stable id, a
//! role-tagged payload ([`EntityRole`]), and the ordered offer list. The
//! [`Policy`] snapshot is the configuration shared with the client settings
//! UI; [`Notification`] and [`StateRefresh`] are what flows back to it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Profession, Severity, TradeRole};
use crate::ids::{EntityId, SessionId};

// ---------------------------------------------------------------------------
// Items and offers
// ---------------------------------------------------------------------------

/// A stack of items as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ItemStack {
    /// Namespaced item identifier (e.g. `minecraft:emerald`).
    pub item: String,
    /// Number of items in the stack.
    pub count: u32,
}

impl ItemStack {
    /// Build a stack of `count` items.
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }
}

/// One deal in a merchant's offer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TradeOffer {
    /// First item the merchant wants.
    pub buy: ItemStack,
    /// Optional second item the merchant wants.
    #[serde(default)]
    pub buy_second: Option<ItemStack>,
    /// Item the merchant gives.
    pub sell: ItemStack,
    /// Times this offer has been traded.
    #[serde(default)]
    pub uses: u32,
    /// Times this offer can be traded before it locks.
    pub max_uses: u32,
}

impl TradeOffer {
    /// Whether anyone has traded this offer at least once.
    pub const fn is_used(&self) -> bool {
        self.uses > 0
    }
}

// ---------------------------------------------------------------------------
// Merchants
// ---------------------------------------------------------------------------

/// Villager-only state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VillagerProfile {
    /// Current profession.
    pub profession: Profession,
    /// Merchant experience. Anything above zero means someone traded.
    pub experience: u32,
    /// Merchant level, 1 (novice) to 5 (master).
    pub level: u32,
}

/// Role-specific payload of a merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum EntityRole {
    /// A villager. Offers regenerate from the profession's trade table.
    Villager(VillagerProfile),
    /// A wandering trader. Offers are filled once from a random pool.
    Wandering,
    /// A merchant kind with no cycle support.
    Other {
        /// Host-specific kind name, for logs.
        kind: String,
    },
}

/// A tradeable entity as seen by the cycle core.
///
/// The host spawns and despawns these; the core only rewrites `offers` and,
/// for villagers, the level and (transiently) the profession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TradeEntity {
    /// Stable identity, the cycle ledger key.
    pub id: EntityId,
    /// Role tag and role-specific fields.
    pub role: EntityRole,
    /// Current offers, in display order.
    pub offers: Vec<TradeOffer>,
}

impl TradeEntity {
    /// Payload-free role of this entity.
    pub const fn trade_role(&self) -> TradeRole {
        match self.role {
            EntityRole::Villager(_) => TradeRole::Villager,
            EntityRole::Wandering => TradeRole::Wandering,
            EntityRole::Other { .. } => TradeRole::Other,
        }
    }

    /// Whether any current offer has been traded.
    pub fn has_used_offer(&self) -> bool {
        self.offers.iter().any(TradeOffer::is_used)
    }
}

/// An item moved out of a trade input slot back to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReturnedItem {
    /// Input slot index the item came from (0 or 1).
    pub slot: u8,
    /// The stack handed back.
    pub stack: ItemStack,
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Which roles get a success notification after a cycle.
///
/// Presentation only: these never influence whether a cycle is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NotificationPreferences {
    /// Announce villager cycles.
    #[serde(default = "default_true")]
    pub villager_success: bool,
    /// Announce wandering trader cycles.
    #[serde(default = "default_true")]
    pub wandering_success: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            villager_success: true,
            wandering_success: true,
        }
    }
}

impl NotificationPreferences {
    /// Preference for the given role. Other merchants never cycle, so they
    /// never announce.
    pub const fn for_role(self, role: TradeRole) -> bool {
        match role {
            TradeRole::Villager => self.villager_success,
            TradeRole::Wandering => self.wandering_success,
            TradeRole::Other => false,
        }
    }
}

/// Authoritative cycle policy.
///
/// Limits use a signed encoding: `-1` (any negative) is unlimited, `0`
/// disables cycling, `n > 0` allows `n` cycles per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Policy {
    /// Whether wandering traders may be cycled at all.
    #[serde(default)]
    pub wandering_allowed: bool,
    /// Cycle quota per wandering trader.
    #[serde(default = "default_unlimited")]
    pub wandering_cycle_limit: i32,
    /// Cycle quota per villager.
    #[serde(default = "default_unlimited")]
    pub villager_cycle_limit: i32,
    /// Server-side notification defaults, used for legacy requests that
    /// carry no preferences.
    #[serde(default)]
    pub notifications: NotificationPreferences,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            wandering_allowed: false,
            wandering_cycle_limit: UNLIMITED,
            villager_cycle_limit: UNLIMITED,
            notifications: NotificationPreferences::default(),
        }
    }
}

/// Limit value meaning "no quota".
pub const UNLIMITED: i32 = -1;

const fn default_unlimited() -> i32 {
    UNLIMITED
}

const fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

/// A chat-style message for the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Notification {
    /// Success or error styling.
    pub severity: Severity,
    /// Rendered text.
    pub message: String,
}

impl Notification {
    /// A green message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    /// A red message, prefixed with the cross mark the client expects.
    pub fn error(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            severity: Severity::Error,
            message: format!("\u{274c} {reason}"),
        }
    }
}

/// Fresh offer list pushed to the client so the open screen updates in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StateRefresh {
    /// Session whose screen should redraw.
    pub session_id: SessionId,
    /// The regenerated offers.
    pub offers: Vec<TradeOffer>,
    /// Merchant level shown in the screen title.
    pub level: u32,
    /// Experience bar value.
    pub experience: u32,
    /// Whether the screen shows the level/experience bar.
    pub is_leveled: bool,
    /// Whether the merchant restocks.
    pub can_refresh: bool,
}

impl StateRefresh {
    /// Project an entity into a refresh event.
    ///
    /// Villagers report their own level and experience and always show the
    /// progress bar. Wandering traders (and anything else) report a fixed
    /// level 1 with no bar and no restocking.
    pub fn for_entity(session_id: SessionId, entity: &TradeEntity) -> Self {
        match entity.role {
            EntityRole::Villager(profile) => Self {
                session_id,
                offers: entity.offers.clone(),
                level: profile.level,
                experience: profile.experience,
                is_leveled: true,
                can_refresh: true,
            },
            EntityRole::Wandering | EntityRole::Other { .. } => Self {
                session_id,
                offers: entity.offers.clone(),
                level: 1,
                experience: 0,
                is_leveled: false,
                can_refresh: false,
            },
        }
    }
}
