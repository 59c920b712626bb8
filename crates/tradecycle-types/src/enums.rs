//! Enumeration types shared between the server core and the client UI.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Professions
// ---------------------------------------------------------------------------

/// The profession a villager-like merchant currently holds.
///
/// Only two values matter to the cycle rules: [`Profession::None`] (an
/// unemployed villager has no trades) and [`Profession::Nitwit`] (can never
/// trade). Every other profession is cyclable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    /// No workstation claimed. This is also the neutral value used to force
    /// offer regeneration.
    None,
    /// Can never hold a job or offer trades.
    Nitwit,
    /// Blast furnace.
    Armorer,
    /// Smoker.
    Butcher,
    /// Cartography table.
    Cartographer,
    /// Brewing stand.
    Cleric,
    /// Composter.
    Farmer,
    /// Barrel.
    Fisherman,
    /// Fletching table.
    Fletcher,
    /// Cauldron.
    Leatherworker,
    /// Lectern.
    Librarian,
    /// Stonecutter.
    Mason,
    /// Loom.
    Shepherd,
    /// Smithing table.
    Toolsmith,
    /// Grindstone.
    Weaponsmith,
}

impl Profession {
    /// Every profession that can hold trades, in declaration order.
    pub const TRADING: [Self; 13] = [
        Self::Armorer,
        Self::Butcher,
        Self::Cartographer,
        Self::Cleric,
        Self::Farmer,
        Self::Fisherman,
        Self::Fletcher,
        Self::Leatherworker,
        Self::Librarian,
        Self::Mason,
        Self::Shepherd,
        Self::Toolsmith,
        Self::Weaponsmith,
    ];

    /// Whether a villager with this profession can ever offer trades.
    pub const fn can_trade(self) -> bool {
        !matches!(self, Self::None | Self::Nitwit)
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Payload-free classification of a merchant, used for logging, ledger
/// snapshots, and notification wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum TradeRole {
    /// A villager with a profession, level, and experience.
    Villager,
    /// A wandering trader with a one-shot offer list.
    Wandering,
    /// Any other merchant kind the host exposes.
    Other,
}

impl core::fmt::Display for TradeRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Villager => "villager",
            Self::Wandering => "wandering_trader",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Severity of a chat-style notification pushed to the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Rendered green: the cycle happened.
    Success,
    /// Rendered red: the request was refused or failed.
    Error,
}

// ---------------------------------------------------------------------------
// Rejection reasons
// ---------------------------------------------------------------------------

/// Machine-readable reason a cycle request was refused.
///
/// The human-readable text travels alongside in the rejection outcome so the
/// limit value can be interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// At least one offer was used, or the villager has experience.
    AlreadyTradedWith,
    /// Wandering trader cycling is turned off by the server.
    WanderingDisabled,
    /// The wandering trader has been cycled as often as allowed.
    WanderingLimitReached,
    /// The villager has no profession.
    NoProfession,
    /// Nitwits never trade.
    Nitwit,
    /// Villager cycling is turned off (limit 0).
    VillagerCyclingDisabled,
    /// The villager has been cycled as often as allowed.
    VillagerLimitReached,
    /// The merchant kind does not support cycling.
    NotCyclable,
    /// The host failed to regenerate the offers.
    ExecutionFailed,
}
