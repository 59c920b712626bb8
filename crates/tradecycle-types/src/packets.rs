//! Inbound request payloads sent by the client.
//!
//! Both payloads exist in a current and a legacy shape. Older clients send a
//! cycle request with no body and a config update with only the wandering
//! toggle; those shapes decode into the same structs with the missing fields
//! set to `None`, and the server fills them from its stored policy.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::{NotificationPreferences, Policy};

/// "Cycle the merchant I am trading with."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CycleTradeRequest {
    /// Announce a successful villager cycle. `None` on legacy requests.
    #[serde(default)]
    pub show_villager_success: Option<bool>,
    /// Announce a successful wandering trader cycle. `None` on legacy
    /// requests.
    #[serde(default)]
    pub show_wandering_success: Option<bool>,
}

impl CycleTradeRequest {
    /// A request carrying explicit preferences.
    pub const fn with_preferences(prefs: NotificationPreferences) -> Self {
        Self {
            show_villager_success: Some(prefs.villager_success),
            show_wandering_success: Some(prefs.wandering_success),
        }
    }

    /// The body-less request older clients send.
    pub const fn legacy() -> Self {
        Self {
            show_villager_success: None,
            show_wandering_success: None,
        }
    }

    /// Whether this request came from a client that sends no preferences.
    pub const fn is_legacy(&self) -> bool {
        self.show_villager_success.is_none() && self.show_wandering_success.is_none()
    }

    /// Effective preferences, falling back to the server's configured ones
    /// for any flag the client left out.
    pub fn resolve(&self, configured: NotificationPreferences) -> NotificationPreferences {
        NotificationPreferences {
            villager_success: self
                .show_villager_success
                .unwrap_or(configured.villager_success),
            wandering_success: self
                .show_wandering_success
                .unwrap_or(configured.wandering_success),
        }
    }
}

/// "Replace the server's cycle policy with these values."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConfigUpdateRequest {
    /// New wandering trader toggle.
    pub wandering_allowed: bool,
    /// New wandering trader quota. `None` keeps the stored value.
    #[serde(default)]
    pub wandering_cycle_limit: Option<i32>,
    /// New villager quota. `None` keeps the stored value.
    #[serde(default)]
    pub villager_cycle_limit: Option<i32>,
}

impl ConfigUpdateRequest {
    /// A full update copying the cycle fields of `policy`.
    pub const fn from_policy(policy: &Policy) -> Self {
        Self {
            wandering_allowed: policy.wandering_allowed,
            wandering_cycle_limit: Some(policy.wandering_cycle_limit),
            villager_cycle_limit: Some(policy.villager_cycle_limit),
        }
    }

    /// The single-field update older clients send.
    pub const fn legacy(wandering_allowed: bool) -> Self {
        Self {
            wandering_allowed,
            wandering_cycle_limit: None,
            villager_cycle_limit: None,
        }
    }

    /// Produce the policy that results from applying this update on top of
    /// `current`. Notification defaults are server-local and never change
    /// through this request.
    pub fn apply_to(&self, current: &Policy) -> Policy {
        Policy {
            wandering_allowed: self.wandering_allowed,
            wandering_cycle_limit: self
                .wandering_cycle_limit
                .unwrap_or(current.wandering_cycle_limit),
            villager_cycle_limit: self
                .villager_cycle_limit
                .unwrap_or(current.villager_cycle_limit),
            notifications: current.notifications,
        }
    }
}
