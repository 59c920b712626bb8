//! Quota verdicts.
//!
//! A limit is a signed integer: negative means unlimited, `0` means
//! disabled, `n > 0` allows `n` cycles per entity. [`limit_verdict`] is the
//! canonical rule. The two role-specific checks below keep the exact shape
//! of each quota's decision so a rejection carries the right reason:
//!
//! - [`wandering_quota`] treats every `limit >= 0` as bounded, so `0` falls
//!   out as "limit reached" on the first request.
//! - [`villager_quota`] short-circuits `limit == 0` as "disabled" before the
//!   bounded comparison.
//!
//! Both agree with [`limit_verdict`] on allowed/denied for every input.

use serde::{Deserialize, Serialize};

/// Outcome of comparing a cycle count against a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitVerdict {
    /// Another cycle fits under the limit.
    Allowed,
    /// The limit forbids another cycle.
    Denied,
}

impl LimitVerdict {
    /// Whether the verdict permits a cycle.
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Villager quota check result. Separates "disabled" from "used up".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VillagerQuota {
    /// Another cycle is permitted.
    Allowed,
    /// The limit is `0`: villager cycling is off.
    Disabled,
    /// The villager has been cycled `limit` times already.
    Exhausted,
}

/// Compare `count` against `limit`.
///
/// `limit < 0` is always allowed, `limit == 0` always denied, and a positive
/// limit allows while `count < limit`.
pub const fn limit_verdict(count: u32, limit: i32) -> LimitVerdict {
    if limit < 0 {
        LimitVerdict::Allowed
    } else if limit == 0 {
        LimitVerdict::Denied
    } else if count < limit.unsigned_abs() {
        LimitVerdict::Allowed
    } else {
        LimitVerdict::Denied
    }
}

/// Wandering trader quota: any non-negative limit is a bound.
pub const fn wandering_quota(count: u32, limit: i32) -> LimitVerdict {
    if limit >= 0 && count >= limit.unsigned_abs() {
        LimitVerdict::Denied
    } else {
        LimitVerdict::Allowed
    }
}

/// Villager quota: `0` is checked first as "disabled", then positive limits
/// are bounds, negative limits are unlimited.
pub const fn villager_quota(count: u32, limit: i32) -> VillagerQuota {
    if limit == 0 {
        return VillagerQuota::Disabled;
    }
    if limit > 0 && count >= limit.unsigned_abs() {
        return VillagerQuota::Exhausted;
    }
    VillagerQuota::Allowed
}
