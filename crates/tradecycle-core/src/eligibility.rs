//! Eligibility rules: may this merchant be cycled right now?
//!
//! [`evaluate`] is a pure function of the merchant, a policy snapshot and
//! the ledger. Rules are checked in a fixed order and the first match wins:
//!
//! 1. Any used offer rejects, whatever the role.
//! 2. Wandering traders: the allow switch, then the wandering quota.
//! 3. Villagers: profession, nitwit, experience, then the villager quota.
//! 4. Anything else cannot be cycled.

use tradecycle_ledger::{CycleLedger, LimitVerdict, VillagerQuota, villager_quota, wandering_quota};
use tradecycle_types::{EntityRole, Policy, Profession, RejectionReason, TradeEntity};

/// Why a merchant was turned down, with the text shown to the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Machine-readable reason.
    pub reason: RejectionReason,
    /// Human-readable message (without the error prefix).
    pub message: String,
}

impl Rejection {
    fn new(reason: RejectionReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

/// Result of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// The merchant may be cycled.
    Eligible,
    /// The merchant may not be cycled.
    Ineligible(Rejection),
}

impl Eligibility {
    /// Whether the merchant may be cycled.
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Decide whether `entity` may be cycled under `policy`.
pub fn evaluate(entity: &TradeEntity, policy: &Policy, ledger: &CycleLedger) -> Eligibility {
    if entity.has_used_offer() {
        let message = match entity.role {
            EntityRole::Wandering => "This wandering trader was already traded with!",
            EntityRole::Villager(_) | EntityRole::Other { .. } => {
                "This villager was already traded with!"
            }
        };
        return reject(RejectionReason::AlreadyTradedWith, message);
    }

    match &entity.role {
        EntityRole::Wandering => evaluate_wandering(entity, policy, ledger),
        EntityRole::Villager(profile) => {
            if profile.profession == Profession::None {
                return reject(RejectionReason::NoProfession, "This villager has no profession!");
            }
            if profile.profession == Profession::Nitwit {
                return reject(RejectionReason::Nitwit, "Nitwits cannot trade!");
            }
            if profile.experience > 0 {
                return reject(
                    RejectionReason::AlreadyTradedWith,
                    "This villager was already traded with!",
                );
            }
            evaluate_villager_quota(entity, policy, ledger)
        }
        EntityRole::Other { .. } => {
            reject(RejectionReason::NotCyclable, "This merchant cannot be cycled.")
        }
    }
}

fn evaluate_wandering(entity: &TradeEntity, policy: &Policy, ledger: &CycleLedger) -> Eligibility {
    if !policy.wandering_allowed {
        return reject(
            RejectionReason::WanderingDisabled,
            "Wandering trader cycling is disabled by policy.",
        );
    }
    let limit = policy.wandering_cycle_limit;
    match wandering_quota(ledger.count_for(entity.id), limit) {
        LimitVerdict::Allowed => Eligibility::Eligible,
        LimitVerdict::Denied => reject(
            RejectionReason::WanderingLimitReached,
            format!("Wandering trader cycle limit reached ({limit} cycles max)."),
        ),
    }
}

fn evaluate_villager_quota(
    entity: &TradeEntity,
    policy: &Policy,
    ledger: &CycleLedger,
) -> Eligibility {
    let limit = policy.villager_cycle_limit;
    match villager_quota(ledger.count_for(entity.id), limit) {
        VillagerQuota::Allowed => Eligibility::Eligible,
        VillagerQuota::Disabled => reject(
            RejectionReason::VillagerCyclingDisabled,
            "Villager cycling disabled by policy (limit is 0).",
        ),
        VillagerQuota::Exhausted => reject(
            RejectionReason::VillagerLimitReached,
            format!("Villager cycle limit reached ({limit} cycles max)."),
        ),
    }
}

fn reject(reason: RejectionReason, message: impl Into<String>) -> Eligibility {
    Eligibility::Ineligible(Rejection::new(reason, message))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use tradecycle_types::{EntityId, ItemStack, TradeOffer, TradeRole, VillagerProfile};

    use super::*;

    fn offer(uses: u32) -> TradeOffer {
        TradeOffer {
            buy: ItemStack::new("minecraft:wheat", 20),
            buy_second: None,
            sell: ItemStack::new("minecraft:emerald", 1),
            uses,
            max_uses: 16,
        }
    }

    fn villager(profession: Profession, experience: u32) -> TradeEntity {
        TradeEntity {
            id: EntityId::new(),
            role: EntityRole::Villager(VillagerProfile {
                profession,
                experience,
                level: 1,
            }),
            offers: vec![offer(0), offer(0)],
        }
    }

    fn wandering() -> TradeEntity {
        TradeEntity {
            id: EntityId::new(),
            role: EntityRole::Wandering,
            offers: vec![offer(0)],
        }
    }

    fn open_policy() -> Policy {
        Policy {
            wandering_allowed: true,
            ..Policy::default()
        }
    }

    fn reason(eligibility: &Eligibility) -> Option<RejectionReason> {
        match eligibility {
            Eligibility::Eligible => None,
            Eligibility::Ineligible(rejection) => Some(rejection.reason),
        }
    }

    fn into_rejection(eligibility: Eligibility) -> Rejection {
        match eligibility {
            Eligibility::Ineligible(rejection) => rejection,
            Eligibility::Eligible => panic!("expected rejection"),
        }
    }

    fn cycled(ledger: &CycleLedger, entity: &TradeEntity, times: u32) {
        for _ in 0..times {
            ledger.increment(entity.id, entity.trade_role()).unwrap();
        }
    }

    #[test]
    fn fresh_farmer_is_eligible() {
        let ledger = CycleLedger::new();
        assert!(evaluate(&villager(Profession::Farmer, 0), &Policy::default(), &ledger).is_eligible());
    }

    #[test]
    fn experienced_villager_was_traded_with() {
        let ledger = CycleLedger::new();
        let result = evaluate(&villager(Profession::Farmer, 5), &Policy::default(), &ledger);
        assert_eq!(reason(&result), Some(RejectionReason::AlreadyTradedWith));
        let rejection = into_rejection(result);
        assert!(rejection.message.contains("already traded with"));
    }

    #[test]
    fn used_offer_wins_over_every_other_rule() {
        let ledger = CycleLedger::new();
        let mut nitwit = villager(Profession::Nitwit, 0);
        nitwit.offers.push(offer(1));
        assert_eq!(
            reason(&evaluate(&nitwit, &Policy::default(), &ledger)),
            Some(RejectionReason::AlreadyTradedWith)
        );

        let mut trader = wandering();
        trader.offers.push(offer(3));
        let result = evaluate(&trader, &Policy::default(), &ledger);
        assert_eq!(reason(&result), Some(RejectionReason::AlreadyTradedWith));
        let rejection = into_rejection(result);
        assert!(rejection.message.contains("wandering trader"));
    }

    #[test]
    fn jobless_and_nitwit_villagers_are_rejected() {
        let ledger = CycleLedger::new();
        assert_eq!(
            reason(&evaluate(&villager(Profession::None, 0), &open_policy(), &ledger)),
            Some(RejectionReason::NoProfession)
        );
        for limit in [-1, 0, 1, 10] {
            let policy = Policy {
                villager_cycle_limit: limit,
                ..open_policy()
            };
            assert_eq!(
                reason(&evaluate(&villager(Profession::Nitwit, 0), &policy, &ledger)),
                Some(RejectionReason::Nitwit)
            );
        }
    }

    #[test]
    fn wandering_disabled_regardless_of_limit() {
        let ledger = CycleLedger::new();
        for limit in [-1, 0, 5] {
            let policy = Policy {
                wandering_allowed: false,
                wandering_cycle_limit: limit,
                ..Policy::default()
            };
            let result = evaluate(&wandering(), &policy, &ledger);
            assert_eq!(reason(&result), Some(RejectionReason::WanderingDisabled));
            let rejection = into_rejection(result);
            assert!(rejection.message.contains("disabled by policy"));
        }
    }

    #[test]
    fn wandering_unlimited_is_always_eligible() {
        let ledger = CycleLedger::new();
        let trader = wandering();
        cycled(&ledger, &trader, 50);
        assert!(evaluate(&trader, &open_policy(), &ledger).is_eligible());
    }

    #[test]
    fn wandering_zero_limit_rejects_first_request() {
        let ledger = CycleLedger::new();
        let policy = Policy {
            wandering_cycle_limit: 0,
            ..open_policy()
        };
        assert_eq!(
            reason(&evaluate(&wandering(), &policy, &ledger)),
            Some(RejectionReason::WanderingLimitReached)
        );
    }

    #[test]
    fn wandering_limit_reached_names_the_limit() {
        let ledger = CycleLedger::new();
        let trader = wandering();
        cycled(&ledger, &trader, 1);
        let policy = Policy {
            wandering_cycle_limit: 1,
            ..open_policy()
        };
        let rejection = into_rejection(evaluate(&trader, &policy, &ledger));
        assert_eq!(rejection.reason, RejectionReason::WanderingLimitReached);
        assert!(rejection.message.contains("limit reached (1 cycles max)"));
    }

    #[test]
    fn villager_zero_limit_is_disabled_never_limit_reached() {
        let ledger = CycleLedger::new();
        let farmer = villager(Profession::Farmer, 0);
        let policy = Policy {
            villager_cycle_limit: 0,
            ..open_policy()
        };
        for _ in 0..3 {
            assert_eq!(
                reason(&evaluate(&farmer, &policy, &ledger)),
                Some(RejectionReason::VillagerCyclingDisabled)
            );
            ledger.increment(farmer.id, TradeRole::Villager).unwrap();
        }
        let rejection = into_rejection(evaluate(&farmer, &policy, &ledger));
        assert!(
            rejection
                .message
                .to_lowercase()
                .contains("villager cycling disabled")
        );
    }

    #[test]
    fn villager_quota_allows_exactly_n() {
        let ledger = CycleLedger::new();
        let librarian = villager(Profession::Librarian, 0);
        let policy = Policy {
            villager_cycle_limit: 3,
            ..open_policy()
        };
        for _ in 0..3 {
            assert!(evaluate(&librarian, &policy, &ledger).is_eligible());
            ledger.increment(librarian.id, TradeRole::Villager).unwrap();
        }
        assert_eq!(
            reason(&evaluate(&librarian, &policy, &ledger)),
            Some(RejectionReason::VillagerLimitReached)
        );
    }

    #[test]
    fn other_roles_cannot_be_cycled() {
        let ledger = CycleLedger::new();
        let entity = TradeEntity {
            id: EntityId::new(),
            role: EntityRole::Other {
                kind: "minecraft:piglin".to_owned(),
            },
            offers: Vec::new(),
        };
        assert_eq!(
            reason(&evaluate(&entity, &open_policy(), &ledger)),
            Some(RejectionReason::NotCyclable)
        );
    }

    #[test]
    fn evaluation_never_touches_the_ledger() {
        let ledger = CycleLedger::new();
        let _ = evaluate(&villager(Profession::Farmer, 0), &open_policy(), &ledger);
        let _ = evaluate(&wandering(), &open_policy(), &ledger);
        assert!(ledger.is_empty());
    }
}
