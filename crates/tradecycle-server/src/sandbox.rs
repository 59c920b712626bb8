//! In-memory sandbox host.
//!
//! Stands in for the game server: it owns merchants, players, their
//! inventories and open trading screens, and implements the core's host
//! traits on top of them. Populations and regenerated offers come from a
//! seeded RNG, so a given config always produces the same world.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use tradecycle_core::{
    ActiveSession, HostError, MerchantWorld, PermissionOracle, SandboxConfig, SessionResolver,
};
use tradecycle_types::{
    EntityId, EntityRole, ItemStack, Profession, RequesterId, ReturnedItem, SessionId,
    TradeEntity, VillagerProfile,
};

use crate::catalogue::{
    OfferTemplate, VILLAGER_OFFER_COUNT, WANDERING_OFFER_COUNT, novice_pool, wandering_pool,
};

/// Experience a villager gains per completed trade.
const TRADE_EXPERIENCE: u32 = 2;

/// Errors from player actions in the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SandboxError {
    /// No merchant with that id exists.
    #[error("unknown merchant {0}")]
    UnknownMerchant(EntityId),

    /// The player has no trading screen open.
    #[error("{0} has no trading screen open")]
    NoSession(String),

    /// Input slot index out of range.
    #[error("slot {0} is not an input slot (use 0 or 1)")]
    InvalidSlot(u8),

    /// The staged inputs do not match any offer.
    #[error("nothing to trade: the staged items match no offer")]
    NothingToTrade,
}

/// An open trading screen.
#[derive(Debug)]
struct Screen {
    id: SessionId,
    merchant: EntityId,
    inputs: [Option<ItemStack>; 2],
    /// Index of the offer the inputs currently match, shown in the output
    /// slot.
    preview: Option<usize>,
}

/// The sandbox world.
#[derive(Debug)]
pub struct SandboxHost {
    rng: SmallRng,
    merchants: BTreeMap<EntityId, TradeEntity>,
    players: BTreeMap<String, RequesterId>,
    inventories: BTreeMap<RequesterId, Vec<ItemStack>>,
    screens: BTreeMap<RequesterId, Screen>,
}

impl SandboxHost {
    /// Spawn the configured population.
    pub fn seed(config: &SandboxConfig) -> Self {
        let mut host = Self {
            rng: SmallRng::seed_from_u64(config.seed),
            merchants: BTreeMap::new(),
            players: BTreeMap::new(),
            inventories: BTreeMap::new(),
            screens: BTreeMap::new(),
        };
        for _ in 0..config.villagers {
            let profession = host.random_profession();
            host.spawn(EntityRole::Villager(VillagerProfile {
                profession,
                experience: 0,
                level: 1,
            }));
        }
        for _ in 0..config.wandering_traders {
            host.spawn(EntityRole::Wandering);
        }
        info!(
            seed = config.seed,
            villagers = config.villagers,
            wandering_traders = config.wandering_traders,
            "Sandbox population spawned"
        );
        host
    }

    /// Add a merchant with a freshly drawn offer list and return its id.
    pub fn spawn(&mut self, role: EntityRole) -> EntityId {
        let id = EntityId::new();
        let offers = self
            .draw_offers(&role)
            .into_iter()
            .map(OfferTemplate::to_offer)
            .collect();
        self.merchants.insert(id, TradeEntity { id, role, offers });
        id
    }

    /// The requester id for `name`, registering the player on first sight.
    pub fn requester(&mut self, name: &str) -> RequesterId {
        if let Some(id) = self.players.get(name) {
            return *id;
        }
        let id = RequesterId::new();
        self.players.insert(name.to_owned(), id);
        self.inventories.insert(id, Vec::new());
        debug!(player = name, requester = %id, "Player registered");
        id
    }

    /// All merchants, ordered by id.
    pub fn merchants(&self) -> impl Iterator<Item = &TradeEntity> {
        self.merchants.values()
    }

    /// Items the player holds.
    pub fn inventory(&self, requester: RequesterId) -> &[ItemStack] {
        self.inventories.get(&requester).map_or(&[], Vec::as_slice)
    }

    /// Open a trading screen with `merchant`, closing any previous one.
    pub fn open(&mut self, requester: RequesterId, merchant: EntityId) -> Result<SessionId, SandboxError> {
        if !self.merchants.contains_key(&merchant) {
            return Err(SandboxError::UnknownMerchant(merchant));
        }
        self.close(requester);
        let id = SessionId::new();
        self.screens.insert(
            requester,
            Screen {
                id,
                merchant,
                inputs: [None, None],
                preview: None,
            },
        );
        Ok(id)
    }

    /// Stage `stack` in input `slot` and return the output preview, if the
    /// inputs now match an offer. Whatever was in the slot goes back to the
    /// inventory.
    pub fn place(
        &mut self,
        player: &str,
        requester: RequesterId,
        slot: u8,
        stack: ItemStack,
    ) -> Result<Option<ItemStack>, SandboxError> {
        let screen = self
            .screens
            .get_mut(&requester)
            .ok_or_else(|| SandboxError::NoSession(player.to_owned()))?;
        let input = screen
            .inputs
            .get_mut(usize::from(slot))
            .ok_or(SandboxError::InvalidSlot(slot))?;
        let displaced = input.replace(stack);
        let merchant = screen.merchant;

        if let Some(displaced) = displaced {
            self.inventories.entry(requester).or_default().push(displaced);
        }
        let preview = self.match_offer(requester, merchant);
        let output = preview.and_then(|index| {
            self.merchants
                .get(&merchant)
                .and_then(|m| m.offers.get(index))
                .map(|offer| offer.sell.clone())
        });
        if let Some(screen) = self.screens.get_mut(&requester) {
            screen.preview = preview;
        }
        Ok(output)
    }

    /// Take the output: consume the staged inputs, use the offer once, and
    /// give the player the result.
    pub fn trade(&mut self, player: &str, requester: RequesterId) -> Result<ItemStack, SandboxError> {
        let screen = self
            .screens
            .get_mut(&requester)
            .ok_or_else(|| SandboxError::NoSession(player.to_owned()))?;
        let index = screen.preview.take().ok_or(SandboxError::NothingToTrade)?;
        screen.inputs = [None, None];
        let merchant = screen.merchant;

        let entity = self
            .merchants
            .get_mut(&merchant)
            .ok_or(SandboxError::UnknownMerchant(merchant))?;
        let offer = entity
            .offers
            .get_mut(index)
            .ok_or(SandboxError::NothingToTrade)?;
        offer.uses = offer.uses.saturating_add(1);
        let received = offer.sell.clone();
        if let EntityRole::Villager(profile) = &mut entity.role {
            profile.experience = profile.experience.saturating_add(TRADE_EXPERIENCE);
        }
        self.inventories
            .entry(requester)
            .or_default()
            .push(received.clone());
        info!(player, entity = %merchant, item = %received.item, "Trade completed");
        Ok(received)
    }

    /// Close the player's screen, returning staged inputs to the inventory.
    pub fn close(&mut self, requester: RequesterId) -> Vec<ReturnedItem> {
        match self.screens.get(&requester).map(|screen| screen.id) {
            Some(session) => {
                let returned = self.clear_pending_slots(session);
                self.screens.remove(&requester);
                returned
            }
            None => Vec::new(),
        }
    }

    fn match_offer(&self, requester: RequesterId, merchant: EntityId) -> Option<usize> {
        let screen = self.screens.get(&requester)?;
        let entity = self.merchants.get(&merchant)?;
        let [first, _] = &screen.inputs;
        let staged = first.as_ref()?;
        entity.offers.iter().position(|offer| {
            offer.uses < offer.max_uses
                && offer.buy.item == staged.item
                && offer.buy.count <= staged.count
        })
    }

    fn random_profession(&mut self) -> Profession {
        match self.rng.random_range(0..8_u32) {
            0 => Profession::None,
            1 => Profession::Nitwit,
            _ => {
                let index = self.rng.random_range(0..Profession::TRADING.len());
                Profession::TRADING
                    .get(index)
                    .copied()
                    .unwrap_or(Profession::Farmer)
            }
        }
    }

    fn draw_offers(&mut self, role: &EntityRole) -> Vec<OfferTemplate> {
        let (pool, amount) = match role {
            EntityRole::Villager(profile) => (novice_pool(profile.profession), VILLAGER_OFFER_COUNT),
            EntityRole::Wandering => (wandering_pool(), WANDERING_OFFER_COUNT),
            EntityRole::Other { .. } => return Vec::new(),
        };
        let amount = amount.min(pool.len());
        rand::seq::index::sample(&mut self.rng, pool.len(), amount)
            .into_iter()
            .filter_map(|index| pool.get(index).copied())
            .collect()
    }
}

impl SessionResolver for SandboxHost {
    fn resolve(&mut self, requester: RequesterId) -> Option<ActiveSession> {
        self.screens.get(&requester).map(|screen| ActiveSession {
            session_id: screen.id,
            merchant: screen.merchant,
        })
    }

    fn clear_pending_slots(&mut self, session: SessionId) -> Vec<ReturnedItem> {
        let Some((requester, screen)) = self
            .screens
            .iter_mut()
            .find(|(_, screen)| screen.id == session)
        else {
            return Vec::new();
        };
        screen.preview = None;
        let returned: Vec<ReturnedItem> = screen
            .inputs
            .iter_mut()
            .zip(0_u8..)
            .filter_map(|(input, slot)| input.take().map(|stack| ReturnedItem { slot, stack }))
            .collect();
        self.inventories
            .entry(*requester)
            .or_default()
            .extend(returned.iter().map(|item| item.stack.clone()));
        returned
    }
}

impl MerchantWorld for SandboxHost {
    fn merchant(&self, id: EntityId) -> Option<&TradeEntity> {
        self.merchants.get(&id)
    }

    fn merchant_mut(&mut self, id: EntityId) -> Option<&mut TradeEntity> {
        self.merchants.get_mut(&id)
    }

    fn regenerate_offers(&mut self, id: EntityId) -> Result<(), HostError> {
        let role = self
            .merchants
            .get(&id)
            .map(|entity| entity.role.clone())
            .ok_or(HostError::EntityGone { entity: id })?;
        let offers = self
            .draw_offers(&role)
            .into_iter()
            .map(OfferTemplate::to_offer)
            .collect();
        let entity = self
            .merchants
            .get_mut(&id)
            .ok_or(HostError::EntityGone { entity: id })?;
        entity.offers = offers;
        Ok(())
    }
}

/// Permission levels for known requesters. Unknown requesters are level 0.
///
/// Shared between the dispatcher and the console, which replaces the grants
/// when the config is reloaded.
#[derive(Debug, Default)]
pub struct OperatorRoster {
    levels: RwLock<BTreeMap<RequesterId, u8>>,
}

impl OperatorRoster {
    /// Grant `level` to `requester`.
    pub fn grant(&self, requester: RequesterId, level: u8) {
        self.levels.write().insert(requester, level);
    }

    /// Drop every grant and give `level` to each of `operators`.
    pub fn replace(&self, operators: impl IntoIterator<Item = RequesterId>, level: u8) {
        let levels: BTreeMap<_, _> = operators.into_iter().map(|op| (op, level)).collect();
        info!(operators = levels.len(), level, "Operator roster replaced");
        *self.levels.write() = levels;
    }
}

impl PermissionOracle for OperatorRoster {
    fn is_authorized(&self, requester: RequesterId, level: u8) -> bool {
        self.levels
            .read()
            .get(&requester)
            .is_some_and(|granted| *granted >= level)
    }
}
