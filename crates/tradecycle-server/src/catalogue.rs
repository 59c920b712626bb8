//! Offer catalogue for the sandbox host.
//!
//! Each trading profession has a small pool of novice offers; the sandbox
//! draws two of them whenever a villager's offers are regenerated. Wandering
//! traders draw from a shared pool of one-shot offers.

use tradecycle_types::{ItemStack, Profession, TradeOffer};

/// A catalogue entry, turned into a [`TradeOffer`] on demand.
#[derive(Debug, Clone, Copy)]
pub struct OfferTemplate {
    buy: (&'static str, u32),
    sell: (&'static str, u32),
    max_uses: u32,
}

impl OfferTemplate {
    const fn new(buy: (&'static str, u32), sell: (&'static str, u32), max_uses: u32) -> Self {
        Self {
            buy,
            sell,
            max_uses,
        }
    }

    /// A fresh, unused offer.
    pub fn to_offer(self) -> TradeOffer {
        TradeOffer {
            buy: ItemStack::new(self.buy.0, self.buy.1),
            buy_second: None,
            sell: ItemStack::new(self.sell.0, self.sell.1),
            uses: 0,
            max_uses: self.max_uses,
        }
    }
}

/// Offers drawn per villager regeneration.
pub const VILLAGER_OFFER_COUNT: usize = 2;

/// Offers drawn per wandering trader regeneration.
pub const WANDERING_OFFER_COUNT: usize = 5;

const EMERALD: &str = "minecraft:emerald";

const ARMORER: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:coal", 15), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 5), ("minecraft:iron_helmet", 1), 12),
    OfferTemplate::new((EMERALD, 9), ("minecraft:iron_chestplate", 1), 12),
    OfferTemplate::new((EMERALD, 5), ("minecraft:iron_boots", 1), 12),
];

const BUTCHER: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:chicken", 14), (EMERALD, 1), 16),
    OfferTemplate::new(("minecraft:porkchop", 7), (EMERALD, 1), 16),
    OfferTemplate::new(("minecraft:rabbit", 4), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 1), ("minecraft:rabbit_stew", 1), 12),
];

const CARTOGRAPHER: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:paper", 24), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 7), ("minecraft:map", 1), 12),
];

const CLERIC: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:rotten_flesh", 32), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 1), ("minecraft:redstone", 2), 12),
];

const FARMER: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:wheat", 20), (EMERALD, 1), 16),
    OfferTemplate::new(("minecraft:potato", 26), (EMERALD, 1), 16),
    OfferTemplate::new(("minecraft:carrot", 22), (EMERALD, 1), 16),
    OfferTemplate::new(("minecraft:beetroot", 15), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 1), ("minecraft:bread", 6), 16),
];

const FISHERMAN: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:string", 20), (EMERALD, 1), 16),
    OfferTemplate::new(("minecraft:coal", 10), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 1), ("minecraft:cooked_cod", 6), 16),
];

const FLETCHER: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:stick", 32), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 1), ("minecraft:arrow", 16), 12),
    OfferTemplate::new(("minecraft:gravel", 10), ("minecraft:flint", 10), 12),
];

const LEATHERWORKER: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:leather", 6), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 3), ("minecraft:leather_leggings", 1), 12),
    OfferTemplate::new((EMERALD, 7), ("minecraft:leather_chestplate", 1), 12),
];

const LIBRARIAN: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:paper", 24), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 9), ("minecraft:bookshelf", 1), 12),
    OfferTemplate::new((EMERALD, 5), ("minecraft:enchanted_book", 1), 12),
];

const MASON: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:clay_ball", 10), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 1), ("minecraft:brick", 10), 16),
];

const SHEPHERD: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:white_wool", 18), (EMERALD, 1), 16),
    OfferTemplate::new(("minecraft:brown_wool", 18), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 2), ("minecraft:shears", 1), 12),
];

const TOOLSMITH: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:coal", 15), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 1), ("minecraft:stone_axe", 1), 12),
    OfferTemplate::new((EMERALD, 1), ("minecraft:stone_pickaxe", 1), 12),
];

const WEAPONSMITH: &[OfferTemplate] = &[
    OfferTemplate::new(("minecraft:coal", 15), (EMERALD, 1), 16),
    OfferTemplate::new((EMERALD, 3), ("minecraft:iron_axe", 1), 12),
];

const WANDERING: &[OfferTemplate] = &[
    OfferTemplate::new((EMERALD, 1), ("minecraft:sea_pickle", 1), 5),
    OfferTemplate::new((EMERALD, 1), ("minecraft:fern", 1), 12),
    OfferTemplate::new((EMERALD, 3), ("minecraft:cactus", 1), 8),
    OfferTemplate::new((EMERALD, 5), ("minecraft:blue_ice", 1), 6),
    OfferTemplate::new((EMERALD, 1), ("minecraft:glowstone", 1), 5),
    OfferTemplate::new((EMERALD, 5), ("minecraft:oak_sapling", 1), 8),
    OfferTemplate::new((EMERALD, 3), ("minecraft:nautilus_shell", 1), 5),
    OfferTemplate::new((EMERALD, 1), ("minecraft:sand", 8), 8),
];

/// Novice offer pool for `profession`. Empty for `None` and `Nitwit`.
pub const fn novice_pool(profession: Profession) -> &'static [OfferTemplate] {
    match profession {
        Profession::None | Profession::Nitwit => &[],
        Profession::Armorer => ARMORER,
        Profession::Butcher => BUTCHER,
        Profession::Cartographer => CARTOGRAPHER,
        Profession::Cleric => CLERIC,
        Profession::Farmer => FARMER,
        Profession::Fisherman => FISHERMAN,
        Profession::Fletcher => FLETCHER,
        Profession::Leatherworker => LEATHERWORKER,
        Profession::Librarian => LIBRARIAN,
        Profession::Mason => MASON,
        Profession::Shepherd => SHEPHERD,
        Profession::Toolsmith => TOOLSMITH,
        Profession::Weaponsmith => WEAPONSMITH,
    }
}

/// Shared wandering trader pool.
pub const fn wandering_pool() -> &'static [OfferTemplate] {
    WANDERING
}
