// Rarity tiers and the weighted tables that hang off them.

use rand::Rng;
use rand::distributions::WeightedIndex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
    #[default]
    Common,
    Unusual,
    Rare,
    Epic,
    Legendary,
    Mythic,
    Ultra,
    Super,
}

// Natural spawn weights, indexed by tier. Super is astronomically rare.
pub const SPAWN_WEIGHTS: [f64; 8] = [
    600_000.0, 250_000.0, 100_000.0, 40_000.0, 8_000.0, 1_500.0, 200.0, 0.05,
];

const STAT_MULTIPLIERS: [f32; 8] = [1.0, 2.5, 6.0, 15.0, 40.0, 100.0, 300.0, 1500.0];
const SIZE_MULTIPLIERS: [f32; 8] = [1.0, 1.2, 1.5, 1.8, 2.2, 2.8, 3.5, 5.0];
const STARS: [u32; 8] = [1, 2, 5, 15, 50, 150, 500, 2500];

impl Rarity {
    pub const ALL: [Rarity; 8] = [
        Rarity::Common,
        Rarity::Unusual,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
        Rarity::Ultra,
        Rarity::Super,
    ];

    pub fn tier(self) -> usize {
        self as usize
    }

    pub fn from_tier(tier: usize) -> Option<Rarity> {
        Self::ALL.get(tier).copied()
    }

    /// One tier down, saturating at common.
    pub fn lower(self) -> Rarity {
        Self::from_tier(self.tier().saturating_sub(1)).unwrap_or(Rarity::Common)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Unusual => "unusual",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Mythic => "mythic",
            Rarity::Ultra => "ultra",
            Rarity::Super => "super",
        }
    }

    pub fn parse(name: &str) -> Option<Rarity> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(name))
    }

    /// Multiplier applied to hp and damage.
    pub fn stat_multiplier(self) -> f32 {
        STAT_MULTIPLIERS[self.tier()]
    }

    pub fn size_multiplier(self) -> f32 {
        SIZE_MULTIPLIERS[self.tier()]
    }

    /// Fixed star reward for killing a mob of this rarity.
    pub fn stars(self) -> u32 {
        STARS[self.tier()]
    }

    /// Weighted drop outcomes: nothing, the same rarity, or one tier lower.
    fn drop_weights(self) -> [(Option<Rarity>, u32); 3] {
        match self {
            Rarity::Common => [(None, 50), (Some(Rarity::Common), 50), (None, 0)],
            Rarity::Super => [(None, 0), (Some(Rarity::Super), 60), (Some(Rarity::Ultra), 40)],
            other => [(None, 35), (Some(other), 20), (Some(other.lower()), 45)],
        }
    }
}

/// Rolls the rarity of a naturally spawned mob from per-tier weights.
pub fn roll_rarity<R: Rng>(rng: &mut R, weights: &[f64; 8]) -> Rarity {
    match WeightedIndex::new(weights) {
        Ok(dist) => Rarity::from_tier(rng.sample(&dist)).unwrap_or_default(),
        Err(_) => Rarity::Common,
    }
}

/// Rolls the loot rarity dropped by a mob of `rarity`; `None` means no drop.
pub fn roll_drop<R: Rng>(rarity: Rarity, rng: &mut R) -> Option<Rarity> {
    let table = rarity.drop_weights();
    let dist = WeightedIndex::new(table.iter().map(|(_, w)| *w)).ok()?;
    table[rng.sample(&dist)].0
}
