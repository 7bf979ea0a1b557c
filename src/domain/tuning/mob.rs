use crate::domain::rarity::SPAWN_WEIGHTS;
use crate::domain::state::MobKind;

/// Per-kind base stats for mobs, before rarity scaling.
#[derive(Debug, Clone, Copy)]
pub struct MobTuning {
    /// Hit points of a common mob.
    pub base_hp: f32,

    /// Collision radius (or ellipse semi-major axis) of a common mob.
    pub base_size: f32,

    /// Push weight, clamped into the shared 1..=100 range.
    pub weight: f32,

    /// Homing speed in units per second (0 for inert mobs).
    pub speed: f32,

    /// Radius within which a player body is noticed.
    pub vision: f32,

    /// Damage per second dealt to anything touching the mob.
    pub body_damage: f32,

    /// Fraction of drift velocity lost per second.
    pub velocity_decay: f32,

    /// Semi-minor / semi-major ratio of the hitbox (1.0 means circular).
    pub minor_ratio: f32,
}

impl MobTuning {
    pub fn for_kind(kind: MobKind) -> Self {
        match kind {
            MobKind::Food => Self {
                base_hp: 10.0,
                base_size: 20.0,
                weight: 10.0,
                speed: 0.0,
                vision: 0.0,
                body_damage: 5.0,
                velocity_decay: 3.0,
                minor_ratio: 1.0,
            },
            MobKind::Beetle => Self {
                base_hp: 35.0,
                base_size: 30.0,
                weight: 30.0,
                speed: 60.0,
                vision: 900.0,
                body_damage: 15.0,
                velocity_decay: 4.0,
                minor_ratio: 0.7,
            },
        }
    }
}

/// Population and funnel limits shared by every mob kind.
#[derive(Debug, Clone, Copy)]
pub struct MobSpawnTuning {
    /// Live mobs per kind the spawner replenishes toward; never exceeded.
    pub target_population: usize,

    /// Maximum natural spawns per kind per spawn cycle.
    pub batch: usize,

    /// Position re-rolls when a spawn lands inside a wall.
    pub wall_retries: usize,

    /// Damage sources farther than this from the mob are ignored.
    pub max_interaction_range: f32,

    /// Upper bound on how far overlap separation may move a mob in one tick.
    pub max_separation_step: f32,

    /// Natural spawn weights per rarity tier, common first.
    pub rarity_weights: [f64; 8],
}

impl Default for MobSpawnTuning {
    fn default() -> Self {
        Self {
            target_population: 800,
            batch: 100,
            wall_retries: 10,
            max_interaction_range: 2500.0,
            max_separation_step: 4.0,
            rarity_weights: SPAWN_WEIGHTS,
        }
    }
}
