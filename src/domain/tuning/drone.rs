use crate::domain::rarity::Rarity;

/// Gameplay tuning for Hive drones (body-equipped spawners).
#[derive(Debug, Clone, Copy)]
pub struct HiveTuning {
    pub size: f32,
    pub speed: f32,
    pub base_hp: f32,
    /// Damage per second while touching a mob.
    pub base_damage: f32,
    /// Distance from the owner past which a drone is destroyed.
    pub leash: f32,
    /// Radius for auto-target acquisition.
    pub target_range: f32,
    /// Minimum gap between two spawns.
    pub spawn_interval_ms: f64,
    /// Minimum gap between any drone death and the next spawn.
    pub respawn_delay_ms: f64,
    pub weight: f32,
}

impl Default for HiveTuning {
    fn default() -> Self {
        Self {
            size: 10.0,
            speed: 320.0,
            base_hp: 20.0,
            base_damage: 15.0,
            leash: 700.0,
            target_range: 600.0,
            spawn_interval_ms: 500.0,
            respawn_delay_ms: 4000.0,
            weight: 5.0,
        }
    }
}

impl HiveTuning {
    /// Spawners granted by a Hive body of the given rarity.
    pub fn spawners(rarity: Rarity) -> usize {
        match rarity {
            Rarity::Common | Rarity::Unusual => 1,
            Rarity::Rare | Rarity::Epic => 2,
            Rarity::Legendary | Rarity::Mythic => 3,
            Rarity::Ultra => 4,
            Rarity::Super => 5,
        }
    }

    pub fn cap(rarity: Rarity) -> usize {
        Self::spawners(rarity) * 3
    }
}

/// Gameplay tuning for Overlord drones (tank-equipped).
#[derive(Debug, Clone, Copy)]
pub struct OverlordTuning {
    pub size: f32,
    pub speed: f32,
    pub base_hp: f32,
    pub base_damage: f32,
    /// Distance from the owner past which a drone is destroyed outright.
    pub max_range: f32,
    /// Radius for auto-target acquisition.
    pub target_range: f32,
    /// A recharging drone only counts down while this close to its owner.
    pub recharge_radius: f32,
    pub recharge_ms: f32,
    /// Return speed multiplier while recharging.
    pub recharge_speed_scale: f32,
    pub weight: f32,
    pub max_separation_step: f32,
}

impl Default for OverlordTuning {
    fn default() -> Self {
        Self {
            size: 18.0,
            speed: 260.0,
            base_hp: 60.0,
            base_damage: 25.0,
            max_range: 1600.0,
            target_range: 800.0,
            recharge_radius: 90.0,
            recharge_ms: 2500.0,
            recharge_speed_scale: 1.5,
            weight: 12.0,
            max_separation_step: 3.0,
        }
    }
}

impl OverlordTuning {
    pub fn count(rarity: Rarity) -> usize {
        match rarity {
            Rarity::Common | Rarity::Unusual => 2,
            Rarity::Rare | Rarity::Epic => 3,
            Rarity::Legendary => 4,
            Rarity::Mythic => 5,
            Rarity::Ultra => 6,
            Rarity::Super => 8,
        }
    }
}
