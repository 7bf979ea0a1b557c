/// Gameplay tuning for player bodies.
///
/// Player transforms come from the client; these values cover what the server
/// owns: contact damage, regeneration and the aura body.

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Contact damage per second at level 1.
    pub base_body_damage: f32,

    /// Extra contact damage per second for every level above 1.
    pub body_damage_per_level: f32,

    /// Fraction of max hp regenerated per second.
    pub regen_fraction: f32,

    /// Aura radius at common rarity.
    pub aura_base_radius: f32,

    /// Aura radius added per rarity tier.
    pub aura_radius_per_tier: f32,

    /// Aura damage per second at common rarity (scaled by rarity multiplier).
    pub aura_base_damage: f32,

    /// Used when a client does not report a max hp.
    pub default_max_hp: f32,

    /// Used when a client does not report a size.
    pub default_size: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            base_body_damage: 10.0,
            body_damage_per_level: 0.5,
            regen_fraction: 0.01,
            aura_base_radius: 100.0,
            aura_radius_per_tier: 25.0,
            aura_base_damage: 5.0,
            default_max_hp: 100.0,
            default_size: 25.0,
        }
    }
}
