/// Gameplay tuning for the arena itself.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).

#[derive(Debug, Clone, Copy)]
pub struct WorldTuning {
    /// Map width in world units.
    pub width: f32,

    /// Map height in world units.
    pub height: f32,

    /// Half-width of segment walls on the default map.
    pub wall_half_width: f32,

    /// Extra distance around a wall's bounds before it is considered for resolution.
    pub wall_prune_margin: f32,

    /// Resolution passes per entity per tick (settles multi-wall corners).
    pub wall_passes: usize,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: 10_000.0,
            height: 10_000.0,
            wall_half_width: 25.0,
            wall_prune_margin: 50.0,
            wall_passes: 3,
        }
    }
}
