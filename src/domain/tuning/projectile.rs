/// Gameplay tuning for bullets.

#[derive(Debug, Clone, Copy)]
pub struct BulletTuning {
    /// Speed used when a descriptor omits it, in units per second.
    pub default_speed: f32,

    /// Lifetime used when a descriptor omits it, in milliseconds.
    pub default_lifetime_ms: f32,

    /// Upper bound accepted for client-supplied lifetimes.
    pub max_lifetime_ms: f32,

    /// Collision radius used when a descriptor omits it.
    pub default_size: f32,

    /// Damage used when a descriptor omits it.
    pub default_damage: f32,

    /// Bullets shove mobs this much less than traps do.
    pub push_scale: f32,

    /// Velocity imparted to a mob at a push factor of 1.
    pub push_impulse: f32,
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            default_speed: 600.0,
            default_lifetime_ms: 1500.0,
            max_lifetime_ms: 10_000.0,
            default_size: 6.0,
            default_damage: 10.0,
            push_scale: 0.25,
            push_impulse: 240.0,
        }
    }
}

/// Gameplay tuning for traps (squares).
#[derive(Debug, Clone, Copy)]
pub struct TrapTuning {
    /// Live traps one owner may keep when the weapon does not say otherwise.
    pub default_owner_cap: usize,

    /// Collision-free window after a trap spawns.
    pub grace_ms: f64,

    /// Window during which the launch impulse bleeds off quickly.
    pub launch_window_ms: f64,

    /// Fraction of velocity lost per second during the launch window.
    pub launch_decay: f32,

    /// Fraction of velocity lost per second while coasting.
    pub coast_decay: f32,

    /// Window after a trap first touches another in which bounce applies.
    pub bounce_window_ms: f64,

    /// Velocity added along the contact normal when two traps bounce.
    pub bounce_impulse: f32,

    /// Hard ceiling on a trap's total age.
    pub max_age_ms: f64,

    /// Fraction of angular velocity lost per second.
    pub spin_decay: f32,

    /// Angular velocity imparted per unit of bounce impulse.
    pub spin_per_impulse: f32,

    /// Duration used when a descriptor omits it.
    pub default_duration_ms: f32,
}

impl Default for TrapTuning {
    fn default() -> Self {
        Self {
            default_owner_cap: 25,
            grace_ms: 120.0,
            launch_window_ms: 350.0,
            launch_decay: 6.0,
            coast_decay: 0.8,
            bounce_window_ms: 250.0,
            bounce_impulse: 90.0,
            max_age_ms: 60_000.0,
            spin_decay: 1.5,
            spin_per_impulse: 0.02,
            default_duration_ms: 20_000.0,
        }
    }
}
