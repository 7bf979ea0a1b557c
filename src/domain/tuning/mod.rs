// Gameplay tuning, kept separate from runtime/server configuration.

pub mod drone;
pub mod mob;
pub mod player;
pub mod projectile;
pub mod world;
