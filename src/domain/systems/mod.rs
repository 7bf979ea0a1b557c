// Per-room simulation systems; each owns one registry and its tick step.

pub mod contact;
pub mod drones;
pub mod mobs;
pub mod projectiles;
pub mod traps;
