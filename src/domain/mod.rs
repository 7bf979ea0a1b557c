// Domain layer: core simulation types and rules.

pub mod geometry;
pub mod ledger;
pub mod physics;
pub mod ports;
pub mod rarity;
pub mod spatial;
pub mod state;
pub mod systems;
pub mod tuning;
pub mod walls;

pub use rarity::Rarity;
pub use state::{
    BulletSnapshot, DroneSnapshot, EntityId, Kill, KillPayload, MobKind, MobSnapshot, PlayerId,
    PlayerSnapshot, TrapSnapshot,
};
