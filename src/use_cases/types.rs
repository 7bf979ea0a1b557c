// Use-case level inputs/outputs for the room loop.

use crate::domain::state::PlayerState;
use crate::domain::systems::projectiles::BulletSpec;
use crate::domain::systems::traps::TrapSpec;
use crate::domain::{
    BulletSnapshot, DroneSnapshot, EntityId, KillPayload, MobKind, MobSnapshot, PlayerId,
    PlayerSnapshot, Rarity, TrapSnapshot,
};
use axum::extract::ws::Utf8Bytes;
use std::sync::Arc;

/// Inbound work queued for a room and applied at the start of its next tick.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    Join {
        player_id: PlayerId,
        state: PlayerState,
    },
    State {
        player_id: PlayerId,
        state: PlayerState,
    },
    Hit {
        player_id: PlayerId,
        kind: MobKind,
        mob_id: EntityId,
        damage: f32,
        x: f32,
        y: f32,
    },
    Shoot {
        player_id: PlayerId,
        bullets: Vec<BulletSpec>,
    },
    Square {
        player_id: PlayerId,
        trap: TrapSpec,
    },
    ClearSquares {
        player_id: PlayerId,
    },
    Leave {
        player_id: PlayerId,
    },
    AdminSpawn {
        kind: MobKind,
        rarity: Rarity,
        position: Option<(f32, f32)>,
    },
}

/// One sequence-numbered snapshot of a room.
#[derive(Debug, Clone)]
pub struct RoomUpdate {
    pub seq: u64,
    pub tick: u64,
    pub food: Vec<MobSnapshot>,
    pub beetles: Vec<MobSnapshot>,
    pub bullets: Vec<BulletSnapshot>,
    pub traps: Vec<TrapSnapshot>,
    pub drones: Vec<DroneSnapshot>,
    pub players: Vec<PlayerSnapshot>,
}

/// Serialized snapshot shared by every connection in a room.
#[derive(Debug, Clone)]
pub struct SnapshotFrame {
    pub seq: u64,
    pub bytes: Utf8Bytes,
}

impl SnapshotFrame {
    pub fn empty() -> Self {
        Self {
            seq: 0,
            bytes: Utf8Bytes::from(""),
        }
    }
}

/// A kill leaving its room, addressed to the credited player.
#[derive(Debug, Clone, PartialEq)]
pub struct KillNotice {
    /// Distinguishes successive rooms that reuse a gamemode name.
    pub room_instance: u64,
    pub gamemode: Arc<str>,
    pub player_id: PlayerId,
    pub payload: KillPayload,
}
