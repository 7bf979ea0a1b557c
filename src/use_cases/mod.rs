// Use cases layer: room workflows for the arena server.

pub mod game;
pub mod progress;
pub mod room;
pub mod rooms;
pub mod types;

pub use rooms::{RoomError, RoomHandle, RoomRegistry, RoomSettings};
pub use types::{KillNotice, RoomEvent, RoomUpdate, SnapshotFrame};
