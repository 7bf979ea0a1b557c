use crate::use_cases::RoomRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // Rooms keyed by gamemode, shared by the socket and internal routes.
    pub room_registry: Arc<RoomRegistry>,
    // Gamemode used when a socket does not name one.
    pub default_gamemode: Arc<str>,
}
