// Network adapter modules split by public client sockets vs internal HTTP routes.

pub mod client;
pub mod internal;

pub use client::{spawn_room_serializer, ws_handler};
pub use internal::{create_room_handler, spawn_mob_handler};
