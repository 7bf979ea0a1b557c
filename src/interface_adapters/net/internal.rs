use crate::domain::tuning::world::WorldTuning;
use crate::domain::walls::{Walls, ZoneGrid};
use crate::domain::{MobKind, Rarity};
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::net::client::spawn_room_serializer;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{RoomError, RoomEvent};

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;

// Zone grid cells default to this many world units per side.
const DEFAULT_CELL_SIZE: f32 = 100.0;

#[derive(Debug, serde::Deserialize)]
pub struct ZoneGridRequest {
    #[serde(default)]
    cell_size: Option<f32>,
    // One string per row: '#' is a wall, '.' or ' ' is open.
    rows: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct RoomInitRequest {
    // Gamemode name clients will join with.
    gamemode: String,
    #[serde(default)]
    zone_grid: Option<ZoneGridRequest>,
}

#[derive(Debug, serde::Serialize)]
struct RoomInitResponse {
    gamemode: String,
    instance: u64,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
    (status, Json(ErrorResponse::new(error))).into_response()
}

pub async fn create_room_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RoomInitRequest>,
) -> impl IntoResponse {
    let gamemode = payload.gamemode.trim().to_string();
    if gamemode.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "gamemode is required");
    }

    let walls = match payload.zone_grid {
        Some(grid) => {
            let cell_size = grid.cell_size.unwrap_or(DEFAULT_CELL_SIZE);
            match ZoneGrid::parse(cell_size, &grid.rows) {
                Ok(grid) => Some(Walls::from_zone_grid(&grid, &WorldTuning::default())),
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("invalid zone grid: {e:?}"),
                    );
                }
            }
        }
        None => None,
    };

    // Removed on the last disconnect, or after the idle timeout if nobody joins.
    match state.room_registry.create_room(&gamemode, walls).await {
        Ok(room) => {
            // Serialize from the start so the first joiner gets a snapshot.
            spawn_room_serializer(&room);
            (
                StatusCode::CREATED,
                Json(RoomInitResponse {
                    gamemode,
                    instance: room.instance,
                }),
            )
                .into_response()
        }
        Err(RoomError::AlreadyExists) => {
            error_response(StatusCode::CONFLICT, "room already exists")
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:?}")),
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct SpawnMobRequest {
    kind: String,
    #[serde(default)]
    rarity: Option<String>,
    #[serde(default)]
    x: Option<f32>,
    #[serde(default)]
    y: Option<f32>,
}

pub async fn spawn_mob_handler(
    State(state): State<Arc<AppState>>,
    Path(gamemode): Path<String>,
    Json(payload): Json<SpawnMobRequest>,
) -> impl IntoResponse {
    let Some(kind) = MobKind::parse(&payload.kind) else {
        return error_response(StatusCode::BAD_REQUEST, "unknown mob kind");
    };
    let rarity = match payload.rarity.as_deref() {
        None => Rarity::Common,
        Some(name) => match Rarity::parse(name) {
            Some(rarity) => rarity,
            None => return error_response(StatusCode::BAD_REQUEST, "unknown rarity"),
        },
    };
    let position = match (payload.x, payload.y) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
        _ => None,
    };

    let event = RoomEvent::AdminSpawn {
        kind,
        rarity,
        position,
    };
    match state.room_registry.send_to(&gamemode, event).await {
        Ok(()) => {
            info!(
                gamemode = %gamemode,
                kind = kind.as_str(),
                rarity = rarity.as_str(),
                "admin spawn queued"
            );
            StatusCode::ACCEPTED.into_response()
        }
        // A room that stopped between lookup and send is as good as missing.
        Err(RoomError::NotFound | RoomError::Closed) => {
            error_response(StatusCode::NOT_FOUND, "room not found")
        }
        Err(RoomError::AlreadyExists) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "unexpected room state")
        }
    }
}
