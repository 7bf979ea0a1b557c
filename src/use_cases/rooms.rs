// Room orchestration: create-on-join, destroy-on-empty.

use crate::domain::walls::Walls;
use crate::use_cases::game::{RoomOutputs, RoomTiming, room_task};
use crate::use_cases::room::{Room, RoomTuning};
use crate::use_cases::types::{KillNotice, RoomEvent, RoomUpdate, SnapshotFrame};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, RwLock, broadcast, mpsc, watch};
use tracing::info;

/// Shared configuration for spawning room tasks.
#[derive(Debug, Clone)]
pub struct RoomSettings {
    /// Capacity for inbound room events.
    pub event_channel_capacity: usize,
    /// Capacity for broadcast snapshots and kills.
    pub update_broadcast_capacity: usize,
    pub timing: RoomTiming,
    pub tuning: RoomTuning,
    /// Walls used by rooms created without a custom zone grid.
    pub default_walls: Arc<Walls>,
    /// A pre-created room nobody has joined is stopped after this long.
    pub idle_timeout: Duration,
}

/// Errors returned by room registry operations.
#[derive(Debug, PartialEq)]
pub enum RoomError {
    /// Room already exists and cannot be re-created.
    AlreadyExists,
    /// No room is running under that gamemode.
    NotFound,
    /// The room task stopped accepting events.
    Closed,
}

/// Per-room channels shared by every connection in it.
#[derive(Clone)]
pub struct RoomHandle {
    /// Gamemode name clients use to target this room.
    pub gamemode: Arc<str>,
    /// Unique per created room, even when a gamemode name is reused.
    pub instance: u64,
    /// Sender for events into the room task.
    pub event_tx: mpsc::Sender<RoomEvent>,
    /// Broadcast sender for raw snapshots.
    pub update_tx: broadcast::Sender<RoomUpdate>,
    /// Broadcast sender for serialized snapshots.
    pub frame_tx: broadcast::Sender<SnapshotFrame>,
    /// Latest serialized snapshot for lag recovery.
    pub frame_latest_tx: watch::Sender<SnapshotFrame>,
    /// Kills for every player in the room; connections keep their own.
    pub kill_tx: broadcast::Sender<KillNotice>,
    pub walls: Arc<Walls>,
    shutdown: Arc<Notify>,
}

impl RoomHandle {
    pub async fn send(&self, event: RoomEvent) -> Result<(), RoomError> {
        self.event_tx.send(event).await.map_err(|_| RoomError::Closed)
    }
}

struct RoomEntry {
    handle: RoomHandle,
    connections: usize,
}

/// Thread-safe registry for active rooms.
pub struct RoomRegistry {
    settings: RoomSettings,
    rooms: Arc<RwLock<HashMap<String, RoomEntry>>>,
    next_instance: AtomicU64,
    progress_tx: Option<mpsc::Sender<KillNotice>>,
}

impl RoomRegistry {
    pub fn new(settings: RoomSettings, progress_tx: Option<mpsc::Sender<KillNotice>>) -> Self {
        Self {
            settings,
            rooms: Arc::new(RwLock::new(HashMap::new())),
            next_instance: AtomicU64::new(1),
            progress_tx,
        }
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    fn spawn_room(&self, gamemode: &str, walls: Arc<Walls>) -> RoomHandle {
        let instance = self.next_instance.fetch_add(1, Ordering::Relaxed);
        let gamemode: Arc<str> = Arc::from(gamemode);

        // Channel wiring for the room task.
        let (event_tx, event_rx) = mpsc::channel::<RoomEvent>(self.settings.event_channel_capacity);
        let (update_tx, _update_rx) =
            broadcast::channel::<RoomUpdate>(self.settings.update_broadcast_capacity);
        let (frame_tx, _frame_rx) =
            broadcast::channel::<SnapshotFrame>(self.settings.update_broadcast_capacity);
        let (frame_latest_tx, _frame_latest_rx) = watch::channel(SnapshotFrame::empty());
        let (kill_tx, _kill_rx) =
            broadcast::channel::<KillNotice>(self.settings.update_broadcast_capacity);
        let shutdown = Arc::new(Notify::new());

        let seed = rand::random::<u64>() ^ instance;
        let room = Room::new(walls.clone(), self.settings.tuning, seed);
        tokio::spawn(room_task(
            room,
            event_rx,
            RoomOutputs {
                update_tx: update_tx.clone(),
                kill_tx: kill_tx.clone(),
                progress_tx: self.progress_tx.clone(),
            },
            self.settings.timing,
            shutdown.clone(),
            gamemode.clone(),
            instance,
        ));

        RoomHandle {
            gamemode,
            instance,
            event_tx,
            update_tx,
            frame_tx,
            frame_latest_tx,
            kill_tx,
            walls,
            shutdown,
        }
    }

    /// Creates a room ahead of any connection, optionally with custom walls.
    pub async fn create_room(
        &self,
        gamemode: &str,
        walls: Option<Walls>,
    ) -> Result<RoomHandle, RoomError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(gamemode) {
            return Err(RoomError::AlreadyExists);
        }
        let walls = walls.map_or_else(|| self.settings.default_walls.clone(), Arc::new);
        let handle = self.spawn_room(gamemode, walls);
        rooms.insert(
            gamemode.to_string(),
            RoomEntry {
                handle: handle.clone(),
                connections: 0,
            },
        );
        info!(gamemode, instance = handle.instance, "room created");
        self.schedule_idle_teardown(gamemode.to_string(), handle.instance);
        Ok(handle)
    }

    // Joined rooms are torn down by `leave_room`; this only catches rooms
    // that never saw a connection.
    fn schedule_idle_teardown(&self, gamemode: String, instance: u64) {
        let rooms = Arc::clone(&self.rooms);
        let idle = self.settings.idle_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(idle).await;
            let mut rooms = rooms.write().await;
            let unused = rooms
                .get(&gamemode)
                .is_some_and(|entry| entry.handle.instance == instance && entry.connections == 0);
            if unused {
                if let Some(entry) = rooms.remove(&gamemode) {
                    entry.handle.shutdown.notify_one();
                    info!(gamemode, instance, idle_ms = idle.as_millis(), "idle room destroyed");
                }
            }
        });
    }

    /// Returns the room for `gamemode`, creating it on first join, and counts
    /// the connection. The flag is true when the room was just created.
    pub async fn join_room(&self, gamemode: &str) -> (RoomHandle, bool) {
        let mut rooms = self.rooms.write().await;
        if let Some(entry) = rooms.get_mut(gamemode) {
            entry.connections += 1;
            return (entry.handle.clone(), false);
        }

        let handle = self.spawn_room(gamemode, self.settings.default_walls.clone());
        rooms.insert(
            gamemode.to_string(),
            RoomEntry {
                handle: handle.clone(),
                connections: 1,
            },
        );
        info!(gamemode, instance = handle.instance, "room created on join");
        (handle, true)
    }

    /// Releases one connection; the room stops when none remain.
    pub async fn leave_room(&self, gamemode: &str, instance: u64) {
        let mut rooms = self.rooms.write().await;
        let Some(entry) = rooms.get_mut(gamemode) else {
            return;
        };
        // A newer room may have taken the name.
        if entry.handle.instance != instance {
            return;
        }
        entry.connections = entry.connections.saturating_sub(1);
        if entry.connections == 0 {
            if let Some(entry) = rooms.remove(gamemode) {
                entry.handle.shutdown.notify_one();
                info!(gamemode, instance, "room destroyed");
            }
        }
    }

    pub async fn get_room(&self, gamemode: &str) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.get(gamemode).map(|entry| entry.handle.clone())
    }

    /// Queues an event for a running room.
    pub async fn send_to(&self, gamemode: &str, event: RoomEvent) -> Result<(), RoomError> {
        let room = self.get_room(gamemode).await.ok_or(RoomError::NotFound)?;
        room.send(event).await
    }

    pub async fn connection_count(&self, gamemode: &str) -> Option<usize> {
        let rooms = self.rooms.read().await;
        rooms.get(gamemode).map(|entry| entry.connections)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
