// Framework bootstrap for the arena server runtime.

use crate::domain::ports::ProgressSink;
use crate::domain::tuning::world::WorldTuning;
use crate::domain::walls::Walls;
use crate::frameworks::config;
use crate::interface_adapters::clients::progress::ProgressClient;
use crate::interface_adapters::net::{create_room_handler, spawn_mob_handler, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::game::RoomTiming;
use crate::use_cases::progress::progress_task;
use crate::use_cases::room::RoomTuning;
use crate::use_cases::{RoomRegistry, RoomSettings};

use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::mpsc;
use tracing::Instrument;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state()?;
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/rooms", post(create_room_handler))
        .route("/rooms/{gamemode}/mobs", post(spawn_mob_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn room_tuning() -> RoomTuning {
    let mut tuning = RoomTuning::default();
    tuning.spawn.target_population = config::mob_target_population();
    tuning.spawn.batch = config::mob_spawn_batch();
    tuning
}

// Starts the kill reporter when a progress store is configured.
fn spawn_progress_reporter() -> Result<Option<mpsc::Sender<crate::use_cases::KillNotice>>> {
    let Some(base_url) = config::progress_service_url() else {
        tracing::info!("progress store not configured; kills are not credited");
        return Ok(None);
    };

    let timeout = config::progress_timeout();
    let client = ProgressClient::new(base_url.clone(), timeout)
        .map_err(|e| std::io::Error::other(format!("failed to initialize progress client: {e}")))?;
    tracing::debug!(
        progress_base_url = %base_url,
        progress_timeout_ms = timeout.as_millis(),
        "progress client configured"
    );

    let (tx, rx) = mpsc::channel(config::PROGRESS_CHANNEL_CAPACITY);
    let sink: Arc<dyn ProgressSink> = Arc::new(client);
    tokio::spawn(
        progress_task(rx, sink, config::PROGRESS_LEDGER_CAPACITY)
            .instrument(tracing::info_span!("progress")),
    );
    Ok(Some(tx))
}

fn build_state() -> Result<Arc<AppState>> {
    let progress_tx = spawn_progress_reporter()?;

    let timing = RoomTiming {
        tick_interval: config::tick_interval(),
        spawn_interval: config::spawn_interval(),
        snapshot_every_ticks: config::snapshot_every_ticks(),
    };
    tracing::debug!(
        tick_ms = timing.tick_interval.as_millis(),
        spawn_ms = timing.spawn_interval.as_millis(),
        snapshot_every_ticks = timing.snapshot_every_ticks,
        "room timing configured"
    );

    // Rooms are created lazily on first join and dropped on last leave.
    let room_registry = Arc::new(RoomRegistry::new(
        RoomSettings {
            event_channel_capacity: config::EVENT_CHANNEL_CAPACITY,
            update_broadcast_capacity: config::UPDATE_BROADCAST_CAPACITY,
            timing,
            tuning: room_tuning(),
            default_walls: Arc::new(Walls::default_map(&WorldTuning::default())),
            idle_timeout: config::room_idle_timeout(),
        },
        progress_tx,
    ));

    Ok(Arc::new(AppState {
        room_registry,
        default_gamemode: Arc::from(config::DEFAULT_GAMEMODE),
    }))
}
