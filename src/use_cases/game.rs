use super::room::Room;
use super::types::{KillNotice, RoomEvent, RoomUpdate};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, info_span, warn, Instrument};

/// Cadence of a room's two timers and its snapshot rate.
#[derive(Debug, Clone, Copy)]
pub struct RoomTiming {
    pub tick_interval: Duration,
    pub spawn_interval: Duration,
    /// Emit a snapshot every N physics ticks.
    pub snapshot_every_ticks: u64,
}

/// Outbound channels a room task publishes into.
pub struct RoomOutputs {
    pub update_tx: broadcast::Sender<RoomUpdate>,
    pub kill_tx: broadcast::Sender<KillNotice>,
    /// Optional feed into the progress reporter.
    pub progress_tx: Option<mpsc::Sender<KillNotice>>,
}

pub async fn room_task(
    room: Room,
    events_rx: mpsc::Receiver<RoomEvent>,
    outputs: RoomOutputs,
    timing: RoomTiming,
    shutdown: Arc<Notify>,
    gamemode: Arc<str>,
    instance: u64,
) {
    let span = info_span!("room", gamemode = %gamemode, instance);
    run_room(room, events_rx, outputs, timing, shutdown, gamemode, instance)
        .instrument(span)
        .await
}

async fn run_room(
    mut room: Room,
    mut events_rx: mpsc::Receiver<RoomEvent>,
    outputs: RoomOutputs,
    timing: RoomTiming,
    shutdown: Arc<Notify>,
    gamemode: Arc<str>,
    instance: u64,
) {
    // Drive the fixed-step loop and the slower replenishment timer from one task.
    let mut tick = tokio::time::interval(timing.tick_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut spawn = tokio::time::interval(timing.spawn_interval);
    spawn.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let dt = timing.tick_interval.as_secs_f32();
    let every = timing.snapshot_every_ticks.max(1);
    let mut last_progress_full_log = std::time::Instant::now() - Duration::from_secs(2);

    info!("room started");
    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                // Exit cleanly when the last connection leaves.
                break;
            }
            _ = spawn.tick() => {
                let spawned = room.spawn_cycle();
                if spawned > 0 {
                    debug!(spawned, "spawn cycle");
                }
            }
            _ = tick.tick() => {
                let mut kills = Vec::new();
                while let Ok(ev) = events_rx.try_recv() {
                    kills.extend(room.apply_event(ev));
                }
                kills.extend(room.step(dt));

                if room.tick_count() % every == 0 {
                    let _ = outputs.update_tx.send(room.snapshot());
                }

                for kill in kills {
                    let notice = KillNotice {
                        room_instance: instance,
                        gamemode: gamemode.clone(),
                        player_id: kill.player_id,
                        payload: kill.payload,
                    };
                    if let Some(progress_tx) = &outputs.progress_tx {
                        if progress_tx.try_send(notice.clone()).is_err()
                            && last_progress_full_log.elapsed() >= Duration::from_secs(2)
                        {
                            last_progress_full_log = std::time::Instant::now();
                            warn!("progress queue unavailable; dropping kill credit");
                        }
                    }
                    // No receivers just means nobody is connected right now.
                    let _ = outputs.kill_tx.send(notice);
                }
            }
        }
    }
    info!("room stopped");
}
