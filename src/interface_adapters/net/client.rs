use crate::domain::ledger::{KillLedger, SeqGate};
use crate::domain::{EntityId, PlayerId};
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{
    ClientMessage, KillDto, MapDto, PlayerStatePayload, ServerMessage, SnapshotDto,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::rand_id;
use crate::use_cases::room::RoomTuning;
use crate::use_cases::{KillNotice, RoomEvent, RoomHandle, RoomRegistry, RoomUpdate, SnapshotFrame};

use axum::{
    Error, Json,
    extract::{
        Query, State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    RoomClosed,
    SnapshotsClosed,
    JoinRequired,
    JoinTimeout,
    ClosedBeforeJoin,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct RoomQuery {
    // The gamemode (room) the client wants to join.
    #[serde(default)]
    gamemode: Option<String>,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const MAX_GAMEMODE_LEN: usize = 64;
const JOIN_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
// Kill ids remembered per connection for duplicate suppression.
const KILL_LEDGER_CAPACITY: usize = 4096;

pub async fn snapshot_serializer(
    mut update_rx: broadcast::Receiver<RoomUpdate>,
    frame_tx: broadcast::Sender<SnapshotFrame>,
    frame_latest_tx: watch::Sender<SnapshotFrame>,
) {
    // Serialize each snapshot once and broadcast the shared bytes.
    loop {
        match update_rx.recv().await {
            Ok(update) => {
                let seq = update.seq;
                let msg = ServerMessage::Snapshot(SnapshotDto::from(update));
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, seq, "failed to serialize snapshot");
                        continue;
                    }
                };

                let frame = SnapshotFrame {
                    seq,
                    bytes: Utf8Bytes::from(txt),
                };
                // Store the latest frame for lag recovery and first contact.
                let _ = frame_latest_tx.send(frame.clone());
                let _ = frame_tx.send(frame);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "snapshot serializer lagged; skipping to latest");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("snapshot channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub fn spawn_room_serializer(room: &RoomHandle) {
    let span = info_span!("serializer", gamemode = %room.gamemode, instance = room.instance);
    tokio::spawn(
        snapshot_serializer(
            room.update_tx.subscribe(),
            room.frame_tx.clone(),
            room.frame_latest_tx.clone(),
        )
        .instrument(span),
    );
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoomQuery>,
) -> impl IntoResponse {
    let gamemode = query
        .gamemode
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| state.default_gamemode.to_string());

    if gamemode.len() > MAX_GAMEMODE_LEN {
        // Keep rejections consistent with the JSON error schema.
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("gamemode too long")),
        )
            .into_response();
    }

    let registry = state.room_registry.clone();
    ws.on_upgrade(move |socket| {
        let conn_id = rand_id();
        let span = info_span!("conn", conn_id, gamemode = %gamemode, player_id = tracing::field::Empty);
        handle_socket(socket, gamemode, registry).instrument(span)
    })
}

async fn handle_socket(mut socket: WebSocket, gamemode: String, registry: Arc<RoomRegistry>) {
    let mut ctx = match bootstrap_connection(&mut socket, &gamemode, registry).await {
        Ok(ctx) => ctx,
        Err(NetError::ClosedBeforeJoin) => {
            info!("client disconnected before join handshake");
            return;
        }
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = send_close_with_reason(&mut socket, close_code::POLICY, "bootstrap failed").await;
            return;
        }
    };

    tracing::Span::current().record("player_id", ctx.player_id);
    info!(
        player_id = ctx.player_id,
        instance = ctx.room.instance,
        name = %ctx.name,
        "client connected"
    );

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

#[derive(Debug, Default)]
struct ConnStats {
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
    // Count lag recovery snapshots sent to this client.
    lag_recovery_count: u64,
    stale_frames: u64,
    kills_sent: u64,
}

struct ConnCtx {
    pub player_id: PlayerId,
    pub name: String,
    pub room: RoomHandle,
    // Registry access for releasing the room on disconnect.
    pub registry: Arc<RoomRegistry>,
    pub tuning: RoomTuning,
    pub frame_rx: broadcast::Receiver<SnapshotFrame>,
    pub frame_latest_rx: watch::Receiver<SnapshotFrame>,
    pub kill_rx: broadcast::Receiver<KillNotice>,
    // Drops frames that are not newer than the last one sent.
    pub seq_gate: SeqGate,
    pub kill_ledger: KillLedger<EntityId>,
    pub stats: ConnStats,

    pub last_event_full_log: Instant,
    pub last_snapshot_lag_log: Instant,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

#[derive(Debug)]
struct JoinHandshake {
    payload: PlayerStatePayload,
    bytes_in: u64,
    msgs_in: u64,
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    gamemode: &str,
    registry: Arc<RoomRegistry>,
) -> Result<ConnCtx, NetError> {
    // The very first meaningful client message must be a join.
    let join = match timeout(JOIN_HANDSHAKE_TIMEOUT, read_join_handshake(socket)).await {
        Ok(result) => result?,
        Err(_) => {
            let _ = send_close_with_reason(socket, close_code::POLICY, "join timeout").await;
            return Err(NetError::JoinTimeout);
        }
    };

    let (room, created) = registry.join_room(gamemode).await;
    if created {
        spawn_room_serializer(&room);
    }

    // Subscribe before any further awaits so no frame or kill slips past.
    let frame_rx = room.frame_tx.subscribe();
    let frame_latest_rx = room.frame_latest_tx.subscribe();
    let kill_rx = room.kill_tx.subscribe();

    let player_id = rand_id();
    let tuning = registry.settings().tuning;
    let state = join.payload.into_state(&tuning.player, &room.walls);
    let name = state.name.clone();

    let identity_msg = ServerMessage::Identity {
        player_id: player_id.to_string(),
    };
    let identity_bytes = match send_message(socket, &identity_msg).await {
        Ok(bytes) => bytes,
        Err(err) => {
            registry.leave_room(gamemode, room.instance).await;
            return Err(err);
        }
    };

    // Join happens before the first snapshot so it can include the new player.
    // If anything after Join fails, compensate with Leave.
    if let Err(err) = room.send(RoomEvent::Join { player_id, state }).await {
        registry.leave_room(gamemode, room.instance).await;
        warn!(error = ?err, "room closed during join");
        return Err(NetError::RoomClosed);
    }

    let mut seq_gate = SeqGate::default();
    let mut msgs_out: u64 = 1;
    let mut bytes_out = identity_bytes as u64;
    let initial = async {
        let map_msg = ServerMessage::Map(MapDto::from(room.walls.as_ref()));
        bytes_out += send_message(socket, &map_msg).await? as u64;
        msgs_out += 1;

        // Clone as soon as we borrow to avoid holding the watch lock across an await.
        let latest = frame_latest_rx.borrow().clone();
        if !latest.bytes.is_empty() && seq_gate.accept(latest.seq) {
            let len = latest.bytes.len();
            socket.send(Message::Text(latest.bytes)).await?;
            msgs_out += 1;
            bytes_out += len as u64;
        }
        Ok::<(), NetError>(())
    }
    .await;

    if let Err(err) = initial {
        let _ = room.send(RoomEvent::Leave { player_id }).await;
        registry.leave_room(gamemode, room.instance).await;
        return Err(err);
    }

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        player_id,
        name,
        room,
        registry,
        tuning,
        frame_rx,
        frame_latest_rx,
        kill_rx,
        seq_gate,
        kill_ledger: KillLedger::new(KILL_LEDGER_CAPACITY),
        stats: ConnStats {
            msgs_in: join.msgs_in,
            bytes_in: join.bytes_in,
            msgs_out,
            bytes_out,
            ..ConnStats::default()
        },

        last_event_full_log: now,
        last_snapshot_lag_log: now,
        last_invalid_input_log: now,

        close_frame: None,
    })
}

enum LoopControl {
    Continue,
    Disconnect,
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

async fn read_join_handshake(socket: &mut WebSocket) -> Result<JoinHandshake, NetError> {
    loop {
        let Some(incoming) = socket.recv().await else {
            return Err(NetError::ClosedBeforeJoin);
        };

        let message = incoming.map_err(NetError::Ws)?;
        match message {
            Message::Text(text) => {
                let bytes_in = text.len() as u64;
                return match ClientMessage::parse(&text) {
                    Ok(ClientMessage::Join(payload)) => Ok(JoinHandshake {
                        payload,
                        bytes_in,
                        msgs_in: 1,
                    }),
                    Ok(ClientMessage::Disconnecting) => Err(NetError::ClosedBeforeJoin),
                    Ok(_) => {
                        let _ = send_close_with_reason(socket, close_code::POLICY, "join required")
                            .await;
                        Err(NetError::JoinRequired)
                    }
                    Err(_) => {
                        let _ = send_close_with_reason(
                            socket,
                            close_code::POLICY,
                            "invalid join payload",
                        )
                        .await;
                        Err(NetError::JoinRequired)
                    }
                };
            }
            Message::Binary(_) => {
                let _ = send_close_with_reason(
                    socket,
                    close_code::UNSUPPORTED,
                    "binary messages not supported",
                )
                .await;
                return Err(NetError::JoinRequired);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Err(NetError::ClosedBeforeJoin),
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

// Queue one event for the room without blocking the socket loop.
fn queue_room_event(
    player_id: PlayerId,
    event_tx: &mpsc::Sender<RoomEvent>,
    event: RoomEvent,
    last_event_full_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match event_tx.try_send(event) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_evt)) => {
            if should_log(last_event_full_log) {
                warn!(player_id, "room event queue full; dropping message");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_evt)) => Err(NetError::RoomClosed),
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;
    let mut fatal: Option<NetError> = None;

    loop {
        // disconnect becomes true on error
        let disconnect: bool = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(incoming, ctx) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            frame = ctx.frame_rx.recv() => {
                match frame {
                    Ok(frame) => matches!(
                        forward_frame(frame, socket, ctx).await,
                        LoopControl::Disconnect
                    ),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(&mut ctx.last_snapshot_lag_log) {
                            warn!(missed = n, "snapshots lagged; sending latest");
                        }

                        // Resync strategy: send the latest serialized snapshot.
                        let latest = ctx.frame_latest_rx.borrow().clone();
                        if latest.bytes.is_empty() {
                            false
                        } else {
                            ctx.stats.lag_recovery_count += 1;
                            matches!(
                                forward_frame(latest, socket, ctx).await,
                                LoopControl::Disconnect
                            )
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::SnapshotsClosed);
                        true
                    }
                }
            }

            kill = ctx.kill_rx.recv() => {
                match kill {
                    Ok(notice) => matches!(
                        forward_kill(notice, socket, ctx).await,
                        LoopControl::Disconnect
                    ),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Lost kills cannot be replayed; the progress store still has them.
                        warn!(player_id, missed = n, "kill notices lagged");
                        false
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::RoomClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(ctx).await {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.stats.msgs_in += 1;
                ctx.stats.bytes_in += text.len() as u64;

                match ClientMessage::parse(&text) {
                    Ok(msg) => handle_client_message(msg, ctx),
                    Err(parse_err) => {
                        ctx.stats.invalid_json += 1;
                        if should_log(&mut ctx.last_invalid_input_log) {
                            warn!(
                                player_id,
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if ctx.stats.invalid_json > MAX_INVALID_JSON {
                            ctx.close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }
                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(player_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(player_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

fn handle_client_message(msg: ClientMessage, ctx: &mut ConnCtx) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    let event = match msg {
        // A repeated join respawns the player in place.
        ClientMessage::Join(payload) => RoomEvent::Join {
            player_id,
            state: payload.into_state(&ctx.tuning.player, &ctx.room.walls),
        },
        ClientMessage::State(payload) => RoomEvent::State {
            player_id,
            state: payload.into_state(&ctx.tuning.player, &ctx.room.walls),
        },
        ClientMessage::Hit(payload) => {
            let Some(hit) = payload.validate() else {
                debug!(player_id, "incomplete hit ignored");
                return Ok(LoopControl::Continue);
            };
            RoomEvent::Hit {
                player_id,
                kind: hit.kind,
                mob_id: hit.mob_id,
                damage: hit.damage,
                x: hit.x,
                y: hit.y,
            }
        }
        ClientMessage::Shoot(payloads) => {
            let bullets: Vec<_> = payloads
                .into_iter()
                .filter_map(|b| b.into_spec(&ctx.tuning.bullet))
                .collect();
            if bullets.is_empty() {
                return Ok(LoopControl::Continue);
            }
            RoomEvent::Shoot { player_id, bullets }
        }
        ClientMessage::Square(payload) => {
            let Some(trap) = payload.into_spec(&ctx.tuning.trap) else {
                debug!(player_id, "square without position ignored");
                return Ok(LoopControl::Continue);
            };
            RoomEvent::Square { player_id, trap }
        }
        ClientMessage::ClearSquares => RoomEvent::ClearSquares { player_id },
        ClientMessage::Disconnecting => {
            ctx.close_frame = Some(CloseFrame {
                code: close_code::NORMAL,
                reason: "bye".into(),
            });
            return Ok(LoopControl::Disconnect);
        }
    };

    queue_room_event(
        player_id,
        &ctx.room.event_tx,
        event,
        &mut ctx.last_event_full_log,
    )
}

async fn forward_frame(frame: SnapshotFrame, socket: &mut WebSocket, ctx: &mut ConnCtx) -> LoopControl {
    if !ctx.seq_gate.accept(frame.seq) {
        ctx.stats.stale_frames += 1;
        return LoopControl::Continue;
    }

    let bytes_len = frame.bytes.len();
    match socket
        .send(Message::Text(frame.bytes))
        .await
        .map_err(NetError::Ws)
    {
        Ok(()) => {
            ctx.stats.msgs_out += 1;
            ctx.stats.bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send snapshot");
            LoopControl::Disconnect
        }
    }
}

async fn forward_kill(notice: KillNotice, socket: &mut WebSocket, ctx: &mut ConnCtx) -> LoopControl {
    // Kills are unicast: every connection sees the room feed but keeps only its own.
    if notice.player_id != ctx.player_id || notice.room_instance != ctx.room.instance {
        return LoopControl::Continue;
    }
    if !ctx.kill_ledger.record(notice.payload.mob_id) {
        debug!(mob_id = notice.payload.mob_id, "duplicate kill suppressed");
        return LoopControl::Continue;
    }

    let msg = ServerMessage::Kill(KillDto::from(&notice.payload));
    match send_message(socket, &msg).await {
        Ok(bytes) => {
            ctx.stats.msgs_out += 1;
            ctx.stats.bytes_out += bytes as u64;
            ctx.stats.kills_sent += 1;
            LoopControl::Continue
        }
        Err(err) => {
            warn!(error = ?err, "failed to send kill");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(ctx: &ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;
    // Remove only this player's entities; the room keeps running for others.
    let leave = ctx
        .room
        .send(RoomEvent::Leave { player_id })
        .await
        .map_err(|_| NetError::RoomClosed);

    ctx.registry
        .leave_room(&ctx.room.gamemode, ctx.room.instance)
        .await;

    let stats = &ctx.stats;
    debug!(
        player_id,
        msgs_in = stats.msgs_in,
        msgs_out = stats.msgs_out,
        bytes_in = stats.bytes_in,
        bytes_out = stats.bytes_out,
        invalid_json = stats.invalid_json,
        lag_recovery_count = stats.lag_recovery_count,
        stale_frames = stats.stale_frames,
        kills_sent = stats.kills_sent,
        "connection stats"
    );
    info!(player_id, "client disconnected");
    leave
}
