// Wire protocol DTOs and conversions for public arena messages.
// Internal service-to-service DTOs live with their routes in `net::internal`.

use crate::domain::geometry::{Rect, Segment};
use crate::domain::state::{BodyKind, Loadout, PlayerState, TankKind};
use crate::domain::systems::projectiles::BulletSpec;
use crate::domain::systems::traps::TrapSpec;
use crate::domain::tuning::player::PlayerTuning;
use crate::domain::tuning::projectile::{BulletTuning, TrapTuning};
use crate::domain::walls::{Obstacles, Walls};
use crate::domain::{
    BulletSnapshot, DroneSnapshot, EntityId, KillPayload, MobKind, MobSnapshot, PlayerSnapshot,
    Rarity, TrapSnapshot,
};
use crate::use_cases::RoomUpdate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Upper bound on bullets accepted from a single `shoot` message.
pub const MAX_BULLETS_PER_SHOT: usize = 32;
const MAX_NAME_LEN: usize = 32;
const MAX_LEVEL: u32 = 1_000;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    // Assigned identity for the connection after Join is accepted.
    #[serde(rename_all = "camelCase")]
    Identity { player_id: String },
    // Static wall geometry, sent once per connection.
    Map(MapDto),
    // Sequence-numbered state of the room.
    Snapshot(SnapshotDto),
    // Unicast to the credited player only.
    Kill(KillDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Join(PlayerStatePayload),
    State(PlayerStatePayload),
    Hit(HitPayload),
    Shoot(Vec<BulletPayload>),
    Square(SquarePayload),
    ClearSquares,
    Disconnecting,
}

#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// Not a JSON object with a string `type`.
    Malformed(String),
    /// Well-formed envelope naming a message we do not handle.
    UnknownType(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Malformed(e) => write!(f, "malformed message: {e}"),
            ParseError::UnknownType(t) => write!(f, "unknown message type {t:?}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

// Payload bodies never fail: anything unusable falls back to defaults.
fn payload<T: DeserializeOwned + Default>(data: Value) -> T {
    serde_json::from_value(data).unwrap_or_default()
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<ClientMessage, ParseError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| ParseError::Malformed(e.to_string()))?;

        let msg = match envelope.kind.as_str() {
            "join" => ClientMessage::Join(payload(envelope.data)),
            "state" => ClientMessage::State(payload(envelope.data)),
            "hit" => ClientMessage::Hit(payload(envelope.data)),
            "shoot" => {
                let bullets = match envelope.data {
                    Value::Array(items) => items
                        .into_iter()
                        .take(MAX_BULLETS_PER_SHOT)
                        .map(payload)
                        .collect(),
                    single => vec![payload(single)],
                };
                ClientMessage::Shoot(bullets)
            }
            "square" => ClientMessage::Square(payload(envelope.data)),
            "clearSquares" => ClientMessage::ClearSquares,
            "disconnecting" => ClientMessage::Disconnecting,
            other => return Err(ParseError::UnknownType(other.to_string())),
        };
        Ok(msg)
    }
}

// Field-level leniency: a wrong-typed value becomes the field's default
// instead of failing the whole payload.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn finite_or(value: Option<f32>, default: f32) -> f32 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

fn positive_or(value: Option<f32>, default: f32) -> f32 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

fn rarity_or_common(name: Option<&str>) -> Rarity {
    name.and_then(Rarity::parse).unwrap_or_default()
}

/// Player transform and loadout, shared by `join` and `state`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerStatePayload {
    #[serde(deserialize_with = "lenient")]
    pub x: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub y: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub size: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub level: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub max_hp: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub tank: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub tank_rarity: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub body: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub body_rarity: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub aim_x: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub aim_y: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
}

impl PlayerStatePayload {
    /// Validates the payload into a player state confined to the map and
    /// pushed clear of walls.
    pub fn into_state(self, tuning: &PlayerTuning, walls: &Walls) -> PlayerState {
        let size = positive_or(self.size, tuning.default_size);
        let mut x = finite_or(self.x, walls.width / 2.0);
        let mut y = finite_or(self.y, walls.height / 2.0);
        walls.clamp_to_bounds(&mut x, &mut y, size);
        walls.resolve_circle(&mut x, &mut y, size);

        let aim = match (self.aim_x, self.aim_y) {
            (Some(ax), Some(ay)) if ax.is_finite() && ay.is_finite() => Some((ax, ay)),
            _ => None,
        };
        let name: String = self
            .name
            .unwrap_or_default()
            .trim()
            .chars()
            .take(MAX_NAME_LEN)
            .collect();

        PlayerState {
            x,
            y,
            size,
            level: self.level.unwrap_or(1).clamp(1, MAX_LEVEL),
            max_hp: positive_or(self.max_hp, tuning.default_max_hp),
            loadout: Loadout {
                tank: self
                    .tank
                    .as_deref()
                    .and_then(TankKind::parse)
                    .unwrap_or_default(),
                tank_rarity: rarity_or_common(self.tank_rarity.as_deref()),
                body: self
                    .body
                    .as_deref()
                    .and_then(BodyKind::parse)
                    .unwrap_or_default(),
                body_rarity: rarity_or_common(self.body_rarity.as_deref()),
            },
            aim,
            name,
        }
    }
}

/// Client-reported damage to a mob.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HitPayload {
    #[serde(deserialize_with = "lenient")]
    pub mob_id: Option<EntityId>,
    #[serde(deserialize_with = "lenient")]
    pub mob_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub damage: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub x: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub y: Option<f32>,
}

/// A hit that names an existing mob kind and carries usable numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidHit {
    pub kind: MobKind,
    pub mob_id: EntityId,
    pub damage: f32,
    pub x: f32,
    pub y: f32,
}

impl HitPayload {
    pub fn validate(self) -> Option<ValidHit> {
        let kind = self.mob_type.as_deref().and_then(MobKind::parse)?;
        let damage = self.damage.filter(|d| d.is_finite() && *d > 0.0)?;
        Some(ValidHit {
            kind,
            mob_id: self.mob_id?,
            damage,
            x: self.x.filter(|v| v.is_finite())?,
            y: self.y.filter(|v| v.is_finite())?,
        })
    }
}

/// One bullet as described by the firing client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BulletPayload {
    #[serde(deserialize_with = "lenient")]
    pub x: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub y: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub angle: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub speed: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub damage: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub size: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub weight: Option<f32>,
    /// Milliseconds.
    #[serde(deserialize_with = "lenient")]
    pub lifetime: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub penetration: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub max_range: Option<f32>,
}

impl BulletPayload {
    /// Fills gaps from tuning; a bullet without a position is dropped.
    pub fn into_spec(self, tuning: &BulletTuning) -> Option<BulletSpec> {
        let x = self.x.filter(|v| v.is_finite())?;
        let y = self.y.filter(|v| v.is_finite())?;
        let mut spec = BulletSpec::basic(x, y, finite_or(self.angle, 0.0), tuning);
        spec.speed = positive_or(self.speed, spec.speed);
        spec.damage = positive_or(self.damage, spec.damage);
        spec.size = positive_or(self.size, spec.size);
        spec.weight = positive_or(self.weight, spec.weight);
        spec.lifetime_ms = positive_or(self.lifetime, spec.lifetime_ms).min(tuning.max_lifetime_ms);
        spec.penetration = self.penetration.filter(|p| *p > 0);
        spec.max_range = self.max_range.filter(|r| r.is_finite() && *r > 0.0);
        Some(spec)
    }
}

/// A trap (square) as placed by the client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SquarePayload {
    #[serde(deserialize_with = "lenient")]
    pub x: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub y: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub vx: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub vy: Option<f32>,
    /// Damage per second.
    #[serde(deserialize_with = "lenient")]
    pub damage: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub hp: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub size: Option<f32>,
    /// Milliseconds.
    #[serde(deserialize_with = "lenient")]
    pub duration: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub rarity: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub weight: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub is_riot: Option<bool>,
    /// Per-owner trap cap carried by the weapon.
    #[serde(deserialize_with = "lenient")]
    pub cap: Option<usize>,
}

impl SquarePayload {
    pub fn into_spec(self, tuning: &TrapTuning) -> Option<TrapSpec> {
        Some(TrapSpec {
            x: self.x.filter(|v| v.is_finite())?,
            y: self.y.filter(|v| v.is_finite())?,
            vx: finite_or(self.vx, 0.0),
            vy: finite_or(self.vy, 0.0),
            damage: positive_or(self.damage, 10.0),
            hp: positive_or(self.hp, 50.0),
            size: positive_or(self.size, 20.0),
            duration_ms: positive_or(self.duration, tuning.default_duration_ms),
            rarity: rarity_or_common(self.rarity.as_deref()),
            weight: positive_or(self.weight, 10.0),
            is_riot: self.is_riot.unwrap_or(false),
            cap: self.cap,
        })
    }
}

/// Wall geometry in the representation the room uses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDto {
    pub width: f32,
    pub height: f32,
    pub wall_half_width: Option<f32>,
    pub segments: Vec<SegmentDto>,
    pub rects: Vec<RectDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentDto {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl From<&Segment> for SegmentDto {
    fn from(s: &Segment) -> Self {
        Self {
            x1: s.x1,
            y1: s.y1,
            x2: s.x2,
            y2: s.y2,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RectDto {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl From<&Rect> for RectDto {
    fn from(r: &Rect) -> Self {
        Self {
            x: r.x,
            y: r.y,
            w: r.w,
            h: r.h,
        }
    }
}

impl From<&Walls> for MapDto {
    fn from(walls: &Walls) -> Self {
        let (wall_half_width, segments, rects) = match &walls.obstacles {
            Obstacles::Segments {
                segments,
                half_width,
            } => (
                Some(*half_width),
                segments.iter().map(SegmentDto::from).collect(),
                Vec::new(),
            ),
            Obstacles::Rects(rects) => (None, Vec::new(), rects.iter().map(RectDto::from).collect()),
        };
        Self {
            width: walls.width,
            height: walls.height,
            wall_half_width,
            segments,
            rects,
        }
    }
}

/// Snapshot of a room sent to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDto {
    pub seq: u64,
    pub tick: u64,
    pub mobs: MobsDto,
    pub bullets: Vec<BulletDto>,
    pub squares: Vec<SquareDto>,
    pub drones: Vec<DroneDto>,
    pub players: Vec<PlayerDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MobsDto {
    pub food: Vec<MobDto>,
    pub beetle: Vec<MobDto>,
}

impl From<RoomUpdate> for SnapshotDto {
    fn from(update: RoomUpdate) -> Self {
        Self {
            seq: update.seq,
            tick: update.tick,
            mobs: MobsDto {
                food: update.food.iter().map(MobDto::from).collect(),
                beetle: update.beetles.iter().map(MobDto::from).collect(),
            },
            bullets: update.bullets.iter().map(BulletDto::from).collect(),
            squares: update.traps.iter().map(SquareDto::from).collect(),
            drones: update.drones.iter().map(DroneDto::from).collect(),
            players: update.players.iter().map(PlayerDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobDto {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub rarity: &'static str,
    pub hp: f32,
    pub max_hp: f32,
    pub size: f32,
}

impl From<&MobSnapshot> for MobDto {
    fn from(m: &MobSnapshot) -> Self {
        Self {
            id: m.id,
            x: m.x,
            y: m.y,
            angle: m.angle,
            rarity: m.rarity.as_str(),
            hp: m.hp,
            max_hp: m.max_hp,
            size: m.size,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletDto {
    pub id: EntityId,
    pub owner_id: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub size: f32,
}

impl From<&BulletSnapshot> for BulletDto {
    fn from(b: &BulletSnapshot) -> Self {
        Self {
            id: b.id,
            owner_id: b.owner_id.to_string(),
            x: b.x,
            y: b.y,
            angle: b.angle,
            size: b.size,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SquareDto {
    pub id: EntityId,
    pub owner_id: String,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub rarity: &'static str,
}

impl From<&TrapSnapshot> for SquareDto {
    fn from(t: &TrapSnapshot) -> Self {
        Self {
            id: t.id,
            owner_id: t.owner_id.to_string(),
            x: t.x,
            y: t.y,
            rotation: t.rotation,
            size: t.size,
            hp: t.hp,
            max_hp: t.max_hp,
            rarity: t.rarity.as_str(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneDto {
    pub id: EntityId,
    pub owner_id: String,
    pub family: &'static str,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub recharging: bool,
}

impl From<&DroneSnapshot> for DroneDto {
    fn from(d: &DroneSnapshot) -> Self {
        Self {
            id: d.id,
            owner_id: d.owner_id.to_string(),
            family: d.family.as_str(),
            x: d.x,
            y: d.y,
            size: d.size,
            hp: d.hp,
            max_hp: d.max_hp,
            recharging: d.recharging,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub level: u32,
    pub hp: f32,
    pub max_hp: f32,
    pub alive: bool,
}

impl From<&PlayerSnapshot> for PlayerDto {
    fn from(p: &PlayerSnapshot) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            x: p.x,
            y: p.y,
            size: p.size,
            level: p.level,
            hp: p.hp,
            max_hp: p.max_hp,
            alive: p.alive,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KillDto {
    pub mob_id: EntityId,
    pub mob_type: &'static str,
    pub rarity: &'static str,
    pub max_hp: f32,
    pub x: f32,
    pub y: f32,
    pub stars: u32,
    pub drop: Option<&'static str>,
}

impl From<&KillPayload> for KillDto {
    fn from(k: &KillPayload) -> Self {
        Self {
            mob_id: k.mob_id,
            mob_type: k.kind.as_str(),
            rarity: k.rarity.as_str(),
            max_hp: k.max_hp,
            x: k.x,
            y: k.y,
            stars: k.stars,
            drop: k.drop.map(Rarity::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tuning::world::WorldTuning;

    fn walls() -> Walls {
        Walls::default_map(&WorldTuning::default())
    }

    #[test]
    fn when_fields_have_wrong_types_then_they_fall_back_to_defaults() {
        let text = r#"{"type":"join","data":{"x":"left","y":300,"size":null,"level":"9","name":42,"tank":"overlord","tankRarity":"epic"}}"#;

        let Ok(ClientMessage::Join(payload)) = ClientMessage::parse(text) else {
            panic!("join should parse");
        };
        let tuning = PlayerTuning::default();
        let state = payload.into_state(&tuning, &walls());

        assert_eq!(state.x, 5_000.0);
        assert_eq!(state.y, 300.0);
        assert_eq!(state.size, tuning.default_size);
        assert_eq!(state.level, 1);
        assert_eq!(state.name, "");
        assert_eq!(state.loadout.tank, TankKind::Overlord);
        assert_eq!(state.loadout.tank_rarity, Rarity::Epic);
    }

    #[test]
    fn when_position_is_outside_map_then_it_is_clamped() {
        let payload = PlayerStatePayload {
            x: Some(-500.0),
            y: Some(1.0e9),
            size: Some(10.0),
            ..PlayerStatePayload::default()
        };

        let state = payload.into_state(&PlayerTuning::default(), &walls());

        assert_eq!(state.x, 10.0);
        assert_eq!(state.y, 10_000.0 - 10.0);
    }

    #[test]
    fn when_position_lands_on_a_wall_then_the_body_is_pushed_clear() {
        let walls = walls();
        assert!(walls.point_in_wall(3_000.0, 2_000.0));
        let payload = PlayerStatePayload {
            x: Some(3_000.0),
            y: Some(2_000.0),
            size: Some(20.0),
            ..PlayerStatePayload::default()
        };

        let state = payload.into_state(&PlayerTuning::default(), &walls);

        assert!(!walls.point_in_wall(state.x, state.y));
        assert!((state.y - 2_000.0).abs() >= WorldTuning::default().wall_half_width + 20.0 - 0.5);
    }

    #[test]
    fn when_shoot_carries_one_or_many_bullets_then_both_parse() {
        let single = ClientMessage::parse(r#"{"type":"shoot","data":{"x":1,"y":2}}"#);
        let many = ClientMessage::parse(r#"{"type":"shoot","data":[{"x":1,"y":2},{"x":3,"y":4}]}"#);

        assert!(matches!(single, Ok(ClientMessage::Shoot(ref b)) if b.len() == 1));
        assert!(matches!(many, Ok(ClientMessage::Shoot(ref b)) if b.len() == 2));
    }

    #[test]
    fn when_bullet_lifetime_is_huge_then_it_is_capped() {
        let tuning = BulletTuning::default();
        let payload = BulletPayload {
            x: Some(0.0),
            y: Some(0.0),
            lifetime: Some(1.0e7),
            penetration: Some(3),
            ..BulletPayload::default()
        };

        let spec = payload.into_spec(&tuning).expect("positioned bullet");

        assert_eq!(spec.lifetime_ms, tuning.max_lifetime_ms);
        assert_eq!(spec.penetration, Some(3));
        assert_eq!(spec.speed, tuning.default_speed);
    }

    #[test]
    fn when_hit_names_unknown_kind_then_it_is_rejected() {
        let Ok(ClientMessage::Hit(hit)) =
            ClientMessage::parse(r#"{"type":"hit","data":{"mobId":3,"mobType":"dragon","damage":5,"x":0,"y":0}}"#)
        else {
            panic!("hit should parse");
        };

        assert!(hit.validate().is_none());
    }

    #[test]
    fn when_hit_is_complete_then_it_validates() {
        let Ok(ClientMessage::Hit(hit)) =
            ClientMessage::parse(r#"{"type":"hit","data":{"mobId":3,"mobType":"beetle","damage":5,"x":1,"y":2}}"#)
        else {
            panic!("hit should parse");
        };

        let hit = hit.validate().expect("valid hit");
        assert_eq!(hit.kind, MobKind::Beetle);
        assert_eq!(hit.mob_id, 3);
    }

    #[test]
    fn when_type_is_unknown_or_frame_is_not_json_then_parse_fails() {
        assert_eq!(
            ClientMessage::parse(r#"{"type":"dance"}"#),
            Err(ParseError::UnknownType("dance".into()))
        );
        assert!(matches!(
            ClientMessage::parse("not json"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn when_clear_squares_has_no_data_then_it_parses() {
        assert_eq!(
            ClientMessage::parse(r#"{"type":"clearSquares"}"#),
            Ok(ClientMessage::ClearSquares)
        );
    }

    #[test]
    fn when_server_message_serializes_then_it_uses_type_and_data() {
        let msg = ServerMessage::Identity {
            player_id: "17".into(),
        };

        let json = serde_json::to_value(&msg).expect("serializable");

        assert_eq!(json["type"], "identity");
        assert_eq!(json["data"]["playerId"], "17");
        assert!(json["data"].get("player_id").is_none());
    }
}
