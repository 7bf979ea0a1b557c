// Domain-level simulation entities and snapshot types.

use crate::domain::geometry::Hitbox;
use crate::domain::physics::Weight;
use crate::domain::rarity::Rarity;
use crate::domain::tuning::mob::MobTuning;
use std::collections::HashSet;

pub type EntityId = u64;
pub type PlayerId = u64;

/// Room-local monotonic id source shared by every registry in a room.
#[derive(Debug, Default)]
pub struct IdGen {
    last: EntityId,
}

impl IdGen {
    pub fn next_id(&mut self) -> EntityId {
        self.last += 1;
        self.last
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MobKind {
    Food,
    Beetle,
}

impl MobKind {
    /// Registry order; first-hit resolution walks kinds in this order.
    pub const ALL: [MobKind; 2] = [MobKind::Food, MobKind::Beetle];

    pub fn as_str(self) -> &'static str {
        match self {
            MobKind::Food => "food",
            MobKind::Beetle => "beetle",
        }
    }

    pub fn parse(name: &str) -> Option<MobKind> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(name))
    }
}

pub struct Mob {
    pub id: EntityId,
    pub kind: MobKind,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub angle: f32,
    pub rarity: Rarity,
    pub hp: f32,
    pub max_hp: f32,
    pub size: f32,
    pub weight: Weight,
    /// Damage per second dealt to whatever touches the mob.
    pub body_damage: f32,
    /// False for admin spawns.
    pub natural: bool,
}

impl Mob {
    /// (semi-major, semi-minor); equal for circular mobs.
    pub fn semi_axes(&self) -> (f32, f32) {
        let ratio = MobTuning::for_kind(self.kind).minor_ratio;
        (self.size, self.size * ratio)
    }

    pub fn hitbox(&self) -> Hitbox {
        match self.kind {
            MobKind::Food => Hitbox::Circle {
                x: self.x,
                y: self.y,
                r: self.size,
            },
            MobKind::Beetle => {
                let (semi_major, semi_minor) = self.semi_axes();
                Hitbox::Ellipse {
                    x: self.x,
                    y: self.y,
                    semi_major,
                    semi_minor,
                    angle: self.angle,
                }
            }
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }
}

/// Pass-through budget carried by a penetrating bullet.
#[derive(Debug, Clone)]
pub struct Penetration {
    /// Mob hits left before the bullet is spent.
    pub hp: u32,
    /// Travel limit from the spawn point; `None` means lifetime alone bounds it.
    pub max_range: Option<f32>,
    pub origin_x: f32,
    pub origin_y: f32,
    /// Each mob is damaged at most once.
    pub hit: HashSet<EntityId>,
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub speed: f32,
    pub damage: f32,
    pub size: f32,
    pub weight: Weight,
    pub lifetime_ms: f32,
    pub penetration: Option<Penetration>,
}

#[derive(Debug, Clone)]
pub struct Trap {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Damage per second to overlapping mobs.
    pub damage: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub size: f32,
    pub duration_ms: f32,
    pub rarity: Rarity,
    pub weight: Weight,
    pub is_riot: bool,
    pub rotation: f32,
    pub angular_velocity: f32,
    /// Room clock (ms) at spawn.
    pub spawned_at: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroneFamily {
    Hive,
    Overlord,
}

impl DroneFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            DroneFamily::Hive => "hive",
            DroneFamily::Overlord => "overlord",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DroneMode {
    Active,
    /// Destroyed overlord drone waiting to respawn at its owner.
    Recharging { remaining_ms: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MobRef {
    pub kind: MobKind,
    pub id: EntityId,
}

#[derive(Debug, Clone)]
pub struct Drone {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub family: DroneFamily,
    pub x: f32,
    pub y: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Damage per second while touching a mob.
    pub damage: f32,
    pub size: f32,
    pub speed: f32,
    pub weight: Weight,
    pub mode: DroneMode,
    pub target: Option<MobRef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TankKind {
    #[default]
    Basic,
    Sniper,
    Trapper,
    Overlord,
}

impl TankKind {
    pub fn parse(name: &str) -> Option<TankKind> {
        match name.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(TankKind::Basic),
            "sniper" => Some(TankKind::Sniper),
            "trapper" => Some(TankKind::Trapper),
            "overlord" => Some(TankKind::Overlord),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyKind {
    #[default]
    Plain,
    Hive,
    Aura,
}

impl BodyKind {
    pub fn parse(name: &str) -> Option<BodyKind> {
        match name.trim().to_ascii_lowercase().as_str() {
            "plain" | "none" | "" => Some(BodyKind::Plain),
            "hive" => Some(BodyKind::Hive),
            "aura" => Some(BodyKind::Aura),
            _ => None,
        }
    }
}

/// Equipped tank and body, each with its rarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Loadout {
    pub tank: TankKind,
    pub tank_rarity: Rarity,
    pub body: BodyKind,
    pub body_rarity: Rarity,
}

impl Loadout {
    /// Rarity of the equipped drone family, if any.
    pub fn drone_rarity(&self, family: DroneFamily) -> Option<Rarity> {
        match family {
            DroneFamily::Hive => (self.body == BodyKind::Hive).then_some(self.body_rarity),
            DroneFamily::Overlord => (self.tank == TankKind::Overlord).then_some(self.tank_rarity),
        }
    }
}

/// Client-reported player transform and equipment.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub level: u32,
    pub max_hp: f32,
    pub loadout: Loadout,
    pub aim: Option<(f32, f32)>,
    pub name: String,
}

/// Lightweight view used for mob and drone targeting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBody {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub alive: bool,
}

/// Server-side record of a connected player.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub state: PlayerState,
    /// Server-maintained health.
    pub hp: f32,
    pub alive: bool,
}

impl Player {
    pub fn body(&self) -> PlayerBody {
        PlayerBody {
            id: self.id,
            x: self.state.x,
            y: self.state.y,
            size: self.state.size,
            alive: self.alive,
        }
    }
}

/// Everything the killer's client needs to credit a kill. Produced once per mob.
#[derive(Debug, Clone, PartialEq)]
pub struct KillPayload {
    pub mob_id: EntityId,
    pub kind: MobKind,
    pub rarity: Rarity,
    pub max_hp: f32,
    pub x: f32,
    pub y: f32,
    pub stars: u32,
    pub drop: Option<Rarity>,
}

/// A kill attributed to the player whose damage finished the mob.
#[derive(Debug, Clone, PartialEq)]
pub struct Kill {
    pub player_id: PlayerId,
    pub payload: KillPayload,
}

#[derive(Debug, Clone)]
pub struct MobSnapshot {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub rarity: Rarity,
    pub hp: f32,
    pub max_hp: f32,
    pub size: f32,
}

#[derive(Debug, Clone)]
pub struct BulletSnapshot {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub size: f32,
}

#[derive(Debug, Clone)]
pub struct TrapSnapshot {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub rarity: Rarity,
}

#[derive(Debug, Clone)]
pub struct DroneSnapshot {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub family: DroneFamily,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub recharging: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub level: u32,
    pub hp: f32,
    pub max_hp: f32,
    pub alive: bool,
}

impl From<&Mob> for MobSnapshot {
    fn from(m: &Mob) -> Self {
        Self {
            id: m.id,
            x: m.x,
            y: m.y,
            angle: m.angle,
            rarity: m.rarity,
            hp: m.hp.max(0.0),
            max_hp: m.max_hp,
            size: m.size,
        }
    }
}

impl From<&Bullet> for BulletSnapshot {
    fn from(b: &Bullet) -> Self {
        Self {
            id: b.id,
            owner_id: b.owner_id,
            x: b.x,
            y: b.y,
            angle: b.angle,
            size: b.size,
        }
    }
}

impl From<&Trap> for TrapSnapshot {
    fn from(t: &Trap) -> Self {
        Self {
            id: t.id,
            owner_id: t.owner_id,
            x: t.x,
            y: t.y,
            rotation: t.rotation,
            size: t.size,
            hp: t.hp.max(0.0),
            max_hp: t.max_hp,
            rarity: t.rarity,
        }
    }
}

impl From<&Drone> for DroneSnapshot {
    fn from(d: &Drone) -> Self {
        Self {
            id: d.id,
            owner_id: d.owner_id,
            family: d.family,
            x: d.x,
            y: d.y,
            size: d.size,
            hp: d.hp.max(0.0),
            max_hp: d.max_hp,
            recharging: matches!(d.mode, DroneMode::Recharging { .. }),
        }
    }
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            name: p.state.name.clone(),
            x: p.state.x,
            y: p.state.y,
            size: p.state.size,
            level: p.state.level,
            hp: p.hp.max(0.0),
            max_hp: p.state.max_hp,
            alive: p.alive,
        }
    }
}
