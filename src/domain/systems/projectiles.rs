// Player bullets: integration, expiry and mob/trap hits.

use crate::domain::geometry::{circles_overlap, dist_sq};
use crate::domain::physics::{Weight, push_factor};
use crate::domain::state::{Bullet, EntityId, IdGen, Kill, MobKind, Penetration, PlayerId, Trap};
use crate::domain::systems::mobs::MobRegistry;
use crate::domain::tuning::projectile::BulletTuning;
use crate::domain::walls::Walls;

/// Validated bullet descriptor as fired by a client.
#[derive(Debug, Clone, PartialEq)]
pub struct BulletSpec {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub speed: f32,
    pub damage: f32,
    pub size: f32,
    pub weight: f32,
    pub lifetime_ms: f32,
    /// Number of mobs the bullet may pass through; `None` stops at the first.
    pub penetration: Option<u32>,
    pub max_range: Option<f32>,
}

impl BulletSpec {
    /// A plain bullet with tuning defaults for everything but position and heading.
    pub fn basic(x: f32, y: f32, angle: f32, tuning: &BulletTuning) -> Self {
        Self {
            x,
            y,
            angle,
            speed: tuning.default_speed,
            damage: tuning.default_damage,
            size: tuning.default_size,
            weight: 1.0,
            lifetime_ms: tuning.default_lifetime_ms,
            penetration: None,
            max_range: None,
        }
    }
}

pub struct BulletField {
    bullets: Vec<Bullet>,
    tuning: BulletTuning,
}

impl BulletField {
    pub fn new(tuning: BulletTuning) -> Self {
        Self {
            bullets: Vec::new(),
            tuning,
        }
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn spawn(&mut self, owner_id: PlayerId, spec: BulletSpec, ids: &mut IdGen) -> EntityId {
        let id = ids.next_id();
        let penetration = spec.penetration.filter(|hp| *hp > 0).map(|hp| Penetration {
            hp,
            max_range: spec.max_range.filter(|r| *r > 0.0),
            origin_x: spec.x,
            origin_y: spec.y,
            hit: Default::default(),
        });
        self.bullets.push(Bullet {
            id,
            owner_id,
            x: spec.x,
            y: spec.y,
            angle: spec.angle,
            speed: spec.speed.max(0.0),
            damage: spec.damage.max(0.0),
            size: spec.size.max(1.0),
            weight: Weight::new(spec.weight),
            lifetime_ms: spec.lifetime_ms.clamp(0.0, self.tuning.max_lifetime_ms),
            penetration,
        });
        id
    }

    pub fn remove_owner(&mut self, owner_id: PlayerId) {
        self.bullets.retain(|b| b.owner_id != owner_id);
    }

    /// Advances every bullet and resolves hits. Returns kills credited to owners.
    pub fn tick(&mut self, dt: f32, mobs: &mut MobRegistry, traps: &mut [Trap], walls: &Walls) -> Vec<Kill> {
        let tuning = self.tuning;
        let mut kills = Vec::new();
        self.bullets.retain_mut(|b| {
            let (sin, cos) = b.angle.sin_cos();
            b.x += cos * b.speed * dt;
            b.y += sin * b.speed * dt;
            b.lifetime_ms -= dt * 1000.0;

            if b.lifetime_ms <= 0.0 || out_of_bounds(b, walls) || walls.point_in_wall(b.x, b.y) {
                return false;
            }
            if let Some(p) = &b.penetration {
                if let Some(range) = p.max_range {
                    if dist_sq(b.x, b.y, p.origin_x, p.origin_y) > range * range {
                        return false;
                    }
                }
            }

            if b.penetration.is_some() {
                hit_through(b, mobs, traps, &tuning, &mut kills)
            } else {
                !hit_first(b, mobs, traps, &tuning, &mut kills)
            }
        });
        kills
    }
}

fn out_of_bounds(b: &Bullet, walls: &Walls) -> bool {
    b.x < 0.0 || b.y < 0.0 || b.x > walls.width || b.y > walls.height
}

fn overlapping_mobs(b: &Bullet, mobs: &MobRegistry) -> Vec<(MobKind, EntityId, Weight)> {
    // Registry order: food, then beetles.
    mobs.iter()
        .filter(|m| m.hitbox().overlaps_circle(b.x, b.y, b.size))
        .map(|m| (m.kind, m.id, m.weight))
        .collect()
}

fn strike(
    b: &Bullet,
    kind: MobKind,
    id: EntityId,
    weight: Weight,
    mobs: &mut MobRegistry,
    tuning: &BulletTuning,
    kills: &mut Vec<Kill>,
) {
    let factor = push_factor(b.weight, weight) * tuning.push_scale;
    if factor > 0.0 {
        let (sin, cos) = b.angle.sin_cos();
        let impulse = factor * tuning.push_impulse;
        mobs.push(kind, id, cos * impulse, sin * impulse);
    }
    if let Some(payload) = mobs.apply_damage(kind, id, b.damage, b.x, b.y) {
        kills.push(Kill {
            player_id: b.owner_id,
            payload,
        });
    }
}

fn hits_trap(b: &Bullet, t: &Trap) -> bool {
    t.owner_id != b.owner_id && t.hp > 0.0 && circles_overlap(b.x, b.y, b.size, t.x, t.y, t.size)
}

// Returns true when the bullet was consumed.
fn hit_first(
    b: &Bullet,
    mobs: &mut MobRegistry,
    traps: &mut [Trap],
    tuning: &BulletTuning,
    kills: &mut Vec<Kill>,
) -> bool {
    if let Some(&(kind, id, weight)) = overlapping_mobs(b, mobs).first() {
        strike(b, kind, id, weight, mobs, tuning, kills);
        return true;
    }
    if let Some(trap) = traps.iter_mut().find(|t| hits_trap(b, t)) {
        trap.hp -= b.damage;
        return true;
    }
    false
}

// Returns true while the bullet still has charges left.
fn hit_through(
    b: &mut Bullet,
    mobs: &mut MobRegistry,
    traps: &mut [Trap],
    tuning: &BulletTuning,
    kills: &mut Vec<Kill>,
) -> bool {
    let candidates = overlapping_mobs(b, mobs);
    for (kind, id, weight) in candidates {
        let Some(p) = b.penetration.as_mut() else {
            return false;
        };
        if p.hp == 0 {
            break;
        }
        if !p.hit.insert(id) {
            continue;
        }
        p.hp -= 1;
        strike(b, kind, id, weight, mobs, tuning, kills);
    }

    let (owner, x, y, size, damage) = (b.owner_id, b.x, b.y, b.size, b.damage);
    let Some(p) = b.penetration.as_mut() else {
        return false;
    };
    for trap in traps.iter_mut() {
        if p.hp == 0 {
            break;
        }
        if trap.owner_id == owner || trap.hp <= 0.0 || !circles_overlap(x, y, size, trap.x, trap.y, trap.size) {
            continue;
        }
        // Trap ids share the room id space with mobs.
        if p.hit.insert(trap.id) {
            p.hp -= 1;
            trap.hp -= damage;
        }
    }
    p.hp > 0
}
