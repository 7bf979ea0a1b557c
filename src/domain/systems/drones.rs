// Owner-bound combat drones: Hive (body) and Overlord (tank) families.

use crate::domain::geometry::{circles_overlap, dist_sq};
use crate::domain::physics::{self, Weight};
use crate::domain::rarity::Rarity;
use crate::domain::state::{
    Drone, DroneFamily, DroneMode, IdGen, Kill, MobKind, MobRef, Player, PlayerId,
};
use crate::domain::systems::mobs::MobRegistry;
use crate::domain::tuning::drone::{HiveTuning, OverlordTuning};
use crate::domain::walls::Walls;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct DroneGroup {
    pub hive: Vec<Drone>,
    pub overlord: Vec<Drone>,
    last_hive_spawn: Option<f64>,
    last_hive_death: Option<f64>,
}

impl DroneGroup {
    fn is_empty(&self) -> bool {
        self.hive.is_empty() && self.overlord.is_empty()
    }
}

pub struct DroneFleet {
    groups: HashMap<PlayerId, DroneGroup>,
    hive: HiveTuning,
    overlord: OverlordTuning,
}

// Per-tick view of the owner a group follows.
struct Anchor {
    id: PlayerId,
    x: f32,
    y: f32,
    aim: Option<(f32, f32)>,
}

impl DroneFleet {
    pub fn new(hive: HiveTuning, overlord: OverlordTuning) -> Self {
        Self {
            groups: HashMap::new(),
            hive,
            overlord,
        }
    }

    pub fn drones(&self) -> impl Iterator<Item = &Drone> {
        self.groups
            .values()
            .flat_map(|g| g.hive.iter().chain(g.overlord.iter()))
    }

    pub fn group(&self, owner_id: PlayerId) -> Option<&DroneGroup> {
        self.groups.get(&owner_id)
    }

    pub fn remove_owner(&mut self, owner_id: PlayerId) {
        self.groups.remove(&owner_id);
    }

    /// Trims each family to the new cap, or clears it when no longer equipped.
    pub fn sync_loadout(&mut self, player: &Player) {
        let Some(group) = self.groups.get_mut(&player.id) else {
            return;
        };
        let loadout = player.state.loadout;
        let hive_cap = loadout
            .drone_rarity(DroneFamily::Hive)
            .map_or(0, HiveTuning::cap);
        let overlord_cap = loadout
            .drone_rarity(DroneFamily::Overlord)
            .map_or(0, OverlordTuning::count);
        group.hive.truncate(hive_cap);
        group.overlord.truncate(overlord_cap);
        if group.is_empty() && hive_cap == 0 && overlord_cap == 0 {
            self.groups.remove(&player.id);
        }
    }

    /// Replenishes, steers and resolves contact for every owner's drones.
    pub fn tick(
        &mut self,
        dt: f32,
        now_ms: f64,
        players: &HashMap<PlayerId, Player>,
        mobs: &mut MobRegistry,
        ids: &mut IdGen,
        walls: &Walls,
    ) -> Vec<Kill> {
        let mut kills = Vec::new();

        self.groups
            .retain(|owner_id, _| players.get(owner_id).is_some_and(|p| p.alive));
        for player in players.values().filter(|p| p.alive) {
            let equipped = player.state.loadout.drone_rarity(DroneFamily::Hive).is_some()
                || player.state.loadout.drone_rarity(DroneFamily::Overlord).is_some();
            if equipped {
                self.groups.entry(player.id).or_default();
            }
        }

        let (hive, overlord) = (self.hive, self.overlord);
        for (owner_id, group) in self.groups.iter_mut() {
            let Some(player) = players.get(owner_id) else {
                continue;
            };
            let anchor = Anchor {
                id: player.id,
                x: player.state.x,
                y: player.state.y,
                aim: player.state.aim,
            };
            let loadout = player.state.loadout;

            match loadout.drone_rarity(DroneFamily::Hive) {
                Some(rarity) => {
                    tick_hive(group, &hive, rarity, &anchor, dt, now_ms, mobs, ids, walls, &mut kills)
                }
                None => group.hive.clear(),
            }
            match loadout.drone_rarity(DroneFamily::Overlord) {
                Some(rarity) => {
                    tick_overlord(group, &overlord, rarity, &anchor, dt, mobs, ids, walls, &mut kills)
                }
                None => group.overlord.clear(),
            }
            separate_group(group, overlord.max_separation_step);
            // Separation may nudge a drone back into a wall.
            for drone in group.hive.iter_mut().chain(group.overlord.iter_mut()) {
                walls.resolve_circle(&mut drone.x, &mut drone.y, drone.size);
            }
        }
        kills
    }
}

#[allow(clippy::too_many_arguments)]
fn new_drone(
    ids: &mut IdGen,
    owner: &Anchor,
    family: DroneFamily,
    rarity: Rarity,
    size: f32,
    speed: f32,
    base_hp: f32,
    base_damage: f32,
    weight: f32,
) -> Drone {
    let hp = base_hp * rarity.stat_multiplier();
    Drone {
        id: ids.next_id(),
        owner_id: owner.id,
        family,
        x: owner.x,
        y: owner.y,
        hp,
        max_hp: hp,
        damage: base_damage * rarity.stat_multiplier(),
        size,
        speed,
        weight: Weight::new(weight),
        mode: DroneMode::Active,
        target: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn tick_hive(
    group: &mut DroneGroup,
    tuning: &HiveTuning,
    rarity: Rarity,
    owner: &Anchor,
    dt: f32,
    now_ms: f64,
    mobs: &mut MobRegistry,
    ids: &mut IdGen,
    walls: &Walls,
    kills: &mut Vec<Kill>,
) {
    let cap = HiveTuning::cap(rarity);
    group.hive.truncate(cap);
    reap_hive(group, now_ms);
    let interval_ok = group
        .last_hive_spawn
        .is_none_or(|t| now_ms - t >= tuning.spawn_interval_ms);
    let cooldown_ok = group
        .last_hive_death
        .is_none_or(|t| now_ms - t >= tuning.respawn_delay_ms);
    if group.hive.len() < cap && interval_ok && cooldown_ok {
        group.hive.push(new_drone(
            ids,
            owner,
            DroneFamily::Hive,
            rarity,
            tuning.size,
            tuning.speed,
            tuning.base_hp,
            tuning.base_damage,
            tuning.weight,
        ));
        group.last_hive_spawn = Some(now_ms);
    }

    for drone in &mut group.hive {
        steer_active(drone, owner, tuning.target_range, mobs, dt);
        walls.resolve_circle(&mut drone.x, &mut drone.y, drone.size);
        contact_mobs(drone, dt, mobs, kills);
        if dist_sq(drone.x, drone.y, owner.x, owner.y) > tuning.leash * tuning.leash {
            drone.hp = 0.0;
        }
    }

    reap_hive(group, now_ms);
}

// Any death restarts the group's respawn delay.
fn reap_hive(group: &mut DroneGroup, now_ms: f64) {
    let before = group.hive.len();
    group.hive.retain(|d| d.hp > 0.0);
    if group.hive.len() < before {
        group.last_hive_death = Some(now_ms);
    }
}

#[allow(clippy::too_many_arguments)]
fn tick_overlord(
    group: &mut DroneGroup,
    tuning: &OverlordTuning,
    rarity: Rarity,
    owner: &Anchor,
    dt: f32,
    mobs: &mut MobRegistry,
    ids: &mut IdGen,
    walls: &Walls,
    kills: &mut Vec<Kill>,
) {
    let count = OverlordTuning::count(rarity);
    group.overlord.truncate(count);
    while group.overlord.len() < count {
        group.overlord.push(new_drone(
            ids,
            owner,
            DroneFamily::Overlord,
            rarity,
            tuning.size,
            tuning.speed,
            tuning.base_hp,
            tuning.base_damage,
            tuning.weight,
        ));
    }

    let max_range_sq = tuning.max_range * tuning.max_range;
    group.overlord.retain_mut(|drone| {
        match drone.mode {
            DroneMode::Active => {
                steer_active(drone, owner, tuning.target_range, mobs, dt);
                walls.resolve_circle(&mut drone.x, &mut drone.y, drone.size);
                contact_mobs(drone, dt, mobs, kills);
                if drone.hp <= 0.0 {
                    drone.mode = DroneMode::Recharging {
                        remaining_ms: tuning.recharge_ms,
                    };
                    drone.target = None;
                }
            }
            DroneMode::Recharging { remaining_ms } => {
                steer_to(drone, owner.x, owner.y, drone.speed * tuning.recharge_speed_scale, dt);
                walls.resolve_circle(&mut drone.x, &mut drone.y, drone.size);
                let r = tuning.recharge_radius;
                if dist_sq(drone.x, drone.y, owner.x, owner.y) <= r * r {
                    let remaining_ms = remaining_ms - dt * 1000.0;
                    if remaining_ms <= 0.0 {
                        drone.mode = DroneMode::Active;
                        drone.hp = drone.max_hp;
                    } else {
                        drone.mode = DroneMode::Recharging { remaining_ms };
                    }
                }
            }
        }
        // Past max range an active drone is lost; the count is refilled next
        // tick. Recharging drones are kept until their timer runs out.
        match drone.mode {
            DroneMode::Active => dist_sq(drone.x, drone.y, owner.x, owner.y) <= max_range_sq,
            DroneMode::Recharging { .. } => true,
        }
    });
}

fn steer_to(drone: &mut Drone, tx: f32, ty: f32, speed: f32, dt: f32) {
    let dx = tx - drone.x;
    let dy = ty - drone.y;
    let d = (dx * dx + dy * dy).sqrt();
    if d <= 1e-3 {
        return;
    }
    let step = (speed * dt).min(d);
    drone.x += dx / d * step;
    drone.y += dy / d * step;
}

/// Aim point wins; otherwise keep a locked target until it dies or leaves
/// range, then lock the nearest mob to the owner.
fn steer_active(drone: &mut Drone, owner: &Anchor, range: f32, mobs: &MobRegistry, dt: f32) {
    if let Some((ax, ay)) = owner.aim {
        drone.target = None;
        steer_to(drone, ax, ay, drone.speed, dt);
        return;
    }

    let range_sq = range * range;
    let locked = drone.target.and_then(|t| mobs.get(t.kind, t.id)).filter(|m| {
        dist_sq(m.x, m.y, owner.x, owner.y) <= range_sq
    });
    let target = match locked {
        Some(m) => Some(m),
        None => mobs
            .iter()
            .filter(|m| dist_sq(m.x, m.y, owner.x, owner.y) <= range_sq)
            .min_by(|a, b| {
                dist_sq(a.x, a.y, owner.x, owner.y).total_cmp(&dist_sq(b.x, b.y, owner.x, owner.y))
            }),
    };

    match target {
        Some(m) => {
            drone.target = Some(MobRef { kind: m.kind, id: m.id });
            let (mx, my) = (m.x, m.y);
            steer_to(drone, mx, my, drone.speed, dt);
        }
        None => {
            drone.target = None;
            steer_to(drone, owner.x, owner.y, drone.speed, dt);
        }
    }
}

// Damage exchange through the funnel; the drone takes the mob's body damage.
fn contact_mobs(drone: &mut Drone, dt: f32, mobs: &mut MobRegistry, kills: &mut Vec<Kill>) {
    let touching: Vec<(MobKind, u64, f32)> = mobs
        .iter()
        .filter(|m| m.hitbox().overlaps_circle(drone.x, drone.y, drone.size))
        .map(|m| (m.kind, m.id, m.body_damage))
        .collect();
    for (kind, id, body_damage) in touching {
        drone.hp -= body_damage * dt;
        if let Some(payload) = mobs.apply_damage(kind, id, drone.damage * dt, drone.x, drone.y) {
            kills.push(Kill {
                player_id: drone.owner_id,
                payload,
            });
        }
    }
}

fn separate_group(group: &mut DroneGroup, max_step: f32) {
    let mut all: Vec<&mut Drone> = group
        .hive
        .iter_mut()
        .chain(group.overlord.iter_mut())
        .filter(|d| d.mode == DroneMode::Active)
        .collect();
    let len = all.len();
    for i in 0..len {
        for j in (i + 1)..len {
            let (a, b) = (&all[i], &all[j]);
            if !circles_overlap(a.x, a.y, a.size, b.x, b.y, b.size) {
                continue;
            }
            if let Some((da, db)) =
                physics::separate(a.x, a.y, a.size, a.weight, b.x, b.y, b.size, b.weight, max_step)
            {
                all[i].x += da.0;
                all[i].y += da.1;
                all[j].x += db.0;
                all[j].y += db.1;
            }
        }
    }
}
