// Traps ("squares"): launch, coast, trap-trap bounce and area damage on mobs.

use crate::domain::physics::{self, Weight};
use crate::domain::rarity::Rarity;
use crate::domain::state::{EntityId, IdGen, Kill, MobKind, PlayerId, Trap};
use crate::domain::systems::mobs::MobRegistry;
use crate::domain::tuning::projectile::TrapTuning;
use crate::domain::walls::Walls;
use std::collections::{HashMap, HashSet};

/// Validated trap descriptor as placed by a client.
#[derive(Debug, Clone, PartialEq)]
pub struct TrapSpec {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub damage: f32,
    pub hp: f32,
    pub size: f32,
    pub duration_ms: f32,
    pub rarity: Rarity,
    pub weight: f32,
    pub is_riot: bool,
    /// Owner cap requested by the weapon; clamped to the global ceiling.
    pub cap: Option<usize>,
}

pub struct TrapField {
    traps: Vec<Trap>,
    tuning: TrapTuning,
    // Room clock (ms) each touching pair first made contact, keyed low id first.
    contacts: HashMap<(EntityId, EntityId), f64>,
}

fn pair_key(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    (a.min(b), a.max(b))
}

impl TrapField {
    pub fn new(tuning: TrapTuning) -> Self {
        Self {
            traps: Vec::new(),
            tuning,
            contacts: HashMap::new(),
        }
    }

    pub fn traps(&self) -> &[Trap] {
        &self.traps
    }

    pub fn traps_mut(&mut self) -> &mut [Trap] {
        &mut self.traps
    }

    pub fn owned_by(&self, owner_id: PlayerId) -> usize {
        self.traps.iter().filter(|t| t.owner_id == owner_id).count()
    }

    /// Places a trap, evicting the owner's oldest traps to stay under the cap.
    /// Returns the new id and how many traps were evicted.
    pub fn spawn(&mut self, owner_id: PlayerId, spec: TrapSpec, now_ms: f64, ids: &mut IdGen) -> (EntityId, usize) {
        let ceiling = self.tuning.default_owner_cap.max(1);
        let cap = spec.cap.unwrap_or(ceiling).clamp(1, ceiling);

        let mut evicted = 0;
        while self.owned_by(owner_id) >= cap {
            let oldest = self
                .traps
                .iter()
                .enumerate()
                .filter(|(_, t)| t.owner_id == owner_id)
                .min_by(|(_, a), (_, b)| a.spawned_at.total_cmp(&b.spawned_at).then(a.id.cmp(&b.id)))
                .map(|(idx, _)| idx);
            let Some(idx) = oldest else { break };
            self.traps.remove(idx);
            evicted += 1;
        }

        let id = ids.next_id();
        let hp = spec.hp.max(1.0);
        self.traps.push(Trap {
            id,
            owner_id,
            x: spec.x,
            y: spec.y,
            vx: spec.vx,
            vy: spec.vy,
            damage: spec.damage.max(0.0),
            hp,
            max_hp: hp,
            size: spec.size.max(1.0),
            duration_ms: spec.duration_ms.max(0.0),
            rarity: spec.rarity,
            weight: Weight::new(spec.weight),
            is_riot: spec.is_riot,
            rotation: 0.0,
            angular_velocity: 0.0,
            spawned_at: now_ms,
        });
        (id, evicted)
    }

    pub fn clear_owner(&mut self, owner_id: PlayerId) {
        self.traps.retain(|t| t.owner_id != owner_id);
    }

    pub fn grace_ms(&self) -> f64 {
        self.tuning.grace_ms
    }

    fn in_grace(&self, t: &Trap, now_ms: f64) -> bool {
        now_ms - t.spawned_at < self.tuning.grace_ms
    }

    /// Integrates motion and spin, keeping traps out of walls.
    pub fn integrate(&mut self, dt: f32, now_ms: f64, walls: &Walls) {
        let tuning = self.tuning;
        for t in &mut self.traps {
            let launching = now_ms - t.spawned_at < tuning.launch_window_ms;
            let decay = if launching {
                tuning.launch_decay
            } else {
                tuning.coast_decay
            };
            t.x += t.vx * dt;
            t.y += t.vy * dt;
            t.vx = physics::decay(t.vx, decay, dt);
            t.vy = physics::decay(t.vy, decay, dt);
            t.rotation += t.angular_velocity * dt;
            t.angular_velocity = physics::decay(t.angular_velocity, tuning.spin_decay, dt);
            t.duration_ms -= dt * 1000.0;
        }
        self.resolve_walls(walls);
    }

    /// Pushes every trap out of walls and back inside the map.
    pub fn resolve_walls(&mut self, walls: &Walls) {
        for t in &mut self.traps {
            walls.resolve_circle(&mut t.x, &mut t.y, t.size);
            walls.clamp_to_bounds(&mut t.x, &mut t.y, t.size);
        }
    }

    /// Weighted push-apart for overlapping traps plus a bounce impulse during
    /// the first contact window of each pair, unless both are riot traps.
    pub fn collide_traps(&mut self, now_ms: f64) {
        let tuning = self.tuning;
        let len = self.traps.len();
        let mut touching = HashSet::new();
        for i in 0..len {
            if self.in_grace(&self.traps[i], now_ms) {
                continue;
            }
            for j in (i + 1)..len {
                if self.in_grace(&self.traps[j], now_ms) {
                    continue;
                }
                let (a, b) = (&self.traps[i], &self.traps[j]);
                let max_step = a.size.max(b.size);
                let Some((da, db)) =
                    physics::separate(a.x, a.y, a.size, a.weight, b.x, b.y, b.size, b.weight, max_step)
                else {
                    continue;
                };
                let bounce = !(a.is_riot && b.is_riot);
                let (share_a, share_b) = physics::separation_shares(a.weight, b.weight);
                let dx = b.x - a.x;
                let dy = b.y - a.y;
                let d = (dx * dx + dy * dy).sqrt();
                let (nx, ny) = if d > 1e-4 { (dx / d, dy / d) } else { (1.0, 0.0) };

                let key = pair_key(a.id, b.id);
                touching.insert(key);
                let since = *self.contacts.entry(key).or_insert(now_ms);
                let bouncing = bounce && now_ms - since <= tuning.bounce_window_ms;
                for (idx, (sx, sy), share, sign) in [(i, da, share_a, -1.0f32), (j, db, share_b, 1.0f32)] {
                    let t = &mut self.traps[idx];
                    t.x += sx;
                    t.y += sy;
                    if bouncing {
                        let impulse = tuning.bounce_impulse * share * 2.0;
                        t.vx += sign * nx * impulse;
                        t.vy += sign * ny * impulse;
                        t.angular_velocity += sign * impulse * tuning.spin_per_impulse;
                    }
                }
            }
        }
        self.contacts.retain(|key, _| touching.contains(key));
    }

    /// Damages every overlapping mob by `damage * dt` and takes reactive
    /// contact damage back. Kills are credited to the trap owner.
    pub fn damage_mobs(&mut self, dt: f32, now_ms: f64, mobs: &mut MobRegistry) -> Vec<Kill> {
        let mut kills = Vec::new();
        let grace = self.tuning.grace_ms;
        for t in &mut self.traps {
            if now_ms - t.spawned_at < grace || t.hp <= 0.0 {
                continue;
            }
            let touching: Vec<(MobKind, EntityId, f32)> = mobs
                .iter()
                .filter(|m| m.hitbox().overlaps_circle(t.x, t.y, t.size))
                .map(|m| (m.kind, m.id, m.body_damage))
                .collect();
            for (kind, id, body_damage) in touching {
                t.hp -= body_damage * dt;
                if let Some(payload) = mobs.apply_damage(kind, id, t.damage * dt, t.x, t.y) {
                    kills.push(Kill {
                        player_id: t.owner_id,
                        payload,
                    });
                }
            }
        }
        kills
    }

    /// Drops traps that ran out of duration, hp or absolute age.
    pub fn expire(&mut self, now_ms: f64) -> usize {
        let max_age = self.tuning.max_age_ms;
        let before = self.traps.len();
        self.traps
            .retain(|t| t.duration_ms > 0.0 && t.hp > 0.0 && now_ms - t.spawned_at <= max_age);
        before - self.traps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tuning::mob::MobSpawnTuning;
    use crate::domain::tuning::world::WorldTuning;
    use crate::domain::walls::ZoneGrid;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn open_walls() -> Walls {
        let rows = vec!["....".to_string(); 4];
        let grid = ZoneGrid::parse(500.0, &rows).expect("grid");
        Walls::from_zone_grid(&grid, &WorldTuning::default())
    }

    fn spec(x: f32, y: f32) -> TrapSpec {
        TrapSpec {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            damage: 10.0,
            hp: 50.0,
            size: 15.0,
            duration_ms: 5000.0,
            rarity: Rarity::Common,
            weight: 5.0,
            is_riot: false,
            cap: None,
        }
    }

    #[test]
    fn when_owner_exceeds_cap_then_oldest_trap_is_evicted() {
        let mut ids = IdGen::default();
        let mut field = TrapField::new(TrapTuning::default());
        let first = field
            .spawn(1, TrapSpec { cap: Some(9), ..spec(10.0, 10.0) }, 0.0, &mut ids)
            .0;
        for n in 1..9 {
            field.spawn(1, TrapSpec { cap: Some(9), ..spec(10.0, 10.0) }, n as f64, &mut ids);
        }
        assert_eq!(field.owned_by(1), 9);

        let (_, evicted) = field.spawn(1, TrapSpec { cap: Some(9), ..spec(10.0, 10.0) }, 9.0, &mut ids);

        assert_eq!(evicted, 1);
        assert_eq!(field.owned_by(1), 9);
        assert!(field.traps().iter().all(|t| t.id != first));
    }

    #[test]
    fn when_requested_cap_is_above_ceiling_then_ceiling_applies() {
        let mut ids = IdGen::default();
        let mut field = TrapField::new(TrapTuning::default());
        for n in 0..40 {
            field.spawn(1, TrapSpec { cap: Some(100), ..spec(10.0, 10.0) }, n as f64, &mut ids);
        }
        field.spawn(2, spec(10.0, 10.0), 0.0, &mut ids);

        assert_eq!(field.owned_by(1), 25);
        assert_eq!(field.owned_by(2), 1);
    }

    #[test]
    fn when_trap_is_in_grace_then_it_does_not_damage() {
        let walls = open_walls();
        let mut ids = IdGen::default();
        let mut mobs = MobRegistry::new(MobSpawnTuning::default(), StdRng::seed_from_u64(5));
        let mob = mobs
            .spawn_forced(MobKind::Food, Rarity::Common, Some((300.0, 300.0)), &mut ids, &walls)
            .expect("spawn");
        let mut field = TrapField::new(TrapTuning::default());
        field.spawn(1, spec(300.0, 300.0), 0.0, &mut ids);

        field.damage_mobs(0.005, 50.0, &mut mobs);
        assert!(mobs.get(MobKind::Food, mob).is_some_and(|m| m.hp == m.max_hp));

        field.damage_mobs(0.1, 500.0, &mut mobs);
        let m = mobs.get(MobKind::Food, mob).expect("alive");
        assert!((m.max_hp - m.hp - 1.0).abs() < 1e-4);
        assert!(field.traps()[0].hp < 50.0);
    }

    #[test]
    fn when_trap_finishes_a_mob_then_owner_gets_the_kill() {
        let walls = open_walls();
        let mut ids = IdGen::default();
        let mut mobs = MobRegistry::new(MobSpawnTuning::default(), StdRng::seed_from_u64(5));
        let mob = mobs
            .spawn_forced(MobKind::Food, Rarity::Common, Some((300.0, 300.0)), &mut ids, &walls)
            .expect("spawn");
        let mut field = TrapField::new(TrapTuning::default());
        field.spawn(4, TrapSpec { damage: 1000.0, ..spec(300.0, 300.0) }, 0.0, &mut ids);

        let kills = field.damage_mobs(0.1, 500.0, &mut mobs);

        assert_eq!(kills.len(), 1);
        assert_eq!(kills[0].player_id, 4);
        assert_eq!(kills[0].payload.mob_id, mob);
    }

    #[test]
    fn when_traps_overlap_then_they_separate_and_bounce() {
        let mut ids = IdGen::default();
        let mut field = TrapField::new(TrapTuning::default());
        field.spawn(1, spec(100.0, 100.0), 0.0, &mut ids);
        field.spawn(2, spec(110.0, 100.0), 0.0, &mut ids);

        field.collide_traps(500.0);

        let t = field.traps();
        assert!(t[1].x - t[0].x > 10.0);
        assert!(t[0].vx < 0.0 && t[1].vx > 0.0);
        assert_eq!(field.contacts.len(), 1);
    }

    #[test]
    fn when_a_trap_in_long_contact_meets_a_new_trap_then_only_the_new_pair_bounces() {
        let mut ids = IdGen::default();
        let mut field = TrapField::new(TrapTuning::default());
        field.spawn(1, spec(100.0, 100.0), 0.0, &mut ids);
        field.spawn(2, spec(125.0, 100.0), 0.0, &mut ids);
        let place = |field: &mut TrapField, layout: &[(f32, f32)]| {
            for (t, &(x, y)) in field.traps_mut().iter_mut().zip(layout) {
                t.x = x;
                t.y = y;
                t.vx = 0.0;
                t.vy = 0.0;
            }
        };

        field.collide_traps(500.0);
        place(&mut field, &[(100.0, 100.0), (125.0, 100.0)]);
        field.spawn(3, spec(100.0, 75.0), 0.0, &mut ids);
        field.collide_traps(900.0);

        let t = field.traps();
        // The first pair has touched for longer than the bounce window.
        assert_eq!(t[1].vx, 0.0);
        assert!(t[0].vy > 0.0);
        assert!(t[2].vy < 0.0);
    }

    #[test]
    fn when_traps_drift_into_a_wall_then_integrate_pushes_them_out() {
        let rows = vec!["..#..".to_string(); 5];
        let grid = ZoneGrid::parse(100.0, &rows).expect("grid");
        let walls = Walls::from_zone_grid(&grid, &WorldTuning::default());
        let mut ids = IdGen::default();
        let mut field = TrapField::new(TrapTuning::default());
        field.spawn(1, TrapSpec { vx: 400.0, ..spec(150.0, 250.0) }, 0.0, &mut ids);
        field.spawn(1, TrapSpec { vx: -400.0, ..spec(350.0, 100.0) }, 0.0, &mut ids);

        for n in 1..=100 {
            field.integrate(0.01, n as f64 * 10.0, &walls);
            for t in field.traps() {
                assert!(!walls.point_in_wall(t.x, t.y), "trap {} at ({}, {})", t.id, t.x, t.y);
            }
        }
        let t = field.traps();
        assert!(t[0].x < 200.0);
        assert!(t[1].x > 300.0);
    }

    #[test]
    fn when_both_traps_are_riot_then_they_separate_without_bounce() {
        let mut ids = IdGen::default();
        let mut field = TrapField::new(TrapTuning::default());
        field.spawn(1, TrapSpec { is_riot: true, ..spec(100.0, 100.0) }, 0.0, &mut ids);
        field.spawn(2, TrapSpec { is_riot: true, ..spec(110.0, 100.0) }, 0.0, &mut ids);

        field.collide_traps(500.0);

        let t = field.traps();
        assert!(t[1].x - t[0].x > 10.0);
        assert_eq!(t[0].vx, 0.0);
        assert_eq!(t[1].vx, 0.0);
    }

    #[test]
    fn when_traps_are_in_grace_then_they_pass_through_each_other() {
        let mut ids = IdGen::default();
        let mut field = TrapField::new(TrapTuning::default());
        field.spawn(1, spec(100.0, 100.0), 0.0, &mut ids);
        field.spawn(2, spec(110.0, 100.0), 0.0, &mut ids);

        field.collide_traps(10.0);

        assert_eq!(field.traps()[0].x, 100.0);
    }

    #[test]
    fn when_launched_then_trap_slows_faster_than_while_coasting() {
        let walls = open_walls();
        let mut ids = IdGen::default();
        let mut field = TrapField::new(TrapTuning::default());
        field.spawn(1, TrapSpec { vx: 100.0, ..spec(500.0, 500.0) }, 0.0, &mut ids);
        field.spawn(1, TrapSpec { vx: 100.0, ..spec(500.0, 900.0) }, -1000.0, &mut ids);

        field.integrate(0.05, 0.0, &walls);

        let t = field.traps();
        assert!(t[0].vx < t[1].vx);
        assert!(t[0].x > 500.0);
    }

    #[test]
    fn when_duration_or_age_runs_out_then_trap_expires() {
        let walls = open_walls();
        let mut ids = IdGen::default();
        let mut field = TrapField::new(TrapTuning::default());
        field.spawn(1, TrapSpec { duration_ms: 10.0, ..spec(100.0, 100.0) }, 0.0, &mut ids);
        field.spawn(1, TrapSpec { duration_ms: 1.0e9, ..spec(300.0, 100.0) }, -70_000.0, &mut ids);
        field.spawn(1, spec(500.0, 100.0), 0.0, &mut ids);

        field.integrate(0.02, 20.0, &walls);

        assert_eq!(field.expire(20.0), 2);
        assert_eq!(field.traps().len(), 1);
    }

    #[test]
    fn when_owner_clears_then_only_their_traps_go() {
        let mut ids = IdGen::default();
        let mut field = TrapField::new(TrapTuning::default());
        field.spawn(1, spec(10.0, 10.0), 0.0, &mut ids);
        field.spawn(2, spec(10.0, 10.0), 0.0, &mut ids);

        field.clear_owner(1);

        assert_eq!(field.owned_by(1), 0);
        assert_eq!(field.owned_by(2), 1);
    }
}
