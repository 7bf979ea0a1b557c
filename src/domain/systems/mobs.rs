// Mob registry: spawning, the damage funnel, movement and separation.

use crate::domain::geometry::dist_sq;
use crate::domain::physics::{self, Weight};
use crate::domain::rarity::{Rarity, roll_drop, roll_rarity};
use crate::domain::spatial::SpatialHash;
use crate::domain::state::{EntityId, IdGen, KillPayload, Mob, MobKind, PlayerBody, Trap};
use crate::domain::tuning::mob::{MobSpawnTuning, MobTuning};
use crate::domain::walls::Walls;
use rand::Rng;
use rand::rngs::StdRng;
use std::f32::consts::TAU;

pub struct MobRegistry {
    food: Vec<Mob>,
    beetles: Vec<Mob>,
    tuning: MobSpawnTuning,
    rng: StdRng,
    neighbor_buf: Vec<usize>,
}

impl MobRegistry {
    pub fn new(tuning: MobSpawnTuning, rng: StdRng) -> Self {
        Self {
            food: Vec::new(),
            beetles: Vec::new(),
            tuning,
            rng,
            neighbor_buf: Vec::new(),
        }
    }

    pub fn list(&self, kind: MobKind) -> &[Mob] {
        match kind {
            MobKind::Food => &self.food,
            MobKind::Beetle => &self.beetles,
        }
    }

    fn list_mut(&mut self, kind: MobKind) -> &mut Vec<Mob> {
        match kind {
            MobKind::Food => &mut self.food,
            MobKind::Beetle => &mut self.beetles,
        }
    }

    pub fn count(&self, kind: MobKind) -> usize {
        self.list(kind).len()
    }

    pub fn get(&self, kind: MobKind, id: EntityId) -> Option<&Mob> {
        self.list(kind).iter().find(|m| m.id == id)
    }

    /// Food first, then beetles.
    pub fn iter(&self) -> impl Iterator<Item = &Mob> {
        self.food.iter().chain(self.beetles.iter())
    }

    pub fn has_natural_super(&self, kind: MobKind) -> bool {
        self.list(kind)
            .iter()
            .any(|m| m.natural && m.rarity == Rarity::Super)
    }

    // At most one natural super per kind per room.
    fn settle_rarity(&self, kind: MobKind, rolled: Rarity) -> Rarity {
        if rolled == Rarity::Super && self.has_natural_super(kind) {
            Rarity::Ultra
        } else {
            rolled
        }
    }

    fn has_room(&self, kind: MobKind) -> bool {
        self.count(kind) < self.tuning.target_population
    }

    fn random_open_position(&mut self, walls: &Walls, margin: f32) -> Option<(f32, f32)> {
        let max_x = (walls.width - margin).max(margin);
        let max_y = (walls.height - margin).max(margin);
        for _ in 0..self.tuning.wall_retries.max(1) {
            let x = self.rng.gen_range(margin..=max_x);
            let y = self.rng.gen_range(margin..=max_y);
            if !walls.point_in_wall(x, y) {
                return Some((x, y));
            }
        }
        None
    }

    fn build(&mut self, id: EntityId, kind: MobKind, rarity: Rarity, x: f32, y: f32, natural: bool) -> Mob {
        let base = MobTuning::for_kind(kind);
        let hp = base.base_hp * rarity.stat_multiplier();
        let size = base.base_size * rarity.size_multiplier();
        Mob {
            id,
            kind,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            angle: self.rng.gen_range(0.0..TAU),
            rarity,
            hp,
            max_hp: hp,
            size,
            weight: Weight::new(base.weight * rarity.size_multiplier()),
            body_damage: base.body_damage * rarity.stat_multiplier(),
            natural,
        }
    }

    /// Natural spawn at a random open position. `None` when the population is
    /// full or every position attempt landed in a wall.
    pub fn spawn(&mut self, kind: MobKind, ids: &mut IdGen, walls: &Walls) -> Option<EntityId> {
        if !self.has_room(kind) {
            return None;
        }
        let rarity = roll_rarity(&mut self.rng, &self.tuning.rarity_weights);
        let rarity = self.settle_rarity(kind, rarity);
        let margin = MobTuning::for_kind(kind).base_size * rarity.size_multiplier();
        let (x, y) = self.random_open_position(walls, margin)?;

        let id = ids.next_id();
        let mob = self.build(id, kind, rarity, x, y, true);
        self.list_mut(kind).push(mob);
        Some(id)
    }

    /// Runs up to `cap` natural spawns, stopping at the population ceiling.
    pub fn spawn_batch(&mut self, kind: MobKind, cap: usize, ids: &mut IdGen, walls: &Walls) -> usize {
        let room = self.tuning.target_population.saturating_sub(self.count(kind));
        let attempts = cap.min(room);
        (0..attempts)
            .filter(|_| self.spawn(kind, ids, walls).is_some())
            .count()
    }

    /// Admin spawn of an exact rarity. Skips the super downgrade but not the
    /// population ceiling; an explicit position inside a wall is rejected.
    pub fn spawn_forced(
        &mut self,
        kind: MobKind,
        rarity: Rarity,
        position: Option<(f32, f32)>,
        ids: &mut IdGen,
        walls: &Walls,
    ) -> Option<EntityId> {
        if !self.has_room(kind) {
            return None;
        }
        let (x, y) = match position {
            Some((x, y)) if x.is_finite() && y.is_finite() => {
                let (mut x, mut y) = (x, y);
                walls.clamp_to_bounds(&mut x, &mut y, 0.0);
                if walls.point_in_wall(x, y) {
                    return None;
                }
                (x, y)
            }
            _ => {
                let margin = MobTuning::for_kind(kind).base_size * rarity.size_multiplier();
                self.random_open_position(walls, margin)?
            }
        };

        let id = ids.next_id();
        let mob = self.build(id, kind, rarity, x, y, false);
        self.list_mut(kind).push(mob);
        Some(id)
    }

    /// The single damage funnel for every source.
    ///
    /// Missing mobs, far-away sources and non-positive or non-finite amounts
    /// are silently ignored. A lethal hit removes the mob immediately, so a
    /// second lethal hit on the same id finds nothing and returns `None`.
    pub fn apply_damage(
        &mut self,
        kind: MobKind,
        id: EntityId,
        amount: f32,
        source_x: f32,
        source_y: f32,
    ) -> Option<KillPayload> {
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        if !source_x.is_finite() || !source_y.is_finite() {
            return None;
        }
        let range = self.tuning.max_interaction_range;
        let list = self.list_mut(kind);
        let idx = list.iter().position(|m| m.id == id)?;
        let mob = &mut list[idx];
        if dist_sq(mob.x, mob.y, source_x, source_y) > range * range {
            return None;
        }

        mob.hp -= amount;
        if !mob.is_dead() {
            return None;
        }

        let dead = list.swap_remove(idx);
        let drop = roll_drop(dead.rarity, &mut self.rng);
        Some(KillPayload {
            mob_id: dead.id,
            kind: dead.kind,
            rarity: dead.rarity,
            max_hp: dead.max_hp,
            x: dead.x,
            y: dead.y,
            stars: dead.rarity.stars(),
            drop,
        })
    }

    /// Adds a velocity impulse to a mob; inert mobs drift and decay.
    pub fn push(&mut self, kind: MobKind, id: EntityId, ix: f32, iy: f32) {
        if let Some(mob) = self.list_mut(kind).iter_mut().find(|m| m.id == id) {
            mob.vx += ix;
            mob.vy += iy;
        }
    }

    /// Beetles home on the nearest live player in vision; everything drifts.
    pub fn move_mobs(&mut self, bodies: &[PlayerBody], walls: &Walls, dt: f32) {
        let beetle = MobTuning::for_kind(MobKind::Beetle);
        for mob in &mut self.beetles {
            if let Some(target) = nearest_body(bodies, mob.x, mob.y, beetle.vision) {
                let dx = target.x - mob.x;
                let dy = target.y - mob.y;
                let d = (dx * dx + dy * dy).sqrt();
                if d > 1e-3 {
                    mob.angle = dy.atan2(dx);
                    let step = (beetle.speed * dt).min(d);
                    mob.x += dx / d * step;
                    mob.y += dy / d * step;
                }
            }
            drift(mob, beetle.velocity_decay, dt);
            walls.resolve_circle(&mut mob.x, &mut mob.y, mob.size);
            walls.clamp_to_bounds(&mut mob.x, &mut mob.y, mob.size);
        }

        let food = MobTuning::for_kind(MobKind::Food);
        for mob in &mut self.food {
            if mob.vx == 0.0 && mob.vy == 0.0 {
                continue;
            }
            drift(mob, food.velocity_decay, dt);
            walls.resolve_circle(&mut mob.x, &mut mob.y, mob.size);
            walls.clamp_to_bounds(&mut mob.x, &mut mob.y, mob.size);
        }
    }

    /// Pushes overlapping beetles apart by weight, bounded per tick.
    pub fn separate_beetles(&mut self) {
        let len = self.beetles.len();
        if len < 2 {
            return;
        }
        let max_size = self.beetles.iter().map(|m| m.size).fold(0.0f32, f32::max);
        let mut hash = SpatialHash::new(max_size * 2.0);
        for (i, m) in self.beetles.iter().enumerate() {
            hash.insert(i, m.x, m.y);
        }

        let step = self.tuning.max_separation_step;
        let mut shift = vec![(0.0f32, 0.0f32); len];
        for i in 0..len {
            let a = &self.beetles[i];
            let ra = body_radius(a);
            hash.query_nearby_into(a.x, a.y, max_size * 2.0, &mut self.neighbor_buf);
            for &j in &self.neighbor_buf {
                // Each pair once.
                if j <= i {
                    continue;
                }
                let b = &self.beetles[j];
                if let Some((da, db)) =
                    physics::separate(a.x, a.y, ra, a.weight, b.x, b.y, body_radius(b), b.weight, step)
                {
                    shift[i].0 += da.0;
                    shift[i].1 += da.1;
                    shift[j].0 += db.0;
                    shift[j].1 += db.1;
                }
            }
        }

        for (mob, (sx, sy)) in self.beetles.iter_mut().zip(shift) {
            mob.x += sx.clamp(-step, step);
            mob.y += sy.clamp(-step, step);
        }
    }

    /// Separates beetles from overlapping traps without dealing damage.
    /// Traps younger than `grace_ms` are left alone.
    pub fn repel_beetles_from_traps(&mut self, traps: &mut [Trap], now_ms: f64, grace_ms: f64) {
        let step = self.tuning.max_separation_step;
        for mob in &mut self.beetles {
            let r = body_radius(mob);
            for trap in traps.iter_mut().filter(|t| now_ms - t.spawned_at >= grace_ms) {
                if let Some((dm, dt)) = physics::separate(
                    mob.x, mob.y, r, mob.weight, trap.x, trap.y, trap.size, trap.weight, step,
                ) {
                    mob.x += dm.0;
                    mob.y += dm.1;
                    trap.x += dt.0;
                    trap.y += dt.1;
                }
            }
        }
    }

    /// Pushes beetles back out of walls after separation has moved them.
    pub fn resolve_walls(&mut self, walls: &Walls) {
        for mob in &mut self.beetles {
            walls.resolve_circle(&mut mob.x, &mut mob.y, mob.size);
        }
    }

    /// Drops mobs trapped fully inside walls; no kill is credited.
    pub fn purge_enclosed(&mut self, walls: &Walls) -> usize {
        let before = self.food.len() + self.beetles.len();
        self.food.retain(|m| !walls.encloses_circle(m.x, m.y, m.size));
        self.beetles.retain(|m| !walls.encloses_circle(m.x, m.y, m.size));
        before - self.food.len() - self.beetles.len()
    }

    /// Safety net for any mob left at or below zero hp.
    pub fn purge_dead(&mut self) -> usize {
        let before = self.food.len() + self.beetles.len();
        self.food.retain(|m| !m.is_dead());
        self.beetles.retain(|m| !m.is_dead());
        before - self.food.len() - self.beetles.len()
    }
}

fn drift(mob: &mut Mob, decay_per_sec: f32, dt: f32) {
    mob.x += mob.vx * dt;
    mob.y += mob.vy * dt;
    mob.vx = physics::decay(mob.vx, decay_per_sec, dt);
    mob.vy = physics::decay(mob.vy, decay_per_sec, dt);
    if mob.vx.abs() < 0.01 && mob.vy.abs() < 0.01 {
        mob.vx = 0.0;
        mob.vy = 0.0;
    }
}

// Beetles separate as circles sized between their ellipse axes.
fn body_radius(mob: &Mob) -> f32 {
    let (major, minor) = mob.semi_axes();
    (major + minor) * 0.5
}

pub fn nearest_body(bodies: &[PlayerBody], x: f32, y: f32, range: f32) -> Option<&PlayerBody> {
    let mut best = None;
    let mut best_d = range * range;
    for body in bodies.iter().filter(|b| b.alive) {
        let d = dist_sq(body.x, body.y, x, y);
        if d <= best_d {
            best_d = d;
            best = Some(body);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::systems::traps::{TrapField, TrapSpec};
    use crate::domain::tuning::projectile::TrapTuning;
    use crate::domain::tuning::world::WorldTuning;
    use crate::domain::walls::ZoneGrid;
    use rand::SeedableRng;

    fn registry(target: usize) -> MobRegistry {
        MobRegistry::new(
            MobSpawnTuning {
                target_population: target,
                ..MobSpawnTuning::default()
            },
            StdRng::seed_from_u64(1),
        )
    }

    fn open_walls() -> Walls {
        let rows = vec!["....".to_string(); 4];
        let grid = ZoneGrid::parse(500.0, &rows).expect("grid");
        Walls::from_zone_grid(&grid, &WorldTuning::default())
    }

    fn trap_spec(x: f32, y: f32) -> TrapSpec {
        TrapSpec {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            damage: 1.0,
            hp: 50.0,
            size: 15.0,
            duration_ms: 5000.0,
            rarity: Rarity::Common,
            weight: 5.0,
            is_riot: false,
            cap: None,
        }
    }

    fn mob_at(reg: &mut MobRegistry, ids: &mut IdGen, kind: MobKind, rarity: Rarity, x: f32, y: f32) -> EntityId {
        reg.spawn_forced(kind, rarity, Some((x, y)), ids, &open_walls())
            .expect("room for mob")
    }

    #[test]
    fn when_batch_exceeds_ceiling_then_population_stops_at_target() {
        let mut reg = registry(5);
        let mut ids = IdGen::default();
        let walls = open_walls();

        assert_eq!(reg.spawn_batch(MobKind::Food, 100, &mut ids, &walls), 5);
        assert_eq!(reg.spawn_batch(MobKind::Food, 100, &mut ids, &walls), 0);
        assert!(reg.spawn(MobKind::Food, &mut ids, &walls).is_none());
        assert!(reg.spawn_forced(MobKind::Food, Rarity::Rare, None, &mut ids, &walls).is_none());
        assert_eq!(reg.count(MobKind::Food), 5);
        // Kinds have independent ceilings.
        assert_eq!(reg.spawn_batch(MobKind::Beetle, 3, &mut ids, &walls), 3);
    }

    #[test]
    fn when_default_ceiling_is_reached_then_further_batches_spawn_nothing() {
        let mut reg = MobRegistry::new(MobSpawnTuning::default(), StdRng::seed_from_u64(3));
        let mut ids = IdGen::default();
        let walls = open_walls();
        let batch = MobSpawnTuning::default().batch;

        let mut spawned = 0;
        for _ in 0..8 {
            spawned += reg.spawn_batch(MobKind::Beetle, batch, &mut ids, &walls);
        }
        assert_eq!(spawned, 800);
        assert_eq!(reg.count(MobKind::Beetle), 800);

        assert_eq!(reg.spawn_batch(MobKind::Beetle, batch, &mut ids, &walls), 0);
        assert_eq!(reg.count(MobKind::Beetle), 800);
    }

    #[test]
    fn when_every_roll_is_super_then_only_one_natural_super_per_kind_spawns() {
        let mut reg = MobRegistry::new(
            MobSpawnTuning {
                target_population: 50,
                rarity_weights: [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
                ..MobSpawnTuning::default()
            },
            StdRng::seed_from_u64(21),
        );
        let mut ids = IdGen::default();
        let walls = open_walls();

        for _ in 0..5 {
            reg.spawn_batch(MobKind::Food, 10, &mut ids, &walls);
            reg.spawn_batch(MobKind::Beetle, 10, &mut ids, &walls);
        }

        for kind in [MobKind::Food, MobKind::Beetle] {
            let list = reg.list(kind);
            assert_eq!(list.len(), 50);
            let supers = list
                .iter()
                .filter(|m| m.natural && m.rarity == Rarity::Super)
                .count();
            assert_eq!(supers, 1);
            assert!(list.iter().all(|m| m.rarity == Rarity::Super || m.rarity == Rarity::Ultra));
        }
    }

    #[test]
    fn when_natural_super_dies_then_the_next_roll_may_be_super_again() {
        let mut reg = MobRegistry::new(
            MobSpawnTuning {
                target_population: 10,
                rarity_weights: [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
                ..MobSpawnTuning::default()
            },
            StdRng::seed_from_u64(22),
        );
        let mut ids = IdGen::default();
        let walls = open_walls();
        let first = reg.spawn(MobKind::Food, &mut ids, &walls).expect("spawn");
        let (x, y) = reg.get(MobKind::Food, first).map(|m| (m.x, m.y)).expect("mob");

        assert!(reg.apply_damage(MobKind::Food, first, 1.0e12, x, y).is_some());
        assert!(!reg.has_natural_super(MobKind::Food));

        let next = reg.spawn(MobKind::Food, &mut ids, &walls).expect("spawn");
        assert_eq!(reg.get(MobKind::Food, next).map(|m| m.rarity), Some(Rarity::Super));
    }

    #[test]
    fn when_admin_spawns_super_then_downgrade_is_skipped() {
        let mut reg = registry(10);
        let mut ids = IdGen::default();
        mob_at(&mut reg, &mut ids, MobKind::Food, Rarity::Super, 100.0, 100.0);
        mob_at(&mut reg, &mut ids, MobKind::Food, Rarity::Super, 300.0, 100.0);

        let supers = reg.list(MobKind::Food).iter().filter(|m| m.rarity == Rarity::Super).count();
        assert_eq!(supers, 2);
        assert!(!reg.has_natural_super(MobKind::Food));
    }

    #[test]
    fn when_lethal_damage_lands_twice_then_only_one_kill_is_produced() {
        let mut reg = registry(10);
        let mut ids = IdGen::default();
        let id = mob_at(&mut reg, &mut ids, MobKind::Food, Rarity::Rare, 100.0, 100.0);

        let kill = reg
            .apply_damage(MobKind::Food, id, 10_000.0, 100.0, 100.0)
            .expect("lethal hit kills");
        assert_eq!(kill.mob_id, id);
        assert_eq!(kill.stars, Rarity::Rare.stars());
        assert_eq!(kill.rarity, Rarity::Rare);

        assert!(reg.apply_damage(MobKind::Food, id, 10_000.0, 100.0, 100.0).is_none());
        assert_eq!(reg.count(MobKind::Food), 0);
    }

    #[test]
    fn when_source_is_far_or_amount_invalid_then_damage_is_ignored() {
        let mut reg = registry(10);
        let mut ids = IdGen::default();
        let id = mob_at(&mut reg, &mut ids, MobKind::Food, Rarity::Common, 100.0, 100.0);
        let full = reg.get(MobKind::Food, id).map(|m| m.hp);

        assert!(reg.apply_damage(MobKind::Food, id, 5.0, 100.0, 3000.0).is_none());
        assert!(reg.apply_damage(MobKind::Food, id, f32::NAN, 100.0, 100.0).is_none());
        assert!(reg.apply_damage(MobKind::Food, id, -5.0, 100.0, 100.0).is_none());
        assert!(reg.apply_damage(MobKind::Food, 9999, 5.0, 100.0, 100.0).is_none());
        // Wrong kind for the id is a missing mob.
        assert!(reg.apply_damage(MobKind::Beetle, id, 500.0, 100.0, 100.0).is_none());

        assert_eq!(reg.get(MobKind::Food, id).map(|m| m.hp), full);
    }

    #[test]
    fn when_hp_drops_below_zero_outside_the_funnel_then_purge_removes_it() {
        let mut reg = registry(10);
        let mut ids = IdGen::default();
        mob_at(&mut reg, &mut ids, MobKind::Food, Rarity::Common, 100.0, 100.0);
        mob_at(&mut reg, &mut ids, MobKind::Beetle, Rarity::Common, 400.0, 400.0);
        reg.food[0].hp = -3.0;

        assert_eq!(reg.purge_dead(), 1);
        assert!(reg.iter().all(|m| m.hp > 0.0));
    }

    #[test]
    fn when_map_is_all_wall_then_spawn_is_skipped() {
        let mut reg = registry(10);
        let mut ids = IdGen::default();
        let rows = vec!["##".to_string(); 2];
        let grid = ZoneGrid::parse(500.0, &rows).expect("grid");
        let walls = Walls::from_zone_grid(&grid, &WorldTuning::default());

        assert!(reg.spawn(MobKind::Food, &mut ids, &walls).is_none());
        assert_eq!(reg.count(MobKind::Food), 0);
    }

    #[test]
    fn when_player_is_in_vision_then_beetle_closes_distance() {
        let mut reg = registry(10);
        let mut ids = IdGen::default();
        mob_at(&mut reg, &mut ids, MobKind::Beetle, Rarity::Common, 200.0, 200.0);
        let body = PlayerBody {
            id: 1,
            x: 600.0,
            y: 200.0,
            size: 25.0,
            alive: true,
        };

        reg.move_mobs(&[body], &open_walls(), 0.1);

        let beetle = &reg.list(MobKind::Beetle)[0];
        assert!(beetle.x > 200.0);
        assert!(beetle.angle.abs() < 1e-3);
    }

    #[test]
    fn when_player_is_dead_then_beetle_ignores_it() {
        let mut reg = registry(10);
        let mut ids = IdGen::default();
        mob_at(&mut reg, &mut ids, MobKind::Beetle, Rarity::Common, 200.0, 200.0);
        let body = PlayerBody {
            id: 1,
            x: 600.0,
            y: 200.0,
            size: 25.0,
            alive: false,
        };

        reg.move_mobs(&[body], &open_walls(), 0.1);

        assert_eq!(reg.list(MobKind::Beetle)[0].x, 200.0);
    }

    #[test]
    fn when_beetles_overlap_then_they_separate_within_the_step_bound() {
        let mut reg = registry(10);
        let mut ids = IdGen::default();
        mob_at(&mut reg, &mut ids, MobKind::Beetle, Rarity::Common, 200.0, 200.0);
        mob_at(&mut reg, &mut ids, MobKind::Beetle, Rarity::Common, 210.0, 200.0);

        reg.separate_beetles();

        let (a, b) = (&reg.beetles[0], &reg.beetles[1]);
        let step = MobSpawnTuning::default().max_separation_step;
        assert!(b.x - a.x > 10.0);
        assert!((a.x - 200.0).abs() <= step + 1e-4);
        assert!((b.x - 210.0).abs() <= step + 1e-4);
    }

    #[test]
    fn when_mob_sits_inside_a_wall_then_purge_enclosed_drops_it_silently() {
        let mut reg = registry(10);
        let mut ids = IdGen::default();
        mob_at(&mut reg, &mut ids, MobKind::Food, Rarity::Common, 100.0, 100.0);
        let rows = vec!["#.".to_string(), "..".to_string()];
        let grid = ZoneGrid::parse(500.0, &rows).expect("grid");
        let walls = Walls::from_zone_grid(&grid, &WorldTuning::default());

        assert_eq!(reg.purge_enclosed(&walls), 1);
        assert_eq!(reg.count(MobKind::Food), 0);
    }

    #[test]
    fn when_trap_is_in_spawn_grace_then_beetles_do_not_push_it() {
        let mut reg = registry(10);
        let mut ids = IdGen::default();
        mob_at(&mut reg, &mut ids, MobKind::Beetle, Rarity::Common, 500.0, 500.0);
        let mut field = TrapField::new(TrapTuning::default());
        field.spawn(1, trap_spec(510.0, 500.0), 0.0, &mut ids);
        let grace = field.grace_ms();

        reg.repel_beetles_from_traps(field.traps_mut(), 10.0, grace);
        assert_eq!(field.traps()[0].x, 510.0);
        assert_eq!(reg.list(MobKind::Beetle)[0].x, 500.0);

        reg.repel_beetles_from_traps(field.traps_mut(), grace + 1.0, grace);
        assert!(field.traps()[0].x > 510.0);
        assert!(reg.list(MobKind::Beetle)[0].x < 500.0);
    }

    #[test]
    fn when_beetle_chases_across_a_wall_then_its_center_stays_outside() {
        let mut reg = registry(10);
        let mut ids = IdGen::default();
        let rows = vec!["..#..".to_string(); 5];
        let grid = ZoneGrid::parse(100.0, &rows).expect("grid");
        let walls = Walls::from_zone_grid(&grid, &WorldTuning::default());
        reg.spawn_forced(MobKind::Beetle, Rarity::Common, Some((150.0, 250.0)), &mut ids, &walls)
            .expect("spawn");
        let body = PlayerBody {
            id: 1,
            x: 450.0,
            y: 250.0,
            size: 25.0,
            alive: true,
        };

        for _ in 0..200 {
            reg.move_mobs(&[body], &walls, 0.02);
            let beetle = &reg.list(MobKind::Beetle)[0];
            assert!(!walls.point_in_wall(beetle.x, beetle.y));
            assert!(beetle.x < 200.0);
        }
    }
}
