// The room aggregate: every registry of one isolated arena plus its clocks.

use super::types::{RoomEvent, RoomUpdate};
use crate::domain::state::{IdGen, Kill, MobKind, Player, PlayerId, PlayerState};
use crate::domain::systems::contact;
use crate::domain::systems::drones::DroneFleet;
use crate::domain::systems::mobs::MobRegistry;
use crate::domain::systems::projectiles::BulletField;
use crate::domain::systems::traps::TrapField;
use crate::domain::tuning::drone::{HiveTuning, OverlordTuning};
use crate::domain::tuning::mob::MobSpawnTuning;
use crate::domain::tuning::player::PlayerTuning;
use crate::domain::tuning::projectile::{BulletTuning, TrapTuning};
use crate::domain::walls::Walls;
use crate::domain::{
    BulletSnapshot, DroneSnapshot, MobSnapshot, PlayerSnapshot, TrapSnapshot,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Gameplay tuning bundle a room is built from.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomTuning {
    pub spawn: MobSpawnTuning,
    pub bullet: BulletTuning,
    pub trap: TrapTuning,
    pub hive: HiveTuning,
    pub overlord: OverlordTuning,
    pub player: PlayerTuning,
}

pub struct Room {
    walls: Arc<Walls>,
    ids: IdGen,
    mobs: MobRegistry,
    bullets: BulletField,
    traps: TrapField,
    drones: DroneFleet,
    players: HashMap<PlayerId, Player>,
    tuning: RoomTuning,
    clock_ms: f64,
    tick: u64,
    seq: u64,
}

impl Room {
    pub fn new(walls: Arc<Walls>, tuning: RoomTuning, seed: u64) -> Self {
        Self {
            walls,
            ids: IdGen::default(),
            mobs: MobRegistry::new(tuning.spawn, StdRng::seed_from_u64(seed)),
            bullets: BulletField::new(tuning.bullet),
            traps: TrapField::new(tuning.trap),
            drones: DroneFleet::new(tuning.hive, tuning.overlord),
            players: HashMap::new(),
            tuning,
            clock_ms: 0.0,
            tick: 0,
            seq: 0,
        }
    }

    pub fn walls(&self) -> &Walls {
        &self.walls
    }

    pub fn mobs(&self) -> &MobRegistry {
        &self.mobs
    }

    pub fn players(&self) -> &HashMap<PlayerId, Player> {
        &self.players
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Applies one queued event. A `Hit` may finish a mob and yield a kill.
    pub fn apply_event(&mut self, event: RoomEvent) -> Option<Kill> {
        match event {
            RoomEvent::Join { player_id, state } => {
                self.join(player_id, state);
                None
            }
            RoomEvent::State { player_id, state } => {
                self.update_state(player_id, state);
                None
            }
            RoomEvent::Hit {
                player_id,
                kind,
                mob_id,
                damage,
                x,
                y,
            } => {
                // Dead players deal no damage until they rejoin.
                if !self.players.get(&player_id).is_some_and(|p| p.alive) {
                    return None;
                }
                self.mobs
                    .apply_damage(kind, mob_id, damage, x, y)
                    .map(|payload| Kill { player_id, payload })
            }
            RoomEvent::Shoot { player_id, bullets } => {
                if self.players.get(&player_id).is_some_and(|p| p.alive) {
                    for spec in bullets {
                        self.bullets.spawn(player_id, spec, &mut self.ids);
                    }
                }
                None
            }
            RoomEvent::Square { player_id, trap } => {
                if self.players.get(&player_id).is_some_and(|p| p.alive) {
                    let (_, evicted) = self.traps.spawn(player_id, trap, self.clock_ms, &mut self.ids);
                    if evicted > 0 {
                        debug!(player_id, evicted, "trap cap reached; evicted oldest");
                    }
                }
                None
            }
            RoomEvent::ClearSquares { player_id } => {
                self.traps.clear_owner(player_id);
                None
            }
            RoomEvent::Leave { player_id } => {
                self.leave(player_id);
                None
            }
            RoomEvent::AdminSpawn {
                kind,
                rarity,
                position,
            } => {
                let spawned = self
                    .mobs
                    .spawn_forced(kind, rarity, position, &mut self.ids, &self.walls);
                debug!(kind = kind.as_str(), rarity = rarity.as_str(), spawned = spawned.is_some(), "admin spawn");
                None
            }
        }
    }

    // (Re)joining resets health, which is also how a dead player respawns.
    fn join(&mut self, player_id: PlayerId, mut state: PlayerState) {
        settle_body(&self.walls, &mut state);
        let player = Player {
            id: player_id,
            hp: state.max_hp,
            state,
            alive: true,
        };
        self.drones.sync_loadout(&player);
        self.players.insert(player_id, player);
    }

    fn update_state(&mut self, player_id: PlayerId, mut state: PlayerState) {
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };
        settle_body(&self.walls, &mut state);
        let loadout_changed = player.state.loadout != state.loadout;
        player.state = state;
        player.hp = player.hp.min(player.state.max_hp);
        if loadout_changed {
            self.drones.sync_loadout(player);
        }
    }

    fn leave(&mut self, player_id: PlayerId) {
        self.players.remove(&player_id);
        self.bullets.remove_owner(player_id);
        self.traps.clear_owner(player_id);
        self.drones.remove_owner(player_id);
    }

    /// Advances the simulation by one fixed step and returns credited kills.
    pub fn step(&mut self, dt: f32) -> Vec<Kill> {
        self.clock_ms += f64::from(dt) * 1000.0;
        self.tick += 1;
        let now = self.clock_ms;
        let walls = Arc::clone(&self.walls);
        let mut kills = Vec::new();

        let bodies: Vec<_> = self.players.values().map(Player::body).collect();
        self.mobs.move_mobs(&bodies, &walls, dt);
        self.mobs.separate_beetles();
        let grace_ms = self.traps.grace_ms();
        self.mobs
            .repel_beetles_from_traps(self.traps.traps_mut(), now, grace_ms);
        self.mobs.resolve_walls(&walls);

        self.mobs.purge_enclosed(&walls);

        kills.extend(
            self.bullets
                .tick(dt, &mut self.mobs, self.traps.traps_mut(), &walls),
        );

        self.traps.integrate(dt, now, &walls);
        self.traps.collide_traps(now);
        self.traps.resolve_walls(&walls);
        kills.extend(self.traps.damage_mobs(dt, now, &mut self.mobs));
        self.traps.expire(now);

        kills.extend(contact::tick_players(
            &mut self.players,
            &mut self.mobs,
            &self.tuning.player,
            dt,
        ));

        kills.extend(self.drones.tick(
            dt,
            now,
            &self.players,
            &mut self.mobs,
            &mut self.ids,
            &walls,
        ));

        self.mobs.purge_dead();
        kills
    }

    /// Natural replenishment: one capped batch per kind.
    pub fn spawn_cycle(&mut self) -> usize {
        let batch = self.tuning.spawn.batch;
        MobKind::ALL
            .into_iter()
            .map(|kind| self.mobs.spawn_batch(kind, batch, &mut self.ids, &self.walls))
            .sum()
    }

    /// Packages the current state under the next sequence number.
    pub fn snapshot(&mut self) -> RoomUpdate {
        self.seq += 1;
        RoomUpdate {
            seq: self.seq,
            tick: self.tick,
            food: self
                .mobs
                .list(MobKind::Food)
                .iter()
                .map(MobSnapshot::from)
                .collect(),
            beetles: self
                .mobs
                .list(MobKind::Beetle)
                .iter()
                .map(MobSnapshot::from)
                .collect(),
            bullets: self
                .bullets
                .bullets()
                .iter()
                .map(BulletSnapshot::from)
                .collect(),
            traps: self.traps.traps().iter().map(TrapSnapshot::from).collect(),
            drones: self.drones.drones().map(DroneSnapshot::from).collect(),
            players: self.players.values().map(PlayerSnapshot::from).collect(),
        }
    }
}

// Player positions come from clients; keep the body out of walls.
fn settle_body(walls: &Walls, state: &mut PlayerState) {
    walls.clamp_to_bounds(&mut state.x, &mut state.y, state.size);
    walls.resolve_circle(&mut state.x, &mut state.y, state.size);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rarity;
    use crate::domain::state::{BodyKind, Loadout, TankKind};
    use crate::domain::systems::projectiles::BulletSpec;
    use crate::domain::systems::traps::TrapSpec;
    use crate::domain::tuning::world::WorldTuning;
    use crate::domain::walls::ZoneGrid;

    fn open_walls() -> Arc<Walls> {
        let rows = vec!["....".to_string(); 4];
        let grid = ZoneGrid::parse(500.0, &rows).expect("grid");
        Arc::new(Walls::from_zone_grid(&grid, &WorldTuning::default()))
    }

    fn room() -> Room {
        Room::new(open_walls(), RoomTuning::default(), 42)
    }

    fn state(x: f32, y: f32) -> PlayerState {
        PlayerState {
            x,
            y,
            size: 25.0,
            level: 1,
            max_hp: 100.0,
            loadout: Loadout::default(),
            aim: None,
            name: "tester".into(),
        }
    }

    fn admin_spawn(room: &mut Room, kind: MobKind, x: f32, y: f32) -> u64 {
        room.apply_event(RoomEvent::AdminSpawn {
            kind,
            rarity: Rarity::Common,
            position: Some((x, y)),
        });
        room.mobs()
            .list(kind)
            .last()
            .map(|m| m.id)
            .expect("admin spawn landed")
    }

    #[test]
    fn when_snapshots_are_taken_then_seq_increases_by_one() {
        let mut room = room();
        let a = room.snapshot();
        room.step(0.005);
        let b = room.snapshot();

        assert_eq!(a.seq + 1, b.seq);
        assert_eq!(b.tick, 1);
    }

    #[test]
    fn when_spawn_cycle_runs_then_each_kind_gets_one_batch() {
        let tuning = RoomTuning {
            spawn: MobSpawnTuning {
                batch: 7,
                target_population: 10,
                ..MobSpawnTuning::default()
            },
            ..RoomTuning::default()
        };
        let mut room = Room::new(open_walls(), tuning, 1);

        assert_eq!(room.spawn_cycle(), 14);
        assert_eq!(room.spawn_cycle(), 6);
        assert_eq!(room.spawn_cycle(), 0);
        assert_eq!(room.mobs().count(MobKind::Food), 10);
    }

    #[test]
    fn when_player_hits_twice_then_only_one_kill_is_reported() {
        let mut room = room();
        room.apply_event(RoomEvent::Join {
            player_id: 1,
            state: state(100.0, 100.0),
        });
        let id = admin_spawn(&mut room, MobKind::Food, 1500.0, 1500.0);
        let hit = RoomEvent::Hit {
            player_id: 1,
            kind: MobKind::Food,
            mob_id: id,
            damage: 1000.0,
            x: 1500.0,
            y: 1500.0,
        };

        let first = room.apply_event(hit.clone());
        let second = room.apply_event(hit);

        assert_eq!(first.map(|k| (k.player_id, k.payload.mob_id)), Some((1, id)));
        assert!(second.is_none());
    }

    #[test]
    fn when_dead_player_reports_a_hit_then_it_is_ignored_until_rejoin() {
        let mut room = room();
        room.apply_event(RoomEvent::Join {
            player_id: 1,
            state: state(100.0, 100.0),
        });
        let id = admin_spawn(&mut room, MobKind::Food, 1500.0, 1500.0);
        if let Some(p) = room.players.get_mut(&1) {
            p.hp = 0.0;
            p.alive = false;
        }
        let hit = RoomEvent::Hit {
            player_id: 1,
            kind: MobKind::Food,
            mob_id: id,
            damage: 1000.0,
            x: 1500.0,
            y: 1500.0,
        };

        assert!(room.apply_event(hit.clone()).is_none());
        assert_eq!(room.mobs().count(MobKind::Food), 1);

        room.apply_event(RoomEvent::Join {
            player_id: 1,
            state: state(100.0, 100.0),
        });
        assert!(room.apply_event(hit).is_some());
    }

    #[test]
    fn when_player_state_puts_the_body_in_a_wall_then_the_room_pushes_it_out() {
        let rows = vec!["..#..".to_string(); 5];
        let grid = ZoneGrid::parse(100.0, &rows).expect("grid");
        let walls = Arc::new(Walls::from_zone_grid(&grid, &WorldTuning::default()));
        let mut room = Room::new(Arc::clone(&walls), RoomTuning::default(), 7);

        room.apply_event(RoomEvent::Join {
            player_id: 1,
            state: state(240.0, 250.0),
        });
        let p = &room.players()[&1];
        assert!(!walls.point_in_wall(p.state.x, p.state.y));

        room.apply_event(RoomEvent::State {
            player_id: 1,
            state: state(260.0, 250.0),
        });
        let p = &room.players()[&1];
        assert!(!walls.point_in_wall(p.state.x, p.state.y));
        assert!(p.state.x > 300.0);
    }

    #[test]
    fn when_hit_comes_from_unknown_player_then_it_is_ignored() {
        let mut room = room();
        let id = admin_spawn(&mut room, MobKind::Food, 1500.0, 1500.0);

        let kill = room.apply_event(RoomEvent::Hit {
            player_id: 9,
            kind: MobKind::Food,
            mob_id: id,
            damage: 1000.0,
            x: 1500.0,
            y: 1500.0,
        });

        assert!(kill.is_none());
        assert_eq!(room.mobs().count(MobKind::Food), 1);
    }

    #[test]
    fn when_player_leaves_then_only_their_entities_are_removed() {
        let mut room = room();
        for id in [1, 2] {
            room.apply_event(RoomEvent::Join {
                player_id: id,
                state: PlayerState {
                    loadout: Loadout {
                        tank: TankKind::Overlord,
                        ..Loadout::default()
                    },
                    ..state(300.0 * id as f32, 1900.0)
                },
            });
            room.apply_event(RoomEvent::Shoot {
                player_id: id,
                bullets: vec![BulletSpec {
                    speed: 0.0,
                    ..BulletSpec::basic(100.0, 100.0 * id as f32, 0.0, &BulletTuning::default())
                }],
            });
            room.apply_event(RoomEvent::Square {
                player_id: id,
                trap: TrapSpec {
                    x: 900.0,
                    y: 400.0 * id as f32,
                    vx: 0.0,
                    vy: 0.0,
                    damage: 1.0,
                    hp: 10.0,
                    size: 10.0,
                    duration_ms: 10_000.0,
                    rarity: Rarity::Common,
                    weight: 1.0,
                    is_riot: false,
                    cap: None,
                },
            });
        }
        room.step(0.005);

        room.apply_event(RoomEvent::Leave { player_id: 1 });
        let snap = room.snapshot();

        assert!(snap.players.iter().all(|p| p.id == 2));
        assert!(snap.bullets.iter().all(|b| b.owner_id == 2) && !snap.bullets.is_empty());
        assert!(snap.traps.iter().all(|t| t.owner_id == 2) && !snap.traps.is_empty());
        assert!(snap.drones.iter().all(|d| d.owner_id == 2) && !snap.drones.is_empty());
    }

    #[test]
    fn when_new_max_hp_is_lower_then_hp_is_clamped() {
        let mut room = room();
        room.apply_event(RoomEvent::Join {
            player_id: 1,
            state: state(100.0, 100.0),
        });
        room.apply_event(RoomEvent::State {
            player_id: 1,
            state: PlayerState {
                max_hp: 40.0,
                ..state(100.0, 100.0)
            },
        });

        assert_eq!(room.players()[&1].hp, 40.0);
    }

    #[test]
    fn when_body_loses_hive_then_hive_drones_are_cleared() {
        let mut room = room();
        let hive = PlayerState {
            loadout: Loadout {
                body: BodyKind::Hive,
                ..Loadout::default()
            },
            ..state(1000.0, 1000.0)
        };
        room.apply_event(RoomEvent::Join {
            player_id: 1,
            state: hive,
        });
        room.step(0.005);
        assert_eq!(room.snapshot().drones.len(), 1);

        room.apply_event(RoomEvent::State {
            player_id: 1,
            state: state(1000.0, 1000.0),
        });

        assert!(room.snapshot().drones.is_empty());
    }

    #[test]
    fn when_ticks_run_then_no_mob_is_left_with_non_positive_hp() {
        let mut room = room();
        room.apply_event(RoomEvent::Join {
            player_id: 1,
            state: state(1000.0, 1000.0),
        });
        room.spawn_cycle();
        for _ in 0..50 {
            room.step(0.005);
            assert!(room.mobs().iter().all(|m| m.hp > 0.0));
        }
    }

    #[test]
    fn when_dead_player_rejoins_then_hp_is_restored() {
        let mut room = room();
        room.apply_event(RoomEvent::Join {
            player_id: 1,
            state: state(1000.0, 1000.0),
        });
        if let Some(p) = room.players.get_mut(&1) {
            p.hp = 0.0;
            p.alive = false;
        }

        room.apply_event(RoomEvent::Join {
            player_id: 1,
            state: state(1000.0, 1000.0),
        });

        assert!(room.players()[&1].alive);
        assert_eq!(room.players()[&1].hp, 100.0);
    }
}
