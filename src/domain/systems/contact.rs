// Player bodies versus mobs: contact damage both ways, aura damage and regen.

use crate::domain::state::{BodyKind, EntityId, Kill, MobKind, Player, PlayerId};
use crate::domain::systems::mobs::MobRegistry;
use crate::domain::tuning::player::PlayerTuning;
use std::collections::HashMap;

/// Contact damage per second a player body deals at its level.
pub fn body_damage(level: u32, tuning: &PlayerTuning) -> f32 {
    tuning.base_body_damage + level.saturating_sub(1) as f32 * tuning.body_damage_per_level
}

pub fn aura_radius(player: &Player, tuning: &PlayerTuning) -> Option<f32> {
    let loadout = player.state.loadout;
    (loadout.body == BodyKind::Aura).then(|| {
        tuning.aura_base_radius + loadout.body_rarity.tier() as f32 * tuning.aura_radius_per_tier
    })
}

pub fn tick_players(
    players: &mut HashMap<PlayerId, Player>,
    mobs: &mut MobRegistry,
    tuning: &PlayerTuning,
    dt: f32,
) -> Vec<Kill> {
    let mut kills = Vec::new();
    for player in players.values_mut().filter(|p| p.alive) {
        let (px, py, size) = (player.state.x, player.state.y, player.state.size);

        let touching: Vec<(MobKind, EntityId, f32)> = mobs
            .iter()
            .filter(|m| m.hitbox().overlaps_circle(px, py, size))
            .map(|m| (m.kind, m.id, m.body_damage))
            .collect();
        let dealt = body_damage(player.state.level, tuning) * dt;
        for (kind, id, taken) in touching {
            player.hp -= taken * dt;
            if let Some(payload) = mobs.apply_damage(kind, id, dealt, px, py) {
                kills.push(Kill {
                    player_id: player.id,
                    payload,
                });
            }
        }

        if let Some(radius) = aura_radius(player, tuning) {
            let dps = tuning.aura_base_damage * player.state.loadout.body_rarity.stat_multiplier();
            let inside: Vec<(MobKind, EntityId)> = mobs
                .iter()
                .filter(|m| m.hitbox().overlaps_circle(px, py, radius))
                .map(|m| (m.kind, m.id))
                .collect();
            for (kind, id) in inside {
                if let Some(payload) = mobs.apply_damage(kind, id, dps * dt, px, py) {
                    kills.push(Kill {
                        player_id: player.id,
                        payload,
                    });
                }
            }
        }

        if player.hp <= 0.0 {
            player.hp = 0.0;
            player.alive = false;
            continue;
        }
        let max = player.state.max_hp;
        player.hp = (player.hp + max * tuning.regen_fraction * dt).min(max);
    }
    kills
}
