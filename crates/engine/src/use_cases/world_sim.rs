//! Things that happen around the player between peaceful moves.
//!
//! Monsters off the safe levels chase a nearby player and wander otherwise.
//! NPCs walking home take one step per player move, and followers trail the
//! player.

use oakhaven_domain::catalog::Zone;
use oakhaven_domain::{MonsterId, MonsterState, NpcStatus, Position};

use crate::use_cases::context::RulesContext;
use crate::use_cases::scene::Scene;

/// Monsters further away than this stay put.
pub const ROAM_DISTANCE: i32 = 20;
/// Followers further away than this (Manhattan) are left behind.
pub const FOLLOW_DISTANCE: i32 = 5;

/// One turn of monster behaviour on the player's level.
///
/// Returns the monster that reached the player, if any; the caller starts
/// the fight.
pub fn environment_turn(scene: &mut Scene, rules: &RulesContext) -> Option<MonsterId> {
    let player_at = scene.player.position;
    if scene.in_combat() || Zone::from_level(player_at.z).is_safe() {
        return None;
    }
    let aggro = rules.settings().world_aggro_radius;
    let roam_chance = rules.settings().roam_chance_percent;

    let actors: Vec<MonsterId> = scene
        .monsters
        .iter()
        .filter(|m| {
            m.is_alive
                && m.position.same_level(&player_at)
                && matches!(m.state, MonsterState::Idle | MonsterState::Hunting)
        })
        .map(|m| m.id)
        .collect();

    for id in actors {
        let Some(from) = scene.monster(id).map(|m| m.position) else {
            continue;
        };
        let distance = from.chebyshev(&player_at);

        let destination = if distance <= aggro {
            let (dx, dy) = from.direction_to(&player_at);
            if from.offset(dx, dy) == player_at {
                tracing::debug!(monster_id = %id, "Monster ambushes the player");
                return Some(id);
            }
            if let Some(monster) = scene.monster_mut(id) {
                monster.state = MonsterState::Hunting;
            }
            scene.step_toward(from, player_at)
        } else if distance < ROAM_DISTANCE && rules.chance(roam_chance) {
            let (rx, ry) = (rules.range(-1, 1), rules.range(-1, 1));
            let target = from.offset(rx, ry);
            ((rx, ry) != (0, 0) && scene.is_open(target)).then_some(target)
        } else {
            None
        };

        let Some(next) = destination else {
            continue;
        };
        if let Some(monster) = scene.monster_mut(id) {
            monster.position = next;
        }
        if next.chebyshev(&player_at) <= 1 {
            tracing::debug!(monster_id = %id, "Monster closes in on the player");
            return Some(id);
        }
    }
    None
}

/// Walk every NPC heading home one step; NPCs already there arrive.
pub fn process_npc_schedules(scene: &mut Scene) {
    let level = scene.player.position.z;
    let walkers: Vec<_> = scene
        .npcs
        .iter()
        .filter(|n| n.position.z == level && n.quest_state.status == NpcStatus::WalkingHome)
        .filter_map(|n| n.quest_state.target.map(|t| (n.id, n.position, t)))
        .collect();

    for (id, from, target) in walkers {
        if from == target {
            if let Some(npc) = scene.npc_mut(id) {
                npc.arrive();
                tracing::debug!(npc = %npc.name, "NPC arrived home");
            }
            continue;
        }
        if let Some(next) = scene.step_toward(from, target) {
            if let Some(npc) = scene.npc_mut(id) {
                npc.position = next;
            }
        }
    }
}

/// Followers close behind step into the tile the player just left.
pub fn trail_followers(scene: &mut Scene, vacated: Position) {
    if scene.player.position == vacated {
        return;
    }
    for npc in scene.npcs.iter_mut().filter(|n| n.is_following()) {
        if npc.position.same_level(&vacated)
            && npc.position != vacated
            && npc.position.manhattan(&vacated) <= FOLLOW_DISTANCE
        {
            npc.position = vacated;
            // Only one follower fits on the vacated tile
            break;
        }
    }
}
