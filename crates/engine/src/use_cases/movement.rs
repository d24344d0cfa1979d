//! Player movement: collisions, gathering, doors, zone travel and the world
//! turn that follows every peaceful step.

use serde::Serialize;
use thiserror::Error;

use oakhaven_domain::catalog::{item_template, skill_name, zone_exit_at, Zone, GATHER_SKILL_XP};
use oakhaven_domain::{
    AnimationKind, CombatantRef, GameEvent, MapTile, NpcId, NpcStatus, PlayerId, Position,
    TileType,
};

use crate::infrastructure::ports::RepoError;
use crate::use_cases::combat::{CombatError, Fight};
use crate::use_cases::context::RulesContext;
use crate::use_cases::scene::{Scene, SceneStore};
use crate::use_cases::{world_sim, Rejection};

/// Fog of war lifts this far around the player.
pub const SIGHT_RADIUS: i32 = 2;

#[derive(Debug, Error)]
pub enum MovementError {
    #[error("Player not found")]
    PlayerNotFound,
    #[error("You can only move one tile at a time.")]
    InvalidStep,
    #[error("{0}")]
    Combat(#[from] CombatError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl Rejection for MovementError {
    fn is_rejection(&self) -> bool {
        match self {
            Self::Combat(e) => e.is_rejection(),
            Self::Repo(_) => false,
            _ => true,
        }
    }
}

/// A zone change decided by a step, applied once the landing area is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Travel {
    pub destination: Position,
    pub message: String,
}

/// What one step did.
#[derive(Debug, Clone, Default)]
pub struct StepOutcome {
    pub events: Vec<GameEvent>,
    pub travel: Option<Travel>,
}

impl StepOutcome {
    fn say(event: GameEvent) -> Self {
        Self {
            events: vec![event],
            travel: None,
        }
    }
}

/// Result of a movement request.
#[derive(Debug, Clone, Serialize)]
pub struct MoveResponse {
    pub position: Position,
    pub events: Vec<GameEvent>,
    pub in_combat: bool,
}

/// Try to step the player by `(dx, dy)`.
///
/// During a fight the step is pure combat movement. Otherwise the target tile
/// decides: walls bump, resource nodes are gathered, monsters start a fight,
/// NPCs make way, and zone edges hand back a [`Travel`] for the caller.
pub fn move_player(
    scene: &mut Scene,
    rules: &RulesContext,
    dx: i32,
    dy: i32,
) -> Result<StepOutcome, MovementError> {
    if dx.abs() > 1 || dy.abs() > 1 || (dx, dy) == (0, 0) {
        return Err(MovementError::InvalidStep);
    }
    let from = scene.player.position;
    let target = from.offset(dx, dy);

    if scene.in_combat() {
        let mut fight = Fight::new(scene, rules);
        fight.step_player(target)?;
        return Ok(StepOutcome {
            events: fight.into_events(),
            travel: None,
        });
    }

    let Some(tile) = scene.tile(target).cloned() else {
        if let Some(exit) = zone_exit_at(&target) {
            return Ok(travel_to(exit.destination, exit.message));
        }
        if Zone::from_level(target.z).is_underground() {
            let mut wall = MapTile::new(target, TileType::Wall);
            wall.is_visited = true;
            scene.put_tile(wall);
            return Ok(StepOutcome::say(GameEvent::info("You bump into a dark wall.")));
        }
        return Ok(StepOutcome::say(GameEvent::info("The path is blocked.")));
    };

    if tile.tile_type.resource().is_some() {
        return Ok(StepOutcome::say(gather(scene, target)));
    }

    if !tile.is_walkable() {
        if let Some(tile) = scene.tile_mut(target).filter(|t| !t.is_visited) {
            tile.is_visited = true;
        }
        return Ok(StepOutcome::say(GameEvent::info("You bump into a wall.")));
    }

    if tile.tile_type == TileType::Door {
        if let Some(door) = scene.tile_mut(target) {
            door.tile_type = TileType::OpenDoor;
        }
    }

    if let Some(destination) = tile.metadata.exit_to {
        return Ok(travel_to(destination, Zone::from_level(destination.z).arrival_text()));
    }
    if let Some(exit) = zone_exit_at(&target) {
        return Ok(travel_to(exit.destination, exit.message));
    }

    if let Some(monster) = scene.living_monster_at(target) {
        let mut fight = Fight::new(scene, rules);
        fight.begin(monster)?;
        return Ok(StepOutcome {
            events: fight.into_events(),
            travel: None,
        });
    }

    if let Some(npc_id) = scene.npc_at(target) {
        if !make_way(scene, npc_id, from) {
            let name = scene.npc(npc_id).map(|n| n.name.clone()).unwrap_or_default();
            return Ok(StepOutcome::say(GameEvent::info(format!(
                "You bump into {}. (Blocked)",
                name
            ))));
        }
    }

    let mut events = Vec::new();
    scene.player.position = target;
    events.push(GameEvent::Animation {
        kind: AnimationKind::Move,
        actor: CombatantRef::Player(scene.player.id),
        target: None,
        at: Some(target),
    });

    world_sim::process_npc_schedules(scene);
    if let Some(ambusher) = world_sim::environment_turn(scene, rules) {
        scene.reveal(target, SIGHT_RADIUS);
        events.push(GameEvent::danger("Ambushed!"));
        let mut fight = Fight::new(scene, rules);
        fight.begin(ambusher)?;
        events.extend(fight.into_events());
        return Ok(StepOutcome {
            events,
            travel: None,
        });
    }
    world_sim::trail_followers(scene, from);
    scene.reveal(target, SIGHT_RADIUS);

    let entered = tile.metadata.name.as_deref().filter(|name| {
        scene
            .tile(from)
            .and_then(|t| t.metadata.name.as_deref())
            .map_or(true, |previous| previous != *name)
    });
    let text = match entered {
        Some(name) => format!("You enter {}.", name),
        None => Zone::from_level(target.z).arrival_text().to_string(),
    };
    events.push(GameEvent::info(text));

    Ok(StepOutcome {
        events,
        travel: None,
    })
}

/// Move the player to `destination`, leaving any fight behind.
///
/// The caller loads the map around `destination` into the scene first so the
/// landing area can be revealed.
pub fn teleport(scene: &mut Scene, rules: &RulesContext, destination: Position) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if Fight::new(scene, rules).force_end() {
        events.push(GameEvent::info("You escape the fight."));
    }

    scene.player.position = destination;
    scene.reveal(destination, SIGHT_RADIUS);

    if Zone::from_level(destination.z) == Zone::Town {
        let arrival = destination.offset(1, 0);
        for npc in scene
            .npcs
            .iter_mut()
            .filter(|n| n.quest_state.status == NpcStatus::Escorting)
        {
            npc.position = arrival;
            npc.location = "Oakhaven Town".to_string();
            npc.quest_state.status = NpcStatus::Completed;
            tracing::info!(npc = %npc.name, "Escort reached town");
            events.push(GameEvent::success(format!(
                "{} arrives in Oakhaven with you.",
                npc.name
            )));
        }
    }

    tracing::debug!(player_id = %scene.player.id, %destination, "Player teleported");
    events
}

fn travel_to(destination: Position, message: &str) -> StepOutcome {
    StepOutcome {
        events: Vec::new(),
        travel: Some(Travel {
            destination,
            message: message.to_string(),
        }),
    }
}

/// Harvest the resource node at `at`. The player stays where they are.
fn gather(scene: &mut Scene, at: Position) -> GameEvent {
    let Some(node) = scene.tile(at).and_then(|t| t.tile_type.resource()) else {
        return GameEvent::info("There is nothing to gather here.");
    };
    let Some(template) = item_template(node.item_template) else {
        tracing::warn!(item = node.item_template, "Resource yields an unknown item");
        return GameEvent::info("There is nothing to gather here.");
    };

    scene.player.add_item(template.instantiate());
    let level_up = scene.player.award_skill_xp(node.skill, GATHER_SKILL_XP);
    if let Some(tile) = scene.tile_mut(at) {
        tile.tile_type = node.depleted;
        tile.is_visited = true;
    }

    let mut text = format!(
        "You gather {}. (+{} {} XP)",
        template.name,
        GATHER_SKILL_XP,
        skill_name(node.skill)
    );
    if let Some(level) = level_up {
        text.push_str(&format!(" {} is now level {}!", skill_name(node.skill), level));
    }
    GameEvent::success(text)
}

/// Shift an NPC out of the way onto a free orthogonal neighbour that is not
/// the player's own tile.
fn make_way(scene: &mut Scene, npc_id: NpcId, player_at: Position) -> bool {
    let Some(at) = scene.npc(npc_id).map(|n| n.position) else {
        return false;
    };
    let free = [(1, 0), (-1, 0), (0, 1), (0, -1)]
        .into_iter()
        .map(|(dx, dy)| at.offset(dx, dy))
        .find(|p| *p != player_at && scene.is_open(*p));
    match (free, scene.npc_mut(npc_id)) {
        (Some(spot), Some(npc)) => {
            npc.position = spot;
            true
        }
        _ => false,
    }
}

/// Movement use cases.
pub struct MovementUseCases {
    scenes: SceneStore,
    rules: RulesContext,
}

impl MovementUseCases {
    pub fn new(scenes: SceneStore, rules: RulesContext) -> Self {
        Self { scenes, rules }
    }

    pub async fn move_player(
        &self,
        player_id: PlayerId,
        dx: i32,
        dy: i32,
    ) -> Result<MoveResponse, MovementError> {
        let _guard = self.scenes.lock(player_id).await;
        let mut scene = self
            .scenes
            .load(player_id)
            .await?
            .ok_or(MovementError::PlayerNotFound)?;

        let outcome = move_player(&mut scene, &self.rules, dx, dy)?;
        let mut events = outcome.events;
        if let Some(travel) = outcome.travel {
            self.scenes.load_area(&mut scene, travel.destination).await?;
            events.extend(teleport(&mut scene, &self.rules, travel.destination));
            events.push(GameEvent::info(travel.message));
        }

        let response = MoveResponse {
            position: scene.player.position,
            events,
            in_combat: scene.in_combat(),
        };
        self.scenes.commit(scene).await?;
        Ok(response)
    }

    pub async fn teleport(
        &self,
        player_id: PlayerId,
        destination: Position,
    ) -> Result<MoveResponse, MovementError> {
        let _guard = self.scenes.lock(player_id).await;
        let mut scene = self
            .scenes
            .load(player_id)
            .await?
            .ok_or(MovementError::PlayerNotFound)?;

        self.scenes.load_area(&mut scene, destination).await?;
        let mut events = teleport(&mut scene, &self.rules, destination);
        events.push(GameEvent::info(Zone::from_level(destination.z).arrival_text()));
        let response = MoveResponse {
            position: destination,
            events,
            in_combat: false,
        };
        self.scenes.commit(scene).await?;
        tracing::info!(player_id = %player_id, %destination, "Teleport committed");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use oakhaven_domain::{Npc, TileMetadata};

    use super::*;
    use crate::infrastructure::memory::InMemoryStore;
    use crate::infrastructure::ports::{MapRepo, NpcRepo, PlayerRepo};
    use crate::use_cases::combat::test_support::*;
    use crate::use_cases::context::test_support::scripted;
    use crate::use_cases::scene::test_support::scene_store;

    fn texts(events: &[GameEvent]) -> Vec<&str> {
        events.iter().filter_map(GameEvent::text).collect()
    }

    #[test]
    fn peaceful_step_moves_and_reveals() {
        let rules = scripted([], 100);
        let mut scene = arena(hero(), vec![]);

        let outcome = move_player(&mut scene, &rules, 1, 0).unwrap();
        assert_eq!(scene.player.position, Position::new(1, 0, 0));
        assert!(scene.tile(Position::new(3, 2, 0)).unwrap().is_visited);
        assert!(texts(&outcome.events).contains(&"You step through the dungeon."));
    }

    #[test]
    fn walls_and_unmapped_rock_block() {
        let rules = scripted([], 100);
        let mut scene = arena(hero(), vec![]);
        scene.player.position = Position::new(6, 0, 0);

        let outcome = move_player(&mut scene, &rules, 1, 0).unwrap();
        assert_eq!(texts(&outcome.events), vec!["You bump into a wall."]);
        assert!(scene.tile(Position::new(7, 0, 0)).unwrap().is_visited);

        scene.player.position = Position::new(7, 0, 0);
        let outcome = move_player(&mut scene, &rules, 1, 0).unwrap();
        assert_eq!(texts(&outcome.events), vec!["You bump into a dark wall."]);
        let carved = scene.tile(Position::new(8, 0, 0)).unwrap();
        assert_eq!(carved.tile_type, TileType::Wall);
        assert!(carved.is_visited);
    }

    #[test]
    fn long_steps_are_refused() {
        let rules = scripted([], 100);
        let mut scene = arena(hero(), vec![]);
        assert!(matches!(
            move_player(&mut scene, &rules, 2, 0),
            Err(MovementError::InvalidStep)
        ));
    }

    #[test]
    fn rock_is_mined_instead_of_entered() {
        let rules = scripted([], 100);
        let mut scene = arena(hero(), vec![]);
        scene.put_tile(MapTile::new(Position::new(1, 0, 0), TileType::Rock));

        let outcome = move_player(&mut scene, &rules, 1, 0).unwrap();
        assert_eq!(scene.player.position, Position::new(0, 0, 0));
        assert_eq!(scene.player.count_item("Iron Ore"), 1);
        assert_eq!(scene.player.skills["mining"].xp, GATHER_SKILL_XP);
        assert_eq!(
            scene.tile(Position::new(1, 0, 0)).unwrap().tile_type,
            TileType::Floor
        );
        assert_eq!(
            texts(&outcome.events),
            vec!["You gather Iron Ore. (+10 Mining XP)"]
        );
    }

    #[test]
    fn doors_open_as_you_pass() {
        let rules = scripted([], 100);
        let mut scene = arena(hero(), vec![]);
        scene.put_tile(MapTile::new(Position::new(0, 1, 0), TileType::Door));

        move_player(&mut scene, &rules, 0, 1).unwrap();
        assert_eq!(scene.player.position, Position::new(0, 1, 0));
        assert_eq!(
            scene.tile(Position::new(0, 1, 0)).unwrap().tile_type,
            TileType::OpenDoor
        );
    }

    #[test]
    fn exit_tiles_hand_back_travel() {
        let rules = scripted([], 100);
        let mut scene = arena(hero(), vec![]);
        let stairs = MapTile::new(Position::new(1, 0, 0), TileType::Stairs).with_metadata(
            TileMetadata {
                exit_to: Some(Position::new(0, 0, 3)),
                ..TileMetadata::default()
            },
        );
        scene.put_tile(stairs);

        let outcome = move_player(&mut scene, &rules, 1, 0).unwrap();
        let travel = outcome.travel.unwrap();
        assert_eq!(travel.destination, Position::new(0, 0, 3));
        assert_eq!(scene.player.position, Position::new(0, 0, 0));
    }

    #[test]
    fn bumping_a_monster_starts_a_fight() {
        // player initiative 20, skeleton 1
        let rules = scripted([20, 1], 100);
        let mut scene = arena(hero(), vec![skeleton_at(1, 0)]);

        let outcome = move_player(&mut scene, &rules, 1, 0).unwrap();
        assert!(scene.in_combat());
        assert_eq!(scene.player.position, Position::new(0, 0, 0));
        assert!(texts(&outcome.events).contains(&"Combat started!"));
    }

    #[test]
    fn combat_steps_spend_movement_and_respect_turns() {
        let rules = scripted([20, 1], 100);
        let mut scene = arena(hero(), vec![skeleton_at(4, 0)]);
        let id = scene.monsters[0].id;
        Fight::new(&mut scene, &rules).begin(id).unwrap();

        move_player(&mut scene, &rules, 0, 1).unwrap();
        assert_eq!(scene.player.position, Position::new(0, 1, 0));
        assert_eq!(scene.active_encounter().unwrap().budget.moves_left, 5);

        // Stepping into the skeleton does not open a second fight
        scene.player.position = Position::new(3, 0, 0);
        let err = move_player(&mut scene, &rules, 1, 0).unwrap_err();
        assert!(err.is_rejection());
    }

    #[test]
    fn npc_steps_aside_or_blocks() {
        let rules = scripted([], 100);
        let npc = Npc::new("Gareth", "Gareth Ironhand", Position::new(1, 0, 0));
        let mut scene = arena(hero(), vec![]).with_npc(npc);

        move_player(&mut scene, &rules, 1, 0).unwrap();
        assert_eq!(scene.player.position, Position::new(1, 0, 0));
        assert_eq!(scene.npcs[0].position, Position::new(2, 0, 0));

        // Wedged into a corner with no free neighbour
        let npc = Npc::new("Elara", "Elara", Position::new(6, 6, 0));
        let mut scene = arena(hero(), vec![]).with_npc(npc);
        scene.player.position = Position::new(6, 5, 0);
        scene.put_tile(MapTile::new(Position::new(5, 6, 0), TileType::Wall));
        let outcome = move_player(&mut scene, &rules, 0, 1).unwrap();
        assert_eq!(texts(&outcome.events), vec!["You bump into Elara. (Blocked)"]);
        assert_eq!(scene.player.position, Position::new(6, 5, 0));
    }

    #[test]
    fn teleport_to_town_ends_fights_and_brings_escorts() {
        let rules = scripted([20, 1], 100);
        let escort =
            Npc::new("Elara", "Elara", Position::new(2, 2, 0)).with_status(NpcStatus::Escorting);
        let mut scene = arena(hero(), vec![skeleton_at(1, 0)]).with_npc(escort);
        let id = scene.monsters[0].id;
        Fight::new(&mut scene, &rules).begin(id).unwrap();

        let events = teleport(&mut scene, &rules, Position::new(0, 0, 1));
        assert!(!scene.in_combat());
        assert_eq!(scene.player.position, Position::new(0, 0, 1));
        let elara = &scene.npcs[0];
        assert_eq!(elara.position, Position::new(1, 0, 1));
        assert_eq!(elara.quest_state.status, NpcStatus::Completed);
        assert_eq!(
            texts(&events),
            vec!["You escape the fight.", "Elara arrives in Oakhaven with you."]
        );
    }

    #[tokio::test]
    async fn leaving_town_north_lands_in_the_forest() {
        let store = Arc::new(InMemoryStore::new());
        let mut player = hero();
        player.position = Position::new(0, -18, 1);
        store
            .seed_tiles([
                MapTile::new(Position::new(0, -18, 1), TileType::Grass),
                MapTile::new(Position::new(0, 28, 2), TileType::Grass),
                MapTile::new(Position::new(1, 28, 2), TileType::Grass),
            ])
            .await;
        PlayerRepo::save(store.as_ref(), &player).await.unwrap();
        let movement = MovementUseCases::new(scene_store(&store), scripted([], 100));

        let response = movement.move_player(player.id, 0, -1).await.unwrap();
        assert_eq!(response.position, Position::new(0, 28, 2));
        assert_eq!(
            response.events.last().and_then(GameEvent::text),
            Some("You leave Oakhaven and enter the North Forest.")
        );

        let saved = PlayerRepo::get(store.as_ref(), player.id).await.unwrap().unwrap();
        assert_eq!(saved.position, Position::new(0, 28, 2));
        let landing = store.get_tile(Position::new(1, 28, 2)).await.unwrap().unwrap();
        assert!(landing.is_visited);
    }

    #[tokio::test]
    async fn follower_trails_across_a_committed_step() {
        let store = Arc::new(InMemoryStore::new());
        store.seed_tiles(room(6)).await;
        let player = hero();
        let mut elara = Npc::new("Elara", "Elara", Position::new(-1, 0, 0));
        elara.follow();
        PlayerRepo::save(store.as_ref(), &player).await.unwrap();
        NpcRepo::save(store.as_ref(), &elara).await.unwrap();
        let movement = MovementUseCases::new(scene_store(&store), scripted([], 100));

        let response = movement.move_player(player.id, 1, 0).await.unwrap();
        assert!(!response.in_combat);
        let saved = NpcRepo::get(store.as_ref(), elara.id).await.unwrap().unwrap();
        assert_eq!(saved.position, Position::new(0, 0, 0));
    }
}
