//! Looking around: opening loot windows and searching walls.

use serde::Serialize;
use thiserror::Error;

use oakhaven_domain::{Ability, GameEvent, LootEntry, NpcStatus, PlayerId, Position, TileType};

use crate::infrastructure::narrator::Narration;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::context::RulesContext;
use crate::use_cases::inventory::{LootSource, LootSource::*, LOOT_RANGE};
use crate::use_cases::scene::{Scene, SceneStore};
use crate::use_cases::Rejection;

/// Difficulty used when a hidden tile does not name its own.
pub const DEFAULT_DISCOVERY_DC: i32 = 10;
/// Captives this close to a discovered door make a run for it.
pub const ESCAPE_RADIUS: i32 = 5;

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("Player not found")]
    PlayerNotFound,
    #[error("There is nothing here to loot.")]
    NothingToLoot,
    #[error("It's gone.")]
    Gone,
    #[error("Too far away.")]
    TooFar,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl Rejection for InteractionError {
    fn is_rejection(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LootView {
    /// Contents to pick from with `take_loot`.
    Window {
        source: LootSource,
        name: String,
        loot: Vec<LootEntry>,
    },
    /// The source was empty and has been cleared away.
    Empty { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectOutcome {
    pub found: bool,
    pub events: Vec<GameEvent>,
}

/// Open the loot of `source`, or of the first corpse or chest within reach.
pub fn loot_window(
    scene: &mut Scene,
    source: Option<LootSource>,
) -> Result<LootView, InteractionError> {
    let reach = scene.player.position;
    let source = match source {
        Some(source) => source,
        None => nearby_source(scene, reach).ok_or(InteractionError::NothingToLoot)?,
    };

    let (name, loot, position) = match source {
        Corpse(id) => {
            let corpse = scene
                .monster(id)
                .filter(|m| !m.is_alive)
                .ok_or(InteractionError::Gone)?;
            (corpse.name.clone(), corpse.loot.clone(), corpse.position)
        }
        Object(id) => {
            let object = scene
                .objects
                .iter()
                .find(|o| o.id == id)
                .ok_or(InteractionError::Gone)?;
            (object.name.clone(), object.loot.clone(), object.position)
        }
    };
    if !position.within_box(&reach, LOOT_RANGE) {
        return Err(InteractionError::TooFar);
    }

    if !loot.is_empty() {
        return Ok(LootView::Window { source, name, loot });
    }
    let message = match source {
        Corpse(id) => {
            scene.remove_monster(id);
            "The corpse is empty."
        }
        Object(id) => {
            scene.remove_object(id);
            "It's empty."
        }
    };
    Ok(LootView::Empty {
        message: message.to_string(),
    })
}

fn nearby_source(scene: &Scene, reach: Position) -> Option<LootSource> {
    let corpse = scene
        .monsters
        .iter()
        .find(|m| !m.is_alive && m.position.within_box(&reach, LOOT_RANGE))
        .map(|m| Corpse(m.id));
    corpse.or_else(|| {
        scene
            .objects
            .iter()
            .find(|o| o.position.within_box(&reach, LOOT_RANGE))
            .map(|o| Object(o.id))
    })
}

/// Search the tile at `at` for hidden features.
///
/// A secret passage needs `1d20 + WIS` to meet its discovery difficulty.
/// Once found it becomes a door, and captives nearby start escorting the
/// player out.
pub fn inspect(
    scene: &mut Scene,
    rules: &RulesContext,
    at: Position,
) -> Result<InspectOutcome, InteractionError> {
    let player_at = scene.player.position;
    if !at.within_box(&player_at, LOOT_RANGE) {
        return Err(InteractionError::TooFar);
    }
    let hidden = scene
        .tile(at)
        .filter(|t| t.metadata.hidden)
        .map(|t| t.metadata.discovery_difficulty.unwrap_or(DEFAULT_DISCOVERY_DC));
    let Some(difficulty) = hidden else {
        return Ok(InspectOutcome {
            found: false,
            events: vec![GameEvent::info("Nothing interesting found.")],
        });
    };

    let total = rules.d(20) + scene.player.modifier(Ability::Wisdom);
    if total < difficulty {
        tracing::debug!(total, difficulty, %at, "Search failed");
        return Ok(InspectOutcome {
            found: false,
            events: vec![GameEvent::info(format!(
                "You search the wall but find nothing unusual. ({} vs DC {})",
                total, difficulty
            ))],
        });
    }

    if let Some(tile) = scene.tile_mut(at) {
        tile.tile_type = TileType::Door;
        tile.is_visited = true;
        tile.metadata.hidden = false;
    }
    let mut events = vec![GameEvent::success(
        "You investigate the crack and find a hidden latch. The wall grinds open!",
    )];
    for npc in scene.npcs.iter_mut().filter(|n| {
        n.quest_state.status == NpcStatus::Captive && n.position.within_box(&at, ESCAPE_RADIUS)
    }) {
        npc.quest_state.status = NpcStatus::Escorting;
        events.push(GameEvent::info(format!(
            "{}: 'You found it! Quick, let's go!'",
            npc.name
        )));
    }
    tracing::info!(player_id = %scene.player.id, %at, "Hidden passage found");
    Ok(InspectOutcome {
        found: true,
        events,
    })
}

/// Interaction use cases.
pub struct InteractionUseCases {
    scenes: SceneStore,
    rules: RulesContext,
    narration: Narration,
}

impl InteractionUseCases {
    pub fn new(scenes: SceneStore, rules: RulesContext, narration: Narration) -> Self {
        Self {
            scenes,
            rules,
            narration,
        }
    }

    pub async fn loot_window(
        &self,
        player_id: PlayerId,
        source: Option<LootSource>,
    ) -> Result<LootView, InteractionError> {
        let _guard = self.scenes.lock(player_id).await;
        let mut scene = self
            .scenes
            .load(player_id)
            .await?
            .ok_or(InteractionError::PlayerNotFound)?;

        let view = loot_window(&mut scene, source)?;
        if matches!(view, LootView::Empty { .. }) {
            self.scenes.commit(scene).await?;
        }
        Ok(view)
    }

    pub async fn inspect(
        &self,
        player_id: PlayerId,
        at: Position,
    ) -> Result<InspectOutcome, InteractionError> {
        let mut outcome = {
            let _guard = self.scenes.lock(player_id).await;
            let mut scene = self
                .scenes
                .load(player_id)
                .await?
                .ok_or(InteractionError::PlayerNotFound)?;
            let outcome = inspect(&mut scene, &self.rules, at)?;
            if outcome.found {
                self.scenes.commit(scene).await?;
            }
            outcome
        };

        if outcome.found && self.narration.is_enabled() {
            let prompt = "The player discovers a hidden door in a dungeon wall.";
            let text = self.narration.describe(prompt).await;
            outcome.events.push(GameEvent::info(text));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use oakhaven_domain::{MapTile, Npc, TileMetadata, WorldObject};

    use super::*;
    use crate::infrastructure::memory::InMemoryStore;
    use crate::infrastructure::ports::{MapRepo, MockNarratorPort, MonsterRepo, NpcRepo, PlayerRepo};
    use crate::use_cases::combat::test_support::*;
    use crate::use_cases::context::test_support::scripted;
    use crate::use_cases::scene::test_support::scene_store;

    fn secret_wall(at: Position, dc: i32) -> MapTile {
        MapTile::new(at, TileType::Wall).with_metadata(TileMetadata {
            hidden: true,
            discovery_difficulty: Some(dc),
            ..TileMetadata::default()
        })
    }

    #[test]
    fn nearest_corpse_opens_a_window() {
        let mut corpse = skeleton_at(1, 1);
        corpse.die();
        corpse.loot = vec![LootEntry::gold(7)];
        let mut scene = arena(hero(), vec![corpse.clone()]);

        let view = loot_window(&mut scene, None).unwrap();
        assert_eq!(
            view,
            LootView::Window {
                source: Corpse(corpse.id),
                name: "Skeleton".to_string(),
                loot: corpse.loot,
            }
        );
    }

    #[test]
    fn empty_chest_is_cleared_away() {
        let chest = WorldObject::chest("Old Chest", Position::new(0, 1, 0), vec![]);
        let mut scene = arena(hero(), vec![]);
        scene.objects.push(chest);

        let view = loot_window(&mut scene, None).unwrap();
        assert_eq!(
            view,
            LootView::Empty {
                message: "It's empty.".to_string()
            }
        );
        assert!(scene.objects.is_empty());
    }

    #[test]
    fn loot_needs_something_in_reach() {
        let mut corpse = skeleton_at(4, 4);
        corpse.die();
        let id = corpse.id;
        let mut scene = arena(hero(), vec![corpse]);

        assert!(matches!(
            loot_window(&mut scene, None),
            Err(InteractionError::NothingToLoot)
        ));
        assert!(matches!(
            loot_window(&mut scene, Some(Corpse(id))),
            Err(InteractionError::TooFar)
        ));
    }

    #[test]
    fn living_monsters_are_not_corpses() {
        let skeleton = skeleton_at(1, 0);
        let id = skeleton.id;
        let mut scene = arena(hero(), vec![skeleton]);
        assert!(matches!(
            loot_window(&mut scene, Some(Corpse(id))),
            Err(InteractionError::Gone)
        ));
    }

    #[test]
    fn finding_the_secret_door_frees_the_captive() {
        // 15 + WIS 0 meets DC 15
        let rules = scripted([15], 1);
        let captive =
            Npc::new("Elara", "Elara", Position::new(1, -2, 0)).with_status(NpcStatus::Captive);
        let mut scene = arena(hero(), vec![]).with_npc(captive);
        let at = Position::new(0, -1, 0);
        scene.put_tile(secret_wall(at, 15));

        let outcome = inspect(&mut scene, &rules, at).unwrap();
        assert!(outcome.found);
        let tile = scene.tile(at).unwrap();
        assert_eq!(tile.tile_type, TileType::Door);
        assert!(!tile.metadata.hidden);
        assert_eq!(scene.npcs[0].quest_state.status, NpcStatus::Escorting);
        assert_eq!(
            outcome.events[1].text(),
            Some("Elara: 'You found it! Quick, let's go!'")
        );
    }

    #[test]
    fn failed_search_changes_nothing() {
        let rules = scripted([3], 1);
        let mut scene = arena(hero(), vec![]);
        let at = Position::new(1, 0, 0);
        scene.put_tile(secret_wall(at, 15));

        let outcome = inspect(&mut scene, &rules, at).unwrap();
        assert!(!outcome.found);
        assert_eq!(scene.tile(at).unwrap().tile_type, TileType::Wall);

        let plain = inspect(&mut scene, &rules, Position::new(0, 1, 0)).unwrap();
        assert_eq!(plain.events[0].text(), Some("Nothing interesting found."));
        assert!(matches!(
            inspect(&mut scene, &rules, Position::new(3, 0, 0)),
            Err(InteractionError::TooFar)
        ));
    }

    #[tokio::test]
    async fn empty_corpse_is_deleted_from_the_store() {
        let store = Arc::new(InMemoryStore::new());
        store.seed_tiles(room(6)).await;
        let player = hero();
        let mut corpse = skeleton_at(1, 0);
        corpse.die();
        PlayerRepo::save(store.as_ref(), &player).await.unwrap();
        MonsterRepo::save(store.as_ref(), &corpse).await.unwrap();
        let interactions = InteractionUseCases::new(
            scene_store(&store),
            scripted([], 1),
            Narration::disabled(),
        );

        let view = interactions.loot_window(player.id, None).await.unwrap();
        assert_eq!(
            view,
            LootView::Empty {
                message: "The corpse is empty.".to_string()
            }
        );
        assert!(MonsterRepo::get(store.as_ref(), corpse.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn narration_follows_a_committed_discovery() {
        let store = Arc::new(InMemoryStore::new());
        store.seed_tiles(room(6)).await;
        let at = Position::new(0, 1, 0);
        store.seed_tiles([secret_wall(at, 5)]).await;
        let player = hero();
        let elara =
            Npc::new("Elara", "Elara", Position::new(2, 2, 0)).with_status(NpcStatus::Captive);
        PlayerRepo::save(store.as_ref(), &player).await.unwrap();
        NpcRepo::save(store.as_ref(), &elara).await.unwrap();

        let mut narrator = MockNarratorPort::new();
        narrator
            .expect_narrate()
            .times(1)
            .returning(|_| Ok("Dust sifts from the opening.".to_string()));
        let interactions = InteractionUseCases::new(
            scene_store(&store),
            scripted([10], 1),
            Narration::new(Arc::new(narrator), Duration::from_millis(100)),
        );

        let outcome = interactions.inspect(player.id, at).await.unwrap();
        assert_eq!(
            outcome.events.last().and_then(GameEvent::text),
            Some("Dust sifts from the opening.")
        );
        let door = store.get_tile(at).await.unwrap().unwrap();
        assert_eq!(door.tile_type, TileType::Door);
        let saved = NpcRepo::get(store.as_ref(), elara.id).await.unwrap().unwrap();
        assert_eq!(saved.quest_state.status, NpcStatus::Escorting);
    }
}
