//! In-memory state adapter.
//!
//! Implements every repository port over one `RwLock`ed world state. Commits
//! validate first and then apply under a single write guard, which makes a
//! [`ChangeSet`] atomic with respect to every other reader and writer.

use std::collections::HashMap;

use async_trait::async_trait;
use oakhaven_domain::{
    CombatEncounter, EncounterId, MapTile, Monster, MonsterId, Npc, NpcId, NpcStatus, Player,
    PlayerId, Position, WorldObject, WorldObjectId,
};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{
    ChangeSet, EncounterRepo, MapRepo, MonsterRepo, NpcRepo, PlayerRepo, RepoError, StateStore,
    WorldObjectRepo,
};

#[derive(Debug, Default, Clone)]
struct WorldState {
    players: HashMap<PlayerId, Player>,
    monsters: HashMap<MonsterId, Monster>,
    npcs: HashMap<NpcId, Npc>,
    tiles: HashMap<Position, MapTile>,
    objects: HashMap<WorldObjectId, WorldObject>,
    encounters: HashMap<EncounterId, CombatEncounter>,
}

impl WorldState {
    /// Reject an encounter that would give its player a second active one.
    fn check_single_active(
        &self,
        encounter: &CombatEncounter,
        pending: &[CombatEncounter],
    ) -> Result<(), RepoError> {
        if !encounter.is_active {
            return Ok(());
        }
        let still_active = |e: &CombatEncounter| {
            pending
                .iter()
                .find(|p| p.id == e.id)
                .map(|p| p.is_active)
                .unwrap_or(e.is_active)
        };
        let stored_conflict = self.encounters.values().any(|e| {
            e.player_id == encounter.player_id && e.id != encounter.id && still_active(e)
        });
        let pending_conflict = pending.iter().any(|e| {
            e.player_id == encounter.player_id && e.id != encounter.id && e.is_active
        });
        if stored_conflict || pending_conflict {
            return Err(RepoError::constraint(format!(
                "player {} already has an active encounter",
                encounter.player_id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<WorldState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load map tiles, replacing any already at the same positions.
    pub async fn seed_tiles(&self, tiles: impl IntoIterator<Item = MapTile>) {
        let mut state = self.state.write().await;
        for tile in tiles {
            state.tiles.insert(tile.position, tile);
        }
    }
}

#[async_trait]
impl PlayerRepo for InMemoryStore {
    async fn get(&self, id: PlayerId) -> Result<Option<Player>, RepoError> {
        Ok(self.state.read().await.players.get(&id).cloned())
    }

    async fn save(&self, player: &Player) -> Result<(), RepoError> {
        self.state
            .write()
            .await
            .players
            .insert(player.id, player.clone());
        Ok(())
    }
}

#[async_trait]
impl MonsterRepo for InMemoryStore {
    async fn get(&self, id: MonsterId) -> Result<Option<Monster>, RepoError> {
        Ok(self.state.read().await.monsters.get(&id).cloned())
    }

    async fn save(&self, monster: &Monster) -> Result<(), RepoError> {
        self.state
            .write()
            .await
            .monsters
            .insert(monster.id, monster.clone());
        Ok(())
    }

    async fn delete(&self, id: MonsterId) -> Result<(), RepoError> {
        self.state.write().await.monsters.remove(&id);
        Ok(())
    }

    async fn list_in_area(
        &self,
        center: Position,
        radius: i32,
        alive_only: bool,
    ) -> Result<Vec<Monster>, RepoError> {
        let state = self.state.read().await;
        let mut found: Vec<Monster> = state
            .monsters
            .values()
            .filter(|m| m.position.within_box(&center, radius))
            .filter(|m| !alive_only || m.is_alive)
            .cloned()
            .collect();
        // Deterministic order for initiative ties and tests
        found.sort_by_key(|m| (center.chebyshev(&m.position), m.position.y, m.position.x, m.id));
        Ok(found)
    }

    async fn list_by_encounter(
        &self,
        encounter_id: EncounterId,
    ) -> Result<Vec<Monster>, RepoError> {
        let state = self.state.read().await;
        let mut found: Vec<Monster> = state
            .monsters
            .values()
            .filter(|m| m.encounter_id == Some(encounter_id))
            .cloned()
            .collect();
        found.sort_by_key(|m| m.id);
        Ok(found)
    }

    async fn count_alive_on_level(&self, z: i32) -> Result<usize, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .monsters
            .values()
            .filter(|m| m.is_alive && m.position.z == z)
            .count())
    }
}

#[async_trait]
impl NpcRepo for InMemoryStore {
    async fn get(&self, id: NpcId) -> Result<Option<Npc>, RepoError> {
        Ok(self.state.read().await.npcs.get(&id).cloned())
    }

    async fn save(&self, npc: &Npc) -> Result<(), RepoError> {
        self.state.write().await.npcs.insert(npc.id, npc.clone());
        Ok(())
    }

    async fn list_on_level(&self, z: i32) -> Result<Vec<Npc>, RepoError> {
        let state = self.state.read().await;
        let mut found: Vec<Npc> = state
            .npcs
            .values()
            .filter(|n| n.position.z == z)
            .cloned()
            .collect();
        found.sort_by_key(|n| n.id);
        Ok(found)
    }

    async fn list_following(&self) -> Result<Vec<Npc>, RepoError> {
        let state = self.state.read().await;
        let mut found: Vec<Npc> = state
            .npcs
            .values()
            .filter(|n| n.quest_state.status == NpcStatus::Following)
            .cloned()
            .collect();
        found.sort_by_key(|n| n.id);
        Ok(found)
    }
}

#[async_trait]
impl MapRepo for InMemoryStore {
    async fn get_tile(&self, position: Position) -> Result<Option<MapTile>, RepoError> {
        Ok(self.state.read().await.tiles.get(&position).cloned())
    }

    async fn save_tile(&self, tile: &MapTile) -> Result<(), RepoError> {
        self.state
            .write()
            .await
            .tiles
            .insert(tile.position, tile.clone());
        Ok(())
    }

    async fn tiles_in_area(
        &self,
        center: Position,
        radius: i32,
    ) -> Result<Vec<MapTile>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .tiles
            .values()
            .filter(|t| t.position.within_box(&center, radius))
            .cloned()
            .collect())
    }

    async fn tiles_on_level(&self, z: i32) -> Result<Vec<MapTile>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .tiles
            .values()
            .filter(|t| t.position.z == z)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WorldObjectRepo for InMemoryStore {
    async fn get(&self, id: WorldObjectId) -> Result<Option<WorldObject>, RepoError> {
        Ok(self.state.read().await.objects.get(&id).cloned())
    }

    async fn save(&self, object: &WorldObject) -> Result<(), RepoError> {
        self.state
            .write()
            .await
            .objects
            .insert(object.id, object.clone());
        Ok(())
    }

    async fn delete(&self, id: WorldObjectId) -> Result<(), RepoError> {
        self.state.write().await.objects.remove(&id);
        Ok(())
    }

    async fn list_in_area(
        &self,
        center: Position,
        radius: i32,
    ) -> Result<Vec<WorldObject>, RepoError> {
        let state = self.state.read().await;
        let mut found: Vec<WorldObject> = state
            .objects
            .values()
            .filter(|o| o.position.within_box(&center, radius))
            .cloned()
            .collect();
        found.sort_by_key(|o| o.id);
        Ok(found)
    }
}

#[async_trait]
impl EncounterRepo for InMemoryStore {
    async fn get(&self, id: EncounterId) -> Result<Option<CombatEncounter>, RepoError> {
        Ok(self.state.read().await.encounters.get(&id).cloned())
    }

    async fn active_for_player(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<CombatEncounter>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .encounters
            .values()
            .find(|e| e.player_id == player_id && e.is_active)
            .cloned())
    }

    async fn save(&self, encounter: &CombatEncounter) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state.check_single_active(encounter, &[])?;
        state.encounters.insert(encounter.id, encounter.clone());
        Ok(())
    }
}

#[async_trait]
impl StateStore for InMemoryStore {
    async fn commit(&self, changes: ChangeSet) -> Result<(), RepoError> {
        let mut state = self.state.write().await;

        // Validate everything before touching anything
        for encounter in &changes.encounters {
            state.check_single_active(encounter, &changes.encounters)?;
        }

        let ChangeSet {
            players,
            monsters,
            removed_monsters,
            npcs,
            tiles,
            objects,
            removed_objects,
            encounters,
        } = changes;

        for player in players {
            state.players.insert(player.id, player);
        }
        for monster in monsters {
            state.monsters.insert(monster.id, monster);
        }
        for id in removed_monsters {
            state.monsters.remove(&id);
        }
        for npc in npcs {
            state.npcs.insert(npc.id, npc);
        }
        for tile in tiles {
            state.tiles.insert(tile.position, tile);
        }
        for object in objects {
            state.objects.insert(object.id, object);
        }
        for id in removed_objects {
            state.objects.remove(&id);
        }
        for encounter in encounters {
            state.encounters.insert(encounter.id, encounter);
        }

        tracing::trace!("change set committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use oakhaven_domain::{Combatant, CombatantRef, TileType, DEFAULT_MOVES_PER_TURN};

    fn encounter_for(player: PlayerId) -> CombatEncounter {
        CombatEncounter::new(
            player,
            vec![Combatant {
                actor: CombatantRef::Player(player),
                name: "Hero".into(),
                initiative: 10,
            }],
            DEFAULT_MOVES_PER_TURN,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn area_query_filters_level_radius_and_life() {
        let store = InMemoryStore::new();
        let near = Monster::new("Rat", "giant_rat", 1, 5, 10, Position::new(2, 2, 0));
        let far = Monster::new("Rat", "giant_rat", 1, 5, 10, Position::new(9, 0, 0));
        let other_level = Monster::new("Rat", "giant_rat", 1, 5, 10, Position::new(1, 1, 1));
        let mut dead = Monster::new("Rat", "giant_rat", 1, 5, 10, Position::new(1, 0, 0));
        dead.die();
        for m in [&near, &far, &other_level, &dead] {
            MonsterRepo::save(&store, m).await.unwrap();
        }

        let alive = MonsterRepo::list_in_area(&store, Position::new(0, 0, 0), 3, true)
            .await
            .unwrap();
        assert_eq!(alive.iter().map(|m| m.id).collect::<Vec<_>>(), vec![near.id]);

        let all = MonsterRepo::list_in_area(&store, Position::new(0, 0, 0), 3, false)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(store.count_alive_on_level(0).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn level_query_returns_only_that_level() {
        let store = InMemoryStore::new();
        store
            .seed_tiles([
                MapTile::new(Position::new(0, 0, 0), TileType::Floor),
                MapTile::new(Position::new(40, 0, 0), TileType::Wall),
                MapTile::new(Position::new(0, 0, 1), TileType::Grass),
            ])
            .await;

        let level = store.tiles_on_level(0).await.unwrap();
        assert_eq!(level.len(), 2);
        assert!(level.iter().all(|t| t.position.z == 0));
    }

    #[tokio::test]
    async fn commit_rejects_second_active_encounter_atomically() {
        let store = InMemoryStore::new();
        let player = Player::new("Hero", Position::new(0, 0, 0));
        let first = encounter_for(player.id);
        EncounterRepo::save(&store, &first).await.unwrap();

        let mut moved = player.clone();
        moved.position = Position::new(5, 5, 0);
        let changes = ChangeSet::new()
            .with_player(moved)
            .with_encounter(encounter_for(player.id));

        let err = store.commit(changes).await.unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
        // Nothing from the rejected set was applied
        assert!(PlayerRepo::get(&store, player.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn commit_allows_replacing_a_closed_encounter() {
        let store = InMemoryStore::new();
        let player = PlayerId::new();
        let mut first = encounter_for(player);
        EncounterRepo::save(&store, &first).await.unwrap();
        first.end(Utc::now());
        let second = encounter_for(player);

        store
            .commit(ChangeSet::new().with_encounter(first).with_encounter(second.clone()))
            .await
            .unwrap();
        let active = store.active_for_player(player).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
    }

    #[tokio::test]
    async fn tiles_and_removals() {
        let store = InMemoryStore::new();
        let tile = MapTile::new(Position::new(1, 1, 0), TileType::Floor);
        store.save_tile(&tile).await.unwrap();
        assert_eq!(
            store.get_tile(Position::new(1, 1, 0)).await.unwrap(),
            Some(tile)
        );
        assert_eq!(store.tiles_in_area(Position::new(0, 0, 0), 1).await.unwrap().len(), 1);

        let rat = Monster::new("Rat", "giant_rat", 1, 5, 10, Position::new(2, 2, 0));
        MonsterRepo::save(&store, &rat).await.unwrap();
        let mut changes = ChangeSet::new();
        changes.removed_monsters.push(rat.id);
        store.commit(changes).await.unwrap();
        assert!(MonsterRepo::get(&store, rat.id).await.unwrap().is_none());
    }
}
