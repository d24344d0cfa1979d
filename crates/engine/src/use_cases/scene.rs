//! The working set a use case mutates.
//!
//! A use case loads a [`Scene`] around the player, runs plain synchronous
//! rule code against it, and commits the result as one [`ChangeSet`]. A
//! rejected action simply drops the scene, so nothing is ever half-applied.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use oakhaven_domain::{
    CombatEncounter, MapTile, Monster, MonsterId, Npc, NpcId, Player, PlayerId, Position,
    WorldObject, WorldObjectId,
};

use tokio::sync::OwnedMutexGuard;

use crate::infrastructure::ports::{
    ChangeSet, EncounterRepo, MapRepo, MonsterRepo, NpcRepo, PlayerRepo, RepoError, StateStore,
    WorldObjectRepo,
};
use crate::infrastructure::session_locks::SessionLocks;

#[derive(Debug, Clone)]
pub struct Scene {
    pub player: Player,
    /// The player's active encounter, if any.
    pub encounter: Option<CombatEncounter>,
    pub monsters: Vec<Monster>,
    pub npcs: Vec<Npc>,
    pub objects: Vec<WorldObject>,
    tiles: HashMap<Position, MapTile>,
    touched_tiles: HashSet<Position>,
    ended_encounters: Vec<CombatEncounter>,
    removed_monsters: Vec<MonsterId>,
    removed_objects: Vec<WorldObjectId>,
    /// Living monsters on the player's level that were not loaded.
    offscene_alive: usize,
}

impl Scene {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            encounter: None,
            monsters: Vec::new(),
            npcs: Vec::new(),
            objects: Vec::new(),
            tiles: HashMap::new(),
            touched_tiles: HashSet::new(),
            ended_encounters: Vec::new(),
            removed_monsters: Vec::new(),
            removed_objects: Vec::new(),
            offscene_alive: 0,
        }
    }

    pub fn with_tiles(mut self, tiles: impl IntoIterator<Item = MapTile>) -> Self {
        self.tiles
            .extend(tiles.into_iter().map(|t| (t.position, t)));
        self
    }

    /// Add tiles that are not loaded yet, leaving loaded ones untouched.
    pub fn extend_tiles(&mut self, tiles: impl IntoIterator<Item = MapTile>) {
        for tile in tiles {
            self.tiles.entry(tile.position).or_insert(tile);
        }
    }

    pub fn with_monster(mut self, monster: Monster) -> Self {
        self.monsters.push(monster);
        self
    }

    pub fn with_npc(mut self, npc: Npc) -> Self {
        self.npcs.push(npc);
        self
    }

    pub fn player_id(&self) -> PlayerId {
        self.player.id
    }

    // ── Monsters ───────────────────────────────────────────────────────

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.id == id)
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.monsters.iter_mut().find(|m| m.id == id)
    }

    pub fn living_monster_at(&self, position: Position) -> Option<MonsterId> {
        self.monsters
            .iter()
            .find(|m| m.is_alive && m.position == position)
            .map(|m| m.id)
    }

    pub fn remove_monster(&mut self, id: MonsterId) {
        self.monsters.retain(|m| m.id != id);
        self.removed_monsters.push(id);
    }

    /// Living monsters on level `z`, counting ones outside the scene.
    pub fn alive_on_level(&self, z: i32) -> usize {
        let loaded = self
            .monsters
            .iter()
            .filter(|m| m.is_alive && m.position.z == z)
            .count();
        if z == self.player.position.z {
            loaded + self.offscene_alive
        } else {
            loaded
        }
    }

    // ── NPCs and objects ───────────────────────────────────────────────

    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == id)
    }

    pub fn npc_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        self.npcs.iter_mut().find(|n| n.id == id)
    }

    pub fn npc_at(&self, position: Position) -> Option<NpcId> {
        self.npcs
            .iter()
            .find(|n| n.position == position)
            .map(|n| n.id)
    }

    pub fn object_mut(&mut self, id: WorldObjectId) -> Option<&mut WorldObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn remove_object(&mut self, id: WorldObjectId) {
        self.objects.retain(|o| o.id != id);
        self.removed_objects.push(id);
    }

    // ── Tiles ──────────────────────────────────────────────────────────

    pub fn tile(&self, position: Position) -> Option<&MapTile> {
        self.tiles.get(&position)
    }

    /// Insert or replace a tile and persist it on commit.
    pub fn put_tile(&mut self, tile: MapTile) {
        self.touched_tiles.insert(tile.position);
        self.tiles.insert(tile.position, tile);
    }

    pub fn tile_mut(&mut self, position: Position) -> Option<&mut MapTile> {
        let tile = self.tiles.get_mut(&position)?;
        self.touched_tiles.insert(position);
        Some(tile)
    }

    /// Missing tiles are never walkable.
    pub fn is_walkable(&self, position: Position) -> bool {
        self.tile(position).map(MapTile::is_walkable).unwrap_or(false)
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.player.position == position
            || self.living_monster_at(position).is_some()
            || self.npc_at(position).is_some()
    }

    /// Walkable and nobody standing there.
    pub fn is_open(&self, position: Position) -> bool {
        self.is_walkable(position) && !self.is_occupied(position)
    }

    /// One greedy step from `from` toward `to`: diagonal, then x, then y.
    pub fn step_toward(&self, from: Position, to: Position) -> Option<Position> {
        let (dx, dy) = from.direction_to(&to);
        let mut candidates = Vec::with_capacity(3);
        if dx != 0 && dy != 0 {
            candidates.push((dx, dy));
        }
        if dx != 0 {
            candidates.push((dx, 0));
        }
        if dy != 0 {
            candidates.push((0, dy));
        }
        candidates
            .into_iter()
            .map(|(sx, sy)| from.offset(sx, sy))
            .find(|next| self.is_open(*next))
    }

    /// Mark every known tile within `radius` of `center` as visited.
    pub fn reveal(&mut self, center: Position, radius: i32) {
        let newly: Vec<Position> = self
            .tiles
            .values()
            .filter(|t| !t.is_visited && t.position.within_box(&center, radius))
            .map(|t| t.position)
            .collect();
        for position in newly {
            if let Some(tile) = self.tiles.get_mut(&position) {
                tile.is_visited = true;
                self.touched_tiles.insert(position);
            }
        }
    }

    // ── Encounter ──────────────────────────────────────────────────────

    /// The active encounter, if it really is active.
    pub fn active_encounter(&self) -> Option<&CombatEncounter> {
        self.encounter.as_ref().filter(|e| e.is_active)
    }

    pub fn in_combat(&self) -> bool {
        self.active_encounter().is_some()
    }

    /// Close the active encounter; it is still written on commit.
    pub fn close_encounter(&mut self, now: chrono::DateTime<chrono::Utc>) -> Option<&CombatEncounter> {
        let mut encounter = self.encounter.take()?;
        encounter.end(now);
        self.ended_encounters.push(encounter);
        self.ended_encounters.last()
    }

    /// Everything this scene wrote, as one atomic batch.
    pub fn into_changes(self) -> ChangeSet {
        let Scene {
            player,
            encounter,
            monsters,
            npcs,
            objects,
            mut tiles,
            touched_tiles,
            ended_encounters,
            removed_monsters,
            removed_objects,
            ..
        } = self;

        let mut changes = ChangeSet::new().with_player(player);
        changes.monsters = monsters;
        changes.removed_monsters = removed_monsters;
        changes.npcs = npcs;
        changes.objects = objects;
        changes.removed_objects = removed_objects;
        changes.tiles = touched_tiles
            .into_iter()
            .filter_map(|p| tiles.remove(&p))
            .collect();
        // Closed encounters first so the new one passes the single-active check.
        changes.encounters = ended_encounters;
        changes.encounters.extend(encounter);
        changes
    }
}

/// Loads scenes from the repositories.
#[derive(Clone)]
pub struct SceneLoader {
    players: Arc<dyn PlayerRepo>,
    monsters: Arc<dyn MonsterRepo>,
    npcs: Arc<dyn NpcRepo>,
    map: Arc<dyn MapRepo>,
    objects: Arc<dyn WorldObjectRepo>,
    encounters: Arc<dyn EncounterRepo>,
    radius: i32,
}

impl SceneLoader {
    pub fn new(
        players: Arc<dyn PlayerRepo>,
        monsters: Arc<dyn MonsterRepo>,
        npcs: Arc<dyn NpcRepo>,
        map: Arc<dyn MapRepo>,
        objects: Arc<dyn WorldObjectRepo>,
        encounters: Arc<dyn EncounterRepo>,
        radius: i32,
    ) -> Self {
        Self {
            players,
            monsters,
            npcs,
            map,
            objects,
            encounters,
            radius,
        }
    }

    /// Load everything around the player. `Ok(None)` when the player is unknown.
    pub async fn load(&self, player_id: PlayerId) -> Result<Option<Scene>, RepoError> {
        let Some(player) = self.players.get(player_id).await? else {
            return Ok(None);
        };
        let center = player.position;

        let encounter = self.encounters.active_for_player(player_id).await?;

        let mut monsters = self.monsters.list_in_area(center, self.radius, false).await?;
        if let Some(encounter) = &encounter {
            for member in self.monsters.list_by_encounter(encounter.id).await? {
                if !monsters.iter().any(|m| m.id == member.id) {
                    monsters.push(member);
                }
            }
        }

        let mut npcs = self.npcs.list_on_level(center.z).await?;
        for follower in self.npcs.list_following().await? {
            if !npcs.iter().any(|n| n.id == follower.id) {
                npcs.push(follower);
            }
        }

        // One extra ring so actors at the edge can still see where they step.
        let tiles = self.map.tiles_in_area(center, self.radius + 1).await?;
        let objects = self.objects.list_in_area(center, self.radius).await?;

        let loaded_alive = monsters
            .iter()
            .filter(|m| m.is_alive && m.position.z == center.z)
            .count();
        let offscene_alive = self
            .monsters
            .count_alive_on_level(center.z)
            .await?
            .saturating_sub(loaded_alive);

        let mut scene = Scene::new(player).with_tiles(tiles);
        scene.encounter = encounter;
        scene.monsters = monsters;
        scene.npcs = npcs;
        scene.objects = objects;
        scene.offscene_alive = offscene_alive;
        Ok(Some(scene))
    }

    /// Tiles around `center`, e.g. the landing area of a teleport.
    pub async fn tiles_around(&self, center: Position) -> Result<Vec<MapTile>, RepoError> {
        self.map.tiles_in_area(center, self.radius + 1).await
    }
}

/// Lock, load and commit scenes for one player at a time.
#[derive(Clone)]
pub struct SceneStore {
    loader: SceneLoader,
    store: Arc<dyn StateStore>,
    locks: Arc<SessionLocks>,
}

impl SceneStore {
    pub fn new(loader: SceneLoader, store: Arc<dyn StateStore>, locks: Arc<SessionLocks>) -> Self {
        Self {
            loader,
            store,
            locks,
        }
    }

    /// Hold this for the whole load, mutate, commit cycle.
    pub async fn lock(&self, player_id: PlayerId) -> OwnedMutexGuard<()> {
        self.locks.acquire(player_id).await
    }

    pub async fn load(&self, player_id: PlayerId) -> Result<Option<Scene>, RepoError> {
        self.loader.load(player_id).await
    }

    /// Pull the map around `center` into an already loaded scene.
    pub async fn load_area(&self, scene: &mut Scene, center: Position) -> Result<(), RepoError> {
        let tiles = self.loader.tiles_around(center).await?;
        scene.extend_tiles(tiles);
        Ok(())
    }

    pub async fn commit(&self, scene: Scene) -> Result<(), RepoError> {
        self.store.commit(scene.into_changes()).await
    }
}
