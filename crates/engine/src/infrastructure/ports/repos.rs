//! Repository port traits for state access.

use async_trait::async_trait;
use oakhaven_domain::*;

use super::change_set::ChangeSet;
use super::error::RepoError;

// =============================================================================
// Entity Ports (one per entity type)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRepo: Send + Sync {
    async fn get(&self, id: PlayerId) -> Result<Option<Player>, RepoError>;
    async fn save(&self, player: &Player) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MonsterRepo: Send + Sync {
    async fn get(&self, id: MonsterId) -> Result<Option<Monster>, RepoError>;
    async fn save(&self, monster: &Monster) -> Result<(), RepoError>;
    async fn delete(&self, id: MonsterId) -> Result<(), RepoError>;

    /// Monsters on `center.z` within `radius` tiles (Chebyshev) of `center`.
    async fn list_in_area(
        &self,
        center: Position,
        radius: i32,
        alive_only: bool,
    ) -> Result<Vec<Monster>, RepoError>;

    async fn list_by_encounter(&self, encounter_id: EncounterId)
        -> Result<Vec<Monster>, RepoError>;

    async fn count_alive_on_level(&self, z: i32) -> Result<usize, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NpcRepo: Send + Sync {
    async fn get(&self, id: NpcId) -> Result<Option<Npc>, RepoError>;
    async fn save(&self, npc: &Npc) -> Result<(), RepoError>;
    async fn list_on_level(&self, z: i32) -> Result<Vec<Npc>, RepoError>;
    /// Every NPC currently following a player, on any level.
    async fn list_following(&self) -> Result<Vec<Npc>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MapRepo: Send + Sync {
    async fn get_tile(&self, position: Position) -> Result<Option<MapTile>, RepoError>;
    async fn save_tile(&self, tile: &MapTile) -> Result<(), RepoError>;
    async fn tiles_in_area(&self, center: Position, radius: i32)
        -> Result<Vec<MapTile>, RepoError>;
    /// Every stored tile on level `z`, e.g. for a full map view.
    async fn tiles_on_level(&self, z: i32) -> Result<Vec<MapTile>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorldObjectRepo: Send + Sync {
    async fn get(&self, id: WorldObjectId) -> Result<Option<WorldObject>, RepoError>;
    async fn save(&self, object: &WorldObject) -> Result<(), RepoError>;
    async fn delete(&self, id: WorldObjectId) -> Result<(), RepoError>;
    async fn list_in_area(&self, center: Position, radius: i32)
        -> Result<Vec<WorldObject>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EncounterRepo: Send + Sync {
    async fn get(&self, id: EncounterId) -> Result<Option<CombatEncounter>, RepoError>;
    /// The player's active encounter; there is never more than one.
    async fn active_for_player(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<CombatEncounter>, RepoError>;
    async fn save(&self, encounter: &CombatEncounter) -> Result<(), RepoError>;
}

// =============================================================================
// Unit of Work
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Apply every write in `changes` or none of them.
    async fn commit(&self, changes: ChangeSet) -> Result<(), RepoError>;
}
