//! Batched writes committed atomically by a [`StateStore`](super::StateStore).

use oakhaven_domain::{
    CombatEncounter, MapTile, Monster, MonsterId, Npc, Player, WorldObject, WorldObjectId,
};

/// Every entity write produced by one use-case call.
///
/// A store applies the whole set or none of it, so a failure halfway through
/// an action never leaves a half-spent turn behind.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub players: Vec<Player>,
    pub monsters: Vec<Monster>,
    pub removed_monsters: Vec<MonsterId>,
    pub npcs: Vec<Npc>,
    pub tiles: Vec<MapTile>,
    pub objects: Vec<WorldObject>,
    pub removed_objects: Vec<WorldObjectId>,
    pub encounters: Vec<CombatEncounter>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_player(mut self, player: Player) -> Self {
        self.players.push(player);
        self
    }

    pub fn with_encounter(mut self, encounter: CombatEncounter) -> Self {
        self.encounters.push(encounter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
            && self.monsters.is_empty()
            && self.removed_monsters.is_empty()
            && self.npcs.is_empty()
            && self.tiles.is_empty()
            && self.objects.is_empty()
            && self.removed_objects.is_empty()
            && self.encounters.is_empty()
    }
}
