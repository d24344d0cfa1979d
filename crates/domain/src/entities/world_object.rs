//! Interactable objects placed on the map (chests, levers)

use serde::{Deserialize, Serialize};

use crate::entities::loot::LootEntry;
use crate::ids::WorldObjectId;
use crate::value_objects::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldObjectKind {
    Chest,
    Lever,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldObjectState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldObject {
    pub id: WorldObjectId,
    pub name: String,
    pub kind: WorldObjectKind,
    pub state: WorldObjectState,
    pub position: Position,
    pub loot: Vec<LootEntry>,
}

impl WorldObject {
    pub fn chest(name: impl Into<String>, position: Position, loot: Vec<LootEntry>) -> Self {
        Self {
            id: WorldObjectId::new(),
            name: name.into(),
            kind: WorldObjectKind::Chest,
            state: WorldObjectState::Closed,
            position,
            loot,
        }
    }

    /// Containers disappear once emptied.
    pub fn is_spent(&self) -> bool {
        self.kind == WorldObjectKind::Chest && self.loot.is_empty()
    }
}
