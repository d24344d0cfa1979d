//! Map tiles

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    Floor,
    FloorWood,
    Grass,
    Bridge,
    Door,
    OpenDoor,
    Stairs,
    Wall,
    WallHouse,
    Tree,
    Water,
    Void,
    Lava,
    Rock,
    FlowerPot,
    Anvil,
    Shelf,
}

/// A gatherable resource node and what it yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceNode {
    pub item_template: &'static str,
    pub skill: &'static str,
    /// Tile left behind once gathered.
    pub depleted: TileType,
}

impl TileType {
    pub fn is_walkable(&self) -> bool {
        matches!(
            self,
            Self::Floor
                | Self::FloorWood
                | Self::Grass
                | Self::Bridge
                | Self::Door
                | Self::OpenDoor
                | Self::Stairs
        )
    }

    pub fn resource(&self) -> Option<ResourceNode> {
        match self {
            Self::Rock => Some(ResourceNode {
                item_template: "iron_ore",
                skill: "mining",
                depleted: TileType::Floor,
            }),
            Self::FlowerPot => Some(ResourceNode {
                item_template: "mystic_herb",
                skill: "herbalism",
                depleted: TileType::Grass,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Floor => "floor",
            Self::FloorWood => "floor_wood",
            Self::Grass => "grass",
            Self::Bridge => "bridge",
            Self::Door => "door",
            Self::OpenDoor => "open_door",
            Self::Stairs => "stairs",
            Self::Wall => "wall",
            Self::WallHouse => "wall_house",
            Self::Tree => "tree",
            Self::Water => "water",
            Self::Void => "void",
            Self::Lava => "lava",
            Self::Rock => "rock",
            Self::FlowerPot => "flower_pot",
            Self::Anvil => "anvil",
            Self::Shelf => "shelf",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileMetadata {
    #[serde(default)]
    pub interactable: bool,
    /// Hidden features (secret doors) revealed by a successful inspection.
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_difficulty: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Stepping onto this tile teleports the player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_to: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapTile {
    pub position: Position,
    pub tile_type: TileType,
    pub is_visited: bool,
    #[serde(default)]
    pub metadata: TileMetadata,
}

impl MapTile {
    pub fn new(position: Position, tile_type: TileType) -> Self {
        Self {
            position,
            tile_type,
            is_visited: false,
            metadata: TileMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: TileMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_walkable(&self) -> bool {
        self.tile_type.is_walkable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walkability() {
        assert!(TileType::Floor.is_walkable());
        assert!(TileType::OpenDoor.is_walkable());
        assert!(!TileType::Wall.is_walkable());
        assert!(!TileType::Rock.is_walkable());
        assert!(!TileType::Lava.is_walkable());
    }

    #[test]
    fn resource_nodes() {
        let rock = TileType::Rock.resource().unwrap();
        assert_eq!(rock.skill, "mining");
        assert_eq!(rock.depleted, TileType::Floor);
        assert!(TileType::Grass.resource().is_none());
    }

    #[test]
    fn tile_type_serializes_snake_case() {
        let json = serde_json::to_string(&TileType::FlowerPot).unwrap();
        assert_eq!(json, "\"flower_pot\"");
    }
}
