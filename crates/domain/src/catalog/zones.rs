//! Zones (z-levels) and the edges that connect them

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Position;

/// Where defeated players wake up: the town square.
pub const SAFE_RESPAWN: Position = Position::new(0, 0, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Dungeon,
    Town,
    Forest,
    FireDungeon,
    IceDungeon,
    EarthDungeon,
    AirDungeon,
    Uncharted,
}

impl Zone {
    pub fn from_level(z: i32) -> Self {
        match z {
            0 => Self::Dungeon,
            1 => Self::Town,
            2 => Self::Forest,
            3 => Self::FireDungeon,
            4 => Self::IceDungeon,
            5 => Self::EarthDungeon,
            6 => Self::AirDungeon,
            _ => Self::Uncharted,
        }
    }

    /// No monster simulation or random encounters here.
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Town)
    }

    /// Unmapped tiles on these levels are solid rock.
    pub fn is_underground(&self) -> bool {
        matches!(
            self,
            Self::Dungeon
                | Self::FireDungeon
                | Self::IceDungeon
                | Self::EarthDungeon
                | Self::AirDungeon
        )
    }

    /// The four elemental dungeons, which carry themed loot tables.
    pub fn is_elemental(&self) -> bool {
        matches!(
            self,
            Self::FireDungeon | Self::IceDungeon | Self::EarthDungeon | Self::AirDungeon
        )
    }

    pub fn arrival_text(&self) -> &'static str {
        match self {
            Self::Dungeon => "You step through the dungeon.",
            Self::Town => "You walk through the streets of Oakhaven.",
            Self::Forest => "You are wandering the North Forest.",
            Self::FireDungeon => "Heat rolls off the basalt walls.",
            Self::IceDungeon => "Your breath freezes in the still air.",
            Self::EarthDungeon => "The tunnel groans under the weight of the mountain.",
            Self::AirDungeon => "Wind howls through the open galleries.",
            Self::Uncharted => "You press on into the unknown.",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Dungeon => "dungeon",
            Self::Town => "town",
            Self::Forest => "forest",
            Self::FireDungeon => "fire_dungeon",
            Self::IceDungeon => "ice_dungeon",
            Self::EarthDungeon => "earth_dungeon",
            Self::AirDungeon => "air_dungeon",
            Self::Uncharted => "uncharted",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeBound {
    /// Triggers when `y <= bound`.
    North(i32),
    /// Triggers when `y >= bound`.
    South(i32),
}

/// Walking past a map edge moves the player to another zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneExit {
    pub level: i32,
    pub bound: EdgeBound,
    /// Optional inclusive x range the exit is limited to.
    pub x_range: Option<(i32, i32)>,
    pub destination: Position,
    pub message: &'static str,
}

impl ZoneExit {
    pub fn matches(&self, target: &Position) -> bool {
        if target.z != self.level {
            return false;
        }
        if let Some((lo, hi)) = self.x_range {
            if target.x < lo || target.x > hi {
                return false;
            }
        }
        match self.bound {
            EdgeBound::North(bound) => target.y <= bound,
            EdgeBound::South(bound) => target.y >= bound,
        }
    }
}

pub static ZONE_EXITS: &[ZoneExit] = &[
    ZoneExit {
        level: 1,
        bound: EdgeBound::North(-19),
        x_range: None,
        destination: Position::new(0, 28, 2),
        message: "You leave Oakhaven and enter the North Forest.",
    },
    ZoneExit {
        level: 2,
        bound: EdgeBound::South(29),
        x_range: None,
        destination: Position::new(0, -18, 1),
        message: "You return to the safety of Oakhaven.",
    },
    ZoneExit {
        level: 0,
        bound: EdgeBound::South(28),
        x_range: Some((-2, 2)),
        destination: SAFE_RESPAWN,
        message: "You climb out of the dungeon into the light of Oakhaven.",
    },
];

/// Exit triggered by stepping onto `target`, if any.
pub fn zone_exit_at(target: &Position) -> Option<&'static ZoneExit> {
    ZONE_EXITS.iter().find(|e| e.matches(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zones_from_level() {
        assert_eq!(Zone::from_level(1), Zone::Town);
        assert!(Zone::from_level(1).is_safe());
        assert!(Zone::from_level(3).is_underground());
        assert!(!Zone::from_level(2).is_underground());
        assert_eq!(Zone::from_level(42), Zone::Uncharted);
    }

    #[test]
    fn town_north_edge_leads_to_forest() {
        let exit = zone_exit_at(&Position::new(4, -19, 1)).unwrap();
        assert_eq!(exit.destination.z, 2);
        assert!(zone_exit_at(&Position::new(4, -18, 1)).is_none());
    }

    #[test]
    fn dungeon_exit_limited_to_corridor() {
        assert!(zone_exit_at(&Position::new(2, 28, 0)).is_some());
        assert!(zone_exit_at(&Position::new(3, 28, 0)).is_none());
    }
}
