//! Non-player characters
//!
//! NPCs carry a small quest/escort state machine driven by dialogue actions
//! and the world simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::NpcId;
use crate::value_objects::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcStatus {
    #[default]
    Idle,
    Captive,
    Following,
    Waiting,
    WalkingHome,
    Escorting,
    Rescued,
    Completed,
}

impl fmt::Display for NpcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Captive => "captive",
            Self::Following => "following",
            Self::Waiting => "waiting",
            Self::WalkingHome => "walking_home",
            Self::Escorting => "escorting",
            Self::Rescued => "rescued",
            Self::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NpcQuestState {
    pub current_node: Option<String>,
    pub status: NpcStatus,
    /// Where the NPC is walking to, if anywhere.
    pub target: Option<Position>,
    /// Where a follower returns when dismissed.
    pub home: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub id: NpcId,
    pub name: String,
    /// Human-readable location label, e.g. "Smithy".
    pub location: String,
    /// Key into the dialogue script catalog.
    pub persona: String,
    pub position: Position,
    pub quest_state: NpcQuestState,
}

impl Npc {
    pub fn new(name: impl Into<String>, persona: impl Into<String>, position: Position) -> Self {
        Self {
            id: NpcId::new(),
            name: name.into(),
            location: String::new(),
            persona: persona.into(),
            position,
            quest_state: NpcQuestState::default(),
        }
    }

    pub fn with_status(mut self, status: NpcStatus) -> Self {
        self.quest_state.status = status;
        self
    }

    pub fn is_following(&self) -> bool {
        self.quest_state.status == NpcStatus::Following
    }

    /// Start following, remembering where home is.
    pub fn follow(&mut self) {
        if self.quest_state.home.is_none() {
            self.quest_state.home = Some(self.position);
        }
        self.quest_state.status = NpcStatus::Following;
    }

    pub fn wait_here(&mut self) {
        self.quest_state.status = NpcStatus::Waiting;
    }

    /// Head back home; returns false if there is no home to go to.
    pub fn walk_home(&mut self) -> bool {
        match self.quest_state.home {
            Some(home) => {
                self.quest_state.status = NpcStatus::WalkingHome;
                self.quest_state.target = Some(home);
                true
            }
            None => false,
        }
    }

    /// Arrived at the walk target.
    pub fn arrive(&mut self) {
        self.quest_state.target = None;
        if self.quest_state.status == NpcStatus::WalkingHome {
            self.quest_state.status = NpcStatus::Completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_remembers_first_home() {
        let mut npc = Npc::new("Elara", "Elara", Position::new(3, 3, 0));
        npc.follow();
        npc.position = Position::new(9, 9, 0);
        npc.follow();
        assert_eq!(npc.quest_state.home, Some(Position::new(3, 3, 0)));
        assert!(npc.is_following());
    }

    #[test]
    fn walk_home_sets_target_until_arrival() {
        let mut npc = Npc::new("Gareth", "Gareth Ironhand", Position::new(0, 0, 1));
        assert!(!npc.walk_home());
        npc.follow();
        assert!(npc.walk_home());
        assert_eq!(npc.quest_state.status, NpcStatus::WalkingHome);
        assert_eq!(npc.quest_state.target, Some(Position::new(0, 0, 1)));
        npc.arrive();
        assert_eq!(npc.quest_state.status, NpcStatus::Completed);
        assert!(npc.quest_state.target.is_none());
    }
}
