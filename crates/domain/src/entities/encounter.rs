//! Combat encounter aggregate
//!
//! Owns the initiative order, whose turn it is, and the per-turn resource
//! budget. Budgets reset every time control passes to a new actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::ids::{EncounterId, MonsterId, NpcId, PlayerId};

/// Default movement allowance per turn (tiles).
pub const DEFAULT_MOVES_PER_TURN: u32 = 6;

/// Reference to one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CombatantRef {
    Player(PlayerId),
    Monster(MonsterId),
    Npc(NpcId),
}

impl CombatantRef {
    pub fn is_player(&self) -> bool {
        matches!(self, Self::Player(_))
    }

    pub fn monster_id(&self) -> Option<MonsterId> {
        match self {
            Self::Monster(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for CombatantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(id) => write!(f, "player:{}", id),
            Self::Monster(id) => write!(f, "monster:{}", id),
            Self::Npc(id) => write!(f, "npc:{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub actor: CombatantRef,
    pub name: String,
    pub initiative: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    Move,
    Action,
    Bonus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnBudget {
    pub moves_left: u32,
    pub actions_left: u32,
    pub bonus_actions_left: u32,
}

impl TurnBudget {
    pub fn fresh(moves: u32) -> Self {
        Self {
            moves_left: moves,
            actions_left: 1,
            bonus_actions_left: 1,
        }
    }
}

/// A spend was attempted with nothing left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BudgetError {
    #[error("You have no movement left!")]
    NoMoves,
    #[error("You have already used your action this turn!")]
    NoActions,
    #[error("You have already used your bonus action!")]
    NoBonusActions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEncounter {
    pub id: EncounterId,
    pub player_id: PlayerId,
    pub turn_order: Vec<Combatant>,
    pub current_turn_index: usize,
    pub is_active: bool,
    pub phase: TurnPhase,
    pub budget: TurnBudget,
    pub moves_per_turn: u32,
    pub second_wind_used: bool,
    pub round: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl CombatEncounter {
    /// Build an encounter from rolled participants.
    ///
    /// Participants are stable-sorted by descending initiative, so ties keep
    /// the order they were rolled in.
    pub fn new(
        player_id: PlayerId,
        mut participants: Vec<Combatant>,
        moves_per_turn: u32,
        now: DateTime<Utc>,
    ) -> Self {
        participants.sort_by(|a, b| b.initiative.cmp(&a.initiative));
        Self {
            id: EncounterId::new(),
            player_id,
            turn_order: participants,
            current_turn_index: 0,
            is_active: true,
            phase: TurnPhase::Move,
            budget: TurnBudget::fresh(moves_per_turn),
            moves_per_turn,
            second_wind_used: false,
            round: 1,
            started_at: now,
            ended_at: None,
        }
    }

    pub fn current(&self) -> Option<&Combatant> {
        self.turn_order.get(self.current_turn_index)
    }

    pub fn is_players_turn(&self) -> bool {
        self.is_active
            && self
                .current()
                .map(|c| c.actor == CombatantRef::Player(self.player_id))
                .unwrap_or(false)
    }

    /// Pass control to the next participant, wrapping and resetting the budget.
    pub fn advance(&mut self) -> Option<&Combatant> {
        if self.turn_order.is_empty() {
            return None;
        }
        self.current_turn_index += 1;
        if self.current_turn_index >= self.turn_order.len() {
            self.current_turn_index = 0;
            self.round += 1;
        }
        self.reset_budget();
        self.current()
    }

    pub fn reset_budget(&mut self) {
        self.budget = TurnBudget::fresh(self.moves_per_turn);
        self.phase = TurnPhase::Move;
    }

    pub fn spend_move(&mut self) -> Result<u32, BudgetError> {
        if self.budget.moves_left == 0 {
            return Err(BudgetError::NoMoves);
        }
        self.budget.moves_left -= 1;
        self.phase = TurnPhase::Move;
        Ok(self.budget.moves_left)
    }

    pub fn spend_action(&mut self) -> Result<(), BudgetError> {
        if self.budget.actions_left == 0 {
            return Err(BudgetError::NoActions);
        }
        self.budget.actions_left -= 1;
        self.phase = TurnPhase::Action;
        Ok(())
    }

    pub fn spend_bonus(&mut self) -> Result<(), BudgetError> {
        if self.budget.bonus_actions_left == 0 {
            return Err(BudgetError::NoBonusActions);
        }
        self.budget.bonus_actions_left -= 1;
        self.phase = TurnPhase::Bonus;
        Ok(())
    }

    pub fn monster_ids(&self) -> impl Iterator<Item = MonsterId> + '_ {
        self.turn_order.iter().filter_map(|c| c.actor.monster_id())
    }

    pub fn includes(&self, actor: CombatantRef) -> bool {
        self.turn_order.iter().any(|c| c.actor == actor)
    }

    pub fn end(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.ended_at = Some(now);
    }
}
