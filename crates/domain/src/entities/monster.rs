//! Monster entity
//!
//! Death is a single transition: `hp_current <= 0`, `is_alive == false` and
//! `state == Dead` are always set together by [`Monster::take_damage`] or
//! [`Monster::die`], never field by field.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::loot::LootEntry;
use crate::error::DomainError;
use crate::ids::{EncounterId, MonsterId};
use crate::value_objects::{Ability, AbilityScores, DiceFormula, Position};

/// XP granted per point of max HP on a kill.
pub const XP_PER_MAX_HP: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterState {
    #[default]
    Idle,
    Hunting,
    Combat,
    Stunned,
    Dead,
}

impl fmt::Display for MonsterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Hunting => "hunting",
            Self::Combat => "combat",
            Self::Stunned => "stunned",
            Self::Dead => "dead",
        };
        write!(f, "{}", s)
    }
}

/// What happened when damage landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    pub applied: i32,
    pub killed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub name: String,
    /// Archetype key into `catalog::archetypes`.
    pub archetype: String,
    pub level: u32,
    pub hp_current: i32,
    pub hp_max: i32,
    pub armor_class: i32,
    pub abilities: AbilityScores,
    pub damage: DiceFormula,
    pub position: Position,
    pub is_alive: bool,
    pub state: MonsterState,
    pub initiative: i32,
    pub loot: Vec<LootEntry>,
    pub loot_generated: bool,
    pub encounter_id: Option<EncounterId>,
}

impl Monster {
    pub fn new(
        name: impl Into<String>,
        archetype: impl Into<String>,
        level: u32,
        hp_max: i32,
        armor_class: i32,
        position: Position,
    ) -> Self {
        Self {
            id: MonsterId::new(),
            name: name.into(),
            archetype: archetype.into(),
            level,
            hp_current: hp_max,
            hp_max,
            armor_class,
            abilities: AbilityScores::default(),
            damage: DiceFormula::die(6),
            position,
            is_alive: true,
            state: MonsterState::Idle,
            initiative: 0,
            loot: Vec::new(),
            loot_generated: false,
            encounter_id: None,
        }
    }

    pub fn with_abilities(mut self, abilities: AbilityScores) -> Self {
        self.abilities = abilities;
        self
    }

    pub fn with_damage(mut self, damage: DiceFormula) -> Self {
        self.damage = damage;
        self
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        self.abilities.modifier(ability)
    }

    pub fn xp_value(&self) -> u32 {
        self.hp_max.max(0) as u32 * XP_PER_MAX_HP
    }

    pub fn is_stunned(&self) -> bool {
        self.is_alive && self.state == MonsterState::Stunned
    }

    /// Apply damage. Dead monsters ignore further hits.
    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if !self.is_alive {
            return DamageOutcome {
                applied: 0,
                killed: false,
            };
        }
        let applied = amount.max(0);
        self.hp_current -= applied;
        let killed = self.hp_current <= 0;
        if killed {
            self.die();
        }
        DamageOutcome { applied, killed }
    }

    /// Mark dead. HP is forced to at most zero so all three views agree.
    pub fn die(&mut self) {
        self.hp_current = self.hp_current.min(0);
        self.is_alive = false;
        self.state = MonsterState::Dead;
    }

    /// Change behaviour state. Dead monsters cannot come back this way.
    pub fn set_state(&mut self, state: MonsterState) -> Result<(), DomainError> {
        if !self.is_alive && state != MonsterState::Dead {
            return Err(DomainError::invalid_state_transition(format!(
                "{} is dead and cannot become {}",
                self.name, state
            )));
        }
        if state == MonsterState::Dead {
            self.die();
        } else {
            self.state = state;
        }
        Ok(())
    }

    /// Back to idle after combat ends; no-op for the dead.
    pub fn disengage(&mut self) {
        if self.is_alive {
            self.state = MonsterState::Idle;
            self.encounter_id = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton() -> Monster {
        Monster::new("Skeleton", "skeleton", 1, 10, 12, Position::new(1, 0, 0))
    }

    #[test]
    fn overkill_keeps_negative_hp_and_dies() {
        let mut m = skeleton();
        m.hp_current = 3;
        let outcome = m.take_damage(5);
        assert!(outcome.killed);
        assert_eq!(m.hp_current, -2);
        assert!(!m.is_alive);
        assert_eq!(m.state, MonsterState::Dead);
    }

    #[test]
    fn dead_monster_ignores_damage() {
        let mut m = skeleton();
        m.take_damage(50);
        let hp = m.hp_current;
        let outcome = m.take_damage(5);
        assert_eq!(outcome.applied, 0);
        assert!(!outcome.killed);
        assert_eq!(m.hp_current, hp);
    }

    #[test]
    fn dead_cannot_transition_back() {
        let mut m = skeleton();
        m.die();
        assert_eq!(m.hp_current, 0);
        assert!(m.set_state(MonsterState::Combat).is_err());
        assert_eq!(m.state, MonsterState::Dead);
    }

    #[test]
    fn disengage_returns_to_idle() {
        let mut m = skeleton();
        m.set_state(MonsterState::Stunned).unwrap();
        m.encounter_id = Some(EncounterId::new());
        m.disengage();
        assert_eq!(m.state, MonsterState::Idle);
        assert!(m.encounter_id.is_none());
        assert_eq!(m.xp_value(), 40);
    }
}
