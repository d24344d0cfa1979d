//! The combat working context.
//!
//! `Fight` borrows a loaded [`Scene`] and the rules context and exposes every
//! combat step as a synchronous method. Events accumulate in order; the
//! calling use case commits the scene afterwards.

use oakhaven_domain::{CombatEncounter, CombatantRef, GameEvent, MonsterId, Position};

use crate::use_cases::context::RulesContext;
use crate::use_cases::scene::Scene;

use super::rules::in_melee;

pub struct Fight<'a> {
    pub(super) scene: &'a mut Scene,
    pub(super) rules: &'a RulesContext,
    pub(super) events: Vec<GameEvent>,
}

impl<'a> Fight<'a> {
    pub fn new(scene: &'a mut Scene, rules: &'a RulesContext) -> Self {
        Self {
            scene,
            rules,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<GameEvent> {
        self.events
    }

    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// No active encounter left in the scene.
    pub fn is_over(&self) -> bool {
        !self.scene.in_combat()
    }

    pub(super) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(super) fn player_ref(&self) -> CombatantRef {
        CombatantRef::Player(self.scene.player.id)
    }

    pub(super) fn encounter(&self) -> Option<&CombatEncounter> {
        self.scene.active_encounter()
    }

    pub(super) fn encounter_mut(&mut self) -> Option<&mut CombatEncounter> {
        self.scene.encounter.as_mut().filter(|e| e.is_active)
    }

    /// Living monsters of the encounter, in turn order.
    pub(super) fn living_enemies(&self) -> Vec<MonsterId> {
        let Some(encounter) = self.encounter() else {
            return Vec::new();
        };
        encounter
            .monster_ids()
            .filter(|id| self.scene.monster(*id).is_some_and(|m| m.is_alive))
            .collect()
    }

    /// Closest living enemy by Chebyshev distance; ties go to turn order.
    pub(super) fn nearest_enemy(&self, from: Position) -> Option<MonsterId> {
        self.living_enemies()
            .into_iter()
            .filter_map(|id| self.scene.monster(id).map(|m| (id, m.position)))
            .filter(|(_, pos)| pos.same_level(&from))
            .min_by_key(|(_, pos)| from.chebyshev(pos))
            .map(|(id, _)| id)
    }

    pub(super) fn position_of(&self, actor: CombatantRef) -> Option<Position> {
        match actor {
            CombatantRef::Player(_) => Some(self.scene.player.position),
            CombatantRef::Monster(id) => self.scene.monster(id).map(|m| m.position),
            CombatantRef::Npc(id) => self.scene.npc(id).map(|n| n.position),
        }
    }

    fn set_position(&mut self, actor: CombatantRef, position: Position) {
        match actor {
            CombatantRef::Player(_) => self.scene.player.position = position,
            CombatantRef::Monster(id) => {
                if let Some(monster) = self.scene.monster_mut(id) {
                    monster.position = position;
                }
            }
            CombatantRef::Npc(id) => {
                if let Some(npc) = self.scene.npc_mut(id) {
                    npc.position = position;
                }
            }
        }
    }

    /// Walk `actor` up to the per-turn step budget toward `target`, stopping
    /// once in melee range.
    pub(super) fn approach(&mut self, actor: CombatantRef, target: Position) {
        let steps = self.rules.settings().ai_steps_per_turn;
        for _ in 0..steps {
            let Some(from) = self.position_of(actor) else {
                return;
            };
            if in_melee(&from, &target) {
                return;
            }
            let Some(next) = self.scene.step_toward(from, target) else {
                return;
            };
            self.set_position(actor, next);
        }
    }

    /// Hand control to the next participant.
    ///
    /// An encounter that is already won is finalized instead of advanced.
    pub(super) fn advance_turn(&mut self) {
        if self.victory_quiet() {
            self.finish_victory();
            return;
        }
        let Some(encounter) = self.encounter_mut() else {
            return;
        };
        encounter.advance();
        if encounter.is_players_turn() {
            self.begin_player_turn();
        }
    }

    /// Webs eat the player's movement for the turn that starts now.
    fn begin_player_turn(&mut self) {
        if !self.scene.player.status.webbed {
            return;
        }
        self.scene.player.status.webbed = false;
        if let Some(encounter) = self.encounter_mut() {
            encounter.budget.moves_left = 0;
        }
        self.emit(GameEvent::danger(
            "You are stuck in sticky webbing and cannot move this turn!",
        ));
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::use_cases::context::test_support::scripted;

    #[test]
    fn greedy_step_prefers_diagonal_then_axes() {
        let rules = scripted([], 1);
        let mut scene = arena(hero(), vec![]);
        scene.player.position = Position::new(5, 5, 0);
        let fight = Fight::new(&mut scene, &rules);

        let from = Position::new(0, 0, 0);
        assert_eq!(
            fight.scene().step_toward(from, Position::new(5, 5, 0)),
            Some(Position::new(1, 1, 0))
        );
        assert_eq!(
            fight.scene().step_toward(from, Position::new(5, 0, 0)),
            Some(Position::new(1, 0, 0))
        );
    }

    #[test]
    fn greedy_step_falls_back_when_blocked() {
        let rules = scripted([], 1);
        let blocker = skeleton_at(1, 1);
        let mut scene = arena(hero(), vec![blocker]);
        scene.player.position = Position::new(4, 4, 0);
        let fight = Fight::new(&mut scene, &rules);

        assert_eq!(
            fight.scene().step_toward(Position::new(0, 0, 0), Position::new(4, 4, 0)),
            Some(Position::new(1, 0, 0))
        );
        // Cornered against the wall with nothing free
        assert_eq!(
            fight.scene().step_toward(Position::new(6, 6, 0), Position::new(9, 9, 0)),
            None
        );
    }
}
