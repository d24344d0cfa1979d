//! Opening an encounter.

use oakhaven_domain::{
    Ability, AnimationKind, CombatEncounter, Combatant, CombatantRef, GameEvent, MonsterId,
    MonsterState,
};

use super::error::CombatError;
use super::fight::Fight;
use super::rules::{ALLY_INITIATIVE_BONUS, REVEAL_RADIUS};

impl Fight<'_> {
    /// Start a fight against `target`.
    ///
    /// Every other living monster within aggro range of the target joins, as
    /// do following allies near the player. Initiative is d20 plus DEX for
    /// everyone except allies, who roll d20 + 1. If a monster wins
    /// initiative the AI plays until the player's turn comes up.
    pub fn begin(&mut self, target: MonsterId) -> Result<(), CombatError> {
        if self.scene.in_combat() {
            return Err(CombatError::AlreadyActive);
        }
        let anchor = {
            let monster = self
                .scene
                .monster(target)
                .ok_or(CombatError::MonsterNotFound)?;
            if !monster.is_alive {
                return Err(CombatError::TargetDead);
            }
            monster.position
        };

        let radius = self.rules.settings().aggro_radius;
        let player_pos = self.scene.player.position;
        let player_ref = self.player_ref();

        let mut participants = vec![Combatant {
            actor: player_ref,
            name: self.scene.player.name.clone(),
            initiative: self.rules.d(20) + self.scene.player.modifier(Ability::Dexterity),
        }];

        let joining: Vec<MonsterId> = std::iter::once(target)
            .chain(
                self.scene
                    .monsters
                    .iter()
                    .filter(|m| m.id != target && m.is_alive)
                    .filter(|m| m.position.same_level(&anchor))
                    .filter(|m| m.position.within_box(&anchor, radius))
                    .map(|m| m.id),
            )
            .collect();

        for id in &joining {
            let roll = self.rules.d(20);
            let Some(monster) = self.scene.monster_mut(*id) else {
                continue;
            };
            monster.initiative = roll + monster.modifier(Ability::Dexterity);
            monster.set_state(MonsterState::Combat)?;
            participants.push(Combatant {
                actor: CombatantRef::Monster(*id),
                name: monster.name.clone(),
                initiative: monster.initiative,
            });
        }

        let allies: Vec<_> = self
            .scene
            .npcs
            .iter()
            .filter(|n| n.is_following())
            .filter(|n| n.position.same_level(&player_pos))
            .filter(|n| n.position.within_box(&player_pos, radius))
            .map(|n| (n.id, n.name.clone()))
            .collect();
        for (id, name) in allies {
            participants.push(Combatant {
                actor: CombatantRef::Npc(id),
                name,
                initiative: self.rules.d(20) + ALLY_INITIATIVE_BONUS,
            });
        }

        let encounter = CombatEncounter::new(
            self.scene.player.id,
            participants,
            self.rules.settings().moves_per_turn,
            self.rules.now(),
        );
        for id in &joining {
            if let Some(monster) = self.scene.monster_mut(*id) {
                monster.encounter_id = Some(encounter.id);
            }
        }

        let order = encounter
            .turn_order
            .iter()
            .map(|c| format!("{} ({})", c.name, c.initiative))
            .collect::<Vec<_>>()
            .join(", ");
        tracing::info!(
            player_id = %self.scene.player.id,
            encounter_id = %encounter.id,
            participants = encounter.turn_order.len(),
            "Encounter started"
        );
        self.scene.encounter = Some(encounter);

        self.scene.reveal(player_pos, REVEAL_RADIUS);
        for id in &joining {
            if let Some(position) = self.scene.monster(*id).map(|m| m.position) {
                self.scene.reveal(position, REVEAL_RADIUS);
            }
        }

        self.emit(GameEvent::combat("Combat started!"));
        self.emit(GameEvent::animation(
            AnimationKind::Attack,
            CombatantRef::Monster(target),
            Some(player_ref),
        ));
        self.emit(GameEvent::info(format!("Initiative: {}", order)));

        if self.encounter().is_some_and(|e| e.is_players_turn()) {
            self.emit(GameEvent::info("Your turn!"));
        } else {
            self.run_ai_queue();
        }
        Ok(())
    }
}
