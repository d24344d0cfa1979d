//! Monster and ally turns.

use oakhaven_domain::catalog::{abilities_of, MonsterAbility};
use oakhaven_domain::{
    Ability, AnimationKind, CombatantRef, GameEvent, MonsterId, MonsterState, NpcId, PopupStyle,
};

use super::fight::Fight;
use super::rules::{hit_damage, in_melee, ALLY_DAMAGE, ALLY_HIT_BONUS, MONSTER_HIT_BONUS};

impl Fight<'_> {
    /// Play every non-player turn until the player is up again or the
    /// encounter ends. Bounded by the configured iteration cap.
    pub fn run_ai_queue(&mut self) {
        let cap = self.rules.settings().ai_iteration_cap;
        for _ in 0..cap {
            let Some(encounter) = self.encounter() else {
                return;
            };
            if encounter.is_players_turn() {
                return;
            }
            let Some(actor) = encounter.current().map(|c| c.actor) else {
                if let Some(encounter) = self.encounter_mut() {
                    encounter.current_turn_index = 0;
                    encounter.reset_budget();
                }
                continue;
            };
            match actor {
                CombatantRef::Monster(id) => self.monster_turn(id),
                CombatantRef::Npc(id) => self.ally_turn(id),
                CombatantRef::Player(_) => {}
            }
            if self.is_over() {
                return;
            }
            self.advance_turn();
        }
        if self.encounter().is_some_and(|e| !e.is_players_turn()) {
            tracing::warn!(
                player_id = %self.scene.player.id,
                cap,
                "AI turn queue hit its iteration cap"
            );
        }
    }

    fn monster_turn(&mut self, id: MonsterId) {
        let Some(monster) = self.scene.monster(id) else {
            return;
        };
        if !monster.is_alive {
            return;
        }
        let name = monster.name.clone();
        let archetype = monster.archetype.clone();

        if monster.is_stunned() {
            self.emit(GameEvent::combat(format!(
                "{} is stunned and skips its turn!",
                name
            )));
            if let Some(monster) = self.scene.monster_mut(id) {
                if let Err(e) = monster.set_state(MonsterState::Combat) {
                    tracing::warn!(error = %e, monster_id = %id, "Could not clear stun");
                }
            }
            return;
        }

        let target = self.scene.player.position;
        let from = monster.position;
        if !in_melee(&from, &target) {
            for ability in abilities_of(&archetype) {
                if let MonsterAbility::RangedWeb {
                    chance_percent,
                    range,
                    damage,
                } = ability
                {
                    let in_range = from.same_level(&target) && from.chebyshev(&target) <= *range;
                    if in_range && self.rules.chance(*chance_percent) {
                        let raw = self.rules.roll(*damage);
                        self.web_player(id, &name, raw);
                        return;
                    }
                }
            }
            self.approach(CombatantRef::Monster(id), target);
        }

        let now_at = self.scene.monster(id).map(|m| m.position);
        if now_at.is_some_and(|p| in_melee(&p, &self.scene.player.position)) {
            self.monster_attack(id);
        }
    }

    fn web_player(&mut self, id: MonsterId, name: &str, raw: i32) {
        let taken = self.hurt_player(raw);
        self.scene.player.status.webbed = true;
        let player_ref = self.player_ref();
        self.emit(GameEvent::animation(
            AnimationKind::Web,
            CombatantRef::Monster(id),
            Some(player_ref),
        ));
        self.emit(GameEvent::danger(format!(
            "{} spits a sticky web! You take {} damage and are stuck.",
            name, taken
        )));
        self.check_defeat();
    }

    fn monster_attack(&mut self, id: MonsterId) {
        let Some(monster) = self.scene.monster(id) else {
            return;
        };
        let name = monster.name.clone();
        let strength = monster.modifier(Ability::Strength);
        let dice = monster.damage;
        let armor_class = self.scene.player.armor_class;
        let player_ref = self.player_ref();

        let total = self.rules.d(20) + strength + MONSTER_HIT_BONUS;
        self.emit(GameEvent::animation(
            AnimationKind::Attack,
            CombatantRef::Monster(id),
            Some(player_ref),
        ));
        if total >= armor_class {
            let raw = self.rules.roll(dice) + strength;
            let taken = self.hurt_player(raw);
            self.emit(GameEvent::combat(format!(
                "{} hits you for {} damage! ({} vs AC {})",
                name, taken, total, armor_class
            )));
            self.check_defeat();
        } else {
            self.emit(GameEvent::popup(player_ref, "Miss", PopupStyle::Miss));
            self.emit(GameEvent::combat(format!(
                "{} misses you. ({} vs AC {})",
                name, total, armor_class
            )));
        }
    }

    /// A following companion picks the closest enemy and fights it.
    fn ally_turn(&mut self, id: NpcId) {
        let Some(npc) = self.scene.npc(id) else {
            return;
        };
        let ally_name = npc.name.clone();
        let Some(target) = self.nearest_enemy(npc.position) else {
            return;
        };
        let Some(target_pos) = self.scene.monster(target).map(|m| m.position) else {
            return;
        };

        self.approach(CombatantRef::Npc(id), target_pos);
        let Some(at) = self.position_of(CombatantRef::Npc(id)) else {
            return;
        };
        if !in_melee(&at, &target_pos) {
            return;
        }

        let Some(monster) = self.scene.monster(target) else {
            return;
        };
        let (name, armor_class, archetype) = (
            monster.name.clone(),
            monster.armor_class,
            monster.archetype.clone(),
        );
        let total = self.rules.d(20) + ALLY_HIT_BONUS;
        self.emit(GameEvent::animation(
            AnimationKind::Attack,
            CombatantRef::Npc(id),
            Some(CombatantRef::Monster(target)),
        ));
        if total >= armor_class {
            let damage = hit_damage(self.rules.roll(ALLY_DAMAGE), false, &archetype);
            self.emit(GameEvent::combat(format!(
                "{} strikes {} for {} damage!",
                ally_name, name, damage
            )));
            // A dying monster can take the player down with it.
            if self.damage_monster(target, damage) && !self.check_defeat() {
                self.check_victory();
            }
        } else {
            self.emit(GameEvent::combat(format!(
                "{} swings at {} but misses.",
                ally_name, name
            )));
        }
    }
}
