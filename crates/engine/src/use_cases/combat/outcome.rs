//! Kills, victory and defeat.

use oakhaven_domain::catalog::{abilities_of, MonsterAbility};
use oakhaven_domain::{AnimationKind, CombatantRef, GameEvent, MonsterId, PopupStyle};

use crate::use_cases::{loot, quests};

use super::fight::Fight;
use super::rules::damage_to_player;

impl Fight<'_> {
    /// Land `damage` on a monster. Returns true when the hit killed it.
    pub(super) fn damage_monster(&mut self, id: MonsterId, damage: i32) -> bool {
        let Some(monster) = self.scene.monster_mut(id) else {
            return false;
        };
        let outcome = monster.take_damage(damage);
        self.emit(GameEvent::popup(
            CombatantRef::Monster(id),
            format!("-{}", outcome.applied),
            PopupStyle::Damage,
        ));
        if outcome.killed {
            self.on_kill(id);
        }
        outcome.killed
    }

    fn on_kill(&mut self, id: MonsterId) {
        let rules = self.rules;
        let Some(monster) = self.scene.monster_mut(id) else {
            return;
        };
        loot::ensure_loot(monster, rules);
        let name = monster.name.clone();
        let archetype = monster.archetype.clone();
        let position = monster.position;
        let xp = monster.xp_value();

        self.emit(GameEvent::combat(format!("{} dies!", name)));
        self.emit(GameEvent::animation(
            AnimationKind::Death,
            CombatantRef::Monster(id),
            None,
        ));

        let player_ref = self.player_ref();
        let level_up = self.scene.player.award_xp(xp);
        self.emit(GameEvent::popup(
            player_ref,
            format!("+{} XP", xp),
            PopupStyle::Xp,
        ));
        if level_up.leveled() {
            tracing::info!(
                player_id = %self.scene.player.id,
                level = level_up.new_level,
                "Player levelled up"
            );
            self.emit(GameEvent::success(format!(
                "LEVEL UP! You are now level {}.",
                level_up.new_level
            )));
        }

        match quests::record_kill(&mut self.scene.player, &name) {
            Ok(progress) => {
                for update in progress {
                    self.emit(GameEvent::info(format!(
                        "Quest '{}': {} {}/{}",
                        update.quest_title, update.target, update.current, update.needed
                    )));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, monster = %name, "Failed to record quest kill");
            }
        }

        for ability in abilities_of(&archetype) {
            if let MonsterAbility::ExplodesOnDeath { damage, radius } = ability {
                let player_pos = self.scene.player.position;
                if player_pos.same_level(&position) && player_pos.chebyshev(&position) <= *radius
                {
                    let raw = self.rules.roll(*damage);
                    let taken = self.hurt_player(raw);
                    self.emit(GameEvent::animation(
                        AnimationKind::Explosion,
                        CombatantRef::Monster(id),
                        Some(player_ref),
                    ));
                    self.emit(GameEvent::danger(format!(
                        "The {} explodes! You take {} fire damage.",
                        name, taken
                    )));
                }
            }
        }
    }

    /// Apply a hit to the player after rage scaling. Returns HP lost.
    pub(super) fn hurt_player(&mut self, raw: i32) -> i32 {
        let amount = damage_to_player(raw, self.scene.player.is_raging());
        let taken = self.scene.player.take_damage(amount);
        let player_ref = self.player_ref();
        self.emit(GameEvent::popup(
            player_ref,
            format!("-{}", taken),
            PopupStyle::Damage,
        ));
        taken
    }

    /// Every encounter monster is dead, but nothing has been finalized yet.
    pub(super) fn victory_quiet(&self) -> bool {
        let Some(encounter) = self.encounter() else {
            return false;
        };
        !encounter
            .monster_ids()
            .any(|id| self.scene.monster(id).is_some_and(|m| m.is_alive))
    }

    /// Finalize the encounter if it has been won. Returns true if it was.
    pub(super) fn check_victory(&mut self) -> bool {
        if !self.victory_quiet() {
            return false;
        }
        self.finish_victory();
        true
    }

    pub(super) fn finish_victory(&mut self) {
        let round = self.encounter().map(|e| e.round).unwrap_or_default();
        let Some(encounter_id) = self.close() else {
            return;
        };
        self.scene.player.clear_combat_status();
        self.emit(GameEvent::success("Victory! All enemies have been defeated."));

        let level = self.scene.player.position.z;
        if self.scene.alive_on_level(level) == 0 {
            self.emit(GameEvent::success(
                "The area falls silent. No enemies remain on this level.",
            ));
        }
        tracing::info!(
            player_id = %self.scene.player.id,
            encounter_id = %encounter_id,
            rounds = round,
            "Encounter won"
        );
    }

    /// Finalize a lost encounter if the player has fallen.
    pub(super) fn check_defeat(&mut self) -> bool {
        if !self.scene.player.is_dead() || !self.scene.in_combat() {
            return false;
        }
        self.defeat();
        true
    }

    fn defeat(&mut self) {
        let Some(encounter_id) = self.close() else {
            return;
        };
        let settings = self.rules.settings();
        let player = &mut self.scene.player;
        let lost = player.gold * settings.defeat_gold_penalty_percent / 100;
        player.gold -= lost;
        player.full_heal();
        player.clear_combat_status();
        player.position = settings.safe_respawn;

        tracing::info!(
            player_id = %player.id,
            encounter_id = %encounter_id,
            gold_lost = lost,
            "Player defeated"
        );
        self.emit(GameEvent::danger("You have been defeated..."));
        self.emit(GameEvent::info(format!(
            "You wake up in the safety of town. You lost {} gold.",
            lost
        )));
    }

    /// End the fight without a winner (flee, teleport, explicit end).
    pub fn force_end(&mut self) -> bool {
        if self.close().is_none() {
            return false;
        }
        self.scene.player.clear_combat_status();
        true
    }

    /// Close the active encounter and stand every surviving member down.
    fn close(&mut self) -> Option<oakhaven_domain::EncounterId> {
        let members: Vec<MonsterId> = self.encounter()?.monster_ids().collect();
        let now = self.rules.now();
        let id = self.scene.close_encounter(now)?.id;
        for member in members {
            if let Some(monster) = self.scene.monster_mut(member) {
                monster.disengage();
            }
        }
        Some(id)
    }
}
