//! Player turns.

use serde::{Deserialize, Serialize};

use oakhaven_domain::catalog::{abilities_of, MonsterAbility};
use oakhaven_domain::{
    Ability, AnimationKind, BudgetError, CombatantRef, DiceFormula, GameEvent, MonsterId,
    MonsterState, PopupStyle, Position,
};

use super::error::CombatError;
use super::fight::Fight;
use super::rules::{
    heavy_strike_bonus, hit_damage, in_melee, CLEAVE_DICE, CLEAVE_HIT_BONUS, FLEE_DISTANCE,
    HEAVY_STRIKE_DICE, HEAVY_STRIKE_HIT_PENALTY, KICK_DC, PLAYER_HIT_BONUS, RAGE_HIT_BONUS,
    RAGE_TURNS, REVEAL_RADIUS, SECOND_WIND_DICE,
};

/// Everything a player can do on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    Move {
        dx: i32,
        dy: i32,
    },
    Attack {
        #[serde(default)]
        target: Option<MonsterId>,
    },
    HeavyStrike {
        #[serde(default)]
        target: Option<MonsterId>,
    },
    Cleave,
    Kick {
        #[serde(default)]
        target: Option<MonsterId>,
    },
    Rage,
    UsePotion,
    SecondWind,
    Flee,
    EndTurn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strike {
    Basic,
    Heavy,
    Cleave,
}

impl Strike {
    fn hit_bonus(self) -> i32 {
        match self {
            Self::Basic => 0,
            Self::Heavy => -HEAVY_STRIKE_HIT_PENALTY,
            Self::Cleave => CLEAVE_HIT_BONUS,
        }
    }

    fn damage(self, weapon: DiceFormula, strength: i32) -> (DiceFormula, i32) {
        match self {
            Self::Basic => (weapon, strength),
            Self::Heavy => (HEAVY_STRIKE_DICE, heavy_strike_bonus(strength)),
            Self::Cleave => (CLEAVE_DICE, strength),
        }
    }
}

impl Fight<'_> {
    /// Resolve one player action.
    ///
    /// Only valid during the player's own turn. A rejected action leaves
    /// the budget untouched.
    pub fn act(&mut self, action: PlayerAction) -> Result<(), CombatError> {
        let encounter = self.encounter().ok_or(CombatError::NotInCombat)?;
        if !encounter.is_players_turn() {
            return Err(CombatError::NotYourTurn);
        }

        match action {
            PlayerAction::Move { dx, dy } => {
                let to = self.scene.player.position.offset(dx.signum(), dy.signum());
                self.step_player(to)
            }
            PlayerAction::Attack { target } => self.attack(target, Strike::Basic),
            PlayerAction::HeavyStrike { target } => self.attack(target, Strike::Heavy),
            PlayerAction::Cleave => self.cleave(),
            PlayerAction::Kick { target } => self.kick(target),
            PlayerAction::Rage => self.rage(),
            PlayerAction::UsePotion => self.use_potion(),
            PlayerAction::SecondWind => self.second_wind(),
            PlayerAction::Flee => {
                self.flee();
                Ok(())
            }
            PlayerAction::EndTurn => {
                self.end_turn();
                Ok(())
            }
        }
    }

    /// One tile of combat movement.
    pub fn step_player(&mut self, to: Position) -> Result<(), CombatError> {
        let encounter = self.encounter().ok_or(CombatError::NotInCombat)?;
        if !encounter.is_players_turn() {
            return Err(CombatError::NotYourTurn);
        }
        if encounter.budget.moves_left == 0 {
            return Err(BudgetError::NoMoves.into());
        }
        if !self.scene.is_open(to) {
            return Err(CombatError::invalid("Something blocks your way."));
        }

        let left = match self.encounter_mut() {
            Some(encounter) => encounter.spend_move()?,
            None => return Err(CombatError::NotInCombat),
        };
        self.scene.player.position = to;
        self.scene.reveal(to, REVEAL_RADIUS);
        let player_ref = self.player_ref();
        self.emit(GameEvent::Animation {
            kind: AnimationKind::Move,
            actor: player_ref,
            target: None,
            at: Some(to),
        });
        self.emit(GameEvent::info(format!("You move. ({} moves left)", left)));
        Ok(())
    }

    fn require_action(&self) -> Result<(), CombatError> {
        match self.encounter() {
            Some(e) if e.budget.actions_left > 0 => Ok(()),
            Some(_) => Err(BudgetError::NoActions.into()),
            None => Err(CombatError::NotInCombat),
        }
    }

    fn require_bonus(&self) -> Result<(), CombatError> {
        match self.encounter() {
            Some(e) if e.budget.bonus_actions_left > 0 => Ok(()),
            Some(_) => Err(BudgetError::NoBonusActions.into()),
            None => Err(CombatError::NotInCombat),
        }
    }

    fn spend_action(&mut self) -> Result<(), CombatError> {
        self.encounter_mut()
            .ok_or(CombatError::NotInCombat)?
            .spend_action()?;
        Ok(())
    }

    fn spend_bonus(&mut self) -> Result<(), CombatError> {
        self.encounter_mut()
            .ok_or(CombatError::NotInCombat)?
            .spend_bonus()?;
        Ok(())
    }

    /// The requested enemy if it is a living member within reach, otherwise
    /// the nearest living enemy, which must itself be within reach.
    fn resolve_target(&self, requested: Option<MonsterId>) -> Result<MonsterId, CombatError> {
        let from = self.scene.player.position;
        let encounter = self.encounter().ok_or(CombatError::NotInCombat)?;
        if let Some(id) = requested {
            let usable = self.scene.monster(id).is_some_and(|m| {
                m.is_alive
                    && encounter.includes(CombatantRef::Monster(id))
                    && in_melee(&from, &m.position)
            });
            if usable {
                return Ok(id);
            }
        }
        self.nearest_enemy(from)
            .filter(|id| {
                self.scene
                    .monster(*id)
                    .is_some_and(|m| in_melee(&from, &m.position))
            })
            .ok_or(CombatError::NoEnemyInRange)
    }

    fn attack(&mut self, requested: Option<MonsterId>, strike: Strike) -> Result<(), CombatError> {
        self.require_action()?;
        let target = self.resolve_target(requested)?;
        self.spend_action()?;

        if strike == Strike::Heavy {
            self.emit(GameEvent::combat("You wind up a heavy strike..."));
        }
        self.strike(target, strike);
        if !self.check_defeat() {
            self.check_victory();
        }
        Ok(())
    }

    fn cleave(&mut self) -> Result<(), CombatError> {
        self.require_action()?;
        let from = self.scene.player.position;
        let targets: Vec<MonsterId> = self
            .living_enemies()
            .into_iter()
            .filter(|id| {
                self.scene
                    .monster(*id)
                    .is_some_and(|m| in_melee(&from, &m.position))
            })
            .collect();
        if targets.is_empty() {
            return Err(CombatError::NoEnemyInRange);
        }
        self.spend_action()?;

        self.emit(GameEvent::combat("You swing in a wide arc!"));
        for target in targets {
            if self.scene.player.is_dead() {
                break;
            }
            self.strike(target, Strike::Cleave);
        }
        if !self.check_defeat() {
            self.check_victory();
        }
        Ok(())
    }

    /// Roll to hit and apply damage to one target, then suffer its aura.
    fn strike(&mut self, target: MonsterId, strike: Strike) {
        let Some(monster) = self.scene.monster(target) else {
            return;
        };
        let (name, armor_class, archetype) = (
            monster.name.clone(),
            monster.armor_class,
            monster.archetype.clone(),
        );
        let player = &self.scene.player;
        let strength = player.modifier(Ability::Strength);
        let raging = player.is_raging();
        let weapon = player.weapon_damage();
        let player_ref = self.player_ref();

        let rage_bonus = if raging { RAGE_HIT_BONUS } else { 0 };
        let total =
            self.rules.d(20) + strength + PLAYER_HIT_BONUS + strike.hit_bonus() + rage_bonus;
        self.emit(GameEvent::animation(
            AnimationKind::Attack,
            player_ref,
            Some(CombatantRef::Monster(target)),
        ));

        if total >= armor_class {
            let (dice, bonus) = strike.damage(weapon, strength);
            let damage = hit_damage(self.rules.roll(dice) + bonus, raging, &archetype);
            self.emit(GameEvent::combat(format!(
                "You hit {} for {} damage! ({} vs AC {})",
                name, damage, total, armor_class
            )));
            self.damage_monster(target, damage);
        } else {
            self.emit(GameEvent::popup(
                CombatantRef::Monster(target),
                "Miss",
                PopupStyle::Miss,
            ));
            self.emit(GameEvent::combat(format!(
                "You miss {}. ({} vs AC {})",
                name, total, armor_class
            )));
        }

        self.aura_burn(target, &name, &archetype);
    }

    fn aura_burn(&mut self, source: MonsterId, name: &str, archetype: &str) {
        for ability in abilities_of(archetype) {
            let MonsterAbility::AuraBurn { damage, negated_by } = ability else {
                continue;
            };
            if self.scene.player.has_equipped_effect(negated_by) {
                self.emit(GameEvent::info(format!(
                    "Your gear shields you from the heat of the {}.",
                    name
                )));
                continue;
            }
            let raw = self.rules.roll(*damage);
            let taken = self.hurt_player(raw);
            let player_ref = self.player_ref();
            self.emit(GameEvent::animation(
                AnimationKind::Burn,
                CombatantRef::Monster(source),
                Some(player_ref),
            ));
            self.emit(GameEvent::danger(format!(
                "The heat of the {} burns you for {} damage!",
                name, taken
            )));
        }
    }

    fn kick(&mut self, requested: Option<MonsterId>) -> Result<(), CombatError> {
        self.require_bonus()?;
        let target = self.resolve_target(requested)?;
        self.spend_bonus()?;

        let total = self.rules.d(20) + self.scene.player.modifier(Ability::Strength);
        let Some(monster) = self.scene.monster_mut(target) else {
            return Err(CombatError::MonsterNotFound);
        };
        let name = monster.name.clone();
        if total >= KICK_DC {
            monster.set_state(MonsterState::Stunned)?;
            self.emit(GameEvent::animation(
                AnimationKind::Stun,
                CombatantRef::Monster(target),
                None,
            ));
            self.emit(GameEvent::combat(format!(
                "You kick {}! It is stunned. ({} vs DC {})",
                name, total, KICK_DC
            )));
        } else {
            self.emit(GameEvent::combat(format!(
                "{} shrugs off your kick. ({} vs DC {})",
                name, total, KICK_DC
            )));
        }
        Ok(())
    }

    fn rage(&mut self) -> Result<(), CombatError> {
        self.require_bonus()?;
        if self.scene.player.is_raging() {
            return Err(CombatError::invalid("You are already raging!"));
        }
        self.spend_bonus()?;
        self.scene.player.status.rage_turns = RAGE_TURNS;
        let player_ref = self.player_ref();
        self.emit(GameEvent::animation(AnimationKind::Rage, player_ref, None));
        self.emit(GameEvent::combat(
            "You fly into a rage! Your blows land harder, but so do theirs.",
        ));
        Ok(())
    }

    fn use_potion(&mut self) -> Result<(), CombatError> {
        self.require_bonus()?;
        let Some(potion) = self.scene.player.healing_consumable() else {
            return Err(CombatError::invalid("You have no healing potions!"));
        };
        let (item_id, name, heal) = (potion.id, potion.name.clone(), potion.properties.heal);
        self.spend_bonus()?;

        let rules = self.rules;
        let amount = heal.map_or(0, |h| h.resolve(|min, max| rules.range(min, max)));
        let player = &mut self.scene.player;
        let restored = player.heal(amount);
        player.remove_item(item_id, 1);
        self.emit_heal(restored);
        self.emit(GameEvent::success(format!(
            "You drink the {} and recover {} HP.",
            name, restored
        )));
        Ok(())
    }

    fn second_wind(&mut self) -> Result<(), CombatError> {
        self.require_bonus()?;
        if self.encounter().is_some_and(|e| e.second_wind_used) {
            return Err(CombatError::invalid(
                "You have already used Second Wind this fight.",
            ));
        }
        self.spend_bonus()?;
        if let Some(encounter) = self.encounter_mut() {
            encounter.second_wind_used = true;
        }

        let amount = self.rules.roll(SECOND_WIND_DICE) + self.scene.player.level as i32;
        let restored = self.scene.player.heal(amount);
        self.emit_heal(restored);
        self.emit(GameEvent::success(format!(
            "You catch your second wind and recover {} HP.",
            restored
        )));
        Ok(())
    }

    fn emit_heal(&mut self, restored: i32) {
        let player_ref = self.player_ref();
        self.emit(GameEvent::animation(AnimationKind::Heal, player_ref, None));
        self.emit(GameEvent::popup(
            player_ref,
            format!("+{}", restored),
            PopupStyle::Heal,
        ));
    }

    /// Break off the fight and scramble away from the enemies.
    ///
    /// The player lands up to three tiles from the average enemy position,
    /// falling back to shorter hops when the way is blocked.
    pub fn flee(&mut self) {
        let origin = self.scene.player.position;
        let enemies: Vec<Position> = self
            .living_enemies()
            .into_iter()
            .filter_map(|id| self.scene.monster(id).map(|m| m.position))
            .collect();

        self.force_end();

        let (dx, dy) = if enemies.is_empty() {
            (0, 0)
        } else {
            let count = enemies.len() as i32;
            let sum_x: i32 = enemies.iter().map(|p| p.x).sum();
            let sum_y: i32 = enemies.iter().map(|p| p.y).sum();
            // origin * count vs sum keeps the comparison in integers
            (
                (origin.x * count - sum_x).signum(),
                (origin.y * count - sum_y).signum(),
            )
        };
        if (dx, dy) != (0, 0) {
            let landing = (1..=FLEE_DISTANCE)
                .rev()
                .map(|d| origin.offset(dx * d, dy * d))
                .find(|p| self.scene.is_open(*p));
            if let Some(landing) = landing {
                self.scene.player.position = landing;
                self.scene.reveal(landing, REVEAL_RADIUS);
            }
        }

        tracing::info!(player_id = %self.scene.player.id, "Player fled combat");
        self.emit(GameEvent::info("You flee from combat!"));
    }

    /// Close the player's turn and let everyone else act.
    pub fn end_turn(&mut self) {
        let player = &mut self.scene.player;
        if player.status.rage_turns > 0 {
            player.status.rage_turns -= 1;
            if player.status.rage_turns == 0 {
                self.emit(GameEvent::info("Your rage subsides."));
            }
        }
        self.advance_turn();
        self.run_ai_queue();
    }
}

#[cfg(test)]
mod tests {
    use oakhaven_domain::catalog::{archetype, item_template};

    use super::super::fight::test_support::*;
    use super::*;
    use crate::use_cases::context::test_support::scripted;
    use crate::use_cases::Rejection;

    fn texts(fight: &Fight<'_>) -> Vec<String> {
        fight
            .events()
            .iter()
            .filter_map(|e| e.text().map(str::to_owned))
            .collect()
    }

    #[test]
    fn attack_hits_and_spends_the_action() {
        // init 20/1, to hit 10 (+2 +2 = 14 vs AC 10), 1d4 -> 3 + 2
        let rules = scripted([20, 1, 10, 3], 1);
        let mut scene = arena(hero(), vec![skeleton_at(1, 0), skeleton_at(5, 5)]);
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        fight.act(PlayerAction::Attack { target: None }).unwrap();
        assert!(texts(&fight).contains(&"You hit Skeleton for 5 damage! (14 vs AC 10)".to_owned()));

        let second = fight.act(PlayerAction::Attack { target: None });
        assert!(matches!(
            second,
            Err(CombatError::Budget(BudgetError::NoActions))
        ));
        assert_eq!(scene.monsters[0].hp_current, 5);
    }

    #[test]
    fn attack_out_of_reach_is_rejected_without_spending() {
        let rules = scripted([20, 1], 1);
        let mut scene = arena(hero(), vec![skeleton_at(3, 0)]);
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        let result = fight.act(PlayerAction::Attack {
            target: Some(target),
        });
        assert!(matches!(result, Err(CombatError::NoEnemyInRange)));
        assert_eq!(fight.encounter().unwrap().budget.actions_left, 1);
    }

    #[test]
    fn actions_without_an_encounter_are_refused() {
        let rules = scripted([], 1);
        let mut scene = arena(hero(), vec![skeleton_at(1, 0)]);
        let mut fight = Fight::new(&mut scene, &rules);
        assert!(matches!(
            fight.act(PlayerAction::Rage),
            Err(CombatError::NotInCombat)
        ));
    }

    #[test]
    fn actions_on_a_monster_turn_are_refused() {
        let rules = scripted([20, 1], 20);
        let mut scene = arena(hero(), vec![skeleton_at(1, 0)]);
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        let encounter = fight.encounter_mut().unwrap();
        encounter.current_turn_index = encounter
            .turn_order
            .iter()
            .position(|c| c.actor == CombatantRef::Monster(target))
            .unwrap();
        let budget = encounter.budget;

        assert!(matches!(
            fight.act(PlayerAction::Attack { target: None }),
            Err(CombatError::NotYourTurn)
        ));
        assert!(matches!(
            fight.act(PlayerAction::Move { dx: -1, dy: 0 }),
            Err(CombatError::NotYourTurn)
        ));
        assert_eq!(fight.encounter().unwrap().budget, budget);
        assert_eq!(scene.monsters[0].hp_current, 10);
        assert_eq!(scene.player.position, Position::new(0, 0, 0));
    }

    #[test]
    fn movement_is_limited_by_the_budget() {
        let rules = scripted([20, 1], 1);
        let mut scene = arena(hero(), vec![skeleton_at(4, 4)]);
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        fight.encounter_mut().unwrap().budget.moves_left = 1;
        fight.act(PlayerAction::Move { dx: -1, dy: 0 }).unwrap();
        let again = fight.act(PlayerAction::Move { dx: -1, dy: 0 });
        assert!(matches!(again, Err(CombatError::Budget(BudgetError::NoMoves))));
        assert_eq!(scene.player.position, Position::new(-1, 0, 0));
    }

    #[test]
    fn heavy_strike_against_high_defense_is_halved() {
        // to hit 20; 2d8 -> 8 + 8, +3 from STR; golem halves 19 to 9
        let rules = scripted([20, 1, 20, 8, 8], 1);
        let golem = archetype("stone_golem")
            .map(|a| a.spawn(Position::new(1, 1, 0)))
            .unwrap();
        let mut scene = arena(hero(), vec![golem]);
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        fight.act(PlayerAction::HeavyStrike { target: None }).unwrap();
        assert_eq!(scene.monsters[0].hp_current, 30 - 9);
    }

    #[test]
    fn cleave_hits_everything_adjacent() {
        let rules = scripted([20, 1, 1], 20);
        let mut scene = arena(
            hero(),
            vec![skeleton_at(1, 0), skeleton_at(-1, 0), skeleton_at(3, 3)],
        );
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        fight.act(PlayerAction::Cleave).unwrap();
        // 1d6 max 6 + 2 STR = 8 each
        assert_eq!(scene.monsters[0].hp_current, 2);
        assert_eq!(scene.monsters[1].hp_current, 2);
        assert_eq!(scene.monsters[2].hp_current, 10);
    }

    #[test]
    fn cleave_that_sweeps_the_field_wins_once() {
        // init 20/1/1; every later roll is a 20
        let rules = scripted([20, 1, 1], 20);
        let mut first = skeleton_at(1, 0);
        let mut second = skeleton_at(-1, 0);
        first.hp_current = 1;
        second.hp_current = 1;
        let mut scene = arena(hero(), vec![first, second]);
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        fight.act(PlayerAction::Cleave).unwrap();
        let victories = texts(&fight)
            .iter()
            .filter(|t| t.starts_with("Victory!"))
            .count();
        assert_eq!(victories, 1);
        assert!(fight.encounter().is_none());

        let loot: Vec<_> = fight.scene.monsters.iter().map(|m| m.loot.clone()).collect();
        assert!(!fight.check_victory());
        fight.advance_turn();
        let after: Vec<_> = fight.scene.monsters.iter().map(|m| m.loot.clone()).collect();
        assert_eq!(loot, after);
        assert_eq!(texts(&fight).iter().filter(|t| t.starts_with("Victory!")).count(), 1);

        assert!(!scene.in_combat());
        assert_eq!(scene.player.xp, 10 * 4 * 2);
        assert!(scene.monsters.iter().all(|m| !m.is_alive && m.loot_generated));
    }

    #[test]
    fn kick_stuns_on_a_good_roll() {
        let rules = scripted([20, 1, 10], 1);
        let mut scene = arena(hero(), vec![skeleton_at(0, 1)]);
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        fight.act(PlayerAction::Kick { target: None }).unwrap();
        assert_eq!(scene.monsters[0].state, MonsterState::Stunned);
    }

    #[test]
    fn rage_and_second_wind_are_limited() {
        let rules = scripted([20, 1], 4);
        let mut scene = arena(hero(), vec![skeleton_at(1, 0)]);
        scene.player.hp_current = 5;
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        fight.act(PlayerAction::SecondWind).unwrap();
        assert_eq!(fight.scene.player.hp_current, 10);
        assert!(matches!(
            fight.act(PlayerAction::Rage),
            Err(CombatError::Budget(BudgetError::NoBonusActions))
        ));

        fight.encounter_mut().unwrap().reset_budget();
        let again = fight.act(PlayerAction::SecondWind);
        assert!(matches!(again, Err(CombatError::Invalid(_))));
        fight.act(PlayerAction::Rage).unwrap();
        fight.encounter_mut().unwrap().reset_budget();
        let again = fight.act(PlayerAction::Rage).unwrap_err();
        assert_eq!(again.to_string(), "You are already raging!");
    }

    #[test]
    fn potion_heals_and_is_consumed() {
        let rules = scripted([20, 1], 3);
        let mut hero = hero();
        hero.add_item(item_template("healing_potion").unwrap().instantiate());
        hero.hp_current = 1;
        let mut scene = arena(hero, vec![skeleton_at(1, 0)]);
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        fight.act(PlayerAction::UsePotion).unwrap();
        // 2d4+2 with threes
        assert_eq!(scene.player.hp_current, 9);
        assert_eq!(scene.player.count_item("Healing Potion"), 0);
    }

    #[test]
    fn no_potion_is_a_rejection() {
        let rules = scripted([20, 1], 3);
        let mut scene = arena(hero(), vec![skeleton_at(1, 0)]);
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        let err = fight.act(PlayerAction::UsePotion).unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(fight.encounter().unwrap().budget.bonus_actions_left, 1);
    }

    #[test]
    fn burning_aura_is_negated_by_fire_resist() {
        let rules = scripted([20, 1, 1], 4);
        let guardian = archetype("fire_guardian")
            .map(|a| a.spawn(Position::new(1, 0, 0)))
            .unwrap();
        let mut hero = hero();
        let shield = item_template("phoenix_shield").unwrap().instantiate();
        let shield_id = shield.id;
        hero.add_item(shield);
        hero.equip(shield_id).unwrap();
        let hp = hero.hp_current;
        let mut scene = arena(hero, vec![guardian]);
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        fight.act(PlayerAction::Attack { target: None }).unwrap();
        assert_eq!(scene.player.hp_current, hp);
    }

    #[test]
    fn burning_aura_hurts_attackers() {
        let rules = scripted([20, 1, 1], 4);
        let guardian = archetype("fire_guardian")
            .map(|a| a.spawn(Position::new(1, 0, 0)))
            .unwrap();
        let mut scene = arena(hero(), vec![guardian]);
        let target = scene.monsters[0].id;
        let hp = scene.player.hp_current;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        fight.act(PlayerAction::Attack { target: None }).unwrap();
        assert_eq!(scene.player.hp_current, hp - 4);
    }

    #[test]
    fn flee_ends_combat_and_moves_away() {
        let rules = scripted([20, 1], 1);
        let mut scene = arena(hero(), vec![skeleton_at(1, 0)]);
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        fight.act(PlayerAction::Flee).unwrap();

        assert!(!scene.in_combat());
        assert_eq!(scene.player.position, Position::new(-3, 0, 0));
        assert_eq!(scene.monsters[0].state, MonsterState::Idle);
    }

    #[test]
    fn end_turn_ticks_rage_and_returns_control() {
        let rules = scripted([20, 1], 1);
        let mut scene = arena(hero(), vec![skeleton_at(1, 0)]);
        scene.player.status.rage_turns = 1;
        let target = scene.monsters[0].id;
        let mut fight = Fight::new(&mut scene, &rules);
        fight.begin(target).unwrap();

        fight.act(PlayerAction::EndTurn).unwrap();
        assert!(texts(&fight).contains(&"Your rage subsides.".to_owned()));

        let encounter = scene.active_encounter().unwrap();
        assert!(encounter.is_players_turn());
        assert_eq!(encounter.round, 2);
        assert!(!scene.player.is_raging());
    }

    #[test]
    fn actions_parse_from_tagged_json() {
        let action: PlayerAction =
            serde_json::from_str(r#"{"action":"move","dx":1,"dy":-1}"#).unwrap();
        assert_eq!(action, PlayerAction::Move { dx: 1, dy: -1 });
        let action: PlayerAction = serde_json::from_str(r#"{"action":"attack"}"#).unwrap();
        assert_eq!(action, PlayerAction::Attack { target: None });
    }
}
