//! Player entity
//!
//! Holds the character sheet, purse, inventory, quest log, and the transient
//! combat status. Invariants kept here:
//!
//! - `0 <= hp_current <= hp_max`
//! - after `award_xp`, `xp < next_level_xp(level)`
//! - at most one equipped item per slot

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::item::{EquipSlot, InventoryItem, MAX_STACK};
use crate::error::DomainError;
use crate::ids::{ItemId, PlayerId};
use crate::value_objects::{Ability, AbilityScores, DiceFormula, Position};

/// HP gained per level.
pub const HP_PER_LEVEL: i32 = 5;
/// Base armor class before dexterity and gear.
pub const BASE_ARMOR_CLASS: i32 = 10;
/// Unarmed / fallback weapon damage.
pub const UNARMED_DAMAGE: DiceFormula = DiceFormula::die(4);

/// XP required to advance from `level` to `level + 1`.
pub fn next_level_xp(level: u32) -> u32 {
    level.saturating_mul(150)
}

/// XP required to advance a gathering/crafting skill.
pub fn next_skill_level_xp(level: u32) -> u32 {
    level.max(1) * 50
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillProgress {
    pub level: u32,
    pub xp: u32,
}

/// Result of `award_xp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub levels_gained: u32,
    pub new_level: u32,
}

impl LevelUp {
    pub fn leveled(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Combat-only status that does not survive a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerStatus {
    /// Turns of rage remaining; zero when not raging.
    pub rage_turns: u32,
    /// Webbed players lose their movement on their next turn.
    pub webbed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestProgress {
    /// Kill counts keyed by target name.
    pub kills: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestLog {
    pub active: BTreeMap<String, QuestProgress>,
    pub completed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub level: u32,
    pub xp: u32,
    pub gold: u32,
    pub hp_current: i32,
    pub hp_max: i32,
    pub armor_class: i32,
    pub abilities: AbilityScores,
    pub unspent_points: u32,
    pub skills: BTreeMap<String, SkillProgress>,
    pub position: Position,
    pub inventory: Vec<InventoryItem>,
    pub quest_log: QuestLog,
    pub status: PlayerStatus,
}

impl Player {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        let abilities = AbilityScores {
            strength: 14,
            dexterity: 12,
            constitution: 12,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        };
        let mut player = Self {
            id: PlayerId::new(),
            name: name.into(),
            level: 1,
            xp: 0,
            gold: 0,
            hp_current: 20,
            hp_max: 20,
            armor_class: BASE_ARMOR_CLASS,
            abilities,
            unspent_points: 0,
            skills: BTreeMap::new(),
            position,
            inventory: Vec::new(),
            quest_log: QuestLog::default(),
            status: PlayerStatus::default(),
        };
        player.recalculate_stats();
        player
    }

    // ── Builder-ish helpers ────────────────────────────────────────────

    pub fn with_abilities(mut self, abilities: AbilityScores) -> Self {
        self.abilities = abilities;
        self.recalculate_stats();
        self
    }

    pub fn with_hp(mut self, current: i32, max: i32) -> Self {
        self.hp_max = max.max(1);
        self.hp_current = current.clamp(0, self.hp_max);
        self
    }

    pub fn with_gold(mut self, gold: u32) -> Self {
        self.gold = gold;
        self
    }

    // ── Vitals ─────────────────────────────────────────────────────────

    pub fn modifier(&self, ability: Ability) -> i32 {
        self.abilities.modifier(ability)
    }

    pub fn is_dead(&self) -> bool {
        self.hp_current <= 0
    }

    pub fn is_raging(&self) -> bool {
        self.status.rage_turns > 0
    }

    /// Apply damage, clamping at zero. Returns damage actually taken.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.hp_current;
        self.hp_current = (self.hp_current - amount.max(0)).max(0);
        before - self.hp_current
    }

    /// Heal, clamping at `hp_max`. Returns HP actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp_current;
        self.hp_current = (self.hp_current + amount.max(0)).min(self.hp_max);
        self.hp_current - before
    }

    pub fn full_heal(&mut self) {
        self.hp_current = self.hp_max;
    }

    /// Clear combat-only status (rage, web).
    pub fn clear_combat_status(&mut self) {
        self.status = PlayerStatus::default();
    }

    // ── Progression ────────────────────────────────────────────────────

    /// Add XP and process every level-up it pays for.
    ///
    /// Each level: subtract the threshold, +1 level, +5 max HP, full heal,
    /// +1 unspent stat point.
    pub fn award_xp(&mut self, amount: u32) -> LevelUp {
        self.xp = self.xp.saturating_add(amount);
        let mut levels_gained = 0;
        while self.xp >= next_level_xp(self.level) {
            self.xp -= next_level_xp(self.level);
            self.level += 1;
            self.hp_max += HP_PER_LEVEL;
            self.hp_current = self.hp_max;
            self.unspent_points += 1;
            levels_gained += 1;
        }
        LevelUp {
            levels_gained,
            new_level: self.level,
        }
    }

    /// Spend one unspent point on an ability.
    pub fn spend_stat_point(&mut self, ability: Ability) -> Result<i32, DomainError> {
        if self.unspent_points == 0 {
            return Err(DomainError::constraint("No unspent stat points"));
        }
        self.unspent_points -= 1;
        let score = self.abilities.get_mut(ability);
        *score += 1;
        let new_score = *score;
        self.recalculate_stats();
        Ok(new_score)
    }

    pub fn skill_level(&self, skill: &str) -> u32 {
        self.skills.get(skill).map(|s| s.level).unwrap_or(0)
    }

    /// Add skill XP. Returns the new level if the skill advanced.
    pub fn award_skill_xp(&mut self, skill: &str, amount: u32) -> Option<u32> {
        let progress = self.skills.entry(skill.to_string()).or_insert(SkillProgress {
            level: 1,
            xp: 0,
        });
        progress.xp += amount;
        let mut leveled = false;
        while progress.xp >= next_skill_level_xp(progress.level) {
            progress.xp -= next_skill_level_xp(progress.level);
            progress.level += 1;
            leveled = true;
        }
        leveled.then_some(progress.level)
    }

    // ── Equipment ──────────────────────────────────────────────────────

    pub fn equipped(&self, slot: EquipSlot) -> Option<&InventoryItem> {
        self.inventory
            .iter()
            .find(|i| i.is_equipped && i.slot == Some(slot))
    }

    pub fn has_equipped_effect(&self, effect: &str) -> bool {
        self.inventory
            .iter()
            .any(|i| i.is_equipped && i.has_effect(effect))
    }

    /// Damage dice of the main-hand weapon, or fists.
    pub fn weapon_damage(&self) -> DiceFormula {
        self.equipped(EquipSlot::MainHand)
            .and_then(|i| i.properties.damage)
            .unwrap_or(UNARMED_DAMAGE)
    }

    /// AC = 10 + DEX modifier + defense of everything equipped.
    pub fn recalculate_stats(&mut self) {
        let gear: i32 = self
            .inventory
            .iter()
            .filter(|i| i.is_equipped)
            .map(|i| i.properties.defense)
            .sum();
        self.armor_class = BASE_ARMOR_CLASS + self.modifier(Ability::Dexterity) + gear;
    }

    /// Equip an item, unequipping whatever shares its slot.
    pub fn equip(&mut self, item_id: ItemId) -> Result<&InventoryItem, DomainError> {
        let (slot, already) = {
            let item = self
                .item(item_id)
                .ok_or_else(|| DomainError::not_found("Item", item_id.to_string()))?;
            let slot = item
                .slot
                .ok_or_else(|| DomainError::validation(format!("{} cannot be equipped", item.name)))?;
            (slot, item.is_equipped)
        };
        if already {
            return Err(DomainError::invalid_state_transition("Item is already equipped"));
        }

        for other in self.inventory.iter_mut() {
            if other.slot == Some(slot) {
                other.is_equipped = other.id == item_id;
            }
        }
        self.recalculate_stats();
        self.item(item_id)
            .ok_or_else(|| DomainError::not_found("Item", item_id.to_string()))
    }

    pub fn unequip(&mut self, item_id: ItemId) -> Result<(), DomainError> {
        let item = self
            .item_mut(item_id)
            .ok_or_else(|| DomainError::not_found("Item", item_id.to_string()))?;
        if !item.is_equipped {
            return Err(DomainError::invalid_state_transition("Item is not equipped"));
        }
        item.is_equipped = false;
        self.recalculate_stats();
        Ok(())
    }

    // ── Inventory ──────────────────────────────────────────────────────

    pub fn item(&self, item_id: ItemId) -> Option<&InventoryItem> {
        self.inventory.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: ItemId) -> Option<&mut InventoryItem> {
        self.inventory.iter_mut().find(|i| i.id == item_id)
    }

    /// Total quantity held across all stacks with this name.
    pub fn count_item(&self, name: &str) -> u32 {
        self.inventory
            .iter()
            .filter(|i| i.name == name)
            .map(|i| i.quantity)
            .sum()
    }

    /// Add an item, topping up existing stacks before opening new ones.
    pub fn add_item(&mut self, mut item: InventoryItem) {
        if item.is_stackable() {
            let probe = item.clone();
            for stack in self.inventory.iter_mut().filter(|s| s.stacks_with(&probe)) {
                let room = MAX_STACK.saturating_sub(stack.quantity);
                let moved = room.min(item.quantity);
                stack.quantity += moved;
                item.quantity -= moved;
                if item.quantity == 0 {
                    return;
                }
            }
            while item.quantity > MAX_STACK {
                let mut chunk = item.clone();
                chunk.id = ItemId::new();
                chunk.quantity = MAX_STACK;
                item.quantity -= MAX_STACK;
                self.inventory.push(chunk);
            }
        }
        self.inventory.push(item);
    }

    /// Remove up to `quantity` of one item. Returns the removed count.
    pub fn remove_item(&mut self, item_id: ItemId, quantity: u32) -> u32 {
        let Some(pos) = self.inventory.iter().position(|i| i.id == item_id) else {
            return 0;
        };
        let item = &mut self.inventory[pos];
        let removed = quantity.min(item.quantity);
        item.quantity -= removed;
        if item.quantity == 0 {
            let was_equipped = item.is_equipped;
            self.inventory.remove(pos);
            if was_equipped {
                self.recalculate_stats();
            }
        }
        removed
    }

    /// Remove `count` items by name across stacks. Returns the removed count.
    pub fn remove_item_by_name(&mut self, name: &str, count: u32) -> u32 {
        let mut remaining = count;
        let ids: Vec<ItemId> = self
            .inventory
            .iter()
            .filter(|i| i.name == name)
            .map(|i| i.id)
            .collect();
        for id in ids {
            if remaining == 0 {
                break;
            }
            remaining -= self.remove_item(id, remaining);
        }
        count - remaining
    }

    /// First consumable that restores health.
    pub fn healing_consumable(&self) -> Option<&InventoryItem> {
        self.inventory.iter().find(|i| i.is_healing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item::{ItemProperties, ItemType};

    fn player() -> Player {
        Player::new("Hero", Position::new(0, 0, 0))
    }

    fn sword(defense: i32) -> InventoryItem {
        InventoryItem::new(
            "iron_sword",
            "Iron Sword",
            ItemType::Weapon,
            Some(EquipSlot::MainHand),
            ItemProperties {
                damage: Some(DiceFormula::die(6)),
                defense,
                ..Default::default()
            },
        )
    }

    fn herb(quantity: u32) -> InventoryItem {
        InventoryItem::new(
            "mystic_herb",
            "Mystic Herb",
            ItemType::Material,
            None,
            ItemProperties::default(),
        )
        .with_quantity(quantity)
    }

    #[test]
    fn next_level_xp_is_level_times_150() {
        assert_eq!(next_level_xp(1), 150);
        assert_eq!(next_level_xp(4), 600);
    }

    #[test]
    fn award_xp_loops_over_multiple_levels() {
        let mut p = player();
        p.hp_current = 3;
        // 150 (L1) + 300 (L2) + 10 left over
        let result = p.award_xp(460);
        assert_eq!(result.levels_gained, 2);
        assert_eq!(p.level, 3);
        assert_eq!(p.xp, 10);
        assert_eq!(p.hp_max, 30);
        assert_eq!(p.hp_current, 30);
        assert_eq!(p.unspent_points, 2);
        assert!(p.xp < next_level_xp(p.level));
    }

    #[test]
    fn award_xp_below_threshold_does_not_level() {
        let mut p = player();
        let result = p.award_xp(149);
        assert!(!result.leveled());
        assert_eq!(p.level, 1);
        assert_eq!(p.xp, 149);
    }

    #[test]
    fn award_xp_saturates_instead_of_overflowing() {
        let mut p = player();
        p.award_xp(10);
        let result = p.award_xp(u32::MAX);
        assert!(result.leveled());
        assert!(p.level > 1);
        assert!(p.xp < next_level_xp(p.level));
        assert_eq!(p.hp_current, p.hp_max);
    }

    #[test]
    fn hp_is_clamped() {
        let mut p = player();
        assert_eq!(p.take_damage(500), 20);
        assert_eq!(p.hp_current, 0);
        assert!(p.is_dead());
        assert_eq!(p.heal(500), 20);
        assert_eq!(p.hp_current, p.hp_max);
    }

    #[test]
    fn equip_keeps_one_item_per_slot() {
        let mut p = player();
        let a = sword(0);
        let b = sword(1);
        let (a_id, b_id) = (a.id, b.id);
        p.add_item(a);
        p.add_item(b);

        p.equip(a_id).unwrap();
        p.equip(b_id).unwrap();
        let equipped: Vec<_> = p.inventory.iter().filter(|i| i.is_equipped).collect();
        assert_eq!(equipped.len(), 1);
        assert_eq!(equipped[0].id, b_id);
        assert_eq!(p.armor_class, BASE_ARMOR_CLASS + 1 + 1);
        assert_eq!(p.weapon_damage(), DiceFormula::die(6));

        assert!(p.equip(b_id).is_err());
        p.unequip(b_id).unwrap();
        assert_eq!(p.weapon_damage(), UNARMED_DAMAGE);
    }

    #[test]
    fn equip_rejects_slotless_items() {
        let mut p = player();
        let h = herb(1);
        let id = h.id;
        p.add_item(h);
        assert!(matches!(p.equip(id), Err(DomainError::Validation(_))));
    }

    #[test]
    fn stacks_cap_at_fifty() {
        let mut p = player();
        p.add_item(herb(30));
        p.add_item(herb(30));
        assert_eq!(p.count_item("Mystic Herb"), 60);
        let stacks: Vec<u32> = p.inventory.iter().map(|i| i.quantity).collect();
        assert_eq!(stacks, vec![50, 10]);

        p.add_item(herb(120));
        assert!(p.inventory.iter().all(|i| i.quantity <= MAX_STACK));
        assert_eq!(p.count_item("Mystic Herb"), 180);
    }

    #[test]
    fn remove_by_name_spans_stacks() {
        let mut p = player();
        p.add_item(herb(50));
        p.add_item(herb(5));
        assert_eq!(p.remove_item_by_name("Mystic Herb", 52), 52);
        assert_eq!(p.count_item("Mystic Herb"), 3);
        assert_eq!(p.remove_item_by_name("Mystic Herb", 10), 3);
        assert!(p.inventory.is_empty());
    }

    #[test]
    fn stat_points_and_skills() {
        let mut p = player();
        assert!(p.spend_stat_point(Ability::Strength).is_err());
        p.award_xp(150);
        assert_eq!(p.spend_stat_point(Ability::Dexterity).unwrap(), 13);
        assert_eq!(p.unspent_points, 0);

        assert_eq!(p.award_skill_xp("mining", 20), None);
        assert_eq!(p.award_skill_xp("mining", 30), Some(2));
        assert_eq!(p.skill_level("mining"), 2);
        assert_eq!(p.skill_level("smithing"), 0);
    }
}
