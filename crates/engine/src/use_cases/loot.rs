//! Loot generation for kills.

use oakhaven_domain::catalog::loot_tables::{
    zone_drop_for_roll, LootTier, FALLBACK_ITEM, FALLBACK_MIN_LEVEL, GOLD_PER_LEVEL, GOLD_ROLL,
    TIER_ROLL, ZONE_ROLL,
};
use oakhaven_domain::catalog::{item_template, Zone};
use oakhaven_domain::{LootEntry, Monster};

use super::context::RulesContext;

/// Roll a fresh loot list for a monster of `level` killed on level `z`.
///
/// Gold always drops. The global tier roll and the zone's d100 table can each
/// add one item; a kill of level 3 or more that produced no item falls back to
/// a healing potion.
pub fn roll_loot(level: u32, z: i32, rules: &RulesContext) -> Vec<LootEntry> {
    let mut loot = Vec::new();

    let gold = rules.roll(GOLD_ROLL).max(0) as u32 + level * GOLD_PER_LEVEL;
    loot.push(LootEntry::gold(gold));

    let tier_roll = rules.roll(TIER_ROLL) + (level / 3) as i32;
    if let Some(tier) = LootTier::for_roll(tier_roll) {
        if let Some(template) = rules.pick(tier.items()).and_then(|key| item_template(key)) {
            loot.push(LootEntry::item(template.instantiate()));
        }
    }

    let zone = Zone::from_level(z);
    if zone.is_elemental() {
        let roll = rules.roll(ZONE_ROLL);
        if let Some(template) = zone_drop_for_roll(zone, roll).and_then(item_template) {
            loot.push(LootEntry::item(template.instantiate()));
        }
    }

    let has_item = loot.iter().any(|entry| !entry.is_gold());
    if !has_item && level >= FALLBACK_MIN_LEVEL {
        if let Some(template) = item_template(FALLBACK_ITEM) {
            loot.push(LootEntry::item(template.instantiate()));
        }
    }

    loot
}

/// Generate a monster's loot the first time it is asked for.
///
/// Returns false when loot was already generated.
pub fn ensure_loot(monster: &mut Monster, rules: &RulesContext) -> bool {
    if monster.loot_generated {
        return false;
    }
    monster.loot = roll_loot(monster.level, monster.position.z, rules);
    monster.loot_generated = true;
    tracing::debug!(
        monster_id = %monster.id,
        entries = monster.loot.len(),
        "loot generated"
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::context::test_support::scripted;
    use oakhaven_domain::{LootKind, Position};

    fn gold_of(loot: &[LootEntry]) -> u32 {
        loot.iter()
            .filter_map(|e| match &e.kind {
                LootKind::Gold { amount } => Some(*amount),
                _ => None,
            })
            .sum()
    }

    fn item_names(loot: &[LootEntry]) -> Vec<String> {
        loot.iter()
            .filter(|e| !e.is_gold())
            .map(|e| e.name.clone())
            .collect()
    }

    #[test]
    fn low_roll_drops_only_gold() {
        // gold d10 = 4, tier d20 = 3
        let rules = scripted([4, 3], 1);
        let loot = roll_loot(1, 0, &rules);
        assert_eq!(gold_of(&loot), 4 + 3);
        assert!(item_names(&loot).is_empty());
    }

    #[test]
    fn rare_tier_picks_from_rare_list() {
        // gold 10, tier 20 (+0), pick index 0 => greatsword
        let rules = scripted([10, 20, 0], 1);
        let loot = roll_loot(2, 0, &rules);
        assert_eq!(gold_of(&loot), 10 + 6);
        assert_eq!(item_names(&loot), vec!["Greatsword".to_string()]);
    }

    #[test]
    fn level_bonus_lifts_tier() {
        // tier roll 9 + 6/3 = 11 => common; pick index 1 => dagger
        let rules = scripted([1, 9, 1], 1);
        let loot = roll_loot(6, 0, &rules);
        assert_eq!(item_names(&loot), vec!["Steel Dagger".to_string()]);
    }

    #[test]
    fn zone_table_layers_on_top() {
        // Fire dungeon: gold 1, tier 2 (none), d100 = 3 => phoenix shield
        let rules = scripted([1, 2, 3], 1);
        let loot = roll_loot(1, 3, &rules);
        assert_eq!(item_names(&loot), vec!["Phoenix Down Shield".to_string()]);
    }

    #[test]
    fn high_level_kill_without_items_gets_a_potion() {
        // gold 1, tier 2 + 1 => none; dungeon has no zone table
        let rules = scripted([1, 2], 1);
        let loot = roll_loot(3, 0, &rules);
        assert_eq!(item_names(&loot), vec!["Healing Potion".to_string()]);
    }

    #[test]
    fn loot_is_generated_once() {
        let rules = scripted([5, 1], 1);
        let mut rat = Monster::new("Rat", "giant_rat", 1, 5, 10, Position::new(0, 0, 0));
        assert!(ensure_loot(&mut rat, &rules));
        let first = rat.loot.clone();
        assert!(!ensure_loot(&mut rat, &rules));
        assert_eq!(rat.loot, first);
    }
}
