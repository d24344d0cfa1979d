//! Loot tables
//!
//! A kill always drops gold, then rolls a tier (`1d20 + level / 3`) against
//! the global tier lists. Elemental zones layer a separate d100 table of
//! themed drops on top.

use crate::catalog::zones::Zone;
use crate::value_objects::DiceFormula;

pub const GOLD_ROLL: DiceFormula = DiceFormula::die(10);
pub const GOLD_PER_LEVEL: u32 = 3;
pub const TIER_ROLL: DiceFormula = DiceFormula::die(20);
pub const ZONE_ROLL: DiceFormula = DiceFormula::die(100);

/// Kills at or above this level that dropped no item still drop a potion.
pub const FALLBACK_MIN_LEVEL: u32 = 3;
pub const FALLBACK_ITEM: &str = "healing_potion";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LootTier {
    Common,
    Uncommon,
    Rare,
}

impl LootTier {
    /// Tier for a modified tier roll; below 10 drops nothing.
    pub fn for_roll(total: i32) -> Option<Self> {
        match total {
            t if t >= 20 => Some(Self::Rare),
            t if t >= 15 => Some(Self::Uncommon),
            t if t >= 10 => Some(Self::Common),
            _ => None,
        }
    }

    pub fn items(&self) -> &'static [&'static str] {
        match self {
            Self::Common => &["healing_potion", "dagger", "bone", "torch"],
            Self::Uncommon => &["iron_sword", "leather_armor", "healing_potion"],
            Self::Rare => &["greatsword", "chainmail"],
        }
    }
}

/// One row of a zone table: drops `item` when the d100 roll is `<= upto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneDrop {
    pub upto: i32,
    pub item: &'static str,
}

/// Zone override rows, ascending by `upto`; the first matching row wins.
pub fn zone_drops(zone: Zone) -> &'static [ZoneDrop] {
    match zone {
        Zone::FireDungeon => &[
            ZoneDrop { upto: 5, item: "phoenix_shield" },
            ZoneDrop { upto: 20, item: "item_core" },
            ZoneDrop { upto: 35, item: "cryo_flask" },
            ZoneDrop { upto: 45, item: "everburning_cinder" },
        ],
        Zone::IceDungeon => &[
            ZoneDrop { upto: 5, item: "frost_brand" },
            ZoneDrop { upto: 25, item: "item_frost_shard" },
            ZoneDrop { upto: 40, item: "freezing_spike" },
        ],
        Zone::EarthDungeon => &[
            ZoneDrop { upto: 10, item: "titanium_fragment" },
            ZoneDrop { upto: 40, item: "iron_ore" },
        ],
        Zone::AirDungeon => &[ZoneDrop { upto: 30, item: "storm_feather" }],
        _ => &[],
    }
}

pub fn zone_drop_for_roll(zone: Zone, roll: i32) -> Option<&'static str> {
    zone_drops(zone)
        .iter()
        .find(|row| roll <= row.upto)
        .map(|row| row.item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::items::item_template;

    #[test]
    fn tier_thresholds() {
        assert_eq!(LootTier::for_roll(9), None);
        assert_eq!(LootTier::for_roll(10), Some(LootTier::Common));
        assert_eq!(LootTier::for_roll(15), Some(LootTier::Uncommon));
        assert_eq!(LootTier::for_roll(24), Some(LootTier::Rare));
    }

    #[test]
    fn zone_table_first_match_wins() {
        assert_eq!(zone_drop_for_roll(Zone::FireDungeon, 3), Some("phoenix_shield"));
        assert_eq!(zone_drop_for_roll(Zone::FireDungeon, 21), Some("cryo_flask"));
        assert_eq!(zone_drop_for_roll(Zone::FireDungeon, 46), None);
        assert_eq!(zone_drop_for_roll(Zone::Town, 1), None);
    }

    #[test]
    fn all_table_items_exist() {
        let tiers = [LootTier::Common, LootTier::Uncommon, LootTier::Rare];
        for key in tiers.iter().flat_map(|t| t.items()) {
            assert!(item_template(key).is_some(), "missing {}", key);
        }
        let zones = [
            Zone::FireDungeon,
            Zone::IceDungeon,
            Zone::EarthDungeon,
            Zone::AirDungeon,
        ];
        for row in zones.iter().flat_map(|z| zone_drops(*z)) {
            assert!(item_template(row.item).is_some(), "missing {}", row.item);
        }
        assert!(item_template(FALLBACK_ITEM).is_some());
    }
}
