//! Monster archetypes and their special capabilities
//!
//! Behaviour is keyed off the archetype id stored on each monster instead of
//! sniffing display names. The combat engine asks `abilities_of(archetype)`
//! and reacts to each capability it finds.

use crate::entities::Monster;
use crate::value_objects::{AbilityScores, DiceFormula, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterAbility {
    /// Bursts on death, damaging the player if within `radius` tiles.
    ExplodesOnDeath { damage: DiceFormula, radius: i32 },
    /// Incoming damage is halved (rounded down, minimum 1).
    HighDefense,
    /// Melee attackers are burned unless an equipped item carries `negated_by`.
    AuraBurn {
        damage: DiceFormula,
        negated_by: &'static str,
    },
    /// Out of melee but within `range`, may web the player instead of moving.
    RangedWeb {
        chance_percent: i32,
        range: i32,
        damage: DiceFormula,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Archetype {
    pub key: &'static str,
    pub name: &'static str,
    pub level: u32,
    pub hp: i32,
    pub armor_class: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub damage: DiceFormula,
    pub abilities: &'static [MonsterAbility],
}

impl Archetype {
    /// Spawn a fresh monster of this archetype.
    pub fn spawn(&self, position: Position) -> Monster {
        Monster::new(
            self.name,
            self.key,
            self.level,
            self.hp,
            self.armor_class,
            position,
        )
        .with_abilities(AbilityScores {
            strength: self.strength,
            dexterity: self.dexterity,
            ..AbilityScores::default()
        })
        .with_damage(self.damage)
    }
}

const FIRE_BURN: MonsterAbility = MonsterAbility::AuraBurn {
    damage: DiceFormula::die(4),
    negated_by: "fire_resist",
};

pub static ARCHETYPES: &[Archetype] = &[
    Archetype {
        key: "skeleton",
        name: "Skeleton",
        level: 1,
        hp: 10,
        armor_class: 10,
        strength: 10,
        dexterity: 12,
        damage: DiceFormula::die(6),
        abilities: &[],
    },
    Archetype {
        key: "skeleton_warrior",
        name: "Skeleton Warrior",
        level: 3,
        hp: 20,
        armor_class: 14,
        strength: 14,
        dexterity: 10,
        damage: DiceFormula::die(8),
        abilities: &[],
    },
    Archetype {
        key: "giant_rat",
        name: "Giant Rat",
        level: 1,
        hp: 6,
        armor_class: 11,
        strength: 8,
        dexterity: 14,
        damage: DiceFormula::die(4),
        abilities: &[],
    },
    Archetype {
        key: "magma_slime",
        name: "Magma Slime",
        level: 4,
        hp: 18,
        armor_class: 11,
        strength: 12,
        dexterity: 8,
        damage: DiceFormula::die(6),
        abilities: &[
            MonsterAbility::ExplodesOnDeath {
                damage: DiceFormula::fixed(2, 6, 0),
                radius: 2,
            },
            FIRE_BURN,
        ],
    },
    Archetype {
        key: "fire_guardian",
        name: "Fire Guardian",
        level: 6,
        hp: 60,
        armor_class: 15,
        strength: 16,
        dexterity: 12,
        damage: DiceFormula::fixed(2, 6, 0),
        abilities: &[FIRE_BURN],
    },
    Archetype {
        key: "frost_spider",
        name: "Frost Spider",
        level: 4,
        hp: 16,
        armor_class: 13,
        strength: 10,
        dexterity: 16,
        damage: DiceFormula::die(6),
        abilities: &[MonsterAbility::RangedWeb {
            chance_percent: 30,
            range: 4,
            damage: DiceFormula::die(4),
        }],
    },
    Archetype {
        key: "ice_guardian",
        name: "Ice Guardian",
        level: 6,
        hp: 60,
        armor_class: 15,
        strength: 16,
        dexterity: 10,
        damage: DiceFormula::fixed(2, 6, 0),
        abilities: &[MonsterAbility::RangedWeb {
            chance_percent: 25,
            range: 5,
            damage: DiceFormula::die(6),
        }],
    },
    Archetype {
        key: "stone_golem",
        name: "Stone Golem",
        level: 5,
        hp: 30,
        armor_class: 12,
        strength: 16,
        dexterity: 6,
        damage: DiceFormula::die(10),
        abilities: &[MonsterAbility::HighDefense],
    },
    Archetype {
        key: "earth_guardian",
        name: "Earth Guardian",
        level: 6,
        hp: 70,
        armor_class: 14,
        strength: 18,
        dexterity: 6,
        damage: DiceFormula::fixed(2, 6, 0),
        abilities: &[MonsterAbility::HighDefense],
    },
    Archetype {
        key: "air_guardian",
        name: "Air Guardian",
        level: 6,
        hp: 50,
        armor_class: 16,
        strength: 12,
        dexterity: 18,
        damage: DiceFormula::fixed(2, 6, 0),
        abilities: &[],
    },
];

pub fn archetype(key: &str) -> Option<&'static Archetype> {
    ARCHETYPES.iter().find(|a| a.key == key)
}

/// Special capabilities of an archetype; unknown archetypes have none.
pub fn abilities_of(key: &str) -> &'static [MonsterAbility] {
    archetype(key).map(|a| a.abilities).unwrap_or(&[])
}

pub fn has_high_defense(key: &str) -> bool {
    abilities_of(key).contains(&MonsterAbility::HighDefense)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_uses_archetype_stats() {
        let golem = archetype("stone_golem").unwrap().spawn(Position::new(1, 2, 5));
        assert_eq!(golem.name, "Stone Golem");
        assert_eq!(golem.archetype, "stone_golem");
        assert_eq!(golem.hp_current, 30);
        assert_eq!(golem.abilities.strength, 16);
        assert!(has_high_defense(&golem.archetype));
    }

    #[test]
    fn unknown_archetype_has_no_abilities() {
        assert!(abilities_of("dragon").is_empty());
        assert!(!has_high_defense("skeleton"));
    }

    #[test]
    fn magma_slime_explodes_and_burns() {
        let abilities = abilities_of("magma_slime");
        assert!(abilities
            .iter()
            .any(|a| matches!(a, MonsterAbility::ExplodesOnDeath { .. })));
        assert!(abilities
            .iter()
            .any(|a| matches!(a, MonsterAbility::AuraBurn { negated_by: "fire_resist", .. })));
    }
}
