//! Quest definitions

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Kill `count` monsters named `target`.
    KillBoss { target: &'static str, count: u32 },
    /// Hand in `count` items named `target`.
    Item { target: &'static str, count: u32 },
}

impl Objective {
    pub fn target(&self) -> &'static str {
        match self {
            Self::KillBoss { target, .. } | Self::Item { target, .. } => target,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            Self::KillBoss { count, .. } | Self::Item { count, .. } => *count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestRewards {
    pub gold: u32,
    pub xp: u32,
    pub items: &'static [&'static str],
    pub special: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub giver: &'static str,
    pub description: &'static str,
    pub objectives: &'static [Objective],
    pub min_level: Option<u32>,
    pub max_level: Option<u32>,
    pub repeatable: bool,
    pub rewards: QuestRewards,
}

pub static QUESTS: &[QuestDefinition] = &[
    QuestDefinition {
        id: "elemental_balance",
        title: "Elemental Balance",
        giver: "Elder Aethelgard",
        description: "The North Forest is blocked. Clear the four elemental dungeons to open trade routes.",
        objectives: &[
            Objective::KillBoss { target: "Fire Guardian", count: 1 },
            Objective::KillBoss { target: "Ice Guardian", count: 1 },
            Objective::KillBoss { target: "Earth Guardian", count: 1 },
            Objective::KillBoss { target: "Air Guardian", count: 1 },
        ],
        min_level: Some(3),
        max_level: None,
        repeatable: false,
        rewards: QuestRewards {
            gold: 0,
            xp: 1000,
            items: &[],
            special: Some("tax_free_house_plot"),
        },
    },
    QuestDefinition {
        id: "iron_supply",
        title: "Iron Supply",
        giver: "Gareth Ironhand",
        description: "Gareth needs raw Iron Ore to restock the smithy.",
        objectives: &[Objective::Item { target: "Iron Ore", count: 1 }],
        min_level: None,
        max_level: None,
        repeatable: true,
        rewards: QuestRewards {
            gold: 50,
            xp: 20,
            items: &[],
            special: None,
        },
    },
    QuestDefinition {
        id: "titanium_hunt",
        title: "The Legendary Metal",
        giver: "Gareth Ironhand",
        description: "Find a Titanium Fragment in the Earth Dungeon.",
        objectives: &[Objective::Item { target: "Titanium Fragment", count: 1 }],
        min_level: None,
        max_level: None,
        repeatable: false,
        rewards: QuestRewards {
            gold: 500,
            xp: 200,
            items: &["titanium_greatsword"],
            special: None,
        },
    },
    QuestDefinition {
        id: "herbal_remedy",
        title: "Herbal Remedy",
        giver: "Elara",
        description: "Collect Mystic Herbs for Elara's potions.",
        objectives: &[Objective::Item { target: "Mystic Herb", count: 1 }],
        min_level: None,
        max_level: None,
        repeatable: true,
        rewards: QuestRewards {
            gold: 30,
            xp: 10,
            items: &[],
            special: None,
        },
    },
    QuestDefinition {
        id: "elemental_reagents",
        title: "Fire and Ice",
        giver: "Elara",
        description: "Retrieve an Everburning Cinder and a Freezing Spike for a master potion.",
        objectives: &[
            Objective::Item { target: "Everburning Cinder", count: 1 },
            Objective::Item { target: "Freezing Spike", count: 1 },
        ],
        min_level: None,
        max_level: None,
        repeatable: false,
        rewards: QuestRewards {
            gold: 0,
            xp: 150,
            items: &["potion_of_power"],
            special: None,
        },
    },
    QuestDefinition {
        id: "rat_catcher",
        title: "Rat Catcher",
        giver: "Elder Aethelgard",
        description: "Giant rats are gnawing at the granary. Thin them out.",
        objectives: &[Objective::KillBoss { target: "Giant Rat", count: 3 }],
        min_level: None,
        max_level: Some(3),
        repeatable: false,
        rewards: QuestRewards {
            gold: 25,
            xp: 60,
            items: &["healing_potion"],
            special: None,
        },
    },
];

pub fn quest(id: &str) -> Option<&'static QuestDefinition> {
    QUESTS.iter().find(|q| q.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::items::find_item_template;

    #[test]
    fn reward_items_exist() {
        for q in QUESTS {
            for item in q.rewards.items {
                assert!(find_item_template(item).is_some(), "{} rewards unknown {}", q.id, item);
            }
        }
    }

    #[test]
    fn objectives_expose_target_and_count() {
        let q = quest("rat_catcher").unwrap();
        assert_eq!(q.objectives[0].target(), "Giant Rat");
        assert_eq!(q.objectives[0].count(), 3);
        assert!(quest("nope").is_none());
    }
}
