//! Static game data
//!
//! Hand-authored tables for items, monsters, loot, quests, recipes, zones and
//! dialogue. The database holds state; these hold rules.

pub mod archetypes;
pub mod crafting;
pub mod dialogue;
pub mod items;
pub mod loot_tables;
pub mod quests;
pub mod zones;

pub use archetypes::{abilities_of, archetype, has_high_defense, Archetype, MonsterAbility};
pub use crafting::{recipe, skill_name, Recipe, SkillDefinition, CRAFT_SKILL_XP, GATHER_SKILL_XP};
pub use dialogue::{script, DialogueAction, DialogueNode, DialogueOption, DialogueScript};
pub use items::{find_item_template, item_template, shop_stock, ItemTemplate};
pub use loot_tables::{zone_drop_for_roll, LootTier};
pub use quests::{quest, Objective, QuestDefinition, QuestRewards};
pub use zones::{zone_exit_at, Zone, ZoneExit, SAFE_RESPAWN};
