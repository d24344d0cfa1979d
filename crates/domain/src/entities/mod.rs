//! Domain entities - Core game objects with identity

mod encounter;
mod item;
mod loot;
mod map_tile;
mod monster;
mod npc;
mod player;
mod world_object;

pub use encounter::{
    BudgetError, CombatEncounter, Combatant, CombatantRef, TurnBudget, TurnPhase,
    DEFAULT_MOVES_PER_TURN,
};
pub use item::{
    EquipSlot, HealAmount, InventoryItem, ItemProperties, ItemType, Rarity, MAX_STACK,
};
pub use loot::{take_entry, LootEntry, LootKind};
pub use map_tile::{MapTile, ResourceNode, TileMetadata, TileType};
pub use monster::{DamageOutcome, Monster, MonsterState, XP_PER_MAX_HP};
pub use npc::{Npc, NpcQuestState, NpcStatus};
pub use player::{
    next_level_xp, next_skill_level_xp, LevelUp, Player, PlayerStatus, QuestLog, QuestProgress,
    SkillProgress, BASE_ARMOR_CLASS, HP_PER_LEVEL, UNARMED_DAMAGE,
};
pub use world_object::{WorldObject, WorldObjectKind, WorldObjectState};
