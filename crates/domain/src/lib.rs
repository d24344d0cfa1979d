pub mod catalog;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod value_objects;

pub use entities::{
    next_level_xp, BudgetError, CombatEncounter, Combatant, CombatantRef, DamageOutcome,
    EquipSlot, HealAmount, InventoryItem, ItemProperties, ItemType, LevelUp, LootEntry, LootKind,
    MapTile, Monster, MonsterState, Npc, NpcQuestState, NpcStatus, Player, PlayerStatus, QuestLog,
    QuestProgress, Rarity, SkillProgress, TileMetadata, TileType, TurnBudget, TurnPhase,
    WorldObject, WorldObjectKind, WorldObjectState, DEFAULT_MOVES_PER_TURN, MAX_STACK,
};

pub use error::DomainError;
pub use events::{AnimationKind, GameEvent, PopupStyle, Tone};

pub use ids::{EncounterId, ItemId, LootId, MonsterId, NpcId, PlayerId, WorldObjectId};

pub use value_objects::{
    ability_modifier, roll, Ability, AbilityScores, DiceFormula, DiceParseError, DiceRollResult,
    Position,
};
