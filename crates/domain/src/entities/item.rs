//! Inventory items
//!
//! Items are concrete instances owned by a player (or sitting in a loot list).
//! Static definitions live in `catalog::items`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::ids::ItemId;
use crate::value_objects::DiceFormula;

/// Maximum quantity in one stack of a stackable item.
pub const MAX_STACK: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
    Material,
    Quest,
    Misc,
}

impl ItemType {
    pub fn is_stackable(&self) -> bool {
        matches!(self, Self::Consumable | Self::Material)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Consumable => "consumable",
            Self::Material => "material",
            Self::Quest => "quest",
            Self::Misc => "misc",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    MainHand,
    OffHand,
    Chest,
    Head,
}

impl fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MainHand => "main_hand",
            Self::OffHand => "off_hand",
            Self::Chest => "chest",
            Self::Head => "head",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for EquipSlot {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main_hand" => Ok(Self::MainHand),
            "off_hand" => Ok(Self::OffHand),
            "chest" => Ok(Self::Chest),
            "head" => Ok(Self::Head),
            _ => Err(DomainError::parse(format!("Unknown equip slot: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// Healing provided by a consumable: a flat amount or a dice roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HealAmount {
    Flat(i32),
    Dice(DiceFormula),
}

impl HealAmount {
    pub fn resolve(&self, rng: impl FnMut(i32, i32) -> i32) -> i32 {
        match self {
            Self::Flat(amount) => *amount,
            Self::Dice(formula) => formula.roll_total(rng),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<DiceFormula>,
    #[serde(default)]
    pub defense: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heal: Option<HealAmount>,
    /// Special effect keyword, e.g. `fire_resist`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    /// Catalog key this item was created from.
    pub template: String,
    pub name: String,
    pub item_type: ItemType,
    pub slot: Option<EquipSlot>,
    pub is_equipped: bool,
    pub quantity: u32,
    pub properties: ItemProperties,
}

impl InventoryItem {
    pub fn new(
        template: impl Into<String>,
        name: impl Into<String>,
        item_type: ItemType,
        slot: Option<EquipSlot>,
        properties: ItemProperties,
    ) -> Self {
        Self {
            id: ItemId::new(),
            template: template.into(),
            name: name.into(),
            item_type,
            slot,
            is_equipped: false,
            quantity: 1,
            properties,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn is_stackable(&self) -> bool {
        self.item_type.is_stackable()
    }

    /// Whether `other` could merge into this stack.
    pub fn stacks_with(&self, other: &InventoryItem) -> bool {
        self.is_stackable() && self.name == other.name && !self.is_equipped
    }

    pub fn has_effect(&self, effect: &str) -> bool {
        self.properties.effect.as_deref() == Some(effect)
    }

    pub fn is_healing(&self) -> bool {
        self.item_type == ItemType::Consumable && self.properties.heal.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_consumables_and_materials_stack() {
        assert!(ItemType::Consumable.is_stackable());
        assert!(ItemType::Material.is_stackable());
        assert!(!ItemType::Weapon.is_stackable());
        assert!(!ItemType::Quest.is_stackable());
    }

    #[test]
    fn heal_amount_deserializes_flat_or_dice() {
        let flat: HealAmount = serde_json::from_str("5").unwrap();
        assert_eq!(flat, HealAmount::Flat(5));
        let dice: HealAmount = serde_json::from_str("\"2d4+2\"").unwrap();
        assert_eq!(dice.resolve(|_, max| max), 10);
    }

    #[test]
    fn slot_parse_roundtrip() {
        assert_eq!("off_hand".parse::<EquipSlot>().unwrap(), EquipSlot::OffHand);
        assert_eq!(EquipSlot::MainHand.to_string(), "main_hand");
        assert!("feet".parse::<EquipSlot>().is_err());
    }
}
