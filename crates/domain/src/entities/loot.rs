//! Loot entries carried by corpses and containers

use serde::{Deserialize, Serialize};

use crate::entities::item::InventoryItem;
use crate::ids::LootId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LootKind {
    Gold { amount: u32 },
    Item { item: InventoryItem },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootEntry {
    pub id: LootId,
    pub name: String,
    pub icon: Option<String>,
    #[serde(flatten)]
    pub kind: LootKind,
}

impl LootEntry {
    pub fn gold(amount: u32) -> Self {
        Self {
            id: LootId::new(),
            name: format!("{} Gold", amount),
            icon: Some("gold.png".to_string()),
            kind: LootKind::Gold { amount },
        }
    }

    pub fn item(item: InventoryItem) -> Self {
        Self {
            id: LootId::new(),
            name: item.name.clone(),
            icon: item.properties.icon.clone(),
            kind: LootKind::Item { item },
        }
    }

    pub fn is_gold(&self) -> bool {
        matches!(self.kind, LootKind::Gold { .. })
    }
}

/// Remove one entry from a loot list by id.
pub fn take_entry(loot: &mut Vec<LootEntry>, id: LootId) -> Option<LootEntry> {
    let pos = loot.iter().position(|e| e.id == id)?;
    Some(loot.remove(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item::{ItemProperties, ItemType};

    #[test]
    fn take_entry_removes_only_that_entry() {
        let potion = InventoryItem::new(
            "healing_potion",
            "Healing Potion",
            ItemType::Consumable,
            None,
            ItemProperties::default(),
        );
        let mut loot = vec![LootEntry::gold(12), LootEntry::item(potion)];
        let gold_id = loot[0].id;

        let taken = take_entry(&mut loot, gold_id).unwrap();
        assert!(taken.is_gold());
        assert_eq!(loot.len(), 1);
        assert!(take_entry(&mut loot, gold_id).is_none());
    }

    #[test]
    fn gold_entry_serializes_with_kind_tag() {
        let json = serde_json::to_value(LootEntry::gold(7)).unwrap();
        assert_eq!(json["kind"], "gold");
        assert_eq!(json["amount"], 7);
        assert_eq!(json["name"], "7 Gold");
    }
}
