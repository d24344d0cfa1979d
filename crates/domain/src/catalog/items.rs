//! Item templates, shops and prices

use crate::entities::{EquipSlot, HealAmount, InventoryItem, ItemProperties, ItemType, Rarity};
use crate::value_objects::DiceFormula;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub item_type: ItemType,
    pub slot: Option<EquipSlot>,
    pub damage: Option<DiceFormula>,
    pub defense: i32,
    pub heal: Option<HealAmount>,
    pub effect: Option<&'static str>,
    pub icon: &'static str,
    pub light: Option<u32>,
    pub rarity: Option<Rarity>,
    pub value: u32,
    pub description: &'static str,
}

impl ItemTemplate {
    const fn base(key: &'static str, name: &'static str, item_type: ItemType) -> Self {
        Self {
            key,
            name,
            item_type,
            slot: None,
            damage: None,
            defense: 0,
            heal: None,
            effect: None,
            icon: "",
            light: None,
            rarity: None,
            value: 0,
            description: "",
        }
    }

    /// A fresh inventory item built from this template.
    pub fn instantiate(&self) -> InventoryItem {
        InventoryItem::new(
            self.key,
            self.name,
            self.item_type,
            self.slot,
            ItemProperties {
                damage: self.damage,
                defense: self.defense,
                heal: self.heal,
                effect: self.effect.map(str::to_string),
                icon: (!self.icon.is_empty()).then(|| self.icon.to_string()),
                light: self.light,
                rarity: self.rarity,
            },
        )
    }

    /// Price a merchant pays for one unit.
    pub fn sell_value(&self) -> u32 {
        (self.value / 2).max(1)
    }
}

pub static ITEM_TEMPLATES: &[ItemTemplate] = &[
    // Weapons
    ItemTemplate {
        slot: Some(EquipSlot::MainHand),
        damage: Some(DiceFormula::die(6)),
        icon: "iron_sword.png",
        value: 50,
        description: "A standard soldier's blade.",
        ..ItemTemplate::base("iron_sword", "Iron Sword", ItemType::Weapon)
    },
    ItemTemplate {
        slot: Some(EquipSlot::MainHand),
        damage: Some(DiceFormula::die(4)),
        icon: "dagger.png",
        value: 25,
        description: "Fast and light.",
        ..ItemTemplate::base("dagger", "Steel Dagger", ItemType::Weapon)
    },
    ItemTemplate {
        slot: Some(EquipSlot::MainHand),
        damage: Some(DiceFormula::fixed(2, 6, 0)),
        icon: "greatsword.png",
        value: 150,
        description: "Requires two hands, but hits hard.",
        ..ItemTemplate::base("greatsword", "Greatsword", ItemType::Weapon)
    },
    ItemTemplate {
        slot: Some(EquipSlot::MainHand),
        damage: Some(DiceFormula::fixed(2, 8, 0)),
        icon: "titanium_greatsword.png",
        rarity: Some(Rarity::Legendary),
        value: 1000,
        description: "A legendary blade forged from star metal.",
        ..ItemTemplate::base("titanium_greatsword", "Titanium Greatsword", ItemType::Weapon)
    },
    ItemTemplate {
        slot: Some(EquipSlot::MainHand),
        damage: Some(DiceFormula::fixed(1, 10, 1)),
        effect: Some("slow"),
        icon: "frost_brand.png",
        rarity: Some(Rarity::Rare),
        value: 600,
        description: "A magical sword that deals extra cold damage.",
        ..ItemTemplate::base("frost_brand", "Frost Brand", ItemType::Weapon)
    },
    // Armor
    ItemTemplate {
        slot: Some(EquipSlot::Chest),
        defense: 2,
        icon: "leather_armor.png",
        value: 40,
        description: "Standard protective gear.",
        ..ItemTemplate::base("leather_armor", "Leather Armor", ItemType::Armor)
    },
    ItemTemplate {
        slot: Some(EquipSlot::Chest),
        defense: 5,
        icon: "chainmail.png",
        value: 200,
        description: "Heavy interlocking rings.",
        ..ItemTemplate::base("chainmail", "Chainmail", ItemType::Armor)
    },
    ItemTemplate {
        slot: Some(EquipSlot::OffHand),
        defense: 3,
        effect: Some("fire_resist"),
        icon: "phoenix_shield.png",
        rarity: Some(Rarity::Rare),
        value: 450,
        description: "Grants immunity to fire when blocking.",
        ..ItemTemplate::base("phoenix_shield", "Phoenix Down Shield", ItemType::Armor)
    },
    // Consumables
    ItemTemplate {
        heal: Some(HealAmount::Dice(DiceFormula::fixed(2, 4, 2))),
        icon: "healing_potion.png",
        value: 25,
        description: "Restores health.",
        ..ItemTemplate::base("healing_potion", "Healing Potion", ItemType::Consumable)
    },
    ItemTemplate {
        heal: Some(HealAmount::Flat(50)),
        icon: "potion_of_power.png",
        rarity: Some(Rarity::Legendary),
        value: 500,
        description: "A legendary brew that grants immense strength.",
        ..ItemTemplate::base("potion_of_power", "Potion of Power", ItemType::Consumable)
    },
    ItemTemplate {
        effect: Some("freeze_lava"),
        icon: "cryo_flask.png",
        value: 150,
        description: "Freezes lava or steam to create safe passage.",
        ..ItemTemplate::base("cryo_flask", "Cryo-Flask", ItemType::Consumable)
    },
    // Materials
    ItemTemplate {
        icon: "rock.png",
        value: 4,
        description: "Raw iron mined from a rock.",
        ..ItemTemplate::base("iron_ore", "Iron Ore", ItemType::Material)
    },
    ItemTemplate {
        icon: "herb.png",
        value: 4,
        description: "A fragrant herb needed by the alchemist.",
        ..ItemTemplate::base("mystic_herb", "Mystic Herb", ItemType::Material)
    },
    ItemTemplate {
        icon: "iron_ingot.png",
        value: 20,
        description: "A bar of smelted iron.",
        ..ItemTemplate::base("iron_ingot", "Iron Ingot", ItemType::Material)
    },
    ItemTemplate {
        icon: "bone.png",
        value: 2,
        description: "Brittle and yellowed.",
        ..ItemTemplate::base("bone", "Bone", ItemType::Material)
    },
    ItemTemplate {
        icon: "item_core.png",
        value: 300,
        description: "The pulsating heart of a molten creature.",
        ..ItemTemplate::base("item_core", "Igneous Core", ItemType::Material)
    },
    ItemTemplate {
        icon: "item_frost_shard.png",
        value: 300,
        description: "A shard of eternal ice.",
        ..ItemTemplate::base("item_frost_shard", "Glacial Shard", ItemType::Material)
    },
    ItemTemplate {
        icon: "storm_feather.png",
        value: 250,
        description: "It hums when the wind picks up.",
        ..ItemTemplate::base("storm_feather", "Storm Feather", ItemType::Material)
    },
    // Quest items
    ItemTemplate {
        icon: "titanium_fragment.png",
        value: 200,
        description: "An incredibly hard metal shard.",
        ..ItemTemplate::base("titanium_fragment", "Titanium Fragment", ItemType::Quest)
    },
    ItemTemplate {
        icon: "everburning_cinder.png",
        value: 150,
        description: "It feels warm to the touch.",
        ..ItemTemplate::base("everburning_cinder", "Everburning Cinder", ItemType::Quest)
    },
    ItemTemplate {
        icon: "freezing_spike.png",
        value: 150,
        description: "It never melts.",
        ..ItemTemplate::base("freezing_spike", "Freezing Spike", ItemType::Quest)
    },
    ItemTemplate {
        icon: "charred_ledger.png",
        description: "A burnt book detailing the experiments of the Magma Weaver.",
        ..ItemTemplate::base("charred_ledger", "Charred Ledger", ItemType::Quest)
    },
    // Misc
    ItemTemplate {
        slot: Some(EquipSlot::OffHand),
        icon: "torch.png",
        light: Some(6),
        value: 5,
        description: "Provides light in dark places.",
        ..ItemTemplate::base("torch", "Torch", ItemType::Misc)
    },
];

/// Merchant inventories keyed by NPC name.
pub static SHOPS: &[(&str, &[&str])] = &[
    (
        "Gareth Ironhand",
        &["iron_sword", "dagger", "greatsword", "leather_armor", "chainmail", "torch"],
    ),
    ("Elara", &["healing_potion"]),
    ("Seraphina", &["healing_potion"]),
];

pub fn item_template(key: &str) -> Option<&'static ItemTemplate> {
    ITEM_TEMPLATES.iter().find(|t| t.key == key)
}

pub fn item_template_by_name(name: &str) -> Option<&'static ItemTemplate> {
    ITEM_TEMPLATES.iter().find(|t| t.name == name)
}

/// Look up by key first, then by display name.
pub fn find_item_template(key_or_name: &str) -> Option<&'static ItemTemplate> {
    item_template(key_or_name).or_else(|| item_template_by_name(key_or_name))
}

pub fn shop_stock(merchant: &str) -> Option<&'static [&'static str]> {
    SHOPS
        .iter()
        .find(|(name, _)| *name == merchant)
        .map(|(_, stock)| *stock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shop_item_has_a_template() {
        for (_, stock) in SHOPS {
            for key in *stock {
                assert!(item_template(key).is_some(), "missing template {}", key);
            }
        }
    }

    #[test]
    fn instantiate_copies_properties() {
        let sword = item_template("iron_sword").unwrap().instantiate();
        assert_eq!(sword.name, "Iron Sword");
        assert_eq!(sword.slot, Some(EquipSlot::MainHand));
        assert_eq!(sword.properties.damage, Some(DiceFormula::die(6)));
        assert_eq!(sword.properties.icon.as_deref(), Some("iron_sword.png"));
        assert_eq!(sword.quantity, 1);
        assert!(!sword.is_equipped);
    }

    #[test]
    fn lookup_by_name_or_key() {
        assert_eq!(find_item_template("Healing Potion").unwrap().key, "healing_potion");
        assert_eq!(find_item_template("chainmail").unwrap().name, "Chainmail");
        assert!(find_item_template("Excalibur").is_none());
        assert_eq!(item_template("dagger").unwrap().sell_value(), 12);
        assert_eq!(item_template("charred_ledger").unwrap().sell_value(), 1);
    }

    #[test]
    fn keys_are_unique() {
        for (i, a) in ITEM_TEMPLATES.iter().enumerate() {
            assert!(ITEM_TEMPLATES[i + 1..].iter().all(|b| b.key != a.key));
        }
    }
}
