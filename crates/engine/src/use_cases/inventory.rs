//! Inventory and economy use cases.
//!
//! Equipment, consumables, looting, crafting and trade. The rule functions
//! take the player (or scene) by `&mut` and return a message; the
//! [`InventoryUseCases`] wrappers lock, load, apply and commit.

use serde::{Deserialize, Serialize};

use oakhaven_domain::catalog::{
    find_item_template, item_template, recipe, skill_name, CRAFT_SKILL_XP,
};
use oakhaven_domain::entities::take_entry;
use oakhaven_domain::{
    Ability, GameEvent, ItemId, ItemType, LootId, LootKind, MonsterId, Player, PlayerId,
    WorldObjectId,
};

use crate::infrastructure::ports::RepoError;
use crate::use_cases::context::RulesContext;
use crate::use_cases::scene::{Scene, SceneStore};
use crate::use_cases::Rejection;

/// Looting reach, in tiles.
pub const LOOT_RANGE: i32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Player not found")]
    PlayerNotFound,
    #[error("Item not found.")]
    ItemNotFound,
    #[error("This item cannot be equipped.")]
    NotEquippable,
    #[error("Item already equipped.")]
    AlreadyEquipped,
    #[error("Item not equipped.")]
    NotEquipped,
    #[error("You cannot use this item.")]
    NotUsable,
    #[error("Use potions from the combat bar while fighting.")]
    InCombat,
    #[error("Nothing left.")]
    SourceGone,
    #[error("Item gone.")]
    LootGone,
    #[error("You are too far away.")]
    TooFar,
    #[error("Unknown recipe.")]
    UnknownRecipe,
    #[error("Skill too low. Need {skill} {level}.")]
    SkillTooLow { skill: String, level: u32 },
    #[error("Missing: {name} ({have}/{need})")]
    MissingIngredient { name: String, have: u32, need: u32 },
    #[error("Unknown item.")]
    UnknownItem,
    #[error("Not enough gold!")]
    NotEnoughGold,
    #[error("Unequip first!")]
    SellEquipped,
    #[error("You have no stat points to spend.")]
    NoStatPoints,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl Rejection for InventoryError {
    fn is_rejection(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

/// Where a piece of loot lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "id", rename_all = "snake_case")]
pub enum LootSource {
    Corpse(MonsterId),
    Object(WorldObjectId),
}

/// Outcome of taking one loot entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LootTaken {
    pub message: String,
    /// The corpse or container was emptied and removed.
    pub source_removed: bool,
    pub remaining: usize,
}

// =============================================================================
// Rules
// =============================================================================

pub fn equip(player: &mut Player, item_id: ItemId) -> Result<String, InventoryError> {
    let item = player.item(item_id).ok_or(InventoryError::ItemNotFound)?;
    if item.slot.is_none() {
        return Err(InventoryError::NotEquippable);
    }
    if item.is_equipped {
        return Err(InventoryError::AlreadyEquipped);
    }
    let equipped = player
        .equip(item_id)
        .map_err(|_| InventoryError::ItemNotFound)?;
    Ok(format!("Equipped {}.", equipped.name))
}

pub fn unequip(player: &mut Player, item_id: ItemId) -> Result<String, InventoryError> {
    let name = match player.item(item_id) {
        Some(item) if item.is_equipped => item.name.clone(),
        _ => return Err(InventoryError::NotEquipped),
    };
    player
        .unequip(item_id)
        .map_err(|_| InventoryError::NotEquipped)?;
    Ok(format!("Unequipped {}.", name))
}

/// Consume one unit of a consumable.
pub fn use_item(
    player: &mut Player,
    item_id: ItemId,
    rules: &RulesContext,
) -> Result<String, InventoryError> {
    let item = player.item(item_id).ok_or(InventoryError::ItemNotFound)?;
    if item.item_type != ItemType::Consumable {
        return Err(InventoryError::NotUsable);
    }
    let name = item.name.clone();
    let heal = item.properties.heal;

    let message = match heal {
        Some(heal) => {
            let restored = player.heal(heal.resolve(|min, max| rules.range(min, max)));
            format!("You drank the {}. Recovered {} HP.", name, restored)
        }
        None => format!("You used the {}.", name),
    };
    player.remove_item(item_id, 1);
    Ok(message)
}

/// Move one loot entry from a corpse or container into the player's hands.
///
/// Gold goes straight to the purse. A source emptied by this take is removed
/// from the world.
pub fn take_loot(
    scene: &mut Scene,
    source: LootSource,
    loot_id: LootId,
) -> Result<LootTaken, InventoryError> {
    let reach = scene.player.position;
    let (entry, remaining) = match source {
        LootSource::Corpse(id) => {
            let corpse = scene
                .monster_mut(id)
                .filter(|m| !m.is_alive)
                .ok_or(InventoryError::SourceGone)?;
            if !corpse.position.within_box(&reach, LOOT_RANGE) {
                return Err(InventoryError::TooFar);
            }
            let entry = take_entry(&mut corpse.loot, loot_id).ok_or(InventoryError::LootGone)?;
            (entry, corpse.loot.len())
        }
        LootSource::Object(id) => {
            let object = scene.object_mut(id).ok_or(InventoryError::SourceGone)?;
            if !object.position.within_box(&reach, LOOT_RANGE) {
                return Err(InventoryError::TooFar);
            }
            let entry = take_entry(&mut object.loot, loot_id).ok_or(InventoryError::LootGone)?;
            (entry, object.loot.len())
        }
    };

    let message = match entry.kind {
        LootKind::Gold { amount } => {
            scene.player.gold += amount;
            format!("Took {} gold.", amount)
        }
        LootKind::Item { item } => {
            let message = format!("Took {}.", item.name);
            scene.player.add_item(item);
            message
        }
    };

    let source_removed = remaining == 0;
    if source_removed {
        match source {
            LootSource::Corpse(id) => scene.remove_monster(id),
            LootSource::Object(id) => scene.remove_object(id),
        }
    }
    Ok(LootTaken {
        message,
        source_removed,
        remaining,
    })
}

/// Craft one item from a recipe, consuming ingredients across stacks.
pub fn craft(player: &mut Player, recipe_key: &str) -> Result<String, InventoryError> {
    let recipe = recipe(recipe_key).ok_or(InventoryError::UnknownRecipe)?;

    for (skill, level) in recipe.skill_requirements {
        if player.skill_level(skill) < *level {
            return Err(InventoryError::SkillTooLow {
                skill: skill_name(skill).to_string(),
                level: *level,
            });
        }
    }

    let mut needed = Vec::with_capacity(recipe.ingredients.len());
    for (key, quantity) in recipe.ingredients {
        let template = item_template(key).ok_or(InventoryError::UnknownItem)?;
        let have = player.count_item(template.name);
        if have < *quantity {
            return Err(InventoryError::MissingIngredient {
                name: template.name.to_string(),
                have,
                need: *quantity,
            });
        }
        needed.push((template.name, *quantity));
    }
    let result = item_template(recipe.result).ok_or(InventoryError::UnknownItem)?;

    for (name, quantity) in needed {
        player.remove_item_by_name(name, quantity);
    }
    player.add_item(result.instantiate());

    let mut message = format!("Crafted {}!", result.name);
    for (skill, _) in recipe.skill_requirements {
        if player.award_skill_xp(skill, CRAFT_SKILL_XP).is_some() {
            message.push_str(&format!(" ({} Up!)", skill_name(skill)));
        }
    }
    Ok(message)
}

pub fn buy(player: &mut Player, key: &str) -> Result<String, InventoryError> {
    let template = find_item_template(key).ok_or(InventoryError::UnknownItem)?;
    if player.gold < template.value {
        return Err(InventoryError::NotEnoughGold);
    }
    player.gold -= template.value;
    player.add_item(template.instantiate());
    Ok(format!("Bought {} for {}g.", template.name, template.value))
}

/// Sell one unit for half the template value (minimum 1).
pub fn sell(player: &mut Player, item_id: ItemId) -> Result<String, InventoryError> {
    let item = player.item(item_id).ok_or(InventoryError::ItemNotFound)?;
    if item.is_equipped {
        return Err(InventoryError::SellEquipped);
    }
    let name = item.name.clone();
    let price = find_item_template(&item.template)
        .or_else(|| find_item_template(&name))
        .map(|t| t.sell_value())
        .unwrap_or(1);

    player.gold += price;
    player.remove_item(item_id, 1);
    Ok(format!("Sold {} for {}g.", name, price))
}

/// Remove `count` items by name. True only if all of them were there.
pub fn remove_by_name(player: &mut Player, name: &str, count: u32) -> bool {
    player.remove_item_by_name(name, count) == count
}

pub fn spend_stat_point(player: &mut Player, ability: Ability) -> Result<String, InventoryError> {
    let score = player
        .spend_stat_point(ability)
        .map_err(|_| InventoryError::NoStatPoints)?;
    Ok(format!(
        "{} increased to {}.",
        ability.to_string().to_uppercase(),
        score
    ))
}

// =============================================================================
// Use cases
// =============================================================================

pub struct InventoryUseCases {
    scenes: SceneStore,
    rules: RulesContext,
}

impl InventoryUseCases {
    pub fn new(scenes: SceneStore, rules: RulesContext) -> Self {
        Self { scenes, rules }
    }

    /// Lock, load, apply `change` and commit. Rejections commit nothing.
    async fn apply<T>(
        &self,
        player_id: PlayerId,
        change: impl FnOnce(&mut Scene, &RulesContext) -> Result<T, InventoryError>,
    ) -> Result<T, InventoryError> {
        let _guard = self.scenes.lock(player_id).await;
        let mut scene = self
            .scenes
            .load(player_id)
            .await?
            .ok_or(InventoryError::PlayerNotFound)?;
        let outcome = change(&mut scene, &self.rules)?;
        self.scenes.commit(scene).await?;
        Ok(outcome)
    }

    pub async fn equip(&self, player_id: PlayerId, item_id: ItemId) -> Result<Vec<GameEvent>, InventoryError> {
        let message = self
            .apply(player_id, |scene, _| equip(&mut scene.player, item_id))
            .await?;
        Ok(vec![GameEvent::info(message)])
    }

    pub async fn unequip(&self, player_id: PlayerId, item_id: ItemId) -> Result<Vec<GameEvent>, InventoryError> {
        let message = self
            .apply(player_id, |scene, _| unequip(&mut scene.player, item_id))
            .await?;
        Ok(vec![GameEvent::info(message)])
    }

    pub async fn use_item(&self, player_id: PlayerId, item_id: ItemId) -> Result<Vec<GameEvent>, InventoryError> {
        let message = self
            .apply(player_id, |scene, rules| {
                if scene.in_combat() {
                    return Err(InventoryError::InCombat);
                }
                use_item(&mut scene.player, item_id, rules)
            })
            .await?;
        Ok(vec![GameEvent::success(message)])
    }

    pub async fn take_loot(
        &self,
        player_id: PlayerId,
        source: LootSource,
        loot_id: LootId,
    ) -> Result<LootTaken, InventoryError> {
        let taken = self
            .apply(player_id, |scene, _| take_loot(scene, source, loot_id))
            .await?;
        tracing::debug!(
            player_id = %player_id,
            ?source,
            remaining = taken.remaining,
            "Loot taken"
        );
        Ok(taken)
    }

    pub async fn craft(&self, player_id: PlayerId, recipe_key: &str) -> Result<Vec<GameEvent>, InventoryError> {
        let message = self
            .apply(player_id, |scene, _| craft(&mut scene.player, recipe_key))
            .await?;
        tracing::info!(player_id = %player_id, recipe = recipe_key, "Item crafted");
        Ok(vec![GameEvent::success(message)])
    }

    pub async fn buy(&self, player_id: PlayerId, key: &str) -> Result<Vec<GameEvent>, InventoryError> {
        let message = self
            .apply(player_id, |scene, _| buy(&mut scene.player, key))
            .await?;
        Ok(vec![GameEvent::info(message)])
    }

    pub async fn sell(&self, player_id: PlayerId, item_id: ItemId) -> Result<Vec<GameEvent>, InventoryError> {
        let message = self
            .apply(player_id, |scene, _| sell(&mut scene.player, item_id))
            .await?;
        Ok(vec![GameEvent::info(message)])
    }

    pub async fn spend_stat_point(
        &self,
        player_id: PlayerId,
        ability: Ability,
    ) -> Result<Vec<GameEvent>, InventoryError> {
        let message = self
            .apply(player_id, |scene, _| spend_stat_point(&mut scene.player, ability))
            .await?;
        Ok(vec![GameEvent::success(message)])
    }
}
