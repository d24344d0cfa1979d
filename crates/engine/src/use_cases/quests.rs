//! Quest log operations.
//!
//! The rule functions work on a `&mut Player` so combat and dialogue can call
//! them inside their own change sets. [`QuestUseCases`] wraps them for
//! standalone requests.

use std::sync::Arc;

use oakhaven_domain::catalog::{find_item_template, quest, Objective, QuestDefinition};
use oakhaven_domain::{GameEvent, LevelUp, Player, PlayerId, QuestProgress};
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{ChangeSet, PlayerRepo, RepoError, StateStore};
use crate::infrastructure::session_locks::SessionLocks;
use crate::use_cases::Rejection;

#[derive(Debug, thiserror::Error)]
pub enum QuestError {
    #[error("Player not found")]
    PlayerNotFound,
    #[error("Unknown quest: {0}")]
    UnknownQuest(String),
    #[error("You are already on that quest.")]
    AlreadyActive,
    #[error("You have already completed that quest.")]
    AlreadyCompleted,
    #[error("You must be level {0} to take this quest.")]
    LevelTooLow(u32),
    #[error("This task is beneath someone of your level (max {0}).")]
    LevelTooHigh(u32),
    #[error("You are not on that quest.")]
    NotActive,
    #[error("You have not finished that quest yet.")]
    NotReady,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl Rejection for QuestError {
    fn is_rejection(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    NotStarted,
    Active,
    ReadyToComplete,
    Completed,
}

/// One kill objective advanced by a kill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillProgress {
    pub quest_title: &'static str,
    pub target: &'static str,
    pub current: u32,
    pub needed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestCompletion {
    pub title: &'static str,
    pub gold: u32,
    pub xp: u32,
    pub items: Vec<String>,
    pub special: Option<&'static str>,
    pub level_up: LevelUp,
}

fn definition(id: &str) -> Result<&'static QuestDefinition, QuestError> {
    quest(id).ok_or_else(|| QuestError::UnknownQuest(id.to_string()))
}

pub fn status(player: &Player, quest_id: &str) -> Result<QuestStatus, QuestError> {
    definition(quest_id)?;
    if player.quest_log.active.contains_key(quest_id) {
        if can_complete(player, quest_id) {
            Ok(QuestStatus::ReadyToComplete)
        } else {
            Ok(QuestStatus::Active)
        }
    } else if player.quest_log.completed.iter().any(|q| q == quest_id) {
        Ok(QuestStatus::Completed)
    } else {
        Ok(QuestStatus::NotStarted)
    }
}

pub fn accept(player: &mut Player, quest_id: &str) -> Result<&'static QuestDefinition, QuestError> {
    let def = definition(quest_id)?;
    if player.quest_log.active.contains_key(quest_id) {
        return Err(QuestError::AlreadyActive);
    }
    if !def.repeatable && player.quest_log.completed.iter().any(|q| q == quest_id) {
        return Err(QuestError::AlreadyCompleted);
    }
    if let Some(min) = def.min_level {
        if player.level < min {
            return Err(QuestError::LevelTooLow(min));
        }
    }
    if let Some(max) = def.max_level {
        if player.level > max {
            return Err(QuestError::LevelTooHigh(max));
        }
    }
    player
        .quest_log
        .active
        .insert(quest_id.to_string(), QuestProgress::default());
    Ok(def)
}

/// Every objective met. Item counts include whole stacks.
pub fn can_complete(player: &Player, quest_id: &str) -> bool {
    let (Some(def), Some(progress)) = (quest(quest_id), player.quest_log.active.get(quest_id))
    else {
        return false;
    };
    def.objectives.iter().all(|objective| match objective {
        Objective::Item { target, count } => player.count_item(target) >= *count,
        Objective::KillBoss { target, count } => {
            progress.kills.get(*target).copied().unwrap_or(0) >= *count
        }
    })
}

/// Advance kill objectives named `monster_name`, never past their count.
///
/// Fails without touching anything if the log holds a quest id the catalog
/// does not know.
pub fn record_kill(player: &mut Player, monster_name: &str) -> Result<Vec<KillProgress>, QuestError> {
    let mut defs = Vec::with_capacity(player.quest_log.active.len());
    for id in player.quest_log.active.keys() {
        defs.push((id.clone(), definition(id)?));
    }

    let mut updates = Vec::new();
    for (id, def) in defs {
        let Some(progress) = player.quest_log.active.get_mut(&id) else {
            continue;
        };
        for objective in def.objectives {
            let Objective::KillBoss { target, count } = objective else {
                continue;
            };
            if *target != monster_name {
                continue;
            }
            let current = progress.kills.entry(target.to_string()).or_insert(0);
            if *current < *count {
                *current += 1;
                updates.push(KillProgress {
                    quest_title: def.title,
                    target: *target,
                    current: *current,
                    needed: *count,
                });
            }
        }
    }
    Ok(updates)
}

/// Hand in a finished quest: deduct items, pay out, archive.
pub fn complete(player: &mut Player, quest_id: &str) -> Result<QuestCompletion, QuestError> {
    let def = definition(quest_id)?;
    if !player.quest_log.active.contains_key(quest_id) {
        return Err(QuestError::NotActive);
    }
    if !can_complete(player, quest_id) {
        return Err(QuestError::NotReady);
    }

    for objective in def.objectives {
        if let Objective::Item { target, count } = objective {
            player.remove_item_by_name(target, *count);
        }
    }

    let rewards = def.rewards;
    player.gold += rewards.gold;
    let level_up = player.award_xp(rewards.xp);

    let mut items = Vec::new();
    for key in rewards.items {
        if let Some(template) = find_item_template(key) {
            items.push(template.name.to_string());
            player.add_item(template.instantiate());
        }
    }

    player.quest_log.active.remove(quest_id);
    if !def.repeatable {
        player.quest_log.completed.push(quest_id.to_string());
    }

    Ok(QuestCompletion {
        title: def.title,
        gold: rewards.gold,
        xp: rewards.xp,
        items,
        special: rewards.special,
        level_up,
    })
}

/// Events describing a completed quest.
pub fn completion_events(completion: &QuestCompletion) -> Vec<GameEvent> {
    let mut events = vec![GameEvent::success(format!(
        "Quest complete: {}!",
        completion.title
    ))];
    let mut rewards = Vec::new();
    if completion.gold > 0 {
        rewards.push(format!("{} gold", completion.gold));
    }
    if completion.xp > 0 {
        rewards.push(format!("{} XP", completion.xp));
    }
    rewards.extend(completion.items.iter().cloned());
    if !rewards.is_empty() {
        events.push(GameEvent::info(format!("You receive {}.", rewards.join(", "))));
    }
    if completion.level_up.leveled() {
        events.push(GameEvent::success(format!(
            "You reached level {}!",
            completion.level_up.new_level
        )));
    }
    events
}

/// Standalone quest requests.
pub struct QuestUseCases {
    players: Arc<dyn PlayerRepo>,
    store: Arc<dyn StateStore>,
    locks: Arc<SessionLocks>,
}

impl QuestUseCases {
    pub fn new(
        players: Arc<dyn PlayerRepo>,
        store: Arc<dyn StateStore>,
        locks: Arc<SessionLocks>,
    ) -> Self {
        Self {
            players,
            store,
            locks,
        }
    }

    pub async fn status(&self, player_id: PlayerId, quest_id: &str) -> Result<QuestStatus, QuestError> {
        let player = self
            .players
            .get(player_id)
            .await?
            .ok_or(QuestError::PlayerNotFound)?;
        status(&player, quest_id)
    }

    pub async fn accept(&self, player_id: PlayerId, quest_id: &str) -> Result<Vec<GameEvent>, QuestError> {
        let _guard = self.locks.acquire(player_id).await;
        let mut player = self
            .players
            .get(player_id)
            .await?
            .ok_or(QuestError::PlayerNotFound)?;

        let def = accept(&mut player, quest_id)?;
        self.store.commit(ChangeSet::new().with_player(player)).await?;

        tracing::info!(player_id = %player_id, quest_id, "quest accepted");
        Ok(vec![GameEvent::success(format!("Quest accepted: {}", def.title))])
    }

    pub async fn complete(&self, player_id: PlayerId, quest_id: &str) -> Result<Vec<GameEvent>, QuestError> {
        let _guard = self.locks.acquire(player_id).await;
        let mut player = self
            .players
            .get(player_id)
            .await?
            .ok_or(QuestError::PlayerNotFound)?;

        let completion = complete(&mut player, quest_id)?;
        self.store.commit(ChangeSet::new().with_player(player)).await?;

        tracing::info!(
            player_id = %player_id,
            quest_id,
            xp = completion.xp,
            gold = completion.gold,
            "quest completed"
        );
        Ok(completion_events(&completion))
    }
}
