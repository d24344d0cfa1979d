//! Read access to the current fight, with deadlock recovery.

use serde::Serialize;

use oakhaven_domain::{CombatEncounter, GameEvent, Monster, Player, PlayerId};

use crate::use_cases::context::RulesContext;
use crate::use_cases::scene::SceneStore;

use super::error::CombatError;
use super::fight::Fight;

/// What the UI needs to draw a fight.
#[derive(Debug, Clone, Serialize)]
pub struct CombatSnapshot {
    pub encounter: Option<CombatEncounter>,
    pub player: Player,
    /// Encounter members, dead ones included.
    pub monsters: Vec<Monster>,
    /// Events produced while recovering a stuck encounter.
    pub events: Vec<GameEvent>,
    pub recovered: bool,
}

pub struct CombatStatus {
    scenes: SceneStore,
    rules: RulesContext,
}

impl CombatStatus {
    pub fn new(scenes: SceneStore, rules: RulesContext) -> Self {
        Self { scenes, rules }
    }

    /// Whether the player is in a fight, after any stuck-turn recovery.
    pub async fn is_active(&self, player_id: PlayerId) -> Result<bool, CombatError> {
        self.snapshot(player_id)
            .await
            .map(|snapshot| snapshot.encounter.is_some())
    }

    /// Current fight state.
    ///
    /// An active encounter parked on a non-player turn can only come from an
    /// interrupted AI pass. It is played forward to the player's turn and
    /// committed before the snapshot is taken.
    pub async fn snapshot(&self, player_id: PlayerId) -> Result<CombatSnapshot, CombatError> {
        let _guard = self.scenes.lock(player_id).await;
        let mut scene = self
            .scenes
            .load(player_id)
            .await?
            .ok_or(CombatError::PlayerNotFound)?;

        let stuck = scene
            .active_encounter()
            .is_some_and(|e| !e.is_players_turn());
        let mut events = Vec::new();
        if stuck {
            tracing::warn!(
                player_id = %player_id,
                "Encounter stuck on a non-player turn, resuming AI"
            );
            let mut fight = Fight::new(&mut scene, &self.rules);
            fight.run_ai_queue();
            events = fight.into_events();
        }

        let encounter = scene.active_encounter().cloned();
        let monsters = match &encounter {
            Some(e) => e
                .monster_ids()
                .filter_map(|id| scene.monster(id).cloned())
                .collect(),
            None => Vec::new(),
        };
        let player = scene.player.clone();

        if stuck {
            self.scenes.commit(scene).await?;
        }

        Ok(CombatSnapshot {
            encounter,
            player,
            monsters,
            events,
            recovered: stuck,
        })
    }
}
