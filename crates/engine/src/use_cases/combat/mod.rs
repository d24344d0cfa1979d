//! Combat use cases.
//!
//! A fight runs entirely inside one loaded scene:
//! 1. `StartCombat` rolls initiative and lets monsters act if they won it
//! 2. `TakeCombatAction` resolves one player action (ending the turn runs the AI)
//! 3. `CombatStatus` reports the fight and un-sticks interrupted AI passes
//! 4. `EndCombat` closes a fight from outside (zone exits, resets)
//!
//! Every call commits its scene in one change set, so a failed commit never
//! leaves a spent action without its effect.

use std::sync::Arc;

use serde::Serialize;

use oakhaven_domain::{GameEvent, MonsterId, PlayerId};

use crate::use_cases::context::RulesContext;
use crate::use_cases::error_events;
use crate::use_cases::scene::SceneStore;

mod action;
mod ai;
mod error;
mod fight;
mod outcome;
pub mod rules;
mod start;
mod status;

pub use action::PlayerAction;
pub use error::CombatError;
pub use fight::Fight;
pub use status::{CombatSnapshot, CombatStatus};

#[cfg(test)]
pub(crate) use fight::test_support;

/// Result of a combat request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CombatResponse {
    pub events: Vec<GameEvent>,
    pub in_combat: bool,
}

/// Container for combat use cases.
pub struct CombatUseCases {
    pub start: Arc<StartCombat>,
    pub act: Arc<TakeCombatAction>,
    pub status: Arc<CombatStatus>,
    pub end: Arc<EndCombat>,
}

impl CombatUseCases {
    pub fn new(scenes: SceneStore, rules: RulesContext) -> Self {
        Self {
            start: Arc::new(StartCombat::new(scenes.clone(), rules.clone())),
            act: Arc::new(TakeCombatAction::new(scenes.clone(), rules.clone())),
            status: Arc::new(CombatStatus::new(scenes.clone(), rules.clone())),
            end: Arc::new(EndCombat::new(scenes, rules)),
        }
    }

    /// Start a fight, reporting failures as events.
    pub async fn start_combat(&self, player_id: PlayerId, target: MonsterId) -> CombatResponse {
        match self.start.execute(player_id, target).await {
            Ok(response) => response,
            Err(e) => CombatResponse {
                events: error_events("start_combat", &e),
                in_combat: self.status.is_active(player_id).await.unwrap_or(false),
            },
        }
    }

    /// Resolve a player action, reporting failures as events.
    pub async fn player_action(&self, player_id: PlayerId, action: PlayerAction) -> CombatResponse {
        match self.act.execute(player_id, action).await {
            Ok(response) => response,
            Err(e) => CombatResponse {
                events: error_events("player_action", &e),
                in_combat: self.status.is_active(player_id).await.unwrap_or(false),
            },
        }
    }
}

pub struct StartCombat {
    scenes: SceneStore,
    rules: RulesContext,
}

impl StartCombat {
    pub fn new(scenes: SceneStore, rules: RulesContext) -> Self {
        Self { scenes, rules }
    }

    pub async fn execute(
        &self,
        player_id: PlayerId,
        target: MonsterId,
    ) -> Result<CombatResponse, CombatError> {
        let _guard = self.scenes.lock(player_id).await;
        let mut scene = self
            .scenes
            .load(player_id)
            .await?
            .ok_or(CombatError::PlayerNotFound)?;

        let mut fight = Fight::new(&mut scene, &self.rules);
        fight.begin(target)?;
        let events = fight.into_events();
        let in_combat = scene.in_combat();
        self.scenes.commit(scene).await?;

        Ok(CombatResponse { events, in_combat })
    }
}

pub struct TakeCombatAction {
    scenes: SceneStore,
    rules: RulesContext,
}

impl TakeCombatAction {
    pub fn new(scenes: SceneStore, rules: RulesContext) -> Self {
        Self { scenes, rules }
    }

    pub async fn execute(
        &self,
        player_id: PlayerId,
        action: PlayerAction,
    ) -> Result<CombatResponse, CombatError> {
        let _guard = self.scenes.lock(player_id).await;
        let mut scene = self
            .scenes
            .load(player_id)
            .await?
            .ok_or(CombatError::PlayerNotFound)?;

        let mut fight = Fight::new(&mut scene, &self.rules);
        fight.act(action)?;
        let events = fight.into_events();
        let in_combat = scene.in_combat();
        self.scenes.commit(scene).await?;

        tracing::debug!(player_id = %player_id, ?action, in_combat, "Combat action resolved");
        Ok(CombatResponse { events, in_combat })
    }
}

pub struct EndCombat {
    scenes: SceneStore,
    rules: RulesContext,
}

impl EndCombat {
    pub fn new(scenes: SceneStore, rules: RulesContext) -> Self {
        Self { scenes, rules }
    }

    /// Close the player's fight with no winner. Returns false if there was
    /// nothing to close.
    pub async fn execute(&self, player_id: PlayerId) -> Result<bool, CombatError> {
        let _guard = self.scenes.lock(player_id).await;
        let mut scene = self
            .scenes
            .load(player_id)
            .await?
            .ok_or(CombatError::PlayerNotFound)?;

        let ended = Fight::new(&mut scene, &self.rules).force_end();
        if ended {
            self.scenes.commit(scene).await?;
            tracing::info!(player_id = %player_id, "Encounter ended by force");
        }
        Ok(ended)
    }
}
