//! Use cases - Player-facing game operations.
//!
//! Each module owns one area of play. Use cases lock the player's session,
//! load a [`scene::Scene`], run the synchronous rules against it and commit
//! the result as a single change set.

pub mod combat;
pub mod context;
pub mod dialogue;
pub mod interactions;
pub mod inventory;
pub mod loot;
pub mod movement;
pub mod quests;
pub mod scene;
pub mod world_sim;

pub use combat::{CombatResponse, CombatUseCases, PlayerAction};
pub use context::RulesContext;
pub use dialogue::DialogueUseCases;
pub use interactions::InteractionUseCases;
pub use inventory::InventoryUseCases;
pub use movement::MovementUseCases;
pub use quests::QuestUseCases;
pub use scene::{Scene, SceneLoader, SceneStore};

use oakhaven_domain::{GameEvent, Tone};

/// Narrative shown when something below the rules layer fails.
pub const SYSTEM_FAILURE_TEXT: &str = "The spirits are confused... (something went wrong)";

/// Splits use-case errors into player mistakes and system failures.
pub trait Rejection: std::error::Error {
    /// True when the player asked for something the rules refuse.
    fn is_rejection(&self) -> bool;
}

/// Turn a failed use case into events for the player.
///
/// Rejections are echoed back verbatim. Anything else is logged and hidden
/// behind a generic narrative line.
pub fn error_events<E: Rejection>(operation: &'static str, error: &E) -> Vec<GameEvent> {
    if error.is_rejection() {
        tracing::debug!(operation, reason = %error, "Action rejected");
        return vec![GameEvent::rejected(error.to_string())];
    }
    tracing::error!(operation, error = %error, "Use case failed");
    vec![GameEvent::narrative(SYSTEM_FAILURE_TEXT, Tone::System)]
}
