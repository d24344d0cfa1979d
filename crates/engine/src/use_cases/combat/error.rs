//! Combat errors.

use oakhaven_domain::{BudgetError, DomainError};

use crate::infrastructure::ports::RepoError;
use crate::use_cases::Rejection;

#[derive(Debug, thiserror::Error)]
pub enum CombatError {
    #[error("Player not found")]
    PlayerNotFound,
    #[error("Monster not found")]
    MonsterNotFound,
    #[error("Combat is already active")]
    AlreadyActive,
    #[error("You are not in combat.")]
    NotInCombat,
    #[error("It is not your turn!")]
    NotYourTurn,
    #[error("{0}")]
    Budget(#[from] BudgetError),
    #[error("No enemy in range")]
    NoEnemyInRange,
    #[error("That enemy is already dead.")]
    TargetDead,
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl CombatError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

impl Rejection for CombatError {
    fn is_rejection(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}
