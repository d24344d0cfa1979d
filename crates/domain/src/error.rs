//! Domain error type.
//!
//! Entity methods and value-object parsers return `DomainError`; engine use
//! cases wrap it with `#[from]` and decide whether the player sees it.

use thiserror::Error;

use crate::value_objects::DiceParseError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input that can never be valid, such as equipping a potion.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A game rule refuses the request in the current state.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Monster and equipment state machines reject the transition.
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }
}

impl From<DiceParseError> for DomainError {
    fn from(err: DiceParseError) -> Self {
        Self::Parse(err.to_string())
    }
}
