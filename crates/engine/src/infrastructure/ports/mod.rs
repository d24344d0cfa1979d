//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - State access (in-memory today, a database tomorrow)
//! - Narration (Ollama or nothing)
//! - Clock/Random (for testing)

mod change_set;
mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use change_set::ChangeSet;
pub use repos::{
    EncounterRepo, MapRepo, MonsterRepo, NpcRepo, PlayerRepo, StateStore, WorldObjectRepo,
};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::NarratorPort;

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockMonsterRepo, MockPlayerRepo, MockStateStore};

#[cfg(test)]
pub use external::MockNarratorPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{NarrationError, RepoError};
