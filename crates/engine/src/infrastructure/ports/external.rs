//! External service port traits.

use async_trait::async_trait;

use super::error::NarrationError;

/// Generates flavour text for events that already happened.
///
/// Callers never let narration decide game state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NarratorPort: Send + Sync {
    async fn narrate(&self, prompt: &str) -> Result<String, NarrationError>;
}
