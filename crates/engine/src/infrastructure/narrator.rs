//! Narration over Ollama's OpenAI-compatible API.
//!
//! Narration is decoration. Game state is committed before any prompt is
//! sent, and every failure mode collapses into [`FALLBACK_NARRATION`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{NarrationError, NarratorPort};
use crate::infrastructure::settings::EngineSettings;

pub const FALLBACK_NARRATION: &str = "The shadows are too deep to see clearly.";

const SYSTEM_PROMPT: &str = "You are the narrator of a grim fantasy dungeon crawl. \
Describe the scene in two short sentences. Never invent items, damage or outcomes.";

#[derive(Clone)]
pub struct OllamaNarrator {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaNarrator {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(
            &settings.narration_url,
            &settings.narration_model,
            Duration::from_millis(settings.narration_timeout_ms),
        )
    }
}

#[async_trait]
impl NarratorPort for OllamaNarrator {
    async fn narrate(&self, prompt: &str) -> Result<String, NarrationError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.8,
            max_tokens: 120,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NarrationError::Timeout
                } else {
                    NarrationError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| NarrationError::RequestFailed(e.to_string()))?;
            return Err(NarrationError::RequestFailed(format!("{status}: {body}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| NarrationError::InvalidResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| NarrationError::InvalidResponse("No choices in response".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Best-effort narration with a hard deadline.
#[derive(Clone)]
pub struct Narration {
    narrator: Option<Arc<dyn NarratorPort>>,
    timeout: Duration,
}

impl Narration {
    pub fn new(narrator: Arc<dyn NarratorPort>, timeout: Duration) -> Self {
        Self {
            narrator: Some(narrator),
            timeout,
        }
    }

    /// Narration switched off: every call returns the fallback immediately.
    pub fn disabled() -> Self {
        Self {
            narrator: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        if settings.narration_enabled {
            Self::new(
                Arc::new(OllamaNarrator::from_settings(settings)),
                Duration::from_millis(settings.narration_timeout_ms),
            )
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.narrator.is_some()
    }

    /// Describe what just happened. Never fails.
    pub async fn describe(&self, prompt: &str) -> String {
        let Some(narrator) = &self.narrator else {
            return FALLBACK_NARRATION.to_string();
        };

        match tokio::time::timeout(self.timeout, narrator.narrate(prompt)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "narration failed, using fallback");
                FALLBACK_NARRATION.to_string()
            }
            Err(_) => {
                tracing::debug!(timeout_ms = self.timeout.as_millis() as u64, "narration timed out");
                FALLBACK_NARRATION.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockNarratorPort;

    #[tokio::test]
    async fn passes_through_successful_narration() {
        let mut narrator = MockNarratorPort::new();
        narrator
            .expect_narrate()
            .returning(|_| Ok("Bones rattle in the dark.".to_string()));
        let narration = Narration::new(Arc::new(narrator), Duration::from_millis(100));

        assert_eq!(narration.describe("a skeleton").await, "Bones rattle in the dark.");
    }

    #[tokio::test]
    async fn errors_become_fallback() {
        let mut narrator = MockNarratorPort::new();
        narrator
            .expect_narrate()
            .returning(|_| Err(NarrationError::RequestFailed("connection refused".into())));
        let narration = Narration::new(Arc::new(narrator), Duration::from_millis(100));

        assert_eq!(narration.describe("anything").await, FALLBACK_NARRATION);
    }

    struct SlowNarrator;

    #[async_trait]
    impl NarratorPort for SlowNarrator {
        async fn narrate(&self, _prompt: &str) -> Result<String, NarrationError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".into())
        }
    }

    #[tokio::test]
    async fn timeouts_become_fallback() {
        let narration = Narration::new(Arc::new(SlowNarrator), Duration::from_millis(10));
        assert_eq!(narration.describe("anything").await, FALLBACK_NARRATION);
    }

    #[tokio::test]
    async fn disabled_never_calls_out() {
        let narration = Narration::disabled();
        assert!(!narration.is_enabled());
        assert_eq!(narration.describe("anything").await, FALLBACK_NARRATION);
    }
}
