//! Engine settings loaded from the environment.
//!
//! Every knob has a default; a missing variable silently uses it and an
//! unparsable one logs a warning and uses it.
//!
//! # Environment Variables
//!
//! Combat:
//! - `OAKHAVEN_AGGRO_RADIUS` - Radius that pulls nearby monsters into a fight (default: 3)
//! - `OAKHAVEN_MOVES_PER_TURN` - Player movement budget per turn (default: 6)
//! - `OAKHAVEN_AI_STEPS_PER_TURN` - Greedy steps a monster may take per turn (default: 3)
//! - `OAKHAVEN_AI_ITERATION_CAP` - Max AI turns processed per call (default: 20)
//! - `OAKHAVEN_DEFEAT_GOLD_PENALTY` - Percent of gold lost on defeat (default: 10)
//! - `OAKHAVEN_SAFE_RESPAWN` - Respawn position as `x,y,z` (default: 0,0,1)
//!
//! World:
//! - `OAKHAVEN_SCENE_RADIUS` - Radius of entities loaded around the player (default: 12)
//! - `OAKHAVEN_WORLD_AGGRO_RADIUS` - Radius at which idle monsters start hunting (default: 5)
//! - `OAKHAVEN_ROAM_CHANCE` - Percent chance an idle monster wanders (default: 15)
//!
//! Narration:
//! - `OAKHAVEN_NARRATION_ENABLED` - Ask the narrator for flavour text (default: false)
//! - `OAKHAVEN_NARRATION_URL` - Ollama base URL (default: http://localhost:11434)
//! - `OAKHAVEN_NARRATION_MODEL` - Model name (default: llama3.2)
//! - `OAKHAVEN_NARRATION_TIMEOUT_MS` - Hard timeout for one narration call (default: 4000)

use std::str::FromStr;

use oakhaven_domain::{catalog::SAFE_RESPAWN, Position};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NARRATION_URL: &str = "http://localhost:11434";
pub const DEFAULT_NARRATION_MODEL: &str = "llama3.2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub aggro_radius: i32,
    pub moves_per_turn: u32,
    pub ai_steps_per_turn: u32,
    pub ai_iteration_cap: usize,
    pub defeat_gold_penalty_percent: u32,
    pub safe_respawn: Position,
    pub scene_radius: i32,
    pub world_aggro_radius: i32,
    pub roam_chance_percent: i32,
    pub narration_enabled: bool,
    pub narration_url: String,
    pub narration_model: String,
    pub narration_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            aggro_radius: 3,
            moves_per_turn: 6,
            ai_steps_per_turn: 3,
            ai_iteration_cap: 20,
            defeat_gold_penalty_percent: 10,
            safe_respawn: SAFE_RESPAWN,
            scene_radius: 12,
            world_aggro_radius: 5,
            roam_chance_percent: 15,
            narration_enabled: false,
            narration_url: DEFAULT_NARRATION_URL.to_string(),
            narration_model: DEFAULT_NARRATION_MODEL.to_string(),
            narration_timeout_ms: 4000,
        }
    }
}

impl EngineSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            aggro_radius: parse_or(&read, "OAKHAVEN_AGGRO_RADIUS", defaults.aggro_radius),
            moves_per_turn: parse_or(&read, "OAKHAVEN_MOVES_PER_TURN", defaults.moves_per_turn),
            ai_steps_per_turn: parse_or(
                &read,
                "OAKHAVEN_AI_STEPS_PER_TURN",
                defaults.ai_steps_per_turn,
            ),
            ai_iteration_cap: parse_or(
                &read,
                "OAKHAVEN_AI_ITERATION_CAP",
                defaults.ai_iteration_cap,
            ),
            defeat_gold_penalty_percent: parse_or(
                &read,
                "OAKHAVEN_DEFEAT_GOLD_PENALTY",
                defaults.defeat_gold_penalty_percent,
            )
            .min(100),
            safe_respawn: read("OAKHAVEN_SAFE_RESPAWN")
                .map(|raw| {
                    parse_position(&raw).unwrap_or_else(|| {
                        tracing::warn!(value = %raw, "OAKHAVEN_SAFE_RESPAWN is not x,y,z; using default");
                        defaults.safe_respawn
                    })
                })
                .unwrap_or(defaults.safe_respawn),
            scene_radius: parse_or(&read, "OAKHAVEN_SCENE_RADIUS", defaults.scene_radius),
            world_aggro_radius: parse_or(
                &read,
                "OAKHAVEN_WORLD_AGGRO_RADIUS",
                defaults.world_aggro_radius,
            ),
            roam_chance_percent: parse_or(&read, "OAKHAVEN_ROAM_CHANCE", defaults.roam_chance_percent),
            narration_enabled: parse_or(
                &read,
                "OAKHAVEN_NARRATION_ENABLED",
                defaults.narration_enabled,
            ),
            narration_url: read("OAKHAVEN_NARRATION_URL").unwrap_or(defaults.narration_url),
            narration_model: read("OAKHAVEN_NARRATION_MODEL").unwrap_or(defaults.narration_model),
            narration_timeout_ms: parse_or(
                &read,
                "OAKHAVEN_NARRATION_TIMEOUT_MS",
                defaults.narration_timeout_ms,
            ),
        }
    }
}

fn parse_or<T: FromStr>(read: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match read(key) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "unparsable setting; using default");
            default
        }),
    }
}

fn parse_position(raw: &str) -> Option<Position> {
    let parts: Vec<i32> = raw
        .split(',')
        .map(|p| p.trim().parse().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [x, y, z] => Some(Position::new(*x, *y, *z)),
        _ => None,
    }
}
