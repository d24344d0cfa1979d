//! Application state and composition.

use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    memory::InMemoryStore,
    narrator::Narration,
    ports::{
        ClockPort, EncounterRepo, MapRepo, MonsterRepo, NpcRepo, PlayerRepo, RandomPort,
        StateStore, WorldObjectRepo,
    },
    session_locks::SessionLocks,
    settings::EngineSettings,
};
use crate::use_cases::{self, RulesContext, SceneLoader, SceneStore};

/// Main application state.
///
/// Holds the repository ports and every use-case container. Callers drive
/// the game through `use_cases`; there is no transport layer here.
pub struct App {
    pub settings: Arc<EngineSettings>,
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for the repository ports.
#[derive(Clone)]
pub struct Repositories {
    pub player: Arc<dyn PlayerRepo>,
    pub monster: Arc<dyn MonsterRepo>,
    pub npc: Arc<dyn NpcRepo>,
    pub map: Arc<dyn MapRepo>,
    pub object: Arc<dyn WorldObjectRepo>,
    pub encounter: Arc<dyn EncounterRepo>,
    pub store: Arc<dyn StateStore>,
}

impl Repositories {
    /// Every port backed by the same in-memory world.
    pub fn in_memory(store: &Arc<InMemoryStore>) -> Self {
        Self {
            player: store.clone(),
            monster: store.clone(),
            npc: store.clone(),
            map: store.clone(),
            object: store.clone(),
            encounter: store.clone(),
            store: store.clone(),
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub combat: use_cases::CombatUseCases,
    pub inventory: use_cases::InventoryUseCases,
    pub movement: use_cases::MovementUseCases,
    pub dialogue: use_cases::DialogueUseCases,
    pub interactions: use_cases::InteractionUseCases,
    pub quests: use_cases::QuestUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        repos: Repositories,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
        settings: EngineSettings,
        narration: Narration,
    ) -> Self {
        let settings = Arc::new(settings);
        let locks = Arc::new(SessionLocks::new());
        let rules = RulesContext::new(random, clock, settings.clone());

        let loader = SceneLoader::new(
            repos.player.clone(),
            repos.monster.clone(),
            repos.npc.clone(),
            repos.map.clone(),
            repos.object.clone(),
            repos.encounter.clone(),
            settings.scene_radius,
        );
        let scenes = SceneStore::new(loader, repos.store.clone(), locks.clone());

        let use_cases = UseCases {
            combat: use_cases::CombatUseCases::new(scenes.clone(), rules.clone()),
            inventory: use_cases::InventoryUseCases::new(scenes.clone(), rules.clone()),
            movement: use_cases::MovementUseCases::new(scenes.clone(), rules.clone()),
            dialogue: use_cases::DialogueUseCases::new(scenes.clone()),
            interactions: use_cases::InteractionUseCases::new(scenes, rules, narration),
            quests: use_cases::QuestUseCases::new(
                repos.player.clone(),
                repos.store.clone(),
                locks,
            ),
        };

        Self {
            settings,
            repositories: repos,
            use_cases,
        }
    }

    /// An App over an in-memory world with the system clock and dice.
    pub fn in_memory(store: &Arc<InMemoryStore>, settings: EngineSettings) -> Self {
        let narration = Narration::from_settings(&settings);
        if narration.is_enabled() {
            tracing::info!(
                url = %settings.narration_url,
                model = %settings.narration_model,
                timeout = ?Duration::from_millis(settings.narration_timeout_ms),
                "Narration enabled"
            );
        }
        Self::new(
            Repositories::in_memory(store),
            Arc::new(SystemRandom::new()),
            Arc::new(SystemClock::new()),
            settings,
            narration,
        )
    }
}
