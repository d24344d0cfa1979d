//! Oakhaven Engine - headless entry point.
//!
//! Seeds a small dungeon room into the in-memory store and plays a scripted
//! skirmish against a skeleton, logging every game event.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oakhaven_domain::catalog::{archetype, item_template};
use oakhaven_domain::{GameEvent, MapTile, Player, PlayerId, Position, TileType};
use oakhaven_engine::infrastructure::memory::InMemoryStore;
use oakhaven_engine::infrastructure::ports::{MonsterRepo, PlayerRepo};
use oakhaven_engine::infrastructure::settings::EngineSettings;
use oakhaven_engine::use_cases::interactions::LootView;
use oakhaven_engine::use_cases::PlayerAction;
use oakhaven_engine::App;

/// Rounds before the demo gives up on the fight.
const MAX_ROUNDS: usize = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oakhaven_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Oakhaven Engine");

    let settings = EngineSettings::from_env();
    let store = Arc::new(InMemoryStore::new());
    let app = App::in_memory(&store, settings);

    let player_id = seed_demo(&app, &store).await?;
    run_demo(&app, player_id).await?;

    tracing::info!("Demo finished");
    Ok(())
}

async fn seed_demo(app: &App, store: &Arc<InMemoryStore>) -> anyhow::Result<PlayerId> {
    store
        .seed_tiles((-4..=4).flat_map(|x| {
            (-4..=4).map(move |y| MapTile::new(Position::new(x, y, 0), TileType::Floor))
        }))
        .await;

    let mut player = Player::new("Hero", Position::new(0, 0, 0));
    for key in ["iron_sword", "healing_potion"] {
        let template = item_template(key)
            .ok_or_else(|| anyhow::anyhow!("unknown item template {key}"))?;
        player.add_item(template.instantiate());
    }
    app.repositories.player.save(&player).await?;

    let skeleton = archetype("skeleton")
        .ok_or_else(|| anyhow::anyhow!("unknown archetype skeleton"))?
        .spawn(Position::new(3, 0, 0));
    app.repositories.monster.save(&skeleton).await?;

    if let Some(sword) = player.inventory.iter().find(|i| i.name == "Iron Sword") {
        let events = app.use_cases.inventory.equip(player.id, sword.id).await?;
        log_events(&events);
    }
    Ok(player.id)
}

async fn run_demo(app: &App, player_id: PlayerId) -> anyhow::Result<()> {
    let combat = &app.use_cases.combat;

    let moved = app.use_cases.movement.move_player(player_id, 1, 0).await?;
    log_events(&moved.events);

    if !moved.in_combat {
        let target = app
            .repositories
            .monster
            .list_in_area(moved.position, 5, true)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("no monster to fight"))?;
        let response = combat.start_combat(player_id, target.id).await;
        log_events(&response.events);
    }

    for round in 1..=MAX_ROUNDS {
        let attack = combat
            .player_action(player_id, PlayerAction::Attack { target: None })
            .await;
        log_events(&attack.events);
        if !attack.in_combat {
            break;
        }
        let end = combat.player_action(player_id, PlayerAction::EndTurn).await;
        log_events(&end.events);
        if !end.in_combat {
            break;
        }
        tracing::debug!(round, "Round complete");
    }

    match app.use_cases.interactions.loot_window(player_id, None).await {
        Ok(LootView::Window { source, name, loot }) => {
            tracing::info!(%name, entries = loot.len(), "Looting");
            for entry in loot {
                let taken = app
                    .use_cases
                    .inventory
                    .take_loot(player_id, source, entry.id)
                    .await?;
                tracing::info!("{}", taken.message);
            }
        }
        Ok(LootView::Empty { message }) => tracing::info!("{}", message),
        Err(e) => tracing::info!("{}", e),
    }
    Ok(())
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match event.text() {
            Some(text) => tracing::info!("{}", text),
            None => tracing::trace!(?event, "Event"),
        }
    }
}
