//! Scripted NPC conversations.
//!
//! Each NPC walks a dialogue tree from `catalog::dialogue`. The current node
//! lives on the NPC, so a conversation picks up where it left off. Options
//! can be hidden behind an inventory item or an active quest, and choosing
//! one may run an action (follow, accept a quest, trade...) before the tree
//! advances.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use oakhaven_domain::catalog::{
    script, DialogueAction, DialogueNode, DialogueOption, DialogueScript, Zone,
};
use oakhaven_domain::{GameEvent, MapTile, NpcId, NpcStatus, Player, PlayerId, TileType};

use crate::infrastructure::ports::RepoError;
use crate::use_cases::inventory::remove_by_name;
use crate::use_cases::scene::{Scene, SceneStore};
use crate::use_cases::{quests, Rejection};

/// Conversations break off beyond this Manhattan distance.
pub const TALK_RANGE: i32 = 3;

#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("Player not found")]
    PlayerNotFound,
    #[error("That person does not exist.")]
    NpcNotFound,
    #[error("You have wandered too far away.")]
    TooFar,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl Rejection for DialogueError {
    fn is_rejection(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

/// What the player said.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "option", rename_all = "snake_case")]
pub enum ChatInput {
    /// Open (or re-open) the conversation.
    Open,
    /// Pick a visible option, counting from 1.
    Choose(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogueReply {
    pub npc: String,
    /// Shown above the node text, e.g. a refused choice.
    pub notice: Option<String>,
    pub text: String,
    pub options: Vec<String>,
    pub can_trade: bool,
    pub events: Vec<GameEvent>,
}

impl DialogueReply {
    fn silent(npc: &str) -> Self {
        Self {
            npc: npc.to_string(),
            notice: None,
            text: format!("{} has nothing to say.", npc),
            options: Vec::new(),
            can_trade: false,
            events: Vec::new(),
        }
    }

    /// Plain-text rendering with numbered options.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(notice) = &self.notice {
            out.push_str(notice);
            out.push('\n');
        }
        out.push_str(&self.text);
        if self.options.is_empty() {
            out.push_str("\n(End of conversation)");
        } else {
            out.push_str("\n\n");
            for (i, label) in self.options.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, label));
            }
        }
        out
    }
}

fn visible_options(node: &DialogueNode, player: &Player) -> Vec<&'static DialogueOption> {
    node.options
        .iter()
        .filter(|opt| {
            opt.requires_item
                .map_or(true, |item| player.count_item(item) > 0)
                && opt
                    .requires_quest_active
                    .map_or(true, |id| player.quest_log.active.contains_key(id))
        })
        .collect()
}

/// Where the conversation stands before any input.
fn entry_node(
    script: &'static DialogueScript,
    current: Option<&str>,
    in_town: bool,
    reopening: bool,
) -> &'static str {
    let town = script.town_node.filter(|_| in_town);
    let mut id = match (current, town) {
        (None, Some(town)) | (Some("end_rescue"), Some(town)) => town,
        (Some(current), _) => current,
        (None, None) => script.start_node,
    };
    let stale = script.node(id).map_or(true, |n| n.is_leaf() || n.id == "end");
    if reopening && stale {
        id = town.unwrap_or(script.start_node);
    }
    script.node(id).map_or(script.start_node, |n| n.id)
}

/// Advance the conversation with `npc_id` by one input.
pub fn chat(
    scene: &mut Scene,
    npc_id: NpcId,
    input: ChatInput,
) -> Result<DialogueReply, DialogueError> {
    let npc = scene.npc(npc_id).ok_or(DialogueError::NpcNotFound)?;
    let player_at = scene.player.position;
    if !npc.position.same_level(&player_at) || npc.position.manhattan(&player_at) > TALK_RANGE {
        return Err(DialogueError::TooFar);
    }
    let name = npc.name.clone();
    let Some(script) = script(&npc.persona) else {
        return Ok(DialogueReply::silent(&name));
    };
    let in_town = Zone::from_level(npc.position.z) == Zone::Town;
    let mut node_id = entry_node(
        script,
        npc.quest_state.current_node.as_deref(),
        in_town,
        input == ChatInput::Open,
    );

    let mut notice = None;
    let mut events = Vec::new();
    if let ChatInput::Choose(choice) = input {
        let node = script.node(node_id).ok_or(DialogueError::NpcNotFound)?;
        let options = visible_options(node, &scene.player);
        match choice.checked_sub(1).and_then(|i| options.get(i)) {
            Some(option) => {
                let outcome = match option.action {
                    Some(action) => run_action(scene, npc_id, action),
                    None => Ok(Vec::new()),
                };
                match outcome {
                    Ok(action_events) => {
                        events = action_events;
                        if let Some(next) = option.next.and_then(|n| script.node(n)) {
                            node_id = next.id;
                        }
                    }
                    Err(refusal) => notice = Some(refusal),
                }
            }
            None => notice = Some("(Invalid option. Please type the number.)".to_string()),
        }
    }

    if let Some(npc) = scene.npc_mut(npc_id) {
        npc.quest_state.current_node = Some(node_id.to_string());
    }
    let node = script.node(node_id).ok_or(DialogueError::NpcNotFound)?;
    let options = visible_options(node, &scene.player)
        .into_iter()
        .map(|o| o.label.to_string())
        .collect();

    Ok(DialogueReply {
        npc: name,
        notice,
        text: node.text.to_string(),
        options,
        can_trade: in_town,
        events,
    })
}

/// Apply a dialogue action. `Err` carries the line shown when it is refused.
fn run_action(
    scene: &mut Scene,
    npc_id: NpcId,
    action: DialogueAction,
) -> Result<Vec<GameEvent>, String> {
    match action {
        DialogueAction::AcceptQuest(id) => {
            let player = &mut scene.player;
            let def = quests::accept(player, id).map_err(|e| e.to_string())?;
            tracing::info!(player_id = %player.id, quest_id = id, "Quest accepted in dialogue");
            Ok(vec![GameEvent::success(format!("Quest accepted: {}", def.title))])
        }
        DialogueAction::CompleteQuest(id) => {
            let player = &mut scene.player;
            let completion = quests::complete(player, id).map_err(|e| e.to_string())?;
            tracing::info!(player_id = %player.id, quest_id = id, "Quest completed in dialogue");
            Ok(quests::completion_events(&completion))
        }
        DialogueAction::TradeItem { item, gold } => {
            let player = &mut scene.player;
            if !remove_by_name(player, item, 1) {
                return Err(format!("You don't have any {}.", item));
            }
            player.gold += gold;
            Ok(vec![GameEvent::info(format!(
                "You hand over the {}. (+{} gold)",
                item, gold
            ))])
        }
        DialogueAction::Escort { door } => {
            match scene.tile_mut(door) {
                Some(tile) => {
                    tile.tile_type = TileType::Door;
                    tile.is_visited = true;
                }
                None => {
                    let mut tile = MapTile::new(door, TileType::Door);
                    tile.is_visited = true;
                    scene.put_tile(tile);
                }
            }
            let npc = scene.npc_mut(npc_id).ok_or("They are gone.")?;
            npc.quest_state.status = NpcStatus::Escorting;
            npc.position.x = door.x;
            Ok(vec![GameEvent::success("The hidden door grinds open!")])
        }
        DialogueAction::FollowMe => {
            let npc = scene.npc_mut(npc_id).ok_or("They are gone.")?;
            npc.follow();
            Ok(vec![GameEvent::info(format!("{} starts following you.", npc.name))])
        }
        DialogueAction::StayHere => {
            let npc = scene.npc_mut(npc_id).ok_or("They are gone.")?;
            npc.wait_here();
            Ok(vec![GameEvent::info(format!("{} waits here.", npc.name))])
        }
        DialogueAction::GoHome => {
            let npc = scene.npc_mut(npc_id).ok_or("They are gone.")?;
            if !npc.walk_home() {
                return Err(format!("{} has nowhere to go.", npc.name));
            }
            Ok(vec![GameEvent::info(format!("{} heads home.", npc.name))])
        }
        DialogueAction::Rescue {
            destination,
            location,
        } => {
            let npc = scene.npc_mut(npc_id).ok_or("They are gone.")?;
            npc.quest_state.status = NpcStatus::Rescued;
            npc.position = destination;
            npc.location = location.to_string();
            tracing::info!(npc = %npc.name, location, "NPC rescued");
            Ok(vec![GameEvent::success(format!(
                "{} sets off for the {}.",
                npc.name, location
            ))])
        }
    }
}

/// Dialogue use cases.
pub struct DialogueUseCases {
    scenes: SceneStore,
}

impl DialogueUseCases {
    pub fn new(scenes: SceneStore) -> Self {
        Self { scenes }
    }

    pub async fn chat(
        &self,
        player_id: PlayerId,
        npc_id: NpcId,
        input: ChatInput,
    ) -> Result<DialogueReply, DialogueError> {
        let _guard = self.scenes.lock(player_id).await;
        let mut scene = self
            .scenes
            .load(player_id)
            .await?
            .ok_or(DialogueError::PlayerNotFound)?;

        let reply = chat(&mut scene, npc_id, input)?;
        self.scenes.commit(scene).await?;
        tracing::debug!(player_id = %player_id, npc = %reply.npc, ?input, "Dialogue advanced");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use oakhaven_domain::catalog::item_template;
    use oakhaven_domain::{Npc, Position};

    use super::*;
    use crate::infrastructure::memory::InMemoryStore;
    use crate::infrastructure::ports::{NpcRepo, PlayerRepo};
    use crate::use_cases::combat::test_support::*;
    use crate::use_cases::scene::test_support::scene_store;

    fn town_scene(npc: Npc) -> Scene {
        let mut player = hero();
        player.position = Position::new(0, 0, 1);
        Scene::new(player).with_npc(npc)
    }

    fn gareth_in_town() -> Npc {
        Npc::new("Gareth Ironhand", "Gareth Ironhand", Position::new(1, 0, 1))
    }

    #[test]
    fn opening_in_town_starts_at_the_town_node() {
        let npc = gareth_in_town();
        let id = npc.id;
        let mut scene = town_scene(npc);

        let reply = chat(&mut scene, id, ChatInput::Open).unwrap();
        assert_eq!(reply.text, "Welcome to the Ironhand Smithy! Best steel in the region.");
        // Item-gated options stay hidden with an empty pack
        assert_eq!(reply.options, vec!["What do you need?", "See you later."]);
        assert!(reply.can_trade);
        assert_eq!(
            scene.npc(id).unwrap().quest_state.current_node.as_deref(),
            Some("town_start")
        );
    }

    #[test]
    fn choosing_accepts_a_quest_and_advances() {
        let npc = gareth_in_town();
        let id = npc.id;
        let mut scene = town_scene(npc);

        chat(&mut scene, id, ChatInput::Open).unwrap();
        chat(&mut scene, id, ChatInput::Choose(1)).unwrap();
        let reply = chat(&mut scene, id, ChatInput::Choose(1)).unwrap();
        assert!(scene.player.quest_log.active.contains_key("iron_supply"));
        assert_eq!(reply.events[0].text(), Some("Quest accepted: Iron Supply"));
        assert!(reply.options.is_empty());
        assert!(reply.render().ends_with("(End of conversation)"));
    }

    #[test]
    fn turn_in_option_appears_with_the_item_and_quest() {
        let npc = gareth_in_town();
        let id = npc.id;
        let mut scene = town_scene(npc);
        quests::accept(&mut scene.player, "iron_supply").unwrap();
        scene
            .player
            .add_item(item_template("iron_ore").unwrap().instantiate());

        let reply = chat(&mut scene, id, ChatInput::Open).unwrap();
        assert_eq!(reply.options[0], "I have Iron Ore.");
        let reply = chat(&mut scene, id, ChatInput::Choose(1)).unwrap();
        assert_eq!(reply.text, "Excellent work. Here's your payment.");
        assert_eq!(scene.player.gold, 50);
        assert_eq!(scene.player.count_item("Iron Ore"), 0);
    }

    #[test]
    fn invalid_choice_keeps_the_node() {
        let npc = gareth_in_town();
        let id = npc.id;
        let mut scene = town_scene(npc);

        let reply = chat(&mut scene, id, ChatInput::Choose(9)).unwrap();
        assert_eq!(
            reply.notice.as_deref(),
            Some("(Invalid option. Please type the number.)")
        );
        assert!(reply.render().starts_with("(Invalid option. Please type the number.)\nWelcome"));
        assert_eq!(reply.options.len(), 2);
    }

    #[test]
    fn leaf_nodes_reset_when_reopened() {
        let mut npc = gareth_in_town();
        npc.quest_state.current_node = Some("end".to_string());
        let id = npc.id;
        let mut scene = town_scene(npc);

        let reply = chat(&mut scene, id, ChatInput::Open).unwrap();
        assert_eq!(reply.text, "Welcome to the Ironhand Smithy! Best steel in the region.");
    }

    #[test]
    fn too_far_or_unscripted() {
        let far = Npc::new("Gareth Ironhand", "Gareth Ironhand", Position::new(4, 0, 1));
        let id = far.id;
        let mut scene = town_scene(far);
        let err = chat(&mut scene, id, ChatInput::Open).unwrap_err();
        assert_eq!(err.to_string(), "You have wandered too far away.");

        let villager = Npc::new("Tom", "villager", Position::new(1, 0, 1));
        let id = villager.id;
        let mut scene = town_scene(villager);
        let reply = chat(&mut scene, id, ChatInput::Open).unwrap();
        assert_eq!(reply.text, "Tom has nothing to say.");
    }

    #[test]
    fn elara_rescue_opens_the_hidden_door() {
        let elara =
            Npc::new("Elara", "Elara", Position::new(1, 29, 0)).with_status(NpcStatus::Captive);
        let id = elara.id;
        let mut player = hero();
        player.position = Position::new(0, 29, 0);
        let mut scene = Scene::new(player).with_npc(elara);

        chat(&mut scene, id, ChatInput::Open).unwrap();
        chat(&mut scene, id, ChatInput::Choose(1)).unwrap();
        chat(&mut scene, id, ChatInput::Choose(1)).unwrap();
        let reply = chat(&mut scene, id, ChatInput::Choose(1)).unwrap();

        assert_eq!(reply.text, "Thank you! I'll meet you in Oakhaven!");
        let door = scene.tile(Position::new(2, 30, 0)).unwrap();
        assert_eq!(door.tile_type, TileType::Door);
        let elara = scene.npc(id).unwrap();
        assert_eq!(elara.quest_state.status, NpcStatus::Escorting);
        assert_eq!(elara.position.x, 2);
    }

    #[test]
    fn refused_action_does_not_advance() {
        let mut npc = Npc::new("Elara", "Elara", Position::new(1, 0, 1));
        npc.quest_state.current_node = Some("follow".to_string());
        let id = npc.id;
        let mut scene = town_scene(npc);

        // "Go home." with no home remembered
        let reply = chat(&mut scene, id, ChatInput::Choose(2)).unwrap();
        assert_eq!(reply.notice.as_deref(), Some("Elara has nowhere to go."));
        assert_eq!(reply.text, "Lead the way.");
    }

    #[tokio::test]
    async fn follow_me_is_committed() {
        let store = Arc::new(InMemoryStore::new());
        let mut player = hero();
        player.position = Position::new(0, 0, 1);
        let elara = Npc::new("Elara", "Elara", Position::new(1, 0, 1));
        PlayerRepo::save(store.as_ref(), &player).await.unwrap();
        NpcRepo::save(store.as_ref(), &elara).await.unwrap();
        let dialogue = DialogueUseCases::new(scene_store(&store));

        let reply = dialogue.chat(player.id, elara.id, ChatInput::Open).await.unwrap();
        assert_eq!(reply.options[1], "Come with me.");
        dialogue
            .chat(player.id, elara.id, ChatInput::Choose(2))
            .await
            .unwrap();

        let saved = NpcRepo::get(store.as_ref(), elara.id).await.unwrap().unwrap();
        assert_eq!(saved.quest_state.status, NpcStatus::Following);
        assert_eq!(saved.quest_state.home, Some(Position::new(1, 0, 1)));
        assert_eq!(saved.quest_state.current_node.as_deref(), Some("follow"));
    }
}
