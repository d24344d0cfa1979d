//! Scripted dialogue trees keyed by NPC persona

use crate::value_objects::Position;

/// Side effect attached to a dialogue option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueAction {
    FollowMe,
    StayHere,
    GoHome,
    AcceptQuest(&'static str),
    CompleteQuest(&'static str),
    /// Hand over one `item` for `gold`.
    TradeItem { item: &'static str, gold: u32 },
    /// The NPC leaves for `destination` and is marked rescued.
    Rescue {
        destination: Position,
        location: &'static str,
    },
    /// The NPC escorts the player and a hidden door opens at `door`.
    Escort { door: Position },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueOption {
    pub label: &'static str,
    pub next: Option<&'static str>,
    pub requires_item: Option<&'static str>,
    pub requires_quest_active: Option<&'static str>,
    pub action: Option<DialogueAction>,
}

impl DialogueOption {
    const fn goto(label: &'static str, next: &'static str) -> Self {
        Self {
            label,
            next: Some(next),
            requires_item: None,
            requires_quest_active: None,
            action: None,
        }
    }

    const fn act(label: &'static str, next: &'static str, action: DialogueAction) -> Self {
        Self {
            action: Some(action),
            ..Self::goto(label, next)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueNode {
    pub id: &'static str,
    pub text: &'static str,
    pub options: &'static [DialogueOption],
}

impl DialogueNode {
    pub fn is_leaf(&self) -> bool {
        self.options.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueScript {
    pub persona: &'static str,
    pub start_node: &'static str,
    /// Entry node once the NPC lives in town.
    pub town_node: Option<&'static str>,
    pub nodes: &'static [DialogueNode],
}

impl DialogueScript {
    pub fn node(&self, id: &str) -> Option<&'static DialogueNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

pub static SCRIPTS: &[DialogueScript] = &[
    DialogueScript {
        persona: "Elara",
        start_node: "start",
        town_node: Some("town_start"),
        nodes: &[
            DialogueNode {
                id: "start",
                text: "Sshhh! Keep your voice down! The skeletons... they are everywhere. Who are you?",
                options: &[
                    DialogueOption::goto("I am an adventurer. I'm here to help.", "intro"),
                    DialogueOption::goto("Just a wanderer. Who are you?", "who"),
                ],
            },
            DialogueNode {
                id: "who",
                text: "I am Elara, the herbalist from Oakhaven. They dragged me down here days ago.",
                options: &[DialogueOption::goto("Don't worry, I'll get you out.", "plan")],
            },
            DialogueNode {
                id: "intro",
                text: "An adventurer? Thank the gods. I thought I was going to rot in this cell.",
                options: &[DialogueOption::goto("Do you know a way out?", "plan")],
            },
            DialogueNode {
                id: "plan",
                text: "There is a loose brick on the north wall. It opens a hidden door! Open it and I can run to safety.",
                options: &[DialogueOption::act(
                    "Stand back. I'll open it.",
                    "end_rescue",
                    DialogueAction::Escort {
                        door: Position::new(2, 30, 0),
                    },
                )],
            },
            DialogueNode {
                id: "end_rescue",
                text: "Thank you! I'll meet you in Oakhaven!",
                options: &[],
            },
            DialogueNode {
                id: "town_start",
                text: "It feels so good to see the sun again! My shop is open if you need herbs.",
                options: &[
                    DialogueOption {
                        requires_item: Some("Mystic Herb"),
                        requires_quest_active: Some("herbal_remedy"),
                        ..DialogueOption::act(
                            "I brought Mystic Herbs.",
                            "thanks",
                            DialogueAction::CompleteQuest("herbal_remedy"),
                        )
                    },
                    DialogueOption::act(
                        "Need any herbs gathered?",
                        "herb_quest",
                        DialogueAction::AcceptQuest("herbal_remedy"),
                    ),
                    DialogueOption::act("Come with me.", "follow", DialogueAction::FollowMe),
                    DialogueOption::goto("Goodbye.", "end"),
                ],
            },
            DialogueNode {
                id: "herb_quest",
                text: "Bring me Mystic Herbs from the flower pots around town and I'll pay you.",
                options: &[DialogueOption::goto("I'll keep an eye out.", "end")],
            },
            DialogueNode {
                id: "follow",
                text: "Lead the way.",
                options: &[
                    DialogueOption::act("Wait here.", "waiting", DialogueAction::StayHere),
                    DialogueOption::act("Go home.", "end", DialogueAction::GoHome),
                ],
            },
            DialogueNode {
                id: "waiting",
                text: "I'll be right here.",
                options: &[DialogueOption::act("Come with me.", "follow", DialogueAction::FollowMe)],
            },
            DialogueNode {
                id: "thanks",
                text: "Wonderful! These will brew a fine batch.",
                options: &[],
            },
            DialogueNode {
                id: "end",
                text: "Safe travels, hero.",
                options: &[],
            },
        ],
    },
    DialogueScript {
        persona: "Gareth Ironhand",
        start_node: "start",
        town_node: Some("town_start"),
        nodes: &[
            DialogueNode {
                id: "start",
                text: "Hmph. About time someone showed up. You don't look like one of the Warden's lackeys.",
                options: &[
                    DialogueOption::goto("I'm here to rescue you, Gareth.", "rescue_offer"),
                    DialogueOption::goto("Lackey? Watch your tongue.", "tough"),
                ],
            },
            DialogueNode {
                id: "tough",
                text: "Hah! A spine! Good. I'm Gareth Ironhand.",
                options: &[DialogueOption::goto("Let's get you out of here.", "rescue_offer")],
            },
            DialogueNode {
                id: "rescue_offer",
                text: "Aye, I'm ready to leave. My hammer belongs in my smithy, not this damp hole.",
                options: &[DialogueOption::act(
                    "Go. The path is clear.",
                    "end_rescue",
                    DialogueAction::Rescue {
                        destination: Position::new(8, 8, 1),
                        location: "Smithy",
                    },
                )],
            },
            DialogueNode {
                id: "end_rescue",
                text: "Right! Come see me in Oakhaven. I'll sharpen that blade of yours for free!",
                options: &[],
            },
            DialogueNode {
                id: "town_start",
                text: "Welcome to the Ironhand Smithy! Best steel in the region.",
                options: &[
                    DialogueOption {
                        requires_item: Some("Iron Ore"),
                        requires_quest_active: Some("iron_supply"),
                        ..DialogueOption::act(
                            "I have Iron Ore.",
                            "turn_in",
                            DialogueAction::CompleteQuest("iron_supply"),
                        )
                    },
                    DialogueOption {
                        requires_item: Some("Titanium Fragment"),
                        requires_quest_active: Some("titanium_hunt"),
                        ..DialogueOption::act(
                            "I found the Titanium Fragment!",
                            "turn_in",
                            DialogueAction::CompleteQuest("titanium_hunt"),
                        )
                    },
                    DialogueOption::goto("What do you need?", "quests"),
                    DialogueOption {
                        requires_item: Some("Bone"),
                        ..DialogueOption::act(
                            "Want some old bones?",
                            "bones",
                            DialogueAction::TradeItem { item: "Bone", gold: 3 },
                        )
                    },
                    DialogueOption::goto("See you later.", "end"),
                ],
            },
            DialogueNode {
                id: "quests",
                text: "Iron ore keeps the forge hot. And if you ever find titanium in the Earth Dungeon, bring it here.",
                options: &[
                    DialogueOption::act(
                        "I'll fetch ore.",
                        "end",
                        DialogueAction::AcceptQuest("iron_supply"),
                    ),
                    DialogueOption::act(
                        "I'll look for titanium.",
                        "end",
                        DialogueAction::AcceptQuest("titanium_hunt"),
                    ),
                ],
            },
            DialogueNode {
                id: "bones",
                text: "Bone meal for the quench. Here's a few coins.",
                options: &[],
            },
            DialogueNode {
                id: "turn_in",
                text: "Excellent work. Here's your payment.",
                options: &[],
            },
            DialogueNode {
                id: "end",
                text: "Keep your blade sharp.",
                options: &[],
            },
        ],
    },
    DialogueScript {
        persona: "Elder Aethelgard",
        start_node: "start",
        town_node: None,
        nodes: &[
            DialogueNode {
                id: "start",
                text: "Welcome to Oakhaven, traveller. Dark days are upon us.",
                options: &[
                    DialogueOption::goto("What troubles the town?", "troubles"),
                    DialogueOption {
                        requires_quest_active: Some("elemental_balance"),
                        ..DialogueOption::act(
                            "The guardians are defeated.",
                            "victory",
                            DialogueAction::CompleteQuest("elemental_balance"),
                        )
                    },
                    DialogueOption {
                        requires_quest_active: Some("rat_catcher"),
                        ..DialogueOption::act(
                            "The rats are dealt with.",
                            "rats_done",
                            DialogueAction::CompleteQuest("rat_catcher"),
                        )
                    },
                    DialogueOption::goto("Farewell.", "end"),
                ],
            },
            DialogueNode {
                id: "troubles",
                text: "The elemental guardians have sealed the roads, and rats plague the granary.",
                options: &[
                    DialogueOption::act(
                        "I will face the guardians.",
                        "end",
                        DialogueAction::AcceptQuest("elemental_balance"),
                    ),
                    DialogueOption::act(
                        "I can handle some rats.",
                        "end",
                        DialogueAction::AcceptQuest("rat_catcher"),
                    ),
                ],
            },
            DialogueNode {
                id: "victory",
                text: "The roads are open once more. Oakhaven owes you a great debt.",
                options: &[],
            },
            DialogueNode {
                id: "rats_done",
                text: "The granary is safe. Take this for your trouble.",
                options: &[],
            },
            DialogueNode {
                id: "end",
                text: "May the old gods watch over you.",
                options: &[],
            },
        ],
    },
];

pub fn script(persona: &str) -> Option<&'static DialogueScript> {
    SCRIPTS.iter().find(|s| s.persona == persona)
}
