//! Events returned to the presentation layer
//!
//! Every use case that changes the world reports what happened as an ordered
//! list of `GameEvent`s: narrative text for the log, animation hints for the
//! renderer, and floating popups over a participant.

use serde::{Deserialize, Serialize};

use crate::entities::CombatantRef;
use crate::value_objects::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Info,
    Combat,
    Danger,
    Success,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    Attack,
    Hit,
    Miss,
    Death,
    Heal,
    Stun,
    Rage,
    Explosion,
    Web,
    Burn,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupStyle {
    Damage,
    Heal,
    Miss,
    Status,
    Xp,
    Gold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Narrative {
        text: String,
        tone: Tone,
    },
    Animation {
        kind: AnimationKind,
        actor: CombatantRef,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<CombatantRef>,
        #[serde(skip_serializing_if = "Option::is_none")]
        at: Option<Position>,
    },
    Popup {
        target: CombatantRef,
        text: String,
        style: PopupStyle,
    },
    /// An action was refused; nothing changed.
    Rejected {
        message: String,
    },
}

impl GameEvent {
    pub fn narrative(text: impl Into<String>, tone: Tone) -> Self {
        Self::Narrative {
            text: text.into(),
            tone,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::narrative(text, Tone::Info)
    }

    pub fn combat(text: impl Into<String>) -> Self {
        Self::narrative(text, Tone::Combat)
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self::narrative(text, Tone::Danger)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::narrative(text, Tone::Success)
    }

    pub fn animation(kind: AnimationKind, actor: CombatantRef, target: Option<CombatantRef>) -> Self {
        Self::Animation {
            kind,
            actor,
            target,
            at: None,
        }
    }

    pub fn popup(target: CombatantRef, text: impl Into<String>, style: PopupStyle) -> Self {
        Self::Popup {
            target,
            text: text.into(),
            style,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Narrative text, if this is a narrative event.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Narrative { text, .. } => Some(text),
            Self::Rejected { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PlayerId;

    #[test]
    fn events_are_tagged_by_type() {
        let json = serde_json::to_value(GameEvent::combat("You swing.")).unwrap();
        assert_eq!(json["type"], "narrative");
        assert_eq!(json["tone"], "combat");

        let player = CombatantRef::Player(PlayerId::new());
        let json = serde_json::to_value(GameEvent::popup(player, "-4", PopupStyle::Damage)).unwrap();
        assert_eq!(json["type"], "popup");
        assert_eq!(json["style"], "damage");
        assert_eq!(json["target"]["kind"], "player");
    }

    #[test]
    fn text_reads_narratives_and_rejections() {
        assert_eq!(GameEvent::info("hi").text(), Some("hi"));
        assert_eq!(GameEvent::rejected("no").text(), Some("no"));
        let player = CombatantRef::Player(PlayerId::new());
        assert_eq!(
            GameEvent::animation(AnimationKind::Heal, player, None).text(),
            None
        );
    }
}
