//! Domain events reported back to callers

mod game_event;

pub use game_event::{AnimationKind, GameEvent, PopupStyle, Tone};
