//! Value objects - immutable, identity-less game values

mod abilities;
mod dice;
mod position;

pub use abilities::{ability_modifier, Ability, AbilityScores};
pub use dice::{roll, DiceFormula, DiceParseError, DiceRollResult};
pub use position::Position;
