//! Oakhaven Engine library.
//!
//! Game rules and state orchestration for the Oakhaven roguelike.
//!
//! ## Structure
//!
//! - `use_cases/` - Player-facing operations (combat, movement, dialogue, ...)
//! - `infrastructure/` - Port traits and their adapters (in-memory store, narrator)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
