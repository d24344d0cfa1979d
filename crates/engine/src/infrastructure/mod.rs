//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod memory;
pub mod narrator;
pub mod ports;
pub mod session_locks;
pub mod settings;
