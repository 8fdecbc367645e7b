//! Shared type definitions for the Gridlock traffic simulation.
//!
//! This crate is the single source of truth for the value types used across
//! the Gridlock workspace. Everything here is plain data: no behaviour that
//! needs the grid or the random number generator lives in this crate.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe index wrappers for agents and signal lights
//! - [`enums`] -- Enumerations (direction, light state, mood, personality,
//!   negotiation actions, agent kinds)
//! - [`structs`] -- Lattice positions and per-tick population statistics

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AgentKind, Direction, LightState, Mood, NegotiationAction, NegotiationOutcome, Personality,
};
pub use ids::{AgentId, LightId};
pub use structs::{PopulationStats, Position};
