//! Error types for the gridlock-agents crate.
//!
//! Behaviour steps never fail; only construction does. A vehicle off the
//! grid edge or a pedestrian off its waypoint loop is a configuration bug
//! and is reported here rather than corrected.

use gridlock_types::Position;

/// Errors raised while constructing agents or the signal controller.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A vehicle's spawn cell does not lie on a grid edge.
    #[error("vehicle spawn {spawn} is not on an edge of the {size}x{size} grid")]
    SpawnNotOnEdge {
        /// The rejected spawn cell.
        spawn: Position,
        /// Grid side length.
        size: i32,
    },

    /// A pedestrian's start is not one of its waypoints.
    #[error("pedestrian start {position} is not in the waypoint loop")]
    UnknownWaypoint {
        /// The rejected start cell.
        position: Position,
    },

    /// The signal controller was given no lights.
    #[error("signal controller needs at least one light")]
    NoLights,

    /// Signal phase durations are unusable.
    #[error("invalid signal timing: {reason}")]
    InvalidTiming {
        /// Description of what is wrong with the timing.
        reason: String,
    },

    /// A probability parameter lies outside `[0, 1]`.
    #[error("probability {name} = {value} is outside [0, 1]")]
    InvalidProbability {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}
