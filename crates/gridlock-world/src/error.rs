//! Error types for the `gridlock-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use gridlock_types::{AgentId, Position};

/// Errors that can occur during grid and layout operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The grid side length is not usable.
    #[error("invalid grid size {0}: side length must be at least 1")]
    InvalidGridSize(i32),

    /// A position lies outside the lattice.
    #[error("position {position} is outside the {size}x{size} grid")]
    OutOfBounds {
        /// The offending position.
        position: Position,
        /// Grid side length.
        size: i32,
    },

    /// The agent already has a cell.
    #[error("agent {0} is already placed on the grid")]
    AgentAlreadyPlaced(AgentId),

    /// The agent has never been placed.
    #[error("agent {0} is not on the grid")]
    AgentNotPlaced(AgentId),

    /// A static layout table is unusable with this grid.
    #[error("invalid road layout: {reason}")]
    InvalidLayout {
        /// Description of what is wrong with the layout.
        reason: String,
    },
}
