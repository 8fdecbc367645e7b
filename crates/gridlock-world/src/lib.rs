//! Geography for the Gridlock simulation: the lattice and what sits on it
//! permanently.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid and layout operations.
//! - [`grid`] -- [`GridSpace`], the toroidal multi-occupancy lattice with
//!   cell, neighbour and relocation queries.
//! - [`layout`] -- [`RoadLayout`], the static tables of the road network
//!   (light positions, controlling lights, turn points, pedestrian
//!   waypoints, spawn cells).
//! - [`obstacles`] -- The cross-shaped road network and the building cells
//!   that surround it.

pub mod error;
pub mod grid;
pub mod layout;
pub mod obstacles;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::GridSpace;
pub use layout::{ApproachEntry, RoadLayout, TurnPoint};
pub use obstacles::{ROAD_HALF_WIDTH, building_cells, is_road};
