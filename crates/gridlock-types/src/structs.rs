//! Core value structs: lattice positions and population statistics.

use serde::{Deserialize, Serialize};

use crate::enums::Direction;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A cell coordinate on the lattice.
///
/// Serialized as a two-element array `[x, y]` so layout tables stay compact
/// in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by `(dx, dy)` without wrapping.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// The neighbouring cell one step along `direction`, without wrapping.
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Manhattan distance to `other` on the unwrapped plane.
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }

    /// One king-move step towards `target`: each axis moves by at most one
    /// cell, independently.
    pub const fn step_toward(self, target: Self) -> Self {
        let dx = signum(target.x.saturating_sub(self.x));
        let dy = signum(target.y.saturating_sub(self.y));
        self.offset(dx, dy)
    }
}

const fn signum(value: i32) -> i32 {
    if value > 0 {
        1
    } else if value < 0 {
        -1
    } else {
        0
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Position> for (i32, i32) {
    fn from(pos: Position) -> Self {
        (pos.x, pos.y)
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// PopulationStats
// ---------------------------------------------------------------------------

/// Congestion and happiness metrics sampled once per tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationStats {
    /// Disciplined cars whose mood is happy.
    pub happy_cars: u32,
    /// Disciplined cars whose mood is angry.
    pub angry_cars: u32,
    /// Reckless cars on the grid.
    pub reckless_cars: u32,
    /// Pedestrians frozen by a reckless car in their cell.
    pub blocked_pedestrians: u32,
    /// Vehicles with a non-zero jam counter.
    pub jammed_vehicles: u32,
    /// Mean happiness over all vehicles, rounded toward zero.
    pub mean_happiness: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_toward_moves_diagonally() {
        let from = Position::new(7, 7);
        assert_eq!(from.step_toward(Position::new(11, 11)), Position::new(8, 8));
        assert_eq!(from.step_toward(Position::new(7, 3)), Position::new(7, 6));
        assert_eq!(from.step_toward(from), from);
    }

    #[test]
    fn manhattan_distance_sums_axes() {
        assert_eq!(Position::new(7, 7).manhattan_distance(Position::new(9, 15)), 10);
    }

    #[test]
    fn step_follows_direction() {
        assert_eq!(Position::new(3, 3).step(Direction::Up), Position::new(3, 4));
        assert_eq!(Position::new(3, 3).step(Direction::Left), Position::new(2, 3));
    }

    #[test]
    fn position_serializes_as_pair() {
        let json = serde_json::to_string(&Position::new(9, 15)).unwrap_or_default();
        assert_eq!(json, "[9,15]");
        let back: Position = serde_json::from_str("[13,7]").unwrap_or(Position::new(0, 0));
        assert_eq!(back, Position::new(13, 7));
    }
}
