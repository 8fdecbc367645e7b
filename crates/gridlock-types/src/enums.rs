//! Enumeration types for the Gridlock simulation.

use serde::{Deserialize, Serialize};

use crate::structs::Position;

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// Heading of a vehicle on the lattice.
///
/// `Up` increases `y`, `Down` decreases it; `Right` increases `x`, `Left`
/// decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards larger `y`.
    Up,
    /// Towards smaller `y`.
    Down,
    /// Towards smaller `x`.
    Left,
    /// Towards larger `x`.
    Right,
}

impl Direction {
    /// Unit offset `(dx, dy)` of one step in this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Derive the heading of a vehicle from the grid edge it spawned on.
    ///
    /// The bottom row heads up, the top row heads down, the left column heads
    /// right and the right column heads left. Rows are tested before columns,
    /// so corner cells resolve vertically. Returns `None` for interior cells.
    pub fn from_spawn_edge(spawn: Position, size: i32) -> Option<Self> {
        let last = size.checked_sub(1)?;
        if spawn.y == 0 {
            Some(Self::Up)
        } else if spawn.y == last {
            Some(Self::Down)
        } else if spawn.x == 0 {
            Some(Self::Right)
        } else if spawn.x == last {
            Some(Self::Left)
        } else {
            None
        }
    }

    /// Whether `position` lies strictly beyond `landmark` along this heading.
    pub const fn has_passed(self, position: Position, landmark: Position) -> bool {
        match self {
            Self::Up => position.y > landmark.y,
            Self::Down => position.y < landmark.y,
            Self::Right => position.x > landmark.x,
            Self::Left => position.x < landmark.x,
        }
    }

    /// The heading a vehicle takes when it turns off its lane at the
    /// outermost column or row.
    pub const fn outer_lane_turn(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Down => Self::Left,
            Self::Right => Self::Down,
            Self::Left => Self::Up,
        }
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Colour shown by a traffic light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightState {
    /// Stop.
    Red,
    /// Transition between green and red.
    Yellow,
    /// Go.
    Green,
}

impl LightState {
    /// Whether a reckless driver treats this colour as a stop signal.
    pub const fn is_restrictive(self) -> bool {
        matches!(self, Self::Red | Self::Yellow)
    }
}

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

/// Coarse happiness classification of a disciplined car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Moving freely.
    Happy,
    /// Stuck, or frustrated by a failed negotiation.
    Angry,
}

/// Negotiation temperament of a disciplined car, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    /// Always lets the other vehicle go first.
    Cooperative,
    /// Pushes forward unless the other side is cooperative.
    Competitive,
    /// Advances only against a cooperative counterpart.
    Neutral,
}

impl Personality {
    /// All personalities, in the order used for uniform random selection.
    pub const ALL: [Self; 3] = [Self::Cooperative, Self::Competitive, Self::Neutral];
}

/// One side's move in a negotiation over a contested cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationAction {
    /// Let the other vehicle take the cell.
    Yield,
    /// Claim the cell.
    Advance,
}

/// Summary of the most recent negotiation from the acting car's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationOutcome {
    /// This car gave way (alone or together with the other car).
    Yielded,
    /// This car claimed the cell and the other yielded.
    Advanced,
    /// Both cars claimed the cell.
    Stalemate,
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// The closed set of agent kinds that can occupy a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Impassable building block.
    Building,
    /// Signal light at an intersection.
    TrafficLight,
    /// Disciplined, negotiating car.
    Car,
    /// Car that bends the rules at random.
    RecklessCar,
    /// Pedestrian walking a fixed waypoint loop.
    Pedestrian,
}

impl AgentKind {
    /// Whether this kind occupies a lane slot (at most one per cell).
    pub const fn is_vehicle(self) -> bool {
        matches!(self, Self::Car | Self::RecklessCar)
    }

    /// Whether this kind is a pedestrian.
    pub const fn is_pedestrian(self) -> bool {
        matches!(self, Self::Pedestrian)
    }

    /// Whether this kind blocks vehicle entry.
    pub const fn is_building(self) -> bool {
        matches!(self, Self::Building)
    }

    /// Whether this kind is a traffic light.
    pub const fn is_light(self) -> bool {
        matches!(self, Self::TrafficLight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_edges_map_to_headings() {
        assert_eq!(Direction::from_spawn_edge(Position::new(12, 0), 23), Some(Direction::Up));
        assert_eq!(Direction::from_spawn_edge(Position::new(8, 22), 23), Some(Direction::Down));
        assert_eq!(Direction::from_spawn_edge(Position::new(0, 9), 23), Some(Direction::Right));
        assert_eq!(Direction::from_spawn_edge(Position::new(22, 13), 23), Some(Direction::Left));
        assert_eq!(Direction::from_spawn_edge(Position::new(5, 5), 23), None);
    }

    #[test]
    fn passing_is_strict_along_heading() {
        let light = Position::new(13, 7);
        assert!(!Direction::Up.has_passed(Position::new(13, 7), light));
        assert!(Direction::Up.has_passed(Position::new(13, 8), light));
        assert!(Direction::Left.has_passed(Position::new(12, 3), light));
        assert!(!Direction::Right.has_passed(Position::new(12, 3), light));
    }

    #[test]
    fn role_predicates() {
        assert!(AgentKind::Car.is_vehicle());
        assert!(AgentKind::RecklessCar.is_vehicle());
        assert!(!AgentKind::Pedestrian.is_vehicle());
        assert!(AgentKind::Building.is_building());
        assert!(AgentKind::TrafficLight.is_light());
    }

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_string(&AgentKind::RecklessCar).unwrap_or_default();
        assert_eq!(json, "\"reckless_car\"");
    }
}
