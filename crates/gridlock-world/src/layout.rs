//! Static tables describing the reference road network.
//!
//! The tables are plain configuration: which light controls each entry
//! lane, where reckless drivers may swing onto a new heading, the loop
//! pedestrians walk, and where vehicles enter the grid. [`RoadLayout`]
//! defaults to the reference 23x23 map and can be overridden from YAML.
//!
//! Inconsistencies between tables (an approach pointing at a cell with no
//! light) are tolerated here: the behaviours treat them as "no light
//! controls this approach".

use serde::{Deserialize, Serialize};

use gridlock_types::{Direction, Position};

use crate::error::WorldError;

/// One entry of the controlling-light table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproachEntry {
    /// Spawn cell of the approaching vehicles.
    pub spawn: Position,
    /// Position of the light those vehicles obey.
    pub light: Position,
}

/// A cell where reckless drivers may change heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPoint {
    /// The cell that triggers the turn.
    pub at: Position,
    /// The heading taken when the turn happens.
    pub direction: Direction,
}

/// The fixed tables of the road network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadLayout {
    /// One light per intersection approach, in signal-cycle order.
    #[serde(default = "default_light_positions")]
    pub light_positions: Vec<Position>,

    /// Spawn cell -> controlling light.
    #[serde(default = "default_approaches")]
    pub approaches: Vec<ApproachEntry>,

    /// Reckless turn points. When a cell appears twice the later entry wins.
    #[serde(default = "default_turn_points")]
    pub turn_points: Vec<TurnPoint>,

    /// Pedestrian waypoint loop.
    #[serde(default = "default_waypoints")]
    pub waypoints: Vec<Position>,

    /// Cells where vehicles enter the grid.
    #[serde(default = "default_spawn_cells")]
    pub spawn_cells: Vec<Position>,
}

impl Default for RoadLayout {
    fn default() -> Self {
        Self {
            light_positions: default_light_positions(),
            approaches: default_approaches(),
            turn_points: default_turn_points(),
            waypoints: default_waypoints(),
            spawn_cells: default_spawn_cells(),
        }
    }
}

impl RoadLayout {
    /// Check every table against a grid of side `size`.
    ///
    /// Requires at least one light and one waypoint, every listed position
    /// on the lattice, and every spawn cell on a grid edge.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidLayout`] describing the first problem.
    pub fn validate(&self, size: i32) -> Result<(), WorldError> {
        if self.light_positions.is_empty() {
            return Err(invalid("at least one traffic light is required"));
        }
        if self.waypoints.is_empty() {
            return Err(invalid("pedestrian waypoint loop is empty"));
        }
        let on_grid =
            |pos: &Position| pos.x >= 0 && pos.y >= 0 && pos.x < size && pos.y < size;
        let tables = self
            .light_positions
            .iter()
            .chain(self.approaches.iter().flat_map(|a| [&a.spawn, &a.light]))
            .chain(self.turn_points.iter().map(|t| &t.at))
            .chain(self.waypoints.iter())
            .chain(self.spawn_cells.iter());
        for pos in tables {
            if !on_grid(pos) {
                return Err(invalid(&format!(
                    "position {pos} is outside the {size}x{size} grid"
                )));
            }
        }
        if let Some(spawn) = self
            .spawn_cells
            .iter()
            .find(|spawn| Direction::from_spawn_edge(**spawn, size).is_none())
        {
            return Err(invalid(&format!("spawn cell {spawn} is not on a grid edge")));
        }
        Ok(())
    }

    /// Light controlling vehicles that spawned at `spawn`, if any.
    pub fn controlling_light(&self, spawn: Position) -> Option<Position> {
        self.approaches
            .iter()
            .find(|entry| entry.spawn == spawn)
            .map(|entry| entry.light)
    }

    /// Spawn cells whose approach is controlled by `light`.
    pub fn approaches_for(&self, light: Position) -> Vec<Position> {
        self.approaches
            .iter()
            .filter(|entry| entry.light == light)
            .map(|entry| entry.spawn)
            .collect()
    }

    /// Heading a reckless driver may switch to at `pos`.
    pub fn turn_at(&self, pos: Position) -> Option<Direction> {
        self.turn_points
            .iter()
            .rev()
            .find(|turn| turn.at == pos)
            .map(|turn| turn.direction)
    }
}

fn invalid(reason: &str) -> WorldError {
    WorldError::InvalidLayout {
        reason: reason.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Reference tables (23x23 map)
// ---------------------------------------------------------------------------

fn default_light_positions() -> Vec<Position> {
    vec![
        Position::new(9, 15),
        Position::new(15, 13),
        Position::new(13, 7),
        Position::new(7, 9),
    ]
}

fn default_approaches() -> Vec<ApproachEntry> {
    let lanes: [((i32, i32), (i32, i32)); 12] = [
        ((8, 22), (9, 15)),
        ((9, 22), (9, 15)),
        ((10, 22), (9, 15)),
        ((22, 12), (15, 13)),
        ((22, 13), (15, 13)),
        ((22, 14), (15, 13)),
        ((12, 0), (13, 7)),
        ((13, 0), (13, 7)),
        ((14, 0), (13, 7)),
        ((0, 8), (7, 9)),
        ((0, 9), (7, 9)),
        ((0, 10), (7, 9)),
    ];
    lanes
        .into_iter()
        .map(|(spawn, light)| ApproachEntry {
            spawn: spawn.into(),
            light: light.into(),
        })
        .collect()
}

fn default_turn_points() -> Vec<TurnPoint> {
    let points: [((i32, i32), Direction); 11] = [
        // Heading down, swing right.
        ((9, 11), Direction::Right),
        ((10, 11), Direction::Right),
        ((11, 11), Direction::Right),
        // Heading up, swing left.
        ((13, 14), Direction::Left),
        ((14, 14), Direction::Left),
        // Heading right, swing up.
        ((13, 10), Direction::Up),
        ((13, 9), Direction::Up),
        ((15, 11), Direction::Up),
        // Heading left, swing right.
        ((10, 13), Direction::Right),
        ((10, 14), Direction::Right),
        ((15, 14), Direction::Right),
    ];
    points
        .into_iter()
        .map(|(at, direction)| TurnPoint {
            at: at.into(),
            direction,
        })
        .collect()
}

fn default_waypoints() -> Vec<Position> {
    [
        (7, 7),
        (11, 7),
        (15, 7),
        (7, 11),
        (15, 11),
        (15, 15),
        (11, 15),
        (7, 15),
    ]
    .into_iter()
    .map(Position::from)
    .collect()
}

fn default_spawn_cells() -> Vec<Position> {
    default_approaches()
        .into_iter()
        .map(|entry| entry.spawn)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reference_layout_is_valid_on_23_grid() {
        let layout = RoadLayout::default();
        assert!(layout.validate(23).is_ok());
        assert_eq!(layout.approaches.len(), 12);
        assert_eq!(layout.light_positions.len(), 4);
        assert_eq!(layout.waypoints.len(), 8);
    }

    #[test]
    fn reference_layout_does_not_fit_small_grid() {
        assert!(RoadLayout::default().validate(15).is_err());
    }

    #[test]
    fn interior_spawn_cell_is_rejected() {
        let layout = RoadLayout {
            spawn_cells: vec![Position::new(5, 5)],
            ..RoadLayout::default()
        };
        assert!(matches!(
            layout.validate(23),
            Err(WorldError::InvalidLayout { .. })
        ));
    }

    #[test]
    fn controlling_light_lookup_and_reverse() {
        let layout = RoadLayout::default();
        assert_eq!(
            layout.controlling_light(Position::new(13, 0)),
            Some(Position::new(13, 7))
        );
        assert_eq!(layout.controlling_light(Position::new(1, 1)), None);
        assert_eq!(
            layout.approaches_for(Position::new(7, 9)),
            vec![Position::new(0, 8), Position::new(0, 9), Position::new(0, 10)]
        );
    }

    #[test]
    fn later_turn_point_wins() {
        let mut layout = RoadLayout::default();
        layout.turn_points.push(TurnPoint {
            at: Position::new(9, 11),
            direction: Direction::Down,
        });
        assert_eq!(layout.turn_at(Position::new(9, 11)), Some(Direction::Down));
        assert_eq!(layout.turn_at(Position::new(15, 14)), Some(Direction::Right));
        assert_eq!(layout.turn_at(Position::new(0, 0)), None);
    }

    #[test]
    fn layout_overrides_from_json() {
        let layout: RoadLayout =
            serde_json::from_str(r#"{"light_positions": [[1, 1]]}"#).unwrap();
        assert_eq!(layout.light_positions, vec![Position::new(1, 1)]);
        assert_eq!(layout.waypoints.len(), 8);
    }
}
