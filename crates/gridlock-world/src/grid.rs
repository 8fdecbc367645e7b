//! The toroidal lattice every agent lives on.
//!
//! [`GridSpace`] is a square grid whose coordinates wrap at both edges. A
//! cell may hold any number of agents; the rules about who may *enter* a
//! cell belong to the behaviours, not to the grid. Relocation is
//! unconditional, so callers validate before they move.
//!
//! Internally each cell keeps its occupants in arrival order
//! (`Vec<AgentId>` per cell, row-major) and a reverse index maps every
//! agent to its current cell.

use std::collections::BTreeMap;

use gridlock_types::{AgentId, Position};

use crate::error::WorldError;

/// Square multi-occupancy lattice of side `size` with torus wrapping.
#[derive(Debug, Clone)]
pub struct GridSpace {
    /// Side length.
    size: i32,
    /// Occupants per cell, indexed `x + y * size`.
    cells: Vec<Vec<AgentId>>,
    /// Reverse index: agent -> current cell.
    positions: BTreeMap<AgentId, Position>,
}

impl GridSpace {
    /// Create an empty `size` x `size` grid.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidGridSize`] if `size` is not positive.
    pub fn new(size: i32) -> Result<Self, WorldError> {
        let side = usize::try_from(size).map_err(|_err| WorldError::InvalidGridSize(size))?;
        if side == 0 {
            return Err(WorldError::InvalidGridSize(size));
        }
        let cell_count = side
            .checked_mul(side)
            .ok_or(WorldError::InvalidGridSize(size))?;
        Ok(Self {
            size,
            cells: vec![Vec::new(); cell_count],
            positions: BTreeMap::new(),
        })
    }

    /// Return the side length.
    pub const fn size(&self) -> i32 {
        self.size
    }

    /// Return the number of placed agents.
    pub fn agent_count(&self) -> usize {
        self.positions.len()
    }

    // -------------------------------------------------------------------
    // Coordinates
    // -------------------------------------------------------------------

    /// Normalize a position onto the torus.
    pub fn wrap(&self, pos: Position) -> Position {
        Position::new(
            pos.x.checked_rem_euclid(self.size).unwrap_or(0),
            pos.y.checked_rem_euclid(self.size).unwrap_or(0),
        )
    }

    /// Whether `pos` lies outside `[0, size)` on either axis (before wrapping).
    pub const fn is_out_of_bounds(&self, pos: Position) -> bool {
        pos.x < 0 || pos.y < 0 || pos.x >= self.size || pos.y >= self.size
    }

    /// Row-major cell index for an in-bounds position.
    fn index(&self, pos: Position) -> Option<usize> {
        if self.is_out_of_bounds(pos) {
            return None;
        }
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        let side = usize::try_from(self.size).ok()?;
        y.checked_mul(side)?.checked_add(x)
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Occupants of the cell at `pos`, in arrival order.
    ///
    /// Out-of-bounds positions are empty; wrap first for torus lookups.
    pub fn cell(&self, pos: Position) -> &[AgentId] {
        self.index(pos)
            .and_then(|idx| self.cells.get(idx))
            .map_or(&[], Vec::as_slice)
    }

    /// Current cell of `agent`, if placed.
    pub fn position_of(&self, agent: AgentId) -> Option<Position> {
        self.positions.get(&agent).copied()
    }

    /// Agents in the cells surrounding `pos` (radius 1, centre excluded).
    ///
    /// With `include_diagonals` the Moore neighbourhood is used, otherwise
    /// the von Neumann one. Neighbour cells wrap around the torus; on grids
    /// smaller than 3 a wrapped cell is visited only once.
    pub fn neighbors(&self, pos: Position, include_diagonals: bool) -> Vec<AgentId> {
        let centre = self.wrap(pos);
        let mut visited: Vec<Position> = Vec::with_capacity(8);
        let mut found = Vec::new();
        for dy in -1..=1_i32 {
            for dx in -1..=1_i32 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if !include_diagonals && dx != 0 && dy != 0 {
                    continue;
                }
                let cell = self.wrap(centre.offset(dx, dy));
                if cell == centre || visited.contains(&cell) {
                    continue;
                }
                visited.push(cell);
                found.extend_from_slice(self.cell(cell));
            }
        }
        found
    }

    // -------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------

    /// Put a new agent on the grid.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `pos` is off the lattice, or
    /// [`WorldError::AgentAlreadyPlaced`] if the agent already has a cell.
    pub fn place(&mut self, agent: AgentId, pos: Position) -> Result<(), WorldError> {
        if self.positions.contains_key(&agent) {
            return Err(WorldError::AgentAlreadyPlaced(agent));
        }
        let idx = self.index(pos).ok_or(WorldError::OutOfBounds {
            position: pos,
            size: self.size,
        })?;
        let cell = self.cells.get_mut(idx).ok_or(WorldError::OutOfBounds {
            position: pos,
            size: self.size,
        })?;
        cell.push(agent);
        self.positions.insert(agent, pos);
        Ok(())
    }

    /// Relocate an agent to `to` (wrapped onto the torus) without checking
    /// what is already there. Returns the normalized destination.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentNotPlaced`] if the agent has no cell.
    pub fn move_agent(&mut self, agent: AgentId, to: Position) -> Result<Position, WorldError> {
        let from = self
            .positions
            .get(&agent)
            .copied()
            .ok_or(WorldError::AgentNotPlaced(agent))?;
        let dest = self.wrap(to);
        if dest == from {
            return Ok(dest);
        }
        if let Some(cell) = self.index(from).and_then(|idx| self.cells.get_mut(idx)) {
            cell.retain(|id| *id != agent);
        }
        let idx = self.index(dest).ok_or(WorldError::OutOfBounds {
            position: dest,
            size: self.size,
        })?;
        if let Some(cell) = self.cells.get_mut(idx) {
            cell.push(agent);
        }
        self.positions.insert(agent, dest);
        Ok(dest)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid() -> GridSpace {
        GridSpace::new(5).unwrap()
    }

    #[test]
    fn rejects_non_positive_size() {
        assert!(GridSpace::new(0).is_err());
        assert!(GridSpace::new(-3).is_err());
    }

    #[test]
    fn wrap_normalizes_both_axes() {
        let g = grid();
        assert_eq!(g.wrap(Position::new(5, -1)), Position::new(0, 4));
        assert_eq!(g.wrap(Position::new(-6, 12)), Position::new(4, 2));
        assert_eq!(g.wrap(Position::new(2, 3)), Position::new(2, 3));
    }

    #[test]
    fn bounds_check_does_not_wrap() {
        let g = grid();
        assert!(g.is_out_of_bounds(Position::new(5, 0)));
        assert!(g.is_out_of_bounds(Position::new(0, -1)));
        assert!(!g.is_out_of_bounds(Position::new(4, 4)));
    }

    #[test]
    fn cells_hold_multiple_agents_in_arrival_order() {
        let mut g = grid();
        let pos = Position::new(1, 1);
        g.place(AgentId::new(3), pos).unwrap();
        g.place(AgentId::new(1), pos).unwrap();
        assert_eq!(g.cell(pos), &[AgentId::new(3), AgentId::new(1)]);
        assert_eq!(g.agent_count(), 2);
    }

    #[test]
    fn place_twice_fails() {
        let mut g = grid();
        g.place(AgentId::new(0), Position::new(0, 0)).unwrap();
        assert!(matches!(
            g.place(AgentId::new(0), Position::new(1, 0)),
            Err(WorldError::AgentAlreadyPlaced(_))
        ));
        assert!(g.place(AgentId::new(1), Position::new(9, 0)).is_err());
    }

    #[test]
    fn move_agent_wraps_and_updates_both_indices() {
        let mut g = grid();
        let id = AgentId::new(0);
        g.place(id, Position::new(4, 2)).unwrap();
        let dest = g.move_agent(id, Position::new(5, 2)).unwrap();
        assert_eq!(dest, Position::new(0, 2));
        assert_eq!(g.position_of(id), Some(Position::new(0, 2)));
        assert!(g.cell(Position::new(4, 2)).is_empty());
        assert_eq!(g.cell(Position::new(0, 2)), &[id]);
    }

    #[test]
    fn moving_unplaced_agent_fails() {
        let mut g = grid();
        assert!(matches!(
            g.move_agent(AgentId::new(7), Position::new(0, 0)),
            Err(WorldError::AgentNotPlaced(_))
        ));
    }

    #[test]
    fn neighbors_respect_diagonal_flag_and_wrap() {
        let mut g = grid();
        g.place(AgentId::new(0), Position::new(0, 0)).unwrap();
        g.place(AgentId::new(1), Position::new(4, 4)).unwrap(); // diagonal across the seam
        g.place(AgentId::new(2), Position::new(0, 4)).unwrap(); // orthogonal across the seam
        g.place(AgentId::new(3), Position::new(2, 2)).unwrap(); // far away

        let moore = g.neighbors(Position::new(0, 0), true);
        assert!(moore.contains(&AgentId::new(1)));
        assert!(moore.contains(&AgentId::new(2)));
        assert!(!moore.contains(&AgentId::new(0)));
        assert!(!moore.contains(&AgentId::new(3)));

        let von_neumann = g.neighbors(Position::new(0, 0), false);
        assert_eq!(von_neumann, vec![AgentId::new(2)]);
    }
}
