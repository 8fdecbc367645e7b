//! Static obstacle layer: the cross-shaped road network.
//!
//! Two perpendicular roads, each `2 * ROAD_HALF_WIDTH + 1` cells wide, cross
//! in the middle of the grid. Every cell off the roads is a building. The
//! middle row and column of each road act as a median and are built over
//! too, except inside the central square where the roads meet.

use gridlock_types::Position;

/// Cells on either side of the middle lane that belong to a road.
pub const ROAD_HALF_WIDTH: i32 = 3;

/// Whether `coord` lies inside the road band centred on `middle`.
const fn in_band(coord: i32, middle: i32) -> bool {
    coord.abs_diff(middle) <= ROAD_HALF_WIDTH.unsigned_abs()
}

/// Whether `pos` is drivable on a grid of side `size`.
pub const fn is_road(pos: Position, size: i32) -> bool {
    let middle = size / 2;
    let x_band = in_band(pos.x, middle);
    let y_band = in_band(pos.y, middle);
    if !(x_band || y_band) {
        return false;
    }
    let on_median = pos.x == middle || pos.y == middle;
    !on_median || (x_band && y_band)
}

/// Every building cell on a grid of side `size`, column by column.
pub fn building_cells(size: i32) -> Vec<Position> {
    let mut cells = Vec::new();
    for x in 0..size {
        for y in 0..size {
            let pos = Position::new(x, y);
            if !is_road(pos, size) {
                cells.push(pos);
            }
        }
    }
    tracing::debug!(size, buildings = cells.len(), "Obstacle layer laid out");
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_cells_and_lights_are_on_the_road() {
        for pos in [
            Position::new(8, 22),
            Position::new(22, 13),
            Position::new(12, 0),
            Position::new(0, 10),
            Position::new(9, 15),
            Position::new(15, 13),
        ] {
            assert!(is_road(pos, 23), "{pos} should be road");
        }
    }

    #[test]
    fn corners_and_medians_are_built_over() {
        assert!(!is_road(Position::new(0, 0), 23));
        assert!(!is_road(Position::new(7, 7), 23));
        assert!(!is_road(Position::new(11, 0), 23)); // median of the vertical road
        assert!(!is_road(Position::new(22, 11), 23)); // median of the horizontal road
    }

    #[test]
    fn centre_square_is_open() {
        for x in 8..=14 {
            for y in 8..=14 {
                assert!(is_road(Position::new(x, y), 23));
            }
        }
    }

    #[test]
    fn building_count_matches_geometry() {
        // 23x23 = 529 cells. Off-band: 16 * 16 = 256. Medians outside the
        // centre square: 4 arms * 8 cells = 32.
        assert_eq!(building_cells(23).len(), 256 + 32);
    }
}
