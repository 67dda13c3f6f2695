//! Placement rules: the main path must be in range and free, and the ring of
//! cells around it must not hold another ship.
//!
//! The ring is built from the cell behind the origin, the cell beyond the
//! tail, and two rails of `size + 2` cells running parallel to the ship on
//! either side (the rails cover the diagonal corners). Ring cells outside the
//! grid count as free; main-path cells outside the grid always fail.

use alloc::vec::Vec;

use crate::core::common::{Coord, GameError};
use crate::core::grid::Grid;
use crate::core::ship::Orientation;

/// Every coordinate a placement check visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footprint {
    /// Cells the ship covers, origin first.
    pub main: Vec<Coord>,
    /// Surrounding ring. May include coordinates outside the grid.
    pub adjacent: Vec<Coord>,
}

impl Footprint {
    /// Ring cells that exist on `grid`.
    pub fn adjacent_in_bounds<'a>(&'a self, grid: &'a Grid) -> impl Iterator<Item = Coord> + 'a {
        self.adjacent
            .iter()
            .copied()
            .filter(move |c| grid.in_bounds(c.x, c.y))
    }
}

/// 90° clockwise rotation of a direction vector.
pub const fn rotate_cw((dx, dy): (i32, i32)) -> (i32, i32) {
    (dy, -dx)
}

/// Pure geometry of a ship of `size` at `origin`; no grid involved.
pub fn footprint(origin: Coord, size: usize, orientation: Orientation) -> Footprint {
    let (dx, dy) = orientation.direction();
    let len = size as i32;

    let main = (0..len).map(|i| origin.offset(i * dx, i * dy)).collect();

    let mut adjacent = Vec::with_capacity(2 * (size + 2) + 2);
    let behind = origin.offset(-dx, -dy);
    adjacent.push(behind);

    let (rx, ry) = rotate_cw((dx, dy));
    for rail_start in [behind.offset(rx, ry), behind.offset(-rx, -ry)] {
        for i in 0..len + 2 {
            adjacent.push(rail_start.offset(i * dx, i * dy));
        }
    }

    adjacent.push(origin.offset(len * dx, len * dy));

    Footprint { main, adjacent }
}

/// Check a placement, reporting the first violated rule.
pub fn check_placement(
    grid: &Grid,
    origin: Coord,
    size: usize,
    orientation: Orientation,
) -> Result<(), GameError> {
    if !grid.in_bounds(origin.x, origin.y) {
        return Err(GameError::OutOfBounds {
            x: origin.x,
            y: origin.y,
        });
    }
    scan_placement(grid, origin, size, orientation).0
}

/// `true` iff a ship of `size` may be placed at `origin`.
pub fn can_place_ship(grid: &Grid, origin: Coord, size: usize, orientation: Orientation) -> bool {
    check_placement(grid, origin, size, orientation).is_ok()
}

/// Check a placement and also return every coordinate visited, for callers
/// that need the ring for other purposes.
pub fn scan_placement(
    grid: &Grid,
    origin: Coord,
    size: usize,
    orientation: Orientation,
) -> (Result<(), GameError>, Footprint) {
    let fp = footprint(origin, size, orientation);
    let verdict = verdict(grid, &fp);
    (verdict, fp)
}

fn verdict(grid: &Grid, fp: &Footprint) -> Result<(), GameError> {
    for c in &fp.main {
        if !grid.in_bounds(c.x, c.y) {
            return Err(GameError::OutOfBounds { x: c.x, y: c.y });
        }
        if !grid.is_free(c.x, c.y) {
            return Err(GameError::CellOccupied { x: c.x, y: c.y });
        }
    }
    for c in &fp.adjacent {
        if grid.in_bounds(c.x, c.y) && !grid.is_free(c.x, c.y) {
            return Err(GameError::ShipAdjacent { x: c.x, y: c.y });
        }
    }
    Ok(())
}
