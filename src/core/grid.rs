//! Flat rectangular cell array with occupancy and permanent hit flags.
//!
//! Cells are stored x-major: the cell at `(x, y)` lives at index
//! `x * height + y`. Every accessor bounds-checks before indexing.

use alloc::vec::Vec;

use crate::core::common::{Coord, GameError};
use crate::core::config::GridSetup;
use crate::core::ship::ShipId;

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    position: Coord,
    occupant: Option<ShipId>,
    was_hit_once: bool,
}

impl Cell {
    pub fn new(position: Coord) -> Self {
        Self {
            position,
            occupant: None,
            was_hit_once: false,
        }
    }

    pub(crate) fn with_state(position: Coord, occupant: Option<ShipId>, was_hit_once: bool) -> Self {
        Self {
            position,
            occupant,
            was_hit_once,
        }
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    /// Non-owning reference to the alive ship covering this cell.
    pub fn occupant(&self) -> Option<ShipId> {
        self.occupant
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn was_hit_once(&self) -> bool {
        self.was_hit_once
    }
}

/// A player's battlefield.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    setup: GridSetup,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(setup: GridSetup) -> Self {
        let mut cells = Vec::with_capacity(setup.cell_count());
        for x in 0..setup.width as i32 {
            for y in 0..setup.height as i32 {
                cells.push(Cell::new(Coord::new(x, y)));
            }
        }
        Self { setup, cells }
    }

    /// Rebuild a grid from cells already laid out in flat-index order.
    pub(crate) fn from_cells(setup: GridSetup, cells: Vec<Cell>) -> Result<Self, GameError> {
        if cells.len() != setup.cell_count() {
            return Err(GameError::SnapshotMismatch("cell count does not match grid size"));
        }
        let grid = Self { setup, cells };
        for (i, cell) in grid.cells.iter().enumerate() {
            let p = cell.position();
            if grid.flat_index(p.x, p.y) != Some(i) {
                return Err(GameError::SnapshotMismatch("cell position does not match its index"));
            }
        }
        Ok(grid)
    }

    pub fn setup(&self) -> &GridSetup {
        &self.setup
    }

    pub fn width(&self) -> i32 {
        self.setup.width as i32
    }

    pub fn height(&self) -> i32 {
        self.setup.height as i32
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() && y < self.height()
    }

    pub fn flat_index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(x as usize * self.setup.height as usize + y as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.flat_index(x, y).map(|i| &self.cells[i])
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Result<&mut Cell, GameError> {
        match self.flat_index(x, y) {
            Some(i) => Ok(&mut self.cells[i]),
            None => Err(GameError::OutOfBounds { x, y }),
        }
    }

    /// `true` iff the cell exists and no alive ship occupies it.
    pub fn is_free(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_some_and(Cell::is_free)
    }

    pub fn occupant(&self, x: i32, y: i32) -> Option<ShipId> {
        self.cell(x, y).and_then(Cell::occupant)
    }

    /// Assign an occupant. Occupancy is not re-checked; placement is
    /// validated upstream.
    pub fn connect_ship(&mut self, x: i32, y: i32, ship: ShipId) -> Result<(), GameError> {
        self.cell_mut(x, y)?.occupant = Some(ship);
        Ok(())
    }

    /// Drop the occupant reference. The hit flag is untouched.
    pub fn clear_cell(&mut self, x: i32, y: i32) -> Result<(), GameError> {
        self.cell_mut(x, y)?.occupant = None;
        Ok(())
    }

    /// Flag the cell as targeted. The flag is never cleared.
    pub fn mark_hit_once(&mut self, x: i32, y: i32) -> Result<(), GameError> {
        self.cell_mut(x, y)?.was_hit_once = true;
        Ok(())
    }

    pub fn was_hit_once(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_some_and(Cell::was_hit_once)
    }

    /// World position of a cell, or `None` outside the grid.
    pub fn world_origin(&self, x: i32, y: i32) -> Option<(f32, f32)> {
        self.cell(x, y)
            .map(|c| self.setup.world_origin(c.position()))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_free()).count()
    }

    pub fn hit_count(&self) -> usize {
        self.cells.iter().filter(|c| c.was_hit_once()).count()
    }
}

