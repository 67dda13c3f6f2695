//! Full copy of one player's mutable state for network sync.
//!
//! Restoring is a replacement, never a merge, and every restore validates the
//! snapshot first so a desynced peer fails loudly instead of truncating.

use alloc::vec::Vec;

use crate::core::board::PlayerBoard;
use crate::core::common::{Coord, GameError};
use crate::core::config::MatchConfig;
use crate::core::grid::{Cell, Grid};
use crate::core::registry::ShipRegistry;
use crate::core::ship::{ShipId, ShipInstance, SHIP_KIND_COUNT};

/// One cell as sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRecord {
    pub position: Coord,
    pub occupant: Option<ShipId>,
    pub was_hit_once: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub width: u16,
    pub height: u16,
    /// Flat-index order.
    pub cells: Vec<CellRecord>,
    /// Every instance ever created, indexed by id.
    pub ships: Vec<ShipInstance>,
    pub current_counts: [u32; SHIP_KIND_COUNT],
    pub total_alive: u32,
}

impl Snapshot {
    pub fn capture(board: &PlayerBoard) -> Self {
        let grid = board.grid();
        let registry = board.registry();
        Self {
            width: grid.setup().width,
            height: grid.setup().height,
            cells: grid
                .cells()
                .iter()
                .map(|c| CellRecord {
                    position: c.position(),
                    occupant: c.occupant(),
                    was_hit_once: c.was_hit_once(),
                })
                .collect(),
            ships: registry.instances().to_vec(),
            current_counts: registry.current_counts(),
            total_alive: registry.total_alive(),
        }
    }

    /// `true` when no ship has been placed and no cell targeted.
    pub fn is_pristine(&self) -> bool {
        self.ships.is_empty() && self.cells.iter().all(|c| c.occupant.is_none() && !c.was_hit_once)
    }

    /// Check structural consistency against the match configuration.
    pub fn validate(&self, config: &MatchConfig) -> Result<(), GameError> {
        self.restore(config).map(|_| ())
    }

    /// Rebuild a board from this snapshot.
    pub fn restore(&self, config: &MatchConfig) -> Result<PlayerBoard, GameError> {
        if self.width != config.grid.width || self.height != config.grid.height {
            return Err(GameError::SnapshotMismatch("grid dimensions differ from the match"));
        }
        if self.cells.len() != config.grid.cell_count() {
            return Err(GameError::SnapshotMismatch("cell count does not match grid size"));
        }

        let registry = ShipRegistry::from_parts(
            config.fleet,
            self.ships.clone(),
            self.current_counts,
            self.total_alive,
        )?;

        let cells = self
            .cells
            .iter()
            .map(|c| Cell::with_state(c.position, c.occupant, c.was_hit_once))
            .collect();
        let grid = Grid::from_cells(config.grid, cells)?;

        check_occupancy(&grid, &registry)?;
        Ok(PlayerBoard::from_parts(grid, registry))
    }
}

/// Every ship, sunk or not, must lie on the grid. Occupants must be alive
/// ships, and every alive ship must cover exactly its own cells.
fn check_occupancy(grid: &Grid, registry: &ShipRegistry) -> Result<(), GameError> {
    for ship in registry.instances() {
        if !ship.cells().all(|c| grid.in_bounds(c.x, c.y)) {
            return Err(GameError::SnapshotMismatch("ship lies outside the grid"));
        }
    }
    for cell in grid.cells() {
        if let Some(id) = cell.occupant() {
            match registry.instance(id) {
                None => return Err(GameError::InvalidShipIndex(id)),
                Some(ship) if !ship.is_alive() => return Err(GameError::ShipAlreadySunk(id)),
                Some(_) => {}
            }
        }
    }
    let mut covered = 0usize;
    for ship in registry.instances().iter().filter(|s| s.is_alive()) {
        for c in ship.cells() {
            if grid.occupant(c.x, c.y) != Some(ship.id()) {
                return Err(GameError::SnapshotMismatch("alive ship is missing from its cells"));
            }
            covered += 1;
        }
    }
    if covered != grid.occupied_count() {
        return Err(GameError::SnapshotMismatch("grid holds occupants outside ship footprints"));
    }
    Ok(())
}
