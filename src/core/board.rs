//! A player's local game state: one grid plus one ship registry.

use crate::core::common::{Coord, GameError};
use crate::core::config::MatchConfig;
use crate::core::grid::Grid;
use crate::core::placement;
use crate::core::registry::ShipRegistry;
use crate::core::ship::{Orientation, ShipId, ShipKind};
use crate::core::snapshot::Snapshot;

/// Payload handed to the visual layer after a successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementEvent {
    pub ship_id: ShipId,
    pub kind: ShipKind,
    pub origin: Coord,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBoard {
    grid: Grid,
    registry: ShipRegistry,
}

impl PlayerBoard {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            grid: Grid::new(config.grid),
            registry: ShipRegistry::new(config.fleet),
        }
    }

    pub(crate) fn from_parts(grid: Grid, registry: ShipRegistry) -> Self {
        Self { grid, registry }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn registry(&self) -> &ShipRegistry {
        &self.registry
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Grid, &mut ShipRegistry) {
        (&mut self.grid, &mut self.registry)
    }

    /// Validate and place one ship. Nothing changes unless every check passes.
    pub fn place_ship(
        &mut self,
        kind: ShipKind,
        origin: Coord,
        orientation: Orientation,
    ) -> Result<PlacementEvent, GameError> {
        if self.registry.available(kind) == 0 {
            return Err(GameError::NoShipsAvailable(kind));
        }
        placement::check_placement(&self.grid, origin, kind.size(), orientation)?;

        let ship = self.registry.create_ship(kind, origin, orientation)?;
        for cell in ship.cells() {
            self.grid.connect_ship(cell.x, cell.y, ship.id())?;
        }
        log::debug!(
            "placed {} ship {} at {} ({:?})",
            kind.name(),
            ship.id(),
            origin,
            orientation
        );
        Ok(PlacementEvent {
            ship_id: ship.id(),
            kind,
            origin,
            orientation,
        })
    }

    /// Serialize into a wire snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    /// Rebuild from a received snapshot, replacing all prior contents.
    pub fn from_snapshot(config: &MatchConfig, snapshot: &Snapshot) -> Result<Self, GameError> {
        snapshot.restore(config)
    }

    /// Re-run every placement described by a Build-phase snapshot through the
    /// placement rules on a fresh board. The snapshot must be exactly what
    /// those placements produce.
    pub fn replay_placements(config: &MatchConfig, snapshot: &Snapshot) -> Result<Self, GameError> {
        snapshot.validate(config)?;
        let mut board = Self::new(config);
        for ship in &snapshot.ships {
            board
                .place_ship(ship.kind(), ship.origin(), ship.orientation())
                .map_err(|e| {
                    log::warn!("replayed placement of ship {} rejected: {}", ship.id(), e);
                    GameError::SnapshotMismatch("fleet placement breaks the placement rules")
                })?;
        }
        if board.snapshot() != *snapshot {
            return Err(GameError::SnapshotMismatch(
                "build snapshot does not match its placements",
            ));
        }
        Ok(board)
    }
}
