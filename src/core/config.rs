use crate::core::common::{Coord, GameError};
use crate::core::ship::{ShipKind, ShipType, SHIP_KIND_COUNT};

/// Number of players a match waits for before leaving `Wait`.
pub const EXPECTED_PLAYERS: usize = 2;

pub const DEFAULT_GRID_WIDTH: u16 = 10;
pub const DEFAULT_GRID_HEIGHT: u16 = 10;
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

/// Standard fleet: four single-unit, three double-unit, two triple-unit and
/// one quadruple-unit ship.
pub const DEFAULT_FLEET: [ShipType; SHIP_KIND_COUNT] = [
    ShipType::new(ShipKind::Single, 4),
    ShipType::new(ShipKind::Double, 3),
    ShipType::new(ShipKind::Triple, 2),
    ShipType::new(ShipKind::Quadruple, 1),
];

/// Grid dimensions and world placement, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSetup {
    pub width: u16,
    pub height: u16,
    /// World-space spacing between adjacent cells.
    pub cell_size: f32,
    /// World position of cell (0, 0)'s bottom-left corner.
    pub origin: (f32, f32),
}

impl GridSetup {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bottom-left world position of a cell, for the visual layer.
    pub fn world_origin(&self, cell: Coord) -> (f32, f32) {
        (
            self.origin.0 + cell.x as f32 * self.cell_size,
            self.origin.1 + cell.y as f32 * self.cell_size,
        )
    }
}

impl Default for GridSetup {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            cell_size: DEFAULT_CELL_SIZE,
            origin: (0.0, 0.0),
        }
    }
}

/// Everything needed to create a match. Passed explicitly to the grid,
/// registry and coordinator constructors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchConfig {
    pub grid: GridSetup,
    /// Indexed by [`ShipKind::index`].
    pub fleet: [ShipType; SHIP_KIND_COUNT],
    /// Reject Build submissions while ships remain unplaced.
    pub require_full_fleet: bool,
    /// Ticks a player may keep the opponent waiting before forfeiting.
    pub submit_timeout_ticks: Option<u32>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            grid: GridSetup::default(),
            fleet: DEFAULT_FLEET,
            require_full_fleet: true,
            submit_timeout_ticks: None,
        }
    }
}

impl MatchConfig {
    pub fn with_grid(mut self, width: u16, height: u16) -> Self {
        self.grid.width = width;
        self.grid.height = height;
        self
    }

    /// Replace the fleet with per-kind counts, smallest kind first.
    pub fn with_fleet(mut self, counts: [u32; SHIP_KIND_COUNT]) -> Self {
        for kind in ShipKind::ALL {
            self.fleet[kind.index()] = ShipType::new(kind, counts[kind.index()]);
        }
        self
    }

    pub fn with_submit_timeout(mut self, ticks: Option<u32>) -> Self {
        self.submit_timeout_ticks = ticks;
        self
    }

    pub fn with_full_fleet_required(mut self, required: bool) -> Self {
        self.require_full_fleet = required;
        self
    }

    pub fn ship_type(&self, kind: ShipKind) -> ShipType {
        self.fleet[kind.index()]
    }

    /// Total number of ships a complete fleet holds, or `None` if that
    /// overflows `u32`.
    pub fn fleet_size(&self) -> Option<u32> {
        self.fleet
            .iter()
            .try_fold(0u32, |total, t| total.checked_add(t.max_count()))
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(GameError::InvalidConfig("grid dimensions must be non-zero"));
        }
        if !(self.grid.cell_size > 0.0) {
            return Err(GameError::InvalidConfig("cell size must be positive"));
        }
        match self.fleet_size() {
            None => return Err(GameError::InvalidConfig("fleet is too large")),
            Some(0) => return Err(GameError::InvalidConfig("fleet is empty")),
            Some(_) => {}
        }
        let longest_axis = self.grid.width.max(self.grid.height) as usize;
        for (i, ship_type) in self.fleet.iter().enumerate() {
            if ship_type.kind().index() != i {
                return Err(GameError::InvalidConfig("fleet is not ordered by ship kind"));
            }
            if ship_type.max_count() > 0 && ship_type.size() > longest_axis {
                return Err(GameError::InvalidConfig("ship does not fit in the grid"));
            }
        }
        if self.submit_timeout_ticks == Some(0) {
            return Err(GameError::InvalidConfig("submit timeout must be at least one tick"));
        }
        Ok(())
    }
}
