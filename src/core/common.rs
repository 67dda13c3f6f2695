//! Common types for the engine: coordinates, player slots, phases, hit
//! outcomes and the error type shared by every core operation.

use core::fmt;

use crate::core::ship::{ShipId, ShipKind};

/// Absolute grid coordinate.
///
/// Signed so that probes one step outside the grid (adjacency rails, the
/// cell behind a ship's origin) stay representable and can be bounds-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate shifted by `(dx, dy)`. Saturates at the edges of `i32`,
    /// which always lie outside any grid.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Stable per-match seat of a player. Only slots 0 and 1 exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerSlot(pub u8);

impl PlayerSlot {
    pub const FIRST: PlayerSlot = PlayerSlot(0);
    pub const SECOND: PlayerSlot = PlayerSlot(1);

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other seat of a two-player match.
    pub const fn opponent(self) -> PlayerSlot {
        PlayerSlot(1 - (self.0 & 1))
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// Shared match phase, advanced only by the authoritative coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum GamePhase {
    #[default]
    Wait,
    Build,
    Combat,
    GameOver,
}

/// Per-player result once the match is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum GameOutcome {
    Win,
    Lose,
    Tie,
}

/// Outcome of a single fire command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum HitResult {
    /// Nothing occupied the target cell.
    Miss,
    /// A ship was hit and still has health left.
    Damaged,
    /// The hit took the ship's last point of health.
    Killed,
}

/// Errors returned by grid, registry, placement, combat and coordinator
/// operations. None of them leave state partially mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Coordinate lies outside the grid.
    OutOfBounds { x: i32, y: i32 },
    /// Placement path crosses a cell already holding a ship.
    CellOccupied { x: i32, y: i32 },
    /// Placement would touch another ship (including diagonally).
    ShipAdjacent { x: i32, y: i32 },
    /// Every instance of this ship kind is already placed.
    NoShipsAvailable(ShipKind),
    /// Build submission while ships remain unplaced.
    FleetIncomplete,
    /// Combat submission without a stored target.
    NoTargetSelected,
    /// The attacker already fired at this cell.
    AlreadyTargeted { x: i32, y: i32 },
    /// Occupancy referenced a ship instance the registry does not hold.
    InvalidShipIndex(ShipId),
    /// Occupancy referenced a ship that is already sunk.
    ShipAlreadySunk(ShipId),
    /// Operation is not allowed in the current phase.
    WrongPhase(GamePhase),
    /// The player already submitted for this round.
    AlreadySubmitted,
    /// Both player slots are taken.
    MatchFull,
    /// No player occupies the given slot.
    UnknownPlayer(PlayerSlot),
    /// A received snapshot does not describe a consistent state.
    SnapshotMismatch(&'static str),
    /// Match configuration is unusable.
    InvalidConfig(&'static str),
}

impl GameError {
    /// Errors that indicate client/server state corruption rather than a
    /// rejected player action.
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            GameError::InvalidShipIndex(_)
                | GameError::ShipAlreadySunk(_)
                | GameError::SnapshotMismatch(_)
        )
    }

    /// The three ways a placement attempt can be geometrically illegal.
    pub fn is_invalid_placement(&self) -> bool {
        matches!(
            self,
            GameError::OutOfBounds { .. }
                | GameError::CellOccupied { .. }
                | GameError::ShipAdjacent { .. }
        )
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::OutOfBounds { x, y } => write!(f, "Cell ({}, {}) is outside the grid", x, y),
            GameError::CellOccupied { x, y } => {
                write!(f, "Cannot place ship here: cell ({}, {}) is occupied", x, y)
            }
            GameError::ShipAdjacent { x, y } => {
                write!(f, "Cannot place ship here: it would touch the ship at ({}, {})", x, y)
            }
            GameError::NoShipsAvailable(kind) => {
                write!(f, "Out of ships for the selected type ({})", kind.name())
            }
            GameError::FleetIncomplete => write!(f, "You need to place all ships to progress"),
            GameError::NoTargetSelected => write!(f, "You need to select a cell to hit"),
            GameError::AlreadyTargeted { x, y } => {
                write!(f, "You cannot hit the same cell twice ({}, {})", x, y)
            }
            GameError::InvalidShipIndex(id) => write!(f, "Ship instance index {} is out of range", id),
            GameError::ShipAlreadySunk(id) => write!(f, "Ship instance {} is already sunk", id),
            GameError::WrongPhase(phase) => write!(f, "Action not allowed during {:?}", phase),
            GameError::AlreadySubmitted => write!(f, "Already submitted for this round"),
            GameError::MatchFull => write!(f, "Maximum connected player count reached"),
            GameError::UnknownPlayer(slot) => write!(f, "No {} in this match", slot),
            GameError::SnapshotMismatch(what) => write!(f, "Snapshot desync: {}", what),
            GameError::InvalidConfig(what) => write!(f, "Invalid match configuration: {}", what),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GameError {}
