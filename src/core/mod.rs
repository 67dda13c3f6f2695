//! Core naval combat engine (no_std + alloc)
//!
//! Grid, fleet registry, placement rules, fire resolution, snapshots and the
//! authoritative turn coordinator. Nothing in here touches the network or a
//! clock; the coordinator is driven by explicit `tick` calls.

pub mod board;
pub mod combat;
pub mod common;
pub mod config;
pub mod coordinator;
pub mod grid;
pub mod placement;
pub mod player_state;
pub mod registry;
pub mod ship;
pub mod snapshot;

pub use board::{PlacementEvent, PlayerBoard};
pub use combat::{blind_reveal, resolve_fire, FireReport, HitRecord, Perspective, SunkShip};
pub use common::{Coord, GameError, GameOutcome, GamePhase, HitResult, PlayerSlot};
pub use config::*;
pub use coordinator::{MatchEvent, Outbound, RoundReport, TurnCoordinator};
pub use grid::{Cell, Grid};
pub use placement::{can_place_ship, check_placement, footprint, Footprint};
pub use player_state::{Command, PlayerState, Submission};
pub use registry::ShipRegistry;
pub use ship::{Orientation, ShipId, ShipInstance, ShipKind, ShipType, SHIP_KIND_COUNT};
pub use snapshot::{CellRecord, Snapshot};
