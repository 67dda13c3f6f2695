//! Fire-command resolution against an opponent's board.

use alloc::vec::Vec;

use crate::core::board::PlayerBoard;
use crate::core::common::{Coord, GameError, HitResult};
use crate::core::grid::Grid;
use crate::core::placement;
use crate::core::ship::{Orientation, ShipInstance, ShipKind};

/// Whose shot a record describes, from the receiving player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Perspective {
    /// The receiver fired this shot.
    Own,
    /// The opponent fired at the receiver's board.
    Opponent,
}

/// Metadata needed to render a sunk ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct SunkShip {
    pub kind: ShipKind,
    pub origin: Coord,
    pub orientation: Orientation,
}

impl SunkShip {
    pub fn size(&self) -> usize {
        self.kind.size()
    }
}

impl From<&ShipInstance> for SunkShip {
    fn from(ship: &ShipInstance) -> Self {
        Self {
            kind: ship.kind(),
            origin: ship.origin(),
            orientation: ship.orientation(),
        }
    }
}

/// One entry of the visual layer's hit queue. Coordinates are absolute, so
/// re-rendering a record is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct HitRecord {
    pub outcome: HitResult,
    pub target: Coord,
    pub perspective: Perspective,
    /// Set on `Killed` records delivered to the defender.
    pub sunk: Option<SunkShip>,
}

impl HitRecord {
    pub fn own(outcome: HitResult, target: Coord) -> Self {
        Self {
            outcome,
            target,
            perspective: Perspective::Own,
            sunk: None,
        }
    }

    pub fn opponent(outcome: HitResult, target: Coord, sunk: Option<SunkShip>) -> Self {
        Self {
            outcome,
            target,
            perspective: Perspective::Opponent,
            sunk,
        }
    }
}

/// Notifications produced by one fire command, split by recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FireReport {
    pub attacker: Vec<HitRecord>,
    pub defender: Vec<HitRecord>,
}

impl FireReport {
    /// Outcome of the shot itself (the first attacker record).
    pub fn outcome(&self) -> Option<HitResult> {
        self.attacker.first().map(|r| r.outcome)
    }
}

/// Resolve one shot at `target`.
///
/// The attacker's own grid carries its targeting history: `was_hit_once`
/// flags there mean "already fired at this coordinate". All checks run
/// before anything is mutated.
pub fn resolve_fire(
    attacker: &mut PlayerBoard,
    defender: &mut PlayerBoard,
    target: Coord,
) -> Result<FireReport, GameError> {
    let Coord { x, y } = target;
    if !defender.grid().in_bounds(x, y) || !attacker.grid().in_bounds(x, y) {
        return Err(GameError::OutOfBounds { x, y });
    }
    if attacker.grid().was_hit_once(x, y) {
        return Err(GameError::AlreadyTargeted { x, y });
    }

    let mut report = FireReport::default();

    let Some(ship_id) = defender.grid().occupant(x, y) else {
        attacker.grid_mut().mark_hit_once(x, y)?;
        report.attacker.push(HitRecord::own(HitResult::Miss, target));
        log::debug!("shot at {} missed", target);
        return Ok(report);
    };

    let (defender_grid, registry) = defender.parts_mut();
    let outcome = registry.hit_ship(ship_id)?;
    attacker.grid_mut().mark_hit_once(x, y)?;

    match outcome {
        HitResult::Killed => {
            let ship = *registry
                .instance(ship_id)
                .ok_or(GameError::InvalidShipIndex(ship_id))?;
            for cell in ship.cells() {
                defender_grid.clear_cell(cell.x, cell.y)?;
            }
            report.attacker.push(HitRecord::own(HitResult::Killed, target));
            for cell in blind_reveal(attacker.grid(), &ship) {
                attacker.grid_mut().mark_hit_once(cell.x, cell.y)?;
                report.attacker.push(HitRecord::own(HitResult::Miss, cell));
            }
            report.defender.push(HitRecord::opponent(
                HitResult::Killed,
                target,
                Some(SunkShip::from(&ship)),
            ));
            log::debug!(
                "shot at {} sank {} ship {}, revealing {} cells",
                target,
                ship.kind().name(),
                ship_id,
                report.attacker.len() - 1
            );
        }
        _ => {
            report.attacker.push(HitRecord::own(HitResult::Damaged, target));
            report.defender.push(HitRecord::opponent(HitResult::Damaged, target, None));
            log::debug!("shot at {} damaged ship {}", target, ship_id);
        }
    }
    Ok(report)
}

/// Cells around a sunk ship the attacker has not targeted yet. They are
/// guaranteed misses under the no-touch placement rule.
pub fn blind_reveal(attacker_grid: &Grid, ship: &ShipInstance) -> Vec<Coord> {
    let fp = placement::footprint(ship.origin(), ship.size(), ship.orientation());
    fp.adjacent_in_bounds(attacker_grid)
        .filter(|c| !attacker_grid.was_hit_once(c.x, c.y))
        .collect()
}
