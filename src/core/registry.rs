//! Per-player ship instance registry: every instance created this match plus
//! per-kind available/alive counters.

use alloc::vec::Vec;

use crate::core::common::{Coord, GameError, HitResult};
use crate::core::ship::{Orientation, ShipId, ShipInstance, ShipKind, ShipType, SHIP_KIND_COUNT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipRegistry {
    fleet: [ShipType; SHIP_KIND_COUNT],
    available: [u32; SHIP_KIND_COUNT],
    current: [u32; SHIP_KIND_COUNT],
    instances: Vec<ShipInstance>,
    total: u32,
}

impl ShipRegistry {
    /// Empty registry with every ship of `fleet` still available.
    pub fn new(fleet: [ShipType; SHIP_KIND_COUNT]) -> Self {
        Self {
            fleet,
            available: fleet.map(|t| t.max_count()),
            current: [0; SHIP_KIND_COUNT],
            instances: Vec::new(),
            total: 0,
        }
    }

    /// Rebuild from synced parts, recomputing availability from the instance
    /// list and rejecting counters that disagree with it.
    pub(crate) fn from_parts(
        fleet: [ShipType; SHIP_KIND_COUNT],
        instances: Vec<ShipInstance>,
        current: [u32; SHIP_KIND_COUNT],
        total: u32,
    ) -> Result<Self, GameError> {
        let mut placed = [0u32; SHIP_KIND_COUNT];
        let mut alive = [0u32; SHIP_KIND_COUNT];
        for (i, ship) in instances.iter().enumerate() {
            if ship.id().index() != i {
                return Err(GameError::SnapshotMismatch("ship ids are not sequential"));
            }
            if ship.health() > ship.size() as u32 {
                return Err(GameError::SnapshotMismatch("ship health exceeds its size"));
            }
            placed[ship.kind().index()] += 1;
            if ship.is_alive() {
                alive[ship.kind().index()] += 1;
            }
        }
        if alive != current {
            return Err(GameError::SnapshotMismatch("alive ship counts disagree with instances"));
        }
        if current.iter().sum::<u32>() != total {
            return Err(GameError::SnapshotMismatch("total ship count disagrees with per-kind counts"));
        }
        let mut available = [0u32; SHIP_KIND_COUNT];
        for kind in ShipKind::ALL {
            let i = kind.index();
            available[i] = fleet[i]
                .max_count()
                .checked_sub(placed[i])
                .ok_or(GameError::SnapshotMismatch("more ships placed than the fleet allows"))?;
        }
        Ok(Self {
            fleet,
            available,
            current,
            instances,
            total,
        })
    }

    /// Create the next instance of `kind`. Fails without mutation when none
    /// of that kind remain available.
    pub fn create_ship(
        &mut self,
        kind: ShipKind,
        origin: Coord,
        orientation: Orientation,
    ) -> Result<ShipInstance, GameError> {
        let i = kind.index();
        if self.available[i] == 0 {
            log::debug!("no available ships of kind {}", kind.name());
            return Err(GameError::NoShipsAvailable(kind));
        }
        self.available[i] -= 1;
        self.current[i] += 1;
        self.total += 1;

        let ship = ShipInstance::new(ShipId(self.instances.len() as u32), kind, origin, orientation);
        self.instances.push(ship);
        Ok(ship)
    }

    /// Apply one point of damage to `id`.
    pub fn hit_ship(&mut self, id: ShipId) -> Result<HitResult, GameError> {
        let ship = self
            .instances
            .get_mut(id.index())
            .ok_or(GameError::InvalidShipIndex(id))?;
        if !ship.is_alive() {
            return Err(GameError::ShipAlreadySunk(id));
        }
        if ship.damage() > 0 {
            return Ok(HitResult::Damaged);
        }
        let kind = ship.kind().index();
        self.current[kind] -= 1;
        self.total -= 1;
        Ok(HitResult::Killed)
    }

    /// Losing condition: `false` once every placed ship is sunk.
    pub fn has_ships_remaining(&self) -> bool {
        self.total > 0
    }

    /// Whether any kind still has unplaced instances.
    pub fn has_available_ships_remaining(&self) -> bool {
        self.available.iter().any(|&n| n > 0)
    }

    pub fn available(&self, kind: ShipKind) -> u32 {
        self.available[kind.index()]
    }

    /// Alive instances of `kind`.
    pub fn current(&self, kind: ShipKind) -> u32 {
        self.current[kind.index()]
    }

    pub fn current_counts(&self) -> [u32; SHIP_KIND_COUNT] {
        self.current
    }

    /// Alive ships of every kind.
    pub fn total_alive(&self) -> u32 {
        self.total
    }

    pub fn instances(&self) -> &[ShipInstance] {
        &self.instances
    }

    pub fn instance(&self, id: ShipId) -> Option<&ShipInstance> {
        self.instances.get(id.index())
    }

    pub fn ship_type(&self, kind: ShipKind) -> ShipType {
        self.fleet[kind.index()]
    }

    pub fn fleet(&self) -> &[ShipType; SHIP_KIND_COUNT] {
        &self.fleet
    }
}
