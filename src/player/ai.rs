use alloc::vec::Vec;

use rand::{rngs::SmallRng, Rng};

use crate::core::{
    can_place_ship, Coord, GameError, HitRecord, HitResult, Orientation, Perspective, PlayerState,
    ShipKind,
};

use super::Controller;

const PLACEMENT_ATTEMPTS: usize = 100;
const NEIGHBOURS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Hunt/target AI.
///
/// Places ships uniformly among the legal spots, largest first. While hunting
/// it fires at random untargeted cells; after a `Damaged` report it works the
/// neighbours of every damaged cell until they are exhausted.
#[derive(Debug, Default)]
pub struct AiController {
    damaged: Vec<Coord>,
}

impl AiController {
    pub fn new() -> Self {
        Self::default()
    }

    fn place_once(rng: &mut SmallRng, player: &mut PlayerState) -> Result<bool, GameError> {
        for kind in ShipKind::ALL.into_iter().rev() {
            while player.board().registry().available(kind) > 0 {
                let spots = legal_spots(player, kind);
                if spots.is_empty() {
                    return Ok(false);
                }
                let (origin, orientation) = spots[rng.random_range(0..spots.len())];
                player.try_place_ship(kind, origin.x, origin.y, orientation)?;
            }
        }
        Ok(true)
    }
}

fn legal_spots(player: &PlayerState, kind: ShipKind) -> Vec<(Coord, Orientation)> {
    let grid = player.board().grid();
    let mut spots = Vec::new();
    for x in 0..grid.width() {
        for y in 0..grid.height() {
            for orientation in [Orientation::Horizontal, Orientation::Vertical] {
                let origin = Coord::new(x, y);
                if can_place_ship(grid, origin, kind.size(), orientation) {
                    spots.push((origin, orientation));
                }
            }
        }
    }
    spots
}

fn is_open(player: &PlayerState, c: Coord) -> bool {
    let grid = player.board().grid();
    grid.in_bounds(c.x, c.y) && !grid.was_hit_once(c.x, c.y)
}

impl Controller for AiController {
    fn place_fleet(&mut self, rng: &mut SmallRng, player: &mut PlayerState) -> Result<(), GameError> {
        self.damaged.clear();
        for attempt in 0..PLACEMENT_ATTEMPTS {
            if Self::place_once(rng, player)? {
                log::debug!("{} placed its fleet after {} attempt(s)", player.slot(), attempt + 1);
                return Ok(());
            }
            player.clear_fleet()?;
        }
        Err(GameError::InvalidConfig("fleet does not fit the grid"))
    }

    fn select_target(&mut self, rng: &mut SmallRng, player: &PlayerState) -> Option<Coord> {
        self.damaged
            .retain(|c| NEIGHBOURS.iter().any(|&(dx, dy)| is_open(player, c.offset(dx, dy))));

        let mut candidates: Vec<Coord> = self
            .damaged
            .iter()
            .flat_map(|c| NEIGHBOURS.iter().map(move |&(dx, dy)| c.offset(dx, dy)))
            .filter(|&c| is_open(player, c))
            .collect();

        if candidates.is_empty() {
            let grid = player.board().grid();
            candidates = grid
                .cells()
                .iter()
                .map(|cell| cell.position())
                .filter(|&c| is_open(player, c))
                .collect();
        }
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.random_range(0..candidates.len())])
    }

    fn observe(&mut self, record: &HitRecord) {
        if record.perspective == Perspective::Own && record.outcome == HitResult::Damaged {
            self.damaged.push(record.target);
        }
    }
}
