//! Controllers that make decisions for a seated player.
//!
//! A controller never touches the coordinator. It works on the local
//! [`PlayerState`]: places ships during Build and picks the next cell to fire
//! at during Combat. The client node turns those decisions into submissions.

use rand::rngs::SmallRng;

use crate::core::{Coord, GameError, GameOutcome, HitRecord, PlayerState};

/// Decision-making side of a player.
pub trait Controller: Send {
    /// Place the whole fleet on the local board.
    fn place_fleet(&mut self, rng: &mut SmallRng, player: &mut PlayerState) -> Result<(), GameError>;

    /// Pick the next cell to fire at, or `None` when nothing is left.
    fn select_target(&mut self, rng: &mut SmallRng, player: &PlayerState) -> Option<Coord>;

    /// Feed back one record from a resolved round.
    fn observe(&mut self, _record: &HitRecord) {}

    /// Asked once the match is over.
    fn wants_rematch(&mut self, _outcome: Option<GameOutcome>) -> bool {
        false
    }
}

pub mod ai;
pub use ai::AiController;
