//! Per-player container: board, pending command queue, submission flag and
//! the client-side stored hit input.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::core::board::{PlacementEvent, PlayerBoard};
use crate::core::common::{Coord, GameError, GamePhase, GameOutcome, PlayerSlot};
use crate::core::config::MatchConfig;
use crate::core::ship::{Orientation, ShipKind};
use crate::core::snapshot::Snapshot;

/// A typed request queued by a player and executed by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    Fire { x: i32, y: i32 },
}

/// What a client hands to the coordinator when it submits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Submission {
    /// Full board; required in Build, ignored in Combat.
    pub snapshot: Option<Snapshot>,
    /// FIFO order.
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    slot: PlayerSlot,
    config: MatchConfig,
    board: PlayerBoard,
    commands: VecDeque<Command>,
    submitted: bool,
    hit_input: Option<Coord>,
    phase: GamePhase,
    outcome: Option<GameOutcome>,
}

impl PlayerState {
    pub fn new(config: MatchConfig, slot: PlayerSlot) -> Self {
        Self {
            slot,
            board: PlayerBoard::new(&config),
            config,
            commands: VecDeque::new(),
            submitted: false,
            hit_input: None,
            phase: GamePhase::Wait,
            outcome: None,
        }
    }

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn board(&self) -> &PlayerBoard {
        &self.board
    }

    pub(crate) fn replace_board(&mut self, board: PlayerBoard) {
        self.board = board;
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub(crate) fn set_outcome(&mut self, outcome: Option<GameOutcome>) {
        self.outcome = outcome;
    }

    pub fn has_submitted(&self) -> bool {
        self.submitted
    }

    pub fn pending_commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Place a ship during Build.
    pub fn try_place_ship(
        &mut self,
        kind: ShipKind,
        x: i32,
        y: i32,
        orientation: Orientation,
    ) -> Result<PlacementEvent, GameError> {
        if self.phase != GamePhase::Build {
            return Err(GameError::WrongPhase(self.phase));
        }
        self.board.place_ship(kind, Coord::new(x, y), orientation)
    }

    /// Drop every placed ship and start the Build over.
    pub fn clear_fleet(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Build || self.submitted {
            return Err(GameError::WrongPhase(self.phase));
        }
        self.board = PlayerBoard::new(&self.config);
        Ok(())
    }

    /// Remember the cell to fire at on the next Combat submission.
    pub fn try_store_hit_input(&mut self, x: i32, y: i32) -> Result<(), GameError> {
        let grid = self.board.grid();
        if !grid.in_bounds(x, y) {
            return Err(GameError::OutOfBounds { x, y });
        }
        if grid.was_hit_once(x, y) {
            return Err(GameError::AlreadyTargeted { x, y });
        }
        self.hit_input = Some(Coord::new(x, y));
        Ok(())
    }

    pub fn hit_input(&self) -> Option<Coord> {
        self.hit_input
    }

    pub fn has_hit_input(&self) -> bool {
        self.hit_input.is_some()
    }

    pub fn clear_hit_input(&mut self) {
        self.hit_input = None;
    }

    /// Close this player's part of the round.
    ///
    /// Build needs a complete fleet when the match requires one and carries a
    /// snapshot. Combat turns the stored hit input into a `Fire` command and
    /// hands over the whole queue.
    pub fn submit(&mut self) -> Result<Submission, GameError> {
        if self.submitted {
            return Err(GameError::AlreadySubmitted);
        }
        let submission = match self.phase {
            GamePhase::Build => {
                if self.config.require_full_fleet
                    && self.board.registry().has_available_ships_remaining()
                {
                    return Err(GameError::FleetIncomplete);
                }
                Submission {
                    snapshot: Some(self.board.snapshot()),
                    commands: Vec::new(),
                }
            }
            GamePhase::Combat => {
                let target = self.hit_input.take().ok_or(GameError::NoTargetSelected)?;
                self.commands.push_back(Command::Fire {
                    x: target.x,
                    y: target.y,
                });
                Submission {
                    snapshot: None,
                    commands: self.commands.drain(..).collect(),
                }
            }
            phase => return Err(GameError::WrongPhase(phase)),
        };
        self.submitted = true;
        Ok(submission)
    }

    /// Apply a server snapshot at a round boundary. Replaces the board
    /// wholesale and reopens submission.
    pub fn apply_round(&mut self, snapshot: &Snapshot, phase: GamePhase) -> Result<(), GameError> {
        let board = PlayerBoard::from_snapshot(&self.config, snapshot)?;
        self.board = board;
        self.phase = phase;
        self.submitted = false;
        self.hit_input = None;
        Ok(())
    }

    /// Queue commands received from the client, preserving their order.
    pub(crate) fn enqueue(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.commands.extend(commands);
    }

    pub(crate) fn take_commands(&mut self) -> Vec<Command> {
        self.commands.drain(..).collect()
    }

    pub(crate) fn mark_submitted(&mut self) {
        self.submitted = true;
    }

    /// Reopen submission, e.g. after an aborted round.
    pub fn reset_submission(&mut self) {
        self.submitted = false;
    }
}
