//! Authoritative turn coordinator.
//!
//! The coordinator is the only writer of match state. It is driven by a
//! fixed-step tick: inbound player actions set flags and queue commands, and a
//! round resolves atomically inside the tick in which both submission flags
//! are observed. Everything it wants the outside world to know is returned as
//! [`Outbound`] values rather than broadcast.

use alloc::vec::Vec;
use core::mem;

use log::{error, info, warn};

use crate::core::board::PlayerBoard;
use crate::core::combat::{resolve_fire, HitRecord};
use crate::core::common::{Coord, GameError, GameOutcome, GamePhase, PlayerSlot};
use crate::core::config::{MatchConfig, EXPECTED_PLAYERS};
use crate::core::player_state::{Command, PlayerState, Submission};
use crate::core::snapshot::Snapshot;

/// Per-player result of a resolved round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub round: u32,
    /// The recipient's own board after the round.
    pub snapshot: Snapshot,
    /// Hit records for the recipient, in resolution order.
    pub hits: Vec<HitRecord>,
    pub phase: GamePhase,
    pub outcome: Option<GameOutcome>,
    /// Commands the coordinator refused (duplicate or out-of-range targets).
    pub rejected: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    PhaseChanged { old: GamePhase, new: GamePhase },
    RoundResolved(RoundReport),
    /// The round hit a desync and was rolled back.
    RoundAborted { round: u32, reason: GameError },
}

/// An event addressed to one player slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub slot: PlayerSlot,
    pub event: MatchEvent,
}

pub struct TurnCoordinator {
    config: MatchConfig,
    players: [Option<PlayerState>; EXPECTED_PLAYERS],
    phase: GamePhase,
    outcomes: [Option<GameOutcome>; EXPECTED_PLAYERS],
    round: u32,
    waiting_ticks: [u32; EXPECTED_PLAYERS],
}

impl TurnCoordinator {
    pub fn new(config: MatchConfig) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            players: [None, None],
            phase: GamePhase::Wait,
            outcomes: [None; EXPECTED_PLAYERS],
            round: 0,
            waiting_ticks: [0; EXPECTED_PLAYERS],
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Number of rounds resolved since the match (re)started.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn player(&self, slot: PlayerSlot) -> Option<&PlayerState> {
        self.players.get(slot.index()).and_then(Option::as_ref)
    }

    pub fn player_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_some()).count()
    }

    pub fn outcome(&self, slot: PlayerSlot) -> Option<GameOutcome> {
        self.outcomes.get(slot.index()).copied().flatten()
    }

    pub fn outcomes(&self) -> [Option<GameOutcome>; EXPECTED_PLAYERS] {
        self.outcomes
    }

    /// Ticks `slot` has kept a submitted opponent waiting.
    pub fn waiting_ticks(&self, slot: PlayerSlot) -> u32 {
        self.waiting_ticks.get(slot.index()).copied().unwrap_or(0)
    }

    /// Seat a new player in the first free slot. The match leaves `Wait` once
    /// both slots are filled.
    pub fn register_player(&mut self) -> Result<(PlayerSlot, Vec<Outbound>), GameError> {
        let index = self
            .players
            .iter()
            .position(Option::is_none)
            .ok_or(GameError::MatchFull)?;
        let slot = PlayerSlot(index as u8);
        let mut player = PlayerState::new(self.config.clone(), slot);
        player.set_phase(self.phase);
        self.players[index] = Some(player);
        info!("{} joined ({} of {})", slot, self.player_count(), EXPECTED_PLAYERS);

        let mut out = Vec::new();
        if self.phase == GamePhase::Wait && self.player_count() == EXPECTED_PLAYERS {
            self.set_phase(GamePhase::Build, &mut out);
        }
        Ok((slot, out))
    }

    /// Accept the empty state a client registers right after joining.
    pub fn register_snapshot(&self, slot: PlayerSlot, snapshot: &Snapshot) -> Result<(), GameError> {
        let player = self.player(slot).ok_or(GameError::UnknownPlayer(slot))?;
        if !matches!(self.phase, GamePhase::Wait | GamePhase::Build) || player.has_submitted() {
            return Err(GameError::WrongPhase(self.phase));
        }
        snapshot.validate(&self.config)?;
        if !snapshot.is_pristine() {
            return Err(GameError::SnapshotMismatch("registration snapshot must be empty"));
        }
        Ok(())
    }

    /// Remove a player. Leaving mid-match forfeits it.
    pub fn deregister_player(&mut self, slot: PlayerSlot) -> Vec<Outbound> {
        let mut out = Vec::new();
        let Some(entry) = self.players.get_mut(slot.index()) else {
            return out;
        };
        if entry.take().is_none() {
            return out;
        }
        info!("{} left during {:?}", slot, self.phase);
        self.waiting_ticks = [0; EXPECTED_PLAYERS];
        if matches!(self.phase, GamePhase::Build | GamePhase::Combat) {
            warn!("{} disconnected mid-match and forfeits", slot);
            self.finish_by_forfeit(slot, &mut out);
        }
        out
    }

    /// Record a player's submission for the current round.
    pub fn submit(&mut self, slot: PlayerSlot, submission: Submission) -> Result<(), GameError> {
        let phase = self.phase;
        let player = self
            .players
            .get_mut(slot.index())
            .and_then(Option::as_mut)
            .ok_or(GameError::UnknownPlayer(slot))?;
        if player.has_submitted() {
            return Err(GameError::AlreadySubmitted);
        }
        match phase {
            GamePhase::Build => {
                let snapshot = submission
                    .snapshot
                    .as_ref()
                    .ok_or(GameError::SnapshotMismatch("build submission carries no snapshot"))?;
                let board = PlayerBoard::replay_placements(&self.config, snapshot)?;
                if self.config.require_full_fleet && board.registry().has_available_ships_remaining() {
                    return Err(GameError::FleetIncomplete);
                }
                player.replace_board(board);
            }
            GamePhase::Combat => {
                if submission.commands.is_empty() {
                    return Err(GameError::NoTargetSelected);
                }
                player.enqueue(submission.commands);
            }
            other => return Err(GameError::WrongPhase(other)),
        }
        player.mark_submitted();
        self.waiting_ticks[slot.index()] = 0;
        Ok(())
    }

    /// Advance one fixed step.
    pub fn tick(&mut self) -> Vec<Outbound> {
        let mut out = Vec::new();
        if !matches!(self.phase, GamePhase::Build | GamePhase::Combat)
            || self.player_count() < EXPECTED_PLAYERS
        {
            return out;
        }

        let submitted = [0, 1].map(|i| self.players[i].as_ref().is_some_and(PlayerState::has_submitted));
        match submitted {
            [true, true] => self.resolve_round(&mut out),
            [false, false] => {}
            _ => {
                if let Some(limit) = self.config.submit_timeout_ticks {
                    let laggard = if submitted[0] { 1 } else { 0 };
                    self.waiting_ticks[laggard] += 1;
                    if self.waiting_ticks[laggard] >= limit {
                        let slot = PlayerSlot(laggard as u8);
                        warn!("{} did not submit within {} ticks and forfeits", slot, limit);
                        self.finish_by_forfeit(slot, &mut out);
                    }
                }
            }
        }
        out
    }

    /// Throw the finished match away and start over. Only valid after
    /// GameOver; either player may ask.
    pub fn request_restart(&mut self, slot: PlayerSlot) -> Result<Vec<Outbound>, GameError> {
        if self.player(slot).is_none() {
            return Err(GameError::UnknownPlayer(slot));
        }
        if self.phase != GamePhase::GameOver {
            return Err(GameError::WrongPhase(self.phase));
        }
        info!("{} requested a restart", slot);
        for (i, entry) in self.players.iter_mut().enumerate() {
            if entry.is_some() {
                *entry = Some(PlayerState::new(self.config.clone(), PlayerSlot(i as u8)));
            }
        }
        self.outcomes = [None; EXPECTED_PLAYERS];
        self.round = 0;
        self.waiting_ticks = [0; EXPECTED_PLAYERS];

        let mut out = Vec::new();
        self.set_phase(GamePhase::Wait, &mut out);
        if self.player_count() == EXPECTED_PLAYERS {
            self.set_phase(GamePhase::Build, &mut out);
        }
        Ok(out)
    }

    fn set_phase(&mut self, new: GamePhase, out: &mut Vec<Outbound>) {
        let old = mem::replace(&mut self.phase, new);
        info!("phase {:?} -> {:?}", old, new);
        for player in self.players.iter_mut().flatten() {
            player.set_phase(new);
            out.push(Outbound {
                slot: player.slot(),
                event: MatchEvent::PhaseChanged { old, new },
            });
        }
    }

    /// Resolve both players' queued commands, player 0 first, each in FIFO
    /// order. Works on copies of both boards and commits only if no desync
    /// occurred.
    fn resolve_round(&mut self, out: &mut Vec<Outbound>) {
        let (Some(first), Some(second)) = (&self.players[0], &self.players[1]) else {
            return;
        };
        let mut boards = [first.board().clone(), second.board().clone()];
        let mut hits: [Vec<HitRecord>; EXPECTED_PLAYERS] = [Vec::new(), Vec::new()];
        let mut rejected: [Vec<Command>; EXPECTED_PLAYERS] = [Vec::new(), Vec::new()];
        let round = self.round + 1;

        if self.phase == GamePhase::Combat {
            for attacker in 0..EXPECTED_PLAYERS {
                let commands = self.players[attacker]
                    .as_mut()
                    .map(PlayerState::take_commands)
                    .unwrap_or_default();
                for command in commands {
                    let Command::Fire { x, y } = command;
                    let target = Coord::new(x, y);
                    let [b0, b1] = &mut boards;
                    let result = if attacker == 0 {
                        resolve_fire(b0, b1, target)
                    } else {
                        resolve_fire(b1, b0, target)
                    };
                    match result {
                        Ok(report) => {
                            hits[attacker].extend(report.attacker);
                            hits[1 - attacker].extend(report.defender);
                        }
                        Err(e) if e.is_desync() => {
                            error!("round {} aborted: player {} fire at {}: {}", round, attacker, target, e);
                            self.abort_round(round, e, out);
                            return;
                        }
                        Err(e) => {
                            warn!("player {} fire at {} rejected: {}", attacker, target, e);
                            rejected[attacker].push(command);
                        }
                    }
                }
            }
        }

        for (player, board) in self.players.iter_mut().zip(boards) {
            if let Some(player) = player {
                player.replace_board(board);
                player.reset_submission();
            }
        }
        self.round = round;

        let next = match self.phase {
            GamePhase::Build => GamePhase::Combat,
            GamePhase::Combat => self.judge(),
            other => other,
        };
        if next != self.phase {
            self.set_phase(next, out);
        }

        for (i, player) in self.players.iter().enumerate() {
            if let Some(player) = player {
                out.push(Outbound {
                    slot: player.slot(),
                    event: MatchEvent::RoundResolved(RoundReport {
                        round,
                        snapshot: player.board().snapshot(),
                        hits: mem::take(&mut hits[i]),
                        phase: self.phase,
                        outcome: self.outcomes[i],
                        rejected: mem::take(&mut rejected[i]),
                    }),
                });
            }
        }
        info!(
            "round {} resolved; ships alive: {} vs {}",
            round,
            self.alive_ships(PlayerSlot::FIRST),
            self.alive_ships(PlayerSlot::SECOND)
        );
    }

    /// Decide whether the match is over after a combat round.
    fn judge(&mut self) -> GamePhase {
        let lost = [0, 1].map(|i| {
            self.players[i]
                .as_ref()
                .is_some_and(|p| !p.board().registry().has_ships_remaining())
        });
        let outcomes = match lost {
            [true, true] => [GameOutcome::Tie, GameOutcome::Tie],
            [true, false] => [GameOutcome::Lose, GameOutcome::Win],
            [false, true] => [GameOutcome::Win, GameOutcome::Lose],
            [false, false] => return GamePhase::Combat,
        };
        self.assign_outcomes(outcomes);
        info!("game over: {:?}", outcomes);
        GamePhase::GameOver
    }

    fn assign_outcomes(&mut self, outcomes: [GameOutcome; EXPECTED_PLAYERS]) {
        for (i, outcome) in outcomes.into_iter().enumerate() {
            self.outcomes[i] = Some(outcome);
            if let Some(player) = self.players[i].as_mut() {
                player.set_outcome(Some(outcome));
            }
        }
    }

    fn abort_round(&mut self, round: u32, reason: GameError, out: &mut Vec<Outbound>) {
        for player in self.players.iter_mut().flatten() {
            player.take_commands();
            player.reset_submission();
            out.push(Outbound {
                slot: player.slot(),
                event: MatchEvent::RoundAborted {
                    round,
                    reason: reason.clone(),
                },
            });
        }
    }

    fn finish_by_forfeit(&mut self, loser: PlayerSlot, out: &mut Vec<Outbound>) {
        let mut outcomes = [GameOutcome::Win; EXPECTED_PLAYERS];
        outcomes[loser.index()] = GameOutcome::Lose;
        self.assign_outcomes(outcomes);
        for player in self.players.iter_mut().flatten() {
            player.take_commands();
            player.reset_submission();
        }
        self.set_phase(GamePhase::GameOver, out);
        for (i, player) in self.players.iter().enumerate() {
            if let Some(player) = player {
                out.push(Outbound {
                    slot: player.slot(),
                    event: MatchEvent::RoundResolved(RoundReport {
                        round: self.round,
                        snapshot: player.board().snapshot(),
                        hits: Vec::new(),
                        phase: self.phase,
                        outcome: self.outcomes[i],
                        rejected: Vec::new(),
                    }),
                });
            }
        }
    }

    fn alive_ships(&self, slot: PlayerSlot) -> u32 {
        self.player(slot)
            .map(|p| p.board().registry().total_alive())
            .unwrap_or(0)
    }
}
