use std::collections::VecDeque;

use rand::rngs::SmallRng;

use crate::core::{GameOutcome, GamePhase, HitRecord, PlayerSlot, PlayerState};
use crate::player::Controller;
use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::transport::Transport;

/// Consecutive refused submissions tolerated before giving up.
const MAX_REJECTIONS: u32 = 8;

/// Client side of a match: mirrors the server's view of this player and lets
/// a [`Controller`] decide what to submit.
pub struct ClientNode {
    controller: Box<dyn Controller>,
    transport: Box<dyn Transport>,
    state: Option<PlayerState>,
    hit_queue: VecDeque<HitRecord>,
    seq: u32,
    rejections: u32,
    rounds_seen: u32,
}

impl ClientNode {
    pub fn new(controller: Box<dyn Controller>, transport: Box<dyn Transport>) -> Self {
        Self {
            controller,
            transport,
            state: None,
            hit_queue: VecDeque::new(),
            seq: 0,
            rejections: 0,
            rounds_seen: 0,
        }
    }

    /// Local player state, once the server has seated us.
    pub fn state(&self) -> Option<&PlayerState> {
        self.state.as_ref()
    }

    pub fn slot(&self) -> Option<PlayerSlot> {
        self.state.as_ref().map(PlayerState::slot)
    }

    /// Resolved rounds observed so far, across rematches.
    pub fn rounds_seen(&self) -> u32 {
        self.rounds_seen
    }

    /// Hit records not yet consumed by a visual layer, oldest first.
    pub fn drain_hits(&mut self) -> impl Iterator<Item = HitRecord> + '_ {
        self.hit_queue.drain(..)
    }

    fn state_mut(&mut self) -> anyhow::Result<&mut PlayerState> {
        self.state
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("not seated in a match"))
    }

    async fn join(&mut self) -> anyhow::Result<()> {
        self.transport
            .send(Message::Join {
                version: PROTOCOL_VERSION,
            })
            .await?;
        match self.transport.recv().await? {
            Message::Welcome {
                version,
                slot,
                config,
            } if version == PROTOCOL_VERSION => {
                log::info!("seated as {}", slot);
                let state = PlayerState::new(config, slot);
                let snapshot = state.board().snapshot();
                self.state = Some(state);
                self.transport.send(Message::Register { snapshot }).await
            }
            Message::Welcome { version, .. } => Err(anyhow::anyhow!(
                "Protocol version mismatch in Welcome: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            )),
            Message::Rejected { reason } => Err(anyhow::anyhow!("join rejected: {}", reason)),
            other => Err(anyhow::anyhow!(
                "Expected Welcome, got unexpected message: {:?}",
                other
            )),
        }
    }

    /// Play until the match ends and the controller declines a rematch.
    /// Returns the final outcome, `None` if the match never finished.
    pub async fn run(&mut self, rng: &mut SmallRng) -> anyhow::Result<Option<GameOutcome>> {
        self.join().await?;
        loop {
            let msg = match self.transport.recv().await {
                Ok(msg) => msg,
                Err(e) => {
                    log::warn!("connection to server lost: {}", e);
                    return Ok(self.state.as_ref().and_then(PlayerState::outcome));
                }
            };
            match msg {
                Message::PhaseChanged { old, new } => {
                    log::debug!("phase {:?} -> {:?}", old, new);
                    if new == GamePhase::Wait {
                        let state = self.state_mut()?;
                        *state = PlayerState::new(state.config().clone(), state.slot());
                    }
                    self.state_mut()?.set_phase(new);
                    // Combat turns are driven by RoundResolved
                    if new == GamePhase::Build {
                        self.act(rng).await?;
                    }
                }
                Message::RoundResolved {
                    round,
                    snapshot,
                    hits,
                    phase,
                    outcome,
                    rejected,
                } => {
                    self.rounds_seen += 1;
                    self.rejections = 0;
                    let state = self.state_mut()?;
                    state.apply_round(&snapshot, phase)?;
                    state.set_outcome(outcome);
                    if !rejected.is_empty() {
                        log::warn!("round {}: server refused {:?}", round, rejected);
                    }
                    for hit in hits {
                        self.controller.observe(&hit);
                        self.hit_queue.push_back(hit);
                    }
                    match phase {
                        GamePhase::Combat => self.act(rng).await?,
                        GamePhase::GameOver => {
                            log::info!("match over after round {}: {:?}", round, outcome);
                            if self.controller.wants_rematch(outcome) {
                                self.transport.send(Message::Restart).await?;
                            } else {
                                self.transport.send(Message::Leave).await?;
                                return Ok(outcome);
                            }
                        }
                        _ => {}
                    }
                }
                Message::RoundAborted { round, reason } => {
                    log::warn!("round {} rolled back: {}", round, reason);
                    self.retry(rng).await?;
                }
                Message::SubmitRejected { seq, reason } => {
                    log::warn!("submission {} refused: {}", seq, reason);
                    self.retry(rng).await?;
                }
                Message::Heartbeat { .. } => {}
                other => log::warn!("ignoring unexpected {:?}", other),
            }
        }
    }

    async fn retry(&mut self, rng: &mut SmallRng) -> anyhow::Result<()> {
        self.rejections += 1;
        if self.rejections > MAX_REJECTIONS {
            return Err(anyhow::anyhow!(
                "server refused {} submissions in a row",
                self.rejections
            ));
        }
        let state = self.state_mut()?;
        state.reset_submission();
        state.clear_hit_input();
        self.act(rng).await
    }

    /// Make this round's decision and submit it.
    async fn act(&mut self, rng: &mut SmallRng) -> anyhow::Result<()> {
        let Some(state) = self.state.as_mut() else {
            return Err(anyhow::anyhow!("not seated in a match"));
        };
        match state.phase() {
            GamePhase::Build => {
                if state.board().registry().has_available_ships_remaining() {
                    state.clear_fleet()?;
                    self.controller.place_fleet(rng, state)?;
                }
            }
            GamePhase::Combat => {
                let Some(target) = self.controller.select_target(rng, state) else {
                    log::warn!("no cell left to fire at");
                    return Ok(());
                };
                state.try_store_hit_input(target.x, target.y)?;
            }
            _ => return Ok(()),
        }
        let submission = state.submit()?;
        self.seq += 1;
        self.transport
            .send(Message::Submit {
                seq: self.seq,
                snapshot: submission.snapshot,
                commands: submission.commands,
            })
            .await
    }
}
