//! Authoritative match server.
//!
//! One task owns the [`TurnCoordinator`]. Every connection runs in its own
//! task that forwards inbound messages to the server over a channel and
//! writes whatever the server queues for it. The server task alternates
//! between those events and a fixed-step tick.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::core::{
    GameError, GameOutcome, GamePhase, MatchConfig, MatchEvent, Outbound, PlayerSlot, Submission,
    TurnCoordinator, EXPECTED_PLAYERS,
};
use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::transport::Transport;

pub type ConnectionId = u64;

/// Default length of one coordinator tick.
pub const DEFAULT_TICK: Duration = Duration::from_millis(20);

/// What a connection task reports to the server task.
#[derive(Debug)]
pub enum ConnectionEvent {
    Opened {
        id: ConnectionId,
        outbound: UnboundedSender<Message>,
    },
    Inbound {
        id: ConnectionId,
        msg: Message,
    },
    Closed {
        id: ConnectionId,
    },
}

/// Result of the last finished match, returned when the server stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchSummary {
    pub matches_played: u32,
    pub rounds: u32,
    pub outcomes: [Option<GameOutcome>; EXPECTED_PLAYERS],
}

/// Cloneable entry point for attaching new connections to a running server.
#[derive(Clone)]
pub struct ServerHandle {
    events: UnboundedSender<ConnectionEvent>,
    next_id: Arc<AtomicU64>,
}

impl ServerHandle {
    /// Spawn a task that pumps `transport` until either side closes it.
    pub fn attach<T: Transport + 'static>(&self, transport: T) -> JoinHandle<()> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let events = self.events.clone();
        tokio::spawn(connection_task(id, transport, events))
    }
}

async fn connection_task<T: Transport>(
    id: ConnectionId,
    mut transport: T,
    events: UnboundedSender<ConnectionEvent>,
) {
    let (outbound, mut queued) = unbounded_channel();
    if events.send(ConnectionEvent::Opened { id, outbound }).is_err() {
        return;
    }
    loop {
        tokio::select! {
            inbound = transport.recv() => match inbound {
                Ok(msg) => {
                    if events.send(ConnectionEvent::Inbound { id, msg }).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::debug!("connection {} receive ended: {}", id, e);
                    break;
                }
            },
            out = queued.recv() => match out {
                Some(msg) => {
                    if let Err(e) = transport.send(msg).await {
                        log::warn!("connection {} send failed: {}", id, e);
                        break;
                    }
                }
                // server dropped this connection
                None => break,
            },
        }
    }
    let _ = events.send(ConnectionEvent::Closed { id });
}

struct Connection {
    outbound: UnboundedSender<Message>,
    slot: Option<PlayerSlot>,
    last_seq: Option<u32>,
}

pub struct MatchServer {
    coordinator: TurnCoordinator,
    tick_interval: Duration,
    events_tx: Option<UnboundedSender<ConnectionEvent>>,
    events_rx: UnboundedReceiver<ConnectionEvent>,
    next_id: Arc<AtomicU64>,
    connections: HashMap<ConnectionId, Connection>,
    summary: MatchSummary,
}

impl MatchServer {
    pub fn new(config: MatchConfig, tick_interval: Duration) -> Result<Self, GameError> {
        let coordinator = TurnCoordinator::new(config)?;
        let (events_tx, events_rx) = unbounded_channel();
        Ok(Self {
            coordinator,
            tick_interval,
            events_tx: Some(events_tx),
            events_rx,
            next_id: Arc::new(AtomicU64::new(0)),
            connections: HashMap::new(),
            summary: MatchSummary::default(),
        })
    }

    pub fn coordinator(&self) -> &TurnCoordinator {
        &self.coordinator
    }

    /// A handle for attaching connections. Take every handle you need before
    /// calling [`MatchServer::run`].
    pub fn handle(&self) -> anyhow::Result<ServerHandle> {
        let events = self
            .events_tx
            .clone()
            .ok_or_else(|| anyhow::anyhow!("server is already running"))?;
        Ok(ServerHandle {
            events,
            next_id: self.next_id.clone(),
        })
    }

    /// Serve until a match has finished and every connection is gone, or
    /// until every handle and connection has been dropped.
    pub async fn run(mut self) -> anyhow::Result<MatchSummary> {
        self.events_tx = None;
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!("match server running, tick {:?}", self.tick_interval);

        loop {
            tokio::select! {
                event = self.events_rx.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                _ = ticker.tick() => {
                    let outs = self.coordinator.tick();
                    self.dispatch(outs);
                }
            }
            if self.summary.matches_played > 0 && self.connections.is_empty() {
                break;
            }
        }
        log::info!(
            "match server stopped after {} match(es)",
            self.summary.matches_played
        );
        Ok(self.summary)
    }

    fn handle_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened { id, outbound } => {
                log::debug!("connection {} opened", id);
                self.connections.insert(
                    id,
                    Connection {
                        outbound,
                        slot: None,
                        last_seq: None,
                    },
                );
            }
            ConnectionEvent::Inbound { id, msg } => self.handle_message(id, msg),
            ConnectionEvent::Closed { id } => {
                log::debug!("connection {} closed", id);
                self.drop_connection(id);
            }
        }
    }

    fn handle_message(&mut self, id: ConnectionId, msg: Message) {
        let Some(slot) = self.connections.get(&id).map(|c| c.slot) else {
            return;
        };
        match (slot, msg) {
            (None, Message::Join { version }) => self.handle_join(id, version),
            (Some(_), Message::Join { .. }) => log::warn!("connection {} joined twice", id),
            (Some(slot), Message::Register { snapshot }) => {
                if let Err(e) = self.coordinator.register_snapshot(slot, &snapshot) {
                    log::warn!("{} registered an invalid state: {}", slot, e);
                    self.reject(id, e.to_string());
                }
            }
            (Some(slot), Message::Submit { seq, snapshot, commands }) => {
                self.handle_submit(id, slot, seq, Submission { snapshot, commands })
            }
            (Some(slot), Message::Restart) => match self.coordinator.request_restart(slot) {
                Ok(outs) => self.dispatch(outs),
                Err(e) => log::warn!("{} restart refused: {}", slot, e),
            },
            (Some(_), Message::Leave) => self.drop_connection(id),
            (_, Message::Heartbeat { .. }) => {}
            (None, other) => log::warn!("connection {} sent {:?} before joining", id, other),
            (Some(slot), other) => log::warn!("{} sent unexpected {:?}", slot, other),
        }
    }

    fn handle_join(&mut self, id: ConnectionId, version: u16) {
        if version != PROTOCOL_VERSION {
            log::warn!(
                "connection {} speaks protocol {}, expected {}",
                id,
                version,
                PROTOCOL_VERSION
            );
            self.reject(
                id,
                format!("protocol version mismatch: expected {}, got {}", PROTOCOL_VERSION, version),
            );
            return;
        }
        match self.coordinator.register_player() {
            Ok((slot, outs)) => {
                if let Some(conn) = self.connections.get_mut(&id) {
                    conn.slot = Some(slot);
                    let _ = conn.outbound.send(Message::Welcome {
                        version: PROTOCOL_VERSION,
                        slot,
                        config: self.coordinator.config().clone(),
                    });
                }
                self.dispatch(outs);
            }
            Err(e) => {
                log::info!("connection {} turned away: {}", id, e);
                self.reject(id, e.to_string());
            }
        }
    }

    fn handle_submit(&mut self, id: ConnectionId, slot: PlayerSlot, seq: u32, submission: Submission) {
        let Some(conn) = self.connections.get_mut(&id) else {
            return;
        };
        if conn.last_seq.is_some_and(|last| seq <= last) {
            log::warn!("{} sent stale submission {}", slot, seq);
            let _ = conn.outbound.send(Message::SubmitRejected {
                seq,
                reason: "stale sequence number".to_string(),
            });
            return;
        }
        conn.last_seq = Some(seq);
        if let Err(e) = self.coordinator.submit(slot, submission) {
            log::info!("{} submission {} rejected: {}", slot, seq, e);
            let _ = conn.outbound.send(Message::SubmitRejected {
                seq,
                reason: e.to_string(),
            });
        }
    }

    /// Tell the peer why, then close its connection.
    fn reject(&mut self, id: ConnectionId, reason: String) {
        if let Some(conn) = self.connections.get(&id) {
            let _ = conn.outbound.send(Message::Rejected { reason });
        }
        self.drop_connection(id);
    }

    fn drop_connection(&mut self, id: ConnectionId) {
        let Some(conn) = self.connections.remove(&id) else {
            return;
        };
        if let Some(slot) = conn.slot {
            let outs = self.coordinator.deregister_player(slot);
            self.dispatch(outs);
        }
    }

    fn dispatch(&mut self, outs: Vec<Outbound>) {
        let finished = outs.iter().any(|out| {
            matches!(&out.event, MatchEvent::RoundResolved(report) if report.phase == GamePhase::GameOver)
        });
        if finished {
            self.record_finish();
        }
        for out in outs {
            let target = self.connections.values().find(|c| c.slot == Some(out.slot));
            match target {
                Some(conn) => {
                    let _ = conn.outbound.send(Message::from(out.event));
                }
                None => log::debug!("no connection for {}, dropping event", out.slot),
            }
        }
    }

    fn record_finish(&mut self) {
        self.summary.matches_played += 1;
        self.summary.rounds = self.coordinator.round();
        self.summary.outcomes = self.coordinator.outcomes();
        log::info!(
            "match finished after {} rounds: {:?}",
            self.summary.rounds,
            self.summary.outcomes
        );
    }
}
