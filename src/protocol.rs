use crate::core::{
    Command, GameOutcome, GamePhase, HitRecord, MatchConfig, MatchEvent, PlayerSlot, Snapshot,
};

/// Bumped whenever the wire format of [`Message`] changes.
pub const PROTOCOL_VERSION: u16 = 1;

/// Messages exchanged between a match server and its clients.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Message {
    /// Client asks for a seat.
    Join { version: u16 },
    /// Server assigned a seat and shares the match configuration.
    Welcome {
        version: u16,
        slot: PlayerSlot,
        config: MatchConfig,
    },
    /// Server refused the join; the connection closes afterwards.
    Rejected { reason: String },
    /// Client registers its freshly created, empty state.
    Register { snapshot: Snapshot },
    /// Client closes its part of the round. `seq` increases per submission.
    Submit {
        seq: u32,
        snapshot: Option<Snapshot>,
        commands: Vec<Command>,
    },
    /// The submission with this `seq` was refused and may be retried.
    SubmitRejected { seq: u32, reason: String },
    PhaseChanged { old: GamePhase, new: GamePhase },
    /// Authoritative state at the end of a round.
    RoundResolved {
        round: u32,
        snapshot: Snapshot,
        hits: Vec<HitRecord>,
        phase: GamePhase,
        outcome: Option<GameOutcome>,
        rejected: Vec<Command>,
    },
    /// The round was rolled back; both players resubmit.
    RoundAborted { round: u32, reason: String },
    /// Ask for a rematch after GameOver.
    Restart,
    /// Client is leaving the match.
    Leave,
    Heartbeat { version: u16 },
}

impl From<MatchEvent> for Message {
    fn from(event: MatchEvent) -> Self {
        match event {
            MatchEvent::PhaseChanged { old, new } => Message::PhaseChanged { old, new },
            MatchEvent::RoundResolved(report) => Message::RoundResolved {
                round: report.round,
                snapshot: report.snapshot,
                hits: report.hits,
                phase: report.phase,
                outcome: report.outcome,
                rejected: report.rejected,
            },
            MatchEvent::RoundAborted { round, reason } => Message::RoundAborted {
                round,
                reason: reason.to_string(),
            },
        }
    }
}
