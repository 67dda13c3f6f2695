use broadside::{
    Command, Coord, GameError, GameOutcome, GamePhase, HitResult, MatchConfig, MatchEvent,
    Orientation, Outbound, Perspective, PlayerBoard, PlayerSlot, RoundReport, ShipId, ShipInstance,
    ShipKind, Submission, TurnCoordinator,
};

const P0: PlayerSlot = PlayerSlot::FIRST;
const P1: PlayerSlot = PlayerSlot::SECOND;

/// 5x5 grid with a single one-cell ship per player.
fn config() -> MatchConfig {
    MatchConfig::default().with_grid(5, 5).with_fleet([1, 0, 0, 0])
}

fn seated(config: MatchConfig) -> TurnCoordinator {
    let mut c = TurnCoordinator::new(config).unwrap();
    c.register_player().unwrap();
    c.register_player().unwrap();
    c
}

fn fleet_at(config: &MatchConfig, x: i32, y: i32) -> Submission {
    let mut board = PlayerBoard::new(config);
    board
        .place_ship(ShipKind::Single, Coord::new(x, y), Orientation::Horizontal)
        .unwrap();
    Submission {
        snapshot: Some(board.snapshot()),
        commands: Vec::new(),
    }
}

fn fire(x: i32, y: i32) -> Submission {
    Submission {
        snapshot: None,
        commands: vec![Command::Fire { x, y }],
    }
}

/// Seated match in Combat; player 0's ship at (0, 0), player 1's at (4, 4).
fn in_combat(config: MatchConfig) -> TurnCoordinator {
    let mut c = seated(config.clone());
    c.submit(P0, fleet_at(&config, 0, 0)).unwrap();
    c.submit(P1, fleet_at(&config, 4, 4)).unwrap();
    c.tick();
    assert_eq!(c.phase(), GamePhase::Combat);
    c
}

fn report_for(outs: &[Outbound], slot: PlayerSlot) -> &RoundReport {
    outs.iter()
        .find_map(|o| match &o.event {
            MatchEvent::RoundResolved(report) if o.slot == slot => Some(report),
            _ => None,
        })
        .expect("no round report for slot")
}

#[test]
fn test_match_waits_for_two_players() {
    let mut c = TurnCoordinator::new(config()).unwrap();
    assert_eq!(c.phase(), GamePhase::Wait);

    let (slot, outs) = c.register_player().unwrap();
    assert_eq!(slot, P0);
    assert!(outs.is_empty());
    assert_eq!(c.phase(), GamePhase::Wait);

    let (slot, outs) = c.register_player().unwrap();
    assert_eq!(slot, P1);
    assert_eq!(c.phase(), GamePhase::Build);
    let expected = MatchEvent::PhaseChanged {
        old: GamePhase::Wait,
        new: GamePhase::Build,
    };
    assert_eq!(outs.len(), 2);
    assert!(outs.iter().all(|o| o.event == expected));
    assert_eq!(c.player(P0).map(|p| p.phase()), Some(GamePhase::Build));

    assert_eq!(c.register_player().unwrap_err(), GameError::MatchFull);
}

#[test]
fn test_invalid_config_is_refused() {
    let err = TurnCoordinator::new(MatchConfig::default().with_fleet([0, 0, 0, 0]))
        .err()
        .unwrap();
    assert!(matches!(err, GameError::InvalidConfig(_)));
}

#[test]
fn test_oversized_fleet_is_refused() {
    let config = MatchConfig::default().with_fleet([u32::MAX, 1, 0, 0]);
    assert_eq!(config.fleet_size(), None);
    assert_eq!(
        config.validate(),
        Err(GameError::InvalidConfig("fleet is too large"))
    );
    assert_eq!(MatchConfig::default().fleet_size(), Some(10));
}

#[test]
fn test_build_round_moves_to_combat() {
    let config = config();
    let mut c = seated(config.clone());
    let sub0 = fleet_at(&config, 0, 0);
    let expected_snapshot = sub0.snapshot.clone().unwrap();
    c.submit(P0, sub0).unwrap();
    assert!(c.tick().is_empty());
    assert_eq!(c.phase(), GamePhase::Build);

    c.submit(P1, fleet_at(&config, 4, 4)).unwrap();
    let outs = c.tick();
    assert_eq!(c.phase(), GamePhase::Combat);
    assert_eq!(c.round(), 1);
    assert_eq!(
        outs[0].event,
        MatchEvent::PhaseChanged {
            old: GamePhase::Build,
            new: GamePhase::Combat,
        }
    );
    let report = report_for(&outs, P0);
    assert_eq!(report.phase, GamePhase::Combat);
    assert_eq!(report.snapshot, expected_snapshot);
    assert!(report.hits.is_empty());
    assert!(!c.player(P0).unwrap().has_submitted());
}

#[test]
fn test_build_requires_full_fleet() {
    let config = config();
    let mut c = seated(config.clone());
    let empty = Submission {
        snapshot: Some(PlayerBoard::new(&config).snapshot()),
        commands: Vec::new(),
    };
    assert_eq!(c.submit(P0, empty.clone()), Err(GameError::FleetIncomplete));
    assert!(!c.player(P0).unwrap().has_submitted());

    let mut relaxed = seated(config.with_full_fleet_required(false));
    assert_eq!(relaxed.submit(P0, empty), Ok(()));
}

#[test]
fn test_build_rejects_missing_or_illegal_snapshot() {
    let config = MatchConfig::default();
    let mut c = seated(config.clone());
    assert!(matches!(
        c.submit(P0, Submission::default()),
        Err(GameError::SnapshotMismatch(_))
    ));

    let mut bad = PlayerBoard::new(&config).snapshot();
    bad.width = 3;
    let sub = Submission {
        snapshot: Some(bad),
        commands: Vec::new(),
    };
    assert!(c.submit(P0, sub).unwrap_err().is_desync());
}

#[test]
fn test_second_submission_in_round_is_refused() {
    let config = config();
    let mut c = seated(config.clone());
    c.submit(P0, fleet_at(&config, 0, 0)).unwrap();
    assert_eq!(
        c.submit(P0, fleet_at(&config, 2, 2)),
        Err(GameError::AlreadySubmitted)
    );
}

#[test]
fn test_submit_outside_build_and_combat() {
    let mut c = TurnCoordinator::new(config()).unwrap();
    c.register_player().unwrap();
    assert_eq!(c.submit(P0, fire(0, 0)), Err(GameError::WrongPhase(GamePhase::Wait)));
    assert_eq!(c.submit(P1, fire(0, 0)), Err(GameError::UnknownPlayer(P1)));
}

#[test]
fn test_combat_submission_needs_a_command() {
    let mut c = in_combat(config());
    assert_eq!(
        c.submit(P0, Submission::default()),
        Err(GameError::NoTargetSelected)
    );
}

#[test]
fn test_kill_ends_match() {
    let mut c = in_combat(config());
    c.submit(P0, fire(4, 4)).unwrap();
    c.submit(P1, fire(2, 2)).unwrap();
    let outs = c.tick();

    assert_eq!(c.phase(), GamePhase::GameOver);
    assert_eq!(c.outcome(P0), Some(GameOutcome::Win));
    assert_eq!(c.outcome(P1), Some(GameOutcome::Lose));

    let winner = report_for(&outs, P0);
    assert_eq!(winner.outcome, Some(GameOutcome::Win));
    assert_eq!(winner.hits[0].outcome, HitResult::Killed);
    assert_eq!(winner.hits[0].perspective, Perspective::Own);
    assert!(winner.hits[1..].iter().all(|h| h.outcome == HitResult::Miss));

    let loser = report_for(&outs, P1);
    assert_eq!(loser.outcome, Some(GameOutcome::Lose));
    assert_eq!(loser.hits.len(), 2);
    assert_eq!(loser.hits[0].perspective, Perspective::Opponent);
    assert_eq!(loser.hits[0].outcome, HitResult::Killed);
    assert!(loser.hits[0].sunk.is_some());
    assert_eq!(loser.hits[1].target, Coord::new(2, 2));
    assert_eq!(loser.hits[1].outcome, HitResult::Miss);
    assert!(loser.snapshot.cells.iter().all(|c| c.occupant.is_none()));
}

#[test]
fn test_simultaneous_wipeout_is_a_tie() {
    let mut c = in_combat(config());
    c.submit(P0, fire(4, 4)).unwrap();
    c.submit(P1, fire(0, 0)).unwrap();
    let outs = c.tick();
    assert_eq!(c.phase(), GamePhase::GameOver);
    assert_eq!(c.outcomes(), [Some(GameOutcome::Tie), Some(GameOutcome::Tie)]);
    assert_eq!(report_for(&outs, P1).outcome, Some(GameOutcome::Tie));
}

#[test]
fn test_bad_commands_are_skipped_not_fatal() {
    let mut c = in_combat(config());
    c.submit(P0, fire(7, 7)).unwrap();
    c.submit(P1, fire(1, 1)).unwrap();
    let outs = c.tick();
    assert_eq!(c.phase(), GamePhase::Combat);
    assert_eq!(c.round(), 2);
    let report = report_for(&outs, P0);
    assert_eq!(report.rejected, vec![Command::Fire { x: 7, y: 7 }]);

    // duplicate target in the next round
    c.submit(P0, fire(3, 3)).unwrap();
    c.submit(P1, fire(1, 1)).unwrap();
    let outs = c.tick();
    assert_eq!(report_for(&outs, P1).rejected, vec![Command::Fire { x: 1, y: 1 }]);
}

#[test]
fn test_commands_resolve_in_fifo_order() {
    let config = config().with_fleet([0, 1, 0, 0]);
    let mut c = seated(config.clone());
    for slot in [P0, P1] {
        let mut board = PlayerBoard::new(&config);
        board
            .place_ship(ShipKind::Double, Coord::new(0, 0), Orientation::Horizontal)
            .unwrap();
        c.submit(
            slot,
            Submission {
                snapshot: Some(board.snapshot()),
                commands: Vec::new(),
            },
        )
        .unwrap();
    }
    c.tick();

    let volley = Submission {
        snapshot: None,
        commands: vec![Command::Fire { x: 1, y: 0 }, Command::Fire { x: 0, y: 0 }],
    };
    c.submit(P0, volley).unwrap();
    c.submit(P1, fire(4, 4)).unwrap();
    let outs = c.tick();
    let hits = &report_for(&outs, P0).hits;
    assert_eq!(hits[0].outcome, HitResult::Damaged);
    assert_eq!(hits[1].outcome, HitResult::Killed);
    assert_eq!(c.outcome(P0), Some(GameOutcome::Win));
}

#[test]
fn test_laggard_forfeits_after_timeout() {
    let config = config().with_submit_timeout(Some(3));
    let mut c = seated(config.clone());
    c.submit(P0, fleet_at(&config, 0, 0)).unwrap();
    assert!(c.tick().is_empty());
    assert!(c.tick().is_empty());
    assert_eq!(c.waiting_ticks(P1), 2);

    let outs = c.tick();
    assert_eq!(c.phase(), GamePhase::GameOver);
    assert_eq!(c.outcome(P0), Some(GameOutcome::Win));
    assert_eq!(c.outcome(P1), Some(GameOutcome::Lose));
    assert_eq!(report_for(&outs, P1).outcome, Some(GameOutcome::Lose));
}

#[test]
fn test_no_timeout_without_policy() {
    let config = config();
    let mut c = seated(config.clone());
    c.submit(P0, fleet_at(&config, 0, 0)).unwrap();
    for _ in 0..50 {
        assert!(c.tick().is_empty());
    }
    assert_eq!(c.phase(), GamePhase::Build);
}

#[test]
fn test_leaving_mid_match_forfeits() {
    let mut c = in_combat(config());
    let outs = c.deregister_player(P1);
    assert_eq!(c.phase(), GamePhase::GameOver);
    assert_eq!(c.outcome(P0), Some(GameOutcome::Win));
    assert!(outs.iter().all(|o| o.slot == P0));
    assert_eq!(report_for(&outs, P0).outcome, Some(GameOutcome::Win));
    assert_eq!(c.player_count(), 1);
}

#[test]
fn test_leaving_while_waiting_is_quiet() {
    let mut c = TurnCoordinator::new(config()).unwrap();
    let (slot, _) = c.register_player().unwrap();
    assert!(c.deregister_player(slot).is_empty());
    assert!(c.deregister_player(slot).is_empty());
    assert_eq!(c.phase(), GamePhase::Wait);
    assert_eq!(c.register_player().unwrap().0, P0);
}

#[test]
fn test_restart_after_game_over() {
    let mut c = in_combat(config());
    assert_eq!(
        c.request_restart(P0).unwrap_err(),
        GameError::WrongPhase(GamePhase::Combat)
    );
    c.submit(P0, fire(4, 4)).unwrap();
    c.submit(P1, fire(0, 0)).unwrap();
    c.tick();
    assert_eq!(c.phase(), GamePhase::GameOver);

    let outs = c.request_restart(P1).unwrap();
    let phases: Vec<(PlayerSlot, GamePhase)> = outs
        .iter()
        .filter_map(|o| match o.event {
            MatchEvent::PhaseChanged { new, .. } => Some((o.slot, new)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            (P0, GamePhase::Wait),
            (P1, GamePhase::Wait),
            (P0, GamePhase::Build),
            (P1, GamePhase::Build),
        ]
    );
    assert_eq!(c.phase(), GamePhase::Build);
    assert_eq!(c.round(), 0);
    assert_eq!(c.outcomes(), [None, None]);
    assert!(c.player(P0).unwrap().board().snapshot().is_pristine());
}

#[test]
fn test_restart_with_one_player_waits() {
    let mut c = in_combat(config());
    c.deregister_player(P1);
    c.request_restart(P0).unwrap();
    assert_eq!(c.phase(), GamePhase::Wait);
    c.register_player().unwrap();
    assert_eq!(c.phase(), GamePhase::Build);
}

#[test]
fn test_register_snapshot_must_be_empty() {
    let config = config();
    let c = seated(config.clone());
    let empty = PlayerBoard::new(&config).snapshot();
    assert_eq!(c.register_snapshot(P0, &empty), Ok(()));
    let placed = fleet_at(&config, 1, 1).snapshot.unwrap();
    assert!(matches!(
        c.register_snapshot(P0, &placed),
        Err(GameError::SnapshotMismatch(_))
    ));
    let c = in_combat(config);
    assert!(c.register_snapshot(P0, &empty).is_err());
}

#[derive(serde::Serialize)]
struct WireShip {
    id: ShipId,
    kind: ShipKind,
    health: u32,
    origin: Coord,
    orientation: Orientation,
}

#[test]
fn test_build_rejects_sunk_ship_far_off_grid() {
    let config = config();
    let mut c = seated(config.clone());
    let bytes = bincode::serialize(&WireShip {
        id: ShipId(0),
        kind: ShipKind::Single,
        health: 0,
        origin: Coord::new(i32::MAX, 0),
        orientation: Orientation::Horizontal,
    })
    .unwrap();
    let ship: ShipInstance = bincode::deserialize(&bytes).unwrap();
    let mut snapshot = PlayerBoard::new(&config).snapshot();
    snapshot.ships.push(ship);

    let err = c
        .submit(
            P0,
            Submission {
                snapshot: Some(snapshot),
                commands: Vec::new(),
            },
        )
        .unwrap_err();
    assert!(err.is_desync());
    assert!(!c.player(P0).unwrap().has_submitted());

    // the player can still submit a real fleet afterwards
    c.submit(P0, fleet_at(&config, 0, 0)).unwrap();
}
