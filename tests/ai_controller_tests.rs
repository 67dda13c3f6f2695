use std::collections::HashSet;

use broadside::{
    resolve_fire, AiController, Controller, Coord, GamePhase, HitResult, MatchConfig, PlayerBoard,
    PlayerSlot, PlayerState,
};
use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};

fn building(config: MatchConfig) -> PlayerState {
    let mut p = PlayerState::new(config, PlayerSlot::FIRST);
    p.set_phase(GamePhase::Build);
    p
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ai_places_full_legal_fleet(seed in any::<u64>()) {
        let config = MatchConfig::default();
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut p = building(config.clone());
        AiController::new().place_fleet(&mut rng, &mut p).unwrap();
        prop_assert!(!p.board().registry().has_available_ships_remaining());
        prop_assert_eq!(Some(p.board().registry().total_alive()), config.fleet_size());
        // the server replays placements the same way
        prop_assert!(PlayerBoard::replay_placements(&config, &p.board().snapshot()).is_ok());
    }
}

#[test]
fn test_ai_sinks_everything_without_repeating() {
    let config = MatchConfig::default();
    let mut rng = SmallRng::seed_from_u64(7);

    let mut defender = building(config.clone());
    AiController::new()
        .place_fleet(&mut rng, &mut defender)
        .unwrap();
    let mut target_board = defender.board().clone();

    let mut ai = AiController::new();
    let mut me = PlayerState::new(config.clone(), PlayerSlot::SECOND);
    me.set_phase(GamePhase::Combat);
    let mut seen = HashSet::new();
    let mut shots: u32 = 0;

    while target_board.registry().has_ships_remaining() {
        let target = ai.select_target(&mut rng, &me).expect("ran out of cells");
        assert!(seen.insert(target), "fired at {} twice", target);
        let mut my_board = me.board().clone();
        let report = resolve_fire(&mut my_board, &mut target_board, target).unwrap();
        for record in &report.attacker {
            seen.insert(record.target);
            ai.observe(record);
        }
        me.apply_round(&my_board.snapshot(), GamePhase::Combat).unwrap();
        shots += 1;
        assert!(shots <= 100);
    }
    assert!(shots >= config.fleet.iter().map(|t| t.size() as u32 * t.max_count()).sum());
}

#[test]
fn test_ai_follows_up_on_damage() {
    let config = MatchConfig::default();
    let mut rng = SmallRng::seed_from_u64(3);
    let mut me = PlayerState::new(config.clone(), PlayerSlot::FIRST);
    me.set_phase(GamePhase::Combat);

    let mut target_board = PlayerBoard::new(&config);
    target_board
        .place_ship(
            broadside::ShipKind::Quadruple,
            Coord::new(4, 4),
            broadside::Orientation::Horizontal,
        )
        .unwrap();
    let mut my_board = me.board().clone();
    let report = resolve_fire(&mut my_board, &mut target_board, Coord::new(5, 4)).unwrap();
    assert_eq!(report.outcome(), Some(HitResult::Damaged));
    me.apply_round(&my_board.snapshot(), GamePhase::Combat).unwrap();

    let mut ai = AiController::new();
    ai.observe(&report.attacker[0]);
    let next = ai.select_target(&mut rng, &me).unwrap();
    let neighbours = [(4, 4), (6, 4), (5, 3), (5, 5)].map(Coord::from);
    assert!(neighbours.contains(&next), "{} is not next to the hit", next);
}
