use broadside::{
    Coord, GameError, HitResult, Orientation, ShipId, ShipKind, ShipRegistry, DEFAULT_FLEET,
};

fn registry() -> ShipRegistry {
    ShipRegistry::new(DEFAULT_FLEET)
}

#[test]
fn test_new_registry_has_full_availability() {
    let r = registry();
    assert_eq!(r.available(ShipKind::Single), 4);
    assert_eq!(r.available(ShipKind::Double), 3);
    assert_eq!(r.available(ShipKind::Triple), 2);
    assert_eq!(r.available(ShipKind::Quadruple), 1);
    assert!(r.has_available_ships_remaining());
    assert!(!r.has_ships_remaining());
    assert_eq!(r.total_alive(), 0);
}

#[test]
fn test_create_ship_moves_counters() {
    let mut r = registry();
    let ship = r
        .create_ship(ShipKind::Double, Coord::new(1, 1), Orientation::Vertical)
        .unwrap();
    assert_eq!(ship.id(), ShipId(0));
    assert_eq!(ship.health(), 2);
    assert_eq!(r.available(ShipKind::Double), 2);
    assert_eq!(r.current(ShipKind::Double), 1);
    assert_eq!(r.total_alive(), 1);

    let next = r
        .create_ship(ShipKind::Single, Coord::new(5, 5), Orientation::Horizontal)
        .unwrap();
    assert_eq!(next.id(), ShipId(1));
}

#[test]
fn test_create_ship_fails_when_exhausted() {
    let mut r = registry();
    r.create_ship(ShipKind::Quadruple, Coord::new(0, 0), Orientation::Horizontal)
        .unwrap();
    let before = r.clone();
    assert_eq!(
        r.create_ship(ShipKind::Quadruple, Coord::new(0, 4), Orientation::Horizontal),
        Err(GameError::NoShipsAvailable(ShipKind::Quadruple))
    );
    assert_eq!(r, before);
}

#[test]
fn test_single_ship_dies_on_first_hit() {
    let mut r = registry();
    let ship = r
        .create_ship(ShipKind::Single, Coord::new(0, 0), Orientation::Horizontal)
        .unwrap();
    assert_eq!(r.hit_ship(ship.id()), Ok(HitResult::Killed));
    assert_eq!(r.current(ShipKind::Single), 0);
    assert!(!r.has_ships_remaining());
}

#[test]
fn test_quadruple_needs_four_hits() {
    let mut r = registry();
    let ship = r
        .create_ship(ShipKind::Quadruple, Coord::new(0, 0), Orientation::Horizontal)
        .unwrap();
    for _ in 0..3 {
        assert_eq!(r.hit_ship(ship.id()), Ok(HitResult::Damaged));
        assert!(r.has_ships_remaining());
    }
    assert_eq!(r.hit_ship(ship.id()), Ok(HitResult::Killed));
    assert_eq!(r.instance(ship.id()).map(|s| s.health()), Some(0));
    assert_eq!(r.total_alive(), 0);
}

#[test]
fn test_hit_ship_reports_desync_errors() {
    let mut r = registry();
    let ship = r
        .create_ship(ShipKind::Single, Coord::new(0, 0), Orientation::Horizontal)
        .unwrap();
    let err = r.hit_ship(ShipId(9)).unwrap_err();
    assert_eq!(err, GameError::InvalidShipIndex(ShipId(9)));
    assert!(err.is_desync());

    r.hit_ship(ship.id()).unwrap();
    let err = r.hit_ship(ship.id()).unwrap_err();
    assert_eq!(err, GameError::ShipAlreadySunk(ship.id()));
    assert!(err.is_desync());
    assert_eq!(r.total_alive(), 0);
}

#[test]
fn test_sunk_ships_stay_in_history() {
    let mut r = registry();
    let a = r
        .create_ship(ShipKind::Single, Coord::new(0, 0), Orientation::Horizontal)
        .unwrap();
    r.create_ship(ShipKind::Single, Coord::new(4, 4), Orientation::Horizontal)
        .unwrap();
    r.hit_ship(a.id()).unwrap();
    assert_eq!(r.instances().len(), 2);
    assert_eq!(r.current_counts(), [1, 0, 0, 0]);
    assert_eq!(r.available(ShipKind::Single), 2);
}
