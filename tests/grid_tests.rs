use broadside::{Coord, GameError, Grid, GridSetup, ShipId};

#[test]
fn test_new_grid_is_empty() {
    let grid = Grid::new(GridSetup::new(10, 10));
    assert_eq!(grid.cell_count(), 100);
    assert_eq!(grid.occupied_count(), 0);
    assert_eq!(grid.hit_count(), 0);
    assert!(grid.cells().iter().all(|c| c.is_free() && !c.was_hit_once()));
}

#[test]
fn test_flat_index_is_column_major() {
    let grid = Grid::new(GridSetup::new(4, 3));
    assert_eq!(grid.flat_index(0, 0), Some(0));
    assert_eq!(grid.flat_index(0, 2), Some(2));
    assert_eq!(grid.flat_index(1, 0), Some(3));
    assert_eq!(grid.flat_index(3, 2), Some(11));
    assert_eq!(grid.flat_index(4, 0), None);
    assert_eq!(grid.flat_index(0, -1), None);
    for (i, cell) in grid.cells().iter().enumerate() {
        let p = cell.position();
        assert_eq!(grid.flat_index(p.x, p.y), Some(i));
    }
}

#[test]
fn test_out_of_bounds_cells_are_never_free_or_hit() {
    let grid = Grid::new(GridSetup::new(5, 5));
    for (x, y) in [(-1, 0), (0, -1), (5, 0), (0, 5), (i32::MAX, 2)] {
        assert!(!grid.in_bounds(x, y));
        assert!(!grid.is_free(x, y));
        assert!(!grid.was_hit_once(x, y));
        assert!(grid.cell(x, y).is_none());
    }
}

#[test]
fn test_mutators_reject_out_of_bounds() {
    let mut grid = Grid::new(GridSetup::new(5, 5));
    assert_eq!(grid.connect_ship(5, 0, ShipId(0)), Err(GameError::OutOfBounds { x: 5, y: 0 }));
    assert_eq!(grid.clear_cell(-1, 0), Err(GameError::OutOfBounds { x: -1, y: 0 }));
    assert_eq!(grid.mark_hit_once(0, 9), Err(GameError::OutOfBounds { x: 0, y: 9 }));
}

#[test]
fn test_connect_and_clear_leave_hit_flag_alone() {
    let mut grid = Grid::new(GridSetup::new(5, 5));
    grid.connect_ship(2, 3, ShipId(7)).unwrap();
    assert!(!grid.is_free(2, 3));
    assert_eq!(grid.occupant(2, 3), Some(ShipId(7)));

    grid.mark_hit_once(2, 3).unwrap();
    grid.clear_cell(2, 3).unwrap();
    assert!(grid.is_free(2, 3));
    assert!(grid.was_hit_once(2, 3));
}

#[test]
fn test_queries_are_idempotent() {
    let mut grid = Grid::new(GridSetup::new(6, 6));
    grid.connect_ship(1, 1, ShipId(0)).unwrap();
    grid.mark_hit_once(4, 4).unwrap();
    let before = grid.clone();
    for _ in 0..3 {
        for x in -1..7 {
            for y in -1..7 {
                assert_eq!(grid.is_free(x, y), before.is_free(x, y));
                assert_eq!(grid.was_hit_once(x, y), before.was_hit_once(x, y));
            }
        }
    }
    assert_eq!(grid, before);
}

#[test]
fn test_world_origin_follows_cell_size() {
    let mut setup = GridSetup::new(3, 3);
    setup.cell_size = 2.5;
    setup.origin = (10.0, -5.0);
    let grid = Grid::new(setup);
    assert_eq!(grid.world_origin(0, 0), Some((10.0, -5.0)));
    assert_eq!(grid.world_origin(2, 1), Some((15.0, -2.5)));
    assert_eq!(grid.world_origin(3, 0), None);
    assert_eq!(setup.world_origin(Coord::new(1, 2)), (12.5, 0.0));
}
