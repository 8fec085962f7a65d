use std::time::Duration;

use glam::Vec2;
use path_defence_core::CellCoord;
use path_defence_system_movement::{Advance, Creep};

fn l_shaped(speed: f32) -> Creep {
    Creep::from_waypoints(
        vec![Vec2::new(0.0, 0.0), Vec2::new(0.0, 2.0), Vec2::new(2.0, 2.0)],
        speed,
        10.0,
    )
}

#[test]
fn creep_pauses_on_corner_for_the_rest_of_the_tick() {
    let mut creep = l_shaped(3.0);

    assert_eq!(creep.advance(Duration::from_secs(1)), Advance::InTransit);
    assert_eq!(creep.position(), Vec2::new(0.0, 2.0));
    assert_eq!(creep.path_index(), 1);

    assert_eq!(creep.advance(Duration::from_secs(1)), Advance::Reached);
    assert_eq!(creep.position(), Vec2::new(2.0, 2.0));
    assert_eq!(creep.path_index(), 2);
}

#[test]
fn creep_moves_partially_along_a_segment() {
    let mut creep = l_shaped(1.0);

    assert_eq!(creep.advance(Duration::from_millis(500)), Advance::InTransit);
    let position = creep.position();
    assert!(position.x.abs() < 1e-6);
    assert!((position.y - 0.5).abs() < 1e-5, "{position:?}");
    assert_eq!(creep.path_index(), 0);
}

#[test]
fn path_index_never_decreases() {
    let route: Vec<CellCoord> = (0..6)
        .map(|column| CellCoord::new(column, 0))
        .chain((1..6).map(|row| CellCoord::new(5, row)))
        .collect();
    let mut creep = Creep::new(&route, 32.0, 2.0, 10.0);
    let mut last = creep.path_index();
    for _ in 0..200 {
        let progress = creep.advance(Duration::from_millis(50));
        assert!(creep.path_index() >= last);
        last = creep.path_index();
        if progress == Advance::Reached {
            break;
        }
    }
    assert_eq!(creep.position(), Vec2::new(5.0 * 32.0 + 16.0, 5.0 * 32.0 + 16.0));
}

#[test]
fn stronger_slow_wins_and_keeps_its_duration() {
    let mut creep = l_shaped(1.0);
    creep.apply_slow(0.3, Duration::from_secs(1));
    creep.apply_slow(0.2, Duration::from_secs(5));

    assert_eq!(creep.slow_pct(), 0.3);
    assert_eq!(creep.slow_remaining(), Duration::from_secs(1));
}

#[test]
fn equal_slow_refreshes_to_the_longer_duration() {
    let mut creep = l_shaped(1.0);
    creep.apply_slow(0.3, Duration::from_secs(1));
    creep.apply_slow(0.3, Duration::from_secs(5));

    assert_eq!(creep.slow_pct(), 0.3);
    assert_eq!(creep.slow_remaining(), Duration::from_secs(5));

    creep.apply_slow(0.3, Duration::from_secs(2));
    assert_eq!(creep.slow_remaining(), Duration::from_secs(5));
}

#[test]
fn slow_reduces_speed_and_expires() {
    let mut creep = l_shaped(10.0);
    creep.apply_slow(0.5, Duration::from_millis(100));
    assert!((creep.current_speed() - 5.0).abs() < 1e-6);

    let _ = creep.advance(Duration::from_millis(100));
    assert_eq!(creep.slow_pct(), 0.0);
    assert_eq!(creep.slow_remaining(), Duration::ZERO);
    assert!((creep.current_speed() - 10.0).abs() < 1e-6);
}

#[test]
fn zero_duration_slow_clears_on_next_tick() {
    let mut creep = l_shaped(1.0);
    creep.apply_slow(0.4, Duration::ZERO);
    assert_eq!(creep.slow_pct(), 0.4);

    let _ = creep.advance(Duration::from_millis(16));
    assert_eq!(creep.slow_pct(), 0.0);
}

#[test]
fn damage_kills_and_dead_creeps_stay_put() {
    let mut creep = l_shaped(1.0).with_bounty(3);
    assert_eq!(creep.bounty(), 3);

    creep.take_damage(4.0);
    assert!(creep.is_alive());
    assert_eq!(creep.hp(), 6.0);

    creep.take_damage(6.0);
    assert!(!creep.is_alive());

    let before = creep.position();
    assert_eq!(creep.advance(Duration::from_secs(1)), Advance::InTransit);
    assert_eq!(creep.position(), before);

    creep.take_damage(100.0);
    assert_eq!(creep.hp(), 0.0);
}

#[test]
fn empty_route_reaches_immediately() {
    let mut creep = Creep::new(&[], 32.0, 2.0, 10.0);
    assert_eq!(creep.position(), Vec2::ZERO);
    assert_eq!(creep.advance(Duration::from_millis(16)), Advance::Reached);
}

#[test]
fn tile_route_starts_at_first_tile_centre() {
    let route = [CellCoord::new(2, 3), CellCoord::new(3, 3)];
    let creep = Creep::new(&route, 32.0, 2.2, 28.0);
    assert_eq!(creep.position(), Vec2::new(80.0, 112.0));
    assert!((creep.current_speed() - 2.2 * 32.0).abs() < 1e-4);
    assert_eq!(creep.max_hp(), 28.0);
}
