use std::time::Duration;

use glam::Vec2;
use path_defence_core::{
    CellCoord, CellLayer, CreepKind, Grid, SeedRng, WaveDefinition, WaveEntry,
};
use path_defence_system_movement::Creep;
use path_defence_system_waves::{Config, WaveSystem, DEFAULT_WAVE_SEED};

const TILE: f32 = 32.0;

fn centre(column: u32, row: u32) -> Vec2 {
    Vec2::new(
        column as f32 * TILE + TILE / 2.0,
        row as f32 * TILE + TILE / 2.0,
    )
}

/// Straight main path along row 1 with a feeder from (0, 3) merging at (2, 1).
fn board_with_feeder() -> Grid {
    let path: Vec<CellCoord> = (0..6).map(|column| CellCoord::new(column, 1)).collect();
    let feeder = vec![
        CellCoord::new(0, 3),
        CellCoord::new(1, 3),
        CellCoord::new(2, 3),
        CellCoord::new(2, 2),
        CellCoord::new(2, 1),
    ];
    Grid::from_parts(
        CellLayer::new(6, 5),
        path,
        CellCoord::new(5, 1),
        vec![CellCoord::new(0, 1), CellCoord::new(0, 3)],
        vec![Vec::new(), feeder],
    )
}

fn system(grid: &Grid) -> WaveSystem {
    WaveSystem::new(grid, SeedRng::new(DEFAULT_WAVE_SEED), Config::new(TILE))
}

fn single_entry(name: &str, kind: CreepKind, count: u32, interval_ms: u64) -> WaveDefinition {
    WaveDefinition::new(
        name,
        vec![WaveEntry::new(kind, count, Duration::from_millis(interval_ms))],
    )
}

fn drain(waves: &mut WaveSystem) -> Vec<Creep> {
    let mut creeps = Vec::new();
    for _ in 0..1_000 {
        if !waves.is_active() {
            break;
        }
        waves.update(Duration::from_millis(100), &mut creeps);
    }
    creeps
}

#[test]
fn scaling_compounds_per_started_wave() {
    let grid = board_with_feeder();
    let mut waves = system(&grid);
    waves.queue_default_set();

    assert!(waves.start_next_wave());
    let _ = drain(&mut waves);
    assert!(waves.start_next_wave());

    assert!((waves.hp_scale() - 1.15_f32.powi(2)).abs() < 1e-5);
    assert!((waves.speed_scale() - 1.03_f32.powi(2)).abs() < 1e-5);
    assert_eq!(waves.wave_number(), 2);
}

#[test]
fn start_is_refused_while_active_and_when_exhausted() {
    let grid = board_with_feeder();
    let mut waves = system(&grid);
    assert!(!waves.start_next_wave(), "no waves queued");

    waves.queue_waves([single_entry("Only", CreepKind::Basic, 2, 500)]);
    assert!(waves.has_more_waves());
    assert!(waves.start_next_wave());
    assert!(!waves.start_next_wave(), "wave still spawning");
    assert!(!waves.has_more_waves());

    let creeps = drain(&mut waves);
    assert_eq!(creeps.len(), 2);
    assert!(!waves.start_next_wave(), "campaign exhausted");
    assert_eq!(waves.wave_number(), 1);
}

#[test]
fn jobs_are_sorted_and_jitter_stays_bounded() {
    let grid = board_with_feeder();
    let mut waves = system(&grid);
    waves.queue_waves([WaveDefinition::new(
        "Mixed",
        vec![
            WaveEntry::new(CreepKind::Basic, 8, Duration::from_millis(550)),
            WaveEntry::new(CreepKind::Fast, 6, Duration::from_millis(200)),
        ],
    )]);
    assert!(waves.start_next_wave());

    let jobs: Vec<_> = waves.pending_jobs().copied().collect();
    assert_eq!(jobs.len(), 14);
    for pair in jobs.windows(2) {
        assert!(pair[0].fire_at <= pair[1].fire_at);
    }

    let mut fast: Vec<_> = jobs
        .iter()
        .filter(|job| job.kind == CreepKind::Fast)
        .map(|job| job.fire_at.as_secs_f64())
        .collect();
    fast.sort_by(f64::total_cmp);
    for (ordinal, fire_at) in fast.into_iter().enumerate() {
        let nominal = ordinal as f64 * 0.2;
        assert!((fire_at - nominal).abs() <= 0.025 + 1e-6, "{fire_at} vs {nominal}");
    }
}

#[test]
fn huge_intervals_saturate_instead_of_overflowing() {
    let grid = board_with_feeder();
    let mut waves = system(&grid);
    waves.queue_waves([WaveDefinition::new(
        "Glacial",
        vec![WaveEntry::new(
            CreepKind::Basic,
            3,
            Duration::from_secs(u64::MAX / 2),
        )],
    )]);
    assert!(waves.start_next_wave());

    let jobs: Vec<_> = waves.pending_jobs().copied().collect();
    assert_eq!(jobs.len(), 3);
    assert!(jobs[0].fire_at < Duration::from_secs(1));
    assert!(jobs[2].fire_at >= Duration::from_secs(u64::MAX - 1));

    let mut creeps = Vec::new();
    waves.update(Duration::from_millis(100), &mut creeps);
    assert_eq!(creeps.len(), 1);
    assert!(waves.is_active());
}

#[test]
fn same_seed_schedules_identically() {
    let grid = board_with_feeder();
    let schedule = || {
        let mut waves = system(&grid);
        waves.queue_default_set();
        assert!(waves.start_next_wave());
        waves.pending_jobs().copied().collect::<Vec<_>>()
    };
    assert_eq!(schedule(), schedule());
}

#[test]
fn extra_spawns_wait_for_the_activation_wave() {
    let grid = board_with_feeder();
    let mut waves = system(&grid);
    waves.queue_waves(
        (1..=3).map(|wave| single_entry(&format!("W{wave}"), CreepKind::Basic, 4, 600)),
    );

    for _ in 0..2 {
        assert!(waves.start_next_wave());
        assert!(waves.pending_jobs().all(|job| job.spawn_index == 0));
        assert_eq!(waves.hud_info().active_spawns, 1);
        let _ = drain(&mut waves);
    }

    assert!(waves.start_next_wave());
    let indices: Vec<usize> = waves.pending_jobs().map(|job| job.spawn_index).collect();
    assert_eq!(indices, [0, 1, 0, 1]);
    assert_eq!(waves.hud_info().active_spawns, 2);
}

#[test]
fn round_robin_follows_entry_order() {
    let grid = board_with_feeder();
    let mut waves = system(&grid);
    waves.add_spawn_point(CellCoord::new(3, 4), Vec::new());
    waves.set_multi_spawn_activation_wave(0);
    waves.queue_waves([single_entry("Spread", CreepKind::Fast, 7, 600)]);

    assert!(waves.start_next_wave());
    let indices: Vec<usize> = waves.pending_jobs().map(|job| job.spawn_index).collect();
    assert_eq!(indices, [0, 1, 2, 0, 1, 2, 0]);
    assert_eq!(waves.hud_info().multi_spawn_activation_wave, 1);
}

#[test]
fn creeps_follow_the_route_of_their_spawn() {
    let grid = board_with_feeder();
    let mut waves = system(&grid);
    waves.add_spawn_point(CellCoord::new(3, 3), Vec::new());
    waves.set_multi_spawn_activation_wave(1);
    waves.queue_waves([single_entry("Routes", CreepKind::Basic, 3, 600)]);
    assert!(waves.start_next_wave());

    let creeps = drain(&mut waves);
    assert_eq!(creeps.len(), 3);

    assert_eq!(creeps[0].waypoints(), &[centre(0, 1), centre(5, 1)]);
    assert_eq!(
        creeps[1].waypoints(),
        &[centre(0, 3), centre(2, 3), centre(2, 1), centre(5, 1)]
    );
    assert_eq!(creeps[2].waypoints(), &[centre(3, 1), centre(5, 1)]);

    for creep in &creeps {
        assert_eq!(creep.bounty(), 3);
        assert!((creep.max_hp() - 28.0 * 1.15).abs() < 1e-4);
    }
}

#[test]
fn empty_main_path_spawns_creeps_at_the_origin() {
    let grid = Grid::from_parts(
        CellLayer::new(4, 4),
        Vec::new(),
        CellCoord::new(3, 3),
        vec![CellCoord::new(0, 0)],
        Vec::new(),
    );
    let mut waves = system(&grid);
    waves.queue_waves([single_entry("Void", CreepKind::Tank, 1, 800)]);
    assert!(waves.start_next_wave());

    let creeps = drain(&mut waves);
    assert_eq!(creeps.len(), 1);
    assert_eq!(creeps[0].position(), Vec2::ZERO);
}

#[test]
fn hud_reports_progress() {
    let grid = board_with_feeder();
    let mut waves = system(&grid);
    waves.queue_default_set();

    let idle = waves.hud_info();
    assert_eq!(idle.wave_number, 0);
    assert_eq!(idle.current_name, None);
    assert_eq!(idle.next_name.as_deref(), Some("Scouts"));
    assert!(!idle.active);
    assert!(idle.more_waves);
    assert_eq!(idle.total_spawns, 2);
    assert_eq!(idle.spawns, grid.spawns());
    assert_eq!(idle.multi_spawn_activation_wave, 3);

    assert!(waves.start_next_wave());
    let mut creeps = Vec::new();
    waves.update(Duration::from_millis(700), &mut creeps);

    let running = waves.hud_info();
    assert_eq!(running.wave_number, 1);
    assert_eq!(running.current_name.as_deref(), Some("Scouts"));
    assert_eq!(running.next_name.as_deref(), Some("Drifters"));
    assert!(running.active);
    assert_eq!(running.remaining_spawns + creeps.len(), 10);
    assert!(!creeps.is_empty());
    assert_eq!(waves.wave_count(), 5);
}
