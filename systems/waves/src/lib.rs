#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling and creep spawning.
//!
//! Starting a wave expands its entries into timed spawn jobs with a little
//! seeded jitter, assigns each job to a spawn point round-robin, and compounds
//! the hit point and speed multipliers. Each update fires the jobs whose time
//! has come and builds the creeps along the route that belongs to their spawn.

use std::{collections::VecDeque, time::Duration};

use path_defence_core::{
    default_waves, CellCoord, CreepKind, Grid, SeedRng, WaveDefinition, DEFAULT_TILE_LENGTH,
};
use path_defence_system_movement::Creep;
use tracing::debug;

/// Seed used for the wave jitter stream when the caller has no preference.
pub const DEFAULT_WAVE_SEED: &str = "waves";
/// First wave number on which every spawn point takes part.
pub const DEFAULT_MULTI_SPAWN_ACTIVATION_WAVE: u32 = 3;

const HP_GROWTH: f32 = 1.15;
const SPEED_GROWTH: f32 = 1.03;
const MAX_JITTER_SECS: f64 = 0.2;
const JITTER_SHARE: f64 = 0.25;

/// Configuration parameters required to construct the wave system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    tile_length: f32,
    multi_spawn_activation_wave: u32,
}

impl Config {
    /// Creates a configuration for boards whose tiles are `tile_length` world
    /// units wide.
    #[must_use]
    pub const fn new(tile_length: f32) -> Self {
        Self {
            tile_length,
            multi_spawn_activation_wave: DEFAULT_MULTI_SPAWN_ACTIVATION_WAVE,
        }
    }

    /// Sets the first wave on which extra spawns activate; zero counts as one.
    #[must_use]
    pub fn with_multi_spawn_activation_wave(mut self, wave: u32) -> Self {
        self.multi_spawn_activation_wave = wave.max(1);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_LENGTH)
    }
}

/// One creep waiting to be spawned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnJob {
    /// Offset from the wave start at which the creep appears.
    pub fire_at: Duration,
    /// Archetype to spawn.
    pub kind: CreepKind,
    /// Spawn point the creep enters from.
    pub spawn_index: usize,
}

/// Read-only snapshot for heads-up displays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudInfo {
    /// One-based number of the current wave, zero before the first wave.
    pub wave_number: u32,
    /// Name of the current wave.
    pub current_name: Option<String>,
    /// Name of the wave that would start next.
    pub next_name: Option<String>,
    /// Jobs of the current wave that have not fired yet.
    pub remaining_spawns: usize,
    /// Whether the current wave is still spawning.
    pub active: bool,
    /// Whether another wave is queued.
    pub more_waves: bool,
    /// Every registered spawn point.
    pub spawns: Vec<CellCoord>,
    /// Spawn points that currently receive creeps.
    pub active_spawns: usize,
    /// Number of registered spawn points.
    pub total_spawns: usize,
    /// First wave on which every spawn point takes part.
    pub multi_spawn_activation_wave: u32,
}

/// Schedules waves and emits creeps along per-spawn routes.
#[derive(Clone, Debug)]
pub struct WaveSystem {
    main_path: Vec<CellCoord>,
    rng: SeedRng,
    tile_length: f32,
    waves: Vec<WaveDefinition>,
    wave_index: Option<usize>,
    active: bool,
    clock: Duration,
    queue: VecDeque<SpawnJob>,
    spawn_points: Vec<CellCoord>,
    spawn_prefixes: Vec<Vec<CellCoord>>,
    hp_scale: f32,
    speed_scale: f32,
    multi_spawn_activation_wave: u32,
}

impl WaveSystem {
    /// Creates a wave system that spawns onto `grid`.
    #[must_use]
    pub fn new(grid: &Grid, rng: SeedRng, config: Config) -> Self {
        let mut system = Self {
            main_path: grid.path().to_vec(),
            rng,
            tile_length: config.tile_length,
            waves: Vec::new(),
            wave_index: None,
            active: false,
            clock: Duration::ZERO,
            queue: VecDeque::new(),
            spawn_points: Vec::new(),
            spawn_prefixes: Vec::new(),
            hp_scale: 1.0,
            speed_scale: 1.0,
            multi_spawn_activation_wave: config.multi_spawn_activation_wave.max(1),
        };
        system.set_spawns_from_grid(grid);
        system
    }

    /// Replaces the spawn points and feeders with those recorded on `grid`.
    ///
    /// The main path captured at construction is kept.
    pub fn set_spawns_from_grid(&mut self, grid: &Grid) {
        self.spawn_points = grid.spawns().to_vec();
        self.spawn_prefixes = grid.spawn_prefixes().to_vec();
        if self.spawn_points.is_empty() {
            self.spawn_points.push(grid.spawn());
        }
        self.spawn_prefixes
            .resize_with(self.spawn_points.len(), Vec::new);
    }

    /// Registers an additional spawn point with an optional feeder route.
    pub fn add_spawn_point(&mut self, spawn: CellCoord, prefix: Vec<CellCoord>) {
        self.spawn_points.push(spawn);
        self.spawn_prefixes.push(prefix);
    }

    /// Sets the first wave on which every spawn point takes part; zero counts
    /// as one.
    pub fn set_multi_spawn_activation_wave(&mut self, wave: u32) {
        self.multi_spawn_activation_wave = wave.max(1);
    }

    /// Appends wave definitions to the campaign.
    pub fn queue_waves<I>(&mut self, waves: I)
    where
        I: IntoIterator<Item = WaveDefinition>,
    {
        self.waves.extend(waves);
    }

    /// Appends the built-in five-wave campaign.
    pub fn queue_default_set(&mut self) {
        self.queue_waves(default_waves());
    }

    /// Starts the next queued wave.
    ///
    /// Returns `false` while a wave is still spawning or when no definitions
    /// remain.
    pub fn start_next_wave(&mut self) -> bool {
        if self.active {
            return false;
        }
        let next = self.wave_index.map_or(0, |index| index + 1);
        if next >= self.waves.len() {
            return false;
        }

        self.wave_index = Some(next);
        let active_spawns = self.active_spawn_count();
        let definition = &self.waves[next];

        let mut jobs = Vec::with_capacity(definition.creep_count() as usize);
        for entry in &definition.entries {
            let spread = MAX_JITTER_SECS.min(entry.interval.as_secs_f64() * JITTER_SHARE);
            for ordinal in 0..entry.count {
                let jitter = (self.rng.range(1.0) - 0.5) * spread;
                jobs.push(SpawnJob {
                    fire_at: jittered(entry.interval.saturating_mul(ordinal), jitter),
                    kind: entry.kind,
                    spawn_index: round_robin(ordinal, active_spawns),
                });
            }
        }
        jobs.sort_by_key(|job| job.fire_at);

        debug!(
            wave = next + 1,
            name = %definition.name,
            jobs = jobs.len(),
            active_spawns,
            "wave started"
        );

        self.queue = jobs.into();
        self.clock = Duration::ZERO;
        self.active = true;
        self.hp_scale *= HP_GROWTH;
        self.speed_scale *= SPEED_GROWTH;
        true
    }

    /// Reports whether another wave is queued after the current one.
    #[must_use]
    pub fn has_more_waves(&self) -> bool {
        self.wave_index.map_or(0, |index| index + 1) < self.waves.len()
    }

    /// Advances the wave clock and pushes every creep whose job is due.
    pub fn update(&mut self, dt: Duration, out: &mut Vec<Creep>) {
        if !self.active {
            return;
        }
        self.clock = self.clock.saturating_add(dt);

        while self
            .queue
            .front()
            .is_some_and(|job| job.fire_at <= self.clock)
        {
            let Some(job) = self.queue.pop_front() else {
                break;
            };
            let active_spawns = self.active_spawn_count();
            let spawn_index = job.spawn_index.min(active_spawns.saturating_sub(1));
            let route = self.route_for(spawn_index);
            out.push(spawn_creep(
                job.kind,
                &route,
                self.tile_length,
                self.hp_scale,
                self.speed_scale,
            ));
        }

        if self.queue.is_empty() {
            self.active = false;
            debug!(wave = self.wave_number(), "wave finished spawning");
        }
    }

    /// Snapshot of the scheduler state for display.
    #[must_use]
    pub fn hud_info(&self) -> HudInfo {
        let current = self.wave_index.and_then(|index| self.waves.get(index));
        let next = self.waves.get(self.wave_index.map_or(0, |index| index + 1));
        HudInfo {
            wave_number: self.wave_number(),
            current_name: current.map(|wave| wave.name.clone()),
            next_name: next.map(|wave| wave.name.clone()),
            remaining_spawns: self.queue.len(),
            active: self.active,
            more_waves: self.has_more_waves(),
            spawns: self.spawn_points.clone(),
            active_spawns: self.active_spawn_count(),
            total_spawns: self.spawn_points.len(),
            multi_spawn_activation_wave: self.multi_spawn_activation_wave,
        }
    }

    /// One-based number of the current wave, zero before the first wave.
    #[must_use]
    pub fn wave_number(&self) -> u32 {
        self.wave_index.map_or(0, |index| index as u32 + 1)
    }

    /// Number of queued wave definitions, started or not.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Compound hit point multiplier applied to new creeps.
    #[must_use]
    pub const fn hp_scale(&self) -> f32 {
        self.hp_scale
    }

    /// Compound speed multiplier applied to new creeps.
    #[must_use]
    pub const fn speed_scale(&self) -> f32 {
        self.speed_scale
    }

    /// Whether the current wave still has jobs to fire.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Jobs of the current wave that have not fired, in firing order.
    pub fn pending_jobs(&self) -> impl ExactSizeIterator<Item = &SpawnJob> + '_ {
        self.queue.iter()
    }

    /// Every registered spawn point.
    #[must_use]
    pub fn spawn_points(&self) -> &[CellCoord] {
        &self.spawn_points
    }

    fn active_spawn_count(&self) -> usize {
        if self.wave_number() < self.multi_spawn_activation_wave {
            self.spawn_points.len().min(1)
        } else {
            self.spawn_points.len()
        }
    }

    /// Route for creeps entering from `spawn_index`.
    ///
    /// A spawn with a feeder walks the feeder and then the main path beyond
    /// the merge tile. Without a feeder the route starts on the main path at
    /// the spawn tile, or at the nearest main path tile.
    fn route_for(&self, spawn_index: usize) -> Vec<CellCoord> {
        let main = &self.main_path;
        if main.is_empty() {
            return Vec::new();
        }

        if let Some(prefix) = self
            .spawn_prefixes
            .get(spawn_index)
            .filter(|prefix| !prefix.is_empty())
        {
            let merge = prefix[prefix.len() - 1];
            let merge_index = main.iter().position(|&tile| tile == merge).unwrap_or(0);
            let mut route = prefix.clone();
            route.extend_from_slice(&main[merge_index + 1..]);
            return route;
        }

        let spawn = self
            .spawn_points
            .get(spawn_index)
            .or_else(|| self.spawn_points.first())
            .copied()
            .unwrap_or(main[0]);
        let start = main
            .iter()
            .position(|&tile| tile == spawn)
            .unwrap_or_else(|| nearest_index(main, spawn));
        main[start..].to_vec()
    }
}

/// Builds a creep of `kind` with its preset statistics scaled by the wave
/// multipliers.
#[must_use]
pub fn spawn_creep(
    kind: CreepKind,
    route: &[CellCoord],
    tile_length: f32,
    hp_scale: f32,
    speed_scale: f32,
) -> Creep {
    let preset = kind.preset();
    Creep::new(
        route,
        tile_length,
        preset.speed_tiles_per_sec * speed_scale,
        preset.hit_points * hp_scale,
    )
    .with_bounty(preset.bounty)
}

/// Shifts `nominal` by `jitter_secs`, saturating at zero and `Duration::MAX`.
fn jittered(nominal: Duration, jitter_secs: f64) -> Duration {
    let offset = Duration::try_from_secs_f64(jitter_secs.abs()).unwrap_or_default();
    if jitter_secs < 0.0 {
        nominal.saturating_sub(offset)
    } else {
        nominal.saturating_add(offset)
    }
}

fn round_robin(ordinal: u32, active_spawns: usize) -> usize {
    if active_spawns > 1 {
        ordinal as usize % active_spawns
    } else {
        0
    }
}

fn nearest_index(path: &[CellCoord], target: CellCoord) -> usize {
    path.iter()
        .enumerate()
        .min_by_key(|(_, tile)| tile.manhattan_distance(target))
        .map_or(0, |(index, _)| index)
}
