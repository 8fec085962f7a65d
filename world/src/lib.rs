#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative in-memory game session for Path Defence.
//!
//! A [`Session`] owns the generated board, the wave scheduler, the live creeps
//! and the player's gold and lives. Presentation adapters drive it with
//! [`Session::start_wave`] and [`Session::update`] and react to the
//! [`SessionEvent`]s it reports; combat collaborators damage and slow creeps
//! through [`Session::creeps_mut`].

mod config;

use std::time::Duration;

pub use config::{
    ConfigError, EconomySettings, GameConfig, WaveSettings, DEFAULT_START_GOLD,
    DEFAULT_START_LIVES, MAX_SPAWN_INTERVAL,
};
use path_defence_core::{Grid, SeedRng};
use path_defence_system_map_generation::MapGenerator;
use path_defence_system_movement::{Advance, Creep};
use path_defence_system_waves::{Config as WaveConfig, WaveSystem};
use tracing::{debug, info};

/// Longest frame step a single update simulates.
pub const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

/// Coarse game phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Between waves; the player may build and start the next wave.
    #[default]
    Build,
    /// A wave is spawning or its creeps are still on the board.
    Combat,
}

/// Notable state changes reported by the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A wave began spawning.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Display name of the wave.
        name: String,
    },
    /// A creep entered the board.
    CreepSpawned {
        /// Wave the creep belongs to.
        wave: u32,
    },
    /// A creep reached the base and cost a life.
    CreepLeaked {
        /// Lives left after the leak.
        lives: u32,
    },
    /// A creep died and paid its bounty.
    CreepKilled {
        /// Gold awarded for the kill.
        bounty: u32,
        /// Gold held after the payout.
        gold: u32,
    },
    /// The wave finished spawning and every creep is gone.
    WaveCleared {
        /// One-based wave number.
        wave: u32,
    },
}

/// One run of the game on a single seeded board.
#[derive(Clone, Debug)]
pub struct Session {
    seed: String,
    config: GameConfig,
    grid: Grid,
    waves: WaveSystem,
    creeps: Vec<Creep>,
    gold: u32,
    lives: u32,
    phase: Phase,
}

impl Session {
    /// Generates the board for `seed` and prepares the configured campaign.
    #[must_use]
    pub fn new(seed: impl Into<String>, config: &GameConfig) -> Self {
        let seed = seed.into();
        let grid = MapGenerator::new(config.board.clone()).generate(&seed);
        let waves = build_waves(&grid, config);
        info!(
            seed = %seed,
            columns = grid.columns(),
            rows = grid.rows(),
            path = grid.path().len(),
            spawns = grid.spawns().len(),
            "session ready"
        );
        Self {
            seed,
            config: config.clone(),
            grid,
            waves,
            creeps: Vec::new(),
            gold: config.economy.start_gold,
            lives: config.economy.start_lives,
            phase: Phase::Build,
        }
    }

    /// Replaces the board, waves, creeps and resources with a fresh run on
    /// `seed`.
    pub fn reroll(&mut self, seed: impl Into<String>) {
        let config = self.config.clone();
        *self = Self::new(seed, &config);
    }

    /// Starts the next wave when the session is between waves.
    ///
    /// Returns `false` during combat or once the campaign is exhausted.
    pub fn start_wave(&mut self, out: &mut Vec<SessionEvent>) -> bool {
        if self.phase == Phase::Combat || !self.waves.start_next_wave() {
            return false;
        }
        self.phase = Phase::Combat;
        let hud = self.waves.hud_info();
        let name = hud.current_name.unwrap_or_default();
        info!(wave = hud.wave_number, name = %name, "wave started");
        out.push(SessionEvent::WaveStarted {
            wave: hud.wave_number,
            name,
        });
        true
    }

    /// Advances the session by `dt`, clamped to [`MAX_FRAME_STEP`].
    ///
    /// Due creeps spawn first. Every creep then moves; creeps that reach the
    /// base cost a life and dead creeps pay their bounty, and both leave the
    /// board. Combat ends once the wave has finished spawning and the board is
    /// empty.
    pub fn update(&mut self, dt: Duration, out: &mut Vec<SessionEvent>) {
        let dt = dt.min(MAX_FRAME_STEP);
        let wave = self.waves.wave_number();

        let before = self.creeps.len();
        self.waves.update(dt, &mut self.creeps);
        for _ in before..self.creeps.len() {
            out.push(SessionEvent::CreepSpawned { wave });
        }

        for index in (0..self.creeps.len()).rev() {
            if self.creeps[index].advance(dt) == Advance::Reached {
                let _ = self.creeps.remove(index);
                self.lives = self.lives.saturating_sub(1);
                debug!(lives = self.lives, "creep leaked");
                out.push(SessionEvent::CreepLeaked { lives: self.lives });
            } else if !self.creeps[index].is_alive() {
                let bounty = self.creeps.remove(index).bounty();
                self.gold = self.gold.saturating_add(bounty);
                out.push(SessionEvent::CreepKilled {
                    bounty,
                    gold: self.gold,
                });
            }
        }

        if self.phase == Phase::Combat && !self.waves.is_active() && self.creeps.is_empty() {
            self.phase = Phase::Build;
            info!(wave, lives = self.lives, gold = self.gold, "wave cleared");
            out.push(SessionEvent::WaveCleared { wave });
        }
    }

    /// Seed the board was generated from.
    #[must_use]
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Configuration the session was built with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Generated board.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Wave scheduler.
    #[must_use]
    pub const fn waves(&self) -> &WaveSystem {
        &self.waves
    }

    /// Creeps currently on the board.
    #[must_use]
    pub fn creeps(&self) -> &[Creep] {
        &self.creeps
    }

    /// Mutable access to the creeps for damage and slow effects.
    #[must_use]
    pub fn creeps_mut(&mut self) -> &mut [Creep] {
        &mut self.creeps
    }

    /// Gold held by the player.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Lives left.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Reports whether every life has been lost.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.lives == 0
    }
}

fn build_waves(grid: &Grid, config: &GameConfig) -> WaveSystem {
    let wave_config = WaveConfig::new(config.board.sanitized().tile_length)
        .with_multi_spawn_activation_wave(config.waves.multi_spawn_activation_wave);
    let mut waves = WaveSystem::new(grid, SeedRng::new(&config.waves.seed), wave_config);
    waves.queue_waves(config.campaign.iter().cloned());
    waves
}
