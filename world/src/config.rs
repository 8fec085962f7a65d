//! TOML game configuration.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use path_defence_core::{
    default_waves, BoardConfig, WaveDefinition, MAX_COLUMNS, MAX_ROWS, MIN_COLUMNS, MIN_ROWS,
};
use path_defence_system_waves::{DEFAULT_MULTI_SPAWN_ACTIVATION_WAVE, DEFAULT_WAVE_SEED};
use serde::Deserialize;
use thiserror::Error;

/// Gold a fresh session starts with.
pub const DEFAULT_START_GOLD: u32 = 100;
/// Lives a fresh session starts with.
pub const DEFAULT_START_LIVES: u32 = 20;
/// Longest spawn interval a wave entry may declare.
pub const MAX_SPAWN_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Failures raised while loading or validating a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}", .path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The contents were not valid TOML for a game configuration.
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
    /// The board is smaller than the generator supports.
    #[error(
        "board must be at least {}x{} tiles, got {columns}x{rows}",
        MIN_COLUMNS,
        MIN_ROWS
    )]
    BoardTooSmall {
        /// Requested columns.
        columns: u32,
        /// Requested rows.
        rows: u32,
    },
    /// The board is larger than the generator supports.
    #[error(
        "board must be at most {}x{} tiles, got {columns}x{rows}",
        MAX_COLUMNS,
        MAX_ROWS
    )]
    BoardTooLarge {
        /// Requested columns.
        columns: u32,
        /// Requested rows.
        rows: u32,
    },
    /// Tile length is zero, negative or not finite.
    #[error("tile length must be finite and positive, got {0}")]
    InvalidTileLength(f32),
    /// The path cap leaves no room for a spawn and a base.
    #[error("path_max_tiles must be at least 2, got {0}")]
    PathCapTooSmall(u32),
    /// A wave would never spawn anything.
    #[error("wave {index} ({name:?}) spawns no creeps")]
    EmptyWave {
        /// Zero-based position of the wave in the campaign.
        index: usize,
        /// Display name of the wave.
        name: String,
    },
    /// A wave entry waits longer than [`MAX_SPAWN_INTERVAL`] between creeps.
    #[error(
        "wave {index} ({name:?}) has a spawn interval above {} seconds",
        MAX_SPAWN_INTERVAL.as_secs()
    )]
    IntervalTooLong {
        /// Zero-based position of the wave in the campaign.
        index: usize,
        /// Display name of the wave.
        name: String,
    },
}

/// Wave scheduler settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveSettings {
    /// Seed of the spawn jitter stream.
    pub seed: String,
    /// First wave on which every spawn point takes part.
    pub multi_spawn_activation_wave: u32,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_WAVE_SEED.to_owned(),
            multi_spawn_activation_wave: DEFAULT_MULTI_SPAWN_ACTIVATION_WAVE,
        }
    }
}

/// Starting resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomySettings {
    /// Gold available when a session starts or rerolls.
    pub start_gold: u32,
    /// Lives available when a session starts or rerolls.
    pub start_lives: u32,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            start_gold: DEFAULT_START_GOLD,
            start_lives: DEFAULT_START_LIVES,
        }
    }
}

/// Complete game configuration.
///
/// Every section is optional; a missing `[[wave]]` list falls back to the
/// built-in campaign.
///
/// ```toml
/// [board]
/// columns = 40
/// rows = 30
///
/// [waves]
/// seed = "weekly"
///
/// [[wave]]
/// name = "Opening"
/// [[wave.entry]]
/// type = "fast"
/// count = 6
/// interval = 0.4
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Board dimensions and path cap.
    pub board: BoardConfig,
    /// Wave scheduler settings.
    pub waves: WaveSettings,
    /// Starting resources.
    pub economy: EconomySettings,
    /// Campaign, in play order.
    #[serde(rename = "wave")]
    pub campaign: Vec<WaveDefinition>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            waves: WaveSettings::default(),
            economy: EconomySettings::default(),
            campaign: default_waves(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Rejects configurations the session cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let board = &self.board;
        if board.columns < MIN_COLUMNS || board.rows < MIN_ROWS {
            return Err(ConfigError::BoardTooSmall {
                columns: board.columns,
                rows: board.rows,
            });
        }
        if board.columns > MAX_COLUMNS || board.rows > MAX_ROWS {
            return Err(ConfigError::BoardTooLarge {
                columns: board.columns,
                rows: board.rows,
            });
        }
        if !board.tile_length.is_finite() || board.tile_length <= 0.0 {
            return Err(ConfigError::InvalidTileLength(board.tile_length));
        }
        if let Some(cap) = board.path_max_tiles.filter(|&cap| cap < 2) {
            return Err(ConfigError::PathCapTooSmall(cap));
        }
        if let Some((index, wave)) = self
            .campaign
            .iter()
            .enumerate()
            .find(|(_, wave)| wave.creep_count() == 0)
        {
            return Err(ConfigError::EmptyWave {
                index,
                name: wave.name.clone(),
            });
        }
        if let Some((index, wave)) = self.campaign.iter().enumerate().find(|(_, wave)| {
            wave.entries
                .iter()
                .any(|entry| entry.interval > MAX_SPAWN_INTERVAL)
        }) {
            return Err(ConfigError::IntervalTooLong {
                index,
                name: wave.name.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use path_defence_core::CreepKind;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = GameConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.campaign.len(), 5);
        assert_eq!(config.waves.seed, "waves");
        assert_eq!(config.economy.start_gold, 100);
        assert_eq!(config.economy.start_lives, 20);
    }

    #[test]
    fn sections_override_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            [board]
            columns = 40
            rows = 30
            path_max_tiles = 50

            [waves]
            seed = "weekly"
            multi_spawn_activation_wave = 1

            [economy]
            start_lives = 5

            [[wave]]
            name = "Opening"
            [[wave.entry]]
            type = "fast"
            count = 6
            interval = 0.4
            [[wave.entry]]
            type = "tank"
            count = 1
            interval = 1
            "#,
        )
        .expect("valid config");

        assert_eq!(config.board.columns, 40);
        assert_eq!(config.board.max_path_tiles(), 50);
        assert_eq!(config.board.tile_length, 32.0);
        assert_eq!(config.waves.seed, "weekly");
        assert_eq!(config.waves.multi_spawn_activation_wave, 1);
        assert_eq!(config.economy.start_gold, 100);
        assert_eq!(config.economy.start_lives, 5);
        assert_eq!(config.campaign.len(), 1);
        let opening = &config.campaign[0];
        assert_eq!(opening.name, "Opening");
        assert_eq!(opening.entries[0].kind, CreepKind::Fast);
        assert_eq!(opening.entries[0].interval, Duration::from_millis(400));
        assert_eq!(opening.entries[1].interval, Duration::from_secs(1));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = GameConfig::from_toml_str("[board]\ncolumnz = 3\n").unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)), "{error}");
    }

    #[test]
    fn small_boards_are_rejected() {
        let error = GameConfig::from_toml_str("[board]\ncolumns = 4\n").unwrap_err();
        assert!(matches!(
            error,
            ConfigError::BoardTooSmall {
                columns: 4,
                rows: 60
            }
        ));
    }

    #[test]
    fn oversized_boards_are_rejected() {
        let error = GameConfig::from_toml_str("[board]\ncolumns = 4000000000\n").unwrap_err();
        assert!(matches!(
            error,
            ConfigError::BoardTooLarge {
                columns: 4_000_000_000,
                rows: 60
            }
        ));
    }

    #[test]
    fn absurd_spawn_intervals_are_rejected() {
        let error = GameConfig::from_toml_str(
            r#"
            [[wave]]
            name = "Glacial"
            [[wave.entry]]
            type = "basic"
            count = 20
            interval = 1e18
            "#,
        )
        .unwrap_err();
        assert!(matches!(error, ConfigError::IntervalTooLong { index: 0, .. }), "{error}");
    }

    #[test]
    fn bad_tile_length_and_cap_are_rejected() {
        let error = GameConfig::from_toml_str("[board]\ntile_length = -2.0\n").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidTileLength(_)));

        let error = GameConfig::from_toml_str("[board]\npath_max_tiles = 1\n").unwrap_err();
        assert!(matches!(error, ConfigError::PathCapTooSmall(1)));
    }

    #[test]
    fn waves_without_creeps_are_rejected() {
        let error = GameConfig::from_toml_str(
            r#"
            [[wave]]
            name = "Hollow"
            "#,
        )
        .unwrap_err();
        assert!(matches!(error, ConfigError::EmptyWave { index: 0, .. }));
        assert_eq!(error.to_string(), "wave 0 (\"Hollow\") spawns no creeps");
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = GameConfig::load("/nonexistent/path-defence.toml").unwrap_err();
        assert!(error.to_string().contains("/nonexistent/path-defence.toml"));
    }
}
