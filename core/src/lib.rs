#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence engine.
//!
//! This crate defines the data that flows between the map generator, the wave
//! scheduler, the creep movement system and any presentation adapter. A seed
//! string feeds a [`SeedRng`], the generator turns that stream into an
//! immutable [`Grid`], and the wave scheduler reads the grid topology to emit
//! creeps along per-spawn routes. Nothing in here performs I/O.

use std::time::Duration;

use serde::Deserialize;

mod rng;

pub use rng::SeedRng;

/// Default number of tile columns on a generated board.
pub const DEFAULT_COLUMNS: u32 = 80;
/// Default number of tile rows on a generated board.
pub const DEFAULT_ROWS: u32 = 60;
/// Default side length of a tile expressed in world units.
pub const DEFAULT_TILE_LENGTH: f32 = 32.0;
/// Smallest column count the generator accepts before clamping.
pub const MIN_COLUMNS: u32 = 10;
/// Smallest row count the generator accepts before clamping.
pub const MIN_ROWS: u32 = 6;
/// Largest column count the generator accepts before clamping.
pub const MAX_COLUMNS: u32 = 1024;
/// Largest row count the generator accepts before clamping.
pub const MAX_ROWS: u32 = 1024;

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether `other` shares an edge with this tile.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Steps one tile in `direction`, or `None` when leaving a
    /// `columns` × `rows` board.
    #[must_use]
    pub fn step(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let (column, row) = match direction {
            Direction::North => (Some(self.column), self.row.checked_sub(1)),
            Direction::East => (self.column.checked_add(1), Some(self.row)),
            Direction::South => (Some(self.column), self.row.checked_add(1)),
            Direction::West => (self.column.checked_sub(1), Some(self.row)),
        };
        let (column, row) = (column?, row?);
        if column < columns && row < rows {
            Some(CellCoord::new(column, row))
        } else {
            None
        }
    }
}

/// Cardinal directions on the tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

/// Contents of a single tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Open ground that towers may occupy.
    #[default]
    Empty,
    /// Impassable, unbuildable terrain.
    Wall,
    /// Route tile walked by creeps.
    Path,
    /// Entry tile where creeps appear.
    Spawn,
    /// Exit tile creeps try to reach.
    Base,
}

impl Cell {
    /// Reports whether creeps may stand on this cell.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Path | Self::Spawn | Self::Base)
    }
}

/// Dense row-major matrix of [`Cell`] values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellLayer {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl CellLayer {
    /// Creates a layer of `columns` × `rows` empty cells.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![Cell::Empty; count],
        }
    }

    /// Number of columns contained in the layer.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the layer.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the coordinate lies on the layer.
    #[must_use]
    pub const fn contains(&self, coord: CellCoord) -> bool {
        coord.column() < self.columns && coord.row() < self.rows
    }

    /// Returns the cell stored at `coord`, if it lies on the layer.
    #[must_use]
    pub fn get(&self, coord: CellCoord) -> Option<Cell> {
        self.index(coord)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Stores `cell` at `coord`. Coordinates outside the layer are ignored.
    pub fn set(&mut self, coord: CellCoord, cell: Cell) {
        if let Some(slot) = self.index(coord).and_then(|index| self.cells.get_mut(index)) {
            *slot = cell;
        }
    }

    /// Counts the cells equal to `kind`.
    #[must_use]
    pub fn count(&self, kind: Cell) -> usize {
        self.cells.iter().filter(|cell| **cell == kind).count()
    }

    /// Iterates over every cell in row-major order with its coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Cell)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *cell)
        })
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let row = usize::try_from(coord.row()).ok()?;
        let column = usize::try_from(coord.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

/// Immutable board produced by map generation.
///
/// A grid owns the cell matrix plus the route metadata consumed downstream:
/// the canonical creep `path`, the primary `spawn` and `base`, every spawn
/// point, and one feeder prefix per spawn. Construction re-stamps every route
/// tile so that path and feeder tiles are always walkable and the prefix list
/// always lines up with the spawn list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: CellLayer,
    path: Vec<CellCoord>,
    spawn: CellCoord,
    base: CellCoord,
    spawns: Vec<CellCoord>,
    spawn_prefixes: Vec<Vec<CellCoord>>,
}

impl Grid {
    /// Assembles a grid from a stamped layer and its route metadata.
    ///
    /// An empty spawn list falls back to the first path tile (or the origin).
    /// Missing prefixes are padded with empty feeders and surplus prefixes are
    /// dropped.
    #[must_use]
    pub fn from_parts(
        cells: CellLayer,
        path: Vec<CellCoord>,
        base: CellCoord,
        mut spawns: Vec<CellCoord>,
        mut spawn_prefixes: Vec<Vec<CellCoord>>,
    ) -> Self {
        if spawns.is_empty() {
            spawns.push(path.first().copied().unwrap_or(CellCoord::new(0, 0)));
        }
        spawn_prefixes.resize_with(spawns.len(), Vec::new);

        let mut grid = Self {
            cells,
            path,
            spawn: spawns[0],
            base,
            spawns,
            spawn_prefixes,
        };
        grid.restamp();
        grid
    }

    fn restamp(&mut self) {
        for &tile in self.path.iter().chain(self.spawn_prefixes.iter().flatten()) {
            self.cells.set(tile, Cell::Path);
        }
        for &spawn in &self.spawns {
            self.cells.set(spawn, Cell::Spawn);
        }
        self.cells.set(self.base, Cell::Base);
    }

    /// Produces a copy of the grid rotated clockwise by `orientation`.
    ///
    /// Quarter turns swap the board dimensions. Every stored coordinate goes
    /// through [`Orientation::transform`].
    #[must_use]
    pub fn oriented(&self, orientation: Orientation) -> Self {
        let (columns, rows) = (self.columns(), self.rows());
        let rotate = |coord: CellCoord| orientation.transform(coord, columns, rows);
        let (target_columns, target_rows) = orientation.dimensions(columns, rows);

        let mut cells = CellLayer::new(target_columns, target_rows);
        for (coord, cell) in self.cells.iter() {
            if cell != Cell::Empty {
                cells.set(rotate(coord), cell);
            }
        }

        Self::from_parts(
            cells,
            self.path.iter().copied().map(rotate).collect(),
            rotate(self.base),
            self.spawns.iter().copied().map(rotate).collect(),
            self.spawn_prefixes
                .iter()
                .map(|prefix| prefix.iter().copied().map(rotate).collect())
                .collect(),
        )
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.cells.columns()
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.cells.rows()
    }

    /// Reports whether the coordinate lies on the board.
    #[must_use]
    pub const fn contains(&self, coord: CellCoord) -> bool {
        self.cells.contains(coord)
    }

    /// Returns the cell at `coord`, if it lies on the board.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        self.cells.get(coord)
    }

    /// Reports whether creeps may stand on `coord`.
    #[must_use]
    pub fn is_walkable(&self, coord: CellCoord) -> bool {
        self.cell(coord).is_some_and(Cell::is_walkable)
    }

    /// Reports whether a tower may be placed on `coord`.
    #[must_use]
    pub fn is_buildable(&self, coord: CellCoord) -> bool {
        self.cell(coord) == Some(Cell::Empty)
    }

    /// Underlying cell matrix.
    #[must_use]
    pub const fn cells(&self) -> &CellLayer {
        &self.cells
    }

    /// Canonical creep route from the primary spawn to the base.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.path
    }

    /// Primary spawn tile.
    #[must_use]
    pub const fn spawn(&self) -> CellCoord {
        self.spawn
    }

    /// Base tile creeps try to reach.
    #[must_use]
    pub const fn base(&self) -> CellCoord {
        self.base
    }

    /// Every spawn tile; index zero is the primary spawn.
    #[must_use]
    pub fn spawns(&self) -> &[CellCoord] {
        &self.spawns
    }

    /// Feeder routes aligned with [`Grid::spawns`]. Each feeder runs from its
    /// spawn to the merge tile on the main path; the primary feeder is empty.
    #[must_use]
    pub fn spawn_prefixes(&self) -> &[Vec<CellCoord>] {
        &self.spawn_prefixes
    }
}

/// Clockwise rotation applied to a canonical left-to-right board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// No rotation.
    #[default]
    Deg0,
    /// Quarter turn clockwise.
    Deg90,
    /// Half turn.
    Deg180,
    /// Three quarter turns clockwise.
    Deg270,
}

impl Orientation {
    /// Maps an arbitrary index onto one of the four orientations.
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        match index & 3 {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    /// Board dimensions after rotating a `columns` × `rows` board.
    #[must_use]
    pub const fn dimensions(self, columns: u32, rows: u32) -> (u32, u32) {
        match self {
            Self::Deg0 | Self::Deg180 => (columns, rows),
            Self::Deg90 | Self::Deg270 => (rows, columns),
        }
    }

    /// Rotates a coordinate that lies on a `columns` × `rows` board.
    #[must_use]
    pub const fn transform(self, coord: CellCoord, columns: u32, rows: u32) -> CellCoord {
        let (column, row) = (coord.column(), coord.row());
        let last_column = columns.saturating_sub(1);
        let last_row = rows.saturating_sub(1);
        match self {
            Self::Deg0 => coord,
            Self::Deg90 => CellCoord::new(last_row.saturating_sub(row), column),
            Self::Deg180 => CellCoord::new(
                last_column.saturating_sub(column),
                last_row.saturating_sub(row),
            ),
            Self::Deg270 => CellCoord::new(row, last_column.saturating_sub(column)),
        }
    }
}

/// Board dimensions and route limits fed to the map generator.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Number of tile columns in the canonical orientation.
    pub columns: u32,
    /// Number of tile rows in the canonical orientation.
    pub rows: u32,
    /// Side length of a tile in world units.
    pub tile_length: f32,
    /// Upper bound on main path tiles; defaults to one and a half board widths.
    pub path_max_tiles: Option<u32>,
}

impl BoardConfig {
    /// Creates a board description with the default tile length and path cap.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            tile_length: DEFAULT_TILE_LENGTH,
            path_max_tiles: None,
        }
    }

    /// Effective cap on main path tiles.
    #[must_use]
    pub fn max_path_tiles(&self) -> u32 {
        self.path_max_tiles
            .unwrap_or_else(|| self.columns.saturating_mul(3) / 2)
    }

    /// Clamps the description into a board the generator can always fill.
    ///
    /// Dimensions are clamped to `MIN_*..=MAX_*`; the path cap is derived
    /// from the clamped column count.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let tile_length = if self.tile_length.is_finite() && self.tile_length > 0.0 {
            self.tile_length
        } else {
            DEFAULT_TILE_LENGTH
        };
        let clamped = Self {
            columns: self.columns.clamp(MIN_COLUMNS, MAX_COLUMNS),
            rows: self.rows.clamp(MIN_ROWS, MAX_ROWS),
            tile_length,
            path_max_tiles: self.path_max_tiles,
        };
        Self {
            path_max_tiles: Some(clamped.max_path_tiles().max(2)),
            ..clamped
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS, DEFAULT_ROWS)
    }
}

/// Creep archetypes scheduled by waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreepKind {
    /// Balanced walker.
    Basic,
    /// Quick, fragile runner.
    Fast,
    /// Slow, durable bruiser.
    Tank,
}

impl CreepKind {
    /// Unscaled statistics for the archetype.
    #[must_use]
    pub const fn preset(self) -> CreepPreset {
        match self {
            Self::Basic => CreepPreset {
                speed_tiles_per_sec: 2.2,
                hit_points: 28.0,
                bounty: 3,
            },
            Self::Fast => CreepPreset {
                speed_tiles_per_sec: 3.2,
                hit_points: 16.0,
                bounty: 2,
            },
            Self::Tank => CreepPreset {
                speed_tiles_per_sec: 1.6,
                hit_points: 60.0,
                bounty: 4,
            },
        }
    }
}

/// Base statistics of a [`CreepKind`] before wave scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreepPreset {
    /// Walking speed in tiles per second.
    pub speed_tiles_per_sec: f32,
    /// Starting hit points.
    pub hit_points: f32,
    /// Gold awarded when the creep is killed.
    pub bounty: u32,
}

/// One batch of identical creeps inside a wave.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveEntry {
    /// Archetype spawned by the entry.
    #[serde(rename = "type")]
    pub kind: CreepKind,
    /// Number of creeps spawned.
    pub count: u32,
    /// Spacing between consecutive spawns, written in seconds.
    #[serde(deserialize_with = "seconds::deserialize")]
    pub interval: Duration,
}

impl WaveEntry {
    /// Creates a wave entry.
    #[must_use]
    pub const fn new(kind: CreepKind, count: u32, interval: Duration) -> Self {
        Self {
            kind,
            count,
            interval,
        }
    }
}

/// Named, ordered list of spawn batches.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveDefinition {
    /// Display name of the wave.
    pub name: String,
    /// Batches expanded into spawn jobs when the wave starts.
    #[serde(rename = "entry", default)]
    pub entries: Vec<WaveEntry>,
}

impl WaveDefinition {
    /// Creates a wave definition.
    #[must_use]
    pub fn new(name: impl Into<String>, entries: Vec<WaveEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Total number of creeps the wave spawns.
    #[must_use]
    pub fn creep_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0, |total, entry| total.saturating_add(entry.count))
    }
}

/// Built-in five-wave campaign.
#[must_use]
pub fn default_waves() -> Vec<WaveDefinition> {
    use CreepKind::{Basic, Fast, Tank};

    vec![
        WaveDefinition::new(
            "Scouts",
            vec![WaveEntry::new(Basic, 10, Duration::from_millis(600))],
        ),
        WaveDefinition::new(
            "Drifters",
            vec![WaveEntry::new(Fast, 12, Duration::from_millis(500))],
        ),
        WaveDefinition::new(
            "Bulks",
            vec![WaveEntry::new(Tank, 8, Duration::from_millis(800))],
        ),
        WaveDefinition::new(
            "Mixed Bag",
            vec![
                WaveEntry::new(Basic, 8, Duration::from_millis(550)),
                WaveEntry::new(Fast, 6, Duration::from_millis(550)),
            ],
        ),
        WaveDefinition::new(
            "Pressure",
            vec![WaveEntry::new(Basic, 16, Duration::from_millis(450))],
        ),
    ]
}

mod seconds {
    use std::time::Duration;

    use serde::{de::Error as _, Deserialize, Deserializer};

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(seconds).map_err(D::Error::custom)
    }
}
