#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural board generation.
//!
//! The generator carves a left-to-right route from a spawn on column zero to
//! a base on the last column, optionally adds up to two extra entrances whose
//! feeders keep one tile of clearance from the main route, and finally
//! rotates the canonical board into one of four orientations. Every random
//! choice comes from a single [`SeedRng`] seeded with the caller's string, so
//! the same seed and board description always yield the same [`Grid`].

mod carve;
mod feeders;

use path_defence_core::{BoardConfig, Cell, CellCoord, CellLayer, Grid, Orientation, SeedRng};
use tracing::debug;

use crate::carve::{Bounds, Tile};

const FIRST_WAYPOINT_COLUMN: i32 = 3;
const WAYPOINT_SPACING: i32 = 8;
const RIGHT_MARGIN: i32 = 4;

/// Deterministic board generator.
#[derive(Clone, Debug, Default)]
pub struct MapGenerator {
    board: BoardConfig,
}

impl MapGenerator {
    /// Creates a generator for the provided board description.
    ///
    /// Degenerate dimensions are clamped up to the smallest supported board.
    #[must_use]
    pub fn new(board: BoardConfig) -> Self {
        Self {
            board: board.sanitized(),
        }
    }

    /// Board description in effect after sanitising.
    #[must_use]
    pub const fn board(&self) -> &BoardConfig {
        &self.board
    }

    /// Generates the final, possibly rotated, board for `seed`.
    #[must_use]
    pub fn generate(&self, seed: &str) -> Grid {
        let mut rng = SeedRng::new(seed);
        let canonical = self.carve_canonical(&mut rng);
        let orientation = Orientation::from_index(rng.below(4) as u32);
        debug!(
            seed,
            ?orientation,
            path = canonical.path().len(),
            spawns = canonical.spawns().len(),
            "generated board"
        );
        canonical.oriented(orientation)
    }

    /// Generates the unrotated left-to-right board for `seed`.
    ///
    /// Draws the same stream as [`MapGenerator::generate`] up to, but not
    /// including, the orientation pick.
    #[must_use]
    pub fn canonical(&self, seed: &str) -> Grid {
        let mut rng = SeedRng::new(seed);
        self.carve_canonical(&mut rng)
    }

    fn carve_canonical(&self, rng: &mut SeedRng) -> Grid {
        let columns = self.board.columns;
        let rows = self.board.rows;
        let bounds = Bounds {
            columns: columns as i32,
            rows: rows as i32,
        };

        let spawn_row = bounds.interior_row(rng.range(f64::from(rows)).floor() as i32);
        let base_row = bounds.interior_row(rng.range(f64::from(rows)).floor() as i32);
        let spawn = Tile::new(0, spawn_row);
        let base = Tile::new(bounds.columns - 1, base_row);

        let mut waypoint_columns = Vec::new();
        let mut column = FIRST_WAYPOINT_COLUMN + rng.below(3);
        while column < bounds.columns - RIGHT_MARGIN {
            waypoint_columns.push(column);
            column += WAYPOINT_SPACING + rng.below(7);
        }

        let max_step = 2.max((f64::from(rows) * 0.25).floor() as i32);
        let mut nodes = vec![spawn];
        let mut last_row = spawn.row;
        for waypoint_column in waypoint_columns {
            let direction = if rng.chance(0.5) { 1 } else { -1 };
            let step = 3 + rng.below(max_step);
            last_row = bounds.interior_row(last_row + direction * step);
            nodes.push(Tile::new(waypoint_column, last_row));
        }
        nodes.push(base);

        let mut carved = Vec::new();
        for leg in nodes.windows(2) {
            carve::carve_with_optional_arena(&mut carved, leg[0], leg[1], rng, bounds);
        }
        let cap = self.board.max_path_tiles() as usize;
        let tiles = carve::limit_length(&carve::sanitize(&carved), cap);

        let path: Vec<CellCoord> = tiles.iter().map(|tile| tile.to_coord()).collect();
        let base = path
            .last()
            .copied()
            .unwrap_or_else(|| base.to_coord());

        let mut cells = CellLayer::new(columns, rows);
        for &tile in &path {
            cells.set(tile, Cell::Path);
        }

        let entrances = feeders::build(&path, rng, columns, rows);
        Grid::from_parts(cells, path, base, entrances.spawns, entrances.prefixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_board_runs_left_to_right() {
        let generator = MapGenerator::default();
        for index in 0..20 {
            let grid = generator.canonical(&format!("canonical-{index}"));
            assert_eq!((grid.columns(), grid.rows()), (80, 60));
            assert_eq!(grid.spawn().column(), 0);
            assert_eq!(grid.path().first(), Some(&grid.spawn()));
            assert_eq!(grid.path().last(), Some(&grid.base()));
        }
    }

    #[test]
    fn tiny_boards_are_clamped() {
        let generator = MapGenerator::new(BoardConfig::new(0, 0));
        assert_eq!(generator.board().columns, path_defence_core::MIN_COLUMNS);
        let grid = generator.generate("tiny");
        assert!(!grid.path().is_empty());
        assert!(grid.path().iter().all(|tile| grid.contains(*tile)));
    }
}
