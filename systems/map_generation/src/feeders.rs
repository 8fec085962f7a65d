//! Extra spawn entrances joined to the main path through buffered feeders.

use std::collections::{BTreeSet, VecDeque};

use path_defence_core::{CellCoord, Direction, SeedRng};
use tracing::{debug, warn};

use crate::carve::clamp_to;

const MIN_PATH_FOR_FEEDERS: usize = 8;
const MERGE_INDEX_LOW: i32 = 3;
const MERGE_INDEX_HIGH: i32 = 14;
const ROW_RETRIES: usize = 8;

/// Expansion order for the feeder search.
const SEARCH_ORDER: [Direction; 4] = [
    Direction::East,
    Direction::West,
    Direction::South,
    Direction::North,
];

/// Spawn tiles plus one feeder per spawn, index aligned.
#[derive(Debug, Default)]
pub(crate) struct Entrances {
    pub(crate) spawns: Vec<CellCoord>,
    pub(crate) prefixes: Vec<Vec<CellCoord>>,
}

/// Tiles a feeder may not enter: every main path tile and its four
/// neighbours, except the merge tile itself.
#[derive(Debug)]
pub(crate) struct BufferMask {
    columns: u32,
    rows: u32,
    blocked: Vec<bool>,
}

impl BufferMask {
    /// Builds the mask from the path tiles other than `merge`.
    ///
    /// The merge tile is never blocked, and neither are its free sides unless
    /// another path tile borders them, so a feeder can always approach it.
    pub(crate) fn around(path: &[CellCoord], merge: CellCoord, columns: u32, rows: u32) -> Self {
        let mut mask = Self {
            columns,
            rows,
            blocked: vec![false; columns as usize * rows as usize],
        };
        for &tile in path.iter().filter(|&&tile| tile != merge) {
            mask.block(tile);
            for direction in SEARCH_ORDER {
                if let Some(neighbour) = tile.step(direction, columns, rows) {
                    if neighbour != merge {
                        mask.block(neighbour);
                    }
                }
            }
        }
        mask
    }

    /// Reports whether a feeder may step onto `tile` while heading to `goal`.
    pub(crate) fn allows(&self, tile: CellCoord, goal: CellCoord) -> bool {
        match self.index(tile) {
            Some(index) => tile == goal || !self.blocked[index],
            None => false,
        }
    }

    fn block(&mut self, tile: CellCoord) {
        if let Some(index) = self.index(tile) {
            self.blocked[index] = true;
        }
    }

    fn index(&self, tile: CellCoord) -> Option<usize> {
        if tile.column() < self.columns && tile.row() < self.rows {
            Some(tile.row() as usize * self.columns as usize + tile.column() as usize)
        } else {
            None
        }
    }
}

/// Places zero to two extra spawns on the left edge and routes a feeder from
/// each to a shared merge tile near the start of the main path.
///
/// A spawn row is re-jittered while it is taken or its edge tile sits inside
/// the buffer. A row still taken after the retries drops that spawn; a row
/// still buffered keeps it with a direct feeder.
///
/// The primary spawn sits at column zero on the first path row and owns an
/// empty feeder.
pub(crate) fn build(path: &[CellCoord], rng: &mut SeedRng, columns: u32, rows: u32) -> Entrances {
    let primary = CellCoord::new(0, path.first().map_or(1, CellCoord::row));
    let mut entrances = Entrances {
        spawns: vec![primary],
        prefixes: vec![Vec::new()],
    };
    if path.len() < MIN_PATH_FOR_FEEDERS {
        return entrances;
    }

    let extra = extra_spawn_count(rng);
    if extra == 0 {
        return entrances;
    }

    let len = path.len() as i32;
    let high = MERGE_INDEX_HIGH.min(len - 4);
    let merge_index = clamp_to(
        MERGE_INDEX_LOW + rng.below((high - MERGE_INDEX_LOW).max(1)),
        2,
        len - 3,
    );
    let merge = path[merge_index as usize];
    let mask = BufferMask::around(path, merge, columns, rows);

    let last_row = rows as i32 - 2;
    let mut used_rows = BTreeSet::from([primary.row() as i32]);
    for _ in 0..extra {
        let sign = if rng.chance(0.5) { 1 } else { -1 };
        let mut row = clamp_to(merge.row() as i32 + sign * (2 + rng.below(3)), 1, last_row);
        for _ in 0..ROW_RETRIES {
            let open = CellCoord::new(0, row as u32);
            if !used_rows.contains(&row) && mask.allows(open, merge) {
                break;
            }
            let sign = if rng.chance(0.5) { 1 } else { -1 };
            row = clamp_to(row + sign * (1 + rng.below(2)), 1, last_row);
        }
        if !used_rows.insert(row) {
            debug!(row, "no free spawn row; skipping extra spawn");
            continue;
        }

        let spawn = CellCoord::new(0, row as u32);
        let feeder = route(spawn, merge, &mask).unwrap_or_else(|| {
            warn!(?spawn, ?merge, "no buffered feeder; using direct route");
            direct_route(spawn, merge)
        });
        entrances.spawns.push(spawn);
        entrances
            .prefixes
            .push(if feeder.len() < 2 { Vec::new() } else { feeder });
    }
    entrances
}

/// Number of extra spawns: two with probability 0.25, one with 0.375, none
/// with 0.375.
fn extra_spawn_count(rng: &mut SeedRng) -> usize {
    if rng.chance(0.25) {
        2
    } else if rng.chance(0.5) {
        1
    } else {
        0
    }
}

/// Breadth-first search from `start` to `goal` honouring `mask`.
///
/// Returns both endpoints inclusive, or `None` when the goal cannot be
/// reached.
pub(crate) fn route(start: CellCoord, goal: CellCoord, mask: &BufferMask) -> Option<Vec<CellCoord>> {
    if !mask.allows(start, goal) {
        return None;
    }

    let cell_count = mask.blocked.len();
    let mut previous: Vec<Option<CellCoord>> = vec![None; cell_count];
    let mut seen = vec![false; cell_count];
    let mut frontier = VecDeque::new();
    seen[mask.index(start)?] = true;
    frontier.push_back(start);

    while let Some(current) = frontier.pop_front() {
        if current == goal {
            let mut route = vec![current];
            let mut cursor = current;
            while let Some(parent) = mask.index(cursor).and_then(|index| previous[index]) {
                route.push(parent);
                cursor = parent;
            }
            route.reverse();
            return Some(route);
        }
        for direction in SEARCH_ORDER {
            let Some(next) = current.step(direction, mask.columns, mask.rows) else {
                continue;
            };
            let Some(index) = mask.index(next) else {
                continue;
            };
            if seen[index] || !mask.allows(next, goal) {
                continue;
            }
            seen[index] = true;
            previous[index] = Some(current);
            frontier.push_back(next);
        }
    }
    None
}

/// Column-first Manhattan walk; ignores the buffer.
pub(crate) fn direct_route(from: CellCoord, to: CellCoord) -> Vec<CellCoord> {
    let mut route = vec![from];
    let (mut column, mut row) = (from.column(), from.row());
    while (column, row) != (to.column(), to.row()) {
        if column != to.column() {
            column = if column < to.column() { column + 1 } else { column - 1 };
        } else {
            row = if row < to.row() { row + 1 } else { row - 1 };
        }
        route.push(CellCoord::new(column, row));
    }
    route
}
