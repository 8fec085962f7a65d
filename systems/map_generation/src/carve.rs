//! Main path carving: doglegs, arena detours, sanitising and length limiting.

use path_defence_core::{CellCoord, SeedRng};
use tracing::{debug, warn};

const ARENA_MIN_SEGMENT: i32 = 8;
const ARENA_PROBABILITY: f64 = 0.35;

/// Signed tile position used while carving; intermediate arithmetic may step
/// outside the board before clamping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Tile {
    pub(crate) column: i32,
    pub(crate) row: i32,
}

impl Tile {
    pub(crate) const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    pub(crate) fn to_coord(self) -> CellCoord {
        CellCoord::new(self.column.max(0) as u32, self.row.max(0) as u32)
    }
}

/// Board extent in signed tile units.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Bounds {
    pub(crate) columns: i32,
    pub(crate) rows: i32,
}

impl Bounds {
    /// Clamps a row into the interior band that never touches the top or
    /// bottom border.
    pub(crate) fn interior_row(self, row: i32) -> i32 {
        clamp_to(row, 1, self.rows - 2)
    }
}

/// Clamps `value` into `[low, high]`, checking the lower bound first.
///
/// Unlike [`i32::clamp`] this never panics: when `high < low` a value above
/// `high` resolves to `high`, which lets callers detect rectangles that do not
/// fit.
pub(crate) fn clamp_to(value: i32, low: i32, high: i32) -> i32 {
    if value < low {
        low
    } else if value > high {
        high
    } else {
        value
    }
}

fn push_unique(out: &mut Vec<Tile>, tile: Tile) {
    if out.last() != Some(&tile) {
        out.push(tile);
    }
}

/// Carves a Manhattan dogleg from `from` to `to`, choosing horizontal-first or
/// vertical-first at random.
pub(crate) fn carve_segment(out: &mut Vec<Tile>, from: Tile, to: Tile, rng: &mut SeedRng) {
    push_unique(out, from);
    let horizontal_first = rng.chance(0.5);
    let mut cursor = from;
    while cursor != to {
        let step_horizontal = if horizontal_first {
            cursor.column != to.column
        } else {
            cursor.row == to.row
        };
        if step_horizontal {
            cursor.column += (to.column - cursor.column).signum();
        } else {
            cursor.row += (to.row - cursor.row).signum();
        }
        out.push(cursor);
    }
}

/// Carves from `from` to `to`, sometimes routing around a rectangular arena.
///
/// Segments of at least eight tiles take the detour with probability 0.35.
/// The route jogs one tile along the dominant axis, walks three sides of a
/// rectangle on the roomier side of the board, then rejoins the target.
pub(crate) fn carve_with_optional_arena(
    out: &mut Vec<Tile>,
    from: Tile,
    to: Tile,
    rng: &mut SeedRng,
    bounds: Bounds,
) {
    let delta_column = to.column - from.column;
    let delta_row = to.row - from.row;
    let length = delta_column.abs() + delta_row.abs();
    let wants_arena = length >= ARENA_MIN_SEGMENT && rng.chance(ARENA_PROBABILITY);
    if !wants_arena {
        carve_segment(out, from, to, rng);
        return;
    }

    let horizontal = delta_column.abs() >= delta_row.abs();
    let jog = if horizontal {
        Tile::new(from.column + delta_column.signum(), from.row)
    } else {
        Tile::new(from.column, from.row + delta_row.signum())
    };
    carve_segment(out, from, jog, rng);

    let dir_x = if delta_column == 0 {
        1
    } else {
        delta_column.signum()
    };
    let space_above = jog.row - 1;
    let space_below = bounds.rows - 2 - jog.row;
    let dir_y = if space_below >= space_above { 1 } else { -1 };
    let room_x = if dir_x > 0 {
        bounds.columns - 2 - jog.column
    } else {
        jog.column - 1
    };
    let room_y = if dir_y > 0 {
        bounds.rows - 2 - jog.row
    } else {
        jog.row - 1
    };

    let corners = if horizontal {
        let width = clamp_to(5 + rng.below(6), 3, room_x);
        let height = clamp_to(3 + rng.below(4), 2, room_y);
        if width < 2 || height < 2 {
            carve_segment(out, jog, to, rng);
            return;
        }
        [
            Tile::new(jog.column, jog.row + dir_y * height),
            Tile::new(jog.column + dir_x * width, jog.row + dir_y * height),
            Tile::new(jog.column + dir_x * width, jog.row),
        ]
    } else {
        let width = clamp_to(3 + rng.below(4), 2, room_x);
        let height = clamp_to(5 + rng.below(6), 3, room_y);
        if width < 2 || height < 2 {
            carve_segment(out, jog, to, rng);
            return;
        }
        [
            Tile::new(jog.column + dir_x * width, jog.row),
            Tile::new(jog.column + dir_x * width, jog.row + dir_y * height),
            Tile::new(jog.column, jog.row + dir_y * height),
        ]
    };

    let mut cursor = jog;
    for corner in corners {
        carve_segment(out, cursor, corner, rng);
        cursor = corner;
    }
    carve_segment(out, cursor, to, rng);
}

/// Restores 4-connectivity and strips zero-length moves and `A→B→A` spikes.
///
/// Gaps are re-walked column first. A spike collapses back to its first tile,
/// so the result never repeats a tile at adjacent positions.
pub(crate) fn sanitize(path: &[Tile]) -> Vec<Tile> {
    let Some(&first) = path.first() else {
        return Vec::new();
    };

    let mut walked = vec![first];
    for &target in &path[1..] {
        let mut cursor = *walked.last().unwrap_or(&first);
        while cursor != target {
            if cursor.column != target.column {
                cursor.column += (target.column - cursor.column).signum();
            } else {
                cursor.row += (target.row - cursor.row).signum();
            }
            push_unique(&mut walked, cursor);
        }
    }

    let mut collapsed: Vec<Tile> = Vec::with_capacity(walked.len());
    for tile in walked {
        let len = collapsed.len();
        if len >= 2 && collapsed[len - 2] == tile {
            let _ = collapsed.pop();
            continue;
        }
        collapsed.push(tile);
    }
    collapsed
}

/// Shortens a sanitised path to at most `max_len` tiles.
///
/// Evenly spaced control tiles (first and last always kept) are re-walked
/// with [`sanitize`]. Re-walking restores straight runs, so when the
/// resampled route is still too long the sample count shrinks until it fits.
/// If even a direct spawn-to-base walk is too long, the walk is cut at the
/// cap and the caller moves the base onto its last tile.
pub(crate) fn limit_length(path: &[Tile], max_len: usize) -> Vec<Tile> {
    if path.len() <= max_len {
        return path.to_vec();
    }

    let max_len = max_len.max(2);
    for samples in (2..=max_len).rev() {
        let candidate = sanitize(&resample(path, samples));
        if candidate.len() <= max_len {
            debug!(
                original = path.len(),
                limited = candidate.len(),
                samples,
                "resampled main path"
            );
            return candidate;
        }
    }

    let mut truncated = sanitize(&resample(path, 2));
    warn!(
        original = path.len(),
        direct = truncated.len(),
        cap = max_len,
        "direct route exceeds path cap; truncating"
    );
    truncated.truncate(max_len);
    truncated
}

fn resample(path: &[Tile], samples: usize) -> Vec<Tile> {
    let last = path.len() - 1;
    let stride = last as f64 / (samples - 1) as f64;
    (0..samples)
        .map(|sample| {
            let index = ((sample as f64) * stride).round() as usize;
            path[index.min(last)]
        })
        .collect()
}
