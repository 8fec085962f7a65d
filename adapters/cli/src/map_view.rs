//! Plain-text board rendering.

use std::fmt::Write as _;

use path_defence_core::{Cell, CellCoord, Grid};

/// Glyph printed for a tile.
fn glyph(cell: Cell, feeder: bool) -> char {
    match cell {
        Cell::Base => 'B',
        Cell::Spawn => 'S',
        Cell::Wall => '#',
        Cell::Path if feeder => '-',
        Cell::Path => '=',
        Cell::Empty => '.',
    }
}

/// Renders the board one row per line, followed by nothing else.
pub(crate) fn render(grid: &Grid) -> String {
    let mut out = String::with_capacity(((grid.columns() + 1) * grid.rows()) as usize);
    for row in 0..grid.rows() {
        for column in 0..grid.columns() {
            let coord = CellCoord::new(column, row);
            let cell = grid.cell(coord).unwrap_or_default();
            let feeder = !grid.path().contains(&coord);
            out.push(glyph(cell, feeder));
        }
        out.push('\n');
    }
    out
}

/// Summary header plus the rendered board.
pub(crate) fn describe(seed: &str, grid: &Grid) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "seed: {seed}");
    let _ = writeln!(out, "size: {}x{}", grid.columns(), grid.rows());
    let _ = writeln!(out, "path: {} tiles", grid.path().len());
    let _ = writeln!(
        out,
        "base: ({}, {})",
        grid.base().column(),
        grid.base().row()
    );
    for (index, (spawn, prefix)) in grid
        .spawns()
        .iter()
        .zip(grid.spawn_prefixes())
        .enumerate()
    {
        let _ = writeln!(
            out,
            "spawn {index}: ({}, {}), feeder {} tiles",
            spawn.column(),
            spawn.row(),
            prefix.len()
        );
    }
    out.push_str(&render(grid));
    out
}
