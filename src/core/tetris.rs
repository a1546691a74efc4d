//! Tetris-style greedy packing with compaction passes.
//!
//! Every tile goes to the best-scoring free anchor, where the score pulls
//! toward the top-left.  Compaction then lifts tiles, big to small, into the
//! first free anchor above or left of where they sit.

use super::grid::Grid;
use super::layout::{Layout, Occupancy, Packer};
use super::tile::{self, PlacedTile, Tile};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TetrisConfig {
    /// Seed for the id-hash tie-break.  Same seed, same order.
    pub seed: u64,
    /// Score per row of height above the bottom.
    pub top_weight: f64,
    /// Score per column of distance from the right edge.
    pub left_weight: f64,
    /// Score per cell of tile side.
    pub size_weight: f64,
    /// Upper bound on compaction passes; `0` disables compaction.
    pub bubble_passes: u32,
}

impl Default for TetrisConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            top_weight: 2048.0,
            left_weight: 1.0,
            size_weight: 0.5,
            bubble_passes: 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TetrisPacker {
    cfg: TetrisConfig,
}

impl TetrisPacker {
    pub fn new(cfg: TetrisConfig) -> Self {
        Self { cfg }
    }

    fn score(&self, grid: &Grid, x: u32, y: u32, side: u32) -> f64 {
        f64::from(grid.rows - y) * self.cfg.top_weight
            + f64::from(grid.cols - x) * self.cfg.left_weight
            + f64::from(side) * self.cfg.size_weight
    }

    /// Highest-scoring free anchor; the first one in row-major order wins
    /// ties.
    fn best_anchor(&self, grid: &Grid, occ: &Occupancy, side: u32) -> Option<(u32, u32)> {
        let mut best: Option<(f64, u32, u32)> = None;
        for y in 0..=grid.rows - side {
            for x in 0..=grid.cols - side {
                if !occ.is_free(x, y, side, side) {
                    continue;
                }
                let score = self.score(grid, x, y, side);
                if best.map_or(true, |(s, _, _)| score > s) {
                    best = Some((score, x, y));
                }
            }
        }
        best.map(|(_, x, y)| (x, y))
    }
}

impl Packer for TetrisPacker {
    fn name(&self) -> &'static str {
        "tetris"
    }

    fn pack(&self, grid: &Grid, tiles: &[Tile]) -> Layout {
        let (cols, rows) = (grid.cols, grid.rows);
        let mut layout = Layout::empty(cols, rows);
        let mut occ = Occupancy::new(cols, rows);

        for tile in tile::sort_big_first(tiles.to_vec(), self.cfg.seed) {
            let side = tile.side;
            if side == 0 || side > cols || side > rows {
                layout.rejected.push(tile);
                continue;
            }
            match self.best_anchor(grid, &occ, side) {
                Some((x, y)) => {
                    occ.set(x, y, side, side, true);
                    layout.placed.push(PlacedTile::square(tile, x, y));
                }
                None => layout.rejected.push(tile),
            }
        }

        compact(&mut occ, &mut layout.placed, cols, self.cfg.bubble_passes);
        layout
    }
}

/// Slide placed tiles (already big-to-small) toward the top-left.  Stops
/// after `passes` passes or on the first pass that moves nothing.
fn compact(occ: &mut Occupancy, placed: &mut [PlacedTile], cols: u32, passes: u32) {
    for pass in 0..passes {
        let mut moves = 0usize;
        for p in placed.iter_mut() {
            occ.set(p.x, p.y, p.w, p.h, false);
            if let Some((x, y)) = earlier_anchor(occ, p, cols) {
                p.x = x;
                p.y = y;
                moves += 1;
            }
            occ.set(p.x, p.y, p.w, p.h, true);
        }
        tracing::trace!("compaction pass {pass}: {moves} moves");
        if moves == 0 {
            break;
        }
    }
}

/// First free anchor strictly before `p` in row-major order: any column in
/// a row above it, or a column to its left in its own row.
fn earlier_anchor(occ: &Occupancy, p: &PlacedTile, cols: u32) -> Option<(u32, u32)> {
    for y in 0..=p.y {
        let x_end = if y == p.y { p.x } else { cols - p.w + 1 };
        for x in 0..x_end {
            if occ.is_free(x, y, p.w, p.h) {
                return Some((x, y));
            }
        }
    }
    None
}
