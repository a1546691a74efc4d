//! Skyline packing of square tiles.
//!
//! A per-column skyline predicts where a tile would come to rest; the
//! occupancy buffer confirms it.  Small tiles that miss every skyline slot
//! get one more chance through a full scan that patches holes.

use super::grid::Grid;
use super::layout::{Layout, Occupancy, Packer};
use super::tile::{PlacedTile, Tile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkylineConfig {
    /// Tiles with `side <= gap_fill_side_max` fall back to a full scan when
    /// the skyline finds nothing.  `0` disables the fallback.
    pub gap_fill_side_max: u32,
}

impl Default for SkylineConfig {
    fn default() -> Self {
        Self {
            gap_fill_side_max: 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SkylinePacker {
    cfg: SkylineConfig,
}

impl SkylinePacker {
    pub fn new(cfg: SkylineConfig) -> Self {
        Self { cfg }
    }
}

impl Packer for SkylinePacker {
    fn name(&self) -> &'static str {
        "skyline"
    }

    fn pack(&self, grid: &Grid, tiles: &[Tile]) -> Layout {
        let (cols, rows) = (grid.cols, grid.rows);
        let mut layout = Layout::empty(cols, rows);
        let mut skyline = vec![0u32; cols as usize];
        let mut occ = Occupancy::new(cols, rows);

        for tile in tiles {
            let side = tile.side;
            if side == 0 || side > cols || side > rows {
                layout.rejected.push(tile.clone());
                continue;
            }

            let spot = skyline_spot(&skyline, &occ, side, rows).or_else(|| {
                if side <= self.cfg.gap_fill_side_max {
                    occ.first_free(side, side)
                } else {
                    None
                }
            });

            match spot {
                Some((x, y)) => {
                    occ.set(x, y, side, side, true);
                    for h in &mut skyline[x as usize..(x + side) as usize] {
                        *h = (*h).max(y + side);
                    }
                    layout.placed.push(PlacedTile::square(tile.clone(), x, y));
                }
                None => layout.rejected.push(tile.clone()),
            }
        }

        layout
    }
}

/// Lowest (then leftmost) confirmed slot among the skyline candidates.
fn skyline_spot(skyline: &[u32], occ: &Occupancy, side: u32, rows: u32) -> Option<(u32, u32)> {
    let cols = skyline.len() as u32;
    let mut best: Option<(u32, u32)> = None;

    for x in 0..=cols - side {
        let y0 = skyline[x as usize..(x + side) as usize]
            .iter()
            .copied()
            .max()
            .unwrap_or(0);
        if y0 + side > rows {
            continue;
        }
        // A candidate can only rest at or below y0; equal y loses to the
        // smaller x already held.
        if best.is_some_and(|(_, by)| y0 >= by) {
            continue;
        }
        // The skyline is optimistic; walk down until the occupancy agrees.
        let Some(y) = (y0..=rows - side).find(|&y| occ.is_free(x, y, side, side)) else {
            continue;
        };
        if best.map_or(true, |(_, by)| y < by) {
            best = Some((x, y));
        }
    }

    best
}
