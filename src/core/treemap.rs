//! Squarified treemap packing.
//!
//! Areas are normalised to the cell budget and laid out in rows along the
//! shorter side of the remaining rectangle (Bruls, Huizing & van Wijk).
//! Floating-point edges are snapped to whole cells; neighbours share their
//! float edge exactly, so snapping keeps them disjoint.

use super::grid::Grid;
use super::layout::{Layout, Packer};
use super::tile::{PlacedTile, Tile};

/// Remaining space smaller than this many cells on either side is exhausted.
const MIN_EXTENT: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct TreemapPacker;

/// Edges of a float rectangle, `x0 <= x1`, `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Edges {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

/// Integer cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cells {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Debug, Clone, Copy)]
struct Remaining {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl Remaining {
    fn exhausted(&self) -> bool {
        self.w < MIN_EXTENT || self.h < MIN_EXTENT
    }
}

impl Packer for TreemapPacker {
    fn name(&self) -> &'static str {
        "treemap"
    }

    fn pack(&self, grid: &Grid, tiles: &[Tile]) -> Layout {
        let (cols, rows) = (grid.cols, grid.rows);
        let mut layout = Layout::empty(cols, rows);
        if tiles.is_empty() {
            return layout;
        }

        // Declared area is side²; stable sort keeps the tiler's tie order.
        let mut order: Vec<usize> = (0..tiles.len()).collect();
        order.sort_by(|&a, &b| declared_area(&tiles[b]).cmp(&declared_area(&tiles[a])));

        let total: f64 = order.iter().map(|&i| declared_area(&tiles[i]) as f64).sum();
        let budget = f64::from(cols) * f64::from(rows);
        let areas: Vec<f64> = order
            .iter()
            .map(|&i| {
                if total > 0.0 {
                    declared_area(&tiles[i]) as f64 * budget / total
                } else {
                    0.0
                }
            })
            .collect();

        let edges = squarify(
            &areas,
            Remaining {
                x: 0.0,
                y: 0.0,
                w: f64::from(cols),
                h: f64::from(rows),
            },
        );

        let mut cells: Vec<Option<Cells>> = edges
            .iter()
            .map(|e| e.and_then(|e| snap(e, cols, rows)))
            .collect();
        trim_to_rank(&mut cells);

        for (pos, &tile_idx) in order.iter().enumerate() {
            let tile = tiles[tile_idx].clone();
            match cells[pos] {
                Some(c) => layout.placed.push(PlacedTile {
                    tile,
                    x: c.x,
                    y: c.y,
                    w: c.w,
                    h: c.h,
                }),
                None => layout.rejected.push(tile),
            }
        }

        layout
    }
}

fn declared_area(tile: &Tile) -> u64 {
    u64::from(tile.side) * u64::from(tile.side)
}

/// Worst aspect ratio of a row with the given area stats laid along `side`.
fn worst_ratio(min_a: f64, max_a: f64, sum: f64, side: f64) -> f64 {
    if sum <= 0.0 || side <= 0.0 || min_a <= 0.0 {
        return f64::INFINITY;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    (side_sq * max_a / sum_sq).max(sum_sq / (side_sq * min_a))
}

/// Lay out descending `areas` into `rem`.  `None` marks an area that was
/// never reached because the remaining rectangle ran out.
fn squarify(areas: &[f64], mut rem: Remaining) -> Vec<Option<Edges>> {
    let mut out = vec![None; areas.len()];
    let mut row_start = 0usize;
    let mut idx = 0usize;
    let (mut row_sum, mut row_min, mut row_max) = (0.0f64, f64::INFINITY, 0.0f64);

    while idx < areas.len() {
        if rem.exhausted() {
            break;
        }
        let a = areas[idx];
        if idx == row_start {
            (row_sum, row_min, row_max) = (a, a, a);
            idx += 1;
            continue;
        }

        let side = rem.w.min(rem.h);
        let current = worst_ratio(row_min, row_max, row_sum, side);
        let grown = worst_ratio(row_min.min(a), row_max.max(a), row_sum + a, side);
        if grown <= current {
            row_sum += a;
            row_min = row_min.min(a);
            row_max = row_max.max(a);
            idx += 1;
        } else {
            lay_row(&areas[row_start..idx], row_start, row_sum, &mut rem, &mut out);
            row_start = idx;
        }
    }

    if row_start < idx && !rem.exhausted() {
        lay_row(&areas[row_start..idx], row_start, row_sum, &mut rem, &mut out);
    }
    out
}

/// Place one row as a strip along the shorter side of `rem`, then shrink
/// `rem` by the strip's thickness.
fn lay_row(row: &[f64], start: usize, sum: f64, rem: &mut Remaining, out: &mut [Option<Edges>]) {
    if row.is_empty() || sum <= 0.0 {
        return;
    }
    let last = row.len() - 1;

    if rem.w >= rem.h {
        // Wide: vertical strip on the left, tiles stacked top to bottom.
        let thick = (sum / rem.h).min(rem.w);
        let x1 = rem.x + thick;
        let mut y = rem.y;
        for (k, a) in row.iter().enumerate() {
            let y_end = if k == last { rem.y + rem.h } else { y + a / sum * rem.h };
            out[start + k] = Some(Edges { x0: rem.x, y0: y, x1, y1: y_end });
            y = y_end;
        }
        rem.w -= thick;
        rem.x = x1;
    } else {
        // Tall: horizontal strip on top, tiles left to right.
        let thick = (sum / rem.w).min(rem.h);
        let y1 = rem.y + thick;
        let mut x = rem.x;
        for (k, a) in row.iter().enumerate() {
            let x_end = if k == last { rem.x + rem.w } else { x + a / sum * rem.w };
            out[start + k] = Some(Edges { x0: x, y0: rem.y, x1: x_end, y1 });
            x = x_end;
        }
        rem.h -= thick;
        rem.y = y1;
    }
}

/// Round float edges to cell edges and clamp into the grid.  Zero-area
/// results are dropped.
fn snap(e: Edges, cols: u32, rows: u32) -> Option<Cells> {
    let round = |v: f64, max: u32| -> u32 {
        if v.is_finite() {
            v.round().clamp(0.0, f64::from(max)) as u32
        } else {
            0
        }
    };
    let (x0, x1) = (round(e.x0, cols), round(e.x1, cols));
    let (y0, y1) = (round(e.y0, rows), round(e.y1, rows));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Cells {
        x: x0,
        y: y0,
        w: x1 - x0,
        h: y1 - y0,
    })
}

/// Keep placed areas non-increasing along the descending input order.
/// Rounding can make a smaller tile come out bigger than its predecessor;
/// such a tile is shrunk (longer side first) in place, which can only open
/// gaps, never overlaps.
fn trim_to_rank(cells: &mut [Option<Cells>]) {
    let mut cap = u64::MAX;
    for slot in cells.iter_mut() {
        let Some(mut c) = *slot else {
            continue;
        };
        while u64::from(c.w) * u64::from(c.h) > cap {
            if c.w >= c.h {
                c.w -= 1;
            } else {
                c.h -= 1;
            }
        }
        if c.w == 0 || c.h == 0 {
            *slot = None;
            continue;
        }
        cap = u64::from(c.w) * u64::from(c.h);
        *slot = Some(c);
    }
}
