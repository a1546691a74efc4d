//! Discrete layout geometry.
//!
//! A [`Grid`] describes how a paint surface is divided into same-size square
//! cells.  Packers only ever see `cols`/`rows`; renderers use the pixel
//! fields to turn cell rectangles back into device pixels.

/// Lower bound for `cols` and `rows`.  Degenerate containers land here.
pub const GRID_MIN_DIM: u32 = 8;
/// Upper bound for `cols` and `rows`, keeps packer cost bounded.
pub const GRID_MAX_DIM: u32 = 1024;
/// Smallest cell side in device pixels.
pub const MIN_CELL_SIZE: u32 = 2;

/// Immutable grid geometry for one layout computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub cols: u32,
    pub rows: u32,
    /// Cell side in device pixels (always `>= MIN_CELL_SIZE`).
    pub cell_size: u32,
    /// Gap between neighbouring cells in device pixels.
    pub gap: u32,
    /// Padding around the cell area in device pixels.
    pub pad: u32,
    /// Device-pixel position of the top-left cell.
    pub origin_x: i32,
    pub origin_y: i32,
    /// Device scale factor the grid was computed for.
    pub scale: f64,
}

/// A rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Grid {
    /// Derive the grid for a container of `width_px` × `height_px` CSS
    /// pixels.  All hints are CSS-scale and get multiplied by
    /// `device_scale` before rounding to whole device pixels.
    ///
    /// Never fails: non-finite input is sanitised and the resulting
    /// dimensions are clamped to `[GRID_MIN_DIM, GRID_MAX_DIM]`.
    pub fn compute(
        width_px: f64,
        height_px: f64,
        device_scale: f64,
        cell_size_hint: f64,
        gap_hint: f64,
        pad_hint: f64,
    ) -> Self {
        let scale = if device_scale.is_finite() && device_scale > 0.0 {
            device_scale
        } else {
            1.0
        };

        let cell_size = to_device(cell_size_hint, scale).max(MIN_CELL_SIZE);
        let gap = to_device(gap_hint, scale);
        let pad = to_device(pad_hint, scale);

        let interior_w = to_device(width_px, scale).saturating_sub(pad.saturating_mul(2));
        let interior_h = to_device(height_px, scale).saturating_sub(pad.saturating_mul(2));

        let cols = fit_cells(interior_w, cell_size, gap);
        let rows = fit_cells(interior_h, cell_size, gap);

        Self {
            cols,
            rows,
            cell_size,
            gap,
            pad,
            origin_x: centred_origin(interior_w, cols, cell_size, gap, pad),
            origin_y: centred_origin(interior_h, rows, cell_size, gap, pad),
            scale,
        }
    }

    /// A cell-only grid with explicit dimensions (no pixel slack, no
    /// padding).  Used by headless callers that never paint.
    pub fn with_dims(cols: u32, rows: u32) -> Self {
        Self {
            cols: cols.clamp(1, GRID_MAX_DIM),
            rows: rows.clamp(1, GRID_MAX_DIM),
            cell_size: MIN_CELL_SIZE,
            gap: 0,
            pad: 0,
            origin_x: 0,
            origin_y: 0,
            scale: 1.0,
        }
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Smaller of the two dimensions: the largest square side that can fit.
    pub fn max_side(&self) -> u32 {
        self.cols.min(self.rows)
    }

    /// Convert a cell rectangle to device pixels.  Gaps are only inserted
    /// *between* cells, so a `w`-cell rect spans `w·cell + (w−1)·gap`.
    pub fn cell_rect(&self, x: u32, y: u32, w: u32, h: u32) -> PixelRect {
        let pitch = i64::from(self.cell_size) + i64::from(self.gap);
        let span = |n: u32| -> u32 {
            if n == 0 {
                0
            } else {
                let px = i64::from(n) * i64::from(self.cell_size)
                    + i64::from(n - 1) * i64::from(self.gap);
                px.min(i64::from(u32::MAX)) as u32
            }
        };
        PixelRect {
            x: clamp_i32(i64::from(self.origin_x) + i64::from(x) * pitch),
            y: clamp_i32(i64::from(self.origin_y) + i64::from(y) * pitch),
            w: span(w),
            h: span(h),
        }
    }
}

/// Round a CSS-scale length to whole device pixels (`0` for junk input).
fn to_device(css: f64, scale: f64) -> u32 {
    let px = css * scale;
    if !px.is_finite() || px <= 0.0 {
        return 0;
    }
    px.round().min(f64::from(u32::MAX)) as u32
}

/// How many `cell + gap` steps fit in `interior`.  The last cell needs no
/// trailing gap, hence the `+ gap`.
fn fit_cells(interior: u32, cell: u32, gap: u32) -> u32 {
    let pitch = u64::from(cell) + u64::from(gap);
    let n = (u64::from(interior) + u64::from(gap)) / pitch;
    n.clamp(u64::from(GRID_MIN_DIM), u64::from(GRID_MAX_DIM)) as u32
}

fn centred_origin(interior: u32, count: u32, cell: u32, gap: u32, pad: u32) -> i32 {
    let used = i64::from(count) * i64::from(cell) + i64::from(count.saturating_sub(1)) * i64::from(gap);
    let slack = (i64::from(interior) - used).max(0);
    clamp_i32(i64::from(pad) + slack / 2)
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_cells_and_centres_slack() {
        // 100px wide, 10px cells, 2px gap: 8 cells use 8·10 + 7·2 = 94px.
        let g = Grid::compute(100.0, 100.0, 1.0, 10.0, 2.0, 0.0);
        assert_eq!(g.cols, 8);
        assert_eq!(g.rows, 8);
        assert_eq!(g.origin_x, 3);
        assert_eq!(g.origin_y, 3);
    }

    #[test]
    fn device_scale_multiplies_hints() {
        let g = Grid::compute(200.0, 100.0, 2.0, 5.0, 0.0, 10.0);
        assert_eq!(g.cell_size, 10);
        assert_eq!(g.pad, 20);
        // Interior is 400 − 40 = 360 by 200 − 40 = 160 device px.
        assert_eq!(g.cols, 36);
        assert_eq!(g.rows, 16);
        assert_eq!(g.origin_x, 20);
    }

    #[test]
    fn zero_container_degrades_to_minimum() {
        let g = Grid::compute(0.0, 0.0, 1.0, 4.0, 1.0, 2.0);
        assert_eq!((g.cols, g.rows), (GRID_MIN_DIM, GRID_MIN_DIM));
        assert!(g.cell_size >= MIN_CELL_SIZE);
    }

    #[test]
    fn junk_input_is_sanitised() {
        let g = Grid::compute(f64::NAN, -5.0, f64::INFINITY, f64::NAN, -1.0, f64::NAN);
        assert_eq!(g.scale, 1.0);
        assert_eq!(g.cell_size, MIN_CELL_SIZE);
        assert_eq!(g.gap, 0);
        assert_eq!((g.cols, g.rows), (GRID_MIN_DIM, GRID_MIN_DIM));
    }

    #[test]
    fn huge_container_is_capped() {
        let g = Grid::compute(1.0e7, 1.0e7, 1.0, 2.0, 0.0, 0.0);
        assert_eq!((g.cols, g.rows), (GRID_MAX_DIM, GRID_MAX_DIM));
    }

    #[test]
    fn cell_rect_includes_inner_gaps_only() {
        let g = Grid::compute(100.0, 100.0, 1.0, 10.0, 2.0, 0.0);
        let r = g.cell_rect(1, 2, 3, 1);
        assert_eq!(r, PixelRect { x: 15, y: 27, w: 34, h: 10 });
    }
}
