//! Packing results and the packer seam.
//!
//! A [`Layout`] is produced atomically by one [`Packer::pack`] call and never
//! mutated afterwards; callers hold it behind an `Arc` and swap it whole.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use super::grid::Grid;
use super::skyline::{SkylineConfig, SkylinePacker};
use super::tetris::{TetrisConfig, TetrisPacker};
use super::tile::{PlacedTile, Tile};
use super::treemap::TreemapPacker;

// ───────────────────────────────────────── layout ────────────

/// The complete result of one packing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub placed: Vec<PlacedTile>,
    /// Tiles that found no room.  Not an error, just a recorded state.
    pub rejected: Vec<Tile>,
    pub cols: u32,
    pub rows: u32,
}

/// A broken layout invariant, reported by [`Layout::check`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutViolation {
    #[error("tile `{id}` at ({x},{y}) size {w}x{h} leaves the {cols}x{rows} grid")]
    OutOfBounds {
        id: String,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        cols: u32,
        rows: u32,
    },
    #[error("tile `{0}` has zero area")]
    Empty(String),
    #[error("tiles `{first}` and `{second}` overlap")]
    Overlap { first: String, second: String },
    #[error("id `{0}` is accounted for more than once")]
    DuplicateId(String),
}

impl Layout {
    pub fn empty(cols: u32, rows: u32) -> Self {
        Self {
            placed: Vec::new(),
            rejected: Vec::new(),
            cols,
            rows,
        }
    }

    /// Look up a placed tile by id.
    pub fn get(&self, id: &str) -> Option<&PlacedTile> {
        self.placed.iter().find(|p| p.id() == id)
    }

    /// Number of tiles the layout accounts for (placed + rejected).
    pub fn total(&self) -> usize {
        self.placed.len() + self.rejected.len()
    }

    /// Covered cells / total cells, in `[0, 1]`.
    pub fn fill_ratio(&self) -> f64 {
        let total = u64::from(self.cols) * u64::from(self.rows);
        if total == 0 {
            return 0.0;
        }
        let covered: u64 = self.placed.iter().map(PlacedTile::area).sum();
        covered as f64 / total as f64
    }

    /// Verify containment, non-empty rectangles, id uniqueness and the
    /// no-overlap invariant.  `O(cells + tiles)`.
    pub fn check(&self) -> Result<(), LayoutViolation> {
        let cols = self.cols as usize;
        let mut owner: Vec<Option<usize>> = vec![None; cols * self.rows as usize];
        let mut ids = rustc_hash::FxHashSet::default();

        for (i, p) in self.placed.iter().enumerate() {
            if !ids.insert(p.id()) {
                return Err(LayoutViolation::DuplicateId(p.id().to_string()));
            }
            if p.w == 0 || p.h == 0 {
                return Err(LayoutViolation::Empty(p.id().to_string()));
            }
            if p.x + p.w > self.cols || p.y + p.h > self.rows {
                return Err(LayoutViolation::OutOfBounds {
                    id: p.id().to_string(),
                    x: p.x,
                    y: p.y,
                    w: p.w,
                    h: p.h,
                    cols: self.cols,
                    rows: self.rows,
                });
            }
            for y in p.y..p.y + p.h {
                for x in p.x..p.x + p.w {
                    let cell = &mut owner[y as usize * cols + x as usize];
                    if let Some(j) = *cell {
                        return Err(LayoutViolation::Overlap {
                            first: self.placed[j].id().to_string(),
                            second: p.id().to_string(),
                        });
                    }
                    *cell = Some(i);
                }
            }
        }

        for t in &self.rejected {
            if !ids.insert(t.id.as_str()) {
                return Err(LayoutViolation::DuplicateId(t.id.clone()));
            }
        }
        Ok(())
    }
}

// ───────────────────────────────────────── occupancy ─────────

/// Flat `rows·cols` occupancy buffer addressed `y·cols + x`.
#[derive(Debug, Clone)]
pub(crate) struct Occupancy {
    cols: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl Occupancy {
    pub(crate) fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            cells: vec![false; cols as usize * rows as usize],
        }
    }

    /// `true` when the whole rectangle is inside the grid and unoccupied.
    pub(crate) fn is_free(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        if x + w > self.cols || y + h > self.rows {
            return false;
        }
        (y..y + h).all(|row| {
            let start = row as usize * self.cols as usize + x as usize;
            self.cells[start..start + w as usize].iter().all(|&c| !c)
        })
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, w: u32, h: u32, occupied: bool) {
        for row in y..y + h {
            let start = row as usize * self.cols as usize + x as usize;
            self.cells[start..start + w as usize].fill(occupied);
        }
    }

    /// First free `w`×`h` anchor in row-major order (topmost, then leftmost).
    pub(crate) fn first_free(&self, w: u32, h: u32) -> Option<(u32, u32)> {
        if w > self.cols || h > self.rows {
            return None;
        }
        (0..=self.rows - h)
            .flat_map(|y| (0..=self.cols - w).map(move |x| (x, y)))
            .find(|&(x, y)| self.is_free(x, y, w, h))
    }
}

// ───────────────────────────────────────── packers ───────────

/// A packing strategy.  Implementations are pure: the same grid and tile
/// list always give the same layout.
pub trait Packer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Place `tiles` (in the order given) on `grid`.
    fn pack(&self, grid: &Grid, tiles: &[Tile]) -> Layout;
}

/// Selectable packing strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackerKind {
    #[default]
    Skyline,
    Treemap,
    Tetris,
}

/// Per-strategy settings.  The treemap packer has none.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PackerConfig {
    pub skyline: SkylineConfig,
    pub tetris: TetrisConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown packer `{0}` (expected skyline, treemap or tetris)")]
pub struct UnknownPacker(pub String);

impl PackerKind {
    pub const ALL: &[PackerKind] = &[PackerKind::Skyline, PackerKind::Treemap, PackerKind::Tetris];

    /// Name used in config files and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            PackerKind::Skyline => "skyline",
            PackerKind::Treemap => "treemap",
            PackerKind::Tetris => "tetris",
        }
    }

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            PackerKind::Skyline => "Skyline",
            PackerKind::Treemap => "Squarified treemap",
            PackerKind::Tetris => "Tetris",
        }
    }

    /// The next strategy in [`PackerKind::ALL`], wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&k| k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn build(self, cfg: &PackerConfig) -> Box<dyn Packer> {
        match self {
            PackerKind::Skyline => Box::new(SkylinePacker::new(cfg.skyline)),
            PackerKind::Treemap => Box::new(TreemapPacker),
            PackerKind::Tetris => Box::new(TetrisPacker::new(cfg.tetris)),
        }
    }

    /// Build the packer, run it and log the outcome.
    pub fn pack(self, cfg: &PackerConfig, grid: &Grid, tiles: &[Tile]) -> Layout {
        let packer = self.build(cfg);
        let t0 = Instant::now();
        let layout = packer.pack(grid, tiles);
        tracing::debug!(
            "{} pack {}x{}: {} placed, {} rejected in {:.2?}",
            packer.name(),
            grid.cols,
            grid.rows,
            layout.placed.len(),
            layout.rejected.len(),
            t0.elapsed(),
        );
        layout
    }
}

impl fmt::Display for PackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PackerKind {
    type Err = UnknownPacker;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skyline" | "binfill" => Ok(PackerKind::Skyline),
            "treemap" | "squarified" | "sorter" => Ok(PackerKind::Treemap),
            "tetris" | "tetrifill" => Ok(PackerKind::Tetris),
            _ => Err(UnknownPacker(s.to_string())),
        }
    }
}
