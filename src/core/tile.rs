//! Items, tiles and the tiler that turns one into the other.
//!
//! The tiler's output order is part of its contract: every packer relies on
//! "big tiles first", and ties are broken by a seeded hash of the id so the
//! order never depends on insertion order or randomness.

use std::cmp::Ordering;
use std::hash::Hasher;

use rustc_hash::{FxHashSet, FxHasher};

use super::grid::Grid;
use super::scale::{self, ScaleConfig};

// ───────────────────────────────────────── types ─────────────

/// One upstream record, e.g. a mempool transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub id: Option<String>,
    /// Raw weight (byte size, vsize, ...).
    pub weight: f64,
    /// Tie-break priority, e.g. fee rate.
    pub priority: Option<f64>,
}

impl Item {
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// A sized tile, ready to be packed.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Unique within one layout pass.
    pub id: String,
    /// Sanitised weight (`>= 0`).
    pub weight: f64,
    /// Sanitised priority (never NaN).
    pub priority: f64,
    /// Side in cells, `1..=min(cols, rows)`.
    pub side: u32,
}

/// A tile with a cell rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTile {
    pub tile: Tile,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PlacedTile {
    /// Square placement using the tile's own side.
    pub fn square(tile: Tile, x: u32, y: u32) -> Self {
        let side = tile.side;
        Self {
            tile,
            x,
            y,
            w: side,
            h: side,
        }
    }

    pub fn id(&self) -> &str {
        &self.tile.id
    }

    pub fn area(&self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }

    /// `true` when the two cell rectangles share at least one cell.
    pub fn overlaps(&self, other: &PlacedTile) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

// ───────────────────────────────────────── ordering ──────────

/// Deterministic seeded hash of a tile id.
pub fn id_hash(id: &str, seed: u64) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_u64(seed);
    hasher.write(id.as_bytes());
    hasher.finish()
}

/// Sort big-first: side desc, priority desc, `id_hash(id, seed)` asc, id asc.
pub fn sort_big_first(tiles: Vec<Tile>, seed: u64) -> Vec<Tile> {
    let mut keyed: Vec<(u64, Tile)> = tiles
        .into_iter()
        .map(|t| (id_hash(&t.id, seed), t))
        .collect();
    keyed.sort_by(|(ha, a), (hb, b)| big_first(a, *ha, b, *hb));
    keyed.into_iter().map(|(_, t)| t).collect()
}

fn big_first(a: &Tile, ha: u64, b: &Tile, hb: u64) -> Ordering {
    b.side
        .cmp(&a.side)
        .then_with(|| b.priority.total_cmp(&a.priority))
        .then_with(|| ha.cmp(&hb))
        .then_with(|| a.id.cmp(&b.id))
}

// ───────────────────────────────────────── tiler ─────────────

/// Build sized tiles for `items`, clamped to `grid`, in big-first order.
///
/// Items without an id get the positional id `#<index>`.  Repeated ids are
/// suffixed `~1`, `~2`, ... in input order so ids stay unique per pass.
pub fn build(items: &[Item], grid: &Grid, cfg: &ScaleConfig) -> Vec<Tile> {
    let clamp = grid.max_side().max(1);
    let mut used: FxHashSet<String> = FxHashSet::default();
    let mut tiles = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let base = match item.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("#{index}"),
        };
        let id = unique_id(base, &mut used);

        let weight = scale::sanitize_weight(item.weight);
        let priority = item.priority.filter(|p| !p.is_nan()).unwrap_or(0.0);
        let side = scale::side_cells(weight, cfg).min(clamp);

        tiles.push(Tile {
            id,
            weight,
            priority,
            side,
        });
    }

    sort_big_first(tiles, 0)
}

fn unique_id(base: String, used: &mut FxHashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{base}~{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
