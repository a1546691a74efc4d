//! Item sources — where the packer's input comes from.
//!
//! The engine itself never fetches anything.  The viewer feeds it either a
//! seeded synthetic mempool (default) or a static list read from a plain
//! text file.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

use crate::core::tile::Item;

// ───────────────────────────────────────── errors ────────────

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read item file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

// ───────────────────────────────────────── item file ─────────

/// Read and parse an item file.
pub fn load_items(path: &Path) -> Result<Vec<Item>, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_items(&text)
}

/// Parse item-file text.
///
/// One item per line; `#` starts a comment.  Either positional
/// `weight [priority [id]]` or keyed `id=.. weight=.. priority=..`.
pub fn parse_items(text: &str) -> Result<Vec<Item>, SourceError> {
    let mut items = Vec::new();
    for (n, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let parse_err = |reason: String| SourceError::Parse { line: n + 1, reason };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let item = if fields.iter().any(|f| f.contains('=')) {
            parse_keyed(&fields).map_err(parse_err)?
        } else {
            parse_positional(&fields).map_err(parse_err)?
        };
        items.push(item);
    }
    Ok(items)
}

fn parse_number(field: &str, what: &str) -> Result<f64, String> {
    field
        .parse::<f64>()
        .map_err(|_| format!("invalid {what} `{field}`"))
}

fn parse_positional(fields: &[&str]) -> Result<Item, String> {
    if fields.len() > 3 {
        return Err(format!("expected at most 3 fields, found {}", fields.len()));
    }
    let mut item = Item::new(parse_number(fields[0], "weight")?);
    if let Some(p) = fields.get(1) {
        item.priority = Some(parse_number(p, "priority")?);
    }
    if let Some(id) = fields.get(2) {
        item.id = Some((*id).to_string());
    }
    Ok(item)
}

fn parse_keyed(fields: &[&str]) -> Result<Item, String> {
    let mut item = Item::default();
    let mut has_weight = false;
    for field in fields {
        let Some((key, value)) = field.split_once('=') else {
            return Err(format!("expected `key=value`, found `{field}`"));
        };
        match key {
            "id" => item.id = Some(value.to_string()),
            "weight" | "size" | "vsize" => {
                item.weight = parse_number(value, "weight")?;
                has_weight = true;
            }
            "priority" | "fee" | "feerate" => item.priority = Some(parse_number(value, "priority")?),
            other => return Err(format!("unknown key `{other}`")),
        }
    }
    if !has_weight {
        return Err("missing `weight`".into());
    }
    Ok(item)
}

// ───────────────────────────────────────── synthetic feed ────

/// What one [`SyntheticFeed::advance`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedDelta {
    pub confirmed: usize,
    pub admitted: usize,
}

/// Deterministic stand-in for a live mempool.
///
/// Ids are stable (`tx<counter>`) so consecutive layouts share most tiles
/// and animate smoothly.  Each [`advance`](Self::advance) "mines a block":
/// the best-paying fraction leaves and a fresh batch arrives.
#[derive(Debug, Clone)]
pub struct SyntheticFeed {
    rng: StdRng,
    pool: Vec<Item>,
    next_id: u64,
    target: usize,
}

/// Smallest and largest synthetic weight (vbytes).
const MIN_VSIZE: f64 = 110.0;
const MAX_VSIZE: f64 = 100_000.0;

impl SyntheticFeed {
    pub fn new(seed: u64, target: usize) -> Self {
        let mut feed = Self {
            rng: StdRng::seed_from_u64(seed),
            pool: Vec::with_capacity(target),
            next_id: 0,
            target: target.max(1),
        };
        for _ in 0..feed.target {
            let item = feed.random_item();
            feed.pool.push(item);
        }
        feed
    }

    pub fn items(&self) -> &[Item] {
        &self.pool
    }

    /// Confirm the top quarter by priority and admit 20–40 % new items.
    pub fn advance(&mut self) -> FeedDelta {
        let mut by_priority: Vec<(f64, &str)> = self
            .pool
            .iter()
            .map(|i| (i.priority.unwrap_or(0.0), i.id.as_deref().unwrap_or("")))
            .collect();
        by_priority.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        let block = self.pool.len() / 4;
        let mined: FxHashSet<String> = by_priority
            .iter()
            .take(block)
            .map(|(_, id)| (*id).to_string())
            .collect();
        self.pool
            .retain(|i| !i.id.as_deref().is_some_and(|id| mined.contains(id)));

        let share = self.rng.random_range(0.2..0.4);
        let admitted = ((self.target as f64 * share).round() as usize).max(1);
        for _ in 0..admitted {
            let item = self.random_item();
            self.pool.push(item);
        }

        FeedDelta {
            confirmed: mined.len(),
            admitted,
        }
    }

    fn random_item(&mut self) -> Item {
        self.next_id += 1;
        // Skewed toward small transactions, with the occasional whale.
        let r: f64 = self.rng.random();
        let vsize = MIN_VSIZE * (MAX_VSIZE / MIN_VSIZE).powf(r * r * r);
        let f: f64 = self.rng.random();
        let feerate = 1.0 + 199.0 * f.powi(4);
        Item::new(vsize.round())
            .with_id(format!("tx{}", self.next_id))
            .with_priority((feerate * 10.0).round() / 10.0)
    }
}

/// The item supply the viewer draws from.
#[derive(Debug, Clone)]
pub enum ItemFeed {
    Synthetic(SyntheticFeed),
    Static(Vec<Item>),
}

impl ItemFeed {
    pub fn items(&self) -> &[Item] {
        match self {
            ItemFeed::Synthetic(feed) => feed.items(),
            ItemFeed::Static(items) => items,
        }
    }

    /// Advance a live feed; static feeds never change.
    pub fn advance(&mut self) -> Option<FeedDelta> {
        match self {
            ItemFeed::Synthetic(feed) => Some(feed.advance()),
            ItemFeed::Static(_) => None,
        }
    }
}
