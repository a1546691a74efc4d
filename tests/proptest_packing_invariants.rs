//! Property-based invariant tests for the tiler and the three packers.
//!
//! Verifies:
//! 1. Tiler: every side lies in `1..=min(cols, rows)`, ids are unique
//! 2. Tiler: output is sorted big-first and ignores input order
//! 3. Packers: placed tiles stay inside the grid and never overlap
//! 4. Packers: every input tile is either placed or rejected, exactly once
//! 5. Packers: same grid and tiles give the same layout
//! 6. Skyline and tetris place squares of the tile's own side
//! 7. Treemap: placed areas never grow along the big-first order
//! 8. Grid: dimensions always land inside the supported range

use proptest::prelude::*;
use tx_tiles::core::grid::{Grid, GRID_MAX_DIM, GRID_MIN_DIM};
use tx_tiles::core::layout::{Layout, PackerConfig, PackerKind};
use tx_tiles::core::scale::ScaleConfig;
use tx_tiles::core::tile::{self, Item, Tile};

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_item() -> impl Strategy<Value = Item> {
    (
        prop_oneof![Just(0.0f64), 1.0f64..200_000.0],
        prop::option::of(0.0f64..500.0),
        prop::option::of("[a-d]{1,3}"),
    )
        .prop_map(|(weight, priority, id)| Item {
            id,
            weight,
            priority,
        })
}

fn arb_items() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(arb_item(), 0..80)
}

fn arb_grid() -> impl Strategy<Value = Grid> {
    (GRID_MIN_DIM..48, GRID_MIN_DIM..32).prop_map(|(c, r)| Grid::with_dims(c, r))
}

fn arb_kind() -> impl Strategy<Value = PackerKind> {
    prop_oneof![
        Just(PackerKind::Skyline),
        Just(PackerKind::Treemap),
        Just(PackerKind::Tetris),
    ]
}

fn pack(kind: PackerKind, grid: &Grid, tiles: &[Tile]) -> Layout {
    kind.pack(&PackerConfig::default(), grid, tiles)
}

proptest! {
    // ── Tiler ─────────────────────────────────────────────────────────

    #[test]
    fn tiler_sides_fit_the_grid(items in arb_items(), grid in arb_grid()) {
        let tiles = tile::build(&items, &grid, &ScaleConfig::default());
        prop_assert_eq!(tiles.len(), items.len());
        let mut ids = std::collections::HashSet::new();
        for t in &tiles {
            prop_assert!(t.side >= 1 && t.side <= grid.max_side(), "side {}", t.side);
            prop_assert!(ids.insert(t.id.clone()), "duplicate id {}", t.id);
        }
    }

    #[test]
    fn tiler_order_is_big_first_and_stable(items in arb_items(), grid in arb_grid()) {
        let cfg = ScaleConfig::default();
        let tiles = tile::build(&items, &grid, &cfg);
        for pair in tiles.windows(2) {
            prop_assert!(pair[0].side >= pair[1].side);
            if pair[0].side == pair[1].side {
                prop_assert!(pair[0].priority >= pair[1].priority);
            }
        }
        // Distinct explicit ids make the order independent of input order.
        let keyed: Vec<Item> = items
            .iter()
            .enumerate()
            .map(|(i, it)| Item { id: Some(format!("k{i}")), ..it.clone() })
            .collect();
        let mut reversed = keyed.clone();
        reversed.reverse();
        prop_assert_eq!(tile::build(&keyed, &grid, &cfg), tile::build(&reversed, &grid, &cfg));
    }

    // ── Packers ───────────────────────────────────────────────────────

    #[test]
    fn layouts_are_contained_and_disjoint(
        items in arb_items(),
        grid in arb_grid(),
        kind in arb_kind(),
    ) {
        let tiles = tile::build(&items, &grid, &ScaleConfig::default());
        let layout = pack(kind, &grid, &tiles);
        prop_assert_eq!(layout.check(), Ok(()));
        prop_assert_eq!((layout.cols, layout.rows), (grid.cols, grid.rows));
        prop_assert!(layout.fill_ratio() <= 1.0);
    }

    #[test]
    fn every_tile_is_accounted_for(
        items in arb_items(),
        grid in arb_grid(),
        kind in arb_kind(),
    ) {
        let tiles = tile::build(&items, &grid, &ScaleConfig::default());
        let layout = pack(kind, &grid, &tiles);
        prop_assert_eq!(layout.total(), tiles.len());
        let mut seen: Vec<&str> = layout
            .placed
            .iter()
            .map(|p| p.id())
            .chain(layout.rejected.iter().map(|t| t.id.as_str()))
            .collect();
        let mut expected: Vec<&str> = tiles.iter().map(|t| t.id.as_str()).collect();
        seen.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn packing_is_deterministic(
        items in arb_items(),
        grid in arb_grid(),
        kind in arb_kind(),
    ) {
        let tiles = tile::build(&items, &grid, &ScaleConfig::default());
        prop_assert_eq!(pack(kind, &grid, &tiles), pack(kind, &grid, &tiles));
    }

    #[test]
    fn square_packers_keep_tile_sides(
        items in arb_items(),
        grid in arb_grid(),
        tetris in any::<bool>(),
    ) {
        let kind = if tetris { PackerKind::Tetris } else { PackerKind::Skyline };
        let tiles = tile::build(&items, &grid, &ScaleConfig::default());
        let layout = pack(kind, &grid, &tiles);
        for p in &layout.placed {
            prop_assert_eq!((p.w, p.h), (p.tile.side, p.tile.side));
        }
    }

    #[test]
    fn treemap_keeps_area_rank(items in arb_items(), grid in arb_grid()) {
        let tiles = tile::build(&items, &grid, &ScaleConfig::default());
        let layout = pack(PackerKind::Treemap, &grid, &tiles);
        for pair in layout.placed.windows(2) {
            prop_assert!(pair[0].tile.side >= pair[1].tile.side);
            prop_assert!(
                pair[0].area() >= pair[1].area(),
                "{} ({}) before {} ({})",
                pair[0].id(), pair[0].area(), pair[1].id(), pair[1].area()
            );
        }
    }

    // ── Grid ──────────────────────────────────────────────────────────

    #[test]
    fn grid_dimensions_are_clamped(
        w in -100.0f64..50_000.0,
        h in -100.0f64..50_000.0,
        scale in 0.0f64..4.0,
        cell in 0.0f64..40.0,
        gap in 0.0f64..8.0,
        pad in 0.0f64..32.0,
    ) {
        let grid = Grid::compute(w, h, scale, cell, gap, pad);
        prop_assert!((GRID_MIN_DIM..=GRID_MAX_DIM).contains(&grid.cols));
        prop_assert!((GRID_MIN_DIM..=GRID_MAX_DIM).contains(&grid.rows));
        prop_assert!(grid.cell_size >= 2);
        prop_assert!(grid.origin_x >= 0 && grid.origin_y >= 0);
    }
}
