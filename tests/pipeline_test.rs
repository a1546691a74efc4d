//! End-to-end: item text or synthetic feed → tiles → every packer.

use tx_tiles::config::AppConfig;
use tx_tiles::core::grid::Grid;
use tx_tiles::core::layout::PackerKind;
use tx_tiles::core::tile;
use tx_tiles::source::{parse_items, SyntheticFeed};

const ITEMS: &str = "\
# vsize feerate id
250     1.0   small
25000   45.5  whale
1200    12.0  mid
1200    12.0  mid
id=keyed weight=600 fee=3.2
90
";

#[test]
fn item_file_packs_with_every_strategy() {
    let items = parse_items(ITEMS).unwrap();
    let config = AppConfig::default();
    let grid = Grid::with_dims(16, 12);
    let tiles = tile::build(&items, &grid, &config.scale);

    assert_eq!(tiles[0].id, "whale");
    assert!(tiles.iter().any(|t| t.id == "mid~1"));
    assert!(tiles.iter().any(|t| t.id == "#5"));

    for &kind in PackerKind::ALL {
        let layout = kind.pack(&config.packer_config(), &grid, &tiles);
        assert_eq!(layout.check(), Ok(()), "{kind}");
        assert_eq!(layout.total(), tiles.len(), "{kind}");
        assert!(layout.get("whale").is_some(), "{kind} dropped the biggest tile");
    }
}

#[test]
fn feed_updates_keep_surviving_ids() {
    let config = AppConfig::default();
    let grid = Grid::compute(160.0, 96.0, 1.0, config.cell_size, config.gap, config.pad);
    let mut feed = SyntheticFeed::new(config.seed, 120);

    let before = tile::build(feed.items(), &grid, &config.scale);
    let first = config.packer.pack(&config.packer_config(), &grid, &before);
    feed.advance();
    let after = tile::build(feed.items(), &grid, &config.scale);
    let second = config.packer.pack(&config.packer_config(), &grid, &after);

    assert_eq!(first.check(), Ok(()));
    assert_eq!(second.check(), Ok(()));
    let shared = second
        .placed
        .iter()
        .filter(|p| first.get(p.id()).is_some())
        .count();
    assert!(shared > 0, "no tile survived a block");
}

#[test]
fn scale_changes_only_the_pixel_mapping() {
    let grid_1x = Grid::compute(400.0, 300.0, 1.0, 10.0, 1.0, 4.0);
    let grid_2x = Grid::compute(400.0, 300.0, 2.0, 10.0, 1.0, 4.0);
    assert_eq!((grid_1x.cols, grid_1x.rows), (grid_2x.cols, grid_2x.rows));
    assert_eq!(grid_2x.cell_size, 2 * grid_1x.cell_size);
    let r1 = grid_1x.cell_rect(2, 1, 3, 3);
    let r2 = grid_2x.cell_rect(2, 1, 3, 3);
    assert_eq!(r2.w, 2 * r1.w);
}
