//! Boundary laws of layout animation, checked against real packer output.

use std::sync::Arc;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use tx_tiles::core::animate::{smoothstep, Animation, Animator, Tween};
use tx_tiles::core::grid::Grid;
use tx_tiles::core::layout::{Layout, PackerConfig, PackerKind};
use tx_tiles::core::scale::ScaleConfig;
use tx_tiles::core::tile::{self, Item};

// ── Strategy helpers ──────────────────────────────────────────────────

/// Items with ids drawn from a small pool so consecutive snapshots share
/// some tiles and differ in others.
fn arb_snapshot() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::btree_map(0u32..40, 100.0f64..40_000.0, 0..30).prop_map(|m| {
        m.into_iter()
            .map(|(id, w)| Item::new(w).with_id(format!("tx{id}")))
            .collect()
    })
}

fn arb_kind() -> impl Strategy<Value = PackerKind> {
    prop_oneof![
        Just(PackerKind::Skyline),
        Just(PackerKind::Treemap),
        Just(PackerKind::Tetris),
    ]
}

fn layout_of(items: &[Item], kind: PackerKind) -> Layout {
    let grid = Grid::with_dims(24, 16);
    let tiles = tile::build(items, &grid, &ScaleConfig::default());
    kind.pack(&PackerConfig::default(), &grid, &tiles)
}

proptest! {
    #[test]
    fn endpoints_match_the_layouts(
        a in arb_snapshot(),
        b in arb_snapshot(),
        kind in arb_kind(),
    ) {
        let from = layout_of(&a, kind);
        let to = Arc::new(layout_of(&b, kind));
        let tween = Tween::new(&from, Arc::clone(&to));

        let first = tween.frame_at(0.0);
        prop_assert_eq!(first.placed.len(), to.placed.len());
        for p in &first.placed {
            let target = to.get(p.id()).unwrap();
            prop_assert_eq!((p.w, p.h), (target.w, target.h));
            match from.get(p.id()) {
                Some(old) => prop_assert_eq!((p.x, p.y), (old.x, old.y)),
                None => prop_assert_eq!((p.x, p.y), (target.x, target.y)),
            }
        }

        prop_assert_eq!(&tween.frame_at(1.0).placed, &to.placed);
    }

    #[test]
    fn intermediate_frames_stay_between_endpoints(
        a in arb_snapshot(),
        b in arb_snapshot(),
        kind in arb_kind(),
        t in 0.0f64..1.0,
    ) {
        let from = layout_of(&a, kind);
        let to = Arc::new(layout_of(&b, kind));
        let frame = Tween::new(&from, Arc::clone(&to)).frame_at(t);
        for (p, target) in frame.placed.iter().zip(&to.placed) {
            prop_assert_eq!(p.id(), target.id());
            let (sx, sy) = from.get(p.id()).map_or((target.x, target.y), |o| (o.x, o.y));
            prop_assert!(p.x >= sx.min(target.x) && p.x <= sx.max(target.x));
            prop_assert!(p.y >= sy.min(target.y) && p.y <= sy.max(target.y));
        }
    }

    #[test]
    fn smoothstep_is_monotonic(a in 0.0f64..1.0, b in 0.0f64..1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(smoothstep(lo) <= smoothstep(hi));
    }
}

#[test]
fn run_emits_a_bounded_number_of_frames() {
    let from = layout_of(&[Item::new(900.0).with_id("a")], PackerKind::Skyline);
    let to = Arc::new(layout_of(
        &[Item::new(900.0).with_id("a"), Item::new(5000.0).with_id("b")],
        PackerKind::Skyline,
    ));
    let start = Instant::now();
    let mut run = Animation::new(&from, Arc::clone(&to), Duration::from_millis(300), start);

    let mut frames = Vec::new();
    let mut now = start;
    while let Some(frame) = run.next_frame(now) {
        frames.push(frame);
        now += Duration::from_millis(33);
    }
    // 300 ms at 33 ms per frame: ten in-between frames plus the final one.
    assert_eq!(frames.len(), 11);
    assert!(frames.windows(2).all(|w| w[0].t < w[1].t));
    assert_eq!(frames.last().map(|f| &f.placed), Some(&to.placed));
    assert!(run.is_finished());
}

#[test]
fn animator_generations_increase() {
    let a = layout_of(&[Item::new(300.0).with_id("a")], PackerKind::Tetris);
    let b = Arc::new(layout_of(&[Item::new(300.0).with_id("b")], PackerKind::Tetris));
    let mut animator = Animator::new();
    assert_eq!(animator.generation(), 0);
    let start = Instant::now();
    let g1 = animator.play_at(&a, Arc::clone(&b), Duration::from_millis(100), start);
    let g2 = animator.play_at(&b, Arc::new(a.clone()), Duration::from_millis(100), start);
    assert!(g2 > g1);
    assert_eq!(animator.generation(), g2);
    let last = animator.tick(start + Duration::from_secs(1)).unwrap();
    assert_eq!(last.placed, a.placed);
}
