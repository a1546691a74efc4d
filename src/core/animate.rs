//! Keyed interpolation between two layouts.
//!
//! Tiles are matched by id.  Shared tiles slide from their old anchor to the
//! new one along a smoothstep curve while their size is locked to the new
//! layout; new tiles sit at their final spot from the first frame; tiles
//! that disappeared are simply absent.
//!
//! Scheduling is cooperative: the host calls [`Animator::tick`] from its
//! frame clock and paints whatever comes back.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::layout::Layout;
use super::tile::PlacedTile;

/// One interpolated snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    /// Interpolation parameter in `[0, 1]` (before easing).
    pub t: f64,
    pub placed: Vec<PlacedTile>,
}

/// `3t² − 2t³`, clamped to `[0, 1]`.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp_cell(from: u32, to: u32, e: f64) -> u32 {
    let v = f64::from(from) + (f64::from(to) - f64::from(from)) * e;
    v.round().max(0.0) as u32
}

// ───────────────────────────────────────── tween ─────────────

/// The pure interpolation between one pair of layouts.
#[derive(Debug, Clone)]
pub struct Tween {
    to: Arc<Layout>,
    /// Start anchor for each tile of `to`, `None` for tiles new in `to`.
    origins: Vec<Option<(u32, u32)>>,
}

impl Tween {
    /// Build the `id → index` lookup over `from` once for the whole pair.
    pub fn new(from: &Layout, to: Arc<Layout>) -> Self {
        let index: FxHashMap<&str, usize> = from
            .placed
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id(), i))
            .collect();
        let origins = to
            .placed
            .iter()
            .map(|p| {
                index.get(p.id()).map(|&i| {
                    let old = &from.placed[i];
                    (old.x, old.y)
                })
            })
            .collect();
        Self { to, origins }
    }

    pub fn target(&self) -> &Arc<Layout> {
        &self.to
    }

    /// Frame at parameter `t`.  `t >= 1` (or NaN) yields `to` exactly.
    pub fn frame_at(&self, t: f64) -> AnimationFrame {
        if t.is_nan() || t >= 1.0 {
            return AnimationFrame {
                t: 1.0,
                placed: self.to.placed.clone(),
            };
        }
        let t = t.max(0.0);
        let e = smoothstep(t);
        let placed = self
            .to
            .placed
            .iter()
            .zip(&self.origins)
            .map(|(p, origin)| match *origin {
                Some((fx, fy)) => PlacedTile {
                    x: lerp_cell(fx, p.x, e),
                    y: lerp_cell(fy, p.y, e),
                    ..p.clone()
                },
                None => p.clone(),
            })
            .collect();
        AnimationFrame { t, placed }
    }
}

// ───────────────────────────────────────── run ───────────────

/// One finite, non-restartable animation run.
#[derive(Debug, Clone)]
pub struct Animation {
    tween: Tween,
    start: Instant,
    duration: Duration,
    finished: bool,
}

impl Animation {
    pub fn new(from: &Layout, to: Arc<Layout>, duration: Duration, start: Instant) -> Self {
        Self {
            tween: Tween::new(from, to),
            start,
            duration,
            finished: false,
        }
    }

    /// Next frame for the clock reading `now`.  Once `duration` has elapsed
    /// the final frame (equal to the target layout) is emitted exactly once;
    /// afterwards this returns `None` forever.
    pub fn next_frame(&mut self, now: Instant) -> Option<AnimationFrame> {
        if self.finished {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.start);
        if self.duration.is_zero() || elapsed >= self.duration {
            self.finished = true;
            return Some(self.tween.frame_at(1.0));
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        Some(self.tween.frame_at(t))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn target(&self) -> &Arc<Layout> {
        self.tween.target()
    }
}

// ───────────────────────────────────────── animator ──────────

/// Owns at most one active [`Animation`].
#[derive(Debug, Default)]
pub struct Animator {
    current: Option<Animation>,
    generation: u64,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start animating `from → to`, superseding any run in progress.
    /// Returns the new run's generation.
    pub fn play(&mut self, from: &Layout, to: Arc<Layout>, duration: Duration) -> u64 {
        self.play_at(from, to, duration, Instant::now())
    }

    /// [`Animator::play`] with an explicit start instant.
    pub fn play_at(
        &mut self,
        from: &Layout,
        to: Arc<Layout>,
        duration: Duration,
        now: Instant,
    ) -> u64 {
        if self.current.take().is_some() {
            tracing::debug!("animation run {} superseded", self.generation);
        }
        self.generation = self.generation.wrapping_add(1);
        self.current = Some(Animation::new(from, to, duration, now));
        self.generation
    }

    /// Next frame of the active run, if any.  The run is dropped once its
    /// final frame has been handed out.
    pub fn tick(&mut self, now: Instant) -> Option<AnimationFrame> {
        let run = self.current.as_mut()?;
        let frame = run.next_frame(now);
        if run.is_finished() {
            self.current = None;
        }
        frame
    }

    /// Stop the active run without emitting anything further.
    pub fn cancel(&mut self) {
        self.current = None;
    }

    pub fn is_animating(&self) -> bool {
        self.current.is_some()
    }

    /// Generation of the most recently started run (`0` before the first).
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
