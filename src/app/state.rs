//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use ratatui::layout::Rect;

use tx_tiles::config::AppConfig;
use tx_tiles::core::{
    animate::Animator,
    grid::Grid,
    layout::{Layout, PackerKind},
    tile::{self, PlacedTile},
};
use tx_tiles::source::ItemFeed;

/// Top-level application state.
pub struct AppState {
    pub config: AppConfig,
    /// Active packing strategy.
    pub packer: PackerKind,
    pub feed: ItemFeed,
    /// Grid for the current tile pane.
    pub grid: Grid,
    /// Last packed layout, swapped whole on every repack.
    pub layout: Arc<Layout>,
    /// What is on screen right now: the layout, or an in-between frame.
    shown: Vec<PlacedTile>,
    animator: Animator,
    /// Pane the grid was computed for.
    pane: Rect,
    /// When `true` the refresh clock no longer advances the feed.
    pub paused: bool,
    pub show_help: bool,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    pub last_refresh: DateTime<Local>,
}

impl AppState {
    pub fn new(config: AppConfig, feed: ItemFeed) -> Self {
        let grid = Grid::compute(0.0, 0.0, 1.0, config.cell_size, config.gap, config.pad);
        let mut state = Self {
            packer: config.packer,
            config,
            feed,
            grid,
            layout: Arc::new(Layout::empty(grid.cols, grid.rows)),
            shown: Vec::new(),
            animator: Animator::new(),
            pane: Rect::default(),
            paused: false,
            show_help: false,
            should_quit: false,
            status_message: None,
            last_refresh: Local::now(),
        };
        state.repack(false, Instant::now());
        state
    }

    /// Tiles to paint this frame.
    pub fn displayed(&self) -> &[PlacedTile] {
        &self.shown
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    /// Recompute the grid for a new tile pane.  One terminal column is one
    /// pixel wide and one row two pixels tall, so cells come out square.
    /// A changed grid repacks immediately, without animation.
    pub fn resize(&mut self, pane: Rect) {
        if pane == self.pane {
            return;
        }
        self.pane = pane;
        let grid = Grid::compute(
            f64::from(pane.width),
            f64::from(pane.height) * 2.0,
            1.0,
            self.config.cell_size,
            self.config.gap,
            self.config.pad,
        );
        if grid == self.grid {
            return;
        }
        tracing::debug!("grid resized to {}x{}", grid.cols, grid.rows);
        self.grid = grid;
        self.repack(false, Instant::now());
    }

    /// Rebuild tiles from the feed and pack them.  With `animate`, tiles
    /// slide from wherever they are drawn right now.
    pub fn repack(&mut self, animate: bool, now: Instant) {
        let tiles = tile::build(self.feed.items(), &self.grid, &self.config.scale);
        let layout = Arc::new(self.packer.pack(&self.config.packer_config(), &self.grid, &tiles));
        if let Err(violation) = layout.check() {
            tracing::error!("{} produced a broken layout: {violation}", self.packer);
        }

        if animate && self.config.animation_ms > 0 {
            let mut from = Layout::empty(self.layout.cols, self.layout.rows);
            from.placed = std::mem::take(&mut self.shown);
            self.animator
                .play_at(&from, Arc::clone(&layout), self.config.animation(), now);
            self.shown = from.placed;
            self.tick(now);
        } else {
            self.animator.cancel();
            self.shown = layout.placed.clone();
        }
        self.layout = layout;
    }

    /// Advance the feed by one step and repack with animation.
    pub fn refresh(&mut self, now: Instant) {
        if let Some(delta) = self.feed.advance() {
            tracing::info!(
                "feed advanced: {} confirmed, {} admitted",
                delta.confirmed,
                delta.admitted
            );
        }
        self.last_refresh = Local::now();
        self.repack(true, now);
    }

    pub fn cycle_packer(&mut self, now: Instant) {
        self.packer = self.packer.next();
        self.status_message = Some(format!("Packer: {}", self.packer.label()));
        self.repack(true, now);
    }

    /// Frame clock.  Returns `true` when the picture changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.animator.tick(now) {
            Some(frame) => {
                self.shown = frame.placed;
                true
            }
            None => false,
        }
    }
}
