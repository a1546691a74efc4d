//! A live, animated grid of tiles sized by weight.
//!
//! Run the binary to watch a synthetic mempool being packed and repacked.
//! Run with `--once` to pack a single snapshot and print it to stdout.

mod app;
mod ui;

use std::io::{self, stderr};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use tokio::time::MissedTickBehavior;

use tx_tiles::config::AppConfig;
use tx_tiles::core::{grid::Grid, layout::PackerKind, tile};
use tx_tiles::source::{self, ItemFeed, SyntheticFeed};

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::AppState,
};
use crate::ui::{layout::AppLayout, popup::HelpPopup, theme::Theme, tile_view::TileView};

/// Frame period while animating, about 30 fps.
const FRAME: Duration = Duration::from_millis(33);
/// How long the event reader waits for input before sending a tick.
const POLL: Duration = Duration::from_millis(100);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Animated tile packing viewer")]
struct Cli {
    /// Packing strategy: skyline, treemap or tetris.
    #[arg(long)]
    packer: Option<PackerKind>,

    /// Read items from a file instead of the synthetic feed.
    #[arg(long)]
    items: Option<PathBuf>,

    /// Seed for the synthetic feed and the tetris tie-break.
    #[arg(long)]
    seed: Option<u64>,

    /// Feed refresh period in milliseconds.
    #[arg(long = "refresh-ms")]
    refresh_ms: Option<u64>,

    /// Animation duration in milliseconds (0 disables animation).
    #[arg(long = "animation-ms")]
    animation_ms: Option<u64>,

    /// Pack once, print the layout and exit.
    #[arg(long)]
    once: bool,

    /// Grid columns for `--once`.
    #[arg(long, default_value_t = 64)]
    cols: u32,

    /// Grid rows for `--once`.
    #[arg(long, default_value_t = 32)]
    rows: u32,

    /// Write the effective configuration to the config file and exit.
    #[arg(long = "write-config")]
    write_config: bool,
}

impl Cli {
    /// Command-line values win over the config file.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(packer) = self.packer {
            config.packer = packer;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
            config.tetris.seed = seed;
        }
        if let Some(ms) = self.refresh_ms {
            config.refresh_ms = ms.clamp(250, 60_000);
        }
        if let Some(ms) = self.animation_ms {
            config.animation_ms = ms.min(5000);
        }
    }
}

// ───────────────────────────────────────── headless ──────────

/// Pack one snapshot on a `cols`×`rows` grid and print it.
fn print_once(config: &AppConfig, feed: &ItemFeed, cols: u32, rows: u32) -> Result<()> {
    let grid = Grid::with_dims(cols, rows);
    let tiles = tile::build(feed.items(), &grid, &config.scale);
    let layout = config.packer.pack(&config.packer_config(), &grid, &tiles);
    layout
        .check()
        .with_context(|| format!("{} produced a broken layout", config.packer))?;

    println!(
        "{} {}x{}: {} placed, {} rejected, fill {:.1}%",
        config.packer,
        layout.cols,
        layout.rows,
        layout.placed.len(),
        layout.rejected.len(),
        layout.fill_ratio() * 100.0,
    );
    for p in &layout.placed {
        println!("{}\t{}\t{}\t{}\t{}\t{}", p.id(), p.x, p.y, p.w, p.h, p.tile.priority);
    }
    for t in &layout.rejected {
        println!("{}\trejected\tside {}", t.id, t.side);
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ───────────

fn draw(frame: &mut ratatui::Frame, state: &mut AppState) {
    let layout = AppLayout::from_area(frame.area());

    let block = Block::default()
        .title(format!(" {} ", state.packer.label()))
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());
    state.resize(block.inner(layout.tiles_area));

    frame.render_widget(
        TileView::new(&state.grid, state.displayed()).block(block),
        layout.tiles_area,
    );

    let summary = format!(
        " {}/{} tiles | fill {:.0}% | {} | ",
        state.layout.placed.len(),
        state.layout.total(),
        state.layout.fill_ratio() * 100.0,
        state.last_refresh.format("%H:%M:%S"),
    );
    let hint = state.config.status_bar_hint();
    let mut spans = vec![Span::raw(summary)];
    if state.paused {
        spans.push(Span::styled("PAUSED ", Theme::paused_style()));
    }
    spans.push(Span::raw(state.status_message.as_deref().unwrap_or(&hint).to_string()));
    let status = Paragraph::new(Line::from(spans)).style(Theme::status_bar_style());
    frame.render_widget(status, layout.status_area);

    if state.show_help {
        frame.render_widget(
            HelpPopup {
                config: &state.config,
                packer: state.packer,
            },
            frame.area(),
        );
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load();
    cli.apply(&mut config);

    if cli.write_config {
        config.save()?;
        return Ok(());
    }

    let feed = match cli.items {
        Some(ref path) => ItemFeed::Static(source::load_items(path)?),
        None => ItemFeed::Synthetic(SyntheticFeed::new(config.seed, config.pool_size)),
    };

    // ── headless mode ─────────────────────────────────────────
    if cli.once {
        return print_once(&config, &feed, cli.cols, cli.rows);
    }

    let refresh_period = config.refresh_interval();
    let mut state = AppState::new(config, feed);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(stderr(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    // ── clocks ────────────────────────────────────────────────
    let mut events = spawn_event_reader(POLL);
    let mut frames = tokio::time::interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut refresh =
        tokio::time::interval_at(tokio::time::Instant::now() + refresh_period, refresh_period);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // ── event loop ────────────────────────────────────────────
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|frame| draw(frame, &mut state))?;
            dirty = false;
        }

        tokio::select! {
            biased;

            event = events.recv() => match event {
                Some(AppEvent::Key(k)) => {
                    handler::handle_key(&mut state, k, Instant::now());
                    dirty = true;
                }
                Some(AppEvent::Resize(_, _)) => dirty = true, // grid follows on draw
                Some(AppEvent::Tick) => {}
                None => state.should_quit = true,
            },

            _ = frames.tick(), if state.is_animating() => {
                dirty = state.tick(Instant::now());
            }

            _ = refresh.tick() => {
                if !state.paused {
                    state.refresh(Instant::now());
                    dirty = true;
                }
            }
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
