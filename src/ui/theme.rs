//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Fee-rate style buckets: lower bound of each bucket and its tile colour.
const PRIORITY_BUCKETS: &[(f64, Color)] = &[
    (100.0, Color::Rgb(174, 40, 120)),
    (50.0, Color::Rgb(200, 60, 60)),
    (20.0, Color::Rgb(214, 120, 40)),
    (10.0, Color::Rgb(200, 170, 40)),
    (5.0, Color::Rgb(110, 160, 60)),
    (2.0, Color::Rgb(40, 130, 110)),
    (0.0, Color::Rgb(50, 90, 140)),
];

/// Central theme — change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── tiles ──────────────────────────────────────────────────
    pub fn tile_color(priority: f64) -> Color {
        PRIORITY_BUCKETS
            .iter()
            .find(|(floor, _)| priority >= *floor)
            .map_or(Color::Rgb(50, 90, 140), |&(_, c)| c)
    }

    pub fn tile_style(priority: f64) -> Style {
        Style::default().bg(Self::tile_color(priority)).fg(Color::Black)
    }

    pub fn tile_label_style(priority: f64) -> Style {
        Self::tile_style(priority).add_modifier(Modifier::BOLD)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn paused_style() -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }
}
