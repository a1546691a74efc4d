//! Tile pane widget.
//!
//! Maps each placed tile's device-pixel rectangle onto terminal cells: one
//! pixel per column, two pixels per row.  Rows use floor division on both
//! edges so neighbouring tiles never claim the same row.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Widget},
};

use tx_tiles::core::grid::Grid;
use tx_tiles::core::tile::PlacedTile;

use super::theme::Theme;

const SEPARATOR: Style = Style::new().fg(Color::Black);

pub struct TileView<'a> {
    grid: &'a Grid,
    tiles: &'a [PlacedTile],
    block: Option<Block<'a>>,
}

impl<'a> TileView<'a> {
    pub fn new(grid: &'a Grid, tiles: &'a [PlacedTile]) -> Self {
        Self {
            grid,
            tiles,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Terminal rectangle covered by `tile` inside `inner`, clipped.
    fn term_rect(&self, tile: &PlacedTile, inner: Rect) -> Option<Rect> {
        let px = self.grid.cell_rect(tile.x, tile.y, tile.w, tile.h);
        let col0 = i64::from(px.x);
        let col1 = col0 + i64::from(px.w);
        let row0 = i64::from(px.y).div_euclid(2);
        let row1 = (i64::from(px.y) + i64::from(px.h)).div_euclid(2);
        if col1 <= col0 || row1 <= row0 || col0 < 0 || row0 < 0 {
            return None;
        }
        let to_u16 = |v: i64| v.min(i64::from(u16::MAX)) as u16;
        let rect = Rect::new(
            inner.x.saturating_add(to_u16(col0)),
            inner.y.saturating_add(to_u16(row0)),
            to_u16(col1 - col0),
            to_u16(row1 - row0),
        );
        let clipped = rect.intersection(inner);
        (!clipped.is_empty()).then_some(clipped)
    }
}

impl<'a> Widget for TileView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block {
            Some(ref block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        for tile in self.tiles {
            let Some(rect) = self.term_rect(tile, inner) else {
                continue;
            };
            let priority = tile.tile.priority;
            buf.set_style(rect, Theme::tile_style(priority));

            // Thin right and bottom edges separate touching tiles.
            if rect.width >= 2 {
                for y in rect.top()..rect.bottom() {
                    if let Some(cell) = buf.cell_mut((rect.right() - 1, y)) {
                        cell.set_symbol("▕").set_style(SEPARATOR);
                    }
                }
            }
            if rect.height >= 2 {
                for x in rect.left()..rect.right().saturating_sub(1).max(rect.left() + 1) {
                    if let Some(cell) = buf.cell_mut((x, rect.bottom() - 1)) {
                        cell.set_symbol("▁").set_style(SEPARATOR);
                    }
                }
            }

            let label = priority_label(priority);
            let room = rect.width.saturating_sub(1) as usize;
            if room >= label.chars().count() {
                buf.set_stringn(rect.x, rect.y, &label, room, Theme::tile_label_style(priority));
            }
        }
    }
}

/// `"12"` for big numbers, `"3.5"` below ten.
fn priority_label(p: f64) -> String {
    if p < 10.0 {
        format!("{p:.1}")
    } else {
        format!("{p:.0}")
    }
}
