//! Popup overlay listing the key bindings.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use tx_tiles::config::{Action, AppConfig};
use tx_tiles::core::layout::PackerKind;

/// Help popup: bindings for every action plus the active packer.
pub struct HelpPopup<'a> {
    pub config: &'a AppConfig,
    pub packer: PackerKind,
}

impl<'a> Widget for HelpPopup<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // actions + packer line + 3 blanks + hint + 2 border
        let height = (Action::ALL.len() as u16) + 7;
        let popup = centered_fixed(48, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Help ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(popup);
        block.render(popup, buf);

        let dim = Style::default().fg(Color::DarkGray);
        let label_style = Style::default().fg(Color::White);
        let key_style = Style::default().fg(Color::Yellow);

        let mut lines = vec![Line::raw("")];
        for &action in Action::ALL {
            // Fixed-width columns: label left-aligned, keys right-aligned.
            let label_col = format!("   {:<22}", action.label());
            let keys_width = (inner.width as usize).saturating_sub(label_col.len() + 1).max(1);
            let keys_col = format!("{:>keys_width$}", self.config.display_bindings(action));
            lines.push(Line::from(vec![
                Span::styled(label_col, label_style),
                Span::styled(keys_col, key_style),
            ]));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("   Packer: ", dim),
            Span::styled(self.packer.label(), label_style),
        ]));
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled("   Any other key closes", dim)));

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_fixed_clamps_to_area() {
        let area = Rect::new(10, 5, 30, 8);
        assert_eq!(centered_fixed(20, 4, area), Rect::new(15, 7, 20, 4));
        assert_eq!(centered_fixed(50, 20, area), area);
    }
}
