//! Read-only controls popup: host key bindings plus the fixed lightbox keys.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::config::{Action, AppConfig};
use crate::core::page::WidgetSummary;

/// Lightbox keys belong to the page, not the config file.
const LIGHTBOX_KEYS: &[(&str, &str)] = &[
    ("Close Lightbox", "Esc"),
    ("Previous Image", "←"),
    ("Next Image", "→"),
];

pub struct ControlsPopup<'a> {
    pub config: &'a AppConfig,
    pub summary: WidgetSummary,
}

impl<'a> ControlsPopup<'a> {
    fn row(label: &str, keys: &str, width: u16) -> Line<'static> {
        let label_col = format!("   {label:<22}");
        let keys_width = (width as usize).saturating_sub(label_col.chars().count()).max(1);
        Line::from(vec![
            Span::styled(label_col, Style::default().fg(Color::White)),
            Span::styled(format!("{keys:>keys_width$} "), Style::default().fg(Color::Yellow)),
        ])
    }
}

impl<'a> Widget for ControlsPopup<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (Action::ALL.len() + LIGHTBOX_KEYS.len()) as u16 + 9;
        let popup = centered_fixed(52, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Controls ")
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
        let mut lines = vec![Line::raw("")];

        for &action in Action::ALL {
            lines.push(Self::row(action.label(), &self.config.display_bindings(action), inner.width));
        }
        lines.push(Line::raw(""));
        for (label, keys) in LIGHTBOX_KEYS {
            lines.push(Self::row(label, keys, inner.width));
        }

        let s = self.summary;
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!(
                "  {} reveal · {} accordion · {} tabs · {} gallery",
                s.reveal, s.accordions, s.tabs, s.galleries
            ),
            dim,
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "  {} carousel · {} parallax · {} skipped",
                s.carousels, s.parallax, s.skipped
            ),
            dim,
        )));
        lines.push(Line::from(Span::styled("  Any key: close", dim)));

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Centered rectangle with fixed dimensions, clamped to the available area.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
