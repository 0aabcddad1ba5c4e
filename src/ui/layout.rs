//! Layout helpers: split the terminal into the page pane and status bar.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};

pub struct AppLayout {
    /// Bordered pane holding the page.
    pub page_area: Rect,
    /// Inside the pane border; this is the page viewport.
    pub viewport: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // page pane
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let page_area = chunks[0];
        Self {
            page_area,
            viewport: Block::default().borders(Borders::ALL).inner(page_area),
            status_area: chunks[1],
        }
    }

    /// Viewport size in columns and rows for a terminal of `cols` × `rows`.
    pub fn viewport_size(cols: u16, rows: u16) -> (u16, u16) {
        let vp = Self::from_area(Rect::new(0, 0, cols, rows)).viewport;
        (vp.width.max(1), vp.height.max(1))
    }
}
