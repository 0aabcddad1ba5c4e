//! Lightbox overlay: the page's viewer drawn on top of the page pane.
//!
//! Everything shown comes from the overlay elements the viewer maintains
//! (image `src`, caption text); decoded pixels come from the host's cache.

use std::collections::HashMap;

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::app::images::ImageSlot;
use crate::core::dom::ElementId;
use crate::core::page::Page;

use super::theme::Theme;

pub struct LightboxWidget<'a> {
    pub page: &'a Page,
    pub images: &'a HashMap<String, ImageSlot>,
    /// Keyboard focus; highlights the matching overlay control.
    pub focus: Option<ElementId>,
}

/// Clickable regions returned after rendering, for mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightboxHitZones {
    /// Clicks outside this rect land on the backdrop.
    pub overlay_rect: Rect,
    pub close_rect: Rect,
    pub prev_rect: Rect,
    pub next_rect: Rect,
}

/// What a click at a terminal cell hits while the overlay is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxHit {
    Close,
    Prev,
    Next,
    Backdrop,
    /// Image or caption; not a control.
    Content,
}

impl LightboxHitZones {
    pub fn hit(&self, col: u16, row: u16) -> LightboxHit {
        let p = Position::new(col, row);
        if self.close_rect.contains(p) {
            LightboxHit::Close
        } else if self.prev_rect.contains(p) {
            LightboxHit::Prev
        } else if self.next_rect.contains(p) {
            LightboxHit::Next
        } else if self.overlay_rect.contains(p) {
            LightboxHit::Content
        } else {
            LightboxHit::Backdrop
        }
    }
}

impl<'a> LightboxWidget<'a> {
    /// Centred, 80% of the terminal.
    fn overlay_area(terminal: Rect) -> Rect {
        let margin_x = (terminal.width as f32 * 0.1).round() as u16;
        let margin_y = (terminal.height as f32 * 0.1).round() as u16;
        Rect::new(
            terminal.x + margin_x,
            terminal.y + margin_y,
            terminal.width.saturating_sub(margin_x * 2).max(20).min(terminal.width),
            terminal.height.saturating_sub(margin_y * 2).max(8).min(terminal.height),
        )
    }

    /// Render when the viewer is open.  Returns the hit zones, or `None` if
    /// nothing was drawn.
    pub fn render_and_hit(self, terminal_area: Rect, buf: &mut Buffer) -> Option<LightboxHitZones> {
        let overlay = self.page.viewer.overlay().copied()?;
        if !self.page.viewer.is_open() {
            return None;
        }
        let doc = &self.page.doc;
        let src = doc.attr(overlay.image, "src").unwrap_or_default();
        let caption = doc.get(overlay.caption).text.as_deref().unwrap_or_default();

        let area = Self::overlay_area(terminal_area);
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::lightbox_border_style())
            .title(Span::styled(format!(" {caption} "), Theme::lightbox_button_style()));
        let inner = block.inner(area);
        block.render(area, buf);

        let close_rect = Rect::new(area.x + area.width.saturating_sub(5), area.y, 3, 1);
        let styled = |id: ElementId, base: Style| {
            if self.focus == Some(id) {
                base.patch(Theme::focused_style())
            } else {
                base
            }
        };
        Paragraph::new(Line::from(Span::styled(
            "[X]",
            styled(overlay.close, Theme::lightbox_close_style()),
        )))
        .render(close_rect, buf);

        // The viewer wraps around, so both arrows are always live.
        let arrow_y = area.y + area.height / 2;
        let prev_rect = Rect::new(area.x, arrow_y, 3, 1);
        let next_rect = Rect::new(area.x + area.width.saturating_sub(3), arrow_y, 3, 1);
        Paragraph::new(Line::from(Span::styled(
            " ◀",
            styled(overlay.prev, Theme::lightbox_button_style()),
        )))
        .render(prev_rect, buf);
        Paragraph::new(Line::from(Span::styled(
            "▶ ",
            styled(overlay.next, Theme::lightbox_button_style()),
        )))
        .render(next_rect, buf);

        let img_area = Rect::new(
            inner.x.saturating_add(2),
            inner.y,
            inner.width.saturating_sub(4),
            inner.height.saturating_sub(1), // footer row
        );
        let message = match self.images.get(src) {
            Some(ImageSlot::Ready(img)) => {
                if img_area.width > 2 && img_area.height > 1 {
                    render_image_halfblocks(img, img_area, buf);
                }
                None
            }
            Some(ImageSlot::Failed(err)) => Some(format!("cannot show {src}: {err}")),
            Some(ImageSlot::Remote) => Some(src.to_string()),
            Some(ImageSlot::Loading) | None => Some("Loading…".to_string()),
        };
        if let Some(msg) = message {
            let width = (msg.chars().count() as u16).min(img_area.width);
            Paragraph::new(Line::from(Span::styled(msg, Theme::hint_style()))).render(
                Rect::new(
                    img_area.x + (img_area.width.saturating_sub(width)) / 2,
                    img_area.y + img_area.height / 2,
                    width,
                    1,
                ),
                buf,
            );
        }

        let footer_y = inner.y + inner.height.saturating_sub(1);
        Paragraph::new(Line::from(Span::styled(
            " ←/→ navigate   Esc close ",
            Theme::hint_style(),
        )))
        .render(Rect::new(inner.x, footer_y, inner.width, 1), buf);

        Some(LightboxHitZones {
            overlay_rect: area,
            close_rect,
            prev_rect,
            next_rect,
        })
    }
}

/// Draw `img` scaled to fit `area`, two pixels per cell using `▀`.
fn render_image_halfblocks(img: &image::RgbaImage, area: Rect, buf: &mut Buffer) {
    use image::imageops::FilterType;

    if area.width == 0 || area.height == 0 || img.width() == 0 || img.height() == 0 {
        return;
    }

    // Each column is 1 px wide, each row 2 px tall.
    let max_px_w = f64::from(area.width);
    let max_px_h = f64::from(area.height) * 2.0;
    let src_w = f64::from(img.width());
    let src_h = f64::from(img.height());

    let scale = (max_px_w / src_w).min(max_px_h / src_h).min(1.0);
    let fit_w = (src_w * scale).round().max(1.0) as u32;
    let fit_h = (src_h * scale).round().max(1.0) as u32;

    let rgba = image::imageops::resize(img, fit_w, fit_h, FilterType::Triangle);
    let (iw, ih) = (rgba.width(), rgba.height());
    let col_offset = area.width.saturating_sub(iw as u16) / 2;

    for row in 0..area.height {
        let yt = u32::from(row) * 2;
        let yb = yt + 1;
        if yt >= ih {
            break;
        }
        for col in 0..iw.min(u32::from(area.width)) {
            let t = rgba.get_pixel(col, yt);
            let fg = Color::Rgb(t[0], t[1], t[2]);
            let bg = if yb < ih {
                let b = rgba.get_pixel(col, yb);
                Color::Rgb(b[0], b[1], b[2])
            } else {
                Color::Reset
            };
            if let Some(cell) = buf.cell_mut(Position::new(area.x + col_offset + col as u16, area.y + row)) {
                cell.set_char('▀').set_fg(fg).set_bg(bg);
            }
        }
    }
}
