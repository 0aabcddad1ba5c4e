//! Ratatui widget that paints the laid-out page inside the viewport.
//!
//! Geometry comes straight from [`crate::core::layout`]; this widget only
//! decides what each box looks like given its markers.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::core::dom::{Document, ElementId};
use crate::core::page::{Binding, Page};
use crate::core::{accordion, reveal, tabs};

use super::theme::Theme;

pub struct PageWidget<'a> {
    page: &'a Page,
    focus: Option<ElementId>,
    block: Option<Block<'a>>,
}

impl<'a> PageWidget<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self {
            page,
            focus: None,
            block: None,
        }
    }

    pub fn focus(mut self, focus: Option<ElementId>) -> Self {
        self.focus = focus;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Prefix glyph for bound controls; reflects their current markers.
    fn control_prefix(&self, id: ElementId) -> Option<(&'static str, bool)> {
        let doc = &self.page.doc;
        match self.page.binding(id)? {
            Binding::AccordionHeader { .. } => {
                let open = doc.attr(id, accordion::EXPANDED_ATTR) == Some("true");
                Some((if open { "▼ " } else { "▶ " }, open))
            }
            Binding::TabTrigger { .. } => {
                let active = doc.has_class(id, tabs::ACTIVE_CLASS);
                Some((if active { "● " } else { "○ " }, active))
            }
            Binding::GalleryItem { .. } => Some(("▣ ", false)),
            Binding::CarouselPrev(_) | Binding::CarouselNext(_) => Some(("", false)),
            _ => None,
        }
    }

    fn style_for(&self, id: ElementId) -> Style {
        let doc = &self.page.doc;
        if self.focus == Some(id) {
            return Theme::focused_style();
        }
        if unrevealed(doc, id) {
            return Theme::unrevealed_style();
        }
        if let Some((_, on)) = self.control_prefix(id) {
            return if on {
                Theme::active_control_style()
            } else {
                Theme::control_style()
            };
        }
        match doc.get(id).tag.as_str() {
            "h1" | "h2" | "h3" => Theme::heading_style(),
            "img" => Theme::placeholder_style(),
            _ => Theme::text_style(),
        }
    }

    /// Lines drawn for `id`'s own content, before any children.
    fn content(&self, id: ElementId, width: f64) -> Vec<String> {
        let el = self.page.doc.get(id);
        match el.text.as_deref() {
            Some(text) => wrap(text, width),
            None if el.tag == "img" && el.children.is_empty() => {
                let src = el
                    .attrs
                    .get("alt")
                    .or_else(|| el.attrs.get("src"))
                    .map_or("image", String::as_str);
                vec![format!("[{src}]")]
            }
            None => Vec::new(),
        }
    }
}

/// The element, or an ancestor, is a reveal target still waiting for
/// its visible marker.
fn unrevealed(doc: &Document, id: ElementId) -> bool {
    let mut cur = Some(id);
    while let Some(el) = cur {
        if doc.has_class(el, reveal::REVEAL_CLASS) && !doc.has_class(el, reveal::VISIBLE_CLASS) {
            return true;
        }
        cur = doc.get(el).parent;
    }
    false
}

/// Hard-wrap `text` at `width` columns; row count matches the layout pass.
pub fn wrap(text: &str, width: f64) -> Vec<String> {
    let cols = width.max(1.0) as usize;
    let mut rows = Vec::new();
    for line in text.lines() {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            rows.push(String::new());
            continue;
        }
        rows.extend(chars.chunks(cols).map(|c| c.iter().collect::<String>()));
    }
    rows
}

impl<'a> Widget for PageWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let doc = &self.page.doc;
        let scroll = self.page.scroll();

        for id in doc.document_order().into_iter().skip(1) {
            let Some(rect) = doc.get(id).rect else {
                continue;
            };
            let lines = self.content(id, rect.width);
            if lines.is_empty() {
                continue;
            }

            let style = self.style_for(id);
            let prefix = self.control_prefix(id).map_or("", |(p, _)| p);
            let top = (rect.y - scroll).round() as i64;
            let x = inner.x.saturating_add(rect.x as u16);
            let max_width = inner.right().saturating_sub(x);
            if max_width == 0 {
                continue;
            }

            for (i, text) in lines.into_iter().enumerate() {
                let row = top + i as i64;
                if row < 0 || row >= i64::from(inner.height) {
                    continue;
                }
                let lead = if i == 0 { prefix } else { "" };
                let line = Line::from(vec![Span::styled(lead, style), Span::styled(text, style)]);
                buf.set_line(x, inner.y + row as u16, &line, max_width);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout;
    use crate::core::manifest;
    use crate::core::timer::ManualScheduler;

    #[test]
    fn wrap_agrees_with_layout_rows() {
        for (text, width) in [("abcdefghij", 4.0), ("ab\n\ncd", 10.0), ("", 5.0), ("xyz", 3.0)] {
            assert_eq!(wrap(text, width).len() as f64, layout::text_rows(text, width), "{text:?}");
        }
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn draws_accordion_state_and_hides_collapsed_bodies() {
        let doc = manifest::parse(
            r#"{ "body": [ { "class": "accordion-block", "children": [
                { "class": "accordion-item", "children": [
                    { "class": "accordion-header", "text": "Shipping" },
                    { "class": "accordion-body", "text": "Two days" } ] } ] } ] }"#,
        )
        .unwrap();
        let mut sched = ManualScheduler::new();
        let mut page = Page::init(doc, 30, 5, &mut sched);

        let area = Rect::new(0, 0, 30, 5);
        let mut buf = Buffer::empty(area);
        PageWidget::new(&page).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("▶ Shipping"));
        assert!(!text.contains("Two days"));

        let header = page.accordions[0].panels()[0].header;
        page.click(header, &mut sched);
        let mut buf = Buffer::empty(area);
        PageWidget::new(&page).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("▼ Shipping"));
        assert!(text.contains("Two days"));
    }

    #[test]
    fn scrolled_content_moves_up() {
        let doc = manifest::parse(
            r#"{ "body": [ { "tag": "p", "text": "first" }, { "tag": "p", "text": "second" },
                           { "tag": "p", "height": 10, "text": "tall" } ] }"#,
        )
        .unwrap();
        let mut sched = ManualScheduler::new();
        let mut page = Page::init(doc, 20, 3, &mut sched);
        page.scroll_by(1.0, &mut sched);

        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        PageWidget::new(&page).render(area, &mut buf);
        let first_row: String = (0..20).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(first_row.contains("second"));
    }
}
