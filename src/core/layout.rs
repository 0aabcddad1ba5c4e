//! Minimal block flow so the observer has geometry to test.
//!
//! Elements stack top to bottom; children are indented two columns under
//! their parent's own text.  Hidden elements take no space and get no rect.
//! Inline `transform: translateY(..)` shifts an element's box (and its
//! subtree) without affecting flow.

use super::dom::{Document, ElementId, Rect};
use super::{accordion, lightbox, parallax, tabs};

/// Default height of an image without a height hint.
pub const IMAGE_ROWS: u16 = 6;
const INDENT: f64 = 2.0;

/// Is `id` hidden by its markers?
pub fn is_hidden(doc: &Document, id: ElementId) -> bool {
    let el = doc.get(id);
    if el.style.get("display").map(String::as_str) == Some("none") {
        return true;
    }
    if el.has_class(lightbox::OVERLAY_CLASS) {
        return true;
    }
    if el.has_class(tabs::PANEL_CLASS) && !el.has_class(tabs::ACTIVE_CLASS) {
        return true;
    }
    if el.has_class(accordion::BODY_CLASS) {
        if let Some(item) = doc.closest_ancestor(id, accordion::ITEM_CLASS) {
            return !doc.has_class(item, accordion::EXPANDED_CLASS);
        }
    }
    false
}

/// Rows needed for `text` at `width` columns.
pub fn text_rows(text: &str, width: f64) -> f64 {
    let cols = width.max(1.0) as usize;
    text.lines()
        .map(|line| line.chars().count().max(1).div_ceil(cols))
        .sum::<usize>() as f64
}

/// Lay the whole document out at `width` columns.  Returns the page height.
pub fn layout(doc: &mut Document, width: u16) -> f64 {
    for el in &mut doc.elements {
        el.rect = None;
    }
    let body = doc.body();
    place(doc, body, 0.0, 0.0, f64::from(width.max(1)), 0.0)
}

fn place(doc: &mut Document, id: ElementId, x: f64, y: f64, width: f64, shift: f64) -> f64 {
    if id != doc.body() && is_hidden(doc, id) {
        return 0.0;
    }

    let shift = shift
        + doc
            .style(id, "transform")
            .and_then(parallax::parse_translate_y)
            .unwrap_or(0.0);

    let el = doc.get(id);
    let mut own = el.text.as_deref().map_or(0.0, |t| text_rows(t, width));
    if el.tag == "img" && el.children.is_empty() {
        own = own.max(f64::from(IMAGE_ROWS));
    }
    if let Some(hint) = el.height_hint {
        own = own.max(f64::from(hint));
    }

    let children = el.children.clone();
    let child_width = (width - INDENT).max(1.0);
    let mut cursor = y + own;
    for child in children {
        cursor += place(doc, child, x + INDENT, cursor, child_width, shift);
    }

    let height = cursor - y;
    doc.get_mut(id).rect = Some(Rect::new(x, y + shift, width, height));
    height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacks_blocks_and_skips_hidden() {
        let mut doc = Document::new("t");
        let a = doc.create_element("p");
        doc.get_mut(a).text = Some("hello".into());
        doc.append_child(doc.body(), a);
        let hidden = doc.create_element("p");
        doc.get_mut(hidden).text = Some("gone".into());
        doc.set_style(hidden, "display", "none");
        doc.append_child(doc.body(), hidden);
        let img = doc.create_element("img");
        doc.append_child(doc.body(), img);

        let total = layout(&mut doc, 40);
        assert_eq!(total, 7.0);
        assert_eq!(doc.get(a).rect, Some(Rect::new(2.0, 0.0, 38.0, 1.0)));
        assert_eq!(doc.get(hidden).rect, None);
        assert_eq!(doc.get(img).rect.unwrap().y, 1.0);
    }

    #[test]
    fn wraps_long_text() {
        assert_eq!(text_rows("abcdefghij", 4.0), 3.0);
        assert_eq!(text_rows("ab\ncd", 10.0), 2.0);
    }

    #[test]
    fn translate_shifts_box_not_flow() {
        let mut doc = Document::new("t");
        let layer = doc.create_element("div");
        doc.get_mut(layer).text = Some("layer".into());
        doc.set_style(layer, "transform", "translateY(-3.00px)");
        doc.append_child(doc.body(), layer);
        let after = doc.create_element("p");
        doc.get_mut(after).text = Some("after".into());
        doc.append_child(doc.body(), after);

        layout(&mut doc, 20);
        assert_eq!(doc.get(layer).rect.unwrap().y, -3.0);
        assert_eq!(doc.get(after).rect.unwrap().y, 1.0);
    }

    #[test]
    fn collapsed_accordion_body_takes_no_space() {
        let mut doc = Document::new("t");
        let item = doc.create_element("div");
        doc.add_class(item, accordion::ITEM_CLASS);
        doc.append_child(doc.body(), item);
        let body = doc.create_element("div");
        doc.add_class(body, accordion::BODY_CLASS);
        doc.get_mut(body).text = Some("details".into());
        doc.append_child(item, body);

        layout(&mut doc, 20);
        assert!(doc.get(body).rect.is_none());
        doc.add_class(item, accordion::EXPANDED_CLASS);
        layout(&mut doc, 20);
        assert!(doc.get(body).rect.is_some());
    }
}
