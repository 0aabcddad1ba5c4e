//! In-memory element tree that mirrors the markup emitted by the template layer.
//!
//! The [`Element`] is the fundamental unit – it holds the tag, class list,
//! attributes and inline style of a single node and links to its children via
//! indices into an arena (the [`Document`] struct).  Controllers talk to the
//! presentation layer exclusively by toggling markers on these elements.

use std::collections::BTreeMap;

// ───────────────────────────────────────── geometry ──────────

/// Axis-aligned box in page coordinates (rows/columns for the terminal host).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Grow (or shrink, for negative values) every edge by `margin`.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    /// Overlapping region, or `None` when the boxes are disjoint.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right >= x && bottom >= y {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

// ───────────────────────────────────────── element ───────────

/// Index into [`Document::elements`].
pub type ElementId = usize;

/// A single node in the arena-allocated document.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    /// Class list in insertion order, no duplicates.
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    /// Inline style declarations (`display`, `transform`, …).
    pub style: BTreeMap<String, String>,
    pub text: Option<String>,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    /// Layout box, assigned by [`crate::core::layout`].  `None` = not rendered.
    pub rect: Option<Rect>,
    /// Fixed height hint from the manifest (rows).
    pub height_hint: Option<u16>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

// ───────────────────────────────────────── document ──────────

/// Arena-backed element tree.
///
/// Element 0 is always the `<body>`.  Nodes are never removed; the layer only
/// ever adds elements (the lightbox overlay) and toggles markers.
#[derive(Debug, Clone)]
pub struct Document {
    pub elements: Vec<Element>,
    pub title: String,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            elements: vec![Element::new("body")],
            title: title.into(),
        }
    }

    pub fn body(&self) -> ElementId {
        0
    }

    /// Allocate a detached element and return its id.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let id = self.elements.len();
        self.elements.push(Element::new(tag));
        id
    }

    /// Attach `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.elements[child].parent = Some(parent);
        self.elements[parent].children.push(child);
    }

    pub fn get(&self, id: ElementId) -> &Element {
        &self.elements[id]
    }

    pub fn get_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id]
    }

    // ── markers ──────────────────────────────────────────────────

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.elements[id].has_class(class)
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        let el = &mut self.elements[id];
        if !el.has_class(class) {
            el.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        self.elements[id].classes.retain(|c| c != class);
    }

    pub fn set_class(&mut self, id: ElementId, class: &str, on: bool) {
        if on {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements[id].attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        self.elements[id].attrs.insert(name.to_string(), value.into());
    }

    pub fn style(&self, id: ElementId, prop: &str) -> Option<&str> {
        self.elements[id].style.get(prop).map(String::as_str)
    }

    pub fn set_style(&mut self, id: ElementId, prop: &str, value: impl Into<String>) {
        self.elements[id].style.insert(prop.to_string(), value.into());
    }

    /// Remove an inline declaration, returning its previous value.
    pub fn remove_style(&mut self, id: ElementId, prop: &str) -> Option<String> {
        self.elements[id].style.remove(prop)
    }

    // ── queries ──────────────────────────────────────────────────

    /// Every attached element carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<ElementId> {
        self.descendants_by_class(self.body(), class)
    }

    /// Descendants of `root` (excluding `root`) carrying `class`, in document order.
    pub fn descendants_by_class(&self, root: ElementId, class: &str) -> Vec<ElementId> {
        let mut out = Vec::new();
        self.collect_descendants(root, &mut |id| self.elements[id].has_class(class), &mut out);
        out
    }

    /// First descendant of `root` carrying `class`.
    pub fn first_by_class(&self, root: ElementId, class: &str) -> Option<ElementId> {
        self.descendants_by_class(root, class).into_iter().next()
    }

    fn collect_descendants(
        &self,
        id: ElementId,
        pred: &mut dyn FnMut(ElementId) -> bool,
        out: &mut Vec<ElementId>,
    ) {
        for &child in &self.elements[id].children {
            if pred(child) {
                out.push(child);
            }
            self.collect_descendants(child, pred, out);
        }
    }

    /// Nearest ancestor of `id` (excluding `id`) carrying `class`.
    pub fn closest_ancestor(&self, id: ElementId, class: &str) -> Option<ElementId> {
        let mut cur = self.elements[id].parent;
        while let Some(p) = cur {
            if self.elements[p].has_class(class) {
                return Some(p);
            }
            cur = self.elements[p].parent;
        }
        None
    }

    /// Depth of `id` below the body (body = 0).
    pub fn depth(&self, id: ElementId) -> usize {
        let mut depth = 0;
        let mut cur = self.elements[id].parent;
        while let Some(p) = cur {
            depth += 1;
            cur = self.elements[p].parent;
        }
        depth
    }

    /// Flattened document order starting at the body.
    pub fn document_order(&self) -> Vec<ElementId> {
        let mut out = vec![self.body()];
        self.collect_descendants(self.body(), &mut |_| true, &mut out);
        out
    }
}
