//! Full-screen image viewer shared by every gallery on the page.
//!
//! The viewer is a two-state machine.  All index arithmetic happens inside
//! [`ViewerState::Open`], where the gallery is known to be non-empty, so a
//! zero-length modulo can never be reached.  The overlay markup is built on
//! first open and reused for every later session.

use super::dom::{Document, ElementId};
use super::error::SetupError;

pub const GALLERY_CLASS: &str = "gallery-block";
pub const ITEM_CLASS: &str = "gallery-item";
pub const LIGHTBOX_ATTR: &str = "data-lightbox";

pub const OVERLAY_CLASS: &str = "lightbox";
pub const IMAGE_CLASS: &str = "lightbox-image";
pub const CAPTION_CLASS: &str = "lightbox-caption";
pub const CLOSE_CLASS: &str = "lightbox-close";
pub const PREV_CLASS: &str = "lightbox-prev";
pub const NEXT_CLASS: &str = "lightbox-next";
pub const ACTIVE_CLASS: &str = "active";

/// Index of a gallery within [`crate::core::page::Page`].
pub type GalleryId = usize;

// ───────────────────────────────────────── gallery ───────────

#[derive(Debug, Clone)]
pub struct Gallery {
    pub root: ElementId,
    pub lightbox: bool,
    /// Link elements, parallel to `images`.
    pub items: Vec<ElementId>,
    pub images: Vec<String>,
}

impl Gallery {
    pub fn from_element(doc: &Document, root: ElementId) -> Result<Self, SetupError> {
        let lightbox = doc.attr(root, LIGHTBOX_ATTR) == Some("True");
        let mut items = Vec::new();
        let mut images = Vec::new();
        for item in doc.descendants_by_class(root, ITEM_CLASS) {
            let Some(href) = doc.attr(item, "href").filter(|h| !h.trim().is_empty()) else {
                tracing::debug!(root, item, "gallery: item without href skipped");
                continue;
            };
            items.push(item);
            images.push(href.to_string());
        }
        if items.is_empty() {
            return Err(SetupError::MissingPart {
                widget: "gallery",
                root,
                part: ITEM_CLASS,
            });
        }
        Ok(Self {
            root,
            lightbox,
            items,
            images,
        })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

// ───────────────────────────────────────── overlay ───────────

/// The lazily created overlay markup.
#[derive(Debug, Clone, Copy)]
pub struct Overlay {
    pub root: ElementId,
    pub image: ElementId,
    pub caption: ElementId,
    pub close: ElementId,
    pub prev: ElementId,
    pub next: ElementId,
}

impl Overlay {
    fn build(doc: &mut Document) -> Self {
        let root = doc.create_element("div");
        doc.add_class(root, OVERLAY_CLASS);
        doc.set_style(root, "display", "none");
        doc.append_child(doc.body(), root);

        let mut child = |tag: &str, class: &str| {
            let id = doc.create_element(tag);
            doc.add_class(id, class);
            doc.append_child(root, id);
            id
        };
        let close = child("button", CLOSE_CLASS);
        let prev = child("button", PREV_CLASS);
        let image = child("img", IMAGE_CLASS);
        let next = child("button", NEXT_CLASS);
        let caption = child("div", CAPTION_CLASS);

        doc.get_mut(close).text = Some("×".into());
        doc.get_mut(prev).text = Some("‹".into());
        doc.get_mut(next).text = Some("›".into());
        tracing::debug!(root, "lightbox: overlay created");

        Self {
            root,
            image,
            caption,
            close,
            prev,
            next,
        }
    }
}

// ───────────────────────────────────────── scroll lock ───────

/// Background-scroll suppression, held while the viewer is open.
///
/// Acquisition records the body's previous `overflow`; release restores it.
#[derive(Debug)]
#[must_use = "release the lock to restore page scrolling"]
pub struct ScrollLock {
    body: ElementId,
    previous: Option<String>,
}

impl ScrollLock {
    fn acquire(doc: &mut Document) -> Self {
        let body = doc.body();
        let previous = doc.remove_style(body, "overflow");
        doc.set_style(body, "overflow", "hidden");
        Self { body, previous }
    }

    fn release(self, doc: &mut Document) {
        match self.previous {
            Some(v) => doc.set_style(self.body, "overflow", v),
            None => {
                doc.remove_style(self.body, "overflow");
            }
        }
    }
}

// ───────────────────────────────────────── viewer ────────────

#[derive(Debug, Default)]
pub enum ViewerState {
    #[default]
    Closed,
    Open {
        gallery: GalleryId,
        index: usize,
        /// Length of the source gallery; always > 0.
        len: usize,
        lock: ScrollLock,
    },
}

/// Keys the viewer understands.  Anything else maps to [`Key::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

/// The viewer session.  One per page, owned by the page.
#[derive(Debug, Default)]
pub struct Viewer {
    state: ViewerState,
    overlay: Option<Overlay>,
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ViewerState::Open { .. })
    }

    /// `(gallery, index)` of the image on screen.
    pub fn current(&self) -> Option<(GalleryId, usize)> {
        match self.state {
            ViewerState::Open { gallery, index, .. } => Some((gallery, index)),
            ViewerState::Closed => None,
        }
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Show image `index` of `galleries[gallery]`.  Ignored for galleries
    /// without lightbox support and for empty galleries.  Re-opening while
    /// open switches image and keeps the existing scroll lock.
    ///
    /// Returns `true` when the viewer is open afterwards on the requested gallery.
    pub fn open(
        &mut self,
        doc: &mut Document,
        galleries: &[Gallery],
        gallery: GalleryId,
        index: usize,
    ) -> bool {
        let Some(g) = galleries.get(gallery).filter(|g| g.lightbox && !g.is_empty()) else {
            return false;
        };
        let (len, root) = (g.len(), g.root);
        let overlay = *self.overlay.get_or_insert_with(|| Overlay::build(doc));

        let lock = match std::mem::take(&mut self.state) {
            ViewerState::Open { lock, .. } => lock,
            ViewerState::Closed => ScrollLock::acquire(doc),
        };
        self.state = ViewerState::Open {
            gallery,
            index: index % len,
            len,
            lock,
        };

        doc.add_class(overlay.root, ACTIVE_CLASS);
        doc.set_style(overlay.root, "display", "flex");
        self.render(doc, galleries);
        tracing::debug!(gallery, root, index, "lightbox: opened");
        true
    }

    /// Hide the overlay and release the scroll lock.  No-op when closed.
    pub fn close(&mut self, doc: &mut Document) {
        if let ViewerState::Open { lock, .. } = std::mem::take(&mut self.state) {
            lock.release(doc);
            tracing::debug!("lightbox: closed");
        }
        if let Some(overlay) = self.overlay {
            doc.remove_class(overlay.root, ACTIVE_CLASS);
            doc.set_style(overlay.root, "display", "none");
        }
    }

    pub fn next(&mut self, doc: &mut Document, galleries: &[Gallery]) {
        self.step(doc, galleries, 1);
    }

    pub fn prev(&mut self, doc: &mut Document, galleries: &[Gallery]) {
        self.step(doc, galleries, -1);
    }

    fn step(&mut self, doc: &mut Document, galleries: &[Gallery], delta: isize) {
        let ViewerState::Open { index, len, .. } = &mut self.state else {
            return;
        };
        if *len == 0 {
            return;
        }
        *index = if delta >= 0 {
            (*index + 1) % *len
        } else {
            (*index + *len - 1) % *len
        };
        self.render(doc, galleries);
    }

    /// Keyboard bindings, live only while open.  Returns `true` when handled.
    pub fn handle_key(&mut self, doc: &mut Document, galleries: &[Gallery], key: Key) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            Key::Escape => self.close(doc),
            Key::ArrowLeft => self.prev(doc, galleries),
            Key::ArrowRight => self.next(doc, galleries),
            Key::Other => return false,
        }
        true
    }

    fn render(&self, doc: &mut Document, galleries: &[Gallery]) {
        let (Some(overlay), ViewerState::Open { gallery, index, len, .. }) = (self.overlay, &self.state)
        else {
            return;
        };
        let Some(url) = galleries.get(*gallery).and_then(|g| g.images.get(*index)) else {
            return;
        };
        doc.set_attr(overlay.image, "src", url.clone());
        doc.get_mut(overlay.caption).text = Some(format!("{} / {}", index + 1, len));
    }
}
