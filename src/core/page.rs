//! The page: document plus every wired widget instance.
//!
//! [`Page::init`] is the single "ready" pass.  It discovers every widget,
//! builds a binding table from interactive elements straight to their
//! widget, and starts the observer and carousel timers.  Afterwards each
//! input is routed through that table; nothing re-walks the tree per event.

use std::collections::HashMap;

use serde::Serialize;

use super::accordion::{self, AccordionGroup};
use super::carousel::{self, Carousel, CarouselState};
use super::dom::{Document, ElementId, Rect};
use super::error::SetupError;
use super::layout;
use super::lightbox::{self, Gallery, GalleryId, Key, Viewer};
use super::observer::VisibilityObserver;
use super::parallax::{self, Parallax};
use super::reveal::RevealController;
use super::tabs::{self, TabGroup};
use super::timer::{CarouselId, Scheduler, TimerEvent};

/// What an interactive element does when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    AccordionHeader { group: usize, panel: usize },
    TabTrigger { group: usize, tab: usize },
    GalleryItem { gallery: GalleryId, index: usize },
    CarouselPrev(CarouselId),
    CarouselNext(CarouselId),
    ViewerClose,
    ViewerPrev,
    ViewerNext,
    /// Click on the overlay outside the image and controls.
    ViewerBackdrop,
}

/// Result of a click, for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Handled,
    /// Default link navigation (gallery without lightbox).
    Navigate(String),
    /// Element has no binding.
    Ignored,
}

/// Widget instance counts, for logging and the status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WidgetSummary {
    pub reveal: usize,
    pub accordions: usize,
    pub tabs: usize,
    pub galleries: usize,
    pub carousels: usize,
    pub parallax: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct Page {
    pub doc: Document,
    pub observer: VisibilityObserver,
    pub reveal: RevealController,
    pub accordions: Vec<AccordionGroup>,
    pub tabs: Vec<TabGroup>,
    pub galleries: Vec<Gallery>,
    pub viewer: Viewer,
    pub carousels: Vec<Carousel>,
    pub parallax: Vec<Parallax>,
    bindings: HashMap<ElementId, Binding>,
    skipped: usize,
    width: u16,
    viewport: Rect,
    scroll: f64,
    height: f64,
}

impl Page {
    /// Discover and wire every widget in `doc`, lay the page out at `width`
    /// columns with a viewport `rows` tall, and run the first visibility pass.
    pub fn init(doc: Document, width: u16, rows: u16, scheduler: &mut dyn Scheduler) -> Self {
        let mut page = Self {
            doc,
            observer: VisibilityObserver::default(),
            reveal: RevealController::default(),
            accordions: Vec::new(),
            tabs: Vec::new(),
            galleries: Vec::new(),
            viewer: Viewer::new(),
            carousels: Vec::new(),
            parallax: Vec::new(),
            bindings: HashMap::new(),
            skipped: 0,
            width,
            viewport: Rect::new(0.0, 0.0, f64::from(width), f64::from(rows)),
            scroll: 0.0,
            height: 0.0,
        };

        page.reveal = RevealController::discover(&mut page.doc);
        page.reveal.watch_all(&mut page.observer);

        for root in page.doc.find_by_class(accordion::ROOT_CLASS) {
            let wired = AccordionGroup::from_element(&mut page.doc, root);
            if let Some(group) = page.wire(wired) {
                let gid = page.accordions.len();
                for (panel, p) in group.panels().iter().enumerate() {
                    page.bindings
                        .insert(p.header, Binding::AccordionHeader { group: gid, panel });
                }
                page.accordions.push(group);
            }
        }

        for root in page.doc.find_by_class(tabs::ROOT_CLASS) {
            let wired = TabGroup::from_element(&mut page.doc, root);
            if let Some(group) = page.wire(wired) {
                let gid = page.tabs.len();
                for (tab, t) in group.tabs().iter().enumerate() {
                    page.bindings
                        .insert(t.trigger, Binding::TabTrigger { group: gid, tab });
                }
                page.tabs.push(group);
            }
        }

        for root in page.doc.find_by_class(lightbox::GALLERY_CLASS) {
            let wired = Gallery::from_element(&page.doc, root);
            if let Some(gallery) = page.wire(wired) {
                let gid = page.galleries.len();
                for (index, &item) in gallery.items.iter().enumerate() {
                    page.bindings
                        .insert(item, Binding::GalleryItem { gallery: gid, index });
                }
                page.galleries.push(gallery);
            }
        }

        for root in page.doc.find_by_class(carousel::ROOT_CLASS) {
            let wired = Carousel::from_element(&mut page.doc, root);
            if let Some(mut c) = page.wire(wired) {
                let cid = page.carousels.len();
                if let Some(prev) = c.prev_control {
                    page.bindings.insert(prev, Binding::CarouselPrev(cid));
                }
                if let Some(next) = c.next_control {
                    page.bindings.insert(next, Binding::CarouselNext(cid));
                }
                c.start(cid, scheduler);
                page.carousels.push(c);
            }
        }

        for root in page.doc.find_by_class(parallax::ROOT_CLASS) {
            let wired = Parallax::from_element(&page.doc, root);
            if let Some(p) = page.wire(wired) {
                tracing::debug!(root = p.root, layers = p.layers.len(), "parallax: wired");
                p.apply(&mut page.doc, 0.0);
                page.parallax.push(p);
            }
        }

        let summary = page.summary();
        tracing::info!(?summary, "page ready");
        page.refresh(scheduler);
        page
    }

    /// Keep a wired widget, or log why it was skipped.
    fn wire<T>(&mut self, result: Result<T, SetupError>) -> Option<T> {
        match result {
            Ok(widget) => Some(widget),
            Err(err) => {
                tracing::warn!(%err, "widget skipped");
                self.skipped += 1;
                None
            }
        }
    }

    pub fn summary(&self) -> WidgetSummary {
        WidgetSummary {
            reveal: self.reveal.targets().len(),
            accordions: self.accordions.len(),
            tabs: self.tabs.len(),
            galleries: self.galleries.len(),
            carousels: self.carousels.len(),
            parallax: self.parallax.len(),
            skipped: self.skipped,
        }
    }

    // ── geometry ─────────────────────────────────────────────────

    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Total laid-out height of the page.
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn max_scroll(&self) -> f64 {
        (self.height - self.viewport.height).max(0.0)
    }

    /// Re-run layout and deliver "entered" notifications to the reveal
    /// controller.  Called after every state change.
    pub fn refresh(&mut self, scheduler: &mut dyn Scheduler) {
        self.height = layout::layout(&mut self.doc, self.width);
        let doc = &self.doc;
        let entered = self.observer.check(self.viewport, |id| doc.get(id).rect);
        for element in entered {
            self.reveal
                .on_entered(&mut self.doc, &mut self.observer, scheduler, element);
        }
    }

    /// Scroll notification.  Ignored while the viewer holds the scroll lock.
    pub fn scroll_to(&mut self, y: f64, scheduler: &mut dyn Scheduler) {
        if self.viewer.is_open() {
            return;
        }
        self.scroll = y.clamp(0.0, self.max_scroll());
        self.viewport.y = self.scroll;
        for p in &self.parallax {
            p.apply(&mut self.doc, self.scroll);
        }
        self.refresh(scheduler);
    }

    pub fn scroll_by(&mut self, delta: f64, scheduler: &mut dyn Scheduler) {
        self.scroll_to(self.scroll + delta, scheduler);
    }

    /// Viewport size changed.
    pub fn resize(&mut self, width: u16, rows: u16, scheduler: &mut dyn Scheduler) {
        self.width = width;
        self.viewport.width = f64::from(width);
        self.viewport.height = f64::from(rows);
        self.refresh(scheduler);
        let clamped = self.scroll.min(self.max_scroll());
        if clamped != self.scroll {
            self.scroll_to(clamped, scheduler);
        }
    }

    // ── input ────────────────────────────────────────────────────

    pub fn binding(&self, element: ElementId) -> Option<Binding> {
        self.bindings.get(&element).copied()
    }

    /// Bound elements currently rendered, in document order.
    pub fn interactive_elements(&self) -> Vec<ElementId> {
        let viewer_open = self.viewer.is_open();
        self.doc
            .document_order()
            .into_iter()
            .filter(|id| match self.bindings.get(id) {
                None | Some(Binding::ViewerBackdrop) => false,
                Some(Binding::ViewerClose | Binding::ViewerPrev | Binding::ViewerNext) => viewer_open,
                Some(_) => !viewer_open && self.doc.get(*id).rect.is_some(),
            })
            .collect()
    }

    /// Route a click on `element` to its widget.
    pub fn click(&mut self, element: ElementId, scheduler: &mut dyn Scheduler) -> ClickOutcome {
        let Some(binding) = self.binding(element) else {
            return ClickOutcome::Ignored;
        };
        let outcome = match binding {
            Binding::AccordionHeader { group, panel } => {
                self.accordions[group].toggle(&mut self.doc, panel);
                ClickOutcome::Handled
            }
            Binding::TabTrigger { group, tab } => {
                self.tabs[group].activate(&mut self.doc, tab);
                ClickOutcome::Handled
            }
            Binding::GalleryItem { gallery, index } => self.open_viewer(gallery, index),
            Binding::CarouselPrev(id) => {
                self.carousels[id].prev(&mut self.doc);
                ClickOutcome::Handled
            }
            Binding::CarouselNext(id) => {
                self.carousels[id].next(&mut self.doc);
                ClickOutcome::Handled
            }
            Binding::ViewerClose | Binding::ViewerBackdrop => {
                self.viewer.close(&mut self.doc);
                ClickOutcome::Handled
            }
            Binding::ViewerPrev => {
                self.viewer.prev(&mut self.doc, &self.galleries);
                ClickOutcome::Handled
            }
            Binding::ViewerNext => {
                self.viewer.next(&mut self.doc, &self.galleries);
                ClickOutcome::Handled
            }
        };
        self.refresh(scheduler);
        outcome
    }

    fn open_viewer(&mut self, gallery: GalleryId, index: usize) -> ClickOutcome {
        let Some(g) = self.galleries.get(gallery) else {
            return ClickOutcome::Ignored;
        };
        if !g.lightbox {
            return match g.images.get(index) {
                Some(href) => ClickOutcome::Navigate(href.clone()),
                None => ClickOutcome::Ignored,
            };
        }
        let first_open = self.viewer.overlay().is_none();
        self.viewer.open(&mut self.doc, &self.galleries, gallery, index);
        if first_open {
            if let Some(o) = self.viewer.overlay().copied() {
                self.bindings.insert(o.root, Binding::ViewerBackdrop);
                self.bindings.insert(o.close, Binding::ViewerClose);
                self.bindings.insert(o.prev, Binding::ViewerPrev);
                self.bindings.insert(o.next, Binding::ViewerNext);
            }
        }
        ClickOutcome::Handled
    }

    /// Keyboard input.  Only the viewer listens, and only while open.
    pub fn key(&mut self, key: Key, scheduler: &mut dyn Scheduler) -> bool {
        let handled = self.viewer.handle_key(&mut self.doc, &self.galleries, key);
        if handled {
            self.refresh(scheduler);
        }
        handled
    }

    /// Deliver a fired timer.
    pub fn on_timer(&mut self, event: TimerEvent, scheduler: &mut dyn Scheduler) {
        match event {
            TimerEvent::CarouselTick(id) => {
                // A tick may already be queued when the timer is stopped.
                if let Some(c) = self
                    .carousels
                    .get_mut(id)
                    .filter(|c| c.state() == CarouselState::Playing)
                {
                    c.next(&mut self.doc);
                }
            }
            TimerEvent::RevealDue(element) => self.reveal.on_due(&mut self.doc, element),
        }
        self.refresh(scheduler);
    }

    /// Stop every timer and release the viewer.  The page stays readable.
    pub fn teardown(&mut self) {
        for c in &mut self.carousels {
            c.stop();
        }
        self.reveal.cancel_pending();
        self.viewer.close(&mut self.doc);
        self.observer.disconnect();
        tracing::debug!("page torn down");
    }
}
