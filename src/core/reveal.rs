//! Scroll-reveal: mark blocks visible the first time they enter the viewport.

use std::collections::HashMap;
use std::time::Duration;

use super::dom::{Document, ElementId};
use super::observer::VisibilityObserver;
use super::timer::{Scheduler, TimerEvent, TimerHandle};

/// Opt-in marker for revealable elements.
pub const REVEAL_CLASS: &str = "reveal-on-scroll";
/// Marker applied once an element has been revealed.
pub const VISIBLE_CLASS: &str = "is-visible";
/// Block types that are revealable even without [`REVEAL_CLASS`].
pub const AUTO_REVEAL_CLASSES: &[&str] = &["grid-block", "video-block", "card-block", "block-image"];
/// Parents whose reveal targets are staggered.
pub const STAGGER_CONTAINER_CLASS: &str = "grid-block";
pub const STAGGER_ATTR: &str = "data-stagger";
/// Presentation delay per position inside a staggered collection.
pub const STAGGER_STEP: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct RevealTarget {
    pub element: ElementId,
    /// Position inside a grid-like collection, if any.
    pub stagger: Option<usize>,
    revealed: bool,
    pending: Option<TimerHandle>,
}

impl RevealTarget {
    pub fn revealed(&self) -> bool {
        self.revealed
    }

    pub fn delay(&self) -> Duration {
        STAGGER_STEP * self.stagger.unwrap_or(0) as u32
    }
}

#[derive(Debug, Default)]
pub struct RevealController {
    targets: Vec<RevealTarget>,
    by_element: HashMap<ElementId, usize>,
}

impl RevealController {
    /// Collect every revealable element in document order.  Auto-revealed
    /// block types receive [`REVEAL_CLASS`] so styling can key off one marker.
    pub fn discover(doc: &mut Document) -> Self {
        let elements: Vec<ElementId> = doc
            .document_order()
            .into_iter()
            .filter(|&id| {
                let el = doc.get(id);
                el.has_class(REVEAL_CLASS) || AUTO_REVEAL_CLASSES.iter().any(|c| el.has_class(c))
            })
            .collect();

        let mut per_parent: HashMap<ElementId, usize> = HashMap::new();
        let mut ctl = Self::default();
        for id in elements {
            doc.add_class(id, REVEAL_CLASS);
            let stagger = doc.get(id).parent.filter(|&p| is_stagger_container(doc, p)).map(|p| {
                let slot = per_parent.entry(p).or_insert(0);
                let index = *slot;
                *slot += 1;
                index
            });
            ctl.by_element.insert(id, ctl.targets.len());
            ctl.targets.push(RevealTarget {
                element: id,
                stagger,
                revealed: false,
                pending: None,
            });
        }
        tracing::debug!(count = ctl.targets.len(), "reveal: discovered targets");
        ctl
    }

    /// Register every unrevealed target with the observer.
    pub fn watch_all(&self, observer: &mut VisibilityObserver) {
        for t in self.targets.iter().filter(|t| !t.revealed) {
            observer.watch(t.element);
        }
    }

    /// Handle an "entered viewport" notification.
    pub fn on_entered(
        &mut self,
        doc: &mut Document,
        observer: &mut VisibilityObserver,
        scheduler: &mut dyn Scheduler,
        element: ElementId,
    ) {
        observer.unwatch(element);
        let Some(&idx) = self.by_element.get(&element) else {
            return;
        };
        let target = &mut self.targets[idx];
        if target.revealed {
            return;
        }
        target.revealed = true;

        let delay = target.delay();
        if delay.is_zero() {
            doc.add_class(element, VISIBLE_CLASS);
        } else {
            target.pending = Some(scheduler.after(delay, TimerEvent::RevealDue(element)));
        }
    }

    /// Apply the deferred marker for a staggered target.
    pub fn on_due(&mut self, doc: &mut Document, element: ElementId) {
        let Some(&idx) = self.by_element.get(&element) else {
            return;
        };
        let target = &mut self.targets[idx];
        if target.revealed && target.pending.take().is_some() {
            doc.add_class(element, VISIBLE_CLASS);
        }
    }

    pub fn targets(&self) -> &[RevealTarget] {
        &self.targets
    }

    /// Cancel outstanding stagger timers.
    pub fn cancel_pending(&mut self) {
        for t in &mut self.targets {
            if let Some(h) = t.pending.take() {
                h.cancel();
            }
        }
    }
}

fn is_stagger_container(doc: &Document, id: ElementId) -> bool {
    doc.has_class(id, STAGGER_CONTAINER_CLASS) || doc.attr(id, STAGGER_ATTR).is_some()
}
