//! One-shot viewport visibility notifications.
//!
//! Elements are registered with [`VisibilityObserver::watch`] and reported by
//! [`VisibilityObserver::check`] the first time at least [`THRESHOLD`] of
//! their area lies inside the viewport.  A reported element is unregistered
//! immediately and can never fire again.

use std::collections::HashSet;

use super::dom::{ElementId, Rect};

/// Fraction of the element's area that must be inside the viewport.
pub const THRESHOLD: f64 = 0.1;
/// Expansion applied to every edge of the viewport before testing.
pub const ROOT_MARGIN: f64 = 0.0;

#[derive(Debug, Clone)]
pub struct VisibilityObserver {
    threshold: f64,
    root_margin: f64,
    /// Registered elements, in registration order.
    watched: Vec<ElementId>,
    /// Elements that already fired; re-registration is ignored.
    fired: HashSet<ElementId>,
}

impl Default for VisibilityObserver {
    fn default() -> Self {
        Self::new(THRESHOLD, ROOT_MARGIN)
    }
}

impl VisibilityObserver {
    pub fn new(threshold: f64, root_margin: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            root_margin,
            watched: Vec::new(),
            fired: HashSet::new(),
        }
    }

    /// Register `target`.  No-op when already watched or already fired.
    pub fn watch(&mut self, target: ElementId) {
        if self.fired.contains(&target) || self.is_watching(target) {
            return;
        }
        self.watched.push(target);
    }

    /// Stop watching `target` without firing.
    pub fn unwatch(&mut self, target: ElementId) {
        self.watched.retain(|&t| t != target);
    }

    /// Drop every registration.
    pub fn disconnect(&mut self) {
        self.watched.clear();
    }

    pub fn is_watching(&self, target: ElementId) -> bool {
        self.watched.contains(&target)
    }

    pub fn watched_count(&self) -> usize {
        self.watched.len()
    }

    /// Test every watched element against `viewport` and return those that
    /// entered.  Each returned element is unregistered before this returns.
    ///
    /// `geometry` yields the current layout box; elements without one (not
    /// rendered) stay registered.
    pub fn check<F>(&mut self, viewport: Rect, geometry: F) -> Vec<ElementId>
    where
        F: Fn(ElementId) -> Option<Rect>,
    {
        let (threshold, root_margin) = (self.threshold, self.root_margin);
        let mut newly = Vec::new();
        self.watched.retain(|&target| {
            let Some(rect) = geometry(target) else {
                return true;
            };
            let hit = entered(&rect, &viewport, threshold, root_margin);
            if hit {
                newly.push(target);
            }
            !hit
        });
        self.fired.extend(newly.iter().copied());
        if !newly.is_empty() {
            tracing::debug!(count = newly.len(), "observer: elements entered viewport");
        }
        newly
    }
}

fn entered(rect: &Rect, viewport: &Rect, threshold: f64, root_margin: f64) -> bool {
    let root = viewport.expand(root_margin);
    let Some(hit) = rect.intersect(&root) else {
        return false;
    };
    let area = rect.area();
    if area <= 0.0 {
        // Zero-area boxes intersect fully or not at all.
        return true;
    }
    hit.area() / area >= threshold
}
