//! Auto-advancing slide carousels.
//!
//! Each carousel owns its recurring timer.  Manual prev/next never touch the
//! timer, so a manual step and an automatic tick can land back to back; both
//! go through [`Carousel::show_slide`] and the later one wins.

use std::time::Duration;

use super::dom::{Document, ElementId};
use super::error::SetupError;
use super::timer::{CarouselId, Scheduler, TimerEvent, TimerHandle};

pub const ROOT_CLASS: &str = "carousel-block";
pub const SLIDE_CLASS: &str = "carousel-slide";
pub const PREV_CLASS: &str = "carousel-prev";
pub const NEXT_CLASS: &str = "carousel-next";
/// Fixed auto-advance period.
pub const INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselState {
    /// Fewer than two slides, or stopped.
    Idle,
    Playing,
}

#[derive(Debug)]
pub struct Carousel {
    pub root: ElementId,
    pub slides: Vec<ElementId>,
    pub prev_control: Option<ElementId>,
    pub next_control: Option<ElementId>,
    active: usize,
    timer: Option<TimerHandle>,
}

/// First `class` element under `root` that is not inside a nested carousel.
fn own_control(doc: &Document, root: ElementId, class: &str) -> Option<ElementId> {
    doc.descendants_by_class(root, class)
        .into_iter()
        .find(|&c| doc.closest_ancestor(c, ROOT_CLASS) == Some(root))
}

impl Carousel {
    /// Wire the carousel rooted at `root` and show its first slide.
    /// Carousels without slides are valid and simply stay idle.
    pub fn from_element(doc: &mut Document, root: ElementId) -> Result<Self, SetupError> {
        let slides = doc
            .descendants_by_class(root, SLIDE_CLASS)
            .into_iter()
            .filter(|&s| doc.closest_ancestor(s, ROOT_CLASS) == Some(root))
            .collect();
        let mut carousel = Self {
            root,
            slides,
            prev_control: own_control(doc, root, PREV_CLASS),
            next_control: own_control(doc, root, NEXT_CLASS),
            active: 0,
            timer: None,
        };
        carousel.show_slide(doc, 0);
        Ok(carousel)
    }

    /// Start auto-advance.  Only carousels with more than one slide play.
    pub fn start(&mut self, id: CarouselId, scheduler: &mut dyn Scheduler) {
        if self.slides.len() <= 1 || self.timer.is_some() {
            return;
        }
        self.timer = Some(scheduler.every(INTERVAL, TimerEvent::CarouselTick(id)));
        tracing::debug!(id, root = self.root, slides = self.slides.len(), "carousel: playing");
    }

    /// Cancel the timer.  Idempotent.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    pub fn state(&self) -> CarouselState {
        match self.timer {
            Some(ref t) if !t.is_cancelled() => CarouselState::Playing,
            _ => CarouselState::Idle,
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn next(&mut self, doc: &mut Document) {
        let len = self.slides.len();
        if len == 0 {
            return;
        }
        self.show_slide(doc, (self.active + 1) % len);
    }

    pub fn prev(&mut self, doc: &mut Document) {
        let len = self.slides.len();
        if len == 0 {
            return;
        }
        self.show_slide(doc, (self.active + len - 1) % len);
    }

    /// Make slide `index` (wrapped) the only one displayed.
    pub fn show_slide(&mut self, doc: &mut Document, index: usize) {
        let len = self.slides.len();
        if len == 0 {
            return;
        }
        self.active = index % len;
        for (i, &slide) in self.slides.iter().enumerate() {
            doc.set_style(slide, "display", if i == self.active { "block" } else { "none" });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timer::ManualScheduler;

    fn carousel(doc: &mut Document, slides: usize, controls: bool) -> ElementId {
        let root = doc.create_element("div");
        doc.add_class(root, ROOT_CLASS);
        doc.append_child(doc.body(), root);
        for i in 0..slides {
            let s = doc.create_element("div");
            doc.add_class(s, SLIDE_CLASS);
            doc.get_mut(s).text = Some(format!("slide {i}"));
            doc.append_child(root, s);
        }
        if controls {
            for class in [PREV_CLASS, NEXT_CLASS] {
                let b = doc.create_element("button");
                doc.add_class(b, class);
                doc.append_child(root, b);
            }
        }
        root
    }

    fn shown(doc: &Document, c: &Carousel) -> Vec<usize> {
        c.slides
            .iter()
            .enumerate()
            .filter(|&(_, &s)| doc.style(s, "display") == Some("block"))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn three_nexts_return_to_start() {
        let mut doc = Document::new("t");
        let root = carousel(&mut doc, 3, false);
        let mut c = Carousel::from_element(&mut doc, root).unwrap();
        assert_eq!(shown(&doc, &c), vec![0]);
        for expected in [1, 2, 0] {
            c.next(&mut doc);
            assert_eq!(c.active(), expected);
            assert_eq!(shown(&doc, &c), vec![expected]);
        }
        c.prev(&mut doc);
        assert_eq!(shown(&doc, &c), vec![2]);
    }

    #[test]
    fn nested_carousel_keeps_its_own_controls() {
        let mut doc = Document::new("t");
        let outer = carousel(&mut doc, 2, false);
        let inner = doc.create_element("div");
        doc.add_class(inner, ROOT_CLASS);
        doc.append_child(outer, inner);
        let mut buttons = Vec::new();
        for class in [PREV_CLASS, NEXT_CLASS] {
            let b = doc.create_element("button");
            doc.add_class(b, class);
            doc.append_child(inner, b);
            buttons.push(b);
        }

        let o = Carousel::from_element(&mut doc, outer).unwrap();
        assert_eq!(o.slides.len(), 2);
        assert_eq!((o.prev_control, o.next_control), (None, None));
        let i = Carousel::from_element(&mut doc, inner).unwrap();
        assert_eq!((i.prev_control, i.next_control), (Some(buttons[0]), Some(buttons[1])));
    }

    #[test]
    fn single_slide_never_starts_timer() {
        let mut doc = Document::new("t");
        let root = carousel(&mut doc, 1, false);
        let mut c = Carousel::from_element(&mut doc, root).unwrap();
        let mut sched = ManualScheduler::new();
        c.start(0, &mut sched);
        assert_eq!(c.state(), CarouselState::Idle);
        assert_eq!(sched.recurring_count(), 0);
    }

    #[test]
    fn empty_carousel_is_inert() {
        let mut doc = Document::new("t");
        let root = carousel(&mut doc, 0, false);
        let mut c = Carousel::from_element(&mut doc, root).unwrap();
        let mut sched = ManualScheduler::new();
        c.start(0, &mut sched);
        c.next(&mut doc);
        c.prev(&mut doc);
        assert_eq!(c.active(), 0);
        assert_eq!(c.state(), CarouselState::Idle);
    }

    #[test]
    fn manual_steps_do_not_reset_the_timer() {
        let mut doc = Document::new("t");
        let root = carousel(&mut doc, 3, true);
        let mut c = Carousel::from_element(&mut doc, root).unwrap();
        assert!(c.prev_control.is_some() && c.next_control.is_some());
        let mut sched = ManualScheduler::new();
        c.start(7, &mut sched);
        assert_eq!(c.state(), CarouselState::Playing);

        sched.advance(Duration::from_millis(4000));
        c.next(&mut doc);
        // The tick still lands 1 s after the manual step.
        let fired = sched.advance(Duration::from_millis(1000));
        assert_eq!(fired, vec![TimerEvent::CarouselTick(7)]);
        c.next(&mut doc);
        assert_eq!(c.active(), 2);
    }

    #[test]
    fn stop_cancels_deterministically() {
        let mut doc = Document::new("t");
        let root = carousel(&mut doc, 2, false);
        let mut c = Carousel::from_element(&mut doc, root).unwrap();
        let mut sched = ManualScheduler::new();
        c.start(0, &mut sched);
        c.stop();
        c.stop();
        assert_eq!(c.state(), CarouselState::Idle);
        assert!(sched.advance(INTERVAL * 3).is_empty());
    }
}
