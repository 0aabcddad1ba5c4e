//! Owned timer handles and the scheduling seam controllers use.
//!
//! Controllers never sleep.  They ask a [`Scheduler`] for a one-shot or
//! recurring [`TimerEvent`] and keep the returned [`TimerHandle`]; the host
//! feeds fired events back into the page on its event loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::dom::ElementId;

/// Index of a carousel within [`crate::core::page::Page`].
pub type CarouselId = usize;

/// Events produced by timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Periodic auto-advance of one carousel.
    CarouselTick(CarouselId),
    /// A staggered reveal target's delay has elapsed.
    RevealDue(ElementId),
}

/// Cancellation handle for a scheduled timer.
///
/// The timer task checks the shared flag before every firing, so cancelling
/// is deterministic: no event is delivered after [`TimerHandle::cancel`]
/// returns, apart from one already queued on the host channel.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    id: u64,
    cancel: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Shared flag handed to the task driving this timer.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }
}

/// Source of timers.  Implemented by the tokio host and by [`ManualScheduler`].
pub trait Scheduler {
    /// Fire `event` every `period`, first after one full period.
    fn every(&mut self, period: Duration, event: TimerEvent) -> TimerHandle;
    /// Fire `event` once after `delay`.
    fn after(&mut self, delay: Duration, event: TimerEvent) -> TimerHandle;
}

// ───────────────────────────────────────── manual clock ──────

#[derive(Debug)]
struct ManualTimer {
    handle: TimerHandle,
    event: TimerEvent,
    due: Duration,
    period: Option<Duration>,
}

/// Deterministic scheduler driven by an explicit virtual clock.
///
/// Used for headless runs (`--dump`) and tests.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    timers: Vec<ManualTimer>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of live (uncancelled) timers.
    pub fn active_count(&self) -> usize {
        self.timers
            .iter()
            .filter(|t| !t.handle.is_cancelled())
            .count()
    }

    /// Number of live recurring timers.
    pub fn recurring_count(&self) -> usize {
        self.timers
            .iter()
            .filter(|t| t.period.is_some() && !t.handle.is_cancelled())
            .count()
    }

    /// Move the clock forward by `by` and return every event that came due,
    /// in due-time order.  Recurring timers may fire several times.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerEvent> {
        let target = self.now.saturating_add(by);
        let mut fired = Vec::new();
        loop {
            self.timers.retain(|t| !t.handle.is_cancelled());
            let next = self
                .timers
                .iter_mut()
                .filter(|t| t.due <= target)
                .min_by_key(|t| t.due);
            let Some(timer) = next else {
                break;
            };
            fired.push(timer.event);
            self.now = timer.due;
            match timer.period {
                Some(period) => timer.due += period.max(Duration::from_millis(1)),
                None => timer.handle.cancel(),
            }
        }
        self.now = target;
        fired
    }

    fn push(&mut self, delay: Duration, period: Option<Duration>, event: TimerEvent) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle::new(self.next_id);
        self.timers.push(ManualTimer {
            handle: handle.clone(),
            event,
            due: self.now + delay,
            period,
        });
        handle
    }
}

impl Scheduler for ManualScheduler {
    fn every(&mut self, period: Duration, event: TimerEvent) -> TimerHandle {
        self.push(period, Some(period), event)
    }

    fn after(&mut self, delay: Duration, event: TimerEvent) -> TimerHandle {
        self.push(delay, None, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurring_timer_fires_each_period() {
        let mut sched = ManualScheduler::new();
        sched.every(Duration::from_millis(5000), TimerEvent::CarouselTick(0));
        assert!(sched.advance(Duration::from_millis(4999)).is_empty());
        assert_eq!(
            sched.advance(Duration::from_millis(10_001)),
            vec![TimerEvent::CarouselTick(0); 3]
        );
    }

    #[test]
    fn one_shot_fires_once_and_cancel_suppresses() {
        let mut sched = ManualScheduler::new();
        sched.after(Duration::from_millis(100), TimerEvent::RevealDue(4));
        let h = sched.after(Duration::from_millis(200), TimerEvent::RevealDue(5));
        h.cancel();
        h.cancel();
        assert_eq!(
            sched.advance(Duration::from_secs(1)),
            vec![TimerEvent::RevealDue(4)]
        );
        assert_eq!(sched.active_count(), 0);
    }
}
