//! Tokio-backed [`Scheduler`] for the interactive host.
//!
//! Each timer is a spawned task that sleeps, checks its cancel flag and
//! forwards the event over a channel consumed by the main `select!` loop.

use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::core::timer::{Scheduler, TimerEvent, TimerHandle};

pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<TimerEvent>,
    next_id: u64,
}

impl TokioScheduler {
    /// Returns the scheduler and the receiving end the host selects on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, next_id: 0 }, rx)
    }

    fn handle(&mut self) -> TimerHandle {
        self.next_id += 1;
        TimerHandle::new(self.next_id)
    }
}

impl Scheduler for TokioScheduler {
    fn every(&mut self, period: Duration, event: TimerEvent) -> TimerHandle {
        let handle = self.handle();
        let cancel = handle.flag();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            // A stalled loop should not produce a burst of catch-up ticks.
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if cancel.load(Ordering::Relaxed) || tx.send(event).is_err() {
                    break;
                }
            }
        });

        tracing::trace!(id = handle.id(), ?period, ?event, "timer: recurring");
        handle
    }

    fn after(&mut self, delay: Duration, event: TimerEvent) -> TimerHandle {
        let handle = self.handle();
        let cancel = handle.flag();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            time::sleep(delay).await;
            if !cancel.load(Ordering::Relaxed) {
                let _ = tx.send(event);
            }
        });

        tracing::trace!(id = handle.id(), ?delay, ?event, "timer: one-shot");
        handle
    }
}
