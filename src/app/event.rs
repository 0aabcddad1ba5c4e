//! Terminal input for the preview host.
//!
//! A blocking reader polls crossterm and forwards the events the page cares
//! about over a channel, so the main loop can `select!` over input, timers
//! and decoded images alike.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Nothing arrived within one poll interval.
    Tick,
}

fn translate(ev: CtEvent) -> Option<AppEvent> {
    match ev {
        // Release/repeat events would double every keystroke on some platforms.
        CtEvent::Key(k) if k.kind == KeyEventKind::Press => Some(AppEvent::Key(k)),
        CtEvent::Mouse(m) => Some(AppEvent::Mouse(m)),
        CtEvent::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        _ => None,
    }
}

/// Start the reader.  It stops once the receiver is dropped.
pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        let next = match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                Ok(ev) => match translate(ev) {
                    Some(app_event) => app_event,
                    None => continue,
                },
                Err(err) => {
                    tracing::warn!(%err, "terminal read failed");
                    continue;
                }
            },
            Ok(false) => AppEvent::Tick,
            Err(err) => {
                tracing::warn!(%err, "terminal poll failed, stopping input");
                break;
            }
        };
        if tx.send(next).is_err() {
            break;
        }
    });

    rx
}
