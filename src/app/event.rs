//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a blocking reader
//! that forwards them over a channel so the main loop stays non-blocking.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Nothing arrived within the poll period.
    Tick,
}

/// Spawns a blocking task that polls the terminal and sends events through
/// the returned channel.  A [`AppEvent::Tick`] is sent whenever `poll` passes
/// without input, so the reader notices a dropped receiver promptly.
pub fn spawn_event_reader(poll: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        let app_event = match event::poll(poll) {
            Ok(true) => match event::read() {
                // Key release/repeat events would double every action on
                // terminals that report them.
                Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => AppEvent::Key(k),
                Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("terminal read failed: {e}");
                    break;
                }
            },
            Ok(false) => AppEvent::Tick,
            Err(e) => {
                tracing::warn!("terminal poll failed: {e}");
                break;
            }
        };
        if tx.send(app_event).is_err() {
            break; // receiver dropped
        }
    });

    rx
}
