//! Event bus for texrev.
//!
//! Terminal input and timer ticks are normalised into one `AppEvent` enum and
//! sent over a tokio unbounded MPSC channel that the main loop drains.
//!
//! Two independent intervals drive the loop:
//! - **Render** (33 ms, about 30 FPS) triggers a `terminal.draw()` call.
//! - **Tick** (250 ms) triggers the on-disk change check for the document.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;

const TICK_RATE: Duration = Duration::from_millis(250);
const FRAME_RATE: Duration = Duration::from_millis(33);

#[derive(Debug)]
pub enum AppEvent {
    /// A key press. Release and repeat events never reach the channel.
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    Tick,
    Render,
}

/// Sender and receiver ends of the event channel.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a crossterm event onto the bus; focus and paste events are dropped.
fn translate(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        Event::Resize(columns, rows) => Some(AppEvent::Resize(columns, rows)),
        _ => None,
    }
}

/// Spawns the task that feeds the event channel until the receiver is dropped.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(TICK_RATE);
        let mut frames = tokio::time::interval(FRAME_RATE);
        let mut input = EventStream::new();

        loop {
            let event = tokio::select! {
                _ = ticks.tick() => Some(AppEvent::Tick),
                _ = frames.tick() => Some(AppEvent::Render),
                next = input.next().fuse() => match next {
                    Some(Ok(event)) => translate(event),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "terminal input error");
                        None
                    }
                    None => break,
                },
            };

            if let Some(event) = event {
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
    });
}
