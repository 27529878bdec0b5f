//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a background task that
//! forwards them over a channel so the main loop stays non-blocking.  Key
//! releases and bare mouse motion are dropped here; nothing downstream
//! reacts to them.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
}

impl AppEvent {
    /// Translate a raw crossterm event, or `None` if it should be ignored.
    fn from_crossterm(ev: CtEvent) -> Option<Self> {
        match ev {
            CtEvent::Key(k) if k.kind != KeyEventKind::Release => Some(AppEvent::Key(k)),
            CtEvent::Mouse(m) => match m.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) => None,
                _ => Some(AppEvent::Mouse(m)),
            },
            CtEvent::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            _ => None,
        }
    }
}

/// Spawns a background task that polls the terminal for events and sends them
/// through the returned channel.  Ticks drive the loading spinner.
pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        let has_event = event::poll(tick_rate).unwrap_or(false);
        let next = if has_event {
            match event::read() {
                Ok(ev) => AppEvent::from_crossterm(ev),
                Err(err) => {
                    tracing::warn!(%err, "terminal read failed");
                    None
                }
            }
        } else {
            Some(AppEvent::Tick)
        };

        if let Some(app_event) = next {
            if tx.send(app_event).is_err() {
                break; // receiver dropped
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers, MouseButton};

    use super::*;

    #[test]
    fn key_release_is_dropped() {
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(AppEvent::from_crossterm(CtEvent::Key(release)).is_none());

        let press = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert!(matches!(
            AppEvent::from_crossterm(CtEvent::Key(press)),
            Some(AppEvent::Key(_))
        ));
    }

    #[test]
    fn mouse_motion_is_dropped_but_clicks_pass() {
        let mouse = |kind| MouseEvent {
            kind,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        assert!(AppEvent::from_crossterm(CtEvent::Mouse(mouse(MouseEventKind::Moved))).is_none());
        assert!(matches!(
            AppEvent::from_crossterm(CtEvent::Mouse(mouse(MouseEventKind::Down(MouseButton::Left)))),
            Some(AppEvent::Mouse(_))
        ));
    }
}
