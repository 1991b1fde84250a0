//! Terminal input and tick pump
//!
//! A background task merges crossterm input with a periodic tick and feeds
//! both to the app loop over one channel.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// How long a blocking poll may wait before the tick branch gets a turn
const POLL_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Drives the spinner and the day-rollover check
    Tick,
}

/// Receiving end of the input pump
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _pump: JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(64);
        let pump = tokio::spawn(pump(tx, tick_rate));
        Self { rx, _pump: pump }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

/// Runs until the receiver is dropped
async fn pump(tx: mpsc::Sender<AppEvent>, tick_rate: Duration) {
    let mut ticks = interval(tick_rate);

    loop {
        let next = tokio::select! {
            _ = ticks.tick() => Some(AppEvent::Tick),
            ready = tokio::task::spawn_blocking(|| event::poll(POLL_TIMEOUT).unwrap_or(false)) => {
                if matches!(ready, Ok(true)) {
                    event::read().ok().and_then(translate)
                } else {
                    None
                }
            }
        };

        if let Some(event) = next {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    }
}

/// Keep key presses and resizes; Windows also reports releases and repeats
fn translate(event: CrosstermEvent) -> Option<AppEvent> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        CrosstermEvent::Resize(width, height) => Some(AppEvent::Resize(width, height)),
        _ => None,
    }
}

/// Keys that mean the same thing on every list screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalKey {
    Help,
    Quit,
    Back,
}

/// Ctrl+C leaves the app from anywhere, text inputs included
pub fn is_force_quit_key(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Classify a key for screens without a text input focused
pub fn global_key(key: &KeyEvent) -> Option<GlobalKey> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match key.code {
        KeyCode::Char('?') => Some(GlobalKey::Help),
        KeyCode::Char('q') => Some(GlobalKey::Quit),
        KeyCode::Esc | KeyCode::Backspace => Some(GlobalKey::Back),
        _ => None,
    }
}
