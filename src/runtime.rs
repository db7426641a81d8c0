use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum ArcadeEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait ArcadeEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<ArcadeEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<ArcadeEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                // Windows reports releases too; only presses are input
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx.send(ArcadeEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(ArcadeEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    log::warn!("terminal event stream closed: {err}");
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ArcadeEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ArcadeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<ArcadeEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<ArcadeEvent>) -> Self {
        Self { rx }
    }
}

impl ArcadeEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ArcadeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: ArcadeEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: ArcadeEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks until the next event, the tick interval, or `deadline` (time left
    /// until the next game timer), whichever comes first. Returns Tick on timeout.
    pub fn step(&self, deadline: Option<Duration>) -> ArcadeEvent {
        let wait = deadline.map_or(self.ticker.interval(), |d| d.min(self.ticker.interval()));
        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                ArcadeEvent::Tick
            }
        }
    }
}
