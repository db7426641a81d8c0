use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Instant;

/// Monotonic millisecond time source
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Production clock backed by `Instant`, so wall-clock adjustments never leak in
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock for tests and headless drivers.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the game under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    /// Jump to an absolute time. Moving backwards is allowed and is how tests
    /// synthesize clock skew.
    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Opaque token identifying one scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// A timer that came due, handed back to its owner
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<E> {
    pub handle: TimerHandle,
    pub payload: E,
    pub due_at: u64,
}

#[derive(Debug)]
struct Entry<E> {
    handle: TimerHandle,
    payload: E,
    interval: Option<u64>,
}

/// Single-threaded timer queue keyed on a `Clock`.
///
/// Timers carry a typed payload instead of a closure; the owner drains due
/// timers with `pop_due` and applies them to its own state.
#[derive(Debug)]
pub struct Scheduler<E, C: Clock> {
    clock: C,
    next_id: u64,
    queue: BTreeMap<(u64, u64), Entry<E>>,
    index: HashMap<TimerHandle, (u64, u64)>,
}

impl<E: Clone, C: Clock> Scheduler<E, C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            next_id: 0,
            queue: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn after(&mut self, delay_ms: u64, payload: E) -> TimerHandle {
        let due = self.now().saturating_add(delay_ms);
        self.insert(due, payload, None)
    }

    /// One-shot timer at an absolute instant. A deadline already in the past
    /// is due on the next `pop_due`.
    pub fn at(&mut self, due_ms: u64, payload: E) -> TimerHandle {
        self.insert(due_ms, payload, None)
    }

    /// Periodic timer. A zero interval is bumped to 1 ms so draining terminates.
    pub fn every(&mut self, interval_ms: u64, payload: E) -> TimerHandle {
        let interval = interval_ms.max(1);
        let due = self.now().saturating_add(interval);
        self.insert(due, payload, Some(interval))
    }

    /// Returns true if a live timer was removed. Unknown, fired and already
    /// cancelled handles are ignored.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.index.remove(&handle) {
            Some(key) => {
                self.queue.remove(&key);
                log::trace!("cancelled timer {:?}", handle);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        if !self.queue.is_empty() {
            log::trace!("cancelling {} pending timer(s)", self.queue.len());
        }
        self.queue.clear();
        self.index.clear();
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.index.contains_key(&handle)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pops the earliest timer whose deadline has passed. Ties fire in the
    /// order they were scheduled. Periodic timers are re-armed one interval
    /// after their previous deadline, so a long gap yields one firing per
    /// elapsed interval.
    pub fn pop_due(&mut self) -> Option<Fired<E>> {
        let now = self.now();
        let key = *self.queue.keys().next()?;
        if key.0 > now {
            return None;
        }

        let entry = self.queue.remove(&key)?;
        self.index.remove(&entry.handle);

        if let Some(interval) = entry.interval {
            let next_key = (key.0.saturating_add(interval), self.bump());
            self.index.insert(entry.handle, next_key);
            self.queue.insert(
                next_key,
                Entry {
                    handle: entry.handle,
                    payload: entry.payload.clone(),
                    interval: entry.interval,
                },
            );
        }

        Some(Fired {
            handle: entry.handle,
            payload: entry.payload,
            due_at: key.0,
        })
    }

    fn insert(&mut self, due: u64, payload: E, interval: Option<u64>) -> TimerHandle {
        let seq = self.bump();
        let handle = TimerHandle(seq);
        self.queue.insert(
            (due, seq),
            Entry {
                handle,
                payload,
                interval,
            },
        );
        self.index.insert(handle, (due, seq));
        log::trace!("scheduled timer {:?} due at {} ms", handle, due);
        handle
    }

    fn bump(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
