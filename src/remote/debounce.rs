//! Trailing-edge debounce driven by an injectable clock.
//!
//! [`Debouncer`] holds at most one pending value and its deadline. Every
//! [`Debouncer::trigger`] replaces the value and pushes the deadline out by the
//! window, so a burst of triggers yields exactly one value once the burst has
//! been quiet for a full window. Nothing here sleeps; the owner polls with
//! [`Debouncer::take_due`] or sleeps until [`Debouncer::deadline`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

struct Pending<T> {
    value: T,
    deadline: Instant,
}

pub struct Debouncer<T> {
    window: Duration,
    clock: Arc<dyn Clock>,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window,
            clock,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Cancel any pending value and reschedule with `value`.
    pub fn trigger(&mut self, value: T) {
        let deadline = self.clock.now() + self.window;
        self.pending = Some(Pending { value, deadline });
    }

    /// Take the pending value if its quiet period has elapsed.
    pub fn take_due(&mut self) -> Option<T> {
        let now = self.clock.now();
        match &self.pending {
            Some(p) if p.deadline <= now => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Take the pending value regardless of its deadline.
    pub fn take_pending(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
