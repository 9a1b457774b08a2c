//! Timer service.
//!
//! Schedules callbacks to run after a delay, with cancellation by opaque
//! handle. Delivery is serialized onto the single control thread: nothing
//! fires on its own — the host loop calls [`TimerService::fire_due`] from the
//! same context that drives the event bus, and [`TimerService::next_deadline`]
//! tells it how long it may sleep. Tests pass synthetic instants to
//! `fire_due` instead of sleeping.

use std::cell::{Cell, RefCell};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use fxhash::FxHashMap;

/// Opaque handle to a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(PartialEq, Eq)]
struct Deadline {
    at: Instant,
    id: TimerId,
}

impl PartialOrd for Deadline {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Deadline {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.at, self.id.0).cmp(&(other.at, other.id.0))
    }
}

pub struct TimerService {
    deadlines: RefCell<BinaryHeap<Reverse<Deadline>>>,
    // Cancellation is lazy: cancelling removes the callback, the deadline
    // entry is discarded whenever it next surfaces.
    callbacks: RefCell<FxHashMap<TimerId, Box<dyn FnOnce()>>>,
    next_id: Cell<u64>,
}

impl TimerService {
    pub fn new() -> Self {
        Self {
            deadlines: RefCell::new(BinaryHeap::new()),
            callbacks: RefCell::new(FxHashMap::default()),
            next_id: Cell::new(0),
        }
    }

    /// Schedules `callback` to run once `delay` has elapsed.
    pub fn schedule(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let at = Instant::now() + delay;
        self.deadlines.borrow_mut().push(Reverse(Deadline { at, id }));
        self.callbacks.borrow_mut().insert(id, Box::new(callback));
        tracing::trace!(?id, ?delay, "timer scheduled");
        id
    }

    /// Cancels a scheduled timer. Cancelling an already-fired or
    /// already-cancelled timer is a no-op.
    pub fn cancel(&self, id: TimerId) {
        if self.callbacks.borrow_mut().remove(&id).is_some() {
            tracing::trace!(?id, "timer cancelled");
        }
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.callbacks.borrow().contains_key(&id)
    }

    /// Runs every callback whose deadline is at or before `now`, in deadline
    /// order, on the caller's thread. Returns how many fired.
    pub fn fire_due(&self, now: Instant) -> usize {
        // Due callbacks are collected before any of them runs: a firing
        // callback may schedule or cancel timers, so no borrow can be held
        // while it executes.
        let mut due = Vec::new();
        {
            let mut deadlines = self.deadlines.borrow_mut();
            let mut callbacks = self.callbacks.borrow_mut();
            while let Some(Reverse(deadline)) = deadlines.peek() {
                if deadline.at > now {
                    break;
                }
                let id = deadline.id;
                deadlines.pop();
                if let Some(callback) = callbacks.remove(&id) {
                    due.push((id, callback));
                }
            }
        }

        let fired = due.len();
        for (id, callback) in due {
            tracing::trace!(?id, "timer fired");
            callback();
        }
        fired
    }

    /// The earliest live deadline, for hosts that want to sleep precisely.
    pub fn next_deadline(&self) -> Option<Instant> {
        let mut deadlines = self.deadlines.borrow_mut();
        let callbacks = self.callbacks.borrow();
        while let Some(Reverse(deadline)) = deadlines.peek() {
            if callbacks.contains_key(&deadline.id) {
                return Some(deadline.at);
            }
            // Stale entry left behind by a cancellation.
            deadlines.pop();
        }
        None
    }
}

impl Default for TimerService {
    fn default() -> Self {
        Self::new()
    }
}
