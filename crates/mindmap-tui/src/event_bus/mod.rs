//! Priority event bus.
//!
//! An explicitly constructed instance shared by handle (`Rc<EventBus>`);
//! there is no global bus. Emitters declare the event kinds they may raise
//! when they register, consumers subscribe per `(emitter, kind)`, and
//! published events go through a binary heap keyed on
//! `(priority, sequence number)` — lower priority values first, FIFO among
//! equals, so nothing starves.
//!
//! The drain loop is non-reentrant by construction: a `publish` issued from
//! inside a callback enqueues and returns, and the event is serviced later in
//! the same drain. That is the central ordering guarantee of the whole crate.

use std::cell::{Cell, RefCell};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use fxhash::FxHashMap;
use mindmap_core::{CommandCall, Input};

use crate::error::BusError;
use crate::mode::Mode;
use crate::user_config::Setting;

/// Priority for ordinary traffic.
pub const DEFAULT_EVENT_PRIORITY: i32 = 50;

/// Default priority for input stack events. Kept below (more urgent than)
/// [`DEFAULT_EVENT_PRIORITY`] so input resolution runs before anything else
/// queued in the same drain.
pub const INPUT_EVENT_PRIORITY: i32 = 20;

/// Opaque identity of an event emitter, minted from a process-wide counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EmitterId(u64);

impl EmitterId {
    pub fn mint() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        EmitterId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "emitter#{}", self.0)
    }
}

/// Everything that travels over the bus. The payload is typed per variant;
/// [`Event::kind`] projects onto the closed [`EventKind`] set used for
/// emitter registration.
#[derive(Clone, Debug)]
pub enum Event {
    InputPushed { input: Input },
    InputPopped { input: Input },
    StackCleared,
    CallEnqueued { call: CommandCall },
    CallDequeued { call: CommandCall },
    ModeSet { mode: Mode },
    SettingChanged { setting: Setting },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    InputPushed,
    InputPopped,
    StackCleared,
    CallEnqueued,
    CallDequeued,
    ModeSet,
    SettingChanged,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::InputPushed { .. } => EventKind::InputPushed,
            Event::InputPopped { .. } => EventKind::InputPopped,
            Event::StackCleared => EventKind::StackCleared,
            Event::CallEnqueued { .. } => EventKind::CallEnqueued,
            Event::CallDequeued { .. } => EventKind::CallDequeued,
            Event::ModeSet { .. } => EventKind::ModeSet,
            Event::SettingChanged { .. } => EventKind::SettingChanged,
        }
    }
}

/// Subscriber callbacks are identified by their `Rc` allocation: subscribing
/// the same `Rc` twice for one `(emitter, kind)` is a no-op.
pub type Callback = Rc<dyn Fn(EmitterId, &Event)>;

struct EmitterRecord {
    kinds: Vec<EventKind>,
    subscribers: FxHashMap<EventKind, Vec<Callback>>,
}

struct QueuedEvent {
    priority: i32,
    seq: u64,
    emitter: EmitterId,
    event: Event,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.priority, self.seq).cmp(&(other.priority, other.seq))
    }
}

pub struct EventBus {
    emitters: RefCell<FxHashMap<EmitterId, EmitterRecord>>,
    queue: RefCell<BinaryHeap<Reverse<QueuedEvent>>>,
    next_seq: Cell<u64>,
    draining: Cell<bool>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            emitters: RefCell::new(FxHashMap::default()),
            queue: RefCell::new(BinaryHeap::new()),
            next_seq: Cell::new(0),
            draining: Cell::new(false),
        }
    }

    /// Declares the kinds `emitter` may raise. One registration per identity;
    /// re-registering without [`EventBus::unregister_emitter`] in between is
    /// an error.
    pub fn register_emitter(
        &self,
        emitter: EmitterId,
        kinds: &[EventKind],
    ) -> Result<(), BusError> {
        let mut emitters = self.emitters.borrow_mut();
        if emitters.contains_key(&emitter) {
            return Err(BusError::DuplicateEmitter(emitter));
        }

        let mut subscribers = FxHashMap::default();
        for kind in kinds {
            subscribers.insert(*kind, Vec::new());
        }
        emitters.insert(
            emitter,
            EmitterRecord {
                kinds: kinds.to_vec(),
                subscribers,
            },
        );
        tracing::trace!(%emitter, ?kinds, "emitter registered");
        Ok(())
    }

    /// Tears an emitter down, dropping its declaration and all its
    /// subscriptions.
    pub fn unregister_emitter(&self, emitter: EmitterId) -> Result<(), BusError> {
        self.emitters
            .borrow_mut()
            .remove(&emitter)
            .map(|_| ())
            .ok_or(BusError::UnregisteredEmitter(emitter))
    }

    /// Subscribes `callback` to `kind` events from `emitter`. Invocation
    /// order is registration order; subscribing the same callback twice is a
    /// no-op.
    pub fn subscribe(
        &self,
        emitter: EmitterId,
        kind: EventKind,
        callback: Callback,
    ) -> Result<(), BusError> {
        let mut emitters = self.emitters.borrow_mut();
        let record = emitters
            .get_mut(&emitter)
            .ok_or(BusError::UnregisteredEmitter(emitter))?;
        let subscribers = record
            .subscribers
            .get_mut(&kind)
            .ok_or(BusError::UnsupportedKind(emitter, kind))?;

        if subscribers.iter().any(|cb| Rc::ptr_eq(cb, &callback)) {
            return Ok(());
        }
        subscribers.push(callback);
        Ok(())
    }

    /// Enqueues `event` and, unless a drain is already in progress, services
    /// the queue to completion before returning. A publish issued from inside
    /// a callback only enqueues; the surrounding drain picks the event up in
    /// `(priority, submission)` order.
    pub fn publish(&self, emitter: EmitterId, event: Event, priority: i32) -> Result<(), BusError> {
        {
            let emitters = self.emitters.borrow();
            let record = emitters
                .get(&emitter)
                .ok_or(BusError::UnregisteredEmitter(emitter))?;
            if !record.kinds.contains(&event.kind()) {
                return Err(BusError::UnsupportedKind(emitter, event.kind()));
            }
        }

        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        tracing::trace!(%emitter, kind = ?event.kind(), priority, seq, "event queued");
        self.queue.borrow_mut().push(Reverse(QueuedEvent {
            priority,
            seq,
            emitter,
            event,
        }));

        if !self.draining.get() {
            self.draining.set(true);
            self.drain();
        }
        Ok(())
    }

    /// True while the drain loop is running callbacks, i.e. while the caller
    /// is inside an event cascade.
    pub fn is_draining(&self) -> bool {
        self.draining.get()
    }

    /// Blocks (trivially, on one logical thread) until all pending events
    /// have been serviced.
    ///
    /// # Panics
    ///
    /// Panics when called from inside a callback: a reentrant wait could
    /// never finish and is a programming error, so it fails fast instead of
    /// deadlocking.
    pub fn settle(&self) {
        if self.draining.get() {
            panic!("settle() called from inside an event callback");
        }
        if !self.queue.borrow().is_empty() {
            self.draining.set(true);
            self.drain();
        }
    }

    fn drain(&self) {
        loop {
            let Some(Reverse(queued)) = self.queue.borrow_mut().pop() else {
                break;
            };

            // Callbacks are cloned out so the registration table is not
            // borrowed while they run; they may subscribe or publish.
            let callbacks: Vec<Callback> = {
                let emitters = self.emitters.borrow();
                emitters
                    .get(&queued.emitter)
                    .and_then(|record| record.subscribers.get(&queued.event.kind()))
                    .map(|subs| subs.to_vec())
                    .unwrap_or_default()
            };

            tracing::trace!(
                emitter = %queued.emitter,
                kind = ?queued.event.kind(),
                priority = queued.priority,
                subscribers = callbacks.len(),
                "servicing event"
            );
            for callback in callbacks {
                callback(queued.emitter, &queued.event);
            }
        }
        self.draining.set(false);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
