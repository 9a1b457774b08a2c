//! Command call queue.
//!
//! The buffer between input resolution and command execution: the controller
//! enqueues resolved [`CommandCall`]s here, an executor (outside this core)
//! dequeues them. Both sides can observe the flow through `CallEnqueued` /
//! `CallDequeued` events.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use mindmap_core::CommandCall;

use crate::error::QueueError;
use crate::event_bus::{DEFAULT_EVENT_PRIORITY, EmitterId, Event, EventBus, EventKind};

pub struct CommandCallQueue {
    bus: Rc<EventBus>,
    emitter: EmitterId,
    calls: RefCell<VecDeque<CommandCall>>,
}

impl CommandCallQueue {
    pub const EVENT_KINDS: &'static [EventKind] =
        &[EventKind::CallEnqueued, EventKind::CallDequeued];

    pub fn new(bus: Rc<EventBus>) -> Rc<Self> {
        let emitter = EmitterId::mint();
        bus.register_emitter(emitter, Self::EVENT_KINDS)
            .expect("freshly minted emitter id");
        Rc::new(Self {
            bus,
            emitter,
            calls: RefCell::new(VecDeque::new()),
        })
    }

    pub fn emitter(&self) -> EmitterId {
        self.emitter
    }

    pub fn enqueue(&self, call: CommandCall) {
        tracing::debug!(call = %call, "command call enqueued");
        self.calls.borrow_mut().push_back(call.clone());
        self.emit(Event::CallEnqueued { call });
    }

    pub fn dequeue(&self) -> Result<CommandCall, QueueError> {
        let call = self
            .calls
            .borrow_mut()
            .pop_front()
            .ok_or(QueueError::Empty)?;
        tracing::debug!(call = %call, "command call dequeued");
        self.emit(Event::CallDequeued { call: call.clone() });
        Ok(call)
    }

    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    fn emit(&self, event: Event) {
        self.bus
            .publish(self.emitter, event, DEFAULT_EVENT_PRIORITY)
            .expect("command call queue emitter registered at construction");
    }
}
