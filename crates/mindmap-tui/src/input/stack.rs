//! The input symbol stack.
//!
//! Holds the ordered sequence of inputs not yet resolved into a command and
//! emits `InputPushed` / `InputPopped` / `StackCleared` through the bus. All
//! three are published at the same (configurable) priority: cascades of
//! stack events must stay FIFO relative to each other or a commit could see
//! its replacement pushes serviced before the clear that precedes them.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mindmap_core::Input;

use crate::error::StackError;
use crate::event_bus::{EmitterId, Event, EventBus, EventKind};

pub struct InputStack {
    bus: Rc<EventBus>,
    emitter: EmitterId,
    inputs: RefCell<Vec<Input>>,
    event_priority: Cell<i32>,
}

impl InputStack {
    pub const EVENT_KINDS: &'static [EventKind] = &[
        EventKind::InputPushed,
        EventKind::InputPopped,
        EventKind::StackCleared,
    ];

    pub fn new(bus: Rc<EventBus>, event_priority: i32) -> Rc<Self> {
        let emitter = EmitterId::mint();
        bus.register_emitter(emitter, Self::EVENT_KINDS)
            .expect("freshly minted emitter id");
        Rc::new(Self {
            bus,
            emitter,
            inputs: RefCell::new(Vec::new()),
            event_priority: Cell::new(event_priority),
        })
    }

    pub fn emitter(&self) -> EmitterId {
        self.emitter
    }

    pub fn push(&self, input: Input) {
        tracing::debug!(input = %input, "input pushed");
        self.inputs.borrow_mut().push(input.clone());
        self.emit(Event::InputPushed { input });
    }

    pub fn pop(&self) -> Result<Input, StackError> {
        let input = self.inputs.borrow_mut().pop().ok_or(StackError::Empty)?;
        tracing::debug!(input = %input, "input popped");
        self.emit(Event::InputPopped {
            input: input.clone(),
        });
        Ok(input)
    }

    /// Empties the stack and emits exactly one `StackCleared`, even when the
    /// stack was already empty.
    pub fn clear(&self) {
        self.inputs.borrow_mut().clear();
        tracing::debug!("input stack cleared");
        self.emit(Event::StackCleared);
    }

    pub fn len(&self) -> usize {
        self.inputs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.borrow().is_empty()
    }

    /// Snapshot of the current contents, bottom first.
    pub fn contents(&self) -> Vec<Input> {
        self.inputs.borrow().clone()
    }

    pub fn event_priority(&self) -> i32 {
        self.event_priority.get()
    }

    pub fn set_event_priority(&self, priority: i32) {
        self.event_priority.set(priority);
    }

    // The stack registered itself at construction and only raises declared
    // kinds, so a publish failure is unreachable.
    fn emit(&self, event: Event) {
        self.bus
            .publish(self.emitter, event, self.event_priority.get())
            .expect("input stack emitter registered at construction");
    }
}
