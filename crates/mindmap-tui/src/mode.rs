//! Application mode.
//!
//! The mode holder is the boundary object through which the rest of the
//! application tells the input core who should be listening. The command
//! controller activates on [`Mode::Command`] and ignores stack traffic in
//! every other mode.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::event_bus::{DEFAULT_EVENT_PRIORITY, EmitterId, Event, EventBus, EventKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Waiting for the user to enter commands.
    Command,
    /// Free typing inside an editable node.
    Edit,
    /// No particular mode.
    #[default]
    Idle,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Command => write!(f, "Command"),
            Mode::Edit => write!(f, "Edit"),
            Mode::Idle => write!(f, "Idle"),
        }
    }
}

pub struct ModeHolder {
    bus: Rc<EventBus>,
    emitter: EmitterId,
    mode: Cell<Mode>,
}

impl ModeHolder {
    pub const EVENT_KINDS: &'static [EventKind] = &[EventKind::ModeSet];

    pub fn new(bus: Rc<EventBus>) -> Rc<Self> {
        let emitter = EmitterId::mint();
        bus.register_emitter(emitter, Self::EVENT_KINDS)
            .expect("freshly minted emitter id");
        Rc::new(Self {
            bus,
            emitter,
            mode: Cell::new(Mode::default()),
        })
    }

    pub fn emitter(&self) -> EmitterId {
        self.emitter
    }

    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    /// Stores `mode` and notifies subscribers, even when the mode did not
    /// change.
    pub fn set_mode(&self, mode: Mode) {
        tracing::debug!(%mode, "mode set");
        self.mode.set(mode);
        self.bus
            .publish(self.emitter, Event::ModeSet { mode }, DEFAULT_EVENT_PRIORITY)
            .expect("mode holder emitter registered at construction");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn set_mode_notifies_subscribers() {
        let bus = Rc::new(EventBus::new());
        let holder = ModeHolder::new(Rc::clone(&bus));
        assert_eq!(holder.mode(), Mode::Idle);

        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen2 = Rc::clone(&seen);
            bus.subscribe(
                holder.emitter(),
                EventKind::ModeSet,
                Rc::new(move |_, event| {
                    if let Event::ModeSet { mode } = event {
                        seen2.borrow_mut().push(*mode);
                    }
                }),
            )
            .unwrap();
        }

        holder.set_mode(Mode::Command);
        holder.set_mode(Mode::Command);
        holder.set_mode(Mode::Edit);
        assert_eq!(holder.mode(), Mode::Edit);
        assert_eq!(*seen.borrow(), vec![Mode::Command, Mode::Command, Mode::Edit]);
    }
}
