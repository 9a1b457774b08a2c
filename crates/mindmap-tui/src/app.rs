//! Application wiring.
//!
//! Builds the bus, timer service, stack, trie, queue, mode holder, and
//! controller from a [`UserConfig`] and connects them. The process entry
//! point and integration tests drive the resulting [`App`] the same way:
//! feed key events in, pump timers, read command calls out.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crossterm::event::KeyEvent;
use mindmap_core::parse_inputs;

use crate::command::CommandCallQueue;
use crate::controller::CommandController;
use crate::error::BusError;
use crate::event_bus::{Event, EventBus, EventKind};
use crate::input::keyboard::translate_key;
use crate::input::{InputStack, MappingTrie};
use crate::mode::{Mode, ModeHolder};
use crate::timer::TimerService;
use crate::user_config::{Setting, SettingsStore, UserConfig};

pub struct App {
    pub bus: Rc<EventBus>,
    pub timers: Rc<TimerService>,
    pub stack: Rc<InputStack>,
    pub calls: Rc<CommandCallQueue>,
    pub mode: Rc<ModeHolder>,
    pub settings: Rc<SettingsStore>,
    pub controller: Rc<RefCell<CommandController>>,
}

impl App {
    /// Wires the full input core and switches into command mode.
    pub fn new(config: UserConfig) -> Result<Self, BusError> {
        let bus = Rc::new(EventBus::new());
        let timers = Rc::new(TimerService::new());
        let settings = SettingsStore::new(Rc::clone(&bus), config);

        let snapshot = settings.snapshot();
        let stack = InputStack::new(Rc::clone(&bus), snapshot.input_event_priority);
        let calls = CommandCallQueue::new(Rc::clone(&bus));
        let mode = ModeHolder::new(Rc::clone(&bus));

        let mut trie = MappingTrie::new();
        for keymap in &snapshot.keymaps {
            trie.add_mapping(&parse_inputs(&keymap.keys), parse_inputs(&keymap.replacement));
        }

        let controller = CommandController::new(
            Rc::clone(&bus),
            Rc::clone(&stack),
            Rc::clone(&calls),
            Rc::clone(&timers),
            trie,
            &mode,
            &settings,
        )?;

        // The stack follows priority changes live; the controller handles
        // its own keys in the same way.
        {
            let weak_stack = Rc::downgrade(&stack);
            bus.subscribe(
                settings.emitter(),
                EventKind::SettingChanged,
                Rc::new(move |_, event| {
                    if let (
                        Some(stack),
                        Event::SettingChanged {
                            setting: Setting::InputEventPriority(priority),
                        },
                    ) = (weak_stack.upgrade(), event)
                    {
                        stack.set_event_priority(*priority);
                    }
                }),
            )?;
        }

        mode.set_mode(Mode::Command);

        Ok(Self {
            bus,
            timers,
            stack,
            calls,
            mode,
            settings,
            controller,
        })
    }

    /// Translates and pushes one key event; untranslatable keys are dropped.
    pub fn push_key(&self, key: &KeyEvent) {
        if let Some(input) = translate_key(key) {
            self.stack.push(input);
        }
    }

    /// One host-loop iteration: fire due timers, then settle the bus.
    pub fn pump(&self, now: Instant) {
        self.timers.fire_due(now);
        self.bus.settle();
    }

    /// How long the host may sleep before the next pump.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }
}
