//! The command controller.
//!
//! A consumer of stack events and producer of command calls. Two states:
//!
//! - `Mapping` (initial): each pushed input advances the trie cursor. A dead
//!   end clears the stack; reaching a node with a replacement either commits
//!   immediately (leaf) or arms the disambiguation timer (the node is also a
//!   prefix of a longer mapping). Committing replaces the stack contents with
//!   the replacement sequence, which is then re-resolved input by input —
//!   that is how `gg` can expand into `:center<CR>` and land in the command
//!   queue.
//! - `FreeTyping`: entered when the trigger input arrives with the cursor on
//!   the trie root. Characters accumulate in a text buffer (the trigger
//!   stays on the stack as the visible prompt); enter tokenizes the buffer
//!   into a command call, backspace retracts one character, escape aborts.
//!
//! The controller only listens while the application is in command mode.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use mindmap_core::{CommandCall, Input, InputKind};

use crate::command::CommandCallQueue;
use crate::error::BusError;
use crate::event_bus::{Event, EventBus, EventKind};
use crate::input::{InputStack, MappingTrie};
use crate::mode::{Mode, ModeHolder};
use crate::timer::{TimerId, TimerService};
use crate::user_config::{Setting, SettingsStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Mapping,
    FreeTyping,
}

pub struct CommandController {
    stack: Rc<InputStack>,
    calls: Rc<CommandCallQueue>,
    timers: Rc<TimerService>,
    trie: MappingTrie,
    free_typing_trigger: Input,
    mapping_delay: Duration,
    state: ControllerState,
    buffer: String,
    active: bool,
    pending_timer: Option<TimerId>,
}

impl CommandController {
    /// Builds the controller and wires its subscriptions: the three stack
    /// events, mode changes, and setting changes.
    pub fn new(
        bus: Rc<EventBus>,
        stack: Rc<InputStack>,
        calls: Rc<CommandCallQueue>,
        timers: Rc<TimerService>,
        trie: MappingTrie,
        mode: &ModeHolder,
        settings: &SettingsStore,
    ) -> Result<Rc<RefCell<Self>>, BusError> {
        let config = settings.snapshot();
        let stack_emitter = stack.emitter();

        let controller = Rc::new(RefCell::new(Self {
            stack,
            calls,
            timers,
            trie,
            free_typing_trigger: config.free_typing_trigger,
            mapping_delay: Duration::from_millis(config.mapping_delay_ms),
            state: ControllerState::Mapping,
            buffer: String::new(),
            active: false,
            pending_timer: None,
        }));

        {
            let weak = Rc::downgrade(&controller);
            bus.subscribe(
                stack_emitter,
                EventKind::InputPushed,
                Rc::new(move |_, event| {
                    if let (Some(this), Event::InputPushed { input }) = (weak.upgrade(), event) {
                        Self::on_input_pushed(&this, input.clone());
                    }
                }),
            )?;
        }
        {
            let weak = Rc::downgrade(&controller);
            bus.subscribe(
                stack_emitter,
                EventKind::InputPopped,
                Rc::new(move |_, _| {
                    if let Some(this) = weak.upgrade() {
                        this.borrow_mut().on_input_popped();
                    }
                }),
            )?;
        }
        {
            let weak = Rc::downgrade(&controller);
            bus.subscribe(
                stack_emitter,
                EventKind::StackCleared,
                Rc::new(move |_, _| {
                    if let Some(this) = weak.upgrade() {
                        this.borrow_mut().on_stack_cleared();
                    }
                }),
            )?;
        }
        {
            let weak = Rc::downgrade(&controller);
            bus.subscribe(
                mode.emitter(),
                EventKind::ModeSet,
                Rc::new(move |_, event| {
                    if let (Some(this), Event::ModeSet { mode }) = (weak.upgrade(), event) {
                        this.borrow_mut().on_mode_set(*mode);
                    }
                }),
            )?;
        }
        {
            let weak = Rc::downgrade(&controller);
            bus.subscribe(
                settings.emitter(),
                EventKind::SettingChanged,
                Rc::new(move |_, event| {
                    if let (Some(this), Event::SettingChanged { setting }) =
                        (weak.upgrade(), event)
                    {
                        this.borrow_mut().on_setting_changed(setting);
                    }
                }),
            )?;
        }

        Ok(controller)
    }

    pub fn add_mapping(&mut self, keys: &[Input], replacement: Vec<Input>) {
        self.trie.add_mapping(keys, replacement);
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn has_pending_timer(&self) -> bool {
        self.pending_timer.is_some()
    }

    // Takes the shared handle, not `&mut self`: the mapping path may arm a
    // timer whose callback needs a weak reference back to the controller.
    fn on_input_pushed(controller: &Rc<RefCell<Self>>, input: Input) {
        let mut this = controller.borrow_mut();
        if !this.active {
            return;
        }
        tracing::debug!(input = %input, state = ?this.state, "controller received input");

        // The trigger opens free typing only from the trie root; mid-mapping
        // it is an ordinary symbol.
        if this.trie.is_on_root()
            && this.state != ControllerState::FreeTyping
            && input == this.free_typing_trigger
        {
            this.set_state(ControllerState::FreeTyping);
            return;
        }

        match this.state {
            ControllerState::Mapping => this.process_mapping(controller, input),
            ControllerState::FreeTyping => this.process_free_typing(input),
        }
    }

    fn on_input_popped(&mut self) {
        if !self.active {
            return;
        }
        if self.stack.is_empty() {
            self.set_state(ControllerState::Mapping);
        }
    }

    fn on_stack_cleared(&mut self) {
        if !self.active {
            return;
        }
        self.set_state(ControllerState::Mapping);
    }

    fn on_mode_set(&mut self, mode: Mode) {
        self.active = mode == Mode::Command;
        tracing::debug!(%mode, active = self.active, "controller mode changed");
        if self.active {
            self.set_state(ControllerState::Mapping);
        } else {
            self.cancel_pending_timer();
        }
    }

    fn on_setting_changed(&mut self, setting: &Setting) {
        if let Setting::MappingDelayMs(delay_ms) = setting {
            self.mapping_delay = Duration::from_millis(*delay_ms);
        }
    }

    fn process_mapping(&mut self, controller: &Rc<RefCell<Self>>, input: Input) {
        if !self.trie.move_to_child(&input) {
            // Not a prefix of any mapping: discard the partial sequence. The
            // cascading `StackCleared` resets the cursor to root.
            tracing::debug!(input = %input, "no mapping edge, clearing stack");
            self.cancel_pending_timer();
            self.stack.clear();
            return;
        }

        self.cancel_pending_timer();

        let Some(replacement) = self.trie.replacement_at_cursor() else {
            // Strict prefix so far; wait for the next input.
            return;
        };
        let replacement = replacement.to_vec();

        if self.trie.can_move() {
            // Complete mapping that could still extend into a longer one:
            // hold the commit for the disambiguation delay.
            let weak = Rc::downgrade(controller);
            let id = self.timers.schedule(self.mapping_delay, move || {
                Self::commit_from_timer(weak, replacement);
            });
            tracing::debug!(timer = ?id, delay = ?self.mapping_delay, "ambiguous mapping, timer armed");
            self.pending_timer = Some(id);
        } else {
            self.commit(&replacement);
        }
    }

    /// Replaces the stack contents with `replacement`. Runs inside a drain:
    /// the cleared/pushed events are queued FIFO behind the current event,
    /// so the state reset is serviced before the replacement inputs
    /// re-enter resolution.
    fn commit(&mut self, replacement: &[Input]) {
        tracing::debug!(replacement = %mindmap_core::stringify_inputs(replacement), "committing mapping");
        self.stack.clear();
        for input in replacement {
            self.stack.push(input.clone());
        }
    }

    // Timer callbacks run outside any drain, so the controller borrow must
    // be released before touching the stack: every stack call below drains
    // synchronously back into the controller's own callbacks.
    fn commit_from_timer(weak: Weak<RefCell<Self>>, replacement: Vec<Input>) {
        let Some(controller) = weak.upgrade() else {
            return;
        };
        let stack = {
            let mut this = controller.borrow_mut();
            this.pending_timer = None;
            tracing::debug!(
                replacement = %mindmap_core::stringify_inputs(&replacement),
                "disambiguation delay elapsed, committing mapping"
            );
            Rc::clone(&this.stack)
        };
        stack.clear();
        for input in &replacement {
            stack.push(input.clone());
        }
    }

    fn process_free_typing(&mut self, input: Input) {
        match input.kind() {
            InputKind::Default => {
                if let Some(c) = input.value() {
                    self.buffer.push(c);
                }
            }
            InputKind::Enter => {
                let mut tokens = self.buffer.split_whitespace();
                if let Some(name) = tokens.next() {
                    let call = CommandCall::new(name, tokens.map(str::to_owned).collect());
                    self.calls.enqueue(call);
                }
                // A blank entry emits nothing but still leaves free typing.
                self.stack.clear();
            }
            InputKind::Backspace => {
                self.buffer.pop();
                // The stack holds the trigger, the typed characters, and the
                // backspace itself: drop the backspace plus the character it
                // deletes. Anything shorter means the prompt invariant was
                // broken externally; start over.
                if self.stack.len() >= 2 {
                    let _ = self.stack.pop();
                    let _ = self.stack.pop();
                } else {
                    self.stack.clear();
                }
            }
            InputKind::Escape => {
                self.stack.clear();
            }
        }
    }

    fn set_state(&mut self, state: ControllerState) {
        // Side effects run even when re-entering the current state: a clear
        // while already in `Mapping` must still reset the cursor.
        match state {
            ControllerState::Mapping => {
                self.cancel_pending_timer();
                self.trie.move_to_root();
            }
            ControllerState::FreeTyping => {
                self.buffer.clear();
            }
        }
        if self.state != state {
            tracing::debug!(from = ?self.state, to = ?state, "controller state change");
        }
        self.state = state;
    }

    fn cancel_pending_timer(&mut self) {
        if let Some(id) = self.pending_timer.take() {
            self.timers.cancel(id);
        }
    }
}
