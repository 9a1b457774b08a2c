//! Error taxonomy for the event/input core.
//!
//! Bus errors are contract violations by the calling code, not runtime
//! conditions; nothing in here is retried. Dead ends in the mapping trie are
//! deliberately *not* errors — they are valid input, handled by clearing
//! state.

use thiserror::Error;

use crate::event_bus::{EmitterId, EventKind};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    /// `register_emitter` was called twice for the same identity without an
    /// intervening teardown.
    #[error("{0} is already registered")]
    DuplicateEmitter(EmitterId),
    #[error("{0} was never registered")]
    UnregisteredEmitter(EmitterId),
    #[error("{0} does not declare {1:?} events")]
    UnsupportedKind(EmitterId, EventKind),
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum StackError {
    #[error("pop on an empty input stack")]
    Empty,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("dequeue on an empty command call queue")]
    Empty,
}
