//! Event bus and modal input resolution for the mindmap editor.
//!
//! The crate is built around one correctness property: a single logical
//! thread of control drives an [`EventBus`] whose drain loop is the only
//! place callbacks run. Publishing from inside a callback enqueues, it never
//! recurses, so every cascade settles in priority order before control
//! returns to the original publisher. On top of the bus sit the input symbol
//! stack, the prefix mapping trie, and the [`controller::CommandController`]
//! that turns ambiguous key sequences into command calls with a timed
//! disambiguation window.

pub mod app;
pub mod command;
pub mod controller;
pub mod error;
pub mod event_bus;
pub mod input;
pub mod mode;
pub mod timer;
pub mod tracing_setup;
pub mod user_config;

pub use event_bus::*;
