//! Shared value types for the mindmap project.
//!
//! Everything in here is a plain value with no knowledge of the event system:
//! classified input symbols, the textual notation they are written in inside
//! keymaps (`"a<CR>b"`), and resolved command calls. The event/input machinery
//! lives in `mindmap-tui` and builds on these types.

pub mod command;
pub mod input;
pub mod notation;

pub use command::CommandCall;
pub use input::{Input, InputKind, ParseInputError};
pub use notation::{parse_input, parse_inputs, stringify_inputs};
