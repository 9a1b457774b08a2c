//! Input-side components: the symbol stack, the prefix mapping trie, and the
//! keyboard translation edge.

pub mod keyboard;
pub mod stack;
pub mod trie;

pub use stack::InputStack;
pub use trie::MappingTrie;
