//! Prefix mapping trie.
//!
//! Maps input sequences to replacement sequences, navigable symbol by symbol
//! through a cursor. Nodes live in an arena indexed by `usize`; edges are
//! keyed by the full input (kind plus payload).

use fxhash::FxHashMap;
use mindmap_core::Input;

const ROOT: usize = 0;

#[derive(Default)]
struct TrieNode {
    replacement: Option<Vec<Input>>,
    children: FxHashMap<Input, usize>,
}

pub struct MappingTrie {
    nodes: Vec<TrieNode>,
    cursor: usize,
}

impl MappingTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            cursor: ROOT,
        }
    }

    /// Walks/creates nodes for `keys` and stores `replacement` at the
    /// terminal node. Redefining a mapping is not an error: the last writer
    /// wins, and intermediate nodes are never touched.
    pub fn add_mapping(&mut self, keys: &[Input], replacement: Vec<Input>) {
        let mut node = ROOT;
        for key in keys {
            node = match self.nodes[node].children.get(key) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(key.clone(), child);
                    child
                }
            };
        }
        self.nodes[node].replacement = Some(replacement);
    }

    /// Advances the cursor along the edge labeled `input`. Returns whether it
    /// moved; the cursor is unchanged when no such edge exists.
    pub fn move_to_child(&mut self, input: &Input) -> bool {
        match self.nodes[self.cursor].children.get(input) {
            Some(&child) => {
                self.cursor = child;
                true
            }
            None => false,
        }
    }

    /// True iff the current node is a strict prefix of at least one longer
    /// mapping.
    pub fn can_move(&self) -> bool {
        !self.nodes[self.cursor].children.is_empty()
    }

    pub fn is_on_root(&self) -> bool {
        self.cursor == ROOT
    }

    pub fn move_to_root(&mut self) {
        self.cursor = ROOT;
    }

    pub fn replacement_at_cursor(&self) -> Option<&[Input]> {
        self.nodes[self.cursor].replacement.as_deref()
    }
}

impl Default for MappingTrie {
    fn default() -> Self {
        Self::new()
    }
}
