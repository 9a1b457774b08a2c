//! Textual notation for input sequences.
//!
//! Keymaps are written as strings where named keys appear bracketed (`<CR>`,
//! `<BS>`, `<Esc>`) and every other character stands for itself, so
//! `"a<CR>b<>"` reads as `a`, enter, `b`, `<`, `>`. An unrecognized bracketed
//! token is not an error; its characters are taken literally.

use crate::input::Input;

const NAMED_TOKENS: &[(&str, fn() -> Input)] = &[
    ("<CR>", Input::enter),
    ("<BS>", Input::backspace),
    ("<Esc>", Input::escape),
];

/// Parses a string holding exactly one input, or `None` if it holds anything
/// else.
pub fn parse_input(s: &str) -> Option<Input> {
    for (token, make) in NAMED_TOKENS {
        if s == *token {
            return Some(make());
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(Input::char(c)),
        _ => None,
    }
}

/// Parses a whole input sequence.
pub fn parse_inputs(s: &str) -> Vec<Input> {
    let mut inputs = Vec::new();
    let mut rest = s;

    'outer: while !rest.is_empty() {
        for (token, make) in NAMED_TOKENS {
            if let Some(remainder) = rest.strip_prefix(token) {
                inputs.push(make());
                rest = remainder;
                continue 'outer;
            }
        }

        let Some(c) = rest.chars().next() else { break };
        inputs.push(Input::char(c));
        rest = &rest[c.len_utf8()..];
    }

    inputs
}

/// Renders a sequence back into its parseable notation.
pub fn stringify_inputs(inputs: &[Input]) -> String {
    inputs.iter().map(Input::to_string).collect()
}
