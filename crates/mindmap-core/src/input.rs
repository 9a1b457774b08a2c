//! Classified units of user input.
//!
//! An [`Input`] is one keystroke after platform translation: either a plain
//! character or one of a small set of named keys. Equality is structural
//! (kind plus payload), which is what lets keymap tries and the free-typing
//! trigger compare symbols directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The closed set of input classifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    Backspace,
    /// A plain character; the only kind that carries a payload.
    Default,
    Enter,
    Escape,
}

/// One classified unit of user input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Input {
    kind: InputKind,
    value: Option<char>,
}

impl Input {
    /// A plain character input.
    pub fn char(c: char) -> Self {
        Self {
            kind: InputKind::Default,
            value: Some(c),
        }
    }

    pub fn enter() -> Self {
        Self {
            kind: InputKind::Enter,
            value: None,
        }
    }

    pub fn backspace() -> Self {
        Self {
            kind: InputKind::Backspace,
            value: None,
        }
    }

    pub fn escape() -> Self {
        Self {
            kind: InputKind::Escape,
            value: None,
        }
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// The character payload, present only for [`InputKind::Default`].
    pub fn value(&self) -> Option<char> {
        self.value
    }
}

impl fmt::Display for Input {
    /// Writes the parseable notation for this input (`a`, `<CR>`, `<BS>`,
    /// `<Esc>`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            InputKind::Backspace => write!(f, "<BS>"),
            InputKind::Enter => write!(f, "<CR>"),
            InputKind::Escape => write!(f, "<Esc>"),
            InputKind::Default => match self.value {
                Some(c) => write!(f, "{c}"),
                None => Ok(()),
            },
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("`{0}` is not a valid input notation")]
pub struct ParseInputError(pub String);

impl FromStr for Input {
    type Err = ParseInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::notation::parse_input(s).ok_or_else(|| ParseInputError(s.to_string()))
    }
}

// Inputs travel through config files in their notation form, not as a
// kind/payload table.
impl Serialize for Input {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Input {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural() {
        assert_eq!(Input::char('a'), Input::char('a'));
        assert_ne!(Input::char('a'), Input::char('b'));
        assert_ne!(Input::char('a'), Input::enter());
        assert_eq!(Input::enter(), Input::enter());
    }

    #[test]
    fn displays_notation() {
        assert_eq!(Input::char('a').to_string(), "a");
        assert_eq!(Input::enter().to_string(), "<CR>");
        assert_eq!(Input::backspace().to_string(), "<BS>");
        assert_eq!(Input::escape().to_string(), "<Esc>");
    }

    #[test]
    fn parses_from_str() {
        assert_eq!("x".parse::<Input>(), Ok(Input::char('x')));
        assert_eq!("<CR>".parse::<Input>(), Ok(Input::enter()));
        assert!("xx".parse::<Input>().is_err());
    }

    #[test]
    fn serde_round_trips_through_notation() {
        #[derive(Serialize, Deserialize)]
        struct Wrap {
            trigger: Input,
        }

        let toml_str = "trigger = \":\"\n";
        let wrap: Wrap = toml::from_str(toml_str).expect("deserializes");
        assert_eq!(wrap.trigger, Input::char(':'));
        assert_eq!(toml::to_string(&wrap).expect("serializes"), toml_str);

        let named: Wrap = toml::from_str("trigger = \"<CR>\"").expect("deserializes");
        assert_eq!(named.trigger, Input::enter());
    }
}
