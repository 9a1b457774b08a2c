//! Resolved command calls.

use std::fmt;

/// A command name plus its arguments, ready to be handed to an executor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandCall {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandCall {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for CommandCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_name_and_args() {
        let call = CommandCall::new("save", vec!["file.json".into()]);
        assert_eq!(call.to_string(), "save file.json");
        assert_eq!(CommandCall::new("quit", vec![]).to_string(), "quit");
    }
}
