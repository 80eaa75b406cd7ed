//! Player command parsing
//!
//! Only one verb reaches the combat core: `attack <target>` (alias `kill`).

use thiserror::Error;

use crate::combat::CombatError;

/// Command errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    UnknownVerb(String),

    #[error(transparent)]
    Combat(#[from] CombatError),
}

/// A parsed player command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Attack whatever answers to `target` in the current room
    Attack { target: Option<String> },
}

impl Command {
    /// Parse a raw command line
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        if verb.is_empty() {
            return Err(CommandError::Empty);
        }

        match verb.to_lowercase().as_str() {
            "attack" | "kill" => Ok(Command::Attack {
                target: (!rest.is_empty()).then(|| rest.to_string()),
            }),
            _ => Err(CommandError::UnknownVerb(verb.to_string())),
        }
    }
}
