//! `STATE` sub-parser (spec §4.5): a whitespace-separated list of TAP
//! state names, destination last.
//!
//! Grounded on `cmd_state()` in the original C implementation, which
//! records the full list (`statename[]`) even though only the destination
//! is load-bearing for anything the core itself drives — full TAP
//! pathfinding is explicitly out of scope (spec §1 Non-goals). The full
//! path is still exposed on [`crate::runtime::RuntimeState::state_path`]
//! since it's present in the original and useful to whatever TAP walker
//! a HAL implementation wants to bring.

use crate::error::Error;
use crate::tap::TapState;

#[derive(Debug, Clone)]
pub struct StatePathParser {
    name_buf: String,
    path: Vec<TapState>,
}

impl Default for StatePathParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatePathParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name_buf: String::new(),
            path: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub fn path(&self) -> &[TapState] {
        &self.path
    }

    pub fn feed(&mut self, c: char, tap_name_maxlen: usize) -> Result<(), Error> {
        if c == ' ' {
            self.commit_name()
        } else if c.is_ascii_alphabetic() {
            if self.name_buf.len() >= tap_name_maxlen {
                return Err(Error::Semantic(format!(
                    "TAP state name longer than {tap_name_maxlen} chars"
                )));
            }
            self.name_buf.push(c);
            Ok(())
        } else {
            Err(Error::Syntax {
                command: "STATE",
                detail: format!("unexpected '{c}' in state name"),
            })
        }
    }

    fn commit_name(&mut self) -> Result<(), Error> {
        if self.name_buf.is_empty() {
            return Ok(());
        }
        let state = TapState::from_name(&self.name_buf)
            .ok_or_else(|| Error::Semantic(format!("unknown TAP state '{}'", self.name_buf)))?;
        self.path.push(state);
        self.name_buf.clear();
        Ok(())
    }

    /// Commit a trailing name with no separator before `;`.
    pub fn finish(&mut self) -> Result<(), Error> {
        self.commit_name()
    }

    #[must_use]
    pub fn destination(&self) -> Option<TapState> {
        self.path.last().copied()
    }
}
