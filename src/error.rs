//! Error taxonomy for the SVF parser.
//!
//! Per-command errors (everything except [`Error::Resource`]) never abort a
//! stream: the caller of [`crate::parser::SvfParser::feed`] gets them back
//! through `log` warnings and [`crate::runtime::Stats`] counters, not
//! through a hard failure. Only [`Error::Resource`] is terminal.

/// Errors the parser can encounter.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// A lone `/` not followed by a second `/` (comment start).
    #[error("lexical error: {0}")]
    Lexical(String),

    /// Dispatcher saw a word that isn't a reserved SVF command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A sub-parser's FSM rejected the input (grammar violation).
    #[error("syntax error in {command}: {detail}")]
    Syntax {
        /// Command whose sub-parser failed.
        command: &'static str,
        /// What went wrong.
        detail: String,
    },

    /// Input was syntactically fine but semantically invalid (bad end
    /// state name, ambiguous RUNTEST token, name too long).
    #[error("semantic error: {0}")]
    Semantic(String),

    /// Buffer allocation failed. Terminal: `feed` returns `-1`.
    #[error("resource error: {0}")]
    Resource(String),

    /// More hex digits arrived than the buffer could hold.
    #[error("overrun: {0} digits past the allocated buffer")]
    Overrun(usize),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
