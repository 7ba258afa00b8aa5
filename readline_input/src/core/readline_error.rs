// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::io;
use thiserror::Error;

/// Errors that end a [`crate::Session`] (faults), or reject a configuration before any
/// session starts.
///
/// Timing ambiguity while decoding (a lone `ESC`, an unexpected byte after `ESC`, a
/// timed out sequence) is never an error. The decoder always resolves it into keys.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum ReadlineError {
    /// Reading from or writing to the terminal failed.
    #[error(transparent)]
    #[diagnostic(code(readline_input::io))]
    Io(#[from] io::Error),

    /// The byte source reached end of input with nothing left to decode.
    #[error("end of input")]
    #[diagnostic(code(readline_input::eof))]
    Eof,

    /// The user asked to abandon the line (eg: `Ctrl+C`).
    #[error("interrupted")]
    #[diagnostic(code(readline_input::interrupted))]
    Interrupted,

    /// The line editor failed while handling a key or rendering.
    #[error("line editor failed: {0}")]
    #[diagnostic(code(readline_input::editor))]
    Editor(String),

    /// Terminal control (raw mode, cursor report) failed.
    #[error("terminal control failed: {0}")]
    #[diagnostic(code(readline_input::terminal))]
    Terminal(String),

    /// A configuration value was rejected when it was assigned.
    #[error("invalid configuration: {0}")]
    #[diagnostic(
        code(readline_input::invalid_config),
        help("check the keyseq timeout and the key binding overrides")
    )]
    InvalidConfig(String),

    /// A textual key binding named an action that does not exist.
    #[error("unknown editor action `{0}`")]
    #[diagnostic(code(readline_input::unknown_action))]
    UnknownAction(String),
}

impl ReadlineError {
    /// End of input or an interrupt. A REPL usually stops quietly on these.
    #[must_use]
    pub fn is_end_of_session(&self) -> bool {
        matches!(self, ReadlineError::Eof | ReadlineError::Interrupted)
    }
}

impl From<rustix::io::Errno> for ReadlineError {
    fn from(errno: rustix::io::Errno) -> Self { ReadlineError::Io(errno.into()) }
}
