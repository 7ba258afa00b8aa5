// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{AmbiguousWidth, ConfirmMultilineTermination, History, Hooks, Key,
            ReadlineError, ScreenSize};

/// What the session learned about the terminal before the first key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminalInfo {
    pub ambiguous_width: AmbiguousWidth,
    pub screen_size: ScreenSize,
}

/// The line editing model a [`crate::Session`] feeds keys into.
///
/// The session owns the terminal and the decode loop. The editor owns the buffer, the
/// cursor, and what gets drawn.
pub trait LineEditor {
    /// Start a fresh line.
    fn reset(&mut self, prompt: &str, multiline: bool);

    fn set_hooks(&mut self, _hooks: &Hooks) {}

    fn set_multiline_confirm(&mut self, _confirm: Option<ConfirmMultilineTermination>) {}

    fn set_terminal_info(&mut self, _info: TerminalInfo) {}

    /// Lines the user can recall with the history actions. Called by
    /// [`crate::Readline`] before each session.
    fn set_history(&mut self, _history: &History) {}

    /// # Errors
    ///
    /// Any error here ends the session. [`ReadlineError::Interrupted`] and
    /// [`ReadlineError::Eof`] are the polite ways for the user to leave.
    fn input_key(&mut self, key: Key) -> Result<(), ReadlineError>;

    /// # Errors
    ///
    /// Any error here ends the session.
    fn rerender(&mut self) -> Result<(), ReadlineError>;

    fn is_finished(&self) -> bool;

    /// Called once, on every exit path, with the cursor at column 0.
    fn finalize(&mut self);

    /// The buffer, once the session is over.
    fn line(&self) -> String;

    /// Did the line end because the user asked for end of input (eg: `Ctrl+D` on an
    /// empty line)?
    fn is_eof(&self) -> bool { false }
}
