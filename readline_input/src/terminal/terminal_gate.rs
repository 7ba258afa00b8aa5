// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ByteSource, EditingMode, KeyBindingTable, ReadlineError,
            ansi_default_bindings};
use std::{fmt::Debug, io};

/// Terminal dimensions, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenSize {
    pub rows: u16,
    pub cols: u16,
}

impl Default for ScreenSize {
    fn default() -> Self { Self { rows: 24, cols: 80 } }
}

/// Everything a [`crate::Session`] needs from the terminal it runs on.
///
/// Reading bytes comes from the [`ByteSource`] supertrait. The rest is mode control
/// (raw mode in, original mode back), cursor queries and output.
pub trait TerminalGate: ByteSource {
    /// Captured by [`prepare_raw_mode`](Self::prepare_raw_mode), handed back to
    /// [`restore_mode`](Self::restore_mode) exactly once.
    type ModeToken: Debug;

    /// Switch to raw mode and return what is needed to undo it.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::Terminal`] if the terminal attributes can't be read or set.
    fn prepare_raw_mode(&mut self) -> Result<Self::ModeToken, ReadlineError>;

    /// Put the terminal back the way `token` says.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::Terminal`] if the terminal attributes can't be set.
    fn restore_mode(&mut self, token: Self::ModeToken) -> Result<(), ReadlineError>;

    /// # Errors
    ///
    /// Any I/O error while asking the terminal for its size.
    fn screen_size(&mut self) -> io::Result<ScreenSize>;

    /// 0 based column the cursor is in.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::Terminal`] if the terminal doesn't answer.
    fn cursor_column(&mut self) -> Result<u16, ReadlineError>;

    /// # Errors
    ///
    /// Any I/O error while writing to the terminal.
    fn move_cursor_to_column(&mut self, col: u16) -> io::Result<()>;

    /// # Errors
    ///
    /// Any I/O error while writing to the terminal.
    fn erase_to_end_of_screen(&mut self) -> io::Result<()>;

    /// # Errors
    ///
    /// Any I/O error while writing to the terminal.
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    /// # Errors
    ///
    /// Any I/O error while writing to the terminal.
    fn flush(&mut self) -> io::Result<()>;

    /// Are both ends attached to a terminal a human is typing into?
    fn is_interactive(&self) -> bool;

    /// No cursor control at all (`TERM=dumb`, or not a terminal).
    fn is_dumb(&self) -> bool { false }

    /// Can the output encode non-ASCII glyphs?
    fn supports_utf8(&self) -> bool { true }

    /// Multi-byte key sequences this terminal sends, for `mode`.
    fn default_key_bindings(&self, mode: EditingMode) -> KeyBindingTable {
        ansi_default_bindings(mode)
    }
}
