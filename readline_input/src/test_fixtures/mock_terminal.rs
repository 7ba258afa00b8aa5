// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::ScriptedInput;
use crate::{ByteSource, ReadlineError, ScreenSize, TerminalGate, WaitOutcome};
use std::{io, time::Duration};

/// Mode token handed out by [`MockTerminal`]. Numbered from 1, so every
/// [`TerminalGate::prepare_raw_mode`] call is told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockModeToken(pub u32);

/// Every [`TerminalGate`] call a [`MockTerminal`] saw, reads left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateCall {
    PrepareRawMode,
    RestoreMode(MockModeToken),
    ScreenSize,
    CursorColumn,
    MoveCursorToColumn(u16),
    EraseToEndOfScreen,
    WriteStr(String),
    Flush,
}

/// A [`TerminalGate`] that reads from a [`ScriptedInput`] and records everything else.
///
/// Defaults: interactive, UTF-8, not dumb, answers the cursor query with column 1.
#[derive(Debug)]
pub struct MockTerminal {
    input: ScriptedInput,
    calls: Vec<GateCall>,
    cursor_report: Option<u16>,
    screen_size: ScreenSize,
    interactive: bool,
    dumb: bool,
    utf8: bool,
    fail_prepare: bool,
    next_token: u32,
    prepared_tokens: Vec<MockModeToken>,
    restored_tokens: Vec<MockModeToken>,
    cursor_column_queries: usize,
    written: String,
}

impl Default for MockTerminal {
    fn default() -> Self { Self::new(ScriptedInput::default()) }
}

impl MockTerminal {
    #[must_use]
    pub fn new(input: ScriptedInput) -> Self {
        Self {
            input,
            calls: vec![],
            cursor_report: Some(1),
            screen_size: ScreenSize::default(),
            interactive: true,
            dumb: false,
            utf8: true,
            fail_prepare: false,
            next_token: 1,
            prepared_tokens: vec![],
            restored_tokens: vec![],
            cursor_column_queries: 0,
            written: String::new(),
        }
    }

    /// Column to answer the cursor query with. `None` never answers.
    #[must_use]
    pub fn with_cursor_report(mut self, col: Option<u16>) -> Self {
        self.cursor_report = col;
        self
    }

    #[must_use]
    pub fn with_screen_size(mut self, screen_size: ScreenSize) -> Self {
        self.screen_size = screen_size;
        self
    }

    #[must_use]
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    #[must_use]
    pub fn with_dumb(mut self, dumb: bool) -> Self {
        self.dumb = dumb;
        self
    }

    #[must_use]
    pub fn with_utf8(mut self, utf8: bool) -> Self {
        self.utf8 = utf8;
        self
    }

    /// Make [`TerminalGate::prepare_raw_mode`] fail.
    #[must_use]
    pub fn with_fail_prepare(mut self, fail_prepare: bool) -> Self {
        self.fail_prepare = fail_prepare;
        self
    }

    #[must_use]
    pub fn calls(&self) -> &[GateCall] { &self.calls }

    #[must_use]
    pub fn prepared_tokens(&self) -> &[MockModeToken] { &self.prepared_tokens }

    #[must_use]
    pub fn restored_tokens(&self) -> &[MockModeToken] { &self.restored_tokens }

    /// Is a token out that hasn't come back?
    #[must_use]
    pub fn is_raw(&self) -> bool { self.prepared_tokens.len() > self.restored_tokens.len() }

    #[must_use]
    pub fn cursor_column_queries(&self) -> usize { self.cursor_column_queries }

    #[must_use]
    pub fn input(&self) -> &ScriptedInput { &self.input }

    /// Everything passed to [`TerminalGate::write_str`].
    #[must_use]
    pub fn written(&self) -> &str { &self.written }
}

impl ByteSource for MockTerminal {
    fn read_byte(&mut self) -> io::Result<Option<u8>> { self.input.read_byte() }

    fn read_byte_within(&mut self, timeout: Duration) -> io::Result<WaitOutcome> {
        self.input.read_byte_within(timeout)
    }
}

impl TerminalGate for MockTerminal {
    type ModeToken = MockModeToken;

    fn prepare_raw_mode(&mut self) -> Result<MockModeToken, ReadlineError> {
        self.calls.push(GateCall::PrepareRawMode);
        if self.fail_prepare {
            return Err(ReadlineError::Terminal("scripted prepare failure".into()));
        }
        let token = MockModeToken(self.next_token);
        self.next_token += 1;
        self.prepared_tokens.push(token);
        Ok(token)
    }

    fn restore_mode(&mut self, token: MockModeToken) -> Result<(), ReadlineError> {
        self.calls.push(GateCall::RestoreMode(token));
        self.restored_tokens.push(token);
        Ok(())
    }

    fn screen_size(&mut self) -> io::Result<ScreenSize> {
        self.calls.push(GateCall::ScreenSize);
        Ok(self.screen_size)
    }

    fn cursor_column(&mut self) -> Result<u16, ReadlineError> {
        self.calls.push(GateCall::CursorColumn);
        self.cursor_column_queries += 1;
        self.cursor_report
            .ok_or_else(|| ReadlineError::Terminal("no cursor position report".into()))
    }

    fn move_cursor_to_column(&mut self, col: u16) -> io::Result<()> {
        self.calls.push(GateCall::MoveCursorToColumn(col));
        Ok(())
    }

    fn erase_to_end_of_screen(&mut self) -> io::Result<()> {
        self.calls.push(GateCall::EraseToEndOfScreen);
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.calls.push(GateCall::WriteStr(text.to_owned()));
        self.written.push_str(text);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.calls.push(GateCall::Flush);
        Ok(())
    }

    fn is_interactive(&self) -> bool { self.interactive }

    fn is_dumb(&self) -> bool { self.dumb }

    fn supports_utf8(&self) -> bool { self.utf8 }
}
