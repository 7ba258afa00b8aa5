// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ByteSource, EditingMode, KeyBindingTable, ReadlineError, ScreenSize,
            TerminalGate, WaitOutcome};
use std::{io::{self, Read, Stdin, Stdout, Write},
          time::Duration};

/// [`TerminalGate`] for input and output that are not a terminal: pipes, files, or in
/// memory buffers.
///
/// - There is no raw mode, so the mode token is `()`.
/// - Nobody is typing, so there is no timing to disambiguate with. Bounded waits are
///   plain reads.
/// - Cursor movement and erasing are skipped so the output stays clean text.
/// - No multi-byte key bindings are installed.
#[derive(Debug)]
pub struct GeneralIo<R, W> {
    input: R,
    output: W,
}

impl GeneralIo<Stdin, Stdout> {
    #[must_use]
    pub fn stdio() -> Self { Self::new(io::stdin(), io::stdout()) }
}

impl<R: Read, W: Write> GeneralIo<R, W> {
    #[must_use]
    pub fn new(input: R, output: W) -> Self { Self { input, output } }

    pub fn output(&self) -> &W { &self.output }

    pub fn into_output(self) -> W { self.output }
}

impl<R: Read, W: Write> ByteSource for GeneralIo<R, W> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0_u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn read_byte_within(&mut self, _timeout: Duration) -> io::Result<WaitOutcome> {
        Ok(match self.read_byte()? {
            Some(byte) => WaitOutcome::Byte(byte),
            None => WaitOutcome::Eof,
        })
    }
}

impl<R: Read, W: Write> TerminalGate for GeneralIo<R, W> {
    type ModeToken = ();

    fn prepare_raw_mode(&mut self) -> Result<(), ReadlineError> { Ok(()) }

    fn restore_mode(&mut self, _token: ()) -> Result<(), ReadlineError> { Ok(()) }

    fn screen_size(&mut self) -> io::Result<ScreenSize> { Ok(ScreenSize::default()) }

    fn cursor_column(&mut self) -> Result<u16, ReadlineError> {
        Err(ReadlineError::Terminal(
            "cursor position is unknown without a terminal".into(),
        ))
    }

    fn move_cursor_to_column(&mut self, _col: u16) -> io::Result<()> { Ok(()) }

    fn erase_to_end_of_screen(&mut self) -> io::Result<()> { Ok(()) }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> { self.output.flush() }

    fn is_interactive(&self) -> bool { false }

    fn is_dumb(&self) -> bool { true }

    fn default_key_bindings(&self, _mode: EditingMode) -> KeyBindingTable {
        KeyBindingTable::new()
    }
}
