// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`TerminalGate`] for a real Unix terminal, using rustix's safe termios and `poll()`
//! APIs.
//!
//! ## Reading bytes
//!
//! Input is read straight from the file descriptor, one byte per `read()`, with no
//! userspace buffer in between. The bounded wait calls `poll()` first and only reads
//! once the descriptor is readable. A wait that times out leaves the kernel queue
//! untouched, so a byte that arrives late is picked up by the next read.
//!
//! ## Cursor reports
//!
//! [`cursor_column`](TerminalGate::cursor_column) writes `ESC [ 6 n` and reads the
//! terminal's answer from the same input stream the user types into. Bytes that come in
//! around the report are kept and handed out by later reads, in order.

use crate::{ByteSource, CursorReportReader, DSR_CURSOR_POSITION, DEBUG_READLINE_INPUT,
            ReadlineError, ScreenSize, TerminalGate, WaitOutcome};
use crossterm::{cursor::MoveToColumn,
                queue,
                terminal::{Clear, ClearType}};
use rustix::{event::{PollFd, PollFlags, Timespec, poll},
             fd::{AsFd, BorrowedFd},
             io::Errno,
             termios::{self, OptionalActions, Termios}};
use std::{collections::VecDeque,
          env,
          fs::File,
          io::{self, Stdout, Write},
          time::{Duration, Instant}};

/// How long to wait for the terminal to answer a cursor position request.
pub const CURSOR_REPORT_TIMEOUT: Duration = Duration::from_millis(500);

/// Give up on a cursor report after reading this many bytes without one.
pub const CURSOR_REPORT_MAX_BYTES: usize = 64;

/// Either stdin or `/dev/tty`.
///
/// When stdin is redirected (eg: `echo "data" | your_app`) the controlling terminal is
/// still reachable through `/dev/tty`.
#[derive(Debug)]
enum TerminalFd {
    Stdin(io::Stdin),
    DevTty(File),
}

impl AsFd for TerminalFd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match self {
            TerminalFd::Stdin(stdin) => stdin.as_fd(),
            TerminalFd::DevTty(file) => file.as_fd(),
        }
    }
}

/// Stdin if it is a tty, otherwise `/dev/tty`.
fn get_terminal_fd() -> io::Result<TerminalFd> {
    let stdin = io::stdin();
    if termios::isatty(&stdin) {
        Ok(TerminalFd::Stdin(stdin))
    } else {
        let file = File::options().read(true).write(true).open("/dev/tty")?;
        Ok(TerminalFd::DevTty(file))
    }
}

/// Terminal attributes from before raw mode was switched on.
#[derive(Debug, Clone)]
pub struct AnsiModeToken {
    original: Termios,
}

/// A Unix terminal: input from stdin (or `/dev/tty`), output to stdout.
#[derive(Debug)]
pub struct AnsiTerminal {
    input: TerminalFd,
    output: Stdout,
    /// Bytes read while looking for a cursor report that weren't part of it.
    pending: VecDeque<u8>,
}

impl AnsiTerminal {
    /// # Errors
    ///
    /// Returns an error if stdin is not a tty and `/dev/tty` can't be opened.
    pub fn try_new() -> miette::Result<Self> {
        let input = get_terminal_fd()
            .map_err(|e| miette::miette!("failed to get terminal file descriptor: {e}"))?;
        Ok(Self {
            input,
            output: io::stdout(),
            pending: VecDeque::new(),
        })
    }

    fn read_from_fd(&self) -> io::Result<Option<u8>> {
        let mut buf = [0_u8; 1];
        loop {
            match rustix::io::read(&self.input, &mut buf[..]) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(Errno::INTR) => {}
                Err(errno) => return Err(errno.into()),
            }
        }
    }

    /// `true` if the input is readable before `timeout` passes. Never reads.
    fn poll_readable(&self, timeout: Duration) -> io::Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let timespec = Timespec {
                tv_sec: remaining.as_secs().try_into().unwrap_or(i64::MAX),
                tv_nsec: remaining.subsec_nanos().into(),
            };
            let mut fds = [PollFd::new(&self.input, PollFlags::IN)];
            match poll(&mut fds, Some(&timespec)) {
                Ok(0) => return Ok(false),
                Ok(_) => return Ok(true),
                Err(Errno::INTR) => {}
                Err(errno) => return Err(errno.into()),
            }
        }
    }

    /// Read bytes until a whole cursor report shows up, stashing everything else.
    fn read_cursor_report(&mut self) -> Result<u16, ReadlineError> {
        let deadline = Instant::now() + CURSOR_REPORT_TIMEOUT;
        let mut reader = CursorReportReader::default();
        let mut read = 0;

        while read < CURSOR_REPORT_MAX_BYTES {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.poll_readable(remaining)? {
                break;
            }
            let Some(byte) = self.read_from_fd()? else {
                break;
            };
            read += 1;

            if let Some(position) = reader.push(byte, &mut self.pending) {
                return Ok(position.col.saturating_sub(1));
            }
        }

        self.pending.extend(reader.into_unfinished());
        Err(ReadlineError::Terminal(format!(
            "no cursor position report after {read} bytes"
        )))
    }
}

impl ByteSource for AnsiTerminal {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self.pending.pop_front() {
            Some(byte) => Ok(Some(byte)),
            None => self.read_from_fd(),
        }
    }

    fn read_byte_within(&mut self, timeout: Duration) -> io::Result<WaitOutcome> {
        if let Some(byte) = self.pending.pop_front() {
            return Ok(WaitOutcome::Byte(byte));
        }
        if !self.poll_readable(timeout)? {
            return Ok(WaitOutcome::Elapsed);
        }
        Ok(match self.read_from_fd()? {
            Some(byte) => WaitOutcome::Byte(byte),
            None => WaitOutcome::Eof,
        })
    }
}

impl TerminalGate for AnsiTerminal {
    type ModeToken = AnsiModeToken;

    fn prepare_raw_mode(&mut self) -> Result<AnsiModeToken, ReadlineError> {
        let mut termios = termios::tcgetattr(&self.input).map_err(|e| {
            ReadlineError::Terminal(format!("failed to retrieve terminal attributes: {e}"))
        })?;
        let original = termios.clone();

        // Same as cfmakeraw: no canonical mode, no echo, no signals, VMIN=1 VTIME=0.
        termios.make_raw();

        termios::tcsetattr(&self.input, OptionalActions::Now, &termios).map_err(|e| {
            ReadlineError::Terminal(format!("failed to set terminal attributes: {e}"))
        })?;

        DEBUG_READLINE_INPUT.then(|| {
            tracing::debug!(message = "raw mode on");
        });
        Ok(AnsiModeToken { original })
    }

    fn restore_mode(&mut self, token: AnsiModeToken) -> Result<(), ReadlineError> {
        termios::tcsetattr(&self.input, OptionalActions::Now, &token.original).map_err(
            |e| ReadlineError::Terminal(format!("failed to restore terminal attributes: {e}")),
        )?;
        DEBUG_READLINE_INPUT.then(|| {
            tracing::debug!(message = "raw mode off");
        });
        Ok(())
    }

    fn screen_size(&mut self) -> io::Result<ScreenSize> {
        let (cols, rows) = crossterm::terminal::size()?;
        Ok(ScreenSize { rows, cols })
    }

    fn cursor_column(&mut self) -> Result<u16, ReadlineError> {
        self.output.write_all(DSR_CURSOR_POSITION.as_bytes())?;
        self.output.flush()?;
        self.read_cursor_report()
    }

    fn move_cursor_to_column(&mut self, col: u16) -> io::Result<()> {
        queue!(self.output, MoveToColumn(col))?;
        self.output.flush()
    }

    fn erase_to_end_of_screen(&mut self) -> io::Result<()> {
        queue!(self.output, Clear(ClearType::FromCursorDown))?;
        self.output.flush()
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> { self.output.flush() }

    fn is_interactive(&self) -> bool {
        termios::isatty(&self.input) && termios::isatty(&self.output)
    }

    fn is_dumb(&self) -> bool { env::var("TERM").is_ok_and(|term| term == "dumb") }

    fn supports_utf8(&self) -> bool { locale_is_utf8(|name| env::var(name).ok()) }
}

/// Does the locale select UTF-8? The first of `LC_ALL`, `LC_CTYPE`, `LANG` that is set
/// and non empty decides. No locale at all means the C locale, which is not UTF-8.
pub fn locale_is_utf8(lookup: impl Fn(&str) -> Option<String>) -> bool {
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .into_iter()
        .filter_map(lookup)
        .find(|value| !value.is_empty())
        .is_some_and(|value| {
            let value = value.to_ascii_lowercase();
            value.contains("utf-8") || value.contains("utf8")
        })
}
