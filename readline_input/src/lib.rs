// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # Key-stroke decoding for terminal line editors
//!
//! This crate is the input layer of a line-editing library used to build REPLs. It
//! turns the raw, unbuffered byte stream of a terminal into [`Key`] events, and drives
//! the read / decode / render loop of one editing session until the line editor says it
//! is done.
//!
//! ```text
//! ┌──────────────┐ bytes ┌──────────────┐ Vec<Key> ┌──────────────┐
//! │ TerminalGate │──────▶│ InputDecoder │─────────▶│  LineEditor  │
//! │ (ByteSource) │       │  + matcher   │          │  (external)  │
//! └──────────────┘       └──────────────┘          └──────────────┘
//!        ▲                                                 │
//!        └──────────── Session (raw mode, restore) ────────┘
//! ```
//!
//! ## The hard part: ESC
//!
//! A terminal sends `Alt+x` as `ESC x`, an arrow key as `ESC [ A`, and the ESC key
//! itself as a lone `ESC`. Bytes do not say which one you are looking at, only timing
//! does. [`InputDecoder`] matches bytes against a [`KeyBindingTable`] and, when the first
//! byte of a sequence is ambiguous, races the next read against the configured
//! `keyseq_timeout`:
//!
//! - A burst arriving inside the window is one sequence (arrow key, `Alt+x`).
//! - Nothing inside the window means the user pressed the key on its own.
//!
//! Only the *second* byte of a sequence is time bounded. Every other read blocks.
//!
//! The bounded wait is a [`ByteSource::read_byte_within`] call that returns a plain
//! [`WaitOutcome`]. On a real terminal it polls the file descriptor and reads only when
//! a byte is ready, so a byte that arrives after the deadline is never swallowed: it
//! simply becomes the first byte of the next decode cycle.
//!
//! ## Sessions and terminal restoration
//!
//! [`Session`] puts the terminal in raw mode, keeps the captured mode token, and hands
//! it back to the terminal exactly once, whether the session finishes normally, a fault
//! propagates out of the decoder or the line editor, or the session is dropped while
//! unwinding. [`Readline`] is the explicitly constructed owner of a terminal gate,
//! configuration, hooks and history that runs one [`Session`] per call.
//!
//! ## Usage
//!
//! ```no_run
//! # #[cfg(unix)]
//! # fn main() -> miette::Result<()> {
//! use readline_input::{AnsiTerminal, BasicLineEditor, Readline, ReadlineConfig};
//!
//! let gate = AnsiTerminal::try_new()?;
//! let mut readline = Readline::try_new(gate, ReadlineConfig::default())?;
//! let mut editor = BasicLineEditor::new(std::io::stdout());
//! let line = readline.readline(&mut editor, "> ", true)?;
//! println!("{line}");
//! # Ok(())
//! # }
//! # #[cfg(not(unix))]
//! # fn main() {}
//! ```

// Production code must propagate errors; tests may unwrap.
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

/// Enable or disable `tracing` output for the decode loop and the session lifecycle.
pub const DEBUG_READLINE_INPUT: bool = true;

// Attach sources.
pub mod config;
pub mod core;
pub mod input;
pub mod keymap;
pub mod line_buffer;
pub mod log;
pub mod session;
pub mod terminal;
pub mod test_fixtures;

// Re-export.
pub use config::*;
pub use core::*;
pub use input::*;
pub use keymap::*;
pub use line_buffer::*;
pub use log::*;
pub use session::*;
pub use terminal::*;
