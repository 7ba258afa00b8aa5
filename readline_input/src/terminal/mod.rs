// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Terminal gates: the mode, cursor and output control a session needs, on top of a
//! [`crate::ByteSource`].
//!
//! - [`AnsiTerminal`] drives a real Unix terminal.
//! - [`GeneralIo`] is the fallback for anything that isn't a terminal (pipes, files,
//!   buffers).

// Attach sources.
pub mod cursor_report;
pub mod general_io;
pub mod terminal_gate;

#[cfg(unix)]
pub mod ansi_terminal;

// Re-export.
pub use cursor_report::*;
pub use general_io::*;
pub use terminal_gate::*;

#[cfg(unix)]
pub use ansi_terminal::*;
