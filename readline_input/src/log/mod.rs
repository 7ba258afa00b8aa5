// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Opt-in `tracing` setup for programs built on this crate.
//!
//! The line being edited owns stdout, so logs normally go to a file (or stderr). Nothing
//! here runs unless the program calls [`try_initialize_logging_global`] or
//! [`try_initialize_logging_thread_local`].

// Attach sources.
pub mod rolling_file_appender_impl;
pub mod tracing_config;
pub mod tracing_init;

// Re-export.
pub use tracing_config::*;
pub use tracing_init::*;
