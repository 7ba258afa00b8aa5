// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A minimal [`crate::LineEditor`] for demos and tests. Real REPLs bring their own.

// Attach sources.
pub mod basic_line_editor;
pub mod line_state;

// Re-export.
pub use basic_line_editor::*;
pub use line_state::*;
