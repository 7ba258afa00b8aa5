// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! One editing session ([`Session`]) and the long lived owner that runs them
//! ([`Readline`]).

// Attach sources.
pub mod ambiguous_width;
pub mod history;
pub mod line_editor;
pub mod readline;
pub mod session_orchestrator;

// Re-export.
pub use ambiguous_width::*;
pub use history::*;
pub use line_editor::*;
pub use readline::*;
pub use session_orchestrator::*;
