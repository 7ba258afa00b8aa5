// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Fakes for driving the decoder and the session without a real terminal. Time is
//! virtual: a scripted pause is "waited" for without sleeping.

// Attach sources.
pub mod mock_terminal;
pub mod recording_line_editor;
pub mod scripted_input;

// Re-export.
pub use mock_terminal::*;
pub use recording_line_editor::*;
pub use scripted_input::*;
