// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod editor_action;
pub mod key;
pub mod readline_error;

// Re-export.
pub use editor_action::*;
pub use key::*;
pub use readline_error::*;
