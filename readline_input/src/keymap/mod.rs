// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Key binding tables and the prefix matcher that runs over them.

// Attach sources.
pub mod default_bindings;
pub mod editing_mode;
pub mod key_binding_table;
pub mod key_sequence_matcher;
pub mod keyseq_notation;

// Re-export.
pub use default_bindings::*;
pub use editing_mode::*;
pub use key_binding_table::*;
pub use key_sequence_matcher::*;
pub use keyseq_notation::*;
