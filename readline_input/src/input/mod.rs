// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Byte level input: the [`ByteSource`] seam, and the decoder that turns bytes into
//! [`crate::Key`]s.

// Attach sources.
pub mod byte_source;
pub mod escape_resolver;
pub mod input_decoder;

// Re-export.
pub use byte_source::*;
pub use escape_resolver::*;
pub use input_decoder::*;
