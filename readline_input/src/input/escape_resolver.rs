// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Resolve a lone `ESC` that no key binding starts with.
//!
//! When the binding table has nothing beginning with `ESC` the decoder can't tell the
//! ESC key from `Alt+x` by matching. It waits one keyseq timeout for a follow up byte
//! and decides from what (if anything) arrives:
//!
//! | Follow up               | Keys                      |
//! | ----------------------- | ------------------------- |
//! | nothing, or end of input| `ESC`                     |
//! | a byte `>= 0x80`        | `ESC`, then the byte      |
//! | another `ESC`           | `ESC`, `ESC`              |
//! | any other byte `d`      | `M-d` (one meta key)      |

use crate::{ASCII_ESC, ByteSource, DEBUG_READLINE_INPUT, Key, ReadlineError, WaitOutcome};
use std::time::Duration;

/// Wait up to `timeout` for the byte after `ESC` and resolve the pair into keys.
///
/// # Errors
///
/// Any I/O error from `source`.
pub fn resolve_escape(
    source: &mut impl ByteSource,
    timeout: Duration,
) -> Result<Vec<Key>, ReadlineError> {
    let outcome = source.read_byte_within(timeout)?;
    let keys = keys_for_escape_follow_up(outcome);

    DEBUG_READLINE_INPUT.then(|| {
        tracing::debug!(
            message = "resolve_escape",
            ?outcome,
            keys = ?keys.iter().map(ToString::to_string).collect::<Vec<_>>()
        );
    });

    Ok(keys)
}

/// The keys a lone `ESC` turns into, given what the bounded wait after it produced.
#[must_use]
pub fn keys_for_escape_follow_up(outcome: WaitOutcome) -> Vec<Key> {
    match outcome {
        WaitOutcome::Elapsed | WaitOutcome::Eof => vec![Key::plain(ASCII_ESC)],
        WaitOutcome::Byte(ASCII_ESC) => vec![Key::plain(ASCII_ESC), Key::plain(ASCII_ESC)],
        // Already has the high bit, it can't also carry meta.
        WaitOutcome::Byte(byte) if byte >= 0x80 => {
            vec![Key::plain(ASCII_ESC), Key::plain(byte)]
        }
        WaitOutcome::Byte(byte) => vec![Key::meta(byte)],
    }
}
