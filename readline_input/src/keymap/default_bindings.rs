// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Default multi-byte key bindings for ANSI / VT100 compatible terminals.
//!
//! Single byte keys (`Ctrl+A`, printable characters, ...) are not in these tables. They
//! decode as themselves and the line editor interprets them. The tables only hold
//! sequences the decoder must assemble from several bytes.
//!
//! | Key         | Normal mode      | Application mode | With modifier   |
//! | ----------- | ---------------- | ---------------- | --------------- |
//! | Up / Down   | `ESC [ A` / `B`  | `ESC O A` / `B`  |                 |
//! | Right/Left  | `ESC [ C` / `D`  | `ESC O C` / `D`  | `ESC [ 1 ; 5 C` |
//! | Home        | `ESC [ H`        | `ESC O H`        | `ESC [ 1 ~`     |
//! | End         | `ESC [ F`        | `ESC O F`        | `ESC [ 4 ~`     |
//! | Delete      | `ESC [ 3 ~`      |                  |                 |
//! | Shift+Tab   | `ESC [ Z`        |                  |                 |

use crate::{ASCII_ESC, EditingMode, EditorAction, KeyBindingTable};

const CURSOR_KEYS: &[(&[u8], EditorAction)] = &[
    // Arrows, normal mode.
    (b"\x1b[A", EditorAction::EdPrevHistory),
    (b"\x1b[B", EditorAction::EdNextHistory),
    (b"\x1b[C", EditorAction::EdNextChar),
    (b"\x1b[D", EditorAction::EdPrevChar),
    // Arrows, application mode (DECCKM).
    (b"\x1bOA", EditorAction::EdPrevHistory),
    (b"\x1bOB", EditorAction::EdNextHistory),
    (b"\x1bOC", EditorAction::EdNextChar),
    (b"\x1bOD", EditorAction::EdPrevChar),
    // Home / End, all the ways terminals send them.
    (b"\x1b[H", EditorAction::EdMoveToBeg),
    (b"\x1b[F", EditorAction::EdMoveToEnd),
    (b"\x1bOH", EditorAction::EdMoveToBeg),
    (b"\x1bOF", EditorAction::EdMoveToEnd),
    (b"\x1b[1~", EditorAction::EdMoveToBeg),
    (b"\x1b[4~", EditorAction::EdMoveToEnd),
    (b"\x1b[7~", EditorAction::EdMoveToBeg),
    (b"\x1b[8~", EditorAction::EdMoveToEnd),
    (b"\x1b[3~", EditorAction::KeyDelete),
    // Ctrl+Left / Ctrl+Right.
    (b"\x1b[1;5C", EditorAction::EmNextWord),
    (b"\x1b[1;5D", EditorAction::EdPrevWord),
    // Alt+Left / Alt+Right.
    (b"\x1b[1;3C", EditorAction::EmNextWord),
    (b"\x1b[1;3D", EditorAction::EdPrevWord),
    // Shift+Tab.
    (b"\x1b[Z", EditorAction::CompletionJourneyUp),
];

const EMACS_KEYS: &[(&[u8], EditorAction)] = &[
    // ESC SPC
    (&[ASCII_ESC, b' '], EditorAction::EmSetMark),
    // C-x C-x
    (b"\x18\x18", EditorAction::EmExchangeMark),
];

/// Multi-byte bindings every ANSI terminal gets for `mode`.
#[must_use]
pub fn ansi_default_bindings(mode: EditingMode) -> KeyBindingTable {
    let mode_keys: &[(&[u8], EditorAction)] = match mode {
        EditingMode::Emacs => EMACS_KEYS,
        EditingMode::ViInsert | EditingMode::ViCommand => &[],
    };

    let mut table = KeyBindingTable::new();
    for (sequence, action) in CURSOR_KEYS.iter().chain(mode_keys) {
        // Sequences above are never empty.
        drop(table.insert(sequence.to_vec(), *action));
    }
    table
}
