// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The decoded keystroke type, see [`Key`].

use super::EditorAction;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// The escape byte. Starts every terminal escape sequence, and is also what the ESC key
/// sends on its own.
pub const ASCII_ESC: u8 = 0x1B;

/// Backspace key on most terminals (DEC VT100 reserved BS for cursor-left).
pub const ASCII_DEL: u8 = 0x7F;

/// High bit that marks a meta (Alt) modified byte in [`Key::combined_char`].
pub const META_BIT: u8 = 0b1000_0000;

/// What a [`Key`] carries: a raw byte from the terminal, or an action that a key
/// binding expanded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyChar {
    Byte(u8),
    Action(EditorAction),
}

impl KeyChar {
    #[must_use]
    pub fn as_byte(&self) -> Option<u8> {
        match self {
            KeyChar::Byte(byte) => Some(*byte),
            KeyChar::Action(_) => None,
        }
    }

    #[must_use]
    pub fn as_action(&self) -> Option<EditorAction> {
        match self {
            KeyChar::Action(action) => Some(*action),
            KeyChar::Byte(_) => None,
        }
    }
}

impl From<u8> for KeyChar {
    fn from(byte: u8) -> Self { KeyChar::Byte(byte) }
}

impl From<EditorAction> for KeyChar {
    fn from(action: EditorAction) -> Self { KeyChar::Action(action) }
}

/// A decoded logical keystroke.
///
/// - `char` is the base key.
/// - `combined_char` is `char | 0x80` when `with_meta` is set (an Alt-modified key),
///   otherwise it equals `char`.
/// - `with_meta` is only ever set for a byte that followed a lone `ESC` inside the
///   keyseq timeout.
///
/// Fields are private so a [`Key`] can't be changed after it is made. Use
/// [`Key::plain`], [`Key::meta`] or [`Key::action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    char: KeyChar,
    combined_char: KeyChar,
    with_meta: bool,
}

impl Key {
    /// A byte exactly as it came from the terminal.
    #[must_use]
    pub fn plain(byte: u8) -> Self {
        Self {
            char: KeyChar::Byte(byte),
            combined_char: KeyChar::Byte(byte),
            with_meta: false,
        }
    }

    /// `Alt+byte`, as encoded by a terminal that sends `ESC byte`.
    #[must_use]
    pub fn meta(byte: u8) -> Self {
        Self {
            char: KeyChar::Byte(byte),
            combined_char: KeyChar::Byte(byte | META_BIT),
            with_meta: true,
        }
    }

    /// An action produced by a key binding.
    #[must_use]
    pub fn action(action: EditorAction) -> Self {
        Self {
            char: KeyChar::Action(action),
            combined_char: KeyChar::Action(action),
            with_meta: false,
        }
    }

    #[must_use]
    pub fn char(&self) -> KeyChar { self.char }

    #[must_use]
    pub fn combined_char(&self) -> KeyChar { self.combined_char }

    #[must_use]
    pub fn with_meta(&self) -> bool { self.with_meta }

    /// Is this a lone (non-meta) `ESC` key?
    #[must_use]
    pub fn is_escape(&self) -> bool {
        !self.with_meta && self.char == KeyChar::Byte(ASCII_ESC)
    }
}

impl From<KeyChar> for Key {
    fn from(key_char: KeyChar) -> Self {
        match key_char {
            KeyChar::Byte(byte) => Key::plain(byte),
            KeyChar::Action(action) => Key::action(action),
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match (self.char, self.with_meta) {
            (KeyChar::Action(action), _) => write!(f, "<{action}>"),
            (KeyChar::Byte(byte), true) => write!(f, "M-{}", ascii_name(byte)),
            (KeyChar::Byte(byte), false) => write!(f, "{}", ascii_name(byte)),
        }
    }
}

fn ascii_name(byte: u8) -> String {
    match byte {
        ASCII_ESC => "ESC".to_string(),
        ASCII_DEL => "DEL".to_string(),
        0x00..=0x1F => format!("C-{}", char::from(byte | 0x60)),
        0x20..=0x7E => char::from(byte).to_string(),
        _ => format!("\\x{byte:02x}"),
    }
}
