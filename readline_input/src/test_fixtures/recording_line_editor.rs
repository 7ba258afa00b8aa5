// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{AmbiguousWidth, ConfirmMultilineTermination, Key, KeyChar, LineEditor,
            ReadlineError, TerminalInfo};

/// What a [`RecordingLineEditor`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    Reset { prompt: String, multiline: bool },
    TerminalInfo(AmbiguousWidth),
    Rerender,
    InputKey(Key),
    Finalize,
}

/// A [`LineEditor`] that records every call and does the least editing possible:
///
/// - Printable ASCII is appended to the line.
/// - `\r` or `\n` finishes, unless the session is multi-line and the confirm callback
///   says no, in which case a `\n` goes into the line.
/// - `Ctrl+D` on an empty line finishes with EOF.
///
/// Faults can be injected with [`fail_on_byte`](Self::fail_on_byte) and
/// [`panic_on_byte`](Self::panic_on_byte).
#[derive(Debug, Default)]
pub struct RecordingLineEditor {
    events: Vec<EditorEvent>,
    line: String,
    multiline: bool,
    confirm: Option<ConfirmMultilineTermination>,
    finished: bool,
    eof: bool,
    finalize_count: usize,
    fail_on: Option<u8>,
    panic_on: Option<u8>,
}

impl RecordingLineEditor {
    /// Return [`ReadlineError::Editor`] when `byte` is typed.
    #[must_use]
    pub fn fail_on_byte(mut self, byte: u8) -> Self {
        self.fail_on = Some(byte);
        self
    }

    /// Panic when `byte` is typed.
    #[must_use]
    pub fn panic_on_byte(mut self, byte: u8) -> Self {
        self.panic_on = Some(byte);
        self
    }

    #[must_use]
    pub fn events(&self) -> &[EditorEvent] { &self.events }

    /// Just the keys, from [`events`](Self::events).
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.events
            .iter()
            .filter_map(|event| match event {
                EditorEvent::InputKey(key) => Some(*key),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn finalize_count(&self) -> usize { self.finalize_count }

    fn enter(&mut self) {
        let wants_more =
            self.multiline && self.confirm.is_some_and(|confirm| !confirm(&self.line));
        if wants_more {
            self.line.push('\n');
        } else {
            self.finished = true;
        }
    }
}

impl LineEditor for RecordingLineEditor {
    fn reset(&mut self, prompt: &str, multiline: bool) {
        self.events.push(EditorEvent::Reset {
            prompt: prompt.to_owned(),
            multiline,
        });
        self.line.clear();
        self.multiline = multiline;
        self.finished = false;
        self.eof = false;
    }

    fn set_multiline_confirm(&mut self, confirm: Option<ConfirmMultilineTermination>) {
        self.confirm = confirm;
    }

    fn set_terminal_info(&mut self, info: TerminalInfo) {
        self.events
            .push(EditorEvent::TerminalInfo(info.ambiguous_width));
    }

    fn input_key(&mut self, key: Key) -> Result<(), ReadlineError> {
        self.events.push(EditorEvent::InputKey(key));

        let KeyChar::Byte(byte) = key.char() else {
            return Ok(());
        };
        if self.panic_on == Some(byte) {
            panic!("scripted panic on byte {byte:#04x}");
        }
        if self.fail_on == Some(byte) {
            return Err(ReadlineError::Editor(format!(
                "scripted failure on byte {byte:#04x}"
            )));
        }
        if key.with_meta() {
            return Ok(());
        }

        match byte {
            b'\r' | b'\n' => self.enter(),
            0x04 if self.line.is_empty() => {
                self.eof = true;
                self.finished = true;
            }
            0x20..=0x7E => self.line.push(char::from(byte)),
            _ => {}
        }
        Ok(())
    }

    fn rerender(&mut self) -> Result<(), ReadlineError> {
        self.events.push(EditorEvent::Rerender);
        Ok(())
    }

    fn is_finished(&self) -> bool { self.finished }

    fn finalize(&mut self) {
        self.events.push(EditorEvent::Finalize);
        self.finalize_count += 1;
    }

    fn line(&self) -> String { self.line.clone() }

    fn is_eof(&self) -> bool { self.eof }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_records_and_edits() {
        let mut editor = RecordingLineEditor::default();
        editor.reset("> ", false);
        for byte in b"ok\r" {
            editor.input_key(Key::plain(*byte)).unwrap();
        }
        assert!(editor.is_finished());
        assert_eq!(editor.line(), "ok");
        assert_eq!(editor.keys().len(), 3);
    }

    #[test]
    fn test_fail_on_byte() {
        let mut editor = RecordingLineEditor::default().fail_on_byte(b'!');
        assert!(matches!(
            editor.input_key(Key::plain(b'!')),
            Err(ReadlineError::Editor(_))
        ));
    }
}
