// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! One editing session, from raw mode on to raw mode off. See [`Session`].

use crate::{AmbiguousWidthCache, ConfirmMultilineTermination, DEBUG_READLINE_INPUT, Hooks,
            InputDecoder, LineEditor, ReadlineError, TerminalGate, TerminalInfo};
use strum_macros::Display;

/// Where a [`Session`] is in its life.
///
/// ```text
/// Idle ──▶ Prepared ──▶ Running ──▶ Finished ──▶ Restored
///             │            │                        ▲
///             └────────────┴──────── fault ─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SessionState {
    Idle,
    Prepared,
    Running,
    Finished,
    Restored,
}

/// Runs the read / decode / render loop for one line.
///
/// The session borrows everything it needs for its whole life, so nothing else can read
/// from the terminal while it runs. The mode token from
/// [`TerminalGate::prepare_raw_mode`] is held here and handed to
/// [`TerminalGate::restore_mode`] exactly once:
///
/// - when the line editor says it is finished,
/// - when a fault comes out of the decoder or the line editor (the fault is then
///   returned to the caller),
/// - or when the session is dropped without getting there (eg: a panic unwinding).
pub struct Session<'a, G: TerminalGate, E: LineEditor + ?Sized> {
    gate: &'a mut G,
    decoder: &'a mut InputDecoder,
    width_cache: &'a mut AmbiguousWidthCache,
    editor: &'a mut E,
    hooks: Hooks,
    multiline_confirm: Option<ConfirmMultilineTermination>,
    token: Option<G::ModeToken>,
    state: SessionState,
}

impl<G: TerminalGate, E: LineEditor + ?Sized> std::fmt::Debug for Session<'_, G, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("token", &self.token)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl<'a, G: TerminalGate, E: LineEditor + ?Sized> Session<'a, G, E> {
    pub fn new(
        gate: &'a mut G,
        decoder: &'a mut InputDecoder,
        width_cache: &'a mut AmbiguousWidthCache,
        editor: &'a mut E,
    ) -> Self {
        Self {
            gate,
            decoder,
            width_cache,
            editor,
            hooks: Hooks::default(),
            multiline_confirm: None,
            token: None,
            state: SessionState::Idle,
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    #[must_use]
    pub fn with_multiline_confirm(mut self, confirm: Option<ConfirmMultilineTermination>) -> Self {
        self.multiline_confirm = confirm;
        self
    }

    #[must_use]
    pub fn state(&self) -> SessionState { self.state }

    /// Edit one line. The terminal is back in its original mode when this returns,
    /// whatever the result.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::Eof`] if input ran out.
    /// - Any fault from the terminal, the decoder or the line editor.
    /// - [`ReadlineError::Terminal`] if this session already ran.
    pub fn run(&mut self, prompt: &str, multiline: bool) -> Result<(), ReadlineError> {
        if self.state != SessionState::Idle {
            return Err(ReadlineError::Terminal(format!(
                "a session runs once, this one is {}",
                self.state
            )));
        }

        match self.prepare(prompt, multiline).and_then(|()| self.run_loop()) {
            Ok(()) => self.finish(),
            Err(fault) => {
                self.abort(&fault);
                Err(fault)
            }
        }
    }

    /// `Idle → Prepared`.
    fn prepare(&mut self, prompt: &str, multiline: bool) -> Result<(), ReadlineError> {
        self.token = Some(self.gate.prepare_raw_mode()?);
        self.transition(SessionState::Prepared);

        self.editor.set_hooks(&self.hooks);
        self.editor.set_multiline_confirm(self.multiline_confirm);
        self.editor.reset(prompt, multiline);

        let ambiguous_width = self.width_cache.get_or_measure(&mut *self.gate)?;
        let screen_size = self.gate.screen_size()?;
        self.editor.set_terminal_info(TerminalInfo {
            ambiguous_width,
            screen_size,
        });

        if let Some(hook) = self.hooks.pre_input_hook {
            hook();
        }
        self.editor.rerender()
    }

    /// `Prepared → Running`, until the editor is done. Every key of a decoded batch is
    /// forwarded, then the editor redraws once.
    fn run_loop(&mut self) -> Result<(), ReadlineError> {
        self.transition(SessionState::Running);
        loop {
            let keys = self.decoder.decode_next(&mut *self.gate)?;
            for key in keys {
                self.editor.input_key(key)?;
            }
            self.editor.rerender()?;
            if self.editor.is_finished() {
                return Ok(());
            }
        }
    }

    /// `Running → Finished → Restored`.
    fn finish(&mut self) -> Result<(), ReadlineError> {
        self.transition(SessionState::Finished);
        let moved = self.gate.move_cursor_to_column(0);
        self.editor.finalize();
        let restored = self.restore_terminal();
        moved?;
        restored
    }

    /// Fault edge, straight to `Restored`. The fault wins over any restore error.
    fn abort(&mut self, fault: &ReadlineError) {
        if fault.is_end_of_session() {
            DEBUG_READLINE_INPUT.then(|| {
                tracing::debug!(message = "session ended by user", state = %self.state, %fault);
            });
        } else {
            tracing::warn!(message = "session fault", state = %self.state, %fault);
        }

        // Nothing was set up if raw mode never came on.
        if self.token.is_some() {
            self.editor.finalize();
        }
        if let Err(err) = self.restore_terminal() {
            tracing::warn!(message = "restore after fault failed", %err);
        }
    }

    /// Hand the token back, if it is still here.
    fn restore_terminal(&mut self) -> Result<(), ReadlineError> {
        let token = self.token.take();
        self.transition(SessionState::Restored);
        match token {
            Some(token) => self.gate.restore_mode(token),
            None => Ok(()),
        }
    }

    fn transition(&mut self, next: SessionState) {
        DEBUG_READLINE_INPUT.then(|| {
            tracing::debug!(message = "session state", from = %self.state, to = %next);
        });
        self.state = next;
    }
}

impl<G: TerminalGate, E: LineEditor + ?Sized> Drop for Session<'_, G, E> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            tracing::warn!(message = "session dropped with the terminal in raw mode");
            drop(self.gate.restore_mode(token));
            self.state = SessionState::Restored;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ASCII_ESC, EditingMode, Key, KeyBinding, ansi_default_bindings,
                test_fixtures::{EditorEvent, GateCall, MockModeToken, MockTerminal,
                                RecordingLineEditor, ScriptedInput}};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn decoder() -> InputDecoder {
        InputDecoder::new(
            ansi_default_bindings(EditingMode::Emacs),
            Duration::from_millis(500),
        )
    }

    #[test]
    fn finishes_and_restores_once() {
        let mut gate = MockTerminal::new(ScriptedInput::builder().bytes(b"hi\r").build());
        let mut decoder = decoder();
        let mut cache = AmbiguousWidthCache::default();
        let mut editor = RecordingLineEditor::default();

        let mut session = Session::new(&mut gate, &mut decoder, &mut cache, &mut editor);
        session.run("> ", false).unwrap();
        assert_eq!(session.state(), SessionState::Restored);
        drop(session);

        assert_eq!(gate.prepared_tokens(), &[MockModeToken(1)]);
        assert_eq!(gate.restored_tokens(), &[MockModeToken(1)]);
        assert_eq!(editor.line(), "hi");
        assert_eq!(editor.finalize_count(), 1);
    }

    #[test]
    fn lifecycle_order() {
        let mut gate = MockTerminal::new(ScriptedInput::builder().bytes(b"\r").build())
            .with_cursor_report(Some(2));
        let mut decoder = decoder();
        let mut cache = AmbiguousWidthCache::default();
        let mut editor = RecordingLineEditor::default();

        Session::new(&mut gate, &mut decoder, &mut cache, &mut editor)
            .run("> ", true)
            .unwrap();

        let calls = gate.calls();
        assert_eq!(calls.first(), Some(&GateCall::PrepareRawMode));
        assert_eq!(calls.last(), Some(&GateCall::RestoreMode(MockModeToken(1))));
        // Probe ran once, before any key was read.
        assert_eq!(
            calls.iter().filter(|it| **it == GateCall::CursorColumn).count(),
            1
        );

        assert_eq!(
            editor.events(),
            &[
                EditorEvent::Reset {
                    prompt: "> ".into(),
                    multiline: true
                },
                EditorEvent::TerminalInfo(crate::AmbiguousWidth::Wide),
                EditorEvent::Rerender,
                EditorEvent::InputKey(Key::plain(b'\r')),
                EditorEvent::Rerender,
                EditorEvent::Finalize,
            ]
        );
        assert_eq!(cache.get(), Some(crate::AmbiguousWidth::Wide));
    }

    #[test]
    fn editor_fault_restores_exactly_once_and_propagates() {
        let mut gate = MockTerminal::new(ScriptedInput::builder().bytes(b"ab!cd").build());
        let mut decoder = decoder();
        let mut cache = AmbiguousWidthCache::default();
        let mut editor = RecordingLineEditor::default().fail_on_byte(b'!');

        let mut session = Session::new(&mut gate, &mut decoder, &mut cache, &mut editor);
        let result = session.run("> ", false);
        assert!(matches!(result, Err(ReadlineError::Editor(_))));
        assert_eq!(session.state(), SessionState::Restored);
        drop(session);

        assert_eq!(gate.restored_tokens(), &[MockModeToken(1)]);
        assert_eq!(editor.finalize_count(), 1);
        // Nothing after the fault was read.
        assert_eq!(gate.input().remaining_bytes(), b"cd".to_vec());
    }

    #[test]
    fn read_fault_restores_exactly_once_and_propagates() {
        let mut gate = MockTerminal::new(
            ScriptedInput::builder()
                .bytes(b"a")
                .fail(std::io::ErrorKind::BrokenPipe)
                .build(),
        );
        let mut decoder = decoder();
        let mut cache = AmbiguousWidthCache::default();
        let mut editor = RecordingLineEditor::default();

        let result = Session::new(&mut gate, &mut decoder, &mut cache, &mut editor).run("", false);

        assert!(matches!(result, Err(ReadlineError::Io(_))));
        assert_eq!(gate.restored_tokens(), &[MockModeToken(1)]);
    }

    #[test]
    fn end_of_input_restores_then_reports_eof() {
        let mut gate = MockTerminal::new(ScriptedInput::builder().bytes(b"ab").build());
        let mut decoder = decoder();
        let mut cache = AmbiguousWidthCache::default();
        let mut editor = RecordingLineEditor::default();

        let result = Session::new(&mut gate, &mut decoder, &mut cache, &mut editor).run("", false);

        assert!(matches!(result, Err(ReadlineError::Eof)));
        assert_eq!(gate.restored_tokens(), &[MockModeToken(1)]);
        assert_eq!(editor.line(), "ab");
    }

    #[test]
    fn prepare_failure_restores_nothing() {
        let mut gate = MockTerminal::default().with_fail_prepare(true);
        let mut decoder = decoder();
        let mut cache = AmbiguousWidthCache::default();
        let mut editor = RecordingLineEditor::default();

        let result = Session::new(&mut gate, &mut decoder, &mut cache, &mut editor).run("", false);

        assert!(matches!(result, Err(ReadlineError::Terminal(_))));
        assert!(gate.restored_tokens().is_empty());
        assert_eq!(editor.finalize_count(), 0);
    }

    #[test]
    fn a_session_runs_once() {
        let mut gate = MockTerminal::new(ScriptedInput::builder().bytes(b"\r\r").build());
        let mut decoder = decoder();
        let mut cache = AmbiguousWidthCache::default();
        let mut editor = RecordingLineEditor::default();

        let mut session = Session::new(&mut gate, &mut decoder, &mut cache, &mut editor);
        session.run("", false).unwrap();
        assert!(matches!(
            session.run("", false),
            Err(ReadlineError::Terminal(_))
        ));
        drop(session);
        assert_eq!(gate.prepared_tokens().len(), 1);
        assert_eq!(gate.restored_tokens().len(), 1);
    }

    #[test]
    fn drop_without_run_restores_nothing() {
        let mut gate = MockTerminal::default();
        let mut decoder = decoder();
        let mut cache = AmbiguousWidthCache::default();
        let mut editor = RecordingLineEditor::default();

        drop(Session::new(&mut gate, &mut decoder, &mut cache, &mut editor));
        assert!(gate.calls().is_empty());
    }

    #[test]
    fn panic_in_editor_still_restores() {
        let mut gate = MockTerminal::new(ScriptedInput::builder().bytes(b"x").build());
        let mut decoder = decoder();
        let mut cache = AmbiguousWidthCache::default();
        let mut editor = RecordingLineEditor::default().panic_on_byte(b'x');

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            Session::new(&mut gate, &mut decoder, &mut cache, &mut editor).run("", false)
        }));

        assert!(result.is_err());
        assert_eq!(gate.restored_tokens(), &[MockModeToken(1)]);
    }

    fn decoder_with_macro(text: &[u8]) -> InputDecoder {
        let mut table = ansi_default_bindings(EditingMode::Emacs);
        table.insert(vec![0x0F], KeyBinding::Macro(text.to_vec())).unwrap();
        InputDecoder::new(table, Duration::from_millis(500))
    }

    #[test]
    fn batch_is_forwarded_whole_then_rendered_once() {
        let mut gate = MockTerminal::new(ScriptedInput::builder().bytes(b"\x0f\r").build());
        let mut decoder = decoder_with_macro(b"ab");
        let mut cache = AmbiguousWidthCache::default();
        let mut editor = RecordingLineEditor::default();

        Session::new(&mut gate, &mut decoder, &mut cache, &mut editor)
            .run("", false)
            .unwrap();

        let after_first_render: Vec<_> = editor
            .events()
            .iter()
            .skip_while(|it| **it != EditorEvent::Rerender)
            .skip(1)
            .cloned()
            .collect();
        assert_eq!(
            after_first_render,
            vec![
                EditorEvent::InputKey(Key::plain(b'a')),
                EditorEvent::InputKey(Key::plain(b'b')),
                EditorEvent::Rerender,
                EditorEvent::InputKey(Key::plain(b'\r')),
                EditorEvent::Rerender,
                EditorEvent::Finalize,
            ]
        );
    }

    #[test]
    fn keys_after_enter_in_the_same_batch_are_not_dropped() {
        let mut gate = MockTerminal::new(ScriptedInput::builder().bytes(b"\x0fz").build());
        let mut decoder = decoder_with_macro(b"a\rb");
        let mut cache = AmbiguousWidthCache::default();
        let mut editor = RecordingLineEditor::default();

        Session::new(&mut gate, &mut decoder, &mut cache, &mut editor)
            .run("", false)
            .unwrap();

        assert_eq!(
            editor.keys(),
            vec![Key::plain(b'a'), Key::plain(b'\r'), Key::plain(b'b')]
        );
        // The session ends after the batch, the next byte stays unread.
        assert_eq!(gate.input().remaining_bytes(), b"z".to_vec());
    }

    #[test]
    fn meta_key_reaches_editor() {
        let mut gate = MockTerminal::new(
            ScriptedInput::builder()
                .bytes(&[ASCII_ESC])
                .pause_ms(10)
                .bytes(b"b\r")
                .build(),
        );
        let mut decoder = decoder();
        let mut cache = AmbiguousWidthCache::default();
        let mut editor = RecordingLineEditor::default();

        Session::new(&mut gate, &mut decoder, &mut cache, &mut editor)
            .run("", false)
            .unwrap();

        assert_eq!(editor.keys(), vec![Key::meta(b'b'), Key::plain(b'\r')]);
    }
}
