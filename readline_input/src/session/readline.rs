// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{AmbiguousWidth, AmbiguousWidthCache, ConfirmMultilineTermination,
            DEBUG_READLINE_INPUT, EditingMode, History, Hooks, InputDecoder, KeyBindingTable,
            LineEditor, ReadlineConfig, ReadlineError, ScreenSize, Session, TerminalGate};
use std::io;

/// Owns a terminal gate plus everything that outlives a single line: configuration,
/// hooks, history and the measured ambiguous width. Each
/// [`readline`](Self::readline) call runs one [`Session`].
///
/// Construct one per terminal. Two of them on the same terminal would fight over raw
/// mode.
#[derive(Debug)]
pub struct Readline<G: TerminalGate> {
    gate: G,
    config: ReadlineConfig,
    hooks: Hooks,
    history: History,
    decoder: InputDecoder,
    width_cache: AmbiguousWidthCache,
}

impl<G: TerminalGate> Readline<G> {
    /// # Errors
    ///
    /// None today. Kept fallible so gates that need setup can report it.
    pub fn try_new(gate: G, config: ReadlineConfig) -> Result<Self, ReadlineError> {
        let table = build_key_binding_table(&gate, &config);
        let decoder = InputDecoder::new(table, config.keyseq_timeout());
        Ok(Self {
            gate,
            config,
            hooks: Hooks::default(),
            history: History::default(),
            decoder,
            width_cache: AmbiguousWidthCache::default(),
        })
    }

    /// Read one line.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::Eof`] when input runs out, or the editor reports end of
    ///   input.
    /// - Any fault from the session. The terminal is restored either way.
    pub fn readline(
        &mut self,
        editor: &mut (impl LineEditor + ?Sized),
        prompt: &str,
        add_history: bool,
    ) -> Result<String, ReadlineError> {
        self.inner_readline(editor, prompt, add_history, None)
    }

    /// Read lines until Enter is pressed and `confirm` accepts the buffer.
    ///
    /// # Errors
    ///
    /// See [`readline`](Self::readline).
    pub fn readmultiline(
        &mut self,
        editor: &mut (impl LineEditor + ?Sized),
        prompt: &str,
        add_history: bool,
        confirm: ConfirmMultilineTermination,
    ) -> Result<String, ReadlineError> {
        self.inner_readline(editor, prompt, add_history, Some(confirm))
    }

    fn inner_readline(
        &mut self,
        editor: &mut (impl LineEditor + ?Sized),
        prompt: &str,
        add_history: bool,
        confirm: Option<ConfirmMultilineTermination>,
    ) -> Result<String, ReadlineError> {
        if !self.config.test_mode() {
            self.decoder
                .set_table(build_key_binding_table(&self.gate, &self.config));
            self.decoder.set_keyseq_timeout(self.config.keyseq_timeout());
        }

        editor.set_history(&self.history);
        Session::new(
            &mut self.gate,
            &mut self.decoder,
            &mut self.width_cache,
            editor,
        )
        .with_hooks(self.hooks)
        .with_multiline_confirm(confirm)
        .run(prompt, confirm.is_some())?;

        if editor.is_eof() {
            return Err(ReadlineError::Eof);
        }

        let line = editor.line();
        if add_history {
            self.history.push(line.clone());
        }
        DEBUG_READLINE_INPUT.then(|| {
            tracing::debug!(message = "readline", line = %line, history = self.history.len());
        });
        Ok(line)
    }

    #[must_use]
    pub fn hooks(&self) -> &Hooks { &self.hooks }

    pub fn hooks_mut(&mut self) -> &mut Hooks { &mut self.hooks }

    #[must_use]
    pub fn history(&self) -> &History { &self.history }

    pub fn history_mut(&mut self) -> &mut History { &mut self.history }

    #[must_use]
    pub fn config(&self) -> &ReadlineConfig { &self.config }

    /// Takes effect at the next session.
    pub fn emacs_editing_mode(&mut self) { self.config.set_editing_mode(EditingMode::Emacs); }

    /// Takes effect at the next session.
    pub fn vi_editing_mode(&mut self) { self.config.set_editing_mode(EditingMode::ViInsert); }

    #[must_use]
    pub fn editing_mode(&self) -> EditingMode { self.config.editing_mode() }

    /// The table the next session decodes with (before any rebuild).
    #[must_use]
    pub fn key_binding_table(&self) -> &KeyBindingTable { self.decoder.table() }

    /// `None` until the first session measured it.
    #[must_use]
    pub fn ambiguous_width(&self) -> Option<AmbiguousWidth> { self.width_cache.get() }

    /// # Errors
    ///
    /// Any I/O error while asking the terminal.
    pub fn screen_size(&mut self) -> io::Result<ScreenSize> { self.gate.screen_size() }

    #[must_use]
    pub fn gate(&self) -> &G { &self.gate }

    pub fn gate_mut(&mut self) -> &mut G { &mut self.gate }
}

fn build_key_binding_table<G: TerminalGate>(gate: &G, config: &ReadlineConfig) -> KeyBindingTable {
    config.key_binding_table(&gate.default_key_bindings(config.editing_mode()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EditorAction, KeyBinding,
                test_fixtures::{MockTerminal, RecordingLineEditor, ScriptedInput}};
    use pretty_assertions::assert_eq;

    fn readline_over(bytes: &[u8], config: ReadlineConfig) -> Readline<MockTerminal> {
        let gate = MockTerminal::new(ScriptedInput::builder().bytes(bytes).build());
        Readline::try_new(gate, config).unwrap()
    }

    #[test]
    fn test_lines_go_to_history() {
        let mut readline = readline_over(b"one\rtwo\r", ReadlineConfig::default());
        let mut editor = RecordingLineEditor::default();

        assert_eq!(readline.readline(&mut editor, "> ", true).unwrap(), "one");
        assert_eq!(readline.readline(&mut editor, "> ", false).unwrap(), "two");
        assert_eq!(readline.history().iter().collect::<Vec<_>>(), vec!["one"]);
    }

    #[test]
    fn test_width_is_measured_once_across_sessions() {
        let mut readline = readline_over(b"a\rb\r", ReadlineConfig::default());
        let mut editor = RecordingLineEditor::default();
        assert_eq!(readline.ambiguous_width(), None);

        readline.readline(&mut editor, "", false).unwrap();
        readline.readline(&mut editor, "", false).unwrap();

        assert_eq!(readline.ambiguous_width(), Some(AmbiguousWidth::Narrow));
        assert_eq!(readline.gate().cursor_column_queries(), 1);
        assert_eq!(readline.gate().restored_tokens().len(), 2);
    }

    #[test]
    fn test_editor_eof_is_an_error() {
        let mut readline = readline_over(b"\x04", ReadlineConfig::default());
        let mut editor = RecordingLineEditor::default();
        assert!(matches!(
            readline.readline(&mut editor, "", true),
            Err(ReadlineError::Eof)
        ));
        assert!(readline.history().is_empty());
    }

    #[test]
    fn test_mode_switch_rebuilds_table() {
        let config = ReadlineConfig::default();
        let mut readline = readline_over(b"\r", config);
        assert!(readline.key_binding_table().get(b"\x18\x18").is_some());

        readline.vi_editing_mode();
        assert_eq!(readline.editing_mode(), EditingMode::ViInsert);
        readline
            .readline(&mut RecordingLineEditor::default(), "", false)
            .unwrap();

        assert!(readline.key_binding_table().get(b"\x18\x18").is_none());
    }

    #[test]
    fn test_mode_keeps_table_built_at_construction() {
        let config = ReadlineConfig::default().with_test_mode(true);
        let mut readline = readline_over(b"\r", config);

        readline.vi_editing_mode();
        readline
            .readline(&mut RecordingLineEditor::default(), "", false)
            .unwrap();

        assert!(readline.key_binding_table().get(b"\x18\x18").is_some());
    }

    #[test]
    fn test_overrides_are_in_the_table() {
        let config = ReadlineConfig::default()
            .with_textual_binding(EditingMode::Emacs, r"\C-t", "ed_clear_screen")
            .unwrap();
        let readline = readline_over(b"", config);
        assert_eq!(
            readline.key_binding_table().get(&[0x14]),
            Some(&KeyBinding::Action(EditorAction::EdClearScreen))
        );
    }

    #[test]
    fn test_readmultiline_passes_confirm_to_editor() {
        fn ends_with_semicolon(buffer: &str) -> bool { buffer.trim_end().ends_with(';') }

        let mut readline = readline_over(b"a\rb;\r", ReadlineConfig::default());
        let mut editor = RecordingLineEditor::default();

        let text = readline
            .readmultiline(&mut editor, "> ", true, ends_with_semicolon)
            .unwrap();

        assert_eq!(text, "a\nb;");
        assert_eq!(readline.history().iter().next(), Some("a\nb;"));
    }
}
