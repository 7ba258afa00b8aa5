// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ASCII_DEL, ConfirmMultilineTermination, DEBUG_READLINE_INPUT,
            EditorAction, History, Hooks, Key, KeyChar, LineEditor, LineState,
            ReadlineError, TerminalInfo, display_width};
use crossterm::{QueueableCommand,
                cursor::{MoveTo, MoveToColumn, MoveUp},
                terminal::{Clear, ClearType}};
use std::io::{self, Write};

/// A small [`LineEditor`] that draws with ANSI escape sequences.
///
/// It inserts text (multi-byte UTF-8 arrives one byte per [`Key`] and is put back
/// together here), moves the cursor by character, word and line, kills, completes with
/// [`Hooks::completion_proc`], and walks the [`History`] it was given. Lines wider than
/// the screen wrap, and multi-line buffers are drawn one prompt per line.
///
/// | Key                     | Does                                      |
/// |-------------------------|-------------------------------------------|
/// | `Enter`                 | finish, or newline if `confirm` says no   |
/// | `Ctrl+A` / `Ctrl+E`     | start / end of line                       |
/// | `Ctrl+B` / `Ctrl+F`     | left / right                              |
/// | `Alt+B` / `Alt+F`       | previous / next word                      |
/// | `Backspace` / `Ctrl+H`  | delete before the cursor                  |
/// | `Ctrl+D`                | delete under the cursor, EOF when empty   |
/// | `Ctrl+K` / `Ctrl+U`     | kill to end / start of line               |
/// | `Ctrl+W` / `Alt+Backspace` | kill previous word                     |
/// | `Ctrl+L`                | clear screen                              |
/// | `Ctrl+C`                | [`ReadlineError::Interrupted`]            |
/// | `Tab`                   | complete                                  |
pub struct BasicLineEditor<W: Write> {
    output: W,
    state: LineState,
    prompt: String,
    multiline: bool,
    hooks: Hooks,
    confirm: Option<ConfirmMultilineTermination>,
    history: History,
    info: TerminalInfo,
    /// Start of a multi-byte UTF-8 character, waiting for the rest.
    pending_utf8: Vec<u8>,
    /// Rows between the first drawn row and the cursor, after the last render.
    cursor_row: u16,
    clear_screen: bool,
    finished: bool,
    eof: bool,
}

impl<W: Write> std::fmt::Debug for BasicLineEditor<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicLineEditor")
            .field("state", &self.state)
            .field("prompt", &self.prompt)
            .field("multiline", &self.multiline)
            .field("info", &self.info)
            .field("finished", &self.finished)
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

impl<W: Write> BasicLineEditor<W> {
    #[must_use]
    pub fn new(output: W) -> Self {
        Self {
            output,
            state: LineState::default(),
            prompt: String::new(),
            multiline: false,
            hooks: Hooks::default(),
            confirm: None,
            history: History::default(),
            info: TerminalInfo::default(),
            pending_utf8: Vec::new(),
            cursor_row: 0,
            clear_screen: false,
            finished: false,
            eof: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> &LineState { &self.state }

    pub fn output(&self) -> &W { &self.output }

    pub fn into_output(self) -> W { self.output }

    fn apply_byte(&mut self, byte: u8) -> Result<(), ReadlineError> {
        if byte.is_ascii() && !self.pending_utf8.is_empty() {
            DEBUG_READLINE_INPUT.then(|| {
                tracing::trace!(message = "dropped partial utf-8", bytes = ?self.pending_utf8);
            });
            self.pending_utf8.clear();
        }

        match byte {
            b'\r' | b'\n' => self.enter(),
            0x01 => self.state.move_to_line_start(),
            0x02 => self.state.move_left(),
            0x03 => return Err(ReadlineError::Interrupted),
            0x04 if self.state.is_empty() => {
                self.eof = true;
                self.finished = true;
            }
            0x04 => {
                self.state.delete_next_char();
            }
            0x05 => self.state.move_to_line_end(),
            0x06 => self.state.move_right(),
            0x08 | ASCII_DEL => {
                self.state.delete_prev_char();
            }
            b'\t' => self.complete(),
            0x0B => self.state.kill_to_line_end(),
            0x0C => self.clear_screen = true,
            0x15 => self.state.kill_to_line_start(),
            0x17 => self.state.kill_prev_word(),
            // Unbound control bytes, ESC included.
            0x00..=0x1F => {}
            _ => self.push_text_byte(byte),
        }
        Ok(())
    }

    fn apply_meta(&mut self, byte: u8) {
        match byte {
            b'b' | b'B' => self.state.move_to_prev_word(),
            b'f' | b'F' => self.state.move_to_next_word(),
            0x08 | ASCII_DEL => self.state.kill_prev_word(),
            _ => {}
        }
    }

    fn apply_action(&mut self, action: EditorAction) {
        match action {
            EditorAction::EdMoveToBeg => self.state.move_to_line_start(),
            EditorAction::EdMoveToEnd => self.state.move_to_line_end(),
            EditorAction::EdPrevChar => self.state.move_left(),
            EditorAction::EdNextChar => self.state.move_right(),
            EditorAction::EdPrevWord => self.state.move_to_prev_word(),
            EditorAction::EmNextWord => self.state.move_to_next_word(),
            EditorAction::EdPrevHistory => {
                if let Some(line) = self.history.search_next() {
                    self.state.replace(line);
                }
            }
            EditorAction::EdNextHistory => {
                if let Some(line) = self.history.search_previous() {
                    self.state.replace(line);
                }
            }
            EditorAction::EdDeletePrevChar => {
                self.state.delete_prev_char();
            }
            EditorAction::KeyDelete => {
                self.state.delete_next_char();
            }
            EditorAction::EdKillLine => self.state.kill_to_line_end(),
            EditorAction::EmKillLine => {
                self.state.move_to_line_start();
                self.state.kill_to_line_end();
            }
            EditorAction::EmDeletePrevWord => self.state.kill_prev_word(),
            EditorAction::EdClearScreen => self.clear_screen = true,
            EditorAction::EdNewline => self.enter(),
            EditorAction::EmSetMark => self.state.set_mark(),
            EditorAction::EmExchangeMark => self.state.exchange_mark(),
            EditorAction::Complete | EditorAction::CompletionJourneyUp => self.complete(),
            // No vi command mode here.
            EditorAction::ViCommandMode | EditorAction::ViInsert => {}
        }
    }

    /// Collect bytes until they form a whole `char`. Invalid UTF-8 is dropped.
    fn push_text_byte(&mut self, byte: u8) {
        self.pending_utf8.push(byte);
        match std::str::from_utf8(&self.pending_utf8) {
            Ok(text) => {
                self.state.insert_str(text);
                self.pending_utf8.clear();
            }
            Err(err) if err.error_len().is_none() => {}
            Err(_) => {
                tracing::debug!(message = "dropped invalid utf-8", bytes = ?self.pending_utf8);
                self.pending_utf8.clear();
            }
        }
    }

    fn enter(&mut self) {
        let wants_more = self.multiline
            && self
                .confirm
                .is_some_and(|confirm| !confirm(self.state.text()));
        if !wants_more {
            self.finished = true;
            return;
        }

        self.state.insert_char('\n');
        if let Some(auto_indent) = self.hooks.auto_indent_proc {
            let (line_index, byte_pointer) = self.state.cursor_line_and_offset();
            if let Some(indent) = auto_indent(&self.state.lines(), line_index, byte_pointer, true)
            {
                self.state.insert_str(&" ".repeat(indent));
            }
        }
    }

    fn complete(&mut self) {
        let Some(completion_proc) = self.hooks.completion_proc else {
            return;
        };
        let target = self.state.word_before_cursor().to_owned();
        let candidates = completion_proc(&target);

        match candidates.as_slice() {
            [] => {}
            [only] => {
                self.state.replace_word_before_cursor(only);
                if let Some(ch) = self.hooks.completion_append_character() {
                    self.state.insert_char(ch);
                }
                if let Some(dig) = self.hooks.dig_perfect_match_proc {
                    dig(only);
                }
            }
            many => {
                let prefix = common_prefix(many);
                if prefix.len() > target.len() && prefix.starts_with(&target) {
                    self.state.replace_word_before_cursor(&prefix);
                }
            }
        }
    }

    fn prompts(&self, line_count: usize) -> Vec<String> {
        let mut prompts = match self.hooks.prompt_proc {
            Some(prompt_proc) => prompt_proc(&self.state.lines()),
            None => Vec::new(),
        };
        prompts.resize(line_count, self.prompt.clone());
        prompts
    }

    /// Erase what the last render drew and draw the buffer again. `complete` is passed
    /// to [`Hooks::output_modifier_proc`].
    fn render(&mut self, complete: bool) -> io::Result<()> {
        self.output.queue(MoveToColumn(0))?;
        if self.cursor_row > 0 {
            self.output.queue(MoveUp(self.cursor_row))?;
        }
        if std::mem::take(&mut self.clear_screen) {
            self.output.queue(Clear(ClearType::All))?.queue(MoveTo(0, 0))?;
        }
        self.output.queue(Clear(ClearType::FromCursorDown))?;

        let lines = self.state.lines();
        let prompts = self.prompts(lines.len());
        let layout = Layout::compute(&self.state, &lines, &prompts, self.info);

        let shown = match self.hooks.output_modifier_proc {
            Some(modify) => modify(self.state.text(), complete),
            None => self.state.text().to_owned(),
        };
        for (index, (prompt, line)) in prompts.iter().zip(shown.split('\n')).enumerate() {
            if index > 0 {
                self.output.write_all(b"\r\n")?;
            }
            write!(self.output, "{prompt}{line}")?;
        }
        // A row filled to the last column leaves the terminal waiting to wrap.
        if layout.ends_on_full_row {
            self.output.write_all(b"\r\n")?;
        }

        let up = layout.end_row.saturating_sub(layout.cursor_row);
        if up > 0 {
            self.output.queue(MoveUp(to_u16(up)))?;
        }
        self.output.queue(MoveToColumn(to_u16(layout.cursor_col)))?;
        self.output.flush()?;

        self.cursor_row = to_u16(layout.cursor_row);
        Ok(())
    }

    fn render_final(&mut self) -> io::Result<()> {
        self.state.move_to_buffer_end();
        self.render(true)?;
        self.output.write_all(b"\r\n")?;
        self.output.flush()?;
        self.cursor_row = 0;
        Ok(())
    }
}

impl<W: Write> LineEditor for BasicLineEditor<W> {
    fn reset(&mut self, prompt: &str, multiline: bool) {
        self.state.clear();
        self.prompt = prompt.to_owned();
        self.multiline = multiline;
        self.pending_utf8.clear();
        self.history.reset_position();
        self.cursor_row = 0;
        self.clear_screen = false;
        self.finished = false;
        self.eof = false;
    }

    fn set_hooks(&mut self, hooks: &Hooks) { self.hooks = *hooks; }

    fn set_multiline_confirm(&mut self, confirm: Option<ConfirmMultilineTermination>) {
        self.confirm = confirm;
    }

    fn set_terminal_info(&mut self, info: TerminalInfo) { self.info = info; }

    fn set_history(&mut self, history: &History) { self.history = history.clone(); }

    fn input_key(&mut self, key: Key) -> Result<(), ReadlineError> {
        // The rest of a batch after Enter doesn't belong to this line.
        if self.finished {
            return Ok(());
        }
        match key.char() {
            KeyChar::Action(action) => self.apply_action(action),
            KeyChar::Byte(byte) if key.with_meta() => self.apply_meta(byte),
            KeyChar::Byte(byte) => self.apply_byte(byte)?,
        }
        Ok(())
    }

    fn rerender(&mut self) -> Result<(), ReadlineError> {
        self.render(false)?;
        Ok(())
    }

    fn is_finished(&self) -> bool { self.finished }

    fn finalize(&mut self) {
        if let Err(err) = self.render_final() {
            tracing::warn!(message = "final render failed", %err);
        }
    }

    fn line(&self) -> String { self.state.text().to_owned() }

    fn is_eof(&self) -> bool { self.eof }
}

/// Where things land on screen, in rows from the first drawn row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    cursor_row: usize,
    cursor_col: usize,
    end_row: usize,
    ends_on_full_row: bool,
}

impl Layout {
    fn compute(state: &LineState, lines: &[String], prompts: &[String], info: TerminalInfo) -> Self {
        let cols = usize::from(info.screen_size.cols).max(1);
        let width = |text: &str| display_width(text, info.ambiguous_width);
        let (cursor_line, cursor_offset) = state.cursor_line_and_offset();

        let mut start_row = 0;
        let mut cursor = (0, 0);
        let mut end = (0, false);
        for (index, (prompt, line)) in prompts.iter().zip(lines).enumerate() {
            let prompt_width = width(prompt);
            if index == cursor_line {
                let at = prompt_width + width(&line[..cursor_offset]);
                cursor = (start_row + at / cols, at % cols);
            }
            let total = prompt_width + width(line);
            end = (start_row + total / cols, total > 0 && total % cols == 0);
            start_row += total.max(1).div_ceil(cols);
        }

        Self {
            cursor_row: cursor.0,
            cursor_col: cursor.1,
            end_row: end.0,
            ends_on_full_row: end.1,
        }
    }
}

fn to_u16(value: usize) -> u16 { u16::try_from(value).unwrap_or(u16::MAX) }

fn common_prefix(words: &[String]) -> String {
    let Some((first, rest)) = words.split_first() else {
        return String::new();
    };
    let mut len = first.len();
    for word in rest {
        len = first
            .char_indices()
            .zip(word.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((index, ch), _)| index + ch.len_utf8())
            .min(len);
    }
    first[..len].to_owned()
}
