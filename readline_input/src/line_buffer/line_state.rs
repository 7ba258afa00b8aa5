// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The text being edited and where the cursor is in it. No terminal here, see
//! [`crate::BasicLineEditor`] for drawing.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::AmbiguousWidth;

/// An editable buffer. `cursor` is a byte offset that always sits on a `char` boundary.
/// Multi-line buffers hold `\n` between lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineState {
    text: String,
    cursor: usize,
    mark: Option<usize>,
}

impl LineState {
    #[must_use]
    pub fn text(&self) -> &str { &self.text }

    #[must_use]
    pub fn cursor(&self) -> usize { self.cursor }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.text.is_empty() }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.mark = None;
    }

    /// Replace the whole buffer, cursor at the end.
    pub fn replace(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.cursor = self.text.len();
    }

    pub fn insert_str(&mut self, text: &str) {
        self.text.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    pub fn insert_char(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Backspace. Returns `false` at the start of the buffer.
    pub fn delete_prev_char(&mut self) -> bool {
        match self.prev_boundary() {
            Some(start) => {
                self.text.replace_range(start..self.cursor, "");
                self.cursor = start;
                true
            }
            None => false,
        }
    }

    /// Delete under the cursor. Returns `false` at the end of the buffer.
    pub fn delete_next_char(&mut self) -> bool {
        match self.next_boundary() {
            Some(end) => {
                self.text.replace_range(self.cursor..end, "");
                true
            }
            None => false,
        }
    }

    pub fn move_left(&mut self) {
        if let Some(it) = self.prev_boundary() {
            self.cursor = it;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(it) = self.next_boundary() {
            self.cursor = it;
        }
    }

    /// Start of the current line.
    pub fn move_to_line_start(&mut self) { self.cursor = self.line_start(); }

    /// End of the current line.
    pub fn move_to_line_end(&mut self) { self.cursor = self.line_end(); }

    pub fn move_to_buffer_end(&mut self) { self.cursor = self.text.len(); }

    pub fn set_mark(&mut self) { self.mark = Some(self.cursor); }

    /// Swap the cursor and the mark. Does nothing if the mark is unset, or edits since
    /// left it pointing outside the text.
    pub fn exchange_mark(&mut self) {
        if let Some(mark) = self.mark
            && self.text.is_char_boundary(mark)
        {
            self.mark = Some(self.cursor);
            self.cursor = mark;
        }
    }

    pub fn move_to_prev_word(&mut self) { self.cursor = self.prev_word_start(); }

    pub fn move_to_next_word(&mut self) {
        let rest = &self.text[self.cursor..];
        let skipped = rest.len() - rest.trim_start_matches(is_word_separator).len();
        let word = rest[skipped..]
            .find(is_word_separator)
            .unwrap_or(rest.len() - skipped);
        self.cursor += skipped + word;
    }

    /// Delete from the cursor to the end of the current line.
    pub fn kill_to_line_end(&mut self) {
        let end = self.line_end();
        self.text.replace_range(self.cursor..end, "");
    }

    /// Delete from the start of the current line to the cursor.
    pub fn kill_to_line_start(&mut self) {
        let start = self.line_start();
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn kill_prev_word(&mut self) {
        let start = self.prev_word_start();
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    /// The word ending at the cursor, for completion.
    #[must_use]
    pub fn word_before_cursor(&self) -> &str {
        let head = &self.text[..self.cursor];
        let start = head.rfind(char::is_whitespace).map_or(0, |it| it + 1);
        &head[start..]
    }

    /// Swap the word ending at the cursor for `replacement`.
    pub fn replace_word_before_cursor(&mut self, replacement: &str) {
        let start = self.cursor - self.word_before_cursor().len();
        self.text.replace_range(start..self.cursor, replacement);
        self.cursor = start + replacement.len();
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> { self.text.split('\n').map(String::from).collect() }

    /// Index of the line the cursor is on, and the cursor's byte offset in it.
    #[must_use]
    pub fn cursor_line_and_offset(&self) -> (usize, usize) {
        let head = &self.text[..self.cursor];
        (head.matches('\n').count(), self.cursor - self.line_start())
    }

    fn line_start(&self) -> usize {
        self.text[..self.cursor].rfind('\n').map_or(0, |it| it + 1)
    }

    fn line_end(&self) -> usize {
        self.text[self.cursor..]
            .find('\n')
            .map_or(self.text.len(), |it| self.cursor + it)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(index, _)| index)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|ch| self.cursor + ch.len_utf8())
    }

    fn prev_word_start(&self) -> usize {
        let head = self.text[..self.cursor].trim_end_matches(is_word_separator);
        head.rfind(is_word_separator)
            .map_or(0, |it| it + head[it..].chars().next().map_or(1, char::len_utf8))
    }
}

fn is_word_separator(ch: char) -> bool { !ch.is_alphanumeric() && ch != '_' }

/// Columns `text` takes on screen.
#[must_use]
pub fn display_width(text: &str, ambiguous_width: AmbiguousWidth) -> usize {
    match ambiguous_width {
        AmbiguousWidth::Narrow => UnicodeWidthStr::width(text),
        AmbiguousWidth::Wide => UnicodeWidthStr::width_cjk(text),
    }
}

/// Like [`display_width`] for one `char`. Control characters take no columns.
#[must_use]
pub fn char_display_width(ch: char, ambiguous_width: AmbiguousWidth) -> usize {
    match ambiguous_width {
        AmbiguousWidth::Narrow => UnicodeWidthChar::width(ch),
        AmbiguousWidth::Wide => UnicodeWidthChar::width_cjk(ch),
    }
    .unwrap_or(0)
}
