// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::collections::VecDeque;

/// Oldest lines are dropped once there are more than this many.
pub const HISTORY_SIZE_MAX: usize = 1_000;

/// In memory line history, newest first. Nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<String>,
    max_size: usize,
    current_position: Option<usize>,
}

impl Default for History {
    fn default() -> Self { Self::new(HISTORY_SIZE_MAX) }
}

impl History {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size,
            current_position: None,
        }
    }

    /// Add `line` as the newest entry. Empty lines and repeats of the newest entry are
    /// skipped.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.is_empty() || self.entries.front() == Some(&line) {
            return;
        }
        self.entries.push_front(line);
        self.current_position = None;
        self.entries.truncate(self.max_size);
    }

    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.entries.truncate(max_size);
        if self
            .current_position
            .is_some_and(|it| it >= self.entries.len())
        {
            self.current_position = None;
        }
    }

    #[must_use]
    pub fn max_size(&self) -> usize { self.max_size }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> { self.entries.iter().map(String::as_str) }

    /// Step back in time. Stays on the oldest entry once it gets there.
    pub fn search_next(&mut self) -> Option<&str> {
        let index = match self.current_position {
            Some(index) => (index + 1).min(self.entries.len().checked_sub(1)?),
            None if !self.entries.is_empty() => 0,
            None => return None,
        };
        self.current_position = Some(index);
        self.entries.get(index).map(String::as_str)
    }

    /// Step forward in time. Past the newest entry is the empty line.
    pub fn search_previous(&mut self) -> Option<&str> {
        match self.current_position? {
            0 => {
                self.current_position = None;
                Some("")
            }
            index => {
                self.current_position = Some(index - 1);
                self.entries.get(index - 1).map(String::as_str)
            }
        }
    }

    /// Forget where [`search_next`](Self::search_next) got to.
    pub fn reset_position(&mut self) { self.current_position = None; }
}
