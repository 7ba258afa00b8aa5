// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Typed callbacks a [`crate::LineEditor`] may call while editing.
//!
//! Every hook is a plain function pointer with a fixed signature, so a hook of the
//! wrong shape doesn't compile.

use std::fmt::{Debug, Formatter, Result as FmtResult};

/// Candidates for the word being completed.
pub type CompletionProc = fn(target: &str) -> Vec<String>;
/// Prompt for every line of a multi-line buffer.
pub type PromptProc = fn(lines: &[String]) -> Vec<String>;
/// Indent for `line_index` given the buffer, the byte pointer and whether a newline was
/// just added. `None` leaves the indent alone.
pub type AutoIndentProc =
    fn(lines: &[String], line_index: usize, byte_pointer: usize, is_newline: bool) -> Option<usize>;
/// Rewrite the buffer for display (eg: syntax highlight). `complete` is `true` on
/// the final render.
pub type OutputModifierProc = fn(text: &str, complete: bool) -> String;
/// Runs once before the first key of a session.
pub type PreInputHook = fn();
/// Called with the completed word when completion lands on an exact match.
pub type DigPerfectMatchProc = fn(matched: &str);
/// Does Enter end multi-line input, given the buffer so far?
pub type ConfirmMultilineTermination = fn(buffer: &str) -> bool;

#[derive(Clone, Copy, Default)]
pub struct Hooks {
    pub completion_proc: Option<CompletionProc>,
    pub prompt_proc: Option<PromptProc>,
    pub auto_indent_proc: Option<AutoIndentProc>,
    pub output_modifier_proc: Option<OutputModifierProc>,
    pub pre_input_hook: Option<PreInputHook>,
    pub dig_perfect_match_proc: Option<DigPerfectMatchProc>,
    completion_append_character: Option<char>,
}

impl Hooks {
    #[must_use]
    pub fn with_completion_proc(mut self, hook: CompletionProc) -> Self {
        self.completion_proc = Some(hook);
        self
    }

    #[must_use]
    pub fn with_prompt_proc(mut self, hook: PromptProc) -> Self {
        self.prompt_proc = Some(hook);
        self
    }

    #[must_use]
    pub fn with_auto_indent_proc(mut self, hook: AutoIndentProc) -> Self {
        self.auto_indent_proc = Some(hook);
        self
    }

    #[must_use]
    pub fn with_output_modifier_proc(mut self, hook: OutputModifierProc) -> Self {
        self.output_modifier_proc = Some(hook);
        self
    }

    #[must_use]
    pub fn with_pre_input_hook(mut self, hook: PreInputHook) -> Self {
        self.pre_input_hook = Some(hook);
        self
    }

    #[must_use]
    pub fn with_dig_perfect_match_proc(mut self, hook: DigPerfectMatchProc) -> Self {
        self.dig_perfect_match_proc = Some(hook);
        self
    }

    /// See [`set_completion_append_character`](Self::set_completion_append_character).
    #[must_use]
    pub fn with_completion_append_character(mut self, text: Option<&str>) -> Self {
        self.set_completion_append_character(text);
        self
    }

    /// Only the first character of `text` is kept. `None` or `""` clears it.
    pub fn set_completion_append_character(&mut self, text: Option<&str>) {
        self.completion_append_character = text.and_then(|it| it.chars().next());
    }

    #[must_use]
    pub fn completion_append_character(&self) -> Option<char> {
        self.completion_append_character
    }
}

impl Debug for Hooks {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Hooks")
            .field("completion_proc", &self.completion_proc.is_some())
            .field("prompt_proc", &self.prompt_proc.is_some())
            .field("auto_indent_proc", &self.auto_indent_proc.is_some())
            .field("output_modifier_proc", &self.output_modifier_proc.is_some())
            .field("pre_input_hook", &self.pre_input_hook.is_some())
            .field("dig_perfect_match_proc", &self.dig_perfect_match_proc.is_some())
            .field("completion_append_character", &self.completion_append_character)
            .finish()
    }
}
