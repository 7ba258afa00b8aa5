// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{ByteSource, WaitOutcome};
use std::{collections::VecDeque, io, time::Duration};

/// One thing that happens on a [`ScriptedInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Byte(u8),
    /// Nothing arrives for this long.
    Pause(Duration),
    /// The next read fails with this kind.
    Fail(io::ErrorKind),
}

/// A [`ByteSource`] that replays a script against a virtual clock.
///
/// - [`read_byte`](ByteSource::read_byte) blocks, so it skips over pauses.
/// - [`read_byte_within`](ByteSource::read_byte_within) uses pauses up to its timeout.
///   A pause at least as long as what is left of the timeout is
///   [`WaitOutcome::Elapsed`], and the pause is shortened by the time waited. The byte
///   after it stays in the script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedInput {
    steps: VecDeque<ScriptStep>,
    clock: Duration,
}

impl ScriptedInput {
    #[must_use]
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            clock: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn builder() -> ScriptedInputBuilder { ScriptedInputBuilder::default() }

    /// Bytes not read yet, pauses and failures left out.
    #[must_use]
    pub fn remaining_bytes(&self) -> Vec<u8> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                ScriptStep::Byte(byte) => Some(*byte),
                ScriptStep::Pause(_) | ScriptStep::Fail(_) => None,
            })
            .collect()
    }

    /// Virtual time spent waiting so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration { self.clock }

    #[must_use]
    pub fn is_exhausted(&self) -> bool { self.steps.is_empty() }
}

impl ByteSource for ScriptedInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        while let Some(step) = self.steps.pop_front() {
            match step {
                ScriptStep::Byte(byte) => return Ok(Some(byte)),
                ScriptStep::Pause(pause) => self.clock += pause,
                ScriptStep::Fail(kind) => return Err(io::Error::from(kind)),
            }
        }
        Ok(None)
    }

    fn read_byte_within(&mut self, timeout: Duration) -> io::Result<WaitOutcome> {
        let mut remaining = timeout;
        loop {
            match self.steps.front_mut() {
                None => return Ok(WaitOutcome::Eof),
                Some(ScriptStep::Pause(pause)) if *pause >= remaining => {
                    *pause -= remaining;
                    self.clock += remaining;
                    return Ok(WaitOutcome::Elapsed);
                }
                Some(ScriptStep::Pause(pause)) => {
                    remaining -= *pause;
                    self.clock += *pause;
                    self.steps.pop_front();
                }
                Some(ScriptStep::Byte(byte)) => {
                    let byte = *byte;
                    self.steps.pop_front();
                    return Ok(WaitOutcome::Byte(byte));
                }
                Some(ScriptStep::Fail(kind)) => {
                    let kind = *kind;
                    self.steps.pop_front();
                    return Err(io::Error::from(kind));
                }
            }
        }
    }
}

/// Builds a [`ScriptedInput`] step by step.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInputBuilder {
    steps: Vec<ScriptStep>,
}

impl ScriptedInputBuilder {
    #[must_use]
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.steps.extend(bytes.iter().copied().map(ScriptStep::Byte));
        self
    }

    #[must_use]
    pub fn text(self, text: &str) -> Self { self.bytes(text.as_bytes()) }

    #[must_use]
    pub fn pause_ms(mut self, millis: u64) -> Self {
        self.steps.push(ScriptStep::Pause(Duration::from_millis(millis)));
        self
    }

    #[must_use]
    pub fn fail(mut self, kind: io::ErrorKind) -> Self {
        self.steps.push(ScriptStep::Fail(kind));
        self
    }

    #[must_use]
    pub fn build(self) -> ScriptedInput { ScriptedInput::new(self.steps) }
}
