// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{EditingMode, KeyBinding, KeyBindingTable, ReadlineError, parse_binding};
use std::{env::{self, VarError},
          time::Duration};

/// How long the decoder waits for the second byte of a possible key sequence.
pub const DEFAULT_KEYSEQ_TIMEOUT: Duration = Duration::from_millis(500);

/// Milliseconds. Read by [`ReadlineConfig::with_env_overrides`].
pub const KEYSEQ_TIMEOUT_ENV_VAR: &str = "READLINE_KEYSEQ_TIMEOUT";

/// One user supplied key binding, scoped to an editing mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingOverride {
    pub mode: EditingMode,
    pub sequence: Vec<u8>,
    pub binding: KeyBinding,
}

/// Settings for a [`crate::Readline`]. Every setter validates its value, so a config
/// that exists is a valid one.
///
/// ```
/// use readline_input::{EditingMode, ReadlineConfig};
///
/// let config = ReadlineConfig::default()
///     .with_keyseq_timeout_ms(100)?
///     .with_editing_mode(EditingMode::ViInsert)
///     .with_textual_binding(EditingMode::Emacs, r"\C-t", "ed_clear_screen")?;
/// assert_eq!(config.keyseq_timeout().as_millis(), 100);
/// # Ok::<(), readline_input::ReadlineError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadlineConfig {
    keyseq_timeout: Duration,
    editing_mode: EditingMode,
    overrides: Vec<BindingOverride>,
    test_mode: bool,
}

impl Default for ReadlineConfig {
    fn default() -> Self {
        Self {
            keyseq_timeout: DEFAULT_KEYSEQ_TIMEOUT,
            editing_mode: EditingMode::default(),
            overrides: Vec::new(),
            test_mode: false,
        }
    }
}

impl ReadlineConfig {
    /// # Errors
    ///
    /// [`ReadlineError::InvalidConfig`] if `millis` is 0. A zero timeout would make
    /// every `ESC` a lone `ESC` and break every arrow key.
    pub fn with_keyseq_timeout_ms(mut self, millis: u64) -> Result<Self, ReadlineError> {
        if millis == 0 {
            return Err(ReadlineError::InvalidConfig(
                "keyseq timeout must be at least 1 ms".into(),
            ));
        }
        self.keyseq_timeout = Duration::from_millis(millis);
        Ok(self)
    }

    #[must_use]
    pub fn with_editing_mode(mut self, mode: EditingMode) -> Self {
        self.editing_mode = mode;
        self
    }

    /// Build the key binding table once and reuse it for every session.
    #[must_use]
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Bind `sequence` in `mode`. Later bindings for the same sequence win.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::InvalidConfig`] if `sequence` is empty.
    pub fn with_binding(
        mut self,
        mode: EditingMode,
        sequence: impl Into<Vec<u8>>,
        binding: impl Into<KeyBinding>,
    ) -> Result<Self, ReadlineError> {
        let sequence = sequence.into();
        if sequence.is_empty() {
            return Err(ReadlineError::InvalidConfig(
                "a key binding needs at least one byte".into(),
            ));
        }
        self.overrides.push(BindingOverride {
            mode,
            sequence,
            binding: binding.into(),
        });
        Ok(self)
    }

    /// Like [`with_binding`](Self::with_binding), in inputrc notation (eg:
    /// `(r"\e[Z", "completion_journey_up")` or `(r"\C-o", r#""ls\n""#)`).
    ///
    /// # Errors
    ///
    /// See [`parse_binding`].
    pub fn with_textual_binding(
        self,
        mode: EditingMode,
        keyseq: &str,
        target: &str,
    ) -> Result<Self, ReadlineError> {
        let (sequence, binding) = parse_binding(keyseq, target)?;
        self.with_binding(mode, sequence, binding)
    }

    /// Apply [`KEYSEQ_TIMEOUT_ENV_VAR`] if it is set.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::InvalidConfig`] if the variable is set but is not valid unicode,
    /// or not a positive number of milliseconds.
    pub fn with_env_overrides(self) -> Result<Self, ReadlineError> {
        match env::var(KEYSEQ_TIMEOUT_ENV_VAR) {
            Ok(value) => {
                let millis = value.trim().parse::<u64>().map_err(|e| {
                    ReadlineError::InvalidConfig(format!(
                        "{KEYSEQ_TIMEOUT_ENV_VAR}={value:?}: {e}"
                    ))
                })?;
                self.with_keyseq_timeout_ms(millis)
            }
            Err(VarError::NotPresent) => Ok(self),
            Err(VarError::NotUnicode(value)) => Err(ReadlineError::InvalidConfig(format!(
                "{KEYSEQ_TIMEOUT_ENV_VAR}={value:?}: not valid unicode"
            ))),
        }
    }

    #[must_use]
    pub fn keyseq_timeout(&self) -> Duration { self.keyseq_timeout }

    #[must_use]
    pub fn editing_mode(&self) -> EditingMode { self.editing_mode }

    pub fn set_editing_mode(&mut self, mode: EditingMode) { self.editing_mode = mode; }

    #[must_use]
    pub fn test_mode(&self) -> bool { self.test_mode }

    pub fn overrides(&self) -> impl Iterator<Item = &BindingOverride> { self.overrides.iter() }

    /// `defaults` with this config's overrides for the current editing mode on top.
    #[must_use]
    pub fn key_binding_table(&self, defaults: &KeyBindingTable) -> KeyBindingTable {
        KeyBindingTable::merged(
            defaults,
            self.overrides
                .iter()
                .filter(|it| it.mode == self.editing_mode)
                .map(|it| (it.sequence.as_slice(), &it.binding)),
        )
    }
}
