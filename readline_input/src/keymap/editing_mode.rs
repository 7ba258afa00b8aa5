// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Editing mode that scopes a [`crate::KeyBindingTable`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum EditingMode {
    #[default]
    Emacs,
    ViInsert,
    ViCommand,
}

impl EditingMode {
    #[must_use]
    pub fn is_vi(&self) -> bool { matches!(self, Self::ViInsert | Self::ViCommand) }
}
