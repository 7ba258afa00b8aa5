// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Named editing actions that a [`crate::KeyBinding`] can produce.
///
/// The names follow the readline / libedit convention (`ed_` for shared actions, `em_`
/// for emacs-flavored ones, `vi_` for vi ones) so that binding overrides written as text
/// (eg: `"\e[Z" -> "completion_journey_up"`) parse with [`std::str::FromStr`].
///
/// What an action *does* is up to the line editor. The decoder only carries it through
/// as [`crate::KeyChar::Action`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum EditorAction {
    EdMoveToBeg,
    EdMoveToEnd,
    EdPrevChar,
    EdNextChar,
    EdPrevWord,
    EmNextWord,
    EdPrevHistory,
    EdNextHistory,
    EdDeletePrevChar,
    KeyDelete,
    EdKillLine,
    EmKillLine,
    EmDeletePrevWord,
    EdClearScreen,
    EdNewline,
    EmSetMark,
    EmExchangeMark,
    Complete,
    CompletionJourneyUp,
    ViCommandMode,
    ViInsert,
}
