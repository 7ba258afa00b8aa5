// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! How many columns the terminal gives East Asian "ambiguous width" characters.
//!
//! Unicode leaves the width of characters like `▽`, `○` or `§` up to the font and the
//! terminal. CJK terminals tend to draw them 2 cells wide, everyone else 1. The line
//! editor needs to know to put the cursor in the right place, so the terminal is asked
//! once: draw `▽` at column 0 and see where the cursor ends up.

use crate::{DEBUG_READLINE_INPUT, ReadlineError, TerminalGate};
use strum_macros::Display;

/// Glyph drawn to measure the width. White down pointing triangle, U+25BD.
pub const AMBIGUOUS_WIDTH_PROBE_GLYPH: &str = "\u{25bd}";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum AmbiguousWidth {
    #[default]
    Narrow = 1,
    Wide = 2,
}

impl AmbiguousWidth {
    /// Cursor column after drawing the probe glyph at column 0, clamped to `1..=2`.
    #[must_use]
    pub fn from_cursor_column(col: u16) -> Self {
        if col >= 2 { Self::Wide } else { Self::Narrow }
    }

    #[must_use]
    pub fn columns(self) -> usize {
        match self {
            Self::Narrow => 1,
            Self::Wide => 2,
        }
    }
}

/// Measure the width on `gate`, leaving the screen as it was.
///
/// - Not a terminal, or a dumb one: [`AmbiguousWidth::Wide`] without probing.
/// - Output can't encode the glyph: [`AmbiguousWidth::Narrow`] without probing.
/// - The terminal doesn't answer the cursor query: [`AmbiguousWidth::Narrow`].
///
/// # Errors
///
/// Any I/O error while writing to `gate`.
pub fn measure_ambiguous_width(
    gate: &mut impl TerminalGate,
) -> Result<AmbiguousWidth, ReadlineError> {
    if gate.is_dumb() || !gate.is_interactive() {
        return Ok(AmbiguousWidth::Wide);
    }
    if !gate.supports_utf8() {
        return Ok(AmbiguousWidth::Narrow);
    }

    gate.move_cursor_to_column(0)?;
    gate.write_str(AMBIGUOUS_WIDTH_PROBE_GLYPH)?;
    gate.flush()?;

    let measured = match gate.cursor_column() {
        Ok(col) => AmbiguousWidth::from_cursor_column(col),
        Err(ReadlineError::Terminal(reason)) => {
            tracing::warn!(message = "ambiguous width probe got no answer", %reason);
            AmbiguousWidth::Narrow
        }
        Err(err) => return Err(err),
    };

    gate.move_cursor_to_column(0)?;
    gate.erase_to_end_of_screen()?;
    gate.flush()?;

    DEBUG_READLINE_INPUT.then(|| {
        tracing::debug!(message = "ambiguous width measured", %measured);
    });
    Ok(measured)
}

/// Measures on first use, then remembers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmbiguousWidthCache {
    value: Option<AmbiguousWidth>,
}

impl AmbiguousWidthCache {
    #[must_use]
    pub fn get(&self) -> Option<AmbiguousWidth> { self.value }

    /// # Errors
    ///
    /// See [`measure_ambiguous_width`]. A failed measurement is not cached.
    pub fn get_or_measure(
        &mut self,
        gate: &mut impl TerminalGate,
    ) -> Result<AmbiguousWidth, ReadlineError> {
        if let Some(it) = self.value {
            return Ok(it);
        }
        let it = measure_ambiguous_width(gate)?;
        self.value = Some(it);
        Ok(it)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{GateCall, MockTerminal};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(2, AmbiguousWidth::Wide ; "reports column 2")]
    #[test_case(1, AmbiguousWidth::Narrow ; "reports column 1")]
    #[test_case(0, AmbiguousWidth::Narrow ; "clamped up")]
    #[test_case(7, AmbiguousWidth::Wide ; "clamped down")]
    fn test_measure_from_reported_column(col: u16, expected: AmbiguousWidth) {
        let mut gate = MockTerminal::default().with_cursor_report(Some(col));
        assert_eq!(measure_ambiguous_width(&mut gate).unwrap(), expected);
    }

    #[test]
    fn test_probe_draws_glyph_then_cleans_up() {
        let mut gate = MockTerminal::default().with_cursor_report(Some(2));
        measure_ambiguous_width(&mut gate).unwrap();
        assert_eq!(
            gate.calls(),
            &[
                GateCall::MoveCursorToColumn(0),
                GateCall::WriteStr(AMBIGUOUS_WIDTH_PROBE_GLYPH.to_string()),
                GateCall::Flush,
                GateCall::CursorColumn,
                GateCall::MoveCursorToColumn(0),
                GateCall::EraseToEndOfScreen,
                GateCall::Flush,
            ]
        );
    }

    #[test]
    fn test_non_interactive_is_wide_without_probing() {
        let mut gate = MockTerminal::default().with_interactive(false);
        assert_eq!(measure_ambiguous_width(&mut gate).unwrap(), AmbiguousWidth::Wide);
        assert!(gate.calls().is_empty());
    }

    #[test]
    fn test_dumb_terminal_is_wide_without_probing() {
        let mut gate = MockTerminal::default().with_dumb(true);
        assert_eq!(measure_ambiguous_width(&mut gate).unwrap(), AmbiguousWidth::Wide);
        assert!(gate.calls().is_empty());
    }

    #[test]
    fn test_non_utf8_is_narrow_without_probing() {
        let mut gate = MockTerminal::default().with_utf8(false);
        assert_eq!(
            measure_ambiguous_width(&mut gate).unwrap(),
            AmbiguousWidth::Narrow
        );
        assert!(gate.calls().is_empty());
    }

    #[test]
    fn test_no_answer_is_narrow_and_still_cleans_up() {
        let mut gate = MockTerminal::default().with_cursor_report(None);
        assert_eq!(
            measure_ambiguous_width(&mut gate).unwrap(),
            AmbiguousWidth::Narrow
        );
        assert!(gate.calls().contains(&GateCall::EraseToEndOfScreen));
    }

    #[test]
    fn test_cache_measures_once() {
        let mut gate = MockTerminal::default().with_cursor_report(Some(2));
        let mut cache = AmbiguousWidthCache::default();
        assert_eq!(cache.get(), None);

        assert_eq!(cache.get_or_measure(&mut gate).unwrap(), AmbiguousWidth::Wide);
        let calls_after_first = gate.calls().len();
        assert_eq!(cache.get_or_measure(&mut gate).unwrap(), AmbiguousWidth::Wide);

        assert_eq!(gate.calls().len(), calls_after_first);
        assert_eq!(cache.get(), Some(AmbiguousWidth::Wide));
    }
}
