// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Prefix matching of a byte buffer against a [`KeyBindingTable`].
//!
//! Both functions are pure. The [`crate::InputDecoder`] calls [`match_status`] after
//! every byte it reads, and [`expand`] once the buffer is [`MatchStatus::Matched`].

use crate::{KeyBinding, KeyBindingTable, KeyChar};
use strum_macros::Display;

/// Macros that expand into other macros stop expanding after this many levels. The
/// remaining bytes are emitted as typed.
pub const MAX_MACRO_DEPTH: usize = 16;

/// How a byte buffer relates to the sequences bound in a [`KeyBindingTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum MatchStatus {
    /// The buffer is bound and nothing longer starts with it.
    Matched,
    /// More bytes may still complete a longer bound sequence.
    Matching,
    /// No bound sequence starts with the buffer. A buffer that begins with a bound
    /// sequence and then diverges is unmatched too.
    Unmatched,
}

/// Classify `buffer` against `table`.
///
/// | Sequences starting with `buffer`     | Result                                |
/// | ------------------------------------ | ------------------------------------- |
/// | exactly one, equal to `buffer`       | [`MatchStatus::Matched`]              |
/// | any other non-empty set              | [`MatchStatus::Matching`]             |
/// | none                                 | [`MatchStatus::Unmatched`]            |
#[must_use]
pub fn match_status(table: &KeyBindingTable, buffer: &[u8]) -> MatchStatus {
    let mut candidates = table.sequences_starting_with(buffer);
    match (candidates.next(), candidates.next()) {
        (Some(only), None) if only == buffer => MatchStatus::Matched,
        (Some(_), _) => MatchStatus::Matching,
        (None, _) => MatchStatus::Unmatched,
    }
}

/// Turn a [`MatchStatus::Matched`] buffer into the [`KeyChar`]s it stands for.
///
/// Macro bodies are plain text that may embed bound sequences, so expansion walks the
/// bytes: the longest bound sequence at each position is replaced by its binding, and
/// bytes no binding covers come out as themselves.
#[must_use]
pub fn expand(table: &KeyBindingTable, buffer: &[u8]) -> Vec<KeyChar> {
    let mut acc = Vec::with_capacity(buffer.len());
    expand_into(table, buffer, 0, &mut acc);
    acc
}

fn expand_into(table: &KeyBindingTable, buffer: &[u8], depth: usize, acc: &mut Vec<KeyChar>) {
    let mut rest = buffer;
    while let Some(&first) = rest.first() {
        match table.longest_prefix_of(rest) {
            None => {
                acc.push(KeyChar::Byte(first));
                rest = &rest[1..];
            }
            Some((len, KeyBinding::Action(action))) => {
                acc.push(KeyChar::Action(*action));
                rest = &rest[len..];
            }
            Some((len, KeyBinding::Macro(bytes))) => {
                if depth < MAX_MACRO_DEPTH {
                    expand_into(table, bytes, depth + 1, acc);
                } else {
                    acc.extend(bytes.iter().copied().map(KeyChar::Byte));
                }
                rest = &rest[len..];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ASCII_ESC, EditingMode, EditorAction, ansi_default_bindings};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn table() -> KeyBindingTable {
        let mut table = KeyBindingTable::new();
        table.insert(b"\x1b[A".to_vec(), EditorAction::EdPrevHistory).unwrap();
        table.insert(b"\x1b[1~".to_vec(), EditorAction::EdMoveToBeg).unwrap();
        table.insert(b"\x1b[1;5C".to_vec(), EditorAction::EmNextWord).unwrap();
        table.insert(b"\x18".to_vec(), EditorAction::EdKillLine).unwrap();
        table.insert(b"\x18\x18".to_vec(), EditorAction::EmExchangeMark).unwrap();
        table.insert(b"\x0f".to_vec(), KeyBinding::Macro(b"hi\x1b[A".to_vec())).unwrap();
        table
    }

    #[test_case(b"\x1b", MatchStatus::Matching ; "esc is a prefix")]
    #[test_case(b"\x1b[", MatchStatus::Matching ; "csi is a prefix")]
    #[test_case(b"\x1b[1", MatchStatus::Matching ; "two entries share the prefix")]
    #[test_case(b"\x1b[A", MatchStatus::Matched ; "exact and nothing longer")]
    #[test_case(b"\x1b[Ax", MatchStatus::Unmatched ; "complete binding then divergence")]
    #[test_case(b"\x18a", MatchStatus::Unmatched ; "bound lead then divergence")]
    #[test_case(b"\x18", MatchStatus::Matching ; "bound but a longer one exists")]
    #[test_case(b"\x18\x18", MatchStatus::Matched ; "longer one completed")]
    #[test_case(b"\x1bq", MatchStatus::Unmatched ; "diverged after esc")]
    #[test_case(b"a", MatchStatus::Unmatched ; "unbound byte")]
    fn test_match_status(buffer: &[u8], expected: MatchStatus) {
        assert_eq!(match_status(&table(), buffer), expected);
    }

    #[test]
    fn test_match_status_empty_table() {
        let table = KeyBindingTable::new();
        assert_eq!(match_status(&table, b"\x1b"), MatchStatus::Unmatched);
    }

    /// Matched is always bound with no bound extension, and Unmatched is never a prefix
    /// of a bound sequence.
    #[test]
    fn test_prefix_closure_over_default_bindings() {
        let table = ansi_default_bindings(EditingMode::Emacs);
        let mut buffers: Vec<Vec<u8>> = Vec::new();
        for (sequence, _) in table.iter() {
            for len in 1..=sequence.len() {
                buffers.push(sequence[..len].to_vec());
                let mut diverged = sequence[..len].to_vec();
                diverged.push(b'q');
                buffers.push(diverged);
            }
        }

        for buffer in buffers {
            let extended_by_entry = table
                .iter()
                .any(|(seq, _)| seq.len() > buffer.len() && seq.starts_with(&buffer));
            match match_status(&table, &buffer) {
                MatchStatus::Matched => {
                    assert!(table.get(&buffer).is_some(), "{buffer:?}");
                    assert!(!extended_by_entry, "{buffer:?}");
                }
                MatchStatus::Unmatched => {
                    assert!(!table.iter().any(|(seq, _)| seq.starts_with(&buffer)));
                }
                MatchStatus::Matching => assert!(
                    table.iter().any(|(seq, _)| seq.starts_with(&buffer)),
                    "{buffer:?}"
                ),
            }
        }
    }

    #[test]
    fn test_round_trip_every_default_binding() {
        let table = ansi_default_bindings(EditingMode::Emacs);
        for (sequence, binding) in table.iter() {
            let KeyBinding::Action(action) = binding else {
                continue;
            };
            assert_eq!(expand(&table, sequence), vec![KeyChar::Action(*action)]);
        }
    }

    #[test]
    fn test_expand_unbound_bytes_are_literal() {
        assert_eq!(
            expand(&table(), b"ab"),
            vec![KeyChar::Byte(b'a'), KeyChar::Byte(b'b')]
        );
    }

    #[test]
    fn test_expand_text_around_bound_sequence() {
        assert_eq!(
            expand(&table(), b"x\x1b[Ay"),
            vec![
                KeyChar::Byte(b'x'),
                KeyChar::Action(EditorAction::EdPrevHistory),
                KeyChar::Byte(b'y'),
            ]
        );
    }

    #[test]
    fn test_expand_macro_recurses() {
        assert_eq!(
            expand(&table(), b"\x0f"),
            vec![
                KeyChar::Byte(b'h'),
                KeyChar::Byte(b'i'),
                KeyChar::Action(EditorAction::EdPrevHistory),
            ]
        );
    }

    #[test]
    fn test_expand_self_referential_macro_is_bounded() {
        let mut table = KeyBindingTable::new();
        table.insert(vec![ASCII_ESC], KeyBinding::Macro(b"z\x1b".to_vec())).unwrap();

        let expanded = expand(&table, &[ASCII_ESC]);

        // One `z` per level, then the last level's bytes come out as typed.
        let mut expected = vec![KeyChar::Byte(b'z'); MAX_MACRO_DEPTH];
        expected.extend([KeyChar::Byte(b'z'), KeyChar::Byte(ASCII_ESC)]);
        assert_eq!(expanded, expected);
    }
}
