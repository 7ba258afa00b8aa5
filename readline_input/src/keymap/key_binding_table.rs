// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{EditorAction, ReadlineError};
use std::{collections::BTreeMap, ops::Bound};

/// What a bound byte sequence turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyBinding {
    /// Emit this action as a single [`crate::Key`].
    Action(EditorAction),
    /// Expand these bytes as if they were typed (they may hit other bindings).
    Macro(Vec<u8>),
}

impl From<EditorAction> for KeyBinding {
    fn from(action: EditorAction) -> Self { KeyBinding::Action(action) }
}

/// Mapping from byte sequences to [`KeyBinding`]s for one [`crate::EditingMode`].
///
/// Built once per session (defaults merged with overrides) and never mutated while
/// decoding. Sequences are kept sorted so that "every sequence starting with this
/// prefix" is a range scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBindingTable {
    bindings: BTreeMap<Vec<u8>, KeyBinding>,
}

impl KeyBindingTable {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Start from `defaults`, then apply `overrides` in order. Later entries win.
    #[must_use]
    pub fn merged<'a>(
        defaults: &KeyBindingTable,
        overrides: impl IntoIterator<Item = (&'a [u8], &'a KeyBinding)>,
    ) -> Self {
        let mut table = defaults.clone();
        for (sequence, binding) in overrides {
            // Empty sequences are rejected when overrides are configured.
            if !sequence.is_empty() {
                table.bindings.insert(sequence.to_vec(), binding.clone());
            }
        }
        table
    }

    /// Bind `sequence`, returning the binding it replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ReadlineError::InvalidConfig`] if `sequence` is empty.
    pub fn insert(
        &mut self,
        sequence: impl Into<Vec<u8>>,
        binding: impl Into<KeyBinding>,
    ) -> Result<Option<KeyBinding>, ReadlineError> {
        let sequence = sequence.into();
        if sequence.is_empty() {
            return Err(ReadlineError::InvalidConfig(
                "a key binding needs at least one byte".into(),
            ));
        }
        Ok(self.bindings.insert(sequence, binding.into()))
    }

    #[must_use]
    pub fn get(&self, sequence: &[u8]) -> Option<&KeyBinding> { self.bindings.get(sequence) }

    #[must_use]
    pub fn len(&self) -> usize { self.bindings.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.bindings.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &KeyBinding)> {
        self.bindings.iter().map(|(seq, binding)| (seq.as_slice(), binding))
    }

    /// Every bound sequence that starts with `prefix` (including `prefix` itself).
    pub fn sequences_starting_with<'a>(
        &'a self,
        prefix: &'a [u8],
    ) -> impl Iterator<Item = &'a [u8]> {
        self.bindings
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(seq, _)| seq.as_slice())
            .take_while(move |seq| seq.starts_with(prefix))
    }

    /// The longest bound sequence that `input` starts with, as `(length, binding)`.
    #[must_use]
    pub fn longest_prefix_of(&self, input: &[u8]) -> Option<(usize, &KeyBinding)> {
        (1..=input.len())
            .rev()
            .find_map(|len| self.bindings.get(&input[..len]).map(|it| (len, it)))
    }
}

impl<'a> IntoIterator for &'a KeyBindingTable {
    type Item = (&'a Vec<u8>, &'a KeyBinding);
    type IntoIter = std::collections::btree_map::Iter<'a, Vec<u8>, KeyBinding>;

    fn into_iter(self) -> Self::IntoIter { self.bindings.iter() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> KeyBindingTable {
        let mut table = KeyBindingTable::new();
        table.insert(b"\x1b[A".to_vec(), EditorAction::EdPrevHistory).unwrap();
        table.insert(b"\x1b[B".to_vec(), EditorAction::EdNextHistory).unwrap();
        table.insert(b"\x1b[1~".to_vec(), EditorAction::EdMoveToBeg).unwrap();
        table.insert(b"\x18\x18".to_vec(), EditorAction::EmExchangeMark).unwrap();
        table
    }

    #[test]
    fn test_insert_rejects_empty_sequence() {
        let mut table = KeyBindingTable::new();
        let result = table.insert(Vec::new(), EditorAction::Complete);
        assert!(matches!(result, Err(ReadlineError::InvalidConfig(_))));
        assert!(table.is_empty());
    }

    #[test]
    fn test_insert_returns_replaced_binding() {
        let mut table = table();
        let old = table.insert(b"\x1b[A".to_vec(), EditorAction::EdMoveToEnd).unwrap();
        assert_eq!(old, Some(KeyBinding::Action(EditorAction::EdPrevHistory)));
        assert_eq!(
            table.get(b"\x1b[A"),
            Some(&KeyBinding::Action(EditorAction::EdMoveToEnd))
        );
    }

    #[test]
    fn test_sequences_starting_with() {
        let table = table();
        let found: Vec<_> = table.sequences_starting_with(b"\x1b[").collect();
        assert_eq!(
            found,
            vec![&b"\x1b[1~"[..], &b"\x1b[A"[..], &b"\x1b[B"[..]]
        );
        assert_eq!(table.sequences_starting_with(b"\x1bO").count(), 0);
        assert_eq!(table.sequences_starting_with(b"\x18").count(), 1);
    }

    #[test]
    fn test_longest_prefix_of() {
        let mut table = table();
        table.insert(b"\x1b".to_vec(), EditorAction::ViCommandMode).unwrap();

        let (len, binding) = table.longest_prefix_of(b"\x1b[Ax").unwrap();
        assert_eq!(len, 3);
        assert_eq!(binding, &KeyBinding::Action(EditorAction::EdPrevHistory));

        let (len, _) = table.longest_prefix_of(b"\x1bq").unwrap();
        assert_eq!(len, 1);

        assert!(table.longest_prefix_of(b"abc").is_none());
    }

    #[test]
    fn test_merged_overrides_win() {
        let defaults = table();
        let override_binding = KeyBinding::Macro(b"hi".to_vec());
        let overrides = [(&b"\x1b[A"[..], &override_binding)];
        let merged = KeyBindingTable::merged(&defaults, overrides);

        assert_eq!(merged.len(), defaults.len());
        assert_eq!(merged.get(b"\x1b[A"), Some(&override_binding));
        // Defaults are untouched.
        assert_eq!(
            defaults.get(b"\x1b[A"),
            Some(&KeyBinding::Action(EditorAction::EdPrevHistory))
        );
    }
}
