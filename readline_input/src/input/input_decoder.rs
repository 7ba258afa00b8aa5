// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Stateful decoder that turns terminal bytes into [`Key`] groups. See
//! [`InputDecoder`].

use crate::{ASCII_ESC, ByteSource, DEBUG_READLINE_INPUT, Key, KeyBindingTable,
            MatchStatus, ReadlineError, WaitOutcome, expand, keys_for_escape_follow_up,
            match_status, resolve_escape};
use smallvec::SmallVec;
use std::time::Duration;

/// Bytes of one sequence being matched. Longest default binding is 6 bytes.
pub type SequenceBuffer = SmallVec<[u8; 16]>;

/// Pulls bytes from a [`ByteSource`] one at a time and emits the [`Key`]s they stand
/// for, matching them against a [`KeyBindingTable`].
///
/// Each call to [`decode_next`](Self::decode_next) is one decode cycle:
///
/// 1. Read a byte (blocking), append it to the sequence buffer, and ask
///    [`match_status`] about the buffer.
/// 2. [`MatchStatus::Matched`] emits [`expand`] of the buffer.
/// 3. [`MatchStatus::Matching`] on the *first* byte races the second byte against the
///    keyseq timeout. Later bytes of a sequence are read without a deadline.
/// 4. [`MatchStatus::Unmatched`] on a lone `ESC` goes to [`resolve_escape`]. Any other
///    unmatched buffer comes out byte by byte.
///
/// The one byte read ahead during the race is kept in a single slot and fed back in as
/// the next byte, so nothing is lost or read twice.
#[derive(Debug, Clone)]
pub struct InputDecoder {
    table: KeyBindingTable,
    keyseq_timeout: Duration,
    unread: Option<u8>,
    buffer: SequenceBuffer,
}

/// What happened to the second byte of a sequence.
enum SecondByte {
    /// The cycle is over, emit these keys.
    Emit(Vec<Key>),
    /// The byte may continue the sequence. It is in the unread slot.
    Continue,
}

impl InputDecoder {
    #[must_use]
    pub fn new(table: KeyBindingTable, keyseq_timeout: Duration) -> Self {
        Self {
            table,
            keyseq_timeout,
            unread: None,
            buffer: SequenceBuffer::new(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &KeyBindingTable { &self.table }

    /// Swap in a rebuilt table. Only call this between decode cycles.
    pub fn set_table(&mut self, table: KeyBindingTable) { self.table = table; }

    #[must_use]
    pub fn keyseq_timeout(&self) -> Duration { self.keyseq_timeout }

    pub fn set_keyseq_timeout(&mut self, timeout: Duration) { self.keyseq_timeout = timeout; }

    /// Decode the next group of keys. Blocks until at least one key is ready.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::Eof`] if `source` is exhausted and nothing is buffered.
    /// - [`ReadlineError::Io`] if reading from `source` fails.
    pub fn decode_next(
        &mut self,
        source: &mut impl ByteSource,
    ) -> Result<Vec<Key>, ReadlineError> {
        self.buffer.clear();
        let result = self.decode_cycle(source);
        self.buffer.clear();
        result
    }

    fn decode_cycle(&mut self, source: &mut impl ByteSource) -> Result<Vec<Key>, ReadlineError> {
        loop {
            let Some(byte) = self.next_byte(source)? else {
                return if self.buffer.is_empty() {
                    Err(ReadlineError::Eof)
                } else {
                    Ok(self.flush_buffer_as_plain_keys("end of input mid sequence"))
                };
            };
            self.buffer.push(byte);

            match match_status(&self.table, &self.buffer) {
                MatchStatus::Matched => {
                    let keys: Vec<Key> = expand(&self.table, &self.buffer)
                        .into_iter()
                        .map(Key::from)
                        .collect();
                    self.trace("matched", &keys);
                    return Ok(keys);
                }
                MatchStatus::Matching if self.buffer.len() == 1 => {
                    match self.read_second_byte(source, byte)? {
                        SecondByte::Emit(keys) => return Ok(keys),
                        SecondByte::Continue => {}
                    }
                }
                MatchStatus::Matching => {}
                MatchStatus::Unmatched if self.buffer.as_slice() == [ASCII_ESC] => {
                    return resolve_escape(source, self.keyseq_timeout);
                }
                MatchStatus::Unmatched => {
                    return Ok(self.flush_buffer_as_plain_keys("unmatched"));
                }
            }
        }
    }

    /// Race the byte after `first` against the keyseq timeout.
    fn read_second_byte(
        &mut self,
        source: &mut impl ByteSource,
        first: u8,
    ) -> Result<SecondByte, ReadlineError> {
        let outcome = match self.unread.take() {
            Some(byte) => WaitOutcome::Byte(byte),
            None => source.read_byte_within(self.keyseq_timeout)?,
        };

        let second = match outcome {
            WaitOutcome::Elapsed | WaitOutcome::Eof => {
                let keys = vec![Key::plain(first)];
                DEBUG_READLINE_INPUT.then(|| {
                    tracing::debug!(
                        message = "keyseq timeout, partial sequence abandoned",
                        ?outcome,
                        key = %keys[0]
                    );
                });
                return Ok(SecondByte::Emit(keys));
            }
            WaitOutcome::Byte(second) => second,
        };

        let mut candidate: SequenceBuffer = self.buffer.clone();
        candidate.push(second);

        if match_status(&self.table, &candidate) == MatchStatus::Unmatched {
            let keys = if first == ASCII_ESC {
                keys_for_escape_follow_up(WaitOutcome::Byte(second))
            } else {
                vec![Key::plain(first), Key::plain(second)]
            };
            self.trace("second byte diverged", &keys);
            return Ok(SecondByte::Emit(keys));
        }

        DEBUG_READLINE_INPUT.then(|| {
            tracing::trace!(message = "push back second byte", byte = second);
        });
        self.unread = Some(second);
        Ok(SecondByte::Continue)
    }

    fn next_byte(&mut self, source: &mut impl ByteSource) -> Result<Option<u8>, ReadlineError> {
        match self.unread.take() {
            Some(byte) => Ok(Some(byte)),
            None => Ok(source.read_byte()?),
        }
    }

    fn flush_buffer_as_plain_keys(&mut self, reason: &str) -> Vec<Key> {
        let keys: Vec<Key> = self.buffer.iter().copied().map(Key::plain).collect();
        self.trace(reason, &keys);
        keys
    }

    fn trace(&self, reason: &str, keys: &[Key]) {
        DEBUG_READLINE_INPUT.then(|| {
            tracing::debug!(
                message = "decode_next",
                reason,
                buffer = ?self.buffer.as_slice(),
                keys = ?keys.iter().map(ToString::to_string).collect::<Vec<_>>()
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EditingMode, EditorAction, KeyBinding, KeyChar, ansi_default_bindings,
                test_fixtures::{ScriptStep, ScriptedInput}};
    use pretty_assertions::assert_eq;
    use std::io;

    const TIMEOUT: Duration = Duration::from_millis(500);

    fn decoder() -> InputDecoder {
        InputDecoder::new(ansi_default_bindings(EditingMode::Emacs), TIMEOUT)
    }

    fn decode_all(decoder: &mut InputDecoder, input: &mut ScriptedInput) -> Vec<Key> {
        let mut acc = vec![];
        loop {
            match decoder.decode_next(input) {
                Ok(keys) => acc.extend(keys),
                Err(ReadlineError::Eof) => return acc,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn plain_bytes_decode_one_by_one() {
        let mut input = ScriptedInput::builder().bytes(b"hi").build();
        let keys = decode_all(&mut decoder(), &mut input);
        assert_eq!(keys, vec![Key::plain(b'h'), Key::plain(b'i')]);
    }

    #[test]
    fn arrow_key_burst_is_one_action() {
        let mut input = ScriptedInput::builder().bytes(b"\x1b[A").build();
        let mut decoder = decoder();
        assert_eq!(
            decoder.decode_next(&mut input).unwrap(),
            vec![Key::action(EditorAction::EdPrevHistory)]
        );
        assert!(matches!(
            decoder.decode_next(&mut input),
            Err(ReadlineError::Eof)
        ));
    }

    #[test]
    fn every_default_binding_round_trips() {
        let table = ansi_default_bindings(EditingMode::Emacs);
        for (sequence, binding) in table.iter() {
            let KeyBinding::Action(action) = binding else {
                continue;
            };
            let mut input = ScriptedInput::builder().bytes(sequence).build();
            let keys = decode_all(&mut decoder(), &mut input);
            assert_eq!(keys, vec![Key::action(*action)], "{sequence:?}");
        }
    }

    #[test]
    fn lone_esc_times_out() {
        let mut input = ScriptedInput::builder()
            .bytes(&[ASCII_ESC])
            .pause_ms(600)
            .build();
        let keys = decoder().decode_next(&mut input).unwrap();
        assert_eq!(keys, vec![Key::plain(ASCII_ESC)]);
        assert!(!keys[0].with_meta());
    }

    #[test]
    fn lone_esc_at_end_of_input() {
        let mut input = ScriptedInput::builder().bytes(&[ASCII_ESC]).build();
        let keys = decoder().decode_next(&mut input).unwrap();
        assert_eq!(keys, vec![Key::plain(ASCII_ESC)]);
    }

    #[test]
    fn esc_then_letter_inside_timeout_is_meta() {
        let mut input = ScriptedInput::builder()
            .bytes(&[ASCII_ESC])
            .pause_ms(10)
            .bytes(&[0x61])
            .build();
        let keys = decoder().decode_next(&mut input).unwrap();
        assert_eq!(keys, vec![Key::meta(0x61)]);
        assert_eq!(keys[0].combined_char(), KeyChar::Byte(0xE1));
    }

    #[test]
    fn esc_then_letter_after_timeout_is_two_cycles() {
        let mut input = ScriptedInput::builder()
            .bytes(&[ASCII_ESC])
            .pause_ms(600)
            .bytes(b"a")
            .build();
        let mut decoder = decoder();
        assert_eq!(
            decoder.decode_next(&mut input).unwrap(),
            vec![Key::plain(ASCII_ESC)]
        );
        // The late byte is the first byte of the next cycle, exactly once.
        assert_eq!(
            decoder.decode_next(&mut input).unwrap(),
            vec![Key::plain(b'a')]
        );
        assert!(matches!(
            decoder.decode_next(&mut input),
            Err(ReadlineError::Eof)
        ));
    }

    #[test]
    fn esc_esc_with_default_bindings_is_two_plain_escapes() {
        let mut input = ScriptedInput::builder()
            .bytes(&[ASCII_ESC, ASCII_ESC])
            .build();
        let keys = decoder().decode_next(&mut input).unwrap();
        assert_eq!(keys, vec![Key::plain(ASCII_ESC), Key::plain(ASCII_ESC)]);
    }

    #[test]
    fn esc_then_high_byte_with_default_bindings() {
        let mut input = ScriptedInput::builder().bytes(&[ASCII_ESC, 0xE6]).build();
        let keys = decoder().decode_next(&mut input).unwrap();
        assert_eq!(keys, vec![Key::plain(ASCII_ESC), Key::plain(0xE6)]);
    }

    #[test]
    fn esc_then_high_byte_without_esc_bindings() {
        let mut input = ScriptedInput::builder().bytes(&[ASCII_ESC, 0xC3]).build();
        let mut decoder = InputDecoder::new(KeyBindingTable::new(), TIMEOUT);
        let keys = decoder.decode_next(&mut input).unwrap();
        assert_eq!(keys, vec![Key::plain(ASCII_ESC), Key::plain(0xC3)]);
    }

    #[test]
    fn esc_esc_without_esc_bindings() {
        let mut input = ScriptedInput::builder()
            .bytes(&[ASCII_ESC, ASCII_ESC])
            .build();
        let mut decoder = InputDecoder::new(KeyBindingTable::new(), TIMEOUT);
        let keys = decoder.decode_next(&mut input).unwrap();
        assert_eq!(keys, vec![Key::plain(ASCII_ESC), Key::plain(ASCII_ESC)]);
        assert!(keys.iter().all(|key| !key.with_meta()));
    }

    #[test]
    fn esc_then_letter_without_esc_bindings_is_meta() {
        let mut input = ScriptedInput::builder().bytes(&[ASCII_ESC, b'f']).build();
        let mut decoder = InputDecoder::new(KeyBindingTable::new(), TIMEOUT);
        assert_eq!(
            decoder.decode_next(&mut input).unwrap(),
            vec![Key::meta(b'f')]
        );
    }

    #[test]
    fn non_esc_prefix_that_diverges_emits_both_bytes() {
        let mut input = ScriptedInput::builder().bytes(b"\x18a").build();
        let keys = decoder().decode_next(&mut input).unwrap();
        assert_eq!(keys, vec![Key::plain(0x18), Key::plain(b'a')]);
    }

    #[test]
    fn non_esc_prefix_completes() {
        let mut input = ScriptedInput::builder()
            .bytes(&[0x18])
            .pause_ms(100)
            .bytes(&[0x18])
            .build();
        let keys = decoder().decode_next(&mut input).unwrap();
        assert_eq!(keys, vec![Key::action(EditorAction::EmExchangeMark)]);
    }

    /// `ESC` bound on its own, as vi insert mode does, with longer sequences after it.
    fn decoder_with_bound_leads() -> InputDecoder {
        let mut table = KeyBindingTable::new();
        table.insert(vec![ASCII_ESC], EditorAction::ViCommandMode).unwrap();
        table.insert(b"\x1b[A".to_vec(), EditorAction::EdPrevHistory).unwrap();
        table.insert(vec![0x18], EditorAction::EdKillLine).unwrap();
        table.insert(vec![0x18, 0x18], EditorAction::EmExchangeMark).unwrap();
        InputDecoder::new(table, TIMEOUT)
    }

    #[test]
    fn bound_esc_then_letter_inside_timeout_is_meta() {
        let mut input = ScriptedInput::builder().bytes(b"\x1ba").build();
        let keys = decoder_with_bound_leads().decode_next(&mut input).unwrap();
        assert_eq!(keys, vec![Key::meta(b'a')]);
        assert_eq!(keys[0].combined_char(), KeyChar::Byte(0xE1));
    }

    #[test]
    fn bound_non_esc_lead_then_other_byte_is_two_plain_keys() {
        let mut input = ScriptedInput::builder().bytes(b"\x18a").build();
        let mut decoder = decoder_with_bound_leads();
        assert_eq!(
            decoder.decode_next(&mut input).unwrap(),
            vec![Key::plain(0x18), Key::plain(b'a')]
        );
        assert!(matches!(
            decoder.decode_next(&mut input),
            Err(ReadlineError::Eof)
        ));
    }

    #[test]
    fn bound_leads_still_complete_longer_sequences() {
        let mut input = ScriptedInput::builder().bytes(b"\x1b[A\x18\x18").build();
        let keys = decode_all(&mut decoder_with_bound_leads(), &mut input);
        assert_eq!(
            keys,
            vec![
                Key::action(EditorAction::EdPrevHistory),
                Key::action(EditorAction::EmExchangeMark),
            ]
        );
    }

    #[test]
    fn bound_lead_alone_times_out_as_plain_key() {
        let mut input = ScriptedInput::builder()
            .bytes(&[0x18])
            .pause_ms(600)
            .build();
        let keys = decoder_with_bound_leads().decode_next(&mut input).unwrap();
        assert_eq!(keys, vec![Key::plain(0x18)]);
    }

    #[test]
    fn third_byte_is_not_time_bounded() {
        // `ESC [` arrive together, then the user's terminal stalls before `A`.
        let mut input = ScriptedInput::builder()
            .bytes(b"\x1b[")
            .pause_ms(5_000)
            .bytes(b"A")
            .build();
        let keys = decoder().decode_next(&mut input).unwrap();
        assert_eq!(keys, vec![Key::action(EditorAction::EdPrevHistory)]);
    }

    #[test]
    fn partial_sequence_flushed_at_end_of_input() {
        let mut input = ScriptedInput::builder().bytes(b"\x1b[1").build();
        let keys = decoder().decode_next(&mut input).unwrap();
        assert_eq!(
            keys,
            vec![Key::plain(ASCII_ESC), Key::plain(b'['), Key::plain(b'1')]
        );
    }

    #[test]
    fn unmatched_csi_is_flushed_byte_by_byte() {
        // `ESC [ 9` is bound to nothing.
        let mut input = ScriptedInput::builder().bytes(b"\x1b[9").build();
        let keys = decoder().decode_next(&mut input).unwrap();
        assert_eq!(
            keys,
            vec![Key::plain(ASCII_ESC), Key::plain(b'['), Key::plain(b'9')]
        );
    }

    #[test]
    fn macro_binding_expands() {
        let mut table = KeyBindingTable::new();
        table.insert(vec![0x0F], KeyBinding::Macro(b"ls".to_vec())).unwrap();
        let mut decoder = InputDecoder::new(table, TIMEOUT);
        let mut input = ScriptedInput::builder().bytes(&[0x0F]).build();
        assert_eq!(
            decoder.decode_next(&mut input).unwrap(),
            vec![Key::plain(b'l'), Key::plain(b's')]
        );
    }

    #[test]
    fn empty_input_is_eof() {
        let mut input = ScriptedInput::builder().build();
        assert!(matches!(
            decoder().decode_next(&mut input),
            Err(ReadlineError::Eof)
        ));
    }

    #[test]
    fn read_failure_propagates() {
        let mut input = ScriptedInput::new(vec![
            ScriptStep::Byte(b'a'),
            ScriptStep::Fail(io::ErrorKind::BrokenPipe),
        ]);
        let mut decoder = decoder();
        assert_eq!(decoder.decode_next(&mut input).unwrap(), vec![Key::plain(b'a')]);
        assert!(matches!(
            decoder.decode_next(&mut input),
            Err(ReadlineError::Io(err)) if err.kind() == io::ErrorKind::BrokenPipe
        ));
    }
}
