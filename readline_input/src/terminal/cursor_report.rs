// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Parse the terminal's reply to a Device Status Report (`ESC [ 6 n`).
//!
//! The reply is a Cursor Position Report: `ESC [ <row> ; <col> R`, both 1 based.

use nom::{IResult, Parser,
          bytes::streaming::tag,
          character::streaming::digit1,
          combinator::map_res,
          sequence::{delimited, separated_pair}};

/// Ask the terminal where the cursor is.
pub const DSR_CURSOR_POSITION: &str = "\x1b[6n";

/// 1 based cursor position, as the terminal reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorPosition {
    pub row: u16,
    pub col: u16,
}

/// Parse one report from the start of `input`.
///
/// This is a streaming parser: a prefix of a valid report is
/// [`nom::Err::Incomplete`], so the caller knows to read more bytes.
///
/// # Errors
///
/// [`nom::Err::Incomplete`] for a partial report, [`nom::Err::Error`] if `input` is not
/// a report.
pub fn parse_cursor_position_report(input: &[u8]) -> IResult<&[u8], CursorPosition> {
    let (rem, (row, col)) = delimited(
        /* start */ tag(&b"\x1b["[..]),
        /* output */ separated_pair(parse_number, tag(&b";"[..]), parse_number),
        /* end */ tag(&b"R"[..]),
    )
    .parse(input)?;
    Ok((rem, CursorPosition { row, col }))
}

fn parse_number(input: &[u8]) -> IResult<&[u8], u16> {
    map_res(digit1, |digits: &[u8]| {
        std::str::from_utf8(digits)
            .ok()
            .and_then(|it| it.parse::<u16>().ok())
            .ok_or("not a u16")
    })
    .parse(input)
}

/// Where a report sits inside bytes read from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorReportScan {
    /// A complete report. Bytes outside `start..end` are not part of it.
    Found {
        position: CursorPosition,
        start: usize,
        end: usize,
    },
    /// No report yet, but the bytes from `start` on could still become one.
    Partial { start: usize },
    /// Nothing that looks like a report.
    NotFound,
}

/// Look for a report anywhere in `bytes`. The user may have typed ahead of it.
#[must_use]
pub fn scan_for_cursor_report(bytes: &[u8]) -> CursorReportScan {
    let mut partial = None;
    for (start, _) in bytes.iter().enumerate().filter(|(_, it)| **it == 0x1B) {
        match parse_cursor_position_report(&bytes[start..]) {
            Ok((rem, position)) => {
                return CursorReportScan::Found {
                    position,
                    start,
                    end: bytes.len() - rem.len(),
                };
            }
            Err(nom::Err::Incomplete(_)) => {
                partial.get_or_insert(start);
            }
            Err(_) => {}
        }
    }
    match partial {
        Some(start) => CursorReportScan::Partial { start },
        None => CursorReportScan::NotFound,
    }
}

/// Bytes read while waiting for a report. Only bytes that could still belong to the
/// report are held. Everything else is handed back as typed-ahead input, in order.
#[derive(Debug, Default)]
pub struct CursorReportReader {
    candidate: Vec<u8>,
}

impl CursorReportReader {
    /// Feed one byte. Bytes that can no longer be part of a report are appended to
    /// `typed_ahead`.
    pub fn push(
        &mut self,
        byte: u8,
        typed_ahead: &mut impl Extend<u8>,
    ) -> Option<CursorPosition> {
        self.candidate.push(byte);
        match scan_for_cursor_report(&self.candidate) {
            CursorReportScan::Found {
                position,
                start,
                end,
            } => {
                typed_ahead.extend(self.candidate[..start].iter().copied());
                typed_ahead.extend(self.candidate[end..].iter().copied());
                self.candidate.clear();
                Some(position)
            }
            CursorReportScan::Partial { start } => {
                typed_ahead.extend(self.candidate.drain(..start));
                None
            }
            CursorReportScan::NotFound => {
                typed_ahead.extend(self.candidate.drain(..));
                None
            }
        }
    }

    /// The start of a report that never finished.
    #[must_use]
    pub fn into_unfinished(self) -> Vec<u8> { self.candidate }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_complete_report() {
        let (rem, pos) = parse_cursor_position_report(b"\x1b[12;3Rxy").unwrap();
        assert_eq!(pos, CursorPosition { row: 12, col: 3 });
        assert_eq!(rem, b"xy");
    }

    #[test]
    fn test_parse_partial_report_is_incomplete() {
        for partial in [&b"\x1b"[..], b"\x1b[", b"\x1b[1", b"\x1b[1;", b"\x1b[1;20"] {
            assert!(
                matches!(
                    parse_cursor_position_report(partial),
                    Err(nom::Err::Incomplete(_))
                ),
                "{partial:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_other_sequences() {
        assert!(matches!(
            parse_cursor_position_report(b"\x1b[A"),
            Err(nom::Err::Error(_))
        ));
    }

    #[test]
    fn test_scan_skips_typed_ahead_bytes() {
        let bytes = b"ab\x1b[A\x1b[5;2Rc";
        assert_eq!(
            scan_for_cursor_report(bytes),
            CursorReportScan::Found {
                position: CursorPosition { row: 5, col: 2 },
                start: 5,
                end: 11,
            }
        );
    }

    #[test]
    fn test_scan_partial_and_not_found() {
        assert_eq!(
            scan_for_cursor_report(b"q\x1b[4;"),
            CursorReportScan::Partial { start: 1 }
        );
        assert_eq!(scan_for_cursor_report(b"hello"), CursorReportScan::NotFound);
    }

    #[test]
    fn test_reader_hands_back_typed_ahead_bytes_in_order() {
        let mut reader = CursorReportReader::default();
        let mut typed_ahead = Vec::new();

        let mut found = None;
        for byte in b"ab\x1b[A\x1b[5;2R".iter().copied() {
            found = reader.push(byte, &mut typed_ahead);
            if found.is_some() {
                break;
            }
        }

        assert_eq!(found, Some(CursorPosition { row: 5, col: 2 }));
        assert_eq!(typed_ahead, b"ab\x1b[A".to_vec());
        assert!(reader.into_unfinished().is_empty());
    }

    #[test]
    fn test_reader_only_holds_a_possible_report() {
        let mut reader = CursorReportReader::default();
        let mut typed_ahead = Vec::new();

        for byte in b"xyz\x1b[7;".iter().copied() {
            assert_eq!(reader.push(byte, &mut typed_ahead), None);
        }

        assert_eq!(typed_ahead, b"xyz".to_vec());
        assert_eq!(reader.into_unfinished(), b"\x1b[7;".to_vec());
    }
}
