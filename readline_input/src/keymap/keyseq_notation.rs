// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Parse key sequences written in inputrc style notation into bytes.
//!
//! | Notation   | Bytes                         |
//! | ---------- | ----------------------------- |
//! | `\e`, `\E` | `ESC`                         |
//! | `\C-x`     | `x & 0x1F` (`\C-?` is `DEL`)  |
//! | `\M-x`     | `ESC x`                       |
//! | `\xNN`     | the byte `0xNN`               |
//! | `\\`       | `\`                           |
//! | `\"`, `\'` | the quote                     |
//! | `\t` `\n` `\r` `\a` `\d` | TAB, LF, CR, BEL, DEL |
//! | anything else | its UTF-8 bytes            |
//!
//! A binding target is either an [`EditorAction`] name (`complete`, `ed_prev_char`) or a
//! double quoted macro (`"hello\n"`).

use crate::{ASCII_DEL, ASCII_ESC, EditorAction, KeyBinding, ReadlineError};
use nom::{IResult, Parser,
          branch::alt,
          bytes::complete::{tag, take_while_m_n},
          character::complete::{char, one_of, satisfy},
          combinator::{all_consuming, map, map_res},
          multi::many1,
          sequence::preceded};
use std::str::FromStr;

/// Parse `input` (eg: `"\e[1;5C"`, `"\C-x\C-x"`) into the bytes a terminal sends.
///
/// # Errors
///
/// Returns [`ReadlineError::InvalidConfig`] if `input` is empty, or holds an escape
/// that isn't in the table above.
pub fn parse_keyseq(input: &str) -> Result<Vec<u8>, ReadlineError> {
    match all_consuming(many1(parse_element)).parse(input) {
        Ok((_, elements)) => Ok(elements.concat()),
        Err(_) => Err(ReadlineError::InvalidConfig(format!(
            "can't parse key sequence `{input}`"
        ))),
    }
}

/// Parse a textual binding such as `("\e[Z", "completion_journey_up")` or
/// `("\C-o", "\"ls\\n\"")`.
///
/// # Errors
///
/// - [`ReadlineError::InvalidConfig`] if either side is not valid notation.
/// - [`ReadlineError::UnknownAction`] if `target` names no [`EditorAction`].
pub fn parse_binding(keyseq: &str, target: &str) -> Result<(Vec<u8>, KeyBinding), ReadlineError> {
    let sequence = parse_keyseq(keyseq)?;
    let binding = match target
        .strip_prefix('"')
        .and_then(|it| it.strip_suffix('"'))
    {
        Some(macro_text) => KeyBinding::Macro(parse_keyseq(macro_text)?),
        None => KeyBinding::Action(
            EditorAction::from_str(target.trim())
                .map_err(|_| ReadlineError::UnknownAction(target.to_string()))?,
        ),
    };
    Ok((sequence, binding))
}

/// One notation element. `\M-` is the only element that produces two bytes.
fn parse_element(input: &str) -> IResult<&str, Vec<u8>> {
    alt((
        map(preceded(tag("\\M-"), parse_single_byte), |byte| {
            vec![ASCII_ESC, byte]
        }),
        map(parse_single_byte, |byte| vec![byte]),
        map(satisfy(|c| c != '\\'), |ch| ch.to_string().into_bytes()),
    ))
    .parse(input)
}

fn parse_single_byte(input: &str) -> IResult<&str, u8> {
    alt((
        map(preceded(tag("\\C-"), parse_single_byte), control_byte),
        map_res(
            preceded(tag("\\x"), take_while_m_n(1, 2, |c: char| c.is_ascii_hexdigit())),
            |hex: &str| u8::from_str_radix(hex, 16),
        ),
        map(preceded(char('\\'), one_of("eE\\\"'tnrad")), |ch| match ch {
            'e' | 'E' => ASCII_ESC,
            't' => b'\t',
            'n' => b'\n',
            'r' => b'\r',
            'a' => 0x07,
            'd' => ASCII_DEL,
            // Quotes and backslash stand for themselves.
            other => other as u8,
        }),
        map(satisfy(|c| c.is_ascii() && c != '\\'), |c| c as u8),
    ))
    .parse(input)
}

fn control_byte(byte: u8) -> u8 {
    match byte {
        b'?' => ASCII_DEL,
        _ => byte & 0x1F,
    }
}
