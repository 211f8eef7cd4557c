//! Parser for line-oriented properties text.
//!
//! Accepted syntax:
//! ```text
//! # comment            ! also a comment
//! comp1.propInt = 123
//! comp1.name: example
//! comp1.flag true                  (whitespace separator)
//! comp2.propList = item1, item2    (comma-separated list)
//! comp2.propList = item3           (repeated key appends)
//! long.value = first part \
//!              second part
//! escaped = a\,b \u0041 \t
//! ```
//!
//! Keys run to the first unescaped `=`, `:`, or whitespace. Values are split
//! on unescaped commas and each element is trimmed.

use super::{Properties, PropertiesError};

/// Parse properties text into a [`Properties`] store.
pub fn parse_properties(text: &str) -> Result<Properties, PropertiesError> {
    let mut props = Properties::new();

    for (line_no, logical) in logical_lines(text) {
        let (raw_key, raw_value) = split_key_value(&logical);
        let key = unescape(raw_key, line_no)?;
        let values = split_list(raw_value)
            .into_iter()
            .map(|piece| unescape(piece.trim(), line_no))
            .collect::<Result<Vec<_>, _>>()?;
        props.append(key, values);
    }

    Ok(props)
}

/// Join continuation lines and drop comments and blanks.
///
/// Returns each logical line with the 1-based number of its first physical line.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, physical) in text.lines().enumerate() {
        let trimmed = physical.trim_start();

        let (start, mut buf) = match pending.take() {
            Some(open) => open,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (idx + 1, String::new())
            }
        };

        if ends_with_continuation(trimmed) {
            buf.push_str(&trimmed[..trimmed.len() - 1]);
            pending = Some((start, buf));
        } else {
            buf.push_str(trimmed);
            lines.push((start, buf));
        }
    }

    // Continuation on the final line
    if let Some((start, buf)) = pending {
        if !buf.trim().is_empty() {
            lines.push((start, buf));
        }
    }

    lines
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into its raw (still escaped) key and value.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut separator = None;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                separator = Some((i, c));
                break;
            }
            c if c.is_whitespace() => {
                separator = Some((i, c));
                break;
            }
            _ => {}
        }
    }

    let Some((at, sep)) = separator else {
        return (line, "");
    };

    let key = &line[..at];
    let mut rest = &line[at + sep.len_utf8()..];
    if sep.is_whitespace() {
        rest = rest.trim_start();
        if let Some(stripped) = rest.strip_prefix(['=', ':']) {
            rest = stripped;
        }
    }

    (key, rest.trim_start())
}

/// Split a raw value on unescaped commas.
fn split_list(raw: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in raw.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            ',' => {
                pieces.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&raw[start..]);

    pieces
}

fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let unit = decode_utf16_unit(&hex, line)?;
                let low = if (0xD800..=0xDBFF).contains(&unit) {
                    Some(take_low_surrogate(&mut chars, unit, line)?)
                } else {
                    None
                };
                out.push(combine_units(unit, low, line)?);
            }
            Some(other) => out.push(other),
            // A lone trailing backslash is dropped.
            None => {}
        }
    }

    Ok(out)
}

fn invalid_escape(line: usize, detail: String) -> PropertiesError {
    PropertiesError::InvalidUnicodeEscape { line, detail }
}

/// Decode the four hex digits of one `\uXXXX` escape into a UTF-16 code unit.
fn decode_utf16_unit(hex: &str, line: usize) -> Result<u16, PropertiesError> {
    if hex.chars().count() != 4 {
        return Err(invalid_escape(line, format!("expected 4 hex digits, found {hex:?}")));
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid_escape(line, format!("{hex:?} is not hexadecimal")));
    }
    u16::from_str_radix(hex, 16)
        .map_err(|_| invalid_escape(line, format!("{hex:?} is not hexadecimal")))
}

/// A high surrogate must be followed directly by a `\u` low surrogate.
fn take_low_surrogate(
    chars: &mut std::str::Chars<'_>,
    high: u16,
    line: usize,
) -> Result<u16, PropertiesError> {
    let mut ahead = chars.clone();
    if ahead.next() != Some('\\') || ahead.next() != Some('u') {
        return Err(invalid_escape(
            line,
            format!("high surrogate U+{high:04X} is not followed by a \\u low surrogate"),
        ));
    }
    let hex: String = ahead.by_ref().take(4).collect();
    let low = decode_utf16_unit(&hex, line)?;
    *chars = ahead;
    Ok(low)
}

fn combine_units(unit: u16, low: Option<u16>, line: usize) -> Result<char, PropertiesError> {
    let units: Vec<u16> = std::iter::once(unit).chain(low).collect();
    let mut decoded = char::decode_utf16(units);
    match (decoded.next(), decoded.next()) {
        (Some(Ok(c)), None) => Ok(c),
        _ => Err(invalid_escape(
            line,
            match low {
                Some(low) => format!("U+{unit:04X} U+{low:04X} is not a valid surrogate pair"),
                None => format!("U+{unit:04X} is a lone surrogate"),
            },
        )),
    }
}
