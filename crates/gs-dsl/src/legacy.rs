//! Legacy grammar: `type:data` and bracketed lists

use crate::block::{block_type, is_block_format, parse_block_values};
use crate::error::{ParseError, ParseResult};
use crate::scan::Scanner;
use gs_core::{Action, DEFAULT_DELIMITER};

/// Split a raw action string into type and data
///
/// Block-form text (`sound { ... }`) keeps the whole block as data. Otherwise
/// the text is split on the first `:`; when there is none, or the part
/// before it is not a plain type name, the whole text becomes the data of
/// `default_type`.
pub fn parse_action(raw: &str, default_type: &str) -> Action {
    let trimmed = raw.trim();

    if let Some(action_type) = block_type(trimmed) {
        return Action::new(action_type, trimmed);
    }

    match trimmed.split_once(DEFAULT_DELIMITER) {
        Some((action_type, data)) if is_type_name(action_type) => {
            Action::new(action_type, data.trim())
        }
        _ => Action::new(default_type, trimmed),
    }
}

fn is_type_name(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Parse a bracketed comma list: `[ "v1", "v2" ]`
///
/// Quoted items may contain commas and escaped quotes; unquoted items run to
/// the next comma. Text without brackets is a single value, and empty text
/// is an empty list.
pub fn parse_legacy_list(text: &str) -> ParseResult<Vec<String>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if !trimmed.starts_with('[') {
        return Ok(vec![trimmed.to_string()]);
    }

    let open = text.len() - text.trim_start().len();
    if !trimmed.ends_with(']') || trimmed.len() < 2 {
        return Err(ParseError::Unclosed {
            expected: ']',
            position: open,
        });
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    let mut scanner = Scanner::with_base(inner, open + 1);
    let mut items = Vec::new();

    loop {
        scanner.skip_whitespace();
        let Some(c) = scanner.peek() else { break };

        if c == '"' {
            let value = scanner.read_quoted()?;
            scanner.skip_whitespace();
            match scanner.peek() {
                Some(',') => {
                    scanner.bump();
                }
                None => {}
                Some(found) => {
                    return Err(ParseError::Unexpected {
                        found,
                        position: scanner.position(),
                        expected: "',' or ']'",
                    })
                }
            }
            items.push(value);
        } else {
            let rest = scanner.rest();
            let end = rest.find(',').unwrap_or(rest.len());
            let value = rest[..end].trim();
            if !value.is_empty() {
                items.push(value.to_string());
            }
            scanner.set_offset(scanner.offset() + end);
            if scanner.peek() == Some(',') {
                scanner.bump();
            }
        }
    }

    Ok(items)
}

/// Values of an action's data in whichever grammar it uses
///
/// - a block (`type { ... }` or a bare `{ - ... }` body) yields its values
/// - a bracket list starting with a quoted item yields its items
/// - anything else is one value; empty data is no value
///
/// Plain text that merely starts with `[` or `{` (`[VIP] Welcome`,
/// `{player} joined`) stays a single value.
pub fn parse_values(action_type: &str, data: &str) -> ParseResult<Vec<String>> {
    let trimmed = data.trim();

    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if is_block_format(trimmed, action_type) || is_bare_block(trimmed) {
        return parse_block_values(trimmed);
    }
    if is_quoted_list(trimmed) {
        return parse_legacy_list(trimmed);
    }

    Ok(vec![trimmed.to_string()])
}

fn is_bare_block(text: &str) -> bool {
    text.starts_with('{')
        && text.ends_with('}')
        && matches!(text[1..].trim_start().chars().next(), Some('-') | Some('}'))
}

fn is_quoted_list(text: &str) -> bool {
    text.starts_with('[')
        && text.ends_with(']')
        && matches!(text[1..].trim_start().chars().next(), Some('"') | Some(']'))
}

/// Split colon-separated arguments, trimming each
///
/// `max` limits the number of pieces (the last keeps any further colons);
/// `0` means no limit.
pub fn split_args(data: &str, max: usize) -> Vec<&str> {
    if max == 0 {
        data.split(DEFAULT_DELIMITER).map(str::trim).collect()
    } else {
        data.splitn(max, DEFAULT_DELIMITER).map(str::trim).collect()
    }
}
