//! Block grammar: `type { - "v1" - "v2" }`

use crate::error::{ParseError, ParseResult};
use crate::scan::Scanner;
use tracing::trace;

/// Type name of a block-form action, if `text` is one
///
/// A block starts with an identifier (`[A-Za-z_][A-Za-z0-9_-]*`), followed by
/// optional whitespace and `{`, and ends with `}`. The body must open with
/// `-` or be empty, so `Welcome {player}` is not a block.
pub fn block_type(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let ident_len = trimmed
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    let ident = &trimmed[..ident_len];
    let starts_ok = ident
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');

    if !starts_ok {
        return None;
    }

    let after = trimmed[ident_len..].trim_start();
    let body = after.strip_prefix('{')?.trim_start();
    let opens_block = body.starts_with('-') || body.starts_with('}');
    if opens_block && trimmed.ends_with('}') {
        Some(ident)
    } else {
        None
    }
}

/// Whether `text` is a block-form action of the given type
///
/// The type comparison ignores ASCII case.
pub fn is_block_format(text: &str, expected_type: &str) -> bool {
    block_type(text).map_or(false, |t| t.eq_ignore_ascii_case(expected_type.trim()))
}

/// Whether `entry` is an unresolved `random { ... }` block
///
/// Used to keep random blocks from nesting inside random choices and
/// conditional branches.
pub fn is_nested_random_block(entry: &str) -> bool {
    is_block_format(entry, "random")
}

/// Parse the values of a block into an ordered list
///
/// Accepts both the full form (`sound { ... }`) and a bare `{ ... }` body.
/// Each value is introduced by `-` and is one of:
///
/// - a quoted string; `\"` inside it does not end the value
/// - `|` followed by a literal multi-line value, running until the next
///   `-` at the same (or lesser) indentation; the value is dedented and
///   nothing but whitespace may follow `|` on its own line
/// - a bare value running to the end of the line
pub fn parse_block_values(text: &str) -> ParseResult<Vec<String>> {
    let open = text
        .find('{')
        .ok_or(ParseError::MissingKeyword { keyword: "{" })?;
    let close = text
        .rfind('}')
        .filter(|&close| close > open)
        .ok_or(ParseError::Unclosed {
            expected: '}',
            position: open,
        })?;

    if let Some((i, found)) = text[close + 1..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
    {
        return Err(ParseError::Unexpected {
            found,
            position: close + 1 + i,
            expected: "end of block",
        });
    }

    let values = parse_body(&text[open + 1..close], open + 1)?;
    trace!(count = values.len(), "Parsed block values");
    Ok(values)
}

fn parse_body(body: &str, base: usize) -> ParseResult<Vec<String>> {
    let mut scanner = Scanner::with_base(body, base);
    let mut values = Vec::new();

    loop {
        scanner.skip_whitespace();
        let Some(c) = scanner.peek() else { break };

        if c != '-' {
            return Err(ParseError::Unexpected {
                found: c,
                position: scanner.position(),
                expected: "'-'",
            });
        }

        let marker_indent = indentation_at(body, scanner.offset());
        scanner.bump();
        scanner.skip_inline_whitespace();

        match scanner.peek() {
            Some('"') => values.push(scanner.read_quoted()?),
            Some('|') => {
                scanner.bump();
                scanner.skip_inline_whitespace();
                let position = scanner.position();
                if let Some(found) = scanner.take_line().chars().next() {
                    return Err(ParseError::Unexpected {
                        found,
                        position,
                        expected: "line break after '|'",
                    });
                }
                scanner.eat_newline();
                values.push(read_literal(&mut scanner, marker_indent));
            }
            Some('\n') | Some('\r') | None => {
                return Err(ParseError::UnexpectedEnd {
                    expected: "value after '-'",
                })
            }
            Some(_) => {
                let line = scanner.take_line().trim();
                values.push(line.to_string());
            }
        }
    }

    Ok(values)
}

/// Column of `offset` within its line, in characters
fn indentation_at(body: &str, offset: usize) -> usize {
    let line_start = body[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    body[line_start..offset].chars().count()
}

fn leading_blanks(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

fn read_literal(scanner: &mut Scanner<'_>, marker_indent: usize) -> String {
    let mut lines: Vec<&str> = Vec::new();

    while !scanner.is_eof() {
        let line_start = scanner.offset();
        let line = scanner.take_line();
        let indent = leading_blanks(line);

        if line[indent..].starts_with('-') && indent <= marker_indent {
            scanner.set_offset(line_start);
            break;
        }

        lines.push(line);
        scanner.eat_newline();
    }

    dedent(&lines)
}

fn dedent(lines: &[&str]) -> String {
    let min_indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| leading_blanks(l))
        .min()
        .unwrap_or(0);

    let dedented: Vec<&str> = lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                &l[min_indent..]
            }
        })
        .skip_while(|l| l.is_empty())
        .collect();

    dedented.join("\n").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_type() {
        assert_eq!(block_type(r#"sound { - "a" }"#), Some("sound"));
        assert_eq!(block_type(r#"  random{ - "a" }  "#), Some("random"));
        assert_eq!(block_type("message:Hello {player}"), None);
        assert_eq!(block_type("Welcome {player}"), None);
        assert_eq!(block_type("message { }"), Some("message"));
        assert_eq!(block_type("{ - \"a\" }"), None);
        assert_eq!(block_type("sound { - \"a\""), None);
    }

    #[test]
    fn test_is_block_format_ignores_case() {
        assert!(is_block_format(r#"Sound { - "a" }"#, "sound"));
        assert!(!is_block_format(r#"sound { - "a" }"#, "message"));
    }

    #[test]
    fn test_single_line_block() {
        let values =
            parse_block_values(r#"sound { - "ui.click:0.5:1.2" - "block.note:1.0:0.8" }"#).unwrap();
        assert_eq!(values, vec!["ui.click:0.5:1.2", "block.note:1.0:0.8"]);
    }

    #[test]
    fn test_escaped_quote_does_not_terminate() {
        let values = parse_block_values(r#"message { - "He said \"hi\"" - "bye" }"#).unwrap();
        assert_eq!(values, vec![r#"He said "hi""#, "bye"]);
    }

    #[test]
    fn test_multi_line_block_with_bare_values() {
        let text = "message {\n  - \"first\"\n  - second line\n}";
        assert_eq!(parse_block_values(text).unwrap(), vec!["first", "second line"]);
    }

    #[test]
    fn test_literal_block() {
        let text = "message {\n  - |\n    Welcome to the server!\n      - indented dash stays\n\n    Enjoy.\n  - \"after\"\n}";
        let values = parse_block_values(text).unwrap();
        assert_eq!(
            values,
            vec![
                "Welcome to the server!\n  - indented dash stays\n\nEnjoy.",
                "after"
            ]
        );
    }

    #[test]
    fn test_literal_block_until_closing_brace() {
        let text = "console {\n  - |\n    say one\n    say two\n}";
        assert_eq!(parse_block_values(text).unwrap(), vec!["say one\nsay two"]);
    }

    #[test]
    fn test_nested_block_value_kept_whole() {
        let text = r#"random { - "message:A" - "conditional:check:\"permission:vip\" true: message:B" }"#;
        let values = parse_block_values(text).unwrap();
        assert_eq!(values[1], r#"conditional:check:"permission:vip" true: message:B"#);
    }

    #[test]
    fn test_empty_block() {
        assert!(parse_block_values("message { }").unwrap().is_empty());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_block_values(r#"message { - "open }"#),
            Err(ParseError::UnterminatedQuote { .. })
        ));
        assert!(matches!(
            parse_block_values(r#"message { "no dash" }"#),
            Err(ParseError::Unexpected { found: '"', .. })
        ));
        assert!(matches!(
            parse_block_values(r#"message { - "a" "#),
            Err(ParseError::Unclosed { expected: '}', .. })
        ));
        assert!(matches!(
            parse_block_values("message { - }"),
            Err(ParseError::Unexpected { .. }) | Err(ParseError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            parse_block_values(r#"message { - | hello - "x" }"#),
            Err(ParseError::Unexpected { found: 'h', .. })
        ));
    }

    #[test]
    fn test_literal_marker_allows_trailing_blanks() {
        let text = "message {\n  - |   \n    kept\n}";
        assert_eq!(parse_block_values(text).unwrap(), vec!["kept"]);
    }

    #[test]
    fn test_nested_random_detection() {
        assert!(is_nested_random_block(r#"random { - "message:a" }"#));
        assert!(!is_nested_random_block("random:[\"message:a\"]"));
        assert!(!is_nested_random_block("message:random { }"));
    }
}
