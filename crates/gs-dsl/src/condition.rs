//! Conditional grammar
//!
//! ```text
//! check:"<expr>" true: <action-list> false: <action-list>
//!
//! expr := term (("||" | "&&") term)*
//! term := "placeholder:<name> <op> <value>" | "permission:<name>"
//! op   := ">=" | "<=" | "==" | "!=" | ">" | "<"
//! ```
//!
//! Expressions are folded strictly left to right with no precedence
//! grouping: `a || b && c` means `(a || b) && c`.

use crate::block::block_type;
use crate::error::{ParseError, ParseResult};
use crate::legacy::{parse_legacy_list, parse_values};
use crate::scan::{find_top_level, unquote, Scanner};
use std::fmt;

/// Comparison operator in a placeholder term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Ge,
    Le,
    Eq,
    Ne,
    Gt,
    Lt,
}

impl Comparison {
    /// Operators in match order (two-character ones first)
    const ALL: [(&'static str, Comparison); 6] = [
        (">=", Comparison::Ge),
        ("<=", Comparison::Le),
        ("==", Comparison::Eq),
        ("!=", Comparison::Ne),
        (">", Comparison::Gt),
        ("<", Comparison::Lt),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Ge => ">=",
            Comparison::Le => "<=",
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
        }
    }

    /// Compare two values
    ///
    /// Numeric when both sides parse as numbers. Otherwise `==`/`!=` compare
    /// the text and ordering operators are false.
    pub fn compare(&self, left: &str, right: &str) -> bool {
        let (left, right) = (left.trim(), right.trim());

        if let (Ok(l), Ok(r)) = (left.parse::<f64>(), right.parse::<f64>()) {
            return match self {
                Comparison::Ge => l >= r,
                Comparison::Le => l <= r,
                Comparison::Eq => l == r,
                Comparison::Ne => l != r,
                Comparison::Gt => l > r,
                Comparison::Lt => l < r,
            };
        }

        match self {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            _ => false,
        }
    }
}

/// Boolean connective between terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

/// One condition term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// `placeholder:<name> <op> <value>`
    Placeholder {
        name: String,
        op: Comparison,
        value: String,
    },
    /// `permission:<node>`
    Permission(String),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Placeholder { name, op, value } => {
                write!(f, "placeholder:{} {} {}", name, op.as_str(), value)
            }
            Term::Permission(node) => write!(f, "permission:{}", node),
        }
    }
}

/// A parsed condition expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    first: Term,
    rest: Vec<(Connective, Term)>,
}

impl Expression {
    /// Parse an expression
    pub fn parse(source: &str) -> ParseResult<Self> {
        let invalid = |reason: &str| ParseError::InvalidCondition {
            expression: source.to_string(),
            reason: reason.to_string(),
        };

        let mut terms = Vec::new();
        let mut connectives = Vec::new();
        let mut remaining = source;

        loop {
            let next = [("||", Connective::Or), ("&&", Connective::And)]
                .into_iter()
                .filter_map(|(token, conn)| {
                    find_outside_quotes(remaining, token).map(|pos| (pos, conn))
                })
                .min_by_key(|(pos, _)| *pos);

            match next {
                Some((pos, conn)) => {
                    let term = Term::parse(&remaining[..pos]).map_err(|r| invalid(r.as_str()))?;
                    terms.push(term);
                    connectives.push(conn);
                    remaining = &remaining[pos + 2..];
                }
                None => {
                    terms.push(Term::parse(remaining).map_err(|r| invalid(r.as_str()))?);
                    break;
                }
            }
        }

        let mut terms = terms.into_iter();
        let first = terms.next().ok_or_else(|| invalid("empty expression"))?;
        Ok(Self {
            first,
            rest: connectives.into_iter().zip(terms).collect(),
        })
    }

    /// Evaluate left to right, calling `eval` for each term that matters
    ///
    /// `a && b` skips `b` when the running value is already false, and
    /// `a || b` skips `b` when it is already true; the fold itself never
    /// regroups terms.
    pub fn evaluate<F>(&self, mut eval: F) -> bool
    where
        F: FnMut(&Term) -> bool,
    {
        let mut value = eval(&self.first);
        for (conn, term) in &self.rest {
            value = match conn {
                Connective::And => value && eval(term),
                Connective::Or => value || eval(term),
            };
        }
        value
    }

    /// All terms in source order
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, t)| t))
    }
}

impl Term {
    fn parse(source: &str) -> Result<Self, String> {
        let text = source.trim();
        if text.is_empty() {
            return Err("empty term".to_string());
        }

        if let Some(rest) = strip_prefix_ignore_case(text, "placeholder:") {
            let (pos, op) = find_operator(rest)
                .ok_or_else(|| format!("missing comparison operator in '{}'", text))?;
            let name = rest[..pos]
                .trim()
                .trim_start_matches('{')
                .trim_end_matches('}')
                .trim();
            if name.is_empty() {
                return Err(format!("missing placeholder name in '{}'", text));
            }
            let value = unquote(&rest[pos + op.as_str().len()..]).map_err(|e| e.to_string())?;
            return Ok(Term::Placeholder {
                name: name.to_string(),
                op,
                value,
            });
        }

        if let Some(rest) = strip_prefix_ignore_case(text, "permission:") {
            let node = rest.trim();
            if node.is_empty() || node.contains(char::is_whitespace) {
                return Err(format!("invalid permission node in '{}'", text));
            }
            return Ok(Term::Permission(node.to_string()));
        }

        Err(format!(
            "unknown term '{}', expected placeholder:<name> <op> <value> or permission:<node>",
            text
        ))
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&text[prefix.len()..]),
        _ => None,
    }
}

fn find_operator(text: &str) -> Option<(usize, Comparison)> {
    let mut in_quote = false;
    for (i, c) in text.char_indices() {
        if c == '"' {
            in_quote = !in_quote;
        }
        if in_quote {
            continue;
        }
        for (token, op) in Comparison::ALL {
            if text[i..].starts_with(token) {
                return Some((i, op));
            }
        }
    }
    None
}

fn find_outside_quotes(text: &str, token: &str) -> Option<usize> {
    let mut in_quote = false;
    for (i, c) in text.char_indices() {
        if c == '"' {
            in_quote = !in_quote;
        } else if !in_quote && text[i..].starts_with(token) {
            return Some(i);
        }
    }
    None
}

/// Parsed `check:` action data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalSpec {
    /// Expression text as written
    pub source: String,
    pub expression: Expression,
    /// Raw actions for the true branch
    pub when_true: Vec<String>,
    /// Raw actions for the false branch (may be empty)
    pub when_false: Vec<String>,
}

/// Parse `check:"<expr>" true: <actions> false: <actions>`
///
/// Each branch is a single action string, a bracket list or a `{ - ... }`
/// block. At least one branch must be present.
///
/// Keywords are found outside quotes and brackets only. A bare branch whose
/// text contains ` true:` or ` false:` is split there, so such text must be
/// written as a bracket list or a block.
pub fn parse_conditional(data: &str) -> ParseResult<ConditionalSpec> {
    let text = data.trim();
    let after_check = strip_prefix_ignore_case(text, "check:")
        .ok_or(ParseError::MissingKeyword { keyword: "check:" })?;
    let check_offset = text.len() - after_check.len();

    let mut scanner = Scanner::with_base(after_check, check_offset);
    scanner.skip_whitespace();

    let (source, branches_from) = if scanner.peek() == Some('"') {
        let source = scanner.read_quoted()?;
        (source, check_offset + scanner.offset())
    } else {
        let start = check_offset + scanner.offset();
        let end = [
            find_top_level(text, "true:", start),
            find_top_level(text, "false:", start),
        ]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(text.len());
        (text[start..end].trim().to_string(), end)
    };

    let expression = Expression::parse(&source)?;

    let true_at = find_top_level(text, "true:", branches_from);
    let false_at = find_top_level(text, "false:", branches_from);

    let (when_true, when_false) = match (true_at, false_at) {
        (None, None) => return Err(ParseError::MissingKeyword { keyword: "true:" }),
        (Some(t), None) => (parse_branch(&text[t + 5..])?, Vec::new()),
        (None, Some(f)) => (Vec::new(), parse_branch(&text[f + 6..])?),
        (Some(t), Some(f)) if t < f => (
            parse_branch(&text[t + 5..f])?,
            parse_branch(&text[f + 6..])?,
        ),
        (Some(t), Some(f)) => (
            parse_branch(&text[t + 5..])?,
            parse_branch(&text[f + 6..t])?,
        ),
    };

    let first_branch = true_at.into_iter().chain(false_at).min().unwrap_or(text.len());
    let between = &text[branches_from..first_branch];
    if let Some(found) = between.trim().chars().next() {
        return Err(ParseError::Unexpected {
            found,
            position: branches_from,
            expected: "'true:' or 'false:'",
        });
    }

    Ok(ConditionalSpec {
        source,
        expression,
        when_true,
        when_false,
    })
}

fn parse_branch(text: &str) -> ParseResult<Vec<String>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if block_type(trimmed).is_some() {
        return Ok(vec![trimmed.to_string()]);
    }
    if trimmed.starts_with('[') {
        return parse_legacy_list(trimmed);
    }
    if trimmed.starts_with('{') {
        return parse_values("", trimmed);
    }
    Ok(vec![trimmed.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_with(expr: &Expression, x: f64, has_perm: bool) -> bool {
        expr.evaluate(|term| match term {
            Term::Placeholder { op, value, .. } => op.compare(&x.to_string(), value),
            Term::Permission(_) => has_perm,
        })
    }

    #[test]
    fn test_flat_and() {
        let expr = Expression::parse("placeholder:x >= 5 && permission:y").unwrap();
        assert!(eval_with(&expr, 10.0, true));
        assert!(!eval_with(&expr, 3.0, true));
        assert!(!eval_with(&expr, 3.0, false));
        assert!(!eval_with(&expr, 10.0, false));
    }

    #[test]
    fn test_left_to_right_without_precedence() {
        // (true || false) && false == false, where precedence would give true
        let expr = Expression::parse("permission:a || permission:b && permission:c").unwrap();
        let result = expr.evaluate(|term| matches!(term, Term::Permission(p) if p == "a"));
        assert!(!result);
    }

    #[test]
    fn test_short_circuit_skips_terms() {
        let expr = Expression::parse("permission:a && permission:b").unwrap();
        let mut seen = Vec::new();
        expr.evaluate(|term| {
            seen.push(term.to_string());
            false
        });
        assert_eq!(seen, vec!["permission:a"]);
    }

    #[test]
    fn test_term_parsing() {
        let expr = Expression::parse(r#"placeholder:{rank} == "gold" || placeholder:lvl<3"#).unwrap();
        let terms: Vec<_> = expr.terms().cloned().collect();
        assert_eq!(
            terms,
            vec![
                Term::Placeholder {
                    name: "rank".into(),
                    op: Comparison::Eq,
                    value: "gold".into()
                },
                Term::Placeholder {
                    name: "lvl".into(),
                    op: Comparison::Lt,
                    value: "3".into()
                },
            ]
        );
    }

    #[test]
    fn test_invalid_terms() {
        assert!(Expression::parse("").is_err());
        assert!(Expression::parse("placeholder:x").is_err());
        assert!(Expression::parse("placeholder: >= 3").is_err());
        assert!(Expression::parse("perm:x").is_err());
        assert!(Expression::parse("permission:a &&").is_err());
    }

    #[test]
    fn test_compare() {
        assert!(Comparison::Ge.compare("10", "5"));
        assert!(Comparison::Eq.compare("5.0", "5"));
        assert!(Comparison::Eq.compare("gold", "gold"));
        assert!(Comparison::Ne.compare("gold", "silver"));
        assert!(!Comparison::Gt.compare("gold", "silver"));
    }

    #[test]
    fn test_parse_conditional_full() {
        let spec = parse_conditional(
            r#"check:"placeholder:level >= 5 && permission:vip" true: [ "message:Welcome", "sound:ui.click" ] false: message:Too low"#,
        )
        .unwrap();
        assert_eq!(spec.source, "placeholder:level >= 5 && permission:vip");
        assert_eq!(spec.when_true, vec!["message:Welcome", "sound:ui.click"]);
        assert_eq!(spec.when_false, vec!["message:Too low"]);
    }

    #[test]
    fn test_parse_conditional_unquoted_and_missing_false() {
        let spec = parse_conditional("check:permission:vip true: console:say hi").unwrap();
        assert_eq!(spec.source, "permission:vip");
        assert_eq!(spec.when_true, vec!["console:say hi"]);
        assert!(spec.when_false.is_empty());
    }

    #[test]
    fn test_parse_conditional_block_branch() {
        let spec = parse_conditional(
            r#"check:"permission:vip" true: random { - "message:a" - "message:b" } false: { - "message:no" - "sound:ui.deny" }"#,
        )
        .unwrap();
        assert_eq!(spec.when_true, vec![r#"random { - "message:a" - "message:b" }"#]);
        assert_eq!(spec.when_false, vec!["message:no", "sound:ui.deny"]);
    }

    #[test]
    fn test_parse_conditional_errors() {
        assert!(matches!(
            parse_conditional("permission:vip true: message:x"),
            Err(ParseError::MissingKeyword { keyword: "check:" })
        ));
        assert!(matches!(
            parse_conditional(r#"check:"permission:vip""#),
            Err(ParseError::MissingKeyword { keyword: "true:" })
        ));
        assert!(matches!(
            parse_conditional(r#"check:"permission:vip" junk true: message:x"#),
            Err(ParseError::Unexpected { .. })
        ));
        assert!(matches!(
            parse_conditional(r#"check:"bogus:1" true: message:x"#),
            Err(ParseError::InvalidCondition { .. })
        ));
    }

    #[test]
    fn test_branch_keywords_inside_bare_text_split() {
        let spec =
            parse_conditional(r#"check:"permission:vip" true: message:It is false: yes"#).unwrap();
        assert_eq!(spec.when_true, vec!["message:It is"]);
        assert_eq!(spec.when_false, vec!["yes"]);

        let spec = parse_conditional(
            r#"check:"permission:vip" true: [ "message:It is false: yes" ] false: { - "message:It is true: no" }"#,
        )
        .unwrap();
        assert_eq!(spec.when_true, vec!["message:It is false: yes"]);
        assert_eq!(spec.when_false, vec!["message:It is true: no"]);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = r#"check:"placeholder:x > 1" true: message:a false: message:b"#;
        assert_eq!(parse_conditional(text).unwrap(), parse_conditional(text).unwrap());
    }
}
