//! Character scanner shared by the grammars

use crate::error::{ParseError, ParseResult};

/// Cursor over a string slice, tracking byte offsets
///
/// `base` is added to every reported position so errors point into the
/// original text even when scanning a sub-slice.
pub(crate) struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    base: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self::with_base(src, 0)
    }

    pub(crate) fn with_base(src: &'a str, base: usize) -> Self {
        Self { src, pos: 0, base }
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    /// Absolute position for error reporting
    pub(crate) fn position(&self) -> usize {
        self.base + self.pos
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub(crate) fn set_offset(&mut self, pos: usize) {
        self.pos = pos.min(self.src.len());
    }

    /// Skip any whitespace, including newlines
    pub(crate) fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Skip spaces and tabs but stop at a line break
    pub(crate) fn skip_inline_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c == ' ' || c == '\t') {
            self.bump();
        }
    }

    /// Consume up to (not including) the next line break
    pub(crate) fn take_line(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// Consume a line break if one is next
    pub(crate) fn eat_newline(&mut self) {
        if self.peek() == Some('\r') {
            self.bump();
        }
        if self.peek() == Some('\n') {
            self.bump();
        }
    }

    /// Read a `"..."` value; the scanner must sit on the opening quote
    ///
    /// `\"` and `\\` are unescaped; any other backslash is kept as-is.
    pub(crate) fn read_quoted(&mut self) -> ParseResult<String> {
        let start = self.position();
        match self.bump() {
            Some('"') => {}
            Some(found) => {
                return Err(ParseError::Unexpected {
                    found,
                    position: start,
                    expected: "'\"'",
                })
            }
            None => return Err(ParseError::UnexpectedEnd { expected: "'\"'" }),
        }

        let mut value = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.peek() {
                    Some(c @ ('"' | '\\')) => {
                        self.bump();
                        value.push(c);
                    }
                    _ => value.push('\\'),
                },
                Some('"') => return Ok(value),
                Some(c) => value.push(c),
                None => return Err(ParseError::UnterminatedQuote { position: start }),
            }
        }
    }
}

/// Strip one pair of surrounding double quotes, unescaping the inside
///
/// Text that is not fully quoted comes back trimmed but otherwise unchanged.
pub(crate) fn unquote(text: &str) -> ParseResult<String> {
    let trimmed = text.trim();
    if !trimmed.starts_with('"') {
        return Ok(trimmed.to_string());
    }

    let mut scanner = Scanner::new(trimmed);
    let value = scanner.read_quoted()?;
    scanner.skip_whitespace();
    match scanner.peek() {
        None => Ok(value),
        Some(found) => Err(ParseError::Unexpected {
            found,
            position: scanner.position(),
            expected: "end of value",
        }),
    }
}

/// Find `keyword` (ASCII case-insensitive) outside quotes and brackets
///
/// The keyword must start the text or follow whitespace or a closing
/// quote/bracket. Returns the byte offset of the match.
pub(crate) fn find_top_level(text: &str, keyword: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let kw = keyword.as_bytes();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == b'"' {
                in_quote = false;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' => in_quote = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {
                if depth == 0
                    && i >= from
                    && bytes.len() - i >= kw.len()
                    && bytes[i..i + kw.len()].eq_ignore_ascii_case(kw)
                {
                    let boundary = i == 0
                        || matches!(bytes[i - 1], b' ' | b'\t' | b'\n' | b'\r' | b'"' | b']' | b'}');
                    if boundary {
                        return Some(i);
                    }
                }
            }
        }
        i += 1;
    }

    None
}
