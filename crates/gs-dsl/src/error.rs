//! Parse errors

use gs_core::ActionError;
use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors produced while tokenizing action text
///
/// Positions are byte offsets into the text handed to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A quoted value has no closing quote
    #[error("unterminated quoted value starting at {position}")]
    UnterminatedQuote { position: usize },

    /// A bracket or brace was opened but never closed
    #[error("missing closing '{expected}' for the one opened at {position}")]
    Unclosed { expected: char, position: usize },

    /// Something other than what the grammar allows
    #[error("unexpected '{found}' at {position}, expected {expected}")]
    Unexpected {
        found: char,
        position: usize,
        expected: &'static str,
    },

    /// Text ended where a value was required
    #[error("expected {expected} at end of input")]
    UnexpectedEnd { expected: &'static str },

    /// A conditional expression could not be understood
    #[error("invalid condition '{expression}': {reason}")]
    InvalidCondition { expression: String, reason: String },

    /// Required keyword missing
    #[error("missing '{keyword}'")]
    MissingKeyword { keyword: &'static str },
}

impl ParseError {
    /// Convert into a validation error for the given action type
    pub fn into_action_error(self, action_type: &str) -> ActionError {
        ActionError::validation(action_type, self.to_string())
    }
}
