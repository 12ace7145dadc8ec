//! Error taxonomy for action execution

use crate::keys;
use crate::result::ActionResult;
use thiserror::Error;

/// Result of a handler invocation before the executor's barrier
pub type ActionOutcome = Result<ActionResult, ActionError>;

/// Errors raised while validating or running an action
///
/// None of these escape the executor: they are converted into failure
/// [`ActionResult`]s carrying the error as cause.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Malformed DSL or a missing required token; the action never ran
    #[error("invalid {action_type} action: {reason}")]
    Validation { action_type: String, reason: String },

    /// The underlying operation failed
    #[error("{action_type} action failed: {message}")]
    Execution {
        action_type: String,
        message: String,
    },

    /// Pacing between composite items was interrupted
    #[error("interrupted after {completed} of {total} items")]
    InterruptedPacing { completed: usize, total: usize },

    /// No handler registered for the type
    #[error("unknown action type: {0}")]
    UnknownType(String),

    /// Nested execution went deeper than allowed
    #[error("nesting depth {depth} exceeds limit of {limit}")]
    DepthExceeded { depth: usize, limit: usize },

    /// A worker pool refused new work
    #[error("{pool} worker pool is shut down")]
    PoolShutdown { pool: String },

    /// A handler panicked or its task was lost
    #[error("{action_type} handler aborted: {message}")]
    Panicked {
        action_type: String,
        message: String,
    },
}

impl ActionError {
    pub fn validation(action_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            action_type: action_type.into(),
            reason: reason.into(),
        }
    }

    pub fn execution(action_type: impl Into<String>, message: impl ToString) -> Self {
        Self::Execution {
            action_type: action_type.into(),
            message: message.to_string(),
        }
    }

    /// Message catalog key describing this error
    pub fn message_key(&self) -> &'static str {
        match self {
            ActionError::Validation { .. } => keys::ERROR_VALIDATION,
            ActionError::Execution { .. } => keys::ERROR_EXECUTION,
            ActionError::InterruptedPacing { .. } => keys::ERROR_INTERRUPTED,
            ActionError::UnknownType(_) => keys::UNKNOWN_TYPE,
            ActionError::DepthExceeded { .. } => keys::ERROR_DEPTH,
            ActionError::PoolShutdown { .. } => keys::ERROR_POOL_SHUTDOWN,
            ActionError::Panicked { .. } => keys::ERROR_ABORTED,
        }
    }

    /// Whether the action was rejected before anything ran
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ActionError::Validation { .. } | ActionError::UnknownType(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ActionError::validation("delay", "delay must not be negative");
        assert_eq!(
            err.to_string(),
            "invalid delay action: delay must not be negative"
        );
        assert!(err.is_validation());

        let err = ActionError::execution("console", "command rejected");
        assert_eq!(err.to_string(), "console action failed: command rejected");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_message_keys() {
        assert_eq!(
            ActionError::UnknownType("foobar".into()).message_key(),
            "action.unknown_type"
        );
        assert_eq!(
            ActionError::InterruptedPacing {
                completed: 1,
                total: 3
            }
            .message_key(),
            "action.error.interrupted"
        );
    }
}
