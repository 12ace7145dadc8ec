//! Action results

use crate::error::ActionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Aggregate status of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    /// Everything succeeded
    Success,
    /// Some items of a composite action succeeded
    PartialSuccess,
    /// Nothing succeeded
    Failure,
}

impl ActionStatus {
    /// Status for `succeeded` out of `total` items
    pub fn from_counts(succeeded: usize, total: usize) -> Self {
        if total > 0 && succeeded == total {
            ActionStatus::Success
        } else if succeeded > 0 {
            ActionStatus::PartialSuccess
        } else {
            ActionStatus::Failure
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Success => "SUCCESS",
            ActionStatus::PartialSuccess => "PARTIAL_SUCCESS",
            ActionStatus::Failure => "FAILURE",
        }
    }
}

/// Outcome of executing an action
///
/// `message` is a message catalog key; `replacements` fill its
/// placeholders. Rendering happens outside the engine.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    /// True for `Success` and `PartialSuccess`
    pub success: bool,

    pub status: ActionStatus,

    /// Message catalog key
    pub message: String,

    /// Values for the message placeholders
    pub replacements: HashMap<String, Value>,

    /// Underlying error, if any
    #[serde(skip)]
    pub cause: Option<Arc<ActionError>>,
}

impl ActionResult {
    fn with_status(status: ActionStatus, message: impl Into<String>) -> Self {
        Self {
            success: status != ActionStatus::Failure,
            status,
            message: message.into(),
            replacements: HashMap::new(),
            cause: None,
        }
    }

    /// Successful result with a message key
    pub fn success(message: impl Into<String>) -> Self {
        Self::with_status(ActionStatus::Success, message)
    }

    /// Partially successful result with a message key
    pub fn partial(message: impl Into<String>) -> Self {
        Self::with_status(ActionStatus::PartialSuccess, message)
    }

    /// Failed result with a message key
    pub fn failure(message: impl Into<String>) -> Self {
        Self::with_status(ActionStatus::Failure, message)
    }

    /// Result with an explicit status
    pub fn from_status(status: ActionStatus, message: impl Into<String>) -> Self {
        Self::with_status(status, message)
    }

    /// Failed result describing `error`, which becomes the cause
    pub fn from_error(error: ActionError) -> Self {
        let mut result =
            Self::failure(error.message_key()).with("error", Value::String(error.to_string()));

        match &error {
            ActionError::Validation { action_type, .. }
            | ActionError::Execution { action_type, .. }
            | ActionError::Panicked { action_type, .. } => {
                result = result.with("type", Value::String(action_type.clone()));
            }
            ActionError::UnknownType(action_type) => {
                result = result.with("type", Value::String(action_type.clone()));
            }
            ActionError::InterruptedPacing { completed, total } => {
                result = result
                    .with("completed", Value::from(*completed))
                    .with("total", Value::from(*total));
            }
            ActionError::DepthExceeded { depth, limit } => {
                result = result
                    .with("depth", Value::from(*depth))
                    .with("limit", Value::from(*limit));
            }
            ActionError::PoolShutdown { pool } => {
                result = result.with("pool", Value::String(pool.clone()));
            }
        }

        result.cause = Some(Arc::new(error));
        result
    }

    /// Add a replacement value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.replacements.insert(key.into(), value.into());
        self
    }

    /// Attach a cause without changing the status
    pub fn with_cause(mut self, cause: ActionError) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn replacement(&self, key: &str) -> Option<&Value> {
        self.replacements.get(key)
    }

    /// Replacement rendered as plain text (strings without quotes)
    pub fn replacement_str(&self, key: &str) -> Option<String> {
        self.replacements.get(key).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_counts() {
        assert_eq!(ActionStatus::from_counts(3, 3), ActionStatus::Success);
        assert_eq!(ActionStatus::from_counts(2, 3), ActionStatus::PartialSuccess);
        assert_eq!(ActionStatus::from_counts(0, 3), ActionStatus::Failure);
        assert_eq!(ActionStatus::from_counts(0, 0), ActionStatus::Failure);
    }

    #[test]
    fn test_partial_counts_as_success() {
        let result = ActionResult::partial("action.composite.partial_success");
        assert!(result.success);
        assert_eq!(result.status.as_str(), "PARTIAL_SUCCESS");
    }

    #[test]
    fn test_from_error_carries_cause() {
        let result = ActionResult::from_error(ActionError::UnknownType("foobar".into()));
        assert!(!result.success);
        assert_eq!(result.message, "action.unknown_type");
        assert_eq!(result.replacement_str("type").as_deref(), Some("foobar"));
        assert!(matches!(
            result.cause.as_deref(),
            Some(ActionError::UnknownType(t)) if t == "foobar"
        ));
    }

    #[test]
    fn test_status_serializes_screaming_case() {
        let json = serde_json::to_value(ActionResult::success("ok")).unwrap();
        assert_eq!(json["status"], "SUCCESS");
        assert!(json.get("cause").is_none());
    }
}
