//! Multi-value execution with pacing
//!
//! Leaf handlers accept several values at once (`message { - "a" - "b" }`).
//! The values run one after another with a pause in between, and the
//! outcome is folded into one aggregate result.

use gs_core::{keys, ActionError, ActionOutcome, ActionResult, ActionStatus};
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Run each value through `run`, pausing `pacing` between items
///
/// A single value returns that item's own outcome. For several values every
/// item runs regardless of earlier failures. If `interrupt` fires during a
/// pause the remaining items are skipped and the partial aggregate carries
/// an [`ActionError::InterruptedPacing`] cause.
pub async fn run_values<F, Fut>(
    action_type: &str,
    values: Vec<String>,
    pacing: Duration,
    interrupt: &CancellationToken,
    mut run: F,
) -> ActionOutcome
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ActionOutcome>,
{
    let total = values.len();
    if total == 0 {
        return Err(ActionError::validation(action_type, "no values given"));
    }
    if total == 1 {
        let value = values.into_iter().next().unwrap_or_default();
        return run(value).await;
    }

    let mut results = Vec::with_capacity(total);
    for (index, value) in values.into_iter().enumerate() {
        if index > 0 && !pacing.is_zero() {
            tokio::select! {
                biased;
                _ = interrupt.cancelled() => {
                    warn!(
                        action_type,
                        completed = index,
                        total,
                        "Pacing interrupted, skipping remaining values"
                    );
                    let cause = ActionError::InterruptedPacing {
                        completed: index,
                        total,
                    };
                    return Ok(aggregate(action_type, &results, total)
                        .with("interrupted", true)
                        .with_cause(cause));
                }
                _ = tokio::time::sleep(pacing) => {}
            }
        }

        let result = match run(value).await {
            Ok(result) => result,
            Err(err) => {
                debug!(action_type, index, error = %err, "Composite item failed");
                ActionResult::from_error(err)
            }
        };
        results.push(result);
    }

    Ok(aggregate(action_type, &results, total))
}

/// Fold item results into one aggregate
///
/// `total` may exceed `results.len()` when execution stopped early; the
/// missing items count as not succeeded.
pub fn aggregate(action_type: &str, results: &[ActionResult], total: usize) -> ActionResult {
    let succeeded = results.iter().filter(|r| r.success).count();
    let status = ActionStatus::from_counts(succeeded, total);
    let key = match status {
        ActionStatus::Success => keys::COMPOSITE_SUCCESS,
        ActionStatus::PartialSuccess => keys::COMPOSITE_PARTIAL,
        ActionStatus::Failure => keys::COMPOSITE_FAILURE,
    };

    let details: Vec<Value> = results
        .iter()
        .enumerate()
        .map(|(index, r)| {
            let mut item = json!({
                "index": index,
                "success": r.success,
                "status": r.status.as_str(),
                "message": r.message,
            });
            if let Some(error) = r.replacement("error") {
                item["error"] = error.clone();
            }
            item
        })
        .collect();

    ActionResult::from_status(status, key)
        .with("type", action_type)
        .with("success_count", succeeded)
        .with("total_count", total)
        .with("details", details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    async fn run_ok_unless_bad(value: String) -> ActionOutcome {
        if value == "bad" {
            Err(ActionError::execution("message", "rejected"))
        } else {
            Ok(ActionResult::success(keys::MESSAGE_SENT).with("text", value))
        }
    }

    #[tokio::test]
    async fn test_single_value_returns_item_result() {
        let token = CancellationToken::new();
        let result = run_values("message", values(&["hi"]), Duration::ZERO, &token, |v| {
            run_ok_unless_bad(v)
        })
        .await
        .unwrap();

        assert_eq!(result.message, keys::MESSAGE_SENT);
        assert_eq!(result.replacement_str("text").as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_partial_success_counts() {
        let token = CancellationToken::new();
        let result = run_values(
            "message",
            values(&["a", "bad", "c"]),
            Duration::ZERO,
            &token,
            run_ok_unless_bad,
        )
        .await
        .unwrap();

        assert_eq!(result.status, ActionStatus::PartialSuccess);
        assert!(result.success);
        assert_eq!(result.message, keys::COMPOSITE_PARTIAL);
        assert_eq!(result.replacement("success_count"), Some(&json!(2)));
        assert_eq!(result.replacement("total_count"), Some(&json!(3)));

        let details = result.replacement("details").unwrap().as_array().unwrap();
        assert_eq!(details.len(), 3);
        assert_eq!(details[1]["success"], json!(false));
        assert!(details[1]["error"].as_str().unwrap().contains("rejected"));
    }

    #[tokio::test]
    async fn test_all_failed() {
        let token = CancellationToken::new();
        let result = run_values(
            "message",
            values(&["bad", "bad"]),
            Duration::ZERO,
            &token,
            run_ok_unless_bad,
        )
        .await
        .unwrap();

        assert_eq!(result.status, ActionStatus::Failure);
        assert!(!result.success);
        assert_eq!(result.message, keys::COMPOSITE_FAILURE);
    }

    #[tokio::test]
    async fn test_empty_values_rejected() {
        let token = CancellationToken::new();
        let err = run_values("message", Vec::new(), Duration::ZERO, &token, run_ok_unless_bad)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_between_items() {
        let token = CancellationToken::new();
        let start = tokio::time::Instant::now();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let result = run_values(
            "title",
            values(&["a", "b", "c"]),
            Duration::from_millis(500),
            &token,
            |v| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push(start.elapsed().as_millis());
                    Ok(ActionResult::success(keys::TITLE_SENT).with("title", v))
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(result.status, ActionStatus::Success);
        assert_eq!(*seen.lock().unwrap(), vec![0, 500, 1000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_pacing_keeps_partial_results() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(750)).await;
            canceller.cancel();
        });

        let result = run_values(
            "message",
            values(&["a", "b", "c", "d"]),
            Duration::from_millis(500),
            &token,
            run_ok_unless_bad,
        )
        .await
        .unwrap();

        assert_eq!(result.status, ActionStatus::PartialSuccess);
        assert_eq!(result.replacement("success_count"), Some(&json!(2)));
        assert_eq!(result.replacement("total_count"), Some(&json!(4)));
        assert_eq!(result.replacement("interrupted"), Some(&json!(true)));
        assert!(matches!(
            result.cause.as_deref(),
            Some(ActionError::InterruptedPacing {
                completed: 2,
                total: 4
            })
        ));
    }
}
