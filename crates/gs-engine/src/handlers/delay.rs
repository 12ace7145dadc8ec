//! Delayed actions
//!
//! `delay:<ms>[:<action>]` or `delay { - "<ms>" - "<action>" ... }`. A zero
//! delay runs the chained actions inline; anything longer is scheduled on
//! the delay pool and the caller gets `action.delay.scheduled` right away.

use crate::composite;
use crate::executor::ActionExecutor;
use crate::handler::ActionHandler;
use async_trait::async_trait;
use gs_config::MAX_DELAY_MS;
use gs_core::{keys, ActionContext, ActionError, ActionOutcome, ActionResult, Actor};
use gs_dsl::{is_block_format, parse_block_values, split_args};
use std::time::Duration;
use tracing::{debug, warn};

/// Parsed delay data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelaySpec {
    pub delay_ms: u64,
    pub chained: Vec<String>,
}

/// Parse delay data, rejecting negative and over-limit delays
pub fn parse_delay(data: &str, max_delay_ms: u64) -> Result<DelaySpec, ActionError> {
    let trimmed = data.trim();
    let (delay, chained) = if is_block_format(trimmed, "delay") || trimmed.starts_with('{') {
        let mut values = parse_block_values(trimmed)
            .map_err(|e| e.into_action_error("delay"))?
            .into_iter();
        let delay = values
            .next()
            .ok_or_else(|| ActionError::validation("delay", "missing delay"))?;
        (delay, values.collect::<Vec<_>>())
    } else {
        let parts = split_args(trimmed, 2);
        let chained = parts
            .get(1)
            .filter(|c| !c.is_empty())
            .map(|c| vec![c.to_string()])
            .unwrap_or_default();
        (parts[0].to_string(), chained)
    };

    let delay: i64 = delay
        .trim()
        .parse()
        .map_err(|_| ActionError::validation("delay", format!("'{}' is not a number", delay)))?;
    if delay < 0 {
        return Err(ActionError::validation("delay", "delay must not be negative"));
    }

    let max = max_delay_ms.min(MAX_DELAY_MS);
    let delay_ms = delay as u64;
    if delay_ms > max {
        return Err(ActionError::validation(
            "delay",
            format!("delay of {} ms exceeds the maximum of {} ms", delay_ms, max),
        ));
    }

    Ok(DelaySpec { delay_ms, chained })
}

/// Waits, then runs the chained actions
pub struct DelayHandler {
    max_delay_ms: u64,
}

impl DelayHandler {
    pub fn new(max_delay_ms: u64) -> Self {
        Self {
            max_delay_ms: max_delay_ms.min(MAX_DELAY_MS),
        }
    }
}

#[async_trait]
impl ActionHandler for DelayHandler {
    fn type_name(&self) -> &str {
        "delay"
    }

    async fn execute(
        &self,
        actor: &Actor,
        data: &str,
        ctx: &ActionContext,
        executor: &ActionExecutor,
    ) -> ActionOutcome {
        let spec = parse_delay(data, self.max_delay_ms)?;

        if spec.delay_ms == 0 {
            let mut results = Vec::with_capacity(spec.chained.len());
            for action in &spec.chained {
                results.push(executor.execute_nested(actor, action, ctx).await);
            }
            return Ok(match results.len() {
                0 => ActionResult::success(keys::DELAY_COMPLETED).with("delay_ms", 0),
                1 => results.remove(0),
                total => composite::aggregate("delay", &results, total),
            });
        }

        let scheduled = ActionResult::success(keys::DELAY_SCHEDULED)
            .with("delay_ms", spec.delay_ms)
            .with("actions", spec.chained.len());
        if spec.chained.is_empty() {
            return Ok(scheduled);
        }

        let task_executor = executor.clone();
        let task_actor = actor.clone();
        let task_ctx = ctx.clone();
        let delay_ms = spec.delay_ms;
        let chained = spec.chained;

        executor.delay_pool().spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            for action in &chained {
                let result = task_executor
                    .execute_nested(&task_actor, action, &task_ctx)
                    .await;
                if result.success {
                    debug!(action = %action, delay_ms, "Delayed action finished");
                } else {
                    warn!(action = %action, delay_ms, message = %result.message, "Delayed action failed");
                }
            }
        })?;

        debug!(delay_ms, "Delayed actions scheduled");
        Ok(scheduled)
    }

    fn is_valid_action(&self, data: &str) -> bool {
        parse_delay(data, self.max_delay_ms).is_ok()
    }

    fn describe(&self) -> &str {
        "Wait before running the chained actions"
    }

    fn usage_examples(&self) -> &[&str] {
        &[
            "delay:1000:message:One second later",
            r#"delay { - "2500" - "sound:entity.player.levelup" - "message:Done" }"#,
            "delay:0:console:say now",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(parse_delay("30000", 30_000).unwrap().delay_ms, 30_000);
        assert!(parse_delay("30001", 30_000).unwrap_err().is_validation());
        assert!(parse_delay("-1", 30_000).unwrap_err().is_validation());
        assert!(parse_delay("soon", 30_000).unwrap_err().is_validation());
        assert!(parse_delay("5000", 1_000).is_err());
    }

    #[test]
    fn test_chained_action_keeps_colons() {
        let spec = parse_delay("1000:message:Hello: there", 30_000).unwrap();
        assert_eq!(spec.delay_ms, 1000);
        assert_eq!(spec.chained, vec!["message:Hello: there"]);
    }

    #[test]
    fn test_block_form() {
        let spec = parse_delay(r#"delay { - "250" - "message:a" - "message:b" }"#, 30_000).unwrap();
        assert_eq!(spec.delay_ms, 250);
        assert_eq!(spec.chained, vec!["message:a", "message:b"]);
    }
}
