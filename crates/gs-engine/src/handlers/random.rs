//! Weighted random choice

use crate::executor::ActionExecutor;
use crate::handler::ActionHandler;
use async_trait::async_trait;
use gs_core::{keys, ActionContext, ActionError, ActionOutcome, ActionResult, Actor};
use gs_dsl::{is_nested_random_block, parse_values, parse_weighted_entry, WeightedAction};
use rand::Rng;
use tracing::{debug, warn};

tokio::task_local! {
    /// Set while a task on the random pool runs its chosen action
    static ON_RANDOM_WORKER: ();
}

fn on_random_worker() -> bool {
    ON_RANDOM_WORKER.try_with(|_| ()).is_ok()
}

/// Pick an entry with probability proportional to its weight
///
/// Draws uniformly from `[0, total)` and returns the first entry whose
/// cumulative weight reaches the draw, or the last entry if rounding leaves
/// the draw past the end.
pub fn select_weighted<'a, R>(entries: &'a [WeightedAction], rng: &mut R) -> Option<&'a WeightedAction>
where
    R: Rng + ?Sized,
{
    let total: f64 = entries.iter().map(|e| e.weight).sum();
    if entries.is_empty() || !(total > 0.0) || !total.is_finite() {
        return None;
    }

    let draw = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for entry in entries {
        cumulative += entry.weight;
        if cumulative >= draw {
            return Some(entry);
        }
    }
    entries.last()
}

/// Runs one of several weighted actions
///
/// `random { - "message:Common:8" - "message:Rare:2" }`. The chosen action
/// runs on the bounded random pool and the caller waits for its result. A
/// random reached from inside a random worker runs its choice in place, so
/// nesting never waits on a second permit of the same pool.
pub struct RandomHandler;

impl RandomHandler {
    fn entries(data: &str, executor: &ActionExecutor) -> Result<Vec<WeightedAction>, ActionError> {
        let values = parse_values("random", data).map_err(|e| e.into_action_error("random"))?;

        Ok(values
            .iter()
            .filter(|value| {
                let nested = is_nested_random_block(value);
                if nested {
                    warn!(entry = %value, "Skipping nested random block");
                }
                !nested
            })
            .filter_map(|value| parse_weighted_entry(value, |action| executor.is_valid(action)))
            .collect())
    }
}

#[async_trait]
impl ActionHandler for RandomHandler {
    fn type_name(&self) -> &str {
        "random"
    }

    async fn execute(
        &self,
        actor: &Actor,
        data: &str,
        ctx: &ActionContext,
        executor: &ActionExecutor,
    ) -> ActionOutcome {
        let entries = Self::entries(data, executor)?;
        let Some(chosen) = select_weighted(&entries, &mut rand::thread_rng()).cloned() else {
            warn!("No eligible random entries");
            return Ok(ActionResult::failure(keys::RANDOM_EMPTY));
        };
        debug!(action = %chosen.action, weight = chosen.weight, candidates = entries.len(), "Random action selected");

        let result = if on_random_worker() {
            debug!("Already on a random worker, running choice in place");
            executor.execute_nested(actor, &chosen.action, ctx).await
        } else {
            let task_executor = executor.clone();
            let task_actor = actor.clone();
            let task_ctx = ctx.clone();
            let action = chosen.action.clone();
            let handle = executor.random_pool().spawn(ON_RANDOM_WORKER.scope((), async move {
                task_executor
                    .execute_nested(&task_actor, &action, &task_ctx)
                    .await
            }))?;

            handle.await.map_err(|e| ActionError::Panicked {
                action_type: "random".to_string(),
                message: e.to_string(),
            })?
        };

        Ok(result
            .with("selected", chosen.action)
            .with("weight", chosen.weight))
    }

    fn is_valid_action(&self, data: &str) -> bool {
        parse_values("random", data)
            .map(|values| {
                values
                    .iter()
                    .any(|v| !is_nested_random_block(v) && !v.trim().is_empty())
            })
            .unwrap_or(false)
    }

    fn describe(&self) -> &str {
        "Run one action chosen at random by weight"
    }

    fn usage_examples(&self) -> &[&str] {
        &[
            r#"random { - "message:Common prize:8" - "message:Rare prize:2" }"#,
            r#"random:[ "economy:add:50", "economy:add:100" ]"#,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_distribution_follows_weights() {
        let entries = vec![
            WeightedAction::new("message:common", 8.0),
            WeightedAction::new("message:rare", 2.0),
        ];
        let mut rng = StdRng::seed_from_u64(7);

        let draws = 10_000;
        let common = (0..draws)
            .filter(|_| select_weighted(&entries, &mut rng).unwrap().action == "message:common")
            .count();

        let ratio = common as f64 / draws as f64;
        assert!((0.77..=0.83).contains(&ratio), "ratio was {ratio}");
    }

    #[test]
    fn test_single_and_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_weighted(&[], &mut rng).is_none());

        let one = vec![WeightedAction::new("message:only", 0.5)];
        assert_eq!(select_weighted(&one, &mut rng).unwrap().action, "message:only");
    }
}
