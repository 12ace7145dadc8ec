//! Conditional branching
//!
//! ```text
//! check:"placeholder:balance >= 100 && permission:shop.vip" true: message:Welcome false: message:Denied
//! ```

use crate::composite;
use crate::executor::ActionExecutor;
use crate::handler::ActionHandler;
use async_trait::async_trait;
use gs_core::{keys, ActionContext, ActionOutcome, ActionResult, Actor};
use gs_dsl::{is_nested_random_block, parse_conditional, ConditionalSpec, Term};
use gs_services::PermissionService;
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs the true or false branch of a `check:` expression
///
/// Registered as `conditional` with the alias `check`, so both
/// `check:"<expr>" true: ...` and `conditional:check:"<expr>" ...` work.
pub struct ConditionalHandler {
    permissions: Arc<dyn PermissionService>,
}

impl ConditionalHandler {
    pub fn new(permissions: Arc<dyn PermissionService>) -> Self {
        Self { permissions }
    }

    fn parse(data: &str) -> Result<ConditionalSpec, gs_dsl::ParseError> {
        let trimmed = data.trim();
        let has_keyword = trimmed
            .get(..6)
            .map_or(false, |p| p.eq_ignore_ascii_case("check:"));
        if has_keyword {
            parse_conditional(trimmed)
        } else {
            parse_conditional(&format!("check:{}", trimmed))
        }
    }

    fn evaluate(
        &self,
        spec: &ConditionalSpec,
        actor: &Actor,
        ctx: &ActionContext,
        executor: &ActionExecutor,
    ) -> bool {
        spec.expression.evaluate(|term| match term {
            Term::Placeholder { name, op, value } => {
                // Already-substituted names compare as literals
                let left = executor
                    .resolver()
                    .lookup(name, actor, ctx)
                    .unwrap_or_else(|| name.clone());
                let outcome = op.compare(&left, value);
                debug!(term = %term, left = %left, outcome, "Evaluated placeholder term");
                outcome
            }
            Term::Permission(node) => {
                let outcome = self.permissions.has_permission(actor, node);
                debug!(term = %term, outcome, "Evaluated permission term");
                outcome
            }
        })
    }
}

#[async_trait]
impl ActionHandler for ConditionalHandler {
    fn type_name(&self) -> &str {
        "conditional"
    }

    fn aliases(&self) -> &[&str] {
        &["check"]
    }

    async fn execute(
        &self,
        actor: &Actor,
        data: &str,
        ctx: &ActionContext,
        executor: &ActionExecutor,
    ) -> ActionOutcome {
        let spec = Self::parse(data).map_err(|e| e.into_action_error("conditional"))?;
        let outcome = self.evaluate(&spec, actor, ctx, executor);
        debug!(expression = %spec.source, outcome, "Condition evaluated");

        let branch = if outcome {
            &spec.when_true
        } else {
            &spec.when_false
        };

        let entries: Vec<&String> = branch
            .iter()
            .filter(|entry| {
                let nested = is_nested_random_block(entry);
                if nested {
                    warn!(entry = %entry, "Skipping random block inside a conditional branch");
                }
                !nested
            })
            .collect();

        if entries.is_empty() {
            return Ok(ActionResult::success(keys::CONDITIONAL_NO_BRANCH).with("outcome", outcome));
        }

        let mut results = Vec::with_capacity(entries.len());
        for entry in &entries {
            results.push(executor.execute_nested(actor, entry, ctx).await);
        }

        let result = if results.len() == 1 {
            results.remove(0)
        } else {
            composite::aggregate("conditional", &results, results.len())
        };
        Ok(result.with("outcome", outcome))
    }

    fn is_valid_action(&self, data: &str) -> bool {
        Self::parse(data).is_ok()
    }

    fn describe(&self) -> &str {
        "Run one of two action lists depending on a condition"
    }

    fn usage_examples(&self) -> &[&str] {
        &[
            r#"check:"placeholder:level >= 10" true: message:&aUnlocked false: message:&cToo low"#,
            r#"check:"permission:shop.vip || placeholder:rank == gold" true: [ "console:give {player} diamond", "message:Enjoy" ]"#,
            r#"check:"placeholder:balance < 100" false: { - "economy:remove:100" - "message:Bought" }"#,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_keyword() {
        let with = ConditionalHandler::parse(r#"check:"permission:a" true: message:x"#).unwrap();
        let without = ConditionalHandler::parse(r#""permission:a" true: message:x"#).unwrap();
        assert_eq!(with, without);
        assert_eq!(with.when_true, vec!["message:x"]);
    }

    #[test]
    fn test_parse_rejects_missing_branches() {
        assert!(ConditionalHandler::parse(r#""permission:a""#).is_err());
    }
}
