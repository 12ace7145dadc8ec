//! Handler contract

use crate::composite;
use crate::executor::ActionExecutor;
use async_trait::async_trait;
use gs_core::{ActionContext, ActionError, ActionOutcome, Actor};
use gs_dsl::parse_values;
use std::time::Duration;

/// Implementation of one action type
///
/// The executor is the barrier around every call: an `Err` or a panic from
/// [`execute`](ActionHandler::execute) becomes a failure result, so
/// handlers may use `?` freely.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Lower-case type name this handler is registered under
    fn type_name(&self) -> &str;

    /// Additional names routed to this handler
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Run the action; `data` has its placeholders resolved already
    async fn execute(
        &self,
        actor: &Actor,
        data: &str,
        ctx: &ActionContext,
        executor: &ActionExecutor,
    ) -> ActionOutcome;

    /// Check `data` without running anything
    fn is_valid_action(&self, data: &str) -> bool;

    /// One-line description for listings
    fn describe(&self) -> &str;

    /// Example action strings
    fn usage_examples(&self) -> &[&str];
}

/// An action applied to one value at a time
///
/// Wrapped in [`Composite`] to become a handler that accepts single values,
/// bracket lists and blocks.
#[async_trait]
pub trait ValueAction: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn describe(&self) -> &'static str;

    fn usage_examples(&self) -> &'static [&'static str];

    fn is_valid_value(&self, value: &str) -> bool;

    async fn run(&self, actor: &Actor, value: &str) -> ActionOutcome;
}

/// Handler running a [`ValueAction`] over every parsed value
pub struct Composite<A> {
    action: A,
    pacing: Duration,
}

impl<A: ValueAction> Composite<A> {
    pub fn new(action: A, pacing: Duration) -> Self {
        Self { action, pacing }
    }
}

#[async_trait]
impl<A: ValueAction> ActionHandler for Composite<A> {
    fn type_name(&self) -> &str {
        self.action.type_name()
    }

    async fn execute(
        &self,
        actor: &Actor,
        data: &str,
        _ctx: &ActionContext,
        executor: &ActionExecutor,
    ) -> ActionOutcome {
        let action_type = self.action.type_name();
        let values =
            parse_values(action_type, data).map_err(|e| e.into_action_error(action_type))?;

        composite::run_values(
            action_type,
            values,
            self.pacing,
            executor.interrupt_signal(),
            move |value| async move {
                if !self.action.is_valid_value(&value) {
                    return Err(ActionError::validation(
                        action_type,
                        format!("invalid value '{}'", value),
                    ));
                }
                self.action.run(actor, &value).await
            },
        )
        .await
    }

    fn is_valid_action(&self, data: &str) -> bool {
        match parse_values(self.action.type_name(), data) {
            Ok(values) => {
                !values.is_empty() && values.iter().all(|v| self.action.is_valid_value(v))
            }
            Err(_) => false,
        }
    }

    fn describe(&self) -> &str {
        self.action.describe()
    }

    fn usage_examples(&self) -> &[&str] {
        self.action.usage_examples()
    }
}
