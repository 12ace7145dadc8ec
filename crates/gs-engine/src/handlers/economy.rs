//! Economy actions: `add`, `remove`, `set` and `check` on the actor's balance

use crate::handler::ValueAction;
use async_trait::async_trait;
use gs_core::{keys, ActionError, ActionOutcome, ActionResult, Actor};
use gs_dsl::split_args;
use gs_services::{CommandService, EconomyService};
use std::sync::Arc;
use tracing::debug;

/// Balance operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EconomyOp {
    Add(f64),
    Remove(f64),
    Set(f64),
    Check,
}

/// Parse `<add|remove|set|check>[:<amount>]`
///
/// `add` and `remove` need a positive amount, `set` a non-negative one and
/// `check` takes none.
pub fn parse_economy(value: &str) -> Option<EconomyOp> {
    let args = split_args(value, 0);
    let amount = |index: usize| -> Option<f64> {
        args.get(index)
            .and_then(|a| a.parse::<f64>().ok())
            .filter(|a| a.is_finite())
    };

    match (args[0].to_lowercase().as_str(), args.len()) {
        ("add" | "give" | "deposit", 2) => amount(1).filter(|a| *a > 0.0).map(EconomyOp::Add),
        ("remove" | "take" | "withdraw", 2) => {
            amount(1).filter(|a| *a > 0.0).map(EconomyOp::Remove)
        }
        ("set", 2) => amount(1).filter(|a| *a >= 0.0).map(EconomyOp::Set),
        ("check" | "balance", 1) => Some(EconomyOp::Check),
        _ => None,
    }
}

/// Render an amount for commands and messages (`50`, not `50.0`)
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}

/// `economy:<add|remove|set|check>[:<amount>]`
///
/// Uses the economy service when one is configured and falls back to the
/// `eco` console command otherwise.
pub struct EconomyAction {
    economy: Option<Arc<dyn EconomyService>>,
    commands: Arc<dyn CommandService>,
}

impl EconomyAction {
    pub fn new(economy: Option<Arc<dyn EconomyService>>, commands: Arc<dyn CommandService>) -> Self {
        Self { economy, commands }
    }

    async fn with_service(
        &self,
        economy: &dyn EconomyService,
        actor: &Actor,
        op: EconomyOp,
    ) -> ActionOutcome {
        let failed = |e: gs_services::ServiceError| e.into_action_error("economy");

        let (key, amount, balance) = match op {
            EconomyOp::Add(amount) => (
                keys::ECONOMY_ADDED,
                Some(amount),
                economy.deposit(actor, amount).await.map_err(failed)?,
            ),
            EconomyOp::Remove(amount) => (
                keys::ECONOMY_REMOVED,
                Some(amount),
                economy.withdraw(actor, amount).await.map_err(failed)?,
            ),
            EconomyOp::Set(amount) => (
                keys::ECONOMY_SET,
                Some(amount),
                economy.set_balance(actor, amount).await.map_err(failed)?,
            ),
            EconomyOp::Check => (
                keys::ECONOMY_BALANCE,
                None,
                economy.balance(actor).await.map_err(failed)?,
            ),
        };

        let mut result = ActionResult::success(key)
            .with("player", actor.name.as_str())
            .with("balance", format_amount(balance));
        if let Some(amount) = amount {
            result = result.with("amount", format_amount(amount));
        }
        Ok(result)
    }

    async fn with_command(&self, actor: &Actor, op: EconomyOp) -> ActionOutcome {
        let (verb, amount, key) = match op {
            EconomyOp::Add(amount) => ("give", amount, keys::ECONOMY_ADDED),
            EconomyOp::Remove(amount) => ("take", amount, keys::ECONOMY_REMOVED),
            EconomyOp::Set(amount) => ("set", amount, keys::ECONOMY_SET),
            EconomyOp::Check => {
                return Err(ActionError::execution(
                    "economy",
                    "balance checks need an economy service",
                ))
            }
        };

        let amount = format_amount(amount);
        let command = format!("eco {} {} {}", verb, actor.name, amount);
        debug!(command = %command, "No economy service, using console fallback");

        self.commands
            .run_console(&command)
            .await
            .map_err(|e| e.into_action_error("economy"))?;

        Ok(ActionResult::success(key)
            .with("player", actor.name.as_str())
            .with("amount", amount))
    }
}

#[async_trait]
impl ValueAction for EconomyAction {
    fn type_name(&self) -> &'static str {
        "economy"
    }

    fn describe(&self) -> &'static str {
        "Change or check the player's balance"
    }

    fn usage_examples(&self) -> &'static [&'static str] {
        &[
            "economy:add:50",
            "economy:remove:{price}",
            "economy:set:0",
            "economy:check",
        ]
    }

    fn is_valid_value(&self, value: &str) -> bool {
        parse_economy(value).is_some()
    }

    async fn run(&self, actor: &Actor, value: &str) -> ActionOutcome {
        let op = parse_economy(value).ok_or_else(|| {
            ActionError::validation("economy", format!("invalid economy operation '{}'", value))
        })?;

        match &self.economy {
            Some(economy) => self.with_service(economy.as_ref(), actor, op).await,
            None => self.with_command(actor, op).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_services::testing::RecordingBackend;

    #[test]
    fn test_parse_economy() {
        assert_eq!(parse_economy("add:50"), Some(EconomyOp::Add(50.0)));
        assert_eq!(parse_economy("REMOVE:2.5"), Some(EconomyOp::Remove(2.5)));
        assert_eq!(parse_economy("set:0"), Some(EconomyOp::Set(0.0)));
        assert_eq!(parse_economy("check"), Some(EconomyOp::Check));

        assert_eq!(parse_economy("add"), None);
        assert_eq!(parse_economy("add:-5"), None);
        assert_eq!(parse_economy("add:0"), None);
        assert_eq!(parse_economy("add:lots"), None);
        assert_eq!(parse_economy("steal:5"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(50.0), "50");
        assert_eq!(format_amount(2.5), "2.5");
    }

    #[tokio::test]
    async fn test_service_withdraw_insufficient() {
        let backend = Arc::new(RecordingBackend::new().balance_of("Alex", 10.0));
        let economy: Arc<dyn EconomyService> = backend.clone();
        let action = EconomyAction::new(Some(economy), backend.clone());

        let err = action.run(&Actor::new("Alex"), "remove:25").await.unwrap_err();
        assert!(matches!(err, ActionError::Execution { .. }));
        assert_eq!(backend.current_balance("Alex"), 10.0);
    }

    #[tokio::test]
    async fn test_console_fallback() {
        let backend = Arc::new(RecordingBackend::new());
        let action = EconomyAction::new(None, backend.clone());

        let result = action.run(&Actor::new("Alex"), "add:50").await.unwrap();
        assert_eq!(result.message, keys::ECONOMY_ADDED);
        assert_eq!(backend.console_commands(), vec!["eco give Alex 50"]);

        assert!(action.run(&Actor::new("Alex"), "check").await.is_err());
    }
}
