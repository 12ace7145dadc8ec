//! Item give and inventory clear through console commands

use crate::handler::ValueAction;
use async_trait::async_trait;
use gs_core::{keys, ActionError, ActionOutcome, ActionResult, Actor};
use gs_dsl::split_args;
use gs_services::CommandService;
use std::sync::Arc;
use tracing::warn;

/// Inventory operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryOp {
    Give { item: String, amount: u32 },
    Clear { item: Option<String>, amount: Option<u32> },
}

/// Parse `<give|clear>[:<item>[:<amount>]]`
///
/// Item ids may be namespaced (`minecraft:diamond`); a trailing number is
/// the amount.
pub fn parse_inventory(value: &str) -> Option<InventoryOp> {
    let args = split_args(value, 0);
    let op = args[0].to_lowercase();
    let mut rest: Vec<&str> = args[1..].to_vec();

    let mut amount = None;
    if rest.len() >= 2 {
        if let Some(last) = rest.last().and_then(|a| a.parse::<u32>().ok()) {
            amount = Some(last);
            rest.pop();
        }
    }
    if amount == Some(0) {
        return None;
    }

    let item = rest.join(":");
    match op.as_str() {
        "give" if !item.is_empty() => Some(InventoryOp::Give {
            item,
            amount: amount.unwrap_or(1),
        }),
        "clear" => Some(InventoryOp::Clear {
            item: (!item.is_empty()).then_some(item),
            amount,
        }),
        _ => None,
    }
}

/// `inventory:<give|clear>[:<item>[:<amount>]]` through console commands
///
/// A `give` with a bare item id is retried with the `minecraft:` namespace
/// when the first command fails.
pub struct InventoryAction {
    commands: Arc<dyn CommandService>,
}

impl InventoryAction {
    pub fn new(commands: Arc<dyn CommandService>) -> Self {
        Self { commands }
    }

    async fn give(&self, actor: &Actor, item: &str, amount: u32) -> ActionOutcome {
        let command = format!("give {} {} {}", actor.name, item, amount);

        if let Err(err) = self.commands.run_console(&command).await {
            if item.contains(':') {
                return Err(err.into_action_error("inventory"));
            }
            warn!(command = %command, error = %err, "Give failed, retrying with namespaced item");
            let fallback = format!("give {} minecraft:{} {}", actor.name, item, amount);
            self.commands
                .run_console(&fallback)
                .await
                .map_err(|e| e.into_action_error("inventory"))?;
        }

        Ok(ActionResult::success(keys::INVENTORY_GIVEN)
            .with("player", actor.name.as_str())
            .with("item", item)
            .with("amount", amount))
    }

    async fn clear(&self, actor: &Actor, item: Option<&str>, amount: Option<u32>) -> ActionOutcome {
        let mut command = format!("clear {}", actor.name);
        if let Some(item) = item {
            command.push(' ');
            command.push_str(item);
            if let Some(amount) = amount {
                command.push_str(&format!(" {}", amount));
            }
        }

        self.commands
            .run_console(&command)
            .await
            .map_err(|e| e.into_action_error("inventory"))?;

        let mut result =
            ActionResult::success(keys::INVENTORY_CLEARED).with("player", actor.name.as_str());
        if let Some(item) = item {
            result = result.with("item", item);
        }
        Ok(result)
    }
}

#[async_trait]
impl ValueAction for InventoryAction {
    fn type_name(&self) -> &'static str {
        "inventory"
    }

    fn describe(&self) -> &'static str {
        "Give items to or clear the player's inventory"
    }

    fn usage_examples(&self) -> &'static [&'static str] {
        &[
            "inventory:give:diamond:5",
            "inventory:give:minecraft:golden_apple",
            "inventory:clear",
            "inventory:clear:dirt",
        ]
    }

    fn is_valid_value(&self, value: &str) -> bool {
        parse_inventory(value).is_some()
    }

    async fn run(&self, actor: &Actor, value: &str) -> ActionOutcome {
        let op = parse_inventory(value).ok_or_else(|| {
            ActionError::validation("inventory", format!("invalid inventory operation '{}'", value))
        })?;

        match op {
            InventoryOp::Give { item, amount } => self.give(actor, &item, amount).await,
            InventoryOp::Clear { item, amount } => {
                self.clear(actor, item.as_deref(), amount).await
            }
        }
    }
}
