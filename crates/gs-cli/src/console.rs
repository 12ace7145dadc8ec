//! Backend that prints side effects instead of performing them

use async_trait::async_trait;
use dashmap::DashMap;
use gs_core::Actor;
use gs_services::{
    CommandService, EconomyService, MessageService, PermissionService, PlaceholderProvider,
    ServiceError, ServiceResult, SoundService, SoundSpec, Title, TitleService,
};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Dry-run backend for the command line
///
/// Every effect is logged under the `effect` target. Permissions and
/// placeholders come from the command line; balances live in memory for
/// the duration of the run.
#[derive(Debug, Default)]
pub struct ConsoleBackend {
    permissions: HashSet<String>,
    placeholders: HashMap<String, String>,
    balances: DashMap<String, f64>,
}

impl ConsoleBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_permissions(mut self, nodes: impl IntoIterator<Item = String>) -> Self {
        self.permissions.extend(nodes);
        self
    }

    pub fn with_placeholders(mut self, values: impl IntoIterator<Item = (String, String)>) -> Self {
        self.placeholders.extend(values);
        self
    }

    pub fn with_balance(self, actor: &str, balance: f64) -> Self {
        self.balances.insert(actor.to_string(), balance);
        self
    }

    pub fn balance_of(&self, actor: &str) -> f64 {
        self.balances.get(actor).map(|b| *b).unwrap_or(0.0)
    }
}

#[async_trait]
impl CommandService for ConsoleBackend {
    async fn run_console(&self, command: &str) -> ServiceResult<()> {
        info!(target: "effect", command, "console");
        Ok(())
    }

    async fn run_as(&self, actor: &Actor, command: &str) -> ServiceResult<()> {
        info!(target: "effect", actor = %actor.name, command, "command");
        Ok(())
    }
}

#[async_trait]
impl MessageService for ConsoleBackend {
    async fn send_message(&self, actor: &Actor, text: &str) -> ServiceResult<()> {
        info!(target: "effect", actor = %actor.name, text, "message");
        Ok(())
    }

    async fn broadcast(&self, text: &str) -> ServiceResult<()> {
        info!(target: "effect", text, "broadcast");
        Ok(())
    }

    async fn send_action_bar(&self, actor: &Actor, text: &str) -> ServiceResult<()> {
        info!(target: "effect", actor = %actor.name, text, "actionbar");
        Ok(())
    }
}

#[async_trait]
impl TitleService for ConsoleBackend {
    async fn send_title(&self, actor: &Actor, title: &Title) -> ServiceResult<()> {
        info!(
            target: "effect",
            actor = %actor.name,
            title = %title.title,
            subtitle = %title.subtitle,
            fade_in = title.fade_in,
            stay = title.stay,
            fade_out = title.fade_out,
            "title"
        );
        Ok(())
    }
}

#[async_trait]
impl SoundService for ConsoleBackend {
    async fn play_sound(&self, actor: &Actor, sound: &SoundSpec) -> ServiceResult<()> {
        info!(
            target: "effect",
            actor = %actor.name,
            sound = %sound.name,
            volume = sound.volume,
            pitch = sound.pitch,
            "sound"
        );
        Ok(())
    }
}

#[async_trait]
impl EconomyService for ConsoleBackend {
    async fn balance(&self, actor: &Actor) -> ServiceResult<f64> {
        Ok(self.balance_of(&actor.name))
    }

    async fn deposit(&self, actor: &Actor, amount: f64) -> ServiceResult<f64> {
        let mut balance = self.balances.entry(actor.name.clone()).or_insert(0.0);
        *balance += amount;
        info!(target: "effect", actor = %actor.name, amount, balance = *balance, "deposit");
        Ok(*balance)
    }

    async fn withdraw(&self, actor: &Actor, amount: f64) -> ServiceResult<f64> {
        let mut balance = self.balances.entry(actor.name.clone()).or_insert(0.0);
        if *balance < amount {
            return Err(ServiceError::InsufficientFunds {
                balance: *balance,
                needed: amount,
            });
        }
        *balance -= amount;
        info!(target: "effect", actor = %actor.name, amount, balance = *balance, "withdraw");
        Ok(*balance)
    }

    async fn set_balance(&self, actor: &Actor, amount: f64) -> ServiceResult<f64> {
        self.balances.insert(actor.name.clone(), amount);
        info!(target: "effect", actor = %actor.name, balance = amount, "set balance");
        Ok(amount)
    }
}

impl PermissionService for ConsoleBackend {
    fn has_permission(&self, _actor: &Actor, node: &str) -> bool {
        self.permissions.contains(node)
    }
}

impl PlaceholderProvider for ConsoleBackend {
    fn resolve(&self, _actor: &Actor, name: &str) -> Option<String> {
        self.placeholders.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_balances_are_tracked() {
        let backend = ConsoleBackend::new().with_balance("Alex", 20.0);
        let alex = Actor::new("Alex");

        assert_eq!(backend.deposit(&alex, 5.0).await.unwrap(), 25.0);
        assert!(matches!(
            backend.withdraw(&alex, 100.0).await,
            Err(ServiceError::InsufficientFunds { .. })
        ));
        assert_eq!(backend.balance_of("Alex"), 25.0);
    }

    #[test]
    fn test_permissions_and_placeholders() {
        let backend = ConsoleBackend::new()
            .with_permissions(["shop.vip".to_string()])
            .with_placeholders([("rank".to_string(), "gold".to_string())]);
        let alex = Actor::new("Alex");

        assert!(backend.has_permission(&alex, "shop.vip"));
        assert!(!backend.has_permission(&alex, "shop.admin"));
        assert_eq!(backend.resolve(&alex, "rank").as_deref(), Some("gold"));
    }
}
