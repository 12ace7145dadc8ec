//! Recording test double for every service

use crate::{
    CommandService, EconomyService, MessageService, PermissionService, PlaceholderProvider,
    ServiceError, ServiceResult, SoundService, SoundSpec, Title, TitleService,
};
use async_trait::async_trait;
use dashmap::DashMap;
use gs_core::Actor;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// A side effect observed by [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Console(String),
    RunAs { actor: String, command: String },
    Message { actor: String, text: String },
    Broadcast(String),
    ActionBar { actor: String, text: String },
    Title { actor: String, title: Title },
    Sound { actor: String, sound: SoundSpec },
    Deposit { actor: String, amount: f64 },
    Withdraw { actor: String, amount: f64 },
    SetBalance { actor: String, amount: f64 },
}

/// Records every call and answers from configurable state
///
/// Commands fail when they start with one of the registered failing
/// prefixes; message-like calls fail when their text contains a failing
/// marker. Balances are keyed by actor name.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<Call>>,
    failing_commands: Mutex<Vec<String>>,
    failing_text: Mutex<Vec<String>>,
    permissions: Mutex<HashSet<String>>,
    placeholders: Mutex<HashMap<String, String>>,
    balances: DashMap<String, f64>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail commands starting with `prefix`
    pub fn fail_commands(self, prefix: impl Into<String>) -> Self {
        self.lock(&self.failing_commands).push(prefix.into());
        self
    }

    /// Fail messages, broadcasts, action bars and titles containing `marker`
    pub fn fail_text(self, marker: impl Into<String>) -> Self {
        self.lock(&self.failing_text).push(marker.into());
        self
    }

    pub fn grant(self, node: impl Into<String>) -> Self {
        self.lock(&self.permissions).insert(node.into());
        self
    }

    pub fn placeholder(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.lock(&self.placeholders).insert(name.into(), value.into());
        self
    }

    pub fn balance_of(self, actor: impl Into<String>, balance: f64) -> Self {
        self.balances.insert(actor.into(), balance);
        self
    }

    /// Snapshot of every recorded call in order
    pub fn calls(&self) -> Vec<Call> {
        self.lock(&self.calls).clone()
    }

    /// Commands run as the console
    pub fn console_commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Console(command) => Some(command),
                _ => None,
            })
            .collect()
    }

    /// Texts sent as chat messages
    pub fn messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn current_balance(&self, actor: &str) -> f64 {
        self.balances.get(actor).map(|b| *b).unwrap_or(0.0)
    }

    pub fn clear(&self) {
        self.lock(&self.calls).clear();
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: Call) {
        self.lock(&self.calls).push(call);
    }

    fn check_command(&self, command: &str) -> ServiceResult<()> {
        let failing = self
            .lock(&self.failing_commands)
            .iter()
            .any(|prefix| command.starts_with(prefix.as_str()));
        if failing {
            debug!(command, "Injected command failure");
            return Err(ServiceError::CommandFailed(command.to_string()));
        }
        Ok(())
    }

    fn check_text(&self, text: &str) -> ServiceResult<()> {
        let failing = self
            .lock(&self.failing_text)
            .iter()
            .any(|marker| text.contains(marker.as_str()));
        if failing {
            debug!(text, "Injected text rejection");
            return Err(ServiceError::Rejected(text.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CommandService for RecordingBackend {
    async fn run_console(&self, command: &str) -> ServiceResult<()> {
        self.check_command(command)?;
        self.record(Call::Console(command.to_string()));
        Ok(())
    }

    async fn run_as(&self, actor: &Actor, command: &str) -> ServiceResult<()> {
        self.check_command(command)?;
        self.record(Call::RunAs {
            actor: actor.name.clone(),
            command: command.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl MessageService for RecordingBackend {
    async fn send_message(&self, actor: &Actor, text: &str) -> ServiceResult<()> {
        self.check_text(text)?;
        self.record(Call::Message {
            actor: actor.name.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn broadcast(&self, text: &str) -> ServiceResult<()> {
        self.check_text(text)?;
        self.record(Call::Broadcast(text.to_string()));
        Ok(())
    }

    async fn send_action_bar(&self, actor: &Actor, text: &str) -> ServiceResult<()> {
        self.check_text(text)?;
        self.record(Call::ActionBar {
            actor: actor.name.clone(),
            text: text.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl TitleService for RecordingBackend {
    async fn send_title(&self, actor: &Actor, title: &Title) -> ServiceResult<()> {
        self.check_text(&title.title)?;
        self.record(Call::Title {
            actor: actor.name.clone(),
            title: title.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl SoundService for RecordingBackend {
    async fn play_sound(&self, actor: &Actor, sound: &SoundSpec) -> ServiceResult<()> {
        self.record(Call::Sound {
            actor: actor.name.clone(),
            sound: sound.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl EconomyService for RecordingBackend {
    async fn balance(&self, actor: &Actor) -> ServiceResult<f64> {
        Ok(self.current_balance(&actor.name))
    }

    async fn deposit(&self, actor: &Actor, amount: f64) -> ServiceResult<f64> {
        let mut balance = self.balances.entry(actor.name.clone()).or_insert(0.0);
        *balance += amount;
        let new_balance = *balance;
        drop(balance);

        self.record(Call::Deposit {
            actor: actor.name.clone(),
            amount,
        });
        Ok(new_balance)
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
        let new_balance = *balance;
        drop(balance);

        self.record(Call::Withdraw {
            actor: actor.name.clone(),
            amount,
        });
        Ok(new_balance)
    }

    async fn set_balance(&self, actor: &Actor, amount: f64) -> ServiceResult<f64> {
        self.balances.insert(actor.name.clone(), amount);
        self.record(Call::SetBalance {
            actor: actor.name.clone(),
            amount,
        });
        Ok(amount)
    }
}

impl PermissionService for RecordingBackend {
    fn has_permission(&self, _actor: &Actor, node: &str) -> bool {
        self.lock(&self.permissions).contains(node)
    }
}

impl PlaceholderProvider for RecordingBackend {
    fn resolve(&self, _actor: &Actor, name: &str) -> Option<String> {
        self.lock(&self.placeholders).get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let backend = RecordingBackend::new();
        let actor = Actor::new("Alex");

        backend.send_message(&actor, "hi").await.unwrap();
        backend.run_console("say hello").await.unwrap();

        assert_eq!(
            backend.calls(),
            vec![
                Call::Message {
                    actor: "Alex".into(),
                    text: "hi".into()
                },
                Call::Console("say hello".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_configured_failures() {
        let backend = RecordingBackend::new()
            .fail_commands("gamemode creative")
            .fail_text("boom");
        let actor = Actor::new("Alex");

        assert!(backend.run_console("gamemode creative Alex").await.is_err());
        assert!(backend.run_console("gamemode 1 Alex").await.is_ok());
        assert!(backend.send_message(&actor, "boom!").await.is_err());
        assert_eq!(backend.console_commands(), vec!["gamemode 1 Alex"]);
    }

    #[tokio::test]
    async fn test_withdraw_checks_balance() {
        let backend = RecordingBackend::new().balance_of("Alex", 10.0);
        let actor = Actor::new("Alex");

        let err = backend.withdraw(&actor, 25.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientFunds { .. }));
        assert_eq!(backend.withdraw(&actor, 4.0).await.unwrap(), 6.0);
        assert_eq!(backend.current_balance("Alex"), 6.0);
    }
}
