//! Collaborator services for the action engine
//!
//! The engine never touches the platform directly. Every side effect goes
//! through one of these narrow interfaces, implemented by the host:
//!
//! - [`CommandService`] - run a command as the console or as the actor
//! - [`MessageService`] - chat messages, broadcasts and action bars
//! - [`TitleService`] - on-screen titles
//! - [`SoundService`] - sounds
//! - [`EconomyService`] - balances (optional; handlers fall back to commands)
//! - [`PermissionService`] - permission checks for conditions
//! - [`PlaceholderProvider`] - external `{name}` values
//! - [`MessageCatalog`] - rendering result keys into display text

use async_trait::async_trait;
use gs_core::{ActionError, Actor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub mod catalog;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use catalog::{MessageCatalog, StaticCatalog};

/// Result type for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors reported by collaborator services
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error("operation rejected: {0}")]
    Rejected(String),

    #[error("insufficient funds: balance {balance}, needed {needed}")]
    InsufficientFunds { balance: f64, needed: f64 },

    #[error("service call failed: {0}")]
    CallFailed(String),
}

impl ServiceError {
    /// Convert into an execution error for the given action type
    pub fn into_action_error(self, action_type: &str) -> ActionError {
        ActionError::execution(action_type, self)
    }
}

/// Title shown on the actor's screen; timings are in ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default = "default_fade_in")]
    pub fade_in: u32,
    #[serde(default = "default_stay")]
    pub stay: u32,
    #[serde(default = "default_fade_out")]
    pub fade_out: u32,
}

fn default_fade_in() -> u32 {
    10
}

fn default_stay() -> u32 {
    70
}

fn default_fade_out() -> u32 {
    20
}

impl Title {
    /// Title with default timings
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            fade_in: default_fade_in(),
            stay: default_stay(),
            fade_out: default_fade_out(),
        }
    }
}

/// Sound to play for the actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSpec {
    pub name: String,
    pub volume: f32,
    pub pitch: f32,
}

impl SoundSpec {
    pub fn new(name: impl Into<String>, volume: f32, pitch: f32) -> Self {
        Self {
            name: name.into(),
            volume,
            pitch,
        }
    }
}

/// Runs commands on the platform
#[async_trait]
pub trait CommandService: Send + Sync {
    /// Run a command with console privileges
    async fn run_console(&self, command: &str) -> ServiceResult<()>;

    /// Run a command as the actor
    async fn run_as(&self, actor: &Actor, command: &str) -> ServiceResult<()>;
}

/// Delivers text to actors
#[async_trait]
pub trait MessageService: Send + Sync {
    async fn send_message(&self, actor: &Actor, text: &str) -> ServiceResult<()>;

    async fn broadcast(&self, text: &str) -> ServiceResult<()>;

    async fn send_action_bar(&self, actor: &Actor, text: &str) -> ServiceResult<()>;
}

#[async_trait]
pub trait TitleService: Send + Sync {
    async fn send_title(&self, actor: &Actor, title: &Title) -> ServiceResult<()>;
}

#[async_trait]
pub trait SoundService: Send + Sync {
    async fn play_sound(&self, actor: &Actor, sound: &SoundSpec) -> ServiceResult<()>;
}

/// Account balances
#[async_trait]
pub trait EconomyService: Send + Sync {
    async fn balance(&self, actor: &Actor) -> ServiceResult<f64>;

    async fn deposit(&self, actor: &Actor, amount: f64) -> ServiceResult<f64>;

    /// Fails with [`ServiceError::InsufficientFunds`] when the balance is too low
    async fn withdraw(&self, actor: &Actor, amount: f64) -> ServiceResult<f64>;

    async fn set_balance(&self, actor: &Actor, amount: f64) -> ServiceResult<f64>;
}

/// Permission checks used by conditional actions
pub trait PermissionService: Send + Sync {
    fn has_permission(&self, actor: &Actor, node: &str) -> bool;
}

/// External source of `{name}` values (e.g. a placeholder plugin)
pub trait PlaceholderProvider: Send + Sync {
    /// Value for `name`, or `None` to leave the token unresolved
    fn resolve(&self, actor: &Actor, name: &str) -> Option<String>;
}

/// Provider that never resolves anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPlaceholders;

impl PlaceholderProvider for NoPlaceholders {
    fn resolve(&self, _actor: &Actor, _name: &str) -> Option<String> {
        None
    }
}

/// Permission service that denies everything
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAll;

impl PermissionService for DenyAll {
    fn has_permission(&self, _actor: &Actor, _node: &str) -> bool {
        false
    }
}

/// The set of services handed to the built-in handlers
#[derive(Clone)]
pub struct Services {
    pub commands: Arc<dyn CommandService>,
    pub messages: Arc<dyn MessageService>,
    pub titles: Arc<dyn TitleService>,
    pub sounds: Arc<dyn SoundService>,
    /// When absent, economy actions fall back to console commands
    pub economy: Option<Arc<dyn EconomyService>>,
    pub permissions: Arc<dyn PermissionService>,
    pub placeholders: Arc<dyn PlaceholderProvider>,
}

impl Services {
    /// Start building a service set
    pub fn builder() -> ServicesBuilder {
        ServicesBuilder::default()
    }

    /// Use one backend for every service
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: CommandService
            + MessageService
            + TitleService
            + SoundService
            + EconomyService
            + PermissionService
            + PlaceholderProvider
            + 'static,
    {
        Self {
            commands: backend.clone(),
            messages: backend.clone(),
            titles: backend.clone(),
            sounds: backend.clone(),
            economy: Some(backend.clone()),
            permissions: backend.clone(),
            placeholders: backend,
        }
    }

    /// Drop the economy service so economy actions use command fallbacks
    pub fn without_economy(mut self) -> Self {
        self.economy = None;
        self
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("economy", &self.economy.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Services`]
///
/// Commands, messages, titles and sounds are required. Permissions default
/// to [`DenyAll`] and placeholders to [`NoPlaceholders`].
#[derive(Default)]
pub struct ServicesBuilder {
    commands: Option<Arc<dyn CommandService>>,
    messages: Option<Arc<dyn MessageService>>,
    titles: Option<Arc<dyn TitleService>>,
    sounds: Option<Arc<dyn SoundService>>,
    economy: Option<Arc<dyn EconomyService>>,
    permissions: Option<Arc<dyn PermissionService>>,
    placeholders: Option<Arc<dyn PlaceholderProvider>>,
}

impl ServicesBuilder {
    pub fn commands(mut self, service: Arc<dyn CommandService>) -> Self {
        self.commands = Some(service);
        self
    }

    pub fn messages(mut self, service: Arc<dyn MessageService>) -> Self {
        self.messages = Some(service);
        self
    }

    pub fn titles(mut self, service: Arc<dyn TitleService>) -> Self {
        self.titles = Some(service);
        self
    }

    pub fn sounds(mut self, service: Arc<dyn SoundService>) -> Self {
        self.sounds = Some(service);
        self
    }

    pub fn economy(mut self, service: Arc<dyn EconomyService>) -> Self {
        self.economy = Some(service);
        self
    }

    pub fn permissions(mut self, service: Arc<dyn PermissionService>) -> Self {
        self.permissions = Some(service);
        self
    }

    pub fn placeholders(mut self, service: Arc<dyn PlaceholderProvider>) -> Self {
        self.placeholders = Some(service);
        self
    }

    pub fn build(self) -> ServiceResult<Services> {
        let missing = |name: &str| ServiceError::Unavailable(format!("{} service not set", name));

        Ok(Services {
            commands: self.commands.ok_or_else(|| missing("command"))?,
            messages: self.messages.ok_or_else(|| missing("message"))?,
            titles: self.titles.ok_or_else(|| missing("title"))?,
            sounds: self.sounds.ok_or_else(|| missing("sound"))?,
            economy: self.economy,
            permissions: self.permissions.unwrap_or_else(|| Arc::new(DenyAll)),
            placeholders: self.placeholders.unwrap_or_else(|| Arc::new(NoPlaceholders)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBackend;

    #[test]
    fn test_builder_requires_core_services() {
        let err = Services::builder().build().unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(msg) if msg.contains("command")));
    }

    #[test]
    fn test_builder_defaults() {
        let backend = Arc::new(RecordingBackend::new());
        let services = Services::builder()
            .commands(backend.clone())
            .messages(backend.clone())
            .titles(backend.clone())
            .sounds(backend)
            .build()
            .unwrap();

        let actor = Actor::new("Alex");
        assert!(services.economy.is_none());
        assert!(!services.permissions.has_permission(&actor, "any.node"));
        assert_eq!(services.placeholders.resolve(&actor, "x"), None);
    }

    #[test]
    fn test_service_error_conversion() {
        let err = ServiceError::CommandFailed("unknown command".into()).into_action_error("console");
        assert_eq!(
            err.to_string(),
            "console action failed: command failed: unknown command"
        );
    }
}
