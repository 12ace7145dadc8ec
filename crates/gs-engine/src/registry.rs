//! Action registry
//!
//! Maps lower-cased type names to handlers. The table is an immutable
//! snapshot behind an atomic pointer: lookups never lock, and every
//! mutation publishes a new copy.

use crate::handler::ActionHandler;
use crate::handlers;
use arc_swap::ArcSwap;
use gs_config::EngineConfig;
use gs_services::Services;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, instrument};

type HandlerTable = IndexMap<String, Arc<dyn ActionHandler>>;

/// Registry of action handlers
pub struct ActionRegistry {
    handlers: ArcSwap<HandlerTable>,
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: ArcSwap::from_pointee(IndexMap::new()),
        }
    }

    /// Registry holding every built-in handler
    pub fn with_builtin_handlers(services: &Services, config: &EngineConfig) -> Self {
        let registry = Self::new();
        registry.reload(handlers::builtin_handlers(services, config));
        registry
    }

    /// Register a handler under its type name and aliases
    ///
    /// A later registration for the same name replaces the earlier one.
    #[instrument(skip(self, handler), fields(action_type = %handler.type_name()))]
    pub fn register(&self, handler: Arc<dyn ActionHandler>) {
        debug!("Registering action handler");
        self.handlers.rcu(|current| {
            let mut next = HandlerTable::clone(current);
            insert(&mut next, &handler);
            next
        });
    }

    /// Remove the handler registered under `name`
    #[instrument(skip(self))]
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn ActionHandler>> {
        let key = normalize(name);
        let mut removed = None;
        self.handlers.rcu(|current| {
            let mut next = HandlerTable::clone(current);
            removed = next.shift_remove(&key);
            next
        });
        if removed.is_some() {
            debug!("Unregistered action handler");
        }
        removed
    }

    /// Replace the whole table
    #[instrument(skip(self, handlers))]
    pub fn reload<I>(&self, handlers: I)
    where
        I: IntoIterator<Item = Arc<dyn ActionHandler>>,
    {
        let mut table = HandlerTable::new();
        for handler in handlers {
            insert(&mut table, &handler);
        }
        debug!(handlers = table.len(), "Reloaded action registry");
        self.handlers.store(Arc::new(table));
    }

    /// Handler for a type name, ignoring case
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn ActionHandler>> {
        let table = self.handlers.load();
        if let Some(handler) = table.get(name) {
            return Some(handler.clone());
        }
        table.get(&normalize(name)).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Registered names (including aliases), sorted
    pub fn types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.load().keys().cloned().collect();
        names.sort();
        names
    }

    /// Current snapshot in registration order
    pub fn snapshot(&self) -> Arc<HandlerTable> {
        self.handlers.load_full()
    }

    pub fn len(&self) -> usize {
        self.handlers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.load().is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("types", &self.types())
            .finish()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn insert(table: &mut HandlerTable, handler: &Arc<dyn ActionHandler>) {
    table.insert(normalize(handler.type_name()), handler.clone());
    for alias in handler.aliases() {
        table.insert(normalize(alias), handler.clone());
    }
}
