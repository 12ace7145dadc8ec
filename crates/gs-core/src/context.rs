//! Invocation context types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use ulid::Ulid;

/// The entity an action runs for (usually the player who clicked)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Stable identifier (platform UUID, or a ULID when none is known)
    pub id: String,

    /// Display / command name
    pub name: String,

    /// Preferred locale for rendering result messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl Actor {
    /// Create an actor with a fresh ULID
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: name.into(),
            locale: None,
        }
    }

    /// Create an actor with a known identifier
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            locale: None,
        }
    }

    /// Set the preferred locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Per-invocation data passed to every handler
///
/// Created by the caller for one trigger and treated as read-only by the
/// engine. Nested executions receive a copy with an incremented depth.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionContext {
    /// Explicit `{name}` substitutions
    #[serde(default)]
    pub placeholders: HashMap<String, String>,

    /// Values collected by the form that triggered the action
    #[serde(default)]
    pub form_results: HashMap<String, Value>,

    /// Free-form data for handlers
    #[serde(default)]
    pub metadata: HashMap<String, Value>,

    /// Locale override for result messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    #[serde(skip)]
    depth: usize,
}

impl ActionContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a placeholder
    pub fn with_placeholder(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.placeholders.insert(key.into(), value.into());
        self
    }

    /// Add a form result
    pub fn with_form_result(mut self, key: impl Into<String>, value: Value) -> Self {
        self.form_results.insert(key.into(), value);
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Set the locale override
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn placeholder(&self, key: &str) -> Option<&str> {
        self.placeholders.get(key).map(String::as_str)
    }

    pub fn form_result(&self, key: &str) -> Option<&Value> {
        self.form_results.get(key)
    }

    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// How many combinator levels deep this invocation is (0 = top level)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Copy of this context one nesting level deeper
    pub fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// Locale to render messages in: context override, then the actor's
    pub fn effective_locale<'a>(&'a self, actor: &'a Actor) -> Option<&'a str> {
        self.locale.as_deref().or(actor.locale.as_deref())
    }
}
