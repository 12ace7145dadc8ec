//! Message catalog: turns result keys into display text

use dashmap::DashMap;
use gs_core::{keys, ActionResult};
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Locale used when a key has no template for the requested one
pub const FALLBACK_LOCALE: &str = "en";

/// Renders message keys with their replacements
pub trait MessageCatalog: Send + Sync {
    /// Render `key` for `locale`, filling `{name}` from `replacements`
    fn render(&self, key: &str, replacements: &HashMap<String, Value>, locale: Option<&str>)
        -> String;

    /// Render an [`ActionResult`]'s message
    fn render_result(&self, result: &ActionResult, locale: Option<&str>) -> String {
        self.render(&result.message, &result.replacements, locale)
    }
}

/// In-memory catalog with English defaults for every engine key
///
/// Templates use `{name}` tokens. Tokens without a replacement are kept as
/// written, and unknown keys render as the key itself.
#[derive(Debug)]
pub struct StaticCatalog {
    templates: DashMap<(String, String), String>,
}

impl StaticCatalog {
    /// Catalog without any templates
    pub fn empty() -> Self {
        Self {
            templates: DashMap::new(),
        }
    }

    /// Catalog preloaded with English defaults
    pub fn new() -> Self {
        let catalog = Self::empty();
        for &(key, template) in ENGLISH {
            catalog.insert(FALLBACK_LOCALE, key, template);
        }
        catalog
    }

    /// Add or replace a template
    pub fn insert(&self, locale: &str, key: &str, template: impl Into<String>) {
        self.templates.insert(
            (locale.to_lowercase(), key.to_string()),
            template.into(),
        );
    }

    /// Whether a template exists for `key` in `locale`
    pub fn contains(&self, locale: &str, key: &str) -> bool {
        self.templates
            .contains_key(&(locale.to_lowercase(), key.to_string()))
    }

    fn template(&self, key: &str, locale: Option<&str>) -> Option<String> {
        let mut candidates = Vec::with_capacity(3);
        if let Some(locale) = locale {
            let locale = locale.to_lowercase();
            // en_us -> en
            if let Some((language, _)) = locale.split_once(['_', '-']) {
                let language = language.to_string();
                candidates.push(locale);
                candidates.push(language);
            } else {
                candidates.push(locale);
            }
        }
        candidates.push(FALLBACK_LOCALE.to_string());

        candidates.into_iter().find_map(|locale| {
            self.templates
                .get(&(locale, key.to_string()))
                .map(|t| t.value().clone())
        })
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCatalog for StaticCatalog {
    fn render(
        &self,
        key: &str,
        replacements: &HashMap<String, Value>,
        locale: Option<&str>,
    ) -> String {
        let Some(template) = self.template(key, locale) else {
            debug!(key, locale, "No template for message key");
            return key.to_string();
        };

        let Some(pattern) = token_pattern() else {
            return template;
        };

        pattern
            .replace_all(&template, |caps: &Captures| match replacements.get(&caps[1]) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

fn token_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").ok())
        .as_ref()
}

const ENGLISH: &[(&str, &str)] = &[
    (keys::UNKNOWN_TYPE, "Unknown action type '{type}'"),
    (keys::ERROR_VALIDATION, "Invalid action: {error}"),
    (keys::ERROR_EXECUTION, "Action failed: {error}"),
    (
        keys::ERROR_INTERRUPTED,
        "Interrupted after {completed} of {total} actions",
    ),
    (
        keys::ERROR_DEPTH,
        "Actions nested too deeply ({depth} > {limit})",
    ),
    (keys::ERROR_POOL_SHUTDOWN, "The {pool} scheduler is shutting down"),
    (keys::ERROR_ABORTED, "Action aborted: {error}"),
    (keys::DEFINITION_EMPTY, "Nothing to run"),
    (
        keys::COMPOSITE_SUCCESS,
        "All {total_count} actions completed",
    ),
    (
        keys::COMPOSITE_PARTIAL,
        "{success_count} of {total_count} actions completed",
    ),
    (keys::COMPOSITE_FAILURE, "None of {total_count} actions completed"),
    (keys::MESSAGE_SENT, "Message sent"),
    (keys::BROADCAST_SENT, "Broadcast sent"),
    (keys::ACTIONBAR_SENT, "Action bar sent"),
    (keys::TITLE_SENT, "Title shown"),
    (keys::SOUND_PLAYED, "Played {sound}"),
    (keys::COMMAND_EXECUTED, "Ran /{command}"),
    (keys::CONSOLE_EXECUTED, "Console ran {command}"),
    (keys::ECONOMY_ADDED, "Added {amount} to {player}"),
    (keys::ECONOMY_REMOVED, "Removed {amount} from {player}"),
    (keys::ECONOMY_SET, "Set balance of {player} to {amount}"),
    (keys::ECONOMY_BALANCE, "{player} has {balance}"),
    (keys::GAMEMODE_CHANGED, "Game mode set to {mode}"),
    (keys::INVENTORY_GIVEN, "Gave {amount} {item}"),
    (keys::INVENTORY_CLEARED, "Inventory cleared"),
    (keys::CONDITIONAL_NO_BRANCH, "Condition was {outcome}, nothing to run"),
    (keys::RANDOM_EMPTY, "No random action could be chosen"),
    (keys::DELAY_SCHEDULED, "Scheduled in {delay_ms} ms"),
    (keys::DELAY_COMPLETED, "Waited {delay_ms} ms"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use gs_core::ActionError;
    use serde_json::json;

    #[test]
    fn test_every_engine_key_has_a_default() {
        let catalog = StaticCatalog::new();
        for key in keys::ALL {
            assert!(catalog.contains("en", key), "missing template for {key}");
        }
    }

    #[test]
    fn test_render_substitutes_replacements() {
        let catalog = StaticCatalog::new();
        let mut replacements = HashMap::new();
        replacements.insert("success_count".to_string(), json!(2));
        replacements.insert("total_count".to_string(), json!(3));

        assert_eq!(
            catalog.render(keys::COMPOSITE_PARTIAL, &replacements, None),
            "2 of 3 actions completed"
        );
    }

    #[test]
    fn test_render_result_for_unknown_type() {
        let catalog = StaticCatalog::new();
        let result = ActionResult::from_error(ActionError::UnknownType("foobar".into()));
        assert_eq!(
            catalog.render_result(&result, None),
            "Unknown action type 'foobar'"
        );
    }

    #[test]
    fn test_locale_fallback() {
        let catalog = StaticCatalog::new();
        catalog.insert("de", keys::MESSAGE_SENT, "Nachricht gesendet");

        let empty = HashMap::new();
        assert_eq!(
            catalog.render(keys::MESSAGE_SENT, &empty, Some("de_DE")),
            "Nachricht gesendet"
        );
        assert_eq!(
            catalog.render(keys::MESSAGE_SENT, &empty, Some("fr")),
            "Message sent"
        );
    }

    #[test]
    fn test_missing_key_and_replacement() {
        let catalog = StaticCatalog::empty();
        let empty = HashMap::new();
        assert_eq!(catalog.render("custom.key", &empty, None), "custom.key");

        catalog.insert("en", "custom.key", "Hello {who}");
        assert_eq!(catalog.render("custom.key", &empty, None), "Hello {who}");
    }
}
