//! `{name}` placeholder substitution

use gs_core::{ActionContext, Actor};
use gs_services::PlaceholderProvider;
use regex::{Captures, Regex};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// Substitutes `{name}` tokens in action data
///
/// Lookup order: context placeholders, form results, actor built-ins
/// (`player`, `player_name`, `player_id`), then the external provider.
/// Tokens nobody knows are left as written.
#[derive(Clone)]
pub struct PlaceholderResolver {
    provider: Arc<dyn PlaceholderProvider>,
}

impl PlaceholderResolver {
    pub fn new(provider: Arc<dyn PlaceholderProvider>) -> Self {
        Self { provider }
    }

    /// Value of a single placeholder
    pub fn lookup(&self, name: &str, actor: &Actor, ctx: &ActionContext) -> Option<String> {
        if let Some(value) = ctx.placeholder(name) {
            return Some(value.to_string());
        }
        if let Some(value) = ctx.form_result(name) {
            return Some(render_value(value));
        }
        match name {
            "player" | "player_name" => return Some(actor.name.clone()),
            "player_id" => return Some(actor.id.clone()),
            _ => {}
        }
        self.provider.resolve(actor, name)
    }

    /// Replace every known token in `text`
    pub fn resolve<'t>(&self, text: &'t str, actor: &Actor, ctx: &ActionContext) -> Cow<'t, str> {
        if !text.contains('{') {
            return Cow::Borrowed(text);
        }
        let Some(pattern) = token_pattern() else {
            return Cow::Borrowed(text);
        };

        pattern.replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            match self.lookup(name, actor, ctx) {
                Some(value) => value,
                None => {
                    trace!(placeholder = %name, "Unresolved placeholder");
                    caps[0].to_string()
                }
            }
        })
    }
}

impl std::fmt::Debug for PlaceholderResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderResolver").finish_non_exhaustive()
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn token_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{([A-Za-z0-9_.:-]+)\}").ok())
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_services::testing::RecordingBackend;
    use gs_services::NoPlaceholders;
    use serde_json::json;

    fn actor() -> Actor {
        Actor::with_id("0000-1111", "Alex")
    }

    #[test]
    fn test_resolution_order() {
        let backend = RecordingBackend::new()
            .placeholder("rank", "external")
            .placeholder("server", "Lobby");
        let resolver = PlaceholderResolver::new(Arc::new(backend));
        let ctx = ActionContext::new()
            .with_placeholder("rank", "gold")
            .with_form_result("amount", json!(5))
            .with_form_result("note", json!("hi"));

        let resolved = resolver.resolve(
            "{player} ({player_id}) is {rank} on {server}: {amount} {note}",
            &actor(),
            &ctx,
        );
        assert_eq!(resolved, "Alex (0000-1111) is gold on Lobby: 5 hi");
    }

    #[test]
    fn test_unknown_tokens_stay_verbatim() {
        let resolver = PlaceholderResolver::new(Arc::new(NoPlaceholders));
        let ctx = ActionContext::new();

        assert_eq!(
            resolver.resolve("Hello {unknown} {player}", &actor(), &ctx),
            "Hello {unknown} Alex"
        );
    }

    #[test]
    fn test_blocks_are_not_tokens() {
        let resolver = PlaceholderResolver::new(Arc::new(NoPlaceholders));
        let text = r#"random { - "message:{player}" }"#;

        assert_eq!(
            resolver.resolve(text, &actor(), &ActionContext::new()),
            r#"random { - "message:Alex" }"#
        );
        assert!(matches!(
            resolver.resolve("no tokens", &actor(), &ActionContext::new()),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_namespaced_placeholder_names() {
        let backend = RecordingBackend::new().placeholder("vault_eco_balance:fixed", "120");
        let resolver = PlaceholderResolver::new(Arc::new(backend));

        assert_eq!(
            resolver.resolve("{vault_eco_balance:fixed}", &actor(), &ActionContext::new()),
            "120"
        );
    }
}
