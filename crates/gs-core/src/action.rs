//! Action types
//!
//! An [`Action`] is one dispatchable unit. An [`ActionDefinition`] is the
//! ordered list of actions stacked under one configured entry.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Separator between an action's type and its data (`message:Hello`)
pub const DEFAULT_DELIMITER: char = ':';

/// Type given to raw strings without a `type:` prefix
pub const DEFAULT_ACTION_TYPE: &str = "message";

/// One dispatchable action
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Handler type name, lower-cased
    #[serde(rename = "type")]
    pub action_type: String,

    /// Raw data handed to the handler (placeholders not yet resolved)
    pub data: String,
}

impl Action {
    /// Create a new action; the type name is lower-cased
    pub fn new(action_type: impl AsRef<str>, data: impl Into<String>) -> Self {
        Self {
            action_type: action_type.as_ref().trim().to_lowercase(),
            data: data.into(),
        }
    }

    /// Split a raw `type:data` string on its first delimiter
    ///
    /// `sound { - ... }` keeps the whole block as data. Text without a plain
    /// type name in front becomes a [`DEFAULT_ACTION_TYPE`] action.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Some((head, body)) = trimmed.split_once('{') {
            let head = head.trim_end();
            let body = body.trim_start();
            let opens_block = body.starts_with('-') || body.starts_with('}');
            if is_type_name(head) && opens_block && trimmed.ends_with('}') {
                return Self::new(head, trimmed);
            }
        }

        match trimmed.split_once(DEFAULT_DELIMITER) {
            Some((action_type, data)) if is_type_name(action_type) => {
                Self::new(action_type, data.trim())
            }
            _ => Self::new(DEFAULT_ACTION_TYPE, trimmed),
        }
    }

    /// Render back to the legacy `type:data` form
    pub fn to_raw(&self) -> String {
        format!("{}{}{}", self.action_type, DEFAULT_DELIMITER, self.data)
    }
}

fn is_type_name(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.action_type, DEFAULT_DELIMITER, self.data)
    }
}

/// Ordered list of actions configured under one entry
///
/// Order is execution order. Duplicate entries are kept.
///
/// Deserializes from a single raw string, or a list whose items are raw
/// strings or `{type, data}` objects:
///
/// ```yaml
/// - 'message:Hello {player}'
/// - type: sound
///   data: ui.click:0.5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActionDefinition {
    actions: Vec<Action>,
}

impl<'de> Deserialize<'de> for ActionDefinition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Entry {
            Raw(String),
            Action(Action),
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrVec {
            String(String),
            Vec(Vec<Entry>),
        }

        let actions = match StringOrVec::deserialize(deserializer)? {
            StringOrVec::String(raw) => vec![Action::from_raw(&raw)],
            StringOrVec::Vec(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    Entry::Raw(raw) => Action::from_raw(&raw),
                    Entry::Action(action) => Action::new(&action.action_type, action.data),
                })
                .collect(),
        };
        Ok(Self { actions })
    }
}

impl ActionDefinition {
    /// Create an empty definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a definition holding a single action
    pub fn single(action: Action) -> Self {
        Self {
            actions: vec![action],
        }
    }

    /// Append an action, keeping order
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Builder-style append
    pub fn with(mut self, action_type: impl AsRef<str>, data: impl Into<String>) -> Self {
        self.actions.push(Action::new(action_type, data));
        self
    }

    /// The configured actions in execution order
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterate over `(type, data)` pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.actions
            .iter()
            .map(|a| (a.action_type.as_str(), a.data.as_str()))
    }
}

impl From<Vec<Action>> for ActionDefinition {
    fn from(actions: Vec<Action>) -> Self {
        Self { actions }
    }
}

impl FromIterator<Action> for ActionDefinition {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ActionDefinition {
    type Item = Action;
    type IntoIter = std::vec::IntoIter<Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_is_lowercased() {
        let action = Action::new(" Message ", "Hello");
        assert_eq!(action.action_type, "message");
        assert_eq!(action.to_raw(), "message:Hello");
    }

    #[test]
    fn test_definition_keeps_order_and_duplicates() {
        let def = ActionDefinition::new()
            .with("message", "a")
            .with("sound", "ui.click")
            .with("message", "a");

        let pairs: Vec<_> = def.pairs().collect();
        assert_eq!(
            pairs,
            vec![("message", "a"), ("sound", "ui.click"), ("message", "a")]
        );
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(Action::from_raw("Message:Hello: there"), Action::new("message", "Hello: there"));
        assert_eq!(Action::from_raw("Just text"), Action::new("message", "Just text"));
        assert_eq!(Action::from_raw("10:30 today"), Action::new("message", "10:30 today"));
        assert_eq!(Action::from_raw("Welcome {player}"), Action::new("message", "Welcome {player}"));

        let block = r#"sound { - "ui.click:0.5" }"#;
        assert_eq!(Action::from_raw(block), Action::new("sound", block));
    }

    #[test]
    fn test_definition_from_yaml_string() {
        let def: ActionDefinition = serde_yaml::from_str("'message:hi'").unwrap();
        assert_eq!(def.actions(), &[Action::new("message", "hi")]);
    }

    #[test]
    fn test_definition_from_yaml_list() {
        let yaml = r#"
- 'message:Hello {player}'
- 'console:say hi'
- type: Sound
  data: ui.click:0.5
"#;
        let def: ActionDefinition = serde_yaml::from_str(yaml).unwrap();
        let pairs: Vec<_> = def.pairs().collect();
        assert_eq!(
            pairs,
            vec![
                ("message", "Hello {player}"),
                ("console", "say hi"),
                ("sound", "ui.click:0.5")
            ]
        );
    }

    #[test]
    fn test_definition_round_trips_through_json() {
        let def = ActionDefinition::new().with("message", "a").with("console", "b");
        let json = serde_json::to_string(&def).unwrap();
        let back: ActionDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn test_definition_serializes_as_list() {
        let def = ActionDefinition::single(Action::new("console", "say hi"));
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json[0]["type"], "console");
        assert_eq!(json[0]["data"], "say hi");
    }
}
