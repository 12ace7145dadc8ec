//! Script files: named action lists

use crate::error::{ConfigError, ConfigResult};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use tracing::debug;

/// Accept either a single string or a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrVec {
        String(String),
        Vec(Vec<String>),
    }

    match StringOrVec::deserialize(deserializer)? {
        StringOrVec::String(s) => Ok(vec![s]),
        StringOrVec::Vec(v) => Ok(v),
    }
}

#[derive(Debug)]
struct Entry(Vec<String>);

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        string_or_vec(deserializer).map(Entry)
    }
}

/// A YAML mapping of entry name to raw action strings
///
/// ```yaml
/// welcome:
///   - 'message:Hello {player}'
///   - 'sound:ui.click:0.5'
/// reward: 'economy:add:50'
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptFile {
    entries: IndexMap<String, Vec<String>>,
}

impl ScriptFile {
    /// Parse a script from a YAML string
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let entries: Option<IndexMap<String, Entry>> = serde_yaml::from_str(yaml)?;
        Self::from_entries(entries)
    }

    /// Load a script from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let entries: Option<IndexMap<String, Entry>> =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source,
            })?;

        let script = Self::from_entries(entries)?;
        debug!(path = %path.display(), entries = script.len(), "Loaded script file");
        Ok(script)
    }

    fn from_entries(entries: Option<IndexMap<String, Entry>>) -> ConfigResult<Self> {
        let entries: IndexMap<String, Vec<String>> = entries
            .unwrap_or_default()
            .into_iter()
            .map(|(name, Entry(actions))| (name, actions))
            .collect();

        if let Some((name, _)) = entries.iter().find(|(_, actions)| actions.is_empty()) {
            return Err(ConfigError::invalid(name, "entry has no actions"));
        }

        Ok(Self { entries })
    }

    /// Raw action strings of an entry
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Entry names in file order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, actions)| (name.as_str(), actions.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
welcome:
  - 'message:Hello {player}'
  - 'sound:ui.click:0.5'
reward: 'economy:add:50'
lucky: |
  random {
    - "message:Common:8"
    - "message:Rare:2"
  }
"#;

    #[test]
    fn test_string_or_list_entries() {
        let script = ScriptFile::from_yaml_str(SCRIPT).unwrap();

        assert_eq!(script.len(), 3);
        assert_eq!(
            script.names().collect::<Vec<_>>(),
            vec!["welcome", "reward", "lucky"]
        );
        assert_eq!(script.get("reward").unwrap(), &["economy:add:50".to_string()]);
        assert_eq!(script.get("welcome").unwrap().len(), 2);
        assert!(script.get("lucky").unwrap()[0].starts_with("random {"));
        assert!(script.get("missing").is_none());
    }

    #[test]
    fn test_empty_file() {
        let script = ScriptFile::from_yaml_str("").unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn test_rejects_empty_entry() {
        let err = ScriptFile::from_yaml_str("broken: []").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "broken"));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.yaml");
        std::fs::write(&path, "welcome: [unclosed").unwrap();

        let err = ScriptFile::load(&path).unwrap_err();
        match err {
            ConfigError::ParseYaml { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
