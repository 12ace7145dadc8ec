//! Game mode changes, with a numeric id retry

use crate::handler::ValueAction;
use async_trait::async_trait;
use gs_core::{keys, ActionError, ActionOutcome, ActionResult, Actor};
use gs_services::CommandService;
use std::sync::Arc;
use tracing::warn;

/// Game modes with their numeric ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl GameMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "survival" | "s" | "0" => Some(GameMode::Survival),
            "creative" | "c" | "1" => Some(GameMode::Creative),
            "adventure" | "a" | "2" => Some(GameMode::Adventure),
            "spectator" | "sp" | "3" => Some(GameMode::Spectator),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Survival => "survival",
            GameMode::Creative => "creative",
            GameMode::Adventure => "adventure",
            GameMode::Spectator => "spectator",
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            GameMode::Survival => 0,
            GameMode::Creative => 1,
            GameMode::Adventure => 2,
            GameMode::Spectator => 3,
        }
    }
}

/// `gamemode:<mode>`
///
/// Runs `gamemode <mode> <player>` from the console and retries with the
/// numeric id when the platform rejects the name.
pub struct GameModeAction {
    commands: Arc<dyn CommandService>,
}

impl GameModeAction {
    pub fn new(commands: Arc<dyn CommandService>) -> Self {
        Self { commands }
    }
}

#[async_trait]
impl ValueAction for GameModeAction {
    fn type_name(&self) -> &'static str {
        "gamemode"
    }

    fn describe(&self) -> &'static str {
        "Change the player's game mode"
    }

    fn usage_examples(&self) -> &'static [&'static str] {
        &["gamemode:creative", "gamemode:survival", "gamemode:3"]
    }

    fn is_valid_value(&self, value: &str) -> bool {
        GameMode::parse(value).is_some()
    }

    async fn run(&self, actor: &Actor, value: &str) -> ActionOutcome {
        let mode = GameMode::parse(value).ok_or_else(|| {
            ActionError::validation("gamemode", format!("unknown game mode '{}'", value))
        })?;

        let command = format!("gamemode {} {}", mode.name(), actor.name);
        if let Err(err) = self.commands.run_console(&command).await {
            warn!(command = %command, error = %err, "Game mode command failed, retrying with id");
            let fallback = format!("gamemode {} {}", mode.id(), actor.name);
            self.commands
                .run_console(&fallback)
                .await
                .map_err(|e| e.into_action_error("gamemode"))?;
        }

        Ok(ActionResult::success(keys::GAMEMODE_CHANGED)
            .with("mode", mode.name())
            .with("player", actor.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_services::testing::RecordingBackend;

    #[tokio::test]
    async fn test_numeric_fallback() {
        let backend = Arc::new(RecordingBackend::new().fail_commands("gamemode creative"));
        let action = GameModeAction::new(backend.clone());

        let result = action.run(&Actor::new("Alex"), "creative").await.unwrap();
        assert!(result.success);
        assert_eq!(backend.console_commands(), vec!["gamemode 1 Alex"]);
    }

    #[tokio::test]
    async fn test_both_attempts_fail() {
        let backend = Arc::new(RecordingBackend::new().fail_commands("gamemode"));
        let action = GameModeAction::new(backend.clone());

        assert!(action.run(&Actor::new("Alex"), "c").await.is_err());
        assert!(backend.console_commands().is_empty());
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!(GameMode::parse("Creative"), Some(GameMode::Creative));
        assert_eq!(GameMode::parse("sp"), Some(GameMode::Spectator));
        assert_eq!(GameMode::parse("hardcore"), None);
    }
}
