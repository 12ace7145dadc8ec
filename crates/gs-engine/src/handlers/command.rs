//! Commands run as the player or as the console

use crate::handler::ValueAction;
use async_trait::async_trait;
use gs_core::{keys, ActionOutcome, ActionResult, Actor};
use gs_services::CommandService;
use std::sync::Arc;

/// Who a command runs as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSender {
    Player,
    Console,
}

/// `command:<command>` and `console:<command>`
///
/// A leading `/` is dropped either way.
pub struct CommandAction {
    sender: CommandSender,
    commands: Arc<dyn CommandService>,
}

impl CommandAction {
    pub fn new(sender: CommandSender, commands: Arc<dyn CommandService>) -> Self {
        Self { sender, commands }
    }
}

fn normalize_command(value: &str) -> &str {
    value.trim().trim_start_matches('/').trim_start()
}

#[async_trait]
impl ValueAction for CommandAction {
    fn type_name(&self) -> &'static str {
        match self.sender {
            CommandSender::Player => "command",
            CommandSender::Console => "console",
        }
    }

    fn describe(&self) -> &'static str {
        match self.sender {
            CommandSender::Player => "Run a command as the player",
            CommandSender::Console => "Run a command as the console",
        }
    }

    fn usage_examples(&self) -> &'static [&'static str] {
        match self.sender {
            CommandSender::Player => &["command:/spawn", "command:warp shop"],
            CommandSender::Console => &[
                "console:say {player} joined the arena",
                r#"console:[ "give {player} bread 3", "effect give {player} speed 10" ]"#,
            ],
        }
    }

    fn is_valid_value(&self, value: &str) -> bool {
        !normalize_command(value).is_empty()
    }

    async fn run(&self, actor: &Actor, value: &str) -> ActionOutcome {
        let action_type = self.type_name();
        let command = normalize_command(value);

        let (ran, key) = match self.sender {
            CommandSender::Player => (
                self.commands.run_as(actor, command).await,
                keys::COMMAND_EXECUTED,
            ),
            CommandSender::Console => {
                (self.commands.run_console(command).await, keys::CONSOLE_EXECUTED)
            }
        };
        ran.map_err(|e| e.into_action_error(action_type))?;

        Ok(ActionResult::success(key).with("command", command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_command() {
        assert_eq!(normalize_command("/spawn"), "spawn");
        assert_eq!(normalize_command("  / warp shop "), "warp shop");
        assert_eq!(normalize_command("/"), "");
    }
}
