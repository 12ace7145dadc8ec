//! Text delivery: chat messages, broadcasts and action bars

use crate::handler::ValueAction;
use async_trait::async_trait;
use gs_core::{keys, ActionOutcome, ActionResult, Actor};
use gs_services::MessageService;
use std::sync::Arc;

/// Where a text goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    /// Chat message to the actor
    Message,
    /// Chat message to everyone
    Broadcast,
    /// Action bar of the actor
    ActionBar,
}

/// `message:<text>`, `broadcast:<text>` and `actionbar:<text>`
pub struct TextAction {
    target: TextTarget,
    messages: Arc<dyn MessageService>,
}

impl TextAction {
    pub fn new(target: TextTarget, messages: Arc<dyn MessageService>) -> Self {
        Self { target, messages }
    }
}

#[async_trait]
impl ValueAction for TextAction {
    fn type_name(&self) -> &'static str {
        match self.target {
            TextTarget::Message => "message",
            TextTarget::Broadcast => "broadcast",
            TextTarget::ActionBar => "actionbar",
        }
    }

    fn describe(&self) -> &'static str {
        match self.target {
            TextTarget::Message => "Send a chat message to the player",
            TextTarget::Broadcast => "Send a chat message to every player",
            TextTarget::ActionBar => "Show text in the player's action bar",
        }
    }

    fn usage_examples(&self) -> &'static [&'static str] {
        match self.target {
            TextTarget::Message => &[
                "message:&aWelcome, {player}!",
                r#"message:[ "Line one", "Line two" ]"#,
                r#"message { - "First" - "Second" }"#,
            ],
            TextTarget::Broadcast => &["broadcast:&e{player} found a diamond!"],
            TextTarget::ActionBar => &["actionbar:&7Balance: {balance}"],
        }
    }

    fn is_valid_value(&self, value: &str) -> bool {
        !value.trim().is_empty()
    }

    async fn run(&self, actor: &Actor, value: &str) -> ActionOutcome {
        let action_type = self.type_name();
        let (sent, key) = match self.target {
            TextTarget::Message => (
                self.messages.send_message(actor, value).await,
                keys::MESSAGE_SENT,
            ),
            TextTarget::Broadcast => (self.messages.broadcast(value).await, keys::BROADCAST_SENT),
            TextTarget::ActionBar => (
                self.messages.send_action_bar(actor, value).await,
                keys::ACTIONBAR_SENT,
            ),
        };
        sent.map_err(|e| e.into_action_error(action_type))?;

        Ok(ActionResult::success(key).with("text", value))
    }
}
