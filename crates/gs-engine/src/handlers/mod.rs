//! Built-in action handlers
//!
//! Value actions (`message`, `sound`, `economy`, ...) are wrapped in
//! [`Composite`] so every one of them accepts single values, bracket lists
//! and blocks with per-type pacing. `conditional`, `random` and `delay` are
//! combinators that run nested actions through the executor.

mod command;
mod conditional;
mod delay;
mod economy;
mod gamemode;
mod inventory;
mod message;
mod random;
mod sound;
mod title;

pub use command::{CommandAction, CommandSender};
pub use conditional::ConditionalHandler;
pub use delay::{parse_delay, DelayHandler, DelaySpec};
pub use economy::{format_amount, parse_economy, EconomyAction, EconomyOp};
pub use gamemode::{GameMode, GameModeAction};
pub use inventory::{parse_inventory, InventoryAction, InventoryOp};
pub use message::{TextAction, TextTarget};
pub use random::{select_weighted, RandomHandler};
pub use sound::{parse_sound, SoundAction};
pub use title::{parse_title, TitleAction};

use crate::handler::{ActionHandler, Composite, ValueAction};
use gs_config::EngineConfig;
use gs_services::Services;
use std::sync::Arc;

fn paced<A>(action: A, config: &EngineConfig) -> Arc<dyn ActionHandler>
where
    A: ValueAction + 'static,
{
    let pacing = config.pacing.for_type(action.type_name());
    Arc::new(Composite::new(action, pacing))
}

/// Every built-in handler, wired to `services`
pub fn builtin_handlers(services: &Services, config: &EngineConfig) -> Vec<Arc<dyn ActionHandler>> {
    vec![
        paced(TextAction::new(TextTarget::Message, services.messages.clone()), config),
        paced(TextAction::new(TextTarget::Broadcast, services.messages.clone()), config),
        paced(TextAction::new(TextTarget::ActionBar, services.messages.clone()), config),
        paced(TitleAction::new(services.titles.clone()), config),
        paced(SoundAction::new(services.sounds.clone()), config),
        paced(CommandAction::new(CommandSender::Player, services.commands.clone()), config),
        paced(CommandAction::new(CommandSender::Console, services.commands.clone()), config),
        paced(
            EconomyAction::new(services.economy.clone(), services.commands.clone()),
            config,
        ),
        paced(GameModeAction::new(services.commands.clone()), config),
        paced(InventoryAction::new(services.commands.clone()), config),
        Arc::new(ConditionalHandler::new(services.permissions.clone())),
        Arc::new(RandomHandler),
        Arc::new(DelayHandler::new(config.max_delay_ms)),
    ]
}
