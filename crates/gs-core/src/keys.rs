//! Message catalog keys used in [`ActionResult`](crate::ActionResult)s

pub const UNKNOWN_TYPE: &str = "action.unknown_type";
pub const ERROR_VALIDATION: &str = "action.error.validation";
pub const ERROR_EXECUTION: &str = "action.error.execution";
pub const ERROR_INTERRUPTED: &str = "action.error.interrupted";
pub const ERROR_DEPTH: &str = "action.error.depth";
pub const ERROR_POOL_SHUTDOWN: &str = "action.error.pool_shutdown";
pub const ERROR_ABORTED: &str = "action.error.aborted";

pub const DEFINITION_EMPTY: &str = "action.definition.empty";

pub const COMPOSITE_SUCCESS: &str = "action.composite.success";
pub const COMPOSITE_PARTIAL: &str = "action.composite.partial_success";
pub const COMPOSITE_FAILURE: &str = "action.composite.failure";

pub const MESSAGE_SENT: &str = "action.message.sent";
pub const BROADCAST_SENT: &str = "action.broadcast.sent";
pub const ACTIONBAR_SENT: &str = "action.actionbar.sent";
pub const TITLE_SENT: &str = "action.title.sent";
pub const SOUND_PLAYED: &str = "action.sound.played";
pub const COMMAND_EXECUTED: &str = "action.command.executed";
pub const CONSOLE_EXECUTED: &str = "action.console.executed";

pub const ECONOMY_ADDED: &str = "action.economy.added";
pub const ECONOMY_REMOVED: &str = "action.economy.removed";
pub const ECONOMY_SET: &str = "action.economy.set";
pub const ECONOMY_BALANCE: &str = "action.economy.balance";

pub const GAMEMODE_CHANGED: &str = "action.gamemode.changed";
pub const INVENTORY_GIVEN: &str = "action.inventory.given";
pub const INVENTORY_CLEARED: &str = "action.inventory.cleared";

pub const CONDITIONAL_NO_BRANCH: &str = "action.conditional.no_branch";
pub const RANDOM_EMPTY: &str = "action.random.empty";
pub const DELAY_SCHEDULED: &str = "action.delay.scheduled";
pub const DELAY_COMPLETED: &str = "action.delay.completed";

/// Every key the engine produces, for catalog completeness checks
pub const ALL: &[&str] = &[
    UNKNOWN_TYPE,
    ERROR_VALIDATION,
    ERROR_EXECUTION,
    ERROR_INTERRUPTED,
    ERROR_DEPTH,
    ERROR_POOL_SHUTDOWN,
    ERROR_ABORTED,
    DEFINITION_EMPTY,
    COMPOSITE_SUCCESS,
    COMPOSITE_PARTIAL,
    COMPOSITE_FAILURE,
    MESSAGE_SENT,
    BROADCAST_SENT,
    ACTIONBAR_SENT,
    TITLE_SENT,
    SOUND_PLAYED,
    COMMAND_EXECUTED,
    CONSOLE_EXECUTED,
    ECONOMY_ADDED,
    ECONOMY_REMOVED,
    ECONOMY_SET,
    ECONOMY_BALANCE,
    GAMEMODE_CHANGED,
    INVENTORY_GIVEN,
    INVENTORY_CLEARED,
    CONDITIONAL_NO_BRANCH,
    RANDOM_EMPTY,
    DELAY_SCHEDULED,
    DELAY_COMPLETED,
];
