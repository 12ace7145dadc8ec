//! Core types for the guiscript action engine
//!
//! This crate provides the fundamental types used throughout the engine:
//! - [`Action`] / [`ActionDefinition`] - Dispatchable units and configured entries
//! - [`ActionContext`] - Per-invocation placeholders, form results and metadata
//! - [`ActionResult`] - Outcome of an action, carrying a message key
//! - [`Actor`] - The entity an action runs for
//! - [`ActionError`] - Error taxonomy shared by every handler

pub mod action;
pub mod context;
pub mod error;
pub mod keys;
pub mod result;

pub use action::{Action, ActionDefinition, DEFAULT_ACTION_TYPE, DEFAULT_DELIMITER};
pub use context::{ActionContext, Actor};
pub use error::{ActionError, ActionOutcome};
pub use result::{ActionResult, ActionStatus};
