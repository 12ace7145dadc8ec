//! Action engine for guiscript
//!
//! This crate turns configured action strings into side effects:
//!
//! - [`ActionRegistry`] - Case-insensitive, copy-on-write handler lookup
//! - [`ActionExecutor`] - Parses, resolves placeholders and dispatches
//! - [`ActionHandler`] / [`ValueAction`] - The handler contract
//! - [`PlaceholderResolver`] - `{name}` substitution
//! - [`WorkerPool`] - Bounded pools for random and delayed work
//!
//! # Example
//!
//! ```
//! use gs_config::EngineConfig;
//! use gs_core::{ActionContext, Actor};
//! use gs_engine::ActionExecutor;
//! use gs_services::testing::RecordingBackend;
//! use gs_services::Services;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let backend = Arc::new(RecordingBackend::new());
//! let executor = ActionExecutor::with_builtin_handlers(
//!     Services::from_backend(backend.clone()),
//!     EngineConfig::default(),
//! );
//!
//! let result = executor
//!     .execute_raw(&Actor::new("Alex"), "message:Hi {player}", &ActionContext::new())
//!     .await;
//! assert!(result.success);
//! assert_eq!(backend.messages(), vec!["Hi Alex"]);
//! # }
//! ```

pub mod composite;
pub mod executor;
pub mod handler;
pub mod handlers;
pub mod pool;
pub mod registry;
pub mod resolver;

pub use executor::{ActionExecutor, DispatchFuture};
pub use handler::{ActionHandler, Composite, ValueAction};
pub use pool::{ShutdownReport, WorkerPool};
pub use registry::ActionRegistry;
pub use resolver::PlaceholderResolver;
