//! Action executor
//!
//! Turns raw action strings into [`Action`]s, resolves their placeholders,
//! routes them to the registered handler and converts every outcome into an
//! [`ActionResult`]. Combinator handlers call back into the executor for
//! their nested actions.

use crate::composite;
use crate::handler::ActionHandler;
use crate::pool::{ShutdownReport, WorkerPool};
use crate::registry::ActionRegistry;
use crate::resolver::PlaceholderResolver;
use futures::FutureExt;
use gs_config::EngineConfig;
use gs_core::{keys, Action, ActionContext, ActionDefinition, ActionError, ActionResult, Actor};
use gs_services::{PlaceholderProvider, Services};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span, instrument, warn, Instrument};

/// Boxed future returned by dispatch, which recurses through handlers
pub type DispatchFuture<'a> = Pin<Box<dyn Future<Output = ActionResult> + Send + 'a>>;

/// Executes actions against the registry
///
/// Cheap to clone; clones share the registry, the worker pools and the
/// shutdown signal.
#[derive(Clone)]
pub struct ActionExecutor {
    inner: Arc<ExecutorInner>,
}

struct ExecutorInner {
    registry: Arc<ActionRegistry>,
    resolver: PlaceholderResolver,
    config: EngineConfig,
    random_pool: WorkerPool,
    delay_pool: WorkerPool,
    interrupt: CancellationToken,
}

impl ActionExecutor {
    /// Create an executor over an existing registry
    pub fn new(
        registry: Arc<ActionRegistry>,
        placeholders: Arc<dyn PlaceholderProvider>,
        config: EngineConfig,
    ) -> Self {
        let interrupt = CancellationToken::new();
        let random_pool = WorkerPool::new("random", config.pools.random_workers, interrupt.clone());
        let delay_pool = WorkerPool::new("delay", config.pools.delay_workers, interrupt.clone());

        Self {
            inner: Arc::new(ExecutorInner {
                registry,
                resolver: PlaceholderResolver::new(placeholders),
                config,
                random_pool,
                delay_pool,
                interrupt,
            }),
        }
    }

    /// Create an executor with every built-in handler registered
    pub fn with_builtin_handlers(services: Services, config: EngineConfig) -> Self {
        let registry = Arc::new(ActionRegistry::with_builtin_handlers(&services, &config));
        Self::new(registry, services.placeholders.clone(), config)
    }

    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.inner.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn resolver(&self) -> &PlaceholderResolver {
        &self.inner.resolver
    }

    pub(crate) fn random_pool(&self) -> &WorkerPool {
        &self.inner.random_pool
    }

    pub(crate) fn delay_pool(&self) -> &WorkerPool {
        &self.inner.delay_pool
    }

    /// Signal cancelled when shutdown gives up waiting; paced work watches it
    pub fn interrupt_signal(&self) -> &CancellationToken {
        &self.inner.interrupt
    }

    /// Split a raw string into an [`Action`], using the default type when
    /// it has no `type:` prefix
    pub fn parse_action(&self, raw: &str) -> Action {
        gs_dsl::parse_action(raw, &self.inner.config.default_action_type)
    }

    /// Parse several raw strings into a definition, keeping order
    pub fn parse_definition<I, S>(&self, raws: I) -> ActionDefinition
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raws.into_iter()
            .map(|raw| self.parse_action(raw.as_ref()))
            .collect()
    }

    /// Check a raw action without running it
    pub fn validate(&self, raw: &str) -> Result<(), ActionError> {
        let action = self.parse_action(raw);
        let handler = self
            .inner
            .registry
            .lookup(&action.action_type)
            .ok_or_else(|| ActionError::UnknownType(action.action_type.clone()))?;

        if handler.is_valid_action(&action.data) {
            Ok(())
        } else {
            Err(ActionError::validation(
                &action.action_type,
                format!("invalid data '{}'", action.data),
            ))
        }
    }

    /// Whether a raw action would pass [`validate`](Self::validate)
    pub fn is_valid(&self, raw: &str) -> bool {
        self.validate(raw).is_ok()
    }

    /// Execute a definition
    ///
    /// One entry yields that entry's result. Several entries all run, in
    /// order, and their results are aggregated.
    pub async fn execute_action(
        &self,
        actor: &Actor,
        definition: &ActionDefinition,
        ctx: &ActionContext,
    ) -> ActionResult {
        let mut results = self.execute_actions(actor, definition.actions(), ctx).await;
        match results.len() {
            0 => ActionResult::failure(keys::DEFINITION_EMPTY),
            1 => results.pop().unwrap_or_else(|| ActionResult::failure(keys::DEFINITION_EMPTY)),
            total => composite::aggregate("definition", &results, total),
        }
    }

    /// Execute every action in order, never stopping early
    pub async fn execute_actions(
        &self,
        actor: &Actor,
        actions: &[Action],
        ctx: &ActionContext,
    ) -> Vec<ActionResult> {
        let mut results = Vec::with_capacity(actions.len());
        for action in actions {
            results.push(self.dispatch(actor, action, ctx).await);
        }
        results
    }

    /// Parse and execute one raw action string
    #[instrument(skip(self, actor, ctx), fields(actor = %actor.name))]
    pub async fn execute_raw(&self, actor: &Actor, raw: &str, ctx: &ActionContext) -> ActionResult {
        let action = self.parse_action(raw);
        self.dispatch(actor, &action, ctx).await
    }

    /// Execute a raw action one nesting level below `ctx`
    ///
    /// Used by combinators for their branches and chained actions. Fails
    /// with [`ActionError::DepthExceeded`] past the configured depth.
    pub async fn execute_nested(
        &self,
        actor: &Actor,
        raw: &str,
        ctx: &ActionContext,
    ) -> ActionResult {
        let nested = ctx.nested();
        let limit = self.inner.config.max_nesting_depth;
        if nested.depth() > limit {
            warn!(depth = nested.depth(), limit, action = %raw, "Nesting limit reached");
            return ActionResult::from_error(ActionError::DepthExceeded {
                depth: nested.depth(),
                limit,
            });
        }

        let action = self.parse_action(raw);
        self.dispatch(actor, &action, &nested).await
    }

    /// Resolve placeholders, find the handler and run it behind the barrier
    pub fn dispatch<'a>(
        &'a self,
        actor: &'a Actor,
        action: &'a Action,
        ctx: &'a ActionContext,
    ) -> DispatchFuture<'a> {
        let span = debug_span!(
            "dispatch",
            action_type = %action.action_type,
            depth = ctx.depth()
        );

        Box::pin(
            async move {
                let Some(handler) = self.inner.registry.lookup(&action.action_type) else {
                    warn!("Unknown action type");
                    return ActionResult::from_error(ActionError::UnknownType(
                        action.action_type.clone(),
                    ));
                };

                let data = self.inner.resolver.resolve(&action.data, actor, ctx);
                debug!(data = %data, "Dispatching action");

                self.run_handler(handler.as_ref(), actor, &data, ctx).await
            }
            .instrument(span),
        )
    }

    async fn run_handler(
        &self,
        handler: &dyn ActionHandler,
        actor: &Actor,
        data: &str,
        ctx: &ActionContext,
    ) -> ActionResult {
        let outcome = AssertUnwindSafe(handler.execute(actor, data, ctx, self))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => {
                debug!(success = result.success, message = %result.message, "Action finished");
                result
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Action failed");
                ActionResult::from_error(err)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(panic = %message, "Action handler panicked");
                ActionResult::from_error(ActionError::Panicked {
                    action_type: handler.type_name().to_string(),
                    message,
                })
            }
        }
    }

    /// Shut both worker pools down
    ///
    /// New random and delayed work is rejected from here on. In-flight tasks
    /// get the configured timeout; after that paced work is interrupted and
    /// whatever is still running is aborted.
    pub async fn shutdown(&self) -> ShutdownReport {
        let timeout = self.inner.config.pools.shutdown_timeout();
        let (random, delay) = tokio::join!(
            self.inner.random_pool.shutdown(timeout),
            self.inner.delay_pool.shutdown(timeout)
        );

        let report = random.merge(delay);
        debug!(
            completed = report.completed,
            aborted = report.aborted,
            "Executor shut down"
        );
        report
    }
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("registry", &self.inner.registry)
            .field("random_pool", &self.inner.random_pool)
            .field("delay_pool", &self.inner.delay_pool)
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
