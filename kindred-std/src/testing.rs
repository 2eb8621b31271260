//! Testing utilities for kindred.
//!
//! Ready-made factories for exercising route tables, extension slots and the
//! dispatcher without writing real handlers.
//!
//! # Features
//!
//! - [`StaticFactory`]: always replies with the same [`Reply`]
//! - [`RecordingFactory`]: records every chain and context it is given
//! - [`FailingFactory`]: fails at construction or at invocation
//! - [`PanickingFactory`]: panics at construction or at invocation
//! - [`CountingFactory`]: counts handler invocations

use kindred_core::{
    BoxHandler, Handler, HandlerFactory, Reply, RequestContext, ResourceChain, RestError,
};
use serde_json::{Value, json};
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Static Factory
// ============================================================================

/// A factory whose handlers always return the same reply.
#[derive(Debug, Clone, Default)]
pub struct StaticFactory {
    reply: Reply,
}

impl StaticFactory {
    /// Reply with `reply`.
    pub fn new(reply: Reply) -> Self {
        Self { reply }
    }

    /// Reply with `body`.
    pub fn ok(body: Value) -> Self {
        Self::new(Reply::ok(body))
    }

    /// Reply with `body`, declared as created.
    pub fn created(body: Value) -> Self {
        Self::new(Reply::created(body))
    }

    /// Reply without a body.
    pub fn empty() -> Self {
        Self::new(Reply::none())
    }
}

/// Handler built by [`StaticFactory`].
#[derive(Debug)]
pub struct StaticHandler(Reply);

impl Handler for StaticHandler {
    type Output = Reply;

    async fn invoke(self) -> Result<Reply, RestError> {
        Ok(self.0)
    }
}

impl HandlerFactory for StaticFactory {
    fn create(
        &self,
        _chain: &ResourceChain,
        _ctx: RequestContext,
    ) -> Result<BoxHandler, RestError> {
        Ok(Box::new(StaticHandler(self.reply.clone())))
    }
}

// ============================================================================
// Recording Factory
// ============================================================================

/// One construction observed by a [`RecordingFactory`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// The chain the factory was given.
    pub chain: ResourceChain,
    /// The context the factory was given.
    pub ctx: RequestContext,
}

/// A factory that records its arguments.
///
/// Handlers reply with the chain identifiers, the action and the remainder,
/// so a test can also check what reached the client.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingFactory::new();
/// builder.bind(revision, Verb::Get, "commit", recorder.clone())?;
///
/// dispatcher.dispatch(request).await;
/// assert_eq!(recorder.last().unwrap().chain.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl RecordingFactory {
    /// Create a recorder with no calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().clone()
    }

    /// The most recent call.
    pub fn last(&self) -> Option<RecordedCall> {
        self.lock().last().cloned()
    }

    /// Number of recorded calls.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HandlerFactory for RecordingFactory {
    fn create(&self, chain: &ResourceChain, ctx: RequestContext) -> Result<BoxHandler, RestError> {
        let body = json!({
            "ids": chain.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            "action": ctx.action,
            "remainder": ctx.remainder,
        });
        self.lock().push(RecordedCall {
            chain: chain.clone(),
            ctx,
        });
        Ok(Box::new(StaticHandler(Reply::ok(body))))
    }
}

// ============================================================================
// Failing Factory
// ============================================================================

type ErrorFn = Arc<dyn Fn() -> RestError + Send + Sync>;

/// A factory that fails, either while building the handler or when the
/// handler runs.
#[derive(Clone)]
pub struct FailingFactory {
    error: ErrorFn,
    at_construction: bool,
}

impl FailingFactory {
    /// Fail inside `create`.
    pub fn at_construction(error: impl Fn() -> RestError + Send + Sync + 'static) -> Self {
        Self {
            error: Arc::new(error),
            at_construction: true,
        }
    }

    /// Build fine, fail inside `invoke`.
    pub fn at_invocation(error: impl Fn() -> RestError + Send + Sync + 'static) -> Self {
        Self {
            error: Arc::new(error),
            at_construction: false,
        }
    }
}

impl std::fmt::Debug for FailingFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailingFactory")
            .field("at_construction", &self.at_construction)
            .finish_non_exhaustive()
    }
}

/// Handler built by [`FailingFactory::at_invocation`].
pub struct FailingHandler(ErrorFn);

impl Handler for FailingHandler {
    type Output = ();

    async fn invoke(self) -> Result<(), RestError> {
        Err((self.0)())
    }
}

impl HandlerFactory for FailingFactory {
    fn create(
        &self,
        _chain: &ResourceChain,
        _ctx: RequestContext,
    ) -> Result<BoxHandler, RestError> {
        if self.at_construction {
            Err((self.error)())
        } else {
            Ok(Box::new(FailingHandler(self.error.clone())))
        }
    }
}

// ============================================================================
// Panicking Factory
// ============================================================================

/// A factory that panics, for checking that panics never escape dispatch.
#[derive(Debug, Clone, Copy)]
pub struct PanickingFactory {
    at_construction: bool,
}

impl PanickingFactory {
    /// Panic inside `create`.
    pub fn at_construction() -> Self {
        Self {
            at_construction: true,
        }
    }

    /// Panic inside `invoke`.
    pub fn at_invocation() -> Self {
        Self {
            at_construction: false,
        }
    }
}

/// Handler built by [`PanickingFactory::at_invocation`].
#[derive(Debug)]
pub struct PanickingHandler;

impl Handler for PanickingHandler {
    type Output = ();

    async fn invoke(self) -> Result<(), RestError> {
        panic!("handler panicked on purpose")
    }
}

impl HandlerFactory for PanickingFactory {
    fn create(
        &self,
        _chain: &ResourceChain,
        _ctx: RequestContext,
    ) -> Result<BoxHandler, RestError> {
        if self.at_construction {
            panic!("factory panicked on purpose");
        }
        Ok(Box::new(PanickingHandler))
    }
}

// ============================================================================
// Counting Factory
// ============================================================================

/// A factory whose handlers count their invocations in a shared counter.
#[derive(Debug, Clone, Default)]
pub struct CountingFactory {
    count: Arc<AtomicUsize>,
}

impl CountingFactory {
    /// Create a factory with a zeroed counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handlers that have run.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Handler built by [`CountingFactory`]. Replies with the count after its own
/// increment.
#[derive(Debug)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl Handler for CountingHandler {
    type Output = Value;

    async fn invoke(self) -> Result<Value, RestError> {
        let seen = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(json!(seen))
    }
}

impl HandlerFactory for CountingFactory {
    fn create(
        &self,
        _chain: &ResourceChain,
        _ctx: RequestContext,
    ) -> Result<BoxHandler, RestError> {
        Ok(Box::new(CountingHandler {
            count: self.count.clone(),
        }))
    }
}
