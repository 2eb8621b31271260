//! # Handler Factories
//!
//! Factories construct a handler for one request from explicit arguments:
//! the resolved [`ResourceChain`] and the [`RequestContext`]. They hold no
//! request state themselves, so one factory serves any number of concurrent
//! requests.
//!
//! # Usage Patterns
//!
//! 1. **Closure**: `factory_fn(|chain, ctx| Ok(GetTopic::new(chain, ctx)))`
//! 2. **Struct implementation**: `impl HandlerFactory for MyFactory`
//!
//! A factory may refuse to build a handler (for example because the
//! identifier in the chain does not exist). It reports that through the same
//! [`RestError`] taxonomy a handler would use.

use crate::{
    chain::ResourceChain,
    context::RequestContext,
    error::RestError,
    handler::{BoxHandler, Handler},
};
use std::sync::Arc;

/// Builds request handlers.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot build request handlers",
    label = "missing `HandlerFactory` implementation",
    note = "Wrap closures with `factory_fn` or implement `HandlerFactory::create`."
)]
pub trait HandlerFactory: Send + Sync + 'static {
    /// Build the handler for one request.
    fn create(&self, chain: &ResourceChain, ctx: RequestContext) -> Result<BoxHandler, RestError>;
}

/// A factory shared between route slots, aliases and extension snapshots.
pub type SharedFactory = Arc<dyn HandlerFactory>;

impl<F: HandlerFactory + ?Sized> HandlerFactory for Arc<F> {
    fn create(&self, chain: &ResourceChain, ctx: RequestContext) -> Result<BoxHandler, RestError> {
        (**self).create(chain, ctx)
    }
}

impl<F: HandlerFactory + ?Sized> HandlerFactory for Box<F> {
    fn create(&self, chain: &ResourceChain, ctx: RequestContext) -> Result<BoxHandler, RestError> {
        (**self).create(chain, ctx)
    }
}

/// A factory backed by a closure. Built with [`factory_fn`].
pub struct FactoryFn<F> {
    f: F,
}

/// Turn a closure into a [`HandlerFactory`].
///
/// ```rust,ignore
/// let get_topic = factory_fn(|chain: &ResourceChain, _ctx| {
///     let change = chain.leaf().ok_or_else(|| RestError::NotFound("change".into()))?;
///     Ok(GetTopic { change: change.id.clone() })
/// });
/// ```
pub fn factory_fn<F, H>(f: F) -> FactoryFn<F>
where
    F: Fn(&ResourceChain, RequestContext) -> Result<H, RestError> + Send + Sync + 'static,
    H: Handler,
{
    FactoryFn { f }
}

impl<F, H> HandlerFactory for FactoryFn<F>
where
    F: Fn(&ResourceChain, RequestContext) -> Result<H, RestError> + Send + Sync + 'static,
    H: Handler,
{
    fn create(&self, chain: &ResourceChain, ctx: RequestContext) -> Result<BoxHandler, RestError> {
        let handler = (self.f)(chain, ctx)?;
        Ok(Box::new(handler))
    }
}
