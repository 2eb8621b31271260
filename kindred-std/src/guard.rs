//! Panic containment around factories and handlers.

use futures::FutureExt;
use kindred_core::{BoxHandler, HandlerFactory, Reply, RequestContext, ResourceChain, RestError};
use std::{any::Any, panic::AssertUnwindSafe};
use thiserror::Error;

/// A factory or handler panicked. Carried as the source of an internal
/// error; clients only see `internal error`.
#[derive(Debug, Error)]
#[error("panicked: {0}")]
pub struct HandlerPanic(pub String);

impl HandlerPanic {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self(message)
    }
}

/// `factory.create`, with a panic turned into an internal error.
pub(crate) fn build(
    factory: &dyn HandlerFactory,
    chain: &ResourceChain,
    ctx: RequestContext,
) -> Result<BoxHandler, RestError> {
    std::panic::catch_unwind(AssertUnwindSafe(|| factory.create(chain, ctx)))
        .unwrap_or_else(|payload| Err(RestError::internal(HandlerPanic::from_payload(payload))))
}

/// Invoke `handler`, with a panic turned into an internal error.
pub(crate) async fn run(handler: BoxHandler) -> Result<Reply, RestError> {
    AssertUnwindSafe(handler.invoke_dyn())
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(RestError::internal(HandlerPanic::from_payload(payload))))
}
