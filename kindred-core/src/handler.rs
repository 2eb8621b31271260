//! # Handlers
//!
//! A handler is built per request by a [`HandlerFactory`] and then invoked
//! exactly once. It is the terminal point of dispatch: its result becomes the
//! response.
//!
//! # Static vs Dynamic Dispatch
//!
//! [`Handler`] uses native `async fn` so implementations stay zero-cost.
//! Route tables store factories that return [`BoxHandler`], an erased
//! [`DynHandler`]; every `Handler` is a `DynHandler` through a blanket impl.
//!
//! [`HandlerFactory`]: crate::HandlerFactory

use crate::error::RestError;
use serde::Serialize;
use serde_json::Value;
use std::{future::Future, pin::Pin};

/// The success value of a handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    body: Option<Value>,
    created: bool,
}

impl Reply {
    /// A reply with a body.
    pub fn ok(body: Value) -> Self {
        Self {
            body: Some(body),
            created: false,
        }
    }

    /// A reply declaring that new state was created (201 on PUT/POST).
    pub fn created(body: Value) -> Self {
        Self {
            body: Some(body),
            created: true,
        }
    }

    /// A reply without a body.
    pub fn none() -> Self {
        Self::default()
    }

    /// Serialize `value` into a reply body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, RestError> {
        serde_json::to_value(value)
            .map(Self::ok)
            .map_err(RestError::internal)
    }

    /// The body, if any.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Take the body out of the reply.
    pub fn into_body(self) -> Option<Value> {
        self.body
    }

    /// Whether the handler declared the reply as creating state.
    pub fn is_created(&self) -> bool {
        self.created
    }
}

/// Conversion of handler outputs into a [`Reply`].
///
/// # Default Implementations
///
/// - `()` → empty reply
/// - `Reply` → as is
/// - `serde_json::Value` → body
/// - `String` / `&'static str` → JSON string body
/// - `Option<T>` → `None` is an empty reply
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be turned into a `Reply`",
    label = "missing `IntoReply` implementation",
    note = "Return `Reply`, `serde_json::Value`, `()` or implement `IntoReply`."
)]
pub trait IntoReply {
    /// Perform the conversion.
    fn into_reply(self) -> Reply;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Reply {
        self
    }
}

impl IntoReply for () {
    fn into_reply(self) -> Reply {
        Reply::none()
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> Reply {
        Reply::ok(self)
    }
}

impl IntoReply for String {
    fn into_reply(self) -> Reply {
        Reply::ok(Value::String(self))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Reply {
        Reply::ok(Value::String(self.to_owned()))
    }
}

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Reply {
        match self {
            Some(t) => t.into_reply(),
            None => Reply::none(),
        }
    }
}

/// A request handler, built for one request and consumed by invocation.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a request handler",
    label = "missing `Handler` implementation",
    note = "Handlers must implement `invoke`, consuming `self`."
)]
pub trait Handler: Send + 'static {
    /// What a successful invocation produces.
    type Output: IntoReply;

    /// Run the handler.
    fn invoke(self) -> impl Future<Output = Result<Self::Output, RestError>> + Send;
}

/// Boxed future returned by [`DynHandler::invoke_dyn`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Reply, RestError>> + Send>>;

/// Object-safe version of [`Handler`].
pub trait DynHandler: Send + 'static {
    /// Run the handler (dynamic dispatch version).
    fn invoke_dyn(self: Box<Self>) -> HandlerFuture;
}

impl<T: Handler> DynHandler for T {
    fn invoke_dyn(self: Box<Self>) -> HandlerFuture {
        Box::pin(async move { (*self).invoke().await.map(IntoReply::into_reply) })
    }
}

/// A type-erased handler.
pub type BoxHandler = Box<dyn DynHandler>;
