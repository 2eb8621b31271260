//! # Request Context
//!
//! Everything a [`HandlerFactory`](crate::HandlerFactory) gets to know about
//! the request beyond the resolved [`ResourceChain`](crate::ResourceChain).
//!
//! Factories receive the context by value, so request data never has to be
//! read from ambient state.
//!
//! # Extractors
//!
//! [`FromContext`] pulls typed values out of a context:
//!
//! ```rust,ignore
//! #[derive(Deserialize)]
//! struct TopicInput { topic: String }
//!
//! let Json(input) = ctx.extract::<Json<TopicInput>>()?;
//! ```

use crate::{
    error::RestError,
    request::{Query, Request, Verb},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Request-scoped data passed to handler factories.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// Request method.
    pub verb: Verb,
    /// The matched action segment; empty for default and collection routes.
    pub action: String,
    /// Segments left after the action, for routes that accept a remainder.
    pub remainder: Vec<String>,
    /// Query parameters.
    pub query: Query,
    /// Decoded JSON body, if any.
    pub body: Option<Value>,
}

impl RequestContext {
    /// A bare context for `verb` with nothing else attached.
    pub fn new(verb: Verb) -> Self {
        Self {
            verb,
            action: String::new(),
            remainder: Vec::new(),
            query: Query::new(),
            body: None,
        }
    }

    /// Build the context for a resolved request.
    pub fn from_request(
        request: Request,
        action: impl Into<String>,
        remainder: Vec<String>,
    ) -> Self {
        Self {
            verb: request.verb,
            action: action.into(),
            remainder,
            query: request.query,
            body: request.body,
        }
    }

    /// Attach a body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach query parameters.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Decode the body as `T`.
    ///
    /// A missing body is decoded from JSON `null`, so `Option<T>` inputs
    /// accept empty requests.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, RestError> {
        let body = self.body.clone().unwrap_or(Value::Null);
        serde_json::from_value(body)
            .map_err(|e| RestError::BadRequest(format!("invalid body: {e}")))
    }

    /// The remainder joined back into a path, e.g. `src/main.rs`.
    pub fn remainder_path(&self) -> String {
        self.remainder.join("/")
    }

    /// Extract a typed value.
    pub fn extract<T: FromContext>(&self) -> Result<T, RestError> {
        T::from_context(self)
    }
}

/// A value that can be pulled out of a [`RequestContext`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be extracted from a request context",
    label = "missing `FromContext` implementation",
    note = "Implement `FromContext` to use this type with `RequestContext::extract`."
)]
pub trait FromContext: Sized {
    /// Attempt the extraction.
    fn from_context(ctx: &RequestContext) -> Result<Self, RestError>;
}

/// Extracts and decodes the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T: DeserializeOwned> FromContext for Json<T> {
    fn from_context(ctx: &RequestContext) -> Result<Self, RestError> {
        ctx.body_as().map(Json)
    }
}

impl FromContext for Query {
    fn from_context(ctx: &RequestContext) -> Result<Self, RestError> {
        Ok(ctx.query.clone())
    }
}

impl FromContext for Verb {
    fn from_context(ctx: &RequestContext) -> Result<Self, RestError> {
        Ok(ctx.verb)
    }
}

/// Extracts the path remainder; fails when it is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remainder(pub Vec<String>);

impl FromContext for Remainder {
    fn from_context(ctx: &RequestContext) -> Result<Self, RestError> {
        if ctx.remainder.is_empty() {
            return Err(RestError::BadRequest("path remainder required".into()));
        }
        Ok(Remainder(ctx.remainder.clone()))
    }
}

impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &RequestContext) -> Result<Self, RestError> {
        Ok(T::from_context(ctx).ok())
    }
}
