//! Error types for kindred.
//!
//! Two families, split by when they can happen:
//!
//! - [`RegistrationError`] - raised while the route table and extension
//!   registry are being assembled. These abort startup.
//! - [`RestError`] - raised while serving a request. The dispatcher always
//!   converts these into a [`Response`](crate::Response).

use crate::request::Verb;
use thiserror::Error;

/// A boxed error type for opaque failure sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building the routing tables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// A kind with this name was already declared.
    #[error("resource kind `{0}` is already declared")]
    DuplicateKind(String),

    /// A kind handle or kind name does not belong to this forest.
    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    /// Only root kinds can be mounted at the top of the path.
    #[error("resource kind `{0}` has a parent and cannot be mounted")]
    NotRootKind(String),

    /// Two bindings claim the same path segment.
    #[error("conflicting binding for `{action}` on `{kind}`: {reason}")]
    ConflictingBinding {
        /// Name of the kind owning the segment.
        kind: String,
        /// The contested segment.
        action: String,
        /// What the segment is already bound to.
        reason: &'static str,
    },

    /// A child edge points at a kind that is not a descendant of its parent.
    #[error("`{child}` is not a descendant of `{parent}`")]
    InconsistentChild {
        /// The kind the edge hangs off.
        parent: String,
        /// The kind the edge leads to.
        child: String,
    },

    /// An alias refers to a route that has not been bound.
    #[error("no {verb} route for `{action}` on `{kind}` to alias")]
    UnknownRoute {
        /// Kind name.
        kind: String,
        /// Verb of the missing route.
        verb: Verb,
        /// Action of the missing route.
        action: String,
    },

    /// The registrant already contributed an extension under this name.
    #[error("extension `{name}` is already registered on `{kind}`")]
    DuplicateExtension {
        /// Kind name.
        kind: String,
        /// Qualified extension name.
        name: String,
    },

    /// The extension registry was sealed and refuses late additions.
    #[error("extension registry is sealed; `{0}` was registered too late")]
    RegistryFrozen(String),
}

/// Errors raised while serving a request.
///
/// Every variant maps to one HTTP status through [`RestError::status`].
#[derive(Error, Debug)]
pub enum RestError {
    /// The path does not lead to any endpoint.
    #[error("no route for {0}")]
    NoSuchRoute(String),

    /// The endpoint exists but the verb is not bound there.
    #[error("{verb} not allowed on {path}")]
    MethodNotAllowed {
        /// Requested verb.
        verb: Verb,
        /// Requested path.
        path: String,
    },

    /// The addressed resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller may not perform the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The request is malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The operation conflicts with the current state of the resource.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Anything unexpected.
    #[error("internal error")]
    Internal(#[source] BoxError),
}

impl RestError {
    /// Wrap an arbitrary error as an internal failure.
    pub fn internal(err: impl Into<BoxError>) -> Self {
        RestError::Internal(err.into())
    }

    /// The HTTP status code this error maps to.
    pub fn status(&self) -> u16 {
        match self {
            RestError::NoSuchRoute(_) | RestError::NotFound(_) => 404,
            RestError::MethodNotAllowed { .. } => 405,
            RestError::PermissionDenied(_) => 403,
            RestError::BadRequest(_) => 400,
            RestError::Conflict(_) => 409,
            RestError::Internal(_) => 500,
        }
    }

    /// A stable machine-readable code for the error payload.
    pub fn code(&self) -> &'static str {
        match self {
            RestError::NoSuchRoute(_) => "no_such_route",
            RestError::MethodNotAllowed { .. } => "method_not_allowed",
            RestError::NotFound(_) => "not_found",
            RestError::PermissionDenied(_) => "permission_denied",
            RestError::BadRequest(_) => "bad_request",
            RestError::Conflict(_) => "conflict",
            RestError::Internal(_) => "internal",
        }
    }
}

impl From<BoxError> for RestError {
    fn from(err: BoxError) -> Self {
        RestError::Internal(err)
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::BadRequest(err.to_string())
    }
}
