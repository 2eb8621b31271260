//! # kindred-core
//!
//! Core contracts for the kindred resource routing framework.
//!
//! This crate has minimal dependencies and is what handler and plugin crates
//! import. The route table, extension registry and dispatcher live in
//! `kindred-std`.
//!
//! # Request Lifecycle
//!
//! ## 1. Kinds ([`ResourceKind`], [`KindForest`])
//!
//! Named classes of addressable resources, arranged as a forest. A path such
//! as `/changes/42/revisions/3` walks from a root kind down to a child kind.
//!
//! ## 2. Requests ([`Request`], [`Verb`])
//!
//! The transport decodes a request into a verb, path segments, query and an
//! optional JSON body.
//!
//! ## 3. Construction ([`HandlerFactory`], [`RequestContext`], [`ResourceChain`])
//!
//! Resolution yields the chain of `(kind, id)` pairs named by the path. A
//! factory turns the chain plus the request context into a handler.
//!
//! ## 4. Execution ([`Handler`], [`Reply`], [`Response`])
//!
//! The handler runs once; its [`Reply`] or [`RestError`] becomes a
//! [`Response`] with the status chosen by the verb and the error taxonomy.
//!
//! # Error Types
//!
//! - [`RegistrationError`] - inconsistent tables, raised at startup
//! - [`RestError`] - request failures, each mapped to one status code

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod chain;
mod context;
mod error;
mod factory;
mod handler;
mod kind;
mod qualified;
mod request;
mod response;

// Re-exports
pub use chain::{ResourceChain, ResourceRef};
pub use context::{FromContext, Json, Remainder, RequestContext};
pub use error::{BoxError, RegistrationError, RestError};
pub use factory::{FactoryFn, HandlerFactory, SharedFactory, factory_fn};
pub use handler::{BoxHandler, DynHandler, Handler, HandlerFuture, IntoReply, Reply};
pub use kind::{KindForest, Lineage, ResourceKind};
pub use qualified::QualifiedName;
pub use request::{Query, Request, Verb};
pub use response::{ErrorBody, Response};
