//! # kindred - Resource-Kind Routing for REST APIs
//!
//! `kindred` routes REST requests over a forest of resource kinds
//! (`/changes/{id}/revisions/{rev}/commit`) and lets independent registrants
//! attach extensions to any kind.
//!
//! Two tables with different rules:
//! - the **route table** is exclusive: one factory per (kind, verb, action),
//!   validated at registration and frozen before serving
//! - the **extension registry** is collaborative: ordered, name-qualified
//!   slots that accept many registrants and stay readable while they grow
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kindred::prelude::*;
//!
//! let mut builder = RouteTable::builder();
//! let change = builder.declare_kind("change", None)?;
//! let revision = builder.declare_kind("revision", Some(change))?;
//! builder.mount("changes", change)?;
//! builder.child(change, "revisions", revision)?;
//! builder.bind(revision, Verb::Get, "commit", factory_fn(|chain, _ctx| {
//!     Ok(GetCommit::new(chain))
//! }))?;
//! let table = Arc::new(builder.build());
//!
//! let extensions = Arc::new(ExtensionRegistry::for_table(&table, ExtensionConfig::default()));
//! extensions.seal();
//!
//! let dispatcher = Dispatcher::new(table, extensions);
//! let request = Request::parse(Verb::Get, "/changes/1/revisions/2/commit")?;
//! let response = dispatcher.dispatch(request).await;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use kindred_core::{
    // Errors
    BoxError,
    // Handlers
    BoxHandler,
    DynHandler,
    // Responses
    ErrorBody,
    // Factories
    FactoryFn,
    // Request context
    FromContext,
    Handler,
    HandlerFactory,
    HandlerFuture,
    IntoReply,
    Json,
    // Kinds
    KindForest,
    Lineage,
    QualifiedName,
    Query,
    RegistrationError,
    Remainder,
    Reply,
    Request,
    RequestContext,
    // Resolution output
    ResourceChain,
    ResourceKind,
    ResourceRef,
    Response,
    RestError,
    SharedFactory,
    Verb,
    factory_fn,
};

pub use kindred_std::{
    HandlerPanic,
    config::{ConfigError, EnrichmentMode, ExtensionConfig, KindredConfig, LogConfig, LogFormat},
    dispatch::Dispatcher,
    registry::{Contribution, ExtensionEntry, ExtensionRegistry, Extensions},
    routing::{Resolution, Route, RouteMeta, RouteTable, RouteTableBuilder, Target},
};

#[cfg(feature = "inventory")]
pub use kindred_std::registry::PluginExtension;

/// Logging setup.
pub mod logging {
    pub use kindred_std::logging::init;
}

/// Testing utilities.
pub mod testing {
    pub use kindred_std::testing::{
        CountingFactory, CountingHandler, FailingFactory, FailingHandler, PanickingFactory,
        PanickingHandler, RecordedCall, RecordingFactory, StaticFactory, StaticHandler,
    };
}

/// Prelude module - common imports for kindred.
///
/// # Usage
///
/// ```rust,ignore
/// use kindred::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Dispatch
        Dispatcher,
        // Extensions
        ExtensionConfig,
        ExtensionRegistry,
        // Core traits
        Handler,
        HandlerFactory,
        Json,
        QualifiedName,
        RegistrationError,
        Reply,
        Request,
        RequestContext,
        ResourceChain,
        ResourceKind,
        Response,
        RestError,
        // Routing
        RouteMeta,
        RouteTable,
        Verb,
        factory_fn,
    };
}

#[cfg(feature = "inventory")]
pub use inventory;
