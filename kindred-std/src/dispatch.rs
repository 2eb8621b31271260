//! # Dispatcher
//!
//! Ties resolution, construction and invocation together:
//!
//! 1. resolve the path against the [`RouteTable`]
//! 2. pick the factory, from the route or from the extension registry
//! 3. build the handler from the chain and a [`RequestContext`]
//! 4. invoke it and map the outcome to a [`Response`]
//!
//! Nothing the dispatcher owns is locked while a handler runs, and dropping
//! the dispatch future drops the handler with it.

use crate::{
    guard,
    registry::ExtensionRegistry,
    routing::{Resolution, RouteTable, Target},
};
use kindred_core::{Reply, Request, RequestContext, Response, RestError, SharedFactory, Verb};
use serde_json::Value;
use std::{error::Error as _, sync::Arc};
use tracing::Instrument;

/// Serves requests from a frozen route table and an extension registry.
///
/// Cheap to clone; clones share both tables.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
    extensions: Arc<ExtensionRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher.
    pub fn new(table: Arc<RouteTable>, extensions: Arc<ExtensionRegistry>) -> Self {
        Self { table, extensions }
    }

    /// The route table.
    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// The extension registry.
    pub fn extensions(&self) -> &Arc<ExtensionRegistry> {
        &self.extensions
    }

    /// Resolve without dispatching.
    pub fn resolve(&self, request: &Request) -> Result<Resolution, RestError> {
        self.table.resolve(request.verb, &request.segments)
    }

    /// Serve a request. Never fails: every error becomes an error response.
    pub async fn dispatch(&self, request: Request) -> Response {
        let verb = request.verb;
        let span = tracing::info_span!("dispatch", %verb, path = %request.path());

        async move {
            let result = self.try_dispatch(request).await;
            if let Err(err) = &result {
                if err.status() >= 500 {
                    tracing::warn!(error = %err, source = ?err.source(), "request failed");
                } else {
                    tracing::debug!(error = %err, status = err.status(), "request rejected");
                }
            }
            Response::from_result(verb, result)
        }
        .instrument(span)
        .await
    }

    /// Parse `target` and serve it. Malformed targets become `400` responses.
    pub async fn dispatch_target(&self, verb: Verb, target: &str, body: Option<Value>) -> Response {
        match Request::parse(verb, target) {
            Ok(request) => {
                let request = match body {
                    Some(body) => request.with_body(body),
                    None => request,
                };
                self.dispatch(request).await
            }
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    request_target = target,
                    "unparseable request target"
                );
                Response::from_error(&err)
            }
        }
    }

    /// Serve a request and return the untranslated outcome.
    pub async fn try_dispatch(&self, request: Request) -> Result<Reply, RestError> {
        let resolution = self.resolve(&request)?;
        let factory = self.factory_for(&resolution, &request)?;

        let Resolution {
            chain,
            action,
            remainder,
            ..
        } = resolution;
        let ctx = RequestContext::from_request(request, action, remainder);

        let handler = guard::build(&*factory, &chain, ctx)?;
        guard::run(handler).await
    }

    fn factory_for(
        &self,
        resolution: &Resolution,
        request: &Request,
    ) -> Result<SharedFactory, RestError> {
        match &resolution.target {
            Target::Route(route) => Ok(route.factory().clone()),
            Target::Extension { kind, name } => {
                if !self.extensions.config().expose_views {
                    return Err(RestError::NoSuchRoute(request.path()));
                }
                self.extensions
                    .get(*kind, name)
                    .ok_or_else(|| RestError::NoSuchRoute(request.path()))
            }
        }
    }
}
