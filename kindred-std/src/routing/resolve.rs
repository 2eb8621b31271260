//! Path resolution over a frozen [`RouteTable`].

use super::table::{Route, RouteTable, VerbSlots};
use kindred_core::{QualifiedName, ResourceChain, ResourceKind, RestError, Verb};
use std::sync::Arc;

/// What a resolved path points at.
#[derive(Debug, Clone)]
pub enum Target {
    /// An exclusive route from the table.
    Route(Arc<Route>),
    /// A qualified extension view, looked up in the extension registry.
    Extension {
        /// Kind the view hangs off.
        kind: ResourceKind,
        /// `registrant~name` taken from the path.
        name: QualifiedName,
    },
}

/// The outcome of resolving a request path.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Where the request goes.
    pub target: Target,
    /// `(kind, id)` pairs from the mount down to the leaf.
    pub chain: ResourceChain,
    /// The matched action segment; empty for default and collection routes.
    pub action: String,
    /// Segments left after the action.
    pub remainder: Vec<String>,
}

impl Resolution {
    /// The route, when the target is one.
    pub fn route(&self) -> Option<&Arc<Route>> {
        match &self.target {
            Target::Route(route) => Some(route),
            Target::Extension { .. } => None,
        }
    }
}

impl RouteTable {
    /// Resolve `segments` for `verb`.
    ///
    /// Walks mount, identifier, child edge, identifier, ... and stops at the
    /// first named action or extension view. Only reads the table.
    pub fn resolve<S: AsRef<str>>(
        &self,
        verb: Verb,
        segments: &[S],
    ) -> Result<Resolution, RestError> {
        let path = || {
            let parts: Vec<&str> = segments.iter().map(S::as_ref).collect();
            format!("/{}", parts.join("/"))
        };

        let mut rest = segments.iter().map(S::as_ref);
        let mut kind = rest
            .next()
            .and_then(|segment| self.mounted(segment))
            .ok_or_else(|| RestError::NoSuchRoute(path()))?;
        let mut chain = ResourceChain::new();

        loop {
            let routes = self.kinds.get(&kind);

            // Collection of `kind`.
            let Some(id) = rest.next() else {
                let route = pick(routes.map(|r| &r.collection), verb, &path)?;
                return Ok(Resolution {
                    target: Target::Route(route),
                    chain,
                    action: String::new(),
                    remainder: Vec::new(),
                });
            };
            chain.push(kind, id);

            // Member of `kind`.
            let Some(segment) = rest.next() else {
                let route = pick(routes.and_then(|r| r.actions.get("")), verb, &path)?;
                return Ok(Resolution {
                    target: Target::Route(route),
                    chain,
                    action: String::new(),
                    remainder: Vec::new(),
                });
            };

            if let Some(child) = routes.and_then(|r| r.children.get(segment)) {
                kind = *child;
                continue;
            }

            let remainder: Vec<String> = rest.by_ref().map(str::to_owned).collect();

            if let Some(slots) = routes.and_then(|r| r.actions.get(segment)) {
                if !remainder.is_empty() {
                    match slots.get(verb) {
                        Some(route) if !route.meta().accepts_remainder() => {
                            return Err(RestError::NoSuchRoute(path()));
                        }
                        None if !slots.any_accepts_remainder() => {
                            return Err(RestError::NoSuchRoute(path()));
                        }
                        _ => {}
                    }
                }
                let route = pick(Some(slots), verb, &path)?;
                return Ok(Resolution {
                    target: Target::Route(route),
                    chain,
                    action: segment.to_owned(),
                    remainder,
                });
            }

            if let Some(name) = QualifiedName::parse(segment) {
                return Ok(Resolution {
                    target: Target::Extension { kind, name },
                    chain,
                    action: segment.to_owned(),
                    remainder,
                });
            }

            return Err(RestError::NoSuchRoute(path()));
        }
    }
}

/// The route for `verb` at an endpoint, or the error the endpoint deserves.
fn pick(
    slots: Option<&VerbSlots>,
    verb: Verb,
    path: &impl Fn() -> String,
) -> Result<Arc<Route>, RestError> {
    let Some(slots) = slots else {
        return Err(RestError::NoSuchRoute(path()));
    };
    if let Some(route) = slots.get(verb) {
        return Ok(route.clone());
    }
    if slots.is_empty() {
        Err(RestError::NoSuchRoute(path()))
    } else {
        Err(RestError::MethodNotAllowed { verb, path: path() })
    }
}
