//! Route table construction.
//!
//! Routes are registered on a [`RouteTableBuilder`] during startup, then
//! frozen into a [`RouteTable`] that can be shared across threads and is
//! never modified again.
//!
//! # Example
//! ```ignore
//! let mut builder = RouteTable::builder();
//! let change = builder.declare_kind("change", None)?;
//! let revision = builder.declare_kind("revision", Some(change))?;
//!
//! builder.mount("changes", change)?;
//! builder.bind(change, Verb::Get, "", GetChange::factory())?;
//! builder.child(change, "revisions", revision)?;
//! builder.bind(revision, Verb::Get, "commit", GetCommit::factory())?;
//!
//! let table = builder.build();
//! ```

use kindred_core::{
    HandlerFactory, KindForest, RegistrationError, ResourceKind, SharedFactory, Verb,
};
use std::{collections::HashMap, fmt, sync::Arc};

/// Options attached to a route at bind time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    accepts_remainder: bool,
    alias_of: Option<(Verb, String)>,
}

impl RouteMeta {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the action swallow every remaining path segment.
    ///
    /// The segments reach the factory as `RequestContext::remainder`.
    pub fn with_remainder(mut self) -> Self {
        self.accepts_remainder = true;
        self
    }

    /// Whether the action swallows trailing segments.
    pub fn accepts_remainder(&self) -> bool {
        self.accepts_remainder
    }

    /// The (verb, action) this route aliases, if it is an alias.
    pub fn alias_of(&self) -> Option<(Verb, &str)> {
        self.alias_of
            .as_ref()
            .map(|(verb, action)| (*verb, action.as_str()))
    }
}

/// An exclusive binding of (kind, verb, action) to a factory.
pub struct Route {
    kind: ResourceKind,
    verb: Verb,
    action: String,
    factory: SharedFactory,
    meta: RouteMeta,
}

impl Route {
    /// The kind the route hangs off.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The verb it answers.
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The action segment; empty for default and collection routes.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The factory building its handlers.
    pub fn factory(&self) -> &SharedFactory {
        &self.factory
    }

    /// Bind-time options.
    pub fn meta(&self) -> &RouteMeta {
        &self.meta
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("kind", &self.kind)
            .field("verb", &self.verb)
            .field("action", &self.action)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// One route per verb.
#[derive(Debug, Clone, Default)]
pub(crate) struct VerbSlots([Option<Arc<Route>>; 4]);

impl VerbSlots {
    pub(crate) fn get(&self, verb: Verb) -> Option<&Arc<Route>> {
        self.0[verb.slot()].as_ref()
    }

    fn set(&mut self, route: Route) -> Option<Arc<Route>> {
        self.0[route.verb.slot()].replace(Arc::new(route))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    pub(crate) fn any_accepts_remainder(&self) -> bool {
        self.routes().any(|route| route.meta.accepts_remainder)
    }

    pub(crate) fn routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.0.iter().flatten()
    }
}

/// Everything bound on one kind.
#[derive(Debug, Clone, Default)]
pub(crate) struct KindRoutes {
    /// Named actions; the empty name is the default action.
    pub(crate) actions: HashMap<String, VerbSlots>,
    /// Child collection edges.
    pub(crate) children: HashMap<String, ResourceKind>,
    /// Routes on the kind's collection path.
    pub(crate) collection: VerbSlots,
}

// ============================================================================
// RouteTableBuilder - registration phase
// ============================================================================

/// Builder for a [`RouteTable`].
///
/// Every method validates eagerly: an inconsistent binding is reported at
/// the call that introduces it.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    forest: KindForest,
    mounts: HashMap<String, ResourceKind>,
    kinds: HashMap<ResourceKind, KindRoutes>,
}

impl RouteTableBuilder {
    /// Create an empty builder with an empty kind forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from kinds declared elsewhere.
    pub fn with_forest(forest: KindForest) -> Self {
        Self {
            forest,
            ..Self::default()
        }
    }

    /// Declare a resource kind. See [`KindForest::declare_kind`].
    pub fn declare_kind(
        &mut self,
        name: impl Into<String>,
        parent: Option<ResourceKind>,
    ) -> Result<ResourceKind, RegistrationError> {
        self.forest.declare_kind(name, parent)
    }

    /// The kinds declared so far.
    pub fn forest(&self) -> &KindForest {
        &self.forest
    }

    /// Expose a root kind's collection at a top-level path segment.
    pub fn mount(
        &mut self,
        segment: impl Into<String>,
        kind: ResourceKind,
    ) -> Result<(), RegistrationError> {
        self.forest.check(kind)?;
        if !self.forest.is_root(kind) {
            return Err(RegistrationError::NotRootKind(
                self.forest.name(kind).to_owned(),
            ));
        }

        let segment = segment.into();
        match self.mounts.get(&segment) {
            Some(&existing) if existing == kind => Ok(()),
            Some(&existing) => Err(RegistrationError::ConflictingBinding {
                kind: self.forest.name(existing).to_owned(),
                action: segment,
                reason: "already mounted",
            }),
            None => {
                self.mounts.insert(segment, kind);
                Ok(())
            }
        }
    }

    /// Bind `factory` to (kind, verb, action). An empty action is the
    /// resource's default action.
    ///
    /// Binding the same triple again replaces the earlier route.
    pub fn bind<F: HandlerFactory>(
        &mut self,
        kind: ResourceKind,
        verb: Verb,
        action: &str,
        factory: F,
    ) -> Result<(), RegistrationError> {
        self.bind_shared(kind, verb, action, Arc::new(factory), RouteMeta::new())
    }

    /// [`bind`](Self::bind) with explicit route options.
    pub fn bind_with_meta<F: HandlerFactory>(
        &mut self,
        kind: ResourceKind,
        verb: Verb,
        action: &str,
        factory: F,
        meta: RouteMeta,
    ) -> Result<(), RegistrationError> {
        self.bind_shared(kind, verb, action, Arc::new(factory), meta)
    }

    /// Bind an already shared factory.
    pub fn bind_shared(
        &mut self,
        kind: ResourceKind,
        verb: Verb,
        action: &str,
        factory: SharedFactory,
        meta: RouteMeta,
    ) -> Result<(), RegistrationError> {
        self.forest.check(kind)?;
        if !action.is_empty() && self.has_child(kind, action) {
            return Err(self.conflict(kind, action, "child collection"));
        }

        let is_alias = meta.alias_of.is_some();
        let route = Route {
            kind,
            verb,
            action: action.to_owned(),
            factory: factory.clone(),
            meta,
        };
        let routes = self.kinds.entry(kind).or_default();
        let replaced = routes
            .actions
            .entry(action.to_owned())
            .or_default()
            .set(route);

        if replaced.is_some() {
            if !is_alias {
                repoint_aliases(routes, verb, action, &factory);
            }
            tracing::debug!(
                kind = self.forest.name(kind),
                %verb,
                action,
                "route overridden"
            );
        }
        Ok(())
    }

    /// Bind `factory` to `verb` on the collection path of `kind`, e.g. listing
    /// or creating reviewers at `/changes/{id}/reviewers`.
    pub fn bind_collection<F: HandlerFactory>(
        &mut self,
        kind: ResourceKind,
        verb: Verb,
        factory: F,
    ) -> Result<(), RegistrationError> {
        self.forest.check(kind)?;
        let route = Route {
            kind,
            verb,
            action: String::new(),
            factory: Arc::new(factory),
            meta: RouteMeta::new(),
        };
        if self.kinds.entry(kind).or_default().collection.set(route).is_some() {
            tracing::debug!(kind = self.forest.name(kind), %verb, "collection route overridden");
        }
        Ok(())
    }

    /// Continue resolution under `child` when `action` follows a `kind`
    /// identifier.
    ///
    /// `child` must descend from `kind`. The action name must not also be
    /// bound as an action on `kind`.
    pub fn child(
        &mut self,
        kind: ResourceKind,
        action: &str,
        child: ResourceKind,
    ) -> Result<(), RegistrationError> {
        self.forest.check(kind)?;
        self.forest.check(child)?;
        if action.is_empty() {
            return Err(self.conflict(kind, action, "default action"));
        }
        if !self.forest.is_descendant_of(child, kind) {
            return Err(RegistrationError::InconsistentChild {
                parent: self.forest.name(kind).to_owned(),
                child: self.forest.name(child).to_owned(),
            });
        }

        if self
            .kinds
            .get(&kind)
            .is_some_and(|routes| routes.actions.contains_key(action))
        {
            return Err(self.conflict(kind, action, "action"));
        }
        match self.kinds.get(&kind).and_then(|routes| routes.children.get(action)) {
            Some(&existing) if existing == child => Ok(()),
            Some(_) => Err(self.conflict(kind, action, "another child collection")),
            None => {
                self.kinds
                    .entry(kind)
                    .or_default()
                    .children
                    .insert(action.to_owned(), child);
                Ok(())
            }
        }
    }

    /// Serve (kind, verb, action) with the factory of (kind, target_verb,
    /// target_action).
    ///
    /// Both routes share one factory and the alias records its target, so
    /// introspection shows them as the same endpoint. The target must be
    /// bound first.
    pub fn alias(
        &mut self,
        kind: ResourceKind,
        verb: Verb,
        action: &str,
        target_verb: Verb,
        target_action: &str,
    ) -> Result<(), RegistrationError> {
        self.forest.check(kind)?;
        let target = self
            .kinds
            .get(&kind)
            .and_then(|routes| routes.actions.get(target_action))
            .and_then(|slots| slots.get(target_verb))
            .cloned()
            .ok_or_else(|| RegistrationError::UnknownRoute {
                kind: self.forest.name(kind).to_owned(),
                verb: target_verb,
                action: target_action.to_owned(),
            })?;

        let meta = RouteMeta {
            accepts_remainder: target.meta.accepts_remainder,
            alias_of: Some((target_verb, target_action.to_owned())),
        };
        self.bind_shared(kind, verb, action, target.factory.clone(), meta)
    }

    /// Freeze the table.
    pub fn build(self) -> RouteTable {
        tracing::debug!(
            kinds = self.forest.len(),
            mounts = self.mounts.len(),
            "route table built"
        );
        RouteTable {
            forest: Arc::new(self.forest),
            mounts: self.mounts,
            kinds: self.kinds,
        }
    }

    fn has_child(&self, kind: ResourceKind, action: &str) -> bool {
        self.kinds
            .get(&kind)
            .is_some_and(|routes| routes.children.contains_key(action))
    }

    fn conflict(
        &self,
        kind: ResourceKind,
        action: &str,
        reason: &'static str,
    ) -> RegistrationError {
        RegistrationError::ConflictingBinding {
            kind: self.forest.name(kind).to_owned(),
            action: action.to_owned(),
            reason,
        }
    }
}

/// Point every alias of (verb, action) at the factory that now serves it.
fn repoint_aliases(routes: &mut KindRoutes, verb: Verb, action: &str, factory: &SharedFactory) {
    for slots in routes.actions.values_mut() {
        for slot in slots.0.iter_mut() {
            let Some(alias) = slot else { continue };
            if alias.meta.alias_of() != Some((verb, action)) {
                continue;
            }
            let rebound = Route {
                kind: alias.kind,
                verb: alias.verb,
                action: alias.action.clone(),
                factory: factory.clone(),
                meta: alias.meta.clone(),
            };
            *slot = Some(Arc::new(rebound));
        }
    }
}

// ============================================================================
// RouteTable - immutable, thread-safe
// ============================================================================

/// An immutable table of routes over a kind forest.
///
/// Created by [`RouteTableBuilder::build`]. All lookups take `&self`, so one
/// table can serve any number of concurrent requests without locking.
#[derive(Debug)]
pub struct RouteTable {
    pub(crate) forest: Arc<KindForest>,
    pub(crate) mounts: HashMap<String, ResourceKind>,
    pub(crate) kinds: HashMap<ResourceKind, KindRoutes>,
}

impl RouteTable {
    /// Start a new builder.
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    /// The kind forest the table routes over.
    pub fn forest(&self) -> &Arc<KindForest> {
        &self.forest
    }

    /// The route bound to (kind, verb, action).
    pub fn route(&self, kind: ResourceKind, verb: Verb, action: &str) -> Option<&Arc<Route>> {
        self.kinds.get(&kind)?.actions.get(action)?.get(verb)
    }

    /// The route bound to `verb` on the collection path of `kind`.
    pub fn collection_route(&self, kind: ResourceKind, verb: Verb) -> Option<&Arc<Route>> {
        self.kinds.get(&kind)?.collection.get(verb)
    }

    /// The child kind reached through `action` on `kind`.
    pub fn child_of(&self, kind: ResourceKind, action: &str) -> Option<ResourceKind> {
        self.kinds.get(&kind)?.children.get(action).copied()
    }

    /// The root kind mounted at `segment`.
    pub fn mounted(&self, segment: &str) -> Option<ResourceKind> {
        self.mounts.get(segment).copied()
    }

    /// Every route, in no particular order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.kinds.values().flat_map(|routes| {
            routes
                .actions
                .values()
                .flat_map(VerbSlots::routes)
                .chain(routes.collection.routes())
        })
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes().count()
    }

    /// Whether no route is bound.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
