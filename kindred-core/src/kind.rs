//! # Resource Kinds
//!
//! A resource kind names a class of addressable entity (a change, a revision,
//! a reviewer of a revision). Kinds form a forest: a kind may be declared as
//! the child of an already declared kind, which is how nested collections
//! such as `/changes/{id}/revisions/{rev}` are modelled.
//!
//! The forest is write-once. Kinds are declared during startup and never
//! removed, so a [`ResourceKind`] handle stays valid for the life of the
//! forest that issued it.

use crate::error::RegistrationError;
use std::{
    collections::HashMap,
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

static NEXT_FOREST: AtomicU32 = AtomicU32::new(0);

/// A handle to a kind declared in a [`KindForest`].
///
/// Handles are cheap to copy and compare. Names and parent links live in the
/// forest. A handle remembers which forest issued it, so another forest
/// rejects it even when the positions line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKind {
    forest: u32,
    index: u32,
}

impl ResourceKind {
    /// Position of the kind in declaration order.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kind#{}.{}", self.forest, self.index)
    }
}

#[derive(Debug, Clone)]
struct KindDef {
    name: String,
    parent: Option<ResourceKind>,
}

/// The set of declared resource kinds and their parent links.
#[derive(Debug)]
pub struct KindForest {
    id: u32,
    defs: Vec<KindDef>,
    by_name: HashMap<String, ResourceKind>,
}

impl Default for KindForest {
    fn default() -> Self {
        Self::new()
    }
}

impl KindForest {
    /// Create an empty forest with an identity of its own.
    pub fn new() -> Self {
        Self {
            id: NEXT_FOREST.fetch_add(1, Ordering::Relaxed),
            defs: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Declare a new kind, optionally as the child of `parent`.
    ///
    /// Fails if the name is taken or the parent was not issued by this forest.
    /// Parents always exist before their children, so the relation can never
    /// contain a cycle.
    pub fn declare_kind(
        &mut self,
        name: impl Into<String>,
        parent: Option<ResourceKind>,
    ) -> Result<ResourceKind, RegistrationError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(RegistrationError::DuplicateKind(name));
        }
        if let Some(parent) = parent {
            self.check(parent)?;
        }

        let kind = self.handle(self.defs.len());
        self.defs.push(KindDef {
            name: name.clone(),
            parent,
        });
        self.by_name.insert(name, kind);
        Ok(kind)
    }

    /// Fail with `UnknownKind` unless `kind` belongs to this forest.
    pub fn check(&self, kind: ResourceKind) -> Result<(), RegistrationError> {
        if self.contains(kind) {
            Ok(())
        } else {
            Err(RegistrationError::UnknownKind(kind.to_string()))
        }
    }

    /// Whether `kind` was issued by this forest.
    pub fn contains(&self, kind: ResourceKind) -> bool {
        kind.forest == self.id && kind.index() < self.defs.len()
    }

    /// The name of a kind, or `"?"` for a foreign handle.
    pub fn name(&self, kind: ResourceKind) -> &str {
        self.def(kind).map(|def| def.name.as_str()).unwrap_or("?")
    }

    /// The parent of a kind, if it has one.
    pub fn parent(&self, kind: ResourceKind) -> Option<ResourceKind> {
        self.def(kind).and_then(|def| def.parent)
    }

    /// Whether the kind has no parent.
    pub fn is_root(&self, kind: ResourceKind) -> bool {
        self.contains(kind) && self.parent(kind).is_none()
    }

    /// Look a kind up by name.
    pub fn by_name(&self, name: &str) -> Option<ResourceKind> {
        self.by_name.get(name).copied()
    }

    /// Walk from `kind` up to its root: the kind itself, its parent, and so on.
    pub fn lineage(&self, kind: ResourceKind) -> Lineage<'_> {
        Lineage {
            forest: self,
            next: self.contains(kind).then_some(kind),
        }
    }

    /// Whether `kind` is a strict descendant of `ancestor`.
    pub fn is_descendant_of(&self, kind: ResourceKind, ancestor: ResourceKind) -> bool {
        self.lineage(kind).skip(1).any(|k| k == ancestor)
    }

    /// Number of declared kinds.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether no kind has been declared.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate over every kind in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        (0..self.defs.len()).map(|index| self.handle(index))
    }

    fn handle(&self, index: usize) -> ResourceKind {
        ResourceKind {
            forest: self.id,
            index: index as u32,
        }
    }

    fn def(&self, kind: ResourceKind) -> Option<&KindDef> {
        if kind.forest != self.id {
            return None;
        }
        self.defs.get(kind.index())
    }
}

/// Iterator returned by [`KindForest::lineage`].
pub struct Lineage<'a> {
    forest: &'a KindForest,
    next: Option<ResourceKind>,
}

impl Iterator for Lineage<'_> {
    type Item = ResourceKind;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.forest.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let mut forest = KindForest::new();
        let change = forest.declare_kind("change", None).unwrap();
        let revision = forest.declare_kind("revision", Some(change)).unwrap();

        assert_eq!(forest.name(change), "change");
        assert_eq!(forest.parent(revision), Some(change));
        assert_eq!(forest.by_name("revision"), Some(revision));
        assert!(forest.is_root(change));
        assert!(!forest.is_root(revision));
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut forest = KindForest::new();
        forest.declare_kind("change", None).unwrap();
        let err = forest.declare_kind("change", None).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateKind("change".into()));
        // Same name under a different parent is still a duplicate.
        let account = forest.declare_kind("account", None).unwrap();
        assert!(forest.declare_kind("change", Some(account)).is_err());
    }

    #[test]
    fn test_foreign_parent_rejected() {
        let mut other = KindForest::new();
        let foreign = other.declare_kind("account", None).unwrap();

        // Same position as `foreign`, different forest.
        let mut forest = KindForest::new();
        let change = forest.declare_kind("change", None).unwrap();
        assert_eq!(change.index(), foreign.index());
        assert_ne!(change, foreign);

        let result = forest.declare_kind("child", Some(foreign));
        assert!(matches!(result, Err(RegistrationError::UnknownKind(_))));
        assert!(!forest.contains(foreign));
        assert_eq!(forest.name(foreign), "?");
        assert_eq!(forest.parent(foreign), None);
        assert!(!forest.is_root(foreign));
        assert_eq!(forest.len(), 1);
    }

    #[test]
    fn test_descendant_walk() {
        let mut forest = KindForest::new();
        let change = forest.declare_kind("change", None).unwrap();
        let revision = forest.declare_kind("revision", Some(change)).unwrap();
        let file = forest.declare_kind("file", Some(revision)).unwrap();
        let account = forest.declare_kind("account", None).unwrap();

        assert!(forest.is_descendant_of(file, change));
        assert!(forest.is_descendant_of(file, revision));
        assert!(!forest.is_descendant_of(change, file));
        assert!(!forest.is_descendant_of(change, change));
        assert!(!forest.is_descendant_of(file, account));

        let lineage: Vec<_> = forest.lineage(file).collect();
        assert_eq!(lineage, vec![file, revision, change]);
    }
}
