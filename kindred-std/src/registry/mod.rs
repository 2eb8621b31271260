//! # Extension Registry
//!
//! The collaborative half of the framework. Any number of registrants may
//! attach named factories to a kind; each slot keeps registration order.
//!
//! Readers load an immutable snapshot and never block. Writers clone the
//! snapshot, change the copy and publish it with compare-and-swap, retrying
//! when another writer got there first.
//!
//! # Lifecycle
//!
//! 1. Static registration during startup.
//! 2. [`ExtensionRegistry::seal`].
//! 3. Serving. Late registrations are refused unless
//!    [`ExtensionConfig::accept_late_registration`] is set.

mod invoke;
#[cfg(feature = "inventory")]
mod plugin;

pub use invoke::Contribution;
#[cfg(feature = "inventory")]
pub use plugin::PluginExtension;

use crate::{config::ExtensionConfig, routing::RouteTable};
use arc_swap::ArcSwap;
use kindred_core::{
    HandlerFactory, KindForest, QualifiedName, RegistrationError, ResourceKind, SharedFactory,
};
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// A named factory in an extension slot.
#[derive(Clone)]
pub struct ExtensionEntry {
    name: QualifiedName,
    factory: SharedFactory,
}

impl ExtensionEntry {
    /// `registrant~name`.
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// The factory.
    pub fn factory(&self) -> &SharedFactory {
        &self.factory
    }
}

impl fmt::Debug for ExtensionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Default)]
struct Snapshot {
    slots: HashMap<ResourceKind, Arc<Vec<ExtensionEntry>>>,
}

/// The extensions of one kind, pinned to the snapshot current when
/// [`ExtensionRegistry::list_for`] was called.
///
/// Iterating twice yields the same sequence even if registrations happen in
/// between.
#[derive(Debug, Clone, Default)]
pub struct Extensions {
    entries: Arc<Vec<ExtensionEntry>>,
}

impl Extensions {
    /// Entries in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ExtensionEntry> {
        self.entries.iter()
    }

    /// Qualified names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &QualifiedName> {
        self.entries.iter().map(ExtensionEntry::name)
    }

    /// The entry registered as `name`.
    pub fn get(&self, name: &QualifiedName) -> Option<&ExtensionEntry> {
        self.entries.iter().find(|entry| &entry.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the slot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Extensions {
    type Item = &'a ExtensionEntry;
    type IntoIter = std::slice::Iter<'a, ExtensionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Per-kind ordered extension slots.
pub struct ExtensionRegistry {
    snap: ArcSwap<Snapshot>,
    forest: Arc<KindForest>,
    config: ExtensionConfig,
    sealed: AtomicBool,
}

impl ExtensionRegistry {
    /// An empty registry over `forest`.
    pub fn new(forest: Arc<KindForest>, config: ExtensionConfig) -> Self {
        Self {
            snap: ArcSwap::from_pointee(Snapshot::default()),
            forest,
            config,
            sealed: AtomicBool::new(false),
        }
    }

    /// An empty registry over the kinds of `table`.
    pub fn for_table(table: &RouteTable, config: ExtensionConfig) -> Self {
        Self::new(table.forest().clone(), config)
    }

    /// The settings the registry was built with.
    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    /// The kind forest extensions are validated against.
    pub fn forest(&self) -> &Arc<KindForest> {
        &self.forest
    }

    /// Append `factory` to the slot of `kind` under `name`.
    ///
    /// A name already present in the slot fails with `DuplicateExtension`,
    /// or replaces the old factory in place when overrides are allowed.
    pub fn register<F: HandlerFactory>(
        &self,
        kind: ResourceKind,
        name: QualifiedName,
        factory: F,
    ) -> Result<(), RegistrationError> {
        self.register_shared(kind, name, Arc::new(factory))
    }

    /// [`register`](Self::register) with an already shared factory.
    pub fn register_shared(
        &self,
        kind: ResourceKind,
        name: QualifiedName,
        factory: SharedFactory,
    ) -> Result<(), RegistrationError> {
        self.forest.check(kind)?;
        let entry = ExtensionEntry { name, factory };

        loop {
            if self.is_sealed() && !self.config.accept_late_registration {
                return Err(RegistrationError::RegistryFrozen(entry.name.to_string()));
            }

            let cur = self.snap.load_full();
            let mut next = (*cur).clone();
            let slot = Arc::make_mut(next.slots.entry(kind).or_default());

            let replaced = match slot.iter().position(|e| e.name == entry.name) {
                Some(_) if !self.config.allow_overrides => {
                    return Err(RegistrationError::DuplicateExtension {
                        kind: self.forest.name(kind).to_owned(),
                        name: entry.name.to_string(),
                    });
                }
                Some(i) => {
                    slot[i] = entry.clone();
                    true
                }
                None => {
                    slot.push(entry.clone());
                    false
                }
            };

            let prev = self.snap.compare_and_swap(&cur, Arc::new(next));
            if Arc::ptr_eq(&prev, &cur) {
                tracing::debug!(
                    kind = self.forest.name(kind),
                    extension = %entry.name,
                    replaced,
                    late = self.is_sealed(),
                    "extension registered"
                );
                return Ok(());
            }
        }
    }

    /// The extensions of `kind` in registration order.
    pub fn list_for(&self, kind: ResourceKind) -> Extensions {
        let snap = self.snap.load();
        Extensions {
            entries: snap.slots.get(&kind).cloned().unwrap_or_default(),
        }
    }

    /// The factory registered on `kind` as `name`.
    pub fn get(&self, kind: ResourceKind, name: &QualifiedName) -> Option<SharedFactory> {
        let snap = self.snap.load();
        snap.slots
            .get(&kind)?
            .iter()
            .find(|entry| &entry.name == name)
            .map(|entry| entry.factory.clone())
    }

    /// End static registration.
    pub fn seal(&self) {
        if !self.sealed.swap(true, Ordering::AcqRel) {
            tracing::debug!(
                extensions = self.snap.load().slots.values().map(|s| s.len()).sum::<usize>(),
                "extension registry sealed"
            );
        }
    }

    /// Whether [`seal`](Self::seal) has been called.
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snap = self.snap.load();
        let mut slots: Vec<_> = snap
            .slots
            .iter()
            .map(|(kind, entries)| (self.forest.name(*kind), entries.len()))
            .collect();
        slots.sort_unstable();
        f.debug_struct("ExtensionRegistry")
            .field("slots", &slots)
            .field("sealed", &self.is_sealed())
            .finish()
    }
}
