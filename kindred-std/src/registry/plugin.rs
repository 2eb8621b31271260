//! Link-time extension registration via `inventory`.
//!
//! A plugin crate submits records at compile time:
//!
//! ```rust,ignore
//! inventory::submit! {
//!     PluginExtension {
//!         kind: "change",
//!         registrant: "reviewnotes",
//!         name: "stats",
//!         factory: || Arc::new(StatsFactory),
//!     }
//! }
//! ```
//!
//! The host calls [`ExtensionRegistry::collect_plugins`] once its kinds are
//! declared and before sealing.

use super::ExtensionRegistry;
use kindred_core::{QualifiedName, RegistrationError, SharedFactory};

/// An extension contributed by a linked crate.
pub struct PluginExtension {
    /// Name of the kind the extension attaches to.
    pub kind: &'static str,
    /// Who contributes it.
    pub registrant: &'static str,
    /// Short extension name.
    pub name: &'static str,
    /// Builds the factory.
    pub factory: fn() -> SharedFactory,
}

inventory::collect!(PluginExtension);

impl ExtensionRegistry {
    /// Register every submitted [`PluginExtension`].
    ///
    /// Link order is unspecified, so records are registered sorted by
    /// registrant, kind and name. Returns how many were registered. Fails on
    /// the first record naming an undeclared kind or clashing with an existing
    /// extension.
    pub fn collect_plugins(&self) -> Result<usize, RegistrationError> {
        let mut records: Vec<&PluginExtension> =
            inventory::iter::<PluginExtension>.into_iter().collect();
        records.sort_by_key(|r| (r.registrant, r.kind, r.name));

        for record in &records {
            let kind = self
                .forest
                .by_name(record.kind)
                .ok_or_else(|| RegistrationError::UnknownKind(record.kind.to_owned()))?;
            self.register_shared(
                kind,
                QualifiedName::new(record.registrant, record.name),
                (record.factory)(),
            )?;
        }

        tracing::debug!(count = records.len(), "plugin extensions collected");
        Ok(records.len())
    }
}
