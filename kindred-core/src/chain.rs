//! Resource chains produced by path resolution.

use crate::kind::ResourceKind;

/// One resolved step: a kind and the identifier the path gave for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    /// The kind the segment was resolved as.
    pub kind: ResourceKind,
    /// The raw identifier segment. Kindred never interprets it.
    pub id: String,
}

/// The resources named by a path, from the root down to the leaf.
///
/// For `/changes/42/revisions/3/commit` the chain is
/// `[(change, "42"), (revision, "3")]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceChain {
    links: Vec<ResourceRef>,
}

impl ResourceChain {
    /// An empty chain, as seen by routes on a root collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolved resource.
    pub fn push(&mut self, kind: ResourceKind, id: impl Into<String>) {
        self.links.push(ResourceRef {
            kind,
            id: id.into(),
        });
    }

    /// The deepest resolved resource.
    pub fn leaf(&self) -> Option<&ResourceRef> {
        self.links.last()
    }

    /// Identifier of the nearest resource of `kind`.
    pub fn id_of(&self, kind: ResourceKind) -> Option<&str> {
        self.links
            .iter()
            .rev()
            .find(|link| link.kind == kind)
            .map(|link| link.id.as_str())
    }

    /// The chain without its leaf.
    pub fn parent(&self) -> ResourceChain {
        let mut links = self.links.clone();
        links.pop();
        ResourceChain { links }
    }

    /// Iterate from root to leaf.
    pub fn iter(&self) -> std::slice::Iter<'_, ResourceRef> {
        self.links.iter()
    }

    /// Kinds from root to leaf.
    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.links.iter().map(|link| link.kind)
    }

    /// Number of resolved resources.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Borrow the links as a slice.
    pub fn as_slice(&self) -> &[ResourceRef] {
        &self.links
    }
}

impl<'a> IntoIterator for &'a ResourceChain {
    type Item = &'a ResourceRef;
    type IntoIter = std::slice::Iter<'a, ResourceRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

impl FromIterator<(ResourceKind, String)> for ResourceChain {
    fn from_iter<T: IntoIterator<Item = (ResourceKind, String)>>(iter: T) -> Self {
        Self {
            links: iter
                .into_iter()
                .map(|(kind, id)| ResourceRef { kind, id })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::KindForest;

    #[test]
    fn test_chain_accessors() {
        let mut forest = KindForest::new();
        let change = forest.declare_kind("change", None).unwrap();
        let revision = forest.declare_kind("revision", Some(change)).unwrap();

        let mut chain = ResourceChain::new();
        chain.push(change, "42");
        chain.push(revision, "3");

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.leaf().map(|l| l.id.as_str()), Some("3"));
        assert_eq!(chain.id_of(change), Some("42"));
        assert_eq!(chain.parent().leaf().map(|l| l.kind), Some(change));
        assert_eq!(chain.kinds().collect::<Vec<_>>(), vec![change, revision]);
    }
}
