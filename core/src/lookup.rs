//! Access to the previous pass: committed nodes and compatibility.

use std::collections::HashMap;

use crate::node::{Compatibility, ShadowNode};
use crate::trace::Uid;

/// Finds the node registered for a uid in the previous pass.
pub trait NodeLookup {
    /// The previously registered node for `uid`.
    fn previous(&self, uid: &Uid) -> Option<&ShadowNode>;

    /// Returns `true` if a resource is registered for `uid`.
    fn contains(&self, uid: &Uid) -> bool {
        self.previous(uid).is_some()
    }
}

/// Classifies two same-identity nodes.
pub trait CompatibilityOracle {
    /// Classifies `old` against `new`.
    fn classify(&self, old: &ShadowNode, new: &ShadowNode) -> Compatibility;
}

impl<T: NodeLookup + ?Sized> NodeLookup for Box<T> {
    fn previous(&self, uid: &Uid) -> Option<&ShadowNode> {
        (**self).previous(uid)
    }
}

impl<T: CompatibilityOracle + ?Sized> CompatibilityOracle for Box<T> {
    fn classify(&self, old: &ShadowNode, new: &ShadowNode) -> Compatibility {
        (**self).classify(old, new)
    }
}

/// The oracle provided by the node kinds themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct KindOracle;

impl CompatibilityOracle for KindOracle {
    fn classify(&self, old: &ShadowNode, new: &ShadowNode) -> Compatibility {
        new.kind().compatibility(old, new)
    }
}

/// Every node of a committed tree, by uid.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    nodes: HashMap<Uid, ShadowNode>,
}

impl TreeIndex {
    /// An index of nothing; every node of the next pass is new.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Indexes `top` and all of its descendants.
    #[must_use]
    pub fn build(top: &ShadowNode) -> Self {
        let mut nodes = HashMap::new();
        top.walk(&mut |node| {
            nodes.insert(node.uid().clone(), node.clone());
        });
        Self { nodes }
    }

    /// Number of indexed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl NodeLookup for TreeIndex {
    fn previous(&self, uid: &Uid) -> Option<&ShadowNode> {
        self.nodes.get(uid)
    }
}

impl FromIterator<ShadowNode> for TreeIndex {
    fn from_iter<I: IntoIterator<Item = ShadowNode>>(iter: I) -> Self {
        Self {
            nodes: iter
                .into_iter()
                .map(|node| (node.uid().clone(), node))
                .collect(),
        }
    }
}
