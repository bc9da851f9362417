//! Cluster models handed to consumers.

use super::flat::FlatClusterModel;
use super::index::{AncestorIndex, ItemIndex};
use super::node::ClusterNode;
use crate::ItemId;

/// Read contract shared by hierarchical and flat models.
pub trait ClusterModel {
    /// Number of clusters at the top level: root children for a tree
    /// (1 for a lone leaf root), list length for a flat model.
    fn cluster_count(&self) -> usize;

    /// Total number of item memberships.
    fn item_count(&self) -> usize;

    /// Whether the model is a tree.
    fn is_hierarchical(&self) -> bool;
}

/// A cluster tree with exactly one root.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalClusterModel<I> {
    root: ClusterNode<I>,
}

/// Id of the root of an empty model.
pub const EMPTY_ROOT_ID: &str = "root";

impl<I> HierarchicalClusterModel<I> {
    /// Wrap a root node.
    pub fn new(root: ClusterNode<I>) -> Self {
        Self { root }
    }

    /// A model over no items: an empty leaf root.
    pub fn empty() -> Self {
        Self::new(ClusterNode::new(EMPTY_ROOT_ID, 0.0))
    }

    /// Root of the tree.
    pub fn root(&self) -> &ClusterNode<I> {
        &self.root
    }

    /// Mutable root, for post-passes before hand-off.
    pub fn root_mut(&mut self) -> &mut ClusterNode<I> {
        &mut self.root
    }

    /// Unwrap the root.
    pub fn into_root(self) -> ClusterNode<I> {
        self.root
    }

    /// True if the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.root.subtree_item_count() == 0
    }
}

impl<I: ItemId> HierarchicalClusterModel<I> {
    /// Build an item → holder index. Borrows the model; rebuild after mutation.
    pub fn item_index(&self) -> ItemIndex<'_, I> {
        ItemIndex::build(&self.root)
    }

    /// Build an ancestor-chain index. Borrows the model; rebuild after mutation.
    pub fn ancestor_index(&self) -> AncestorIndex<'_, I> {
        AncestorIndex::build(&self.root)
    }

    /// Cut the tree with [`flatten`](super::flatten::flatten).
    pub fn flatten(&self, level: usize) -> FlatClusterModel<I> {
        super::flatten::flatten(self, level)
    }
}

impl<I> From<ClusterNode<I>> for HierarchicalClusterModel<I> {
    fn from(root: ClusterNode<I>) -> Self {
        Self::new(root)
    }
}

impl<I> ClusterModel for HierarchicalClusterModel<I> {
    fn cluster_count(&self) -> usize {
        match self.root.children().len() {
            0 if self.is_empty() => 0,
            0 => 1,
            n => n,
        }
    }

    fn item_count(&self) -> usize {
        self.root.subtree_item_count()
    }

    fn is_hierarchical(&self) -> bool {
        true
    }
}
