//! Horizontal cut of a cluster tree into a flat model.
//!
//! Rather than cutting at a similarity threshold, the cut expands a fixed
//! number of nodes, least similar first:
//!
//! ```text
//! queue = [root]
//! repeat `level` times:
//!     node = pop(min weight, then min subtree size)
//!     local items of node -> outliers
//!     push children of node
//! each queued node -> one cluster; outliers -> cluster "0"
//! ```
//!
//! With `level = 0` the root is never expanded and the whole tree becomes one
//! cluster. For a tree from the agglomerative engine (without aggregation),
//! `level = j` undoes the last `j` merges.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::{debug, trace};

use super::flat::{Cluster, FlatClusterModel, LEVEL_DISTANCE};
use super::model::HierarchicalClusterModel;
use super::node::ClusterNode;
use crate::ItemId;

/// Id of the cluster collecting items of expanded nodes.
pub const OUTLIER_CLUSTER_ID: &str = "0";

/// Configuration for a dendrogram cut.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DendrogramCut {
    level: usize,
}

impl DendrogramCut {
    /// Cut that expands `level` nodes.
    pub fn new(level: usize) -> Self {
        Self { level }
    }

    /// Number of expansions.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Apply the cut.
    ///
    /// Queued nodes become clusters `"1".."m"` in queue order; outliers, if
    /// any, are appended as cluster [`OUTLIER_CLUSTER_ID`]. Clusters with no
    /// items are not emitted. The last expansion's negated weight is stored
    /// under [`LEVEL_DISTANCE`].
    pub fn cut<I: ItemId>(&self, model: &HierarchicalClusterModel<I>) -> FlatClusterModel<I> {
        let mut queue = BinaryHeap::new();
        queue.push(Queued::new(model.root(), 0));
        let mut seq = 1usize;

        let mut outliers = Vec::new();
        let mut level_distance = None;
        for expansion in 0..self.level {
            let Some(Queued { node, .. }) = queue.pop() else {
                break;
            };
            let distance = -node.weight();
            trace!(expansion, node = node.id(), level_distance = distance, "expanding node");
            level_distance = Some(distance);

            // Leaf: everything becomes outliers. Otherwise only the items the
            // node holds itself do, and its children stay in play.
            outliers.extend(node.local_items().iter().cloned());
            for child in node.children() {
                queue.push(Queued::new(child, seq));
                seq += 1;
            }
        }

        let mut flat = FlatClusterModel::new();
        let mut next_id = 1usize;
        while let Some(Queued { node, .. }) = queue.pop() {
            let cluster = Cluster::with_items(next_id.to_string(), node.subtree_items().cloned());
            if !cluster.is_empty() {
                flat.add_cluster(cluster);
                next_id += 1;
            }
        }
        if !outliers.is_empty() {
            flat.add_cluster(Cluster::with_items(OUTLIER_CLUSTER_ID, outliers));
        }
        if let Some(distance) = level_distance {
            flat.set_property(LEVEL_DISTANCE, distance);
        }

        debug!(
            level = self.level,
            clusters = flat.len(),
            level_distance = ?level_distance,
            "flattened cluster tree"
        );
        flat
    }
}

/// Cut `model` by expanding `level` nodes. See [`DendrogramCut`].
pub fn flatten<I: ItemId>(model: &HierarchicalClusterModel<I>, level: usize) -> FlatClusterModel<I> {
    DendrogramCut::new(level).cut(model)
}

/// Heap entry. `BinaryHeap` is a max-heap, so the ordering is reversed:
/// lower weight, then smaller subtree, then earlier insertion is "greater".
struct Queued<'a, I> {
    weight: f64,
    size: usize,
    seq: usize,
    node: &'a ClusterNode<I>,
}

impl<'a, I> Queued<'a, I> {
    fn new(node: &'a ClusterNode<I>, seq: usize) -> Self {
        Self {
            weight: node.weight(),
            size: node.subtree_item_count(),
            seq,
            node,
        }
    }
}

impl<I> Ord for Queued<'_, I> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.size.cmp(&self.size))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<I> PartialOrd for Queued<'_, I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I> PartialEq for Queued<'_, I> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<I> Eq for Queued<'_, I> {}
