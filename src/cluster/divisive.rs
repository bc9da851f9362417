//! Divisive (top-down) clustering.
//!
//! The mirror image of agglomerative clustering: start with everything in one
//! node and recursively split it with a [`Partitioner`] until the pieces are
//! small enough.
//!
//! ```text
//! build(items, id):
//!     if |items| <= max_leaf_size: leaf(items)
//!     parts = split(items)
//!     if some part is empty or not smaller than items: leaf(items)
//!     else node(id, [build(part_i, "id.i") for each part])
//! ```
//!
//! The "not smaller" check is what keeps a partitioner that cannot shrink its
//! input from recursing forever.
//!
//! Items are kept as a list: duplicates stay duplicates all the way down.

use tracing::{debug, trace};

use super::partition::Partitioner;
use crate::cancel::{checkpoint, CancellationToken};
use crate::error::{Error, Result};
use crate::hierarchy::{ClusterNode, HierarchicalClusterModel};
use crate::ItemId;

/// Id given to the root by [`TopDownClustering::fit`].
pub const ROOT_ID: &str = "root";

/// Recursive top-down partitioner.
#[derive(Debug, Clone)]
pub struct TopDownClustering {
    /// Nodes with at most this many items are not split.
    max_leaf_size: usize,
    /// Checked once per recursive call.
    cancel: Option<CancellationToken>,
}

impl Default for TopDownClustering {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TopDownClustering {
    /// Create a partitioner that stops at `max_leaf_size` items (at least 1).
    pub fn new(max_leaf_size: usize) -> Self {
        Self {
            max_leaf_size,
            cancel: None,
        }
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Leaf size limit.
    pub fn max_leaf_size(&self) -> usize {
        self.max_leaf_size
    }

    /// Build the tree below a node named `node_id`.
    ///
    /// Child `i` of a node `x` is named `x.i`. All nodes have weight 0.
    pub fn build<I, P>(&self, items: Vec<I>, node_id: &str, partitioner: &mut P) -> Result<ClusterNode<I>>
    where
        I: ItemId,
        P: Partitioner<I> + ?Sized,
    {
        if self.max_leaf_size == 0 {
            return Err(Error::InvalidParameter {
                name: "max_leaf_size",
                message: "must be at least 1",
            });
        }
        debug!(
            n_items = items.len(),
            max_leaf_size = self.max_leaf_size,
            "top-down clustering"
        );
        self.split(items, node_id.to_string(), partitioner)
    }

    /// [`build`](Self::build) from a root named [`ROOT_ID`], wrapped in a model.
    pub fn fit<I, P>(&self, items: Vec<I>, partitioner: &mut P) -> Result<HierarchicalClusterModel<I>>
    where
        I: ItemId,
        P: Partitioner<I> + ?Sized,
    {
        self.build(items, ROOT_ID, partitioner)
            .map(HierarchicalClusterModel::new)
    }

    fn split<I, P>(&self, items: Vec<I>, node_id: String, partitioner: &mut P) -> Result<ClusterNode<I>>
    where
        I: ItemId,
        P: Partitioner<I> + ?Sized,
    {
        checkpoint(self.cancel.as_ref())?;

        if items.len() <= self.max_leaf_size {
            return Ok(ClusterNode::leaf(node_id, 0.0, items));
        }

        let parts = partitioner.partition(&items)?;
        // An empty split would drop every item, so it counts as no progress.
        let mut failed = parts.is_empty();
        let mut node = ClusterNode::new(node_id, 0.0);
        for (index, part) in parts.into_iter().enumerate() {
            if part.is_empty() || part.len() >= items.len() {
                failed = true;
                continue;
            }
            let child_id = format!("{}.{index}", node.id());
            let child = self.split(part, child_id, partitioner)?;
            node.add_child(child);
        }

        if failed {
            debug!(
                node = node.id(),
                n_items = items.len(),
                "split made no progress, keeping items in a leaf"
            );
            return Ok(ClusterNode::leaf(node.id().to_string(), 0.0, items));
        }
        trace!(node = node.id(), children = node.children().len(), "split node");
        Ok(node)
    }
}
