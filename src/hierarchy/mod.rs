//! Cluster trees and the flat views derived from them.
//!
//! # The Core Insight
//!
//! A hierarchical clustering is one object that answers many questions:
//!
//! ```text
//! Question                               │ Answer
//! ───────────────────────────────────────┼──────────────────────────────
//! "Which cluster holds item x?"          │ ItemIndex::node_of
//! "What do x and y have in common?"      │ AncestorIndex::most_specific_common_ancestor
//! "Give me k groups"                     │ flatten(model, k - 1)
//! "Is this tree well formed?"            │ HealthCheck::health_check
//! ```
//!
//! # Module Overview
//!
//! | Type | Role |
//! |------|------|
//! | [`ClusterNode`] | Owned tree node: id, weight, local items, children |
//! | [`HierarchicalClusterModel`] | A tree behind a root |
//! | [`FlatClusterModel`] | Ordered list of [`Cluster`]s plus string properties |
//! | [`ItemIndex`] / [`AncestorIndex`] | Lookups over a borrowed tree |
//! | [`Dendrogram`] | Merge history with `cut_to_k` |
//! | [`DendrogramCut`] | Tree to flat model at a given level |
//!
//! # Weights
//!
//! A node's weight is the similarity at which it was formed. Similarities
//! are "higher is closer", so weights shrink toward the root:
//!
//! ```text
//!          6 (weight=-8)
//!         / \
//!        5   d   5 (weight=-2)
//!       / \
//!      4   c     4 (weight=-1)
//!     / \
//!    a   b
//! ```
//!
//! Flattening at level `L` pops the `L` weakest internal nodes, which is the
//! same as cutting the dendrogram at the `L` largest merge distances.

mod dendrogram;
mod flat;
mod flatten;
mod index;
mod model;
mod node;
mod validate;

pub use dendrogram::{Dendrogram, Merge};
pub use flat::{Cluster, FlatClusterModel, LEVEL_DISTANCE, MIN_SIMILARITY};
pub use flatten::{flatten, DendrogramCut, OUTLIER_CLUSTER_ID};
pub use index::{AncestorIndex, ItemIndex};
pub use model::{ClusterModel, HierarchicalClusterModel, EMPTY_ROOT_ID};
pub use node::{ClusterNode, NodePath, Nodes, SubtreeItems};
pub use validate::{
    check_min_items, HealthCheck, HealthReport, Severity, ValidationIssue, ValidationReport,
};
