//! # arbor
//!
//! Cluster trees over opaque item ids.
//!
//! - [`cluster`]: agglomerative (bottom-up) and divisive (top-down) builders
//! - [`hierarchy`]: the tree model, item/ancestor indexes, dendrogram
//!   flattening and health checks
//! - [`similarity`]: the similarity seam both builders consume
//!
//! Items are never inspected: all the engine needs is a way to compare two of
//! them, given as a [`Similarity`](similarity::Similarity).
//!
//! ```rust
//! use arbor::cluster::{AgglomerativeClustering, Linkage};
//! use arbor::similarity::SimilarityTable;
//!
//! let sim = SimilarityTable::new()
//!     .with_diagonal(0.0)
//!     .with("a", "b", -1.0)
//!     .with("a", "c", -2.0)
//!     .with("b", "c", -3.0)
//!     .with("a", "d", -9.0)
//!     .with("b", "d", -8.0)
//!     .with("c", "d", -9.0);
//!
//! let model = AgglomerativeClustering::new(Linkage::Single)
//!     .hierarchical(&["a", "b", "c", "d"], &sim)
//!     .unwrap();
//! let two = model.flatten(1);
//! assert_eq!(two.len(), 2);
//! ```

/// Cooperative cancellation for long runs.
pub mod cancel;
pub mod cluster;
/// Error types used across `arbor`.
pub mod error;
pub mod hierarchy;
pub mod similarity;

use std::fmt::Debug;
use std::hash::Hash;

/// Bounds an item id must meet.
///
/// Ids are hashed for indexes, ordered inside flat clusters, and printed in
/// error messages. Anything meeting the bounds is an id automatically.
pub trait ItemId: Clone + Eq + Hash + Ord + Debug {}

impl<T: Clone + Eq + Hash + Ord + Debug> ItemId for T {}

pub use cancel::CancellationToken;
pub use cluster::{AgglomerativeClustering, Linkage, LinkageRegistry, TopDownClustering};
pub use error::{Error, Result};
pub use hierarchy::{
    flatten, ClusterModel, ClusterNode, FlatClusterModel, HierarchicalClusterModel,
};
pub use similarity::{Similarity, SimilarityTable};
