//! Clustering algorithms that build [`ClusterNode`](crate::hierarchy::ClusterNode) trees.
//!
//! ## Agglomerative (bottom-up)
//!
//! Start with each item as its own cluster and repeatedly merge the two most
//! similar clusters. The merge history forms a **dendrogram**: a binary tree
//! you can cut at any level to get k clusters.
//!
//! **Linkage methods** decide how similar a merged cluster is to the rest:
//!
//! | Linkage | Similarity | Effect |
//! |---------|------------|--------|
//! | Single | max(pairwise) | Chaining; elongated clusters |
//! | Complete | min(pairwise) | Compact clusters |
//! | Average | mean(pairwise) | Balanced compromise |
//!
//! The engine works on similarities ("higher is closer"), not distances.
//! Feed it a distance `d` as `-d`.
//!
//! ## Divisive (top-down)
//!
//! Start with everything in one node and split it with a [`Partitioner`]
//! until each piece is small enough. Any flat clusterer can drive the splits,
//! including the agglomerative engine itself (see [`ClustererPartitioner`]).
//!
//! ## Usage
//!
//! ```rust
//! use arbor::cluster::{AgglomerativeClustering, Linkage};
//! use arbor::similarity::Total;
//!
//! let items = vec![0i32, 1, 10, 11];
//! let sim = Total(|a: &i32, b: &i32| -f64::from((a - b).abs()));
//!
//! let flat = AgglomerativeClustering::new(Linkage::Single)
//!     .flat(&items, &sim, 2)
//!     .unwrap();
//! assert_eq!(flat.cluster_of(&0), flat.cluster_of(&1));
//! assert_ne!(flat.cluster_of(&0), flat.cluster_of(&10));
//! ```

mod agglomerative;
mod divisive;
mod linkage;
mod partition;

pub use agglomerative::{aggregate_small_clusters, AgglomerativeClustering};
pub use divisive::{TopDownClustering, ROOT_ID};
pub use linkage::{ClusterSimilarityLinkage, Linkage, LinkageOperand, LinkageRegistry};
pub use partition::{
    ClustererPartitioner, FlatClusterer, Partitioner, RandomPartitioner, SimilarityClusterer,
};
