//! Flat cluster model.
//!
//! A flat model is an ordered list of clusters plus a small bag of named
//! scalar properties (`min_similarity`, `level_distance`, ...).
//!
//! Clusters are **not** required to be disjoint. Nothing here checks it, and
//! [`FlatClusterModel::cluster_of`] simply reports the first cluster holding
//! an item.

use std::collections::{BTreeMap, BTreeSet};

use super::model::ClusterModel;
use crate::ItemId;

/// Property key: smallest merge similarity among the clusters.
pub const MIN_SIMILARITY: &str = "min_similarity";
/// Property key: negated weight of the last node expanded by a cut.
pub const LEVEL_DISTANCE: &str = "level_distance";

/// A single flat cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster<I> {
    id: String,
    items: BTreeSet<I>,
}

impl<I: ItemId> Cluster<I> {
    /// Create an empty cluster.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            items: BTreeSet::new(),
        }
    }

    /// Create a cluster from items; duplicates collapse.
    pub fn with_items(id: impl Into<String>, items: impl IntoIterator<Item = I>) -> Self {
        Self {
            id: id.into(),
            items: items.into_iter().collect(),
        }
    }

    /// Cluster identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Add an item. Returns false if it was already present.
    pub fn add(&mut self, item: I) -> bool {
        self.items.insert(item)
    }

    /// Remove an item. Returns false if it was absent.
    pub fn remove(&mut self, item: &I) -> bool {
        self.items.remove(item)
    }

    /// Membership test.
    pub fn contains(&self, item: &I) -> bool {
        self.items.contains(item)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the cluster has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &I> {
        self.items.iter()
    }

    /// The underlying set.
    pub fn items(&self) -> &BTreeSet<I> {
        &self.items
    }
}

/// Ordered list of clusters with named properties.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatClusterModel<I> {
    clusters: Vec<Cluster<I>>,
    properties: BTreeMap<String, f64>,
}

impl<I: ItemId> Default for FlatClusterModel<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ItemId> FlatClusterModel<I> {
    /// Create an empty model.
    pub fn new() -> Self {
        Self {
            clusters: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Append a cluster.
    pub fn add_cluster(&mut self, cluster: Cluster<I>) {
        self.clusters.push(cluster);
    }

    /// Remove and return the cluster at `index`.
    pub fn remove_cluster(&mut self, index: usize) -> Option<Cluster<I>> {
        (index < self.clusters.len()).then(|| self.clusters.remove(index))
    }

    /// Cluster at `index`.
    pub fn cluster(&self, index: usize) -> Option<&Cluster<I>> {
        self.clusters.get(index)
    }

    /// Mutable cluster at `index`.
    pub fn cluster_mut(&mut self, index: usize) -> Option<&mut Cluster<I>> {
        self.clusters.get_mut(index)
    }

    /// First cluster with the given id.
    pub fn cluster_by_id(&self, id: &str) -> Option<&Cluster<I>> {
        self.clusters.iter().find(|c| c.id == id)
    }

    /// Index of the first cluster containing `item`.
    pub fn cluster_of(&self, item: &I) -> Option<usize> {
        self.clusters.iter().position(|c| c.contains(item))
    }

    /// [`cluster_of`](Self::cluster_of) for each item.
    pub fn assignments<'a>(&self, items: impl IntoIterator<Item = &'a I>) -> Vec<Option<usize>>
    where
        I: 'a,
    {
        items.into_iter().map(|item| self.cluster_of(item)).collect()
    }

    /// All clusters in order.
    pub fn clusters(&self) -> &[Cluster<I>] {
        &self.clusters
    }

    /// Iterate clusters in order.
    pub fn iter(&self) -> impl Iterator<Item = &Cluster<I>> {
        self.clusters.iter()
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// True if there are no clusters.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Read a named property.
    pub fn property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).copied()
    }

    /// Set a named property.
    pub fn set_property(&mut self, key: impl Into<String>, value: f64) {
        let _ = self.properties.insert(key.into(), value);
    }

    /// All properties.
    pub fn properties(&self) -> &BTreeMap<String, f64> {
        &self.properties
    }
}

impl<I: ItemId> ClusterModel for FlatClusterModel<I> {
    fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    fn item_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }

    fn is_hierarchical(&self) -> bool {
        false
    }
}
