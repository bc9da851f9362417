//! Merge linkage: how the similarity between a freshly merged cluster and
//! every other cluster is derived.
//!
//! | Name | Update | Effect |
//! |------|--------|--------|
//! | `SingleLink` | max(s(x,i), s(y,i)) | Chaining; elongated clusters |
//! | `CompleteLink` | min(s(x,i), s(y,i)) | Compact clusters |
//! | `AverageLink` | size-weighted mean | Balanced compromise |
//!
//! Strategies are looked up by name in a [`LinkageRegistry`]. The builtin
//! registry knows `SingleLink` and `CompleteLink`; anything else (including
//! [`Linkage::Average`]) has to be registered.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// What a linkage may know about a cluster taking part in an update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkageOperand<'a> {
    /// Node id.
    pub id: &'a str,
    /// Similarity at which the node was formed.
    pub weight: f64,
    /// Number of items in the node's subtree.
    pub item_count: usize,
}

/// Similarity update rule applied after each merge.
pub trait ClusterSimilarityLinkage: fmt::Debug + Send + Sync {
    /// Registry name.
    fn name(&self) -> &str;

    /// Similarity between `other` and the merge of `x` and `y`, given the
    /// similarities `sim_x = s(x, other)` and `sim_y = s(y, other)`.
    fn combine(
        &self,
        sim_x: f64,
        sim_y: f64,
        x: &LinkageOperand<'_>,
        y: &LinkageOperand<'_>,
        other: &LinkageOperand<'_>,
    ) -> f64;
}

/// Built-in linkage methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Linkage {
    /// Single linkage: the most similar pair decides.
    Single,
    /// Complete linkage: the least similar pair decides.
    Complete,
    /// Average linkage: mean over all cross pairs.
    Average,
}

impl Linkage {
    /// Registry name of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Linkage::Single => "SingleLink",
            Linkage::Complete => "CompleteLink",
            Linkage::Average => "AverageLink",
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ClusterSimilarityLinkage for Linkage {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn combine(
        &self,
        sim_x: f64,
        sim_y: f64,
        x: &LinkageOperand<'_>,
        y: &LinkageOperand<'_>,
        _other: &LinkageOperand<'_>,
    ) -> f64 {
        match self {
            Linkage::Single => sim_x.max(sim_y),
            Linkage::Complete => sim_x.min(sim_y),
            Linkage::Average => {
                let total = x.item_count + y.item_count;
                if total == 0 {
                    return (sim_x + sim_y) / 2.0;
                }
                (sim_x * x.item_count as f64 + sim_y * y.item_count as f64) / total as f64
            }
        }
    }
}

/// Named linkage strategies.
#[derive(Debug, Clone)]
pub struct LinkageRegistry {
    entries: BTreeMap<String, Arc<dyn ClusterSimilarityLinkage>>,
}

impl LinkageRegistry {
    /// A registry with no entries.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// `SingleLink` and `CompleteLink`.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(Linkage::Single));
        registry.register(Arc::new(Linkage::Complete));
        registry
    }

    /// Register a strategy under its own name, replacing any previous entry.
    pub fn register(&mut self, linkage: Arc<dyn ClusterSimilarityLinkage>) {
        let name = linkage.name().to_string();
        let _ = self.entries.insert(name, linkage);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, linkage: Arc<dyn ClusterSimilarityLinkage>) -> Self {
        self.register(linkage);
        self
    }

    /// Resolve a strategy by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn ClusterSimilarityLinkage>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownLinkage(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for LinkageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
