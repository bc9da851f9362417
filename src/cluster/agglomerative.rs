//! Agglomerative (bottom-up) clustering over a similarity function.
//!
//! Start with one cluster per distinct item and repeatedly merge the most
//! similar pair. After each merge the merged cluster's similarity to every
//! other cluster is recomputed by a [`ClusterSimilarityLinkage`].
//!
//! # Algorithm
//!
//! ```text
//! d[i][j] = sim(id_i, id_j)              dense, symmetric
//! repeat n - k times:
//!     (x, y) = argmax d[i][j], i < j     first maximum in row-major order
//!     node_x = merge(node_x, node_y)     weight = d[x][y]
//!     d[x][i] = combine(d[x][i], d[y][i]) for alive i
//!     retire y
//! ```
//!
//! Every iteration scans all alive pairs, so the loop is O(n³) time and the
//! matrix O(n²) space. This is a batch algorithm for modest n.
//!
//! # Outputs
//!
//! - [`AgglomerativeClustering::cluster`]: the raw slots after `n - k` merges.
//! - [`AgglomerativeClustering::hierarchical`]: the full tree, followed by
//!   small-cluster aggregation (see [`aggregate_small_clusters`]).
//! - [`AgglomerativeClustering::flat`]: `k` flat clusters, with the smallest
//!   cluster weight recorded as `min_similarity`.
//! - [`AgglomerativeClustering::dendrogram`]: the merge history.

use std::collections::HashSet;
use std::sync::Arc;

use ndarray::Array2;
use tracing::{debug, trace};

use super::linkage::{ClusterSimilarityLinkage, Linkage, LinkageOperand, LinkageRegistry};
use crate::cancel::{checkpoint, CancellationToken};
use crate::error::{Error, Result};
use crate::hierarchy::{
    Cluster, ClusterNode, Dendrogram, FlatClusterModel, HierarchicalClusterModel, MIN_SIMILARITY,
};
use crate::similarity::{require, Similarity};
use crate::ItemId;

/// Agglomerative clustering engine.
#[derive(Debug, Clone)]
pub struct AgglomerativeClustering {
    /// Similarity update rule.
    linkage: Arc<dyn ClusterSimilarityLinkage>,
    /// Aggregation threshold for [`hierarchical`](Self::hierarchical).
    min_items: usize,
    /// Checked once per merge.
    cancel: Option<CancellationToken>,
}

impl Default for AgglomerativeClustering {
    fn default() -> Self {
        Self::new(Linkage::Single)
    }
}

/// Slots and merge history of one run.
struct Agglomeration<I> {
    slots: Vec<Option<ClusterNode<I>>>,
    dendrogram: Dendrogram,
}

impl AgglomerativeClustering {
    /// Create an engine with the given linkage and `min_items = 1`.
    pub fn new(linkage: impl ClusterSimilarityLinkage + 'static) -> Self {
        Self::with_shared_linkage(Arc::new(linkage))
    }

    /// Create an engine around an already shared linkage.
    pub fn with_shared_linkage(linkage: Arc<dyn ClusterSimilarityLinkage>) -> Self {
        Self {
            linkage,
            min_items: 1,
            cancel: None,
        }
    }

    /// Create an engine whose linkage is resolved by name.
    pub fn from_registry(registry: &LinkageRegistry, name: &str) -> Result<Self> {
        registry.get(name).map(Self::with_shared_linkage)
    }

    /// Set the small-cluster aggregation threshold (must be at least 1).
    pub fn with_min_items(mut self, min_items: usize) -> Self {
        self.min_items = min_items;
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The linkage in use.
    pub fn linkage(&self) -> &dyn ClusterSimilarityLinkage {
        self.linkage.as_ref()
    }

    /// The aggregation threshold.
    pub fn min_items(&self) -> usize {
        self.min_items
    }

    /// Merge down to `k` clusters.
    ///
    /// Returns one slot per distinct item, in first-occurrence order. Slots
    /// that were merged away are `None`; the remaining `min(k, n)` slots hold
    /// the cluster trees.
    pub fn cluster<I, S>(&self, items: &[I], sim: &S, k: usize) -> Result<Vec<Option<ClusterNode<I>>>>
    where
        I: ItemId,
        S: Similarity<I> + ?Sized,
    {
        self.run(items, sim, k).map(|run| run.slots)
    }

    /// Full merge history down to a single cluster.
    pub fn dendrogram<I, S>(&self, items: &[I], sim: &S) -> Result<Dendrogram>
    where
        I: ItemId,
        S: Similarity<I> + ?Sized,
    {
        self.run(items, sim, 1).map(|run| run.dendrogram)
    }

    /// Build the complete tree, then aggregate clusters smaller than
    /// `min_items`.
    ///
    /// An empty input gives [`HierarchicalClusterModel::empty`].
    pub fn hierarchical<I, S>(&self, items: &[I], sim: &S) -> Result<HierarchicalClusterModel<I>>
    where
        I: ItemId,
        S: Similarity<I> + ?Sized,
    {
        if self.min_items == 0 {
            return Err(Error::InvalidParameter {
                name: "min_items",
                message: "must be at least 1",
            });
        }
        let slots = self.run(items, sim, 1)?.slots;
        let Some(mut root) = slots.into_iter().flatten().next() else {
            return Ok(HierarchicalClusterModel::empty());
        };

        let before = root.node_count();
        let _ = aggregate_small_clusters(&mut root, self.min_items);
        debug!(
            min_items = self.min_items,
            removed_nodes = before - root.node_count(),
            "aggregated small clusters"
        );
        Ok(HierarchicalClusterModel::new(root))
    }

    /// Merge down to `k` clusters and flatten each into one [`Cluster`].
    ///
    /// Cluster ids are `"0".."k-1"` in slot order. The smallest weight among
    /// the surviving nodes is stored under [`MIN_SIMILARITY`].
    pub fn flat<I, S>(&self, items: &[I], sim: &S, k: usize) -> Result<FlatClusterModel<I>>
    where
        I: ItemId,
        S: Similarity<I> + ?Sized,
    {
        let slots = self.run(items, sim, k)?.slots;

        let mut model = FlatClusterModel::new();
        let mut min_similarity: Option<f64> = None;
        for (index, node) in slots.iter().flatten().enumerate() {
            min_similarity = Some(min_similarity.map_or(node.weight(), |m| m.min(node.weight())));
            model.add_cluster(Cluster::with_items(
                index.to_string(),
                node.subtree_items().cloned(),
            ));
        }
        if let Some(value) = min_similarity {
            model.set_property(MIN_SIMILARITY, value);
        }
        Ok(model)
    }

    fn run<I, S>(&self, items: &[I], sim: &S, k: usize) -> Result<Agglomeration<I>>
    where
        I: ItemId,
        S: Similarity<I> + ?Sized,
    {
        if k == 0 {
            return Err(Error::InvalidClusterCount {
                requested: k,
                n_items: items.len(),
            });
        }

        let mut seen = HashSet::with_capacity(items.len());
        let ids: Vec<I> = items
            .iter()
            .filter(|item| seen.insert((*item).clone()))
            .cloned()
            .collect();
        let n = ids.len();
        debug!(
            n_items = n,
            k,
            linkage = self.linkage.name(),
            "agglomerative clustering"
        );

        let mut d = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in i..n {
                let value = require(sim, &ids[i], &ids[j])?;
                d[[i, j]] = value;
                d[[j, i]] = value;
            }
        }

        let mut slots: Vec<Option<ClusterNode<I>>> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Some(ClusterNode::leaf(i.to_string(), d[[i, i]], vec![id.clone()])))
            .collect();
        let mut sizes = vec![1usize; n];
        let mut labels: Vec<usize> = (0..n).collect();
        let mut dendrogram = Dendrogram::new(n);

        for step in 0..n.saturating_sub(k) {
            checkpoint(self.cancel.as_ref())?;

            let Some((x, y, value)) = most_similar_pair(&d, &slots) else {
                break;
            };
            let (Some(node_x), Some(node_y)) = (slots[x].take(), slots[y].take()) else {
                return Err(Error::Other(format!("slot {x} or {y} was not alive")));
            };

            {
                let op_x = LinkageOperand {
                    id: node_x.id(),
                    weight: node_x.weight(),
                    item_count: sizes[x],
                };
                let op_y = LinkageOperand {
                    id: node_y.id(),
                    weight: node_y.weight(),
                    item_count: sizes[y],
                };
                for (i, slot) in slots.iter().enumerate() {
                    let Some(other) = slot else { continue };
                    let op_i = LinkageOperand {
                        id: other.id(),
                        weight: other.weight(),
                        item_count: sizes[i],
                    };
                    let updated = self.linkage.combine(d[[x, i]], d[[y, i]], &op_x, &op_y, &op_i);
                    if updated.is_nan() {
                        return Err(Error::Other(format!(
                            "linkage {} produced NaN merging {} and {} against {}",
                            self.linkage.name(),
                            op_x.id,
                            op_y.id,
                            op_i.id
                        )));
                    }
                    d[[x, i]] = updated;
                    d[[i, x]] = updated;
                }
            }

            let label = n + step;
            dendrogram.add_merge(labels[x], labels[y], value, sizes[x] + sizes[y]);
            trace!(step, x, y, similarity = value, "merged clusters");

            slots[x] = Some(ClusterNode::merged(label.to_string(), value, node_x, node_y));
            sizes[x] += sizes[y];
            labels[x] = label;
        }

        debug!(merges = dendrogram.n_merges(), "agglomeration finished");
        Ok(Agglomeration { slots, dendrogram })
    }
}

/// First maximum over alive pairs `i < j`, scanning rows then columns.
fn most_similar_pair<I>(d: &Array2<f64>, slots: &[Option<ClusterNode<I>>]) -> Option<(usize, usize, f64)> {
    let alive: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.as_ref().map(|_| i))
        .collect();

    let mut best: Option<(usize, usize, f64)> = None;
    for (a, &i) in alive.iter().enumerate() {
        for &j in &alive[a + 1..] {
            let value = d[[i, j]];
            if best.map_or(true, |(_, _, b)| value > b) {
                best = Some((i, j, value));
            }
        }
    }
    best
}

/// Fold clusters with fewer than `min_items` items into their parent.
///
/// Bottom-up; only binary nodes are rewritten:
///
/// - both children small and, together with the node's own items, at least
///   `min_items`: both children are dissolved into the node's local items;
/// - exactly one child small: that child is dissolved into the node's local
///   items and the node's weight drops to the child's weight if lower.
///
/// Returns the subtree item count after aggregation.
pub fn aggregate_small_clusters<I>(node: &mut ClusterNode<I>, min_items: usize) -> usize {
    let counts: Vec<usize> = node
        .children_mut()
        .iter_mut()
        .map(|child| aggregate_small_clusters(child, min_items))
        .collect();

    if let &[a, b] = counts.as_slice() {
        let local = node.local_items().len();
        let small = (a < min_items, b < min_items);
        match small {
            (true, true) if a + b + local >= min_items => {
                let children = std::mem::take(node.children_mut());
                for child in children {
                    node.extend_local_items(child.into_subtree_items());
                }
            }
            (true, false) | (false, true) => {
                let index = if small.0 { 0 } else { 1 };
                if let Some(child) = node.remove_child(index) {
                    if child.weight() < node.weight() {
                        node.set_weight(child.weight());
                    }
                    node.extend_local_items(child.into_subtree_items());
                }
            }
            _ => {}
        }
    }
    node.subtree_item_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::Total;

    fn line(values: &'static [(&'static str, f64)]) -> impl Fn(&&'static str, &&'static str) -> f64 {
        move |a: &&'static str, b: &&'static str| -> f64 {
            let pos = |id: &str| {
                values
                    .iter()
                    .find(|(k, _)| *k == id)
                    .map_or(f64::NAN, |(_, v)| *v)
            };
            -(pos(*a) - pos(*b)).abs()
        }
    }

    fn partition(model: &FlatClusterModel<&'static str>) -> Vec<Vec<&'static str>> {
        let mut out: Vec<Vec<_>> = model.iter().map(|c| c.iter().copied().collect()).collect();
        out.sort();
        out
    }

    const ABCD: &[(&str, f64)] = &[("a", 0.0), ("b", 1.0), ("c", 2.0), ("d", 10.0)];
    const CHAIN: &[(&str, f64)] = &[("a", 0.0), ("b", 1.0), ("c", 2.1), ("d", 3.3)];

    #[test]
    fn single_link_isolates_outlier() {
        let sim = Total(line(ABCD));
        let model = AgglomerativeClustering::new(Linkage::Single)
            .flat(&["a", "b", "c", "d"], &sim, 2)
            .unwrap();
        assert_eq!(partition(&model), vec![vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(model.property(MIN_SIMILARITY), Some(-1.0));
    }

    #[test]
    fn complete_link_on_same_points() {
        let sim = Total(line(ABCD));
        let model = AgglomerativeClustering::new(Linkage::Complete)
            .flat(&["a", "b", "c", "d"], &sim, 2)
            .unwrap();
        assert_eq!(partition(&model), vec![vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(model.property(MIN_SIMILARITY), Some(-2.0));
    }

    #[test]
    fn single_and_complete_disagree_on_a_chain() {
        let sim = Total(line(CHAIN));
        let items = ["a", "b", "c", "d"];

        let single = AgglomerativeClustering::new(Linkage::Single)
            .flat(&items, &sim, 2)
            .unwrap();
        assert_eq!(partition(&single), vec![vec!["a", "b", "c"], vec!["d"]]);

        let complete = AgglomerativeClustering::new(Linkage::Complete)
            .flat(&items, &sim, 2)
            .unwrap();
        assert_eq!(partition(&complete), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn duplicates_collapse() {
        let sim = Total(line(ABCD));
        let slots = AgglomerativeClustering::default()
            .cluster(&["a", "b", "a", "d", "b"], &sim, 5)
            .unwrap();
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(Option::is_some));
    }

    #[test]
    fn k_larger_than_n_merges_nothing() {
        let sim = Total(line(ABCD));
        let model = AgglomerativeClustering::default()
            .flat(&["a", "b", "c", "d"], &sim, 10)
            .unwrap();
        assert_eq!(model.len(), 4);
        assert_eq!(model.property(MIN_SIMILARITY), Some(0.0));
    }

    #[test]
    fn zero_k_is_rejected() {
        let sim = Total(line(ABCD));
        let err = AgglomerativeClustering::default().flat(&["a"], &sim, 0);
        assert_eq!(
            err.map(|_| ()),
            Err(Error::InvalidClusterCount {
                requested: 0,
                n_items: 1
            })
        );
    }

    #[test]
    fn empty_input_gives_empty_models() {
        let sim = Total(line(ABCD));
        let engine = AgglomerativeClustering::default();
        let flat = engine.flat::<&str, _>(&[], &sim, 3).unwrap();
        assert!(flat.is_empty());
        assert_eq!(flat.property(MIN_SIMILARITY), None);
        assert!(engine.hierarchical::<&str, _>(&[], &sim).unwrap().is_empty());
    }

    #[test]
    fn missing_similarity_aborts() {
        let sim = |a: &u8, b: &u8| if a.abs_diff(*b) < 2 { Some(1.0) } else { None };
        let err = AgglomerativeClustering::default().flat(&[1u8, 2, 3], &sim, 1);
        assert!(matches!(err, Err(Error::MissingSimilarity { .. })));
    }

    #[test]
    fn ties_take_first_pair_in_row_major_order() {
        let sim = Total(|a: &u8, b: &u8| if a == b { 1.0 } else { 0.0 });
        let slots = AgglomerativeClustering::default()
            .cluster(&[0u8, 1, 2, 3], &sim, 3)
            .unwrap();
        let merged = slots[0].as_ref().map(|n| n.children().len());
        assert_eq!(merged, Some(2));
        assert!(slots[1].is_none());
        assert!(slots[2].is_some() && slots[3].is_some());
    }

    #[test]
    fn hierarchical_tree_shape() {
        let sim = Total(line(ABCD));
        let model = AgglomerativeClustering::new(Linkage::Single)
            .hierarchical(&["a", "b", "c", "d"], &sim)
            .unwrap();
        let root = model.root();
        // ((a b) c) d, merged at -1, -1, -8.
        assert_eq!(root.id(), "6");
        assert_eq!(root.weight(), -8.0);
        assert_eq!(root.subtree_item_count(), 4);
        assert_eq!(root.children()[0].id(), "5");
        assert_eq!(root.children()[0].children()[0].id(), "4");
        assert_eq!(root.children()[1].local_items(), &["d"]);
    }

    #[test]
    fn aggregation_pulls_up_small_children() {
        let sim = Total(line(ABCD));
        let model = AgglomerativeClustering::new(Linkage::Single)
            .with_min_items(2)
            .hierarchical(&["a", "b", "c", "d"], &sim)
            .unwrap();
        let root = model.root();
        // "d" is alone, so it is absorbed by the root; inside {a,b,c} the
        // leaf "c" is absorbed by node 5; {a,b} collapses into node 4.
        assert_eq!(root.local_items(), &["d"]);
        assert_eq!(root.children().len(), 1);
        let abc = &root.children()[0];
        assert_eq!(abc.local_items(), &["c"]);
        assert_eq!(abc.children().len(), 1);
        let ab = &abc.children()[0];
        assert!(ab.is_leaf());
        assert_eq!(ab.local_items(), &["a", "b"]);
        assert_eq!(root.subtree_item_count(), 4);
    }

    #[test]
    fn aggregation_leaves_small_pairs_for_the_parent() {
        let mut node = ClusterNode::merged(
            "r",
            -5.0,
            ClusterNode::leaf("x", 0.0, vec![1]),
            ClusterNode::leaf("y", 0.0, vec![2]),
        );
        // Combined count 2 < 3: untouched.
        assert_eq!(aggregate_small_clusters(&mut node, 3), 2);
        assert_eq!(node.children().len(), 2);
    }

    #[test]
    fn aggregation_lowers_weight_to_absorbed_child() {
        let mut node = ClusterNode::merged(
            "r",
            -1.0,
            ClusterNode::leaf("x", -4.0, vec![1]),
            ClusterNode::leaf("y", 0.0, vec![2, 3, 4]),
        );
        let _ = aggregate_small_clusters(&mut node, 2);
        assert_eq!(node.weight(), -4.0);
        assert_eq!(node.local_items(), &[1]);
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn zero_min_items_is_rejected() {
        let sim = Total(line(ABCD));
        let result = AgglomerativeClustering::default()
            .with_min_items(0)
            .hierarchical(&["a"], &sim);
        assert!(matches!(result, Err(Error::InvalidParameter { name: "min_items", .. })));
    }

    #[test]
    fn cancelled_run_aborts() {
        let token = CancellationToken::new();
        token.cancel();
        let sim = Total(line(ABCD));
        let result = AgglomerativeClustering::default()
            .with_cancellation(token)
            .hierarchical(&["a", "b", "c"], &sim);
        assert!(result.is_err_and(|e| e.is_aborted()));
    }

    #[test]
    fn registry_lookup() {
        let registry = LinkageRegistry::builtin();
        let engine = AgglomerativeClustering::from_registry(&registry, "CompleteLink").unwrap();
        assert_eq!(engine.linkage().name(), "CompleteLink");
        assert!(AgglomerativeClustering::from_registry(&registry, "Ward").is_err());
    }

    #[derive(Debug)]
    struct Undefined;

    impl ClusterSimilarityLinkage for Undefined {
        fn name(&self) -> &str {
            "Undefined"
        }

        fn combine(
            &self,
            _: f64,
            _: f64,
            _: &LinkageOperand<'_>,
            _: &LinkageOperand<'_>,
            _: &LinkageOperand<'_>,
        ) -> f64 {
            f64::NAN
        }
    }

    #[test]
    fn nan_linkage_result_is_an_error() {
        let sim = Total(line(ABCD));
        let result = AgglomerativeClustering::new(Undefined).flat(&["a", "b", "c", "d"], &sim, 1);
        assert!(matches!(result, Err(Error::Other(_))));
    }

    #[test]
    fn average_of_opposite_infinities_is_an_error() {
        // 0 and 1 merge first; 2 is then +inf from one side and -inf from the other.
        let sim = |a: &u8, b: &u8| match (*a.min(b), *a.max(b)) {
            (x, y) if x == y => Some(0.0),
            (0, 1) | (0, 2) => Some(f64::INFINITY),
            (1, 2) => Some(f64::NEG_INFINITY),
            _ => None,
        };
        let result = AgglomerativeClustering::new(Linkage::Average).flat(&[0u8, 1, 2], &sim, 1);
        assert!(matches!(result, Err(Error::Other(_))));
    }

    #[test]
    fn dendrogram_records_merges() {
        let sim = Total(line(ABCD));
        let dendro = AgglomerativeClustering::default()
            .dendrogram(&["a", "b", "c", "d"], &sim)
            .unwrap();
        assert_eq!(dendro.n_items(), 4);
        assert_eq!(dendro.similarities(), vec![-1.0, -1.0, -8.0]);
        let steps: Vec<_> = dendro.merges().map(|m| (m.cluster_a, m.cluster_b, m.size)).collect();
        assert_eq!(steps, vec![(0, 1, 2), (4, 2, 3), (5, 3, 4)]);
        assert_eq!(dendro.cut_to_k(2).ok(), Some(vec![0, 0, 0, 1]));
    }
}
