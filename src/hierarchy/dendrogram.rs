//! Merge history of an agglomerative run.
//!
//! Labels follow the SciPy/MATLAB convention: the `n` original items are
//! clusters `0..n`, and merge step `s` creates cluster `n + s`.

use crate::error::{Error, Result};

/// A dendrogram recording agglomerative merges in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Dendrogram {
    merges: Vec<Merge>,
    n_items: usize,
}

/// A single merge operation in the dendrogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// First cluster being merged (label).
    pub cluster_a: usize,
    /// Second cluster being merged (label).
    pub cluster_b: usize,
    /// Similarity at which the merge occurred.
    pub similarity: f64,
    /// Size of resulting cluster.
    pub size: usize,
}

impl Dendrogram {
    /// Create a new dendrogram for n items.
    pub fn new(n_items: usize) -> Self {
        Self {
            merges: Vec::with_capacity(n_items.saturating_sub(1)),
            n_items,
        }
    }

    /// Record a merge operation.
    pub fn add_merge(&mut self, cluster_a: usize, cluster_b: usize, similarity: f64, size: usize) {
        self.merges.push(Merge {
            cluster_a,
            cluster_b,
            similarity,
            size,
        });
    }

    /// Per-item labels after replaying the first `n - k` merges.
    ///
    /// Labels are renumbered `0..` in order of first appearance. If fewer
    /// merges were recorded, all of them are replayed.
    pub fn cut_to_k(&self, k: usize) -> Result<Vec<usize>> {
        if k == 0 {
            return Err(Error::InvalidClusterCount {
                requested: k,
                n_items: self.n_items,
            });
        }
        let n_merges = self.n_items.saturating_sub(k).min(self.merges.len());

        // owner[label] = label of the cluster that absorbed it.
        let mut owner: Vec<usize> = (0..self.n_items + n_merges).collect();
        for (step, merge) in self.merges.iter().take(n_merges).enumerate() {
            let new_label = self.n_items + step;
            if merge.cluster_a >= new_label || merge.cluster_b >= new_label {
                return Err(Error::Other(format!(
                    "merge {step} references a cluster created later"
                )));
            }
            owner[merge.cluster_a] = new_label;
            owner[merge.cluster_b] = new_label;
        }

        let mut renumber = std::collections::HashMap::new();
        let labels = (0..self.n_items)
            .map(|item| {
                let mut label = item;
                while owner[label] != label {
                    label = owner[label];
                }
                let next = renumber.len();
                *renumber.entry(label).or_insert(next)
            })
            .collect();
        Ok(labels)
    }

    /// Number of original items.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of merges recorded.
    pub fn n_merges(&self) -> usize {
        self.merges.len()
    }

    /// Iterate over merges.
    pub fn merges(&self) -> impl Iterator<Item = &Merge> {
        self.merges.iter()
    }

    /// Merge similarities, in merge order.
    pub fn similarities(&self) -> Vec<f64> {
        self.merges.iter().map(|m| m.similarity).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dendrogram_creation() {
        let dendro = Dendrogram::new(5);
        assert_eq!(dendro.n_items(), 5);
        assert_eq!(dendro.n_merges(), 0);
    }

    #[test]
    fn cut_replays_prefix_of_merges() {
        // ((0 1) 2) (3 4)
        let mut dendro = Dendrogram::new(5);
        dendro.add_merge(0, 1, -1.0, 2); // -> 5
        dendro.add_merge(3, 4, -1.5, 2); // -> 6
        dendro.add_merge(5, 2, -2.0, 3); // -> 7
        dendro.add_merge(7, 6, -9.0, 5); // -> 8

        assert_eq!(dendro.cut_to_k(5).ok(), Some(vec![0, 1, 2, 3, 4]));
        assert_eq!(dendro.cut_to_k(3).ok(), Some(vec![0, 0, 1, 2, 2]));
        assert_eq!(dendro.cut_to_k(2).ok(), Some(vec![0, 0, 0, 1, 1]));
        assert_eq!(dendro.cut_to_k(1).ok(), Some(vec![0; 5]));
        assert_eq!(dendro.cut_to_k(9).ok(), Some(vec![0, 1, 2, 3, 4]));
        assert!(dendro.cut_to_k(0).is_err());
        assert_eq!(dendro.similarities(), vec![-1.0, -1.5, -2.0, -9.0]);
    }
}
