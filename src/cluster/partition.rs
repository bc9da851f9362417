//! Split strategies for the divisive partitioner.

use rand::prelude::*;

use super::agglomerative::AgglomerativeClustering;
use crate::error::{Error, Result};
use crate::hierarchy::FlatClusterModel;
use crate::similarity::Similarity;
use crate::ItemId;

/// Splits a list of items into sub-lists.
///
/// Returning an empty sub-list, or one as long as the input, is not an error:
/// the caller treats it as "no progress" and stops splitting.
pub trait Partitioner<I> {
    /// Split `items`. Multiplicity should be preserved.
    fn partition(&mut self, items: &[I]) -> Result<Vec<Vec<I>>>;
}

impl<I, F> Partitioner<I> for F
where
    F: FnMut(&[I]) -> Vec<Vec<I>>,
{
    fn partition(&mut self, items: &[I]) -> Result<Vec<Vec<I>>> {
        Ok(self(items))
    }
}

/// Produces a flat clustering of a list of items.
pub trait FlatClusterer<I> {
    /// Cluster `items`.
    fn cluster(&self, items: &[I]) -> Result<FlatClusterModel<I>>;
}

/// Agglomerative flat clustering bound to a similarity and a target `k`.
#[derive(Debug, Clone)]
pub struct SimilarityClusterer<'s, S: ?Sized> {
    engine: AgglomerativeClustering,
    similarity: &'s S,
    k: usize,
}

impl<'s, S: ?Sized> SimilarityClusterer<'s, S> {
    /// Cluster into `k` groups with `engine`.
    pub fn new(engine: AgglomerativeClustering, similarity: &'s S, k: usize) -> Self {
        Self {
            engine,
            similarity,
            k,
        }
    }
}

impl<I, S> FlatClusterer<I> for SimilarityClusterer<'_, S>
where
    I: ItemId,
    S: Similarity<I> + ?Sized,
{
    fn cluster(&self, items: &[I]) -> Result<FlatClusterModel<I>> {
        self.engine.flat(items, self.similarity, self.k)
    }
}

/// Uses a [`FlatClusterer`] on each sub-list.
///
/// Input items are grouped by the first cluster containing them, so repeated
/// items stay repeated. Items no cluster claims form a trailing group.
#[derive(Debug, Clone)]
pub struct ClustererPartitioner<C> {
    clusterer: C,
}

impl<C> ClustererPartitioner<C> {
    /// Wrap a flat clusterer.
    pub fn new(clusterer: C) -> Self {
        Self { clusterer }
    }
}

impl<I, C> Partitioner<I> for ClustererPartitioner<C>
where
    I: ItemId,
    C: FlatClusterer<I>,
{
    fn partition(&mut self, items: &[I]) -> Result<Vec<Vec<I>>> {
        let model = self.clusterer.cluster(items)?;
        let mut groups = vec![Vec::new(); model.len()];
        let mut unassigned = Vec::new();
        for item in items {
            match model.cluster_of(item) {
                Some(index) => groups[index].push(item.clone()),
                None => unassigned.push(item.clone()),
            }
        }
        if !unassigned.is_empty() {
            groups.push(unassigned);
        }
        Ok(groups)
    }
}

/// Drops every item into a uniformly random bucket.
///
/// Buckets may come back empty, which the divisive partitioner treats as a
/// failed split.
#[derive(Debug, Clone)]
pub struct RandomPartitioner {
    buckets: usize,
    rng: StdRng,
}

impl RandomPartitioner {
    /// Partitioner with `buckets` buckets, seeded from the OS.
    pub fn new(buckets: usize) -> Self {
        Self {
            buckets,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reseed for reproducible splits.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Number of buckets.
    pub fn buckets(&self) -> usize {
        self.buckets
    }
}

impl<I: Clone> Partitioner<I> for RandomPartitioner {
    fn partition(&mut self, items: &[I]) -> Result<Vec<Vec<I>>> {
        if self.buckets == 0 {
            return Err(Error::InvalidParameter {
                name: "buckets",
                message: "must be at least 1",
            });
        }
        let mut out = vec![Vec::new(); self.buckets];
        for item in items {
            out[self.rng.random_range(0..self.buckets)].push(item.clone());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Linkage;
    use crate::similarity::Total;

    #[test]
    fn closures_are_partitioners() {
        let mut halve = |items: &[u32]| {
            let (a, b) = items.split_at(items.len() / 2);
            vec![a.to_vec(), b.to_vec()]
        };
        let parts = halve.partition(&[1u32, 2, 3]).unwrap();
        assert_eq!(parts, vec![vec![1], vec![2, 3]]);
    }

    #[test]
    fn random_partition_keeps_every_item() {
        let mut random = RandomPartitioner::new(3).with_seed(7);
        let items: Vec<u32> = (0..50).chain(0..10).collect();
        let parts = random.partition(&items[..]).unwrap();
        assert_eq!(parts.len(), 3);

        let mut seen: Vec<u32> = parts.into_iter().flatten().collect();
        seen.sort_unstable();
        let mut expected = items.clone();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[test]
    fn random_partition_is_reproducible() {
        let items: Vec<u32> = (0..20).collect();
        let a = RandomPartitioner::new(4).with_seed(11).partition(&items[..]).unwrap();
        let b = RandomPartitioner::new(4).with_seed(11).partition(&items[..]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_buckets_is_an_error() {
        let result = Partitioner::<u32>::partition(&mut RandomPartitioner::new(0), &[1]);
        assert!(matches!(result, Err(Error::InvalidParameter { name: "buckets", .. })));
    }

    #[test]
    fn clusterer_partition_preserves_multiplicity() {
        let sim = Total(|a: &i32, b: &i32| -f64::from((a - b).abs()));
        let engine = AgglomerativeClustering::new(Linkage::Complete);
        let mut split = ClustererPartitioner::new(SimilarityClusterer::new(engine, &sim, 2));

        let parts = split.partition(&[1i32, 2, 40, 1, 41]).unwrap();
        assert_eq!(parts, vec![vec![1, 2, 1], vec![40, 41]]);
    }

    struct Partial;

    impl FlatClusterer<u8> for Partial {
        fn cluster(&self, _: &[u8]) -> Result<FlatClusterModel<u8>> {
            let mut model = FlatClusterModel::new();
            model.add_cluster(crate::hierarchy::Cluster::with_items("only", [1]));
            Ok(model)
        }
    }

    #[test]
    fn unclaimed_items_form_a_trailing_group() {
        let parts = ClustererPartitioner::new(Partial).partition(&[1u8, 2, 1, 3]).unwrap();
        assert_eq!(parts, vec![vec![1, 1], vec![2, 3]]);
    }
}
