//! Pairwise similarity contract.
//!
//! The engines never look at features. Everything they know about items
//! comes through [`Similarity::similarity`]; larger values mean "more alike".
//! Distances are usually passed in negated.
//!
//! ```rust
//! use arbor::similarity::{Similarity, Total};
//!
//! let values = [0.0_f64, 1.0, 2.0, 10.0];
//! let sim = Total(|a: &usize, b: &usize| -(values[*a] - values[*b]).abs());
//! assert_eq!(sim.similarity(&0, &3), Some(-10.0));
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{Error, Result};
use crate::ItemId;

/// Similarity between two item ids.
///
/// `None` means the value is undefined for that pair; the clustering call
/// that asked for it fails with [`Error::MissingSimilarity`].
pub trait Similarity<I> {
    /// Similarity of `a` and `b`. Should be symmetric.
    fn similarity(&self, a: &I, b: &I) -> Option<f64>;
}

impl<I, F> Similarity<I> for F
where
    F: Fn(&I, &I) -> Option<f64>,
{
    fn similarity(&self, a: &I, b: &I) -> Option<f64> {
        self(a, b)
    }
}

/// Wraps a similarity that is defined for every pair.
#[derive(Debug, Clone, Copy)]
pub struct Total<F>(pub F);

impl<I, F> Similarity<I> for Total<F>
where
    F: Fn(&I, &I) -> f64,
{
    fn similarity(&self, a: &I, b: &I) -> Option<f64> {
        Some((self.0)(a, b))
    }
}

/// Symmetric lookup table of explicit pair similarities.
///
/// Pairs are stored once; lookups try both orders. The engines also ask for
/// `sim(a, a)`; unless stored explicitly, that comes from the
/// [`diagonal`](Self::with_diagonal) value, if one is set.
#[derive(Debug, Clone)]
pub struct SimilarityTable<I: Eq + Hash> {
    values: HashMap<(I, I), f64>,
    diagonal: Option<f64>,
}

impl<I: ItemId> SimilarityTable<I> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            diagonal: None,
        }
    }

    /// Similarity of any item with itself, when not stored explicitly.
    pub fn with_diagonal(mut self, value: f64) -> Self {
        self.diagonal = Some(value);
        self
    }

    /// Set the similarity of `a` and `b` (and of `b` and `a`).
    pub fn insert(&mut self, a: I, b: I, value: f64) {
        let _ = self.values.remove(&(b.clone(), a.clone()));
        let _ = self.values.insert((a, b), value);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, a: I, b: I, value: f64) -> Self {
        self.insert(a, b, value);
        self
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no pairs are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<I: ItemId> Default for SimilarityTable<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ItemId> Similarity<I> for SimilarityTable<I> {
    fn similarity(&self, a: &I, b: &I) -> Option<f64> {
        self.values
            .get(&(a.clone(), b.clone()))
            .or_else(|| self.values.get(&(b.clone(), a.clone())))
            .copied()
            .or(if a == b { self.diagonal } else { None })
    }
}

/// Look up a similarity, turning undefined or NaN values into an error.
pub(crate) fn require<I: ItemId, S: Similarity<I> + ?Sized>(sim: &S, a: &I, b: &I) -> Result<f64> {
    match sim.similarity(a, b) {
        Some(v) if !v.is_nan() => Ok(v),
        _ => Err(Error::missing_similarity(a, b)),
    }
}
