//! Lookup structures over a built tree.
//!
//! Both indices borrow the tree they were built from, so the borrow checker
//! already rules out using one after the tree changed. Rebuild after any
//! mutation.

use std::collections::HashMap;

use super::node::{ClusterNode, NodePath};
use crate::ItemId;

/// Maps each item to the node holding it in `local_items`.
///
/// For an unaggregated tree that node is a leaf; after aggregation it may be
/// an internal node that absorbed the item. If an item occurs in several
/// nodes, the first one in pre-order wins.
#[derive(Debug, Clone)]
pub struct ItemIndex<'a, I> {
    root: &'a ClusterNode<I>,
    holders: HashMap<I, NodePath>,
}

impl<'a, I: ItemId> ItemIndex<'a, I> {
    /// One traversal of `root`.
    pub fn build(root: &'a ClusterNode<I>) -> Self {
        let mut holders = HashMap::new();
        let mut stack = vec![(root, NodePath::root())];
        while let Some((node, path)) = stack.pop() {
            for item in node.local_items() {
                let _ = holders.entry(item.clone()).or_insert_with(|| path.clone());
            }
            for (i, child) in node.children().iter().enumerate().rev() {
                stack.push((child, path.child(i)));
            }
        }
        Self { root, holders }
    }

    /// Node holding `item`.
    pub fn node_of(&self, item: &I) -> Option<&'a ClusterNode<I>> {
        self.holders.get(item).and_then(|path| self.root.get(path))
    }

    /// Path of the node holding `item`.
    pub fn path_of(&self, item: &I) -> Option<&NodePath> {
        self.holders.get(item)
    }

    /// Number of distinct indexed items.
    pub fn len(&self) -> usize {
        self.holders.len()
    }

    /// True if nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }
}

/// Root-to-holder ancestor chains for every item.
///
/// Building costs O(n * depth); a common-ancestor query walks two chains and
/// costs O(depth).
#[derive(Debug, Clone)]
pub struct AncestorIndex<'a, I> {
    chains: HashMap<I, Vec<&'a ClusterNode<I>>>,
}

impl<'a, I: ItemId> AncestorIndex<'a, I> {
    /// One traversal of `root`.
    pub fn build(root: &'a ClusterNode<I>) -> Self {
        let mut chains = HashMap::new();
        let mut chain = Vec::new();
        collect_chains(root, &mut chain, &mut chains);
        Self { chains }
    }

    /// Nodes from the root down to the node holding `item`.
    pub fn ancestors(&self, item: &I) -> Option<&[&'a ClusterNode<I>]> {
        self.chains.get(item).map(Vec::as_slice)
    }

    /// The deepest node whose subtree contains both items.
    pub fn most_specific_common_ancestor(&self, a: &I, b: &I) -> Option<&'a ClusterNode<I>> {
        let left = self.chains.get(a)?;
        let right = self.chains.get(b)?;
        left.iter()
            .zip(right)
            .take_while(|(x, y)| std::ptr::eq(**x, **y))
            .last()
            .map(|(x, _)| *x)
    }
}

fn collect_chains<'a, I: ItemId>(
    node: &'a ClusterNode<I>,
    chain: &mut Vec<&'a ClusterNode<I>>,
    chains: &mut HashMap<I, Vec<&'a ClusterNode<I>>>,
) {
    chain.push(node);
    for item in node.local_items() {
        let _ = chains.entry(item.clone()).or_insert_with(|| chain.clone());
    }
    for child in node.children() {
        collect_chains(child, chain, chains);
    }
    let _ = chain.pop();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ClusterNode<char> {
        //        r
        //      /   \
        //     x     y (local 'e')
        //    / \    |
        //   a   b   c,d
        let x = ClusterNode::merged(
            "x",
            0.5,
            ClusterNode::leaf("a", 1.0, vec!['a']),
            ClusterNode::leaf("b", 1.0, vec!['b']),
        );
        let mut y = ClusterNode::new("y", 0.4);
        y.add_child(ClusterNode::leaf("cd", 1.0, vec!['c', 'd']));
        y.add_local_item('e');
        ClusterNode::merged("r", 0.1, x, y)
    }

    #[test]
    fn item_index_finds_holders() {
        let root = tree();
        let index = ItemIndex::build(&root);
        assert_eq!(index.len(), 5);
        assert_eq!(index.node_of(&'a').map(|n| n.id()), Some("a"));
        assert_eq!(index.node_of(&'d').map(|n| n.id()), Some("cd"));
        assert_eq!(index.node_of(&'e').map(|n| n.id()), Some("y"));
        assert_eq!(index.path_of(&'c'), Some(&NodePath::from(vec![1, 0])));
        assert!(index.node_of(&'z').is_none());
    }

    #[test]
    fn common_ancestors() {
        let root = tree();
        let index = AncestorIndex::build(&root);
        let msca = |a, b| index.most_specific_common_ancestor(&a, &b).map(|n| n.id().to_string());

        assert_eq!(msca('a', 'b').as_deref(), Some("x"));
        assert_eq!(msca('a', 'c').as_deref(), Some("r"));
        assert_eq!(msca('c', 'd').as_deref(), Some("cd"));
        assert_eq!(msca('e', 'c').as_deref(), Some("y"));
        assert_eq!(msca('a', 'a').as_deref(), Some("a"));
        assert_eq!(msca('a', 'q'), None);

        let chain: Vec<_> = index
            .ancestors(&'d')
            .map(|c| c.iter().map(|n| n.id()).collect())
            .unwrap_or_default();
        assert_eq!(chain, vec!["r", "y", "cd"]);
    }

    #[test]
    fn path_prefix_agrees_with_chains() {
        let root = tree();
        let items = ItemIndex::build(&root);
        let ancestors = AncestorIndex::build(&root);
        for a in ['a', 'b', 'c', 'd', 'e'] {
            for b in ['a', 'b', 'c', 'd', 'e'] {
                let (Some(pa), Some(pb)) = (items.path_of(&a), items.path_of(&b)) else {
                    panic!("unindexed item");
                };
                let via_path = root.get(&pa.common_prefix(pb)).map(|n| n.id());
                let via_chain = ancestors.most_specific_common_ancestor(&a, &b).map(|n| n.id());
                assert_eq!(via_path, via_chain, "{a} {b}");
            }
        }
    }
}
