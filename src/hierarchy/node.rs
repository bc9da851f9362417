//! Cluster tree node.

use core::fmt;

/// A node in a cluster tree.
///
/// A node exclusively owns its children, so a tree is a plain recursive value
/// with no shared subtrees. Items held directly by the node live in
/// `local_items`: every item of a leaf, plus anything pulled up into an
/// internal node by small-cluster aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterNode<I> {
    id: String,
    weight: f64,
    local_items: Vec<I>,
    children: Vec<ClusterNode<I>>,
}

impl<I> ClusterNode<I> {
    /// Create an empty node.
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
            local_items: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a leaf holding `items`.
    pub fn leaf(id: impl Into<String>, weight: f64, items: Vec<I>) -> Self {
        Self {
            id: id.into(),
            weight,
            local_items: items,
            children: Vec::new(),
        }
    }

    /// Create an internal node owning two merged subtrees.
    pub fn merged(id: impl Into<String>, weight: f64, a: Self, b: Self) -> Self {
        Self {
            id: id.into(),
            weight,
            local_items: Vec::new(),
            children: vec![a, b],
        }
    }

    /// Node identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Similarity at which this node was formed.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Overwrite the merge weight.
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Items attached directly to this node.
    pub fn local_items(&self) -> &[I] {
        &self.local_items
    }

    /// Child subtrees, in order.
    pub fn children(&self) -> &[ClusterNode<I>] {
        &self.children
    }

    /// Check if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Append a child subtree.
    pub fn add_child(&mut self, child: ClusterNode<I>) {
        self.children.push(child);
    }

    /// Detach and return the child at `index`.
    pub fn remove_child(&mut self, index: usize) -> Option<ClusterNode<I>> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Attach an item directly to this node.
    pub fn add_local_item(&mut self, item: I) {
        self.local_items.push(item);
    }

    /// Attach several items directly to this node.
    pub fn extend_local_items(&mut self, items: impl IntoIterator<Item = I>) {
        self.local_items.extend(items);
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<ClusterNode<I>> {
        &mut self.children
    }

    /// Number of items in the whole subtree.
    pub fn subtree_item_count(&self) -> usize {
        self.local_items.len()
            + self
                .children
                .iter()
                .map(ClusterNode::subtree_item_count)
                .sum::<usize>()
    }

    /// Iterate all items in the subtree, pre-order (a node's local items
    /// before its children's).
    pub fn subtree_items(&self) -> SubtreeItems<'_, I> {
        SubtreeItems {
            current: self.local_items.iter(),
            pending: self.children.iter().rev().collect(),
        }
    }

    /// Consume the subtree, returning every item it held.
    pub fn into_subtree_items(self) -> Vec<I> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.extend(node.local_items);
            stack.extend(node.children.into_iter().rev());
        }
        out
    }

    /// Pre-order iterator over the nodes of the subtree.
    pub fn iter(&self) -> Nodes<'_, I> {
        Nodes { stack: vec![self] }
    }

    /// Number of nodes in the subtree (including this one).
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Length of the longest downward path, in edges. A leaf has depth 0.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// All leaves of the subtree, left to right.
    pub fn leaves(&self) -> Vec<&ClusterNode<I>> {
        self.iter().filter(|n| n.is_leaf()).collect()
    }

    /// First node (pre-order) with the given id.
    pub fn find(&self, id: &str) -> Option<&ClusterNode<I>> {
        self.iter().find(|n| n.id == id)
    }

    /// Node at a child-index path below this one.
    pub fn get(&self, path: &NodePath) -> Option<&ClusterNode<I>> {
        path.0
            .iter()
            .try_fold(self, |node, &i| node.children.get(i))
    }
}

/// Iterator over the items of a subtree. See [`ClusterNode::subtree_items`].
#[derive(Debug)]
pub struct SubtreeItems<'a, I> {
    current: core::slice::Iter<'a, I>,
    pending: Vec<&'a ClusterNode<I>>,
}

impl<'a, I> Iterator for SubtreeItems<'a, I> {
    type Item = &'a I;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(item);
            }
            let node = self.pending.pop()?;
            self.current = node.local_items.iter();
            self.pending.extend(node.children.iter().rev());
        }
    }
}

/// Pre-order node iterator. See [`ClusterNode::iter`].
#[derive(Debug)]
pub struct Nodes<'a, I> {
    stack: Vec<&'a ClusterNode<I>>,
}

impl<'a, I> Iterator for Nodes<'a, I> {
    type Item = &'a ClusterNode<I>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Position of a node as the sequence of child indices from the root.
///
/// The root is the empty path. A path is an ancestor of another exactly when
/// it is a prefix of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The root path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        Self(steps)
    }

    /// Child indices from the root.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of edges from the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// True if `self` is `other` or one of its ancestors.
    pub fn is_ancestor_of(&self, other: &NodePath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Path of the deepest node that is an ancestor of both.
    pub fn common_prefix(&self, other: &NodePath) -> NodePath {
        let shared = self
            .0
            .iter()
            .zip(&other.0)
            .take_while(|(a, b)| a == b)
            .count();
        NodePath(self.0[..shared].to_vec())
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(steps: Vec<usize>) -> Self {
        Self(steps)
    }
}

impl<I: fmt::Debug> fmt::Display for ClusterNode<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node<I: fmt::Debug>(
            f: &mut fmt::Formatter<'_>,
            node: &ClusterNode<I>,
            indent: usize,
        ) -> fmt::Result {
            write!(f, "{:indent$}{} ({:.4})", "", node.id, node.weight, indent = indent)?;
            if !node.local_items.is_empty() {
                write!(f, " {:?}", node.local_items)?;
            }
            writeln!(f)?;
            for child in &node.children {
                write_node(f, child, indent + 2)?;
            }
            Ok(())
        }
        write_node(f, self, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClusterNode<&'static str> {
        // root
        // ├── left: [a, b]
        // └── right (local c)
        //     ├── r0: [d]
        //     └── r1: [e, f]
        let left = ClusterNode::leaf("left", 0.9, vec!["a", "b"]);
        let mut right = ClusterNode::merged(
            "right",
            0.5,
            ClusterNode::leaf("r0", 1.0, vec!["d"]),
            ClusterNode::leaf("r1", 1.0, vec!["e", "f"]),
        );
        right.add_local_item("c");
        ClusterNode::merged("root", 0.1, left, right)
    }

    #[test]
    fn counts_and_items() {
        let root = sample();
        assert_eq!(root.subtree_item_count(), 6);
        assert_eq!(root.node_count(), 5);
        assert_eq!(root.depth(), 2);
        let items: Vec<_> = root.subtree_items().copied().collect();
        assert_eq!(items, vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(root.clone().into_subtree_items(), items);
    }

    #[test]
    fn leaves_and_lookup() {
        let root = sample();
        let ids: Vec<_> = root.leaves().iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["left", "r0", "r1"]);
        assert_eq!(root.find("r1").map(|n| n.local_items().len()), Some(2));
        assert!(root.find("missing").is_none());

        let path = NodePath::root().child(1).child(0);
        assert_eq!(root.get(&path).map(|n| n.id()), Some("r0"));
        assert!(root.get(&NodePath::from(vec![0, 0])).is_none());
    }

    #[test]
    fn remove_child_detaches_subtree() {
        let mut root = sample();
        let right = root.remove_child(1).map(|n| n.subtree_item_count());
        assert_eq!(right, Some(4));
        assert_eq!(root.subtree_item_count(), 2);
        assert!(root.remove_child(5).is_none());
    }

    #[test]
    fn path_relations() {
        let a = NodePath::from(vec![0, 1, 1]);
        let b = NodePath::from(vec![0, 1, 0, 2]);
        assert_eq!(a.common_prefix(&b), NodePath::from(vec![0, 1]));
        assert!(NodePath::root().is_ancestor_of(&a));
        assert!(a.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&b));
        assert_eq!(b.depth(), 4);
    }

    #[test]
    fn display_outline() {
        let text = sample().to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("root"));
        assert!(lines[2].starts_with("  right"));
        assert!(lines[2].contains("[\"c\"]"));
        assert!(lines[3].starts_with("    r0"));
    }
}
