//! Rooted cluster trees and level-based extraction.

use super::node::{ClusterNode, Leaves};

/// A dendrogram owning exactly one root [`ClusterNode`].
///
/// Levels are counted from the root's children: the root's direct children
/// are level 0, their children level 1, and so on.
///
/// ```text
///            root
///          /      \
/// L0      a        b
///        / \      / \
/// L1    0   1    2   c
///                   / \
/// L2               3   4
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterTree {
    root: ClusterNode,
}

impl ClusterTree {
    /// Wrap an existing root.
    pub fn new(root: ClusterNode) -> Self {
        Self { root }
    }

    /// Tree over a forest of cluster roots.
    ///
    /// A single root is used as is; several are placed under a synthetic
    /// root whose height is the tallest child's. Returns `None` for an empty
    /// forest.
    pub fn from_roots(mut roots: Vec<ClusterNode>) -> Option<Self> {
        match roots.len() {
            0 => None,
            1 => roots.pop().map(Self::new),
            _ => {
                let height = roots
                    .iter()
                    .map(ClusterNode::height)
                    .fold(0.0, f64::max);
                Some(Self::new(ClusterNode::internal(roots, height)))
            }
        }
    }

    /// The root node.
    pub fn root(&self) -> &ClusterNode {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut ClusterNode {
        &mut self.root
    }

    /// Take the root out of the tree.
    pub fn into_root(self) -> ClusterNode {
        self.root
    }

    /// Childless nodes, one per input record on an untruncated tree.
    pub fn leaves(&self) -> Leaves<'_> {
        self.root.leaves()
    }

    /// Number of childless nodes.
    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Total node count.
    pub fn size_of_subtree(&self) -> usize {
        self.root.size_of_subtree()
    }

    /// Edges on the longest root-to-leaf path.
    pub fn max_depth(&self) -> usize {
        self.root.max_depth()
    }

    /// Nodes at `level` (root's children are level 0), left to right.
    pub fn nodes_at_level(&self, level: usize) -> Vec<&ClusterNode> {
        self.root.nodes_at_level(level)
    }

    /// Fill internal payloads with the union of descendant records.
    pub fn aggregate(&mut self) {
        self.root.aggregate();
    }

    /// Deep copy where every node at `level` is collapsed into one childless
    /// node holding the union of its descendants' records.
    pub fn copy_until_level(&self, level: usize) -> ClusterTree {
        let mut copy = self.clone();
        copy.root.truncate_at(level);
        copy
    }

    /// Deep copy collapsed into the root alone.
    fn collapsed(&self) -> ClusterTree {
        let mut copy = self.clone();
        copy.root.collapse();
        copy
    }

    /// The shallowest cut in which every surviving node covers at least
    /// `min_size` records.
    ///
    /// Finds the smallest level `L` holding a node with fewer than
    /// `min_size` records below it and returns `copy_until_level(L - 1)`.
    /// When `L` is 0, or `min_size` reaches the record total, the whole tree
    /// collapses into its root. `min_size <= 1` returns an unchanged copy.
    pub fn subtree_with_min_cluster_size(&self, min_size: usize) -> ClusterTree {
        if min_size <= 1 {
            return self.clone();
        }
        if min_size >= self.root.record_count() {
            return self.collapsed();
        }

        let mut level = 0;
        loop {
            let nodes = self.nodes_at_level(level);
            if nodes.is_empty() {
                return self.clone();
            }
            if nodes.iter().any(|n| n.record_count() < min_size) {
                break;
            }
            level += 1;
        }

        match level {
            0 => self.collapsed(),
            l => self.copy_until_level(l - 1),
        }
    }

    /// Newick rendering of the whole tree.
    pub fn to_newick(&self) -> String {
        self.root.to_newick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureRecord, FeatureSet, Schema};
    use std::sync::Arc;

    fn leaf(i: usize) -> ClusterNode {
        let schema = Arc::new(Schema::new().numeric("x", 1.0));
        ClusterNode::leaf(
            i,
            FeatureSet::singleton(schema, FeatureRecord::numeric_only(vec![i as f64])),
        )
    }

    /// Tree drawn in the type-level docs.
    fn sample() -> ClusterTree {
        let c = ClusterNode::internal(vec![leaf(3), leaf(4)], 1.0);
        let a = ClusterNode::internal(vec![leaf(0), leaf(1)], 1.0);
        let b = ClusterNode::internal(vec![leaf(2), c], 2.0);
        ClusterTree::new(ClusterNode::internal(vec![a, b], 3.0))
    }

    fn indices(tree: &ClusterTree) -> Vec<usize> {
        tree.leaves().filter_map(ClusterNode::index).collect()
    }

    #[test]
    fn test_from_roots() {
        assert!(ClusterTree::from_roots(Vec::new()).is_none());

        let single = ClusterTree::from_roots(vec![leaf(0)]).unwrap();
        assert_eq!(single.size_of_subtree(), 1);

        let forest = ClusterTree::from_roots(vec![leaf(0), leaf(1), leaf(2)]).unwrap();
        assert_eq!(forest.nodes_at_level(0).len(), 3);
        assert_eq!(forest.max_depth(), 1);
    }

    #[test]
    fn test_copy_until_level_zero_on_flat_tree_is_noop_aggregation() {
        let tree = ClusterTree::from_roots(vec![leaf(0), leaf(1), leaf(2)]).unwrap();
        let copy = tree.copy_until_level(0);

        assert_eq!(copy.root().children().len(), 3);
        for (orig, cut) in tree.nodes_at_level(0).iter().zip(copy.nodes_at_level(0)) {
            assert!(cut.is_leaf());
            assert_eq!(cut.data(), orig.data());
        }
    }

    #[test]
    fn test_copy_until_level_collapses() {
        let tree = sample();
        let copy = tree.copy_until_level(0);

        assert_eq!(copy.leaf_count(), 2);
        let sizes: Vec<usize> = copy.leaves().map(ClusterNode::record_count).collect();
        assert_eq!(sizes, [2, 3]);
        // source tree untouched
        assert_eq!(tree.leaf_count(), 5);
    }

    #[test]
    fn test_min_cluster_size_one_is_identity() {
        let tree = sample();
        assert_eq!(tree.subtree_with_min_cluster_size(1), tree);
        assert_eq!(tree.subtree_with_min_cluster_size(0), tree);
    }

    #[test]
    fn test_min_cluster_size_all_collapses_to_root() {
        let tree = sample();
        let cut = tree.subtree_with_min_cluster_size(5);
        assert_eq!(cut.size_of_subtree(), 1);
        assert_eq!(cut.root().record_count(), 5);
        assert_eq!(cut.root().data().map(FeatureSet::len), Some(5));

        assert_eq!(tree.subtree_with_min_cluster_size(50), cut);
    }

    #[test]
    fn test_min_cluster_size_two() {
        // level 0: a(2), b(3); level 1: 0,1,2 (1 each) -> cut at level 0
        let cut = sample().subtree_with_min_cluster_size(2);
        assert_eq!(cut.leaf_count(), 2);
        for node in cut.nodes_at_level(0) {
            assert!(node.record_count() >= 2);
        }
    }

    #[test]
    fn test_min_cluster_size_three_collapses_root() {
        // a has only 2 records at level 0
        let cut = sample().subtree_with_min_cluster_size(3);
        assert_eq!(cut.size_of_subtree(), 1);
        assert_eq!(cut.root().record_count(), 5);
    }

    #[test]
    fn test_leaves_visit_each_record_once() {
        assert_eq!(indices(&sample()), [0, 1, 2, 3, 4]);
    }
}
