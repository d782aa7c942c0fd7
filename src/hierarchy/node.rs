//! Cluster tree node.

use core::fmt;
use std::fmt::Write as _;

use crate::features::{FeatureRecord, FeatureSet};
use crate::summarize::NameMap;

/// A node in a cluster tree.
///
/// A true leaf owns a one-record [`FeatureSet`] and remembers the index of
/// that record in the clustered input. Internal nodes own their children and,
/// after an aggregation pass, a representative set holding every descendant
/// record. Truncation turns internal nodes into childless nodes whose payload
/// is the union of the records they used to cover.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterNode {
    index: Option<usize>,
    data: Option<FeatureSet>,
    children: Vec<ClusterNode>,
    /// Merge height (0 for leaves).
    height: f64,
    /// Branch length to the parent.
    length: f64,
    names: NameMap,
}

impl ClusterNode {
    /// Create a leaf for input record `index`.
    pub fn leaf(index: usize, data: FeatureSet) -> Self {
        Self {
            index: Some(index),
            data: Some(data),
            children: Vec::new(),
            height: 0.0,
            length: 0.0,
            names: NameMap::default(),
        }
    }

    /// Create an internal node over `children`.
    pub fn internal(children: Vec<ClusterNode>, height: f64) -> Self {
        Self {
            index: None,
            data: None,
            children,
            height,
            length: 0.0,
            names: NameMap::default(),
        }
    }

    /// True when the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Index of the input record, for untruncated leaves.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Leaf payload, or representative set of an aggregated node.
    pub fn data(&self) -> Option<&FeatureSet> {
        self.data.as_ref()
    }

    /// Child nodes.
    pub fn children(&self) -> &[ClusterNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [ClusterNode] {
        &mut self.children
    }

    /// Merge height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Branch length to the parent.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub(crate) fn set_length(&mut self, length: f64) {
        self.length = length;
    }

    /// Attribute summaries used for labelling.
    pub fn names(&self) -> &NameMap {
        &self.names
    }

    pub(crate) fn set_names(&mut self, names: NameMap) {
        self.names = names;
    }

    /// Childless descendants, left to right. Each call starts a fresh walk.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Number of childless descendants.
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Number of records held by the childless descendants.
    pub fn record_count(&self) -> usize {
        self.leaves()
            .map(|l| l.data.as_ref().map_or(0, FeatureSet::len))
            .sum()
    }

    /// Records held by the childless descendants, left to right.
    pub fn records(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.leaves()
            .filter_map(|l| l.data.as_ref())
            .flat_map(|d| d.records().iter())
    }

    /// 1 for a node holding concrete data, else the sum over its children.
    ///
    /// A truncated node counts as 1 however many records it aggregates.
    pub fn cluster_size(&self) -> usize {
        if self.children.is_empty() {
            usize::from(self.data.is_some())
        } else {
            self.children.iter().map(ClusterNode::cluster_size).sum()
        }
    }

    /// Total node count, this node included.
    pub fn size_of_subtree(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ClusterNode::size_of_subtree)
            .sum::<usize>()
    }

    /// Edges on the longest downward path (0 for a leaf).
    pub fn max_depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.max_depth())
            .max()
            .unwrap_or(0)
    }

    /// Nodes `level + 1` edges below this one; direct children are level 0.
    pub fn nodes_at_level(&self, level: usize) -> Vec<&ClusterNode> {
        let mut frontier: Vec<&ClusterNode> = self.children.iter().collect();
        for _ in 0..level {
            if frontier.is_empty() {
                break;
            }
            frontier = frontier
                .into_iter()
                .flat_map(|n| n.children.iter())
                .collect();
        }
        frontier
    }

    /// Union of every descendant leaf's records.
    pub fn aggregated(&self) -> Option<FeatureSet> {
        let schema = self.leaves().find_map(|l| l.data.as_ref())?.shared_schema();
        Some(FeatureSet::union(
            schema,
            self.leaves().filter_map(|l| l.data.as_ref()),
        ))
    }

    /// Fill every internal node's payload with its descendants' records.
    pub(crate) fn aggregate(&mut self) {
        if self.children.is_empty() {
            return;
        }
        for child in &mut self.children {
            child.aggregate();
        }
        self.data = self.aggregated();
    }

    /// Replace children with one aggregated payload.
    pub(crate) fn collapse(&mut self) {
        if self.children.is_empty() {
            return;
        }
        self.data = self.aggregated();
        self.children.clear();
        self.index = None;
    }

    /// Collapse every node at `level` below this one.
    pub(crate) fn truncate_at(&mut self, level: usize) {
        for child in &mut self.children {
            if level == 0 {
                child.collapse();
            } else {
                child.truncate_at(level - 1);
            }
        }
    }

    /// Newick rendering with branch lengths.
    ///
    /// Leaves are labelled by their record's source model, falling back to
    /// the record index.
    pub fn to_newick(&self) -> String {
        let mut out = String::new();
        self.write_newick(&mut out);
        out.push(';');
        out
    }

    fn write_newick(&self, out: &mut String) {
        if self.children.is_empty() {
            out.push_str(&newick_label(&self.label()));
            return;
        }
        out.push('(');
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            child.write_newick(out);
            let _ = write!(out, ":{}", child.length);
        }
        out.push(')');
    }

    fn label(&self) -> String {
        let labels: Vec<String> = self
            .data
            .iter()
            .flat_map(|d| d.records().iter())
            .map(|r| r.source().map(ToString::to_string))
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default();
        if !labels.is_empty() {
            return labels.join("+");
        }
        match self.index {
            Some(i) => i.to_string(),
            None => format!("cluster_{}", self.record_count()),
        }
    }
}

/// Quote a Newick label when it holds reserved characters.
fn newick_label(label: &str) -> String {
    const RESERVED: &[char] = &['(', ')', ',', ':', ';', '[', ']', '\'', ' '];
    if label.contains(RESERVED) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

impl fmt::Display for ClusterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) if self.children.is_empty() => write!(f, "Leaf[{i}]: {}", self.names),
            _ => write!(
                f,
                "Node h={:.4} n={}: {}",
                self.height,
                self.record_count(),
                self.names
            ),
        }
    }
}

/// Depth-first iterator over childless nodes.
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    stack: Vec<&'a ClusterNode>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a ClusterNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if node.children.is_empty() {
                return Some(node);
            }
            self.stack.extend(node.children.iter().rev());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Schema;
    use std::sync::Arc;

    fn leaf(i: usize, v: f64) -> ClusterNode {
        let schema = Arc::new(Schema::new().numeric("x", 1.0));
        ClusterNode::leaf(
            i,
            FeatureSet::singleton(schema, FeatureRecord::numeric_only(vec![v])),
        )
    }

    fn sample() -> ClusterNode {
        //        root
        //       /    \
        //      a      3
        //     / \
        //    b   2
        //   / \
        //  0   1
        let b = ClusterNode::internal(vec![leaf(0, 0.0), leaf(1, 1.0)], 1.0);
        let a = ClusterNode::internal(vec![b, leaf(2, 2.0)], 2.0);
        ClusterNode::internal(vec![a, leaf(3, 3.0)], 3.0)
    }

    #[test]
    fn test_leaves_in_order_and_restartable() {
        let root = sample();
        let first: Vec<_> = root.leaves().filter_map(|l| l.index()).collect();
        let second: Vec<_> = root.leaves().filter_map(|l| l.index()).collect();
        assert_eq!(first, [0, 1, 2, 3]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sizes() {
        let root = sample();
        assert_eq!(root.size_of_subtree(), 7);
        assert_eq!(root.leaf_count(), 4);
        assert_eq!(root.cluster_size(), 4);
        assert_eq!(root.max_depth(), 3);
        assert_eq!(leaf(0, 0.0).max_depth(), 0);
    }

    #[test]
    fn test_max_depth_with_only_leaf_children() {
        let root = ClusterNode::internal(vec![leaf(0, 0.0), leaf(1, 1.0)], 1.0);
        assert_eq!(root.max_depth(), 1);
    }

    #[test]
    fn test_nodes_at_level() {
        let root = sample();
        assert_eq!(root.nodes_at_level(0).len(), 2);
        assert_eq!(root.nodes_at_level(1).len(), 2);
        assert_eq!(root.nodes_at_level(2).len(), 2);
        assert!(root.nodes_at_level(3).is_empty());
        assert!(root.nodes_at_level(10).is_empty());
    }

    #[test]
    fn test_collapse_keeps_cluster_size_one() {
        let mut root = sample();
        root.truncate_at(0);

        let a = &root.children()[0];
        assert!(a.is_leaf());
        assert_eq!(a.index(), None);
        assert_eq!(a.record_count(), 3);
        assert_eq!(a.leaf_count(), 1);
        assert_eq!(a.cluster_size(), 1);
        assert_eq!(root.cluster_size(), 2);
        assert_eq!(root.record_count(), 4);
    }

    #[test]
    fn test_aggregate_fills_internal_payloads() {
        let mut root = sample();
        root.aggregate();
        assert_eq!(root.data().map(FeatureSet::len), Some(4));
        assert_eq!(root.children()[0].data().map(FeatureSet::len), Some(3));
        // leaf count and cluster size are unaffected
        assert_eq!(root.leaf_count(), 4);
        assert_eq!(root.cluster_size(), 4);
        assert_eq!(root.records().count(), 4);
    }

    #[test]
    fn test_newick() {
        let mut l0 = leaf(0, 0.0);
        l0.set_length(0.5);
        let mut l1 = leaf(1, 1.0);
        l1.set_length(0.5);
        let root = ClusterNode::internal(vec![l0, l1], 0.5);
        assert_eq!(root.to_newick(), "(0:0.5,1:0.5);");
    }

    #[test]
    fn test_newick_quotes_sources() {
        let schema = Arc::new(Schema::new().numeric("x", 1.0));
        let record = FeatureRecord::numeric_only(vec![1.0]).with_source("order to cash");
        let node = ClusterNode::leaf(0, FeatureSet::singleton(schema, record));
        assert_eq!(node.to_newick(), "'order to cash';");
    }
}
