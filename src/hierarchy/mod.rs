//! Dendrograms produced by agglomerative clustering.
//!
//! A clustering run yields a forest of [`ClusterNode`] roots, one per final
//! cluster. [`ClusterTree`] wraps a single root (synthesising one over a
//! forest) and offers the level-based queries used to pick a granularity:
//!
//! ```text
//!              root
//!            /      \
//! level 0   A        B            nodes_at_level(0) = [A, B]
//!          / \      / \
//! level 1 0   1    2   C          copy_until_level(0) collapses A and B
//!                     / \
//! level 2            3   4
//! ```
//!
//! - [`ClusterTree::copy_until_level`] cuts the tree at a fixed level.
//! - [`ClusterTree::subtree_with_min_cluster_size`] picks the shallowest cut
//!   where every surviving cluster still covers at least `k` records.
//!
//! [`MergeHistory`] keeps the flat merge log of a run alongside the tree.

mod history;
mod node;
mod tree;
mod validate;

pub use history::{Merge, MergeHistory};
pub use node::{ClusterNode, Leaves};
pub use tree::ClusterTree;
pub use validate::{
    check_forest, HealthCheck, HealthReport, Severity, ValidationIssue, ValidationReport,
};
