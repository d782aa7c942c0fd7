//! Agglomerative clustering over mixed feature records.
//!
//! Every record starts as its own cluster. The run repeatedly joins the two
//! closest clusters under the chosen [`Linkage`] until the target number of
//! clusters is left (or, for neighbor-joining, a single tree remains).
//!
//! # Candidate queue
//!
//! General linkages keep a min-heap of `(distance, a, b, |a|, |b|)` entries.
//! After a merge the new cluster's distances to every live cluster are pushed
//! and nothing is removed. An entry popped later is only used if both
//! recorded sizes still match the live clusters; otherwise one side has been
//! merged since the entry was pushed and it is dropped. Cluster sizes only
//! grow and absorbed slots drop to zero, so a size match means the entry is
//! current.
//!
//! Entries are ordered by distance alone. Which of several equally distant
//! pairs merges first is whatever order the heap yields.
//!
//! # Cost
//!
//! | Linkage | Per merge |
//! |---------|-----------|
//! | Single, Complete, Average | O(n²) cross pairs over all live clusters |
//! | Centroid, Ward | plus a centroid per cluster (medoid search on categorical values) |
//! | NeighborJoining | O(n²); O(n³) overall |

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::{debug, info, warn};

use super::linkage::{instance_distance, Linkage, LinkageContext};
use super::merge::{Forest, MergeState};
use super::neighbor_joining::neighbor_joining;
use super::traits::Clusterer;
use crate::config::ClusterConfig;
use crate::distance::{pairwise_distances, DistanceMetric};
use crate::error::{Error, Result};
use crate::features::{FeatureRecord, FeatureSet};
use crate::hierarchy::{check_forest, ClusterNode, ClusterTree, MergeHistory};

/// Hierarchical agglomerative clusterer.
///
/// ```rust,ignore
/// use grove::{Agglomerator, Clusterer, DistanceMetric, Linkage, NumericDistance};
///
/// let mut agg = Agglomerator::new(DistanceMetric::numeric(NumericDistance::unweighted(1)))
///     .with_linkage(Linkage::Average)
///     .with_n_clusters(3);
/// agg.build_clusterer(&features)?;
/// let tree = agg.tree();
/// ```
#[derive(Debug, Clone)]
pub struct Agglomerator {
    linkage: Linkage,
    n_clusters: usize,
    distance_is_branch_length: bool,
    debug: bool,
    metric: DistanceMetric,
    fitted: Option<Forest>,
}

impl Agglomerator {
    /// Single-linkage clusterer stopping at two clusters.
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            linkage: Linkage::default(),
            n_clusters: 2,
            distance_is_branch_length: false,
            debug: false,
            metric,
            fitted: None,
        }
    }

    /// Clusterer for `data` as described by `config`.
    ///
    /// When normalization is on, numeric ranges are taken over all of `data`.
    pub fn from_config(config: &ClusterConfig, data: &FeatureSet) -> Result<Self> {
        let ranges = config.distance.normalize.then(|| data.numeric_ranges());
        let metric = DistanceMetric::from_config(data.schema(), &config.distance, ranges)?;
        Ok(Self::new(metric)
            .with_linkage(config.linkage)
            .with_n_clusters(config.n_clusters)
            .with_distance_is_branch_length(config.distance_is_branch_length)
            .with_debug(config.debug))
    }

    /// Set the linkage rule.
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Set the number of clusters to stop at (clamped to at least 1).
    pub fn with_n_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters.max(1);
        self
    }

    /// Treat merge distances as branch lengths rather than heights.
    ///
    /// Neighbor-joining always records branch lengths.
    pub fn with_distance_is_branch_length(mut self, on: bool) -> Self {
        self.distance_is_branch_length = on;
        self
    }

    /// Use the exhaustive pair search in neighbor-joining.
    pub fn with_debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    /// The linkage rule.
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// The target cluster count.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// The record distance.
    pub fn metric(&self) -> &DistanceMetric {
        &self.metric
    }

    fn fitted(&self) -> Result<&Forest> {
        self.fitted.as_ref().ok_or(Error::NotBuilt)
    }

    /// Final cluster number of each input record.
    ///
    /// Clusters are numbered in order of their lowest member.
    pub fn labels(&self) -> Result<&[usize]> {
        Ok(&self.fitted()?.labels)
    }

    /// Merges performed by the last build, in order.
    pub fn history(&self) -> Result<&MergeHistory> {
        Ok(&self.fitted()?.history)
    }

    /// The final clusters as one tree; `None` before a build or for empty input.
    pub fn tree(&self) -> Option<ClusterTree> {
        let forest = self.fitted.as_ref()?;
        ClusterTree::from_roots(forest.clusters.clone())
    }

    /// Like [`tree`](Self::tree), without cloning.
    pub fn into_tree(self) -> Option<ClusterTree> {
        ClusterTree::from_roots(self.fitted?.clusters)
    }

    fn run(&self, data: &FeatureSet) -> Result<Forest> {
        let n = data.len();
        let target = self.n_clusters.clamp(1, n.max(1));
        let distances = pairwise_distances(&self.metric, data.records());
        let joining = self.linkage == Linkage::NeighborJoining;
        // Neighbor-joining yields branch lengths, not merge heights.
        let mut state = MergeState::new(data, self.distance_is_branch_length || joining);

        if joining {
            if self.n_clusters != 1 {
                warn!(
                    target = self.n_clusters,
                    "neighbor-joining always links down to a single tree; target ignored"
                );
            }
            neighbor_joining(&mut state, &distances, self.debug)?;
        } else {
            let ctx = LinkageContext {
                records: data.records(),
                distances: &distances,
                metric: &self.metric,
            };
            link_clustering(&mut state, &ctx, self.linkage, target)?;
        }

        Ok(state.into_forest())
    }
}

impl Clusterer for Agglomerator {
    fn build_clusterer(&mut self, data: &FeatureSet) -> Result<()> {
        self.fitted = None;
        info!(
            records = data.len(),
            linkage = ?self.linkage,
            target = self.n_clusters,
            "building cluster hierarchy"
        );

        let forest = self.run(data)?;
        let report = check_forest(&forest.clusters, Some(data.len()));
        if !report.is_healthy() {
            return Err(Error::InvalidTree(report.validation.to_string()));
        }

        debug!(
            clusters = forest.clusters.len(),
            merges = forest.history.n_merges(),
            "cluster hierarchy built"
        );
        self.fitted = Some(forest);
        Ok(())
    }

    fn get_clusters(&self) -> Result<&[ClusterNode]> {
        Ok(&self.fitted()?.clusters)
    }

    fn cluster_instance(&self, record: &FeatureRecord) -> Result<usize> {
        let forest = self.fitted()?;
        let mut best: Option<(usize, f64)> = None;
        for (i, cluster) in forest.clusters.iter().enumerate() {
            let members: Vec<&FeatureRecord> = cluster.records().collect();
            let d = instance_distance(self.linkage, &self.metric, record, &members);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i).ok_or(Error::EmptyInput)
    }
}

/// Heap entry: a possibly stale candidate merge of slots `a < b`.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    a: usize,
    b: usize,
    size_a: usize,
    size_b: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Reversed so the max-heap pops the smallest distance.
    fn cmp(&self, other: &Self) -> Ordering {
        other.distance.total_cmp(&self.distance)
    }
}

/// Merge the closest live clusters until `target` remain.
fn link_clustering(
    state: &mut MergeState<'_>,
    ctx: &LinkageContext<'_>,
    linkage: Linkage,
    target: usize,
) -> Result<()> {
    let n = state.len();
    let mut queue = BinaryHeap::with_capacity(n * n.saturating_sub(1) / 2);
    for a in 0..n {
        for b in (a + 1)..n {
            queue.push(Candidate {
                distance: ctx.cluster_distance(linkage, &[a], &[b]),
                a,
                b,
                size_a: 1,
                size_b: 1,
            });
        }
    }

    let mut stale = 0usize;
    while state.live() > target {
        let next = loop {
            let c = queue
                .pop()
                .ok_or_else(|| Error::MergeFailed("candidate queue ran dry".into()))?;
            if state.size(c.a) == c.size_a && state.size(c.b) == c.size_b {
                break c;
            }
            stale += 1;
        };

        state.merge(next.a, next.b, next.distance, next.distance)?;

        for k in 0..n {
            if k == next.a || !state.is_live(k) {
                continue;
            }
            let (a, b) = (next.a.min(k), next.a.max(k));
            queue.push(Candidate {
                distance: ctx.cluster_distance(linkage, state.members(a), state.members(b)),
                a,
                b,
                size_a: state.size(a),
                size_b: state.size(b),
            });
        }
    }

    debug!(stale, pending = queue.len(), "discarded stale merge candidates");
    Ok(())
}
