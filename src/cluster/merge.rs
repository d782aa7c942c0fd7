//! Cluster membership and node bookkeeping shared by both agglomeration modes.

use tracing::trace;

use crate::error::{Error, Result};
use crate::features::FeatureSet;
use crate::hierarchy::{ClusterNode, MergeHistory};

/// Live clusters of one run, indexed by slot.
///
/// Slot `i` starts as the singleton `{i}`. Merging slots `a < b` moves every
/// member of `b` into `a` and leaves `b` empty, so a live slot's index is
/// always its lowest member. A slot gets a node only once it takes part in a
/// merge; untouched singletons are turned into leaves on demand.
pub(crate) struct MergeState<'a> {
    data: &'a FeatureSet,
    members: Vec<Vec<usize>>,
    nodes: Vec<Option<ClusterNode>>,
    branch_lengths: bool,
    live: usize,
    history: MergeHistory,
}

/// What a finished run hands back to the clusterer.
#[derive(Debug, Clone)]
pub(crate) struct Forest {
    pub(crate) clusters: Vec<ClusterNode>,
    pub(crate) labels: Vec<usize>,
    pub(crate) history: MergeHistory,
}

impl<'a> MergeState<'a> {
    pub(crate) fn new(data: &'a FeatureSet, branch_lengths: bool) -> Self {
        let n = data.len();
        Self {
            data,
            members: (0..n).map(|i| vec![i]).collect(),
            nodes: vec![None; n],
            branch_lengths,
            live: n,
            history: MergeHistory::new(n),
        }
    }

    /// Number of slots (live or not).
    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    /// Number of live clusters.
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    pub(crate) fn is_live(&self, slot: usize) -> bool {
        !self.members[slot].is_empty()
    }

    pub(crate) fn size(&self, slot: usize) -> usize {
        self.members[slot].len()
    }

    pub(crate) fn members(&self, slot: usize) -> &[usize] {
        &self.members[slot]
    }

    fn take_node(&mut self, slot: usize) -> ClusterNode {
        match self.nodes[slot].take() {
            Some(node) => node,
            None => ClusterNode::leaf(
                slot,
                FeatureSet::singleton(
                    self.data.shared_schema(),
                    self.data.records()[slot].clone(),
                ),
            ),
        }
    }

    /// Merge slots `a` and `b` with distances `d_a`, `d_b` for each side.
    ///
    /// In height mode the new node sits at `d_a` and each child's branch
    /// length is the gap to its own height. In branch-length mode the
    /// distances are the child branch lengths and the height accumulates
    /// along the left child.
    pub(crate) fn merge(&mut self, a: usize, b: usize, d_a: f64, d_b: f64) -> Result<()> {
        let (a, b, d_a, d_b) = if a > b { (b, a, d_b, d_a) } else { (a, b, d_a, d_b) };
        if a == b {
            return Err(Error::MergeFailed(format!("cannot merge slot {a} with itself")));
        }
        if b >= self.len() || !self.is_live(a) || !self.is_live(b) {
            return Err(Error::MergeFailed(format!("slot {a} or {b} is not a live cluster")));
        }

        let absorbed = std::mem::take(&mut self.members[b]);
        self.members[a].extend(absorbed);

        let mut left = self.take_node(a);
        let mut right = self.take_node(b);
        let height = if self.branch_lengths {
            left.set_length(d_a);
            right.set_length(d_b);
            d_a + left.height()
        } else {
            left.set_length(d_a - left.height());
            right.set_length(d_b - right.height());
            d_a
        };

        let size = self.members[a].len();
        trace!(a, b, height, size, "merged clusters");
        self.history.add_merge(a, b, height, size);
        self.nodes[a] = Some(ClusterNode::internal(vec![left, right], height));
        self.live -= 1;
        Ok(())
    }

    /// Final clusters in slot order, with a label per record.
    pub(crate) fn into_forest(mut self) -> Forest {
        let mut labels = vec![0; self.len()];
        let mut clusters = Vec::with_capacity(self.live);
        for slot in 0..self.len() {
            if !self.is_live(slot) {
                continue;
            }
            for &m in &self.members[slot] {
                labels[m] = clusters.len();
            }
            clusters.push(self.take_node(slot));
        }
        Forest {
            clusters,
            labels,
            history: self.history,
        }
    }
}
