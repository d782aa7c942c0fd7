//! Flat merge log of an agglomeration run.
//!
//! Cluster slots are identified by the lowest record index they contain:
//! merging slots `a < b` keeps `a` alive and empties `b`.

/// The ordered merges performed by one clustering run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeHistory {
    merges: Vec<Merge>,
    n_items: usize,
}

/// A single merge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// Surviving slot.
    pub cluster_a: usize,
    /// Absorbed slot.
    pub cluster_b: usize,
    /// Height of the node created by the merge.
    pub distance: f64,
    /// Size of the merged cluster.
    pub size: usize,
}

impl MergeHistory {
    /// Empty history over `n_items` records.
    pub fn new(n_items: usize) -> Self {
        Self {
            merges: Vec::with_capacity(n_items.saturating_sub(1)),
            n_items,
        }
    }

    /// Record a merge.
    pub fn add_merge(&mut self, cluster_a: usize, cluster_b: usize, distance: f64, size: usize) {
        self.merges.push(Merge {
            cluster_a,
            cluster_b,
            distance,
            size,
        });
    }

    /// Number of clustered records.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of merges recorded.
    pub fn n_merges(&self) -> usize {
        self.merges.len()
    }

    /// Iterate over merges in the order performed.
    pub fn merges(&self) -> impl Iterator<Item = &Merge> {
        self.merges.iter()
    }

    /// Merge heights in order.
    pub fn distances(&self) -> Vec<f64> {
        self.merges.iter().map(|m| m.distance).collect()
    }

    /// True when no merge is lower than the one before it.
    pub fn is_monotonic(&self) -> bool {
        self.merges
            .windows(2)
            .all(|w| w[1].distance >= w[0].distance)
    }

    /// Cluster label per record after replaying the first `n - k` merges.
    ///
    /// Labels are numbered by first appearance in record order. `k` is
    /// clamped to `[1, n]`; if fewer merges were recorded than needed, every
    /// recorded merge is replayed.
    pub fn cut_to_k(&self, k: usize) -> Vec<usize> {
        let n = self.n_items;
        let k = k.clamp(1, n.max(1));
        let mut slot: Vec<usize> = (0..n).collect();

        for merge in self.merges.iter().take(n.saturating_sub(k)) {
            for s in slot.iter_mut() {
                if *s == merge.cluster_b {
                    *s = merge.cluster_a;
                }
            }
        }

        let mut seen: Vec<usize> = Vec::new();
        slot.iter()
            .map(|s| match seen.iter().position(|x| x == s) {
                Some(p) => p,
                None => {
                    seen.push(*s);
                    seen.len() - 1
                }
            })
            .collect()
    }
}
