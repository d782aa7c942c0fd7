//! Neighbor-joining agglomeration.
//!
//! Each step joins the pair minimising
//!
//! ```text
//! Q(a, b) = d(a, b) − s(a) − s(b),    s(x) = Σ_y d(x, y) / (r − 2)
//! ```
//!
//! where `r` is the number of live clusters. The joined cluster's distance to
//! every other cluster `k` becomes `(d(a, k) + d(b, k) − d(a, b)) / 2`, and the
//! two branch lengths split `d(a, b)` by the separation difference. Once two
//! clusters remain they are linked directly.
//!
//! Branch lengths are never negative. When the separation difference exceeds
//! `d(a, b)` the shorter side is set to zero and the other takes the whole
//! distance. Nodes always record branch lengths, so a node's height is the
//! cumulative length down its left spine.
//!
//! Each step scans all live pairs, so the whole run is O(n³).

use ndarray::Array2;
use tracing::debug;

use super::merge::MergeState;
use crate::error::{Error, Result};

/// Run neighbor-joining over `state` until one cluster remains.
///
/// `exhaustive` replaces the skip-list walk over live slots with a plain
/// double loop over all slots. Both pick the same pair.
pub(crate) fn neighbor_joining(
    state: &mut MergeState<'_>,
    distances: &Array2<f64>,
    exhaustive: bool,
) -> Result<()> {
    let n = state.len();
    let mut dist = distances.clone();
    let mut sep_sums: Vec<f64> = (0..n).map(|i| dist.row(i).sum()).collect();
    let mut seps: Vec<f64> = if n > 2 {
        sep_sums.iter().map(|s| s / (n - 2) as f64).collect()
    } else {
        vec![0.0; n]
    };
    // next_active[i] is the first live slot after i (n when none).
    let mut next_active: Vec<usize> = (1..=n).collect();

    while state.live() > 2 {
        let (a, b) = if exhaustive {
            closest_pair_exhaustive(state, &dist, &seps)
        } else {
            closest_pair(&dist, &seps, &next_active)
        }
        .ok_or_else(|| Error::MergeFailed("no joinable pair left".into()))?;

        let d_ab = dist[[a, b]];
        let (len_a, len_b) = split_branch(d_ab, seps[a], seps[b]);
        let remaining = state.live() - 1;

        // Row a becomes the joined cluster.
        let mut joined_sum = 0.0;
        for k in 0..n {
            if k == a || k == b || !state.is_live(k) {
                dist[[a, k]] = 0.0;
                continue;
            }
            let (d_ak, d_bk) = (dist[[a, k]], dist[[b, k]]);
            let d = (d_ak + d_bk - d_ab) / 2.0;
            joined_sum += d;
            sep_sums[k] += d - d_ak - d_bk;
            dist[[a, k]] = d;
            dist[[k, a]] = d;
        }
        sep_sums[a] = joined_sum;
        sep_sums[b] = 0.0;

        if remaining > 2 {
            let denom = (remaining - 2) as f64;
            for k in 0..n {
                if k != b && state.is_live(k) {
                    seps[k] = sep_sums[k] / denom;
                }
            }
        }

        state.merge(a, b, len_a, len_b)?;

        // Unlink b from the skip list; a < b so a live slot precedes it.
        let mut prev = b;
        while prev > 0 && !state.is_live(prev) {
            prev -= 1;
        }
        next_active[prev] = next_active[b];
    }

    link_remaining(state, &dist)?;
    debug!(records = n, exhaustive, "neighbor-joining finished");
    Ok(())
}

/// Join the last live clusters pairwise, each with its next live neighbour.
///
/// A singleton side gets the whole distance as its branch; two composite
/// clusters split it evenly.
fn link_remaining(state: &mut MergeState<'_>, dist: &Array2<f64>) -> Result<()> {
    let n = state.len();
    for i in 0..n {
        if !state.is_live(i) {
            continue;
        }
        let Some(j) = (i + 1..n).find(|&j| state.is_live(j)) else {
            continue;
        };
        let d = dist[[i, j]].max(0.0);
        if state.size(i) == 1 {
            state.merge(i, j, d, 0.0)?;
        } else if state.size(j) == 1 {
            state.merge(i, j, 0.0, d)?;
        } else {
            state.merge(i, j, d / 2.0, d / 2.0)?;
        }
    }
    Ok(())
}

/// Branch lengths of `a` and `b` for a join at `d_ab`, clamped to `[0, d_ab]`.
fn split_branch(d_ab: f64, sep_a: f64, sep_b: f64) -> (f64, f64) {
    let d = d_ab.max(0.0);
    let len_a = (0.5 * d + 0.5 * (sep_a - sep_b)).clamp(0.0, d);
    (len_a, d - len_a)
}

/// `Q(a, b)` for `a < b`.
fn join_score(dist: &Array2<f64>, seps: &[f64], a: usize, b: usize) -> f64 {
    dist[[a, b]] - seps[a] - seps[b]
}

/// Walk only live slots via the skip list. Always returns `a < b`.
fn closest_pair(dist: &Array2<f64>, seps: &[f64], next_active: &[usize]) -> Option<(usize, usize)> {
    let n = seps.len();
    let mut best: Option<(usize, usize)> = None;
    let mut best_q = f64::INFINITY;
    let mut i = 0;
    while i < n {
        let mut j = next_active[i];
        while j < n {
            let q = join_score(dist, seps, i, j);
            if q < best_q || best.is_none() {
                best_q = q;
                best = Some((i, j));
            }
            j = next_active[j];
        }
        i = next_active[i];
    }
    best
}

/// Scan every ordered pair of live slots.
fn closest_pair_exhaustive(
    state: &MergeState<'_>,
    dist: &Array2<f64>,
    seps: &[f64],
) -> Option<(usize, usize)> {
    let n = state.len();
    let mut best: Option<(usize, usize)> = None;
    let mut best_q = f64::INFINITY;
    for i in (0..n).filter(|&i| state.is_live(i)) {
        for j in (0..n).filter(|&j| j != i && state.is_live(j)) {
            let (lo, hi) = (i.min(j), i.max(j));
            let q = join_score(dist, seps, lo, hi);
            if q < best_q || best.is_none() {
                best_q = q;
                best = Some((lo, hi));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{pairwise_distances, DistanceMetric, NumericDistance};
    use crate::features::{FeatureRecord, FeatureSet, Schema};
    use crate::hierarchy::ClusterNode;

    fn run(values: &[f64], exhaustive: bool) -> Vec<ClusterNode> {
        let set = FeatureSet::from_records(
            Schema::new().numeric("x", 1.0),
            values
                .iter()
                .map(|&v| FeatureRecord::numeric_only(vec![v]))
                .collect(),
        )
        .unwrap();
        let metric = DistanceMetric::numeric(NumericDistance::unweighted(1));
        let distances = pairwise_distances(&metric, set.records());
        let mut state = MergeState::new(&set, true);
        neighbor_joining(&mut state, &distances, exhaustive).unwrap();
        state.into_forest().clusters
    }

    fn leaf_order(node: &ClusterNode) -> Vec<usize> {
        node.leaves().filter_map(ClusterNode::index).collect()
    }

    #[test]
    fn test_single_root_over_all_records() {
        let roots = run(&[0.0, 1.0, 5.0, 6.0, 20.0], false);
        assert_eq!(roots.len(), 1);
        let mut leaves = leaf_order(&roots[0]);
        leaves.sort_unstable();
        assert_eq!(leaves, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_exhaustive_search_matches_skip_list() {
        let values = [3.0, 0.5, 9.0, 4.0, 12.5, 7.0, 1.0];
        assert_eq!(run(&values, false), run(&values, true));
    }

    #[test]
    fn test_two_records_linked_directly() {
        let roots = run(&[2.0, 5.0], false);
        assert_eq!(roots.len(), 1);
        let root = &roots[0];
        assert_eq!(root.children()[0].length(), 3.0);
        assert_eq!(root.children()[1].length(), 0.0);
    }

    #[test]
    fn test_four_point_additive_tree() {
        // Additive distances from the tree ((0:1,1:2):1,(2:1,3:1)).
        let d = ndarray::arr2(&[
            [0.0, 3.0, 3.0, 3.0],
            [3.0, 0.0, 4.0, 4.0],
            [3.0, 4.0, 0.0, 2.0],
            [3.0, 4.0, 2.0, 0.0],
        ]);
        let set = FeatureSet::from_records(
            Schema::new().numeric("x", 1.0),
            (0..4).map(|i| FeatureRecord::numeric_only(vec![i as f64])).collect(),
        )
        .unwrap();
        let mut state = MergeState::new(&set, true);
        neighbor_joining(&mut state, &d, false).unwrap();
        let forest = state.into_forest();

        // Q(0, 1) = 3 − 4.5 − 5.5 ties Q(2, 3); the scan meets (0, 1) first.
        let first = forest.history.merges().next().copied().unwrap();
        assert_eq!((first.cluster_a, first.cluster_b), (0, 1));
        // Then all three remaining pairs score −6 and (0, 2) wins.
        let root = &forest.clusters[0];
        assert_eq!(leaf_order(root), [0, 1, 2, 3]);
        let pair = &root.children()[0].children()[0];
        assert_eq!(pair.children()[0].length(), 1.0);
        assert_eq!(pair.children()[1].length(), 2.0);
        assert_eq!(root.children()[1].length(), 1.0);
        assert_eq!(root.height(), 2.0);
    }

    #[test]
    fn test_split_branch_clamps_to_join_distance() {
        assert_eq!(split_branch(4.0, 3.0, 1.0), (3.0, 1.0));
        assert_eq!(split_branch(1.0, 5.0, 0.0), (1.0, 0.0));
        assert_eq!(split_branch(1.0, 0.0, 5.0), (0.0, 1.0));
        assert_eq!(split_branch(-0.5, 0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_uneven_separations_keep_lengths_non_negative() {
        let roots = run(&[0.0, 1.0, 5.0, 6.0, 20.0], false);
        let mut stack = vec![&roots[0]];
        while let Some(node) = stack.pop() {
            assert!(node.length() >= 0.0, "{}", roots[0].to_newick());
            stack.extend(node.children());
        }
    }
}
