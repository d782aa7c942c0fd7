//! Linkage rules: distance between two clusters of records.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::distance::{Distance, DistanceMetric};
use crate::features::FeatureRecord;

/// Linkage method for hierarchical clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    /// Minimum distance over cross-cluster pairs.
    #[default]
    Single,
    /// Maximum distance over cross-cluster pairs.
    Complete,
    /// Mean distance over cross-cluster pairs.
    Average,
    /// Mean distance over all pairs of the union, same-cluster pairs included.
    Mean,
    /// Distance between the two cluster centroids.
    Centroid,
    /// Increase in within-cluster sum of squares caused by the merge.
    Ward,
    /// Complete linkage minus the larger intra-cluster diameter.
    AdjustedComplete,
    /// Separation-adjusted neighbor-joining; runs its own O(n³) pass.
    NeighborJoining,
}

/// Read-only inputs shared by every linkage computation of one run.
pub(crate) struct LinkageContext<'a> {
    pub(crate) records: &'a [FeatureRecord],
    pub(crate) distances: &'a Array2<f64>,
    pub(crate) metric: &'a DistanceMetric,
}

impl LinkageContext<'_> {
    /// Linkage distance between clusters `a` and `b` (record indices).
    pub(crate) fn cluster_distance(&self, linkage: Linkage, a: &[usize], b: &[usize]) -> f64 {
        match linkage {
            Linkage::Single => self.fold_cross(a, b, f64::INFINITY, f64::min),
            Linkage::Complete => self.fold_cross(a, b, f64::NEG_INFINITY, f64::max),
            Linkage::AdjustedComplete => {
                let complete = self.fold_cross(a, b, f64::NEG_INFINITY, f64::max);
                complete - self.diameter(a).max(self.diameter(b))
            }
            Linkage::Average | Linkage::NeighborJoining => {
                self.fold_cross(a, b, 0.0, |s, d| s + d) / (a.len() * b.len()) as f64
            }
            Linkage::Mean => {
                let union: Vec<usize> = a.iter().chain(b).copied().collect();
                let n = union.len();
                if n < 2 {
                    return 0.0;
                }
                let mut sum = 0.0;
                for (k, &i) in union.iter().enumerate() {
                    for &j in &union[k + 1..] {
                        sum += self.distances[[i, j]];
                    }
                }
                sum / (n * (n - 1) / 2) as f64
            }
            Linkage::Centroid => {
                let ca = self.centroid(a);
                let cb = self.centroid(b);
                self.metric.distance(&ca, &cb)
            }
            Linkage::Ward => {
                let union: Vec<usize> = a.iter().chain(b).copied().collect();
                self.ess(&union) * union.len() as f64
                    - self.ess(a) * a.len() as f64
                    - self.ess(b) * b.len() as f64
            }
        }
    }

    fn fold_cross(&self, a: &[usize], b: &[usize], init: f64, f: impl Fn(f64, f64) -> f64) -> f64 {
        let mut acc = init;
        for &i in a {
            for &j in b {
                acc = f(acc, self.distances[[i, j]]);
            }
        }
        acc
    }

    /// Largest pairwise distance inside one cluster (0 for singletons).
    fn diameter(&self, members: &[usize]) -> f64 {
        let mut max = 0.0f64;
        for (k, &i) in members.iter().enumerate() {
            for &j in &members[k + 1..] {
                max = max.max(self.distances[[i, j]]);
            }
        }
        max
    }

    fn centroid(&self, members: &[usize]) -> FeatureRecord {
        let records: Vec<&FeatureRecord> = members.iter().map(|&i| &self.records[i]).collect();
        centroid(self.metric, &records)
    }

    /// Mean squared distance of the members to their centroid.
    fn ess(&self, members: &[usize]) -> f64 {
        if members.len() < 2 {
            return 0.0;
        }
        let c = self.centroid(members);
        let total: f64 = members
            .iter()
            .map(|&i| {
                let d = self.metric.distance(&c, &self.records[i]);
                d * d
            })
            .sum();
        total / members.len() as f64
    }
}

/// Synthetic record representing a cluster.
///
/// Numeric values are the record-weighted mean of the present values (NaN
/// when none is present). Each categorical value is the member value with the
/// smallest total record-weighted edit distance to the other members; ties
/// keep the earliest member.
pub(crate) fn centroid(metric: &DistanceMetric, members: &[&FeatureRecord]) -> FeatureRecord {
    let Some(first) = members.first() else {
        return FeatureRecord::new(Vec::new(), Vec::new());
    };

    let numeric = (0..first.numeric().len())
        .map(|a| {
            let (sum, weight) = members
                .iter()
                .map(|r| (r.numeric()[a], r.weight()))
                .filter(|(v, _)| !v.is_nan())
                .fold((0.0, 0.0), |(s, w), (v, rw)| (s + v * rw, w + rw));
            if weight > 0.0 {
                sum / weight
            } else {
                f64::NAN
            }
        })
        .collect();

    let categorical = (0..first.categorical().len())
        .map(|a| {
            let mut best = &first.categorical()[a];
            let mut best_cost = f64::INFINITY;
            for candidate in members.iter().map(|r| &r.categorical()[a]) {
                let cost: f64 = members
                    .iter()
                    .map(|other| other.weight() * metric.value_distance(candidate, &other.categorical()[a]))
                    .sum();
                if cost < best_cost {
                    best_cost = cost;
                    best = candidate;
                }
            }
            best.clone()
        })
        .collect();

    FeatureRecord::new(numeric, categorical)
}

/// Linkage distance between a single unseen record and a cluster.
pub(crate) fn instance_distance(
    linkage: Linkage,
    metric: &DistanceMetric,
    record: &FeatureRecord,
    members: &[&FeatureRecord],
) -> f64 {
    let to_members = members.iter().map(|m| metric.distance(record, m));
    match linkage {
        Linkage::Single => to_members.fold(f64::INFINITY, f64::min),
        Linkage::Complete | Linkage::AdjustedComplete => {
            to_members.fold(f64::NEG_INFINITY, f64::max)
        }
        Linkage::Average | Linkage::Mean | Linkage::NeighborJoining => {
            let n = members.len().max(1);
            to_members.sum::<f64>() / n as f64
        }
        Linkage::Centroid | Linkage::Ward => metric.distance(record, &centroid(metric, members)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{pairwise_distances, CategoricalDistance, NumericDistance};

    fn numeric_records(values: &[f64]) -> Vec<FeatureRecord> {
        values
            .iter()
            .map(|&v| FeatureRecord::numeric_only(vec![v]))
            .collect()
    }

    fn with_ctx<R>(values: &[f64], f: impl FnOnce(&LinkageContext<'_>) -> R) -> R {
        let metric = DistanceMetric::numeric(NumericDistance::unweighted(1));
        let records = numeric_records(values);
        let distances = pairwise_distances(&metric, &records);
        let ctx = LinkageContext {
            records: &records,
            distances: &distances,
            metric: &metric,
        };
        f(&ctx)
    }

    #[test]
    fn test_basic_linkages() {
        // a = {0, 1}, b = {4, 6}
        with_ctx(&[0.0, 1.0, 4.0, 6.0], |ctx| {
            let (a, b) = (&[0, 1][..], &[2, 3][..]);
            assert_eq!(ctx.cluster_distance(Linkage::Single, a, b), 3.0);
            assert_eq!(ctx.cluster_distance(Linkage::Complete, a, b), 6.0);
            assert_eq!(ctx.cluster_distance(Linkage::Average, a, b), (4.0 + 6.0 + 3.0 + 5.0) / 4.0);
            // diameters 1 and 2
            assert_eq!(ctx.cluster_distance(Linkage::AdjustedComplete, a, b), 4.0);
            // all six pairs: 1 4 6 3 5 2
            assert_eq!(ctx.cluster_distance(Linkage::Mean, a, b), 21.0 / 6.0);
            // centroids 0.5 and 5
            assert_eq!(ctx.cluster_distance(Linkage::Centroid, a, b), 4.5);
        });
    }

    #[test]
    fn test_ward_matches_closed_form() {
        // Δ = (na·nb)/(na+nb) · |μa − μb|² for squared Euclidean ESS.
        with_ctx(&[0.0, 2.0, 10.0], |ctx| {
            let ward = ctx.cluster_distance(Linkage::Ward, &[0, 1], &[2]);
            let expected = (2.0 * 1.0) / 3.0 * (1.0f64 - 10.0).powi(2);
            assert!((ward - expected).abs() < 1e-9, "{ward} vs {expected}");
        });
    }

    #[test]
    fn test_singleton_linkages_reduce_to_record_distance() {
        with_ctx(&[1.0, 4.0], |ctx| {
            for linkage in [
                Linkage::Single,
                Linkage::Complete,
                Linkage::Average,
                Linkage::Mean,
                Linkage::Centroid,
                Linkage::AdjustedComplete,
            ] {
                assert_eq!(ctx.cluster_distance(linkage, &[0], &[1]), 3.0, "{linkage:?}");
            }
        });
    }

    #[test]
    fn test_categorical_centroid_is_medoid() {
        let metric = DistanceMetric::categorical(
            CategoricalDistance::unweighted(1).with_normalize(false),
        );
        // total edits: abc 1+2, abd 1+1, xbd 2+1
        let records: Vec<FeatureRecord> = ["abc", "abd", "xbd"]
            .iter()
            .map(|s| FeatureRecord::categorical_only([*s]))
            .collect();
        let refs: Vec<&FeatureRecord> = records.iter().collect();
        let c = centroid(&metric, &refs);
        assert_eq!(c.categorical(), &["abd".to_string()]);
    }

    #[test]
    fn test_numeric_centroid_weighted_and_missing() {
        let metric = DistanceMetric::numeric(NumericDistance::unweighted(2));
        let a = FeatureRecord::numeric_only(vec![0.0, f64::NAN]).with_weight(3.0);
        let b = FeatureRecord::numeric_only(vec![4.0, f64::NAN]);
        let c = centroid(&metric, &[&a, &b]);
        assert_eq!(c.numeric()[0], 1.0);
        assert!(c.numeric()[1].is_nan());
    }

    #[test]
    fn test_instance_distance() {
        let metric = DistanceMetric::numeric(NumericDistance::unweighted(1));
        let members = numeric_records(&[2.0, 4.0]);
        let refs: Vec<&FeatureRecord> = members.iter().collect();
        let x = FeatureRecord::numeric_only(vec![0.0]);

        assert_eq!(instance_distance(Linkage::Single, &metric, &x, &refs), 2.0);
        assert_eq!(instance_distance(Linkage::Complete, &metric, &x, &refs), 4.0);
        assert_eq!(instance_distance(Linkage::Average, &metric, &x, &refs), 3.0);
        assert_eq!(instance_distance(Linkage::Ward, &metric, &x, &refs), 3.0);
    }
}
