//! Record distances over mixed numeric and categorical features.
//!
//! # Sub-metrics
//!
//! | Metric | Per-attribute difference | Normalization |
//! |--------|--------------------------|---------------|
//! | [`NumericDistance`] | `aᵢ − bᵢ` | min-max over the corpus |
//! | [`CategoricalDistance`] | weighted Levenshtein | longer string length |
//!
//! Both aggregate the same way: weighted sum of squares, square root, then
//! division by the weight mass:
//!
//! ```text
//! d = sqrt(Σ wᵢ · diffᵢ²) / mass
//! mass = Σ wᵢ − 1   if Σ wᵢ > 1
//!        Σ wᵢ       otherwise
//! ```
//!
//! The `− 1` is an inherited quirk of the weighting scheme and is kept as is.
//!
//! # Combination
//!
//! [`DistanceMetric`] holds one or both sub-metrics. With both, the record
//! distance is their arithmetic mean; with one, that one alone.
//!
//! Record arrays are assumed to match the schema. That is checked when
//! records enter a [`FeatureSet`](crate::FeatureSet), never per call.

mod categorical;
mod numeric;

use ndarray::Array2;

pub use categorical::CategoricalDistance;
pub use numeric::NumericDistance;

use crate::config::DistanceConfig;
use crate::error::{Error, Result};
use crate::features::{FeatureRecord, NumericRange, Schema};

/// A non-negative distance between two feature records.
pub trait Distance {
    /// Distance between `a` and `b`.
    fn distance(&self, a: &FeatureRecord, b: &FeatureRecord) -> f64;
}

/// Weighted root-sum-square with the mass normalization described above.
#[inline]
pub(crate) fn weighted_norm(sum_sq: f64, mass: f64) -> f64 {
    if mass <= 0.0 {
        return 0.0;
    }
    let root = sum_sq.max(0.0).sqrt();
    if mass > 1.0 {
        root / (mass - 1.0)
    } else {
        root / mass
    }
}

/// Which sub-metrics a [`DistanceMetric`] combines.
#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Numeric(NumericDistance),
    Categorical(CategoricalDistance),
    Combined(NumericDistance, CategoricalDistance),
}

/// Numeric, categorical, or combined record distance.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMetric {
    mode: Mode,
}

impl DistanceMetric {
    /// Build from optional sub-metrics. At least one must be present.
    pub fn new(
        numeric: Option<NumericDistance>,
        categorical: Option<CategoricalDistance>,
    ) -> Result<Self> {
        let mode = match (numeric, categorical) {
            (Some(n), Some(c)) => Mode::Combined(n, c),
            (Some(n), None) => Mode::Numeric(n),
            (None, Some(c)) => Mode::Categorical(c),
            (None, None) => return Err(Error::NoDistanceMetric),
        };
        Ok(Self { mode })
    }

    /// Numeric sub-metric only.
    pub fn numeric(metric: NumericDistance) -> Self {
        Self {
            mode: Mode::Numeric(metric),
        }
    }

    /// Categorical sub-metric only.
    pub fn categorical(metric: CategoricalDistance) -> Self {
        Self {
            mode: Mode::Categorical(metric),
        }
    }

    /// Mean of both sub-metrics.
    pub fn combined(numeric: NumericDistance, categorical: CategoricalDistance) -> Self {
        Self {
            mode: Mode::Combined(numeric, categorical),
        }
    }

    /// Build the metric a run's configuration asks for.
    ///
    /// Weights come from the schema unless overridden by name in `config`.
    /// `ranges` are only used when `config.normalize` is set; pass the
    /// corpus-wide ranges from [`FeatureSet::numeric_ranges`](crate::FeatureSet::numeric_ranges).
    pub fn from_config(
        schema: &Schema,
        config: &DistanceConfig,
        ranges: Option<Vec<NumericRange>>,
    ) -> Result<Self> {
        let weight = |name: &str, default: f64| -> Result<f64> {
            let w = config.weights.get(name).copied().unwrap_or(default);
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidParameter {
                    name: "weights",
                    message: format!("attribute '{name}' has weight {w}"),
                });
            }
            Ok(w)
        };

        let numeric = if config.active.numeric() && schema.numeric_len() > 0 {
            let weights = schema
                .numeric_attributes()
                .iter()
                .map(|a| weight(a.name(), a.weight()))
                .collect::<Result<Vec<_>>>()?;
            let metric = NumericDistance::new(weights);
            Some(match (config.normalize, ranges) {
                (true, Some(ranges)) => metric.with_ranges(ranges)?,
                _ => metric,
            })
        } else {
            None
        };

        let categorical = if config.active.categorical() && schema.categorical_len() > 0 {
            let weights = schema
                .categorical_attributes()
                .iter()
                .map(|a| weight(a.name(), a.weight()))
                .collect::<Result<Vec<_>>>()?;
            Some(
                CategoricalDistance::new(weights)
                    .with_normalize(config.normalize)
                    .with_costs(config.edit_costs),
            )
        } else {
            None
        };

        Self::new(numeric, categorical)
    }

    /// The numeric sub-metric, if active.
    pub fn numeric_part(&self) -> Option<&NumericDistance> {
        match &self.mode {
            Mode::Numeric(n) | Mode::Combined(n, _) => Some(n),
            Mode::Categorical(_) => None,
        }
    }

    /// The categorical sub-metric, if active.
    pub fn categorical_part(&self) -> Option<&CategoricalDistance> {
        match &self.mode {
            Mode::Categorical(c) | Mode::Combined(_, c) => Some(c),
            Mode::Numeric(_) => None,
        }
    }

    /// Unweighted distance between two values of one categorical attribute.
    ///
    /// Falls back to length-normalized unit-cost edit distance when the
    /// categorical sub-metric is inactive.
    pub fn value_distance(&self, a: &str, b: &str) -> f64 {
        match self.categorical_part() {
            Some(c) => c.value_distance(a, b),
            None => CategoricalDistance::unweighted(0).value_distance(a, b),
        }
    }
}

impl Distance for DistanceMetric {
    fn distance(&self, a: &FeatureRecord, b: &FeatureRecord) -> f64 {
        match &self.mode {
            Mode::Numeric(n) => n.distance(a, b),
            Mode::Categorical(c) => c.distance(a, b),
            Mode::Combined(n, c) => 0.5 * (n.distance(a, b) + c.distance(a, b)),
        }
    }
}

/// Symmetric matrix of all pairwise record distances, zero diagonal.
pub fn pairwise_distances<D: Distance + ?Sized>(
    metric: &D,
    records: &[FeatureRecord],
) -> Array2<f64> {
    let n = records.len();
    let mut matrix = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = metric.distance(&records[i], &records[j]);
            matrix[[i, j]] = d;
            matrix[[j, i]] = d;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActiveMetrics;

    fn mixed_schema() -> Schema {
        Schema::new()
            .numeric("nodes", 1.0)
            .categorical("title", 1.0)
    }

    #[test]
    fn test_combined_is_mean() {
        let metric = DistanceMetric::combined(
            NumericDistance::unweighted(1),
            CategoricalDistance::unweighted(1),
        );
        let a = FeatureRecord::new(vec![0.0], vec!["ab".into()]);
        let b = FeatureRecord::new(vec![2.0], vec!["ab".into()]);
        assert!((metric.distance(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_new_requires_a_sub_metric() {
        assert_eq!(DistanceMetric::new(None, None), Err(Error::NoDistanceMetric));
        let m = DistanceMetric::new(Some(NumericDistance::unweighted(1)), None).unwrap();
        assert!(m.numeric_part().is_some());
        assert!(m.categorical_part().is_none());
    }

    #[test]
    fn test_from_config_weight_override() {
        let config = DistanceConfig::new()
            .with_active(ActiveMetrics::Numeric)
            .with_normalize(false)
            .with_weight("nodes", 0.25);
        let metric = DistanceMetric::from_config(&mixed_schema(), &config, None).unwrap();

        assert_eq!(metric.numeric_part().unwrap().weights(), &[0.25]);
        assert!(metric.categorical_part().is_none());
    }

    #[test]
    fn test_from_config_rejects_bad_override() {
        let config = DistanceConfig::new().with_weight("title", f64::NAN);
        assert!(DistanceMetric::from_config(&mixed_schema(), &config, None).is_err());
    }

    #[test]
    fn test_from_config_normalizes_with_ranges() {
        let config = DistanceConfig::new();
        let metric = DistanceMetric::from_config(
            &mixed_schema(),
            &config,
            Some(vec![NumericRange::new(0.0, 4.0)]),
        )
        .unwrap();
        assert!(metric.numeric_part().unwrap().is_normalized());
    }

    #[test]
    fn test_from_config_without_matching_attributes() {
        let schema = Schema::new().numeric("nodes", 1.0);
        let config = DistanceConfig::new().with_active(ActiveMetrics::Categorical);
        assert_eq!(
            DistanceMetric::from_config(&schema, &config, None),
            Err(Error::NoDistanceMetric)
        );
    }

    #[test]
    fn test_pairwise_symmetric_zero_diagonal() {
        let metric = DistanceMetric::numeric(NumericDistance::unweighted(1));
        let records: Vec<_> = [1.0, 4.0, 9.0]
            .iter()
            .map(|&v| FeatureRecord::numeric_only(vec![v]))
            .collect();
        let m = pairwise_distances(&metric, &records);

        assert_eq!(m.dim(), (3, 3));
        for i in 0..3 {
            assert_eq!(m[[i, i]], 0.0);
            for j in 0..3 {
                assert_eq!(m[[i, j]], m[[j, i]]);
            }
        }
        assert_eq!(m[[0, 2]], 8.0);
    }

    #[test]
    fn test_weighted_norm() {
        assert_eq!(weighted_norm(4.0, 1.0), 2.0);
        assert_eq!(weighted_norm(4.0, 3.0), 1.0);
        assert_eq!(weighted_norm(4.0, 0.0), 0.0);
    }
}
