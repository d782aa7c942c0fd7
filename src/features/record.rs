//! A single model's feature vector.

use serde::{Deserialize, Serialize};

/// Opaque handle back to the process model a record was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelRef(pub String);

impl std::fmt::Display for ModelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric and categorical values of one process model.
///
/// Missing numeric values are `f64::NAN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    weight: f64,
    numeric: Vec<f64>,
    categorical: Vec<String>,
    source: Option<ModelRef>,
}

impl FeatureRecord {
    /// Create a record with unit weight and no source reference.
    pub fn new(numeric: Vec<f64>, categorical: Vec<String>) -> Self {
        Self {
            weight: 1.0,
            numeric,
            categorical,
            source: None,
        }
    }

    /// Numeric-only record.
    pub fn numeric_only(numeric: Vec<f64>) -> Self {
        Self::new(numeric, Vec::new())
    }

    /// Categorical-only record.
    pub fn categorical_only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Vec::new(), values.into_iter().map(Into::into).collect())
    }

    /// Set the record weight. [`FeatureSet`](super::FeatureSet) only accepts
    /// finite, positive weights.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Attach the originating model.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(ModelRef(source.into()));
        self
    }

    /// Record weight (default 1).
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Numeric values, positional against the schema.
    pub fn numeric(&self) -> &[f64] {
        &self.numeric
    }

    /// Categorical values, positional against the schema.
    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    /// Originating model, if known.
    pub fn source(&self) -> Option<&ModelRef> {
        self.source.as_ref()
    }

    /// Concatenate the value arrays of two records.
    ///
    /// The result keeps `self`'s weight and source.
    pub fn merged(&self, other: &FeatureRecord) -> FeatureRecord {
        let mut numeric = self.numeric.clone();
        numeric.extend_from_slice(&other.numeric);
        let mut categorical = self.categorical.clone();
        categorical.extend(other.categorical.iter().cloned());
        FeatureRecord {
            weight: self.weight,
            numeric,
            categorical,
            source: self.source.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_concatenates() {
        let a = FeatureRecord::new(vec![1.0], vec!["x".into()]).with_source("m1");
        let b = FeatureRecord::new(vec![2.0, 3.0], vec!["y".into()]);
        let m = a.merged(&b);

        assert_eq!(m.numeric(), &[1.0, 2.0, 3.0]);
        assert_eq!(m.categorical(), &["x".to_string(), "y".to_string()]);
        assert_eq!(m.source(), Some(&ModelRef("m1".into())));
    }

    #[test]
    fn test_defaults() {
        let r = FeatureRecord::categorical_only(["a", "b"]);
        assert_eq!(r.weight(), 1.0);
        assert!(r.numeric().is_empty());
        assert!(r.source().is_none());
    }
}
