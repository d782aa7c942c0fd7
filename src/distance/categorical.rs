//! Weighted edit distance over categorical attributes.

use super::{weighted_norm, Distance};
use crate::config::EditCosts;
use crate::features::FeatureRecord;

/// Per-attribute Levenshtein distance, aggregated like the numeric metric.
///
/// Each attribute's edit distance is divided by the longer string's length
/// (in characters) unless normalization is off. Two empty strings are at
/// distance 0.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalDistance {
    weights: Vec<f64>,
    normalize: bool,
    costs: EditCosts,
}

impl CategoricalDistance {
    /// Length-normalized distance with unit edit costs.
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            weights,
            normalize: true,
            costs: EditCosts::default(),
        }
    }

    /// Unit weights for `n_attributes` attributes.
    pub fn unweighted(n_attributes: usize) -> Self {
        Self::new(vec![1.0; n_attributes])
    }

    /// Enable or disable length normalization.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set edit operation costs.
    pub fn with_costs(mut self, costs: EditCosts) -> Self {
        self.costs = costs;
        self
    }

    /// Attribute weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Distance between two values of one attribute, before weighting.
    pub fn value_distance(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let edits = levenshtein(&a, &b, &self.costs);
        if !self.normalize {
            return edits;
        }
        let longest = a.len().max(b.len());
        if longest == 0 {
            0.0
        } else {
            edits / longest as f64
        }
    }
}

impl Distance for CategoricalDistance {
    fn distance(&self, a: &FeatureRecord, b: &FeatureRecord) -> f64 {
        let mut sum = 0.0;
        let mut mass = 0.0;
        for (i, &w) in self.weights.iter().enumerate() {
            let diff = self.value_distance(&a.categorical()[i], &b.categorical()[i]);
            sum += w * diff * diff;
            mass += w;
        }
        weighted_norm(sum, mass)
    }
}

/// Weighted Levenshtein distance, two-row dynamic programme.
fn levenshtein(a: &[char], b: &[char], costs: &EditCosts) -> f64 {
    let mut prev: Vec<f64> = (0..=b.len()).map(|j| j as f64 * costs.insert).collect();
    let mut curr = vec![0.0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = (i + 1) as f64 * costs.delete;
        for (j, cb) in b.iter().enumerate() {
            let substitute = if ca == cb {
                prev[j]
            } else {
                prev[j] + costs.substitute
            };
            let delete = prev[j + 1] + costs.delete;
            let insert = curr[j] + costs.insert;
            curr[j + 1] = substitute.min(delete).min(insert);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
