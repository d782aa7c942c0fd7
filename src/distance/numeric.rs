//! Weighted Euclidean distance over numeric attributes.

use super::{weighted_norm, Distance};
use crate::error::{Error, Result};
use crate::features::{FeatureRecord, NumericRange};

/// Weighted, optionally min-max normalized Euclidean distance.
///
/// ```text
/// d(a, b) = sqrt(Σ wᵢ · (aᵢ − bᵢ)²) / mass
/// ```
///
/// where `mass` is `Σ wᵢ − 1` when `Σ wᵢ > 1`, else `Σ wᵢ`.
///
/// With ranges supplied, each value is first scaled to `(x − min) / (max − min)`.
/// Attributes whose range is degenerate (`max == min`) contribute nothing.
///
/// Missing values (`NaN`) are pushed to the far end of the scale: if one side
/// is missing the difference is `max(v, 1 − v)` for the present value `v`; if
/// both are missing it is 1.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericDistance {
    weights: Vec<f64>,
    ranges: Option<Vec<NumericRange>>,
}

impl NumericDistance {
    /// Unnormalized distance with the given attribute weights.
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            weights,
            ranges: None,
        }
    }

    /// Unnormalized distance with unit weights.
    pub fn unweighted(n_attributes: usize) -> Self {
        Self::new(vec![1.0; n_attributes])
    }

    /// Normalize with corpus-wide ranges, one per attribute.
    pub fn with_ranges(mut self, ranges: Vec<NumericRange>) -> Result<Self> {
        if ranges.len() != self.weights.len() {
            return Err(Error::InvalidParameter {
                name: "ranges",
                message: format!(
                    "expected {} ranges, got {}",
                    self.weights.len(),
                    ranges.len()
                ),
            });
        }
        for (i, range) in ranges.iter().enumerate() {
            if range.is_degenerate() {
                tracing::debug!(
                    attribute = i,
                    min = range.min,
                    max = range.max,
                    "degenerate range, attribute contributes zero"
                );
            }
        }
        self.ranges = Some(ranges);
        Ok(self)
    }

    /// Attribute weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// True when min-max normalization is active.
    pub fn is_normalized(&self) -> bool {
        self.ranges.is_some()
    }

    fn scale(&self, index: usize, value: f64) -> f64 {
        match &self.ranges {
            Some(ranges) => {
                let range = ranges[index];
                if range.is_degenerate() {
                    0.0
                } else {
                    (value - range.min) / range.span()
                }
            }
            None => value,
        }
    }

    fn difference(&self, index: usize, a: f64, b: f64) -> f64 {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => 1.0,
            (true, false) | (false, true) => {
                let present = if a.is_nan() { b } else { a };
                let v = self.scale(index, present);
                v.max(1.0 - v)
            }
            (false, false) => match &self.ranges {
                Some(ranges) if ranges[index].is_degenerate() => 0.0,
                _ => self.scale(index, a) - self.scale(index, b),
            },
        }
    }
}

impl Distance for NumericDistance {
    fn distance(&self, a: &FeatureRecord, b: &FeatureRecord) -> f64 {
        let mut sum = 0.0;
        let mut mass = 0.0;
        for (i, &w) in self.weights.iter().enumerate() {
            let diff = self.difference(i, a.numeric()[i], b.numeric()[i]);
            sum += w * diff * diff;
            mass += w;
        }
        weighted_norm(sum, mass)
    }
}
