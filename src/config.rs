//! Per-run configuration passed in by the orchestrating pipeline.
//!
//! A fresh [`ClusterConfig`] describes one clustering run: which linkage to
//! use, how many clusters to stop at, and how record distances are measured.
//! Nothing here is global; two runs with different configs never interact.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cluster::Linkage;

/// Which distance sub-metrics contribute to the record distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveMetrics {
    /// Numeric attributes only.
    Numeric,
    /// Categorical attributes only.
    Categorical,
    /// Mean of the numeric and categorical distances.
    #[default]
    Both,
}

impl ActiveMetrics {
    /// True when the numeric sub-metric is used.
    pub fn numeric(self) -> bool {
        matches!(self, Self::Numeric | Self::Both)
    }

    /// True when the categorical sub-metric is used.
    pub fn categorical(self) -> bool {
        matches!(self, Self::Categorical | Self::Both)
    }
}

/// Costs of the three edit operations in the categorical distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditCosts {
    /// Cost of inserting one character.
    pub insert: f64,
    /// Cost of deleting one character.
    pub delete: f64,
    /// Cost of replacing one character with another.
    pub substitute: f64,
}

impl Default for EditCosts {
    fn default() -> Self {
        Self {
            insert: 1.0,
            delete: 1.0,
            substitute: 1.0,
        }
    }
}

/// How record distances are measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    /// Active sub-metrics.
    pub active: ActiveMetrics,
    /// Min-max normalize numeric values and length-normalize edit distances.
    pub normalize: bool,
    /// Edit operation costs for categorical values.
    pub edit_costs: EditCosts,
    /// Weight overrides keyed by attribute name.
    pub weights: BTreeMap<String, f64>,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            active: ActiveMetrics::Both,
            normalize: true,
            edit_costs: EditCosts::default(),
            weights: BTreeMap::new(),
        }
    }
}

impl DistanceConfig {
    /// Create the default distance configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set active sub-metrics.
    pub fn with_active(mut self, active: ActiveMetrics) -> Self {
        self.active = active;
        self
    }

    /// Enable or disable normalization.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set edit operation costs.
    pub fn with_edit_costs(mut self, costs: EditCosts) -> Self {
        self.edit_costs = costs;
        self
    }

    /// Override one attribute's weight.
    pub fn with_weight(mut self, attribute: impl Into<String>, weight: f64) -> Self {
        let _ = self.weights.insert(attribute.into(), weight);
        self
    }
}

/// Configuration of one clustering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Linkage rule.
    pub linkage: Linkage,
    /// Number of clusters to stop at (clamped to at least 1).
    pub n_clusters: usize,
    /// Interpret merge distances as branch lengths instead of heights.
    pub distance_is_branch_length: bool,
    /// Use the exhaustive pair search in neighbor-joining.
    pub debug: bool,
    /// Record distance settings.
    pub distance: DistanceConfig,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            linkage: Linkage::Single,
            n_clusters: 2,
            distance_is_branch_length: false,
            debug: false,
            distance: DistanceConfig::default(),
        }
    }
}

impl ClusterConfig {
    /// Create a configuration targeting `n_clusters` clusters.
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters: n_clusters.max(1),
            ..Self::default()
        }
    }

    /// Set the linkage rule.
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Set the target cluster count (clamped to at least 1).
    pub fn with_n_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters.max(1);
        self
    }

    /// Record branch lengths instead of heights.
    pub fn with_distance_is_branch_length(mut self, on: bool) -> Self {
        self.distance_is_branch_length = on;
        self
    }

    /// Toggle the exhaustive neighbor-joining pair search.
    pub fn with_debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    /// Set the distance configuration.
    pub fn with_distance(mut self, distance: DistanceConfig) -> Self {
        self.distance = distance;
        self
    }
}
