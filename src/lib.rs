//! # grove
//!
//! Hierarchical clustering of business process models.
//!
//! Each model is reduced upstream to a [`FeatureRecord`]: numeric metrics
//! (node counts, path lengths, ...) and categorical labels (titles, lane
//! names, ...). A [`FeatureSet`] of records goes through an [`Agglomerator`],
//! which uses a [`DistanceMetric`] over both kinds of value and produces a
//! forest of [`ClusterNode`]s. A [`ClusterNamer`] then labels every node with
//! the numeric ranges and dominant words beneath it.
//!
//! ```rust,ignore
//! use grove::{Agglomerator, ClusterConfig, ClusterNamer, Clusterer, Linkage};
//!
//! let config = ClusterConfig::new(4).with_linkage(Linkage::Average);
//! let mut agg = Agglomerator::from_config(&config, &features)?;
//! agg.build_clusterer(&features)?;
//!
//! let mut tree = agg.tree().expect("non-empty input");
//! ClusterNamer::new(features.schema()).name_tree(&mut tree);
//! for cluster in tree.subtree_with_min_cluster_size(5).nodes_at_level(0) {
//!     println!("{}", cluster.names());
//! }
//! ```
//!
//! Everything runs in memory on the calling thread. The library emits
//! `tracing` events but never installs a subscriber.

#![forbid(unsafe_code)]

pub mod cluster;
pub mod config;
pub mod distance;
/// Error types used across `grove`.
pub mod error;
pub mod features;
pub mod hierarchy;
pub mod summarize;

pub use cluster::{Agglomerator, Clusterer, Linkage};
pub use config::{ActiveMetrics, ClusterConfig, DistanceConfig, EditCosts};
pub use distance::{
    pairwise_distances, CategoricalDistance, Distance, DistanceMetric, NumericDistance,
};
pub use error::{Error, Result};
pub use features::{Attribute, AttributeKind, FeatureRecord, FeatureSet, ModelRef, NumericRange, Schema};
pub use hierarchy::{ClusterNode, ClusterTree, HealthCheck, MergeHistory};
pub use summarize::{ClusterNamer, NameMap, NameSummary, Summarizer};
