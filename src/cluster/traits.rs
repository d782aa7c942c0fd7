//! Clustering traits.

use crate::error::Result;
use crate::features::{FeatureRecord, FeatureSet};
use crate::hierarchy::ClusterNode;

/// A clusterer built once over a feature set, then queried.
pub trait Clusterer {
    /// Cluster every record of `data`, replacing any earlier result.
    ///
    /// An empty set is not an error: the result simply has no clusters.
    fn build_clusterer(&mut self, data: &FeatureSet) -> Result<()>;

    /// Root node of each final cluster.
    fn get_clusters(&self) -> Result<&[ClusterNode]>;

    /// Index of the final cluster an unseen record belongs to.
    fn cluster_instance(&self, record: &FeatureRecord) -> Result<usize>;

    /// Number of final clusters.
    fn number_of_clusters(&self) -> Result<usize> {
        Ok(self.get_clusters()?.len())
    }
}
