//! Agglomerative clustering of feature records.
//!
//! Bottom-up: start with each record as its own cluster, repeatedly merge
//! the two closest clusters. What "closest" means is the [`Linkage`]:
//!
//! | Linkage | Cluster distance | Effect |
//! |---------|------------------|--------|
//! | Single | min d(a,b), a∈A, b∈B | Chaining; elongated clusters |
//! | Complete | max d(a,b) | Compact clusters |
//! | AdjustedComplete | Complete − max(diam A, diam B) | Favours merging already-wide clusters |
//! | Average | mean d(a,b) over cross pairs | Balanced compromise |
//! | Mean | mean d over all pairs of A ∪ B | Penalises loose unions |
//! | Centroid | d(c(A), c(B)) | Distance between representatives |
//! | Ward | ESS(A∪B)·\|A∪B\| − ESS(A)·\|A\| − ESS(B)·\|B\| | Minimal variance growth |
//! | NeighborJoining | separation-adjusted, see below | Additive trees |
//!
//! Centroids of mixed records take the weighted mean of each numeric value
//! and the medoid of each categorical value (the member value with the least
//! total edit distance to the others).
//!
//! ## Neighbor-joining
//!
//! Borrowed from phylogenetics. Instead of the raw distance it minimises
//! `d(a,b) − s(a) − s(b)`, where `s(x)` is the average distance from `x` to
//! everything else, and gives each side its own branch length. It ignores
//! the target cluster count and always produces a single tree.
//!
//! ## Output
//!
//! [`Agglomerator`] implements [`Clusterer`]. A build produces one root
//! [`ClusterNode`](crate::hierarchy::ClusterNode) per final cluster, a label
//! per record, and the [`MergeHistory`](crate::hierarchy::MergeHistory).

mod agglomerative;
mod linkage;
mod merge;
mod neighbor_joining;
mod traits;

pub use agglomerative::Agglomerator;
pub use linkage::Linkage;
pub use traits::Clusterer;
