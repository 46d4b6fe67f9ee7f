use foundation::geo::LatLng;
use serde_json::Value;

/// An indexable point feature derived from one input child.
///
/// Created on each rebuild and immutable once indexed. `stable_key` is unique
/// within one input generation (explicit key, else identifier, else a
/// positional fallback).
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    pub coordinate: LatLng,
    /// Position in the original input list.
    pub index: usize,
    pub stable_key: String,
    /// Opaque caller-supplied properties, carried through untouched.
    pub props: Value,
}

/// One entry of a cluster query result.
///
/// Clusters are identified by `cluster_id`, leaves by `index`; result
/// ordering is index-defined and not part of any contract.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterOrPoint {
    Cluster {
        cluster_id: u64,
        /// Number of leaves under this cluster, always > 1.
        count: usize,
        center: LatLng,
    },
    Point {
        /// Position of the leaf in the original input list.
        index: usize,
        stable_key: String,
        center: LatLng,
    },
}

impl ClusterOrPoint {
    pub fn center(&self) -> LatLng {
        match self {
            ClusterOrPoint::Cluster { center, .. } => *center,
            ClusterOrPoint::Point { center, .. } => *center,
        }
    }

    /// Leaf count for clusters, 0 for leaves.
    pub fn point_count(&self) -> usize {
        match self {
            ClusterOrPoint::Cluster { count, .. } => *count,
            ClusterOrPoint::Point { .. } => 0,
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, ClusterOrPoint::Cluster { .. })
    }
}
