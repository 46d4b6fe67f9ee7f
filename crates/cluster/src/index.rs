use std::sync::Arc;

use foundation::bounds::GeoBbox;

use crate::feature::{ClusterOrPoint, PointFeature};

/// Tuning parameters handed to an index build.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexParams {
    /// Neighbor-merge radius in extent units.
    pub radius: f64,
    /// Tile extent the radius is expressed against.
    pub extent: f64,
    /// Minimum leaves required to form a cluster.
    pub min_points: usize,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Tree node size, for implementations that tune on it.
    pub node_size: usize,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            radius: 40.0,
            extent: 512.0,
            min_points: 2,
            min_zoom: 1,
            max_zoom: 17,
            node_size: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// A feature projected to a non-finite position.
    InvalidFeature { index: usize },
    /// The configured zoom range cannot be encoded in cluster ids.
    ZoomRange { max_zoom: u8 },
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::InvalidFeature { index } => {
                write!(f, "feature {index} projected to a non-finite position")
            }
            IndexError::ZoomRange { max_zoom } => {
                write!(f, "max zoom {max_zoom} does not fit the cluster id encoding")
            }
        }
    }
}

impl std::error::Error for IndexError {}

/// Read side of the spatial clustering index.
///
/// One handle is built per data generation; it is immutable afterwards and
/// safe to share for concurrent read queries.
pub trait ClusterIndex: Send + Sync + std::fmt::Debug {
    /// Clusters and leaves intersecting `bbox` at `zoom`.
    ///
    /// Result ordering is index-defined and may differ between viewports;
    /// callers key results by `cluster_id`/`index`, never by position.
    fn query(&self, bbox: &GeoBbox, zoom: u8) -> Vec<ClusterOrPoint>;

    /// Up to `limit` leaf features under a cluster; `None` is unbounded.
    /// Unknown ids yield an empty list.
    fn expand(&self, cluster_id: u64, limit: Option<usize>) -> Vec<PointFeature>;
}

pub type IndexHandle = Arc<dyn ClusterIndex>;

/// Build seam for the index collaborator, so hosts can substitute their own
/// structure. Must be deterministic for identical inputs.
pub trait IndexFactory {
    fn build(&self, features: &[PointFeature], params: &IndexParams)
    -> Result<IndexHandle, IndexError>;
}
