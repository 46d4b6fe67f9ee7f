use cluster::feature::{ClusterOrPoint, PointFeature};
use cluster::viewport::Region;
use serde_json::Value;

/// Outbound notifications, queued by the controller and drained by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    /// The visible result list changed after a successful re-query or rebuild.
    MarkersChanged { results: Vec<ClusterOrPoint> },
    /// The viewport settled. `details` is the widget's opaque native payload,
    /// forwarded untouched. `results` is `None` when no index exists yet.
    RegionSettled {
        region: Region,
        details: Value,
        results: Option<Vec<ClusterOrPoint>>,
    },
    /// A cluster badge was activated; `leaves` is its full membership.
    ClusterActivated {
        cluster: ClusterOrPoint,
        leaves: Vec<PointFeature>,
    },
}
