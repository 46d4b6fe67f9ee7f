use foundation::geo::LatLng;

use crate::feature::{ClusterOrPoint, PointFeature};

/// One spiderfied leaf position, valid for a single spiderfy episode.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpiderPosition {
    /// Position of the leaf in the original input list.
    pub leaf_index: usize,
    pub coordinate: LatLng,
    /// The cluster center the connector line points back to.
    pub center: LatLng,
}

/// Lay out a cluster's leaves along an Archimedean spiral around its center.
///
/// The angle/radius constants are empirical and carried over verbatim from
/// the layout this engine replaces; tests pin them numerically.
///
/// Deterministic given `(center, leaf order)`: no randomness. Anything that
/// is not a cluster with a valid center and a positive count yields an empty
/// layout.
pub fn spiral_layout(cluster: &ClusterOrPoint, leaves: &[PointFeature]) -> Vec<SpiderPosition> {
    let ClusterOrPoint::Cluster { count, center, .. } = cluster else {
        return Vec::new();
    };
    if *count == 0 || !center.is_valid() {
        return Vec::new();
    }

    leaves
        .iter()
        .enumerate()
        .map(|(i, leaf)| {
            let angle = 0.25 * (i as f64 * 0.5);
            SpiderPosition {
                leaf_index: leaf.index,
                coordinate: LatLng::new(
                    center.lat + 0.00015 * angle * angle.cos(),
                    center.lng + 0.00015 * angle * angle.sin(),
                ),
                center: *center,
            }
        })
        .collect()
}
