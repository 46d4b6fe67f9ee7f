use foundation::geo::LatLng;

use crate::symbology::BadgeStyle;

/// One renderable overlay element.
///
/// The engine stays renderer-agnostic: a host maps these to its widget's
/// primitives, reconciling by `key`. `index` fields address the host's
/// original child list, so visual content never has to round-trip through
/// the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderElement {
    /// An unclustered point marker.
    Single {
        key: String,
        index: usize,
        coordinate: LatLng,
    },
    /// A cluster badge showing the leaf count.
    ClusterBadge {
        key: String,
        cluster_id: u64,
        count: usize,
        coordinate: LatLng,
        style: BadgeStyle,
    },
    /// A non-point child, forwarded as-is.
    Passthrough { key: String, index: usize },
    /// A spiderfied copy of a point, displaced onto the spiral.
    SpiderNode {
        key: String,
        index: usize,
        coordinate: LatLng,
    },
    /// Connector from the cluster center to a spider node.
    SpiderLine {
        key: String,
        from: LatLng,
        to: LatLng,
    },
}

impl RenderElement {
    pub fn key(&self) -> &str {
        match self {
            RenderElement::Single { key, .. }
            | RenderElement::ClusterBadge { key, .. }
            | RenderElement::Passthrough { key, .. }
            | RenderElement::SpiderNode { key, .. }
            | RenderElement::SpiderLine { key, .. } => key,
        }
    }
}
