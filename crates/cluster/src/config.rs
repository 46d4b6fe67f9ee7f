use serde::{Deserialize, Serialize};

use crate::index::IndexParams;

/// Four-sided inset passed to the widget's fit-to-coordinates operation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgePadding {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl EdgePadding {
    pub const fn all(inset: f64) -> Self {
        Self {
            top: inset,
            left: inset,
            right: inset,
            bottom: inset,
        }
    }
}

impl Default for EdgePadding {
    fn default() -> Self {
        Self::all(50.0)
    }
}

/// Device viewport size in pixels; drives zoom estimation and the default
/// cluster radius.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for DisplaySize {
    fn default() -> Self {
        Self::new(375.0, 667.0)
    }
}

/// Overlay configuration. Every field has a default, so hosts can
/// deserialize a partial document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Neighbor-merge radius in index extent units.
    /// `None` derives 6% of the display width.
    pub radius: Option<f64>,
    pub max_zoom: u8,
    pub min_zoom: u8,
    /// Minimum leaves required to form a cluster.
    pub min_points: usize,
    /// Index tile extent.
    pub extent: u16,
    /// Index tree node size, for index implementations that tune on it.
    pub node_size: u16,
    pub clustering_enabled: bool,
    pub spiral_enabled: bool,
    pub edge_padding: EdgePadding,
    /// Suppress the built-in fit-camera side effect on cluster activation.
    pub preserve_cluster_press_behavior: bool,
    pub display: DisplaySize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            radius: None,
            max_zoom: 17,
            min_zoom: 1,
            min_points: 2,
            extent: 512,
            node_size: 64,
            clustering_enabled: true,
            spiral_enabled: true,
            edge_padding: EdgePadding::default(),
            preserve_cluster_press_behavior: false,
            display: DisplaySize::default(),
        }
    }
}

impl ClusterConfig {
    pub fn effective_radius(&self) -> f64 {
        self.radius.unwrap_or(self.display.width * 0.06)
    }

    pub fn index_params(&self) -> IndexParams {
        IndexParams {
            radius: self.effective_radius(),
            extent: self.extent as f64,
            min_points: self.min_points,
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            node_size: self.node_size as usize,
        }
    }
}
