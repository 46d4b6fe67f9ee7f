use cluster::config::EdgePadding;
use foundation::geo::LatLng;

/// Outbound surface of the underlying map widget.
///
/// The controller only ever asks the widget to move its camera; rendering
/// happens by the host pulling [`crate::ClusterController::render_layers`].
pub trait MapWidget {
    /// Fit the camera so every coordinate is visible, inset by `padding`.
    fn fit_to_coordinates(&mut self, coordinates: &[LatLng], padding: EdgePadding);
}

/// Widget that ignores camera requests, for hosts that drive the camera
/// themselves.
#[derive(Debug, Default)]
pub struct NoopWidget;

impl MapWidget for NoopWidget {
    fn fit_to_coordinates(&mut self, _coordinates: &[LatLng], _padding: EdgePadding) {}
}
