use foundation::bounds::GeoBbox;
use foundation::geo::mercator_y;
use serde::{Deserialize, Serialize};

use crate::config::DisplaySize;

/// Map region descriptor as reported by the widget: center plus spans in
/// degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    pub fn new(latitude: f64, longitude: f64, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta,
            longitude_delta,
        }
    }

    fn is_finite(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude_delta.is_finite()
            && self.longitude_delta.is_finite()
    }
}

/// Longitude span forcing the minimum zoom outright.
const WIDE_SPAN_DEG: f64 = 40.0;
const TILE_SIZE_PX: f64 = 256.0;

/// Bounding box for a region, applying the antimeridian rule: a negative
/// longitude span means the region wraps, so 360 is added before use. The
/// full delta is applied on each side of the center.
pub fn region_bbox(region: &Region) -> GeoBbox {
    let lng_delta = if region.longitude_delta < 0.0 {
        region.longitude_delta + 360.0
    } else {
        region.longitude_delta
    };
    GeoBbox::new(
        region.longitude - lng_delta,
        region.latitude - region.latitude_delta,
        region.longitude + lng_delta,
        region.latitude + region.latitude_delta,
    )
}

/// Resolve a viewport into a bounding box and a discrete zoom level.
///
/// Never fails past this boundary: a missing or degenerate region yields the
/// whole-world box at `min_zoom`.
pub fn resolve(
    region: Option<&Region>,
    display: DisplaySize,
    min_zoom: u8,
    max_zoom: u8,
) -> (GeoBbox, u8) {
    let Some(region) = region else {
        return (GeoBbox::world(), min_zoom);
    };
    if !region.is_finite() {
        return (GeoBbox::world(), min_zoom);
    }

    let bbox = region_bbox(region);
    if region.longitude_delta >= WIDE_SPAN_DEG {
        return (bbox, min_zoom);
    }

    let zoom = match zoom_estimate(&bbox, display) {
        Some(estimate) if estimate.is_finite() => {
            (estimate.floor() as i64).clamp(min_zoom as i64, max_zoom as i64) as u8
        }
        _ => min_zoom,
    };
    (bbox, zoom)
}

/// Continuous zoom at which `bbox` fits the display, on 256px mercator
/// tiles. `None` when the box or display has no usable extent.
fn zoom_estimate(bbox: &GeoBbox, display: DisplaySize) -> Option<f64> {
    if !(display.width > 0.0 && display.height > 0.0) {
        return None;
    }
    let lng_span = bbox.lng_span().abs();
    let lat_frac = (mercator_y(bbox.south) - mercator_y(bbox.north)).abs();
    if !(lng_span > 0.0) || !(lat_frac > 0.0) {
        return None;
    }
    let zoom_x = (display.width * 360.0 / (TILE_SIZE_PX * lng_span)).log2();
    let zoom_y = (display.height / (TILE_SIZE_PX * lat_frac)).log2();
    Some(zoom_x.min(zoom_y))
}

#[cfg(test)]
mod tests {
    use super::{Region, region_bbox, resolve};
    use crate::config::DisplaySize;
    use foundation::bounds::GeoBbox;

    const DISPLAY: DisplaySize = DisplaySize::new(375.0, 667.0);

    #[test]
    fn missing_region_defaults_to_world_at_min_zoom() {
        let (bbox, zoom) = resolve(None, DISPLAY, 1, 17);
        assert_eq!(bbox, GeoBbox::world());
        assert_eq!(zoom, 1);
    }

    #[test]
    fn wide_span_forces_min_zoom() {
        let region = Region::new(0.0, 0.0, 60.0, 60.0);
        let (bbox, zoom) = resolve(Some(&region), DISPLAY, 1, 17);
        assert_eq!(zoom, 1);
        assert_eq!(bbox, GeoBbox::new(-60.0, -60.0, 60.0, 60.0));
    }

    #[test]
    fn negative_longitude_span_wraps_with_plus_360() {
        // A -10 degree span crossing the antimeridian becomes 350.
        let region = Region::new(0.0, 175.0, 5.0, -10.0);
        let bbox = region_bbox(&region);
        assert_eq!(bbox.west, 175.0 - 350.0);
        assert_eq!(bbox.east, 175.0 + 350.0);
    }

    #[test]
    fn tiny_span_clamps_to_max_zoom() {
        let region = Region::new(0.0, 0.0, 0.001, 0.001);
        let (_, zoom) = resolve(Some(&region), DISPLAY, 1, 17);
        assert_eq!(zoom, 17);
    }

    #[test]
    fn zoom_always_within_bounds() {
        let regions = [
            Some(Region::new(0.0, 0.0, 0.000001, 0.000001)),
            Some(Region::new(0.0, 0.0, 30.0, 39.9)),
            Some(Region::new(85.0, 179.0, 0.5, 0.5)),
            Some(Region::new(f64::NAN, 0.0, 1.0, 1.0)),
            Some(Region::new(0.0, 0.0, 0.0, 0.0)),
            None,
        ];
        for region in &regions {
            let (_, zoom) = resolve(region.as_ref(), DISPLAY, 2, 15);
            assert!((2..=15).contains(&zoom), "zoom {zoom} out of bounds");
        }
    }

    #[test]
    fn city_scale_region_resolves_to_mid_zoom() {
        // Roughly a metro area: ~0.5 degrees on each axis.
        let region = Region::new(59.9, 10.7, 0.25, 0.25);
        let (_, zoom) = resolve(Some(&region), DISPLAY, 1, 17);
        assert!((8..=11).contains(&zoom), "unexpected zoom {zoom}");
    }
}
