use crate::geo::LatLng;

/// Geographic bounding box in degrees: `[west, south, east, north]`.
///
/// `east` may exceed 180 when the box spans the antimeridian; containment
/// normalizes longitudes instead of comparing them raw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoBbox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBbox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Whole-world fallback used when no viewport is known yet.
    pub fn world() -> Self {
        Self::new(-180.0, -85.0, 180.0, 85.0)
    }

    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }

    pub fn contains(&self, p: LatLng) -> bool {
        if p.lat < self.south || p.lat > self.north {
            return false;
        }
        let span = self.east - self.west;
        if span >= 360.0 {
            return true;
        }
        // Bring the query longitude into [west, west + 360) before comparing.
        let rel = (p.lng - self.west).rem_euclid(360.0);
        rel <= span
    }
}
