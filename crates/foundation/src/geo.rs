/// Geographic coordinate in degrees (WGS84).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components finite, latitude in [-90, 90], longitude in [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }
}

/// Web-mercator X as a fraction of world width in [0, 1].
pub fn mercator_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Web-mercator Y as a fraction of world height, clamped to [0, 1].
pub fn mercator_y(lat: f64) -> f64 {
    let s = lat.to_radians().sin();
    let y = 0.5 - 0.25 * ((1.0 + s) / (1.0 - s)).ln() / std::f64::consts::PI;
    y.clamp(0.0, 1.0)
}

pub fn unmercator_x(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

pub fn unmercator_y(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0).to_radians();
    360.0 * y2.exp().atan() / std::f64::consts::PI - 90.0
}
