use foundation::bounds::GeoBbox;
use foundation::geo::{LatLng, mercator_x, mercator_y, unmercator_x, unmercator_y};

use crate::feature::{ClusterOrPoint, PointFeature};
use crate::index::{ClusterIndex, IndexError, IndexFactory, IndexHandle, IndexParams};

/// Cluster ids reserve the low bits for a zoom tag so `expand` can recover
/// membership without extra state: `(seed << ZOOM_BITS) | (zoom + 1)`.
const ZOOM_BITS: u32 = 5;
const ZOOM_MASK: u64 = (1 << ZOOM_BITS) - 1;

/// Deterministic greedy radius-merge index over projected points.
///
/// Clustering at a zoom level is a pure function of the full feature set, so
/// the viewport box only filters results and never changes membership. This
/// is MVP-focused: correctness + determinism first; performance later.
#[derive(Debug)]
pub struct GridIndex {
    params: IndexParams,
    features: Vec<PointFeature>,
    /// Web-mercator fractions, parallel to `features`.
    projected: Vec<[f64; 2]>,
}

/// Default build seam producing [`GridIndex`] handles.
#[derive(Debug, Default)]
pub struct GridIndexFactory;

impl IndexFactory for GridIndexFactory {
    fn build(
        &self,
        features: &[PointFeature],
        params: &IndexParams,
    ) -> Result<IndexHandle, IndexError> {
        Ok(std::sync::Arc::new(GridIndex::build(
            features.to_vec(),
            params.clone(),
        )?))
    }
}

enum Entry {
    Cluster { seed: usize, members: Vec<usize> },
    Leaf(usize),
}

impl GridIndex {
    pub fn build(features: Vec<PointFeature>, params: IndexParams) -> Result<Self, IndexError> {
        if u64::from(params.max_zoom) + 1 > ZOOM_MASK {
            return Err(IndexError::ZoomRange {
                max_zoom: params.max_zoom,
            });
        }

        let mut projected = Vec::with_capacity(features.len());
        for (i, feature) in features.iter().enumerate() {
            let p = [
                mercator_x(feature.coordinate.lng),
                mercator_y(feature.coordinate.lat),
            ];
            if !(p[0].is_finite() && p[1].is_finite()) {
                return Err(IndexError::InvalidFeature { index: i });
            }
            projected.push(p);
        }

        Ok(Self {
            params,
            features,
            projected,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Merge radius at `zoom`, as a world fraction.
    fn radius_at(&self, zoom: u8) -> f64 {
        self.params.radius / (self.params.extent * f64::powi(2.0, zoom as i32))
    }

    /// Greedy merge in feature order: each unassigned point seeds a group of
    /// the still-unassigned points within the radius. Seeds that gather fewer
    /// than `min_points` stay leaves without consuming their neighbors.
    fn entries_at(&self, zoom: u8) -> Vec<Entry> {
        let r = self.radius_at(zoom);
        let r2 = r * r;
        let n = self.features.len();
        let mut assigned = vec![false; n];
        let mut out = Vec::new();

        for i in 0..n {
            if assigned[i] {
                continue;
            }
            let mut members = vec![i];
            for j in (i + 1)..n {
                if assigned[j] {
                    continue;
                }
                let dx = self.projected[j][0] - self.projected[i][0];
                let dy = self.projected[j][1] - self.projected[i][1];
                if dx * dx + dy * dy <= r2 {
                    members.push(j);
                }
            }
            if members.len() >= self.params.min_points {
                for &m in &members {
                    assigned[m] = true;
                }
                out.push(Entry::Cluster { seed: i, members });
            } else {
                assigned[i] = true;
                out.push(Entry::Leaf(i));
            }
        }

        out
    }

    fn clamp_zoom(&self, zoom: u8) -> u8 {
        zoom.clamp(self.params.min_zoom, self.params.max_zoom)
    }

    fn cluster_center(&self, members: &[usize]) -> LatLng {
        let mut sx = 0.0;
        let mut sy = 0.0;
        for &m in members {
            sx += self.projected[m][0];
            sy += self.projected[m][1];
        }
        let n = members.len() as f64;
        LatLng::new(unmercator_y(sy / n), unmercator_x(sx / n))
    }

    fn encode_id(seed: usize, zoom: u8) -> u64 {
        ((seed as u64) << ZOOM_BITS) | (u64::from(zoom) + 1)
    }

    fn decode_id(cluster_id: u64) -> Option<(usize, u8)> {
        let tag = cluster_id & ZOOM_MASK;
        if tag == 0 {
            return None;
        }
        Some(((cluster_id >> ZOOM_BITS) as usize, (tag - 1) as u8))
    }
}

impl ClusterIndex for GridIndex {
    fn query(&self, bbox: &GeoBbox, zoom: u8) -> Vec<ClusterOrPoint> {
        let zoom = self.clamp_zoom(zoom);
        let mut out = Vec::new();

        for entry in self.entries_at(zoom) {
            match entry {
                Entry::Cluster { seed, members } => {
                    let center = self.cluster_center(&members);
                    if bbox.contains(center) {
                        out.push(ClusterOrPoint::Cluster {
                            cluster_id: Self::encode_id(seed, zoom),
                            count: members.len(),
                            center,
                        });
                    }
                }
                Entry::Leaf(i) => {
                    let feature = &self.features[i];
                    if bbox.contains(feature.coordinate) {
                        out.push(ClusterOrPoint::Point {
                            index: feature.index,
                            stable_key: feature.stable_key.clone(),
                            center: feature.coordinate,
                        });
                    }
                }
            }
        }

        out
    }

    fn expand(&self, cluster_id: u64, limit: Option<usize>) -> Vec<PointFeature> {
        let Some((seed, zoom)) = Self::decode_id(cluster_id) else {
            return Vec::new();
        };
        if zoom > self.params.max_zoom {
            return Vec::new();
        }

        for entry in self.entries_at(zoom) {
            if let Entry::Cluster { seed: s, members } = entry {
                if s == seed {
                    let take = limit.unwrap_or(members.len());
                    return members
                        .iter()
                        .take(take)
                        .map(|&m| self.features[m].clone())
                        .collect();
                }
            }
        }
        Vec::new()
    }
}
