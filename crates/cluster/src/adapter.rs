use foundation::geo::LatLng;
use serde_json::Value;

use crate::feature::PointFeature;

/// Opaque child descriptor handed to the overlay by the host.
///
/// A child with a coordinate that has not opted out of clustering is a point
/// candidate; everything else is passed through to the widget untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerInput {
    /// Host-assigned render key, preferred for stable identity.
    pub key: Option<String>,
    /// Secondary identity source (e.g. a marker identifier).
    pub identifier: Option<String>,
    pub coordinate: Option<LatLng>,
    /// `false` opts this child out of clustering even if it has a coordinate.
    pub clusterable: bool,
    /// Opaque caller-supplied properties.
    pub props: Value,
}

impl Default for MarkerInput {
    fn default() -> Self {
        Self {
            key: None,
            identifier: None,
            coordinate: None,
            clusterable: true,
            props: Value::Null,
        }
    }
}

impl MarkerInput {
    pub fn point(coordinate: LatLng) -> Self {
        Self {
            coordinate: Some(coordinate),
            ..Self::default()
        }
    }

    pub fn keyed_point(key: impl Into<String>, coordinate: LatLng) -> Self {
        Self {
            key: Some(key.into()),
            coordinate: Some(coordinate),
            ..Self::default()
        }
    }

    pub fn passthrough() -> Self {
        Self::default()
    }
}

/// A non-point child, forwarded unmodified with its original key.
#[derive(Debug, Clone, PartialEq)]
pub struct PassthroughChild {
    /// Position in the original input list.
    pub index: usize,
    pub key: String,
    pub child: MarkerInput,
}

/// Output of one adapter pass: parallel lists preserving input order, plus
/// the input indices of candidates dropped for invalid coordinates
/// (diagnostics only).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SplitChildren {
    pub features: Vec<PointFeature>,
    pub passthrough: Vec<PassthroughChild>,
    pub dropped: Vec<usize>,
}

impl SplitChildren {
    /// Point candidates seen before coordinate validation.
    pub fn candidate_count(&self) -> usize {
        self.features.len() + self.dropped.len()
    }
}

/// Stable identity for a point candidate: explicit key, else identifier,
/// else a positional fallback.
pub fn stable_key_for(child: &MarkerInput, index: usize) -> String {
    if let Some(key) = &child.key {
        return key.clone();
    }
    if let Some(id) = &child.identifier {
        return id.clone();
    }
    format!("mk-{index}")
}

/// Render key for a passthrough child, preserving the host's own key when
/// present.
pub fn passthrough_key_for(child: &MarkerInput, index: usize) -> String {
    if let Some(key) = &child.key {
        return key.clone();
    }
    if let Some(id) = &child.identifier {
        return id.clone();
    }
    format!("child-{index}")
}

/// Classify and validate an ordered child list.
///
/// Pure: no side effects, input order preserved within each output list.
/// Invalid coordinates are dropped, never an error.
pub fn split_children(children: &[MarkerInput]) -> SplitChildren {
    let mut out = SplitChildren::default();

    for (index, child) in children.iter().enumerate() {
        let Some(coordinate) = child.coordinate.filter(|_| child.clusterable) else {
            out.passthrough.push(PassthroughChild {
                index,
                key: passthrough_key_for(child, index),
                child: child.clone(),
            });
            continue;
        };

        if !coordinate.is_valid() {
            out.dropped.push(index);
            continue;
        }

        out.features.push(PointFeature {
            coordinate,
            index,
            stable_key: stable_key_for(child, index),
            props: child.props.clone(),
        });
    }

    out
}
