use std::collections::{BTreeMap, BTreeSet};

use cluster::adapter::PassthroughChild;
use cluster::feature::{ClusterOrPoint, PointFeature};
use cluster::spiral::SpiderPosition;

use crate::element::RenderElement;
use crate::symbology::badge_style;

/// Read-only view of controller state consumed by one compose pass.
#[derive(Debug, Copy, Clone)]
pub struct ComposeInput<'a> {
    pub results: &'a [ClusterOrPoint],
    /// Current generation's validated features, for key lookups by index.
    pub features: &'a [PointFeature],
    pub passthrough: &'a [PassthroughChild],
    pub spider: &'a [SpiderPosition],
    pub spidering: bool,
}

/// Merge the four render layers into one flat, uniquely-keyed list.
///
/// Layers, in order: singles, cluster badges, passthrough, spider nodes then
/// connector lines. While spidering, badges are suppressed entirely and any
/// single covered by a spider position is skipped, so a point never appears
/// both as a static marker and a spiral node.
///
/// Key uniqueness across the concatenation is a correctness property of the
/// whole composer; tests assert it through [`duplicate_keys`].
pub fn compose(input: &ComposeInput<'_>) -> Vec<RenderElement> {
    let mut out = Vec::new();

    let spider_indices: BTreeSet<usize> = input.spider.iter().map(|s| s.leaf_index).collect();

    for result in input.results {
        if let ClusterOrPoint::Point {
            index,
            stable_key,
            center,
        } = result
        {
            if input.spidering && spider_indices.contains(index) {
                continue;
            }
            out.push(RenderElement::Single {
                key: stable_key.clone(),
                index: *index,
                coordinate: *center,
            });
        }
    }

    if !input.spidering {
        for result in input.results {
            if let ClusterOrPoint::Cluster {
                cluster_id,
                count,
                center,
            } = result
            {
                out.push(RenderElement::ClusterBadge {
                    key: format!("cluster-{cluster_id}"),
                    cluster_id: *cluster_id,
                    count: *count,
                    coordinate: *center,
                    style: badge_style(*count),
                });
            }
        }
    }

    for child in input.passthrough {
        out.push(RenderElement::Passthrough {
            key: child.key.clone(),
            index: child.index,
        });
    }

    if input.spidering {
        let key_by_index: BTreeMap<usize, &str> = input
            .features
            .iter()
            .map(|f| (f.index, f.stable_key.as_str()))
            .collect();

        let mut nodes = Vec::new();
        let mut lines = Vec::new();
        for (ordinal, sp) in input.spider.iter().enumerate() {
            // A leaf whose index no longer resolves is skipped, not an error.
            let Some(base) = key_by_index.get(&sp.leaf_index) else {
                continue;
            };
            if !sp.coordinate.is_valid() {
                continue;
            }
            let node_key = format!("spider:{base}:{ordinal}");
            nodes.push(RenderElement::SpiderNode {
                key: node_key.clone(),
                index: sp.leaf_index,
                coordinate: sp.coordinate,
            });
            if sp.center.is_valid() {
                lines.push(RenderElement::SpiderLine {
                    key: format!("spiderline:{node_key}"),
                    from: sp.center,
                    to: sp.coordinate,
                });
            }
        }
        out.extend(nodes);
        out.extend(lines);
    }

    out
}

/// Keys appearing more than once in `elements`, sorted. Empty means the
/// cross-layer uniqueness invariant holds.
pub fn duplicate_keys(elements: &[RenderElement]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for element in elements {
        *counts.entry(element.key()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(k, _)| k.to_string())
        .collect()
}
