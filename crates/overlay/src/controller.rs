use cluster::adapter::{MarkerInput, PassthroughChild, passthrough_key_for, split_children};
use cluster::config::ClusterConfig;
use cluster::feature::{ClusterOrPoint, PointFeature};
use cluster::grid::GridIndexFactory;
use cluster::index::{IndexFactory, IndexHandle};
use cluster::spiral::{SpiderPosition, spiral_layout};
use cluster::viewport::{self, Region};
use foundation::geo::LatLng;
use layers::compose::{ComposeInput, compose};
use layers::element::RenderElement;
use runtime::event_bus::{Event, EventBus};
use runtime::frame::Frame;
use runtime::staging::{CommitGate, StagingMode};
use serde_json::Value;

use crate::events::OverlayEvent;
use crate::widget::MapWidget;

/// Where the controller currently is in its lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Clustering is switched off; every child is passed through.
    Disabled,
    /// An index generation exists and drives the visible layers.
    Indexed,
    /// Indexed, plus an active spiderfy episode at max zoom.
    Spidering,
}

/// One immutable index build plus the validated features it was built from.
/// Replaced wholesale on every rebuild, never mutated.
#[derive(Clone)]
struct Generation {
    index: IndexHandle,
    features: Vec<PointFeature>,
}

/// Last state known to render something useful, kept for rollback when a
/// later rebuild produces nothing usable.
#[derive(Clone)]
struct Snapshot {
    generation: Generation,
    visible: Vec<ClusterOrPoint>,
    passthrough: Vec<PassthroughChild>,
}

enum GenerationUpdate {
    Keep,
    Replace(Generation),
    Clear,
}

/// Complete replacement state for the renderable surface, applied atomically
/// either synchronously or on the next frame depending on [`StagingMode`].
struct Commit {
    phase: Phase,
    generation: GenerationUpdate,
    passthrough: Vec<PassthroughChild>,
    visible: Vec<ClusterOrPoint>,
    spider: Vec<SpiderPosition>,
}

/// Orchestrates the full marker pipeline: child ingestion, index generations,
/// viewport resolution, spiderfy episodes, and render layer composition.
///
/// Single-threaded by design; the host feeds it events and pulls
/// [`render_layers`](Self::render_layers) whenever it wants to draw.
pub struct ClusterController {
    config: ClusterConfig,
    factory: Box<dyn IndexFactory>,
    staging_mode: StagingMode,
    frame: Frame,
    phase: Phase,
    children: Vec<MarkerInput>,
    generation: Option<Generation>,
    passthrough: Vec<PassthroughChild>,
    visible: Vec<ClusterOrPoint>,
    spider: Vec<SpiderPosition>,
    region: Option<Region>,
    last_good: Option<Snapshot>,
    gate: CommitGate<Commit>,
    events: Vec<OverlayEvent>,
    diagnostics: EventBus,
}

impl ClusterController {
    pub fn new(config: ClusterConfig) -> Self {
        Self::with_parts(config, Box::new(GridIndexFactory), StagingMode::Immediate)
    }

    /// Full constructor: substitute the index implementation or opt into
    /// two-phase commits for renderers that need them.
    pub fn with_parts(
        config: ClusterConfig,
        factory: Box<dyn IndexFactory>,
        staging_mode: StagingMode,
    ) -> Self {
        let phase = if config.clustering_enabled {
            Phase::Indexed
        } else {
            Phase::Disabled
        };
        Self {
            config,
            factory,
            staging_mode,
            frame: Frame::default(),
            phase,
            children: Vec::new(),
            generation: None,
            passthrough: Vec::new(),
            visible: Vec::new(),
            spider: Vec::new(),
            region: None,
            last_good: None,
            gate: CommitGate::new(),
            events: Vec::new(),
            diagnostics: EventBus::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// Results of the most recent applied query, clusters and leaves mixed.
    pub fn visible(&self) -> &[ClusterOrPoint] {
        &self.visible
    }

    pub fn spider_positions(&self) -> &[SpiderPosition] {
        &self.spider
    }

    /// True while a deferred commit is staged but not yet applied.
    pub fn has_pending_commit(&self) -> bool {
        self.gate.is_pending()
    }

    pub fn drain_events(&mut self) -> Vec<OverlayEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_diagnostics(&mut self) -> Vec<Event> {
        self.diagnostics.drain()
    }

    /// Compose the current state into the flat, uniquely-keyed element list.
    pub fn render_layers(&self) -> Vec<RenderElement> {
        let features = self
            .generation
            .as_ref()
            .map(|g| g.features.as_slice())
            .unwrap_or(&[]);
        compose(&ComposeInput {
            results: &self.visible,
            features,
            passthrough: &self.passthrough,
            spider: &self.spider,
            spidering: self.phase == Phase::Spidering,
        })
    }

    /// Replace the child list and rebuild the index generation.
    pub fn set_children(&mut self, children: Vec<MarkerInput>) {
        self.frame = self.frame.next();
        self.children = children;
        self.rebuild();
    }

    pub fn set_clustering_enabled(&mut self, enabled: bool) {
        if self.config.clustering_enabled == enabled {
            return;
        }
        self.frame = self.frame.next();
        self.config.clustering_enabled = enabled;
        self.rebuild();
    }

    /// Toggling spiderfy off tears down any active episode immediately; the
    /// next viewport settle decides whether a new one starts.
    pub fn set_spiral_enabled(&mut self, enabled: bool) {
        if self.config.spiral_enabled == enabled {
            return;
        }
        self.frame = self.frame.next();
        self.config.spiral_enabled = enabled;
        if !enabled {
            self.spider.clear();
            if self.phase == Phase::Spidering {
                self.phase = Phase::Indexed;
            }
        }
    }

    /// The viewport settled. Re-query the current generation, decide whether
    /// a spiderfy episode starts or ends, and forward the settle to the host.
    ///
    /// `details` is the widget's opaque settle payload, echoed back in the
    /// [`OverlayEvent::RegionSettled`] event untouched.
    pub fn set_region(&mut self, region: Region, details: Value) {
        self.frame = self.frame.next();
        self.region = Some(region);

        let Some(generation) = self.generation.clone() else {
            self.events.push(OverlayEvent::RegionSettled {
                region,
                details,
                results: None,
            });
            return;
        };

        let (bbox, zoom) = viewport::resolve(
            Some(&region),
            self.config.display,
            self.config.min_zoom,
            self.config.max_zoom,
        );
        let results = generation.index.query(&bbox, zoom);

        let spidering =
            self.config.spiral_enabled && zoom == self.config.max_zoom && !results.is_empty();
        let spider = if spidering {
            let spider = spiderfy(&generation, &results);
            self.diagnostics.emit(
                self.frame,
                "spider",
                format!("spiderfy at zoom {zoom}: {} positions", spider.len()),
            );
            spider
        } else {
            Vec::new()
        };

        self.events.push(OverlayEvent::MarkersChanged {
            results: results.clone(),
        });
        self.events.push(OverlayEvent::RegionSettled {
            region,
            details,
            results: Some(results.clone()),
        });

        let passthrough = self.passthrough.clone();
        self.commit(Commit {
            phase: if spidering {
                Phase::Spidering
            } else {
                Phase::Indexed
            },
            generation: GenerationUpdate::Keep,
            passthrough,
            visible: results,
            spider,
        });
    }

    /// A cluster badge was pressed. Expands its membership, optionally fits
    /// the camera to it, and notifies the host either way.
    ///
    /// Leaf results and anything else are ignored; pointless camera moves to
    /// an empty coordinate set are suppressed.
    pub fn activate_cluster(&mut self, cluster: &ClusterOrPoint, widget: &mut dyn MapWidget) {
        let ClusterOrPoint::Cluster { cluster_id, .. } = cluster else {
            return;
        };
        let Some(generation) = &self.generation else {
            return;
        };
        self.frame = self.frame.next();

        let leaves = generation.index.expand(*cluster_id, None);
        if !self.config.preserve_cluster_press_behavior {
            let coordinates: Vec<LatLng> = leaves
                .iter()
                .map(|leaf| leaf.coordinate)
                .filter(|c| c.is_valid())
                .collect();
            if !coordinates.is_empty() {
                widget.fit_to_coordinates(&coordinates, self.config.edge_padding);
            }
        }
        self.events.push(OverlayEvent::ClusterActivated {
            cluster: cluster.clone(),
            leaves,
        });
    }

    /// Frame tick: applies the staged commit, if any. A no-op in
    /// [`StagingMode::Immediate`].
    pub fn on_frame(&mut self) {
        self.frame = self.frame.next();
        if let Some(commit) = self.gate.take_current() {
            self.apply(commit);
        }
    }

    fn rebuild(&mut self) {
        if !self.config.clustering_enabled {
            let passthrough = passthrough_everything(&self.children);
            self.diagnostics.emit(
                self.frame,
                "rebuild",
                format!(
                    "clustering disabled; {} children passed through",
                    passthrough.len()
                ),
            );
            self.commit(Commit {
                phase: Phase::Disabled,
                generation: GenerationUpdate::Clear,
                passthrough,
                visible: Vec::new(),
                spider: Vec::new(),
            });
            return;
        }

        let split = split_children(&self.children);
        if !split.dropped.is_empty() {
            self.diagnostics.emit(
                self.frame,
                "adapter",
                format!(
                    "dropped {} children with invalid coordinates",
                    split.dropped.len()
                ),
            );
        }

        // Retention guard: candidates arrived but every one failed
        // validation. A flaky data source, not an intentional clear.
        if split.candidate_count() > 0 && split.features.is_empty() {
            if let Some(snapshot) = self.last_good.clone() {
                self.diagnostics.emit(
                    self.frame,
                    "rebuild",
                    "all candidates failed validation; keeping previous state",
                );
                self.commit(Commit {
                    phase: Phase::Indexed,
                    generation: GenerationUpdate::Replace(snapshot.generation),
                    passthrough: snapshot.passthrough,
                    visible: snapshot.visible,
                    spider: Vec::new(),
                });
                return;
            }
        }

        match self.factory.build(&split.features, &self.config.index_params()) {
            Ok(index) => {
                let (bbox, zoom) = viewport::resolve(
                    self.region.as_ref(),
                    self.config.display,
                    self.config.min_zoom,
                    self.config.max_zoom,
                );
                let visible = index.query(&bbox, zoom);
                self.diagnostics.emit(
                    self.frame,
                    "rebuild",
                    format!(
                        "indexed {} features, {} visible at zoom {zoom}",
                        split.features.len(),
                        visible.len()
                    ),
                );
                self.events.push(OverlayEvent::MarkersChanged {
                    results: visible.clone(),
                });
                self.commit(Commit {
                    phase: Phase::Indexed,
                    generation: GenerationUpdate::Replace(Generation {
                        index,
                        features: split.features,
                    }),
                    passthrough: split.passthrough,
                    visible,
                    spider: Vec::new(),
                });
            }
            Err(err) => {
                self.diagnostics
                    .emit(self.frame, "index", format!("index build failed: {err}"));
                if let Some(snapshot) = self.last_good.clone() {
                    self.commit(Commit {
                        phase: Phase::Indexed,
                        generation: GenerationUpdate::Replace(snapshot.generation),
                        passthrough: snapshot.passthrough,
                        visible: snapshot.visible,
                        spider: Vec::new(),
                    });
                } else {
                    // Fail open: an unclustered map beats a blank one.
                    self.commit(Commit {
                        phase: Phase::Indexed,
                        generation: GenerationUpdate::Clear,
                        passthrough: passthrough_everything(&self.children),
                        visible: Vec::new(),
                        spider: Vec::new(),
                    });
                }
            }
        }
    }

    fn commit(&mut self, commit: Commit) {
        match self.staging_mode {
            StagingMode::Immediate => self.apply(commit),
            StagingMode::Deferred => {
                // Phase 1: clear the volatile layers so the renderer never
                // sees old and new marker sets in the same frame.
                self.visible.clear();
                self.spider.clear();
                let ticket = self.gate.stage(commit);
                self.diagnostics.emit(
                    self.frame,
                    "commit",
                    format!("staged {ticket:?}; volatile layers cleared"),
                );
            }
        }
    }

    fn apply(&mut self, commit: Commit) {
        self.phase = commit.phase;
        match commit.generation {
            GenerationUpdate::Keep => {}
            GenerationUpdate::Replace(generation) => self.generation = Some(generation),
            GenerationUpdate::Clear => self.generation = None,
        }
        self.passthrough = commit.passthrough;
        self.visible = commit.visible;
        self.spider = commit.spider;

        if let Some(generation) = &self.generation {
            if !generation.features.is_empty() {
                self.last_good = Some(Snapshot {
                    generation: generation.clone(),
                    visible: self.visible.clone(),
                    passthrough: self.passthrough.clone(),
                });
            }
        }
    }
}

/// Spiral positions for every cluster in the result set, concatenated in
/// result order.
fn spiderfy(generation: &Generation, results: &[ClusterOrPoint]) -> Vec<SpiderPosition> {
    let mut positions = Vec::new();
    for result in results {
        if let ClusterOrPoint::Cluster { cluster_id, .. } = result {
            let leaves = generation.index.expand(*cluster_id, None);
            positions.extend(spiral_layout(result, &leaves));
        }
    }
    positions
}

fn passthrough_everything(children: &[MarkerInput]) -> Vec<PassthroughChild> {
    children
        .iter()
        .enumerate()
        .map(|(index, child)| PassthroughChild {
            index,
            key: passthrough_key_for(child, index),
            child: child.clone(),
        })
        .collect()
}
