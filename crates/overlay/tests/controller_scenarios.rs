//! End-to-end controller scenarios: ingestion, viewport settles, spiderfy
//! episodes, fail-open behavior, and two-phase commits.

use std::cell::Cell;

use cluster::adapter::MarkerInput;
use cluster::config::{ClusterConfig, EdgePadding};
use cluster::feature::{ClusterOrPoint, PointFeature};
use cluster::grid::GridIndexFactory;
use cluster::index::{IndexError, IndexFactory, IndexHandle, IndexParams};
use cluster::viewport::Region;
use foundation::geo::LatLng;
use layers::compose::duplicate_keys;
use layers::element::RenderElement;
use overlay::controller::{ClusterController, Phase};
use overlay::events::OverlayEvent;
use overlay::widget::MapWidget;
use pretty_assertions::assert_eq;
use runtime::staging::StagingMode;
use serde_json::{Value, json};

/// Three keyed points roughly two meters apart, well inside the default
/// merge radius at every zoom level.
fn close_triple() -> Vec<MarkerInput> {
    vec![
        MarkerInput::keyed_point("a", LatLng::new(0.0, 0.0)),
        MarkerInput::keyed_point("b", LatLng::new(0.00002, 0.0)),
        MarkerInput::keyed_point("c", LatLng::new(0.0, 0.00002)),
    ]
}

fn wide_region() -> Region {
    Region::new(0.0, 0.0, 60.0, 60.0)
}

/// Small enough to resolve past the zoom cap, which clamps to max zoom.
fn tiny_region() -> Region {
    Region::new(0.00001, 0.00001, 0.001, 0.001)
}

fn count<F: Fn(&RenderElement) -> bool>(elements: &[RenderElement], pred: F) -> usize {
    elements.iter().filter(|e| pred(e)).count()
}

fn is_single(e: &RenderElement) -> bool {
    matches!(e, RenderElement::Single { .. })
}

fn is_badge(e: &RenderElement) -> bool {
    matches!(e, RenderElement::ClusterBadge { .. })
}

fn is_passthrough(e: &RenderElement) -> bool {
    matches!(e, RenderElement::Passthrough { .. })
}

fn is_spider_node(e: &RenderElement) -> bool {
    matches!(e, RenderElement::SpiderNode { .. })
}

fn is_spider_line(e: &RenderElement) -> bool {
    matches!(e, RenderElement::SpiderLine { .. })
}

#[derive(Default)]
struct RecordingWidget {
    fits: Vec<(Vec<LatLng>, EdgePadding)>,
}

impl MapWidget for RecordingWidget {
    fn fit_to_coordinates(&mut self, coordinates: &[LatLng], padding: EdgePadding) {
        self.fits.push((coordinates.to_vec(), padding));
    }
}

/// Delegates to the grid factory until `fail_after` builds have happened,
/// then fails every subsequent build.
struct FlakyFactory {
    inner: GridIndexFactory,
    builds: Cell<usize>,
    fail_after: usize,
}

impl FlakyFactory {
    fn new(fail_after: usize) -> Self {
        Self {
            inner: GridIndexFactory,
            builds: Cell::new(0),
            fail_after,
        }
    }
}

impl IndexFactory for FlakyFactory {
    fn build(
        &self,
        features: &[PointFeature],
        params: &IndexParams,
    ) -> Result<IndexHandle, IndexError> {
        let n = self.builds.get();
        self.builds.set(n + 1);
        if n >= self.fail_after {
            return Err(IndexError::InvalidFeature { index: 0 });
        }
        self.inner.build(features, params)
    }
}

#[test]
fn close_points_merge_into_one_cluster_at_low_zoom() {
    let mut controller = ClusterController::new(ClusterConfig::default());
    controller.set_children(close_triple());
    controller.set_region(wide_region(), Value::Null);

    let visible = controller.visible();
    assert_eq!(visible.len(), 1);
    let ClusterOrPoint::Cluster { count: cluster_count, .. } = &visible[0] else {
        panic!("expected a cluster, got {:?}", visible[0]);
    };
    assert_eq!(*cluster_count, 3);

    let layers = controller.render_layers();
    assert_eq!(count(&layers, is_badge), 1);
    assert_eq!(count(&layers, is_single), 0);
    assert_eq!(duplicate_keys(&layers), Vec::<String>::new());
}

#[test]
fn region_settle_events_carry_the_results() {
    let mut controller = ClusterController::new(ClusterConfig::default());
    controller.set_children(close_triple());
    controller.drain_events();

    controller.set_region(wide_region(), json!({"gesture": true}));
    let events = controller.drain_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], OverlayEvent::MarkersChanged { results } if results.len() == 1));
    match &events[1] {
        OverlayEvent::RegionSettled {
            region,
            details,
            results,
        } => {
            assert_eq!(*region, wide_region());
            assert_eq!(details["gesture"], true);
            assert_eq!(results.as_ref().map(Vec::len), Some(1));
        }
        other => panic!("expected RegionSettled, got {other:?}"),
    }
}

#[test]
fn settle_before_any_children_reports_no_results() {
    let mut controller = ClusterController::new(ClusterConfig::default());
    controller.set_region(wide_region(), Value::Null);

    let events = controller.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        OverlayEvent::RegionSettled { results: None, .. }
    ));
    assert!(controller.render_layers().is_empty());
}

#[test]
fn max_zoom_settle_starts_a_spiderfy_episode() {
    let mut controller = ClusterController::new(ClusterConfig::default());
    controller.set_children(close_triple());
    controller.set_region(tiny_region(), Value::Null);

    assert_eq!(controller.phase(), Phase::Spidering);
    assert_eq!(controller.spider_positions().len(), 3);

    let layers = controller.render_layers();
    assert_eq!(count(&layers, is_spider_node), 3);
    assert_eq!(count(&layers, is_spider_line), 3);
    assert_eq!(count(&layers, is_badge), 0);
    assert_eq!(duplicate_keys(&layers), Vec::<String>::new());

    // Zooming back out ends the episode.
    controller.set_region(wide_region(), Value::Null);
    assert_eq!(controller.phase(), Phase::Indexed);
    assert!(controller.spider_positions().is_empty());
}

#[test]
fn spiral_toggle_off_prevents_and_tears_down_spiderfy() {
    let config = ClusterConfig {
        spiral_enabled: false,
        ..ClusterConfig::default()
    };
    let mut controller = ClusterController::new(config);
    controller.set_children(close_triple());
    controller.set_region(tiny_region(), Value::Null);
    assert_eq!(controller.phase(), Phase::Indexed);
    assert!(controller.spider_positions().is_empty());

    let mut controller = ClusterController::new(ClusterConfig::default());
    controller.set_children(close_triple());
    controller.set_region(tiny_region(), Value::Null);
    assert_eq!(controller.phase(), Phase::Spidering);
    controller.set_spiral_enabled(false);
    assert_eq!(controller.phase(), Phase::Indexed);
    assert!(controller.spider_positions().is_empty());
}

#[test]
fn disabled_clustering_passes_every_child_through() {
    let config = ClusterConfig {
        clustering_enabled: false,
        ..ClusterConfig::default()
    };
    let mut controller = ClusterController::new(config);
    let mut children = close_triple();
    children.push(MarkerInput::passthrough());
    children.push(MarkerInput::keyed_point("d", LatLng::new(5.0, 5.0)));
    controller.set_children(children);

    assert_eq!(controller.phase(), Phase::Disabled);
    assert!(controller.visible().is_empty());

    let layers = controller.render_layers();
    assert_eq!(layers.len(), 5);
    assert_eq!(count(&layers, is_passthrough), 5);
    assert_eq!(duplicate_keys(&layers), Vec::<String>::new());
}

#[test]
fn all_invalid_update_keeps_the_previous_state() {
    let mut controller = ClusterController::new(ClusterConfig::default());
    controller.set_children(close_triple());
    controller.set_region(wide_region(), Value::Null);
    let before = controller.render_layers();

    controller.set_children(vec![
        MarkerInput::point(LatLng::new(91.0, 0.0)),
        MarkerInput::point(LatLng::new(f64::NAN, 0.0)),
    ]);

    assert_eq!(controller.phase(), Phase::Indexed);
    assert_eq!(controller.render_layers(), before);
    assert!(
        controller
            .drain_diagnostics()
            .iter()
            .any(|e| e.kind == "rebuild")
    );
}

#[test]
fn wrapped_viewport_sees_both_sides_of_the_antimeridian() {
    let mut controller = ClusterController::new(ClusterConfig::default());
    controller.set_children(vec![
        MarkerInput::keyed_point("east", LatLng::new(0.0, 179.99)),
        MarkerInput::keyed_point("west", LatLng::new(0.0, -179.99)),
    ]);
    // Negative longitude span: the region wraps across the antimeridian.
    controller.set_region(Region::new(0.0, 180.0, 1.0, -359.0), Value::Null);

    let layers = controller.render_layers();
    assert_eq!(count(&layers, is_single), 2);
    assert_eq!(duplicate_keys(&layers), Vec::<String>::new());
}

#[test]
fn empty_child_list_is_an_intentional_clear() {
    let mut controller = ClusterController::new(ClusterConfig::default());
    controller.set_children(close_triple());
    controller.set_children(Vec::new());
    assert!(controller.render_layers().is_empty());
}

#[test]
fn failed_rebuild_rolls_back_to_the_last_good_state() {
    let factory = Box::new(FlakyFactory::new(1));
    let mut controller =
        ClusterController::with_parts(ClusterConfig::default(), factory, StagingMode::Immediate);
    controller.set_children(close_triple());
    controller.set_region(wide_region(), Value::Null);
    let before = controller.render_layers();

    controller.set_children(vec![MarkerInput::keyed_point(
        "x",
        LatLng::new(40.0, 40.0),
    )]);

    assert_eq!(controller.render_layers(), before);
    assert!(
        controller
            .drain_diagnostics()
            .iter()
            .any(|e| e.kind == "index")
    );
}

#[test]
fn failed_first_build_fails_open_to_passthrough() {
    let factory = Box::new(FlakyFactory::new(0));
    let mut controller =
        ClusterController::with_parts(ClusterConfig::default(), factory, StagingMode::Immediate);
    controller.set_children(close_triple());

    assert_eq!(controller.phase(), Phase::Indexed);
    let layers = controller.render_layers();
    assert_eq!(layers.len(), 3);
    assert_eq!(count(&layers, is_passthrough), 3);
}

#[test]
fn deferred_commits_apply_on_the_next_frame_latest_wins() {
    let mut controller = ClusterController::with_parts(
        ClusterConfig::default(),
        Box::new(GridIndexFactory),
        StagingMode::Deferred,
    );

    controller.set_children(close_triple());
    assert!(controller.has_pending_commit());
    assert!(controller.render_layers().is_empty());

    controller.on_frame();
    assert!(!controller.has_pending_commit());
    assert_eq!(controller.visible().len(), 1);

    // Two settles before the frame tick: only the latest one lands.
    controller.set_region(wide_region(), Value::Null);
    controller.set_region(tiny_region(), Value::Null);
    assert!(controller.visible().is_empty());

    controller.on_frame();
    assert_eq!(controller.phase(), Phase::Spidering);
    assert_eq!(controller.spider_positions().len(), 3);
    assert_eq!(duplicate_keys(&controller.render_layers()), Vec::<String>::new());
}

#[test]
fn activating_a_cluster_fits_the_camera_to_its_leaves() {
    let mut controller = ClusterController::new(ClusterConfig::default());
    controller.set_children(close_triple());
    controller.set_region(wide_region(), Value::Null);
    controller.drain_events();

    let cluster = controller.visible()[0].clone();
    let mut widget = RecordingWidget::default();
    controller.activate_cluster(&cluster, &mut widget);

    assert_eq!(widget.fits.len(), 1);
    let (coordinates, padding) = &widget.fits[0];
    assert_eq!(coordinates.len(), 3);
    assert_eq!(*padding, EdgePadding::all(50.0));

    let events = controller.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        OverlayEvent::ClusterActivated { leaves, .. } if leaves.len() == 3
    ));
}

#[test]
fn preserve_press_behavior_suppresses_the_camera_move() {
    let config = ClusterConfig {
        preserve_cluster_press_behavior: true,
        ..ClusterConfig::default()
    };
    let mut controller = ClusterController::new(config);
    controller.set_children(close_triple());
    controller.set_region(wide_region(), Value::Null);
    controller.drain_events();

    let cluster = controller.visible()[0].clone();
    let mut widget = RecordingWidget::default();
    controller.activate_cluster(&cluster, &mut widget);

    assert!(widget.fits.is_empty());
    assert!(matches!(
        &controller.drain_events()[..],
        [OverlayEvent::ClusterActivated { .. }]
    ));
}

#[test]
fn activating_a_leaf_result_is_a_no_op() {
    let mut controller = ClusterController::new(ClusterConfig::default());
    controller.set_children(vec![MarkerInput::keyed_point("a", LatLng::new(0.0, 0.0))]);
    controller.set_region(wide_region(), Value::Null);
    controller.drain_events();

    let leaf = controller.visible()[0].clone();
    assert!(!leaf.is_cluster());
    let mut widget = RecordingWidget::default();
    controller.activate_cluster(&leaf, &mut widget);

    assert!(widget.fits.is_empty());
    assert!(controller.drain_events().is_empty());
}
