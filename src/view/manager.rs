use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    analysis::{
        hit_test::HitTester,
        occlusion::find_occluders,
        scroll_search::ScrollSearchEngine,
        search_model::{SearchOutcome, SearchSettings},
    },
    device::bridge::DeviceBridge,
    refresh::refresher::SnapshotRefresher,
    trace::logger::TraceLogger,
    tree::{
        geometry::Point,
        identity::UniqueId,
        snapshot::{NodeHandle, Snapshot},
    },
};

/// Per-device query API over the latest widget hierarchy.
///
/// Every query waits for the pending refresh (if any) and then answers
/// against that one generation. A device whose last refresh failed answers
/// every query with "not found".
pub struct ViewTreeManager {
    bridge: Arc<dyn DeviceBridge>,
    refresher: SnapshotRefresher,
    settings: SearchSettings,
    hit_tester: HitTester,
    tracer: Option<Arc<TraceLogger>>,
}

impl ViewTreeManager {
    pub fn new(bridge: Arc<dyn DeviceBridge>, settings: SearchSettings) -> Self {
        Self {
            refresher: SnapshotRefresher::new(Arc::clone(&bridge)),
            hit_tester: HitTester::new(settings.list_classes.clone()),
            bridge,
            settings,
            tracer: None,
        }
    }

    /// Record every scroll search phase to `tracer`.
    pub fn with_tracer(mut self, tracer: Arc<TraceLogger>) -> Self {
        self.tracer = tracer.is_enabled().then_some(tracer);
        self
    }

    pub fn serial(&self) -> &str {
        self.bridge.serial()
    }

    pub fn bridge(&self) -> &dyn DeviceBridge {
        self.bridge.as_ref()
    }

    /// Whether the device can produce hierarchy dumps at all. Transport
    /// errors count as "no".
    pub fn supports_automation(&self) -> bool {
        match self.bridge.has_automation() {
            Ok(supported) => supported,
            Err(e) => {
                warn!(serial = %self.serial(), error = %e, "automation check failed");
                false
            }
        }
    }

    /// Start a background refresh and return immediately.
    pub fn refresh(&self) {
        self.refresher.refresh();
    }

    /// Refresh and block until the new generation is published.
    pub fn wait_for_fresh_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.refresher.refresh();
        self.refresher.wait_until_ready()
    }

    /// Current generation, waiting for a pending refresh to land.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.refresher.wait_until_ready()
    }

    /// Resolve `id`, scrolling lazily rendered containers as needed.
    pub fn node_by_id(&self, id: &UniqueId) -> Option<NodeHandle> {
        self.engine().locate(id)
    }

    /// Resolve `id` in the current generation only. Never touches the device.
    pub fn find_node(&self, id: &UniqueId) -> Option<NodeHandle> {
        let snapshot = self.snapshot()?;
        let node = snapshot.find(id)?.id();
        NodeHandle::new(snapshot, node)
    }

    /// Widget a tap at `(x, y)` in device pixels would address.
    pub fn view_at_location(&self, x: i32, y: i32) -> Option<NodeHandle> {
        let snapshot = self.snapshot()?;
        let hit = self.hit_tester.locate(snapshot.root(), x, y)?.id();
        NodeHandle::new(snapshot, hit)
    }

    /// Ids of the nodes covering `id` in the current generation. `None` when
    /// the widget is not in the current generation.
    pub fn occluders(&self, id: &UniqueId) -> Option<Vec<UniqueId>> {
        let snapshot = self.snapshot()?;
        let target = snapshot.find(id)?;
        Some(
            find_occluders(target, snapshot.root())
                .into_iter()
                .map(|n| n.data().unique_id().clone())
                .collect(),
        )
    }

    /// False for widgets that are not in the current generation.
    pub fn is_occluded(&self, id: &UniqueId) -> bool {
        self.occluders(id).is_some_and(|o| !o.is_empty())
    }

    pub fn make_node_visible(&self, id: &UniqueId) -> SearchOutcome {
        let outcome = self.engine().make_node_visible(id);
        debug!(serial = %self.serial(), id = %id, visible = outcome.is_visible(), "make visible finished");
        outcome
    }

    /// Device pixel at the given fraction of the screen size.
    pub fn automation_click_location(&self, x_scale: f64, y_scale: f64) -> Option<Point> {
        let snapshot = self.snapshot()?;
        let screen = snapshot.root().data().bounds();
        Some(scaled_point(screen.width(), screen.height(), x_scale, y_scale))
    }

    fn engine(&self) -> ScrollSearchEngine<'_> {
        let engine = ScrollSearchEngine::new(self.bridge.as_ref(), &self.refresher, &self.settings);
        match &self.tracer {
            Some(tracer) => engine.with_tracer(tracer),
            None => engine,
        }
    }
}

/// Fraction of a `width` x `height` screen, truncated to whole pixels.
pub fn scaled_point(width: i32, height: i32, x_scale: f64, y_scale: f64) -> Point {
    Point::new(
        (f64::from(width) * x_scale) as i32,
        (f64::from(height) * y_scale) as i32,
    )
}
