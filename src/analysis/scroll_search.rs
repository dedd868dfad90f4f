use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{
    analysis::{
        occlusion::OcclusionAnalyzer,
        open_span::OpenSpanMap,
        search_model::{DragDirection, Reveal, SearchOutcome, SearchPhase, SearchSettings},
    },
    device::{bridge::DeviceBridge, device_model::DragGesture},
    parser::bounds::MAX_COORDINATE,
    refresh::source::SnapshotSource,
    trace::{logger::TraceLogger, trace::TraceEvent},
    tree::{
        geometry::Axis,
        identity::UniqueId,
        snapshot::{NodeHandle, NodeRef, Snapshot},
        tree_model::NodeId,
    },
};

/// Resolves widget ids to on-screen nodes, scrolling the device when the
/// widget is not rendered yet or is covered by another widget.
///
/// Every drag is followed by a settle pause and a fresh snapshot; decisions
/// are always made against the newest generation.
pub struct ScrollSearchEngine<'a> {
    bridge: &'a dyn DeviceBridge,
    source: &'a dyn SnapshotSource,
    settings: &'a SearchSettings,
    tracer: Option<&'a TraceLogger>,
    analyzer: OcclusionAnalyzer,
}

impl<'a> ScrollSearchEngine<'a> {
    pub fn new(
        bridge: &'a dyn DeviceBridge,
        source: &'a dyn SnapshotSource,
        settings: &'a SearchSettings,
    ) -> Self {
        Self {
            bridge,
            source,
            settings,
            tracer: None,
            analyzer: OcclusionAnalyzer::new(),
        }
    }

    pub fn with_tracer(mut self, tracer: &'a TraceLogger) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Locate `id`, and if something covers it make one attempt to scroll it
    /// into an open area.
    ///
    /// The unocclusion attempt is not repeated: a widget that is still covered
    /// afterwards comes back as [`SearchOutcome::StillOccluded`].
    pub fn make_node_visible(&mut self, id: &UniqueId) -> SearchOutcome {
        let Some(found) = self.locate(id) else {
            self.trace(id, SearchPhase::Stuck, |e| e.with_note("not found"));
            return SearchOutcome::NotFound;
        };

        let snapshot = Arc::clone(found.snapshot());
        let Some(target) = snapshot.get(found.id()) else {
            return SearchOutcome::NotFound;
        };

        if !self.analyzer.is_occluded(target, snapshot.root()) {
            self.trace(id, SearchPhase::Visible, |e| e.with_snapshot(&snapshot));
            return SearchOutcome::Visible(found);
        }

        let occluders = self.analyzer.occluders().to_vec();
        debug!(serial = %self.bridge.serial(), id = %id, count = occluders.len(), "widget is occluded");
        self.trace(id, SearchPhase::CheckOcclusion, |e| {
            e.with_snapshot(&snapshot).with_occluders(
                occluders
                    .iter()
                    .filter_map(|o| snapshot.get(*o))
                    .map(|n| n.data().unique_id()),
            )
        });

        let Some(after) = self.unocclude(id, target, &occluders) else {
            warn!(serial = %self.bridge.serial(), id = %id, "could not move widget clear of occluders");
            self.trace(id, SearchPhase::Stuck, |e| e.with_note("no unocclusion drag"));
            return SearchOutcome::StillOccluded(found);
        };

        self.trace(id, SearchPhase::Recheck, |e| e.with_snapshot(&after));
        let Some(node) = after.find(id) else {
            warn!(serial = %self.bridge.serial(), id = %id, "widget lost after unocclusion drag");
            self.trace(id, SearchPhase::Stuck, |e| e.with_note("lost after drag"));
            return SearchOutcome::NotFound;
        };

        let still_occluded = self.analyzer.is_occluded(node, after.root());
        let Some(handle) = NodeHandle::new(Arc::clone(&after), node.id()) else {
            return SearchOutcome::NotFound;
        };

        if still_occluded {
            info!(serial = %self.bridge.serial(), id = %id, "widget still occluded, returning best effort");
            self.trace(id, SearchPhase::Stuck, |e| e.with_note("still occluded"));
            SearchOutcome::StillOccluded(handle)
        } else {
            self.trace(id, SearchPhase::Visible, |e| e.with_snapshot(&after));
            SearchOutcome::Visible(handle)
        }
    }

    /// Resolve `id` against the current generation, walking its path from the
    /// root. Path segments that fall outside the rendered children send the
    /// search into [`drag_to_index`](Self::drag_to_index).
    pub fn locate(&mut self, id: &UniqueId) -> Option<NodeHandle> {
        let Some(mut snapshot) = self.source.current() else {
            debug!(serial = %self.bridge.serial(), "no snapshot to search");
            return None;
        };
        self.trace(id, SearchPhase::Locate, |e| e.with_snapshot(&snapshot));

        let (first, rest) = id.segments().split_first()?;
        if snapshot.root().index() != *first {
            return None;
        }
        let mut current = snapshot.root().id();

        for (offset, &segment) in rest.iter().enumerate() {
            let wanted = id.prefix(offset + 2);
            let node = snapshot.get(current)?;

            let reveal = match (node.first_child(), node.last_child()) {
                (Some(first), Some(last)) => {
                    if segment < first.index() {
                        Some(Reveal::Earlier)
                    } else if segment > last.index() {
                        Some(Reveal::Later)
                    } else {
                        None
                    }
                }
                _ => Some(self.reveal_for_unrendered(node)),
            };

            match reveal {
                None => current = node.child_with_index(segment)?.id(),
                Some(reveal) => {
                    self.trace(id, SearchPhase::SeekIndex, |e| {
                        e.with_snapshot(&snapshot)
                            .with_note(format!("{:?} toward {}", reveal, wanted))
                    });
                    let found = self.drag_to_index(&snapshot, current, &wanted, reveal)?;
                    current = found.id();
                    snapshot = Arc::clone(found.snapshot());
                }
            }
        }

        NodeHandle::new(snapshot, current)
    }

    /// Drag the container of `parent` until the child `wanted` shows up
    /// unoccluded, or until a drag leaves the hierarchy unchanged.
    pub fn drag_to_index(
        &mut self,
        snapshot: &Arc<Snapshot>,
        parent: NodeId,
        wanted: &UniqueId,
        reveal: Reveal,
    ) -> Option<NodeHandle> {
        let parent = snapshot.get(parent)?;
        let Some(container) = scroll_container(parent) else {
            debug!(serial = %self.bridge.serial(), id = %wanted, "no scroll container to seek with");
            return None;
        };

        let axis = self.settings.scroll_axis(&container);
        let gesture = DragDirection::revealing(axis, reveal).gesture(
            container.bounds(),
            self.settings.drag_steps,
            self.settings.drag_duration_ms,
        );

        let mut previous = Arc::clone(snapshot);
        let mut drags = 0usize;
        loop {
            if self.settings.max_seek_drags.is_some_and(|cap| drags >= cap) {
                warn!(serial = %self.bridge.serial(), id = %wanted, drags, "seek drag limit reached");
                self.trace(wanted, SearchPhase::Stuck, |e| e.with_note("drag limit"));
                return None;
            }
            drags += 1;

            let next = self.drag_and_refresh(wanted, &gesture)?;
            if previous.same_hierarchy(&next) {
                info!(serial = %self.bridge.serial(), id = %wanted, drags, "hierarchy stopped changing, widget not found");
                self.trace(wanted, SearchPhase::Stuck, |e| {
                    e.with_snapshot(&next).with_note("hierarchy unchanged")
                });
                return None;
            }

            if let Some(found) = next.find(wanted) {
                if !self.analyzer.is_occluded(found, next.root()) {
                    return NodeHandle::new(Arc::clone(&next), found.id());
                }
            }
            previous = next;
        }
    }

    /// The single unocclusion drag. Returns the generation captured after it.
    fn unocclude(
        &mut self,
        id: &UniqueId,
        target: NodeRef<'_>,
        occluders: &[NodeId],
    ) -> Option<Arc<Snapshot>> {
        let container = scroll_parent_below_common(target, occluders)?;
        self.trace(id, SearchPhase::FindScrollParent, |e| {
            e.with_note(format!("container {}", container.unique_id()))
        });

        let axis = self.settings.scroll_axis(&container);
        let gesture = unocclusion_gesture(target, container, axis, self.settings)?;
        self.drag_and_refresh(id, &gesture)
    }

    fn drag_and_refresh(&mut self, target: &UniqueId, gesture: &DragGesture) -> Option<Arc<Snapshot>> {
        self.trace(target, SearchPhase::Drag, |e| e.with_drag(gesture));
        if let Err(e) = self.bridge.drag(gesture) {
            warn!(serial = %self.bridge.serial(), error = %e, "drag failed");
            return None;
        }

        if self.settings.settle_ms > 0 {
            thread::sleep(Duration::from_millis(self.settings.settle_ms));
        }

        let next = self.source.refresh_and_wait();
        match &next {
            Some(snapshot) => self.trace(target, SearchPhase::Refresh, |e| e.with_snapshot(snapshot)),
            None => warn!(serial = %self.bridge.serial(), "no snapshot after drag"),
        }
        next
    }

    /// Guess which way to seek when a node has no rendered children: nodes
    /// past the middle of the screen seek later content.
    fn reveal_for_unrendered(&self, node: NodeRef<'_>) -> Reveal {
        let axis = scroll_container(node)
            .map(|c| self.settings.scroll_axis(&c))
            .unwrap_or(Axis::Vertical);
        let middle = node.snapshot().root().bounds().length(axis) / 2;
        if node.clickable_center().along(axis) > middle {
            Reveal::Later
        } else {
            Reveal::Earlier
        }
    }

    fn trace(&self, target: &UniqueId, phase: SearchPhase, build: impl FnOnce(TraceEvent) -> TraceEvent) {
        if let Some(tracer) = self.tracer {
            tracer.log(&build(TraceEvent::now(self.bridge.serial(), target, phase)));
        }
    }
}

// ============================================================================
// Geometry helpers
// ============================================================================

/// Nearest scrollable node among `node` and its ancestors.
pub fn scroll_container(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    if node.is_scrollable() {
        Some(node)
    } else {
        node.first_scrollable_ancestor()
    }
}

/// Scroll container that moves `target` without moving its occluders.
///
/// For each occluder, the target's path is walked from the first segment
/// where the two paths diverge; the first scrollable node found there (other
/// than the target itself) is a candidate. The shallowest candidate wins.
pub fn scroll_parent_below_common<'a>(
    target: NodeRef<'a>,
    occluders: &[NodeId],
) -> Option<NodeRef<'a>> {
    let snapshot = target.snapshot();
    let mut chain: Vec<NodeRef<'a>> = target.ancestors().collect();
    chain.reverse();
    chain.push(target);

    let mut best: Option<NodeRef<'a>> = None;
    for occluder in occluders.iter().filter_map(|id| snapshot.get(*id)) {
        let Some(diverge) = target.unique_id().first_divergence(occluder.unique_id()) else {
            continue;
        };

        let candidate = chain
            .iter()
            .skip(diverge.max(1))
            .copied()
            .find(|n| n.is_scrollable() && *n != target);

        if let Some(c) = candidate {
            best = match best {
                Some(b) if b.unique_id().depth() <= c.unique_id().depth() => Some(b),
                _ => Some(c),
            };
        }
    }
    best
}

/// Open/closed map of the screen along `axis`: every node outside the
/// target's ancestor line and outside `container` closes its extent.
pub fn open_span_map(target: NodeRef<'_>, container: NodeRef<'_>, axis: Axis) -> OpenSpanMap {
    let root = target.snapshot().root();
    let length = root.bounds().length(axis).clamp(0, MAX_COORDINATE);
    let mut map = OpenSpanMap::new(length as usize);

    for candidate in root.descendants() {
        if target.is_within(candidate) || candidate.is_within(container) {
            continue;
        }
        let (start, end) = candidate.bounds().span(axis);
        map.close(start, end);
    }
    map
}

/// Drag that moves the target's centre onto the middle of the largest open
/// area, ending inside the root bounds. `None` when the whole axis is covered.
pub fn unocclusion_gesture(
    target: NodeRef<'_>,
    container: NodeRef<'_>,
    axis: Axis,
    settings: &SearchSettings,
) -> Option<DragGesture> {
    let run = open_span_map(target, container, axis).longest_open_run()?;
    let midpoint = i32::try_from(run.midpoint()).unwrap_or(i32::MAX);
    let delta = midpoint.saturating_sub(target.bounds().center().along(axis));
    let from = container.bounds().center();
    let to = target.snapshot().root().data().bounds().clamp_point(from.shifted(axis, delta));
    Some(DragGesture::new(
        from,
        to,
        settings.drag_steps,
        settings.drag_duration_ms,
    ))
}
