use serde::{Deserialize, Serialize};

use crate::device::device_model::{DEFAULT_DRAG_DURATION_MS, DEFAULT_DRAG_STEPS, DragGesture};
use crate::tree::{
    geometry::{Axis, Bounds, Point},
    snapshot::{NodeHandle, NodeRef},
};

pub const HORIZONTAL_SCROLL_CLASS: &str = "android.widget.HorizontalScrollView";
pub const LIST_VIEW_CLASS: &str = "android.widget.ListView";

/// Tunables for hit testing and scroll search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_drag_duration")]
    pub drag_duration_ms: u64,

    #[serde(default = "default_drag_steps")]
    pub drag_steps: u32,

    /// Pause after each drag so the UI settles before the next dump.
    #[serde(default = "default_settle")]
    pub settle_ms: u64,

    #[serde(default = "default_horizontal_classes")]
    pub horizontal_scroll_classes: Vec<String>,

    #[serde(default = "default_list_classes")]
    pub list_classes: Vec<String>,

    /// Hard cap on drags while seeking a lazily rendered child. `None` means
    /// drag until the hierarchy stops changing.
    #[serde(default)]
    pub max_seek_drags: Option<usize>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            drag_duration_ms: default_drag_duration(),
            drag_steps: default_drag_steps(),
            settle_ms: default_settle(),
            horizontal_scroll_classes: default_horizontal_classes(),
            list_classes: default_list_classes(),
            max_seek_drags: None,
        }
    }
}

impl SearchSettings {
    /// Axis a scroll container moves along, judged by its class.
    pub fn scroll_axis(&self, container: &NodeRef<'_>) -> Axis {
        let class = container.class_name().trim();
        if self.horizontal_scroll_classes.iter().any(|c| c == class) {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }
}

fn default_drag_duration() -> u64 { DEFAULT_DRAG_DURATION_MS }
fn default_drag_steps() -> u32 { DEFAULT_DRAG_STEPS }
fn default_settle() -> u64 { 300 }
fn default_horizontal_classes() -> Vec<String> { vec![HORIZONTAL_SCROLL_CLASS.to_string()] }
fn default_list_classes() -> Vec<String> { vec![LIST_VIEW_CLASS.to_string()] }

// ============================================================================
// Search state machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Locate,
    SeekIndex,
    CheckOcclusion,
    FindScrollParent,
    Drag,
    Refresh,
    Recheck,
    Visible,
    Stuck,
}

/// Which part of a container's content a seek drag should bring on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    /// Children with lower indices than the first rendered one.
    Earlier,
    /// Children with higher indices than the last rendered one.
    Later,
}

/// Direction the finger travels, from the container's centre to one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DragDirection {
    Up,
    Down,
    Left,
    Right,
}

impl DragDirection {
    /// Dragging content down or right uncovers what precedes it.
    pub fn revealing(axis: Axis, reveal: Reveal) -> Self {
        match (axis, reveal) {
            (Axis::Vertical, Reveal::Earlier) => DragDirection::Down,
            (Axis::Vertical, Reveal::Later) => DragDirection::Up,
            (Axis::Horizontal, Reveal::Earlier) => DragDirection::Right,
            (Axis::Horizontal, Reveal::Later) => DragDirection::Left,
        }
    }

    /// Drag from the centre of `container` to the matching edge.
    pub fn gesture(&self, container: &Bounds, steps: u32, duration_ms: u64) -> DragGesture {
        let start = container.center();
        let end = match self {
            DragDirection::Up => Point::new(start.x, container.top_left.y),
            DragDirection::Down => Point::new(start.x, container.bottom_right.y),
            DragDirection::Left => Point::new(container.top_left.x, start.y),
            DragDirection::Right => Point::new(container.bottom_right.x, start.y),
        };
        DragGesture::new(start, end, steps, duration_ms)
    }
}

/// Result of a make-visible request.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// Found and not covered by anything.
    Visible(NodeHandle),
    /// Found, but the single unocclusion attempt did not clear it.
    StillOccluded(NodeHandle),
    NotFound,
}

impl SearchOutcome {
    /// Best-known node, occluded or not.
    pub fn node(&self) -> Option<&NodeHandle> {
        match self {
            SearchOutcome::Visible(n) | SearchOutcome::StillOccluded(n) => Some(n),
            SearchOutcome::NotFound => None,
        }
    }

    pub fn into_node(self) -> Option<NodeHandle> {
        match self {
            SearchOutcome::Visible(n) | SearchOutcome::StillOccluded(n) => Some(n),
            SearchOutcome::NotFound => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, SearchOutcome::Visible(_))
    }
}
