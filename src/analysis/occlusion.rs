use tracing::debug;

use crate::tree::{snapshot::NodeRef, tree_model::NodeId};

/// `candidate` covers part of `target` and is neither its ancestor nor its
/// descendant. A node never occludes itself.
pub fn occludes(target: NodeRef<'_>, candidate: NodeRef<'_>) -> bool {
    !target.is_within(candidate)
        && !candidate.is_within(target)
        && target.bounds().intersects(candidate.bounds())
}

/// Every node under `root` that occludes `target`, in pre-order.
///
/// Both nodes must come from the same generation; mixing generations finds
/// nothing.
pub fn find_occluders<'a>(target: NodeRef<'a>, root: NodeRef<'a>) -> Vec<NodeRef<'a>> {
    if !std::ptr::eq(target.snapshot(), root.snapshot()) {
        debug!("occlusion check across generations ignored");
        return Vec::new();
    }
    root.descendants().filter(|c| occludes(target, *c)).collect()
}

/// Occlusion check that remembers the occluders of its latest call.
///
/// The list is replaced on every call, so repeated checks during a scroll
/// search never accumulate state.
#[derive(Debug, Default)]
pub struct OcclusionAnalyzer {
    occluders: Vec<NodeId>,
}

impl OcclusionAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_occluded(&mut self, target: NodeRef<'_>, root: NodeRef<'_>) -> bool {
        self.occluders.clear();
        self.occluders
            .extend(find_occluders(target, root).into_iter().map(|n| n.id()));
        !self.occluders.is_empty()
    }

    /// Occluders found by the most recent `is_occluded` call.
    pub fn occluders(&self) -> &[NodeId] {
        &self.occluders
    }
}
