use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use sha1::{Digest, Sha1};

use crate::tree::{
    geometry::Point,
    identity::UniqueId,
    tree_model::{Node, NodeId, NodeInfo},
};

/// One generation of a device's widget hierarchy.
///
/// Nodes live in a flat arena; parent and child links are arena indices, so a
/// snapshot is a single immutable value that can be shared behind an `Arc` and
/// dropped as a whole when the next generation is published.
#[derive(Debug, Clone)]
pub struct Snapshot {
    nodes: Vec<Node>,
    generation: u64,
}

impl Snapshot {
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            snapshot: self,
            id: NodeId(0),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        if id.0 < self.nodes.len() {
            Some(NodeRef { snapshot: self, id })
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stamp the generation number. Only done before the snapshot is shared.
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Resolve an id by walking its path from the root, matching each
    /// segment against the children's `index` attribute. No scrolling.
    pub fn find(&self, id: &UniqueId) -> Option<NodeRef<'_>> {
        let (first, rest) = id.segments().split_first()?;
        let mut node = self.root();
        if node.index() != *first {
            return None;
        }
        for segment in rest {
            node = node.child_with_index(*segment)?;
        }
        Some(node)
    }

    /// Deep structural comparison of two generations.
    pub fn same_hierarchy(&self, other: &Snapshot) -> bool {
        same_hierarchy(self.root(), other.root())
    }

    /// Indented, one line per node.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for node in self.root().descendants() {
            let depth = node.unique_id().depth().saturating_sub(1);
            out.push_str(&"  ".repeat(depth));
            out.push_str(&format!(
                "node: {} index: {} class: {} bounds: {}",
                node.unique_id(),
                node.index(),
                node.class_name(),
                node.bounds()
            ));
            if !node.text().is_empty() {
                out.push_str(&format!(" text: {:?}", node.text()));
            }
            out.push('\n');
        }
        out
    }

    /// SHA-1 of the rendered hierarchy. Used to correlate trace entries.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha1::new();
        hasher.update(self.render().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Recursive attribute and child-count equality, node by node.
pub fn same_hierarchy(a: NodeRef<'_>, b: NodeRef<'_>) -> bool {
    if !a.same_attributes(&b) || a.child_count() != b.child_count() {
        return false;
    }
    a.children()
        .zip(b.children())
        .all(|(x, y)| same_hierarchy(x, y))
}

// ============================================================================
// Builder
// ============================================================================

/// Assembles a snapshot top-down, assigning unique ids as nodes are attached.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    nodes: Vec<Node>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_root(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Add the root node. Returns `None` when a root already exists.
    pub fn add_root(&mut self, info: NodeInfo) -> Option<NodeId> {
        if self.has_root() {
            return None;
        }
        self.nodes.push(Node {
            unique_id: UniqueId::root(info.index),
            info,
            parent: None,
            children: Vec::new(),
        });
        Some(NodeId(0))
    }

    /// Attach a child under `parent`. Returns `None` for an unknown parent.
    pub fn add_child(&mut self, parent: NodeId, info: NodeInfo) -> Option<NodeId> {
        let unique_id = self.nodes.get(parent.0)?.unique_id.child(info.index);
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            unique_id,
            info,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    pub fn build(self) -> Option<Snapshot> {
        if self.nodes.is_empty() {
            return None;
        }
        Some(Snapshot {
            nodes: self.nodes,
            generation: 0,
        })
    }
}

// ============================================================================
// Borrowed node reference
// ============================================================================

/// A node together with the snapshot it belongs to.
///
/// Equality is identity: same snapshot instance and same arena slot. An
/// equal-looking node from another generation is never `==`.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    snapshot: &'a Snapshot,
    id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.snapshot, other.snapshot) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("unique_id", &self.unique_id().to_string())
            .field("generation", &self.snapshot.generation)
            .field("class", &self.class_name())
            .field("bounds", self.bounds())
            .finish()
    }
}

impl Deref for NodeRef<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.snapshot.nodes[self.id.0]
    }
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    fn at(&self, id: NodeId) -> NodeRef<'a> {
        NodeRef {
            snapshot: self.snapshot,
            id,
        }
    }

    /// The node's data, borrowed for the snapshot's lifetime.
    pub fn data(&self) -> &'a Node {
        &self.snapshot.nodes[self.id.0]
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|p| self.at(p))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        let snapshot = self.snapshot;
        self.data()
            .children
            .iter()
            .map(move |&id| NodeRef { snapshot, id })
    }

    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.data().children.first().map(|&id| self.at(id))
    }

    pub fn last_child(&self) -> Option<NodeRef<'a>> {
        self.data().children.last().map(|&id| self.at(id))
    }

    /// Child whose `index` attribute equals `index`.
    pub fn child_with_index(&self, index: u32) -> Option<NodeRef<'a>> {
        self.children().find(|c| c.index() == index)
    }

    /// Parent chain, nearest first, excluding `self`.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// True if `self` is `ancestor` or lies anywhere beneath it.
    pub fn is_within(&self, ancestor: NodeRef<'_>) -> bool {
        if !std::ptr::eq(self.snapshot, ancestor.snapshot) {
            return false;
        }
        self.id == ancestor.id || self.ancestors().any(|a| a.id == ancestor.id)
    }

    /// Nearest scrollable ancestor, excluding `self`.
    pub fn first_scrollable_ancestor(&self) -> Option<NodeRef<'a>> {
        self.ancestors().find(|a| a.is_scrollable())
    }

    /// Pre-order walk of the subtree rooted at `self`, `self` first.
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants {
            snapshot: self.snapshot,
            stack: vec![self.id],
        }
    }

    /// Centre of the node after clamping its bounds to the screen.
    pub fn clickable_center(&self) -> Point {
        let screen = self.snapshot.root().data().info.bounds;
        self.bounds().clamped_to(&screen).center()
    }
}

pub struct Descendants<'a> {
    snapshot: &'a Snapshot,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.snapshot.nodes[id.0];
        self.stack.extend(node.children.iter().rev());
        Some(NodeRef {
            snapshot: self.snapshot,
            id,
        })
    }
}

// ============================================================================
// Owned node handle
// ============================================================================

/// A node that keeps its generation alive. Returned by the query API.
#[derive(Clone)]
pub struct NodeHandle {
    snapshot: Arc<Snapshot>,
    id: NodeId,
}

impl NodeHandle {
    pub fn new(snapshot: Arc<Snapshot>, id: NodeId) -> Option<Self> {
        snapshot.get(id)?;
        Some(Self { snapshot, id })
    }

    pub fn node(&self) -> NodeRef<'_> {
        NodeRef {
            snapshot: &self.snapshot,
            id: self.id,
        }
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn unique_id(&self) -> &UniqueId {
        &self.snapshot.nodes[self.id.0].unique_id
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.node().fmt(f)
    }
}
