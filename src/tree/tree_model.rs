use serde::Serialize;

use crate::tree::{geometry::Bounds, identity::UniqueId};

/// Index of a node inside its snapshot's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NodeFlags {
    pub not_accessibility_friendly: bool,
    pub checkable: bool,
    pub checked: bool,
    pub clickable: bool,
    pub enabled: bool,
    pub focusable: bool,
    pub focused: bool,
    pub scrollable: bool,
    pub long_clickable: bool,
    pub password: bool,
    pub selected: bool,
}

/// Attributes of one widget element, as read from the dump.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NodeInfo {
    pub index: u32,
    pub text: String,
    pub class_name: String,
    pub package: String,
    pub content_desc: String,
    pub flags: NodeFlags,
    pub bounds: Bounds,
}

impl NodeInfo {
    /// Compare everything except geometry, which differs between devices.
    pub fn same_minus_position(&self, other: &NodeInfo) -> bool {
        self.index == other.index
            && self.flags == other.flags
            && self.text == other.text
            && self.class_name == other.class_name
            && self.package == other.package
            && self.content_desc == other.content_desc
    }
}

/// One widget within a snapshot generation. Never mutated once the snapshot
/// is built.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub(crate) unique_id: UniqueId,
    pub(crate) info: NodeInfo,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
    #[serde(skip)]
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    pub fn index(&self) -> u32 {
        self.info.index
    }

    pub fn bounds(&self) -> &Bounds {
        &self.info.bounds
    }

    pub fn flags(&self) -> &NodeFlags {
        &self.info.flags
    }

    pub fn class_name(&self) -> &str {
        &self.info.class_name
    }

    pub fn text(&self) -> &str {
        &self.info.text
    }

    pub fn is_clickable(&self) -> bool {
        self.info.flags.clickable
    }

    pub fn is_scrollable(&self) -> bool {
        self.info.flags.scrollable
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Attribute equality including identity and geometry, ignoring links.
    pub fn same_attributes(&self, other: &Node) -> bool {
        self.unique_id == other.unique_id && self.info == other.info
    }

    /// Attribute equality without geometry.
    pub fn same_attributes_minus_position(&self, other: &Node) -> bool {
        self.unique_id == other.unique_id && self.info.same_minus_position(&other.info)
    }
}
