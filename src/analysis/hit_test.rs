use crate::analysis::search_model::LIST_VIEW_CLASS;
use crate::tree::snapshot::NodeRef;

/// Maps a screen point to the widget a tap there would address.
#[derive(Debug, Clone)]
pub struct HitTester {
    list_classes: Vec<String>,
}

impl Default for HitTester {
    fn default() -> Self {
        Self {
            list_classes: vec![LIST_VIEW_CLASS.to_string()],
        }
    }
}

impl HitTester {
    pub fn new(list_classes: Vec<String>) -> Self {
        Self { list_classes }
    }

    /// Most specific interactable node under `(x, y)`.
    ///
    /// Clickable nodes containing the point are collected deepest-first (a
    /// node whose descendant already matched is not a candidate) and the
    /// shallowest candidate wins. When that candidate is a list container the
    /// search is repeated inside it for any node, clickable or not, and the
    /// deepest match is returned, since list rows are rarely clickable
    /// themselves.
    pub fn locate<'a>(&self, root: NodeRef<'a>, x: i32, y: i32) -> Option<NodeRef<'a>> {
        let mut hits = Vec::new();
        collect_hits(root, x, y, true, &mut hits);
        let top = shallowest(&hits)?;

        if !self.is_list(&top) {
            return Some(top);
        }

        hits.clear();
        collect_hits(top, x, y, false, &mut hits);
        deepest(&hits).or(Some(top))
    }

    fn is_list(&self, node: &NodeRef<'_>) -> bool {
        let class = node.class_name().trim();
        self.list_classes.iter().any(|c| c == class)
    }
}

/// Returns whether `node` or something beneath it claimed the point.
fn collect_hits<'a>(
    node: NodeRef<'a>,
    x: i32,
    y: i32,
    clickable_only: bool,
    hits: &mut Vec<NodeRef<'a>>,
) -> bool {
    let mut child_match = false;
    for child in node.children() {
        child_match |= collect_hits(child, x, y, clickable_only, hits);
    }
    if child_match {
        return true;
    }

    if node.bounds().contains(x, y) && (!clickable_only || node.is_clickable()) {
        hits.push(node);
        true
    } else {
        false
    }
}

fn shallowest<'a>(hits: &[NodeRef<'a>]) -> Option<NodeRef<'a>> {
    hits.iter()
        .copied()
        .min_by_key(|n| n.unique_id().depth())
}

fn deepest<'a>(hits: &[NodeRef<'a>]) -> Option<NodeRef<'a>> {
    hits.iter().copied().fold(None, |best, n| match best {
        Some(b) if b.unique_id().depth() >= n.unique_id().depth() => Some(b),
        _ => Some(n),
    })
}
