//! Level assignment, root discovery and subtree walks over a [`LayoutGraph`].

use crate::graph::LayoutGraph;
use crate::node::NodeId;

/// Assigns level 0 to every node in `roots` and `parent.level + 1` to their descendants.
///
/// Nodes not reachable from `roots` keep whatever level they had.
pub fn set_levels(graph: &mut LayoutGraph, roots: &[NodeId]) {
    let mut stack: Vec<(NodeId, usize)> = roots.iter().map(|r| (*r, 0)).collect();
    while let Some((v, level)) = stack.pop() {
        graph.node_mut(v).level = level;
        stack.extend(graph.children(v).iter().map(|c| (*c, level + 1)));
    }
}

/// [`set_levels`] over every root of the graph.
pub fn set_all_levels(graph: &mut LayoutGraph) {
    let roots = all_roots(graph);
    set_levels(graph, &roots);
}

/// The nodes of `nodes` without a parent, in input order.
pub fn roots(graph: &LayoutGraph, nodes: &[NodeId]) -> Vec<NodeId> {
    nodes
        .iter()
        .copied()
        .filter(|v| graph.is_root(*v))
        .collect()
}

pub fn all_roots(graph: &LayoutGraph) -> Vec<NodeId> {
    graph.ids().filter(|v| graph.is_root(*v)).collect()
}

/// Depth-first preorder of the subtree below `root`, starting with `root` itself.
pub fn descendants(graph: &LayoutGraph, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(v) = stack.pop() {
        out.push(v);
        stack.extend(graph.children(v).iter().rev().copied());
    }
    out
}

/// The path `child, parent(child), ...` up to and including `ancestor`.
///
/// If `ancestor` is not above `child` the path ends at the root of `child`'s tree.
pub fn ancestors(graph: &LayoutGraph, child: NodeId, ancestor: NodeId) -> Vec<NodeId> {
    let mut path = vec![child];
    let mut cursor = child;
    while cursor != ancestor {
        match graph.parent(cursor) {
            Some(p) => {
                path.push(p);
                cursor = p;
            }
            None => break,
        }
    }
    path
}

/// Deepest level below `roots`, counting each root as level 0.
pub fn max_level(graph: &LayoutGraph, roots: &[NodeId]) -> usize {
    let mut max = 0;
    let mut stack: Vec<(NodeId, usize)> = roots.iter().map(|r| (*r, 0)).collect();
    while let Some((v, level)) = stack.pop() {
        max = max.max(level);
        stack.extend(graph.children(v).iter().map(|c| (*c, level + 1)));
    }
    max
}
