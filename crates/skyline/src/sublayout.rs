//! Sublayouts: subtrees laid out by their own node layout and embedded into the city.
//!
//! Sublayouts are composed innermost first. Each one lays out its subtree, folds the already
//! composed sublayouts nested in it into its own node set, optionally recomputes the bounding
//! box of its root, and finally expresses every node of the subtree relative to the root so the
//! whole block can later be moved as one piece.

use rustc_hash::FxHashSet;
use skyline_hierarchy::hierarchy::{descendants, set_all_levels};
use skyline_hierarchy::{LayoutGraph, NodeId};

use crate::Vec3;
use crate::edges::LayoutEdge;
use crate::error::{Error, Result};
use crate::layout::{
    LayoutRegistry, NodeLayout, NodeLayoutKind, NodeLayoutModel, NodeLayoutSettings, bounding_box,
};

/// Designates the subtree below `root` to be laid out with `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SublayoutSpec {
    pub root: NodeId,
    pub kind: NodeLayoutKind,
}

/// A composed sublayout.
#[derive(Debug, Clone, PartialEq)]
pub struct Sublayout {
    pub root: NodeId,
    pub kind: NodeLayoutKind,
    pub model: NodeLayoutModel,
    /// Nodes handed to the inner layout plus the nodes of embedded nested sublayouts.
    pub nodes: Vec<NodeId>,
    /// Descendants of the root that belong to nested sublayouts.
    pub removed_children: Vec<NodeId>,
    /// Every node of the subtree except the root; all of them are relative to the root.
    pub members: Vec<NodeId>,
    pub layout_scale: Vec3,
    /// Realized minus declared root center; zero unless the bounding box was recomputed for a
    /// hierarchical layout.
    pub layout_offset: Vec3,
    /// Scale the root had before its bounding box was recomputed.
    pub root_node_real_scale: Vec3,
}

impl Sublayout {
    /// Moves the root to `center` and every member along with it.
    pub fn translate_to(&self, graph: &mut LayoutGraph, center: Vec3) {
        graph.node_mut(self.root).center_position = center;
        self.embed(graph);
    }

    /// Re-derives the members' positions from the current root center and gives them the root's
    /// rotation.
    pub fn embed(&self, graph: &mut LayoutGraph) {
        let rotation = graph.node(self.root).rotation;
        for &n in &self.members {
            graph.node_mut(n).rotation = rotation;
            graph.set_origin(n, self.root);
        }
    }
}

/// Composes every sublayout in `specs`, innermost first, and returns them in that order.
///
/// All layout kinds are resolved and checked before the graph is touched, so an unsupported
/// kind, or a sublayout nested in one whose layout cannot host it, leaves the graph unchanged.
pub fn compose_sublayouts(
    graph: &mut LayoutGraph,
    edges: &[LayoutEdge],
    specs: &[SublayoutSpec],
    registry: &LayoutRegistry,
    settings: &NodeLayoutSettings,
) -> Result<Vec<Sublayout>> {
    let mut resolved: Vec<(SublayoutSpec, Box<dyn NodeLayout>)> = Vec::with_capacity(specs.len());
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    for spec in specs {
        if !graph.contains(spec.root) {
            return Err(Error::InvalidParameter {
                name: "sublayout root",
                message: format!("node #{} does not exist", spec.root.index()),
            });
        }
        if !seen.insert(spec.root) {
            return Err(Error::InvalidParameter {
                name: "sublayout root",
                message: format!("{} is designated twice", graph.node(spec.root).id),
            });
        }
        resolved.push((*spec, registry.resolve(spec.kind, settings)?));
    }
    for (spec, _) in &resolved {
        let mut cursor = graph.parent(spec.root);
        while let Some(p) = cursor {
            if let Some((outer, layout)) = resolved.iter().find(|(s, _)| s.root == p) {
                if !layout.model().can_apply_sublayouts {
                    return Err(Error::CannotHostSublayouts { kind: outer.kind });
                }
                break;
            }
            cursor = graph.parent(p);
        }
    }

    set_all_levels(graph);
    for (spec, _) in &resolved {
        let root = graph.node_mut(spec.root);
        root.is_sublayout_root = true;
        root.sublayout_root = Some(spec.root);
    }
    resolved.sort_by_key(|(spec, _)| std::cmp::Reverse(graph.node(spec.root).level));

    let mut composed: Vec<Sublayout> = Vec::with_capacity(resolved.len());
    for (spec, layout) in &resolved {
        let sublayout = compose_one(graph, edges, *spec, layout.as_ref(), &seen, &composed)?;
        tracing::debug!(
            root = %graph.node(spec.root).id,
            layout = layout.name(),
            nodes = sublayout.nodes.len(),
            "composed sublayout"
        );
        composed.push(sublayout);
    }
    Ok(composed)
}

fn compose_one(
    graph: &mut LayoutGraph,
    edges: &[LayoutEdge],
    spec: SublayoutSpec,
    layout: &dyn NodeLayout,
    sublayout_roots: &FxHashSet<NodeId>,
    composed: &[Sublayout],
) -> Result<Sublayout> {
    let root = spec.root;
    let model = layout.model();
    let subtree = descendants(graph, root);

    let nested_roots: Vec<NodeId> = subtree
        .iter()
        .copied()
        .filter(|v| *v != root && sublayout_roots.contains(v))
        .collect();
    let mut removed: FxHashSet<NodeId> = FxHashSet::default();
    for &nested in &nested_roots {
        removed.extend(descendants(graph, nested));
    }
    let removed_children: Vec<NodeId> = subtree
        .iter()
        .copied()
        .filter(|v| removed.contains(v))
        .collect();
    let own: Vec<NodeId> = subtree
        .iter()
        .copied()
        .filter(|v| !removed.contains(v))
        .collect();
    let members: Vec<NodeId> = subtree.iter().copied().filter(|v| *v != root).collect();

    let mut sublayout = Sublayout {
        root,
        kind: spec.kind,
        model,
        nodes: Vec::new(),
        removed_children,
        members,
        layout_scale: graph.node(root).absolute_scale,
        layout_offset: Vec3::zeros(),
        root_node_real_scale: graph.node(root).absolute_scale,
    };

    if graph.children(root).is_empty() {
        return Ok(sublayout);
    }

    // Collect.
    let mut nodes: Vec<NodeId> = own
        .iter()
        .copied()
        .filter(|v| *v != root)
        .filter(|v| !model.only_leaves || graph.node(*v).is_leaf)
        .collect();
    if !model.only_leaves {
        nodes.push(root);
    }
    // Leaf-only layouts never see the nested roots; they are inner nodes.
    let pending_nested: Vec<NodeId> = if model.only_leaves {
        Vec::new()
    } else {
        sublayout
            .removed_children
            .iter()
            .copied()
            .filter(|v| graph.node(*v).is_sublayout_root)
            .collect()
    };
    nodes.extend(pending_nested.iter().copied());
    for &v in &nodes {
        graph.node_mut(v).is_sublayout_node = true;
    }

    // Delegate.
    let result = if layout.uses_edges_and_sublayout_nodes() {
        let set: FxHashSet<NodeId> = nodes.iter().copied().collect();
        let induced: Vec<LayoutEdge> = edges
            .iter()
            .filter(|e| set.contains(&e.source) && set.contains(&e.target))
            .cloned()
            .collect();
        layout.layout_with_edges(graph, &nodes, &induced, &pending_nested)?
    } else {
        layout.layout(graph, &nodes)?
    };

    // Apply.
    let mut embedded: Vec<NodeId> = Vec::new();
    for (&v, transform) in &result {
        let node = graph.node_mut(v);
        node.apply(transform);
        node.relative_position = node.center_position;
        if v == root {
            sublayout.layout_scale = transform.scale;
            continue;
        }
        if !node.is_sublayout_root {
            continue;
        }
        node.is_sublayout_root = false;
        if let Some(nested) = composed.iter().find(|s| s.root == v) {
            nested.embed(graph);
            embedded.extend(nested.members.iter().copied());
        }
    }
    nodes.extend(embedded);

    // Recompute the root's bounding box.
    if !model.inner_nodes_enclose_leaves {
        let placed: Vec<NodeId> = nodes.iter().copied().filter(|v| *v != root).collect();
        if !placed.is_empty() {
            let (min, max) = bounding_box(graph, &placed);
            let declared = graph.node(root).center_position;
            let height = layout.inner_node_height();
            let scale = Vec3::new(max.x - min.x, height, max.z - min.z);
            // The root stands on the lowest ground of its members.
            let center = Vec3::new(
                (min.x + max.x) / 2.0,
                min.y + height / 2.0,
                (min.z + max.z) / 2.0,
            );
            sublayout.layout_scale = scale;
            if !model.only_leaves {
                let real = graph.node(root).absolute_scale;
                sublayout.root_node_real_scale = Vec3::new(real.x, height, real.z);
                sublayout.layout_offset = center - declared;
            }
            let root_node = graph.node_mut(root);
            root_node.absolute_scale = scale;
            root_node.center_position = center;
            root_node.is_sublayout_node = true;
        }
    }

    // Re-base.
    for &n in &sublayout.members {
        graph.set_relative(n, root);
        graph.node_mut(n).sublayout_root = Some(root);
    }
    sublayout.nodes = nodes;
    Ok(sublayout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyline_hierarchy::LayoutNode;

    #[test]
    fn duplicate_designations_are_rejected() {
        let mut g = LayoutGraph::new();
        let r = g.add_node(LayoutNode::new("r")).unwrap();
        let spec = SublayoutSpec {
            root: r,
            kind: NodeLayoutKind::RectanglePacking,
        };
        let err = compose_sublayouts(
            &mut g,
            &[],
            &[spec, spec],
            &LayoutRegistry::new(),
            &NodeLayoutSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn unsupported_kind_leaves_the_graph_untouched() {
        let mut g = LayoutGraph::new();
        let r = g
            .add_node(LayoutNode::inner("r", Vec3::new(5.0, 1.0, 5.0)))
            .unwrap();
        let c = g
            .add_node(LayoutNode::leaf("c", Vec3::new(1.0, 1.0, 1.0)))
            .unwrap();
        g.set_parent(c, r).unwrap();
        let before = g.clone();
        let err = compose_sublayouts(
            &mut g,
            &[],
            &[SublayoutSpec {
                root: r,
                kind: NodeLayoutKind::Balloon,
            }],
            &LayoutRegistry::new(),
            &NodeLayoutSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedLayout { kind: NodeLayoutKind::Balloon }));
        assert_eq!(g.node(r), before.node(r));
        assert_eq!(g.node(c), before.node(c));
    }
}
