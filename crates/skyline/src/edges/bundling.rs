//! Hierarchical edge bundling.
//!
//! D. Holten, "Hierarchical Edge Bundles: Visualization of Adjacency Relations in Hierarchical
//! Data", IEEE TVCG 12(5), 2006. Control points follow the node hierarchy from the source up to
//! the lowest common ancestor and down to the target; their height encodes the hierarchy level.

use skyline_hierarchy::hierarchy::{ancestors, max_level, roots};
use skyline_hierarchy::{LayoutGraph, LcaFinder, NodeId};

use super::{EdgeFrame, EdgeLayout, LayoutEdge, anchor, check_ancestors, check_endpoints};
use crate::Vec3;
use crate::error::{Error, Result};
use crate::spline::{Spline, check_tension};

#[derive(Debug, Clone, Copy)]
pub struct BundledEdgeLayout {
    edges_above_blocks: bool,
    min_level_distance: f32,
    tension: f32,
}

/// Quantities derived from the node set at the start of a routing pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BundlingFrame {
    pub edges_above_blocks: bool,
    pub tension: f32,
    /// Vertical distance between two hierarchy levels.
    pub level_distance: f32,
    /// Height of control points of the deepest level.
    pub level_offset: f32,
    /// Deepest level below the roots of the node set; roots are level 0.
    pub max_level: usize,
}

impl BundlingFrame {
    /// Height of control points for nodes at `level`. `-1` stands for the virtual parent of
    /// all roots and sits one level distance beyond the roots.
    pub fn level_height(&self, level: i64) -> f32 {
        let relative = (self.max_level as i64 - level) as f32 * self.level_distance;
        if self.edges_above_blocks {
            self.level_offset + relative
        } else {
            self.level_offset - relative
        }
    }
}

impl BundledEdgeLayout {
    /// `tension` must lie within `[0, 1]`; `min_level_distance` must be positive.
    pub fn new(edges_above_blocks: bool, min_level_distance: f32, tension: f32) -> Result<Self> {
        check_tension(tension)?;
        if min_level_distance.is_nan() || min_level_distance <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "min_level_distance",
                message: format!("must be positive, got {min_level_distance}"),
            });
        }
        Ok(Self {
            edges_above_blocks,
            min_level_distance,
            tension,
        })
    }

    pub fn frame(&self, graph: &LayoutGraph, nodes: &[NodeId]) -> Result<BundlingFrame> {
        let extent = EdgeFrame::new(graph, nodes, &[])?;
        let level_distance = self.min_level_distance.max(extent.max_height / 5.0);
        let level_offset = if self.edges_above_blocks {
            extent.max_y + level_distance
        } else {
            extent.min_y - level_distance
        };
        Ok(BundlingFrame {
            edges_above_blocks: self.edges_above_blocks,
            tension: self.tension,
            level_distance,
            level_offset,
            max_level: max_level(graph, &roots(graph, nodes)),
        })
    }

    fn route(
        &self,
        graph: &LayoutGraph,
        frame: &BundlingFrame,
        lca: &LcaFinder<'_>,
        source: NodeId,
        target: NodeId,
    ) -> Result<Spline> {
        if source == target {
            return Ok(self.self_loop(graph, frame, source));
        }
        let Some(ancestor) = lca.lca(source, target) else {
            tracing::warn!(
                source = %graph.node(source).id,
                target = %graph.node(target).id,
                "undefined lowest common ancestor; routing edge above all trees"
            );
            return Ok(self.direct(graph, source, target, frame.level_height(-1)));
        };
        if ancestor == source || ancestor == target {
            return Ok(self.direct(graph, source, target, frame.level_offset));
        }

        let up = ancestors(graph, source, ancestor);
        let down = ancestors(graph, target, ancestor);
        if up.len() == 2 && down.len() == 2 {
            return Ok(self.direct(graph, source, target, frame.level_offset));
        }

        let path: Vec<NodeId> = up
            .iter()
            .copied()
            .chain(down.iter().rev().skip(1).copied())
            .collect();
        let last = path.len() - 1;
        let points: Vec<Vec3> = path
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                if i == 0 || i == last {
                    anchor(graph, v, self.edges_above_blocks)
                } else {
                    let node = graph.node(v);
                    Vec3::new(
                        node.center_position.x,
                        frame.level_height(node.level as i64),
                        node.center_position.z,
                    )
                }
            })
            .collect();
        Spline::bspline(points, 3).with_tension(frame.tension)
    }

    /// Three-point spline whose middle lies halfway between the anchors at height `y`.
    fn direct(&self, graph: &LayoutGraph, source: NodeId, target: NodeId, y: f32) -> Spline {
        let start = anchor(graph, source, self.edges_above_blocks);
        let end = anchor(graph, target, self.edges_above_blocks);
        let mut middle = start.lerp(&end, 0.5);
        middle.y = y;
        Spline::interpolate_cubic_natural(vec![start, middle, end])
    }

    /// Diagonal across the roof (or ground), peaking one level distance away from the block.
    fn self_loop(&self, graph: &LayoutGraph, frame: &BundlingFrame, v: NodeId) -> Spline {
        let center = anchor(graph, v, self.edges_above_blocks);
        let extent = graph.node(v).extent();
        let start = Vec3::new(center.x - extent.x, center.y, center.z - extent.z);
        let end = Vec3::new(center.x + extent.x, center.y, center.z + extent.z);
        let mut middle = center;
        middle.y += if self.edges_above_blocks {
            frame.level_distance
        } else {
            -frame.level_distance
        };
        Spline::interpolate_cubic_natural(vec![start, middle, end])
    }
}

impl EdgeLayout for BundledEdgeLayout {
    fn name(&self) -> &'static str {
        "bundling"
    }

    fn create(
        &self,
        graph: &LayoutGraph,
        nodes: &[NodeId],
        edges: &mut [LayoutEdge],
    ) -> Result<()> {
        check_endpoints(graph, nodes, edges)?;
        check_ancestors(graph, nodes, edges)?;
        if edges.is_empty() {
            return Ok(());
        }
        let frame = self.frame(graph, nodes)?;
        let root_set = roots(graph, nodes);
        let lca = LcaFinder::new(graph, &root_set)?;
        for edge in edges.iter_mut() {
            edge.curve = Some(self.route(graph, &frame, &lca, edge.source, edge.target)?);
        }
        Ok(())
    }
}
