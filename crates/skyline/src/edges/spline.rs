use skyline_hierarchy::{LayoutGraph, NodeId};

use super::straight::edge_plane;
use super::{EdgeFrame, EdgeLayout, LayoutEdge, anchor};
use crate::error::Result;
use crate::spline::Spline;

/// Direct, non-bundled splines from anchor to anchor that peak on the straight-edge plane.
#[derive(Debug, Clone, Copy)]
pub struct SplineEdgeLayout {
    edges_above_blocks: bool,
    scale_factor: f32,
    rdp: f32,
}

impl SplineEdgeLayout {
    /// A negative `rdp` disables simplification.
    pub fn new(edges_above_blocks: bool, scale_factor: f32, rdp: f32) -> Self {
        Self {
            edges_above_blocks,
            scale_factor,
            rdp: rdp.max(0.0),
        }
    }
}

impl EdgeLayout for SplineEdgeLayout {
    fn name(&self) -> &'static str {
        "spline"
    }

    fn create(
        &self,
        graph: &LayoutGraph,
        nodes: &[NodeId],
        edges: &mut [LayoutEdge],
    ) -> Result<()> {
        let frame = EdgeFrame::new(graph, nodes, edges)?;
        let y = edge_plane(&frame, self.edges_above_blocks, self.scale_factor);
        for edge in edges.iter_mut() {
            let start = anchor(graph, edge.source, self.edges_above_blocks);
            let end = anchor(graph, edge.target, self.edges_above_blocks);
            let mut middle = start.lerp(&end, 0.5);
            middle.y = y;
            let curve = Spline::interpolate_cubic_natural(vec![start, middle, end]);
            edge.curve = Some(if self.rdp > 0.0 {
                curve.simplify(self.rdp)
            } else {
                curve
            });
        }
        Ok(())
    }
}
