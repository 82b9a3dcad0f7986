use skyline_hierarchy::{LayoutGraph, NodeId};

use super::{EdgeFrame, EdgeLayout, LayoutEdge, anchor};
use crate::error::Result;
use crate::spline::Spline;

/// Fraction of the tallest node's height the edge plane keeps from the blocks.
pub(crate) const OFFSET_FACTOR: f32 = 0.2;

/// Straight lines on a plane above the tallest roof (or below the lowest ground).
#[derive(Debug, Clone, Copy)]
pub struct StraightEdgeLayout {
    edges_above_blocks: bool,
    scale_factor: f32,
}

impl StraightEdgeLayout {
    pub fn new(edges_above_blocks: bool, scale_factor: f32) -> Self {
        Self {
            edges_above_blocks,
            scale_factor,
        }
    }
}

/// Height of the plane straight and direct-spline edges run on.
pub(crate) fn edge_plane(frame: &EdgeFrame, above: bool, scale_factor: f32) -> f32 {
    let offset = OFFSET_FACTOR * frame.max_height * scale_factor;
    if above {
        frame.max_y + offset
    } else {
        frame.min_y - offset
    }
}

impl EdgeLayout for StraightEdgeLayout {
    fn name(&self) -> &'static str {
        "straight"
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
            let mut start = anchor(graph, edge.source, self.edges_above_blocks);
            let mut end = anchor(graph, edge.target, self.edges_above_blocks);
            start.y = y;
            end.y = y;
            edge.curve = Some(Spline::line(start, end));
        }
        Ok(())
    }
}
