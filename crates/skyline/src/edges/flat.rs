use skyline_hierarchy::{LayoutGraph, NodeId};

use super::{EdgeLayout, LayoutEdge, check_endpoints};
use crate::error::Result;
use crate::spline::Spline;

/// Center-to-center lines, used by architecture views where nodes are flat.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatEdgeLayout;

impl EdgeLayout for FlatEdgeLayout {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn create(
        &self,
        graph: &LayoutGraph,
        nodes: &[NodeId],
        edges: &mut [LayoutEdge],
    ) -> Result<()> {
        check_endpoints(graph, nodes, edges)?;
        for edge in edges.iter_mut() {
            edge.curve = Some(Spline::line(
                graph.node(edge.source).center_position,
                graph.node(edge.target).center_position,
            ));
        }
        Ok(())
    }
}
