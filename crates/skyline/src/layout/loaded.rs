use indexmap::IndexMap;
use skyline_hierarchy::{LayoutGraph, NodeId, NodeTransform};

use super::{NodeLayout, NodeLayoutKind, NodeLayoutResult};
use crate::error::Result;

/// Replays transforms read from a layout file, matched by node id.
#[derive(Debug, Clone, Default)]
pub struct LoadedNodeLayout {
    transforms: IndexMap<String, NodeTransform>,
}

impl LoadedNodeLayout {
    pub fn new(transforms: IndexMap<String, NodeTransform>) -> Self {
        Self { transforms }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl NodeLayout for LoadedNodeLayout {
    fn name(&self) -> &str {
        "from-file"
    }

    fn kind(&self) -> NodeLayoutKind {
        NodeLayoutKind::FromFile
    }

    /// Nodes without a stored transform are left out of the result.
    fn layout(&self, graph: &LayoutGraph, nodes: &[NodeId]) -> Result<NodeLayoutResult> {
        let mut result = NodeLayoutResult::with_capacity(nodes.len());
        let mut missing = 0usize;
        for &v in nodes {
            match self.transforms.get(graph.node(v).id.as_str()) {
                Some(t) => {
                    result.insert(v, *t);
                }
                None => missing += 1,
            }
        }
        if missing > 0 {
            tracing::warn!(missing, "nodes without a stored transform keep their placement");
        }
        Ok(result)
    }
}
