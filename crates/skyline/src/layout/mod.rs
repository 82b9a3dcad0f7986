//! Node layouts.
//!
//! A node layout computes ground-anchored [`NodeTransform`]s for a set of nodes. Only two
//! layouts are built in (rectangle packing and replaying a layout file); hosts plug in the
//! others through [`LayoutRegistry`].

mod loaded;
mod rectangle_packing;

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use skyline_hierarchy::{LayoutGraph, LayoutNode, NodeId, NodeTransform};

use crate::Vec3;
use crate::edges::LayoutEdge;
use crate::error::{Error, Result};

pub use loaded::LoadedNodeLayout;
pub use rectangle_packing::RectanglePackingLayout;

/// Transforms keyed by node, in the order the layout produced them.
pub type NodeLayoutResult = IndexMap<NodeId, NodeTransform>;

/// Height given to inner nodes that do not carry their own.
pub const INNER_NODE_HEIGHT: f32 = 0.01;

/// Vertical lift per hierarchy level so nested inner nodes do not z-fight.
pub const LEVEL_INCREASE_FOR_INNER_NODES: f32 = 0.015;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeLayoutKind {
    EvoStreets,
    Balloon,
    #[default]
    RectanglePacking,
    Treemap,
    CirclePacking,
    Manhattan,
    CompoundSpringEmbedder,
    FromFile,
}

/// Policy flags of a node layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLayoutModel {
    /// The layout places leaves only; inner nodes are not part of its input.
    pub only_leaves: bool,
    /// Inner nodes are sized by the layout to enclose their descendants.
    pub inner_nodes_enclose_leaves: bool,
    /// The layout may host sublayouts with a different algorithm.
    pub can_apply_sublayouts: bool,
}

impl NodeLayoutKind {
    pub const ALL: [Self; 8] = [
        Self::EvoStreets,
        Self::Balloon,
        Self::RectanglePacking,
        Self::Treemap,
        Self::CirclePacking,
        Self::Manhattan,
        Self::CompoundSpringEmbedder,
        Self::FromFile,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EvoStreets => "evo-streets",
            Self::Balloon => "balloon",
            Self::RectanglePacking => "rectangle-packing",
            Self::Treemap => "treemap",
            Self::CirclePacking => "circle-packing",
            Self::Manhattan => "manhattan",
            Self::CompoundSpringEmbedder => "compound-spring-embedder",
            Self::FromFile => "from-file",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub fn model(self) -> NodeLayoutModel {
        match self {
            Self::Manhattan => NodeLayoutModel {
                only_leaves: true,
                inner_nodes_enclose_leaves: false,
                can_apply_sublayouts: false,
            },
            Self::FromFile => NodeLayoutModel {
                only_leaves: false,
                inner_nodes_enclose_leaves: true,
                can_apply_sublayouts: false,
            },
            _ => NodeLayoutModel {
                only_leaves: false,
                inner_nodes_enclose_leaves: true,
                can_apply_sublayouts: true,
            },
        }
    }
}

impl fmt::Display for NodeLayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeLayoutSettings {
    pub kind: NodeLayoutKind,
    /// Set from [`crate::pipeline::CityLayoutConfig::ground_level`].
    #[serde(skip)]
    pub ground_level: f32,
    /// Gap kept around every packed rectangle, in world units.
    pub padding: f32,
}

impl Default for NodeLayoutSettings {
    fn default() -> Self {
        Self {
            kind: NodeLayoutKind::RectanglePacking,
            ground_level: 0.0,
            padding: 0.1,
        }
    }
}

pub trait NodeLayout {
    fn name(&self) -> &str;

    fn kind(&self) -> NodeLayoutKind;

    fn inner_node_height(&self) -> f32 {
        INNER_NODE_HEIGHT
    }

    fn model(&self) -> NodeLayoutModel {
        self.kind().model()
    }

    fn only_leaves(&self) -> bool {
        self.model().only_leaves
    }

    fn inner_nodes_enclose_leaves(&self) -> bool {
        self.model().inner_nodes_enclose_leaves
    }

    /// Whether [`NodeLayout::layout_with_edges`] should be preferred over
    /// [`NodeLayout::layout`].
    fn uses_edges_and_sublayout_nodes(&self) -> bool {
        false
    }

    /// Lays out `nodes`. A node's children outside of `nodes` are ignored.
    fn layout(&self, graph: &LayoutGraph, nodes: &[NodeId]) -> Result<NodeLayoutResult>;

    /// `edges` connect nodes of `nodes`; `sublayout_roots` are nodes standing in for already laid
    /// out sublayouts.
    fn layout_with_edges(
        &self,
        graph: &LayoutGraph,
        nodes: &[NodeId],
        edges: &[LayoutEdge],
        sublayout_roots: &[NodeId],
    ) -> Result<NodeLayoutResult> {
        let _ = (edges, sublayout_roots);
        self.layout(graph, nodes)
    }
}

pub type LayoutFactory = Box<dyn Fn(&NodeLayoutSettings) -> Box<dyn NodeLayout>>;

/// Implementations for the layout kinds that are not built in.
#[derive(Default)]
pub struct LayoutRegistry {
    factories: FxHashMap<NodeLayoutKind, LayoutFactory>,
}

impl fmt::Debug for LayoutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any implementation registered for `kind`, built-in ones included.
    pub fn register<F>(&mut self, kind: NodeLayoutKind, factory: F)
    where
        F: Fn(&NodeLayoutSettings) -> Box<dyn NodeLayout> + 'static,
    {
        self.factories.insert(kind, Box::new(factory));
    }

    /// Registers a [`LoadedNodeLayout`] replaying `transforms` as [`NodeLayoutKind::FromFile`].
    pub fn register_loaded(&mut self, transforms: IndexMap<String, NodeTransform>) {
        self.register(
            NodeLayoutKind::FromFile,
            move |_: &NodeLayoutSettings| -> Box<dyn NodeLayout> {
                Box::new(LoadedNodeLayout::new(transforms.clone()))
            },
        );
    }

    pub fn contains(&self, kind: NodeLayoutKind) -> bool {
        self.factories.contains_key(&kind)
    }

    pub fn resolve(
        &self,
        kind: NodeLayoutKind,
        settings: &NodeLayoutSettings,
    ) -> Result<Box<dyn NodeLayout>> {
        if let Some(factory) = self.factories.get(&kind) {
            return Ok(factory(settings));
        }
        match kind {
            NodeLayoutKind::RectanglePacking => Ok(Box::new(RectanglePackingLayout::new(
                settings.ground_level,
                settings.padding,
            ))),
            NodeLayoutKind::FromFile => Ok(Box::new(LoadedNodeLayout::default())),
            _ => Err(Error::UnsupportedLayout { kind }),
        }
    }
}

/// Writes ground-anchored transforms into the graph, converting each ground to a center.
pub fn apply_transforms(graph: &mut LayoutGraph, layout: &NodeLayoutResult) {
    for (&v, transform) in layout {
        graph.node_mut(v).apply(transform);
    }
}

/// Returns `layout` with every position moved by `offset`.
pub fn translate(layout: &NodeLayoutResult, offset: Vec3) -> NodeLayoutResult {
    layout
        .iter()
        .map(|(v, t)| (*v, t.translated(offset)))
        .collect()
}

pub fn level_lift(node: &LayoutNode) -> f32 {
    node.level as f32 * LEVEL_INCREASE_FOR_INNER_NODES
}

/// Children of `v` that belong to `members`, in graph order.
pub(crate) fn children_within(
    graph: &LayoutGraph,
    v: NodeId,
    members: &rustc_hash::FxHashSet<NodeId>,
) -> Vec<NodeId> {
    graph
        .children(v)
        .iter()
        .copied()
        .filter(|c| members.contains(c))
        .collect()
}

/// Axis-aligned box `(min, max)` around `nodes`; both corners are zero for an empty set.
pub fn bounding_box(graph: &LayoutGraph, nodes: &[NodeId]) -> (Vec3, Vec3) {
    if nodes.is_empty() {
        return (Vec3::zeros(), Vec3::zeros());
    }
    let mut min = Vec3::repeat(f32::INFINITY);
    let mut max = Vec3::repeat(f32::NEG_INFINITY);
    for &v in nodes {
        let node = graph.node(v);
        let extent = node.extent();
        min = min.inf(&(node.center_position - extent));
        max = max.sup(&(node.center_position + extent));
    }
    (min, max)
}
