use std::time::Instant;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use skyline_hierarchy::hierarchy::set_all_levels;
use skyline_hierarchy::{LayoutGraph, NodeId};

use crate::edges::{EdgeLayoutSettings, LayoutEdge, edge_layout};
use crate::error::{Error, Result};
use crate::layout::{LayoutRegistry, NodeLayoutKind, NodeLayoutSettings, apply_transforms};
use crate::sublayout::{Sublayout, SublayoutSpec, compose_sublayouts};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SublayoutSettings {
    /// Id of the sublayout root.
    pub root: String,
    pub kind: NodeLayoutKind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CityLayoutConfig {
    pub ground_level: f32,
    pub node_layout: NodeLayoutSettings,
    pub edge_layout: EdgeLayoutSettings,
    pub sublayouts: Vec<SublayoutSettings>,
}

impl CityLayoutConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    fn node_settings(&self) -> NodeLayoutSettings {
        NodeLayoutSettings {
            ground_level: self.ground_level,
            ..self.node_layout.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub node_layout: NodeLayoutKind,
    pub edge_layout: &'static str,
    /// Nodes placed by the main layout.
    pub laid_out_nodes: usize,
    pub routed_edges: usize,
    /// Composed sublayouts, innermost first.
    pub sublayouts: Vec<Sublayout>,
}

/// Levels, sublayouts, main node layout and edge routing, in that order.
#[derive(Debug, Default)]
pub struct LayoutPipeline {
    config: CityLayoutConfig,
    registry: LayoutRegistry,
}

impl LayoutPipeline {
    pub fn new(config: CityLayoutConfig) -> Self {
        Self::with_registry(config, LayoutRegistry::new())
    }

    pub fn with_registry(config: CityLayoutConfig, registry: LayoutRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &CityLayoutConfig {
        &self.config
    }

    pub fn registry_mut(&mut self) -> &mut LayoutRegistry {
        &mut self.registry
    }

    pub fn run(&self, graph: &mut LayoutGraph, edges: &mut [LayoutEdge]) -> Result<PipelineReport> {
        let settings = self.config.node_settings();
        let main = self.registry.resolve(settings.kind, &settings)?;
        let router = edge_layout(&self.config.edge_layout)?;
        let specs = self.sublayout_specs(graph)?;
        if !specs.is_empty() && !main.model().can_apply_sublayouts {
            return Err(Error::CannotHostSublayouts { kind: main.kind() });
        }

        // Also assigns levels, once every layout kind has been resolved.
        let start = Instant::now();
        let sublayouts = compose_sublayouts(graph, edges, &specs, &self.registry, &settings)?;
        tracing::debug!(
            count = sublayouts.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "sublayouts composed"
        );

        let start = Instant::now();
        let inside: FxHashSet<NodeId> = sublayouts
            .iter()
            .flat_map(|s| s.members.iter().copied())
            .collect();
        let sublayout_roots: Vec<NodeId> = sublayouts
            .iter()
            .map(|s| s.root)
            .filter(|r| !inside.contains(r))
            .collect();
        let only_leaves = main.only_leaves();
        let nodes: Vec<NodeId> = graph
            .ids()
            .filter(|v| !inside.contains(v))
            .filter(|v| !only_leaves || graph.node(*v).is_leaf || sublayout_roots.contains(v))
            .collect();
        let result = if main.uses_edges_and_sublayout_nodes() {
            let set: FxHashSet<NodeId> = nodes.iter().copied().collect();
            let induced: Vec<LayoutEdge> = edges
                .iter()
                .filter(|e| set.contains(&e.source) && set.contains(&e.target))
                .cloned()
                .collect();
            main.layout_with_edges(graph, &nodes, &induced, &sublayout_roots)?
        } else {
            main.layout(graph, &nodes)?
        };
        apply_transforms(graph, &result);
        for sublayout in sublayouts.iter().filter(|s| sublayout_roots.contains(&s.root)) {
            sublayout.embed(graph);
        }
        tracing::debug!(
            layout = main.name(),
            nodes = nodes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "nodes laid out"
        );

        let start = Instant::now();
        self.route(router.as_ref(), graph, edges)?;
        tracing::debug!(
            layout = router.name(),
            edges = edges.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "edges routed"
        );

        Ok(PipelineReport {
            node_layout: main.kind(),
            edge_layout: router.name(),
            laid_out_nodes: nodes.len(),
            routed_edges: edges.len(),
            sublayouts,
        })
    }

    /// Routes `edges` over the current node placement without laying out nodes.
    pub fn route_edges(&self, graph: &mut LayoutGraph, edges: &mut [LayoutEdge]) -> Result<()> {
        let router = edge_layout(&self.config.edge_layout)?;
        set_all_levels(graph);
        self.route(router.as_ref(), graph, edges)
    }

    fn route(
        &self,
        router: &dyn crate::edges::EdgeLayout,
        graph: &LayoutGraph,
        edges: &mut [LayoutEdge],
    ) -> Result<()> {
        let all: Vec<NodeId> = graph.ids().collect();
        router.create(graph, &all, edges)
    }

    fn sublayout_specs(&self, graph: &LayoutGraph) -> Result<Vec<SublayoutSpec>> {
        self.config
            .sublayouts
            .iter()
            .map(|s| {
                let root = graph.node_id(&s.root).ok_or_else(|| Error::InvalidParameter {
                    name: "sublayout root",
                    message: format!("unknown node id {}", s.root),
                })?;
                Ok(SublayoutSpec { root, kind: s.kind })
            })
            .collect()
    }
}
