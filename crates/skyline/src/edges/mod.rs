//! Edge routing strategies.
//!
//! Every strategy replaces the curve of every edge it is given. Strategies are immutable and
//! can be reused across runs; whatever they derive from the node set is recomputed per call.

mod bundling;
mod flat;
mod spline;
mod straight;

use serde::{Deserialize, Serialize};
use skyline_hierarchy::{LayoutGraph, NodeId};

use crate::Vec3;
use crate::error::{Error, Result};
use crate::spline::Spline;

pub use bundling::{BundledEdgeLayout, BundlingFrame};
pub use flat::FlatEdgeLayout;
pub use spline::SplineEdgeLayout;
pub use straight::StraightEdgeLayout;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEdge {
    pub source: NodeId,
    pub target: NodeId,
    /// Written by edge layouts.
    pub curve: Option<Spline>,
}

impl LayoutEdge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            target,
            curve: None,
        }
    }
}

pub trait EdgeLayout {
    fn name(&self) -> &'static str;

    /// Assigns a curve to every edge in `edges`.
    ///
    /// `nodes` must contain both endpoints of every edge and, for hierarchical strategies, every
    /// ancestor of those endpoints.
    fn create(&self, graph: &LayoutGraph, nodes: &[NodeId], edges: &mut [LayoutEdge])
    -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeLayoutKind {
    None,
    Straight,
    Spline,
    #[default]
    Bundling,
    Flat,
}

impl EdgeLayoutKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "straight" => Some(Self::Straight),
            "spline" => Some(Self::Spline),
            "bundling" => Some(Self::Bundling),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeLayoutSettings {
    pub kind: EdgeLayoutKind,
    pub edges_above_blocks: bool,
    pub edge_width: f32,
    /// Bundling strength in `[0, 1]`.
    pub tension: f32,
    /// Ramer–Douglas–Peucker tolerance for direct splines.
    pub rdp: f32,
    /// Scales the vertical offset of straight and direct-spline edges.
    pub scale_factor: f32,
}

impl Default for EdgeLayoutSettings {
    fn default() -> Self {
        Self {
            kind: EdgeLayoutKind::Bundling,
            edges_above_blocks: true,
            edge_width: 0.01,
            tension: 0.85,
            rdp: 0.0001,
            scale_factor: 1.0,
        }
    }
}

impl EdgeLayoutSettings {
    /// Minimal vertical distance between two bundling levels.
    pub fn min_level_distance(&self) -> f32 {
        2.5 * self.edge_width
    }
}

/// Layout that leaves every edge untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEdgeLayout;

impl EdgeLayout for NoEdgeLayout {
    fn name(&self) -> &'static str {
        "none"
    }

    fn create(&self, _: &LayoutGraph, _: &[NodeId], _: &mut [LayoutEdge]) -> Result<()> {
        Ok(())
    }
}

pub fn edge_layout(settings: &EdgeLayoutSettings) -> Result<Box<dyn EdgeLayout>> {
    Ok(match settings.kind {
        EdgeLayoutKind::None => Box::new(NoEdgeLayout),
        EdgeLayoutKind::Straight => Box::new(StraightEdgeLayout::new(
            settings.edges_above_blocks,
            settings.scale_factor,
        )),
        EdgeLayoutKind::Spline => Box::new(SplineEdgeLayout::new(
            settings.edges_above_blocks,
            settings.scale_factor,
            settings.rdp,
        )),
        EdgeLayoutKind::Bundling => Box::new(BundledEdgeLayout::new(
            settings.edges_above_blocks,
            settings.min_level_distance(),
            settings.tension,
        )?),
        EdgeLayoutKind::Flat => Box::new(FlatEdgeLayout),
    })
}

/// Vertical extent of a node set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EdgeFrame {
    pub min_y: f32,
    pub max_y: f32,
    pub max_height: f32,
}

impl EdgeFrame {
    /// Fails when an edge endpoint is not part of `nodes`.
    pub fn new(graph: &LayoutGraph, nodes: &[NodeId], edges: &[LayoutEdge]) -> Result<Self> {
        check_endpoints(graph, nodes, edges)?;

        let mut frame = Self {
            min_y: f32::INFINITY,
            max_y: f32::NEG_INFINITY,
            max_height: 0.0,
        };
        for &v in nodes {
            let node = graph.node(v);
            frame.min_y = frame.min_y.min(node.ground().y);
            frame.max_y = frame.max_y.max(node.roof().y);
            frame.max_height = frame.max_height.max(node.absolute_scale.y);
        }
        if nodes.is_empty() {
            frame.min_y = 0.0;
            frame.max_y = 0.0;
        }
        Ok(frame)
    }
}

fn check_endpoints(graph: &LayoutGraph, nodes: &[NodeId], edges: &[LayoutEdge]) -> Result<()> {
    let known: rustc_hash::FxHashSet<NodeId> = nodes.iter().copied().collect();
    for (idx, edge) in edges.iter().enumerate() {
        for node in [edge.source, edge.target] {
            if !graph.contains(node) || !known.contains(&node) {
                return Err(Error::UnknownEndpoint {
                    edge: idx,
                    node: node.index(),
                });
            }
        }
    }
    Ok(())
}

/// Hierarchical routing also needs every ancestor of every endpoint in `nodes`.
fn check_ancestors(graph: &LayoutGraph, nodes: &[NodeId], edges: &[LayoutEdge]) -> Result<()> {
    let known: rustc_hash::FxHashSet<NodeId> = nodes.iter().copied().collect();
    for (idx, edge) in edges.iter().enumerate() {
        for node in [edge.source, edge.target] {
            let mut cursor = graph.parent(node);
            while let Some(p) = cursor {
                if !known.contains(&p) {
                    return Err(Error::MissingAncestor {
                        edge: idx,
                        ancestor: graph.node(p).id.clone(),
                    });
                }
                cursor = graph.parent(p);
            }
        }
    }
    Ok(())
}

/// Roof of `v` when edges run above the blocks, its ground otherwise.
pub(crate) fn anchor(graph: &LayoutGraph, v: NodeId, above: bool) -> Vec3 {
    if above {
        graph.roof(v)
    } else {
        graph.ground(v)
    }
}
