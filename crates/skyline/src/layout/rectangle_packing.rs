//! Hierarchical rectangle packing.
//!
//! Every inner node is sized to the area needed to pack its children, bottom-up. Packing is
//! guillotine based: the free space is a list of rectangles, and placing an element into a free
//! rectangle splits off the remainders to its right and below it. Elements are placed largest
//! first; a free rectangle that keeps the covered area unchanged is preferred (least waste
//! first), otherwise the one that keeps the covered area closest to a square wins.

use rustc_hash::{FxHashMap, FxHashSet};
use skyline_hierarchy::{LayoutGraph, NodeId, NodeTransform};

use super::{NodeLayout, NodeLayoutKind, NodeLayoutResult, children_within, level_lift};
use crate::Vec3;
use crate::error::{Error, Result};

type Vec2 = nalgebra::Vector2<f32>;

/// Slack on the initial free space to absorb rounding.
const WORST_CASE_SLACK: f32 = 1.1;

#[derive(Debug, Clone, Copy)]
pub struct RectanglePackingLayout {
    ground_level: f32,
    padding: f32,
}

impl RectanglePackingLayout {
    pub fn new(ground_level: f32, padding: f32) -> Self {
        Self {
            ground_level,
            padding: padding.max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    position: Vec2,
    size: Vec2,
}

fn fits_into(sub: Vec2, container: Vec2) -> bool {
    sub.x <= container.x && sub.y <= container.y
}

fn area(v: Vec2) -> f32 {
    v.x * v.y
}

/// Guillotine split of `free[index]`; returns the lower-left corner of the allocated area.
fn split(free: &mut Vec<Rect>, index: usize, size: Vec2) -> Vec2 {
    let rect = free.remove(index);
    let pos = rect.position;
    if size.x < rect.size.x {
        free.push(Rect {
            position: Vec2::new(pos.x + size.x, pos.y),
            size: Vec2::new(rect.size.x - size.x, size.y),
        });
    }
    if size.y < rect.size.y {
        free.push(Rect {
            position: Vec2::new(pos.x, pos.y + size.y),
            size: Vec2::new(rect.size.x, rect.size.y - size.y),
        });
    }
    pos
}

/// Packs `items` starting at the origin. Returns the lower-left corner of every item plus the
/// size of the covered area.
fn pack(graph: &LayoutGraph, items: &[(NodeId, Vec2)]) -> Result<(Vec<(NodeId, Vec2)>, Vec2)> {
    let mut items = items.to_vec();
    items.sort_by(|a, b| area(b.1).total_cmp(&area(a.1)));

    let worst_case = items.iter().fold(Vec2::zeros(), |acc, (_, s)| acc + s) * WORST_CASE_SLACK;
    let mut free = vec![Rect {
        position: Vec2::zeros(),
        size: worst_case,
    }];
    let mut covered = Vec2::zeros();
    let mut placed = Vec::with_capacity(items.len());

    for (v, size) in items {
        let mut preserver: Option<(usize, f32)> = None;
        let mut expander: Option<(usize, f32)> = None;
        for (idx, rect) in free.iter().enumerate() {
            if !fits_into(size, rect.size) {
                continue;
            }
            let corner = rect.position + size;
            let expanded = covered.sup(&corner);
            if fits_into(expanded, covered) {
                let waste = area(rect.size) - area(size);
                if preserver.is_none_or(|(_, best)| waste < best) {
                    preserver = Some((idx, waste));
                }
            } else {
                let ratio = expanded.x / expanded.y;
                let squareness = if ratio >= 1.0 { ratio } else { 1.0 / ratio };
                if expander.is_none_or(|(_, best)| squareness < best) {
                    expander = Some((idx, squareness));
                }
            }
        }

        let Some((index, _)) = preserver.or(expander) else {
            return Err(Error::InvalidParameter {
                name: "node scale",
                message: format!(
                    "cannot pack {} with footprint {} x {}",
                    graph.node(v).id,
                    size.x,
                    size.y
                ),
            });
        };
        let corner = split(&mut free, index, size);
        covered = covered.sup(&(corner + size));
        placed.push((v, corner));
    }
    Ok((placed, covered))
}

struct Packing<'a> {
    graph: &'a LayoutGraph,
    members: FxHashSet<NodeId>,
    padding: f32,
    /// Footprint of a node without padding.
    sizes: FxHashMap<NodeId, Vec2>,
    /// Center of a node relative to the lower-left corner of its parent.
    offsets: FxHashMap<NodeId, Vec2>,
    children: FxHashMap<NodeId, Vec<NodeId>>,
}

impl Packing<'_> {
    fn padded(&self, v: NodeId) -> Vec2 {
        self.sizes[&v] + Vec2::repeat(2.0 * self.padding)
    }

    fn measure(&mut self, v: NodeId) -> Result<()> {
        let children = children_within(self.graph, v, &self.members);
        if children.is_empty() {
            let scale = self.graph.node(v).absolute_scale;
            self.sizes.insert(v, Vec2::new(scale.x, scale.z));
            return Ok(());
        }
        for &c in &children {
            self.measure(c)?;
        }
        let items: Vec<(NodeId, Vec2)> = children.iter().map(|c| (*c, self.padded(*c))).collect();
        let (placed, covered) = pack(self.graph, &items)?;
        for (c, corner) in placed {
            let offset = corner + self.padded(c) / 2.0;
            self.offsets.insert(c, offset);
        }
        self.sizes.insert(v, covered);
        self.children.insert(v, children);
        Ok(())
    }
}

impl NodeLayout for RectanglePackingLayout {
    fn name(&self) -> &str {
        "rectangle-packing"
    }

    fn kind(&self) -> NodeLayoutKind {
        NodeLayoutKind::RectanglePacking
    }

    fn layout(&self, graph: &LayoutGraph, nodes: &[NodeId]) -> Result<NodeLayoutResult> {
        if let [single] = nodes {
            let position = Vec3::new(0.0, self.ground_level, 0.0);
            let transform = NodeTransform::new(position, graph.node(*single).absolute_scale);
            return Ok(NodeLayoutResult::from([(*single, transform)]));
        }

        let members: FxHashSet<NodeId> = nodes.iter().copied().collect();
        let tops: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|v| graph.parent(*v).is_none_or(|p| !members.contains(&p)))
            .collect();

        let mut packing = Packing {
            graph,
            members,
            padding: self.padding,
            sizes: FxHashMap::default(),
            offsets: FxHashMap::default(),
            children: FxHashMap::default(),
        };
        for &top in &tops {
            packing.measure(top)?;
        }

        // Centers of the top-level nodes; a lone top sits on the origin.
        let mut pending: Vec<(NodeId, Vec2)> = if let [top] = tops[..] {
            vec![(top, Vec2::zeros())]
        } else {
            let items: Vec<(NodeId, Vec2)> = tops.iter().map(|t| (*t, packing.padded(*t))).collect();
            let (placed, covered) = pack(graph, &items)?;
            let corner = -covered / 2.0;
            placed
                .into_iter()
                .map(|(t, c)| (t, corner + c + packing.padded(t) / 2.0))
                .collect()
        };

        let mut placed: FxHashMap<NodeId, NodeTransform> = FxHashMap::default();
        while let Some((v, center)) = pending.pop() {
            let node = graph.node(v);
            let size = packing.sizes[&v];
            let inner = packing.children.get(&v);
            let (height, lift) = match inner {
                Some(_) => {
                    let height = if node.absolute_scale.y > 0.0 {
                        node.absolute_scale.y
                    } else {
                        self.inner_node_height()
                    };
                    (height, level_lift(node))
                }
                None => (node.absolute_scale.y, 0.0),
            };
            placed.insert(
                v,
                NodeTransform::new(
                    Vec3::new(center.x, self.ground_level + lift, center.y),
                    Vec3::new(size.x, height, size.y),
                ),
            );
            if let Some(children) = inner {
                let corner = center - size / 2.0;
                pending.extend(
                    children
                        .iter()
                        .map(|c| (*c, corner + packing.offsets[c])),
                );
            }
        }

        Ok(nodes
            .iter()
            .filter_map(|v| placed.get(v).map(|t| (*v, *t)))
            .collect())
    }
}
