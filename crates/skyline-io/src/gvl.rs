//! GVL, the layout format of the Gravis graph tool.
//!
//! ```xml
//! <Gravis2_Layout W="Hierarchy" V="city">
//!   <Node Id="Lmain" X="-1360" Y="-635" W="246" H="147" CS="14.14" Exp="True">
//!     <Node Id="Lutil" X="45" Y="97" W="0" H="0" CS="10"/>
//!   </Node>
//! </Gravis2_Layout>
//! ```
//!
//! Gravis draws on a 2D canvas whose Y axis points down; it maps to the negated z axis of the
//! city. `X`/`Y` give the left-upper corner of a node: absolute for top-level nodes, an offset
//! from the parent's left-upper corner for nested ones. An expanded node (`Exp="True"`) is a
//! `W` x `H` rectangle; any other node is drawn as an icon whose size is the `CS` of its parent.
//! Top-level nodes use their own `CS`. `CS` is required on nodes with nested nodes; elsewhere it
//! defaults to [`DEFAULT_ICON_SIZE`]. Heights are not stored: nodes keep theirs, top-level
//! nodes stand on the ground level and nested nodes on their parent's roof.

use std::fmt::Write as _;
use std::path::Path;

use skyline_hierarchy::hierarchy::all_roots;
use skyline_hierarchy::{LayoutGraph, NodeId, NodeTransform, Vec3};

use crate::error::{Error, Result};
use crate::report::LoadReport;

/// Icon size used when a node carries no `CS`.
pub const DEFAULT_ICON_SIZE: f32 = 14.14;

/// `CS` written for every node; expanded nodes never use it themselves.
const WRITTEN_ICON_SIZE: f32 = 14.4;

const VISUALIZATION_OPTIONS: [&str; 7] = [
    "Mute_Edges",
    "Semi_Transparent_Edges",
    "Edges_Behind_Nodes",
    "Show_Lifted_Edges",
    "Semi_Transparent_Backgrounds",
    "Show_Node_Names",
    "Show_Attributes",
];

/// Placement of an already read node, needed to resolve its children.
#[derive(Debug, Clone, Copy)]
struct Parent {
    transform: NodeTransform,
    child_icon_size: f32,
}

impl Parent {
    /// Left-upper corner in city coordinates: minimal x, maximal z.
    fn corner(&self) -> (f32, f32) {
        let position = self.transform.position;
        let scale = self.transform.scale;
        (position.x - scale.x / 2.0, position.z + scale.z / 2.0)
    }

    fn roof(&self) -> f32 {
        self.transform.position.y + self.transform.scale.y
    }
}

pub fn read(path: &Path, graph: &mut LayoutGraph, ground_level: f32) -> Result<LoadReport> {
    let text = crate::read_to_string(path)?;
    read_str(&path.display().to_string(), &text, graph, ground_level)
}

/// Reads GVL `text` into `graph`. `file` only labels diagnostics.
///
/// A node with a missing or malformed attribute is skipped together with its subtree, since the
/// positions of its children cannot be resolved. Nodes whose id is not part of the graph are
/// reported and not applied, but still anchor their children.
pub fn read_str(
    file: &str,
    text: &str,
    graph: &mut LayoutGraph,
    ground_level: f32,
) -> Result<LoadReport> {
    let doc = roxmltree::Document::parse(text).map_err(|source| Error::Xml {
        file: file.to_owned(),
        source,
    })?;
    let mut report = LoadReport::new(file);

    let mut pending: Vec<(roxmltree::Node<'_, '_>, Option<Parent>)> = doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("Node"))
        .rev()
        .map(|n| (n, None))
        .collect();

    while let Some((element, parent)) = pending.pop() {
        let line = doc.text_pos_at(element.range().start).row as usize;
        let entry = match NodeEntry::parse(element) {
            Ok(entry) => entry,
            Err(message) => {
                report.skip(line, message);
                continue;
            }
        };

        let node = graph.node_id(&entry.id);
        let height = node.map_or(0.0, |v| graph.node(v).absolute_scale.y);
        let icon_size = match parent {
            Some(p) => p.child_icon_size,
            None => entry.child_icon_size,
        };
        let transform = entry.transform(parent, icon_size, height, ground_level);

        match node {
            Some(v) => apply(graph, v, &transform, &entry.id, &mut report),
            None => report.skip(line, format!("unknown node id {}", entry.id)),
        }

        let this = Parent {
            transform,
            child_icon_size: entry.child_icon_size,
        };
        pending.extend(
            element
                .children()
                .filter(|n| n.has_tag_name("Node"))
                .rev()
                .map(|n| (n, Some(this))),
        );
    }
    Ok(report)
}

fn apply(
    graph: &mut LayoutGraph,
    v: NodeId,
    transform: &NodeTransform,
    id: &str,
    report: &mut LoadReport,
) {
    let node = graph.node_mut(v);
    let rotation = node.rotation;
    let transform = transform.with_rotation(rotation);
    node.apply(&transform);
    report.applied.insert(id.to_owned(), transform);
}

fn has_child_nodes(element: roxmltree::Node<'_, '_>) -> bool {
    element.children().any(|n| n.has_tag_name("Node"))
}

/// Attributes of one `<Node>` element.
#[derive(Debug, Clone, PartialEq)]
struct NodeEntry {
    id: String,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    child_icon_size: f32,
    expanded: bool,
}

impl NodeEntry {
    fn parse(element: roxmltree::Node<'_, '_>) -> std::result::Result<Self, String> {
        let raw_id = element.attribute("Id").unwrap_or_default();
        let mut chars = raw_id.chars();
        // The first letter tells linkage names (L) from source names (S).
        chars.next();
        let id = chars.as_str();
        if id.is_empty() {
            return Err("node has no Id".to_owned());
        }
        let float = |name: &str| -> std::result::Result<f32, String> {
            let value = element
                .attribute(name)
                .ok_or_else(|| format!("node {id} has no attribute {name}"))?;
            value
                .trim()
                .parse::<f32>()
                .map_err(|_| format!("attribute {name} of node {id} is not a number: {value:?}"))
        };
        Ok(Self {
            x: float("X")?,
            y: float("Y")?,
            w: float("W")?,
            h: float("H")?,
            child_icon_size: if element.has_attribute("CS") || has_child_nodes(element) {
                float("CS")?
            } else {
                DEFAULT_ICON_SIZE
            },
            expanded: element.attribute("Exp") == Some("True"),
            id: id.to_owned(),
        })
    }

    fn transform(
        &self,
        parent: Option<Parent>,
        icon_size: f32,
        height: f32,
        ground_level: f32,
    ) -> NodeTransform {
        let (sx, sz) = if self.expanded && self.w != 0.0 && self.h != 0.0 {
            (self.w, self.h)
        } else {
            (icon_size, icon_size)
        };
        let (left, upper, ground) = match parent {
            Some(p) => {
                let (px, pz) = p.corner();
                (px + self.x, pz - self.y, p.roof())
            }
            None => (self.x, -self.y, ground_level),
        };
        NodeTransform::new(
            Vec3::new(left + sx / 2.0, ground, upper - sz / 2.0),
            Vec3::new(sx, height, sz),
        )
    }
}

/// Serializes the hierarchy of `graph` as GVL. Every node is written expanded with its
/// footprint as `W` x `H`.
pub fn write(graph: &LayoutGraph, title: &str) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    out.push_str("<!DOCTYPE Gravis2_Layout>\n");
    let _ = writeln!(
        out,
        "<Gravis2_Layout W=\"Hierarchy\" V=\"{}\">",
        escape_attr(title)
    );
    out.push_str("  <Visualization>\n");
    out.push_str("    <Zoom Factor=\"1.0\" Center_X=\"0.0\" Center_Y=\"0.0\"/>\n");
    for name in VISUALIZATION_OPTIONS {
        let _ = writeln!(out, "    <Option Name=\"{name}\" Value=\"False\"/>");
    }
    out.push_str("    <Hidden_Node_Types/>\n");
    out.push_str("    <Hidden_Edge_Types/>\n");
    out.push_str("  </Visualization>\n");
    for root in all_roots(graph) {
        write_node(&mut out, graph, root, 1);
    }
    out.push_str("</Gravis2_Layout>\n");
    out
}

fn write_node(out: &mut String, graph: &LayoutGraph, v: NodeId, depth: usize) {
    let node = graph.node(v);
    let center = node.center_position;
    let scale = node.absolute_scale;
    let (x, y) = match graph.parent(v) {
        None => (center.x - scale.x / 2.0, -center.z - scale.z / 2.0),
        Some(p) => {
            let parent = graph.node(p);
            let parent_left = parent.center_position.x - parent.absolute_scale.x / 2.0;
            let parent_upper = parent.center_position.z + parent.absolute_scale.z / 2.0;
            let left = center.x - scale.x / 2.0;
            let upper = center.z + scale.z / 2.0;
            (left - parent_left, parent_upper - upper)
        }
    };

    let indent = "  ".repeat(depth);
    let _ = write!(
        out,
        "{indent}<Node Id=\"L{}\" X=\"{x}\" Y=\"{y}\" W=\"{}\" H=\"{}\" CS=\"{WRITTEN_ICON_SIZE}\" Exp=\"True\"",
        escape_attr(&node.id),
        scale.x,
        scale.z,
    );
    let children = graph.children(v);
    if children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    for &c in children {
        write_node(out, graph, c, depth + 1);
    }
    let _ = writeln!(out, "{indent}</Node>");
}

fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
