//! Arena of layout nodes.
//!
//! Nodes are stored in insertion order and addressed by [`NodeId`]. The parent/children
//! relation is kept next to every node record as index relations, so passes that walk the tree
//! while mutating transforms never hold references into the arena.

use rustc_hash::FxBuildHasher;

use crate::Vec3;
use crate::error::{Error, Result};
use crate::node::{LayoutNode, NodeId};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone)]
struct NodeEntry {
    node: LayoutNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutGraph {
    nodes: Vec<NodeEntry>,
    node_index: HashMap<String, NodeId>,
}

impl LayoutGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: LayoutNode) -> Result<NodeId> {
        if self.node_index.contains_key(node.id.as_str()) {
            return Err(Error::DuplicateNode { id: node.id });
        }
        let id = NodeId::new(self.nodes.len());
        self.node_index.insert(node.id.clone(), id);
        self.nodes.push(NodeEntry {
            node,
            parent: None,
            children: Vec::new(),
        });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node_id(&self, id: &str) -> Option<NodeId> {
        self.node_index.get(id).copied()
    }

    /// Panics if `id` was not handed out by this graph.
    pub fn node(&self, id: NodeId) -> &LayoutNode {
        &self.nodes[id.index()].node
    }

    /// Panics if `id` was not handed out by this graph.
    pub fn node_mut(&mut self, id: NodeId) -> &mut LayoutNode {
        &mut self.nodes[id.index()].node
    }

    pub fn get(&self, id: &str) -> Option<&LayoutNode> {
        self.node_id(id).map(|id| self.node(id))
    }

    /// All node ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &LayoutNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, e)| (NodeId::new(idx), &e.node))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.parent(id).is_none()
    }

    /// Makes `parent` the parent of `child`, detaching `child` from its previous parent.
    ///
    /// Refuses to create a cycle, which keeps every recursive walk over the hierarchy finite.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        let mut cursor = Some(parent);
        while let Some(c) = cursor {
            if c == child {
                return Err(Error::Cycle {
                    child: self.node(child).id.clone(),
                    parent: self.node(parent).id.clone(),
                });
            }
            cursor = self.parent(c);
        }

        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Turns `child` into a root. Returns its former parent.
    pub fn detach(&mut self, child: NodeId) -> Option<NodeId> {
        let prev = self.nodes[child.index()].parent.take()?;
        self.nodes[prev.index()].children.retain(|c| *c != child);
        Some(prev)
    }

    /// Removes `child` from the children of `parent`. Returns `false` when `parent` was not the
    /// parent of `child`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    pub fn roof(&self, id: NodeId) -> Vec3 {
        self.node(id).roof()
    }

    pub fn ground(&self, id: NodeId) -> Vec3 {
        self.node(id).ground()
    }

    /// Expresses the position of `node` relative to the center of `root`.
    pub fn set_relative(&mut self, node: NodeId, root: NodeId) {
        let origin = self.node(root).center_position;
        let n = self.node_mut(node);
        n.relative_position = n.center_position - origin;
    }

    /// Inverse of [`Self::set_relative`]: moves `node` to its relative position measured from
    /// the current center of `root`.
    pub fn set_origin(&mut self, node: NodeId, root: NodeId) {
        let origin = self.node(root).center_position;
        let n = self.node_mut(node);
        n.center_position = origin + n.relative_position;
    }
}
