//! Lowest common ancestors in a forest.

use rustc_hash::FxBuildHasher;

use crate::error::{Error, Result};
use crate::graph::LayoutGraph;
use crate::node::NodeId;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone, Copy)]
struct Entry {
    tree: NodeId,
    depth: usize,
}

/// Answers lowest-common-ancestor queries for nodes reachable from a fixed set of roots.
///
/// The finder borrows the graph, so the hierarchy cannot change while it is alive.
#[derive(Debug)]
pub struct LcaFinder<'g> {
    graph: &'g LayoutGraph,
    entries: HashMap<NodeId, Entry>,
}

impl<'g> LcaFinder<'g> {
    pub fn new(graph: &'g LayoutGraph, roots: &[NodeId]) -> Result<Self> {
        if roots.is_empty() {
            return Err(Error::NoRoots);
        }
        let mut entries: HashMap<NodeId, Entry> = HashMap::default();
        for &root in roots {
            let mut stack = vec![(root, 0usize)];
            while let Some((v, depth)) = stack.pop() {
                entries.insert(v, Entry { tree: root, depth });
                stack.extend(graph.children(v).iter().map(|c| (*c, depth + 1)));
            }
        }
        Ok(Self { graph, entries })
    }

    /// `None` when `a` and `b` live in different trees or either is not below a known root.
    pub fn lca(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        if a == b {
            return Some(a);
        }
        let ea = self.entries.get(&a)?;
        let eb = self.entries.get(&b)?;
        if ea.tree != eb.tree {
            return None;
        }

        let (mut a, mut b) = (a, b);
        let (mut da, mut db) = (ea.depth, eb.depth);
        while da > db {
            a = self.graph.parent(a)?;
            da -= 1;
        }
        while db > da {
            b = self.graph.parent(b)?;
            db -= 1;
        }
        while a != b {
            a = self.graph.parent(a)?;
            b = self.graph.parent(b)?;
        }
        Some(a)
    }
}

#[cfg(test)]
mod tests {
    use super::LcaFinder;
    use crate::error::Error;
    use crate::graph::LayoutGraph;

    #[test]
    fn empty_root_set_is_rejected() {
        let g = LayoutGraph::new();
        assert!(matches!(LcaFinder::new(&g, &[]), Err(Error::NoRoots)));
    }
}
