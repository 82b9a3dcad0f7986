#![forbid(unsafe_code)]

//! Node arena and hierarchy utilities used by `skyline`.
//!
//! A software city is a forest of nested nodes. [`LayoutGraph`] owns every node record and
//! keeps the parent/children relation as index relations between [`NodeId`]s; the relation is
//! acyclic by construction because [`LayoutGraph::set_parent`] refuses to close a cycle.

pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod lca;
pub mod node;

pub use error::{Error, Result};
pub use graph::LayoutGraph;
pub use lca::LcaFinder;
pub use node::{LayoutNode, NodeId, NodeTransform};

/// World-space vector. The y axis is the vertical one.
pub type Vec3 = nalgebra::Vector3<f32>;
