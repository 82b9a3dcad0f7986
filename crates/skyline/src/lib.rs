#![forbid(unsafe_code)]

//! Headless software-city layout.
//!
//! `skyline` places the nodes of a hierarchical graph as blocks in 3D space and routes the
//! edges between them as curves. The node arena and the hierarchy utilities live in
//! `skyline-hierarchy`; this crate adds edge routing (straight, direct spline, hierarchical
//! bundling, flat), node layouts, sublayout composition and the pipeline tying them together.

pub mod edges;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod spline;
pub mod sublayout;

pub use edges::{EdgeLayout, EdgeLayoutKind, EdgeLayoutSettings, LayoutEdge, edge_layout};
pub use error::{Error, Result};
pub use layout::{
    LayoutRegistry, NodeLayout, NodeLayoutKind, NodeLayoutModel, NodeLayoutResult,
    NodeLayoutSettings,
};
pub use pipeline::{CityLayoutConfig, LayoutPipeline, PipelineReport, SublayoutSettings};
pub use skyline_hierarchy::{LayoutGraph, LayoutNode, NodeId, NodeTransform, Vec3};
pub use spline::{Spline, SplineKind};
pub use sublayout::{Sublayout, SublayoutSpec, compose_sublayouts};

/// Re-export of the hierarchy crate.
pub use skyline_hierarchy as hierarchy;
