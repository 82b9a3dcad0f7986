#![forbid(unsafe_code)]

//! Layout files for `skyline`.
//!
//! Two formats are supported: GVL, the nested XML layout format of the Gravis tool, and SLD, a
//! flat tab-separated list of node transforms. Readers apply what they can to a
//! [`skyline_hierarchy::LayoutGraph`] and report rows they had to skip in a [`LoadReport`]
//! instead of failing the whole file.

pub mod error;
pub mod gvl;
pub mod report;
pub mod sld;

use std::path::Path;

use skyline_hierarchy::LayoutGraph;

pub use error::{Error, Result};
pub use report::{Diagnostic, LoadReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutFormat {
    Gvl,
    Sld,
}

impl LayoutFormat {
    /// Picks the format from the file extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "gvl" => Some(Self::Gvl),
            "sld" => Some(Self::Sld),
            _ => None,
        }
    }
}

/// Reads the layout file at `path` into `graph`, dispatching on its extension.
///
/// `ground_level` only matters for GVL, which carries no heights.
pub fn read_path(path: &Path, graph: &mut LayoutGraph, ground_level: f32) -> Result<LoadReport> {
    match LayoutFormat::from_path(path) {
        Some(LayoutFormat::Gvl) => gvl::read(path, graph, ground_level),
        Some(LayoutFormat::Sld) => sld::read(path, graph),
        None => Err(Error::UnknownFormat {
            path: path.to_path_buf(),
        }),
    }
}

pub(crate) fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
