//! SLD: one node per line, tab separated.
//!
//! ```text
//! id  px  py  pz  ex  ey  ez  sx  sy  sz
//! ```
//!
//! `p` is the center position, `e` the Euler angles in degrees (only `ey` is used) and `s` the
//! absolute scale. Blank lines are ignored.

use std::fmt::Write as _;
use std::path::Path;

use skyline_hierarchy::{LayoutGraph, NodeTransform, Vec3};

use crate::error::Result;
use crate::report::LoadReport;

const FIELDS: usize = 10;

pub fn read(path: &Path, graph: &mut LayoutGraph) -> Result<LoadReport> {
    let text = crate::read_to_string(path)?;
    Ok(read_str(&path.display().to_string(), &text, graph))
}

/// Reads SLD `text` into `graph`. Malformed rows and unknown ids are reported and skipped.
pub fn read_str(file: &str, text: &str, graph: &mut LayoutGraph) -> LoadReport {
    let mut report = LoadReport::new(file);
    for (idx, row) in text.lines().enumerate() {
        let line = idx + 1;
        if row.trim().is_empty() {
            continue;
        }
        let (id, values) = match parse_row(row) {
            Ok(parsed) => parsed,
            Err(message) => {
                report.skip(line, message);
                continue;
            }
        };
        let Some(v) = graph.node_id(id) else {
            report.skip(line, format!("unknown node id {id}"));
            continue;
        };
        let center = Vec3::new(values[0], values[1], values[2]);
        let scale = Vec3::new(values[6], values[7], values[8]);
        let transform = NodeTransform::from_center(center, scale, values[4]);
        graph.node_mut(v).apply(&transform);
        report.applied.insert(id.to_owned(), transform);
    }
    report
}

fn parse_row(row: &str) -> std::result::Result<(&str, [f32; FIELDS - 1]), String> {
    let fields: Vec<&str> = row.split('\t').collect();
    if fields.len() != FIELDS {
        return Err(format!(
            "expected {FIELDS} tab-separated fields, found {}",
            fields.len()
        ));
    }
    let id = fields[0];
    if id.is_empty() {
        return Err("row has no node id".to_owned());
    }
    let mut values = [0.0f32; FIELDS - 1];
    for (slot, raw) in values.iter_mut().zip(&fields[1..]) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|_| format!("{raw:?} is not a number (node {id})"))?;
    }
    Ok((id, values))
}

/// One row per node in graph order.
pub fn write(graph: &LayoutGraph) -> String {
    let mut out = String::new();
    for (_, node) in graph.nodes() {
        let p = node.center_position;
        let s = node.absolute_scale;
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t0\t{}\t0\t{}\t{}\t{}",
            node.id, p.x, p.y, p.z, node.rotation, s.x, s.y, s.z
        );
    }
    out
}
